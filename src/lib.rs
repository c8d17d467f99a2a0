//! WhatsApp Cloud API client core.
//!
//! A library for talking to the WhatsApp Business Cloud API: a rate-limited
//! transport with retries and typed errors, message, media and template
//! services, and webhook signature verification with payload normalization.

pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod messages;
pub mod templates;
pub mod time;
pub mod transport;
pub mod webhook;

#[cfg(test)]
mod test_support;

pub use client::{Credentials, WhatsAppClient};
pub use error::{Error, ErrorKind, Result};
