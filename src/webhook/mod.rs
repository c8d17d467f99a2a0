//! Inbound webhook handling.
//!
//! - Authenticating calls ([`WebhookVerifier`], [`HandshakeQuery`])
//! - Decoding the envelope ([`WebhookPayload`], [`parse_payload`])
//! - Flattening it into ordered lists ([`WebhookEvent`], [`normalize`])

mod event;
mod payload;
mod verify;

#[cfg(test)]
mod event_tests;

pub use event::{WebhookEvent, normalize, parse_payload};
pub use payload::{
    ButtonReply, Change, ChangeValue, ContactInfo, Entry, IncomingContent, IncomingMessage,
    InteractiveReply, LocationContent, MediaContent, MessageContext, MessageStatus, Metadata,
    Profile, ReactionContent, ReplyChoice, ReportedError, StatusKind, TextContent, WebhookPayload,
};
pub use verify::{HandshakeQuery, SIGNATURE_HEADER, SUBSCRIBE_MODE, WebhookVerifier, sign_payload};
