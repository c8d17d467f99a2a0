//! Flattening of webhook envelopes into ordered event lists.

use serde::Serialize;

use crate::error::{Error, Result};

use super::payload::{IncomingMessage, MessageStatus, ReportedError, WebhookPayload};

/// Messages, statuses and errors gathered from every entry and change.
///
/// Each list keeps envelope order: entry order, then change order within
/// the entry, then item order within the change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WebhookEvent {
    /// Messages users sent to the business
    pub messages: Vec<IncomingMessage>,
    /// Delivery updates for messages the business sent
    pub statuses: Vec<MessageStatus>,
    /// Change-level errors reported by the platform
    pub errors: Vec<ReportedError>,
}

impl WebhookEvent {
    /// Flattens `payload`, taking ownership of its items.
    #[must_use]
    pub fn from_payload(payload: WebhookPayload) -> Self {
        let mut event = Self::default();

        for change in payload.entry.into_iter().flat_map(|entry| entry.changes) {
            let value = change.value;
            event.messages.extend(value.messages);
            event.statuses.extend(value.statuses);
            event.errors.extend(value.errors);
        }

        event
    }

    /// Returns true if at least one message arrived.
    #[must_use]
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Returns true if at least one status update arrived.
    #[must_use]
    pub fn has_statuses(&self) -> bool {
        !self.statuses.is_empty()
    }

    /// Returns true if the platform reported any change-level error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if nothing was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.has_messages() || self.has_statuses() || self.has_errors())
    }
}

/// Flattens a borrowed payload. See [`WebhookEvent::from_payload`].
#[must_use]
pub fn normalize(payload: &WebhookPayload) -> WebhookEvent {
    let mut event = WebhookEvent::default();

    for change in payload.entry.iter().flat_map(|entry| &entry.changes) {
        event.messages.extend(change.value.messages.iter().cloned());
        event.statuses.extend(change.value.statuses.iter().cloned());
        event.errors.extend(change.value.errors.iter().cloned());
    }

    event
}

/// Decodes a raw webhook body.
///
/// # Errors
///
/// Returns [`Error::Webhook`] if the body is not a JSON webhook envelope.
pub fn parse_payload(body: &[u8]) -> Result<WebhookPayload> {
    serde_json::from_slice(body).map_err(|e| Error::Webhook(format!("Invalid webhook payload: {e}")))
}
