//! Request and response shapes of the messages endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::content::MessageContent;
use super::phone::normalize_phone_number;

const MESSAGING_PRODUCT: &str = "whatsapp";

/// Id of the message being replied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContext {
    pub message_id: String,
}

/// A complete `POST {phone_number_id}/messages` body.
///
/// Serializes to
/// `{"messaging_product":"whatsapp","recipient_type":"individual","to":..,"type":..,<type>:{..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub messaging_product: String,
    pub recipient_type: String,
    /// Recipient phone number, digits only
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ReplyContext>,
    #[serde(flatten)]
    pub content: MessageContent,
}

impl OutgoingMessage {
    /// Builds a message to an individual recipient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `to` is not a valid phone number or
    /// `content` breaks a vendor limit.
    pub fn new(to: &str, content: MessageContent) -> Result<Self> {
        content.validate()?;

        Ok(Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            recipient_type: "individual".to_string(),
            to: normalize_phone_number(to)?,
            context: None,
            content,
        })
    }

    /// Marks the message as a reply to `message_id`.
    #[must_use]
    pub fn in_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.context = Some(ReplyContext {
            message_id: message_id.into(),
        });
        self
    }

    /// Returns the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the content cannot be represented
    /// as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::validation("message", e.to_string()))
    }
}

/// Body that marks an incoming message as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub messaging_product: String,
    pub status: String,
    pub message_id: String,
}

impl ReadReceipt {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `message_id` is blank.
    pub fn new(message_id: impl Into<String>) -> Result<Self> {
        let message_id = message_id.into();
        if message_id.trim().is_empty() {
            return Err(Error::validation("message_id", "must not be empty"));
        }

        Ok(Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            status: "read".to_string(),
            message_id,
        })
    }
}

/// Reply of the messages endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<ResponseContact>,
    #[serde(default)]
    pub messages: Vec<ResponseMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseContact {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub id: String,
    #[serde(default)]
    pub message_status: Option<String>,
}

impl MessageResponse {
    /// Id of the first accepted message.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }

    /// WhatsApp id of the first recipient.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        self.contacts.first().and_then(|c| c.wa_id.as_deref())
    }

    /// Status of the first message: its `message_status`, `"sent"` when
    /// the API omitted one, or `"unknown"` when no message was accepted.
    #[must_use]
    pub fn status(&self) -> &str {
        self.messages.first().map_or("unknown", |m| {
            m.message_status.as_deref().unwrap_or("sent")
        })
    }
}
