//! Operations on `{phone_number_id}/messages`.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::templates::Template;
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, RequestSpec, Transport};

use super::content::{MediaSource, MessageContent};
use super::outgoing::{MessageResponse, OutgoingMessage, ReadReceipt};

/// Message sending bound to one business phone number.
///
/// Obtained from [`WhatsAppClient::messages`](crate::WhatsAppClient::messages).
#[derive(Debug)]
pub struct Messages<'a, H, S = TokioSleeper> {
    transport: &'a Transport<H, S>,
    phone_number_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SuccessFlag {
    #[serde(default)]
    success: bool,
}

impl<'a, H, S> Messages<'a, H, S> {
    pub(crate) const fn new(transport: &'a Transport<H, S>, phone_number_id: &'a str) -> Self {
        Self {
            transport,
            phone_number_id,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.phone_number_id)
    }
}

impl<H: HttpClient, S: Sleeper> Messages<'_, H, S> {
    /// Sends a prepared message.
    ///
    /// # Errors
    ///
    /// Returns whatever the transport reports, or [`Error::Decode`] if the
    /// reply is not a message response.
    pub async fn send(&self, message: &OutgoingMessage) -> Result<MessageResponse> {
        let spec = RequestSpec::post(self.endpoint()).with_json(message.to_json()?);
        let response: MessageResponse = self.transport.execute_as(spec, "message response").await?;

        tracing::info!(
            kind = message.content.kind(),
            message_id = response.message_id().unwrap_or_default(),
            "Message sent"
        );
        Ok(response)
    }

    /// Sends a plain text message without link previews.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a bad recipient or body, otherwise see
    /// [`send`](Self::send).
    pub async fn send_text(&self, to: &str, body: &str) -> Result<MessageResponse> {
        let message = OutgoingMessage::new(to, MessageContent::text(body, false)?)?;
        self.send(&message).await
    }

    /// Sends an image by media id or link.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a bad recipient or caption, otherwise see
    /// [`send`](Self::send).
    pub async fn send_image(
        &self,
        to: &str,
        source: MediaSource,
        caption: Option<&str>,
    ) -> Result<MessageResponse> {
        let content = MessageContent::image(source, caption.map(ToString::to_string))?;
        self.send(&OutgoingMessage::new(to, content)?).await
    }

    /// Sends an approved template.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a bad recipient or template, otherwise see
    /// [`send`](Self::send).
    pub async fn send_template(&self, to: &str, template: Template) -> Result<MessageResponse> {
        self.send(&OutgoingMessage::new(to, MessageContent::template(template))?)
            .await
    }

    /// Reacts to a message. An empty `emoji` removes the reaction.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a bad recipient or message id, otherwise
    /// see [`send`](Self::send).
    pub async fn send_reaction(
        &self,
        to: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<MessageResponse> {
        let content = MessageContent::reaction(message_id, emoji)?;
        self.send(&OutgoingMessage::new(to, content)?).await
    }

    /// Marks an incoming message as read and returns the API's `success`
    /// flag.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a blank id, otherwise the transport error.
    pub async fn mark_as_read(&self, message_id: &str) -> Result<bool> {
        let receipt = ReadReceipt::new(message_id)?;
        let body =
            serde_json::to_value(&receipt).map_err(|e| Error::validation("message_id", e.to_string()))?;

        let flag: SuccessFlag = self
            .transport
            .execute_as(RequestSpec::post(self.endpoint()).with_json(body), "read receipt")
            .await?;
        Ok(flag.success)
    }
}
