//! Typed webhook envelope.
//!
//! Every list in the envelope may be absent or `null`; both decode to an
//! empty `Vec`. Message bodies are keyed on their `type` field, and types
//! this crate does not model decode to [`IncomingContent::Unsupported`]
//! instead of failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level webhook body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Always `whatsapp_business_account` for this API
    #[serde(default)]
    pub object: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub entry: Vec<Entry>,
}

/// One business account's batch of changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entry {
    /// Business account id
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Change {
    /// Subscription field, normally `messages`
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub contacts: Vec<ContactInfo>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub messages: Vec<IncomingMessage>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub statuses: Vec<MessageStatus>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub errors: Vec<ReportedError>,
}

/// Business phone number the change belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub display_phone_number: String,
    #[serde(default)]
    pub phone_number_id: String,
}

/// Sender profile attached to incoming messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub wa_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
}

/// A message sent by a user to the business.
///
/// Decoding never fails on the body: a known `type` whose body is missing
/// or malformed decodes to [`IncomingContent::Unsupported`] and the rest of
/// the envelope is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawIncomingMessage")]
pub struct IncomingMessage {
    /// `wamid.` message id
    pub id: String,
    /// Sender phone number
    pub from: String,
    /// Unix timestamp, as sent (a string)
    pub timestamp: String,
    /// Present when the message replies to or forwards another
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    /// Why the platform could not deliver the body, e.g. code 131051 on
    /// `unsupported` messages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ReportedError>,
    #[serde(flatten)]
    pub content: IncomingContent,
}

#[derive(Deserialize)]
struct RawIncomingMessage {
    #[serde(default)]
    id: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    context: Option<MessageContext>,
    #[serde(default, deserialize_with = "nullable_vec")]
    errors: Vec<ReportedError>,
    #[serde(flatten)]
    body: serde_json::Map<String, Value>,
}

impl From<RawIncomingMessage> for IncomingMessage {
    fn from(raw: RawIncomingMessage) -> Self {
        let content = IncomingContent::deserialize(Value::Object(raw.body)).unwrap_or_else(|e| {
            tracing::debug!(
                id = %raw.id,
                error = %e,
                "Message body not decodable, kept as unsupported"
            );
            IncomingContent::Unsupported
        });
        Self {
            id: raw.id,
            from: raw.from,
            timestamp: raw.timestamp,
            context: raw.context,
            errors: raw.errors,
            content,
        }
    }
}

impl IncomingMessage {
    /// Returns true if this message quotes an earlier one.
    #[must_use]
    pub const fn is_reply(&self) -> bool {
        self.context.is_some()
    }

    /// Returns the text body of a text message.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            IncomingContent::Text { text } => Some(&text.body),
            _ => None,
        }
    }

    /// Returns the media id of a media message (image, video, audio, voice
    /// note, document or sticker).
    #[must_use]
    pub fn media_id(&self) -> Option<&str> {
        match &self.content {
            IncomingContent::Image { image: media }
            | IncomingContent::Video { video: media }
            | IncomingContent::Audio { audio: media }
            | IncomingContent::Voice { voice: media }
            | IncomingContent::Document { document: media }
            | IncomingContent::Sticker { sticker: media } => Some(&media.id),
            _ => None,
        }
    }

    /// Returns the wire name of the message type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.content {
            IncomingContent::Text { .. } => "text",
            IncomingContent::Image { .. } => "image",
            IncomingContent::Video { .. } => "video",
            IncomingContent::Audio { .. } => "audio",
            IncomingContent::Voice { .. } => "voice",
            IncomingContent::Document { .. } => "document",
            IncomingContent::Sticker { .. } => "sticker",
            IncomingContent::Location { .. } => "location",
            IncomingContent::Contacts { .. } => "contacts",
            IncomingContent::Interactive { .. } => "interactive",
            IncomingContent::Button { .. } => "button",
            IncomingContent::Reaction { .. } => "reaction",
            IncomingContent::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    #[serde(default)]
    pub from: Option<String>,
    /// Id of the quoted message
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub forwarded: Option<bool>,
    #[serde(default)]
    pub frequently_forwarded: Option<bool>,
}

/// Message body, keyed by the message `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingContent {
    Text { text: TextContent },
    Image { image: MediaContent },
    Video { video: MediaContent },
    Audio { audio: MediaContent },
    Voice { voice: MediaContent },
    Document { document: MediaContent },
    Sticker { sticker: MediaContent },
    Location { location: LocationContent },
    Contacts {
        #[serde(default, deserialize_with = "nullable_vec")]
        contacts: Vec<Value>,
    },
    Interactive { interactive: InteractiveReply },
    Button { button: ButtonReply },
    Reaction { reaction: ReactionContent },
    /// Any type this crate does not model (`unsupported`, `order`, ...)
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaContent {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationContent {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A tap on a reply button or list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveReply {
    /// `button_reply` or `list_reply`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub button_reply: Option<ReplyChoice>,
    #[serde(default)]
    pub list_reply: Option<ReplyChoice>,
}

impl InteractiveReply {
    /// Returns whichever choice was made.
    #[must_use]
    pub fn choice(&self) -> Option<&ReplyChoice> {
        self.button_reply.as_ref().or(self.list_reply.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyChoice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A tap on a template quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonReply {
    #[serde(default)]
    pub payload: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionContent {
    pub message_id: String,
    /// Absent when a reaction is removed
    #[serde(default)]
    pub emoji: Option<String>,
}

/// Delivery state change of a message the business sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStatus {
    pub id: String,
    pub status: StatusKind,
    pub timestamp: String,
    pub recipient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Value>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub errors: Vec<ReportedError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Sent,
    Delivered,
    Read,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Error object as it appears inside webhook payloads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportedError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<Value>,
}
