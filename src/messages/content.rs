//! Outgoing message bodies, one constructor per message kind.
//!
//! Constructors check the vendor's documented limits and return
//! [`Error::Validation`] before anything is sent.
//! [`MessageContent::validate`] repeats the same checks for values built
//! by hand.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::templates::Template;

/// Longest text message body, in characters.
pub const MAX_TEXT_CHARS: usize = 4096;
/// Longest media caption, in characters.
pub const MAX_CAPTION_CHARS: usize = 1024;
/// Longest interactive body text, in characters.
pub const MAX_INTERACTIVE_BODY_CHARS: usize = 1024;
/// Most reply buttons on one message.
pub const MAX_REPLY_BUTTONS: usize = 3;
/// Longest reply button or list button title, in characters.
pub const MAX_BUTTON_TITLE_CHARS: usize = 20;
/// Most sections in a list message.
pub const MAX_LIST_SECTIONS: usize = 10;
/// Most rows across all sections of a list message.
pub const MAX_LIST_ROWS: usize = 10;
/// Longest list row or section title, in characters.
pub const MAX_ROW_TITLE_CHARS: usize = 24;
/// Longest list row description, in characters.
pub const MAX_ROW_DESCRIPTION_CHARS: usize = 72;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn check_max(field: &'static str, value: &str, max: usize) -> Result<()> {
    let len = char_len(value);
    if len > max {
        return Err(Error::validation(
            field,
            format!("must be at most {max} characters, got {len}"),
        ));
    }
    Ok(())
}

fn check_not_blank(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Where the API fetches media from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    /// Id of previously uploaded media
    Id(String),
    /// Public HTTP(S) URL
    Link(String),
}

impl MediaSource {
    /// Treats values starting with `http://` or `https://` as links and
    /// anything else as a media id.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Link(value.to_string())
        } else {
            Self::Id(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
    #[serde(default)]
    pub preview_url: bool,
}

/// Media reference with its optional decorations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaObject {
    #[serde(flatten)]
    pub source: MediaSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Shown for documents only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl MediaObject {
    const fn bare(source: MediaSource) -> Self {
        Self {
            source,
            caption: None,
            filename: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A contact card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub name: ContactName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<ContactPhone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ContactEmail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<ContactUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<ContactOrg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
}

impl Contact {
    /// Creates a card with only a formatted name.
    #[must_use]
    pub fn named(formatted_name: impl Into<String>) -> Self {
        Self {
            name: ContactName {
                formatted_name: formatted_name.into(),
                ..ContactName::default()
            },
            ..Self::default()
        }
    }

    /// Adds a phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phones.push(ContactPhone {
            phone: phone.into(),
            kind: None,
            wa_id: None,
        });
        self
    }

    /// Adds an email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(ContactEmail {
            email: email.into(),
            kind: None,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactName {
    pub formatted_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPhone {
    pub phone: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEmail {
    pub email: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUrl {
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactOrg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveText {
    pub text: String,
}

/// A quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyButton {
    /// Returned in the webhook when tapped
    pub id: String,
    pub title: String,
}

impl ReplyButton {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    Reply { reply: ReplyButton },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonAction {
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListRow {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub rows: Vec<ListRow>,
}

impl ListSection {
    #[must_use]
    pub const fn new(title: Option<String>, rows: Vec<ListRow>) -> Self {
        Self { title, rows }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAction {
    /// Label of the button that opens the list
    pub button: String,
    pub sections: Vec<ListSection>,
}

/// Interactive message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interactive {
    Button {
        body: InteractiveText,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        footer: Option<InteractiveText>,
        action: ButtonAction,
    },
    List {
        body: InteractiveText,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        footer: Option<InteractiveText>,
        action: ListAction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub message_id: String,
    /// Empty to remove an earlier reaction
    pub emoji: String,
}

/// Body of an outgoing message, serialized with its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextBody },
    Image { image: MediaObject },
    Video { video: MediaObject },
    Audio { audio: MediaObject },
    Document { document: MediaObject },
    Sticker { sticker: MediaObject },
    Location { location: Location },
    Contacts { contacts: Vec<Contact> },
    Interactive { interactive: Interactive },
    Template { template: Template },
    Reaction { reaction: Reaction },
}

impl MessageContent {
    /// A text message.
    ///
    /// # Errors
    ///
    /// Fails if `body` is blank or longer than [`MAX_TEXT_CHARS`].
    pub fn text(body: impl Into<String>, preview_url: bool) -> Result<Self> {
        Self::validated(Self::Text {
            text: TextBody {
                body: body.into(),
                preview_url,
            },
        })
    }

    /// An image message.
    ///
    /// # Errors
    ///
    /// Fails if `caption` is longer than [`MAX_CAPTION_CHARS`].
    pub fn image(source: MediaSource, caption: Option<String>) -> Result<Self> {
        Self::validated(Self::Image {
            image: MediaObject {
                caption,
                ..MediaObject::bare(source)
            },
        })
    }

    /// A video message.
    ///
    /// # Errors
    ///
    /// Fails if `caption` is longer than [`MAX_CAPTION_CHARS`].
    pub fn video(source: MediaSource, caption: Option<String>) -> Result<Self> {
        Self::validated(Self::Video {
            video: MediaObject {
                caption,
                ..MediaObject::bare(source)
            },
        })
    }

    /// An audio message. Audio takes no caption.
    #[must_use]
    pub const fn audio(source: MediaSource) -> Self {
        Self::Audio {
            audio: MediaObject::bare(source),
        }
    }

    /// A document message.
    ///
    /// # Errors
    ///
    /// Fails if `caption` is longer than [`MAX_CAPTION_CHARS`].
    pub fn document(
        source: MediaSource,
        caption: Option<String>,
        filename: Option<String>,
    ) -> Result<Self> {
        Self::validated(Self::Document {
            document: MediaObject {
                source,
                caption,
                filename,
            },
        })
    }

    /// A sticker message. Stickers take no caption.
    #[must_use]
    pub const fn sticker(source: MediaSource) -> Self {
        Self::Sticker {
            sticker: MediaObject::bare(source),
        }
    }

    /// A location pin.
    ///
    /// # Errors
    ///
    /// Fails unless latitude is within [-90, 90] and longitude within
    /// [-180, 180].
    pub fn location(
        latitude: f64,
        longitude: f64,
        name: Option<String>,
        address: Option<String>,
    ) -> Result<Self> {
        Self::validated(Self::Location {
            location: Location {
                latitude,
                longitude,
                name,
                address,
            },
        })
    }

    /// One or more contact cards.
    ///
    /// # Errors
    ///
    /// Fails if `contacts` is empty or a card has a blank formatted name.
    pub fn contacts(contacts: Vec<Contact>) -> Result<Self> {
        Self::validated(Self::Contacts { contacts })
    }

    /// A message with up to three quick-reply buttons.
    ///
    /// # Errors
    ///
    /// Fails if `body` is blank or too long, or unless there are 1 to 3
    /// buttons with non-empty ids and titles of at most 20 characters.
    pub fn reply_buttons(body: impl Into<String>, buttons: Vec<ReplyButton>) -> Result<Self> {
        Self::validated(Self::Interactive {
            interactive: Interactive::Button {
                body: InteractiveText { text: body.into() },
                footer: None,
                action: ButtonAction {
                    buttons: buttons
                        .into_iter()
                        .map(|reply| Button::Reply { reply })
                        .collect(),
                },
            },
        })
    }

    /// A list message opened by a button labelled `button`.
    ///
    /// # Errors
    ///
    /// Fails unless there are 1 to 10 sections, each non-empty, with at
    /// most 10 rows in total and titles within their limits.
    pub fn list(
        body: impl Into<String>,
        button: impl Into<String>,
        sections: Vec<ListSection>,
    ) -> Result<Self> {
        Self::validated(Self::Interactive {
            interactive: Interactive::List {
                body: InteractiveText { text: body.into() },
                footer: None,
                action: ListAction {
                    button: button.into(),
                    sections,
                },
            },
        })
    }

    /// A message using an approved template.
    #[must_use]
    pub const fn template(template: Template) -> Self {
        Self::Template { template }
    }

    /// A reaction to an earlier message. An empty `emoji` removes it.
    ///
    /// # Errors
    ///
    /// Fails if `message_id` is blank.
    pub fn reaction(message_id: impl Into<String>, emoji: impl Into<String>) -> Result<Self> {
        Self::validated(Self::Reaction {
            reaction: Reaction {
                message_id: message_id.into(),
                emoji: emoji.into(),
            },
        })
    }

    /// Returns the wire name of the message type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Audio { .. } => "audio",
            Self::Document { .. } => "document",
            Self::Sticker { .. } => "sticker",
            Self::Location { .. } => "location",
            Self::Contacts { .. } => "contacts",
            Self::Interactive { .. } => "interactive",
            Self::Template { .. } => "template",
            Self::Reaction { .. } => "reaction",
        }
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Checks the content against the vendor limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Text { text } => {
                check_not_blank("text.body", &text.body)?;
                check_max("text.body", &text.body, MAX_TEXT_CHARS)
            }
            Self::Image { image: media }
            | Self::Video { video: media }
            | Self::Document { document: media } => validate_caption(media),
            Self::Audio { audio: media } | Self::Sticker { sticker: media } => {
                if media.caption.is_some() {
                    return Err(Error::validation("caption", "not supported for this media type"));
                }
                Ok(())
            }
            Self::Location { location } => validate_location(location),
            Self::Contacts { contacts } => validate_contacts(contacts),
            Self::Interactive { interactive } => validate_interactive(interactive),
            Self::Template { template } => template.validate(),
            Self::Reaction { reaction } => check_not_blank("reaction.message_id", &reaction.message_id),
        }
    }
}

fn validate_caption(media: &MediaObject) -> Result<()> {
    match &media.caption {
        Some(caption) => check_max("caption", caption, MAX_CAPTION_CHARS),
        None => Ok(()),
    }
}

fn validate_location(location: &Location) -> Result<()> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        return Err(Error::validation(
            "latitude",
            format!("must be between -90 and 90, got {}", location.latitude),
        ));
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        return Err(Error::validation(
            "longitude",
            format!("must be between -180 and 180, got {}", location.longitude),
        ));
    }
    Ok(())
}

fn validate_contacts(contacts: &[Contact]) -> Result<()> {
    if contacts.is_empty() {
        return Err(Error::validation("contacts", "at least one contact is required"));
    }
    for contact in contacts {
        check_not_blank("contacts.name.formatted_name", &contact.name.formatted_name)?;
    }
    Ok(())
}

fn validate_interactive(interactive: &Interactive) -> Result<()> {
    match interactive {
        Interactive::Button { body, action, .. } => {
            check_not_blank("interactive.body", &body.text)?;
            check_max("interactive.body", &body.text, MAX_INTERACTIVE_BODY_CHARS)?;
            validate_buttons(&action.buttons)
        }
        Interactive::List { body, action, .. } => {
            check_not_blank("interactive.body", &body.text)?;
            check_max("interactive.body", &body.text, MAX_INTERACTIVE_BODY_CHARS)?;
            check_not_blank("interactive.action.button", &action.button)?;
            check_max("interactive.action.button", &action.button, MAX_BUTTON_TITLE_CHARS)?;
            validate_sections(&action.sections)
        }
    }
}

fn validate_buttons(buttons: &[Button]) -> Result<()> {
    if buttons.is_empty() || buttons.len() > MAX_REPLY_BUTTONS {
        return Err(Error::validation(
            "buttons",
            format!("must have 1 to {MAX_REPLY_BUTTONS} buttons, got {}", buttons.len()),
        ));
    }
    for Button::Reply { reply } in buttons {
        check_not_blank("buttons.id", &reply.id)?;
        check_not_blank("buttons.title", &reply.title)?;
        check_max("buttons.title", &reply.title, MAX_BUTTON_TITLE_CHARS)?;
    }
    Ok(())
}

fn validate_sections(sections: &[ListSection]) -> Result<()> {
    if sections.is_empty() || sections.len() > MAX_LIST_SECTIONS {
        return Err(Error::validation(
            "sections",
            format!("must have 1 to {MAX_LIST_SECTIONS} sections, got {}", sections.len()),
        ));
    }

    let total_rows: usize = sections.iter().map(|section| section.rows.len()).sum();
    if total_rows > MAX_LIST_ROWS {
        return Err(Error::validation(
            "sections.rows",
            format!("must have at most {MAX_LIST_ROWS} rows in total, got {total_rows}"),
        ));
    }

    for section in sections {
        if section.rows.is_empty() {
            return Err(Error::validation("sections.rows", "every section needs a row"));
        }
        if let Some(title) = &section.title {
            check_max("sections.title", title, MAX_ROW_TITLE_CHARS)?;
        }
        for row in &section.rows {
            check_not_blank("sections.rows.id", &row.id)?;
            check_not_blank("sections.rows.title", &row.title)?;
            check_max("sections.rows.title", &row.title, MAX_ROW_TITLE_CHARS)?;
            if let Some(description) = &row.description {
                check_max("sections.rows.description", description, MAX_ROW_DESCRIPTION_CHARS)?;
            }
        }
    }
    Ok(())
}
