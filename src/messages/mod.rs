//! Outgoing message payloads and the messages endpoint.

mod content;
mod outgoing;
mod phone;
mod service;


pub use content::{
    Button, ButtonAction, Contact, ContactEmail, ContactName, ContactOrg, ContactPhone, ContactUrl,
    Interactive, InteractiveText, ListAction, ListRow, ListSection, Location, MAX_BUTTON_TITLE_CHARS,
    MAX_CAPTION_CHARS, MAX_INTERACTIVE_BODY_CHARS, MAX_LIST_ROWS, MAX_LIST_SECTIONS,
    MAX_REPLY_BUTTONS, MAX_ROW_DESCRIPTION_CHARS, MAX_ROW_TITLE_CHARS, MAX_TEXT_CHARS, MediaObject,
    MediaSource, MessageContent, Reaction, ReplyButton, TextBody,
};
pub use outgoing::{
    MessageResponse, OutgoingMessage, ReadReceipt, ReplyContext, ResponseContact, ResponseMessage,
};
pub use phone::normalize_phone_number;
pub use service::Messages;
