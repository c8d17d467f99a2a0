//! Media endpoint: uploads with local size checks, lookups, downloads.

mod limits;
mod service;


pub use limits::{
    MAX_DOCUMENT_BYTES, MAX_IMAGE_BYTES, MAX_STICKER_BYTES, MAX_VIDEO_AUDIO_BYTES, check_size,
    max_size_for,
};
pub use service::{Media, MediaInfo, MediaUpload};
