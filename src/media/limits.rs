//! Upload size limits by MIME type.

use crate::error::{Error, Result};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Largest sticker (`image/webp`).
pub const MAX_STICKER_BYTES: u64 = 512 * KIB;
/// Largest image.
pub const MAX_IMAGE_BYTES: u64 = 5 * MIB;
/// Largest video or audio file.
pub const MAX_VIDEO_AUDIO_BYTES: u64 = 16 * MIB;
/// Largest document, and the limit for any type not listed above.
pub const MAX_DOCUMENT_BYTES: u64 = 100 * MIB;

/// Returns the upload limit for `mime_type`.
#[must_use]
pub fn max_size_for(mime_type: &str) -> u64 {
    let mime = mime_type.trim().to_ascii_lowercase();
    if mime == "image/webp" {
        MAX_STICKER_BYTES
    } else if mime.starts_with("image/") {
        MAX_IMAGE_BYTES
    } else if mime.starts_with("video/") || mime.starts_with("audio/") {
        MAX_VIDEO_AUDIO_BYTES
    } else {
        MAX_DOCUMENT_BYTES
    }
}

/// Rejects `size` bytes of `mime_type` if it is over the limit.
///
/// # Errors
///
/// Returns [`Error::Media`] when `size` exceeds [`max_size_for`].
pub fn check_size(mime_type: &str, size: u64) -> Result<()> {
    let limit = max_size_for(mime_type);
    if size > limit {
        return Err(Error::media(format!(
            "File size {size} bytes exceeds limit of {limit} bytes for {mime_type}"
        )));
    }
    Ok(())
}
