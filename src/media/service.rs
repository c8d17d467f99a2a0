//! Upload, lookup, download and removal of media.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{FilePart, HttpClient, MultipartForm, RequestSpec, Transport};

use super::limits::check_size;

/// Reply to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaUpload {
    /// Media id usable in outgoing messages
    pub id: String,
}

/// Metadata of stored media.
///
/// The `url` is short-lived and needs the access token to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SuccessFlag {
    #[serde(default)]
    success: bool,
}

fn for_media(message: String, media_id: &str) -> Error {
    Error::Media {
        message,
        media_id: Some(media_id.to_string()),
    }
}

fn check_media_id(media_id: &str) -> Result<()> {
    if media_id.trim().is_empty() {
        return Err(Error::validation("media_id", "must not be empty"));
    }
    Ok(())
}

/// Media operations.
///
/// Uploads go to `{phone_number_id}/media`; everything else addresses the
/// media id directly.
#[derive(Debug)]
pub struct Media<'a, H, S = TokioSleeper> {
    transport: &'a Transport<H, S>,
    phone_number_id: &'a str,
}

impl<'a, H, S> Media<'a, H, S> {
    pub(crate) const fn new(transport: &'a Transport<H, S>, phone_number_id: &'a str) -> Self {
        Self {
            transport,
            phone_number_id,
        }
    }
}

impl<H: HttpClient, S: Sleeper> Media<'_, H, S> {
    /// Uploads a local file.
    ///
    /// The MIME type is `mime_type` when given, otherwise guessed from the
    /// file extension. The size is checked before the file is read.
    ///
    /// # Errors
    ///
    /// [`Error::Media`] if the file is missing or unreadable, the type
    /// cannot be determined, or the file is over its size limit; otherwise
    /// see [`upload_bytes`](Self::upload_bytes).
    pub async fn upload(&self, path: impl AsRef<Path>, mime_type: Option<&str>) -> Result<MediaUpload> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            IoErrorKind::NotFound => Error::media(format!("File not found: {}", path.display())),
            _ => Error::media(format!("Cannot access {}: {e}", path.display())),
        })?;
        if !metadata.is_file() {
            return Err(Error::media(format!("Not a regular file: {}", path.display())));
        }

        let mime_type = match mime_type {
            Some(mime) => mime.to_string(),
            None => mime_guess::from_path(path)
                .first()
                .map(|mime| mime.essence_str().to_string())
                .ok_or_else(|| {
                    Error::media(format!("Could not determine MIME type for {}", path.display()))
                })?,
        };
        check_size(&mime_type, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::media(format!("Cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "file".to_string(), |name| name.to_string_lossy().into_owned());

        self.upload_bytes(bytes, &mime_type, &file_name).await
    }

    /// Uploads in-memory content. Empty content is passed through.
    ///
    /// # Errors
    ///
    /// [`Error::Media`] if the content is over the size limit for
    /// `mime_type`, otherwise the transport error.
    pub async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        file_name: &str,
    ) -> Result<MediaUpload> {
        check_size(mime_type, bytes.len() as u64)?;
        let size = bytes.len();

        let form = MultipartForm::new()
            .text("messaging_product", "whatsapp")
            .text("type", mime_type)
            .file(FilePart {
                field_name: "file".to_string(),
                file_name: file_name.to_string(),
                mime_type: mime_type.to_string(),
                bytes,
            });
        let spec = RequestSpec::post(format!("{}/media", self.phone_number_id)).with_multipart(form);
        let upload: MediaUpload = self.transport.execute_as(spec, "media upload").await?;

        tracing::info!(media_id = %upload.id, mime_type, size, "Media uploaded");
        Ok(upload)
    }

    /// Looks up stored media.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a blank id, otherwise the transport error.
    pub async fn get_info(&self, media_id: &str) -> Result<MediaInfo> {
        check_media_id(media_id)?;
        self.transport
            .execute_as(RequestSpec::get(media_id), "media info")
            .await
    }

    /// Returns the temporary download URL of stored media.
    ///
    /// # Errors
    ///
    /// See [`get_info`](Self::get_info).
    pub async fn get_url(&self, media_id: &str) -> Result<String> {
        Ok(self.get_info(media_id).await?.url)
    }

    /// Fetches the content of stored media.
    ///
    /// # Errors
    ///
    /// [`Error::Media`] if the reported URL is malformed, otherwise the
    /// lookup or download error.
    pub async fn download(&self, media_id: &str) -> Result<Vec<u8>> {
        let info = self.get_info(media_id).await?;
        let url = Url::parse(&info.url)
            .map_err(|e| for_media(format!("Invalid media URL {:?}: {e}", info.url), media_id))?;

        let bytes = self.transport.download(&url).await?;
        tracing::debug!(media_id, size = bytes.len(), "Media downloaded");
        Ok(bytes)
    }

    /// Downloads media into `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`Error::Media`] if the directory or file cannot be written,
    /// otherwise see [`download`](Self::download).
    pub async fn download_to_file(&self, media_id: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let bytes = self.download(media_id).await?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                for_media(format!("Cannot create directory {}: {e}", parent.display()), media_id)
            })?;
        }
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| for_media(format!("Cannot write {}: {e}", path.display()), media_id))?;

        Ok(path.to_path_buf())
    }

    /// Deletes stored media and returns the API's `success` flag.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a blank id, otherwise the transport error.
    pub async fn delete(&self, media_id: &str) -> Result<bool> {
        check_media_id(media_id)?;
        let flag: SuccessFlag = self
            .transport
            .execute_as(RequestSpec::delete(media_id), "media deletion")
            .await?;
        Ok(flag.success)
    }
}
