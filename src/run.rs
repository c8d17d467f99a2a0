//! Command execution.
//!
//! Each command produces the text printed on stdout. Commands that talk to
//! the API need a [`WhatsAppClient`]; the webhook commands only need the
//! verifier and run without account credentials.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;

use whatsapp_cloud::config::{Command, ValidatedConfig};
use whatsapp_cloud::messages::{MediaSource, MessageContent, OutgoingMessage};
use whatsapp_cloud::time::Sleeper;
use whatsapp_cloud::transport::HttpClient;
use whatsapp_cloud::webhook::{WebhookEvent, WebhookVerifier, parse_payload};
use whatsapp_cloud::{Error, WhatsAppClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The library reported an error.
    #[error(transparent)]
    Client(#[from] Error),

    /// A payload file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    ReadPayload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The signature did not match the payload.
    #[error("Signature does not match payload")]
    SignatureMismatch,

    /// The handshake token did not match the configured token.
    #[error("Verify token does not match")]
    TokenMismatch,

    /// The API did not acknowledge the operation.
    #[error("{0} was not acknowledged by the API")]
    NotAcknowledged(&'static str),

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Render(#[source] serde_json::Error),

    /// The command is handled before execution starts.
    #[error("{0} cannot run here")]
    Unsupported(&'static str),
}

/// Builds the client and runs an API command.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the command fails.
///
/// Excluded from coverage - requires network access.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig, command: Command) -> Result<String, RunError> {
    let client = WhatsAppClient::from_config(&config)?;
    dispatch(&client, command).await
}

/// Runs `command` against `client`.
///
/// # Errors
///
/// Returns the client error, or a [`RunError`] describing why the result
/// counts as a failure.
pub async fn dispatch<H: HttpClient, S: Sleeper>(
    client: &WhatsAppClient<H, S>,
    command: Command,
) -> Result<String, RunError> {
    match command {
        Command::SendText {
            to,
            body,
            preview_url,
        } => {
            let message = OutgoingMessage::new(&to, MessageContent::text(body, preview_url)?)?;
            let sent = client.messages().send(&message).await?;
            Ok(sent.message_id().unwrap_or_default().to_string())
        }
        Command::SendImage { to, image, caption } => {
            let sent = client
                .messages()
                .send_image(&to, MediaSource::parse(&image), caption.as_deref())
                .await?;
            Ok(sent.message_id().unwrap_or_default().to_string())
        }
        Command::MarkRead { message_id } => {
            if client.messages().mark_as_read(&message_id).await? {
                Ok(format!("Marked {message_id} as read"))
            } else {
                Err(RunError::NotAcknowledged("mark-read"))
            }
        }
        Command::Upload { path, mime_type } => {
            let uploaded = client.media().upload(&path, mime_type.as_deref()).await?;
            Ok(uploaded.id)
        }
        Command::MediaUrl { media_id } => Ok(client.media().get_url(&media_id).await?),
        Command::Download { media_id, output } => {
            let written = client.media().download_to_file(&media_id, &output).await?;
            Ok(format!("Saved {media_id} to {}", written.display()))
        }
        Command::DeleteMedia { media_id } => {
            if client.media().delete(&media_id).await? {
                Ok(format!("Deleted {media_id}"))
            } else {
                Err(RunError::NotAcknowledged("delete-media"))
            }
        }
        Command::ListTemplates => {
            let templates = client.templates()?.list().await?;
            Ok(render_templates(&templates))
        }
        Command::Init { .. } => Err(RunError::Unsupported("init")),
        offline => run_offline(client.webhooks(), &offline),
    }
}

/// Runs one of the webhook commands.
///
/// # Errors
///
/// Returns [`RunError::SignatureMismatch`] or [`RunError::TokenMismatch`]
/// when a check fails, or the read/parse error for a payload file.
pub fn run_offline(verifier: &WebhookVerifier, command: &Command) -> Result<String, RunError> {
    match command {
        Command::VerifySignature { signature, payload } => {
            let body = read_payload(payload)?;
            if verifier.verify_signature(signature, &body)? {
                Ok("Signature valid".to_string())
            } else {
                Err(RunError::SignatureMismatch)
            }
        }
        Command::VerifyToken { token } => {
            if verifier.verify_handshake_token(token) {
                Ok("Verify token valid".to_string())
            } else {
                Err(RunError::TokenMismatch)
            }
        }
        Command::ParseWebhook { payload } => {
            let body = read_payload(payload)?;
            let event = WebhookEvent::from_payload(parse_payload(&body)?);
            tracing::debug!(
                messages = event.messages.len(),
                statuses = event.statuses.len(),
                errors = event.errors.len(),
                "Webhook payload parsed"
            );
            serde_json::to_string_pretty(&event).map_err(RunError::Render)
        }
        _ => Err(RunError::Unsupported("API command")),
    }
}

fn read_payload(path: &Path) -> Result<Vec<u8>, RunError> {
    std::fs::read(path).map_err(|source| RunError::ReadPayload {
        path: path.to_path_buf(),
        source,
    })
}

fn render_templates(templates: &[whatsapp_cloud::templates::TemplateInfo]) -> String {
    let mut out = String::new();
    for template in templates {
        let _ = writeln!(
            out,
            "{}\t{}\t{:?}\t{}",
            template.name.as_deref().unwrap_or(&template.id),
            template.language.as_deref().unwrap_or("-"),
            template.status,
            template
                .category
                .map_or_else(|| "-".to_string(), |c| format!("{c:?}")),
        );
    }
    out.trim_end().to_string()
}
