//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// wa-cloud: WhatsApp Cloud API command-line client
///
/// Sends messages, manages media and templates, and checks webhook
/// deliveries. Secrets are read from `WHATSAPP_*` environment variables
/// or the config file.
#[derive(Debug, Parser)]
#[command(name = "wa-cloud")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Business phone number id
    #[arg(long = "phone-number-id", global = true)]
    pub phone_number_id: Option<String>,

    /// WhatsApp Business Account id (template commands)
    #[arg(long = "business-account-id", global = true)]
    pub business_account_id: Option<String>,

    /// Graph API version, e.g. v23.0
    #[arg(long = "api-version", global = true)]
    pub api_version: Option<String>,

    /// API root URL
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Attempts per request
    #[arg(long = "max-retries", global = true)]
    pub max_retries: Option<u32>,

    /// Outbound calls per second
    #[arg(long = "rate-limit", global = true)]
    pub rate_limit: Option<u32>,

    /// Idle connections per host
    #[arg(long = "pool-size", global = true)]
    pub pool_size: Option<usize>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for wa-cloud
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Send a text message
    SendText {
        /// Recipient phone number
        to: String,
        /// Message body
        body: String,
        /// Show a link preview for the first URL in the body
        #[arg(long = "preview-url")]
        preview_url: bool,
    },

    /// Send an image by media id or URL
    SendImage {
        /// Recipient phone number
        to: String,
        /// Media id, or an http(s) link
        image: String,
        /// Optional caption
        #[arg(long)]
        caption: Option<String>,
    },

    /// Mark an incoming message as read
    MarkRead {
        /// Incoming message id (wamid)
        message_id: String,
    },

    /// Upload a file and print its media id
    Upload {
        /// File to upload
        path: PathBuf,
        /// MIME type (guessed from the extension when omitted)
        #[arg(long = "mime-type")]
        mime_type: Option<String>,
    },

    /// Print the temporary download URL of media
    MediaUrl {
        /// Media id
        media_id: String,
    },

    /// Download media to a file
    Download {
        /// Media id
        media_id: String,
        /// Destination path
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Delete uploaded media
    DeleteMedia {
        /// Media id
        media_id: String,
    },

    /// List message templates of the business account
    ListTemplates,

    /// Check an X-Hub-Signature-256 value against a payload file
    VerifySignature {
        /// Header value, `sha256=<hex>`
        signature: String,
        /// File with the raw request body
        payload: PathBuf,
    },

    /// Check a webhook subscription verify token
    VerifyToken {
        /// Token received in `hub.verify_token`
        token: String,
    },

    /// Parse a webhook payload file and print its events
    ParseWebhook {
        /// File with the raw request body
        payload: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Like [`parse_from_iter`](Self::parse_from_iter) but returns the
    /// clap error instead of exiting.
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments or `--help`.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }

    /// Returns true if the command only needs webhook secrets.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        matches!(
            self.command,
            Command::VerifySignature { .. } | Command::VerifyToken { .. } | Command::ParseWebhook { .. }
        )
    }
}
