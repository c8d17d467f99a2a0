//! Client facade tying credentials, transport and services together.

use std::fmt;

use secrecy::SecretString;

use crate::config::ValidatedConfig;
use crate::error::{Error, Result};
use crate::media::Media;
use crate::messages::Messages;
use crate::templates::Templates;
use crate::time::TokioSleeper;
use crate::transport::{ReqwestClient, Transport, TransportSettings};
use crate::webhook::WebhookVerifier;

/// Account identity and secrets for one WhatsApp business phone number.
///
/// Values are fixed at construction. Secrets are held as [`SecretString`]
/// and never appear in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    phone_number_id: String,
    access_token: SecretString,
    app_secret: Option<SecretString>,
    webhook_verify_token: Option<SecretString>,
    business_account_id: Option<String>,
}

impl Credentials {
    /// Creates credentials with the two required values.
    pub fn new(phone_number_id: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            phone_number_id: phone_number_id.into(),
            access_token,
            app_secret: None,
            webhook_verify_token: None,
            business_account_id: None,
        }
    }

    /// Sets the app secret used to check webhook signatures.
    #[must_use]
    pub fn with_app_secret(mut self, secret: SecretString) -> Self {
        self.app_secret = Some(secret);
        self
    }

    /// Sets the token echoed back during the webhook handshake.
    #[must_use]
    pub fn with_webhook_verify_token(mut self, token: SecretString) -> Self {
        self.webhook_verify_token = Some(token);
        self
    }

    /// Sets the business account id that owns message templates.
    #[must_use]
    pub fn with_business_account_id(mut self, id: impl Into<String>) -> Self {
        self.business_account_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn phone_number_id(&self) -> &str {
        &self.phone_number_id
    }

    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    #[must_use]
    pub const fn app_secret(&self) -> Option<&SecretString> {
        self.app_secret.as_ref()
    }

    #[must_use]
    pub const fn webhook_verify_token(&self) -> Option<&SecretString> {
        self.webhook_verify_token.as_ref()
    }

    #[must_use]
    pub fn business_account_id(&self) -> Option<&str> {
        self.business_account_id.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &"[REDACTED]")
            .field("app_secret", &self.app_secret.as_ref().map(|_| "[REDACTED]"))
            .field(
                "webhook_verify_token",
                &self.webhook_verify_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("business_account_id", &self.business_account_id)
            .finish()
    }
}

/// Entry point for the Cloud API.
///
/// Owns one [`Transport`] (and therefore one rate limiter) shared by every
/// service handle it hands out.
///
/// # Example
///
/// ```no_run
/// use secrecy::SecretString;
/// use whatsapp_cloud::transport::TransportSettings;
/// use whatsapp_cloud::{Credentials, WhatsAppClient};
///
/// # async fn example() -> whatsapp_cloud::Result<()> {
/// let credentials = Credentials::new("1234567890", SecretString::new("EAAG...".into()));
/// let client = WhatsAppClient::new(credentials, &TransportSettings::default())?;
///
/// let sent = client.messages().send_text("+15550100123", "Hello").await?;
/// println!("queued {}", sent.message_id().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WhatsAppClient<H = ReqwestClient, S = TokioSleeper> {
    credentials: Credentials,
    transport: Transport<H, S>,
    verifier: WebhookVerifier,
}

impl WhatsAppClient {
    /// Creates a client backed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be initialized,
    /// or [`Error::Validation`] if the access token is not a valid header
    /// value.
    pub fn new(credentials: Credentials, settings: &TransportSettings) -> Result<Self> {
        let client = ReqwestClient::from_settings(settings).map_err(|e| Error::Network {
            message: "Could not initialize HTTP client".to_string(),
            source: Some(e),
        })?;
        Self::with_http_client(credentials, settings, client)
    }

    /// Creates a client from fully resolved configuration.
    ///
    /// # Errors
    ///
    /// See [`WhatsAppClient::new`].
    pub fn from_config(config: &ValidatedConfig) -> Result<Self> {
        Self::new(config.credentials.clone(), &config.transport)
    }
}

impl<H> WhatsAppClient<H, TokioSleeper> {
    /// Creates a client on top of any [`HttpClient`](crate::transport::HttpClient).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the access token is not a valid
    /// header value.
    pub fn with_http_client(
        credentials: Credentials,
        settings: &TransportSettings,
        client: H,
    ) -> Result<Self> {
        let transport = Transport::new(client, settings, credentials.access_token())?;
        let verifier = WebhookVerifier::new(
            credentials.app_secret().cloned(),
            credentials.webhook_verify_token().cloned(),
        );

        tracing::debug!(
            phone_number_id = %credentials.phone_number_id(),
            api_version = %settings.api_version,
            "WhatsApp client created"
        );

        Ok(Self {
            credentials,
            transport,
            verifier,
        })
    }
}

impl<H, S> WhatsAppClient<H, S> {
    /// Replaces the sleeper used for backoff and throttling delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> WhatsAppClient<H, S2> {
        WhatsAppClient {
            credentials: self.credentials,
            transport: self.transport.with_sleeper(sleeper),
            verifier: self.verifier,
        }
    }

    /// Message sending for the configured phone number.
    #[must_use]
    pub fn messages(&self) -> Messages<'_, H, S> {
        Messages::new(&self.transport, self.credentials.phone_number_id())
    }

    /// Media upload, lookup and download.
    #[must_use]
    pub fn media(&self) -> Media<'_, H, S> {
        Media::new(&self.transport, self.credentials.phone_number_id())
    }

    /// Template management for the configured business account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when no business account id is set.
    pub fn templates(&self) -> Result<Templates<'_, H, S>> {
        let waba = self.credentials.business_account_id().ok_or_else(|| {
            Error::validation(
                "business_account_id",
                "required for template management",
            )
        })?;
        Ok(Templates::new(
            &self.transport,
            waba,
            self.credentials.phone_number_id(),
        ))
    }

    /// Webhook signature and handshake checks.
    #[must_use]
    pub const fn webhooks(&self) -> &WebhookVerifier {
        &self.verifier
    }

    #[must_use]
    pub const fn transport(&self) -> &Transport<H, S> {
        &self.transport
    }

    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns `{api_version}/{phone_number_id}`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!(
            "{}/{}",
            self.transport.api_version().trim_matches('/'),
            self.credentials.phone_number_id()
        )
    }
}
