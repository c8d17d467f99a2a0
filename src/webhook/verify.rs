//! Authenticity checks for inbound webhook calls.

use hmac::{Hmac, Mac};
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{Error, Result};

use super::event::{WebhookEvent, parse_payload};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature on webhook `POST`s.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Mode value sent with a subscription handshake.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Verifies webhook signatures and subscription handshakes.
///
/// The two checks guard different things and use different secrets: the
/// app secret authenticates each `POST` body, and the verify token
/// authenticates the one-time `GET` made while registering the endpoint.
#[derive(Debug, Clone, Default)]
pub struct WebhookVerifier {
    app_secret: Option<SecretString>,
    verify_token: Option<SecretString>,
}

impl WebhookVerifier {
    /// Creates a verifier. Either secret may be absent.
    #[must_use]
    pub const fn new(app_secret: Option<SecretString>, verify_token: Option<SecretString>) -> Self {
        Self {
            app_secret,
            verify_token,
        }
    }

    fn app_secret(&self) -> Result<&str> {
        self.app_secret
            .as_ref()
            .map(|secret| secret.expose_secret().as_str())
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                Error::Webhook("app secret is required for webhook signature verification".to_string())
            })
    }

    /// Checks `signature` against the HMAC-SHA256 of `payload`.
    ///
    /// `signature` is the hex digest, optionally prefixed with `sha256=`.
    /// The comparison runs in constant time. A header that is not valid hex
    /// is simply a mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Webhook`] if no app secret is configured.
    pub fn verify_signature(&self, signature: &str, payload: &[u8]) -> Result<bool> {
        let secret = self.app_secret()?;

        let signature = signature.trim();
        let signature = signature.strip_prefix("sha256=").unwrap_or(signature);
        let Ok(provided) = hex::decode(signature) else {
            return Ok(false);
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| Error::Webhook("app secret cannot be used as an HMAC key".to_string()))?;
        mac.update(payload);

        Ok(mac.verify_slice(&provided).is_ok())
    }

    /// Checks the `X-Hub-Signature-256` header of a request.
    ///
    /// A missing or non-ASCII header is a mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Webhook`] if no app secret is configured.
    pub fn verify_request(&self, headers: &HeaderMap, payload: &[u8]) -> Result<bool> {
        match headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some(signature) => self.verify_signature(signature, payload),
            None => {
                self.app_secret()?;
                tracing::debug!("Webhook request has no signature header");
                Ok(false)
            }
        }
    }

    /// Returns true iff `token` equals the configured verify token.
    ///
    /// With no verify token configured every token is refused.
    #[must_use]
    pub fn verify_handshake_token(&self, token: &str) -> bool {
        match self
            .verify_token
            .as_ref()
            .map(|expected| expected.expose_secret().as_str())
            .filter(|expected| !expected.is_empty())
        {
            Some(expected) => token == expected,
            None => {
                tracing::warn!("Webhook verify token not configured, refusing handshake");
                false
            }
        }
    }

    /// Returns the challenge to echo for a subscription handshake.
    ///
    /// `None` means the endpoint must refuse the handshake: the token did
    /// not match, no challenge was sent, or the mode is not `subscribe`.
    #[must_use]
    pub fn handshake_response(&self, query: &HandshakeQuery) -> Option<String> {
        if query.mode.as_deref().is_some_and(|mode| mode != SUBSCRIBE_MODE) {
            tracing::debug!(mode = ?query.mode, "Unexpected handshake mode");
            return None;
        }

        let token = query.verify_token.as_deref()?;
        if !self.verify_handshake_token(token) {
            return None;
        }

        query.challenge.clone()
    }

    /// Verifies a `POST` and normalizes its body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Webhook`] if no app secret is configured, the
    /// signature is missing or wrong, or the body is not a webhook payload.
    pub fn verify_and_parse(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookEvent> {
        if !self.verify_request(headers, body)? {
            return Err(Error::Webhook("Invalid webhook signature".to_string()));
        }

        parse_payload(body).map(WebhookEvent::from_payload)
    }
}

/// Query parameters of a subscription handshake `GET`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeQuery {
    /// `hub.mode`
    pub mode: Option<String>,
    /// `hub.verify_token`
    pub verify_token: Option<String>,
    /// `hub.challenge`
    pub challenge: Option<String>,
}

impl HandshakeQuery {
    /// Parses a URL query string such as
    /// `hub.mode=subscribe&hub.verify_token=abc&hub.challenge=123`.
    ///
    /// Unknown parameters are ignored; a leading `?` is allowed.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "hub.mode" => parsed.mode = Some(value.into_owned()),
                "hub.verify_token" => parsed.verify_token = Some(value.into_owned()),
                "hub.challenge" => parsed.challenge = Some(value.into_owned()),
                _ => {}
            }
        }

        parsed
    }

    /// Parses the query part of a full callback URL.
    #[must_use]
    pub fn from_url(url: &url::Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }
}

/// Computes the `sha256=<hex>` signature header value for `payload`.
///
/// Useful for signing fixtures and for replaying captured payloads.
///
/// # Errors
///
/// Returns [`Error::Webhook`] if `app_secret` is empty.
pub fn sign_payload(app_secret: &SecretString, payload: &[u8]) -> Result<String> {
    let secret = app_secret.expose_secret();
    if secret.is_empty() {
        return Err(Error::Webhook("app secret must not be empty".to_string()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::Webhook("app secret cannot be used as an HMAC key".to_string()))?;
    mac.update(payload);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}
