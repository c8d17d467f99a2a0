//! Production HTTP client implementation using reqwest.

use std::sync::Arc;

use tokio::sync::Semaphore;

use super::{HttpBody, HttpClient, HttpError, HttpRequest, HttpResponse, MultipartForm, TransportSettings};

/// Production HTTP client using reqwest.
///
/// A thin wrapper around `reqwest::Client` that implements [`HttpClient`].
/// The underlying connection pool is shared by clones; concurrent in-flight
/// requests are capped by a semaphore sized from
/// [`TransportSettings::max_connections`].
///
/// # Example
///
/// ```no_run
/// use whatsapp_cloud::transport::{HttpClient, HttpRequest, ReqwestClient, TransportSettings};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::from_settings(&TransportSettings::default())?;
/// let url = Url::parse("https://graph.facebook.com/v23.0/me")?;
/// let response = client.request(HttpRequest::get(url)).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    connections: Arc<Semaphore>,
}

impl ReqwestClient {
    /// Builds a client from transport settings.
    ///
    /// Applies the request timeout, TLS verification flag, and idle pool
    /// size; redirects are followed with reqwest's default policy.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if the TLS backend cannot be
    /// initialized.
    pub fn from_settings(settings: &TransportSettings) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .timeout(settings.timeout)
            .pool_max_idle_per_host(settings.pool_size)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;

        Ok(Self::from_client(inner, settings.max_connections()))
    }

    /// Creates an HTTP client from an existing reqwest client.
    ///
    /// `max_connections` bounds concurrent in-flight requests; zero is
    /// treated as one.
    #[must_use]
    pub fn from_client(client: reqwest::Client, max_connections: usize) -> Self {
        Self {
            inner: client,
            connections: Arc::new(Semaphore::new(max_connections.max(1))),
        }
    }

    /// Returns how many more requests may start right now.
    #[must_use]
    pub fn available_connections(&self) -> usize {
        self.connections.available_permits()
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, HttpError> {
    let mut out = reqwest::multipart::Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }

    if let Some(file) = form.file {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;
        out = out.part(file.field_name, part);
    }

    Ok(out)
}

fn map_send_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else {
        HttpError::connection(e)
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let _permit = self
            .connections
            .acquire()
            .await
            .map_err(HttpError::connection)?;

        let mut builder = self.inner.request(req.method, req.url.as_str());

        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        match req.body {
            Some(HttpBody::Bytes(bytes)) => builder = builder.body(bytes),
            Some(HttpBody::Multipart(form)) => builder = builder.multipart(to_reqwest_form(form)?),
            None => {}
        }

        let response = builder.send().await.map_err(map_send_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(map_send_error)?
            .to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}
