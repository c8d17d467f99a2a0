//! Request execution with rate limiting, retries and error mapping.

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;

use crate::error::{Error, Result};
use crate::time::{Sleeper, TokioSleeper, sleep_or_cancel};

use super::classify::classify;
use super::{
    HttpClient, HttpError, HttpRequest, HttpResponse, IsRetryable, MultipartForm, RateLimiter,
    RetryPolicy, TransportSettings,
};

/// Body of a [`RequestSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as `application/json`
    Json(Value),
    /// Sent as `multipart/form-data`
    Multipart(MultipartForm),
}

/// One logical API call, relative to the versioned base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// HTTP method
    pub method: Method,
    /// Path below `{base_url}/{api_version}/`, e.g. `12345/messages`
    pub endpoint: String,
    /// Optional request body
    pub body: Option<RequestBody>,
    /// Query parameters, appended in order
    pub query: Vec<(String, String)>,
}

impl RequestSpec {
    /// Creates a request with no body and no query parameters.
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            query: Vec::new(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Authenticated request executor for the Graph API.
///
/// Every call first takes a permit from the client's [`RateLimiter`], then
/// makes up to `max_attempts` attempts. Only transient failures (5xx,
/// connection errors, timeouts) are retried, with exponential backoff
/// between attempts. Rate limiting (429), authentication (401/403) and
/// other client errors end the call after a single attempt.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used for backoff delays (defaults to [`TokioSleeper`])
#[derive(Debug)]
pub struct Transport<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    limiter: RateLimiter,
    base_url: Url,
    api_version: String,
    auth: HeaderValue,
    retry_policy: RetryPolicy,
    span: tracing::Span,
}

impl<H> Transport<H, TokioSleeper> {
    /// Creates a transport from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the settings are out of range (see
    /// [`TransportSettings::validate`]) or the access token cannot be
    /// carried in an HTTP header.
    pub fn new(client: H, settings: &TransportSettings, access_token: &SecretString) -> Result<Self> {
        settings.validate()?;
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", access_token.expose_secret()))
            .map_err(|_| {
                Error::validation("access_token", "contains characters not allowed in a header")
            })?;
        auth.set_sensitive(true);

        Ok(Self {
            client,
            sleeper: TokioSleeper,
            limiter: RateLimiter::new(settings.rate_limit),
            base_url: settings.base_url.clone(),
            api_version: settings.api_version.clone(),
            auth,
            retry_policy: RetryPolicy::new().with_max_attempts(settings.max_retries),
            span: tracing::Span::none(),
        })
    }
}

impl<H, S> Transport<H, S> {
    /// Sets a custom sleeper for backoff delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Transport<H, S2> {
        Transport {
            client: self.client,
            sleeper,
            limiter: self.limiter,
            base_url: self.base_url,
            api_version: self.api_version,
            auth: self.auth,
            retry_policy: self.retry_policy,
            span: self.span,
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the span every request is instrumented with.
    #[must_use]
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns the rate limiter shared by all calls.
    #[must_use]
    pub const fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Returns the API version path segment.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn client(&self) -> &H {
        &self.client
    }

    /// Resolves `endpoint` against `{base_url}/{api_version}/`.
    ///
    /// Leading and trailing slashes on each part are normalised.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the result is not a valid URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let version = self.api_version.trim_matches('/');
        let endpoint = endpoint.trim_start_matches('/');

        let raw = if endpoint.is_empty() {
            format!("{base}/{version}")
        } else {
            format!("{base}/{version}/{endpoint}")
        };

        Url::parse(&raw).map_err(|e| Error::validation("endpoint", e.to_string()))
    }

    fn build_request(&self, spec: RequestSpec) -> Result<HttpRequest> {
        let mut url = self.endpoint_url(&spec.endpoint)?;
        if !spec.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&spec.query);
        }

        let request = HttpRequest::new(spec.method, url)
            .with_header(AUTHORIZATION, self.auth.clone())
            .with_header(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(match spec.body {
            Some(RequestBody::Json(value)) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| Error::validation("body", e.to_string()))?;
                request
                    .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .with_body(bytes)
            }
            Some(RequestBody::Multipart(form)) => request.with_multipart(form),
            None => request,
        })
    }
}

impl<H: HttpClient, S: Sleeper> Transport<H, S> {
    /// Executes a request and returns the decoded JSON body.
    ///
    /// An empty success body decodes to [`Value::Null`].
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the request cannot be built
    /// - [`Error::RateLimited`], [`Error::Authentication`] or [`Error::Api`]
    ///   for the corresponding non-success responses
    /// - [`Error::Network`] once retries are exhausted, or if a success body
    ///   is not valid JSON
    pub async fn execute(&self, spec: RequestSpec) -> Result<Value> {
        self.execute_inner(spec, None).await
    }

    /// Like [`execute`](Self::execute), but aborts with [`Error::Cancelled`]
    /// when `cancel` fires during the permit wait, an attempt, or a backoff.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute), plus [`Error::Cancelled`].
    pub async fn execute_or_cancel(
        &self,
        spec: RequestSpec,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        self.execute_inner(spec, Some(cancel)).await
    }

    /// Executes a request and deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); additionally [`Error::Decode`] if the
    /// body does not have the expected shape.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
        context: &'static str,
    ) -> Result<T> {
        let value = self.execute(spec).await?;
        serde_json::from_value(value).map_err(|source| Error::Decode { context, source })
    }

    /// Sends a GET request to `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.execute(RequestSpec::get(endpoint)).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.execute(RequestSpec::post(endpoint).with_json(body)).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn put(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.execute(RequestSpec::put(endpoint).with_json(body)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.execute(RequestSpec::delete(endpoint)).await
    }

    /// Downloads raw bytes from an absolute URL, such as a media URL
    /// returned by the API.
    ///
    /// The request carries the bearer token and goes through the same
    /// rate limiting and retry handling as API calls.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let request = HttpRequest::get(url.clone()).with_header(AUTHORIZATION, self.auth.clone());
        let response = self
            .dispatch(request, None)
            .instrument(self.span.clone())
            .await?;
        Ok(response.body)
    }

    async fn execute_inner(
        &self,
        spec: RequestSpec,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value> {
        let request = self.build_request(spec)?;
        let response = self
            .dispatch(request, cancel)
            .instrument(self.span.clone())
            .await?;
        decode_json(&response)
    }

    async fn dispatch(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse> {
        match cancel {
            Some(token) => self.limiter.acquire_or_cancel(token).await?,
            None => self.limiter.acquire().await,
        }

        let max_attempts = self.retry_policy.max_attempts;
        let mut last_failure: Option<(String, Option<HttpError>)> = None;

        for attempt in 0..max_attempts {
            tracing::debug!(
                method = %request.method,
                path = request.url.path(),
                attempt = attempt + 1,
                max_attempts,
                "Sending request"
            );

            let cause = match self.attempt(request.clone(), cancel).await? {
                Ok(response) => {
                    match classify(response.status, &response.headers, &response.body) {
                        None => return Ok(response),
                        Some(failure) if failure.is_retryable() => (failure.to_string(), None),
                        Some(failure) => {
                            tracing::debug!(status = response.status.as_u16(), %failure, "Request rejected");
                            return Err(failure.into());
                        }
                    }
                }
                Err(e) if e.is_retryable() => (e.to_string(), Some(e)),
                Err(e) => {
                    return Err(Error::Network {
                        message: format!("Request could not be sent: {e}"),
                        source: Some(e),
                    });
                }
            };

            if self.retry_policy.should_retry(attempt) {
                let delay = self.retry_policy.delay_for_retry(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    cause = %cause.0,
                    delay = ?delay,
                    "Request failed, retrying"
                );
                match cancel {
                    Some(token) => sleep_or_cancel(&self.sleeper, delay, token).await?,
                    None => self.sleeper.sleep(delay).await,
                }
            }

            last_failure = Some(cause);
        }

        let error = match last_failure {
            Some((cause, source)) => Error::Network {
                message: format!("Request failed after {max_attempts} attempts: {cause}"),
                source,
            },
            None => Error::Network {
                message: "Request failed for unknown reason".to_string(),
                source: None,
            },
        };
        tracing::error!(error = %error, "Request failed");
        Err(error)
    }

    /// Runs one exchange. The outer `Err` is only ever [`Error::Cancelled`].
    async fn attempt(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<std::result::Result<HttpResponse, HttpError>> {
        match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(Error::Cancelled),
                outcome = self.client.request(request) => Ok(outcome),
            },
            None => Ok(self.client.request(request).await),
        }
    }
}

fn decode_json(response: &HttpResponse) -> Result<Value> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&response.body).map_err(|e| Error::Network {
        message: format!("Invalid JSON in response: {e}"),
        source: None,
    })
}
