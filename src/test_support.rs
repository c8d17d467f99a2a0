//! Shared test doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::{HeaderMap, StatusCode};
use secrecy::SecretString;
use serde_json::Value;

use crate::time::Sleeper;
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse, TransportSettings};

/// Mock HTTP client that returns a configured sequence of responses.
#[derive(Debug)]
pub struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        })
    }

    /// A client answering every call in `statuses` order with an empty body.
    pub fn statuses(statuses: &[u16]) -> Arc<Self> {
        Self::new(
            statuses
                .iter()
                .map(|&status| Ok(response(status, Vec::new())))
                .collect(),
        )
    }

    pub fn json(status: u16, body: &Value) -> Arc<Self> {
        Self::new(vec![Ok(json_response(status, body))])
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.captured_requests()
            .pop()
            .expect("no request was captured")
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        let mut responses = self.responses.lock().unwrap();
        assert!(!responses.is_empty(), "MockClient ran out of responses");
        responses.remove(0)
    }
}

impl HttpClient for Arc<MockClient> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}

pub fn response(status: u16, body: Vec<u8>) -> HttpResponse {
    HttpResponse::new(
        StatusCode::from_u16(status).unwrap(),
        HeaderMap::new(),
        body,
    )
}

pub fn json_response(status: u16, body: &Value) -> HttpResponse {
    response(status, body.to_string().into_bytes())
}

/// Sleeper that returns at once and remembers every requested delay.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Settings with a high rate limit so throttling never dominates a test.
pub fn fast_settings() -> TransportSettings {
    TransportSettings {
        rate_limit: 1000,
        ..TransportSettings::default()
    }
}

pub fn token() -> SecretString {
    SecretString::new("test-token".to_string())
}

/// Parses the JSON body of the last captured request.
pub fn sent_json(mock: &MockClient) -> Value {
    let request = mock.last_request();
    let bytes = request
        .body
        .as_ref()
        .and_then(crate::transport::HttpBody::as_bytes)
        .expect("request had no byte body");
    serde_json::from_slice(bytes).unwrap()
}
