//! Sessions perform the network I/O for a built request.
//!
//! # Design
//! `Session` is the only seam that touches the network. `ReqwestSession` is
//! the production implementation; `StubSession` answers from a script and
//! records what it was sent, for tests and offline development.
//!
//! A session reports either a `RawResponse` (any status) or a
//! `TransportError`. It never interprets status codes; that is the
//! classifier's job.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, RawResponse};

/// Default timeout applied to every request of a `ReqwestSession`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Dispatches one request and completes exactly once.
#[async_trait]
pub trait Session: Send + Sync {
    async fn dispatch(&self, request: HttpRequest) -> Result<RawResponse, TransportError>;
}

/// Connection-level settings for a `ReqwestSession`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub timeout: Option<Duration>,
    /// Sent with every request of the session, e.g. per-endpoint headers.
    pub default_headers: Vec<(String, String)>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            default_headers: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }
}

/// Session backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestSession {
    http: reqwest::Client,
}

impl ReqwestSession {
    pub fn new(config: &SessionConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Client(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Client(format!("header value for {name}: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Session for ReqwestSession {
    async fn dispatch(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.http.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;
        debug!(status, url = %request.url, "response received");

        Ok(RawResponse { status, headers, body })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Scripted session: replies in order and keeps a log of requests.
///
/// Clones share the same script and log. Once the script runs out every
/// further dispatch fails with `TransportError::Network`.
#[derive(Debug, Clone, Default)]
pub struct StubSession {
    state: Arc<Mutex<StubState>>,
}

#[derive(Debug, Default)]
struct StubState {
    replies: VecDeque<Result<RawResponse, TransportError>>,
    requests: Vec<HttpRequest>,
    delay: Option<Duration>,
}

impl StubSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, status: u16, body: impl Into<String>) -> Self {
        self.lock().replies.push_back(Ok(RawResponse::new(status, body)));
        self
    }

    pub fn with_error(self, error: TransportError) -> Self {
        self.lock().replies.push_back(Err(error));
        self
    }

    /// Hold every reply back for `delay` before completing.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.lock().delay = Some(delay);
        self
    }

    /// Requests dispatched so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Session for StubSession {
    async fn dispatch(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let (reply, delay) = {
            let mut state = self.lock();
            state.requests.push(request);
            (state.replies.pop_front(), state.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply.unwrap_or_else(|| Err(TransportError::Network("stub session has no scripted reply".to_string())))
    }
}
