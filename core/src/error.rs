//! Error types for the login API client.
//!
//! # Design
//! Two families that never mix. `BuildError` is returned synchronously while a
//! request is being built and never reaches a completion callback.
//! `TransportError` only ever travels inside `Outcome::TransportError`, so a
//! dispatched request has exactly one way to report anything.

use thiserror::Error;

/// Failures while turning a route into an `HttpRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The configured base address is not a well-formed absolute URL.
    #[error("invalid base URL {base_url:?}: {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// The route's path contains a `.` or `..` segment, which URL
    /// resolution would collapse into a different endpoint.
    #[error("invalid path {path:?}: dot segments are not allowed")]
    InvalidPath { path: String },

    /// The process-wide client was used before `config::init_default`.
    #[error("default client has not been initialised")]
    NoDefaultClient,

    /// A background request was started outside a tokio runtime.
    #[error("no tokio runtime is running")]
    NoRuntime,
}

/// Failures after dispatch: network, unexpected status or undecodable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// The server answered with a status the classifier does not handle.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The status was handled but the body did not map onto the entity.
    #[error("response body for HTTP {status} did not decode: {reason}")]
    Decode { status: u16, reason: String },

    /// The session itself could not be constructed.
    #[error("http client unavailable: {0}")]
    Client(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::UnexpectedStatus { status, .. } | TransportError::Decode { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
