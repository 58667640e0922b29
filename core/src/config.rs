//! Client configuration and the process-wide default client.
//!
//! # Design
//! The default client lives in a set-once cell. It is installed explicitly
//! with `init_default` at startup and is read-only afterwards; there is no
//! implicit construction and no way to swap it later. Code that needs a
//! different client passes an `ApiClient` around instead.

use std::time::Duration;

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::client::ApiClient;
use crate::session::{SessionConfig, DEFAULT_TIMEOUT};

pub const DEFAULT_BASE_URL: &str = "https://example.com";

/// Overrides `ClientConfig::base_url`.
pub const BASE_URL_ENV: &str = "LOGIN_API_BASE_URL";

/// Overrides `ClientConfig::timeout`, in whole seconds; `0` disables it.
pub const TIMEOUT_ENV: &str = "LOGIN_API_TIMEOUT_SECS";

static DEFAULT_CLIENT: OnceCell<ApiClient> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            default_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `LOGIN_API_BASE_URL` and `LOGIN_API_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.timeout = None,
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid {TIMEOUT_ENV}"),
            }
        }
        config
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: self.timeout,
            default_headers: self.default_headers.clone(),
        }
    }
}

/// Install the process-wide default client.
///
/// Succeeds once. Later calls hand their client back unchanged.
pub fn init_default(client: ApiClient) -> Result<(), ApiClient> {
    DEFAULT_CLIENT.set(client)
}

pub fn default_client() -> Option<&'static ApiClient> {
    DEFAULT_CLIENT.get()
}
