//! Access-token source consulted while building authenticated requests.
//!
//! The client never stores, refreshes or expires tokens; it asks the provider
//! each time a route needs one.

/// Header carrying the token on authenticated routes.
pub const ACCESS_TOKEN_HEADER: &str = "access-token";

pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// Provider for clients that never authenticate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn current_token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, e.g. one loaded from configuration at startup.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl TokenProvider for StaticToken {
    fn current_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_token(&self) -> Option<String> {
        self()
    }
}
