//! Request building and dispatch for typed routes.
//!
//! # Design
//! `ApiClient` holds the base address, a token provider and the default
//! session. It is immutable once built and cheap to clone; every call owns
//! its own request, response and outcome.
//!
//! Three entry points share one pipeline:
//! - `build_request` turns a route into an `HttpRequest` with no I/O.
//! - `send` builds, dispatches and classifies, returning the outcome.
//! - `start_request` does the same on a spawned task and hands the outcome to
//!   a callback exactly once, unless the request is cancelled first.
//!
//! Building is the only step that can fail synchronously. Once a request has
//! been dispatched every failure arrives as `Outcome::TransportError`.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{NoToken, TokenProvider, ACCESS_TOKEN_HEADER};
use crate::config::ClientConfig;
use crate::entity::Entity;
use crate::error::{BuildError, TransportError};
use crate::http::HttpRequest;
use crate::outcome::{classify_response, Outcome};
use crate::route::{ContentType, Route};
use crate::session::{ReqwestSession, Session};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Arc<dyn TokenProvider>,
    session: Arc<dyn Session>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// A client that dispatches through `session` and sends no token.
    ///
    /// `base_url` is only validated when a request is built.
    pub fn new(base_url: &str, session: Arc<dyn Session>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(NoToken),
            session,
        }
    }

    /// A client backed by a `ReqwestSession` built from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let session = ReqwestSession::new(&config.session_config())?;
        Ok(Self::new(&config.base_url, Arc::new(session)))
    }

    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token = provider;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// Build the request for `route`.
    ///
    /// Absent parameters are dropped. `GET` and `DELETE` carry the rest in the
    /// query string; other methods encode them as the body according to the
    /// route's content type. No parameters means no body.
    pub fn build_request<R: Route>(&self, route: &R) -> Result<HttpRequest, BuildError> {
        let settings = route.settings();
        let mut url = self.resolve_url(&settings.path)?;

        let mut headers = Vec::new();
        if let Some(mime) = settings.content_type.mime() {
            headers.push(("content-type".to_string(), mime.to_string()));
        }
        if settings.needs_access_token {
            match self.token.current_token() {
                Some(token) => headers.push((ACCESS_TOKEN_HEADER.to_string(), token)),
                None => warn!(path = %settings.path, "route requires an access token but none is available"),
            }
        }

        let params = &settings.params;
        let body = if params.present().is_empty() {
            None
        } else if settings.method.encodes_in_query() {
            url.query_pairs_mut().extend_pairs(params.form_pairs());
            None
        } else {
            match settings.content_type {
                ContentType::Json => Some(params.encode_json()),
                ContentType::FormUrlEncoded | ContentType::None => Some(params.encode_form()),
            }
        };

        let request = HttpRequest {
            method: settings.method,
            url: url.to_string(),
            headers,
            body,
        };
        debug!(
            method = %request.method,
            url = %request.url,
            authenticated = request.header(ACCESS_TOKEN_HEADER).is_some(),
            "request built"
        );
        Ok(request)
    }

    /// Build, dispatch and classify `route`.
    pub async fn send<R: Route>(&self, route: &R) -> Result<Outcome<R::Entity>, BuildError> {
        let request = self.build_request(route)?;
        let session = self.session_for(route);
        Ok(dispatch(session, request).await)
    }

    /// Dispatch `route` in the background and deliver its outcome to
    /// `on_complete`.
    ///
    /// Must be called from within a tokio runtime. The callback runs on the
    /// runtime at most once: exactly once if the request completes, never if
    /// it is cancelled through the returned handle first.
    pub fn start_request<R, F>(&self, route: R, on_complete: F) -> Result<RequestHandle, BuildError>
    where
        R: Route,
        F: FnOnce(Outcome<R::Entity>) + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BuildError::NoRuntime)?;
        let request = self.build_request(&route)?;
        let session = self.session_for(&route);

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let task = runtime.spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = cancelled.cancelled() => None,
                outcome = dispatch::<R::Entity>(session, request) => Some(outcome),
            };
            match outcome {
                Some(outcome) if !cancelled.is_cancelled() => {
                    on_complete(outcome);
                    true
                }
                _ => {
                    debug!("request cancelled, completion dropped");
                    false
                }
            }
        });

        Ok(RequestHandle { token, task })
    }

    fn session_for<R: Route>(&self, route: &R) -> Arc<dyn Session> {
        route.session().unwrap_or_else(|| Arc::clone(&self.session))
    }

    /// Append `path` to the base address, keeping any path the base carries.
    ///
    /// Dot segments in `path` are rejected; URL resolution would otherwise
    /// fold them into a different endpoint.
    fn resolve_url(&self, path: &str) -> Result<Url, BuildError> {
        if path.split('/').any(is_dot_segment) {
            return Err(BuildError::InvalidPath {
                path: path.to_string(),
            });
        }
        let invalid = |reason: String| BuildError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("cannot be used as a base".to_string()));
        }
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        Ok(url)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
    )
}

async fn dispatch<E: Entity>(session: Arc<dyn Session>, request: HttpRequest) -> Outcome<E> {
    classify_response(session.dispatch(request).await)
}

/// Handle to a request started with `ApiClient::start_request`.
///
/// Dropping the handle detaches the request; it still completes and its
/// callback still fires.
#[derive(Debug)]
pub struct RequestHandle {
    token: CancellationToken,
    task: JoinHandle<bool>,
}

impl RequestHandle {
    /// Cancel the request. If the callback has not run yet it never will.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the request to settle. Returns whether the callback fired.
    pub async fn wait(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}
