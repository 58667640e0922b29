//! Typed endpoint descriptions.
//!
//! # Design
//! A route is an immutable value; everything needed to build its request
//! comes out of `Route::settings`. Routes never see the base address or the
//! token. Those belong to `ApiClient`, which keeps the same route reusable
//! across environments.
//!
//! `Params` keeps its entries sorted by key so that building the same route
//! twice yields byte-identical bodies.

use std::collections::BTreeMap;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::client::RequestHandle;
use crate::config;
use crate::entity::Entity;
use crate::error::BuildError;
use crate::http::HttpMethod;
use crate::outcome::Outcome;
use crate::session::Session;
use crate::types::LoginEntity;

/// Declared body format of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// No `content-type` header; body parameters are form-encoded.
    #[default]
    None,
    FormUrlEncoded,
    Json,
}

impl ContentType {
    pub fn mime(self) -> Option<&'static str> {
        match self {
            ContentType::None => None,
            ContentType::FormUrlEncoded => Some("application/x-www-form-urlencoded"),
            ContentType::Json => Some("application/json"),
        }
    }
}

/// Route parameters. An entry may be present-with-a-value or absent.
///
/// Absent entries are dropped before encoding. A present empty string is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, Option<Value>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    pub fn with_optional<V: Into<Value>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key, value.map(Into::into));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<Value>) {
        self.0.insert(key.into(), value);
    }

    /// All entries, including absent ones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries that carry a value, in key order.
    pub fn present(&self) -> BTreeMap<&str, &Value> {
        self.0
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.as_str(), v)))
            .collect()
    }

    /// Present entries as form fields; strings are taken verbatim.
    pub(crate) fn form_pairs(&self) -> Vec<(&str, String)> {
        self.present()
            .into_iter()
            .map(|(key, value)| (key, form_value(value)))
            .collect()
    }

    pub(crate) fn encode_form(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form_pairs())
            .finish()
    }

    pub(crate) fn encode_json(&self) -> String {
        let object: Map<String, Value> = self
            .present()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        Value::Object(object).to_string()
    }
}

/// Unreserved characters stay as-is; everything else, `/` and `%` included,
/// is escaped so a value always stays one segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode `value` for substitution into a path template.
pub fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Everything a route contributes to its request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSettings {
    pub method: HttpMethod,
    /// Path below the base address, parameters already substituted.
    pub path: String,
    pub content_type: ContentType,
    pub params: Params,
    pub needs_access_token: bool,
}

/// One API endpoint and the entity its responses decode into.
pub trait Route: Send + Sync + 'static {
    type Entity: Entity;

    fn settings(&self) -> RequestSettings;

    /// A route-specific session, or `None` for the client's default.
    fn session(&self) -> Option<Arc<dyn Session>> {
        None
    }
}

/// Fire a route through the process-wide default client.
pub trait RouteExt: Route + Sized {
    fn start_request<F>(self, on_complete: F) -> Result<RequestHandle, BuildError>
    where
        F: FnOnce(Outcome<Self::Entity>) + Send + 'static,
    {
        let client = config::default_client().ok_or(BuildError::NoDefaultClient)?;
        client.start_request(self, on_complete)
    }
}

impl<R: Route> RouteExt for R {}

/// Account endpoints of the login service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRoute {
    SignIn { user_id: String, uuid: String },
    ChangePassword { now_password: String, to_password: String },
    SignOut { user_id: String },
}

impl Route for LoginRoute {
    type Entity = LoginEntity;

    fn settings(&self) -> RequestSettings {
        match self {
            LoginRoute::SignIn { user_id, uuid } => RequestSettings {
                method: HttpMethod::Post,
                path: format!("/user/signIn/{}", path_segment(user_id)),
                content_type: ContentType::Json,
                params: Params::new().with("uuid", uuid.as_str()),
                needs_access_token: false,
            },
            LoginRoute::ChangePassword { now_password, to_password } => RequestSettings {
                method: HttpMethod::Post,
                path: "/user/changePassword/".to_string(),
                content_type: ContentType::Json,
                params: Params::new()
                    .with("now_password", now_password.as_str())
                    .with("to_password", to_password.as_str()),
                needs_access_token: false,
            },
            LoginRoute::SignOut { user_id } => RequestSettings {
                method: HttpMethod::Put,
                path: format!("/user/signOut/{}", path_segment(user_id)),
                content_type: ContentType::Json,
                params: Params::new(),
                needs_access_token: false,
            },
        }
    }
}
