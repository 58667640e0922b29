//! Typed routes, request building and response classification for the login API.
//!
//! # Overview
//! A `Route` describes one endpoint. `ApiClient` turns it into an
//! `HttpRequest`, hands that to a `Session` for the network round-trip, and
//! classifies the `RawResponse` into an `Outcome`: a success, a domain
//! failure carrying the decoded entity, or a transport error.
//!
//! # Design
//! - Building is pure apart from reading the access token; the same route
//!   built twice yields the same request.
//! - The network sits behind the `Session` trait. `ReqwestSession` is the
//!   real one and `StubSession` replays scripted replies.
//! - Only request building fails synchronously. After dispatch every result,
//!   including network and decode errors, arrives as exactly one `Outcome`.
//! - Entities are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod outcome;
pub mod route;
pub mod session;
pub mod types;

pub use auth::{NoToken, StaticToken, TokenProvider};
pub use client::{ApiClient, RequestHandle};
pub use config::ClientConfig;
pub use entity::{Entity, Validation};
pub use error::{BuildError, TransportError};
pub use http::{HttpMethod, HttpRequest, RawResponse};
pub use outcome::{classify, Outcome};
pub use route::{ContentType, LoginRoute, Params, RequestSettings, Route, RouteExt};
pub use session::{ReqwestSession, Session, SessionConfig, StubSession};
pub use types::LoginEntity;
