//! Classification of a completed exchange into exactly one `Outcome`.
//!
//! | status | body decodes | `validate()` | outcome          |
//! |--------|--------------|--------------|------------------|
//! | 200    | yes          | invalid      | `Failure`        |
//! | 200    | yes          | valid        | `Success`        |
//! | 400    | yes          | (ignored)    | `Failure`        |
//! | 200/400| no           |              | `TransportError` |
//! | other  |              |              | `TransportError` |
//!
//! A body that fails to decode is never reported as a domain failure.

use crate::entity::{decode, Entity};
use crate::error::TransportError;
use crate::http::RawResponse;

pub const SUCCESS_STATUS: u16 = 200;
pub const CLIENT_ERROR_STATUS: u16 = 400;

/// Result delivered for a dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<E> {
    /// 200 with a body that decoded and validated.
    Success(E),
    /// The server reported a domain failure, or a 200 body failed validation.
    Failure(E),
    TransportError(TransportError),
}

impl<E> Outcome<E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// The decoded entity, for both successes and domain failures.
    pub fn entity(&self) -> Option<&E> {
        match self {
            Outcome::Success(entity) | Outcome::Failure(entity) => Some(entity),
            Outcome::TransportError(_) => None,
        }
    }

    pub fn into_entity(self) -> Option<E> {
        match self {
            Outcome::Success(entity) | Outcome::Failure(entity) => Some(entity),
            Outcome::TransportError(_) => None,
        }
    }

    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Outcome::TransportError(err) => Some(err),
            _ => None,
        }
    }
}

/// Classify a status code and raw body.
pub fn classify<E: Entity>(status: u16, body: &str) -> Outcome<E> {
    if status != SUCCESS_STATUS && status != CLIENT_ERROR_STATUS {
        return Outcome::TransportError(TransportError::UnexpectedStatus {
            status,
            body: body.to_string(),
        });
    }

    let entity = match decode::<E>(body) {
        Ok(entity) => entity,
        Err(reason) => return Outcome::TransportError(TransportError::Decode { status, reason }),
    };

    if status == CLIENT_ERROR_STATUS || !entity.validate().is_valid() {
        Outcome::Failure(entity)
    } else {
        Outcome::Success(entity)
    }
}

/// Classify whatever a session reported, passing transport errors through.
pub fn classify_response<E: Entity>(response: Result<RawResponse, TransportError>) -> Outcome<E> {
    match response {
        Ok(raw) => classify(raw.status, &raw.body),
        Err(err) => Outcome::TransportError(err),
    }
}
