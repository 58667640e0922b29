//! Typed response entities and the JSON mapping step that produces them.
//!
//! # Design
//! An entity is any `DeserializeOwned` record that can judge itself through
//! `Entity::validate`. Decoding is atomic: `decode` either hands back a fully
//! formed value or an error description, never a partial record.
//!
//! Mapping is forgiving at the field level and strict at the top level. The
//! body must be a JSON object; inside it, unknown keys are ignored and fields
//! declared with [`lenient`] fall back to `None` when the key is missing,
//! `null`, or holds a value of the wrong JSON type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Result of an entity's self-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid,
}

impl Validation {
    pub fn is_valid(self) -> bool {
        self == Validation::Valid
    }
}

/// A record decoded from a response body.
///
/// Implementors override `validate` to express domain rules; a decoded entity
/// that fails validation on a success status is reported as a failure.
pub trait Entity: DeserializeOwned + Send + 'static {
    fn validate(&self) -> Validation {
        Validation::Valid
    }
}

/// Decode `body` into `E`.
///
/// Fails when the body is not JSON, when its top-level value is not an
/// object, or when a strictly-typed field of `E` cannot be mapped.
pub fn decode<E: Entity>(body: &str) -> Result<E, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err(format!("expected a JSON object, found {}", json_kind(&value)));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Field deserializer that maps a wrong-typed value to `None`.
///
/// Pair with `#[serde(default)]` so that a missing key is also `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
