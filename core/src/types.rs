//! Domain entities for the login API.

use serde::{Deserialize, Serialize};

use crate::entity::{lenient, Entity, Validation};

/// Body returned by every login route.
///
/// A body without `login_id` still decodes; it just fails validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginEntity {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub login_id: Option<String>,
}

impl Entity for LoginEntity {
    fn validate(&self) -> Validation {
        if self.login_id.is_some() {
            Validation::Valid
        } else {
            Validation::Invalid
        }
    }
}
