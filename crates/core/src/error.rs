//! Domain errors shared by every layer.
//!
//! The HTTP crate maps each variant to a status code; nothing here knows
//! about HTTP.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced row does not exist (or is outside the caller's scope).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input rejected by a domain rule: bad coordinates, unknown status,
    /// illegal status transition, malformed contact number.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The request raced another change, or the target is not in a state
    /// that allows it.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        assert_eq!(CoreError::not_found("Alert", 12).to_string(), "Alert 12 not found");
        assert_eq!(
            CoreError::Validation("lat out of range".into()).to_string(),
            "Invalid input: lat out of range"
        );
    }
}
