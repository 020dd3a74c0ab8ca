use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration and collaborator failures.
///
/// A denied check is never an `AuthzError`; it is an
/// [`AuthorizationResult`](crate::AuthorizationResult) with a failing outcome.
#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthzError {
    #[error("policy not found: {0}")]
    PolicyNotFound(String),

    #[error("policy already registered: {0}")]
    DuplicatePolicy(String),

    #[error("failed to parse policy document: {0}")]
    ParseError(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: i64 },

    #[error("permission lookup failed: {0}")]
    LookupFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for AuthzError {
    fn from(err: serde_json::Error) -> Self {
        AuthzError::ParseError(err.to_string())
    }
}
