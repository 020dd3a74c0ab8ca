//! Typed assertions about a principal.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AuthzError;

/// Well-known claim types.
pub mod claim_types {
    /// Role membership, e.g. `role=Admin`. A principal may hold several.
    pub const ROLE: &str = "role";
    /// Stable subject identifier of the principal.
    pub const SUBJECT: &str = "sub";
    /// Display name.
    pub const NAME: &str = "name";
}

/// Well-known role values.
pub mod roles {
    pub const ADMIN: &str = "Admin";
    pub const CUSTOMER: &str = "Customer";
    pub const REVIEWER: &str = "Reviewer";
    pub const VIEWER: &str = "Viewer";
}

/// A single `(type, value)` pair held by a principal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct Claim {
    #[serde(rename = "type")]
    claim_type: String,
    value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn role(value: impl Into<String>) -> Self {
        Self::new(claim_types::ROLE, value)
    }

    pub fn subject(value: impl Into<String>) -> Self {
        Self::new(claim_types::SUBJECT, value)
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Exact, case-sensitive match on both type and value.
    pub fn matches(&self, claim_type: &str, value: &str) -> bool {
        self.claim_type == claim_type && self.value == value
    }
}

impl Display for Claim {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}={}", self.claim_type, self.value)
    }
}

impl FromStr for Claim {
    type Err = AuthzError;

    /// Accepts `type=value`. The value may itself contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (claim_type, value) = s.split_once('=').ok_or_else(|| {
            AuthzError::InvalidFormat(format!(
                "Failed to parse claim: missing '=' in '{s}' (expected format: type=value)"
            ))
        })?;

        let claim_type = claim_type.trim();
        if claim_type.is_empty() {
            return Err(AuthzError::InvalidFormat(format!(
                "Failed to parse claim: empty type in '{s}'"
            )));
        }

        Ok(Claim::new(claim_type, value.trim()))
    }
}
