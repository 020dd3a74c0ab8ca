//! The value every check produces.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

use super::principal::Principal;

/// How a check ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[derive(StrumDisplay, EnumString)]
pub enum Outcome {
    Succeeded,
    /// The principal has no identity; callers issue a login challenge.
    Unauthenticated,
    /// The principal is identified but was denied; callers show a denial page.
    Forbidden,
}

/// Result of one `authorize*` call. A denial is a value, not an error.
/// `succeeded()` is derived from the outcome.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthorizationResult {
    outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    failure_reasons: Vec<String>,
}

impl AuthorizationResult {
    pub fn success() -> Self {
        Self {
            outcome: Outcome::Succeeded,
            failure_reasons: Vec::new(),
        }
    }

    /// A failure for `principal`: `Unauthenticated` when it has no identity,
    /// `Forbidden` otherwise.
    pub fn failed(principal: &Principal, reason: impl Into<String>) -> Self {
        let outcome = if principal.is_authenticated() {
            Outcome::Forbidden
        } else {
            Outcome::Unauthenticated
        };
        Self {
            outcome,
            failure_reasons: vec![reason.into()],
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn failure_reasons(&self) -> &[String] {
        &self.failure_reasons
    }

    /// AND-combine two results for the same principal. Reasons of both
    /// failing sides are kept, in order.
    pub fn and(mut self, other: AuthorizationResult) -> Self {
        match (self.succeeded(), other.succeeded()) {
            (true, _) => other,
            (false, true) => self,
            (false, false) => {
                self.failure_reasons.extend(other.failure_reasons);
                self
            }
        }
    }
}

impl Display for AuthorizationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.succeeded() {
            write!(f, "{}", self.outcome)
        } else {
            write!(f, "{}({})", self.outcome, self.failure_reasons.join("; "))
        }
    }
}
