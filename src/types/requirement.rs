//! Conditions an operation must satisfy.
//!
//! Requirements are plain values. Two independently constructed
//! `Operation::new("Review")` compare equal and select the same handlers;
//! assertions compare by their registered name.

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumDiscriminants};
use utoipa::ToSchema;

use super::claim::claim_types;
use super::principal::Principal;

/// A named operation on a resource, e.g. `Review` on a movie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Operation {
    name: String,
}

impl Operation {
    pub const REVIEW: &'static str = "Review";
    pub const EDIT: &'static str = "Edit";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Write a review of a movie.
    pub fn review() -> Self {
        Self::new(Self::REVIEW)
    }

    /// Change or remove an existing review.
    pub fn edit() -> Self {
        Self::new(Self::EDIT)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name)
    }
}

pub type Predicate = Arc<dyn Fn(&Principal) -> bool + Send + Sync>;

/// A pure predicate over the principal alone. Identity is the name.
#[derive(Clone)]
pub struct Assertion {
    name: String,
    predicate: Predicate,
}

impl Assertion {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Principal) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, principal: &Principal) -> bool {
        (self.predicate)(principal)
    }
}

impl PartialEq for Assertion {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Assertion {}

impl Debug for Assertion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Assertion").field("name", &self.name).finish()
    }
}

/// The principal must hold a claim of `claim_type` with one of
/// `allowed_values`, or any value when the list is empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct ClaimRequirement {
    #[serde(rename = "type")]
    claim_type: String,
    #[serde(default, rename = "any_of", skip_serializing_if = "Vec::is_empty")]
    allowed_values: Vec<String>,
}

impl ClaimRequirement {
    pub fn new<I, S>(claim_type: impl Into<String>, allowed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            claim_type: claim_type.into(),
            allowed_values: allowed_values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn allowed_values(&self) -> &[String] {
        &self.allowed_values
    }

    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        principal
            .claims()
            .iter()
            .filter(|c| c.claim_type() == self.claim_type)
            .any(|c| {
                self.allowed_values.is_empty()
                    || self.allowed_values.iter().any(|v| v == c.value())
            })
    }
}

impl Display for ClaimRequirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.allowed_values.is_empty() {
            write!(f, "claim '{}'", self.claim_type)
        } else {
            write!(
                f,
                "claim '{}' in [{}]",
                self.claim_type,
                self.allowed_values.join(", ")
            )
        }
    }
}

/// Something a check must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(RequirementKind), derive(StrumDisplay, Hash))]
pub enum Requirement {
    /// Resource-scoped; decided by the handlers registered for the
    /// operation and the resource kind.
    Operation(Operation),
    /// Principal-only claim membership.
    Claim(ClaimRequirement),
    /// Principal-only predicate.
    Assertion(Assertion),
}

impl Requirement {
    pub fn operation(name: impl Into<String>) -> Self {
        Requirement::Operation(Operation::new(name))
    }

    pub fn claim<I, S>(claim_type: impl Into<String>, allowed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Requirement::Claim(ClaimRequirement::new(claim_type, allowed_values))
    }

    /// Shorthand for a `role` claim requirement.
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::claim(claim_types::ROLE, roles)
    }

    pub fn assertion<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Principal) -> bool + Send + Sync + 'static,
    {
        Requirement::Assertion(Assertion::new(name, predicate))
    }

    pub fn kind(&self) -> RequirementKind {
        RequirementKind::from(self)
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Requirement::Operation(op) => write!(f, "{op}"),
            Requirement::Claim(claim) => write!(f, "{claim}"),
            Requirement::Assertion(assertion) => write!(f, "assertion '{}'", assertion.name),
        }
    }
}

impl From<Operation> for Requirement {
    fn from(op: Operation) -> Self {
        Requirement::Operation(op)
    }
}

impl From<ClaimRequirement> for Requirement {
    fn from(claim: ClaimRequirement) -> Self {
        Requirement::Claim(claim)
    }
}

impl From<Assertion> for Requirement {
    fn from(assertion: Assertion) -> Self {
        Requirement::Assertion(assertion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Claim;
    use yare::parameterized;

    #[test]
    fn test_operations_compare_by_name() {
        let a = Operation::new("Review");
        let b = Operation::review();
        assert_eq!(a, b);
        assert_eq!(Requirement::from(a), Requirement::operation("Review"));
        assert_ne!(Operation::review(), Operation::edit());
    }

    #[test]
    fn test_assertions_compare_by_name() {
        let a = Requirement::assertion("staff", |_| true);
        let b = Requirement::assertion("staff", |_| false);
        let c = Requirement::assertion("other", |_| true);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_assertion_evaluates_predicate() {
        let assertion = Assertion::new("admin", |p: &Principal| p.has_role("Admin"));
        let admin = Principal::authenticated("Cookies", vec![Claim::role("Admin")]);
        assert!(assertion.evaluate(&admin));
        assert!(!assertion.evaluate(&Principal::anonymous()));
    }

    #[parameterized(
        admin = { &["Admin"], true },
        customer_and_viewer = { &["Viewer", "Customer"], true },
        viewer_only = { &["Viewer"], false },
        no_roles = { &[], false },
    )]
    fn test_claim_requirement(roles: &[&str], expected: bool) {
        let requirement = ClaimRequirement::new("role", ["Admin", "Customer"]);
        let principal =
            Principal::authenticated("Cookies", roles.iter().map(|r| Claim::role(*r)));
        assert_eq!(requirement.is_satisfied_by(&principal), expected);
    }

    #[test]
    fn test_claim_requirement_without_values_needs_any_claim() {
        let requirement = ClaimRequirement::new("sub", Vec::<String>::new());
        let with_sub = Principal::authenticated("Cookies", vec![Claim::subject("u1")]);
        assert!(requirement.is_satisfied_by(&with_sub));
        assert!(!requirement.is_satisfied_by(&Principal::anonymous()));
    }

    #[test]
    fn test_kind_and_display() {
        let op = Requirement::operation("Edit");
        assert_eq!(op.kind(), RequirementKind::Operation);
        assert_eq!(op.to_string(), "Edit");

        let roles = Requirement::roles(["Admin", "Customer"]);
        assert_eq!(roles.kind(), RequirementKind::Claim);
        assert_eq!(roles.to_string(), "claim 'role' in [Admin, Customer]");

        let assertion = Requirement::assertion("search-roles", |_| true);
        assert_eq!(assertion.kind(), RequirementKind::Assertion);
        assert_eq!(assertion.to_string(), "assertion 'search-roles'");
    }

    #[test]
    fn test_claim_requirement_deserialization() {
        let requirement: ClaimRequirement =
            serde_json::from_str(r#"{"type": "role", "any_of": ["Admin"]}"#).unwrap();
        assert_eq!(requirement, ClaimRequirement::new("role", ["Admin"]));
    }
}
