//! Named, non-resource-scoped bundles of requirements.

use std::fmt::{Display, Formatter, Result as FmtResult};

use super::claim::{claim_types, roles};
use super::principal::Principal;
use super::requirement::{Assertion, Requirement};

/// A named policy used for route-level gating (e.g. "SearchPolicy").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    name: String,
    require_authenticated_user: bool,
    requirements: Vec<Requirement>,
}

impl Policy {
    /// Gate for movie search: an identified Admin or Customer.
    pub const SEARCH: &'static str = "SearchPolicy";
    /// Application-wide fallback: any identified principal.
    pub const DEFAULT: &'static str = "Default";

    pub fn builder(name: impl Into<String>) -> PolicyBuilder {
        PolicyBuilder {
            name: name.into(),
            require_authenticated_user: false,
            requirements: Vec::new(),
        }
    }

    pub fn search() -> Self {
        Policy::builder(Self::SEARCH)
            .require_authenticated_user()
            .require_assertion("admin-or-customer", |p: &Principal| {
                p.has_claim(claim_types::ROLE, roles::ADMIN)
                    || p.has_claim(claim_types::ROLE, roles::CUSTOMER)
            })
            .build()
    }

    pub fn default_policy() -> Self {
        Policy::builder(Self::DEFAULT)
            .require_authenticated_user()
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn require_authenticated_user(&self) -> bool {
        self.require_authenticated_user
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug)]
pub struct PolicyBuilder {
    name: String,
    require_authenticated_user: bool,
    requirements: Vec<Requirement>,
}

impl PolicyBuilder {
    pub fn require_authenticated_user(mut self) -> Self {
        self.require_authenticated_user = true;
        self
    }

    pub fn require(mut self, requirement: impl Into<Requirement>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    pub fn require_claim<I, S>(self, claim_type: impl Into<String>, allowed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require(Requirement::claim(claim_type, allowed_values))
    }

    pub fn require_role<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require(Requirement::roles(roles))
    }

    pub fn require_assertion<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Principal) -> bool + Send + Sync + 'static,
    {
        self.require(Assertion::new(name, predicate))
    }

    pub fn build(self) -> Policy {
        Policy {
            name: self.name,
            require_authenticated_user: self.require_authenticated_user,
            requirements: self.requirements,
        }
    }
}
