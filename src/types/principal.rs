//! The actor making a request, as a bag of claims.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::claim::{Claim, claim_types};

/// An identity bundle for one request.
///
/// A principal without an authentication type has no identity at all
/// (an anonymous visitor). Claims keep their insertion order so that
/// [`Principal::find_first`] is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Principal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authentication_type: Option<String>,
    #[serde(default)]
    claims: Vec<Claim>,
}

impl Principal {
    /// A visitor with no identity and no claims.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An identified principal, authenticated by `authentication_type`
    /// (e.g. "Cookies").
    pub fn authenticated<I>(authentication_type: impl Into<String>, claims: I) -> Self
    where
        I: IntoIterator<Item = Claim>,
    {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims: claims.into_iter().collect(),
        }
    }

    /// Append a claim, returning the updated principal.
    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type.is_some()
    }

    pub fn authentication_type(&self) -> Option<&str> {
        self.authentication_type.as_deref()
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims.iter().any(|c| c.matches(claim_type, value))
    }

    /// The first claim of `claim_type` in insertion order.
    pub fn find_first(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type() == claim_type)
            .map(Claim::value)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.has_claim(claim_types::ROLE, role)
    }

    /// Distinct role values, in the order they were first seen.
    pub fn roles(&self) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|c| c.claim_type() == claim_types::ROLE)
            .map(Claim::value)
            .unique()
            .collect()
    }

    pub fn subject(&self) -> Option<&str> {
        self.find_first(claim_types::SUBJECT)
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (self.authentication_type.as_deref(), self.subject()) {
            (None, _) => write!(f, "anonymous"),
            (Some(_), Some(sub)) => write!(f, "{sub}[{}]", self.roles().join(",")),
            (Some(_), None) => write!(f, "unnamed[{}]", self.roles().join(",")),
        }
    }
}
