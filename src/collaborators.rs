//! Seams to the rest of the application.
//!
//! The authorization layer reads movies, reviews, reviewer permissions and
//! the current principal through these traits and never writes through them.
//! The in-memory implementations back tests and small embeddings.

use std::collections::{HashMap, HashSet};

use crate::error::AuthzError;
use crate::types::{MovieResource, Principal, ResourceKind, ReviewResource};

pub trait MovieCatalog: Send + Sync {
    fn movie_details(&self, id: i64) -> Result<MovieResource, AuthzError>;
}

pub trait ReviewStore: Send + Sync {
    fn review(&self, id: i64) -> Result<ReviewResource, AuthzError>;
}

/// Domain-specific permission data for a principal.
///
/// Implementations must be read-only and idempotent: the same principal
/// yields the same answer within one check. This is the only call a check
/// may block on.
pub trait PermissionLookup: Send + Sync {
    /// Countries whose movies the principal may review.
    fn allowed_countries(&self, principal: &Principal) -> Result<HashSet<String>, AuthzError>;
}

pub trait IdentitySource {
    fn current_principal(&self) -> Principal;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryMovies {
    movies: HashMap<i64, MovieResource>,
}

impl InMemoryMovies {
    pub fn new<I: IntoIterator<Item = MovieResource>>(movies: I) -> Self {
        Self {
            movies: movies.into_iter().map(|m| (m.id, m)).collect(),
        }
    }
}

impl MovieCatalog for InMemoryMovies {
    fn movie_details(&self, id: i64) -> Result<MovieResource, AuthzError> {
        self.movies.get(&id).cloned().ok_or(AuthzError::NotFound {
            kind: ResourceKind::Movie.to_string(),
            id,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryReviews {
    reviews: HashMap<i64, ReviewResource>,
}

impl InMemoryReviews {
    pub fn new<I: IntoIterator<Item = ReviewResource>>(reviews: I) -> Self {
        Self {
            reviews: reviews.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}

impl ReviewStore for InMemoryReviews {
    fn review(&self, id: i64) -> Result<ReviewResource, AuthzError> {
        self.reviews.get(&id).cloned().ok_or(AuthzError::NotFound {
            kind: ResourceKind::Review.to_string(),
            id,
        })
    }
}

/// Reviewer permissions keyed by the principal's `sub` claim.
///
/// Principals without a `sub`, or with no entry, get the fallback set
/// (empty unless configured).
#[derive(Debug, Default, Clone)]
pub struct StaticPermissions {
    by_subject: HashMap<String, HashSet<String>>,
    fallback: HashSet<String>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow<I, S>(mut self, subject: impl Into<String>, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_subject
            .entry(subject.into())
            .or_default()
            .extend(countries.into_iter().map(Into::into));
        self
    }

    pub fn with_fallback<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback = countries.into_iter().map(Into::into).collect();
        self
    }
}

impl PermissionLookup for StaticPermissions {
    fn allowed_countries(&self, principal: &Principal) -> Result<HashSet<String>, AuthzError> {
        let countries = principal
            .subject()
            .and_then(|sub| self.by_subject.get(sub))
            .unwrap_or(&self.fallback);
        Ok(countries.clone())
    }
}

/// A fixed principal, e.g. one decoded from a session by the host app.
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub Principal);

impl IdentitySource for FixedIdentity {
    fn current_principal(&self) -> Principal {
        self.0.clone()
    }
}
