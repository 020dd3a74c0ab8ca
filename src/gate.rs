//! Caller-side glue: fetch the resource, authorize, and turn the result into
//! what the web layer should do next.
//!
//! Nothing here speaks HTTP. A [`GateResponse`] tells the caller to proceed
//! with the loaded resource, redirect (resource missing), or challenge
//! (login for anonymous visitors, denial page for identified ones).

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::form_urlencoded;
use utoipa::ToSchema;

use crate::collaborators::{IdentitySource, MovieCatalog, ReviewStore};
use crate::error::AuthzError;
use crate::service::AuthorizationService;
use crate::types::{
    AuthorizationResult, MovieResource, Operation, Outcome, Policy, Principal, Requirement,
    Resource, ReviewResource,
};

/// Where challenges and missing resources send the visitor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct ChallengeOptions {
    pub login_path: String,
    pub access_denied_path: String,
    /// Query parameter carrying the original destination.
    pub return_url_parameter: String,
    pub not_found_path: String,
}

impl Default for ChallengeOptions {
    fn default() -> Self {
        Self {
            login_path: "/Account/Login".to_string(),
            access_denied_path: "/Account/Denied".to_string(),
            return_url_parameter: "ReturnUrl".to_string(),
            not_found_path: "/Movie".to_string(),
        }
    }
}

impl ChallengeOptions {
    fn with_return_path(&self, path: &str, return_path: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.return_url_parameter, return_path)
            .finish();
        format!("{path}?{query}")
    }
}

/// What a failed check asks the caller to do.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum Challenge {
    /// No identity: sign in, then come back to the original destination.
    Login { location: String },
    /// Identified but denied.
    AccessDenied { location: String },
}

impl Challenge {
    /// `None` when the result succeeded.
    pub fn for_result(
        result: &AuthorizationResult,
        options: &ChallengeOptions,
        return_path: &str,
    ) -> Option<Self> {
        match result.outcome() {
            Outcome::Succeeded => None,
            Outcome::Unauthenticated => Some(Challenge::Login {
                location: options.with_return_path(&options.login_path, return_path),
            }),
            Outcome::Forbidden => Some(Challenge::AccessDenied {
                location: options.with_return_path(&options.access_denied_path, return_path),
            }),
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Challenge::Login { location } | Challenge::AccessDenied { location } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResponse<T> {
    Proceed(T),
    Redirect { location: String },
    Challenge(Challenge),
}

impl<T> GateResponse<T> {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateResponse::Proceed(_))
    }
}

/// Per-request gate for the movie and review pages.
///
/// Every entry point first applies the `Default` policy (any identified
/// principal), as the application-wide filter does, then the page-specific
/// check.
pub struct RequestGate<'a> {
    service: &'a AuthorizationService,
    movies: &'a dyn MovieCatalog,
    reviews: &'a dyn ReviewStore,
    identity: &'a dyn IdentitySource,
    options: &'a ChallengeOptions,
}

impl<'a> RequestGate<'a> {
    pub fn new(
        service: &'a AuthorizationService,
        movies: &'a dyn MovieCatalog,
        reviews: &'a dyn ReviewStore,
        identity: &'a dyn IdentitySource,
        options: &'a ChallengeOptions,
    ) -> Self {
        Self {
            service,
            movies,
            reviews,
            identity,
            options,
        }
    }

    /// Showing or submitting the new-review form for a movie.
    pub fn new_review(
        &self,
        movie_id: i64,
        return_path: &str,
    ) -> Result<GateResponse<MovieResource>, AuthzError> {
        let principal = self.identity.current_principal();
        if let Some(challenge) = self.default_challenge(&principal, return_path)? {
            return Ok(GateResponse::Challenge(challenge));
        }

        let movie = match self.movies.movie_details(movie_id) {
            Ok(movie) => movie,
            Err(AuthzError::NotFound { .. }) => return Ok(self.not_found(movie_id)),
            Err(err) => return Err(err),
        };

        let resource = Resource::Movie(movie);
        let result = self.service.authorize(
            &principal,
            &resource,
            &Requirement::Operation(Operation::review()),
        );
        Ok(self.respond(result, return_path, resource, Resource::as_movie))
    }

    /// Editing, updating or deleting a review.
    pub fn edit_review(
        &self,
        review_id: i64,
        return_path: &str,
    ) -> Result<GateResponse<ReviewResource>, AuthzError> {
        let principal = self.identity.current_principal();
        if let Some(challenge) = self.default_challenge(&principal, return_path)? {
            return Ok(GateResponse::Challenge(challenge));
        }

        let review = match self.reviews.review(review_id) {
            Ok(review) => review,
            Err(AuthzError::NotFound { .. }) => return Ok(self.not_found(review_id)),
            Err(err) => return Err(err),
        };

        let resource = Resource::Review(review);
        let result = self.service.authorize(
            &principal,
            &resource,
            &Requirement::Operation(Operation::edit()),
        );
        Ok(self.respond(result, return_path, resource, Resource::as_review))
    }

    /// The movie search page.
    pub fn search(&self, return_path: &str) -> Result<GateResponse<()>, AuthzError> {
        let principal = self.identity.current_principal();
        if let Some(challenge) = self.default_challenge(&principal, return_path)? {
            return Ok(GateResponse::Challenge(challenge));
        }

        let result = self.service.authorize_policy(&principal, Policy::SEARCH)?;
        Ok(match Challenge::for_result(&result, self.options, return_path) {
            Some(challenge) => GateResponse::Challenge(challenge),
            None => GateResponse::Proceed(()),
        })
    }

    fn default_challenge(
        &self,
        principal: &Principal,
        return_path: &str,
    ) -> Result<Option<Challenge>, AuthzError> {
        let result = self.service.authorize_policy(principal, Policy::DEFAULT)?;
        Ok(Challenge::for_result(&result, self.options, return_path))
    }

    fn not_found<T>(&self, id: i64) -> GateResponse<T> {
        debug!(event = "Gate", phase = "NotFound", id);
        GateResponse::Redirect {
            location: self.options.not_found_path.clone(),
        }
    }

    fn respond<T: Clone>(
        &self,
        result: AuthorizationResult,
        return_path: &str,
        resource: Resource,
        extract: fn(&Resource) -> Option<&T>,
    ) -> GateResponse<T> {
        if let Some(challenge) = Challenge::for_result(&result, self.options, return_path) {
            debug!(
                event = "Gate",
                phase = "Challenge",
                result = %result,
                location = challenge.location()
            );
            return GateResponse::Challenge(challenge);
        }
        match extract(&resource) {
            Some(inner) => GateResponse::Proceed(inner.clone()),
            None => GateResponse::Redirect {
                location: self.options.not_found_path.clone(),
            },
        }
    }
}
