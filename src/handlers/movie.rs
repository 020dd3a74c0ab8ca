use std::sync::Arc;

use tracing::{debug, warn};

use crate::collaborators::PermissionLookup;
use crate::traits::{AuthorizationHandler, HandlerContext};
use crate::types::{Operation, ResourceKind, roles};
use crate::votes::Votes;

/// Lets reviewers review movies from the countries they are scoped to.
///
/// Succeeds when the principal has `role=Reviewer` and the movie's country is
/// in the set returned by the permission lookup. Anything else abstains.
pub struct MovieReviewHandler {
    permissions: Arc<dyn PermissionLookup>,
}

impl MovieReviewHandler {
    pub fn new(permissions: Arc<dyn PermissionLookup>) -> Self {
        Self { permissions }
    }
}

impl AuthorizationHandler for MovieReviewHandler {
    fn name(&self) -> &'static str {
        "MovieReviewHandler"
    }

    fn operation(&self) -> Operation {
        Operation::review()
    }

    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Movie
    }

    fn handle(&self, ctx: &HandlerContext<'_>, votes: &Votes) {
        let Some(movie) = ctx.resource.as_movie() else {
            return;
        };

        if !ctx.principal.has_role(roles::REVIEWER) {
            return;
        }

        let allowed = match self.permissions.allowed_countries(ctx.principal) {
            Ok(allowed) => allowed,
            Err(err) => {
                warn!(
                    event = "Handler",
                    handler = self.name(),
                    principal = %ctx.principal,
                    error = %err
                );
                return;
            }
        };

        if allowed.contains(&movie.country_name) {
            votes.succeed();
        } else {
            debug!(
                event = "Handler",
                handler = self.name(),
                principal = %ctx.principal,
                country = %movie.country_name,
                "country not in reviewer scope"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::collaborators::StaticPermissions;
    use crate::error::AuthzError;
    use crate::types::{Claim, MovieResource, Principal, Resource, ReviewResource};
    use crate::votes::Tally;
    use yare::parameterized;

    struct FailingLookup;

    impl PermissionLookup for FailingLookup {
        fn allowed_countries(&self, _: &Principal) -> Result<HashSet<String>, AuthzError> {
            Err(AuthzError::LookupFailed("backend unavailable".to_string()))
        }
    }

    fn run(handler: &MovieReviewHandler, principal: &Principal, resource: &Resource) -> Tally {
        let votes = Votes::new();
        let op = Operation::review();
        handler.handle(
            &HandlerContext {
                principal,
                operation: &op,
                resource,
            },
            &votes,
        );
        votes.tally()
    }

    #[parameterized(
        reviewer_in_scope = { &["Reviewer"], "France", true },
        reviewer_second_country = { &["Reviewer"], "Germany", true },
        reviewer_out_of_scope = { &["Reviewer"], "Japan", false },
        admin_is_not_reviewer = { &["Admin"], "France", false },
        customer = { &["Customer"], "France", false },
        no_roles = { &[], "France", false },
    )]
    fn test_review_movie(user_roles: &[&str], country: &str, expected: bool) {
        let handler = MovieReviewHandler::new(Arc::new(
            StaticPermissions::new().allow("u1", ["France", "Germany"]),
        ));
        let principal = Principal::authenticated(
            "Cookies",
            std::iter::once(Claim::subject("u1")).chain(user_roles.iter().map(|r| Claim::role(*r))),
        );
        let movie: Resource = MovieResource::new(1, "Some Film", country).into();

        let tally = run(&handler, &principal, &movie);
        assert_eq!(matches!(tally, Tally::Succeeded { .. }), expected);
        assert!(!matches!(tally, Tally::Denied { .. }));
    }

    #[test]
    fn test_lookup_failure_abstains() {
        let handler = MovieReviewHandler::new(Arc::new(FailingLookup));
        let principal = Principal::authenticated("Cookies", vec![Claim::role("Reviewer")]);
        let movie: Resource = MovieResource::new(1, "Some Film", "France").into();
        assert_eq!(run(&handler, &principal, &movie), Tally::NoVotes);
    }

    #[test]
    fn test_non_movie_resource_abstains() {
        let lookup = StaticPermissions::new().with_fallback(["France"]);
        let handler = MovieReviewHandler::new(Arc::new(lookup));
        let principal = Principal::authenticated("Cookies", vec![Claim::role("Reviewer")]);
        let review: Resource = ReviewResource::new(1, 1, "u1", 3, "ok").into();
        assert_eq!(run(&handler, &principal, &review), Tally::NoVotes);
    }
}
