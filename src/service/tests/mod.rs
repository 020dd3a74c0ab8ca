use std::sync::Arc;

use super::*;
use crate::collaborators::StaticPermissions;
use crate::types::{Claim, MovieResource, Outcome, ResourceKind, ReviewResource};
use yare::parameterized;

mod policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vote {
    Succeed,
    Deny,
    Abstain,
}

/// A handler that always casts the same vote.
struct Scripted {
    name: &'static str,
    vote: Vote,
    operation: &'static str,
    kind: ResourceKind,
}

impl Scripted {
    fn on_review_edit(name: &'static str, vote: Vote) -> Self {
        Self {
            name,
            vote,
            operation: "Edit",
            kind: ResourceKind::Review,
        }
    }
}

impl AuthorizationHandler for Scripted {
    fn name(&self) -> &'static str {
        self.name
    }

    fn operation(&self) -> Operation {
        Operation::new(self.operation)
    }

    fn resource_kind(&self) -> ResourceKind {
        self.kind
    }

    fn handle(&self, _ctx: &HandlerContext<'_>, votes: &Votes) {
        match self.vote {
            Vote::Succeed => votes.succeed(),
            Vote::Deny => votes.deny(format!("{} says no", self.name)),
            Vote::Abstain => {}
        }
    }
}

fn principal(claims: &[&str]) -> Principal {
    Principal::authenticated(
        "Cookies",
        claims.iter().map(|c| c.parse::<Claim>().unwrap()),
    )
}

fn movie(country: &str) -> Resource {
    MovieResource::new(1, "Some Film", country).into()
}

fn review_by(user_id: &str) -> Resource {
    ReviewResource::new(10, 1, user_id, 4, "Good").into()
}

fn movie_service(allowed: &[&str]) -> AuthorizationService {
    let lookup = StaticPermissions::new().with_fallback(allowed.iter().copied());
    AuthorizationService::for_movies(Arc::new(lookup)).unwrap()
}

#[test]
fn test_for_movies_wiring() {
    let service = movie_service(&[]);
    assert_eq!(
        service.handlers().pairs(),
        vec![
            (Operation::edit(), ResourceKind::Review),
            (Operation::review(), ResourceKind::Movie),
        ]
    );
    assert_eq!(service.policies().names(), vec!["Default", "SearchPolicy"]);
}

#[test]
fn test_builder_fails_on_missing_required_policy() {
    let result = AuthorizationService::builder()
        .handler(ReviewEditHandler)
        .require_policies(["SearchPolicy"])
        .build();
    assert!(matches!(result, Err(AuthzError::PolicyNotFound(name)) if name == "SearchPolicy"));
}

#[test]
fn test_builder_fails_on_duplicate_policy() {
    let result = AuthorizationService::builder()
        .policy(Policy::search())
        .policy(Policy::builder("SearchPolicy").build())
        .build();
    assert!(matches!(result, Err(AuthzError::DuplicatePolicy(name)) if name == "SearchPolicy"));
}

#[test]
fn test_unknown_policy_at_runtime_is_an_error() {
    let service = movie_service(&[]);
    let result = service.authorize_policy(&principal(&["role=Admin"]), "AdminPolicy");
    assert_eq!(
        result,
        Err(AuthzError::PolicyNotFound("AdminPolicy".to_string()))
    );
}

#[test]
fn test_service_is_shareable_across_threads() {
    let service = movie_service(&["France"]);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                let reviewer = principal(&["role=Reviewer"]);
                let country = if i % 2 == 0 { "France" } else { "Japan" };
                let result =
                    service.authorize(&reviewer, &movie(country), &Operation::review().into());
                (i, result.succeeded())
            })
        })
        .collect();

    for handle in handles {
        let (i, succeeded) = handle.join().unwrap();
        assert_eq!(succeeded, i % 2 == 0);
    }
}
