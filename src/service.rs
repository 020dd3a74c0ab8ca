use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::collaborators::PermissionLookup;
use crate::error::AuthzError;
use crate::handlers::{MovieReviewHandler, ReviewEditHandler};
use crate::metrics;
use crate::registry::{HandlerRegistry, PolicyRegistry};
use crate::traits::{AuthorizationHandler, HandlerContext};
use crate::types::{AuthorizationResult, Operation, Policy, Principal, Requirement, Resource};
use crate::votes::{Tally, Votes};

/// How handlers for one requirement are invoked. Both modes produce the
/// same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Sequential,
    Parallel,
}

struct Inner {
    handlers: HandlerRegistry,
    policies: PolicyRegistry,
}

/// The authorization service handle. Cloneable and thread-safe.
///
/// Holds the handler and policy registries built at startup; nothing in it
/// changes afterwards. Denials come back as [`AuthorizationResult`] values.
#[derive(Clone)]
pub struct AuthorizationService {
    inner: Arc<Inner>,
}

impl AuthorizationService {
    pub fn builder() -> AuthorizationServiceBuilder {
        AuthorizationServiceBuilder::default()
    }

    /// The movie site's wiring: the movie review and review edit handlers,
    /// the built-in policies, and a startup check that both are present.
    pub fn for_movies(permissions: Arc<dyn PermissionLookup>) -> Result<Self, AuthzError> {
        Self::builder()
            .handler(MovieReviewHandler::new(permissions))
            .handler(ReviewEditHandler)
            .policies(PolicyRegistry::with_builtin())
            .require_policies([Policy::DEFAULT, Policy::SEARCH])
            .build()
    }

    /// Decide whether `principal` satisfies `requirement` for `resource`.
    ///
    /// Principal-only requirements ignore the resource. Operations fan out to
    /// every handler registered for `(operation, resource kind)`, in
    /// registration order; any explicit deny fails the check, otherwise one
    /// success vote is enough. No handler, or only abstentions, fails.
    pub fn authorize(
        &self,
        principal: &Principal,
        resource: &Resource,
        requirement: &Requirement,
    ) -> AuthorizationResult {
        self.evaluate(principal, Some(resource), requirement, Dispatch::Sequential)
    }

    /// Same contract as [`authorize`](Self::authorize), with the handlers
    /// for the pair invoked on scoped threads.
    pub fn authorize_parallel(
        &self,
        principal: &Principal,
        resource: &Resource,
        requirement: &Requirement,
    ) -> AuthorizationResult {
        self.evaluate(principal, Some(resource), requirement, Dispatch::Parallel)
    }

    /// AND over `requirements`. Every requirement is evaluated so that all
    /// failure reasons are reported.
    pub fn authorize_all(
        &self,
        principal: &Principal,
        resource: &Resource,
        requirements: &[Requirement],
    ) -> AuthorizationResult {
        requirements
            .iter()
            .map(|r| self.authorize(principal, resource, r))
            .fold(AuthorizationResult::success(), AuthorizationResult::and)
    }

    /// Evaluate a registered policy by name.
    ///
    /// An unknown name is a configuration defect and the only error case;
    /// use [`AuthorizationServiceBuilder::require_policies`] to catch it at
    /// startup.
    pub fn authorize_policy(
        &self,
        principal: &Principal,
        policy_name: &str,
    ) -> Result<AuthorizationResult, AuthzError> {
        let policy = self.inner.policies.resolve(policy_name)?;
        Ok(self.authorize_with(principal, policy))
    }

    /// Evaluate a policy that need not be registered.
    pub fn authorize_with(&self, principal: &Principal, policy: &Policy) -> AuthorizationResult {
        let start = Instant::now();

        debug!(
            event = "Request",
            phase = "Policy",
            principal = %principal,
            policy = policy.name()
        );

        let result = if policy.require_authenticated_user() && !principal.is_authenticated() {
            AuthorizationResult::failed(
                principal,
                format!("{} requires an authenticated user", policy.name()),
            )
        } else {
            policy
                .requirements()
                .iter()
                .map(|r| self.check(principal, None, r, Dispatch::Sequential).0)
                .fold(AuthorizationResult::success(), AuthorizationResult::and)
        };

        debug!(event = "Request", phase = "Result", policy = policy.name(), result = %result);
        metrics::record_evaluation(
            result.succeeded(),
            start.elapsed(),
            policy.name().to_string(),
            None,
            0,
        );
        result
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.inner.policies
    }

    fn evaluate(
        &self,
        principal: &Principal,
        resource: Option<&Resource>,
        requirement: &Requirement,
        dispatch: Dispatch,
    ) -> AuthorizationResult {
        let start = Instant::now();

        debug!(
            event = "Request",
            phase = "Evaluation",
            principal = %principal,
            requirement = %requirement,
            resource = ?resource.map(ToString::to_string)
        );

        let (result, invoked) = self.check(principal, resource, requirement, dispatch);

        debug!(event = "Request", phase = "Result", requirement = %requirement, result = %result);
        metrics::record_evaluation(
            result.succeeded(),
            start.elapsed(),
            requirement.to_string(),
            resource.map(|r| r.kind().to_string()),
            invoked,
        );
        result
    }

    /// Returns the result and the number of handlers invoked.
    fn check(
        &self,
        principal: &Principal,
        resource: Option<&Resource>,
        requirement: &Requirement,
        dispatch: Dispatch,
    ) -> (AuthorizationResult, usize) {
        let satisfied = match requirement {
            Requirement::Assertion(assertion) => assertion.evaluate(principal),
            Requirement::Claim(claim) => claim.is_satisfied_by(principal),
            Requirement::Operation(operation) => {
                let Some(resource) = resource else {
                    return (
                        AuthorizationResult::failed(
                            principal,
                            format!("{operation} requires a resource"),
                        ),
                        0,
                    );
                };
                return self.dispatch(principal, operation, resource, dispatch);
            }
        };

        if satisfied {
            (AuthorizationResult::success(), 0)
        } else {
            (
                AuthorizationResult::failed(principal, format!("{requirement} not satisfied")),
                0,
            )
        }
    }

    fn dispatch(
        &self,
        principal: &Principal,
        operation: &Operation,
        resource: &Resource,
        dispatch: Dispatch,
    ) -> (AuthorizationResult, usize) {
        let kind = resource.kind();
        let handlers = self.inner.handlers.handlers_for(operation, kind);

        if handlers.is_empty() {
            debug!(
                event = "Request",
                phase = "Dispatch",
                operation = %operation,
                resource = %resource,
                "no applicable handler"
            );
            return (
                AuthorizationResult::failed(
                    principal,
                    format!("no handler registered for {operation} on {kind}"),
                ),
                0,
            );
        }

        let ctx = HandlerContext {
            principal,
            operation,
            resource,
        };
        let votes = Votes::new();
        invoke(handlers, &ctx, &votes, dispatch);

        let result = match votes.tally() {
            Tally::Succeeded { successes } => {
                info!(
                    event = "Request",
                    phase = "Decision",
                    principal = %principal,
                    operation = %operation,
                    resource = %resource,
                    successes
                );
                AuthorizationResult::success()
            }
            Tally::Denied { reasons } => AuthorizationResult::failed(
                principal,
                format!("{operation} on {kind} denied: {}", reasons.join("; ")),
            ),
            Tally::NoVotes => AuthorizationResult::failed(
                principal,
                format!("no handler succeeded for {operation} on {kind}"),
            ),
        };

        (result, handlers.len())
    }
}

fn invoke(
    handlers: &[Arc<dyn AuthorizationHandler>],
    ctx: &HandlerContext<'_>,
    votes: &Votes,
    dispatch: Dispatch,
) {
    if dispatch == Dispatch::Sequential || handlers.len() == 1 {
        for handler in handlers {
            handler.handle(ctx, votes);
        }
        return;
    }

    thread::scope(|s| {
        for handler in handlers {
            s.spawn(move || handler.handle(ctx, votes));
        }
    });
}

/// Assembles an [`AuthorizationService`] at startup.
#[derive(Default)]
pub struct AuthorizationServiceBuilder {
    handlers: HandlerRegistry,
    policies: PolicyRegistry,
    required_policies: Vec<String>,
    error: Option<AuthzError>,
}

impl AuthorizationServiceBuilder {
    pub fn handler<H: AuthorizationHandler + 'static>(self, handler: H) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    pub fn shared_handler(mut self, handler: Arc<dyn AuthorizationHandler>) -> Self {
        self.handlers.register(handler);
        self
    }

    /// Register one policy. A duplicate name fails [`build`](Self::build).
    pub fn policy(mut self, policy: Policy) -> Self {
        if let Err(err) = self.policies.register(policy) {
            self.error.get_or_insert(err);
        }
        self
    }

    /// Replace the policy registry wholesale, e.g. with one compiled by
    /// [`loader::compile_policies`](crate::loader::compile_policies).
    pub fn policies(mut self, policies: PolicyRegistry) -> Self {
        self.policies = policies;
        self
    }

    /// Policy names the application references; `build` fails with
    /// `PolicyNotFound` if any is missing.
    pub fn require_policies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_policies
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<AuthorizationService, AuthzError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.policies.validate(&self.required_policies)?;

        info!(
            event = "Startup",
            handlers = self.handlers.len(),
            policies = self.policies.len()
        );

        Ok(AuthorizationService {
            inner: Arc::new(Inner {
                handlers: self.handlers,
                policies: self.policies,
            }),
        })
    }
}

#[cfg(test)]
mod tests;
