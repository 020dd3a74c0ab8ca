use tracing::debug;

use crate::traits::{AuthorizationHandler, HandlerContext};
use crate::types::{Operation, ResourceKind, roles};
use crate::votes::Votes;

/// Admins may edit any review; everyone else only their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReviewEditHandler;

impl AuthorizationHandler for ReviewEditHandler {
    fn name(&self) -> &'static str {
        "ReviewEditHandler"
    }

    fn operation(&self) -> Operation {
        Operation::edit()
    }

    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Review
    }

    fn handle(&self, ctx: &HandlerContext<'_>, votes: &Votes) {
        let Some(review) = ctx.resource.as_review() else {
            return;
        };

        if ctx.principal.has_role(roles::ADMIN) {
            debug!(event = "Handler", handler = self.name(), reason = "admin");
            votes.succeed();
            return;
        }

        if ctx.principal.subject() == Some(review.user_id.as_str()) {
            debug!(event = "Handler", handler = self.name(), reason = "owner");
            votes.succeed();
        }
    }
}
