use crate::types::{Operation, Principal, Resource, ResourceKind};
use crate::votes::Votes;

/// The immutable triple every handler sees for one check.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub principal: &'a Principal,
    pub operation: &'a Operation,
    pub resource: &'a Resource,
}

/// Evaluates one operation against one kind of resource.
///
/// A handler only ever votes through [`Votes`]: `succeed()`, `deny(..)`, or
/// nothing at all (abstain). The final verdict belongs to the service.
/// Handlers must not mutate shared state; they may be invoked concurrently.
pub trait AuthorizationHandler: Send + Sync {
    /// Short name used in logs and deny reasons.
    fn name(&self) -> &'static str;

    /// The operation this handler understands, e.g. `Review`.
    fn operation(&self) -> Operation;

    /// The resource kind this handler understands, e.g. `Movie`.
    fn resource_kind(&self) -> ResourceKind;

    fn handle(&self, ctx: &HandlerContext<'_>, votes: &Votes);
}
