//! Data model for authorization checks.
//!
//! - [`Principal`]: the requesting actor as an ordered list of [`Claim`]s
//! - [`Resource`]: a movie or review snapshot, tagged by [`ResourceKind`]
//! - [`Requirement`]: a named [`Operation`], a [`ClaimRequirement`] or an [`Assertion`]
//! - [`Policy`]: a named bundle of principal-only requirements
//! - [`AuthorizationResult`]: the outcome of a check

mod claim;
mod decision;
mod policy;
mod principal;
mod requirement;
mod resource;

pub use claim::{Claim, claim_types, roles};
pub use decision::{AuthorizationResult, Outcome};
pub use policy::{Policy, PolicyBuilder};
pub use principal::Principal;
pub use requirement::{
    Assertion, ClaimRequirement, Operation, Predicate, Requirement, RequirementKind,
};
pub use resource::{MovieResource, Resource, ResourceKind, ReviewResource};
