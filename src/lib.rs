// src/lib.rs
pub use collaborators::{
    FixedIdentity, IdentitySource, InMemoryMovies, InMemoryReviews, MovieCatalog,
    PermissionLookup, ReviewStore, StaticPermissions,
};
pub use error::AuthzError;
pub use gate::{Challenge, ChallengeOptions, GateResponse, RequestGate};
pub use handlers::{MovieReviewHandler, ReviewEditHandler};
pub use loader::{PolicyDefinition, PolicyDocument, RequirementDefinition, compile_policies};
pub use registry::{HandlerRegistry, PolicyRegistry};
pub use service::{AuthorizationService, AuthorizationServiceBuilder};
pub use traits::{AuthorizationHandler, HandlerContext};
pub use types::*;
pub use votes::{Tally, Votes};

mod collaborators;
mod error;
mod gate;
mod handlers;
mod loader;
pub mod metrics;
mod registry;
mod service;
mod traits;
pub mod types;
mod votes;
