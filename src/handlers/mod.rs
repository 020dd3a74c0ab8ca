//! Handlers for the movie and review resources.

mod movie;
mod review;

pub use movie::MovieReviewHandler;
pub use review::ReviewEditHandler;
