//! Domain objects an authorization decision is made about.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumDiscriminants, EnumString};
use utoipa::ToSchema;

/// A movie as seen by the authorization layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct MovieResource {
    pub id: i64,
    pub title: String,
    /// Country of production; reviewers are scoped by country.
    pub country_name: String,
}

impl MovieResource {
    pub fn new(id: i64, title: impl Into<String>, country_name: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            country_name: country_name.into(),
        }
    }
}

/// A review written by a user about a movie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct ReviewResource {
    pub id: i64,
    pub movie_id: i64,
    /// Subject id of the author.
    pub user_id: String,
    pub stars: u8,
    pub comment: String,
}

impl ReviewResource {
    pub fn new(
        id: i64,
        movie_id: i64,
        user_id: impl Into<String>,
        stars: u8,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id,
            movie_id,
            user_id: user_id.into(),
            stars,
            comment: comment.into(),
        }
    }
}

/// A read-only snapshot of a domain object, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, EnumDiscriminants)]
#[strum_discriminants(name(ResourceKind), derive(EnumString, StrumDisplay, Hash))]
pub enum Resource {
    Movie(MovieResource),
    Review(ReviewResource),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from(self)
    }

    pub fn id(&self) -> i64 {
        match self {
            Resource::Movie(movie) => movie.id,
            Resource::Review(review) => review.id,
        }
    }

    pub fn as_movie(&self) -> Option<&MovieResource> {
        match self {
            Resource::Movie(movie) => Some(movie),
            _ => None,
        }
    }

    pub fn as_review(&self) -> Option<&ReviewResource> {
        match self {
            Resource::Review(review) => Some(review),
            _ => None,
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}::\"{}\"", self.kind(), self.id())
    }
}

impl From<MovieResource> for Resource {
    fn from(movie: MovieResource) -> Self {
        Resource::Movie(movie)
    }
}

impl From<ReviewResource> for Resource {
    fn from(review: ReviewResource) -> Self {
        Resource::Review(review)
    }
}
