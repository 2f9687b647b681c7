//! # Ports
//!
//! Storage and identity contracts. Adapters implement these; services only
//! ever see the traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AuthUser, Movie, Review};

/// Persistence contract for movies.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn insert(&self, movie: Movie) -> Result<Movie>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>>;
    /// All movies, newest first.
    async fn list(&self) -> Result<Vec<Movie>>;
    /// Overwrites the stored movie with the same id.
    async fn update(&self, movie: Movie) -> Result<Movie>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn count(&self) -> Result<u64>;
}

/// Persistence contract for reviews.
///
/// Implementations must enforce uniqueness of `(movie_id, user_id)` and report
/// a violation as [`DomainError::Conflict`](crate::DomainError::Conflict).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: Review) -> Result<Review>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>>;
    /// Reviews for one movie, newest first.
    async fn list_by_movie(&self, movie_id: Uuid) -> Result<Vec<Review>>;
    async fn list_all(&self) -> Result<Vec<Review>>;
    /// Persists text, rating, helpful set/count and `updated_at`.
    async fn update(&self, review: Review) -> Result<Review>;
    /// Flips `user_id`'s helpful mark in one atomic step, touching only the
    /// helpful set, its count and `updated_at`. Returns the stored review and
    /// whether the mark was added, or `None` if the review is gone.
    async fn toggle_helpful(&self, id: Uuid, user_id: &str) -> Result<Option<(Review, bool)>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    /// Removes every review of a movie, returning how many went.
    async fn delete_by_movie(&self, movie_id: Uuid) -> Result<u64>;
}

/// Verifies session tokens issued by the identity provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// Resolves a raw token to the user it was issued for, or
    /// [`DomainError::Unauthenticated`](crate::DomainError::Unauthenticated).
    fn verify(&self, token: &str) -> Result<AuthUser>;
}
