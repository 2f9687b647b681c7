//! # DomainError
//!
//! Centralized error handling for Buster Block.
//! Every failure a use case can produce maps to exactly one variant, and every
//! variant maps to exactly one HTTP status at the API boundary.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed a field constraint (e.g. rating out of range, title too long).
    #[error("{0}")]
    Validation(String),

    /// No authenticated identity, or the session token was rejected.
    #[error("unauthorized: {0}")]
    Unauthenticated(String),

    /// Authenticated, but not the owner of the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (movie or review)
    #[error("{0} not found")]
    NotFound(&'static str, String),

    /// Uniqueness constraint hit (e.g. a second review for the same movie).
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (e.g. database down, corrupted row)
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn movie_not_found(id: impl ToString) -> Self {
        Self::NotFound("Movie", id.to_string())
    }

    pub fn review_not_found(id: impl ToString) -> Self {
        Self::NotFound("Review", id.to_string())
    }
}

/// A specialized Result type for Buster Block logic.
pub type Result<T> = std::result::Result<T, DomainError>;
