//! # auth-adapters
//!
//! Authentication is delegated to an external identity provider. This crate
//! only finds the session token in a request and verifies it.

use thiserror::Error;

pub mod session;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use session::{cookie_value, token_from_headers, SESSION_COOKIE};

#[cfg(feature = "auth-jwt")]
pub use jwt::{JwtIssuer, JwtVerifier, SessionClaims};

/// Set-up failures; per-request rejections are `DomainError::Unauthenticated`.
#[derive(Error, Debug)]
pub enum AuthError {
    #[cfg(feature = "auth-jwt")]
    #[error("invalid verification key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),

    #[cfg(feature = "auth-jwt")]
    #[error("could not sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("no verification key configured")]
    MissingKey,
}
