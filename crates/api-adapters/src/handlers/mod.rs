//! # Handlers
//!
//! Thin translations between HTTP and the services: parse ids, extract the
//! caller, call one service method, wrap the result in the envelope.

pub mod movies;
pub mod reviews;
pub mod site;

use crate::error::ApiError;

/// Unknown routes get the envelope too.
pub async fn not_found() -> ApiError {
    ApiError(domains::DomainError::NotFound("Route", String::new()))
}
