//! # storage-adapters
//!
//! Implementations of the domain storage ports.
//!
//! - [`memory`]: always compiled, no external services
//! - `postgres`: behind the `db-postgres` feature

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{MemoryMovieRepository, MemoryReviewRepository};

#[cfg(feature = "db-postgres")]
pub use postgres::{PgMovieRepository, PgReviewRepository};
