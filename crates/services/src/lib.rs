//! # services
//!
//! Use cases for Buster Block. Each service validates input, checks
//! ownership and talks to storage through the domain ports.

pub mod movies;
pub mod reviews;

pub use movies::{CatalogPage, MovieService};
pub use reviews::{ReviewService, ALREADY_REVIEWED};
