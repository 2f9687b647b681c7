//! buster-block/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for Buster Block.

pub mod catalog;
pub mod error;
pub mod locale;
pub mod models;
pub mod ports;
pub mod stats;
pub mod validation;

// Re-exporting for easier access in other crates
pub use catalog::{available_genres, CatalogFilter, SortBy};
pub use error::*;
pub use locale::Locale;
pub use models::*;
pub use ports::*;
pub use stats::{MovieWithStats, ReviewStats, SiteStats};
