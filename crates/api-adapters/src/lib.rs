//! # api-adapters
//!
//! The HTTP JSON surface of Buster Block.
//!
//! Everything that touches axum lives behind the `web-axum` feature; the
//! envelope and metrics registry are plain types usable without it.

pub mod metrics;
pub mod response;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod router;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;
pub use response::Envelope;

#[cfg(feature = "web-axum")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "web-axum")]
pub use router::build_router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
