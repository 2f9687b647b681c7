//! # Metrics
//!
//! Prometheus counters, exposed in OpenMetrics text on `/metrics`:
//! - `http_requests_total{method,status}`
//! - `reviews_created_total`
//! - `helpful_toggles_total`

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    pub status: String,
}

pub struct Metrics {
    registry: Registry,
    http_requests: Family<RequestLabels, Counter>,
    reviews_created: Counter,
    helpful_toggles: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<RequestLabels, Counter>::default();
        registry.register("http_requests", "HTTP requests served", http_requests.clone());

        let reviews_created = Counter::default();
        registry.register("reviews_created", "Reviews posted", reviews_created.clone());

        let helpful_toggles = Counter::default();
        registry.register(
            "helpful_toggles",
            "Helpful votes added or withdrawn",
            helpful_toggles.clone(),
        );

        Self {
            registry,
            http_requests,
            reviews_created,
            helpful_toggles,
        }
    }

    pub fn observe_request(&self, method: &str, status: u16) {
        self.http_requests
            .get_or_create(&RequestLabels {
                method: method.to_string(),
                status: status.to_string(),
            })
            .inc();
    }

    pub fn review_created(&self) {
        self.reviews_created.inc();
    }

    pub fn helpful_toggled(&self) {
        self.helpful_toggles.inc();
    }

    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "web-axum")]
pub use http::{metrics_handler, track_requests};

#[cfg(feature = "web-axum")]
mod http {
    use std::sync::Arc;

    use axum::extract::{Request, State};
    use axum::http::{header, StatusCode};
    use axum::middleware::Next;
    use axum::response::{IntoResponse, Response};
    use tracing::error;

    use super::Metrics;
    use crate::state::AppState;

    const OPENMETRICS: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

    /// Counts every response by method and status.
    pub async fn track_requests(
        State(metrics): State<Arc<Metrics>>,
        req: Request,
        next: Next,
    ) -> Response {
        let method = req.method().to_string();
        let response = next.run(req).await;
        metrics.observe_request(&method, response.status().as_u16());
        response
    }

    pub async fn metrics_handler(State(state): State<AppState>) -> Response {
        match state.metrics.render() {
            Ok(body) => ([(header::CONTENT_TYPE, OPENMETRICS)], body).into_response(),
            Err(err) => {
                error!(error = %err, "metrics encoding failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
