use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn};

use crate::handlers::{movies, not_found, reviews, site};
use crate::metrics::{metrics_handler, track_requests};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the full application router.
///
/// `allowed_origins` empty means any origin (without credentials).
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api = Router::new()
        .route("/api/movies", get(movies::list).post(movies::create))
        .route("/api/catalog", get(movies::catalog))
        .route(
            "/api/movies/{id}",
            get(movies::show).put(movies::update).delete(movies::delete),
        )
        .route(
            "/api/movies/{id}/reviews",
            get(reviews::list).post(reviews::create),
        )
        .route(
            "/api/movies/{id}/reviews/{review_id}",
            axum::routing::put(reviews::update).delete(reviews::delete),
        )
        .route(
            "/api/movies/{id}/reviews/{review_id}/helpful",
            post(reviews::toggle_helpful),
        )
        .route("/api/stats", get(site::stats))
        .route("/api/locale", get(site::get_locale).put(site::set_locale))
        .route("/health", get(site::health))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .with_state(state);

    api.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                info_span!(
                    "http",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(PropagateRequestIdLayer::new(x_request_id))
            .layer(cors_layer(allowed_origins))
            .layer(CompressionLayer::new()),
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .max_age(Duration::from_secs(3600));

    if allowed_origins.is_empty() {
        return base.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(origins)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
