//! Router-level tests: status mapping, envelope shape, extractors.
//!
//! Tokens are checked by a mocked verifier; "good-token" is the only valid one.

use std::sync::Arc;

use api_adapters::{build_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domains::{AuthUser, DomainError, MockTokenVerifier};
use serde_json::{json, Value};
use storage_adapters::{MemoryMovieRepository, MemoryReviewRepository};
use tower::ServiceExt;

fn app() -> Router {
    let mut verifier = MockTokenVerifier::new();
    verifier.expect_verify().returning(|token| match token {
        "good-token" => Ok(AuthUser::from_profile("user_1", Some("Renate"), Some("Reinsve"), None)),
        _ => Err(DomainError::Unauthenticated("bad token".into())),
    });

    let state = AppState::new(
        Arc::new(MemoryMovieRepository::new()),
        Arc::new(MemoryReviewRepository::new()),
        Arc::new(verifier),
    );
    build_router(state, &[])
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value, axum::http::HeaderMap) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body, headers)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn create_without_session_is_401_before_validation() {
    let app = app();
    let (status, body, _) = send(&app, json_request("POST", "/api/movies", None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "error": "Unauthorized"}));

    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/movies", Some("forged"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_is_accepted() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/movies")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, "lang=no; __session=good-token")
        .body(Body::from(
            json!({"title": "Reprise", "director": "Joachim Trier", "releaseYear": 2006, "genre": "Drama"})
                .to_string(),
        ))
        .unwrap();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["createdBy"], "user_1");
}

#[tokio::test]
async fn malformed_ids_are_400() {
    let app = app();
    let (status, body, _) = send(&app, get("/api/movies/123")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid movie ID format");

    let movie_id = uuid::Uuid::now_v7();
    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/movies/{movie_id}/reviews/nope/helpful"),
            Some("good-token"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid review ID format");
}

#[tokio::test]
async fn unknown_movie_is_404_envelope() {
    let app = app();
    let (status, body, _) = send(&app, get(&format!("/api/movies/{}", uuid::Uuid::now_v7()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Movie not found"}));
}

#[tokio::test]
async fn malformed_json_is_400_envelope() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/movies")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer good-token")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn validation_messages_reach_the_client() {
    let app = app();
    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/api/movies",
            Some("good-token"),
            json!({"title": "Nosferatu", "director": "F. W. Murnau", "releaseYear": 1800, "genre": "Horror"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Release year must be 1888 or later");
}

#[tokio::test]
async fn bad_catalog_query_is_400() {
    let app = app();
    let (status, _, _) = send(&app, get("/api/movies?yearFrom=soon")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body, _) = send(&app, get("/api/catalog?sort=rating")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown sort order: rating");
}

#[tokio::test]
async fn locale_round_trip() {
    let app = app();
    let req = Request::builder()
        .uri("/api/locale")
        .header(header::COOKIE, "lang=zh-tw")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["locale"], "zh-TW");
    assert_eq!(body["data"]["supported"].as_array().unwrap().len(), 6);

    let (status, body, headers) = send(
        &app,
        json_request("PUT", "/api/locale", None, json!({"locale": "es-mx"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["locale"], "es-MX");
    assert_eq!(
        headers[header::SET_COOKIE],
        "lang=es-MX; Path=/; Max-Age=31536000; SameSite=Lax"
    );

    let (status, body, _) = send(
        &app,
        json_request("PUT", "/api/locale", None, json!({"locale": "fr"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported locale: fr");
}

#[tokio::test]
async fn unknown_route_gets_envelope() {
    let app = app();
    let (status, body, _) = send(&app, get("/api/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn health_request_id_and_metrics() {
    let app = app();
    let (status, body, headers) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    assert!(headers.contains_key("x-request-id"));

    let res = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();
    assert!(text.contains(r#"http_requests_total{method="GET",status="200"}"#));
}
