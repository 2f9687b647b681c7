//! Shared harness for the HTTP integration tests.
//!
//! Builds the real router over the in-memory adapters with a JWT verifier, and
//! mints tokens for test users with the matching issuer.
#![cfg(feature = "web-axum")]

use std::net::SocketAddr;
use std::sync::Arc;

use api_adapters::{build_router, AppState};
use auth_adapters::{JwtIssuer, JwtVerifier};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use storage_adapters::{MemoryMovieRepository, MemoryReviewRepository};
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-tests-secret-0123456789abcdef";
pub const ISSUER: &str = "https://id.buster-block.test";

pub struct TestApp {
    pub router: Router,
    issuer: JwtIssuer,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(
            Arc::new(MemoryMovieRepository::new()),
            Arc::new(MemoryReviewRepository::new()),
            Arc::new(JwtVerifier::hs256(SECRET, Some(ISSUER))),
        );
        Self {
            router: build_router(state, &[]),
            issuer: JwtIssuer::hs256(SECRET, Some(ISSUER)),
        }
    }

    /// A one-hour session for `user_id`.
    pub fn token(&self, user_id: &str, first_name: &str, last_name: &str) -> String {
        self.issuer
            .issue(
                user_id,
                Some(first_name),
                Some(last_name),
                None,
                chrono::Duration::hours(1),
            )
            .expect("sign test token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let res = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router is infallible");
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    /// Creates a movie and returns its id; panics unless the API answers 201.
    pub async fn create_movie(&self, token: &str, payload: Value) -> String {
        let res = self
            .request(Method::POST, "/api/movies", Some(token), Some(payload))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create movie: {:?}", res.body);
        res.data()["id"].as_str().expect("movie id").to_string()
    }

    /// Posts a review and returns its id; panics unless the API answers 201.
    pub async fn create_review(&self, token: &str, movie_id: &str, text: &str, rating: u8) -> String {
        let res = self
            .request(
                Method::POST,
                &format!("/api/movies/{movie_id}/reviews"),
                Some(token),
                Some(json!({ "reviewText": text, "rating": rating })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create review: {:?}", res.body);
        res.data()["id"].as_str().expect("review id").to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub fn movie(title: &str, director: &str, release_year: i32, genre: &str) -> Value {
    json!({
        "title": title,
        "director": director,
        "releaseYear": release_year,
        "genre": genre,
    })
}

/// Serves `router` on an ephemeral local port.
pub async fn spawn_server(router: Router) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}
