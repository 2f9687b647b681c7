//! Request extractors that reject with the JSON envelope instead of axum's
//! plain-text rejections.

use auth_adapters::{cookie_value, token_from_headers};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use domains::locale::LOCALE_COOKIE;
use domains::{AuthUser, DomainError, Locale};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified caller. Rejects with 401 when the session is missing or invalid.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let authorization = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        let cookies = cookie_header(&parts.headers);

        let token = token_from_headers(authorization, cookies.as_deref())
            .ok_or_else(|| DomainError::Unauthenticated("no session token".into()))?;

        Ok(Self(state.verifier.verify(token)?))
    }
}

/// The `lang` cookie, normalised. Never rejects.
#[derive(Debug, Clone, Copy)]
pub struct RequestLocale(pub Locale);

impl<S: Send + Sync> FromRequestParts<S> for RequestLocale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookies = cookie_header(&parts.headers);
        let lang = cookies.as_deref().and_then(|c| cookie_value(c, LOCALE_COOKIE));
        Ok(Self(Locale::normalize(lang)))
    }
}

/// HTTP/2 clients may split cookies over several headers.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    (!joined.is_empty()).then_some(joined)
}

/// `Json<T>` with malformed bodies reported as 400.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text())))?;
        Ok(Self(value))
    }
}

/// `Query<T>` with malformed parameters reported as 400.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(format!("Invalid query: {}", rejection.body_text())))?;
        Ok(Self(value))
    }
}

pub fn parse_movie_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid movie ID format"))
}

pub fn parse_review_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid review ID format"))
}
