//! Site-wide endpoints: stats, locale, health.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::Json;
use domains::{DomainError, Locale, SiteStats};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiResult;
use crate::extract::{ApiJson, RequestLocale};
use crate::response::Envelope;
use crate::state::AppState;

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Envelope<SiteStats>>> {
    Ok(Json(Envelope::data(state.movies.site_stats().await?)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleOption {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleState {
    pub locale: Locale,
    pub supported: Vec<LocaleOption>,
}

impl LocaleState {
    fn new(locale: Locale) -> Self {
        Self {
            locale,
            supported: Locale::ALL
                .into_iter()
                .map(|l| LocaleOption {
                    code: l.code().to_string(),
                    label: l.label().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetLocale {
    #[serde(default)]
    pub locale: String,
}

pub async fn get_locale(RequestLocale(locale): RequestLocale) -> Json<Envelope<LocaleState>> {
    Json(Envelope::data(LocaleState::new(locale)))
}

pub async fn set_locale(ApiJson(body): ApiJson<SetLocale>) -> ApiResult<impl IntoResponse> {
    let locale = Locale::parse(&body.locale).ok_or_else(|| {
        DomainError::validation(format!("Unsupported locale: {}", body.locale.trim()))
    })?;
    debug!(%locale, "locale changed");
    Ok((
        [(SET_COOKIE, locale.cookie())],
        Json(Envelope::data(LocaleState::new(locale))),
    ))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
