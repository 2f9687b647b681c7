use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::validation::current_year;
use domains::{CatalogFilter, Movie, MoviePatch, MovieWithStats, NewMovie, SortBy};
use serde::Deserialize;
use services::CatalogPage;

use crate::error::{ApiError, ApiResult};
use crate::extract::{parse_movie_id, ApiJson, ApiQuery, CurrentUser};
use crate::response::Envelope;
use crate::state::AppState;

/// Catalog query string: `?search=&genre=&sort=&yearFrom=&yearTo=`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub sort: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl CatalogQuery {
    /// Missing parameters fall back to the unfiltered defaults.
    pub fn into_filter(self, current_year: i32) -> Result<CatalogFilter, ApiError> {
        let defaults = CatalogFilter::defaults(current_year);
        let sort_by = match self.sort.as_deref().map(str::trim) {
            None | Some("") => SortBy::default(),
            Some(raw) => raw.parse::<SortBy>()?,
        };

        Ok(CatalogFilter {
            search: self.search.map(|s| s.trim().to_string()).unwrap_or_default(),
            genre: self.genre.filter(|g| !g.trim().is_empty()),
            year_range: (
                self.year_from.unwrap_or(defaults.year_range.0),
                self.year_to.unwrap_or(defaults.year_range.1),
            ),
            sort_by,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> ApiResult<Json<Envelope<Vec<Movie>>>> {
    let filter = query.into_filter(current_year())?;
    let movies = state.movies.list(&filter).await?;
    Ok(Json(Envelope::data(movies)))
}

pub async fn catalog(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> ApiResult<Json<Envelope<CatalogPage>>> {
    let filter = query.into_filter(current_year())?;
    let page = state.movies.catalog(&filter).await?;
    Ok(Json(Envelope::data(page)))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewMovie>,
) -> ApiResult<(StatusCode, Json<Envelope<Movie>>)> {
    let movie = state.movies.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(movie))))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<MovieWithStats>>> {
    let id = parse_movie_id(&id)?;
    let movie = state.movies.get(id).await?;
    Ok(Json(Envelope::data(movie)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<MoviePatch>,
) -> ApiResult<Json<Envelope<Movie>>> {
    let id = parse_movie_id(&id)?;
    let movie = state.movies.update(&user, id, patch).await?;
    Ok(Json(Envelope::data(movie)))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<()>>> {
    let id = parse_movie_id(&id)?;
    state.movies.delete(&user, id).await?;
    Ok(Json(Envelope::message(
        "Movie and associated reviews deleted successfully",
    )))
}
