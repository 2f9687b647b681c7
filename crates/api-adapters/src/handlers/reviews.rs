use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{HelpfulToggle, NewReview, Review, ReviewPatch};

use crate::error::ApiResult;
use crate::extract::{parse_movie_id, parse_review_id, ApiJson, CurrentUser};
use crate::response::Envelope;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> ApiResult<Json<Envelope<Vec<Review>>>> {
    let movie_id = parse_movie_id(&movie_id)?;
    let reviews = state.reviews.list_for_movie(movie_id).await?;
    Ok(Json(Envelope::data(reviews)))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(movie_id): Path<String>,
    ApiJson(input): ApiJson<NewReview>,
) -> ApiResult<(StatusCode, Json<Envelope<Review>>)> {
    let movie_id = parse_movie_id(&movie_id)?;
    let review = state.reviews.create(&user, movie_id, input).await?;
    state.metrics.review_created();
    Ok((StatusCode::CREATED, Json(Envelope::data(review))))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((movie_id, review_id)): Path<(String, String)>,
    ApiJson(patch): ApiJson<ReviewPatch>,
) -> ApiResult<Json<Envelope<Review>>> {
    let movie_id = parse_movie_id(&movie_id)?;
    let review_id = parse_review_id(&review_id)?;
    let review = state.reviews.update(&user, movie_id, review_id, patch).await?;
    Ok(Json(Envelope::data(review)))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((movie_id, review_id)): Path<(String, String)>,
) -> ApiResult<Json<Envelope<()>>> {
    let movie_id = parse_movie_id(&movie_id)?;
    let review_id = parse_review_id(&review_id)?;
    state.reviews.delete(&user, movie_id, review_id).await?;
    Ok(Json(Envelope::message("Review deleted successfully")))
}

pub async fn toggle_helpful(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((movie_id, review_id)): Path<(String, String)>,
) -> ApiResult<Json<Envelope<HelpfulToggle>>> {
    let movie_id = parse_movie_id(&movie_id)?;
    let review_id = parse_review_id(&review_id)?;
    let toggle = state.reviews.toggle_helpful(&user, movie_id, review_id).await?;
    state.metrics.helpful_toggled();
    Ok(Json(Envelope::data(toggle)))
}
