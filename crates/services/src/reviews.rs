//! Review use cases, including the helpful-vote toggle.
//!
//! Duplicate reviews are not pre-checked: the repository's uniqueness
//! constraint decides, and its conflict is reported as-is.

use std::sync::Arc;

use domains::{
    AuthUser, DomainError, HelpfulToggle, MovieRepository, NewReview, Result, Review,
    ReviewPatch, ReviewRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

pub const ALREADY_REVIEWED: &str = "You have already reviewed this movie";

#[derive(Clone)]
pub struct ReviewService {
    movies: Arc<dyn MovieRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    pub fn new(movies: Arc<dyn MovieRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { movies, reviews }
    }

    /// Reviews of a movie, newest first.
    pub async fn list_for_movie(&self, movie_id: Uuid) -> Result<Vec<Review>> {
        self.ensure_movie(movie_id).await?;
        self.reviews.list_by_movie(movie_id).await
    }

    pub async fn create(&self, user: &AuthUser, movie_id: Uuid, input: NewReview) -> Result<Review> {
        self.ensure_movie(movie_id).await?;
        let content = input.validate()?;

        let review = self
            .reviews
            .insert(Review::create(movie_id, user, content))
            .await
            .map_err(|err| match err {
                DomainError::Conflict(_) => {
                    warn!(%movie_id, user_id = %user.id, "duplicate review rejected");
                    DomainError::Conflict(ALREADY_REVIEWED.into())
                }
                other => other,
            })?;

        info!(review_id = %review.id, %movie_id, rating = review.rating, "review created");
        Ok(review)
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        movie_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> Result<Review> {
        let changes = patch.validate()?;
        let mut review = self.find_in_movie(movie_id, review_id).await?;

        if !review.is_owned_by(user) {
            warn!(%review_id, user_id = %user.id, "edit refused: not the author");
            return Err(DomainError::Forbidden(
                "You can only edit your own reviews".into(),
            ));
        }

        if changes.is_empty() {
            return Ok(review);
        }

        review.apply(changes);
        let review = self.reviews.update(review).await?;
        info!(%review_id, "review updated");
        Ok(review)
    }

    pub async fn delete(&self, user: &AuthUser, movie_id: Uuid, review_id: Uuid) -> Result<()> {
        let review = self.find_in_movie(movie_id, review_id).await?;

        if !review.is_owned_by(user) {
            warn!(%review_id, user_id = %user.id, "delete refused: not the author");
            return Err(DomainError::Forbidden(
                "You can only delete your own reviews".into(),
            ));
        }

        if !self.reviews.delete(review_id).await? {
            return Err(DomainError::review_not_found(review_id));
        }
        info!(%review_id, %movie_id, "review deleted");
        Ok(())
    }

    /// Flips the caller's helpful mark on a review. Any authenticated user may
    /// do this, the author included.
    pub async fn toggle_helpful(
        &self,
        user: &AuthUser,
        movie_id: Uuid,
        review_id: Uuid,
    ) -> Result<HelpfulToggle> {
        self.find_in_movie(movie_id, review_id).await?;

        let (review, liked) = self
            .reviews
            .toggle_helpful(review_id, &user.id)
            .await?
            .ok_or_else(|| DomainError::review_not_found(review_id))?;

        info!(%review_id, user_id = %user.id, liked, count = review.helpful_count, "helpful toggled");
        Ok(HelpfulToggle::from((&review, liked)))
    }

    async fn ensure_movie(&self, movie_id: Uuid) -> Result<()> {
        match self.movies.find_by_id(movie_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::movie_not_found(movie_id)),
        }
    }

    /// Loads a review, treating one that belongs to another movie as missing.
    async fn find_in_movie(&self, movie_id: Uuid, review_id: Uuid) -> Result<Review> {
        self.reviews
            .find_by_id(review_id)
            .await?
            .filter(|r| r.movie_id == movie_id)
            .ok_or_else(|| DomainError::review_not_found(review_id))
    }
}
