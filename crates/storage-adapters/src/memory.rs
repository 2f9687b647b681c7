//! # In-memory repositories
//!
//! `DashMap`-backed implementations of the storage ports. Used for local runs
//! without a database and by the integration tests. The review store keeps a
//! `(movie_id, user_id)` index whose entry API makes the uniqueness check and
//! the insert one atomic step.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{DomainError, Movie, MovieRepository, Result, Review, ReviewRepository};
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct MemoryMovieRepository {
    movies: Arc<DashMap<Uuid, Movie>>,
}

impl MemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieRepository for MemoryMovieRepository {
    async fn insert(&self, movie: Movie) -> Result<Movie> {
        match self.movies.entry(movie.id) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("movie {} exists", movie.id))),
            Entry::Vacant(slot) => {
                slot.insert(movie.clone());
                Ok(movie)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>> {
        Ok(self.movies.get(&id).map(|m| m.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Movie>> {
        let mut all: Vec<Movie> = self.movies.iter().map(|m| m.value().clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn update(&self, movie: Movie) -> Result<Movie> {
        let mut slot = self
            .movies
            .get_mut(&movie.id)
            .ok_or_else(|| DomainError::movie_not_found(movie.id))?;
        *slot = movie.clone();
        Ok(movie)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.movies.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.movies.len() as u64)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryReviewRepository {
    reviews: Arc<DashMap<Uuid, Review>>,
    /// (movie_id, user_id) -> review id
    by_author: Arc<DashMap<(Uuid, String), Uuid>>,
}

impl MemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut reviews: Vec<Review>) -> Vec<Review> {
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        reviews
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn insert(&self, review: Review) -> Result<Review> {
        match self.by_author.entry((review.movie_id, review.user_id.clone())) {
            Entry::Occupied(_) => Err(DomainError::Conflict(
                "review for (movie_id, user_id) exists".into(),
            )),
            Entry::Vacant(slot) => {
                self.reviews.insert(review.id, review.clone());
                slot.insert(review.id);
                Ok(review)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        Ok(self.reviews.get(&id).map(|r| r.value().clone()))
    }

    async fn list_by_movie(&self, movie_id: Uuid) -> Result<Vec<Review>> {
        let matching = self
            .reviews
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| r.value().clone())
            .collect();
        Ok(Self::newest_first(matching))
    }

    async fn list_all(&self) -> Result<Vec<Review>> {
        let all = self.reviews.iter().map(|r| r.value().clone()).collect();
        Ok(Self::newest_first(all))
    }

    async fn update(&self, review: Review) -> Result<Review> {
        let mut slot = self
            .reviews
            .get_mut(&review.id)
            .ok_or_else(|| DomainError::review_not_found(review.id))?;
        // The helpful set is left to `toggle_helpful`.
        slot.review_text = review.review_text;
        slot.rating = review.rating;
        slot.updated_at = review.updated_at;
        Ok(slot.clone())
    }

    async fn toggle_helpful(&self, id: Uuid, user_id: &str) -> Result<Option<(Review, bool)>> {
        // The shard write lock is held across the read-modify-write.
        Ok(self.reviews.get_mut(&id).map(|mut slot| {
            let liked = slot.toggle_helpful(user_id);
            (slot.clone(), liked)
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        match self.reviews.remove(&id) {
            Some((_, review)) => {
                self.by_author.remove(&(review.movie_id, review.user_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_movie(&self, movie_id: Uuid) -> Result<u64> {
        let ids: Vec<Uuid> = self
            .reviews
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| *r.key())
            .collect();

        let mut removed = 0;
        for id in ids {
            if self.delete(id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
