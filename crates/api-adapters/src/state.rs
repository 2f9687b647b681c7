use std::sync::Arc;

use domains::{MovieRepository, ReviewRepository, TokenVerifier};
use services::{MovieService, ReviewService};

use crate::metrics::Metrics;

/// State shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub movies: MovieService,
    pub reviews: ReviewService,
    pub verifier: Arc<dyn TokenVerifier>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires both services over the same pair of repositories.
    pub fn new(
        movie_repo: Arc<dyn MovieRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            movies: MovieService::new(movie_repo.clone(), review_repo.clone()),
            reviews: ReviewService::new(movie_repo, review_repo),
            verifier,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
