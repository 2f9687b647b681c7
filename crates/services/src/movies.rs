//! Movie use cases: catalog, detail, create, edit, delete with cascade.

use std::sync::Arc;

use domains::stats::stats_by_movie;
use domains::validation::current_year;
use domains::{
    available_genres, AuthUser, CatalogFilter, DomainError, Movie, MoviePatch, MovieRepository,
    MovieWithStats, NewMovie, Result, ReviewRepository, ReviewStats, SiteStats,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// The catalog as the landing page shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub movies: Vec<MovieWithStats>,
    /// Movies left after filtering
    pub shown: usize,
    /// Movies in the catalog
    pub total: usize,
    pub available_genres: Vec<String>,
    pub filters_active: bool,
}

#[derive(Clone)]
pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { movies, reviews }
    }

    pub async fn list(&self, filter: &CatalogFilter) -> Result<Vec<Movie>> {
        let movies = self.movies.list().await?;
        Ok(filter.apply(movies))
    }

    pub async fn catalog(&self, filter: &CatalogFilter) -> Result<CatalogPage> {
        let all = self.movies.list().await?;
        let reviews = self.reviews.list_all().await?;

        let total = all.len();
        let available_genres = available_genres(&all);
        let mut stats = stats_by_movie(&reviews);

        let movies: Vec<MovieWithStats> = filter
            .apply(all)
            .into_iter()
            .map(|movie| {
                let stats = stats.remove(&movie.id).unwrap_or_default();
                MovieWithStats { movie, stats }
            })
            .collect();

        Ok(CatalogPage {
            shown: movies.len(),
            total,
            available_genres,
            filters_active: filter.is_active(current_year()),
            movies,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<MovieWithStats> {
        let movie = self.find(id).await?;
        let reviews = self.reviews.list_by_movie(id).await?;
        let stats = ReviewStats::from_ratings(reviews.iter().map(|r| r.rating));
        Ok(MovieWithStats { movie, stats })
    }

    pub async fn create(&self, user: &AuthUser, input: NewMovie) -> Result<Movie> {
        let input = input.validate(current_year())?;
        let movie = self.movies.insert(Movie::create(input, user)).await?;
        info!(movie_id = %movie.id, user_id = %user.id, title = %movie.title, "movie created");
        Ok(movie)
    }

    pub async fn update(&self, user: &AuthUser, id: Uuid, patch: MoviePatch) -> Result<Movie> {
        let patch = patch.validate(current_year())?;
        let mut movie = self.find(id).await?;

        if !movie.is_owned_by(user) {
            warn!(movie_id = %id, user_id = %user.id, "edit refused: not the owner");
            return Err(DomainError::Forbidden(
                "You can only edit your own movies".into(),
            ));
        }

        movie.apply(patch);
        let movie = self.movies.update(movie).await?;
        info!(movie_id = %id, "movie updated");
        Ok(movie)
    }

    /// Deletes the movie and every review of it. Returns the number of reviews
    /// removed along with it.
    pub async fn delete(&self, user: &AuthUser, id: Uuid) -> Result<u64> {
        let movie = self.find(id).await?;

        if !movie.is_owned_by(user) {
            warn!(movie_id = %id, user_id = %user.id, "delete refused: not the owner");
            return Err(DomainError::Forbidden(
                "You can only delete your own movies".into(),
            ));
        }

        // Reviews first so a failure never leaves orphans behind.
        let removed = self.reviews.delete_by_movie(id).await?;
        if !self.movies.delete(id).await? {
            return Err(DomainError::movie_not_found(id));
        }

        info!(movie_id = %id, reviews_removed = removed, "movie deleted");
        Ok(removed)
    }

    pub async fn site_stats(&self) -> Result<SiteStats> {
        let movie_count = self.movies.count().await?;
        let reviews = self.reviews.list_all().await?;
        Ok(SiteStats::compute(movie_count, &reviews))
    }

    async fn find(&self, id: Uuid) -> Result<Movie> {
        self.movies
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::movie_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domains::{
        MockMovieRepository, MockReviewRepository, MovieContent, Review, ReviewContent, SortBy,
    };
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn owner() -> AuthUser {
        AuthUser::from_profile("user_owner", Some("Anne"), Some("Sewitsky"), None)
    }

    fn stranger() -> AuthUser {
        AuthUser::from_profile("user_stranger", None, None, Some("stranger"))
    }

    fn stored_movie(title: &str, genre: &str) -> Movie {
        Movie::create(
            MovieContent {
                title: title.into(),
                director: "Anne Sewitsky".into(),
                release_year: 2011,
                genre: genre.into(),
                description: None,
                runtime: Some(90),
            },
            &owner(),
        )
    }

    fn service(movies: MockMovieRepository, reviews: MockReviewRepository) -> MovieService {
        MovieService::new(Arc::new(movies), Arc::new(reviews))
    }

    #[tokio::test]
    async fn create_rejects_release_year_out_of_range() {
        let mut movies = MockMovieRepository::new();
        movies.expect_insert().never();
        let svc = service(movies, MockReviewRepository::new());

        for year in [1887, current_year() + 6] {
            let input = NewMovie {
                title: "Too early or too late".into(),
                director: "Nobody".into(),
                release_year: Some(year),
                genre: "Drama".into(),
                ..Default::default()
            };
            let err = assert_err!(svc.create(&owner(), input).await);
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn create_stamps_owner() {
        let mut movies = MockMovieRepository::new();
        movies.expect_insert().times(1).returning(|m| Ok(m));
        let svc = service(movies, MockReviewRepository::new());

        let input = NewMovie {
            title: " Happy, Happy ".into(),
            director: "Anne Sewitsky".into(),
            release_year: Some(current_year() + 5),
            genre: "Comedy".into(),
            ..Default::default()
        };
        let movie = assert_ok!(svc.create(&owner(), input).await);
        assert_eq!(movie.created_by, "user_owner");
        assert_eq!(movie.title, "Happy, Happy");
    }

    #[tokio::test]
    async fn stranger_cannot_update_or_delete() {
        let movie = stored_movie("Sonja", "Drama");
        let id = movie.id;

        let mut movies = MockMovieRepository::new();
        movies
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(movie.clone())));
        movies.expect_update().never();
        movies.expect_delete().never();
        let mut reviews = MockReviewRepository::new();
        reviews.expect_delete_by_movie().never();
        let svc = service(movies, reviews);

        let patch = MoviePatch {
            title: Some("Mine now".into()),
            ..Default::default()
        };
        let err = assert_err!(svc.update(&stranger(), id, patch).await);
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = assert_err!(svc.delete(&stranger(), id).await);
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_of_missing_movie_is_not_found() {
        let mut movies = MockMovieRepository::new();
        movies.expect_find_by_id().returning(|_| Ok(None));
        let svc = service(movies, MockReviewRepository::new());

        let err = assert_err!(svc.update(&owner(), Uuid::now_v7(), MoviePatch::default()).await);
        assert!(matches!(err, DomainError::NotFound("Movie", _)));
    }

    #[tokio::test]
    async fn delete_cascades_reviews_first() {
        let movie = stored_movie("Sonja", "Drama");
        let id = movie.id;
        let mut seq = mockall::Sequence::new();

        let mut movies = MockMovieRepository::new();
        let mut reviews = MockReviewRepository::new();
        movies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(movie.clone())));
        reviews
            .expect_delete_by_movie()
            .with(eq(id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(3));
        movies
            .expect_delete()
            .with(eq(id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let svc = service(movies, reviews);
        assert_eq!(assert_ok!(svc.delete(&owner(), id).await), 3);
    }

    #[tokio::test]
    async fn catalog_attaches_stats_and_counts() {
        let drama = stored_movie("Kon-Tiki", "Drama");
        let mut comedy = stored_movie("Elling", "Comedy");
        comedy.created_at = Utc::now() - Duration::days(1);
        let drama_id = drama.id;

        let all = vec![drama.clone(), comedy.clone()];
        let mut movies = MockMovieRepository::new();
        movies.expect_list().returning(move || Ok(all.clone()));

        let review = Review::create(
            drama_id,
            &stranger(),
            ReviewContent {
                review_text: "Sails along nicely.".into(),
                rating: 4,
            },
        );
        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_list_all()
            .returning(move || Ok(vec![review.clone()]));

        let svc = service(movies, reviews);
        let mut filter = CatalogFilter::defaults(current_year());
        filter.genre = Some("Drama".into());
        filter.sort_by = SortBy::TitleAsc;

        let page = assert_ok!(svc.catalog(&filter).await);
        assert_eq!(page.total, 2);
        assert_eq!(page.shown, 1);
        assert!(page.filters_active);
        assert_eq!(page.available_genres, vec!["Comedy", "Drama"]);
        assert_eq!(page.movies[0].movie.id, drama_id);
        assert_eq!(page.movies[0].stats.review_count, 1);
        assert_eq!(page.movies[0].stats.average_rating, Some(4.0));
    }

    #[tokio::test]
    async fn site_stats_aggregate_everything() {
        let mut movies = MockMovieRepository::new();
        movies.expect_count().returning(|| Ok(2));
        let mut reviews = MockReviewRepository::new();
        reviews.expect_list_all().returning(|| Ok(Vec::new()));

        let stats = assert_ok!(service(movies, reviews).site_stats().await);
        assert_eq!(stats.movie_count, 2);
        assert_eq!(stats.review_count, 0);
        assert_eq!(stats.average_rating, None);
    }
}
