//! # Postgres repositories
//!
//! Maps the `movies` and `reviews` tables onto the domain models. The
//! `(movie_id, user_id)` unique constraint is what rejects duplicate reviews;
//! its violation comes back as [`DomainError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{DomainError, Movie, MovieRepository, Result, Review, ReviewRepository};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::error;
use uuid::Uuid;

/// Embedded migrations from `crates/storage-adapters/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens the pool once at start-up; handlers share it through the repositories.
pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

pub async fn migrate(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

fn db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DomainError::Conflict(db.constraint().unwrap_or("unique").to_string());
        }
    }
    error!(error = %err, "database error");
    DomainError::internal(err)
}

#[derive(FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    director: String,
    release_year: i32,
    genre: String,
    description: Option<String>,
    runtime: Option<i32>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            director: row.director,
            release_year: row.release_year,
            genre: row.genre,
            description: row.description,
            runtime: row.runtime,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ReviewRow {
    id: Uuid,
    movie_id: Uuid,
    user_id: String,
    review_author: String,
    review_text: String,
    rating: i16,
    helpful_by: Vec<String>,
    helpful_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DomainError;

    fn try_from(row: ReviewRow) -> Result<Self> {
        let rating = u8::try_from(row.rating)
            .map_err(|_| DomainError::Internal(format!("review {} has rating {}", row.id, row.rating)))?;
        Ok(Review {
            id: row.id,
            movie_id: row.movie_id,
            user_id: row.user_id,
            review_author: row.review_author,
            review_text: row.review_text,
            rating,
            helpful_by: row.helpful_by,
            // negative counts from legacy rows floor at zero
            helpful_count: u32::try_from(row.helpful_count).unwrap_or(0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A review row plus whether the toggling user is now in its helpful set.
#[derive(FromRow)]
struct ToggledRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    liked: bool,
}

fn reviews_from_rows(rows: Vec<ReviewRow>) -> Result<Vec<Review>> {
    rows.into_iter().map(Review::try_from).collect()
}

const MOVIE_COLUMNS: &str = "id, title, director, release_year, genre, description, runtime, \
                             created_by, created_at, updated_at";

const REVIEW_COLUMNS: &str = "id, movie_id, user_id, review_author, review_text, rating, \
                              helpful_by, helpful_count, created_at, updated_at";

#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn insert(&self, movie: Movie) -> Result<Movie> {
        sqlx::query(
            "INSERT INTO movies (id, title, director, release_year, genre, description, runtime, \
             created_by, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(movie.release_year)
        .bind(&movie.genre)
        .bind(&movie.description)
        .bind(movie.runtime)
        .bind(&movie.created_by)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(movie)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>> {
        let row: Option<MovieRow> =
            sqlx::query_as(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(row.map(Movie::from))
    }

    async fn list(&self) -> Result<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn update(&self, movie: Movie) -> Result<Movie> {
        let result = sqlx::query(
            "UPDATE movies SET title = $2, director = $3, release_year = $4, genre = $5, \
             description = $6, runtime = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(movie.release_year)
        .bind(&movie.genre)
        .bind(&movie.description)
        .bind(movie.runtime)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::movie_not_found(movie.id));
        }
        Ok(movie)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn insert(&self, review: Review) -> Result<Review> {
        sqlx::query(
            "INSERT INTO reviews (id, movie_id, user_id, review_author, review_text, rating, \
             helpful_by, helpful_count, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(review.id)
        .bind(review.movie_id)
        .bind(&review.user_id)
        .bind(&review.review_author)
        .bind(&review.review_text)
        .bind(i16::from(review.rating))
        .bind(&review.helpful_by)
        .bind(i32::try_from(review.helpful_count).unwrap_or(i32::MAX))
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(review)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        let row: Option<ReviewRow> =
            sqlx::query_as(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        row.map(Review::try_from).transpose()
    }

    async fn list_by_movie(&self, movie_id: Uuid) -> Result<Vec<Review>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE movie_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        reviews_from_rows(rows)
    }

    async fn list_all(&self) -> Result<Vec<Review>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        reviews_from_rows(rows)
    }

    async fn update(&self, review: Review) -> Result<Review> {
        // The helpful set is left to `toggle_helpful`.
        let row: Option<ReviewRow> = sqlx::query_as(&format!(
            "UPDATE reviews SET review_text = $2, rating = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.id)
        .bind(&review.review_text)
        .bind(i16::from(review.rating))
        .bind(review.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => Review::try_from(row),
            None => Err(DomainError::review_not_found(review.id)),
        }
    }

    async fn toggle_helpful(&self, id: Uuid, user_id: &str) -> Result<Option<(Review, bool)>> {
        // SET expressions all see the old row, so the new set is spelled out
        // twice; RETURNING sees the new one.
        let row: Option<ToggledRow> = sqlx::query_as(&format!(
            "UPDATE reviews SET \
             helpful_by = CASE WHEN $2 = ANY(helpful_by) \
                 THEN array_remove(helpful_by, $2::text) \
                 ELSE array_append(helpful_by, $2::text) END, \
             helpful_count = cardinality(CASE WHEN $2 = ANY(helpful_by) \
                 THEN array_remove(helpful_by, $2::text) \
                 ELSE array_append(helpful_by, $2::text) END), \
             updated_at = $3 \
             WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}, $2 = ANY(helpful_by) AS liked"
        ))
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => Ok(Some((Review::try_from(row.review)?, row.liked))),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_movie(&self, movie_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reviews WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }
}
