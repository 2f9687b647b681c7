//! # Domain Models
//!
//! These structs represent the core entities of Buster Block.
//! We use UUID v7 for time-ordered, globally unique identification.
//! Field names serialize as camelCase to keep the JSON API stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A movie entry in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub director: String,
    pub release_year: i32,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Runtime in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<i32>,
    /// Identity-provider user id of the creator
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn create(input: MovieContent, owner: &AuthUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            director: input.director,
            release_year: input.release_year,
            genre: input.genre,
            description: input.description,
            runtime: input.runtime,
            created_by: owner.id.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: &AuthUser) -> bool {
        self.created_by == user.id
    }

    /// Applies a validated partial update and bumps `updated_at`.
    pub fn apply(&mut self, patch: MoviePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(director) = patch.director {
            self.director = director;
        }
        if let Some(year) = patch.release_year {
            self.release_year = year;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(description) = patch.description {
            // blank clears
            self.description = (!description.is_empty()).then_some(description);
        }
        if let Some(runtime) = patch.runtime {
            self.runtime = Some(runtime);
        }
        self.updated_at = Utc::now();
    }
}

/// Payload for `POST /api/movies`. Missing fields deserialize to their
/// defaults so validation can report them with a readable message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub release_year: Option<i32>,
    pub genre: String,
    pub description: Option<String>,
    pub runtime: Option<i32>,
}

/// Validated movie body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieContent {
    pub title: String,
    pub director: String,
    pub release_year: i32,
    pub genre: String,
    pub description: Option<String>,
    pub runtime: Option<i32>,
}

/// Payload for `PUT /api/movies/{id}`; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MoviePatch {
    pub title: Option<String>,
    pub director: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub runtime: Option<i32>,
}

/// A user's review of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub user_id: String,
    /// Display name captured when the review was written
    pub review_author: String,
    pub review_text: String,
    pub rating: u8,
    /// Users who marked this review helpful, in the order they did so
    #[serde(default)]
    pub helpful_by: Vec<String>,
    #[serde(default)]
    pub helpful_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn create(movie_id: Uuid, author: &AuthUser, content: ReviewContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            movie_id,
            user_id: author.id.clone(),
            review_author: author.display_name.clone(),
            review_text: content.review_text,
            rating: content.rating,
            helpful_by: Vec::new(),
            helpful_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: &AuthUser) -> bool {
        self.user_id == user.id
    }

    pub fn apply(&mut self, changes: ReviewChanges) {
        if let Some(text) = changes.review_text {
            self.review_text = text;
        }
        if let Some(rating) = changes.rating {
            self.rating = rating;
        }
        self.updated_at = Utc::now();
    }

    /// Flips `user_id`'s helpful mark and bumps `updated_at`. Returns `true`
    /// when the mark was added.
    ///
    /// The count follows the set: removal decrements (never below zero),
    /// insertion increments. Rows whose stored count drifted from the set are
    /// re-synced on the way through.
    pub fn toggle_helpful(&mut self, user_id: &str) -> bool {
        let liked = match self.helpful_by.iter().position(|u| u == user_id) {
            Some(idx) => {
                self.helpful_by.remove(idx);
                self.helpful_count = self.helpful_count.saturating_sub(1);
                false
            }
            None => {
                self.helpful_by.push(user_id.to_string());
                self.helpful_count += 1;
                true
            }
        };

        let actual = u32::try_from(self.helpful_by.len()).unwrap_or(u32::MAX);
        if self.helpful_count != actual {
            self.helpful_count = actual;
        }
        self.updated_at = Utc::now();
        liked
    }

    pub fn is_helpful_to(&self, user_id: &str) -> bool {
        self.helpful_by.iter().any(|u| u == user_id)
    }
}

/// Payload for `POST /api/movies/{id}/reviews`.
///
/// `rating` is any JSON number on the wire so out-of-range and fractional
/// values reach validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewReview {
    pub review_text: String,
    pub rating: Option<f64>,
}

/// Payload for `PUT /api/movies/{id}/reviews/{reviewId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewPatch {
    pub review_text: Option<String>,
    pub rating: Option<f64>,
}

/// Validated review body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewContent {
    pub review_text: String,
    pub rating: u8,
}

/// Validated partial review edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub review_text: Option<String>,
    pub rating: Option<u8>,
}

impl ReviewChanges {
    pub fn is_empty(&self) -> bool {
        self.review_text.is_none() && self.rating.is_none()
    }
}

/// Outcome of a helpful-vote toggle, returned verbatim to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulToggle {
    pub helpful_count: u32,
    pub helpful_by: Vec<String>,
    pub liked: bool,
}

impl From<(&Review, bool)> for HelpfulToggle {
    fn from((review, liked): (&Review, bool)) -> Self {
        Self {
            helpful_count: review.helpful_count,
            helpful_by: review.helpful_by.clone(),
            liked,
        }
    }
}

/// The caller, as established by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub display_name: String,
}

impl AuthUser {
    pub const ANONYMOUS_NAME: &'static str = "Anonymous";

    /// Derives the display name: "first last", then username, then "Anonymous".
    pub fn from_profile(
        id: impl Into<String>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> Self {
        fn non_blank(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        let display_name = match (non_blank(first_name), non_blank(last_name)) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => non_blank(username)
                .unwrap_or(Self::ANONYMOUS_NAME)
                .to_string(),
        };

        Self {
            id: id.into(),
            display_name,
        }
    }
}
