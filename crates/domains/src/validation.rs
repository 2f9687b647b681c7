//! Field constraints for movie and review input.
//!
//! Validation trims text, checks bounds and returns a normalized copy. The
//! first failing constraint wins; its message goes to the client unchanged.

use chrono::{Datelike, Utc};

use crate::error::{DomainError, Result};
use crate::models::{
    MovieContent, MoviePatch, NewMovie, NewReview, ReviewChanges, ReviewContent, ReviewPatch,
};

pub const MIN_RELEASE_YEAR: i32 = 1888;
/// How many years ahead of the current one a release may be announced.
pub const FUTURE_RELEASE_WINDOW: i32 = 5;

pub const TITLE_MAX: usize = 200;
pub const DIRECTOR_MAX: usize = 100;
pub const GENRE_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 500;
pub const RUNTIME_RANGE: (i32, i32) = (1, 1000);
pub const REVIEW_TEXT_MIN: usize = 10;
pub const REVIEW_TEXT_MAX: usize = 2000;
pub const RATING_RANGE: (u8, u8) = (1, 5);

pub fn current_year() -> i32 {
    Utc::now().year()
}

pub fn max_release_year(current_year: i32) -> i32 {
    current_year + FUTURE_RELEASE_WINDOW
}

fn required_text(value: &str, max: usize, missing: &str, too_long: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(missing));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(too_long));
    }
    Ok(trimmed.to_string())
}

fn title(value: &str) -> Result<String> {
    required_text(
        value,
        TITLE_MAX,
        "Title is required",
        "Title cannot be more than 200 characters",
    )
}

fn director(value: &str) -> Result<String> {
    required_text(
        value,
        DIRECTOR_MAX,
        "Director is required",
        "Director name cannot be more than 100 characters",
    )
}

fn genre(value: &str) -> Result<String> {
    required_text(
        value,
        GENRE_MAX,
        "Genre is required",
        "Genre cannot be more than 50 characters",
    )
}

pub fn release_year(year: i32, current_year: i32) -> Result<i32> {
    if year < MIN_RELEASE_YEAR {
        return Err(DomainError::validation("Release year must be 1888 or later"));
    }
    if year > max_release_year(current_year) {
        return Err(DomainError::validation(
            "Release year cannot be more than 5 years in the future",
        ));
    }
    Ok(year)
}

/// Blank descriptions come back as an empty string so a patch can clear them.
fn description(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > DESCRIPTION_MAX {
        return Err(DomainError::validation(
            "Description cannot be more than 500 characters",
        ));
    }
    Ok(trimmed.to_string())
}

fn runtime(minutes: i32) -> Result<i32> {
    if minutes < RUNTIME_RANGE.0 {
        return Err(DomainError::validation("Runtime must be at least 1 minute"));
    }
    if minutes > RUNTIME_RANGE.1 {
        return Err(DomainError::validation("Runtime cannot exceed 1000 minutes"));
    }
    Ok(minutes)
}

fn review_text(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < REVIEW_TEXT_MIN {
        return Err(DomainError::validation("Review must be at least 10 characters"));
    }
    if len > REVIEW_TEXT_MAX {
        return Err(DomainError::validation(
            "Review cannot be more than 2000 characters",
        ));
    }
    Ok(trimmed.to_string())
}

fn rating(value: f64) -> Result<u8> {
    if value.fract() != 0.0 {
        return Err(DomainError::validation("Rating must be an integer"));
    }
    if value < f64::from(RATING_RANGE.0) || value > f64::from(RATING_RANGE.1) {
        return Err(DomainError::validation("Rating must be between 1 and 5"));
    }
    // Whole and within 1..=5, so the cast is exact.
    Ok(value as u8)
}

impl NewMovie {
    pub fn validate(&self, current_year: i32) -> Result<MovieContent> {
        let title = title(&self.title)?;
        let director = director(&self.director)?;
        let year = self
            .release_year
            .ok_or_else(|| DomainError::validation("Release year is required"))?;
        let release_year = release_year(year, current_year)?;
        let genre = genre(&self.genre)?;
        let description = match &self.description {
            Some(d) => Some(description(d)?).filter(|d| !d.is_empty()),
            None => None,
        };

        Ok(MovieContent {
            title,
            director,
            release_year,
            genre,
            description,
            runtime: self.runtime.map(runtime).transpose()?,
        })
    }
}

impl MoviePatch {
    pub fn validate(&self, current_year: i32) -> Result<MoviePatch> {
        Ok(MoviePatch {
            title: self.title.as_deref().map(title).transpose()?,
            director: self.director.as_deref().map(director).transpose()?,
            release_year: self
                .release_year
                .map(|y| release_year(y, current_year))
                .transpose()?,
            genre: self.genre.as_deref().map(genre).transpose()?,
            description: self.description.as_deref().map(description).transpose()?,
            runtime: self.runtime.map(runtime).transpose()?,
        })
    }
}

impl NewReview {
    pub fn validate(&self) -> Result<ReviewContent> {
        Ok(ReviewContent {
            review_text: review_text(&self.review_text)?,
            rating: rating(
                self.rating
                    .ok_or_else(|| DomainError::validation("Rating is required"))?,
            )?,
        })
    }
}

impl ReviewPatch {
    pub fn validate(&self) -> Result<ReviewChanges> {
        Ok(ReviewChanges {
            review_text: self.review_text.as_deref().map(review_text).transpose()?,
            rating: self.rating.map(rating).transpose()?,
        })
    }
}
