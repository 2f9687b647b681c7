//! # Catalog filtering
//!
//! The catalog view is a pure function over the full movie list: search,
//! genre, year range, then sort. Nothing here touches storage.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::models::Movie;
use crate::validation::{max_release_year, MIN_RELEASE_YEAR};

/// Sort orders offered by the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Most recently added first
    #[default]
    Newest,
    Oldest,
    TitleAsc,
    TitleDesc,
    YearAsc,
    YearDesc,
}

impl SortBy {
    pub const ALL: [SortBy; 6] = [
        SortBy::Newest,
        SortBy::Oldest,
        SortBy::TitleAsc,
        SortBy::TitleDesc,
        SortBy::YearAsc,
        SortBy::YearDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::Oldest => "oldest",
            SortBy::TitleAsc => "title-asc",
            SortBy::TitleDesc => "title-desc",
            SortBy::YearAsc => "year-asc",
            SortBy::YearDesc => "year-desc",
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("Unknown sort order: {s}")))
    }
}

/// Filter state for the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    pub search: String,
    /// Exact genre to keep; `None` keeps all
    pub genre: Option<String>,
    /// Inclusive release-year window
    pub year_range: (i32, i32),
    pub sort_by: SortBy,
}

impl CatalogFilter {
    /// The untouched filter: everything visible, newest first.
    pub fn defaults(current_year: i32) -> Self {
        Self {
            search: String::new(),
            genre: None,
            year_range: (MIN_RELEASE_YEAR, max_release_year(current_year)),
            sort_by: SortBy::Newest,
        }
    }

    /// True when any field differs from [`CatalogFilter::defaults`].
    pub fn is_active(&self, current_year: i32) -> bool {
        let defaults = Self::defaults(current_year);
        !self.search.is_empty()
            || self.genre.is_some()
            || self.sort_by != defaults.sort_by
            || self.year_range != defaults.year_range
    }

    fn matches(&self, movie: &Movie, needle: &str) -> bool {
        if !needle.is_empty()
            && ![&movie.title, &movie.director, &movie.genre]
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
        {
            return false;
        }

        if let Some(genre) = &self.genre {
            if &movie.genre != genre {
                return false;
            }
        }

        let (from, to) = self.year_range;
        (from..=to).contains(&movie.release_year)
    }

    /// Applies search, genre and year filters, then sorts. Input order is kept
    /// for ties.
    pub fn apply(&self, movies: impl IntoIterator<Item = Movie>) -> Vec<Movie> {
        let needle = self.search.to_lowercase();
        let mut result: Vec<Movie> = movies
            .into_iter()
            .filter(|m| self.matches(m, &needle))
            .collect();

        match self.sort_by {
            SortBy::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Oldest => result.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortBy::TitleAsc => result.sort_by(|a, b| collate(&a.title, &b.title)),
            SortBy::TitleDesc => result.sort_by(|a, b| collate(&b.title, &a.title)),
            SortBy::YearAsc => result.sort_by_key(|m| m.release_year),
            SortBy::YearDesc => result.sort_by(|a, b| b.release_year.cmp(&a.release_year)),
        }

        result
    }
}

/// Distinct genres in use, sorted.
pub fn available_genres<'a>(movies: impl IntoIterator<Item = &'a Movie>) -> Vec<String> {
    let mut genres: Vec<String> = movies.into_iter().map(|m| m.genre.clone()).collect();
    genres.sort_by(|a, b| collate(a, b));
    genres.dedup();
    genres
}

/// Compares two strings the way a Norwegian reader expects a title list to be
/// ordered: case-insensitive, accents folded onto their base letter, and
/// `æ ø å` after `z`. Falls back to a plain comparison to break ties so the
/// order is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(collation_weights)
        .cmp(b.chars().flat_map(collation_weights));
    primary.then_with(|| a.cmp(b))
}

/// Primary weights for one character. Letters map to their base letter's
/// weight; everything else sorts by code point ahead of letters' extended
/// range.
fn collation_weights(c: char) -> Vec<u32> {
    const LETTER_BASE: u32 = 0x1_0000;

    let letter = |l: char| LETTER_BASE + (l as u32 - 'a' as u32);
    let after_z = |n: u32| LETTER_BASE + 26 + n;

    let lower: Vec<char> = c.to_lowercase().collect();
    lower
        .into_iter()
        .flat_map(|c| match c {
            'a'..='z' => vec![letter(c)],
            'æ' | 'ä' => vec![after_z(0)],
            'ø' | 'ö' => vec![after_z(1)],
            'å' => vec![after_z(2)],
            'à' | 'á' | 'â' | 'ã' | 'ā' => vec![letter('a')],
            'ç' | 'č' | 'ć' => vec![letter('c')],
            'è' | 'é' | 'ê' | 'ë' | 'ē' => vec![letter('e')],
            'ì' | 'í' | 'î' | 'ï' => vec![letter('i')],
            'ñ' => vec![letter('n')],
            'ò' | 'ó' | 'ô' | 'õ' => vec![letter('o')],
            'ù' | 'ú' | 'û' | 'ü' => vec![letter('u')],
            'ý' | 'ÿ' => vec![letter('y')],
            'š' | 'ś' => vec![letter('s')],
            'ž' | 'ź' | 'ż' => vec![letter('z')],
            'ß' => vec![letter('s'), letter('s')],
            other if other.is_ascii() => vec![other as u32],
            other => vec![LETTER_BASE + 64 + other as u32],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn movie(title: &str, genre: &str, year: i32, age_days: i64) -> Movie {
        let created = Utc::now() - Duration::days(age_days);
        Movie {
            id: Uuid::now_v7(),
            title: title.into(),
            director: "Someone".into(),
            release_year: year,
            genre: genre.into(),
            description: None,
            runtime: None,
            created_by: "user_1".into(),
            created_at: created,
            updated_at: created,
        }
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    fn sample() -> Vec<Movie> {
        vec![
            movie("Oslo, 31. august", "Drama", 2011, 1),
            movie("Trollhunter", "Fantasy", 2010, 2),
            movie("Ådalen 31", "Drama", 1969, 3),
            movie("Elling", "Comedy", 2001, 4),
            movie("Øyenstikker", "Drama", 1999, 5),
        ]
    }

    #[test]
    fn genre_filter_is_exact() {
        let mut filter = CatalogFilter::defaults(2026);
        filter.genre = Some("Drama".into());
        let result = filter.apply(sample());
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|m| m.genre == "Drama"));

        filter.genre = Some("drama".into());
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn title_asc_uses_norwegian_alphabet() {
        let mut filter = CatalogFilter::defaults(2026);
        filter.sort_by = SortBy::TitleAsc;
        let result = filter.apply(sample());
        assert_eq!(
            titles(&result),
            vec!["Elling", "Oslo, 31. august", "Trollhunter", "Øyenstikker", "Ådalen 31"]
        );

        filter.sort_by = SortBy::TitleDesc;
        let result = filter.apply(sample());
        assert_eq!(titles(&result).first(), Some(&"Ådalen 31"));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut filter = CatalogFilter::defaults(2026);
        filter.search = "FANTASY".into();
        assert_eq!(titles(&filter.apply(sample())), vec!["Trollhunter"]);

        filter.search = "someone".into();
        assert_eq!(filter.apply(sample()).len(), 5);
    }

    #[test]
    fn year_range_is_inclusive() {
        let mut filter = CatalogFilter::defaults(2026);
        filter.year_range = (1999, 2010);
        filter.sort_by = SortBy::YearAsc;
        assert_eq!(
            titles(&filter.apply(sample())),
            vec!["Øyenstikker", "Elling", "Trollhunter"]
        );
    }

    #[test]
    fn newest_and_oldest_follow_created_at() {
        let filter = CatalogFilter::defaults(2026);
        assert_eq!(titles(&filter.apply(sample()))[0], "Oslo, 31. august");

        let oldest = CatalogFilter {
            sort_by: SortBy::Oldest,
            ..filter
        };
        assert_eq!(titles(&oldest.apply(sample()))[0], "Øyenstikker");
    }

    #[test]
    fn genres_are_distinct_and_sorted() {
        assert_eq!(
            available_genres(&sample()),
            vec!["Comedy", "Drama", "Fantasy"]
        );
    }

    #[test]
    fn active_only_when_changed() {
        let mut filter = CatalogFilter::defaults(2026);
        assert!(!filter.is_active(2026));
        filter.year_range.1 = 2020;
        assert!(filter.is_active(2026));
    }

    #[test]
    fn sort_keys_round_trip_through_str() {
        for sort in SortBy::ALL {
            assert_eq!(sort.as_str().parse::<SortBy>(), Ok(sort));
        }
        assert!("popular".parse::<SortBy>().is_err());
    }

    #[test]
    fn collation_folds_case_and_accents() {
        assert_eq!(collate("Émile", "Fanny"), Ordering::Less);
        assert_ne!(collate("amélie", "Amelie"), Ordering::Equal);
        assert_eq!(collate("Zorro", "Æon"), Ordering::Less);
        assert_eq!(collate("Cafe", "café 2"), Ordering::Less);
    }
}
