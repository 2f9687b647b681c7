//! Review aggregates. Derived on every read, never stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Movie, Review};

/// Per-movie review figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub review_count: u64,
    /// Mean rating rounded to one decimal; `None` without reviews
    pub average_rating: Option<f64>,
}

impl ReviewStats {
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let (count, sum) = ratings
            .into_iter()
            .fold((0u64, 0u64), |(n, s), r| (n + 1, s + u64::from(r)));
        Self {
            review_count: count,
            average_rating: average(count, sum),
        }
    }
}

fn average(count: u64, sum: u64) -> Option<f64> {
    (count > 0).then(|| ((sum as f64 / count as f64) * 10.0).round() / 10.0)
}

/// Groups reviews by movie and summarizes each group.
pub fn stats_by_movie<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> HashMap<Uuid, ReviewStats> {
    let mut sums: HashMap<Uuid, (u64, u64)> = HashMap::new();
    for review in reviews {
        let entry = sums.entry(review.movie_id).or_default();
        entry.0 += 1;
        entry.1 += u64::from(review.rating);
    }
    sums.into_iter()
        .map(|(id, (count, sum))| {
            (
                id,
                ReviewStats {
                    review_count: count,
                    average_rating: average(count, sum),
                },
            )
        })
        .collect()
}

/// Site-wide totals for the landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    pub movie_count: u64,
    pub review_count: u64,
    pub average_rating: Option<f64>,
}

impl SiteStats {
    pub fn compute(movie_count: u64, reviews: &[Review]) -> Self {
        let overall = ReviewStats::from_ratings(reviews.iter().map(|r| r.rating));
        Self {
            movie_count,
            review_count: overall.review_count,
            average_rating: overall.average_rating,
        }
    }
}

/// A movie together with its review figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieWithStats {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(flatten)]
    pub stats: ReviewStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthUser, ReviewContent};

    fn review(movie_id: Uuid, user: &str, rating: u8) -> Review {
        Review::create(
            movie_id,
            &AuthUser::from_profile(user, None, None, Some(user)),
            ReviewContent {
                review_text: "Worth the ticket price.".into(),
                rating,
            },
        )
    }

    #[test]
    fn empty_has_no_average() {
        let stats = ReviewStats::from_ratings(std::iter::empty());
        assert_eq!(stats.review_count, 0);
        assert_eq!(stats.average_rating, None);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let stats = ReviewStats::from_ratings([5, 4, 4]);
        assert_eq!(stats.review_count, 3);
        assert_eq!(stats.average_rating, Some(4.3));
    }

    #[test]
    fn groups_by_movie() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let reviews = vec![review(a, "u1", 5), review(a, "u2", 2), review(b, "u1", 3)];

        let by_movie = stats_by_movie(&reviews);
        assert_eq!(by_movie[&a].review_count, 2);
        assert_eq!(by_movie[&a].average_rating, Some(3.5));
        assert_eq!(by_movie[&b].average_rating, Some(3.0));

        let site = SiteStats::compute(4, &reviews);
        assert_eq!(site.movie_count, 4);
        assert_eq!(site.review_count, 3);
        assert_eq!(site.average_rating, Some(3.3));
    }
}
