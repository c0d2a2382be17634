//! Engagement statistics over a sample of posts.
//!
//! The engagement rate is the mean number of interactions (likes plus
//! comments) per post, as a percentage of the follower count.

use crate::models::PostSnapshot;
use serde::{Deserialize, Serialize};

/// Decimal places kept for averages and the engagement rate.
pub const DECIMAL_PLACES: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub total_likes: u64,
    pub total_comments: u64,
    pub average_likes: f64,
    pub average_comments: f64,
    pub engagement_rate: f64,
    pub posts_analyzed: usize,
}

/// `None` for an empty sample; there is nothing to average.
pub fn summarize(posts: &[PostSnapshot], follower_count: u64) -> Option<EngagementSummary> {
    if posts.is_empty() {
        return None;
    }

    let total_likes: u64 = posts.iter().map(|post| post.like_count).sum();
    let total_comments: u64 = posts.iter().map(|post| post.comment_count).sum();
    let post_count = posts.len() as f64;

    let engagement_rate = if follower_count > 0 {
        ((total_likes + total_comments) as f64 / post_count) / follower_count as f64 * 100.0
    } else {
        0.0
    };

    Some(EngagementSummary {
        total_likes,
        total_comments,
        average_likes: round_to(total_likes as f64 / post_count, DECIMAL_PLACES),
        average_comments: round_to(total_comments as f64 / post_count, DECIMAL_PLACES),
        engagement_rate: round_to(engagement_rate, DECIMAL_PLACES),
        posts_analyzed: posts.len(),
    })
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(likes: u64, comments: u64) -> PostSnapshot {
        PostSnapshot {
            post_number: 1,
            shortcode: "abc".into(),
            url: "https://www.instagram.com/p/abc/".into(),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            like_count: likes,
            comment_count: comments,
            is_video: false,
            caption: None,
            hashtags: vec![],
            location_name: None,
        }
    }

    fn posts(pairs: &[(u64, u64)]) -> Vec<PostSnapshot> {
        pairs.iter().map(|&(l, c)| post(l, c)).collect()
    }

    #[test]
    fn worked_example() {
        let summary = summarize(&posts(&[(10, 1), (20, 2), (30, 3)]), 100).unwrap();

        assert_eq!(summary.total_likes, 60);
        assert_eq!(summary.total_comments, 6);
        assert_eq!(summary.average_likes, 20.0);
        assert_eq!(summary.average_comments, 2.0);
        assert_eq!(summary.engagement_rate, 22.0);
        assert_eq!(summary.posts_analyzed, 3);
    }

    #[test]
    fn empty_sample_has_no_summary() {
        assert_eq!(summarize(&[], 0), None);
        assert_eq!(summarize(&[], 1_000), None);
    }

    #[test]
    fn zero_followers_means_zero_rate() {
        let summary = summarize(&posts(&[(5, 5), (100, 0)]), 0).unwrap();
        assert_eq!(summary.engagement_rate, 0.0);
        assert_eq!(summary.average_likes, 52.5);
    }

    #[test]
    fn averages_and_rate_follow_the_formula() {
        let samples: &[(&[(u64, u64)], u64)] = &[
            (&[(1, 0)], 3),
            (&[(7, 2), (3, 1)], 9_999),
            (&[(1_234, 56), (789, 10), (0, 0), (42, 4)], 1_000_000),
        ];

        for (pairs, followers) in samples {
            let sample = posts(pairs);
            let summary = summarize(&sample, *followers).unwrap();
            let len = sample.len() as f64;

            assert_eq!(
                summary.average_likes,
                round_to(summary.total_likes as f64 / len, DECIMAL_PLACES)
            );
            let expected_rate = ((summary.total_likes + summary.total_comments) as f64 / len)
                / *followers as f64
                * 100.0;
            assert_eq!(summary.engagement_rate, round_to(expected_rate, DECIMAL_PLACES));
        }
    }

    #[test]
    fn rounding_keeps_two_places() {
        assert_eq!(round_to(1.0 / 3.0, 2), 0.33);
        assert_eq!(round_to(2.0 / 3.0, 1), 0.7);
        assert_eq!(round_to(33.333_333, 2), 33.33);
    }
}
