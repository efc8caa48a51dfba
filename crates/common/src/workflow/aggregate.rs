//! Score aggregator
//!
//! Rolls completed reviews up into a decision-supporting summary for
//! editors. Only reviews bound to the paper's current version
//! contribute; records from superseded versions are excluded here but
//! retained in storage for audit.

use crate::db::models::{Recommendation, Review, ReviewStatus};
use crate::workflow::review::round_one_decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Average score of a single review, defined only for completed reviews
pub fn average_score(review: &Review) -> Option<f64> {
    if review.status != ReviewStatus::Completed {
        return None;
    }

    match (
        review.quality_score,
        review.originality_score,
        review.clarity_score,
        review.significance_score,
    ) {
        (Some(q), Some(o), Some(c), Some(s)) => {
            Some(round_one_decimal(f64::from(q + o + c + s) / 4.0))
        }
        _ => None,
    }
}

/// Count of recommendations across completed reviews
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationBreakdown {
    pub accept: u32,
    pub minor_revision: u32,
    pub major_revision: u32,
    pub reject: u32,
}

impl RecommendationBreakdown {
    fn record(&mut self, recommendation: Recommendation) {
        match recommendation {
            Recommendation::Accept => self.accept += 1,
            Recommendation::MinorRevision => self.minor_revision += 1,
            Recommendation::MajorRevision => self.major_revision += 1,
            Recommendation::Reject => self.reject += 1,
        }
    }
}

/// Aggregated summary of completed reviews for one paper version.
/// Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRollup {
    pub paper_id: Uuid,
    pub version: i32,

    /// Completed reviews bound to this version
    pub review_count: usize,

    pub quality_mean: Option<f64>,
    pub originality_mean: Option<f64>,
    pub clarity_mean: Option<f64>,
    pub significance_mean: Option<f64>,

    /// Mean across all four dimensions of all contributing reviews
    pub overall_mean: Option<f64>,

    pub recommendations: RecommendationBreakdown,
}

impl ReviewRollup {
    /// Build the rollup for `version` from a paper's full review history
    pub fn for_version(paper_id: Uuid, version: i32, reviews: &[Review]) -> Self {
        let mut quality = Vec::new();
        let mut originality = Vec::new();
        let mut clarity = Vec::new();
        let mut significance = Vec::new();
        let mut recommendations = RecommendationBreakdown::default();
        let mut count = 0usize;

        for review in reviews {
            if review.status != ReviewStatus::Completed || review.paper_version != version {
                continue;
            }

            let (Some(q), Some(o), Some(c), Some(s)) = (
                review.quality_score,
                review.originality_score,
                review.clarity_score,
                review.significance_score,
            ) else {
                // Completed reviews always carry scores; skip rather
                // than poison the rollup if an old row is partial.
                continue;
            };

            quality.push(q);
            originality.push(o);
            clarity.push(c);
            significance.push(s);
            if let Some(recommendation) = review.recommendation {
                recommendations.record(recommendation);
            }
            count += 1;
        }

        let overall: Vec<i32> = quality
            .iter()
            .chain(&originality)
            .chain(&clarity)
            .chain(&significance)
            .copied()
            .collect();

        Self {
            paper_id,
            version,
            review_count: count,
            quality_mean: mean(&quality),
            originality_mean: mean(&originality),
            clarity_mean: mean(&clarity),
            significance_mean: mean(&significance),
            overall_mean: mean(&overall),
            recommendations,
        }
    }
}

fn mean(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i32 = values.iter().sum();
    Some(round_one_decimal(f64::from(sum) / values.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn completed_review(
        paper_id: Uuid,
        version: i32,
        scores: (i32, i32, i32, i32),
        recommendation: Recommendation,
    ) -> Review {
        let now = Utc::now().into();
        Review {
            id: Uuid::new_v4(),
            paper_id,
            reviewer_id: Uuid::new_v4(),
            paper_version: version,
            status: ReviewStatus::Completed,
            quality_score: Some(scores.0),
            originality_score: Some(scores.1),
            clarity_score: Some(scores.2),
            significance_score: Some(scores.3),
            comments: Some("solid work".to_string()),
            confidential_comments: None,
            recommendation: Some(recommendation),
            due_date: None,
            completed_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_average_score_single_review() {
        let review = completed_review(
            Uuid::new_v4(),
            1,
            (8, 7, 9, 6),
            Recommendation::MinorRevision,
        );
        assert_eq!(average_score(&review), Some(7.5));
    }

    #[test]
    fn test_average_undefined_for_incomplete() {
        let mut review = completed_review(Uuid::new_v4(), 1, (8, 7, 9, 6), Recommendation::Accept);
        review.status = ReviewStatus::InProgress;
        assert_eq!(average_score(&review), None);
    }

    #[test]
    fn test_rollup_counts_and_means() {
        let paper_id = Uuid::new_v4();
        let reviews = vec![
            completed_review(paper_id, 1, (8, 7, 9, 6), Recommendation::Accept),
            completed_review(paper_id, 1, (6, 6, 6, 6), Recommendation::MajorRevision),
        ];

        let rollup = ReviewRollup::for_version(paper_id, 1, &reviews);
        assert_eq!(rollup.review_count, 2);
        assert_eq!(rollup.quality_mean, Some(7.0));
        assert_eq!(rollup.originality_mean, Some(6.5));
        assert_eq!(rollup.clarity_mean, Some(7.5));
        assert_eq!(rollup.significance_mean, Some(6.0));
        assert_eq!(rollup.overall_mean, Some(6.8));
        assert_eq!(rollup.recommendations.accept, 1);
        assert_eq!(rollup.recommendations.major_revision, 1);
    }

    #[test]
    fn test_rollup_excludes_superseded_versions() {
        let paper_id = Uuid::new_v4();
        let reviews = vec![
            completed_review(paper_id, 1, (2, 2, 2, 2), Recommendation::Reject),
            completed_review(paper_id, 2, (9, 9, 9, 9), Recommendation::Accept),
        ];

        let rollup = ReviewRollup::for_version(paper_id, 2, &reviews);
        assert_eq!(rollup.review_count, 1);
        assert_eq!(rollup.overall_mean, Some(9.0));
        assert_eq!(rollup.recommendations.reject, 0);
        assert_eq!(rollup.recommendations.accept, 1);
    }

    #[test]
    fn test_rollup_excludes_open_and_cancelled_reviews() {
        let paper_id = Uuid::new_v4();
        let mut pending = completed_review(paper_id, 1, (5, 5, 5, 5), Recommendation::Accept);
        pending.status = ReviewStatus::Pending;
        let mut cancelled = completed_review(paper_id, 1, (5, 5, 5, 5), Recommendation::Accept);
        cancelled.status = ReviewStatus::Cancelled;

        let rollup = ReviewRollup::for_version(paper_id, 1, &[pending, cancelled]);
        assert_eq!(rollup.review_count, 0);
        assert_eq!(rollup.overall_mean, None);
    }
}
