//! Review record state machine
//!
//! PENDING -> IN_PROGRESS -> COMPLETED (terminal). Submitting directly
//! from PENDING is permitted as an implicit start. Revoking an
//! assignment before completion cancels the record instead of deleting
//! it, preserving the audit trail.

use crate::db::models::ReviewStatus;
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

pub const SCORE_MIN: i32 = 1;
pub const SCORE_MAX: i32 = 10;

/// The four scoring dimensions of a completed review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewScores {
    pub quality: i32,
    pub originality: i32,
    pub clarity: i32,
    pub significance: i32,
}

impl ReviewScores {
    /// Validate that every dimension is an integer in [1, 10].
    /// The error names the offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("quality_score", self.quality),
            ("originality_score", self.originality),
            ("clarity_score", self.clarity),
            ("significance_score", self.significance),
        ] {
            if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
                return Err(AppError::Validation {
                    message: format!(
                        "{} must be between {} and {}, got {}",
                        field, SCORE_MIN, SCORE_MAX, value
                    ),
                    field: Some(field.to_string()),
                });
            }
        }
        Ok(())
    }

    /// Mean of the four dimensions, rounded to one decimal place
    pub fn average(&self) -> f64 {
        let sum = self.quality + self.originality + self.clarity + self.significance;
        round_one_decimal(f64::from(sum) / 4.0)
    }
}

/// Round to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Check that a review may move PENDING -> IN_PROGRESS
pub fn check_start(status: ReviewStatus) -> Result<()> {
    match status {
        ReviewStatus::Pending => Ok(()),
        other => Err(AppError::InvalidState {
            message: format!("Review cannot be started from {} status", other),
        }),
    }
}

/// Check that a review may be submitted (completed).
/// PENDING is allowed as an implicit start.
pub fn check_submit(status: ReviewStatus) -> Result<()> {
    match status {
        ReviewStatus::Pending | ReviewStatus::InProgress => Ok(()),
        other => Err(AppError::InvalidState {
            message: format!("Review cannot be submitted from {} status", other),
        }),
    }
}

/// Full completion check: scores are validated before the record's
/// state is consulted, so a validation failure never touches the review.
pub fn check_completion(status: ReviewStatus, scores: &ReviewScores) -> Result<()> {
    scores.validate()?;
    check_submit(status)
}

/// Check that a review may still be cancelled (assignment revocation)
pub fn check_cancel(status: ReviewStatus) -> Result<()> {
    match status {
        ReviewStatus::Pending | ReviewStatus::InProgress => Ok(()),
        other => Err(AppError::InvalidState {
            message: format!("Review cannot be cancelled from {} status", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_to_one_decimal() {
        let scores = ReviewScores {
            quality: 8,
            originality: 7,
            clarity: 9,
            significance: 6,
        };
        assert_eq!(scores.average(), 7.5);

        let scores = ReviewScores {
            quality: 6,
            originality: 6,
            clarity: 6,
            significance: 6,
        };
        assert_eq!(scores.average(), 6.0);

        // 7 + 7 + 7 + 8 = 29 / 4 = 7.25 -> 7.3
        let scores = ReviewScores {
            quality: 7,
            originality: 7,
            clarity: 7,
            significance: 8,
        };
        assert_eq!(scores.average(), 7.3);
    }

    #[test]
    fn test_score_bounds() {
        let valid = ReviewScores {
            quality: 1,
            originality: 10,
            clarity: 5,
            significance: 7,
        };
        assert!(valid.validate().is_ok());

        let low = ReviewScores {
            quality: 0,
            originality: 5,
            clarity: 5,
            significance: 5,
        };
        match low.validate().unwrap_err() {
            AppError::Validation { field, .. } => {
                assert_eq!(field.as_deref(), Some("quality_score"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let high = ReviewScores {
            quality: 5,
            originality: 5,
            clarity: 5,
            significance: 11,
        };
        match high.validate().unwrap_err() {
            AppError::Validation { field, .. } => {
                assert_eq!(field.as_deref(), Some("significance_score"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_allowed_from_pending_and_in_progress() {
        assert!(check_submit(ReviewStatus::Pending).is_ok());
        assert!(check_submit(ReviewStatus::InProgress).is_ok());
        assert!(check_submit(ReviewStatus::Completed).is_err());
        assert!(check_submit(ReviewStatus::Cancelled).is_err());
    }

    #[test]
    fn test_invalid_scores_fail_before_status() {
        let bad = ReviewScores {
            quality: 11,
            originality: 5,
            clarity: 5,
            significance: 5,
        };
        // Validation wins regardless of the record's state
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::InProgress,
            ReviewStatus::Completed,
            ReviewStatus::Cancelled,
        ] {
            assert!(matches!(
                check_completion(status, &bad).unwrap_err(),
                AppError::Validation { .. }
            ));
        }

        let good = ReviewScores {
            quality: 5,
            originality: 5,
            clarity: 5,
            significance: 5,
        };
        assert!(check_completion(ReviewStatus::InProgress, &good).is_ok());
        assert!(matches!(
            check_completion(ReviewStatus::Completed, &good).unwrap_err(),
            AppError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_start_only_from_pending() {
        assert!(check_start(ReviewStatus::Pending).is_ok());
        assert!(check_start(ReviewStatus::InProgress).is_err());
        assert!(check_start(ReviewStatus::Completed).is_err());
    }

    #[test]
    fn test_completed_cannot_be_cancelled() {
        assert!(check_cancel(ReviewStatus::Pending).is_ok());
        assert!(check_cancel(ReviewStatus::Completed).is_err());
    }
}
