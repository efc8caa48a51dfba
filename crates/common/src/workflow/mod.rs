//! Paper lifecycle and peer-review workflow engine
//!
//! - `lifecycle`: role-gated paper status transition rules
//! - `assignment`: reviewer/editor bindings and the visibility rule
//! - `review`: review record state machine and score validation
//! - `aggregate`: rollup of completed reviews into decision summaries
//! - `engine`: transactional orchestration over the repository

pub mod aggregate;
pub mod assignment;
pub mod engine;
pub mod lifecycle;
pub mod review;

pub use aggregate::{average_score, RecommendationBreakdown, ReviewRollup};
pub use assignment::{check_not_already_assigned, AssignmentManager};
pub use engine::{NewPaper, NewRevision, PaperUpdate, ReviewSubmission, WorkflowEngine};
pub use lifecycle::{
    allowed_targets, check_metadata_edit, check_revision_submission, check_transition, Transition,
};
pub use review::{check_completion, ReviewScores};

#[cfg(test)]
mod tests {
    //! End-to-end walk through the editorial flow against the pure rules

    use super::*;
    use crate::auth::Role;
    use crate::db::models::PaperStatus;
    use uuid::Uuid;

    #[test]
    fn test_full_editorial_flow() {
        let editor = Role::Editor;
        let owner = Uuid::new_v4();

        // SUBMITTED -> UNDER_REVIEW
        assert!(check_transition(PaperStatus::Submitted, PaperStatus::UnderReview, editor).is_ok());

        // Reviewer scores (6,6,6,6) -> 6.0
        let scores = ReviewScores {
            quality: 6,
            originality: 6,
            clarity: 6,
            significance: 6,
        };
        assert!(scores.validate().is_ok());
        assert_eq!(scores.average(), 6.0);

        // UNDER_REVIEW -> REVISION_REQUIRED, author revises, back around
        assert!(check_transition(
            PaperStatus::UnderReview,
            PaperStatus::RevisionRequired,
            editor
        )
        .is_ok());
        assert_eq!(
            check_revision_submission(owner, owner, PaperStatus::RevisionRequired, 1).unwrap(),
            2
        );
        assert!(check_transition(PaperStatus::Revised, PaperStatus::UnderReview, editor).is_ok());

        // UNDER_REVIEW -> ACCEPTED -> PUBLISHED, then idempotent republish
        assert!(check_transition(PaperStatus::UnderReview, PaperStatus::Accepted, editor).is_ok());
        assert!(check_transition(PaperStatus::Accepted, PaperStatus::Published, editor).is_ok());
        assert_eq!(
            check_transition(PaperStatus::Published, PaperStatus::Published, editor).unwrap(),
            Transition::IdempotentPublish
        );
    }
}
