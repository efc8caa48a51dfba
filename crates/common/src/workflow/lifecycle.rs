//! Paper lifecycle state machine
//!
//! Pure transition rules for the editorial workflow:
//!
//! ```text
//! SUBMITTED -> UNDER_REVIEW -> { REVISION_REQUIRED -> REVISED -> UNDER_REVIEW }
//!                           -> ACCEPTED -> PUBLISHED -> ARCHIVED
//!                           -> REJECTED
//! ```
//!
//! PUBLISHED and ARCHIVED are terminal for the normal flow; REJECTED is
//! terminal. Admins may force any transition, surfaced as an explicit,
//! audited override rather than a silent allowance.

use crate::auth::Role;
use crate::db::models::PaperStatus;
use crate::errors::{AppError, Result};
use uuid::Uuid;

/// Outcome of a transition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status is reachable per the lifecycle table
    Normal,
    /// Not normally reachable; permitted because the actor is an admin
    AdminOverride,
    /// Re-publishing an already published paper; a no-op that reports
    /// success and leaves published_at untouched
    IdempotentPublish,
}

/// Statuses reachable from `from` through the normal editorial flow
pub fn allowed_targets(from: PaperStatus) -> &'static [PaperStatus] {
    match from {
        PaperStatus::Submitted => &[PaperStatus::UnderReview],
        PaperStatus::UnderReview => &[
            PaperStatus::RevisionRequired,
            PaperStatus::Accepted,
            PaperStatus::Rejected,
        ],
        PaperStatus::RevisionRequired => &[PaperStatus::Revised],
        PaperStatus::Revised => &[PaperStatus::UnderReview],
        PaperStatus::Accepted => &[PaperStatus::Published],
        PaperStatus::Rejected => &[],
        PaperStatus::Published => &[PaperStatus::Archived],
        PaperStatus::Archived => &[],
    }
}

/// Validate a requested status change for the acting role.
///
/// Fails `Forbidden` for non-editorial roles and `InvalidTransition` when
/// the target is unreachable, unless the actor is an admin.
pub fn check_transition(from: PaperStatus, to: PaperStatus, role: Role) -> Result<Transition> {
    if !role.is_editorial() {
        return Err(AppError::Forbidden {
            message: "Only editors and admins may change paper status".to_string(),
        });
    }

    if from == PaperStatus::Published && to == PaperStatus::Published {
        return Ok(Transition::IdempotentPublish);
    }

    if allowed_targets(from).contains(&to) {
        return Ok(Transition::Normal);
    }

    if role.is_admin() {
        return Ok(Transition::AdminOverride);
    }

    Err(AppError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// Gate for a revision submission: only the owner may revise, and only
/// from REVISION_REQUIRED. Returns the next version number, so versions
/// are strictly sequential with no gaps.
pub fn check_revision_submission(
    actor_id: Uuid,
    owner_id: Uuid,
    status: PaperStatus,
    current_version: i32,
) -> Result<i32> {
    if actor_id != owner_id {
        return Err(AppError::Forbidden {
            message: "Only the paper owner may submit a revision".to_string(),
        });
    }
    if status != PaperStatus::RevisionRequired {
        return Err(AppError::InvalidState {
            message: format!(
                "Revisions may only be submitted from REVISION_REQUIRED status, paper is {}",
                status
            ),
        });
    }
    Ok(current_version + 1)
}

/// Author-side metadata edits are allowed only until an editorial
/// decision is reached.
pub fn check_metadata_edit(status: PaperStatus) -> Result<()> {
    match status {
        PaperStatus::Submitted
        | PaperStatus::UnderReview
        | PaperStatus::RevisionRequired
        | PaperStatus::Revised => Ok(()),
        other => Err(AppError::InvalidState {
            message: format!("Paper metadata cannot be edited in {} status", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_flow() {
        assert_eq!(
            check_transition(PaperStatus::Submitted, PaperStatus::UnderReview, Role::Editor)
                .unwrap(),
            Transition::Normal
        );
        assert_eq!(
            check_transition(
                PaperStatus::UnderReview,
                PaperStatus::RevisionRequired,
                Role::Editor
            )
            .unwrap(),
            Transition::Normal
        );
        assert_eq!(
            check_transition(PaperStatus::Revised, PaperStatus::UnderReview, Role::Editor)
                .unwrap(),
            Transition::Normal
        );
        assert_eq!(
            check_transition(PaperStatus::Accepted, PaperStatus::Published, Role::Editor)
                .unwrap(),
            Transition::Normal
        );
        assert_eq!(
            check_transition(PaperStatus::Published, PaperStatus::Archived, Role::Editor)
                .unwrap(),
            Transition::Normal
        );
    }

    #[test]
    fn test_skipping_states_rejected_for_editor() {
        let err =
            check_transition(PaperStatus::Submitted, PaperStatus::Published, Role::Editor)
                .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn test_rejected_is_terminal_for_editor() {
        let err =
            check_transition(PaperStatus::Rejected, PaperStatus::UnderReview, Role::Editor)
                .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn test_admin_override() {
        assert_eq!(
            check_transition(PaperStatus::Rejected, PaperStatus::UnderReview, Role::Admin)
                .unwrap(),
            Transition::AdminOverride
        );
        assert_eq!(
            check_transition(PaperStatus::Archived, PaperStatus::Submitted, Role::Admin)
                .unwrap(),
            Transition::AdminOverride
        );
    }

    #[test]
    fn test_non_editorial_roles_forbidden() {
        for role in [Role::Author, Role::Reviewer] {
            let err =
                check_transition(PaperStatus::Submitted, PaperStatus::UnderReview, role)
                    .unwrap_err();
            assert!(matches!(err, AppError::Forbidden { .. }));
        }
    }

    #[test]
    fn test_revision_gate() {
        let owner = Uuid::new_v4();

        assert_eq!(
            check_revision_submission(owner, owner, PaperStatus::RevisionRequired, 3).unwrap(),
            4
        );

        let err = check_revision_submission(
            Uuid::new_v4(),
            owner,
            PaperStatus::RevisionRequired,
            3,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[test]
    fn test_revision_only_from_revision_required() {
        let owner = Uuid::new_v4();
        for status in [
            PaperStatus::Submitted,
            PaperStatus::UnderReview,
            PaperStatus::Revised,
            PaperStatus::Accepted,
            PaperStatus::Rejected,
            PaperStatus::Published,
            PaperStatus::Archived,
        ] {
            let err = check_revision_submission(owner, owner, status, 1).unwrap_err();
            assert!(matches!(err, AppError::InvalidState { .. }));
        }
    }

    #[test]
    fn test_versions_strictly_sequential() {
        let owner = Uuid::new_v4();
        let mut version = 1;
        for expected in [2, 3, 4] {
            version =
                check_revision_submission(owner, owner, PaperStatus::RevisionRequired, version)
                    .unwrap();
            assert_eq!(version, expected);
        }
    }

    #[test]
    fn test_metadata_edits_end_at_decision() {
        for status in [
            PaperStatus::Submitted,
            PaperStatus::UnderReview,
            PaperStatus::RevisionRequired,
            PaperStatus::Revised,
        ] {
            assert!(check_metadata_edit(status).is_ok());
        }
        for status in [
            PaperStatus::Accepted,
            PaperStatus::Rejected,
            PaperStatus::Published,
            PaperStatus::Archived,
        ] {
            assert!(matches!(
                check_metadata_edit(status).unwrap_err(),
                AppError::InvalidState { .. }
            ));
        }
    }

    #[test]
    fn test_republish_is_idempotent() {
        assert_eq!(
            check_transition(PaperStatus::Published, PaperStatus::Published, Role::Editor)
                .unwrap(),
            Transition::IdempotentPublish
        );
        assert_eq!(
            check_transition(PaperStatus::Published, PaperStatus::Published, Role::Admin)
                .unwrap(),
            Transition::IdempotentPublish
        );
    }
}
