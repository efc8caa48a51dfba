//! Review assignment bookkeeping
//!
//! Maintains the paper-to-reviewer and paper-to-editor relations and the
//! access rule built on them: a reviewer may only see a paper's detail
//! for papers they are bound to, plus their own submissions. Published
//! papers are visible to everyone.

use crate::auth::{Role, UserContext};
use crate::db::models::{Paper, PaperStatus};
use crate::db::Repository;
use crate::errors::{AppError, Result};
use uuid::Uuid;

/// Reviewer eligibility at assignment time. Role changes later do not
/// retroactively revoke existing assignments.
pub fn check_reviewer_eligible(role: Role) -> Result<()> {
    if role.can_review() {
        Ok(())
    } else {
        Err(AppError::Validation {
            message: format!("Role {} is not eligible to review", role),
            field: Some("reviewer_role".to_string()),
        })
    }
}

/// Editor eligibility at assignment time
pub fn check_editor_eligible(role: Role) -> Result<()> {
    if role.is_editorial() {
        Ok(())
    } else {
        Err(AppError::Validation {
            message: format!("Role {} is not eligible to act as editor", role),
            field: Some("editor_role".to_string()),
        })
    }
}

/// Duplicate-assignment predicate. `already_assigned` is the relation
/// lookup result; a second binding of the same reviewer to the same
/// paper is a conflict.
pub fn check_not_already_assigned(
    already_assigned: bool,
    paper_id: Uuid,
    reviewer_id: Uuid,
) -> Result<()> {
    if already_assigned {
        Err(AppError::DuplicateAssignment {
            paper_id: paper_id.to_string(),
            reviewer_id: reviewer_id.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Paper-detail visibility rule. `is_assigned_reviewer` is the relation
/// lookup result for the acting user.
pub fn can_view_paper(ctx: &UserContext, paper: &Paper, is_assigned_reviewer: bool) -> bool {
    if ctx.role.is_editorial() {
        return true;
    }
    if paper.owner_id == ctx.id {
        return true;
    }
    if paper.status == PaperStatus::Published {
        return true;
    }
    is_assigned_reviewer || paper.assigned_editor_id == Some(ctx.id)
}

/// Assignment relation lookups backed by the repository
pub struct AssignmentManager<'a> {
    repo: &'a Repository,
}

impl<'a> AssignmentManager<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Whether the user is bound to the paper as reviewer or editor
    pub async fn is_assigned(&self, paper: &Paper, user_id: Uuid) -> Result<bool> {
        if paper.assigned_editor_id == Some(user_id) {
            return Ok(true);
        }
        self.repo.is_reviewer_assigned(paper.id, user_id).await
    }

    /// Enforce the paper-detail visibility rule for the acting user
    pub async fn ensure_can_view(&self, ctx: &UserContext, paper: &Paper) -> Result<()> {
        let assigned = if ctx.role == Role::Reviewer {
            self.repo.is_reviewer_assigned(paper.id, ctx.id).await?
        } else {
            false
        };

        if can_view_paper(ctx, paper, assigned) {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                message: "Not permitted to access this paper".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn paper(owner_id: Uuid, status: PaperStatus) -> Paper {
        let now = Utc::now().into();
        Paper {
            id: Uuid::new_v4(),
            title: "On Testing".to_string(),
            abstract_text: "A study.".to_string(),
            keywords: None,
            owner_id,
            current_version: 1,
            status,
            editor_comments: None,
            plagiarism_score: None,
            plagiarism_report: None,
            assigned_editor_id: None,
            file_ref: None,
            submitted_at: now,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reviewer_eligibility() {
        assert!(check_reviewer_eligible(Role::Reviewer).is_ok());
        assert!(check_reviewer_eligible(Role::Editor).is_ok());
        assert!(check_reviewer_eligible(Role::Admin).is_ok());
        assert!(check_reviewer_eligible(Role::Author).is_err());
    }

    #[test]
    fn test_editor_eligibility() {
        assert!(check_editor_eligible(Role::Editor).is_ok());
        assert!(check_editor_eligible(Role::Reviewer).is_err());
    }

    #[test]
    fn test_second_assignment_conflicts() {
        let paper_id = Uuid::new_v4();
        let reviewer_id = Uuid::new_v4();

        assert!(check_not_already_assigned(false, paper_id, reviewer_id).is_ok());

        let err = check_not_already_assigned(true, paper_id, reviewer_id).unwrap_err();
        assert!(matches!(err, AppError::DuplicateAssignment { .. }));
    }

    #[test]
    fn test_owner_sees_own_paper() {
        let owner = Uuid::new_v4();
        let ctx = UserContext::new(owner, Role::Author);
        assert!(can_view_paper(&ctx, &paper(owner, PaperStatus::Submitted), false));
    }

    #[test]
    fn test_unassigned_reviewer_blocked() {
        let ctx = UserContext::new(Uuid::new_v4(), Role::Reviewer);
        let p = paper(Uuid::new_v4(), PaperStatus::UnderReview);
        assert!(!can_view_paper(&ctx, &p, false));
        assert!(can_view_paper(&ctx, &p, true));
    }

    #[test]
    fn test_published_visible_to_all() {
        let ctx = UserContext::new(Uuid::new_v4(), Role::Author);
        assert!(can_view_paper(
            &ctx,
            &paper(Uuid::new_v4(), PaperStatus::Published),
            false
        ));
    }

    #[test]
    fn test_editorial_roles_see_everything() {
        let ctx = UserContext::new(Uuid::new_v4(), Role::Editor);
        assert!(can_view_paper(
            &ctx,
            &paper(Uuid::new_v4(), PaperStatus::Submitted),
            false
        ));
    }
}
