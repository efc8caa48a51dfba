//! Workflow engine
//!
//! Orchestrates the paper lifecycle: validates role-gated transitions,
//! creates revisions and review records, and triggers score
//! aggregation. Every operation takes an explicit `UserContext` and
//! runs its mutations inside a single transaction with a row lock on
//! the paper or review aggregate, so concurrent calls serialize and
//! either commit fully or not at all.

use crate::auth::{Role, UserContext};
use crate::config::WorkflowConfig;
use crate::db::models::*;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::workflow::aggregate::ReviewRollup;
use crate::workflow::assignment::{
    check_editor_eligible, check_not_already_assigned, check_reviewer_eligible, AssignmentManager,
};
use crate::workflow::lifecycle::{
    check_metadata_edit, check_revision_submission, check_transition, Transition,
};
use crate::workflow::review::{check_cancel, check_completion, check_start, ReviewScores};
use chrono::{Duration, Utc};
use sea_orm::Set;
use tracing::{info, warn};
use uuid::Uuid;

/// Input for a new paper submission
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub title: String,
    pub abstract_text: String,
    pub keywords: Option<String>,
    /// Opaque reference from the external file store
    pub file_ref: Option<String>,
}

/// Author-side metadata update; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct PaperUpdate {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
}

/// Input for a revision submission
#[derive(Debug, Clone)]
pub struct NewRevision {
    pub changes_summary: String,
    pub author_response: Option<String>,
    pub file_ref: Option<String>,
}

/// Input for completing a review
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub scores: ReviewScores,
    pub comments: Option<String>,
    pub confidential_comments: Option<String>,
    pub recommendation: Recommendation,
}

/// The paper lifecycle and peer-review workflow engine
#[derive(Clone)]
pub struct WorkflowEngine {
    repo: Repository,
    review_due_days: i64,
}

impl WorkflowEngine {
    pub fn new(repo: Repository, config: &WorkflowConfig) -> Self {
        Self {
            repo,
            review_due_days: config.review_due_days,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================================================================
    // Paper operations
    // ========================================================================

    /// Submit a new paper. The acting user becomes the owner.
    pub async fn submit_paper(&self, ctx: &UserContext, input: NewPaper) -> Result<Paper> {
        let paper = self
            .repo
            .create_paper(
                ctx.id,
                input.title,
                input.abstract_text,
                input.keywords,
                input.file_ref,
            )
            .await?;

        metrics::record_paper_submitted();
        info!(
            paper_id = %paper.id,
            owner_id = %ctx.id,
            request_id = %ctx.request_id,
            "Paper submitted"
        );

        Ok(paper)
    }

    /// Fetch a paper, enforcing the visibility rule
    pub async fn get_paper(&self, ctx: &UserContext, paper_id: Uuid) -> Result<Paper> {
        let paper = self.find_paper(paper_id).await?;
        AssignmentManager::new(&self.repo)
            .ensure_can_view(ctx, &paper)
            .await?;
        Ok(paper)
    }

    /// List every paper in the system (editorial dashboards)
    pub async fn list_all_papers(&self, ctx: &UserContext) -> Result<Vec<Paper>> {
        ctx.require_editorial()?;
        self.repo.list_all_papers().await
    }

    /// List papers owned by the given author
    pub async fn list_papers_by_owner(
        &self,
        ctx: &UserContext,
        owner_id: Uuid,
    ) -> Result<Vec<Paper>> {
        if ctx.id != owner_id {
            ctx.require_editorial()?;
        }
        self.repo.list_papers_by_owner(owner_id).await
    }

    /// List papers in a given lifecycle status (editorial dashboards)
    pub async fn list_papers_by_status(
        &self,
        ctx: &UserContext,
        status: PaperStatus,
    ) -> Result<Vec<Paper>> {
        ctx.require_editorial()?;
        self.repo.list_papers_by_status(status).await
    }

    /// Published archive, visible without restriction
    pub async fn list_published(&self) -> Result<Vec<Paper>> {
        self.repo.list_published_papers().await
    }

    /// List papers the acting reviewer is bound to
    pub async fn list_papers_for_reviewer(
        &self,
        ctx: &UserContext,
        reviewer_id: Uuid,
    ) -> Result<Vec<Paper>> {
        if ctx.id != reviewer_id {
            ctx.require_editorial()?;
        }
        self.repo.list_papers_for_reviewer(reviewer_id).await
    }

    /// List papers sitting in the given editor's queue
    pub async fn list_papers_for_editor(
        &self,
        ctx: &UserContext,
        editor_id: Uuid,
    ) -> Result<Vec<Paper>> {
        if ctx.id != editor_id {
            ctx.require_editorial()?;
        }
        self.repo.list_papers_by_editor(editor_id).await
    }

    /// Update a paper's metadata. Owner-only (or admin), legal only
    /// before an editorial decision; revisions are the vehicle for
    /// manuscript changes after that.
    pub async fn update_paper(
        &self,
        ctx: &UserContext,
        paper_id: Uuid,
        update: PaperUpdate,
    ) -> Result<Paper> {
        let txn = self.repo.begin().await?;
        let paper = Repository::paper_for_update(&txn, paper_id).await?;

        ctx.require_owner_or_admin(paper.owner_id)?;
        check_metadata_edit(paper.status)?;

        let mut active: PaperActiveModel = paper.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(abstract_text) = update.abstract_text {
            active.abstract_text = Set(abstract_text);
        }
        if let Some(keywords) = update.keywords {
            active.keywords = Set(Some(keywords));
        }
        let updated = Repository::save_paper(&txn, active).await?;
        txn.commit().await?;

        info!(
            paper_id = %paper_id,
            actor_id = %ctx.id,
            request_id = %ctx.request_id,
            "Paper metadata updated"
        );
        Ok(updated)
    }

    /// Delete a paper and everything it owns (revisions, reviews,
    /// reviewer bindings)
    pub async fn delete_paper(&self, ctx: &UserContext, paper_id: Uuid) -> Result<()> {
        let paper = self.find_paper(paper_id).await?;
        ctx.require_owner_or_admin(paper.owner_id)?;

        let txn = self.repo.begin().await?;
        Repository::delete_paper_cascade(&txn, paper_id).await?;
        txn.commit().await?;

        info!(
            paper_id = %paper_id,
            actor_id = %ctx.id,
            request_id = %ctx.request_id,
            "Paper deleted"
        );
        Ok(())
    }

    /// Change a paper's lifecycle status.
    ///
    /// Publishing sets `published_at` exactly once; re-publishing an
    /// already published paper succeeds without touching it. Admin
    /// overrides of unreachable transitions are permitted and logged.
    pub async fn change_status(
        &self,
        ctx: &UserContext,
        paper_id: Uuid,
        requested: PaperStatus,
        editor_comments: Option<String>,
    ) -> Result<Paper> {
        let txn = self.repo.begin().await?;
        let paper = Repository::paper_for_update(&txn, paper_id).await?;
        let from = paper.status;

        let transition = check_transition(from, requested, ctx.role)?;

        if transition == Transition::IdempotentPublish {
            txn.commit().await?;
            return Ok(paper);
        }

        if transition == Transition::AdminOverride {
            warn!(
                paper_id = %paper_id,
                actor_id = %ctx.id,
                from = %from,
                to = %requested,
                request_id = %ctx.request_id,
                "Admin forced a status transition outside the normal flow"
            );
        }

        let mut active: PaperActiveModel = paper.into();
        active.status = Set(requested);
        if let Some(comments) = editor_comments {
            active.editor_comments = Set(Some(comments));
        }
        if requested == PaperStatus::Published {
            active.published_at = Set(Some(Utc::now().into()));
        }

        let updated = Repository::save_paper(&txn, active).await?;
        txn.commit().await?;

        metrics::record_transition(
            &from.to_string(),
            &requested.to_string(),
            transition == Transition::AdminOverride,
        );
        info!(
            paper_id = %paper_id,
            actor_id = %ctx.id,
            from = %from,
            to = %requested,
            request_id = %ctx.request_id,
            "Paper status changed"
        );

        Ok(updated)
    }

    // ========================================================================
    // Assignment operations
    // ========================================================================

    /// Bind a reviewer to a paper and open a PENDING review against the
    /// paper's current version.
    ///
    /// `reviewer_role` is the reviewer's role as resolved from the
    /// identity service at assignment time; later role changes do not
    /// revoke the assignment.
    pub async fn assign_reviewer(
        &self,
        ctx: &UserContext,
        paper_id: Uuid,
        reviewer_id: Uuid,
        reviewer_role: Role,
    ) -> Result<Review> {
        ctx.require_editorial()?;
        check_reviewer_eligible(reviewer_role)?;

        let txn = self.repo.begin().await?;
        let paper = Repository::paper_for_update(&txn, paper_id).await?;

        let already = Repository::assignment_exists(&txn, paper_id, reviewer_id).await?;
        check_not_already_assigned(already, paper_id, reviewer_id)?;

        // Second arbiter: the composite key rejects a concurrent insert
        Repository::insert_assignment(&txn, paper_id, reviewer_id).await?;

        let due_date = Some(Utc::now() + Duration::days(self.review_due_days));
        let review = Repository::insert_review(
            &txn,
            paper_id,
            reviewer_id,
            paper.current_version,
            due_date,
        )
        .await?;

        txn.commit().await?;

        metrics::record_reviewer_assigned();
        info!(
            paper_id = %paper_id,
            reviewer_id = %reviewer_id,
            paper_version = paper.current_version,
            actor_id = %ctx.id,
            request_id = %ctx.request_id,
            "Reviewer assigned"
        );

        Ok(review)
    }

    /// Bind an editor to a paper
    pub async fn assign_editor(
        &self,
        ctx: &UserContext,
        paper_id: Uuid,
        editor_id: Uuid,
        editor_role: Role,
    ) -> Result<Paper> {
        ctx.require_editorial()?;
        check_editor_eligible(editor_role)?;

        let txn = self.repo.begin().await?;
        let paper = Repository::paper_for_update(&txn, paper_id).await?;

        let mut active: PaperActiveModel = paper.into();
        active.assigned_editor_id = Set(Some(editor_id));
        let updated = Repository::save_paper(&txn, active).await?;
        txn.commit().await?;

        info!(
            paper_id = %paper_id,
            editor_id = %editor_id,
            actor_id = %ctx.id,
            request_id = %ctx.request_id,
            "Editor assigned"
        );

        Ok(updated)
    }

    /// Revoke a reviewer binding. An open review is cancelled, not
    /// deleted, so the audit trail stays complete; a completed review is
    /// left untouched.
    pub async fn remove_reviewer(
        &self,
        ctx: &UserContext,
        paper_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<()> {
        ctx.require_editorial()?;

        let txn = self.repo.begin().await?;
        Repository::paper_for_update(&txn, paper_id).await?;

        let removed = Repository::delete_assignment(&txn, paper_id, reviewer_id).await?;
        if !removed {
            return Err(AppError::NotFound {
                resource_type: "reviewer assignment".to_string(),
                id: reviewer_id.to_string(),
            });
        }

        if let Some(review) =
            Repository::open_review_for_reviewer(&txn, paper_id, reviewer_id).await?
        {
            check_cancel(review.status)?;
            let mut active: ReviewActiveModel = review.into();
            active.status = Set(ReviewStatus::Cancelled);
            Repository::save_review(&txn, active).await?;
        }

        txn.commit().await?;

        info!(
            paper_id = %paper_id,
            reviewer_id = %reviewer_id,
            actor_id = %ctx.id,
            request_id = %ctx.request_id,
            "Reviewer assignment revoked"
        );
        Ok(())
    }

    // ========================================================================
    // Revision operations
    // ========================================================================

    /// Submit a revision. Owner-only, legal only from REVISION_REQUIRED.
    /// Creates the next revision row and bumps the paper atomically, so
    /// version numbers are strictly sequential with no gaps.
    pub async fn submit_revision(
        &self,
        ctx: &UserContext,
        paper_id: Uuid,
        input: NewRevision,
    ) -> Result<Paper> {
        let txn = self.repo.begin().await?;
        let paper = Repository::paper_for_update(&txn, paper_id).await?;

        let next_version =
            check_revision_submission(ctx.id, paper.owner_id, paper.status, paper.current_version)?;
        Repository::insert_revision(
            &txn,
            paper_id,
            next_version,
            input.changes_summary,
            input.author_response,
            input.file_ref.clone(),
        )
        .await?;

        let mut active: PaperActiveModel = paper.into();
        active.current_version = Set(next_version);
        active.status = Set(PaperStatus::Revised);
        if let Some(file_ref) = input.file_ref {
            active.file_ref = Set(Some(file_ref));
        }
        let updated = Repository::save_paper(&txn, active).await?;

        txn.commit().await?;

        metrics::record_revision_submitted();
        info!(
            paper_id = %paper_id,
            version = next_version,
            actor_id = %ctx.id,
            request_id = %ctx.request_id,
            "Revision submitted"
        );

        Ok(updated)
    }

    /// Revision history for a paper, newest first
    pub async fn list_revisions(&self, ctx: &UserContext, paper_id: Uuid) -> Result<Vec<Revision>> {
        let paper = self.find_paper(paper_id).await?;
        AssignmentManager::new(&self.repo)
            .ensure_can_view(ctx, &paper)
            .await?;
        self.repo.list_revisions(paper_id).await
    }

    // ========================================================================
    // Review operations
    // ========================================================================

    /// Move a review PENDING -> IN_PROGRESS. Reviewer-only.
    pub async fn start_review(&self, ctx: &UserContext, review_id: Uuid) -> Result<Review> {
        let txn = self.repo.begin().await?;
        let review = Repository::review_for_update(&txn, review_id).await?;

        if ctx.id != review.reviewer_id {
            return Err(AppError::Forbidden {
                message: "Only the assigned reviewer may start this review".to_string(),
            });
        }
        check_start(review.status)?;

        let mut active: ReviewActiveModel = review.into();
        active.status = Set(ReviewStatus::InProgress);
        let updated = Repository::save_review(&txn, active).await?;
        txn.commit().await?;

        info!(
            review_id = %review_id,
            reviewer_id = %ctx.id,
            request_id = %ctx.request_id,
            "Review started"
        );
        Ok(updated)
    }

    /// Complete a review with scores and a recommendation.
    ///
    /// Validation failures leave the review untouched. After the commit
    /// the paper rollup is recomputed; a rollup failure never rolls back
    /// the submission.
    pub async fn submit_review(
        &self,
        ctx: &UserContext,
        review_id: Uuid,
        submission: ReviewSubmission,
    ) -> Result<Review> {
        let txn = self.repo.begin().await?;
        let review = Repository::review_for_update(&txn, review_id).await?;

        if ctx.id != review.reviewer_id {
            return Err(AppError::Forbidden {
                message: "Only the assigned reviewer may submit this review".to_string(),
            });
        }
        check_completion(review.status, &submission.scores)?;

        let paper_id = review.paper_id;
        let recommendation = submission.recommendation;

        let mut active: ReviewActiveModel = review.into();
        active.status = Set(ReviewStatus::Completed);
        active.quality_score = Set(Some(submission.scores.quality));
        active.originality_score = Set(Some(submission.scores.originality));
        active.clarity_score = Set(Some(submission.scores.clarity));
        active.significance_score = Set(Some(submission.scores.significance));
        active.comments = Set(submission.comments);
        active.confidential_comments = Set(submission.confidential_comments);
        active.recommendation = Set(Some(recommendation));
        active.completed_at = Set(Some(Utc::now().into()));

        let updated = Repository::save_review(&txn, active).await?;
        txn.commit().await?;

        metrics::record_review_completed(&recommendation.to_string());
        info!(
            review_id = %review_id,
            paper_id = %paper_id,
            reviewer_id = %ctx.id,
            recommendation = %recommendation,
            request_id = %ctx.request_id,
            "Review completed"
        );

        // Recompute the rollup outside the transaction; failures are
        // logged, never propagated to the submitting reviewer.
        match self.compute_rollup(paper_id).await {
            Ok(rollup) => {
                info!(
                    paper_id = %paper_id,
                    review_count = rollup.review_count,
                    overall_mean = ?rollup.overall_mean,
                    "Review rollup recomputed"
                );
            }
            Err(e) => {
                warn!(
                    paper_id = %paper_id,
                    error = %e,
                    "Review rollup recomputation failed"
                );
            }
        }

        Ok(updated)
    }

    /// Fetch a single review. Visible to its reviewer and editorial roles.
    pub async fn get_review(&self, ctx: &UserContext, review_id: Uuid) -> Result<Review> {
        let review = self
            .repo
            .find_review_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound {
                id: review_id.to_string(),
            })?;

        if ctx.id != review.reviewer_id {
            ctx.require_editorial()?;
        }
        Ok(review)
    }

    /// List a reviewer's reviews. Self or editorial roles only.
    pub async fn list_reviews_by_reviewer(
        &self,
        ctx: &UserContext,
        reviewer_id: Uuid,
    ) -> Result<Vec<Review>> {
        if ctx.id != reviewer_id {
            ctx.require_editorial()?;
        }
        self.repo.list_reviews_by_reviewer(reviewer_id).await
    }

    /// All reviews bound to a paper, across versions. Visible to the
    /// owner and editorial roles; confidential comments are redacted for
    /// non-editorial callers at the transport layer.
    pub async fn list_reviews_for_paper(
        &self,
        ctx: &UserContext,
        paper_id: Uuid,
    ) -> Result<Vec<Review>> {
        let paper = self.find_paper(paper_id).await?;
        if ctx.id != paper.owner_id {
            ctx.require_editorial()?;
        }
        self.repo.list_reviews_for_paper(paper_id).await
    }

    /// Decision-supporting rollup over completed reviews for the
    /// paper's current version. Editorial roles only.
    pub async fn review_rollup(&self, ctx: &UserContext, paper_id: Uuid) -> Result<ReviewRollup> {
        ctx.require_editorial()?;
        self.compute_rollup(paper_id).await
    }

    // ========================================================================
    // External collaborator inputs
    // ========================================================================

    /// Apply an externally computed plagiarism score. A plain field
    /// update; never a lifecycle transition.
    pub async fn apply_plagiarism_score(
        &self,
        paper_id: Uuid,
        score: f64,
        report: Option<String>,
    ) -> Result<Paper> {
        let paper = self.repo.update_plagiarism(paper_id, score, report).await?;
        info!(paper_id = %paper_id, score = score, "Plagiarism score applied");
        Ok(paper)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn find_paper(&self, paper_id: Uuid) -> Result<Paper> {
        self.repo
            .find_paper_by_id(paper_id)
            .await?
            .ok_or_else(|| AppError::PaperNotFound {
                id: paper_id.to_string(),
            })
    }

    async fn compute_rollup(&self, paper_id: Uuid) -> Result<ReviewRollup> {
        let paper = self.find_paper(paper_id).await?;
        let reviews = self.repo.list_reviews_for_paper(paper_id).await?;
        Ok(ReviewRollup::for_version(
            paper_id,
            paper.current_version,
            &reviews,
        ))
    }
}
