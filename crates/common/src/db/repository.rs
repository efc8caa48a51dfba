//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling. Plain reads go through the pool; multi-step lifecycle
//! mutations run on a transaction owned by the workflow engine, using the
//! connection-generic helpers below so every step shares the same
//! transaction.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &sea_orm::DatabaseConnection {
        self.pool.read()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Begin a transaction on the primary connection
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        self.pool.write().begin().await.map_err(Into::into)
    }

    // ========================================================================
    // Paper reads
    // ========================================================================

    /// Find paper by ID
    pub async fn find_paper_by_id(&self, id: Uuid) -> Result<Option<Paper>> {
        PaperEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List all papers, newest first
    pub async fn list_all_papers(&self) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .order_by_desc(PaperColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List papers owned by the given author
    pub async fn list_papers_by_owner(&self, owner_id: Uuid) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::OwnerId.eq(owner_id))
            .order_by_desc(PaperColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List papers in the given lifecycle status
    pub async fn list_papers_by_status(&self, status: PaperStatus) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::Status.eq(status))
            .order_by_desc(PaperColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List published papers, most recently published first
    pub async fn list_published_papers(&self) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::Status.eq(PaperStatus::Published))
            .order_by_desc(PaperColumn::PublishedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List papers where the given user is bound as reviewer
    pub async fn list_papers_for_reviewer(&self, reviewer_id: Uuid) -> Result<Vec<Paper>> {
        let paper_ids: Vec<Uuid> = PaperReviewerEntity::find()
            .filter(PaperReviewerColumn::ReviewerId.eq(reviewer_id))
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(|a| a.paper_id)
            .collect();

        PaperEntity::find()
            .filter(PaperColumn::Id.is_in(paper_ids))
            .order_by_desc(PaperColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List papers assigned to the given editor
    pub async fn list_papers_by_editor(&self, editor_id: Uuid) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::AssignedEditorId.eq(editor_id))
            .order_by_desc(PaperColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Paper writes
    // ========================================================================

    /// Create a new paper in SUBMITTED state at version 1
    pub async fn create_paper(
        &self,
        owner_id: Uuid,
        title: String,
        abstract_text: String,
        keywords: Option<String>,
        file_ref: Option<String>,
    ) -> Result<Paper> {
        let now = Utc::now();

        let paper = PaperActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            abstract_text: Set(abstract_text),
            keywords: Set(keywords),
            owner_id: Set(owner_id),
            current_version: Set(1),
            status: Set(PaperStatus::Submitted),
            editor_comments: Set(None),
            plagiarism_score: Set(None),
            plagiarism_report: Set(None),
            assigned_editor_id: Set(None),
            file_ref: Set(file_ref),
            submitted_at: Set(now.into()),
            published_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        paper.insert(self.pool.write()).await.map_err(Into::into)
    }

    /// Apply an externally computed plagiarism score.
    /// Plain field update, never a lifecycle transition.
    pub async fn update_plagiarism(
        &self,
        paper_id: Uuid,
        score: f64,
        report: Option<String>,
    ) -> Result<Paper> {
        let paper = self
            .find_paper_by_id(paper_id)
            .await?
            .ok_or_else(|| AppError::PaperNotFound {
                id: paper_id.to_string(),
            })?;

        let mut active: PaperActiveModel = paper.into();
        active.plagiarism_score = Set(Some(score));
        active.plagiarism_report = Set(report);
        active.updated_at = Set(Utc::now().into());

        active.update(self.pool.write()).await.map_err(Into::into)
    }

    // ========================================================================
    // Revision reads
    // ========================================================================

    /// List revisions for a paper, newest version first
    pub async fn list_revisions(&self, paper_id: Uuid) -> Result<Vec<Revision>> {
        RevisionEntity::find()
            .filter(RevisionColumn::PaperId.eq(paper_id))
            .order_by_desc(RevisionColumn::VersionNumber)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Review reads
    // ========================================================================

    /// Find review by ID
    pub async fn find_review_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        ReviewEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List all reviews authored by the given reviewer
    pub async fn list_reviews_by_reviewer(&self, reviewer_id: Uuid) -> Result<Vec<Review>> {
        ReviewEntity::find()
            .filter(ReviewColumn::ReviewerId.eq(reviewer_id))
            .order_by_desc(ReviewColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List all reviews bound to a paper, across all versions
    pub async fn list_reviews_for_paper(&self, paper_id: Uuid) -> Result<Vec<Review>> {
        ReviewEntity::find()
            .filter(ReviewColumn::PaperId.eq(paper_id))
            .order_by_desc(ReviewColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Assignment reads
    // ========================================================================

    /// Check whether the user is bound to the paper as reviewer
    pub async fn is_reviewer_assigned(&self, paper_id: Uuid, user_id: Uuid) -> Result<bool> {
        let found = PaperReviewerEntity::find_by_id((paper_id, user_id))
            .one(self.read_conn())
            .await?;
        Ok(found.is_some())
    }

    /// List reviewer ids bound to a paper
    pub async fn list_reviewer_ids(&self, paper_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = PaperReviewerEntity::find()
            .filter(PaperReviewerColumn::PaperId.eq(paper_id))
            .all(self.read_conn())
            .await?;
        Ok(rows.into_iter().map(|r| r.reviewer_id).collect())
    }

    // ========================================================================
    // Transactional helpers
    //
    // Generic over the connection so engine transactions and plain calls
    // share one code path. Row locks serialize concurrent lifecycle
    // mutations on the same paper.
    // ========================================================================

    /// Fetch a paper with a row lock, failing with PaperNotFound if absent
    pub async fn paper_for_update<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Paper> {
        PaperEntity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })
    }

    /// Fetch a review with a row lock, failing with ReviewNotFound if absent
    pub async fn review_for_update<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Review> {
        ReviewEntity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound { id: id.to_string() })
    }

    /// Persist paper field updates
    pub async fn save_paper<C: ConnectionTrait>(
        conn: &C,
        mut active: PaperActiveModel,
    ) -> Result<Paper> {
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await.map_err(Into::into)
    }

    /// Append a revision row for the given version
    pub async fn insert_revision<C: ConnectionTrait>(
        conn: &C,
        paper_id: Uuid,
        version_number: i32,
        changes_summary: String,
        author_response: Option<String>,
        file_ref: Option<String>,
    ) -> Result<Revision> {
        let revision = RevisionActiveModel {
            id: Set(Uuid::new_v4()),
            paper_id: Set(paper_id),
            version_number: Set(version_number),
            changes_summary: Set(changes_summary),
            author_response: Set(author_response),
            file_ref: Set(file_ref),
            created_at: Set(Utc::now().into()),
        };

        revision.insert(conn).await.map_err(Into::into)
    }

    /// Create a PENDING review bound to the given paper version
    pub async fn insert_review<C: ConnectionTrait>(
        conn: &C,
        paper_id: Uuid,
        reviewer_id: Uuid,
        paper_version: i32,
        due_date: Option<chrono::DateTime<Utc>>,
    ) -> Result<Review> {
        let now = Utc::now();

        let review = ReviewActiveModel {
            id: Set(Uuid::new_v4()),
            paper_id: Set(paper_id),
            reviewer_id: Set(reviewer_id),
            paper_version: Set(paper_version),
            status: Set(ReviewStatus::Pending),
            quality_score: Set(None),
            originality_score: Set(None),
            clarity_score: Set(None),
            significance_score: Set(None),
            comments: Set(None),
            confidential_comments: Set(None),
            recommendation: Set(None),
            due_date: Set(due_date.map(Into::into)),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        review.insert(conn).await.map_err(Into::into)
    }

    /// Persist review field updates
    pub async fn save_review<C: ConnectionTrait>(
        conn: &C,
        mut active: ReviewActiveModel,
    ) -> Result<Review> {
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await.map_err(Into::into)
    }

    /// Bind a reviewer to a paper. The composite primary key backstops
    /// duplicate assignments under concurrency.
    pub async fn insert_assignment<C: ConnectionTrait>(
        conn: &C,
        paper_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<PaperReviewer> {
        let assignment = PaperReviewerActiveModel {
            paper_id: Set(paper_id),
            reviewer_id: Set(reviewer_id),
            assigned_at: Set(Utc::now().into()),
        };

        assignment.insert(conn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::DuplicateAssignment {
                    paper_id: paper_id.to_string(),
                    reviewer_id: reviewer_id.to_string(),
                }
            } else {
                e.into()
            }
        })
    }

    /// Check for an existing reviewer binding inside a transaction
    pub async fn assignment_exists<C: ConnectionTrait>(
        conn: &C,
        paper_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<bool> {
        let found = PaperReviewerEntity::find_by_id((paper_id, reviewer_id))
            .one(conn)
            .await?;
        Ok(found.is_some())
    }

    /// Remove a reviewer binding; returns false if none existed
    pub async fn delete_assignment<C: ConnectionTrait>(
        conn: &C,
        paper_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<bool> {
        let result = PaperReviewerEntity::delete_many()
            .filter(PaperReviewerColumn::PaperId.eq(paper_id))
            .filter(PaperReviewerColumn::ReviewerId.eq(reviewer_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Open (not yet completed) review for a reviewer on a paper, if any
    pub async fn open_review_for_reviewer<C: ConnectionTrait>(
        conn: &C,
        paper_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>> {
        ReviewEntity::find()
            .filter(ReviewColumn::PaperId.eq(paper_id))
            .filter(ReviewColumn::ReviewerId.eq(reviewer_id))
            .filter(
                ReviewColumn::Status
                    .is_in([ReviewStatus::Pending, ReviewStatus::InProgress]),
            )
            .one(conn)
            .await
            .map_err(Into::into)
    }

    /// Delete a paper together with its revisions, reviews, and
    /// reviewer bindings
    pub async fn delete_paper_cascade<C: ConnectionTrait>(conn: &C, paper_id: Uuid) -> Result<()> {
        ReviewEntity::delete_many()
            .filter(ReviewColumn::PaperId.eq(paper_id))
            .exec(conn)
            .await?;

        RevisionEntity::delete_many()
            .filter(RevisionColumn::PaperId.eq(paper_id))
            .exec(conn)
            .await?;

        PaperReviewerEntity::delete_many()
            .filter(PaperReviewerColumn::PaperId.eq(paper_id))
            .exec(conn)
            .await?;

        PaperEntity::delete_by_id(paper_id).exec(conn).await?;

        Ok(())
    }
}
