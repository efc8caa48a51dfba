//! API handlers module

pub mod health;
pub mod internal;
pub mod papers;
pub mod reviews;

use chrono::{DateTime, FixedOffset};
use reviewdesk_common::auth::UserContext;
use reviewdesk_common::db::models::{Paper, Recommendation, Review, ReviewStatus, Revision};
use reviewdesk_common::workflow::average_score;
use serde::Serialize;
use uuid::Uuid;

fn rfc3339(ts: DateTime<FixedOffset>) -> String {
    ts.to_rfc3339()
}

/// Paper representation returned by the API
#[derive(Debug, Serialize)]
pub struct PaperResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Option<String>,
    pub owner_id: Uuid,
    pub current_version: i32,
    pub status: reviewdesk_common::db::models::PaperStatus,
    pub editor_comments: Option<String>,
    pub plagiarism_score: Option<f64>,
    pub plagiarism_report: Option<String>,
    pub assigned_editor_id: Option<Uuid>,
    pub file_ref: Option<String>,
    pub submitted_at: String,
    pub published_at: Option<String>,
    pub created_at: String,
}

impl From<Paper> for PaperResponse {
    fn from(paper: Paper) -> Self {
        Self {
            id: paper.id,
            title: paper.title,
            abstract_text: paper.abstract_text,
            keywords: paper.keywords,
            owner_id: paper.owner_id,
            current_version: paper.current_version,
            status: paper.status,
            editor_comments: paper.editor_comments,
            plagiarism_score: paper.plagiarism_score,
            plagiarism_report: paper.plagiarism_report,
            assigned_editor_id: paper.assigned_editor_id,
            file_ref: paper.file_ref,
            submitted_at: rfc3339(paper.submitted_at),
            published_at: paper.published_at.map(rfc3339),
            created_at: rfc3339(paper.created_at),
        }
    }
}

/// Revision representation returned by the API
#[derive(Debug, Serialize)]
pub struct RevisionResponse {
    pub id: Uuid,
    pub paper_id: Uuid,
    pub version_number: i32,
    pub changes_summary: String,
    pub author_response: Option<String>,
    pub file_ref: Option<String>,
    pub created_at: String,
}

impl From<Revision> for RevisionResponse {
    fn from(revision: Revision) -> Self {
        Self {
            id: revision.id,
            paper_id: revision.paper_id,
            version_number: revision.version_number,
            changes_summary: revision.changes_summary,
            author_response: revision.author_response,
            file_ref: revision.file_ref,
            created_at: rfc3339(revision.created_at),
        }
    }
}

/// Review representation returned by the API.
///
/// Confidential comments are visible only to editorial roles and the
/// review's own author.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub paper_id: Uuid,
    pub reviewer_id: Uuid,
    pub paper_version: i32,
    pub status: ReviewStatus,
    pub quality_score: Option<i32>,
    pub originality_score: Option<i32>,
    pub clarity_score: Option<i32>,
    pub significance_score: Option<i32>,
    pub average_score: Option<f64>,
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidential_comments: Option<String>,
    pub recommendation: Option<Recommendation>,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

impl ReviewResponse {
    /// Build a response for the acting user, redacting confidential
    /// comments where the caller is not entitled to them.
    pub fn for_user(review: Review, ctx: &UserContext) -> Self {
        let average = average_score(&review);
        let confidential = if ctx.role.is_editorial() || ctx.id == review.reviewer_id {
            review.confidential_comments
        } else {
            None
        };

        Self {
            id: review.id,
            paper_id: review.paper_id,
            reviewer_id: review.reviewer_id,
            paper_version: review.paper_version,
            status: review.status,
            quality_score: review.quality_score,
            originality_score: review.originality_score,
            clarity_score: review.clarity_score,
            significance_score: review.significance_score,
            average_score: average,
            comments: review.comments,
            confidential_comments: confidential,
            recommendation: review.recommendation,
            due_date: review.due_date.map(rfc3339),
            completed_at: review.completed_at.map(rfc3339),
            created_at: rfc3339(review.created_at),
        }
    }
}
