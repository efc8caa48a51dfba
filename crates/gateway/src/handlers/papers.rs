//! Paper lifecycle handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::{PaperResponse, ReviewResponse, RevisionResponse};
use crate::AppState;
use reviewdesk_common::{
    auth::{Role, UserContext},
    db::models::PaperStatus,
    errors::{AppError, Result},
    workflow::{NewPaper, NewRevision, PaperUpdate},
};

/// Request to submit a new paper
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitPaperRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(min = 1, max = 50000))]
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    pub keywords: Option<String>,

    /// Opaque reference returned by the file storage service
    pub file_ref: Option<String>,
}

/// Request to update a paper's metadata; absent fields are unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaperRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 50000))]
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,

    pub keywords: Option<String>,
}

/// Request to change a paper's lifecycle status
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: PaperStatus,

    /// Optional editor comments recorded alongside the transition
    pub comments: Option<String>,
}

/// Request to bind a reviewer.
/// `reviewer_role` is the role resolved from the identity service.
#[derive(Debug, Deserialize)]
pub struct AssignReviewerRequest {
    pub reviewer_id: Uuid,
    pub reviewer_role: Role,
}

/// Request to bind an editor
#[derive(Debug, Deserialize)]
pub struct AssignEditorRequest {
    pub editor_id: Uuid,
    pub editor_role: Role,
}

/// Request to submit a revision
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRevisionRequest {
    #[validate(length(min = 1, max = 20000))]
    pub changes_summary: String,

    pub author_response: Option<String>,

    pub file_ref: Option<String>,
}

/// Submit a new paper; the acting user becomes the owner
pub async fn submit_paper(
    State(state): State<AppState>,
    ctx: UserContext,
    Json(request): Json<SubmitPaperRequest>,
) -> Result<(StatusCode, Json<PaperResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let paper = state
        .engine
        .submit_paper(
            &ctx,
            NewPaper {
                title: request.title,
                abstract_text: request.abstract_text,
                keywords: request.keywords,
                file_ref: request.file_ref,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(paper.into())))
}

/// Get a paper by ID
pub async fn get_paper(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<PaperResponse>> {
    let paper = state.engine.get_paper(&ctx, paper_id).await?;
    Ok(Json(paper.into()))
}

/// List all papers (editorial dashboards)
pub async fn list_all_papers(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<Vec<PaperResponse>>> {
    let papers = state.engine.list_all_papers(&ctx).await?;
    Ok(Json(papers.into_iter().map(Into::into).collect()))
}

/// List the acting user's own submissions
pub async fn list_own_papers(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<Vec<PaperResponse>>> {
    let papers = state.engine.list_papers_by_owner(&ctx, ctx.id).await?;
    Ok(Json(papers.into_iter().map(Into::into).collect()))
}

/// List papers owned by a given author
pub async fn list_papers_by_owner(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<Vec<PaperResponse>>> {
    let papers = state.engine.list_papers_by_owner(&ctx, owner_id).await?;
    Ok(Json(papers.into_iter().map(Into::into).collect()))
}

/// List papers in the given editor's queue
pub async fn list_papers_for_editor(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(editor_id): Path<Uuid>,
) -> Result<Json<Vec<PaperResponse>>> {
    let papers = state.engine.list_papers_for_editor(&ctx, editor_id).await?;
    Ok(Json(papers.into_iter().map(Into::into).collect()))
}

/// List papers the given reviewer is bound to
pub async fn list_papers_for_reviewer(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(reviewer_id): Path<Uuid>,
) -> Result<Json<Vec<PaperResponse>>> {
    let papers = state
        .engine
        .list_papers_for_reviewer(&ctx, reviewer_id)
        .await?;
    Ok(Json(papers.into_iter().map(Into::into).collect()))
}

/// List papers in a given lifecycle status
pub async fn list_papers_by_status(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(status): Path<String>,
) -> Result<Json<Vec<PaperResponse>>> {
    let status = PaperStatus::from_str(&status).map_err(|message| AppError::Validation {
        message,
        field: Some("status".to_string()),
    })?;

    let papers = state.engine.list_papers_by_status(&ctx, status).await?;
    Ok(Json(papers.into_iter().map(Into::into).collect()))
}

/// Published archive, no authentication required
pub async fn list_published_papers(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaperResponse>>> {
    let papers = state.engine.list_published().await?;
    Ok(Json(papers.into_iter().map(Into::into).collect()))
}

/// Update a paper's metadata; owner-only, before an editorial decision
pub async fn update_paper(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<UpdatePaperRequest>,
) -> Result<Json<PaperResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let paper = state
        .engine
        .update_paper(
            &ctx,
            paper_id,
            PaperUpdate {
                title: request.title,
                abstract_text: request.abstract_text,
                keywords: request.keywords,
            },
        )
        .await?;
    Ok(Json(paper.into()))
}

/// Delete a paper and everything it owns
pub async fn delete_paper(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.engine.delete_paper(&ctx, paper_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change a paper's lifecycle status
pub async fn change_status(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<PaperResponse>> {
    let paper = state
        .engine
        .change_status(&ctx, paper_id, request.status, request.comments)
        .await?;
    Ok(Json(paper.into()))
}

/// Bind a reviewer to a paper, opening a PENDING review
pub async fn assign_reviewer(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<AssignReviewerRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>)> {
    let review = state
        .engine
        .assign_reviewer(&ctx, paper_id, request.reviewer_id, request.reviewer_role)
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::for_user(review, &ctx))))
}

/// Revoke a reviewer binding; an open review is cancelled
pub async fn remove_reviewer(
    State(state): State<AppState>,
    ctx: UserContext,
    Path((paper_id, reviewer_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    state
        .engine
        .remove_reviewer(&ctx, paper_id, reviewer_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bind an editor to a paper
pub async fn assign_editor(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<AssignEditorRequest>,
) -> Result<Json<PaperResponse>> {
    let paper = state
        .engine
        .assign_editor(&ctx, paper_id, request.editor_id, request.editor_role)
        .await?;
    Ok(Json(paper.into()))
}

/// Submit a revision for a paper in REVISION_REQUIRED status
pub async fn submit_revision(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<SubmitRevisionRequest>,
) -> Result<(StatusCode, Json<PaperResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let paper = state
        .engine
        .submit_revision(
            &ctx,
            paper_id,
            NewRevision {
                changes_summary: request.changes_summary,
                author_response: request.author_response,
                file_ref: request.file_ref,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(paper.into())))
}

/// Revision history for a paper, newest first
pub async fn list_revisions(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<Vec<RevisionResponse>>> {
    let revisions = state.engine.list_revisions(&ctx, paper_id).await?;
    Ok(Json(revisions.into_iter().map(Into::into).collect()))
}
