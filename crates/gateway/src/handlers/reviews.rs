//! Review workflow handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::ReviewResponse;
use crate::AppState;
use reviewdesk_common::{
    auth::UserContext,
    db::models::Recommendation,
    errors::{AppError, Result},
    workflow::{ReviewRollup, ReviewScores, ReviewSubmission},
};

/// Request to complete a review
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub quality_score: i32,
    pub originality_score: i32,
    pub clarity_score: i32,
    pub significance_score: i32,

    pub comments: Option<String>,

    /// Visible to editors and admins only
    pub confidential_comments: Option<String>,

    /// Required; its absence fails validation before any state change
    pub recommendation: Option<Recommendation>,
}

/// Move a review from PENDING to IN_PROGRESS
pub async fn start_review(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ReviewResponse>> {
    let review = state.engine.start_review(&ctx, review_id).await?;
    Ok(Json(ReviewResponse::for_user(review, &ctx)))
}

/// Complete a review with scores and a recommendation
pub async fn submit_review(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(review_id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let recommendation = request.recommendation.ok_or_else(|| AppError::MissingField {
        field: "recommendation".to_string(),
    })?;

    let submission = ReviewSubmission {
        scores: ReviewScores {
            quality: request.quality_score,
            originality: request.originality_score,
            clarity: request.clarity_score,
            significance: request.significance_score,
        },
        comments: request.comments,
        confidential_comments: request.confidential_comments,
        recommendation,
    };

    let review = state.engine.submit_review(&ctx, review_id, submission).await?;
    Ok(Json(ReviewResponse::for_user(review, &ctx)))
}

/// Get a single review
pub async fn get_review(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ReviewResponse>> {
    let review = state.engine.get_review(&ctx, review_id).await?;
    Ok(Json(ReviewResponse::for_user(review, &ctx)))
}

/// List all reviews authored by the given reviewer
pub async fn list_reviews_by_reviewer(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(reviewer_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>> {
    let reviews = state
        .engine
        .list_reviews_by_reviewer(&ctx, reviewer_id)
        .await?;
    Ok(Json(
        reviews
            .into_iter()
            .map(|r| ReviewResponse::for_user(r, &ctx))
            .collect(),
    ))
}

/// List all reviews bound to a paper, across versions
pub async fn list_reviews_for_paper(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>> {
    let reviews = state.engine.list_reviews_for_paper(&ctx, paper_id).await?;
    Ok(Json(
        reviews
            .into_iter()
            .map(|r| ReviewResponse::for_user(r, &ctx))
            .collect(),
    ))
}

/// Decision-supporting rollup over completed reviews for the paper's
/// current version
pub async fn review_summary(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<ReviewRollup>> {
    let rollup = state.engine.review_rollup(&ctx, paper_id).await?;
    Ok(Json(rollup))
}
