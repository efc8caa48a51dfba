//! Internal collaborator callbacks
//!
//! These routes are reachable only from the internal network; the
//! plagiarism scoring service posts results here once a check finishes.
//! The callback is a plain field update and never moves the lifecycle.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::PaperResponse;
use crate::AppState;
use reviewdesk_common::errors::Result;

/// Payload posted by the plagiarism scoring service
#[derive(Debug, Deserialize)]
pub struct PlagiarismResult {
    pub score: f64,
    pub report: Option<String>,
}

/// Apply an asynchronously computed plagiarism score to a paper
pub async fn plagiarism_callback(
    State(state): State<AppState>,
    Path(paper_id): Path<Uuid>,
    Json(result): Json<PlagiarismResult>,
) -> Result<Json<PaperResponse>> {
    let paper = state
        .engine
        .apply_plagiarism_score(paper_id, result.score, result.report)
        .await?;
    Ok(Json(paper.into()))
}
