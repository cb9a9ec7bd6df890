//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::settle;
use crate::analysis::models::{Diagnostic, FitAnalysis};
use crate::errors::AppError;
use crate::models::job::JobListing;
use crate::models::profile::UserProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub profile: UserProfile,
    pub job: JobListing,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub job_id: String,
    pub analysis: FitAnalysis,
    /// Present only when `analysis` is the empty sentinel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

/// POST /api/v1/jobs/analyze
///
/// Always 200: a failed analysis is reported through `diagnostic`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if req.job.id.trim().is_empty() {
        return Err(AppError::Validation("job.id must not be empty".to_string()));
    }

    let result = state.analyzer.evaluate(&req.profile, &req.job).await;
    let (analysis, diagnostic) = settle(&req.job.id, result);

    Ok(Json(AnalyzeResponse {
        job_id: req.job.id,
        analysis,
        diagnostic,
    }))
}
