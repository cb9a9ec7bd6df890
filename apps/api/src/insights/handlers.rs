//! Axum route handlers for the Insights API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::analysis::models::FitAnalysis;
use crate::errors::AppError;
use crate::insights::consolidator::ConsolidatedGapReport;
use crate::models::profile::UserProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillGapsRequest {
    pub profile: UserProfile,
    /// Analyses from earlier `/jobs/analyze` calls; empty entries are skipped.
    pub analyses: Vec<FitAnalysis>,
}

/// POST /api/v1/insights/skill-gaps
pub async fn handle_skill_gaps(
    State(state): State<AppState>,
    Json(req): Json<SkillGapsRequest>,
) -> Result<Json<ConsolidatedGapReport>, AppError> {
    let report = state
        .consolidator
        .consolidate(&req.profile, &req.analyses)
        .await;
    Ok(Json(report))
}
