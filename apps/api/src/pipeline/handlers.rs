//! Axum route handler for the full search pipeline.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::models::{Diagnostic, FitAnalysis};
use crate::errors::AppError;
use crate::insights::ConsolidatedGapReport;
use crate::models::profile::UserProfile;
use crate::ranking::handlers::RankedJobView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct SearchJobView {
    #[serde(flatten)]
    pub ranked: RankedJobView,
    pub analysis: FitAnalysis,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub query: Option<String>,
    pub jobs: Vec<SearchJobView>,
    pub diagnostics: Vec<Diagnostic>,
    pub skill_gaps: ConsolidatedGapReport,
}

/// POST /api/v1/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let outcome = state.pipeline.run(&req.profile).await?;

    let jobs = outcome
        .matches
        .iter()
        .map(|m| SearchJobView {
            ranked: RankedJobView::from(&m.ranked),
            analysis: m.analysis.clone(),
        })
        .collect();

    Ok(Json(SearchResponse {
        search_id: outcome.search_id,
        generated_at: outcome.generated_at,
        query: outcome.query,
        jobs,
        diagnostics: outcome.diagnostics,
        skill_gaps: outcome.skill_gaps,
    }))
}
