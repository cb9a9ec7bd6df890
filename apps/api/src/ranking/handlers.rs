//! Axum route handlers for the Ranking API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::job::{JobListing, RankedJob};
use crate::models::profile::UserProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub profile: UserProfile,
}

/// A ranked listing with its display-ready match figures.
#[derive(Debug, Clone, Serialize)]
pub struct RankedJobView {
    #[serde(flatten)]
    pub job: JobListing,
    pub similarity_score: f32,
    pub match_percentage: f64,
    pub match_text: String,
}

impl From<&RankedJob> for RankedJobView {
    fn from(ranked: &RankedJob) -> Self {
        Self {
            job: ranked.job.clone(),
            similarity_score: ranked.similarity_score,
            match_percentage: ranked.match_percentage(),
            match_text: ranked.match_text(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub query: Option<String>,
    pub jobs: Vec<RankedJobView>,
}

/// POST /api/v1/jobs/rank
///
/// An empty resume is not an error: it yields an empty `jobs` list.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let preferences = req.profile.preferences.clone().unwrap_or_default();
    let ranking = state.ranker.rank(&req.profile, &preferences).await?;

    Ok(Json(RankResponse {
        query: ranking.query,
        jobs: ranking.jobs.iter().map(RankedJobView::from).collect(),
    }))
}
