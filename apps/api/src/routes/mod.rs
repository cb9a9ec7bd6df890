pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{analysis, insights, pipeline, ranking};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Core operations
        .route("/api/v1/jobs/rank", post(ranking::handlers::handle_rank))
        .route(
            "/api/v1/jobs/analyze",
            post(analysis::handlers::handle_analyze),
        )
        .route(
            "/api/v1/insights/skill-gaps",
            post(insights::handlers::handle_skill_gaps),
        )
        // Full pipeline
        .route("/api/v1/search", post(pipeline::handlers::handle_search))
        .with_state(state)
}
