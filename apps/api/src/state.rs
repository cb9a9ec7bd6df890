use crate::analysis::FitAnalyzer;
use crate::insights::GapConsolidator;
use crate::pipeline::SearchPipeline;
use crate::ranking::RelevanceRanker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ranker: RelevanceRanker,
    pub analyzer: FitAnalyzer,
    pub consolidator: GapConsolidator,
    /// Rank, batch-analyze and consolidate, wired from the three components above.
    pub pipeline: SearchPipeline,
}
