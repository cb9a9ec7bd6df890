// Cross-job skill-gap consolidation.
// All completion calls go through llm_client.

pub mod consolidator;
pub mod handlers;
pub mod prompts;

pub use consolidator::{ConsolidatedGapReport, ConsolidatorSettings, GapConsolidator};
