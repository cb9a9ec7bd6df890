// Per-job fit analysis and the batch orchestrator that fans it out.
// All completion calls go through llm_client.

pub mod analyzer;
pub mod batch;
pub mod handlers;
pub mod models;
pub mod prompts;

pub use analyzer::{AnalyzerSettings, FitAnalyzer};
pub use batch::BatchSettings;
