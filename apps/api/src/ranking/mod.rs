//! Relevance Ranker: profile + preferences → optimized query → embedding →
//! top-k nearest listings from the vector index.
//!
//! All three external calls (completion, embedding, index) go through trait
//! objects so the ranker itself holds no transport code.

pub mod embedding;
pub mod handlers;
pub mod index;
pub mod prompts;
pub mod query;
pub mod ranker;

use thiserror::Error;

use crate::llm_client::CompletionError;

pub use ranker::{RankingSettings, RelevanceRanker};

/// Any failure that prevents a ranking from being produced. Never partial.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Query generation failed: {0}")]
    QueryGeneration(#[from] CompletionError),

    #[error("Query generation returned blank text")]
    BlankQuery,

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Vector index query failed: {0}")]
    Index(String),
}
