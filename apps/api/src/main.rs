mod analysis;
mod config;
mod errors;
mod insights;
mod llm_client;
mod models;
mod pipeline;
mod ranking;
mod routes;
mod state;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{AnalyzerSettings, BatchSettings, FitAnalyzer};
use crate::config::{Config, VectorIndexConfig};
use crate::insights::{ConsolidatorSettings, GapConsolidator};
use crate::llm_client::{CompletionGateway, OpenAiClient};
use crate::pipeline::SearchPipeline;
use crate::ranking::embedding::OpenAiEmbedder;
use crate::ranking::index::{InMemoryVectorIndex, PineconeIndex, VectorIndex};
use crate::ranking::{RankingSettings, RelevanceRanker};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobfit API v{}", env!("CARGO_PKG_VERSION"));

    // Completion capability, shared by every component
    let completion = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.http_timeout,
    )?;
    let gateway = CompletionGateway::new(Arc::new(completion));
    info!(
        "Completion gateway initialized (analysis model: {})",
        config.calls.analysis.model
    );

    let embedder = OpenAiEmbedder::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.embedding_model.clone(),
        config.http_timeout,
    )?;
    let index = build_vector_index(&config)?;

    let limits = &config.limits;
    let ranker = RelevanceRanker::new(
        gateway.clone(),
        Arc::new(embedder),
        index,
        RankingSettings {
            top_k: limits.rank_top_k,
            tie_epsilon: limits.tie_epsilon,
            resume_char_limit: limits.resume_chars,
            query_call: config.calls.query.clone(),
        },
    );
    let analyzer = FitAnalyzer::new(
        gateway.clone(),
        AnalyzerSettings {
            resume_char_limit: limits.resume_chars,
            description_char_limit: limits.job_description_chars,
            max_missing_skills: limits.max_missing_skills,
            call: config.calls.analysis.clone(),
        },
    );
    let consolidator = GapConsolidator::new(
        gateway,
        ConsolidatorSettings {
            resume_char_limit: limits.resume_chars,
            max_top_gaps: limits.max_top_gaps,
            call: config.calls.consolidation.clone(),
        },
    );
    let pipeline = SearchPipeline::new(
        ranker.clone(),
        analyzer.clone(),
        consolidator.clone(),
        BatchSettings {
            concurrency: limits.analysis_concurrency,
            timeout: limits.batch_timeout,
        },
        limits.max_analyzed_jobs,
    );

    // Build app state
    let state = AppState {
        ranker,
        analyzer,
        consolidator,
        pipeline,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects to Pinecone or loads the pre-embedded listings file.
fn build_vector_index(config: &Config) -> Result<Arc<dyn VectorIndex>> {
    match &config.vector_index {
        VectorIndexConfig::Pinecone {
            api_key,
            host,
            namespace,
        } => {
            let index = PineconeIndex::new(
                api_key.clone(),
                host,
                namespace.clone(),
                config.http_timeout,
            )?;
            info!("Vector index: Pinecone ({host}, namespace {namespace})");
            Ok(Arc::new(index))
        }
        VectorIndexConfig::Memory { path } => {
            let index = InMemoryVectorIndex::load(path)?;
            if index.is_empty() {
                warn!("Job index at {} holds no listings", path.display());
            }
            info!(
                "Vector index: in-memory ({} listings from {})",
                index.len(),
                path.display()
            );
            Ok(Arc::new(index))
        }
    }
}
