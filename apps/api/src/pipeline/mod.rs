//! End-to-end search: rank → batch analysis → gap consolidation.
//!
//! Only ranking failures abort a search. Everything downstream degrades to
//! empty sentinels with diagnostics.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::batch::{analyze_batch, BatchEntry};
use crate::analysis::models::{Diagnostic, FitAnalysis};
use crate::analysis::{BatchSettings, FitAnalyzer};
use crate::insights::{ConsolidatedGapReport, GapConsolidator};
use crate::models::job::{JobListing, RankedJob};
use crate::models::profile::UserProfile;
use crate::ranking::{RankingError, RelevanceRanker};

/// One ranked listing with its analysis. Listings beyond the analysis window
/// carry [`FitAnalysis::Empty`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    pub ranked: RankedJob,
    pub analysis: FitAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub search_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub query: Option<String>,
    pub matches: Vec<SearchMatch>,
    pub diagnostics: Vec<Diagnostic>,
    pub skill_gaps: ConsolidatedGapReport,
}

#[derive(Clone)]
pub struct SearchPipeline {
    ranker: RelevanceRanker,
    analyzer: FitAnalyzer,
    consolidator: GapConsolidator,
    batch: BatchSettings,
    /// How many of the top-ranked candidates get a fit analysis.
    max_analyzed_jobs: usize,
}

impl SearchPipeline {
    pub fn new(
        ranker: RelevanceRanker,
        analyzer: FitAnalyzer,
        consolidator: GapConsolidator,
        batch: BatchSettings,
        max_analyzed_jobs: usize,
    ) -> Self {
        Self {
            ranker,
            analyzer,
            consolidator,
            batch,
            max_analyzed_jobs,
        }
    }

    pub async fn run(&self, profile: &UserProfile) -> Result<SearchOutcome, RankingError> {
        let search_id = Uuid::new_v4();
        let preferences = profile.preferences.clone().unwrap_or_default();

        let ranking = self.ranker.rank(profile, &preferences).await?;
        info!(%search_id, candidates = ranking.jobs.len(), "Ranking complete");

        let window = ranking.jobs.len().min(self.max_analyzed_jobs);
        let candidates: Vec<JobListing> = ranking.jobs[..window]
            .iter()
            .map(|r| r.job.clone())
            .collect();

        let report = analyze_batch(&self.analyzer, profile, &candidates, &self.batch).await;
        let skill_gaps = self
            .consolidator
            .consolidate(profile, &report.analyses())
            .await;

        let mut analyses = report.entries.into_iter().map(|e: BatchEntry| e.analysis);
        let matches = ranking
            .jobs
            .into_iter()
            .map(|ranked| SearchMatch {
                ranked,
                analysis: analyses.next().unwrap_or(FitAnalysis::Empty),
            })
            .collect();

        info!(
            %search_id,
            top_gaps = skill_gaps.top_gaps.len(),
            diagnostics = report.diagnostics.len(),
            "Search complete"
        );

        Ok(SearchOutcome {
            search_id,
            generated_at: Utc::now(),
            query: ranking.query,
            matches,
            diagnostics: report.diagnostics,
            skill_gaps,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A fully stubbed pipeline shared by pipeline and router tests.

    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::analysis::AnalyzerSettings;
    use crate::insights::ConsolidatorSettings;
    use crate::llm_client::testing::{gateway, StubCompletion};
    use crate::llm_client::{CallProfile, CompletionRequest};
    use crate::models::job::{JobListing, JobSource};
    use crate::ranking::embedding::EmbeddingCapability;
    use crate::ranking::index::{InMemoryVectorIndex, IndexedJob};
    use crate::ranking::{RankingError, RankingSettings, RelevanceRanker};

    use super::*;

    pub struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingCapability for FixedEmbedder {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RankingError> {
            Ok(vec![1.0, 0.0])
        }
    }

    pub fn listing(id: &str, description: &str, embedding: Vec<f32>) -> IndexedJob {
        IndexedJob {
            job: JobListing {
                id: id.to_string(),
                title: format!("Engineer {id}"),
                company: "Acme".to_string(),
                description: description.to_string(),
                location: "Remote".to_string(),
                source: JobSource::default(),
            },
            embedding,
        }
    }

    /// Answers query, analysis and consolidation calls by inspecting the
    /// request. Analysis of any job whose description mentions `broken`
    /// gets unparseable text.
    pub fn scripted_completion() -> Arc<StubCompletion> {
        StubCompletion::new(|request: &CompletionRequest| {
            if !request.require_json {
                return Ok("rust backend engineer".to_string());
            }
            if request.prompt.contains("top_gaps") {
                return Ok(r#"{"top_gaps": [{"skill": "Kubernetes", "learn_time_estimate": "3 weeks"}]}"#
                    .to_string());
            }
            if request.prompt.contains("broken") {
                return Ok("not json".to_string());
            }
            Ok(r#"{"missing_skills": [{"skill": "Kubernetes", "learn_time_estimate": "3 weeks"}],
                   "resume_suggestions": {"highlight": [], "consider_removing": []}}"#
                .to_string())
        })
    }

    pub fn pipeline(
        stub: &Arc<StubCompletion>,
        listings: Vec<IndexedJob>,
        max_analyzed_jobs: usize,
    ) -> SearchPipeline {
        let gateway = gateway(stub);
        let ranker = RelevanceRanker::new(
            gateway.clone(),
            Arc::new(FixedEmbedder),
            Arc::new(InMemoryVectorIndex::new(listings)),
            RankingSettings {
                top_k: 10,
                tie_epsilon: 1e-6,
                resume_char_limit: 3000,
                query_call: CallProfile::new("gpt-4o-mini", 300, 0.3),
            },
        );
        let analyzer = FitAnalyzer::new(
            gateway.clone(),
            AnalyzerSettings {
                resume_char_limit: 3000,
                description_char_limit: 4000,
                max_missing_skills: 3,
                call: CallProfile::new("gpt-4o", 500, 0.3),
            },
        );
        let consolidator = GapConsolidator::new(
            gateway,
            ConsolidatorSettings {
                resume_char_limit: 3000,
                max_top_gaps: 3,
                call: CallProfile::new("gpt-4o", 600, 0.5),
            },
        );
        SearchPipeline::new(
            ranker,
            analyzer,
            consolidator,
            BatchSettings {
                concurrency: 5,
                timeout: None,
            },
            max_analyzed_jobs,
        )
    }
}
