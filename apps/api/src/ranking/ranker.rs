use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::{CallProfile, CompletionGateway};
use crate::models::job::RankedJob;
use crate::models::profile::{SearchPreferences, UserProfile};
use crate::ranking::embedding::EmbeddingCapability;
use crate::ranking::index::{IndexHit, VectorIndex};
use crate::ranking::query::{optimize_query, SearchQuery};
use crate::ranking::RankingError;

/// Tunables for one ranker instance.
#[derive(Debug, Clone)]
pub struct RankingSettings {
    pub top_k: usize,
    /// Scores closer than this are treated as equal and keep index order.
    pub tie_epsilon: f32,
    pub resume_char_limit: usize,
    pub query_call: CallProfile,
}

/// Output of [`RelevanceRanker::rank`]. `query` is `None` when ranking
/// short-circuited on an empty profile.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub query: Option<String>,
    pub jobs: Vec<RankedJob>,
}

impl Ranking {
    pub fn empty() -> Self {
        Self {
            query: None,
            jobs: vec![],
        }
    }
}

#[derive(Clone)]
pub struct RelevanceRanker {
    gateway: CompletionGateway,
    embedder: Arc<dyn EmbeddingCapability>,
    index: Arc<dyn VectorIndex>,
    settings: RankingSettings,
}

impl RelevanceRanker {
    pub fn new(
        gateway: CompletionGateway,
        embedder: Arc<dyn EmbeddingCapability>,
        index: Arc<dyn VectorIndex>,
        settings: RankingSettings,
    ) -> Self {
        Self {
            gateway,
            embedder,
            index,
            settings,
        }
    }

    /// Ranks indexed listings by semantic similarity to the profile.
    ///
    /// An empty or whitespace-only resume yields an empty ranking without
    /// any external call. Any external failure aborts the whole ranking.
    pub async fn rank(
        &self,
        profile: &UserProfile,
        preferences: &SearchPreferences,
    ) -> Result<Ranking, RankingError> {
        if profile.is_blank() {
            warn!("Empty profile passed to ranker; returning no candidates");
            return Ok(Ranking::empty());
        }
        if self.settings.top_k == 0 {
            return Ok(Ranking::empty());
        }

        let text = optimize_query(
            &self.gateway,
            profile,
            preferences,
            self.settings.resume_char_limit,
            &self.settings.query_call,
        )
        .await?;
        info!("Generated optimized query: {text}");

        let embedding = self.embedder.embed(&text).await?;
        let query = SearchQuery { text, embedding };

        let hits = self
            .index
            .query(&query.embedding, self.settings.top_k)
            .await?;

        let mut jobs = order_hits(hits, self.settings.tie_epsilon);
        jobs.truncate(self.settings.top_k);
        info!(
            "Ranked {} candidates (embedding model: {})",
            jobs.len(),
            self.embedder.model_name()
        );

        Ok(Ranking {
            query: Some(query.text),
            jobs,
        })
    }
}

/// Orders hits highest score first without disturbing near-ties.
///
/// Hits are sorted by score, then cut into tie groups: each group starts at
/// its highest score and takes every following hit within `epsilon` of that
/// start. Inside a group the index's own order is kept. No hit ends up behind
/// one it beats by more than `epsilon`, however long a run of near-ties is.
/// Hits with a NaN score are dropped. Deterministic for a given input
/// sequence.
pub fn order_hits(hits: Vec<IndexHit>, epsilon: f32) -> Vec<RankedJob> {
    let mut scored: Vec<(usize, IndexHit)> = hits
        .into_iter()
        .enumerate()
        .filter(|(_, hit)| {
            if hit.score.is_nan() {
                warn!(job_id = %hit.job.id, "Dropping index hit with NaN score");
                false
            } else {
                true
            }
        })
        .collect();
    // Stable, so exact ties keep index order before grouping.
    scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

    let mut ordered: Vec<RankedJob> = Vec::with_capacity(scored.len());
    let mut group: Vec<(usize, IndexHit)> = Vec::new();
    for entry in scored {
        let starts_new_group = group
            .first()
            .map_or(false, |(_, head)| head.score - entry.1.score > epsilon);
        if starts_new_group {
            flush_tie_group(&mut group, &mut ordered);
        }
        group.push(entry);
    }
    flush_tie_group(&mut group, &mut ordered);

    ordered
}

fn flush_tie_group(group: &mut Vec<(usize, IndexHit)>, ordered: &mut Vec<RankedJob>) {
    group.sort_by_key(|(position, _)| *position);
    ordered.extend(group.drain(..).map(|(_, hit)| RankedJob {
        job: hit.job,
        similarity_score: hit.score,
    }));
}
