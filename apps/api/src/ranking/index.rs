//! Vector index capability: nearest-neighbour lookup over job-listing embeddings.
//!
//! Two backends:
//! - [`PineconeIndex`]: queries a hosted Pinecone index over HTTP.
//! - [`InMemoryVectorIndex`]: brute-force cosine similarity over listings
//!   loaded from a pre-embedded JSON file.
//!
//! Listings are assumed to have been indexed by an external ingestion process.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::embedding::cosine_similarity;
use super::RankingError;
use crate::models::job::{JobListing, JobSource};

/// One nearest-neighbour match, in the order the index returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub job: JobListing,
    pub score: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns at most `top_k` hits, most similar first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexHit>, RankingError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ────────────────────────────────────────────────────────────────────────────

/// A listing with its precomputed embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedJob {
    pub job: JobListing,
    pub embedding: Vec<f32>,
}

#[derive(Debug)]
pub struct InMemoryVectorIndex {
    entries: Vec<IndexedJob>,
}

impl InMemoryVectorIndex {
    pub fn new(entries: Vec<IndexedJob>) -> Self {
        Self { entries }
    }

    /// Loads a JSON array of [`IndexedJob`] records. Every embedding must
    /// have the same dimension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job index file '{}'", path.display()))?;
        let entries: Vec<IndexedJob> = serde_json::from_str(&raw)
            .with_context(|| format!("Job index file '{}' is not valid JSON", path.display()))?;
        if let Some(first) = entries.first() {
            let dims = first.embedding.len();
            if let Some(odd) = entries.iter().find(|e| e.embedding.len() != dims) {
                bail!(
                    "Job index file '{}' mixes embedding dimensions: '{}' has {}, '{}' has {}",
                    path.display(),
                    first.job.id,
                    dims,
                    odd.job.id,
                    odd.embedding.len()
                );
            }
        }
        info!(
            "Loaded {} pre-embedded job listings from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexHit>, RankingError> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.embedding.len() != vector.len())
        {
            return Err(RankingError::Index(format!(
                "query has {} dims, index has {} (listing '{}')",
                vector.len(),
                entry.embedding.len(),
                entry.job.id
            )));
        }

        let mut hits: Vec<IndexHit> = self
            .entries
            .iter()
            .map(|entry| IndexHit {
                job: entry.job.clone(),
                score: cosine_similarity(vector, &entry.embedding),
            })
            .collect();

        // Stable: equal scores keep file order.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pinecone backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PineconeQuery<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct PineconeResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Map<String, Value>,
}

pub struct PineconeIndex {
    client: Client,
    api_key: String,
    host: String,
    namespace: String,
}

impl PineconeIndex {
    pub fn new(
        api_key: String,
        host: &str,
        namespace: String,
        timeout: Duration,
    ) -> Result<Self, RankingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RankingError::Index(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            host: normalize_host(host),
            namespace,
        })
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexHit>, RankingError> {
        let body = PineconeQuery {
            vector,
            top_k,
            namespace: &self.namespace,
            include_metadata: true,
        };

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RankingError::Index(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RankingError::Index(format!(
                "Pinecone returned {status}: {body}"
            )));
        }

        let parsed: PineconeResponse = response
            .json()
            .await
            .map_err(|e| RankingError::Index(format!("invalid Pinecone response: {e}")))?;

        debug!(
            "Pinecone returned {} matches from namespace '{}'",
            parsed.matches.len(),
            self.namespace
        );

        Ok(parsed.matches.into_iter().map(match_to_hit).collect())
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn match_to_hit(m: PineconeMatch) -> IndexHit {
    let field = |key: &str| {
        m.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let job = JobListing {
        title: field("title").unwrap_or_default(),
        company: field("company").unwrap_or_default(),
        description: field("text")
            .or_else(|| field("description"))
            .unwrap_or_default(),
        location: field("location").unwrap_or_default(),
        source: JobSource {
            url: field("url").filter(|s| !s.is_empty()),
            job_type: field("job_type").filter(|s| !s.is_empty()),
            date_posted: field("date_posted").filter(|s| !s.is_empty()),
        },
        id: m.id,
    };

    IndexHit {
        job,
        score: m.score,
    }
}
