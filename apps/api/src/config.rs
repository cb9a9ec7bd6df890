use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::CallProfile;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub vector_index: VectorIndexConfig,
    pub calls: CallProfiles,
    pub limits: Limits,
    pub http_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

/// Which vector index backs the ranker.
#[derive(Debug, Clone)]
pub enum VectorIndexConfig {
    Pinecone {
        api_key: String,
        host: String,
        namespace: String,
    },
    Memory {
        path: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct CallProfiles {
    pub query: CallProfile,
    pub analysis: CallProfile,
    pub consolidation: CallProfile,
}

/// Size caps and fan-out limits. All enforced before any external call.
#[derive(Debug, Clone)]
pub struct Limits {
    pub resume_chars: usize,
    pub job_description_chars: usize,
    pub max_missing_skills: usize,
    pub max_top_gaps: usize,
    pub rank_top_k: usize,
    pub tie_epsilon: f32,
    pub analysis_concurrency: usize,
    pub max_analyzed_jobs: usize,
    pub batch_timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            resume_chars: 3000,
            job_description_chars: 4000,
            max_missing_skills: 3,
            max_top_gaps: 3,
            rank_top_k: 10,
            tie_epsilon: 1e-6,
            analysis_concurrency: 5,
            max_analyzed_jobs: 5,
            batch_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Limits::default();
        let batch_timeout_secs: u64 = parse_env("BATCH_TIMEOUT_SECS", 60)?;

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            vector_index: vector_index_from_env()?,
            calls: CallProfiles {
                query: CallProfile::new(env_or("QUERY_MODEL", "gpt-4o-mini"), 300, 0.3),
                analysis: CallProfile::new(env_or("ANALYSIS_MODEL", "gpt-4o"), 500, 0.3),
                consolidation: CallProfile::new(
                    env_or("CONSOLIDATION_MODEL", "gpt-4o"),
                    600,
                    0.5,
                ),
            },
            limits: Limits {
                resume_chars: parse_env("RESUME_CHAR_LIMIT", defaults.resume_chars)?,
                job_description_chars: parse_env(
                    "JOB_DESCRIPTION_CHAR_LIMIT",
                    defaults.job_description_chars,
                )?,
                max_missing_skills: parse_env("MAX_MISSING_SKILLS", defaults.max_missing_skills)?,
                max_top_gaps: parse_env("MAX_TOP_GAPS", defaults.max_top_gaps)?,
                rank_top_k: parse_env("RANK_TOP_K", defaults.rank_top_k)?,
                tie_epsilon: parse_env("TIE_EPSILON", defaults.tie_epsilon)?,
                analysis_concurrency: parse_env(
                    "ANALYSIS_CONCURRENCY",
                    defaults.analysis_concurrency,
                )?,
                max_analyzed_jobs: parse_env("MAX_ANALYZED_JOBS", defaults.max_analyzed_jobs)?,
                // 0 disables the deadline
                batch_timeout: (batch_timeout_secs > 0)
                    .then(|| Duration::from_secs(batch_timeout_secs)),
            },
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 120)?),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn vector_index_from_env() -> Result<VectorIndexConfig> {
    match env_or("VECTOR_INDEX", "pinecone").as_str() {
        "pinecone" => Ok(VectorIndexConfig::Pinecone {
            api_key: require_env("PINECONE_API_KEY")?,
            host: require_env("PINECONE_INDEX_HOST")?,
            namespace: env_or("PINECONE_NAMESPACE", "job-list"),
        }),
        "memory" => Ok(VectorIndexConfig::Memory {
            path: PathBuf::from(require_env("JOB_INDEX_PATH")?),
        }),
        other => bail!("VECTOR_INDEX must be 'pinecone' or 'memory', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
