use serde::{Deserialize, Serialize};

use crate::text::{is_blank, truncate_chars};

/// A job listing produced by the external listing source. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    /// Opaque identifier, unique within a batch.
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub source: JobSource,
}

/// Where a listing came from. Carried through untouched for the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSource {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub date_posted: Option<String>,
}

impl JobListing {
    pub fn has_description(&self) -> bool {
        !is_blank(&self.description)
    }

    pub fn description_excerpt(&self, max_chars: usize) -> &str {
        truncate_chars(self.description.trim(), max_chars)
    }

    /// Title used inside prompts; never empty.
    pub fn display_title(&self) -> &str {
        if is_blank(&self.title) {
            "this job"
        } else {
            self.title.trim()
        }
    }
}

/// A listing paired with its similarity to the optimized query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedJob {
    pub job: JobListing,
    pub similarity_score: f32,
}

impl RankedJob {
    /// Similarity as a percentage rounded to one decimal place.
    pub fn match_percentage(&self) -> f64 {
        (self.similarity_score as f64 * 1000.0).round() / 10.0
    }

    pub fn match_text(&self) -> String {
        format!("{}% Match", (self.similarity_score as f64 * 100.0).round())
    }
}
