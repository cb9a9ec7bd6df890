use serde::{Deserialize, Serialize};

use crate::text::{is_blank, truncate_chars};

/// The caller's resume plus whatever search preferences they stated.
/// Immutable for the duration of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub resume_text: String,
    #[serde(default)]
    pub preferences: Option<SearchPreferences>,
}

impl UserProfile {
    pub fn new(resume_text: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            preferences: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        is_blank(&self.resume_text)
    }

    /// The resume cut to the downstream character budget.
    pub fn resume_excerpt(&self, max_chars: usize) -> &str {
        truncate_chars(self.resume_text.trim(), max_chars)
    }
}

/// Structured job-search preferences. Every field is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPreferences {
    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub primary_skills: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_job_types")]
    pub job_types: Vec<String>,
    #[serde(default)]
    pub additional_preferences: Option<String>,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        Self {
            target_roles: vec![],
            primary_skills: vec![],
            location: None,
            job_types: default_job_types(),
            additional_preferences: None,
        }
    }
}

fn default_job_types() -> Vec<String> {
    vec!["Full-time".to_string()]
}
