//! Optimized query derivation: a short, dense text built from the profile and
//! preferences, distinct from the raw resume.

use crate::llm_client::{CallProfile, CompletionGateway};
use crate::models::profile::{SearchPreferences, UserProfile};
use crate::ranking::prompts::{QUERY_PROMPT_TEMPLATE, QUERY_SYSTEM};
use crate::ranking::RankingError;
use crate::text::fill_template;

/// The query text and its embedding. Lives for one ranking call only.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Asks the completion gateway for an optimized query string.
pub async fn optimize_query(
    gateway: &CompletionGateway,
    profile: &UserProfile,
    preferences: &SearchPreferences,
    resume_char_limit: usize,
    call: &CallProfile,
) -> Result<String, RankingError> {
    let prompt = build_query_prompt(profile.resume_excerpt(resume_char_limit), preferences);
    let raw = gateway.complete(QUERY_SYSTEM, &prompt, false, call).await?;

    let query = clean_query(&raw);
    if query.is_empty() {
        return Err(RankingError::BlankQuery);
    }
    Ok(query)
}

pub fn build_query_prompt(resume_excerpt: &str, preferences: &SearchPreferences) -> String {
    let target_roles = join_or_any(&preferences.target_roles);
    let primary_skills = join_or_any(&preferences.primary_skills);
    let job_types = join_or_any(&preferences.job_types);
    fill_template(
        QUERY_PROMPT_TEMPLATE,
        &[
            ("target_roles", target_roles.as_str()),
            ("primary_skills", primary_skills.as_str()),
            (
                "location",
                non_blank(preferences.location.as_deref()).unwrap_or("Any"),
            ),
            ("job_types", job_types.as_str()),
            (
                "additional_preferences",
                non_blank(preferences.additional_preferences.as_deref()).unwrap_or("None"),
            ),
            ("resume_text", resume_excerpt),
        ],
    )
}

/// Collapses whitespace and strips wrapping quotes or a `Query:` label.
fn clean_query(raw: &str) -> String {
    let text = raw.trim();
    let text = text
        .strip_prefix("Query:")
        .or_else(|| text.strip_prefix("query:"))
        .unwrap_or(text)
        .trim();
    let text = text.trim_matches(|c| c == '"' || c == '\'' || c == '`');
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_or_any(items: &[String]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        "Any".to_string()
    } else {
        items.join(", ")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
