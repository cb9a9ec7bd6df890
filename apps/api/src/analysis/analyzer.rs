//! Fit Analyzer: one (profile, job) pair in, one [`FitAnalysis`] out.
//!
//! Flow: precondition check → truncate → fill prompt → completion (JSON mode)
//! → strict validation → `Valid` or `Empty`. Every failure is caught here,
//! logged against the job id, and reported as a [`Diagnostic`].

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::models::{
    is_no_suggestions, AnalysisResult, Diagnostic, DiagnosticKind, FitAnalysis,
    ResumeSuggestions, SkillGap, Suggestions,
};
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{strip_json_fences, CallProfile, CompletionError, CompletionGateway};
use crate::models::job::JobListing;
use crate::models::profile::UserProfile;
use crate::text::fill_template;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Missing {0}; analysis skipped")]
    EmptyInput(&'static str),

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Response violated the analysis schema: {0}")]
    SchemaViolation(String),

    #[error("Analysis did not finish before the batch deadline")]
    TimedOut,
}

impl AnalysisError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            AnalysisError::EmptyInput(_) => DiagnosticKind::EmptyInput,
            AnalysisError::Completion(_) => DiagnosticKind::Completion,
            AnalysisError::SchemaViolation(_) => DiagnosticKind::SchemaViolation,
            AnalysisError::TimedOut => DiagnosticKind::TimedOut,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub resume_char_limit: usize,
    pub description_char_limit: usize,
    pub max_missing_skills: usize,
    pub call: CallProfile,
}

#[derive(Clone)]
pub struct FitAnalyzer {
    gateway: CompletionGateway,
    settings: AnalyzerSettings,
}

impl FitAnalyzer {
    pub fn new(gateway: CompletionGateway, settings: AnalyzerSettings) -> Self {
        Self { gateway, settings }
    }

    /// Analyzes one job. Never fails: any problem yields [`FitAnalysis::Empty`].
    pub async fn analyze(&self, profile: &UserProfile, job: &JobListing) -> FitAnalysis {
        let result = self.evaluate(profile, job).await;
        settle(&job.id, result).0
    }

    /// The fallible core of [`analyze`](Self::analyze). Does not call the
    /// completion capability when either input text is empty.
    pub async fn evaluate(
        &self,
        profile: &UserProfile,
        job: &JobListing,
    ) -> Result<AnalysisResult, AnalysisError> {
        if profile.is_blank() {
            return Err(AnalysisError::EmptyInput("profile text"));
        }
        if !job.has_description() {
            return Err(AnalysisError::EmptyInput("job description"));
        }

        let prompt = self.build_prompt(profile, job);
        let system = format!("{ANALYSIS_SYSTEM} {JSON_ONLY_INSTRUCTION}");

        info!(job_id = %job.id, "Analyzing job fit");
        let raw = self
            .gateway
            .complete(&system, &prompt, true, &self.settings.call)
            .await?;

        parse_analysis(&raw, self.settings.max_missing_skills)
    }

    fn build_prompt(&self, profile: &UserProfile, job: &JobListing) -> String {
        let max_skills = self.settings.max_missing_skills.to_string();
        fill_template(
            ANALYSIS_PROMPT_TEMPLATE,
            &[
                ("max_skills", max_skills.as_str()),
                ("no_fabrication", NO_FABRICATION_INSTRUCTION),
                ("job_title", job.display_title()),
                (
                    "job_description",
                    job.description_excerpt(self.settings.description_char_limit),
                ),
                (
                    "resume_text",
                    profile.resume_excerpt(self.settings.resume_char_limit),
                ),
            ],
        )
    }
}

/// Collapses an analysis outcome into the sentinel form plus a diagnostic,
/// logging failures against the job id.
pub fn settle(
    job_id: &str,
    result: Result<AnalysisResult, AnalysisError>,
) -> (FitAnalysis, Option<Diagnostic>) {
    match result {
        Ok(analysis) => {
            info!(
                job_id = %job_id,
                missing_skills = analysis.missing_skills.len(),
                "Analysis complete"
            );
            (FitAnalysis::Valid(analysis), None)
        }
        Err(err) => {
            match &err {
                AnalysisError::EmptyInput(_) => warn!(job_id = %job_id, "{err}"),
                _ => error!(job_id = %job_id, "Fit analysis failed: {err}"),
            }
            let diagnostic = Diagnostic {
                job_id: job_id.to_string(),
                kind: err.kind(),
                message: err.to_string(),
            };
            (FitAnalysis::Empty, Some(diagnostic))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response validation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireAnalysis {
    missing_skills: WireSkills,
    resume_suggestions: WireSuggestions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireSkills {
    List(Vec<WireSkill>),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct WireSkill {
    skill: String,
    learn_time_estimate: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireSuggestions {
    highlight: Suggestions,
    consider_removing: Suggestions,
}

/// Parses and validates raw model output against the analysis schema.
///
/// Exactly two top-level keys are accepted. Skill entries need a non-blank
/// name and estimate. More than `max_skills` entries are cut to the cap.
pub fn parse_analysis(raw: &str, max_skills: usize) -> Result<AnalysisResult, AnalysisError> {
    let wire: WireAnalysis = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| AnalysisError::SchemaViolation(e.to_string()))?;

    let skills = match wire.missing_skills {
        WireSkills::List(skills) => skills,
        WireSkills::Text(text) if is_no_suggestions(&text) => vec![],
        WireSkills::Text(text) => {
            return Err(AnalysisError::SchemaViolation(format!(
                "missing_skills must be a list, got text '{text}'"
            )))
        }
    };

    let mut missing_skills = Vec::with_capacity(skills.len().min(max_skills));
    for (i, entry) in skills.into_iter().enumerate() {
        let skill = entry.skill.trim();
        let estimate = entry.learn_time_estimate.trim();
        if skill.is_empty() || estimate.is_empty() {
            return Err(AnalysisError::SchemaViolation(format!(
                "missing_skills[{i}] has a blank skill or learn_time_estimate"
            )));
        }
        missing_skills.push(SkillGap {
            skill: skill.to_string(),
            learn_time_estimate: estimate.to_string(),
        });
    }

    if missing_skills.len() > max_skills {
        warn!(
            "Model returned {} missing skills; keeping the first {}",
            missing_skills.len(),
            max_skills
        );
        missing_skills.truncate(max_skills);
    }

    Ok(AnalysisResult {
        missing_skills,
        resume_suggestions: ResumeSuggestions {
            highlight: wire.resume_suggestions.highlight,
            consider_removing: wire.resume_suggestions.consider_removing,
        },
    })
}
