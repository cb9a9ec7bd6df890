//! Gap Consolidator: many per-job missing-skill lists in, one prioritized
//! top-N report out.
//!
//! The union of skills is rendered with recurrence counts and handed to a
//! single JSON completion call. The answer is validated against
//! `{"top_gaps": [...]}`; anything else degrades to an empty report.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::models::{FitAnalysis, SkillGap};
use crate::insights::prompts::{CONSOLIDATION_PROMPT_TEMPLATE, CONSOLIDATION_SYSTEM};
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{strip_json_fences, CallProfile, CompletionError, CompletionGateway};
use crate::models::profile::UserProfile;
use crate::text::fill_template;

#[derive(Debug, Error)]
pub enum ConsolidationError {
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Response violated the consolidation schema: {0}")]
    SchemaViolation(String),
}

/// Prioritized skill gaps across a whole search. An empty `top_gaps` means no
/// significant recurring gaps (or that consolidation was unavailable).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedGapReport {
    pub top_gaps: Vec<SkillGap>,
}

impl ConsolidatedGapReport {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct ConsolidatorSettings {
    pub resume_char_limit: usize,
    pub max_top_gaps: usize,
    pub call: CallProfile,
}

/// One distinct skill from the union, with how many analyses flagged it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGap {
    pub skill: String,
    pub learn_time_estimate: String,
    pub occurrences: usize,
}

#[derive(Clone)]
pub struct GapConsolidator {
    gateway: CompletionGateway,
    settings: ConsolidatorSettings,
}

impl GapConsolidator {
    pub fn new(gateway: CompletionGateway, settings: ConsolidatorSettings) -> Self {
        Self { gateway, settings }
    }

    /// Never fails. Empty analyses are skipped; an empty union returns an
    /// empty report without calling the model.
    pub async fn consolidate(
        &self,
        profile: &UserProfile,
        analyses: &[FitAnalysis],
    ) -> ConsolidatedGapReport {
        let candidates = collect_candidates(analyses);
        if candidates.is_empty() {
            info!("No missing skills to consolidate");
            return ConsolidatedGapReport::empty();
        }

        match self.try_consolidate(profile, &candidates).await {
            Ok(report) => {
                info!(
                    candidates = candidates.len(),
                    top_gaps = report.top_gaps.len(),
                    "Skill gaps consolidated"
                );
                report
            }
            Err(err) => {
                error!("Skill gap consolidation failed: {err}");
                ConsolidatedGapReport::empty()
            }
        }
    }

    async fn try_consolidate(
        &self,
        profile: &UserProfile,
        candidates: &[CandidateGap],
    ) -> Result<ConsolidatedGapReport, ConsolidationError> {
        let max_gaps = self.settings.max_top_gaps.to_string();
        let candidate_gaps = render_candidates(candidates);
        let prompt = fill_template(
            CONSOLIDATION_PROMPT_TEMPLATE,
            &[
                ("max_gaps", max_gaps.as_str()),
                ("candidate_gaps", candidate_gaps.as_str()),
                ("no_fabrication", NO_FABRICATION_INSTRUCTION),
                (
                    "resume_text",
                    profile.resume_excerpt(self.settings.resume_char_limit),
                ),
            ],
        );
        let system = format!("{CONSOLIDATION_SYSTEM} {JSON_ONLY_INSTRUCTION}");

        let raw = self
            .gateway
            .complete(&system, &prompt, true, &self.settings.call)
            .await?;

        parse_report(&raw, self.settings.max_top_gaps)
    }
}

/// Flattens the missing skills of every valid analysis, merging entries whose
/// names match case-insensitively. First-seen order and spelling are kept.
pub fn collect_candidates(analyses: &[FitAnalysis]) -> Vec<CandidateGap> {
    let mut candidates: Vec<CandidateGap> = Vec::new();

    for gap in analyses
        .iter()
        .filter_map(FitAnalysis::result)
        .flat_map(|r| r.missing_skills.iter())
    {
        let key = gap.skill.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match candidates
            .iter_mut()
            .find(|c| c.skill.to_lowercase() == key)
        {
            Some(existing) => existing.occurrences += 1,
            None => candidates.push(CandidateGap {
                skill: gap.skill.trim().to_string(),
                learn_time_estimate: gap.learn_time_estimate.clone(),
                occurrences: 1,
            }),
        }
    }

    candidates
}

fn render_candidates(candidates: &[CandidateGap]) -> String {
    candidates
        .iter()
        .map(|c| {
            format!(
                "- {} (flagged in {} job{}; earlier estimate: {})",
                c.skill,
                c.occurrences,
                if c.occurrences == 1 { "" } else { "s" },
                c.learn_time_estimate
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireReport {
    top_gaps: Vec<WireGap>,
}

#[derive(Debug, Deserialize)]
struct WireGap {
    skill: String,
    learn_time_estimate: String,
}

/// Validates raw model output against `{"top_gaps": [...]}`.
pub fn parse_report(raw: &str, max_gaps: usize) -> Result<ConsolidatedGapReport, ConsolidationError> {
    let wire: WireReport = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| ConsolidationError::SchemaViolation(e.to_string()))?;

    let mut top_gaps = Vec::with_capacity(wire.top_gaps.len());
    for (i, gap) in wire.top_gaps.into_iter().enumerate() {
        let skill = gap.skill.trim();
        let estimate = gap.learn_time_estimate.trim();
        if skill.is_empty() || estimate.is_empty() {
            return Err(ConsolidationError::SchemaViolation(format!(
                "top_gaps[{i}] has a blank skill or learn_time_estimate"
            )));
        }
        top_gaps.push(SkillGap {
            skill: skill.to_string(),
            learn_time_estimate: estimate.to_string(),
        });
    }

    if top_gaps.len() > max_gaps {
        warn!(
            "Model returned {} top gaps; keeping the first {}",
            top_gaps.len(),
            max_gaps
        );
        top_gaps.truncate(max_gaps);
    }

    Ok(ConsolidatedGapReport { top_gaps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{AnalysisResult, ResumeSuggestions, Suggestions};
    use crate::llm_client::testing::{gateway, StubCompletion};

    fn settings() -> ConsolidatorSettings {
        ConsolidatorSettings {
            resume_char_limit: 3000,
            max_top_gaps: 3,
            call: CallProfile::new("gpt-4o", 600, 0.5),
        }
    }

    fn analysis(skills: &[&str]) -> FitAnalysis {
        FitAnalysis::Valid(AnalysisResult {
            missing_skills: skills
                .iter()
                .map(|s| SkillGap {
                    skill: s.to_string(),
                    learn_time_estimate: "2 weeks".to_string(),
                })
                .collect(),
            resume_suggestions: ResumeSuggestions {
                highlight: Suggestions::NoSuggestions,
                consider_removing: Suggestions::NoSuggestions,
            },
        })
    }

    #[tokio::test]
    async fn test_empty_union_returns_empty_report_without_call() {
        let stub = StubCompletion::replying(r#"{"top_gaps": []}"#);
        let consolidator = GapConsolidator::new(gateway(&stub), settings());

        let report = consolidator
            .consolidate(
                &UserProfile::new("Rust engineer"),
                &[FitAnalysis::Empty, analysis(&[]), FitAnalysis::Empty],
            )
            .await;

        assert!(report.top_gaps.is_empty());
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_gap_response_round_trips() {
        let stub = StubCompletion::replying(
            r#"{"top_gaps": [{"skill": "Kubernetes", "learn_time_estimate": "3 weeks, project focus"}]}"#,
        );
        let consolidator = GapConsolidator::new(gateway(&stub), settings());

        let report = consolidator
            .consolidate(
                &UserProfile::new("Rust engineer"),
                &[analysis(&["Kubernetes"]), analysis(&["kubernetes", "Helm"])],
            )
            .await;

        assert_eq!(
            report.top_gaps,
            vec![SkillGap {
                skill: "Kubernetes".to_string(),
                learn_time_estimate: "3 weeks, project focus".to_string(),
            }]
        );
        assert_eq!(stub.calls(), 1);
        assert!(stub.last_request().unwrap().require_json);
    }

    #[tokio::test]
    async fn test_prompt_carries_recurrence_counts() {
        let stub = StubCompletion::replying(r#"{"top_gaps": []}"#);
        let consolidator = GapConsolidator::new(gateway(&stub), settings());

        consolidator
            .consolidate(
                &UserProfile::new("Rust engineer"),
                &[
                    analysis(&["Kubernetes", "Go"]),
                    FitAnalysis::Empty,
                    analysis(&["KUBERNETES"]),
                ],
            )
            .await;

        let prompt = stub.last_request().unwrap().prompt;
        assert!(prompt.contains("- Kubernetes (flagged in 2 jobs"));
        assert!(prompt.contains("- Go (flagged in 1 job;"));
        assert!(prompt.contains("Rust engineer"));
    }

    #[tokio::test]
    async fn test_prompt_keeps_placeholder_text_in_skill_names_literal() {
        let stub = StubCompletion::replying(r#"{"top_gaps": []}"#);
        let consolidator = GapConsolidator::new(gateway(&stub), settings());

        consolidator
            .consolidate(
                &UserProfile::new("SECRET_RESUME_MARKER"),
                &[analysis(&["{resume_text} templating", "{no_fabrication}"])],
            )
            .await;

        let prompt = stub.last_request().unwrap().prompt;
        assert_eq!(prompt.matches("SECRET_RESUME_MARKER").count(), 1);
        assert!(prompt.contains("- {resume_text} templating (flagged in 1 job;"));
        assert!(prompt.contains("- {no_fabrication} (flagged in 1 job;"));
    }

    #[tokio::test]
    async fn test_completion_failure_returns_empty_report() {
        let stub = StubCompletion::failing();
        let consolidator = GapConsolidator::new(gateway(&stub), settings());

        let report = consolidator
            .consolidate(&UserProfile::new("Rust"), &[analysis(&["Go"])])
            .await;

        assert_eq!(report, ConsolidatedGapReport::empty());
    }

    #[tokio::test]
    async fn test_malformed_response_returns_empty_report() {
        let stub = StubCompletion::replying(r#"{"gaps": ["Go"]}"#);
        let consolidator = GapConsolidator::new(gateway(&stub), settings());

        let report = consolidator
            .consolidate(&UserProfile::new("Rust"), &[analysis(&["Go"])])
            .await;

        assert!(report.top_gaps.is_empty());
    }

    #[test]
    fn test_parse_does_not_pad_short_lists() {
        let report = parse_report(
            r#"{"top_gaps": [{"skill": "Go", "learn_time_estimate": "1 month"},
                             {"skill": "gRPC", "learn_time_estimate": "1 week"}]}"#,
            3,
        )
        .unwrap();
        assert_eq!(report.top_gaps.len(), 2);
    }

    #[test]
    fn test_parse_caps_long_lists() {
        let raw = r#"{"top_gaps": [
            {"skill": "A", "learn_time_estimate": "1w"},
            {"skill": "B", "learn_time_estimate": "1w"},
            {"skill": "C", "learn_time_estimate": "1w"},
            {"skill": "D", "learn_time_estimate": "1w"}]}"#;
        let report = parse_report(raw, 3).unwrap();
        assert_eq!(report.top_gaps.len(), 3);
        assert_eq!(report.top_gaps[2].skill, "C");
    }

    #[test]
    fn test_parse_rejects_extra_keys_and_blank_entries() {
        assert!(parse_report(r#"{"top_gaps": [], "summary": "x"}"#, 3).is_err());
        assert!(parse_report(
            r#"{"top_gaps": [{"skill": "", "learn_time_estimate": "1w"}]}"#,
            3
        )
        .is_err());
    }

    #[test]
    fn test_collect_candidates_merges_case_insensitively() {
        let candidates = collect_candidates(&[
            analysis(&["Docker", "AWS"]),
            analysis(&["docker "]),
            FitAnalysis::Empty,
        ]);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].skill, "Docker");
        assert_eq!(candidates[0].occurrences, 2);
        assert_eq!(candidates[1].occurrences, 1);
    }
}
