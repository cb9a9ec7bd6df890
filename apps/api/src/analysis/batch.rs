//! Batch Orchestrator: runs the Fit Analyzer over every ranked candidate.
//!
//! All analyses are multiplexed on the calling task with `join_all`; a
//! semaphore caps how many completion calls are in flight. Output order is
//! input order regardless of completion order, and a failed analysis stays in
//! its slot as the empty sentinel.

use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::info;

use crate::analysis::analyzer::{settle, AnalysisError, FitAnalyzer};
use crate::analysis::models::{Diagnostic, FitAnalysis};
use crate::models::job::JobListing;
use crate::models::profile::UserProfile;

#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Maximum concurrent completion calls. Zero is treated as one.
    pub concurrency: usize,
    /// Analyses still pending when this elapses settle as `TimedOut`;
    /// finished ones are kept.
    pub timeout: Option<Duration>,
}

/// One candidate paired with its analysis.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub job: JobListing,
    pub analysis: FitAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Same length and order as the input candidates.
    pub entries: Vec<BatchEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    pub fn analyses(&self) -> Vec<FitAnalysis> {
        self.entries.iter().map(|e| e.analysis.clone()).collect()
    }
}

/// Analyzes every candidate concurrently and returns one entry per candidate.
pub async fn analyze_batch(
    analyzer: &FitAnalyzer,
    profile: &UserProfile,
    candidates: &[JobListing],
    settings: &BatchSettings,
) -> BatchReport {
    if candidates.is_empty() {
        return BatchReport {
            entries: vec![],
            diagnostics: vec![],
        };
    }

    info!("Starting analysis for {} jobs", candidates.len());

    let semaphore = Semaphore::new(settings.concurrency.max(1));
    let deadline = settings.timeout.map(|t| Instant::now() + t);

    let tasks = candidates.iter().map(|job| {
        let semaphore = &semaphore;
        async move {
            let work = async {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire().await.ok();
                analyzer.evaluate(profile, job).await
            };
            let result = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, work)
                    .await
                    .unwrap_or(Err(AnalysisError::TimedOut)),
                None => work.await,
            };
            settle(&job.id, result)
        }
    });

    let settled = join_all(tasks).await;

    let mut entries = Vec::with_capacity(candidates.len());
    let mut diagnostics = Vec::new();
    for (job, (analysis, diagnostic)) in candidates.iter().zip(settled) {
        entries.push(BatchEntry {
            job: job.clone(),
            analysis,
        });
        diagnostics.extend(diagnostic);
    }

    info!(
        "Completed analysis for {} jobs ({} empty)",
        entries.len(),
        diagnostics.len()
    );

    BatchReport {
        entries,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::analysis::analyzer::AnalyzerSettings;
    use crate::analysis::models::DiagnosticKind;
    use crate::llm_client::{
        CallProfile, CompletionCapability, CompletionError, CompletionGateway, CompletionRequest,
    };
    use crate::models::job::JobSource;

    /// Replies with a single missing skill named after the job marker found
    /// in the prompt, after a per-job delay. Fails for the `fail` marker.
    struct ScriptedCompletion {
        delays_ms: Vec<(String, u64)>,
        fail_marker: Option<String>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedCompletion {
        fn new(delays_ms: Vec<(&str, u64)>, fail_marker: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                delays_ms: delays_ms
                    .into_iter()
                    .map(|(m, d)| (m.to_string(), d))
                    .collect(),
                fail_marker: fail_marker.map(str::to_string),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionCapability for ScriptedCompletion {
        async fn send(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let (marker, delay) = self
                .delays_ms
                .iter()
                .find(|(m, _)| request.prompt.contains(m.as_str()))
                .cloned()
                .unwrap_or_else(|| ("unknown".to_string(), 0));
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_marker.as_deref() == Some(marker.as_str()) {
                return Err(CompletionError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(format!(
                r#"{{"missing_skills": [{{"skill": "{marker}", "learn_time_estimate": "1 week"}}],
                    "resume_suggestions": {{"highlight": [], "consider_removing": []}}}}"#
            ))
        }
    }

    fn analyzer(capability: Arc<ScriptedCompletion>) -> FitAnalyzer {
        FitAnalyzer::new(
            CompletionGateway::new(capability),
            AnalyzerSettings {
                resume_char_limit: 3000,
                description_char_limit: 4000,
                max_missing_skills: 3,
                call: CallProfile::new("gpt-4o", 500, 0.3),
            },
        )
    }

    fn job(marker: &str) -> JobListing {
        JobListing {
            id: format!("id-{marker}"),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            description: format!("Requires {marker}"),
            location: "Remote".to_string(),
            source: JobSource::default(),
        }
    }

    fn skill_of(entry: &BatchEntry) -> Option<&str> {
        entry
            .analysis
            .result()
            .map(|r| r.missing_skills[0].skill.as_str())
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_matches_input_despite_completion_order() {
        let capability = ScriptedCompletion::new(
            vec![("alpha", 300), ("bravo", 100), ("charlie", 200)],
            None,
        );
        let candidates = vec![job("alpha"), job("bravo"), job("charlie")];

        let report = analyze_batch(
            &analyzer(capability),
            &UserProfile::new("Rust engineer"),
            &candidates,
            &BatchSettings {
                concurrency: 3,
                timeout: None,
            },
        )
        .await;

        let skills: Vec<Option<&str>> = report.entries.iter().map(skill_of).collect();
        assert_eq!(skills, vec![Some("alpha"), Some("bravo"), Some("charlie")]);
        assert!(report.diagnostics.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_failure_keeps_slot_as_empty_sentinel() {
        let capability = ScriptedCompletion::new(
            vec![("alpha", 10), ("bravo", 10), ("charlie", 10), ("delta", 10)],
            Some("charlie"),
        );
        let candidates = vec![job("alpha"), job("bravo"), job("charlie"), job("delta")];

        let report = analyze_batch(
            &analyzer(capability),
            &UserProfile::new("Rust engineer"),
            &candidates,
            &BatchSettings {
                concurrency: 4,
                timeout: None,
            },
        )
        .await;

        assert_eq!(report.entries.len(), 4);
        let empties: Vec<usize> = report
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.analysis.is_empty())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(empties, vec![2]);
        assert_eq!(report.entries[2].job.id, "id-charlie");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].job_id, "id-charlie");
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Completion);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_ceiling_is_respected() {
        let markers = ["a1", "a2", "a3", "a4", "a5", "a6"];
        let capability = ScriptedCompletion::new(markers.iter().map(|m| (*m, 50)).collect(), None);
        let candidates: Vec<JobListing> = markers.iter().map(|m| job(m)).collect();

        let report = analyze_batch(
            &analyzer(capability.clone()),
            &UserProfile::new("Rust engineer"),
            &candidates,
            &BatchSettings {
                concurrency: 2,
                timeout: None,
            },
        )
        .await;

        assert_eq!(report.entries.len(), 6);
        assert_eq!(capability.calls.load(Ordering::SeqCst), 6);
        assert_eq!(capability.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_finished_and_times_out_rest() {
        let capability = ScriptedCompletion::new(vec![("quick", 10), ("slow", 10_000)], None);
        let candidates = vec![job("quick"), job("slow")];

        let report = analyze_batch(
            &analyzer(capability),
            &UserProfile::new("Rust engineer"),
            &candidates,
            &BatchSettings {
                concurrency: 2,
                timeout: Some(Duration::from_secs(1)),
            },
        )
        .await;

        assert_eq!(skill_of(&report.entries[0]), Some("quick"));
        assert!(report.entries[1].analysis.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::TimedOut);
    }

    #[tokio::test]
    async fn test_blank_description_is_empty_without_call() {
        let capability = ScriptedCompletion::new(vec![("alpha", 0)], None);
        let mut blank = job("blank");
        blank.description = "  ".to_string();
        let candidates = vec![job("alpha"), blank];

        let report = analyze_batch(
            &analyzer(capability.clone()),
            &UserProfile::new("Rust engineer"),
            &candidates,
            &BatchSettings {
                concurrency: 5,
                timeout: None,
            },
        )
        .await;

        assert_eq!(capability.calls.load(Ordering::SeqCst), 1);
        assert!(report.entries[1].analysis.is_empty());
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::EmptyInput);
    }

    #[tokio::test]
    async fn test_empty_candidates_yield_empty_report() {
        let capability = ScriptedCompletion::new(vec![], None);
        let report = analyze_batch(
            &analyzer(capability),
            &UserProfile::new("Rust engineer"),
            &[],
            &BatchSettings {
                concurrency: 5,
                timeout: None,
            },
        )
        .await;
        assert!(report.entries.is_empty());
        assert!(report.analyses().is_empty());
    }
}
