use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::NO_SUGGESTIONS;

/// A skill the job asks for that the profile lacks, with a personalised
/// learning-time estimate (and a project or certification idea).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub learn_time_estimate: String,
}

/// A list of resume suggestions, or the explicit statement that there are none.
///
/// On the wire this is either an array of strings or the text
/// `"No suggestions"`. An empty array, or one holding only "No suggestions",
/// reads as [`Suggestions::NoSuggestions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSuggestions", into = "RawSuggestions")]
pub enum Suggestions {
    Items(Vec<String>),
    NoSuggestions,
}

impl Suggestions {
    pub fn items(&self) -> &[String] {
        match self {
            Suggestions::Items(items) => items,
            Suggestions::NoSuggestions => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSuggestions {
    List(Vec<String>),
    Text(String),
}

impl From<RawSuggestions> for Suggestions {
    fn from(raw: RawSuggestions) -> Self {
        let items: Vec<String> = match raw {
            RawSuggestions::List(items) => items,
            RawSuggestions::Text(text) => vec![text],
        };
        let items: Vec<String> = items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && !is_no_suggestions(s))
            .collect();

        if items.is_empty() {
            Suggestions::NoSuggestions
        } else {
            Suggestions::Items(items)
        }
    }
}

impl From<Suggestions> for RawSuggestions {
    fn from(suggestions: Suggestions) -> Self {
        match suggestions {
            Suggestions::Items(items) => RawSuggestions::List(items),
            Suggestions::NoSuggestions => RawSuggestions::Text(NO_SUGGESTIONS.to_string()),
        }
    }
}

/// Recognises the model's ways of saying "nothing to suggest".
pub fn is_no_suggestions(text: &str) -> bool {
    let normalized = text.trim().trim_end_matches('.').to_lowercase();
    matches!(
        normalized.as_str(),
        "no suggestions" | "no suggestion" | "none" | "n/a"
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSuggestions {
    pub highlight: Suggestions,
    pub consider_removing: Suggestions,
}

/// A schema-conformant fit analysis for one (profile, job) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// At most the configured cap (3 by default), most important first.
    pub missing_skills: Vec<SkillGap>,
    pub resume_suggestions: ResumeSuggestions,
}

/// Either a full analysis or the empty sentinel.
///
/// `Empty` means "no analysis available", never "zero gaps found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitAnalysis {
    Valid(AnalysisResult),
    Empty,
}

impl FitAnalysis {
    pub fn is_empty(&self) -> bool {
        matches!(self, FitAnalysis::Empty)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            FitAnalysis::Valid(result) => Some(result),
            FitAnalysis::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    EmptyInput,
    Completion,
    SchemaViolation,
    TimedOut,
}

/// Why a job's analysis came back empty. Returned next to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub job_id: String,
    pub kind: DiagnosticKind,
    pub message: String,
}
