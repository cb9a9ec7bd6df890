/// Completion Gateway: the single point of entry for all language-model calls.
///
/// ARCHITECTURAL RULE: No other module may call a completion API directly.
/// Ranking, analysis and consolidation all go through [`CompletionGateway`].
///
/// The gateway does not truncate domain text, does not parse output and does
/// not retry. Callers own truncation (before the prompt is built) and parsing
/// (against their own schema); retry policy, if any, belongs to orchestration.
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod openai;
pub mod prompts;

pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Completion returned empty content")]
    EmptyContent,

    #[error("Empty {0} passed to completion gateway")]
    EmptyInput(&'static str),
}

/// Model choice and sampling parameters for one kind of call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallProfile {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CallProfile {
    pub fn new(model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature,
        }
    }
}

/// A fully-specified, role-tagged completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub require_json: bool,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// The external completion capability. Implemented by [`OpenAiClient`] in
/// production and by stubs in tests.
#[async_trait]
pub trait CompletionCapability: Send + Sync {
    async fn send(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Thin contract wrapper over a [`CompletionCapability`].
#[derive(Clone)]
pub struct CompletionGateway {
    capability: Arc<dyn CompletionCapability>,
}

impl CompletionGateway {
    pub fn new(capability: Arc<dyn CompletionCapability>) -> Self {
        Self { capability }
    }

    /// Sends `system` + `prompt` and returns the raw, untrusted text.
    ///
    /// With `require_json` the capability is asked to constrain its output to
    /// a JSON object; the text is still returned unparsed.
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        require_json: bool,
        profile: &CallProfile,
    ) -> Result<String, CompletionError> {
        if system.trim().is_empty() {
            return Err(CompletionError::EmptyInput("system instruction"));
        }
        if prompt.trim().is_empty() {
            return Err(CompletionError::EmptyInput("user prompt"));
        }

        let request = CompletionRequest {
            system: system.to_string(),
            prompt: prompt.to_string(),
            require_json,
            model: profile.model.clone(),
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
        };

        let text = self.capability.send(&request).await?;
        debug!(
            "Completion succeeded: model={}, chars={}",
            profile.model,
            text.len()
        );
        Ok(text)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
