//! Context summarization for bounding prompt size.
//!
//! Summarization is a per-call decision made during context preparation. The
//! summary only ever flows into the prompt being built and into contribution
//! metadata; it never replaces history stored on the debate record.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debate::config::{SummarizationConfig, SummarizationMethod};
use crate::llm::{CompletionRequest, LlmError, LlmProvider};

/// Temperature used for summary calls.
pub const SUMMARY_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("summarizer provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("summarizer returned an empty summary")]
    EmptySummary,
}

/// Accounting for one summarization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    pub before_chars: usize,
    pub after_chars: usize,
    pub method: SummarizationMethod,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizationResult {
    pub summary: String,
    pub metadata: SummaryMetadata,
}

/// Produces a bounded summary of debate history for one role.
///
/// Implementations must return at most `config.max_length` characters.
#[async_trait]
pub trait ContextSummarizer: Send + Sync {
    async fn summarize(
        &self,
        content: &str,
        role: &str,
        config: &SummarizationConfig,
        system_prompt: &str,
        summary_prompt: &str,
    ) -> Result<SummarizationResult, SummarizationError>;
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Summarizer backed by an [`LlmProvider`].
///
/// The caller-built summary prompt (which already embeds the content) is sent
/// as the user message; the reply is trimmed and truncated to `max_length`.
pub struct LlmSummarizer {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ContextSummarizer for LlmSummarizer {
    async fn summarize(
        &self,
        content: &str,
        role: &str,
        config: &SummarizationConfig,
        system_prompt: &str,
        summary_prompt: &str,
    ) -> Result<SummarizationResult, SummarizationError> {
        let started = Instant::now();
        let request = CompletionRequest::simple(
            self.model.clone(),
            SUMMARY_TEMPERATURE,
            system_prompt,
            summary_prompt,
        );
        let response = self.provider.complete(request).await?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(SummarizationError::EmptySummary);
        }
        let summary = truncate_chars(text, config.max_length);
        let metadata = SummaryMetadata {
            before_chars: content.chars().count(),
            after_chars: summary.chars().count(),
            method: config.method,
            timestamp: Utc::now(),
            latency_ms: started.elapsed().as_millis() as u64,
            tokens_used: response.usage.and_then(|u| u.total()),
        };
        tracing::debug!(
            role,
            before = metadata.before_chars,
            after = metadata.after_chars,
            "context summarized"
        );
        Ok(SummarizationResult { summary, metadata })
    }
}
