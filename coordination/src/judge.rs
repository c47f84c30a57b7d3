//! Judge synthesis: one provider call over the full transcript.
//!
//! The judge reads rounds and returns a [`Solution`]; it never touches the
//! debate record. Structured fields beyond the description come from a
//! pluggable [`SolutionExtractor`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, Instrument};

use crate::agent::context::{context_size, full_history, should_summarize};
use crate::agent::AgentError;
use crate::debate::config::{AgentConfig, SummarizationConfig};
use crate::debate::state::{DebateRound, Solution};
use crate::llm::{CompletionRequest, LlmProvider};
use crate::otel;
use crate::summarizer::{truncate_chars, ContextSummarizer, LlmSummarizer};

/// Fixed sampling temperature for synthesis.
pub const JUDGE_TEMPERATURE: f32 = 0.3;

/// Confidence reported by [`PlaceholderExtractor`].
pub const PLACEHOLDER_CONFIDENCE: u8 = 75;

pub const DEFAULT_JUDGE_SYSTEM_PROMPT: &str = "You are the judge of a technical design debate. \
    Several specialists have proposed, critiqued, and refined solutions. Weigh their arguments \
    on the merits, resolve disagreements explicitly, and produce a single coherent solution \
    with its key trade-offs and concrete recommendations.";

/// Structured fields pulled from the judge's free-text answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedFields {
    pub tradeoffs: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence: u8,
}

/// Turns synthesis text into structured solution fields.
pub trait SolutionExtractor: Send + Sync {
    fn extract(&self, text: &str) -> ExtractedFields;
}

/// Leaves trade-offs and recommendations empty with a fixed confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderExtractor;

impl SolutionExtractor for PlaceholderExtractor {
    fn extract(&self, _text: &str) -> ExtractedFields {
        ExtractedFields {
            tradeoffs: Vec::new(),
            recommendations: Vec::new(),
            confidence: PLACEHOLDER_CONFIDENCE,
        }
    }
}

pub struct Judge {
    config: AgentConfig,
    provider: Arc<dyn LlmProvider>,
    system_prompt: String,
    summary_prompt: Option<String>,
    extractor: Arc<dyn SolutionExtractor>,
    summarizer: Arc<dyn ContextSummarizer>,
}

impl Judge {
    pub fn new(config: AgentConfig, provider: Arc<dyn LlmProvider>) -> Self {
        let summarizer = Arc::new(LlmSummarizer::new(provider.clone(), config.model.clone()));
        Self {
            config,
            provider,
            system_prompt: DEFAULT_JUDGE_SYSTEM_PROMPT.to_string(),
            summary_prompt: None,
            extractor: Arc::new(PlaceholderExtractor),
            summarizer,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_summary_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.summary_prompt = Some(prompt.into());
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn SolutionExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn ContextSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Summarization is opt-in for the judge via its config.
    fn summarization(&self) -> SummarizationConfig {
        self.config
            .summarization
            .clone()
            .unwrap_or_else(SummarizationConfig::disabled)
    }

    async fn transcript(&self, rounds: &[DebateRound]) -> Result<String, AgentError> {
        let transcript = full_history(rounds);
        let policy = self.summarization();
        let size = context_size(&transcript);
        if !should_summarize(&policy, size) {
            return Ok(transcript);
        }

        debug!(judge_id = %self.config.id, size, threshold = policy.threshold, "summarizing transcript");
        let system_prompt = self.summary_prompt.as_deref().unwrap_or(&self.system_prompt);
        let summary_prompt = format!(
            "Summarize this debate transcript for final synthesis. Preserve every distinct \
             proposal, the strongest critiques, and how each was resolved. Stay under {} characters.\n\n{}",
            policy.max_length, transcript
        );
        let result = self
            .summarizer
            .summarize(&transcript, "judge", &policy, system_prompt, &summary_prompt)
            .instrument(otel::summarize_span(&self.config.id, size))
            .await?;
        Ok(truncate_chars(&result.summary, policy.max_length))
    }

    /// Synthesize a solution from the transcript. Calls the provider once
    /// (plus one summarization call when the transcript is over threshold).
    pub async fn synthesize(
        &self,
        problem: &str,
        rounds: &[DebateRound],
        context: Option<&str>,
    ) -> Result<Solution, AgentError> {
        let span = otel::synthesis_span(&self.config.id, rounds.len());
        async {
            let started = Instant::now();
            let transcript = self.transcript(rounds).await?;
            let prompt = build_synthesis_prompt(problem, context, &transcript);
            let request = CompletionRequest::simple(
                self.config.model.clone(),
                JUDGE_TEMPERATURE,
                self.system_prompt.clone(),
                prompt,
            );
            let response = self.provider.complete(request).await?;

            let description = response.text.trim().to_string();
            let fields = self.extractor.extract(&description);
            otel::record_synthesis_result(
                &tracing::Span::current(),
                started.elapsed().as_millis() as u64,
                response.usage.and_then(|u| u.total()).unwrap_or(0),
            );
            Ok(Solution {
                description,
                tradeoffs: fields.tradeoffs,
                recommendations: fields.recommendations,
                confidence: fields.confidence.min(100),
                synthesized_by: self.config.id.clone(),
            })
        }
        .instrument(span)
        .await
    }
}

/// Synthesis prompt: problem, optional context, labeled transcript, task.
pub fn build_synthesis_prompt(problem: &str, context: Option<&str>, transcript: &str) -> String {
    let mut prompt = format!("## Problem\n{}\n\n", problem.trim());
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("## Context\n{}\n\n", context.trim()));
    }
    if transcript.is_empty() {
        prompt.push_str("## Debate transcript\n(no contributions were recorded)\n\n");
    } else {
        prompt.push_str(&format!("## Debate transcript\n{}\n\n", transcript));
    }
    prompt.push_str(
        "## Task\nSynthesize the single best solution from this debate. State the solution, \
         the trade-offs it accepts, and concrete recommendations for implementing it.",
    );
    prompt
}
