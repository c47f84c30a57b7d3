//! Deterministic test doubles for providers, summarizers, and responders.
//!
//! Used by this crate's tests and by downstream crates that exercise the
//! orchestrator without network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::debate::clarification::ClarificationResponder;
use crate::debate::config::SummarizationConfig;
use crate::llm::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
use crate::summarizer::{ContextSummarizer, SummarizationError, SummarizationResult, SummaryMetadata};

/// Replays a fixed list of responses, then repeats the last one.
///
/// Records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
    last: Mutex<Option<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(texts: Vec<String>) -> Self {
        Self::from_responses(texts.into_iter().map(CompletionResponse::text).collect())
    }

    pub fn from_responses(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let next = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        let mut last = self
            .last
            .lock()
            .map_err(|_| LlmError::Request("scripted provider poisoned".to_string()))?;
        match next {
            Some(response) => {
                *last = Some(response.clone());
                Ok(response)
            }
            None => Ok(last.clone().unwrap_or_default()),
        }
    }
}

type ResponseFn = dyn Fn(&CompletionRequest) -> Result<CompletionResponse, LlmError> + Send + Sync;

/// Computes each response from the request.
pub struct FnProvider {
    respond: Box<ResponseFn>,
    calls: AtomicUsize,
}

impl FnProvider {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<CompletionResponse, LlmError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FnProvider {
    fn name(&self) -> &str {
        "fn"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(&request)
    }
}

/// Always fails with [`LlmError::Request`].
#[derive(Debug)]
pub struct FailingProvider {
    message: String,
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::Request(self.message.clone()))
    }
}

/// Sleeps before answering with a fixed text.
#[derive(Debug)]
pub struct SlowProvider {
    delay: Duration,
    text: String,
}

impl SlowProvider {
    pub fn new(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tokio::time::sleep(self.delay).await;
        Ok(CompletionResponse::text(self.text.clone()))
    }
}

/// Returns a fixed summary (untruncated) and counts invocations.
#[derive(Debug)]
pub struct CountingSummarizer {
    summary: Option<String>,
    calls: AtomicUsize,
}

impl CountingSummarizer {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A summarizer whose every call fails.
    pub fn failing() -> Self {
        Self {
            summary: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextSummarizer for CountingSummarizer {
    async fn summarize(
        &self,
        content: &str,
        _role: &str,
        config: &SummarizationConfig,
        _system_prompt: &str,
        _summary_prompt: &str,
    ) -> Result<SummarizationResult, SummarizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let summary = self.summary.clone().ok_or(SummarizationError::EmptySummary)?;
        Ok(SummarizationResult {
            metadata: SummaryMetadata {
                before_chars: content.chars().count(),
                after_chars: summary.chars().count(),
                method: config.method,
                timestamp: Utc::now(),
                latency_ms: 0,
                tokens_used: None,
            },
            summary,
        })
    }
}

/// Answers questions from a fixed list in order; empty once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedResponder {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<(String, String)>>,
}

impl ScriptedResponder {
    pub fn new(answers: Vec<String>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// `(agent_id, question)` pairs in the order they were asked.
    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ClarificationResponder for ScriptedResponder {
    async fn answer(&self, agent_id: &str, _role: &str, question: &str) -> String {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push((agent_id.to_string(), question.to_string()));
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .unwrap_or_default()
    }
}
