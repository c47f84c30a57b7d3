//! Debate participants.
//!
//! Roles are data, not types: a single [`RoleAgent`] is parameterized by a
//! [`RolePrompts`] entry looked up by role key. Observability is layered on
//! with the [`TracedAgent`] decorator rather than baked into the agent.
//!
//! # Phase Calls
//!
//! ```text
//! propose / critique / refine / ask_clarifying_questions
//!   └─ prepare_context()      raw history or summary (threshold-triggered)
//!   └─ RolePrompts builder    phase-specific user prompt
//!   └─ call_llm()             bounded tool loop against the provider
//!        → Contribution
//! ```

pub mod context;
pub mod role_agent;
pub mod roles;
pub mod traced;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::debate::config::{AgentConfig, SummarizationConfig};
use crate::debate::state::{AgentClarifications, Contribution, DebateRound};
use crate::llm::LlmError;
use crate::summarizer::{SummarizationError, SummaryMetadata};

pub use role_agent::RoleAgent;
pub use roles::{RolePrompts, BUILTIN_ROLES};
pub use traced::TracedAgent;

/// Failure of a single agent call. Recorded, never raised past a phase.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("provider call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("context summarization failed: {0}")]
    Summarization(#[from] SummarizationError),

    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("agent task panicked: {0}")]
    Panicked(String),
}

impl AgentError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Read-only view of the debate handed to an agent for one round.
#[derive(Debug, Clone)]
pub struct DebateContext {
    pub problem: String,
    /// Free-text context supplied with the problem.
    pub context: Option<String>,
    /// Rounds completed before the current one.
    pub history: Arc<[DebateRound]>,
    pub include_full_history: bool,
    pub clarifications: Arc<[AgentClarifications]>,
    /// Round being executed, 1-indexed.
    pub round_number: u32,
    /// Debate-level policy; agents may override it in their config.
    pub summarization: SummarizationConfig,
}

impl DebateContext {
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            context: None,
            history: Arc::from(Vec::new()),
            include_full_history: false,
            clarifications: Arc::from(Vec::new()),
            round_number: 1,
            summarization: SummarizationConfig::default(),
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_history(mut self, history: Vec<DebateRound>) -> Self {
        self.round_number = history.len() as u32 + 1;
        self.history = Arc::from(history);
        self
    }

    pub fn with_clarifications(mut self, clarifications: Vec<AgentClarifications>) -> Self {
        self.clarifications = Arc::from(clarifications);
        self
    }

    pub fn with_full_history(mut self, include: bool) -> Self {
        self.include_full_history = include;
        self
    }

    pub fn with_summarization(mut self, config: SummarizationConfig) -> Self {
        self.summarization = config;
        self
    }
}

/// History text ready to embed in a prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedContext {
    /// Raw history or its summary. Empty before the first round completes.
    pub history_text: String,
    /// Set when `history_text` is a summary.
    pub summarization: Option<SummaryMetadata>,
}

impl PreparedContext {
    pub fn raw(history_text: String) -> Self {
        Self {
            history_text,
            summarization: None,
        }
    }

    pub fn is_summarized(&self) -> bool {
        self.summarization.is_some()
    }
}

/// A debate participant.
#[async_trait]
pub trait Agent: Send + Sync {
    fn config(&self) -> &AgentConfig;

    fn id(&self) -> &str {
        &self.config().id
    }

    fn role(&self) -> &str {
        &self.config().role
    }

    /// Build the history fragment for this agent, summarizing when it is
    /// over the configured threshold.
    async fn prepare_context(&self, ctx: &DebateContext) -> Result<PreparedContext, AgentError>;

    async fn propose(&self, problem: &str, ctx: &DebateContext) -> Result<Contribution, AgentError>;

    /// Critique another agent's proposal. The result targets `proposal.agent_id`.
    async fn critique(
        &self,
        proposal: &Contribution,
        ctx: &DebateContext,
    ) -> Result<Contribution, AgentError>;

    /// Revise this agent's own proposal given the critiques addressed to it.
    async fn refine(
        &self,
        original: &Contribution,
        critiques: &[Contribution],
        ctx: &DebateContext,
    ) -> Result<Contribution, AgentError>;

    async fn ask_clarifying_questions(
        &self,
        problem: &str,
        ctx: &DebateContext,
    ) -> Result<Vec<String>, AgentError>;
}
