//! Multi-Agent Debate Engine
//!
//! This library provides:
//! - A debate orchestrator driving role-based agents through
//!   Proposal → Critique → Refinement rounds with per-agent failure isolation
//! - A bounded tool-calling loop per agent call
//! - Threshold-triggered context summarization
//! - Judge synthesis of a single final solution from the full transcript
//! - Pluggable persistence of the debate record (in memory or JSON files)
//!
//! The engine is provider-agnostic: it talks to models only through
//! [`llm::LlmProvider`] and never reads environment state itself.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coordination::{AgentConfig, DebateConfig, DebateOrchestrator, InMemoryStateSink, Judge, RoleAgent};
//!
//! let agents: Vec<Arc<dyn coordination::Agent>> = vec![
//!     Arc::new(RoleAgent::new(AgentConfig::new("arch", "architect", "gpt-4o"), provider.clone())),
//!     Arc::new(RoleAgent::new(AgentConfig::new("sec", "security", "gpt-4o"), provider.clone())),
//! ];
//! let judge = Judge::new(AgentConfig::new("judge", "generalist", "gpt-4o"), provider);
//! let orchestrator = DebateOrchestrator::new(agents, judge, DebateConfig::default(), Arc::new(InMemoryStateSink::new()))?;
//! let result = orchestrator.run_debate("Design a rate limiter", None, None).await?;
//! println!("{}", result.solution.description);
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod agent;
pub mod debate;
pub mod error;
pub mod judge;
pub mod llm;
pub mod otel;
pub mod summarizer;
pub mod testing;
pub mod tools;

pub use agent::{Agent, AgentError, DebateContext, PreparedContext, RoleAgent, TracedAgent};
pub use debate::{
    AgentClarifications, AgentConfig, AgentFailure, AgentPromptMetadata, ClarificationConfig,
    ClarificationItem, ClarificationResponder, ClarificationWarning, Contribution, ContributionMetadata,
    ContributionType, DebateConfig, DebateMetadata, DebateOrchestrator, DebateResult, DebateRound,
    DebateState, DebateStatus, InMemoryStateSink, JsonFileStateSink, JudgePromptMetadata,
    PersistenceError, Phase, PhaseCallback, PhaseReport, PromptSourceKind, PromptSources,
    Solution, StateSink, SummarizationConfig,
};
pub use error::DebateError;
pub use judge::{Judge, PlaceholderExtractor, SolutionExtractor};
pub use llm::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
pub use summarizer::{ContextSummarizer, LlmSummarizer};
pub use tools::{ToolImplementation, ToolRegistry, ToolSchema};
