//! Debate Orchestration: Phased Multi-Agent Rounds
//!
//! State machine for a structured debate between role-based agents, ending
//! in judge synthesis.
//!
//! # Debate Flow
//!
//! ```text
//! Pending → Running ─┬─ [clarification enabled] Clarifications
//!                    │
//!                    ├─ Round 1: Proposal → Critique → Refinement → persist
//!                    ├─ ...
//!                    ├─ Round N: Proposal → Critique → Refinement → persist
//!                    │
//!                    └─ Synthesis (judge) → persist → Completed
//!
//! config / sink / judge error at any point → Failed
//! agent error or timeout → recorded in PhaseReport, run continues
//! ```

pub mod clarification;
pub mod config;
pub mod orchestrator;
pub mod persistence;
pub mod state;

pub use clarification::{ClarificationResponder, ClarificationWarning, SKIPPED_ANSWER};
pub use config::{
    AgentConfig, ClarificationConfig, DebateConfig, SummarizationConfig, SummarizationMethod,
    SynthesisMethod, TerminationCondition,
};
pub use orchestrator::{
    AgentFailure, DebateMetadata, DebateOrchestrator, DebateResult, Phase, PhaseCallback,
    PhaseReport,
};
pub use persistence::{InMemoryStateSink, JsonFileStateSink, PersistenceError, StateSink};
pub use state::{
    AgentClarifications, AgentPromptMetadata, ClarificationItem, Contribution,
    ContributionMetadata, ContributionType, DebateRound, DebateState, DebateStatus,
    JudgePromptMetadata, PromptSourceKind, PromptSources, Solution, TransitionError,
};
