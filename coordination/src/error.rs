//! Errors raised at the orchestrator boundary.
//!
//! Configuration problems, state sink failures and a failed judge synthesis
//! abort a run. Agent-level failures are recorded in run metadata instead
//! (see [`crate::debate::orchestrator::AgentFailure`]).

use thiserror::Error;

use crate::agent::AgentError;
use crate::debate::persistence::PersistenceError;

#[derive(Debug, Error)]
pub enum DebateError {
    #[error("invalid debate configuration: {0}")]
    Config(String),

    #[error("state sink failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("judge synthesis failed: {0}")]
    Synthesis(#[source] AgentError),
}

impl DebateError {
    /// Whether the error was raised before any phase executed.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
