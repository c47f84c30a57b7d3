//! Debate record: status machine, rounds, contributions, and the final solution.
//!
//! [`DebateState`] is the authoritative, persisted record of one run. Field
//! names are serialized in camelCase and are stable across versions because
//! downstream tooling (evaluators, report generators) reads them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summarizer::SummaryMetadata;
use crate::tools::{ToolCall, ToolResult};

/// Lifecycle status of a debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
    /// Created, no phase has run yet.
    Pending,
    /// Clarifications or rounds in progress.
    Running,
    /// Judge produced a solution.
    Completed,
    /// Aborted by a configuration, persistence, or synthesis error.
    Failed,
}

impl DebateStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Valid transitions from this status. Never backward.
    pub fn valid_transitions(self) -> &'static [DebateStatus] {
        match self {
            Self::Pending => &[Self::Running, Self::Failed],
            Self::Running => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }
}

impl std::fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Phase of a round; also the type tag of a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionType {
    Proposal,
    Critique,
    Refinement,
}

impl ContributionType {
    /// Phases in execution order within a round.
    pub const ROUND_ORDER: [ContributionType; 3] = [Self::Proposal, Self::Critique, Self::Refinement];
}

impl std::fmt::Display for ContributionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proposal => write!(f, "proposal"),
            Self::Critique => write!(f, "critique"),
            Self::Refinement => write!(f, "refinement"),
        }
    }
}

/// Per-contribution accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    pub latency_ms: u64,
    pub model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolResult>,
    /// Tool-loop iterations used to produce this contribution.
    #[serde(default)]
    pub tool_call_iterations: u32,
    /// Present when the prompt used a summary instead of raw history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarization: Option<SummaryMetadata>,
}

/// A single agent output within a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub agent_id: String,
    pub agent_role: String,
    #[serde(rename = "type")]
    pub contribution_type: ContributionType,
    pub content: String,
    /// Agent whose proposal this critique addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent_id: Option<String>,
    #[serde(default)]
    pub metadata: ContributionMetadata,
}

impl Contribution {
    pub fn new(
        agent_id: impl Into<String>,
        agent_role: impl Into<String>,
        contribution_type: ContributionType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_role: agent_role.into(),
            contribution_type,
            content: content.into(),
            target_agent_id: None,
            metadata: ContributionMetadata::default(),
        }
    }

    pub fn with_target(mut self, target_agent_id: impl Into<String>) -> Self {
        self.target_agent_id = Some(target_agent_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: ContributionMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One complete Proposal → Critique → Refinement pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateRound {
    /// 1-indexed.
    pub round_number: u32,
    pub contributions: Vec<Contribution>,
    pub timestamp: DateTime<Utc>,
}

impl DebateRound {
    pub fn new(round_number: u32, contributions: Vec<Contribution>) -> Self {
        Self {
            round_number,
            contributions,
            timestamp: Utc::now(),
        }
    }

    pub fn of_type(&self, kind: ContributionType) -> impl Iterator<Item = &Contribution> {
        self.contributions
            .iter()
            .filter(move |c| c.contribution_type == kind)
    }

    pub fn count(&self, kind: ContributionType) -> usize {
        self.of_type(kind).count()
    }

    pub fn proposal_by(&self, agent_id: &str) -> Option<&Contribution> {
        self.of_type(ContributionType::Proposal)
            .find(|c| c.agent_id == agent_id)
    }

    pub fn refinement_by(&self, agent_id: &str) -> Option<&Contribution> {
        self.of_type(ContributionType::Refinement)
            .find(|c| c.agent_id == agent_id)
    }

    /// Critiques addressed to `agent_id`.
    pub fn critiques_for<'a>(&'a self, agent_id: &'a str) -> impl Iterator<Item = &'a Contribution> {
        self.of_type(ContributionType::Critique)
            .filter(move |c| c.target_agent_id.as_deref() == Some(agent_id))
    }

    pub fn tokens_used(&self) -> Option<u64> {
        self.contributions
            .iter()
            .filter_map(|c| c.metadata.tokens_used)
            .fold(None, |acc, t| Some(acc.unwrap_or(0) + t))
    }
}

/// Token usage summed across `rounds`; `None` when no contribution reported any.
pub fn total_tokens(rounds: &[DebateRound]) -> Option<u64> {
    rounds
        .iter()
        .filter_map(DebateRound::tokens_used)
        .fold(None, |acc, t| Some(acc.unwrap_or(0) + t))
}

/// Judge output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub description: String,
    #[serde(default)]
    pub tradeoffs: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// 0–100.
    pub confidence: u8,
    pub synthesized_by: String,
}

/// One answered (or skipped) clarifying question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationItem {
    /// Stable per-agent identifier, `q1`, `q2`, ...
    pub id: String,
    pub question: String,
    /// Trimmed operator answer, or `"NA"` when skipped.
    pub answer: String,
}

/// Questions asked by one agent, with answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentClarifications {
    pub agent_id: String,
    pub role: String,
    pub items: Vec<ClarificationItem>,
}

/// Where a prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSourceKind {
    Builtin,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPromptMetadata {
    pub agent_id: String,
    pub role: String,
    pub source: PromptSourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgePromptMetadata {
    pub id: String,
    pub source: PromptSourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_source: Option<PromptSourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_path: Option<String>,
}

/// Provenance of the system prompts used in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSources {
    pub agents: Vec<AgentPromptMetadata>,
    pub judge: JudgePromptMetadata,
}

/// Error for invalid state mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Status change not permitted by the transition table.
    InvalidStatus { from: DebateStatus, to: DebateStatus },
    /// Appended round number does not follow the last one.
    RoundOutOfOrder { expected: u32, found: u32 },
    /// Mutation attempted on a debate that has already finished.
    AlreadyTerminal(DebateStatus),
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus { from, to } => {
                write!(f, "invalid status transition {} → {}", from, to)
            }
            Self::RoundOutOfOrder { expected, found } => {
                write!(f, "round out of order: expected {}, found {}", expected, found)
            }
            Self::AlreadyTerminal(status) => write!(f, "debate already {}", status),
        }
    }
}

impl std::error::Error for TransitionError {}

/// The authoritative record of one debate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateState {
    pub id: String,
    pub problem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub status: DebateStatus,
    /// 0 until the first round is appended.
    pub current_round: u32,
    pub rounds: Vec<DebateRound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_solution: Option<Solution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifications: Option<Vec<AgentClarifications>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_sources: Option<PromptSources>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DebateState {
    pub fn new(id: impl Into<String>, problem: impl Into<String>, context: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            problem: problem.into(),
            context,
            status: DebateStatus::Pending,
            current_round: 0,
            rounds: Vec::new(),
            final_solution: None,
            clarifications: None,
            prompt_sources: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to a new status, rejecting backward or terminal-to-any moves.
    pub fn transition(&mut self, to: DebateStatus) -> Result<(), TransitionError> {
        if !self.status.valid_transitions().contains(&to) {
            return Err(TransitionError::InvalidStatus {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    /// Append the next round. Round numbers must be contiguous from 1.
    pub fn append_round(&mut self, round: DebateRound) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::AlreadyTerminal(self.status));
        }
        let expected = self.rounds.len() as u32 + 1;
        if round.round_number != expected {
            return Err(TransitionError::RoundOutOfOrder {
                expected,
                found: round.round_number,
            });
        }
        self.current_round = round.round_number;
        self.rounds.push(round);
        self.touch();
        Ok(())
    }

    pub fn set_final_solution(&mut self, solution: Solution) {
        self.final_solution = Some(solution);
        self.touch();
    }

    pub fn set_clarifications(&mut self, clarifications: Vec<AgentClarifications>) {
        self.clarifications = Some(clarifications);
        self.touch();
    }

    pub fn set_prompt_sources(&mut self, sources: PromptSources) {
        self.prompt_sources = Some(sources);
        self.touch();
    }

    /// Sum of reported token usage across all rounds, if any was reported.
    pub fn total_tokens(&self) -> Option<u64> {
        total_tokens(&self.rounds)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
