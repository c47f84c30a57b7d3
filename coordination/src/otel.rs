//! OpenTelemetry-Compatible Span Helpers
//!
//! Structured `tracing` span builders for the debate engine. All spans and
//! fields use dot-notation names compatible with OpenTelemetry semantic
//! conventions.
//!
//! # Span Hierarchy
//!
//! ```text
//! debate.run                  (root, one per run_debate call)
//!   ├─ debate.agent           (clarifying questions, pre-round)
//!   ├─ debate.round           (one per round)
//!   │   └─ debate.phase       (proposal | critique | refinement)
//!   │       └─ debate.agent   (one per agent task, via TracedAgent)
//!   │           ├─ debate.summarize
//!   │           └─ debate.tool
//!   └─ debate.synthesis       (judge)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use coordination::otel;
//! use tracing::Instrument;
//!
//! let span = otel::phase_span(2, "critique");
//! let settled = run_tasks().instrument(span.clone()).await;
//! otel::record_phase_result(&span, 6, 5);
//! ```

use tracing::Span;

// ── Span Name Constants ──────────────────────────────────────────────

pub const SPAN_RUN: &str = "debate.run";
pub const SPAN_ROUND: &str = "debate.round";
pub const SPAN_PHASE: &str = "debate.phase";
pub const SPAN_AGENT: &str = "debate.agent";
pub const SPAN_TOOL: &str = "debate.tool";
pub const SPAN_SUMMARIZE: &str = "debate.summarize";
pub const SPAN_SYNTHESIS: &str = "debate.synthesis";

// ── Field Name Constants ─────────────────────────────────────────────

pub const FIELD_DEBATE_ID: &str = "debate.id";
pub const FIELD_ROUND: &str = "debate.round.number";
pub const FIELD_PHASE: &str = "debate.phase.name";
pub const FIELD_AGENT_ID: &str = "debate.agent.id";
pub const FIELD_AGENT_ROLE: &str = "debate.agent.role";
pub const FIELD_MODEL: &str = "debate.model";
pub const FIELD_TOOL_NAME: &str = "debate.tool.name";
pub const FIELD_SUCCESS: &str = "debate.success";
pub const FIELD_DURATION_MS: &str = "debate.duration_ms";
pub const FIELD_TOKENS_USED: &str = "debate.tokens_used";
pub const FIELD_ATTEMPTED: &str = "debate.phase.attempted";
pub const FIELD_CONTRIBUTED: &str = "debate.phase.contributed";
pub const FIELD_BEFORE_CHARS: &str = "debate.summary.before_chars";
pub const FIELD_AFTER_CHARS: &str = "debate.summary.after_chars";

// ── Span Builders ────────────────────────────────────────────────────

/// Root span for one debate run.
///
/// `debate.id` is recorded once the sink has assigned it.
pub fn run_span(agent_count: usize, rounds: u32) -> Span {
    tracing::info_span!(
        "debate.run",
        "debate.id" = tracing::field::Empty,
        "debate.agent_count" = agent_count as u64,
        "debate.rounds" = rounds,
        "debate.success" = tracing::field::Empty,
        "debate.round.number" = tracing::field::Empty,
        "debate.duration_ms" = tracing::field::Empty,
    )
}

/// Record the final result on a run span.
pub fn record_run_result(span: &Span, success: bool, rounds_completed: u32, duration_ms: u64) {
    span.record("debate.success", success);
    span.record("debate.round.number", rounds_completed);
    span.record("debate.duration_ms", duration_ms);
}

pub fn round_span(round: u32) -> Span {
    tracing::info_span!("debate.round", "debate.round.number" = round)
}

/// Span for one phase of a round.
///
/// Fields filled later via [`record_phase_result`]: attempted/contributed counts.
pub fn phase_span(round: u32, phase: &str) -> Span {
    tracing::info_span!(
        "debate.phase",
        "debate.round.number" = round,
        "debate.phase.name" = %phase,
        "debate.phase.attempted" = tracing::field::Empty,
        "debate.phase.contributed" = tracing::field::Empty,
    )
}

pub fn record_phase_result(span: &Span, attempted: usize, contributed: usize) {
    span.record("debate.phase.attempted", attempted as u64);
    span.record("debate.phase.contributed", contributed as u64);
}

/// Span for one agent call.
///
/// Fields filled later via [`record_agent_result`]: `debate.success`, timing, tokens.
pub fn agent_span(agent_id: &str, role: &str, model: &str, phase: &str, round: u32) -> Span {
    tracing::info_span!(
        "debate.agent",
        "debate.agent.id" = %agent_id,
        "debate.agent.role" = %role,
        "debate.model" = %model,
        "debate.phase.name" = %phase,
        "debate.round.number" = round,
        "debate.success" = tracing::field::Empty,
        "debate.duration_ms" = tracing::field::Empty,
        "debate.tokens_used" = tracing::field::Empty,
    )
}

pub fn record_agent_result(span: &Span, success: bool, duration_ms: u64, tokens_used: u64) {
    span.record("debate.success", success);
    span.record("debate.duration_ms", duration_ms);
    span.record("debate.tokens_used", tokens_used);
}

/// Span for a tool call inside an agent's tool loop.
pub fn tool_span(tool_name: &str, agent_id: &str) -> Span {
    tracing::debug_span!(
        "debate.tool",
        "debate.tool.name" = %tool_name,
        "debate.agent.id" = %agent_id,
        "debate.success" = tracing::field::Empty,
        "debate.duration_ms" = tracing::field::Empty,
    )
}

pub fn record_tool_result(span: &Span, success: bool, duration_ms: u64) {
    span.record("debate.success", success);
    span.record("debate.duration_ms", duration_ms);
}

/// Span for a context summarization call.
pub fn summarize_span(agent_id: &str, before_chars: usize) -> Span {
    tracing::info_span!(
        "debate.summarize",
        "debate.agent.id" = %agent_id,
        "debate.summary.before_chars" = before_chars as u64,
        "debate.summary.after_chars" = tracing::field::Empty,
        "debate.duration_ms" = tracing::field::Empty,
    )
}

pub fn record_summarize_result(span: &Span, after_chars: usize, duration_ms: u64) {
    span.record("debate.summary.after_chars", after_chars as u64);
    span.record("debate.duration_ms", duration_ms);
}

/// Span for judge synthesis.
pub fn synthesis_span(judge_id: &str, rounds: usize) -> Span {
    tracing::info_span!(
        "debate.synthesis",
        "debate.agent.id" = %judge_id,
        "debate.rounds" = rounds as u64,
        "debate.duration_ms" = tracing::field::Empty,
        "debate.tokens_used" = tracing::field::Empty,
    )
}

pub fn record_synthesis_result(span: &Span, duration_ms: u64, tokens_used: u64) {
    span.record("debate.duration_ms", duration_ms);
    span.record("debate.tokens_used", tokens_used);
}
