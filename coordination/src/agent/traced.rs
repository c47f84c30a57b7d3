//! Span-per-call decorator for any [`Agent`].

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;

use super::{Agent, AgentError, DebateContext, PreparedContext};
use crate::debate::config::AgentConfig;
use crate::debate::state::Contribution;
use crate::otel;

/// Wraps an agent and opens a `debate.agent` span around every phase call.
pub struct TracedAgent {
    inner: Arc<dyn Agent>,
}

impl TracedAgent {
    pub fn new(inner: Arc<dyn Agent>) -> Self {
        Self { inner }
    }

    async fn traced<T, F>(
        &self,
        phase: &str,
        round: u32,
        tokens: impl Fn(&T) -> u64 + Send,
        call: F,
    ) -> Result<T, AgentError>
    where
        T: Send,
        F: std::future::Future<Output = Result<T, AgentError>> + Send,
    {
        let cfg = self.inner.config();
        let span = otel::agent_span(&cfg.id, &cfg.role, &cfg.model, phase, round);
        let started = Instant::now();
        let result = call.instrument(span.clone()).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(value) => otel::record_agent_result(&span, true, duration_ms, tokens(value)),
            Err(e) => {
                otel::record_agent_result(&span, false, duration_ms, 0);
                tracing::debug!(parent: &span, agent_id = %cfg.id, phase, error = %e, "agent call failed");
            }
        }
        result
    }
}

fn contribution_tokens(c: &Contribution) -> u64 {
    c.metadata.tokens_used.unwrap_or(0)
}

#[async_trait]
impl Agent for TracedAgent {
    fn config(&self) -> &AgentConfig {
        self.inner.config()
    }

    async fn prepare_context(&self, ctx: &DebateContext) -> Result<PreparedContext, AgentError> {
        self.inner.prepare_context(ctx).await
    }

    async fn propose(&self, problem: &str, ctx: &DebateContext) -> Result<Contribution, AgentError> {
        self.traced(
            "proposal",
            ctx.round_number,
            contribution_tokens,
            self.inner.propose(problem, ctx),
        )
        .await
    }

    async fn critique(
        &self,
        proposal: &Contribution,
        ctx: &DebateContext,
    ) -> Result<Contribution, AgentError> {
        self.traced(
            "critique",
            ctx.round_number,
            contribution_tokens,
            self.inner.critique(proposal, ctx),
        )
        .await
    }

    async fn refine(
        &self,
        original: &Contribution,
        critiques: &[Contribution],
        ctx: &DebateContext,
    ) -> Result<Contribution, AgentError> {
        self.traced(
            "refinement",
            ctx.round_number,
            contribution_tokens,
            self.inner.refine(original, critiques, ctx),
        )
        .await
    }

    async fn ask_clarifying_questions(
        &self,
        problem: &str,
        ctx: &DebateContext,
    ) -> Result<Vec<String>, AgentError> {
        self.traced(
            "clarification",
            0,
            |_: &Vec<String>| 0,
            self.inner.ask_clarifying_questions(problem, ctx),
        )
        .await
    }
}
