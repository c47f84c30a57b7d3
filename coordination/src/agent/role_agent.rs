//! The single [`Agent`] implementation, parameterized by role prompts.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn, Instrument};

use super::context::{agent_history, context_size, format_clarifications, full_history, should_summarize};
use super::roles::{parse_questions, prompts_for, PromptInput, RolePrompts};
use super::{Agent, AgentError, DebateContext, PreparedContext};
use crate::debate::config::AgentConfig;
use crate::debate::state::{Contribution, ContributionMetadata, ContributionType};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::otel;
use crate::summarizer::{truncate_chars, ContextSummarizer, LlmSummarizer};
use crate::tools::{
    execute_tool_call, ContextSearchTool, ToolCall, ToolRegistry, ToolResult, ToolSchema,
    CONTEXT_SEARCH_TOOL,
};

/// Outcome of one [`RoleAgent::call_llm`] run.
#[derive(Debug, Clone, Default)]
pub struct LlmOutcome {
    /// Last non-empty text the provider returned.
    pub text: String,
    pub tokens_used: Option<u64>,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    /// Provider calls made, never more than the agent's tool-call limit.
    pub iterations: u32,
}

/// A debate agent whose behavior comes from its role's prompt set.
pub struct RoleAgent {
    config: AgentConfig,
    provider: Arc<dyn LlmProvider>,
    prompts: RolePrompts,
    system_prompt: String,
    summary_prompt: Option<String>,
    instructions: Option<String>,
    tools: ToolRegistry,
    summarizer: Arc<dyn ContextSummarizer>,
}

impl RoleAgent {
    /// Build an agent using the built-in prompts for `config.role` and an
    /// LLM-backed summarizer on the same provider and model.
    pub fn new(config: AgentConfig, provider: Arc<dyn LlmProvider>) -> Self {
        let prompts = prompts_for(&config.role);
        let summarizer = Arc::new(LlmSummarizer::new(provider.clone(), config.model.clone()));
        Self {
            system_prompt: prompts.system_prompt.to_string(),
            prompts,
            config,
            provider,
            summary_prompt: None,
            instructions: None,
            tools: ToolRegistry::new(),
            summarizer,
        }
    }

    /// Replace the built-in system prompt (e.g. with a resolved prompt file).
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// System prompt for summarization calls. Defaults to the agent's own.
    pub fn with_summary_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.summary_prompt = Some(prompt.into());
        self
    }

    /// Extra instructions prepended to every phase prompt.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn ContextSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn prompts(&self) -> &RolePrompts {
        &self.prompts
    }

    /// Schemas offered to the model: exactly those listed in the config.
    fn offered_tools(&self) -> Vec<ToolSchema> {
        self.config.tools.clone().unwrap_or_default()
    }

    /// Shared registry plus tools bound to this call's debate history.
    fn registry_for(&self, ctx: &DebateContext) -> ToolRegistry {
        let mut registry = self.tools.clone();
        if self.config.tool_names().contains(&CONTEXT_SEARCH_TOOL) {
            registry.register(Arc::new(ContextSearchTool::new(ctx.history.clone())));
        }
        registry
    }

    fn run_tool(&self, registry: &ToolRegistry, call: &ToolCall) -> ToolResult {
        let span = otel::tool_span(&call.name, &self.config.id);
        let _guard = span.enter();
        let started = Instant::now();
        let result = execute_tool_call(registry, call);
        otel::record_tool_result(&span, !result.is_error(), started.elapsed().as_millis() as u64);
        if result.is_error() {
            debug!(agent_id = %self.config.id, tool = %call.name, "tool call returned error");
        } else {
            debug!(agent_id = %self.config.id, tool = %call.name, "tool call succeeded");
        }
        result
    }

    /// Drive the provider through the bounded tool-calling loop.
    ///
    /// Stops when the provider requests no tools or after
    /// `tool_call_limit` provider calls, whichever comes first. Tool
    /// failures are fed back as error results; only provider failures
    /// propagate.
    pub async fn call_llm(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        ctx: &DebateContext,
    ) -> Result<LlmOutcome, AgentError> {
        let limit = self.config.tool_call_limit();
        let tools = self.offered_tools();
        let registry = self.registry_for(ctx);
        let mut messages = vec![ChatMessage::user(user_prompt)];
        let mut outcome = LlmOutcome::default();

        loop {
            let request = CompletionRequest {
                model: self.config.model.clone(),
                temperature: self.config.temperature,
                system_prompt: system_prompt.to_string(),
                messages: messages.clone(),
                tools: tools.clone(),
            };
            let response = self.provider.complete(request).await?;
            outcome.iterations += 1;

            if let Some(tokens) = response.usage.and_then(|u| u.total()) {
                outcome.tokens_used = Some(outcome.tokens_used.unwrap_or(0) + tokens);
            }
            if !response.text.trim().is_empty() {
                outcome.text = response.text.clone();
            }
            if !response.has_tool_calls() {
                break;
            }
            if outcome.iterations >= limit {
                warn!(
                    agent_id = %self.config.id,
                    limit,
                    "tool call limit reached, returning last response"
                );
                break;
            }

            messages.push(ChatMessage::assistant(response.text, response.tool_calls.clone()));
            for call in &response.tool_calls {
                let result = self.run_tool(&registry, call);
                messages.push(ChatMessage::tool(&result));
                outcome.tool_results.push(result);
            }
            outcome.tool_calls.extend(response.tool_calls);
        }

        Ok(outcome)
    }

    fn prompt_input<'a>(&'a self, ctx: &'a DebateContext, history: &'a str, clarifications: &'a str) -> PromptInput<'a> {
        PromptInput {
            problem: &ctx.problem,
            context: ctx.context.as_deref(),
            history,
            clarifications,
            focus: self.prompts.focus,
            instructions: self.instructions.as_deref(),
        }
    }

    async fn contribute<F>(
        &self,
        kind: ContributionType,
        ctx: &DebateContext,
        build: F,
    ) -> Result<Contribution, AgentError>
    where
        F: FnOnce(&PromptInput<'_>) -> String + Send,
    {
        let started = Instant::now();
        let prepared = self.prepare_context(ctx).await?;
        let clarifications = format_clarifications(&ctx.clarifications);
        let user_prompt = build(&self.prompt_input(ctx, &prepared.history_text, &clarifications));

        let outcome = self.call_llm(&self.system_prompt, &user_prompt, ctx).await?;
        let metadata = ContributionMetadata {
            tokens_used: outcome.tokens_used,
            latency_ms: started.elapsed().as_millis() as u64,
            model: self.config.model.clone(),
            tool_calls: outcome.tool_calls,
            tool_results: outcome.tool_results,
            tool_call_iterations: outcome.iterations,
            summarization: prepared.summarization,
        };
        Ok(Contribution::new(&self.config.id, &self.config.role, kind, outcome.text)
            .with_metadata(metadata))
    }
}

#[async_trait]
impl Agent for RoleAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn prepare_context(&self, ctx: &DebateContext) -> Result<PreparedContext, AgentError> {
        let history = if ctx.include_full_history {
            full_history(&ctx.history)
        } else {
            agent_history(&ctx.history, &self.config.id)
        };

        let policy = self.config.effective_summarization(&ctx.summarization);
        let size = context_size(&history);
        if !should_summarize(policy, size) {
            return Ok(PreparedContext::raw(history));
        }

        debug!(agent_id = %self.config.id, size, threshold = policy.threshold, "summarizing context");
        let span = otel::summarize_span(&self.config.id, size);
        let system_prompt = self.summary_prompt.as_deref().unwrap_or(&self.system_prompt);
        let summary_prompt = (self.prompts.summarize)(&self.config.role, &history, policy.max_length);
        let mut result = self
            .summarizer
            .summarize(&history, &self.config.role, policy, system_prompt, &summary_prompt)
            .instrument(span.clone())
            .await?;

        result.summary = truncate_chars(&result.summary, policy.max_length);
        result.metadata.after_chars = context_size(&result.summary);
        otel::record_summarize_result(&span, result.metadata.after_chars, result.metadata.latency_ms);

        Ok(PreparedContext {
            history_text: result.summary,
            summarization: Some(result.metadata),
        })
    }

    async fn propose(&self, problem: &str, ctx: &DebateContext) -> Result<Contribution, AgentError> {
        let build = self.prompts.propose;
        self.contribute(ContributionType::Proposal, ctx, |input| {
            build(&PromptInput { problem, ..*input })
        })
        .await
    }

    async fn critique(
        &self,
        proposal: &Contribution,
        ctx: &DebateContext,
    ) -> Result<Contribution, AgentError> {
        let build = self.prompts.critique;
        let contribution = self
            .contribute(ContributionType::Critique, ctx, |input| build(input, proposal))
            .await?;
        Ok(contribution.with_target(&proposal.agent_id))
    }

    async fn refine(
        &self,
        original: &Contribution,
        critiques: &[Contribution],
        ctx: &DebateContext,
    ) -> Result<Contribution, AgentError> {
        let build = self.prompts.refine;
        self.contribute(ContributionType::Refinement, ctx, |input| {
            build(input, original, critiques)
        })
        .await
    }

    async fn ask_clarifying_questions(
        &self,
        problem: &str,
        ctx: &DebateContext,
    ) -> Result<Vec<String>, AgentError> {
        let input = PromptInput {
            problem,
            ..self.prompt_input(ctx, "", "")
        };
        let user_prompt = (self.prompts.clarify)(&input);
        let outcome = self.call_llm(&self.system_prompt, &user_prompt, ctx).await?;
        Ok(parse_questions(&outcome.text))
    }
}
