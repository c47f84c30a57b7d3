//! LLM provider contract consumed by agents, the judge, and the summarizer.
//!
//! The engine never talks to a wire protocol directly. Everything goes
//! through [`LlmProvider::complete`], which must be safe to call
//! concurrently from multiple agent tasks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::{ToolCall, ToolResult, ToolSchema};

/// Errors raised by a provider call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("missing API key: {0}")]
    MissingApiKey(String),
}

/// Author of a message in the accumulated conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

/// One message in the conversation sent to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// Tool invocations requested by the assistant in this message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on `Tool` messages: the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Feed a tool result back to the model.
    pub fn tool(result: &ToolResult) -> Self {
        Self {
            role: MessageRole::Tool,
            content: result.content.clone(),
            tool_calls: Vec::new(),
            tool_call_id: Some(result.tool_call_id.clone()),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    /// Tool schemas offered to the model. Empty means no tool calling.
    #[serde(default)]
    pub tools: Vec<ToolSchema>,
}

impl CompletionRequest {
    /// Build a plain single-turn request with no tools.
    pub fn simple(
        model: impl Into<String>,
        temperature: f32,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            temperature,
            system_prompt: system_prompt.into(),
            messages: vec![ChatMessage::user(user_prompt)],
            tools: Vec::new(),
        }
    }

    /// The first user message, which carries the phase prompt.
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    /// Total tokens, falling back to input + output when no total was reported.
    pub fn total(&self) -> Option<u64> {
        self.total_tokens.or_else(|| match (self.input_tokens, self.output_tokens) {
            (None, None) => None,
            (i, o) => Some(i.unwrap_or(0) + o.unwrap_or(0)),
        })
    }
}

/// Provider response: text plus any tool invocations the model requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Text-only response with no usage information.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, total_tokens: u64) -> Self {
        self.usage = Some(TokenUsage {
            total_tokens: Some(total_tokens),
            ..Default::default()
        });
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Capability to complete a prompt.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier for logs.
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
