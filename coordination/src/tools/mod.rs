//! Tool registry, schemas, and invocation records for the agent tool loop.
//!
//! Tools are synchronous from the agent's point of view: the loop hands a
//! JSON argument object to [`ToolImplementation::invoke`] and gets a JSON
//! value back. Every outcome, including unknown tools, bad arguments, and
//! panics, is converted into a structured [`ToolResult`] so a tool problem
//! never escapes the loop.
//!
//! ```text
//! ToolCall { id, name, arguments }
//!   ├─ registry.get(name) = None   → ToolResult::error("Tool not found: name")
//!   ├─ arguments not JSON          → ToolResult::error("invalid arguments: ...")
//!   ├─ invoke() → Err / panic      → ToolResult::error(...)
//!   └─ invoke() → Ok(value)        → ToolResult::success(value)
//! ```

pub mod context_search;

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub use context_search::{ContextSearchArgs, ContextSearchTool, CONTEXT_SEARCH_TOOL};

/// Errors a tool implementation may report.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("execution failed: {0}")]
    Execution(String),
}

/// JSON-schema description of a tool offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object.
    #[serde(default = "empty_object_schema")]
    pub parameters: Value,
}

fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

impl ToolSchema {
    /// Derive the parameter schema from an argument type.
    pub fn for_args<T: JsonSchema>(name: &str, description: &str) -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: serde_json::to_value(schema).unwrap_or_else(|_| empty_object_schema()),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Outcome of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
}

/// JSON-encoded result of one tool call, fed back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub status: ToolResultStatus,
    /// JSON text: `{"status":"success","result":...}` or `{"status":"error","error":"..."}`.
    pub content: String,
}

impl ToolResult {
    pub fn success(call: &ToolCall, result: Value) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            status: ToolResultStatus::Success,
            content: json!({ "status": "success", "result": result }).to_string(),
        }
    }

    pub fn error(call: &ToolCall, message: &str) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            status: ToolResultStatus::Error,
            content: json!({ "status": "error", "error": message }).to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolResultStatus::Error
    }
}

/// A callable tool.
pub trait ToolImplementation: Send + Sync {
    fn schema(&self) -> ToolSchema;

    /// Run the tool against a parsed argument object.
    fn invoke(&self, arguments: &Value) -> Result<Value, ToolError>;
}

/// Name-keyed set of tools. Cloning is cheap; implementations are shared.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn ToolImplementation>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its schema name, replacing any previous entry.
    pub fn register(&mut self, tool: Arc<dyn ToolImplementation>) -> Option<Arc<dyn ToolImplementation>> {
        let name = tool.schema().name;
        self.tools.insert(name, tool)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolImplementation>> {
        self.tools.get(name).cloned()
    }

    /// Schemas for every registered tool, ordered by name.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Execute one requested call against the registry.
///
/// Never fails: every problem becomes an error-status [`ToolResult`].
pub fn execute_tool_call(registry: &ToolRegistry, call: &ToolCall) -> ToolResult {
    let Some(tool) = registry.get(&call.name) else {
        return ToolResult::error(call, &ToolError::NotFound(call.name.clone()).to_string());
    };

    let arguments: Value = if call.arguments.trim().is_empty() {
        json!({})
    } else {
        match serde_json::from_str(&call.arguments) {
            Ok(v) => v,
            Err(e) => {
                return ToolResult::error(call, &ToolError::InvalidArguments(e.to_string()).to_string())
            }
        }
    };

    match catch_unwind(AssertUnwindSafe(|| tool.invoke(&arguments))) {
        Ok(Ok(value)) => ToolResult::success(call, value),
        Ok(Err(e)) => ToolResult::error(call, &e.to_string()),
        Err(_) => ToolResult::error(
            call,
            &ToolError::Execution(format!("tool `{}` panicked", call.name)).to_string(),
        ),
    }
}
