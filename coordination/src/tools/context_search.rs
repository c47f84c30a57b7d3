//! Built-in `context_search` tool: keyword lookup over the debate transcript.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ToolError, ToolImplementation, ToolSchema};
use crate::debate::state::DebateRound;
use crate::summarizer::truncate_chars;

pub const CONTEXT_SEARCH_TOOL: &str = "context_search";

/// Characters of contribution content returned per match.
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContextSearchArgs {
    /// Case-insensitive term to look for in earlier contributions.
    pub term: String,
}

/// Searches the rounds completed so far in the current debate.
pub struct ContextSearchTool {
    history: Arc<[DebateRound]>,
}

impl ContextSearchTool {
    pub fn new(history: Arc<[DebateRound]>) -> Self {
        Self { history }
    }

    pub fn schema_static() -> ToolSchema {
        ToolSchema::for_args::<ContextSearchArgs>(
            CONTEXT_SEARCH_TOOL,
            "Search previous debate rounds for contributions mentioning a term. \
             Returns the round, author, phase, and a snippet for each match.",
        )
    }

    fn search(&self, term: &str) -> Vec<Value> {
        let needle = term.to_lowercase();
        self.history
            .iter()
            .flat_map(|round| {
                round.contributions.iter().map(move |c| (round.round_number, c))
            })
            .filter(|(_, c)| c.content.to_lowercase().contains(&needle))
            .map(|(round_number, c)| {
                json!({
                    "roundNumber": round_number,
                    "agentId": c.agent_id,
                    "agentRole": c.agent_role,
                    "type": c.contribution_type.to_string(),
                    "contentSnippet": truncate_chars(&c.content, SNIPPET_CHARS),
                })
            })
            .collect()
    }
}

impl ToolImplementation for ContextSearchTool {
    fn schema(&self) -> ToolSchema {
        Self::schema_static()
    }

    fn invoke(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: ContextSearchArgs = serde_json::from_value(arguments.clone())
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        if args.term.trim().is_empty() {
            return Err(ToolError::InvalidArguments("term must not be empty".to_string()));
        }
        Ok(json!({ "matches": self.search(args.term.trim()) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::state::{Contribution, ContributionType};

    fn history() -> Arc<[DebateRound]> {
        let round = DebateRound::new(
            1,
            vec![
                Contribution::new("a1", "architect", ContributionType::Proposal, "Use a message queue"),
                Contribution::new("a2", "security", ContributionType::Proposal, "Encrypt at rest"),
            ],
        );
        Arc::from(vec![round])
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let tool = ContextSearchTool::new(history());
        let out = tool.invoke(&json!({ "term": "QUEUE" })).unwrap();
        let matches = out["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["agentId"], "a1");
        assert_eq!(matches[0]["type"], "proposal");
        assert_eq!(matches[0]["roundNumber"], 1);
    }

    #[test]
    fn test_no_matches() {
        let tool = ContextSearchTool::new(history());
        let out = tool.invoke(&json!({ "term": "kubernetes" })).unwrap();
        assert!(out["matches"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_missing_term_is_invalid() {
        let tool = ContextSearchTool::new(history());
        assert!(matches!(
            tool.invoke(&json!({})),
            Err(ToolError::InvalidArguments(_))
        ));
        assert!(matches!(
            tool.invoke(&json!({ "term": "  " })),
            Err(ToolError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_schema_has_term_property() {
        let schema = ContextSearchTool::schema_static();
        assert_eq!(schema.name, CONTEXT_SEARCH_TOOL);
        assert!(schema.parameters["properties"]["term"].is_object());
    }
}
