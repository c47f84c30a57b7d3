//! Run parameters and participant descriptions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tools::ToolSchema;

/// Default tool-loop iteration cap per agent call.
pub const DEFAULT_TOOL_CALL_LIMIT: u32 = 10;

/// When to stop running rounds.
///
/// Only `Fixed` is acted on; the threshold variants are accepted and run the
/// configured round count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminationCondition {
    #[default]
    Fixed,
    Convergence { threshold: f64 },
    Quality { threshold: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMethod {
    #[default]
    Judge,
    Voting,
    Merge,
}

impl std::fmt::Display for SynthesisMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Judge => write!(f, "judge"),
            Self::Voting => write!(f, "voting"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SummarizationMethod {
    #[default]
    #[serde(rename = "length-based")]
    LengthBased,
}

/// Threshold-triggered summarization policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    pub enabled: bool,
    /// History size, in characters, above which a summary is used instead.
    pub threshold: usize,
    /// Maximum summary length in characters.
    pub max_length: usize,
    pub method: SummarizationMethod,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 5000,
            max_length: 2500,
            method: SummarizationMethod::LengthBased,
        }
    }
}

impl SummarizationConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// An enabled policy must leave room for a summary.
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.max_length == 0 {
            return Err("summarization.max_length must be > 0".to_string());
        }
        Ok(())
    }
}

/// Pre-round clarifying-question phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClarificationConfig {
    pub enabled: bool,
    pub max_per_agent: usize,
}

impl Default for ClarificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_per_agent: 5,
        }
    }
}

/// Parameters for one debate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    pub rounds: u32,
    pub termination_condition: TerminationCondition,
    pub synthesis_method: SynthesisMethod,
    /// Pass the full transcript to agents instead of their own perspective.
    pub include_full_history: bool,
    /// Upper bound for each agent task within a phase.
    pub timeout_per_round_ms: u64,
    pub summarization: SummarizationConfig,
    pub clarification: ClarificationConfig,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            termination_condition: TerminationCondition::Fixed,
            synthesis_method: SynthesisMethod::Judge,
            include_full_history: false,
            timeout_per_round_ms: 300_000,
            summarization: SummarizationConfig::default(),
            clarification: ClarificationConfig::default(),
        }
    }
}

impl DebateConfig {
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn timeout_per_round(&self) -> Duration {
        Duration::from_millis(self.timeout_per_round_ms)
    }

    /// Check run parameters. Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.rounds < 1 {
            return Err(format!("rounds must be >= 1 (got {})", self.rounds));
        }
        if self.timeout_per_round_ms == 0 {
            return Err("timeout_per_round_ms must be > 0".to_string());
        }
        if self.synthesis_method != SynthesisMethod::Judge {
            return Err(format!(
                "synthesis method `{}` is not supported; use `judge`",
                self.synthesis_method
            ));
        }
        self.summarization.validate()
    }
}

/// Static description of one debate participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    /// Role key into the prompt registry (`architect`, `security`, ...).
    pub role: String,
    pub model: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_prompt_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_limit: Option<u32>,
    /// Overrides the debate-level policy for this agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarization: Option<SummarizationConfig>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_enabled() -> bool {
    true
}

impl AgentConfig {
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            role: role.into(),
            model: model.into(),
            provider: default_provider(),
            temperature: default_temperature(),
            system_prompt_path: None,
            user_prompt_path: None,
            summary_prompt_path: None,
            tools: None,
            tool_call_limit: None,
            summarization: None,
            enabled: true,
        }
    }

    /// Iteration cap for the tool loop, never below 1.
    pub fn tool_call_limit(&self) -> u32 {
        self.tool_call_limit.unwrap_or(DEFAULT_TOOL_CALL_LIMIT).max(1)
    }

    /// Per-agent override if set, else the debate-level policy.
    pub fn effective_summarization<'a>(
        &'a self,
        debate_level: &'a SummarizationConfig,
    ) -> &'a SummarizationConfig {
        self.summarization.as_ref().unwrap_or(debate_level)
    }

    /// Check the per-agent overrides.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(summarization) = &self.summarization {
            summarization
                .validate()
                .map_err(|e| format!("agent `{}`: {}", self.id, e))?;
        }
        Ok(())
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .flatten()
            .map(|t| t.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_debate_config_is_valid() {
        let config = DebateConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_per_round(), Duration::from_secs(300));
        assert_eq!(config.clarification.max_per_agent, 5);
        assert_eq!(config.summarization.threshold, 5000);
        assert_eq!(config.summarization.max_length, 2500);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let err = DebateConfig::default().with_rounds(0).validate().unwrap_err();
        assert!(err.contains("rounds"));
    }

    #[test]
    fn test_non_judge_synthesis_rejected() {
        let config = DebateConfig {
            synthesis_method: SynthesisMethod::Voting,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("voting"));
    }

    #[test]
    fn test_convergence_is_accepted() {
        let config = DebateConfig {
            termination_condition: TerminationCondition::Convergence { threshold: 0.9 },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tool_call_limit_defaults_and_clamps() {
        let mut agent = AgentConfig::new("a1", "architect", "gpt-4o");
        assert_eq!(agent.tool_call_limit(), DEFAULT_TOOL_CALL_LIMIT);
        agent.tool_call_limit = Some(0);
        assert_eq!(agent.tool_call_limit(), 1);
        agent.tool_call_limit = Some(3);
        assert_eq!(agent.tool_call_limit(), 3);
    }

    #[test]
    fn test_effective_summarization_prefers_override() {
        let debate_level = SummarizationConfig::default();
        let mut agent = AgentConfig::new("a1", "architect", "m");
        assert_eq!(agent.effective_summarization(&debate_level).threshold, 5000);

        agent.summarization = Some(SummarizationConfig {
            threshold: 100,
            ..Default::default()
        });
        assert_eq!(agent.effective_summarization(&debate_level).threshold, 100);
    }

    #[test]
    fn test_summarization_override_with_zero_max_length_rejected() {
        let mut agent = AgentConfig::new("a1", "architect", "m");
        assert!(agent.validate().is_ok());

        agent.summarization = Some(SummarizationConfig {
            max_length: 0,
            ..Default::default()
        });
        let err = agent.validate().unwrap_err();
        assert!(err.contains("a1"));
        assert!(err.contains("max_length"));

        agent.summarization = Some(SummarizationConfig {
            max_length: 0,
            ..SummarizationConfig::disabled()
        });
        assert!(agent.validate().is_ok());
    }

    #[test]
    fn test_agent_config_from_json_defaults() {
        let agent: AgentConfig = serde_json::from_str(
            r#"{"id":"a1","name":"Arch","role":"architect","model":"m"}"#,
        )
        .unwrap();
        assert!(agent.enabled);
        assert_eq!(agent.provider, "openai");
        assert!(agent.tools.is_none());
    }

    #[test]
    fn test_summarization_method_wire_name() {
        let json = serde_json::to_string(&SummarizationMethod::LengthBased).unwrap();
        assert_eq!(json, "\"length-based\"");
    }
}
