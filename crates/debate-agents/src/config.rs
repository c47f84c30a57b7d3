//! System configuration file: participating agents, the judge, and debate
//! settings.
//!
//! ```toml
//! [[agents]]
//! id = "agent-architect"
//! role = "architect"
//! model = "gpt-4o"
//! system_prompt_path = "prompts/architect.md"
//! tools = ["context_search"]
//!
//! [judge]
//! model = "gpt-4o"
//!
//! [debate]
//! rounds = 3
//! timeout_per_round_ms = 300000
//! ```
//!
//! A missing file falls back to [`SystemConfig::default`]. Relative prompt
//! paths resolve against the directory holding the config file.

use std::path::{Path, PathBuf};

use coordination::tools::{ContextSearchTool, ToolSchema, CONTEXT_SEARCH_TOOL};
use coordination::{AgentConfig, DebateConfig, SummarizationConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "debate.toml";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_JUDGE_ID: &str = "judge";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("agent `{agent}` references unknown tool `{tool}`")]
    UnknownTool { agent: String, tool: String },

    #[error("no agents match roles {0:?}")]
    NoMatchingAgents(Vec<String>),
}

/// Schema for a built-in tool, by name.
pub fn builtin_tool(name: &str) -> Option<ToolSchema> {
    match name {
        CONTEXT_SEARCH_TOOL => Some(ContextSearchTool::schema_static()),
        _ => None,
    }
}

/// One `[[agents]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub system_prompt_path: Option<String>,
    #[serde(default)]
    pub user_prompt_path: Option<String>,
    #[serde(default)]
    pub summary_prompt_path: Option<String>,
    /// Built-in tool names offered to the model.
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub tool_call_limit: Option<u32>,
    #[serde(default)]
    pub summarization: Option<SummarizationConfig>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl AgentEntry {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            role: role.into(),
            model: default_model(),
            provider: None,
            temperature: None,
            system_prompt_path: None,
            user_prompt_path: None,
            summary_prompt_path: None,
            tools: Vec::new(),
            tool_call_limit: None,
            summarization: None,
            enabled: true,
        }
    }

    /// Engine-level config with tool names resolved and prompt paths made
    /// relative to `base_dir`.
    pub fn to_agent_config(&self, base_dir: &Path) -> Result<AgentConfig, ConfigError> {
        let mut config = AgentConfig::new(&self.id, &self.role, &self.model);
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(provider) = &self.provider {
            config.provider = provider.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        config.system_prompt_path = resolve_opt(base_dir, &self.system_prompt_path);
        config.user_prompt_path = resolve_opt(base_dir, &self.user_prompt_path);
        config.summary_prompt_path = resolve_opt(base_dir, &self.summary_prompt_path);
        config.tool_call_limit = self.tool_call_limit;
        config.summarization = self.summarization.clone();
        config.enabled = self.enabled;

        if !self.tools.is_empty() {
            let tools = self
                .tools
                .iter()
                .map(|name| {
                    builtin_tool(name).ok_or_else(|| ConfigError::UnknownTool {
                        agent: self.id.clone(),
                        tool: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            config.tools = Some(tools);
        }
        Ok(config)
    }
}

/// The `[judge]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeEntry {
    #[serde(default = "default_judge_id")]
    pub id: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub system_prompt_path: Option<String>,
    #[serde(default)]
    pub summary_prompt_path: Option<String>,
    /// Transcript summarization before synthesis. Off unless set.
    #[serde(default)]
    pub summarization: Option<SummarizationConfig>,
}

impl Default for JudgeEntry {
    fn default() -> Self {
        Self {
            id: default_judge_id(),
            model: default_model(),
            system_prompt_path: None,
            summary_prompt_path: None,
            summarization: None,
        }
    }
}

impl JudgeEntry {
    pub fn to_agent_config(&self, base_dir: &Path) -> AgentConfig {
        let mut config = AgentConfig::new(&self.id, "generalist", &self.model);
        config.system_prompt_path = resolve_opt(base_dir, &self.system_prompt_path);
        config.summary_prompt_path = resolve_opt(base_dir, &self.summary_prompt_path);
        config.summarization = self.summarization.clone();
        config
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentEntry>,
    #[serde(default)]
    pub judge: JudgeEntry,
    #[serde(default)]
    pub debate: DebateConfig,
    /// Directory relative prompt paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            agents: default_agents(),
            judge: JudgeEntry::default(),
            debate: DebateConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl SystemConfig {
    /// Load from `path`, or fall back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using built-in defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(config)
    }

    /// Keep only agents whose role is listed (case-insensitive). An empty
    /// list keeps everyone.
    pub fn retain_roles(&mut self, roles: &[String]) -> Result<(), ConfigError> {
        if roles.is_empty() {
            return Ok(());
        }
        let wanted: Vec<String> = roles.iter().map(|r| r.trim().to_ascii_lowercase()).collect();
        self.agents
            .retain(|a| wanted.contains(&a.role.trim().to_ascii_lowercase()));
        if self.agents.is_empty() {
            return Err(ConfigError::NoMatchingAgents(roles.to_vec()));
        }
        Ok(())
    }

    pub fn agent_configs(&self) -> Result<Vec<AgentConfig>, ConfigError> {
        self.agents
            .iter()
            .map(|a| a.to_agent_config(&self.base_dir))
            .collect()
    }

    pub fn judge_config(&self) -> AgentConfig {
        self.judge.to_agent_config(&self.base_dir)
    }
}

fn resolve_opt(base_dir: &Path, path: &Option<String>) -> Option<String> {
    path.as_deref().map(|p| {
        let p = Path::new(p);
        if p.is_absolute() {
            p.display().to_string()
        } else {
            base_dir.join(p).display().to_string()
        }
    })
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_judge_id() -> String {
    DEFAULT_JUDGE_ID.to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_agents() -> Vec<AgentEntry> {
    vec![
        AgentEntry::new("agent-architect", "architect"),
        AgentEntry::new("agent-performance", "performance"),
    ]
}
