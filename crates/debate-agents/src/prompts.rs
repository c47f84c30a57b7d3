//! Prompt-file resolution with fallback to the built-in role prompts.
//!
//! A configured path that is missing, unreadable, or blank falls back to
//! the built-in text with a warning. Provenance of every resolved prompt is
//! recorded on the debate as [`PromptSources`].

use std::path::Path;

use coordination::agent::roles::prompts_for;
use coordination::judge::DEFAULT_JUDGE_SYSTEM_PROMPT;
use coordination::{AgentConfig, AgentPromptMetadata, JudgePromptMetadata, PromptSourceKind, PromptSources};
use tracing::{debug, warn};

/// Prompt text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt {
    pub text: String,
    pub source: PromptSourceKind,
    pub path: Option<String>,
}

impl ResolvedPrompt {
    pub fn builtin(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PromptSourceKind::Builtin,
            path: None,
        }
    }
}

/// Read a non-blank prompt file. `None` on any problem, after logging it.
fn read_prompt_file(path: &str, label: &str) -> Option<String> {
    match std::fs::read_to_string(Path::new(path)) {
        Ok(text) if !text.trim().is_empty() => {
            debug!(label, path, "loaded prompt file");
            Some(text)
        }
        Ok(_) => {
            warn!(label, path, "prompt file is empty, using built-in prompt");
            None
        }
        Err(e) => {
            warn!(label, path, error = %e, "prompt file unreadable, using built-in prompt");
            None
        }
    }
}

/// Resolve a prompt that always has a built-in fallback.
pub fn resolve_prompt(path: Option<&str>, builtin: &str, label: &str) -> ResolvedPrompt {
    path.and_then(|p| {
        read_prompt_file(p, label).map(|text| ResolvedPrompt {
            text,
            source: PromptSourceKind::File,
            path: Some(p.to_string()),
        })
    })
    .unwrap_or_else(|| ResolvedPrompt::builtin(builtin))
}

/// Resolve a prompt that only exists when configured.
pub fn resolve_optional(path: Option<&str>, label: &str) -> Option<ResolvedPrompt> {
    let path = path?;
    read_prompt_file(path, label).map(|text| ResolvedPrompt {
        text,
        source: PromptSourceKind::File,
        path: Some(path.to_string()),
    })
}

/// Prompts for one debate agent.
#[derive(Debug, Clone)]
pub struct AgentPrompts {
    pub system: ResolvedPrompt,
    /// Extra instructions prepended to every phase prompt.
    pub instructions: Option<ResolvedPrompt>,
    /// System prompt for summarization calls; the agent's own otherwise.
    pub summary: Option<ResolvedPrompt>,
}

impl AgentPrompts {
    pub fn resolve(config: &AgentConfig) -> Self {
        let label = format!("{} system", config.id);
        Self {
            system: resolve_prompt(
                config.system_prompt_path.as_deref(),
                prompts_for(&config.role).system_prompt,
                &label,
            ),
            instructions: resolve_optional(
                config.user_prompt_path.as_deref(),
                &format!("{} instructions", config.id),
            ),
            summary: resolve_optional(
                config.summary_prompt_path.as_deref(),
                &format!("{} summary", config.id),
            ),
        }
    }

    pub fn metadata(&self, config: &AgentConfig) -> AgentPromptMetadata {
        AgentPromptMetadata {
            agent_id: config.id.clone(),
            role: config.role.clone(),
            source: self.system.source,
            path: self.system.path.clone(),
        }
    }
}

/// Prompts for the judge.
#[derive(Debug, Clone)]
pub struct JudgePrompts {
    pub system: ResolvedPrompt,
    pub summary: Option<ResolvedPrompt>,
}

impl JudgePrompts {
    pub fn resolve(config: &AgentConfig) -> Self {
        Self {
            system: resolve_prompt(
                config.system_prompt_path.as_deref(),
                DEFAULT_JUDGE_SYSTEM_PROMPT,
                "judge system",
            ),
            summary: resolve_optional(config.summary_prompt_path.as_deref(), "judge summary"),
        }
    }

    pub fn metadata(&self, config: &AgentConfig) -> JudgePromptMetadata {
        JudgePromptMetadata {
            id: config.id.clone(),
            source: self.system.source,
            path: self.system.path.clone(),
            summary_source: config
                .summary_prompt_path
                .as_ref()
                .map(|_| self.summary.as_ref().map_or(PromptSourceKind::Builtin, |s| s.source)),
            summary_path: self.summary.as_ref().and_then(|s| s.path.clone()),
        }
    }
}

pub fn prompt_sources(
    agents: &[(AgentConfig, AgentPrompts)],
    judge: (&AgentConfig, &JudgePrompts),
) -> PromptSources {
    PromptSources {
        agents: agents
            .iter()
            .map(|(config, prompts)| prompts.metadata(config))
            .collect(),
        judge: judge.1.metadata(judge.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_path_uses_builtin() {
        let p = resolve_prompt(None, "BUILTIN", "x");
        assert_eq!(p, ResolvedPrompt::builtin("BUILTIN"));
    }

    #[test]
    fn test_file_prompt_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arch.md");
        std::fs::write(&path, "You are a careful architect.").unwrap();
        let path = path.display().to_string();

        let p = resolve_prompt(Some(&path), "BUILTIN", "x");
        assert_eq!(p.text, "You are a careful architect.");
        assert_eq!(p.source, PromptSourceKind::File);
        assert_eq!(p.path.as_deref(), Some(path.as_str()));
    }

    #[test]
    fn test_missing_or_blank_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.md").display().to_string();
        assert_eq!(
            resolve_prompt(Some(&missing), "BUILTIN", "x").source,
            PromptSourceKind::Builtin
        );

        let blank = dir.path().join("blank.md");
        std::fs::write(&blank, "  \n\n").unwrap();
        let blank = blank.display().to_string();
        let p = resolve_prompt(Some(&blank), "BUILTIN", "x");
        assert_eq!(p.text, "BUILTIN");
        assert!(p.path.is_none());
        assert!(resolve_optional(Some(&blank), "x").is_none());
    }

    #[test]
    fn test_agent_prompts_default_to_role() {
        let config = AgentConfig::new("a1", "security", "m");
        let prompts = AgentPrompts::resolve(&config);
        assert_eq!(prompts.system.text, prompts_for("security").system_prompt);
        assert!(prompts.instructions.is_none());
        assert!(prompts.summary.is_none());

        let meta = prompts.metadata(&config);
        assert_eq!(meta.agent_id, "a1");
        assert_eq!(meta.source, PromptSourceKind::Builtin);
    }

    #[test]
    fn test_judge_summary_source_recorded_only_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AgentConfig::new("judge", "generalist", "m");
        let judge = JudgePrompts::resolve(&config);
        let meta = judge.metadata(&config);
        assert_eq!(meta.source, PromptSourceKind::Builtin);
        assert!(meta.summary_source.is_none());

        config.summary_prompt_path = Some(dir.path().join("nope.md").display().to_string());
        let judge = JudgePrompts::resolve(&config);
        let meta = judge.metadata(&config);
        assert_eq!(meta.summary_source, Some(PromptSourceKind::Builtin));
        assert!(meta.summary_path.is_none());
    }
}
