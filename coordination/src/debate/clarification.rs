//! Pre-round clarifying questions.
//!
//! Agents are asked concurrently; the operator's answers are collected
//! sequentially in agent declaration order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::ClarificationConfig;
use super::orchestrator::{settle_all, AgentFailure, Phase, PhaseTask};
use super::state::{AgentClarifications, ClarificationItem};
use crate::agent::{Agent, DebateContext};

/// Literal answer stored for skipped questions.
pub const SKIPPED_ANSWER: &str = "NA";

/// Answers clarifying questions on behalf of the operator.
#[async_trait]
pub trait ClarificationResponder: Send + Sync {
    /// Return the raw answer. Empty means skipped.
    async fn answer(&self, agent_id: &str, role: &str, question: &str) -> String;
}

/// An agent asked more questions than allowed; the extras were dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationWarning {
    pub agent_id: String,
    pub asked: usize,
    pub kept: usize,
}

/// Cap a question list at `max`. Returns a warning when anything is dropped.
pub fn truncate_questions(
    agent_id: &str,
    mut questions: Vec<String>,
    max: usize,
) -> (Vec<String>, Option<ClarificationWarning>) {
    if questions.len() <= max {
        return (questions, None);
    }
    let asked = questions.len();
    warn!(
        agent_id,
        asked,
        max,
        "agent asked too many clarifying questions, dropping the rest"
    );
    questions.truncate(max);
    let warning = ClarificationWarning {
        agent_id: agent_id.to_string(),
        asked,
        kept: max,
    };
    (questions, Some(warning))
}

/// Trimmed answer, or `"NA"` when blank.
pub fn normalize_answer(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        SKIPPED_ANSWER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Result of the clarification phase.
#[derive(Debug, Clone, Default)]
pub struct ClarificationOutcome {
    /// Groups for agents that asked at least one question.
    pub groups: Vec<AgentClarifications>,
    pub failures: Vec<AgentFailure>,
    pub warnings: Vec<ClarificationWarning>,
}

/// Ask every agent for questions and collect the operator's answers.
pub async fn collect_clarifications(
    agents: &[Arc<dyn Agent>],
    ctx: &DebateContext,
    config: &ClarificationConfig,
    responder: &dyn ClarificationResponder,
    timeout: Duration,
) -> ClarificationOutcome {
    let tasks = agents
        .iter()
        .map(|agent| {
            (
                PhaseTask::new(agent.id()),
                agent.ask_clarifying_questions(&ctx.problem, ctx),
            )
        })
        .collect();
    let settled = settle_all(tasks, timeout).await;

    let mut outcome = ClarificationOutcome::default();
    for (agent, (task, result)) in agents.iter().zip(settled) {
        let questions = match result {
            Ok(questions) => questions,
            Err(e) => {
                warn!(agent_id = %task.agent_id, error = %e, "clarifying questions failed");
                outcome.failures.push(AgentFailure::new(&task, 0, Phase::Clarification, &e));
                continue;
            }
        };

        let (questions, warning) = truncate_questions(agent.id(), questions, config.max_per_agent);
        outcome.warnings.extend(warning);
        if questions.is_empty() {
            continue;
        }

        let mut items = Vec::with_capacity(questions.len());
        for (i, question) in questions.into_iter().enumerate() {
            let raw = responder.answer(agent.id(), agent.role(), &question).await;
            items.push(ClarificationItem {
                id: format!("q{}", i + 1),
                question,
                answer: normalize_answer(&raw),
            });
        }
        outcome.groups.push(AgentClarifications {
            agent_id: agent.id().to_string(),
            role: agent.role().to_string(),
            items,
        });
    }

    info!(
        groups = outcome.groups.len(),
        failures = outcome.failures.len(),
        warnings = outcome.warnings.len(),
        "clarifications collected"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RoleAgent;
    use crate::debate::config::AgentConfig;
    use crate::testing::{FailingProvider, ScriptedProvider, ScriptedResponder};

    #[test]
    fn test_truncate_questions() {
        let qs: Vec<String> = (1..=7).map(|i| format!("q{}?", i)).collect();
        let (kept, warning) = truncate_questions("a1", qs, 5);
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[4], "q5?");
        assert_eq!(
            warning,
            Some(ClarificationWarning {
                agent_id: "a1".to_string(),
                asked: 7,
                kept: 5,
            })
        );

        let (short, warning) = truncate_questions("a1", vec!["one?".into()], 5);
        assert_eq!(short.len(), 1);
        assert!(warning.is_none());
    }

    #[test]
    fn test_normalize_answer() {
        assert_eq!(normalize_answer(""), "NA");
        assert_eq!(normalize_answer("   \n"), "NA");
        assert_eq!(normalize_answer("  10k QPS \n"), "10k QPS");
    }

    fn agent(id: &str, reply: &str) -> Arc<dyn Agent> {
        Arc::new(RoleAgent::new(
            AgentConfig::new(id, "architect", "m"),
            Arc::new(ScriptedProvider::new(vec![reply.to_string()])),
        ))
    }

    #[tokio::test]
    async fn test_collect_assigns_ids_and_isolates_failures() {
        let agents: Vec<Arc<dyn Agent>> = vec![
            agent("a1", r#"{"questions": ["Scale?", "Budget?"]}"#),
            Arc::new(RoleAgent::new(
                AgentConfig::new("a2", "security", "m"),
                Arc::new(FailingProvider::new("down")),
            )),
            agent("a3", r#"{"questions": []}"#),
        ];
        let responder = ScriptedResponder::new(vec!["1M users".into(), "  ".into()]);
        let outcome = collect_clarifications(
            &agents,
            &DebateContext::new("p"),
            &ClarificationConfig {
                enabled: true,
                max_per_agent: 5,
            },
            &responder,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(outcome.groups.len(), 1);
        let group = &outcome.groups[0];
        assert_eq!(group.agent_id, "a1");
        assert_eq!(group.items[0].id, "q1");
        assert_eq!(group.items[0].answer, "1M users");
        assert_eq!(group.items[1].id, "q2");
        assert_eq!(group.items[1].answer, "NA");

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].agent_id, "a2");
        assert_eq!(outcome.failures[0].phase, Phase::Clarification);
        assert!(outcome.warnings.is_empty());
    }
}
