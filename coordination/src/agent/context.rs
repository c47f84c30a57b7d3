//! Rendering debate history and clarifications into prompt text.

use std::fmt::Write as _;

use crate::debate::config::SummarizationConfig;
use crate::debate::state::{AgentClarifications, ContributionType, DebateRound};

/// History as seen by one agent: its proposals, the critiques it received,
/// and its refinements.
pub fn agent_history(history: &[DebateRound], agent_id: &str) -> String {
    let mut out = String::new();
    for round in history {
        let proposal = round.proposal_by(agent_id);
        let critiques: Vec<_> = round.critiques_for(agent_id).collect();
        let refinement = round.refinement_by(agent_id);
        if proposal.is_none() && critiques.is_empty() && refinement.is_none() {
            continue;
        }

        let _ = writeln!(out, "## Round {}", round.round_number);
        if let Some(p) = proposal {
            let _ = writeln!(out, "\n### Your proposal\n{}", p.content);
        }
        for c in &critiques {
            let _ = writeln!(out, "\n### Critique from {} ({})\n{}", c.agent_role, c.agent_id, c.content);
        }
        if let Some(r) = refinement {
            let _ = writeln!(out, "\n### Your refinement\n{}", r.content);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Every contribution of every round, labeled by role and phase.
pub fn full_history(history: &[DebateRound]) -> String {
    let mut out = String::new();
    for round in history {
        let _ = writeln!(out, "## Round {}", round.round_number);
        for kind in ContributionType::ROUND_ORDER {
            for c in round.of_type(kind) {
                match (&c.target_agent_id, kind) {
                    (Some(target), ContributionType::Critique) => {
                        let _ = writeln!(
                            out,
                            "\n### [{}] {} ({} → {})\n{}",
                            c.agent_role, kind, c.agent_id, target, c.content
                        );
                    }
                    _ => {
                        let _ = writeln!(
                            out,
                            "\n### [{}] {} ({})\n{}",
                            c.agent_role, kind, c.agent_id, c.content
                        );
                    }
                }
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Clarification Q&A as a prompt fragment. Empty input yields an empty string.
pub fn format_clarifications(groups: &[AgentClarifications]) -> String {
    let groups: Vec<_> = groups.iter().filter(|g| !g.items.is_empty()).collect();
    if groups.is_empty() {
        return String::new();
    }

    let mut out = String::from("## Clarifications\n");
    for group in groups {
        let _ = writeln!(out, "\n### {} ({})", group.role, group.agent_id);
        for item in &group.items {
            let _ = writeln!(out, "- [{}] Q: {}\n  A: {}", item.id, item.question, item.answer);
        }
    }
    out.trim_end().to_string()
}

/// Size measure used for the summarization threshold.
pub fn context_size(text: &str) -> usize {
    text.chars().count()
}

/// Summarize only when enabled and strictly over the threshold.
pub fn should_summarize(config: &SummarizationConfig, size: usize) -> bool {
    config.enabled && size > config.threshold
}
