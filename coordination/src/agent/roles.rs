//! Built-in role prompts.
//!
//! Each entry supplies a system prompt, a focus line, and the phase prompt
//! builders. Unknown role keys resolve to the generalist entry.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::debate::state::Contribution;

/// Inputs shared by every phase prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub problem: &'a str,
    pub context: Option<&'a str>,
    /// Prepared history (raw or summarized). May be empty.
    pub history: &'a str,
    /// Clarifications fragment. May be empty.
    pub clarifications: &'a str,
    pub focus: &'a str,
    /// Operator-supplied instructions prepended to every phase prompt.
    pub instructions: Option<&'a str>,
}

pub type ProposeBuilder = fn(&PromptInput<'_>) -> String;
pub type CritiqueBuilder = fn(&PromptInput<'_>, &Contribution) -> String;
pub type RefineBuilder = fn(&PromptInput<'_>, &Contribution, &[Contribution]) -> String;
pub type SummaryBuilder = fn(&str, &str, usize) -> String;

/// Prompt set for one role.
#[derive(Clone, Copy)]
pub struct RolePrompts {
    pub role: &'static str,
    pub system_prompt: &'static str,
    pub focus: &'static str,
    pub propose: ProposeBuilder,
    pub critique: CritiqueBuilder,
    pub refine: RefineBuilder,
    pub clarify: ProposeBuilder,
    pub summarize: SummaryBuilder,
}

impl std::fmt::Debug for RolePrompts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RolePrompts").field("role", &self.role).finish()
    }
}

pub const GENERALIST: &str = "generalist";

pub const BUILTIN_ROLES: &[RolePrompts] = &[
    RolePrompts {
        role: "architect",
        system_prompt: "You are a senior software architect. You reason about component \
            boundaries, data flow, scalability, and long-term maintainability. Be concrete: \
            name components, interfaces, and the responsibilities of each.",
        focus: "system structure, component boundaries, data flow, and scalability",
        propose: build_propose,
        critique: build_critique,
        refine: build_refine,
        clarify: build_clarify,
        summarize: build_summary,
    },
    RolePrompts {
        role: "performance",
        system_prompt: "You are a performance engineer. You think in terms of latency budgets, \
            throughput, memory footprint, and hot paths. Quantify costs where you can.",
        focus: "latency, throughput, resource usage, and bottlenecks",
        propose: build_propose,
        critique: build_critique,
        refine: build_refine,
        clarify: build_clarify,
        summarize: build_summary,
    },
    RolePrompts {
        role: "security",
        system_prompt: "You are a security engineer. You identify threat models, trust \
            boundaries, authentication and authorization gaps, and data exposure risks.",
        focus: "threats, trust boundaries, data protection, and abuse cases",
        propose: build_propose,
        critique: build_critique,
        refine: build_refine,
        clarify: build_clarify,
        summarize: build_summary,
    },
    RolePrompts {
        role: "testing",
        system_prompt: "You are a test and quality engineer. You look for failure modes, \
            edge cases, and how a design can be verified before and after it ships.",
        focus: "testability, failure modes, edge cases, and verification strategy",
        propose: build_propose,
        critique: build_critique,
        refine: build_refine,
        clarify: build_clarify,
        summarize: build_summary,
    },
    RolePrompts {
        role: "kiss",
        system_prompt: "You are a pragmatic engineer who champions simplicity. You push back \
            on speculative generality and prefer the smallest design that solves the problem.",
        focus: "simplicity, avoiding unnecessary complexity, and incremental delivery",
        propose: build_propose,
        critique: build_critique,
        refine: build_refine,
        clarify: build_clarify,
        summarize: build_summary,
    },
    RolePrompts {
        role: GENERALIST,
        system_prompt: "You are an experienced software engineer taking part in a design \
            debate. Weigh correctness, cost, and operability evenly.",
        focus: "overall correctness, cost, and operability",
        propose: build_propose,
        critique: build_critique,
        refine: build_refine,
        clarify: build_clarify,
        summarize: build_summary,
    },
];

/// Look up a role; unknown keys fall back to the generalist entry.
pub fn prompts_for(role: &str) -> RolePrompts {
    let key = role.trim().to_ascii_lowercase();
    if let Some(entry) = BUILTIN_ROLES.iter().find(|r| r.role == key) {
        return *entry;
    }
    tracing::warn!(role, "unknown role, using generalist prompts");
    generalist()
}

fn generalist() -> RolePrompts {
    BUILTIN_ROLES[BUILTIN_ROLES.len() - 1]
}

fn write_preamble(out: &mut String, input: &PromptInput<'_>) {
    if let Some(instructions) = input.instructions.filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "{}\n", instructions.trim());
    }
    let _ = writeln!(out, "## Problem\n{}\n", input.problem.trim());
    if let Some(context) = input.context.filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "## Context\n{}\n", context.trim());
    }
    if !input.clarifications.is_empty() {
        let _ = writeln!(out, "{}\n", input.clarifications);
    }
    if !input.history.is_empty() {
        let _ = writeln!(out, "## Previous rounds\n{}\n", input.history);
    }
}

pub fn build_propose(input: &PromptInput<'_>) -> String {
    let mut out = String::new();
    write_preamble(&mut out, input);
    let _ = write!(
        out,
        "## Task\nPropose a solution to the problem, focusing on {}. \
         Describe the approach, the key decisions, and the risks you see.",
        input.focus
    );
    out
}

pub fn build_critique(input: &PromptInput<'_>, proposal: &Contribution) -> String {
    let mut out = String::new();
    write_preamble(&mut out, input);
    let _ = write!(
        out,
        "## Proposal from {} ({})\n{}\n\n## Task\nCritique this proposal from the perspective of {}. \
         Point out weaknesses, missing considerations, and concrete improvements. \
         Acknowledge what it gets right.",
        proposal.agent_role,
        proposal.agent_id,
        proposal.content.trim(),
        input.focus
    );
    out
}

pub fn build_refine(input: &PromptInput<'_>, original: &Contribution, critiques: &[Contribution]) -> String {
    let mut out = String::new();
    write_preamble(&mut out, input);
    let _ = writeln!(out, "## Your proposal\n{}\n", original.content.trim());
    if critiques.is_empty() {
        let _ = writeln!(out, "## Critiques\nNo critiques were received this round.\n");
    } else {
        let _ = writeln!(out, "## Critiques");
        for c in critiques {
            let _ = writeln!(out, "\n### From {} ({})\n{}", c.agent_role, c.agent_id, c.content.trim());
        }
        out.push('\n');
    }
    let _ = write!(
        out,
        "## Task\nRefine your proposal. Address each valid critique, explain what you changed, \
         and keep your focus on {}.",
        input.focus
    );
    out
}

pub fn build_clarify(input: &PromptInput<'_>) -> String {
    let mut out = String::new();
    write_preamble(&mut out, input);
    let _ = write!(
        out,
        "## Task\nBefore proposing a solution, list the clarifying questions you need answered, \
         focusing on {}. Ask only questions whose answers would change your design. \
         Respond with JSON: {{\"questions\": [\"...\"]}}. Respond with an empty list if none.",
        input.focus
    );
    out
}

pub fn build_summary(role: &str, history: &str, max_length: usize) -> String {
    format!(
        "Summarize the following debate history for the {} perspective. Keep decisions, \
         open disagreements, and critiques that still need addressing. Stay under {} characters.\n\n{}",
        role, max_length, history
    )
}

#[derive(Deserialize)]
struct QuestionList {
    questions: Vec<String>,
}

/// Bullet (`-`, `*`, `•`) or numbered (`1.`, `2)`) list item.
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+(.+?)\s*$").expect("LIST_ITEM_RE regex should compile")
});

/// Parse a clarifying-question reply.
///
/// Accepts `{"questions": [...]}` (optionally inside surrounding prose or a
/// code fence), then bullet or numbered lines, then bare lines ending in `?`.
pub fn parse_questions(text: &str) -> Vec<String> {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(list) = serde_json::from_str::<QuestionList>(&text[start..=end]) {
                return clean(list.questions);
            }
        }
    }

    let items: Vec<String> = text
        .lines()
        .filter_map(|line| LIST_ITEM_RE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    if !items.is_empty() {
        return clean(items);
    }

    clean(
        text.lines()
            .filter(|line| line.trim_end().ends_with('?'))
            .map(str::to_string)
            .collect(),
    )
}

fn clean(questions: Vec<String>) -> Vec<String> {
    questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::state::ContributionType;

    fn input<'a>() -> PromptInput<'a> {
        PromptInput {
            problem: "Design a rate limiter",
            context: Some("Multi-tenant SaaS"),
            history: "",
            clarifications: "",
            focus: "latency",
            instructions: None,
        }
    }

    #[test]
    fn test_lookup_known_and_unknown_roles() {
        assert_eq!(prompts_for("security").role, "security");
        assert_eq!(prompts_for("  Architect ").role, "architect");
        assert_eq!(prompts_for("astrologer").role, GENERALIST);
        assert_eq!(prompts_for("KISS").role, "kiss");
    }

    #[test]
    fn test_every_role_has_distinct_system_prompt() {
        let mut prompts: Vec<_> = BUILTIN_ROLES.iter().map(|r| r.system_prompt).collect();
        prompts.sort();
        prompts.dedup();
        assert_eq!(prompts.len(), BUILTIN_ROLES.len());
    }

    #[test]
    fn test_propose_prompt_includes_problem_and_context() {
        let prompt = build_propose(&input());
        assert!(prompt.contains("Design a rate limiter"));
        assert!(prompt.contains("Multi-tenant SaaS"));
        assert!(!prompt.contains("## Previous rounds"));
    }

    #[test]
    fn test_critique_prompt_names_target() {
        let proposal = Contribution::new("a2", "security", ContributionType::Proposal, "Token bucket");
        let prompt = build_critique(&input(), &proposal);
        assert!(prompt.contains("Proposal from security (a2)"));
        assert!(prompt.contains("Token bucket"));
    }

    #[test]
    fn test_refine_prompt_without_critiques() {
        let original = Contribution::new("a1", "architect", ContributionType::Proposal, "Sliding window");
        let prompt = build_refine(&input(), &original, &[]);
        assert!(prompt.contains("No critiques were received"));
        assert!(prompt.contains("Sliding window"));
    }

    #[test]
    fn test_instructions_are_prepended() {
        let mut inp = input();
        inp.instructions = Some("Answer in under 200 words.");
        assert!(build_propose(&inp).starts_with("Answer in under 200 words."));
    }

    #[test]
    fn test_parse_questions_json() {
        let qs = parse_questions("Sure:\n```json\n{\"questions\": [\"What scale?\", \" \", \"Budget?\"]}\n```");
        assert_eq!(qs, vec!["What scale?", "Budget?"]);
    }

    #[test]
    fn test_parse_questions_list_fallback() {
        let qs = parse_questions("Questions:\n1. What scale?\n2) Which cloud?\n- Any SLAs?");
        assert_eq!(qs, vec!["What scale?", "Which cloud?", "Any SLAs?"]);
    }

    #[test]
    fn test_parse_questions_bare_lines() {
        let qs = parse_questions("What scale?\nI have no other concerns.");
        assert_eq!(qs, vec!["What scale?"]);
        assert!(parse_questions("No questions.").is_empty());
    }
}
