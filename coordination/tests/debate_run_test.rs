//! End-to-end debate runs with deterministic providers (no network).
//!
//! Covers: round/phase sequencing, full-mesh critique assignment, failure
//! and timeout isolation, progress callbacks, and persisted state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use coordination::testing::{FailingProvider, FnProvider, ScriptedProvider, SlowProvider};
use coordination::{
    Agent, AgentConfig, CompletionResponse, ContributionType, DebateConfig, DebateOrchestrator,
    DebateStatus, InMemoryStateSink, Judge, LlmProvider, Phase, RoleAgent, StateSink,
};

fn echo_provider(agent_id: &'static str) -> Arc<FnProvider> {
    Arc::new(FnProvider::new(move |req| {
        let prompt = req.user_prompt().unwrap_or_default();
        let phase = if prompt.contains("Critique this proposal") {
            "critique"
        } else if prompt.contains("Refine your proposal") {
            "refinement"
        } else {
            "proposal"
        };
        Ok(CompletionResponse::text(format!("{} {}", agent_id, phase)).with_usage(10))
    }))
}

fn agent(id: &'static str, role: &str, provider: Arc<dyn LlmProvider>) -> Arc<dyn Agent> {
    Arc::new(RoleAgent::new(AgentConfig::new(id, role, "test-model"), provider))
}

fn judge(provider: Arc<dyn LlmProvider>) -> Judge {
    Judge::new(AgentConfig::new("judge", "generalist", "judge-model"), provider)
}

// ── Happy path ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_three_rounds_three_agents() {
    let sink = Arc::new(InMemoryStateSink::new());
    let judge_provider = Arc::new(ScriptedProvider::new(vec!["Final synthesized design".into()]));
    let orchestrator = DebateOrchestrator::new(
        vec![
            agent("arch", "architect", echo_provider("arch")),
            agent("perf", "performance", echo_provider("perf")),
            agent("sec", "security", echo_provider("sec")),
        ],
        judge(judge_provider.clone()),
        DebateConfig::default().with_rounds(3),
        sink.clone(),
    )
    .unwrap();

    let result = orchestrator
        .run_debate("Design a distributed cache", Some("Read-heavy"), None)
        .await
        .unwrap();

    assert_eq!(result.rounds.len(), 3);
    for (i, round) in result.rounds.iter().enumerate() {
        assert_eq!(round.round_number, i as u32 + 1);
        assert_eq!(round.count(ContributionType::Proposal), 3);
        assert_eq!(round.count(ContributionType::Critique), 6);
        assert_eq!(round.count(ContributionType::Refinement), 3);
        assert!(round
            .of_type(ContributionType::Critique)
            .all(|c| c.target_agent_id.as_deref() != Some(c.agent_id.as_str())));
        let proposers: Vec<&str> = round
            .of_type(ContributionType::Proposal)
            .map(|c| c.agent_id.as_str())
            .collect();
        assert_eq!(proposers, vec!["arch", "perf", "sec"]);
    }

    assert_eq!(result.solution.description, "Final synthesized design");
    assert_eq!(result.solution.synthesized_by, "judge");
    assert_eq!(result.metadata.total_rounds, 3);
    assert_eq!(result.metadata.total_tokens, Some(3 * 12 * 10));
    assert_eq!(result.metadata.phase_reports.len(), 9);
    assert!(result.metadata.empty_phases().is_empty());
    assert_eq!(result.metadata.failures().count(), 0);

    // The judge saw the whole transcript once.
    assert_eq!(judge_provider.call_count(), 1);
    let judge_prompt = judge_provider.requests()[0].user_prompt().unwrap().to_string();
    assert!(judge_prompt.contains("## Round 3"));
    assert!(judge_prompt.contains("[security] refinement (sec)"));

    let state = sink.get_debate(&result.debate_id).await.unwrap();
    assert_eq!(state.status, DebateStatus::Completed);
    assert_eq!(state.current_round, 3);
    assert_eq!(state.rounds, result.rounds);
    assert_eq!(state.final_solution.as_ref(), Some(&result.solution));
    assert_eq!(state.context.as_deref(), Some("Read-heavy"));
}

#[tokio::test]
async fn test_later_rounds_see_own_history() {
    let arch_provider = echo_provider("arch");
    let orchestrator = DebateOrchestrator::new(
        vec![
            agent("arch", "architect", arch_provider.clone()),
            agent("kiss", "kiss", echo_provider("kiss")),
        ],
        judge(Arc::new(ScriptedProvider::new(vec!["done".into()]))),
        DebateConfig::default().with_rounds(2),
        Arc::new(InMemoryStateSink::new()),
    )
    .unwrap();
    orchestrator.run_debate("p", None, None).await.unwrap();

    // arch makes 3 calls per round: propose, critique kiss, refine.
    assert_eq!(arch_provider.call_count(), 6);
}

// ── Failure isolation ──────────────────────────────────────────────

#[tokio::test]
async fn test_one_agent_failing_in_proposal() {
    // Two agents, one round: A succeeds, B's provider always fails.
    let judge_provider = Arc::new(ScriptedProvider::new(vec!["partial synthesis".into()]));
    let orchestrator = DebateOrchestrator::new(
        vec![
            agent("a", "architect", echo_provider("a")),
            agent("b", "security", Arc::new(FailingProvider::new("connection reset"))),
        ],
        judge(judge_provider.clone()),
        DebateConfig::default().with_rounds(1),
        Arc::new(InMemoryStateSink::new()),
    )
    .unwrap();

    let result = orchestrator.run_debate("p", None, None).await.unwrap();
    let round = &result.rounds[0];

    assert_eq!(round.count(ContributionType::Proposal), 1);
    assert_eq!(round.proposal_by("a").unwrap().content, "a proposal");
    assert_eq!(round.count(ContributionType::Critique), 0);
    assert_eq!(round.count(ContributionType::Refinement), 1);
    assert_eq!(round.refinement_by("a").unwrap().content, "a refinement");

    let proposal = result.metadata.report(1, ContributionType::Proposal).unwrap();
    assert_eq!(proposal.attempted, 2);
    assert_eq!(proposal.contributed, 1);
    assert_eq!(proposal.failures.len(), 1);
    assert_eq!(proposal.failures[0].agent_id, "b");
    assert_eq!(proposal.failures[0].phase, Phase::Proposal);
    assert!(proposal.failures[0].reason.contains("connection reset"));
    assert!(!proposal.failures[0].timed_out);

    let critique = result.metadata.report(1, ContributionType::Critique).unwrap();
    assert!(critique.is_empty());
    assert_eq!(result.metadata.empty_phases().len(), 1);

    assert_eq!(judge_provider.call_count(), 1);
    assert_eq!(result.solution.description, "partial synthesis");
}

#[tokio::test]
async fn test_all_agents_failing_still_completes_rounds() {
    let orchestrator = DebateOrchestrator::new(
        vec![
            agent("a", "architect", Arc::new(FailingProvider::new("down"))),
            agent("b", "security", Arc::new(FailingProvider::new("down"))),
        ],
        judge(Arc::new(ScriptedProvider::new(vec!["nothing to judge".into()]))),
        DebateConfig::default().with_rounds(2),
        Arc::new(InMemoryStateSink::new()),
    )
    .unwrap();

    let result = orchestrator.run_debate("p", None, None).await.unwrap();
    assert_eq!(result.rounds.len(), 2);
    assert!(result.rounds.iter().all(|r| r.contributions.is_empty()));
    assert_eq!(result.metadata.empty_phases().len(), 6);
    assert_eq!(result.metadata.failures().count(), 4);
    assert_eq!(result.metadata.total_tokens, None);
}

#[tokio::test(start_paused = true)]
async fn test_slow_agent_times_out_without_blocking_others() {
    let config = DebateConfig {
        rounds: 1,
        timeout_per_round_ms: 1_000,
        ..Default::default()
    };
    let orchestrator = DebateOrchestrator::new(
        vec![
            agent("fast", "architect", echo_provider("fast")),
            agent(
                "slow",
                "performance",
                Arc::new(SlowProvider::new(Duration::from_secs(60), "too late")),
            ),
            agent("steady", "testing", echo_provider("steady")),
        ],
        judge(Arc::new(ScriptedProvider::new(vec!["verdict".into()]))),
        config,
        Arc::new(InMemoryStateSink::new()),
    )
    .unwrap();

    let result = orchestrator.run_debate("p", None, None).await.unwrap();
    let round = &result.rounds[0];
    assert_eq!(round.count(ContributionType::Proposal), 2);
    assert!(round.proposal_by("slow").is_none());
    // fast ↔ steady only.
    assert_eq!(round.count(ContributionType::Critique), 2);
    assert_eq!(round.count(ContributionType::Refinement), 2);

    let failures: Vec<_> = result.metadata.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].agent_id, "slow");
    assert!(failures[0].timed_out);
}

// ── Callback and persistence ───────────────────────────────────────

#[tokio::test]
async fn test_phase_callback_order() {
    let seen: Arc<Mutex<Vec<(u32, ContributionType)>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let callback = move |round: u32, phase: ContributionType| {
        recorder.lock().unwrap().push((round, phase));
    };

    let orchestrator = DebateOrchestrator::new(
        vec![agent("a", "architect", echo_provider("a"))],
        judge(Arc::new(ScriptedProvider::new(vec!["v".into()]))),
        DebateConfig::default().with_rounds(2),
        Arc::new(InMemoryStateSink::new()),
    )
    .unwrap();
    orchestrator.run_debate("p", None, Some(&callback)).await.unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            (1, ContributionType::Proposal),
            (1, ContributionType::Critique),
            (1, ContributionType::Refinement),
            (2, ContributionType::Proposal),
            (2, ContributionType::Critique),
            (2, ContributionType::Refinement),
        ]
    );
}

#[tokio::test]
async fn test_disabled_agents_are_skipped() {
    let mut cfg = AgentConfig::new("off", "kiss", "m");
    cfg.enabled = false;
    let off_provider = Arc::new(ScriptedProvider::new(vec!["should not run".into()]));
    let disabled: Arc<dyn Agent> = Arc::new(RoleAgent::new(cfg, off_provider.clone()));

    let orchestrator = DebateOrchestrator::new(
        vec![agent("on", "architect", echo_provider("on")), disabled],
        judge(Arc::new(ScriptedProvider::new(vec!["v".into()]))),
        DebateConfig::default().with_rounds(1),
        Arc::new(InMemoryStateSink::new()),
    )
    .unwrap();
    assert_eq!(orchestrator.agents().len(), 1);

    orchestrator.run_debate("p", None, None).await.unwrap();
    assert_eq!(off_provider.call_count(), 0);
}
