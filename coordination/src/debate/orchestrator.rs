//! Debate orchestrator: drives agents through rounds and phases, isolates
//! per-agent failures, persists after every round, and hands the transcript
//! to the judge.
//!
//! Within a phase, one future per agent task is joined with
//! [`futures::future::join_all`]; each is bounded by the per-round timeout
//! and guarded against panics. `join_all` yields results in task order, so
//! contributions land in agent declaration order regardless of completion
//! order.

use std::any::Any;
use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn, Instrument, Span};

use super::clarification::{collect_clarifications, ClarificationResponder, ClarificationWarning};
use super::config::DebateConfig;
use super::persistence::StateSink;
use super::state::{
    total_tokens, Contribution, ContributionType, DebateRound, DebateStatus, PromptSources, Solution,
};
use crate::agent::{Agent, AgentError, DebateContext};
use crate::error::DebateError;
use crate::judge::Judge;
use crate::otel;

/// Progress hook invoked after each phase settles. Panics are contained.
pub type PhaseCallback = dyn Fn(u32, ContributionType) + Send + Sync;

/// Step of a run in which an agent can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Clarification,
    Proposal,
    Critique,
    Refinement,
}

impl From<ContributionType> for Phase {
    fn from(kind: ContributionType) -> Self {
        match kind {
            ContributionType::Proposal => Self::Proposal,
            ContributionType::Critique => Self::Critique,
            ContributionType::Refinement => Self::Refinement,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clarification => write!(f, "clarification"),
            Self::Proposal => write!(f, "proposal"),
            Self::Critique => write!(f, "critique"),
            Self::Refinement => write!(f, "refinement"),
        }
    }
}

/// Identity of one agent task within a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTask {
    pub agent_id: String,
    /// Critique target, when the task is a critique.
    pub target_agent_id: Option<String>,
}

impl PhaseTask {
    pub fn new(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            target_agent_id: None,
        }
    }

    pub fn targeting(agent_id: &str, target_agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            target_agent_id: Some(target_agent_id.to_string()),
        }
    }
}

/// An agent task that produced no contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFailure {
    pub agent_id: String,
    /// 0 for the clarification phase.
    pub round: u32,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent_id: Option<String>,
    pub reason: String,
    pub timed_out: bool,
}

impl AgentFailure {
    pub fn new(task: &PhaseTask, round: u32, phase: Phase, error: &AgentError) -> Self {
        Self {
            agent_id: task.agent_id.clone(),
            round,
            phase,
            target_agent_id: task.target_agent_id.clone(),
            reason: error.to_string(),
            timed_out: error.is_timeout(),
        }
    }
}

/// Outcome of one phase of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReport {
    pub round: u32,
    pub phase: ContributionType,
    /// Agent tasks issued.
    pub attempted: usize,
    /// Contributions produced.
    pub contributed: usize,
    pub failures: Vec<AgentFailure>,
}

impl PhaseReport {
    /// True when the phase produced no contributions.
    pub fn is_empty(&self) -> bool {
        self.contributed == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateMetadata {
    pub total_rounds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    pub duration_ms: u64,
    pub phase_reports: Vec<PhaseReport>,
    #[serde(default)]
    pub clarification_failures: Vec<AgentFailure>,
    /// Agents whose clarifying questions were cut to the per-agent cap.
    #[serde(default)]
    pub clarification_warnings: Vec<ClarificationWarning>,
}

impl DebateMetadata {
    /// Phases that produced no contributions at all.
    pub fn empty_phases(&self) -> Vec<&PhaseReport> {
        self.phase_reports.iter().filter(|r| r.is_empty()).collect()
    }

    /// Every recorded failure, clarifications first.
    pub fn failures(&self) -> impl Iterator<Item = &AgentFailure> {
        self.clarification_failures
            .iter()
            .chain(self.phase_reports.iter().flat_map(|r| r.failures.iter()))
    }

    pub fn report(&self, round: u32, phase: ContributionType) -> Option<&PhaseReport> {
        self.phase_reports
            .iter()
            .find(|r| r.round == round && r.phase == phase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateResult {
    pub debate_id: String,
    pub solution: Solution,
    pub rounds: Vec<DebateRound>,
    pub metadata: DebateMetadata,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Run every task to completion, bounding each by `timeout` and converting
/// panics into errors. Results come back in task order.
pub(crate) async fn settle_all<T, Fut>(
    tasks: Vec<(PhaseTask, Fut)>,
    timeout: Duration,
) -> Vec<(PhaseTask, Result<T, AgentError>)>
where
    Fut: Future<Output = Result<T, AgentError>>,
{
    let timeout_ms = timeout.as_millis() as u64;
    join_all(tasks.into_iter().map(|(task, fut)| async move {
        let outcome = match tokio::time::timeout(timeout, AssertUnwindSafe(fut).catch_unwind()).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(AgentError::Panicked(panic_message(panic.as_ref()))),
            Err(_) => Err(AgentError::Timeout { timeout_ms }),
        };
        (task, outcome)
    }))
    .await
}

/// Split settled tasks into contributions and a report. Critique targets
/// are taken from the task assignment.
fn collect_phase(
    round: u32,
    phase: ContributionType,
    settled: Vec<(PhaseTask, Result<Contribution, AgentError>)>,
) -> (Vec<Contribution>, PhaseReport) {
    let attempted = settled.len();
    let mut contributions = Vec::with_capacity(attempted);
    let mut failures = Vec::new();

    for (task, result) in settled {
        match result {
            Ok(mut contribution) => {
                if phase == ContributionType::Critique {
                    contribution.target_agent_id = task.target_agent_id.clone();
                }
                contributions.push(contribution);
            }
            Err(e) => {
                warn!(
                    agent_id = %task.agent_id,
                    round,
                    phase = %phase,
                    target = ?task.target_agent_id,
                    error = %e,
                    "agent failed, phase continues without it"
                );
                failures.push(AgentFailure::new(&task, round, phase.into(), &e));
            }
        }
    }

    let report = PhaseReport {
        round,
        phase,
        attempted,
        contributed: contributions.len(),
        failures,
    };
    (contributions, report)
}

/// Drives a debate from problem statement to [`DebateResult`].
pub struct DebateOrchestrator {
    agents: Vec<Arc<dyn Agent>>,
    judge: Judge,
    config: DebateConfig,
    sink: Arc<dyn StateSink>,
    responder: Option<Arc<dyn ClarificationResponder>>,
    prompt_sources: Option<PromptSources>,
}

impl DebateOrchestrator {
    /// Validate the configuration and keep only enabled agents.
    pub fn new(
        agents: Vec<Arc<dyn Agent>>,
        judge: Judge,
        config: DebateConfig,
        sink: Arc<dyn StateSink>,
    ) -> Result<Self, DebateError> {
        config.validate().map_err(DebateError::Config)?;
        judge.config().validate().map_err(DebateError::Config)?;

        let agents: Vec<_> = agents.into_iter().filter(|a| a.config().enabled).collect();
        if agents.is_empty() {
            return Err(DebateError::Config(
                "at least one enabled agent is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            agent.config().validate().map_err(DebateError::Config)?;
            if !seen.insert(agent.id().to_string()) {
                return Err(DebateError::Config(format!("duplicate agent id `{}`", agent.id())));
            }
        }

        Ok(Self {
            agents,
            judge,
            config,
            sink,
            responder: None,
            prompt_sources: None,
        })
    }

    pub fn with_clarification_responder(mut self, responder: Arc<dyn ClarificationResponder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Prompt provenance recorded on the debate before the first phase.
    pub fn with_prompt_sources(mut self, sources: PromptSources) -> Self {
        self.prompt_sources = Some(sources);
        self
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Run the full debate.
    ///
    /// Agent failures and timeouts are recorded in the returned metadata.
    /// Sink failures and judge failures abort the run and mark the debate
    /// `failed` when the sink still accepts writes.
    pub async fn run_debate(
        &self,
        problem: &str,
        context: Option<&str>,
        on_phase_complete: Option<&PhaseCallback>,
    ) -> Result<DebateResult, DebateError> {
        let span = otel::run_span(self.agents.len(), self.config.rounds);
        async {
            let started = Instant::now();
            let debate_id = self.sink.create_debate(problem, context).await?;
            Span::current().record(otel::FIELD_DEBATE_ID, debate_id.as_str());
            info!(
                debate_id = %debate_id,
                agents = self.agents.len(),
                rounds = self.config.rounds,
                "debate started"
            );

            let result = self
                .execute(&debate_id, problem, context, on_phase_complete, started)
                .await;
            let duration_ms = started.elapsed().as_millis() as u64;
            match result {
                Ok(result) => {
                    otel::record_run_result(&Span::current(), true, result.metadata.total_rounds, duration_ms);
                    info!(debate_id = %debate_id, duration_ms, "debate completed");
                    Ok(result)
                }
                Err(e) => {
                    otel::record_run_result(&Span::current(), false, 0, duration_ms);
                    error!(debate_id = %debate_id, error = %e, "debate failed");
                    if let Err(mark) = self.sink.set_status(&debate_id, DebateStatus::Failed).await {
                        warn!(debate_id = %debate_id, error = %mark, "could not mark debate failed");
                    }
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        debate_id: &str,
        problem: &str,
        context: Option<&str>,
        on_phase_complete: Option<&PhaseCallback>,
        started: Instant,
    ) -> Result<DebateResult, DebateError> {
        if let Some(sources) = &self.prompt_sources {
            self.sink.set_prompt_sources(debate_id, sources.clone()).await?;
        }
        self.sink.set_status(debate_id, DebateStatus::Running).await?;

        let timeout = self.config.timeout_per_round();
        let mut base_ctx = DebateContext::new(problem)
            .with_context(context.map(str::to_string))
            .with_full_history(self.config.include_full_history)
            .with_summarization(self.config.summarization.clone());

        let mut clarification_failures = Vec::new();
        let mut clarification_warnings = Vec::new();
        if self.config.clarification.enabled {
            match &self.responder {
                Some(responder) => {
                    let outcome = collect_clarifications(
                        &self.agents,
                        &base_ctx,
                        &self.config.clarification,
                        responder.as_ref(),
                        timeout,
                    )
                    .await;
                    self.sink
                        .set_clarifications(debate_id, outcome.groups.clone())
                        .await?;
                    base_ctx = base_ctx.with_clarifications(outcome.groups);
                    clarification_failures = outcome.failures;
                    clarification_warnings = outcome.warnings;
                }
                None => warn!("clarification enabled but no responder configured, skipping"),
            }
        }

        let mut history: Vec<DebateRound> = Vec::with_capacity(self.config.rounds as usize);
        let mut phase_reports = Vec::new();
        for round_number in 1..=self.config.rounds {
            let ctx = base_ctx.clone().with_history(history.clone());
            let (round, reports) = self
                .run_round(&ctx, on_phase_complete)
                .instrument(otel::round_span(round_number))
                .await;

            self.sink.append_round(debate_id, round.clone()).await?;
            info!(
                round = round_number,
                contributions = round.contributions.len(),
                "round persisted"
            );
            phase_reports.extend(reports);
            history.push(round);
        }

        let timeout_ms = timeout.as_millis() as u64;
        let solution = match tokio::time::timeout(timeout, self.judge.synthesize(problem, &history, context)).await {
            Ok(Ok(solution)) => solution,
            Ok(Err(e)) => return Err(DebateError::Synthesis(e)),
            Err(_) => return Err(DebateError::Synthesis(AgentError::Timeout { timeout_ms })),
        };
        self.sink.set_final_solution(debate_id, solution.clone()).await?;
        self.sink.set_status(debate_id, DebateStatus::Completed).await?;

        let total_tokens = total_tokens(&history);

        Ok(DebateResult {
            debate_id: debate_id.to_string(),
            solution,
            metadata: DebateMetadata {
                total_rounds: history.len() as u32,
                total_tokens,
                duration_ms: started.elapsed().as_millis() as u64,
                phase_reports,
                clarification_failures,
                clarification_warnings,
            },
            rounds: history,
        })
    }

    /// Proposal → Critique → Refinement for one round.
    async fn run_round(
        &self,
        ctx: &DebateContext,
        on_phase_complete: Option<&PhaseCallback>,
    ) -> (DebateRound, Vec<PhaseReport>) {
        let round = ctx.round_number;
        let timeout = self.config.timeout_per_round();
        let mut reports = Vec::with_capacity(3);

        let tasks = self
            .agents
            .iter()
            .map(|agent| (PhaseTask::new(agent.id()), agent.propose(&ctx.problem, ctx)))
            .collect();
        let (proposals, report) = self
            .run_phase(round, ContributionType::Proposal, settle_all(tasks, timeout))
            .await;
        self.phase_complete(report, &mut reports, on_phase_complete);

        // Only agents with a proposal this round critique and are critiqued.
        let proposers: Vec<(&Arc<dyn Agent>, &Contribution)> = self
            .agents
            .iter()
            .filter_map(|agent| {
                proposals
                    .iter()
                    .find(|p| p.agent_id == agent.id())
                    .map(|p| (agent, p))
            })
            .collect();

        let mut tasks = Vec::new();
        for (critic, _) in &proposers {
            for (target, proposal) in &proposers {
                if critic.id() == target.id() {
                    continue;
                }
                tasks.push((
                    PhaseTask::targeting(critic.id(), target.id()),
                    critic.critique(proposal, ctx),
                ));
            }
        }
        let (critiques, report) = self
            .run_phase(round, ContributionType::Critique, settle_all(tasks, timeout))
            .await;
        self.phase_complete(report, &mut reports, on_phase_complete);

        let received: Vec<Vec<Contribution>> = proposers
            .iter()
            .map(|(agent, _)| {
                critiques
                    .iter()
                    .filter(|c| c.target_agent_id.as_deref() == Some(agent.id()))
                    .cloned()
                    .collect()
            })
            .collect();
        let tasks = proposers
            .iter()
            .zip(&received)
            .map(|((agent, proposal), critiques)| {
                (PhaseTask::new(agent.id()), agent.refine(proposal, critiques, ctx))
            })
            .collect();
        let (refinements, report) = self
            .run_phase(round, ContributionType::Refinement, settle_all(tasks, timeout))
            .await;
        self.phase_complete(report, &mut reports, on_phase_complete);

        let mut contributions = proposals;
        contributions.extend(critiques);
        contributions.extend(refinements);
        (DebateRound::new(round, contributions), reports)
    }

    async fn run_phase<Fut>(
        &self,
        round: u32,
        phase: ContributionType,
        settled: Fut,
    ) -> (Vec<Contribution>, PhaseReport)
    where
        Fut: Future<Output = Vec<(PhaseTask, Result<Contribution, AgentError>)>>,
    {
        let span = otel::phase_span(round, &phase.to_string());
        let settled = settled.instrument(span.clone()).await;
        let (contributions, report) = collect_phase(round, phase, settled);
        otel::record_phase_result(&span, report.attempted, report.contributed);
        (contributions, report)
    }

    fn phase_complete(
        &self,
        report: PhaseReport,
        reports: &mut Vec<PhaseReport>,
        on_phase_complete: Option<&PhaseCallback>,
    ) {
        if report.is_empty() && report.attempted > 0 {
            warn!(round = report.round, phase = %report.phase, "phase produced no contributions");
        } else {
            info!(
                round = report.round,
                phase = %report.phase,
                contributed = report.contributed,
                attempted = report.attempted,
                "phase complete"
            );
        }

        if let Some(callback) = on_phase_complete {
            let (round, phase) = (report.round, report.phase);
            if std::panic::catch_unwind(AssertUnwindSafe(|| callback(round, phase))).is_err() {
                warn!(round, phase = %phase, "progress callback panicked, ignoring");
            }
        }
        reports.push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RoleAgent;
    use crate::debate::config::{AgentConfig, SummarizationConfig};
    use crate::debate::persistence::InMemoryStateSink;
    use crate::testing::{FailingProvider, ScriptedProvider};

    fn agent(id: &str, role: &str) -> Arc<dyn Agent> {
        Arc::new(RoleAgent::new(
            AgentConfig::new(id, role, "m"),
            Arc::new(ScriptedProvider::new(vec![format!("{} says hi", id)])),
        ))
    }

    fn judge() -> Judge {
        Judge::new(
            AgentConfig::new("judge", "generalist", "m"),
            Arc::new(ScriptedProvider::new(vec!["verdict".into()])),
        )
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let err = DebateOrchestrator::new(
            vec![agent("a1", "architect")],
            judge(),
            DebateConfig::default().with_rounds(0),
            Arc::new(InMemoryStateSink::new()),
        )
        .err()
        .unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_no_enabled_agents() {
        let mut cfg = AgentConfig::new("a1", "architect", "m");
        cfg.enabled = false;
        let disabled: Arc<dyn Agent> = Arc::new(RoleAgent::new(cfg, Arc::new(ScriptedProvider::new(vec![]))));
        let err = DebateOrchestrator::new(
            vec![disabled],
            judge(),
            DebateConfig::default(),
            Arc::new(InMemoryStateSink::new()),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("enabled agent"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = DebateOrchestrator::new(
            vec![agent("a1", "architect"), agent("a1", "security")],
            judge(),
            DebateConfig::default(),
            Arc::new(InMemoryStateSink::new()),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_agent_summarization_override_without_room() {
        let mut cfg = AgentConfig::new("a2", "security", "m");
        cfg.summarization = Some(SummarizationConfig {
            enabled: true,
            max_length: 0,
            ..Default::default()
        });
        let overridden: Arc<dyn Agent> =
            Arc::new(RoleAgent::new(cfg, Arc::new(ScriptedProvider::new(vec![]))));
        let err = DebateOrchestrator::new(
            vec![agent("a1", "architect"), overridden],
            judge(),
            DebateConfig::default(),
            Arc::new(InMemoryStateSink::new()),
        )
        .err()
        .unwrap();
        assert!(err.is_config());
        assert!(err.to_string().contains("agent `a2`"));
    }

    #[tokio::test]
    async fn test_full_mesh_critiques_without_self_targets() {
        let orchestrator = DebateOrchestrator::new(
            vec![agent("a1", "architect"), agent("a2", "security"), agent("a3", "kiss")],
            judge(),
            DebateConfig::default().with_rounds(1),
            Arc::new(InMemoryStateSink::new()),
        )
        .unwrap();

        let result = orchestrator.run_debate("p", None, None).await.unwrap();
        let round = &result.rounds[0];
        assert_eq!(round.count(ContributionType::Proposal), 3);
        assert_eq!(round.count(ContributionType::Critique), 6);
        assert_eq!(round.count(ContributionType::Refinement), 3);
        assert!(round
            .of_type(ContributionType::Critique)
            .all(|c| c.target_agent_id.as_deref() != Some(c.agent_id.as_str())));

        // Critic order, then target order.
        let pairs: Vec<(String, String)> = round
            .of_type(ContributionType::Critique)
            .map(|c| (c.agent_id.clone(), c.target_agent_id.clone().unwrap()))
            .collect();
        assert_eq!(pairs[0], ("a1".to_string(), "a2".to_string()));
        assert_eq!(pairs[1], ("a1".to_string(), "a3".to_string()));
        assert_eq!(pairs[2], ("a2".to_string(), "a1".to_string()));
        assert_eq!(pairs[5], ("a3".to_string(), "a2".to_string()));
    }

    #[tokio::test]
    async fn test_callback_panic_does_not_affect_debate() {
        let orchestrator = DebateOrchestrator::new(
            vec![agent("a1", "architect")],
            judge(),
            DebateConfig::default().with_rounds(1),
            Arc::new(InMemoryStateSink::new()),
        )
        .unwrap();
        let callback = |_round: u32, _phase: ContributionType| panic!("renderer crashed");

        let result = orchestrator.run_debate("p", None, Some(&callback)).await.unwrap();
        assert_eq!(result.rounds.len(), 1);
        assert_eq!(result.metadata.phase_reports.len(), 3);
    }

    #[tokio::test]
    async fn test_judge_failure_marks_debate_failed() {
        let sink = Arc::new(InMemoryStateSink::new());
        let failing_judge = Judge::new(
            AgentConfig::new("judge", "generalist", "m"),
            Arc::new(FailingProvider::new("judge down")),
        );
        let orchestrator = DebateOrchestrator::new(
            vec![agent("a1", "architect")],
            failing_judge,
            DebateConfig::default().with_rounds(1),
            sink.clone(),
        )
        .unwrap();

        let err = orchestrator.run_debate("p", None, None).await.unwrap_err();
        assert!(matches!(err, DebateError::Synthesis(_)));
        let ids = sink.debate_ids().await;
        assert_eq!(ids.len(), 1);
        let state = sink.get_debate(&ids[0]).await.unwrap();
        assert_eq!(state.status, DebateStatus::Failed);
        assert_eq!(state.rounds.len(), 1);
        assert!(state.final_solution.is_none());
    }

    #[tokio::test]
    async fn test_settle_all_contains_panics() {
        let tasks = vec![
            (PhaseTask::new("ok"), async { Ok::<_, AgentError>(1) }.boxed()),
            (
                PhaseTask::new("boom"),
                async {
                    if true {
                        panic!("agent exploded");
                    }
                    Ok::<_, AgentError>(2)
                }
                .boxed(),
            ),
        ];
        let settled = settle_all(tasks, Duration::from_secs(1)).await;
        assert_eq!(settled[0].1.as_ref().unwrap(), &1);
        match &settled[1].1 {
            Err(AgentError::Panicked(msg)) => assert!(msg.contains("agent exploded")),
            other => panic!("expected panic error, got {:?}", other),
        }
    }

    #[test]
    fn test_metadata_empty_phases() {
        let metadata = DebateMetadata {
            total_rounds: 1,
            total_tokens: None,
            duration_ms: 5,
            phase_reports: vec![
                PhaseReport {
                    round: 1,
                    phase: ContributionType::Proposal,
                    attempted: 2,
                    contributed: 1,
                    failures: vec![],
                },
                PhaseReport {
                    round: 1,
                    phase: ContributionType::Critique,
                    attempted: 0,
                    contributed: 0,
                    failures: vec![],
                },
            ],
            clarification_failures: vec![],
            clarification_warnings: vec![],
        };
        let empty = metadata.empty_phases();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].phase, ContributionType::Critique);
        assert!(metadata.report(1, ContributionType::Proposal).is_some());
        assert_eq!(metadata.failures().count(), 0);
    }
}
