//! Wiring from configuration to a running debate.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use coordination::{
    Agent, ClarificationResponder, ContributionType, DebateOrchestrator, DebateResult,
    InMemoryStateSink, Judge, JsonFileStateSink, LlmProvider, RoleAgent, StateSink, TracedAgent,
};
use tracing::info;

use crate::clarify::StdinResponder;
use crate::cli::Cli;
use crate::config::SystemConfig;
use crate::prompts::{prompt_sources, AgentPrompts, JudgePrompts};
use crate::provider::OpenAiProvider;

/// Write the full result as pretty JSON.
pub async fn write_result(path: &Path, result: &DebateResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write result to {}", path.display()))?;
    info!(path = %path.display(), "result written");
    Ok(())
}

/// Apply command-line overrides on top of the loaded config.
pub fn apply_overrides(config: &mut SystemConfig, cli: &Cli) -> Result<()> {
    if let Some(rounds) = cli.rounds {
        config.debate.rounds = rounds;
    }
    if cli.clarify {
        config.debate.clarification.enabled = true;
    }
    config.retain_roles(&cli.agents)?;
    Ok(())
}

/// Build agents, judge, and orchestrator from config, all sharing one provider.
pub fn build_orchestrator(
    config: &SystemConfig,
    provider: Arc<dyn LlmProvider>,
    sink: Arc<dyn StateSink>,
    responder: Option<Arc<dyn ClarificationResponder>>,
) -> Result<DebateOrchestrator> {
    let agent_configs: Vec<_> = config
        .agent_configs()?
        .into_iter()
        .filter(|a| a.enabled)
        .collect();

    let mut resolved = Vec::with_capacity(agent_configs.len());
    let mut agents: Vec<Arc<dyn Agent>> = Vec::with_capacity(agent_configs.len());
    for agent_config in agent_configs {
        let prompts = AgentPrompts::resolve(&agent_config);
        let mut agent = RoleAgent::new(agent_config.clone(), provider.clone())
            .with_system_prompt(prompts.system.text.clone());
        if let Some(instructions) = &prompts.instructions {
            agent = agent.with_instructions(instructions.text.clone());
        }
        if let Some(summary) = &prompts.summary {
            agent = agent.with_summary_prompt(summary.text.clone());
        }
        agents.push(Arc::new(TracedAgent::new(Arc::new(agent))));
        resolved.push((agent_config, prompts));
    }

    let judge_config = config.judge_config();
    let judge_prompts = JudgePrompts::resolve(&judge_config);
    let mut judge = Judge::new(judge_config.clone(), provider)
        .with_system_prompt(judge_prompts.system.text.clone());
    if let Some(summary) = &judge_prompts.summary {
        judge = judge.with_summary_prompt(summary.text.clone());
    }

    let sources = prompt_sources(&resolved, (&judge_config, &judge_prompts));
    let mut orchestrator = DebateOrchestrator::new(agents, judge, config.debate.clone(), sink)
        .context("invalid debate setup")?
        .with_prompt_sources(sources);
    if let Some(responder) = responder {
        orchestrator = orchestrator.with_clarification_responder(responder);
    }
    Ok(orchestrator)
}

pub async fn open_sink(state_dir: Option<&Path>) -> Result<Arc<dyn StateSink>> {
    match state_dir {
        Some(dir) => {
            let sink = JsonFileStateSink::open(dir)
                .await
                .with_context(|| format!("failed to open state directory {}", dir.display()))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(InMemoryStateSink::new())),
    }
}

/// Human-readable solution block for stdout.
pub fn render_solution(result: &DebateResult) -> String {
    let mut out = format!(
        "# Solution (debate {}, {} rounds, confidence {})\n\n{}\n",
        result.debate_id,
        result.metadata.total_rounds,
        result.solution.confidence,
        result.solution.description.trim()
    );
    let failures = result.metadata.failures().count();
    if failures > 0 {
        out.push_str(&format!("\n({} agent call(s) failed; see log)\n", failures));
    }
    out
}

pub async fn run(cli: Cli) -> Result<()> {
    let problem = cli.problem_text()?;
    let mut config = SystemConfig::load(&cli.config)?;
    apply_overrides(&mut config, &cli)?;

    let provider: Arc<dyn LlmProvider> =
        Arc::new(OpenAiProvider::from_env().context("failed to configure model provider")?);
    let sink = open_sink(cli.state_dir.as_deref()).await?;
    let responder: Option<Arc<dyn ClarificationResponder>> = config
        .debate
        .clarification
        .enabled
        .then(|| Arc::new(StdinResponder::stdio()) as Arc<dyn ClarificationResponder>);

    let orchestrator = build_orchestrator(&config, provider, sink, responder)?;
    let total_rounds = config.debate.rounds;
    let progress = move |round: u32, phase: ContributionType| {
        eprintln!("[round {}/{}] {} phase complete", round, total_rounds, phase);
    };

    let result = orchestrator
        .run_debate(&problem, cli.context.as_deref(), Some(&progress))
        .await?;

    info!(
        debate_id = %result.debate_id,
        rounds = result.metadata.total_rounds,
        tokens = ?result.metadata.total_tokens,
        duration_ms = result.metadata.duration_ms,
        "debate finished"
    );
    if let Some(path) = &cli.output {
        write_result(path, &result).await?;
    }
    print!("{}", render_solution(&result));
    Ok(())
}
