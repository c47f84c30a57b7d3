//! Config → orchestrator wiring, exercised with a scripted provider.

use std::sync::Arc;

use clap::Parser;
use coordination::testing::ScriptedProvider;
use coordination::{InMemoryStateSink, PromptSourceKind, StateSink};
use debate_agents::app::{
    apply_overrides, build_orchestrator, open_sink, render_solution, write_result,
};
use debate_agents::{Cli, SystemConfig};

fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
    std::fs::create_dir_all(dir.join("prompts")).unwrap();
    std::fs::write(dir.join("prompts/sec.md"), "You are a paranoid reviewer.").unwrap();
    std::fs::write(dir.join("prompts/rules.md"), "Answer in bullet points.").unwrap();
    let path = dir.join("debate.toml");
    std::fs::write(
        &path,
        r#"
[[agents]]
id = "sec"
role = "security"
system_prompt_path = "prompts/sec.md"
user_prompt_path = "prompts/rules.md"

[[agents]]
id = "perf"
role = "performance"
system_prompt_path = "prompts/missing.md"

[[agents]]
id = "kiss"
role = "kiss"

[debate]
rounds = 3
"#,
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_config_file_drives_debate() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path());
    let cli = Cli::try_parse_from([
        "debate",
        "Design an auth service",
        "--config",
        config_path.to_str().unwrap(),
        "--rounds",
        "1",
        "--agents",
        "security,performance",
    ])
    .unwrap();

    let mut config = SystemConfig::load(&cli.config).unwrap();
    apply_overrides(&mut config, &cli).unwrap();
    assert_eq!(config.debate.rounds, 1);
    assert_eq!(config.agents.len(), 2);

    let provider = Arc::new(ScriptedProvider::new(vec!["an answer".into()]));
    let sink = Arc::new(InMemoryStateSink::new());
    let orchestrator = build_orchestrator(&config, provider.clone(), sink.clone(), None).unwrap();
    assert_eq!(orchestrator.agents().len(), 2);

    let result = orchestrator
        .run_debate(&cli.problem_text().unwrap(), None, None)
        .await
        .unwrap();
    assert_eq!(result.rounds.len(), 1);
    assert_eq!(result.rounds[0].contributions.len(), 2 + 2 + 2);

    // Prompt files reach the provider.
    let requests = provider.requests();
    assert!(requests
        .iter()
        .any(|r| r.system_prompt == "You are a paranoid reviewer."));
    assert!(requests
        .iter()
        .any(|r| r.user_prompt().unwrap_or_default().starts_with("Answer in bullet points.")));

    // And their provenance is recorded.
    let state = sink.get_debate(&result.debate_id).await.unwrap();
    let sources = state.prompt_sources.unwrap();
    assert_eq!(sources.agents.len(), 2);
    let sec = sources.agents.iter().find(|a| a.agent_id == "sec").unwrap();
    assert_eq!(sec.source, PromptSourceKind::File);
    assert!(sec.path.as_deref().unwrap().ends_with("sec.md"));
    let perf = sources.agents.iter().find(|a| a.agent_id == "perf").unwrap();
    assert_eq!(perf.source, PromptSourceKind::Builtin);
    assert_eq!(sources.judge.id, "judge");
    assert_eq!(sources.judge.source, PromptSourceKind::Builtin);

    let rendered = render_solution(&result);
    assert!(rendered.contains(&result.debate_id));
    assert!(rendered.contains("confidence 75"));
}

#[tokio::test]
async fn test_state_dir_persists_json() {
    let dir = tempfile::tempdir().unwrap();
    let sink = open_sink(Some(&dir.path().join("state"))).await.unwrap();
    let config = SystemConfig::default();
    let orchestrator = build_orchestrator(
        &config,
        Arc::new(ScriptedProvider::new(vec!["ok".into()])),
        sink,
        None,
    )
    .unwrap();

    let result = orchestrator.run_debate("p", None, None).await.unwrap();
    let file = dir.path().join("state").join(format!("{}.json", result.debate_id));
    assert!(file.exists());
    assert_eq!(result.rounds.len(), 3);
}

#[tokio::test]
async fn test_write_result_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = build_orchestrator(
        &SystemConfig::default(),
        Arc::new(ScriptedProvider::new(vec!["ok".into()])),
        Arc::new(InMemoryStateSink::new()),
        None,
    )
    .unwrap();
    let result = orchestrator.run_debate("p", None, None).await.unwrap();

    let path = dir.path().join("result.json");
    write_result(&path, &result).await.unwrap();
    let written: coordination::DebateResult =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.debate_id, result.debate_id);
    assert_eq!(written.rounds.len(), 3);

    let missing_dir = dir.path().join("nope").join("result.json");
    let err = write_result(&missing_dir, &result).await.unwrap_err();
    assert!(format!("{:#}", err).contains("failed to write result"));
}

#[test]
fn test_unknown_role_filter_is_an_error() {
    let cli = Cli::try_parse_from(["debate", "p", "--agents", "testing"]).unwrap();
    let mut config = SystemConfig::default();
    assert!(apply_overrides(&mut config, &cli).is_err());
}

#[test]
fn test_zero_rounds_rejected_at_build() {
    let mut config = SystemConfig::default();
    config.debate.rounds = 0;
    let err = build_orchestrator(
        &config,
        Arc::new(ScriptedProvider::new(vec![])),
        Arc::new(InMemoryStateSink::new()),
        None,
    )
    .err()
    .unwrap();
    assert!(format!("{:#}", err).contains("rounds"));
}
