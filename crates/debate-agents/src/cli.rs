//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "debate",
    version,
    about = "Run a structured multi-agent debate and synthesize a solution"
)]
pub struct Cli {
    /// Problem statement to debate.
    #[arg(conflicts_with = "problem_file")]
    pub problem: Option<String>,

    /// Read the problem statement from a file.
    #[arg(long)]
    pub problem_file: Option<PathBuf>,

    /// Extra context passed to every agent and the judge.
    #[arg(long)]
    pub context: Option<String>,

    /// System configuration file (TOML).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the configured number of rounds.
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Only run agents with these roles (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub agents: Vec<String>,

    /// Write the debate result as JSON to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Persist debate state as JSON files in this directory.
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Ask agents for clarifying questions and answer them interactively.
    #[arg(long)]
    pub clarify: bool,

    /// Debug-level logging.
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// The problem statement, from the positional argument or `--problem-file`.
    pub fn problem_text(&self) -> Result<String> {
        let text = match (&self.problem, &self.problem_file) {
            (Some(problem), _) => problem.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read problem file {}", path.display()))?,
            (None, None) => bail!("a problem statement is required (positional or --problem-file)"),
        };
        let text = text.trim();
        if text.is_empty() {
            bail!("problem statement is empty");
        }
        Ok(text.to_string())
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
