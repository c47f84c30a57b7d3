//! Command-line driver for the debate engine in `coordination`.
//!
//! Owns everything that touches the outside world: config files, prompt
//! files, environment credentials, the HTTP provider, and the terminal.

pub mod app;
pub mod clarify;
pub mod cli;
pub mod config;
pub mod prompts;
pub mod provider;

pub use cli::Cli;
pub use config::SystemConfig;
