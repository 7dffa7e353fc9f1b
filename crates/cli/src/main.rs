//! MiniAgent CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Start the agent loop
//! - `doctor`   — Check config, LLM server and messaging channel
//! - `forget`   — Wipe thought, response and memory logs
//! - `history`  — Show what the agent remembers
//! - `bench`    — Benchmark models against built-in scenarios
//! - `onboard`  — Write the default config file

use std::path::PathBuf;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "miniagent",
    about = "MiniAgent — a small autonomous agent loop for local LLMs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.miniagent/config.toml
    #[arg(short, long, global = true, env = "MINIAGENT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agent loop (wipes memory first)
    Run,

    /// Diagnose configuration and connectivity
    Doctor,

    /// Reset thought history, response history and memories
    Forget,

    /// Print summarized thought and response history
    History,

    /// Run benchmark scenarios against one or more models
    Bench {
        /// Model to benchmark (repeatable; default: config or provider list)
        #[arg(short, long)]
        model: Vec<String>,

        /// Scenario to run (repeatable; default: all)
        #[arg(short, long)]
        scenario: Vec<String>,
    },

    /// Create the config file with defaults
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run => commands::run::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Forget => commands::forget::run(config_path).await?,
        Commands::History => commands::history::run(config_path).await?,
        Commands::Bench { model, scenario } => {
            commands::bench::run(config_path, model, scenario).await?
        }
        Commands::Onboard => commands::onboard::run(config_path).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bench_flags_repeat() {
        let cli = Cli::try_parse_from([
            "miniagent", "bench", "-m", "qwen", "-m", "llama", "-s", "web_research",
        ])
        .unwrap();
        match cli.command {
            Commands::Bench { model, scenario } => {
                assert_eq!(model, vec!["qwen", "llama"]);
                assert_eq!(scenario, vec!["web_research"]);
            }
            _ => panic!("expected bench"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["miniagent", "run", "--verbose", "--config", "/tmp/x.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
        assert!(matches!(cli.command, Commands::Run));
    }
}
