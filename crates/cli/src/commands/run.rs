//! `miniagent run` — the agent loop with two-stage Ctrl-C handling.
//!
//! The first Ctrl-C cancels the running iteration and asks whether to go
//! on; Enter continues, a second Ctrl-C exits.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use miniagent_agent::AgentLoop;
use miniagent_core::event::EventBus;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    let gateway = miniagent_providers::build_gateway(&config)?;
    let channel = miniagent_channels::build_from_config(&config)?;
    let search = Arc::new(miniagent_tools::build_from_config(&config.search)?);
    let memory = super::open_memory(&config, &gateway);

    println!("🤖 MiniAgent");
    println!("   Model:   {} ({})", gateway.model(), config.llm.server_type);
    println!("   Channel: {}", channel.name());
    println!("   Search:  {}", search.backend_name());
    println!("   Press Ctrl+C to pause.\n");

    let agent = AgentLoop::new(
        gateway,
        memory,
        channel,
        search,
        Arc::new(EventBus::default()),
    )
    .with_config(&config);

    agent.reset().await?;
    let error_backoff = Duration::from_secs(config.agent.error_backoff_secs);

    loop {
        tokio::select! {
            result = agent.step() => match result {
                Ok(outcome) => debug!(?outcome, "Step done"),
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "Fatal error, stopping");
                    eprintln!("❌ {e}");
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(error = %e, "Iteration failed, retrying in {}s", error_backoff.as_secs());
                    tokio::time::sleep(error_backoff).await;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n⏸  Paused. Press Enter to continue, or Ctrl+C again to exit.");
                if !confirm_continue().await {
                    println!("👋 Shutting down. Goodbye!");
                    info!("Stopped by user");
                    return Ok(());
                }
                println!("▶️  Continuing...");
            }
        }
    }
}

/// Wait for Enter (continue) or a second Ctrl-C / closed stdin (stop).
async fn confirm_continue() -> bool {
    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        read = stdin.read_line(&mut line) => matches!(read, Ok(n) if n > 0),
        _ = tokio::signal::ctrl_c() => false,
    }
}
