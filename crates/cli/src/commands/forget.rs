//! `miniagent forget` — wipe all three memory logs.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let gateway = miniagent_providers::build_gateway(&config)?;
    let memory = super::open_memory(&config, &gateway);

    memory.forget_everything().await?;
    println!("🧹 Memory cleared: {}", memory.dir().display());
    Ok(())
}
