//! `miniagent history` — print what the agent currently remembers.
//!
//! Long histories are summarized through the LLM exactly as the agent
//! would see them.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let gateway = miniagent_providers::build_gateway(&config)?;
    let memory = super::open_memory(&config, &gateway);

    let thoughts = memory.load_thoughts().await?;
    let responses = memory.load_responses().await?;
    let notes = memory.load_memories().await?;

    println!("🧠 Memory at {}\n", memory.dir().display());

    println!("Thoughts ({} stored):", thoughts.len());
    if thoughts.is_empty() {
        println!("  (none)");
    } else {
        println!("{}", memory.thought_history_text().await?);
    }

    println!("\nResponses ({} stored):", responses.len());
    if responses.is_empty() {
        println!("  (none)");
    } else {
        println!("{}", memory.response_history_text().await?);
    }

    println!("\nMemories ({} stored):", notes.len());
    for note in &notes {
        println!("  [{}] {}", note.id, note.content);
    }

    Ok(())
}
