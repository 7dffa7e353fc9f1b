//! `miniagent onboard` — First-time setup.

use std::path::Path;
use miniagent_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);

    println!("🤖 MiniAgent — First-Time Setup");
    println!("===============================\n");

    if let Some(config_dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
            println!("✅ Created config directory: {}", config_dir.display());
        } else {
            println!("  Config directory exists: {}", config_dir.display());
        }
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config at: {}", config_path.display());
    }

    let config = super::load_config(Some(config_path.as_path()))?;
    if !config.memory.dir.exists() {
        std::fs::create_dir_all(&config.memory.dir)?;
        println!("✅ Created memory directory: {}", config.memory.dir.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Start your LLM server ({} at {})", config.llm.server_type, config.llm.base_url());
    println!("   2. Set telegram.api_key and telegram.chat_id, or agent.channel = \"console\"");
    println!("   3. Run `miniagent doctor`, then `miniagent run`\n");

    Ok(())
}
