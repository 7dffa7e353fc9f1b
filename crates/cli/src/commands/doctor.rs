//! `miniagent doctor` — Diagnose configuration and connectivity.

use std::path::Path;
use miniagent_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 MiniAgent Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    // Config
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);
    if !path.exists() {
        println!("  ⚠️  No config file at {} — using defaults (run `miniagent onboard`)", path.display());
        issues += 1;
    }
    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    // LLM server
    match miniagent_providers::build_from_config(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ LLM server reachable ({} at {})", config.llm.server_type, config.llm.base_url()),
            Ok(false) | Err(_) => {
                println!("  ❌ LLM server not reachable at {}", config.llm.base_url());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ LLM provider: {e}");
            issues += 1;
        }
    }

    // Messaging channel
    match miniagent_channels::build_from_config(&config) {
        Ok(channel) => match channel.health_check().await {
            Ok(true) => println!("  ✅ Channel '{}' ready", channel.name()),
            Ok(false) => {
                println!("  ❌ Channel '{}' not responding", channel.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Channel '{}': {e}", channel.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Channel: {e}");
            issues += 1;
        }
    }

    // Search
    match miniagent_tools::build_backend(&config.search) {
        Ok(backend) => println!("  ✅ Search engine '{}'", backend.name()),
        Err(e) => {
            println!("  ❌ Search: {e}");
            issues += 1;
        }
    }

    // Memory directory
    match std::fs::create_dir_all(&config.memory.dir) {
        Ok(()) => println!("  ✅ Memory directory {}", config.memory.dir.display()),
        Err(e) => {
            println!("  ❌ Memory directory {}: {e}", config.memory.dir.display());
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
