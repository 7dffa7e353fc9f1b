//! `miniagent bench` — run benchmark scenarios and print a summary.

use std::path::Path;
use std::sync::Arc;
use miniagent_bench::{BenchmarkRunner, Scenario, builtin_scenarios, find_scenario};

pub async fn run(
    config_path: Option<&Path>,
    models: Vec<String>,
    scenarios: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let gateway = miniagent_providers::build_gateway(&config)?;
    let search = Arc::new(miniagent_tools::build_from_config(&config.search)?);

    let scenarios: Vec<Scenario> = if scenarios.is_empty() {
        builtin_scenarios()
    } else {
        scenarios
            .iter()
            .map(|name| {
                find_scenario(name).ok_or_else(|| format!("Unknown scenario '{name}'"))
            })
            .collect::<Result<_, _>>()?
    };

    let runner = BenchmarkRunner::from_config(gateway, search, &config);
    let requested = if models.is_empty() {
        config.benchmark.models.clone()
    } else {
        models
    };
    let models = runner.resolve_models(&requested).await?;

    println!("📊 MiniAgent Benchmark");
    println!("   Models:    {}", models.join(", "));
    println!(
        "   Scenarios: {}",
        scenarios.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ")
    );
    println!("   Results:   {}\n", runner.results_dir().display());

    let mut results = runner.run_all(&models, &scenarios).await;
    results.sort_by(|a, b| (&a.model, &a.scenario).cmp(&(&b.model, &b.scenario)));

    println!(
        "{:<28} {:<20} {:>6} {:>8} {:>10} {:>9}",
        "MODEL", "SCENARIO", "ITERS", "ERRORS", "COMPLETE", "TIME"
    );
    for r in &results {
        let status = if r.metrics.gave_up { " (gave up)" } else { "" };
        println!(
            "{:<28} {:<20} {:>6} {:>7.0}% {:>9.0}% {:>8.1}s{status}",
            r.model,
            r.scenario,
            r.metrics.iterations_completed,
            r.metrics.error_rate * 100.0,
            r.metrics.completion_rate * 100.0,
            r.duration_secs,
        );
        if let Some(error) = &r.error {
            println!("    ↳ {error}");
        }
    }

    Ok(())
}
