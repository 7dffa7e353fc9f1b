//! Benchmarking for MiniAgent.
//!
//! Replays the agent loop against model × scenario pairs with scripted
//! users, derives metrics from the event stream and writes one JSON result
//! file per run.

pub mod metrics;
pub mod runner;
pub mod scenario;

pub use metrics::{MetricsCollector, RunMetrics};
pub use runner::{BenchmarkRunner, RunResult, sanitize};
pub use scenario::{Scenario, builtin_scenarios, find_scenario};
