//! Per-run metrics derived from the agent's event stream.

use std::collections::BTreeMap;
use miniagent_core::event::AgentEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub iterations_completed: u32,
    /// Known and unknown commands the agent tried to run
    pub actions: u32,
    pub failed_actions: u32,
    pub unknown_actions: u32,
    /// Iterations that ended without a decision
    pub skipped_decisions: u32,
    pub decision_rejections: u32,
    pub repaired_decisions: u32,
    pub gave_up: bool,
    /// Fraction of actions per command name
    pub action_distribution: BTreeMap<String, f64>,
    /// Failed or unknown actions over all actions
    pub error_rate: f64,
    /// Fraction of the expected commands that were used at least once
    pub completion_rate: f64,
}

/// Folds events into counts; call [`MetricsCollector::finish`] once the run ends.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: RunMetrics,
    counts: BTreeMap<String, u32>,
}

impl MetricsCollector {
    pub fn observe(&mut self, event: &AgentEvent) {
        let m = &mut self.metrics;
        match event {
            AgentEvent::DecisionMade { repaired, .. } => {
                if *repaired {
                    m.repaired_decisions += 1;
                }
            }
            AgentEvent::DecisionSkipped { .. } => {
                m.skipped_decisions += 1;
                m.iterations_completed += 1;
            }
            AgentEvent::DecisionRejected { .. } => m.decision_rejections += 1,
            AgentEvent::DecisionGaveUp { .. } => {
                m.decision_rejections += 1;
                m.gave_up = true;
            }
            AgentEvent::ActionExecuted { command, success, .. } => {
                m.actions += 1;
                m.iterations_completed += 1;
                if !success {
                    m.failed_actions += 1;
                }
                *self.counts.entry(command.clone()).or_default() += 1;
            }
            AgentEvent::ActionUnknown { command, .. } => {
                m.actions += 1;
                m.unknown_actions += 1;
                m.iterations_completed += 1;
                *self.counts.entry(command.clone()).or_default() += 1;
            }
            AgentEvent::ThoughtGenerated { .. } | AgentEvent::MemoryReset { .. } => {}
        }
    }

    pub fn finish(self, expected_actions: &[String]) -> RunMetrics {
        let mut metrics = self.metrics;

        if metrics.actions > 0 {
            let total = f64::from(metrics.actions);
            metrics.error_rate =
                f64::from(metrics.failed_actions + metrics.unknown_actions) / total;
            metrics.action_distribution = self
                .counts
                .iter()
                .map(|(name, count)| (name.clone(), f64::from(*count) / total))
                .collect();
        }

        if !expected_actions.is_empty() {
            let used = expected_actions
                .iter()
                .filter(|a| self.counts.contains_key(a.as_str()))
                .count();
            metrics.completion_rate = used as f64 / expected_actions.len() as f64;
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn executed(command: &str, success: bool) -> AgentEvent {
        AgentEvent::ActionExecuted {
            command: command.into(),
            success,
            duration_ms: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_run_is_all_zero() {
        let metrics = MetricsCollector::default().finish(&["ask_user".into()]);
        assert_eq!(metrics, RunMetrics::default());
    }

    #[test]
    fn rates_and_distribution() {
        let mut collector = MetricsCollector::default();
        collector.observe(&executed("ask_user", true));
        collector.observe(&executed("ask_user", true));
        collector.observe(&executed("web_search", false));
        collector.observe(&AgentEvent::ActionUnknown {
            command: "save_file".into(),
            timestamp: Utc::now(),
        });
        collector.observe(&AgentEvent::DecisionSkipped {
            reason: "timeout".into(),
            timestamp: Utc::now(),
        });

        let metrics = collector.finish(&["ask_user".into(), "send_message".into()]);
        assert_eq!(metrics.iterations_completed, 5);
        assert_eq!(metrics.actions, 4);
        assert_eq!(metrics.error_rate, 0.5);
        assert_eq!(metrics.action_distribution["ask_user"], 0.5);
        assert_eq!(metrics.action_distribution["save_file"], 0.25);
        assert_eq!(metrics.completion_rate, 0.5);
        assert_eq!(metrics.skipped_decisions, 1);
    }

    #[test]
    fn give_up_is_flagged() {
        let mut collector = MetricsCollector::default();
        collector.observe(&AgentEvent::DecisionRejected {
            failures: 1,
            reason: "invalid JSON".into(),
            timestamp: Utc::now(),
        });
        collector.observe(&AgentEvent::DecisionGaveUp {
            failures: 2,
            timestamp: Utc::now(),
        });

        let metrics = collector.finish(&[]);
        assert!(metrics.gave_up);
        assert_eq!(metrics.decision_rejections, 2);
        assert_eq!(metrics.iterations_completed, 0);
    }
}
