//! Built-in benchmark scenarios.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    /// Agent iterations per run
    pub iterations: u32,
    /// Commands a good run is expected to use
    pub expected_actions: Vec<String>,
    /// Canned answers the scripted user gives to `ask_user`, in order
    pub user_replies: Vec<String>,
}

fn scenario(
    name: &str,
    description: &str,
    iterations: u32,
    expected_actions: &[&str],
    user_replies: &[&str],
) -> Scenario {
    Scenario {
        name: name.into(),
        description: description.into(),
        iterations,
        expected_actions: expected_actions.iter().map(|s| s.to_string()).collect(),
        user_replies: user_replies.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "basic_conversation",
            "Basic conversation and memory retention",
            5,
            &["ask_user", "send_message"],
            &[
                "Hi! I'm Sam and I had a long day at work.",
                "Mostly meetings. I'd rather be hiking.",
                "Yes, I go to the mountains most weekends.",
            ],
        ),
        scenario(
            "web_research",
            "Web search and synthesis of the results",
            3,
            &["web_search", "send_message"],
            &["Can you find out what's new in Rust this year?"],
        ),
        scenario(
            "complex_task",
            "Multi-step task handling and decision making",
            4,
            &["web_search", "ask_user", "send_message"],
            &[
                "Help me plan a weekend trip to Lisbon.",
                "I like food and history, budget is moderate.",
            ],
        ),
    ]
}

pub fn find_scenario(name: &str) -> Option<Scenario> {
    builtin_scenarios().into_iter().find(|s| s.name == name)
}
