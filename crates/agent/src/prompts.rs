//! System prompts for the think, decide and evaluate calls.
//!
//! The decide and evaluate prompts embed the command catalogue so the
//! model only ever sees commands the dispatcher can run.

/// One entry of the command catalogue shown to the model.
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// `(argument, description)` pairs; empty means no arguments.
    pub args: &'static [(&'static str, &'static str)],
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "ask_user",
        description: "Ask the user something and wait for the answer. Do not greet the user again if you already talked.",
        args: &[("message", "<the question or message that needs an answer>")],
    },
    CommandSpec {
        name: "send_message",
        description: "Tell the user something without waiting for an answer.",
        args: &[("message", "<the message to send>")],
    },
    CommandSpec {
        name: "send_log",
        description: "Report progress on a longer task to the user without waiting for an answer.",
        args: &[("message", "<the progress report>")],
    },
    CommandSpec {
        name: "web_search",
        description: "Search the web and read the top results.",
        args: &[("query", "<what to search for>")],
    },
    CommandSpec {
        name: "conversation_history",
        description: "Read back the full conversation history.",
        args: &[],
    },
];

pub const JSON_SCHEMA: &str = r#"RESPOND WITH ONLY VALID JSON CONFORMING TO THE FOLLOWING SCHEMA:
{
    "command": {
        "name": {"type": "string"},
        "args": {"type": "object"}
    }
}"#;

pub const THINK_PROMPT: &str = "You are a warm-hearted, attentive AI companion. \
You listen actively, support the user and respect their boundaries.
You make your own decisions and pursue simple strategies.

Goals:
1. Listen to the user and remember what matters to them.
2. Be as helpful as possible.
3. Decide independently what to do next.

Abilities:
1. Ask the user something or talk to them.
2. Send the user a progress log while working on a longer task.
3. Search the web.
4. Read back the whole conversation history.

The user only sees what you send them directly. They cannot see your thoughts or the results of your actions.

End with a concrete suggestion of what to do next:
Suggested action: the action you want to perform.
Content: what the action should contain.";

/// Final user message of the think call.
pub const THINK_INSTRUCTION: &str = "Formulate your thoughts and explain them as detailed as you can.";

/// Final user message of the decide call.
pub const DECIDE_INSTRUCTION: &str = "Determine exactly one command to use (avoid repeating recent questions), \
and respond using the JSON schema specified previously:";

/// Render the catalogue as plain text.
pub fn command_catalogue() -> String {
    let mut out = String::new();
    for command in COMMANDS {
        out.push_str(&format!("Command: {}\n", command.name));
        out.push_str(&format!("Description: {}\n", command.description));
        if command.args.is_empty() {
            out.push_str("Arguments: None\n");
        } else {
            out.push_str("Arguments:\n");
            for (arg, description) in command.args {
                out.push_str(&format!("  {arg}: {description}\n"));
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub fn decide_prompt() -> String {
    format!(
        "You are a decision maker. You read the thoughts of another AI and choose the one action to take next.
Constraints:
1. Only use the commands listed below.
2. The user has not seen the thoughts; they were written by another model call.
3. Use null for missing values, never an empty string.

{}

Every command has a cost. Reach the goal in as few steps as possible without sacrificing quality.

{JSON_SCHEMA}",
        command_catalogue()
    )
}

pub fn evaluate_prompt() -> String {
    format!(
        "You are an evaluator. You read the thoughts of another AI and the command it chose, \
and reply with the best command for those thoughts. Keep the command if it is already right.
Constraints:
1. Only use the commands listed below.
2. The user has not seen the thoughts. If they should be shared, use ask_user and include them in the message.

{}

{JSON_SCHEMA}",
        command_catalogue()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniagent_core::command::{Command, CommandEnvelope};

    #[test]
    fn catalogue_lists_every_command() {
        let catalogue = command_catalogue();
        for command in COMMANDS {
            assert!(catalogue.contains(&format!("Command: {}", command.name)));
        }
        assert!(catalogue.contains("Arguments: None"));
        assert!(!catalogue.ends_with('\n'));
    }

    #[test]
    fn catalogue_names_are_dispatchable() {
        for command in COMMANDS {
            let args = command
                .args
                .iter()
                .map(|(name, _)| (name.to_string(), serde_json::Value::String("x".into())))
                .collect();
            let parsed = CommandEnvelope::new(command.name, args).command().unwrap();
            assert!(!matches!(parsed, Command::Unknown { .. }), "{}", command.name);
        }
    }

    #[test]
    fn decide_prompt_carries_schema_and_catalogue() {
        let prompt = decide_prompt();
        assert!(prompt.contains("Command: web_search"));
        assert!(prompt.ends_with(JSON_SCHEMA));
        assert_ne!(prompt, evaluate_prompt());
    }
}
