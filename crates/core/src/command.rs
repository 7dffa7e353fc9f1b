//! Command envelopes — the single structured decision a model must produce.
//!
//! A decision reply must be one JSON object shaped like
//! `{"command": {"name": "...", "args": {...}}}`. Every key at every level
//! must be identifier-like. Values may be integers, strings, booleans,
//! explicit nulls or nested objects; arrays and floats are rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use crate::error::ToolError;

/// Why a reply failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("reply is empty")]
    Empty,

    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("key '{0}' is not an identifier")]
    InvalidKey(String),

    #[error("value of '{key}' has disallowed type {kind}")]
    DisallowedValue { key: String, kind: &'static str },

    #[error("reply has no 'command' object")]
    MissingCommand,

    #[error("command has no string 'name'")]
    MissingName,
}

/// A validated `{command: {name, args}}` decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

/// Result of validating a raw model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub envelope: CommandEnvelope,
    /// True when the envelope was recovered from prose around the JSON.
    pub repaired: bool,
}

impl CommandEnvelope {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Validate a value that is already a native JSON mapping.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Value::Object(root) = value else {
            return Err(ValidationError::NotAnObject);
        };
        check_shape(root)?;

        let Some(Value::Object(command)) = root.get("command") else {
            return Err(ValidationError::MissingCommand);
        };
        let Some(Value::String(name)) = command.get("name") else {
            return Err(ValidationError::MissingName);
        };
        let args = match command.get("args") {
            Some(Value::Object(args)) => args.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                return Err(ValidationError::DisallowedValue {
                    key: "args".into(),
                    kind: kind_of(other),
                });
            }
        };

        Ok(Self {
            name: name.clone(),
            args,
        })
    }

    /// Parse and validate reply text as-is, without repair.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    /// The wire form `{"command": {"name": ..., "args": ...}}`.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "command": {
                "name": self.name,
                "args": self.args,
            }
        })
    }

    /// Interpret the envelope as one of the known commands.
    pub fn command(&self) -> Result<Command, ToolError> {
        Command::from_envelope(self)
    }
}

impl std::fmt::Display for CommandEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// Validate a raw reply, falling back to brace extraction when the reply
/// wraps its JSON in prose.
pub fn validate_reply(raw: &str) -> Result<Validated, ValidationError> {
    match CommandEnvelope::parse(raw) {
        Ok(envelope) => Ok(Validated {
            envelope,
            repaired: false,
        }),
        Err(first) => match extract_json_object(raw) {
            Some(inner) if inner.len() < raw.trim().len() => CommandEnvelope::parse(inner)
                .map(|envelope| Validated {
                    envelope,
                    repaired: true,
                }),
            _ => Err(first),
        },
    }
}

/// The substring between the first `{` and the last `}`, inclusive.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Identifier check: a letter or `_`, then letters, digits or `_`.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn check_shape(map: &Map<String, Value>) -> Result<(), ValidationError> {
    for (key, value) in map {
        if !is_identifier(key) {
            return Err(ValidationError::InvalidKey(key.clone()));
        }
        match value {
            Value::String(_) | Value::Bool(_) | Value::Null => {}
            Value::Number(n) if n.is_i64() || n.is_u64() => {}
            Value::Object(inner) => check_shape(inner)?,
            other => {
                return Err(ValidationError::DisallowedValue {
                    key: key.clone(),
                    kind: kind_of(other),
                });
            }
        }
    }
    Ok(())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The closed set of commands the dispatcher knows how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the human and wait for the answer.
    AskUser { message: String },
    /// Tell the human something; no reply expected.
    SendMessage { message: String },
    /// Report progress to the human; no reply expected.
    SendLog { message: String },
    /// Search the web.
    WebSearch { query: String },
    /// Read back the response history.
    ConversationHistory,
    /// Anything else the model made up.
    Unknown { name: String },
}

impl Command {
    pub fn from_envelope(envelope: &CommandEnvelope) -> Result<Self, ToolError> {
        let args = &envelope.args;
        Ok(match envelope.name.as_str() {
            "ask_user" => Command::AskUser {
                message: string_arg(args, "message")?,
            },
            "send_message" => Command::SendMessage {
                message: string_arg(args, "message")?,
            },
            "send_log" => Command::SendLog {
                message: string_arg(args, "message")?,
            },
            "web_search" => Command::WebSearch {
                query: string_arg(args, "query")?,
            },
            "conversation_history" => Command::ConversationHistory,
            other => Command::Unknown { name: other.to_string() },
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Command::AskUser { .. } => "ask_user",
            Command::SendMessage { .. } => "send_message",
            Command::SendLog { .. } => "send_log",
            Command::WebSearch { .. } => "web_search",
            Command::ConversationHistory => "conversation_history",
            Command::Unknown { name } => name,
        }
    }
}

/// Read a text argument. Integers and booleans are accepted in text form;
/// a missing key or an explicit null is an error.
fn string_arg(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Null) => Err(ToolError::InvalidArguments(format!("'{key}' is null"))),
        Some(_) => Err(ToolError::InvalidArguments(format!("'{key}' must be text"))),
        None => Err(ToolError::InvalidArguments(format!("missing '{key}' argument"))),
    }
}
