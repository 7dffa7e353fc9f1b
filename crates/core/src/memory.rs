//! Memory records — the three persisted logs the agent keeps across turns.
//!
//! - [`ThoughtRecord`]: one per generated thought, with its summary and the
//!   messages that produced it
//! - [`ResponseHistoryEntry`]: one per dispatched action
//! - [`MemoryNote`]: free-form long-term notes
//!
//! Records are immutable once created; the store only appends or evicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::message::Message;

/// A stored unit of reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtRecord {
    /// The raw thought text
    pub thought: String,

    /// Snapshot of the request that produced the thought
    #[serde(default)]
    pub context: Vec<Message>,

    /// Short summary used as long-term context
    #[serde(default)]
    pub summary: String,

    /// When the thought was generated
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl ThoughtRecord {
    pub fn new(thought: impl Into<String>, context: Vec<Message>, summary: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            context,
            summary: summary.into(),
            created_at: Utc::now(),
        }
    }
}

/// The outcome of one dispatched action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHistoryEntry {
    pub question: String,
    pub response: String,
}

impl ResponseHistoryEntry {
    pub fn new(question: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            response: response.into(),
        }
    }
}

/// Entries are fed to prompts in their JSON form.
impl std::fmt::Display for ResponseHistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::json!({
            "question": self.question,
            "response": self.response,
        });
        write!(f, "{json}")
    }
}

/// A free-form long-term note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryNote {
    pub id: String,
    pub content: String,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl MemoryNote {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for MemoryNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}
