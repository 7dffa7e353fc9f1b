//! File-backed memory store — three bounded logs on disk.
//!
//! Each log is one JSON file under the store directory, read on demand and
//! rewritten in full (temp file + rename) on every mutation:
//!
//! - `thought_history.json`: [`ThoughtRecord`]s, capped
//! - `response_history.json`: [`ResponseHistoryEntry`]s, capped
//! - `memories.json`: [`MemoryNote`]s, uncapped
//!
//! Files are written as `{"version": 1, "entries": [...]}`. A bare JSON
//! array is still accepted when loading. A missing file loads as empty;
//! any other I/O or parse failure is returned as a [`MemoryError`].
//!
//! One store instance serializes its own writes. Two stores must never
//! share a directory; give each concurrent run its own.

use miniagent_core::error::MemoryError;
use miniagent_core::memory::{MemoryNote, ResponseHistoryEntry, ThoughtRecord};
use miniagent_core::message::Message;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use crate::summarize::{SummaryPolicy, Summarizer};

pub const THOUGHTS_FILE: &str = "thought_history.json";
pub const RESPONSES_FILE: &str = "response_history.json";
pub const MEMORIES_FILE: &str = "memories.json";

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct LogFileRef<'a, T> {
    version: u32,
    entries: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LogFile<T> {
    Versioned { version: u32, entries: Vec<T> },
    Legacy(Vec<T>),
}

/// Caps and summarization policies for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub thought_cap: usize,
    pub response_cap: usize,
    pub thoughts: SummaryPolicy,
    pub responses: SummaryPolicy,
}

impl StoreLimits {
    pub fn from_config(config: &miniagent_config::MemoryConfig) -> Self {
        Self {
            thought_cap: config.thought_cap,
            response_cap: config.response_cap,
            thoughts: SummaryPolicy {
                token_threshold: config.thought_token_threshold,
                chunk_tokens: config.chunk_tokens,
                tail_entries: config.thought_tail,
            },
            responses: SummaryPolicy {
                token_threshold: config.response_token_threshold,
                chunk_tokens: config.chunk_tokens,
                tail_entries: config.response_tail,
            },
        }
    }
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self::from_config(&miniagent_config::MemoryConfig::default())
    }
}

pub struct MemoryStore {
    dir: PathBuf,
    limits: StoreLimits,
    summarizer: Summarizer,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new(dir: impl Into<PathBuf>, limits: StoreLimits, summarizer: Summarizer) -> Self {
        Self {
            dir: dir.into(),
            limits,
            summarizer,
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    // ── Raw load / save ──────────────────────────────────────────────

    pub async fn load_thoughts(&self) -> Result<Vec<ThoughtRecord>, MemoryError> {
        load_log(&self.dir.join(THOUGHTS_FILE)).await
    }

    pub async fn save_thoughts(&self, thoughts: &[ThoughtRecord]) -> Result<(), MemoryError> {
        save_log(&self.dir, THOUGHTS_FILE, thoughts).await
    }

    pub async fn load_responses(&self) -> Result<Vec<ResponseHistoryEntry>, MemoryError> {
        load_log(&self.dir.join(RESPONSES_FILE)).await
    }

    pub async fn save_responses(&self, responses: &[ResponseHistoryEntry]) -> Result<(), MemoryError> {
        save_log(&self.dir, RESPONSES_FILE, responses).await
    }

    pub async fn load_memories(&self) -> Result<Vec<MemoryNote>, MemoryError> {
        load_log(&self.dir.join(MEMORIES_FILE)).await
    }

    pub async fn save_memories(&self, memories: &[MemoryNote]) -> Result<(), MemoryError> {
        save_log(&self.dir, MEMORIES_FILE, memories).await
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Summarize a thought and append it to the thought log.
    ///
    /// If the summary cannot be produced the thought itself is stored as
    /// its summary.
    pub async fn add_thought(
        &self,
        thought: &str,
        context: Vec<Message>,
    ) -> Result<ThoughtRecord, MemoryError> {
        let summary = match self.summarizer.summarize(thought).await {
            Ok(summary) if !summary.is_empty() => summary,
            Ok(_) => thought.to_string(),
            Err(e) => {
                warn!(error = %e, "Thought summary failed, storing raw thought");
                thought.to_string()
            }
        };
        let record = ThoughtRecord::new(thought, context, summary);

        let _guard = self.write_lock.lock().await;
        let mut thoughts = self.load_thoughts().await?;
        thoughts.push(record.clone());
        evict_oldest(&mut thoughts, self.limits.thought_cap);
        self.save_thoughts(&thoughts).await?;

        debug!(count = thoughts.len(), "Thought stored");
        Ok(record)
    }

    /// Append one action outcome to the response log.
    pub async fn add_response_entry(
        &self,
        question: impl Into<String>,
        response: impl Into<String>,
    ) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;
        let mut responses = self.load_responses().await?;
        responses.push(ResponseHistoryEntry::new(question, response));
        evict_oldest(&mut responses, self.limits.response_cap);
        self.save_responses(&responses).await?;

        debug!(count = responses.len(), "Response entry stored");
        Ok(())
    }

    /// Store a long-term note and return its id.
    pub async fn add_memory(&self, content: impl Into<String>) -> Result<String, MemoryError> {
        let note = MemoryNote::new(content);
        let id = note.id.clone();

        let _guard = self.write_lock.lock().await;
        let mut memories = self.load_memories().await?;
        memories.push(note);
        self.save_memories(&memories).await?;
        Ok(id)
    }

    /// Delete a note by id. Returns whether it existed.
    pub async fn forget_memory(&self, id: &str) -> Result<bool, MemoryError> {
        let _guard = self.write_lock.lock().await;
        let mut memories = self.load_memories().await?;
        let before = memories.len();
        memories.retain(|m| m.id != id);
        let removed = memories.len() < before;
        if removed {
            self.save_memories(&memories).await?;
        }
        Ok(removed)
    }

    /// Reset all three logs to empty.
    pub async fn forget_everything(&self) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;
        self.save_thoughts(&[]).await?;
        self.save_responses(&[]).await?;
        self.save_memories(&[]).await?;
        info!(dir = %self.dir.display(), "Memory reset");
        Ok(())
    }

    // ── Views for prompts ────────────────────────────────────────────

    /// Summaries of the last `n` thoughts, oldest first.
    pub async fn thought_summaries(&self, n: usize) -> Result<Vec<String>, MemoryError> {
        let thoughts = self.load_thoughts().await?;
        Ok(last_n(&thoughts, n).iter().map(|t| t.summary.clone()).collect())
    }

    /// The last `n` response entries, oldest first.
    pub async fn recent_responses(&self, n: usize) -> Result<Vec<ResponseHistoryEntry>, MemoryError> {
        let responses = self.load_responses().await?;
        Ok(last_n(&responses, n).to_vec())
    }

    /// Note contents, oldest first.
    pub async fn memory_contents(&self) -> Result<Vec<String>, MemoryError> {
        Ok(self
            .load_memories()
            .await?
            .into_iter()
            .map(|m| m.content)
            .collect())
    }

    /// The thought summaries, condensed further if they exceed the budget.
    pub async fn thought_history_text(&self) -> Result<String, MemoryError> {
        let summaries: Vec<String> = self
            .load_thoughts()
            .await?
            .into_iter()
            .map(|t| t.summary)
            .collect();
        Ok(self
            .summarizer
            .summarized_history(&summaries, self.limits.thoughts)
            .await)
    }

    /// The response log, summarized if it exceeds the budget.
    pub async fn response_history_text(&self) -> Result<String, MemoryError> {
        let responses = self.load_responses().await?;
        Ok(self
            .summarizer
            .summarized_history(&responses, self.limits.responses)
            .await)
    }
}

fn evict_oldest<T>(entries: &mut Vec<T>, cap: usize) {
    if entries.len() > cap {
        let excess = entries.len() - cap;
        entries.drain(..excess);
    }
}

fn last_n<T>(entries: &[T], n: usize) -> &[T] {
    &entries[entries.len().saturating_sub(n)..]
}

async fn load_log<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, MemoryError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(MemoryError::Storage(format!(
                "Failed to read {}: {e}",
                path.display()
            )));
        }
    };

    if content.trim().is_empty() {
        warn!(path = %path.display(), "Empty history file, treating as empty log");
        return Ok(Vec::new());
    }

    let parsed: LogFile<T> = serde_json::from_str(&content).map_err(|e| MemoryError::Corrupted {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    match parsed {
        LogFile::Versioned { version, entries } if version <= FORMAT_VERSION => Ok(entries),
        LogFile::Versioned { version, .. } => Err(MemoryError::Corrupted {
            path: path.display().to_string(),
            reason: format!("unsupported format version {version}"),
        }),
        LogFile::Legacy(entries) => Ok(entries),
    }
}

async fn save_log<T: Serialize>(dir: &Path, file: &str, entries: &[T]) -> Result<(), MemoryError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        MemoryError::Storage(format!("Failed to create memory directory {}: {e}", dir.display()))
    })?;

    let body = serde_json::to_string_pretty(&LogFileRef {
        version: FORMAT_VERSION,
        entries,
    })
    .map_err(|e| MemoryError::Storage(format!("Failed to serialize {file}: {e}")))?;

    let path = dir.join(file);
    let tmp = dir.join(format!("{file}.tmp"));
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|e| MemoryError::Storage(format!("Failed to write {}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|e| MemoryError::Storage(format!("Failed to replace {}: {e}", path.display())))?;

    Ok(())
}
