//! Debug recorder — dumps rejected decision exchanges to disk.

use std::path::{Path, PathBuf};
use chrono::Utc;
use miniagent_core::message::Message;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Serialize)]
struct DecisionDump<'a> {
    request_type: &'static str,
    timestamp: String,
    messages: &'a [Message],
    response: &'a str,
    error: &'a str,
}

/// Writes one `decision_<timestamp>.json` per rejected reply.
#[derive(Debug, Clone)]
pub struct DebugRecorder {
    dir: PathBuf,
}

impl DebugRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record a rejected reply. Failures are logged and otherwise ignored.
    pub async fn record_decision(
        &self,
        messages: &[Message],
        reply: &str,
        error: &str,
    ) -> Option<PathBuf> {
        let now = Utc::now();
        let dump = DecisionDump {
            request_type: "decision",
            timestamp: now.to_rfc3339(),
            messages,
            response: reply,
            error,
        };

        let path = self
            .dir
            .join(format!("decision_{}.json", now.format("%Y%m%d_%H%M%S_%6f")));

        let written = async {
            let body = serde_json::to_vec_pretty(&dump).map_err(std::io::Error::other)?;
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, body).await
        }
        .await;

        match written {
            Ok(()) => {
                debug!(path = %path.display(), "Decision dump written");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not write decision dump");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_request_reply_and_reason() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = DebugRecorder::new(dir.path().join("debug"));
        let messages = vec![Message::system("decide"), Message::user("Thoughts: \nhello")];

        let path = recorder
            .record_decision(&messages, "not json", "invalid JSON")
            .await
            .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("decision_") && name.ends_with(".json"));

        let dump: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(dump["request_type"], "decision");
        assert_eq!(dump["response"], "not json");
        assert_eq!(dump["error"], "invalid JSON");
        assert_eq!(dump["messages"][1]["content"], "Thoughts: \nhello");
    }

    #[tokio::test]
    async fn unwritable_dir_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let recorder = DebugRecorder::new(blocker.join("debug"));
        assert!(recorder.record_decision(&[], "x", "y").await.is_none());
    }
}
