//! Scripted channel — a stand-in human with canned answers.
//!
//! Answers `ask` from a queue and falls back to a default reply once the
//! queue is empty. Every prompt and notification is recorded so benchmark
//! runs and tests can inspect what the agent said.

use async_trait::async_trait;
use miniagent_core::channel::{Channel, NO_ANSWER};
use miniagent_core::error::ChannelError;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct ScriptedChannel {
    answers: Mutex<VecDeque<String>>,
    default_answer: String,
    prompts: Mutex<Vec<String>>,
    notifications: Mutex<Vec<String>>,
}

impl ScriptedChannel {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            default_answer: NO_ANSWER.to_string(),
            prompts: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Reply used once the scripted answers run out.
    pub fn with_default_answer(mut self, answer: impl Into<String>) -> Self {
        self.default_answer = answer.into();
        self
    }

    /// Every prompt passed to `ask`, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Every text passed to `notify`, in order.
    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> ChannelError {
    ChannelError::ConnectionLost("scripted channel poisoned".into())
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn ask(&self, prompt: &str) -> Result<String, ChannelError> {
        self.prompts.lock().map_err(poisoned)?.push(prompt.to_string());
        let next = self.answers.lock().map_err(poisoned)?.pop_front();
        Ok(next.unwrap_or_else(|| self.default_answer.clone()))
    }

    async fn notify(&self, text: &str) -> Result<(), ChannelError> {
        self.notifications
            .lock()
            .map_err(poisoned)?
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_in_order_then_default() {
        let channel = ScriptedChannel::new(["yes", "no"]);
        assert_eq!(channel.ask("a?").await.unwrap(), "yes");
        assert_eq!(channel.ask("b?").await.unwrap(), "no");
        assert_eq!(channel.ask("c?").await.unwrap(), NO_ANSWER);
        assert_eq!(channel.prompts(), vec!["a?", "b?", "c?"]);
    }

    #[tokio::test]
    async fn records_notifications() {
        let channel = ScriptedChannel::new(Vec::<String>::new()).with_default_answer("ok");
        channel.notify("working on it").await.unwrap();
        assert_eq!(channel.notifications(), vec!["working on it"]);
        assert_eq!(channel.ask("done?").await.unwrap(), "ok");
    }
}
