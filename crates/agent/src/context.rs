//! Context Builder — assembles the message list for one gateway call.
//!
//! Layout: the system prompt, then at most one user message that merges the
//! `Context:`, `Messages:` and `Memories:` blocks in that order. Blocks with
//! no items are left out, and if all three are empty no context message is
//! added at all. Items are rendered with `Display` and concatenated as-is;
//! summarization has already happened upstream.

use std::fmt::Display;
use miniagent_core::message::Message;

#[derive(Debug, Clone)]
pub struct ContextBuilder {
    system_prompt: String,
    long_term: Vec<String>,
    recent: Vec<String>,
    memories: Vec<String>,
}

impl ContextBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            long_term: Vec::new(),
            recent: Vec::new(),
            memories: Vec::new(),
        }
    }

    /// Summarized long-term history, rendered under `Context:`.
    pub fn long_term<T: Display>(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.long_term = render(items);
        self
    }

    /// Recent turns, rendered under `Messages:`.
    pub fn recent<T: Display>(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.recent = render(items);
        self
    }

    /// Free-form notes, rendered under `Memories:`.
    pub fn memories<T: Display>(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.memories = render(items);
        self
    }

    pub fn build(self) -> Vec<Message> {
        let mut messages = vec![Message::system(self.system_prompt)];

        let mut context = String::new();
        if !self.long_term.is_empty() {
            context.push_str("Context:\n");
            context.extend(self.long_term);
        }
        if !self.recent.is_empty() {
            context.push_str("\nMessages:\n");
            context.extend(self.recent);
        }
        if !self.memories.is_empty() {
            context.push_str("\nMemories:\n");
            context.extend(self.memories);
        }

        if !context.is_empty() {
            messages.push(Message::user(context));
        }
        messages
    }
}

fn render<T: Display>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
