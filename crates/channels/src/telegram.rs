//! Telegram channel — Bot API over long polling.
//!
//! The bot talks to exactly one chat. `ask` drops whatever updates are
//! already queued, sends the prompt, then long-polls `getUpdates` until a
//! text message from that chat arrives. Messages from any other chat get a
//! not-authorized notice and are skipped.

use async_trait::async_trait;
use miniagent_core::channel::{Channel, NO_ANSWER, chunk_message};
use miniagent_core::error::ChannelError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram rejects messages above 4096 chars; stay well under it.
pub const MAX_MESSAGE_CHARS: usize = 2000;

const NOT_AUTHORIZED: &str = "You are not authorized to talk to this bot.";

/// Telegram API response wrapper
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    chat: Chat,
    #[serde(default)]
    from: Option<User>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageParams<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdatesParams {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// Telegram channel adapter.
pub struct TelegramChannel {
    token: String,
    chat_id: i64,
    api_base: String,
    poll_timeout: Duration,
    ask_timeout: Option<Duration>,
    client: reqwest::Client,
    /// Next update id to request
    offset: Mutex<i64>,
}

impl TelegramChannel {
    pub fn new(token: impl Into<String>, chat_id: i64) -> Self {
        let poll_timeout = Duration::from_secs(30);
        Self {
            token: token.into(),
            chat_id,
            api_base: TELEGRAM_API_BASE.into(),
            poll_timeout,
            ask_timeout: None,
            client: build_client(poll_timeout),
            offset: Mutex::new(0),
        }
    }

    /// Build from the `[telegram]` config section.
    pub fn from_config(config: &miniagent_config::TelegramConfig) -> Result<Self, ChannelError> {
        let token = config
            .api_key
            .clone()
            .ok_or_else(|| ChannelError::NotConfigured("telegram.api_key is not set".into()))?;
        let chat_id = config.chat_id_value().ok_or_else(|| {
            ChannelError::NotConfigured("telegram.chat_id is not set or not numeric".into())
        })?;

        let ask_timeout =
            (config.ask_timeout_secs > 0).then(|| Duration::from_secs(config.ask_timeout_secs));

        Ok(Self::new(token, chat_id)
            .with_poll_timeout(Duration::from_secs(config.poll_timeout_secs))
            .with_ask_timeout(ask_timeout))
    }

    /// Point at another Bot API server (local bot API, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self.client = build_client(poll_timeout);
        self
    }

    /// How long `ask` waits before answering [`NO_ANSWER`]; `None` waits forever.
    pub fn with_ask_timeout(mut self, ask_timeout: Option<Duration>) -> Self {
        self.ask_timeout = ask_timeout;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T, ChannelError>
    where
        P: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            .map_err(|e| ChannelError::ConnectionLost(e.to_string()))?;

        let wrapper: TelegramResponse<T> = response
            .json()
            .await
            .map_err(|e| ChannelError::InvalidPayload(format!("{method}: {e}")))?;

        if !wrapper.ok {
            return Err(ChannelError::DeliveryFailed {
                channel: "telegram".into(),
                reason: wrapper
                    .description
                    .unwrap_or_else(|| format!("{method} returned ok=false")),
            });
        }

        wrapper
            .result
            .ok_or_else(|| ChannelError::InvalidPayload(format!("{method}: missing result")))
    }

    /// The Bot API rejects blank messages, so they never leave the process.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        if text.trim().is_empty() {
            return Err(ChannelError::InvalidPayload("message text is empty".into()));
        }
        for chunk in chunk_message(text, MAX_MESSAGE_CHARS) {
            let _: serde_json::Value = self
                .call("sendMessage", &SendMessageParams { chat_id, text: &chunk })
                .await?;
        }
        Ok(())
    }

    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>, ChannelError> {
        self.call(
            "getUpdates",
            &GetUpdatesParams {
                offset,
                timeout: timeout.as_secs(),
                allowed_updates: ["message"],
            },
        )
        .await
    }

    /// Acknowledge everything already queued so `ask` only sees new replies.
    async fn skip_pending(&self) -> Result<(), ChannelError> {
        let updates = self.get_updates(-1, Duration::ZERO).await?;
        if let Some(last) = updates.last() {
            *self.offset.lock().await = last.update_id + 1;
            debug!(skipped_to = last.update_id, "Skipped pending Telegram updates");
        }
        Ok(())
    }

    /// Poll until a text message from the configured chat arrives.
    async fn wait_for_reply(&self) -> String {
        loop {
            let offset = *self.offset.lock().await;
            let updates = match self.get_updates(offset, self.poll_timeout).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "Telegram poll failed, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            for update in updates {
                *self.offset.lock().await = update.update_id + 1;

                let Some(message) = update.message else {
                    continue;
                };
                if message.chat.id != self.chat_id {
                    let (user_id, username) = message
                        .from
                        .as_ref()
                        .map(|u| (u.id, u.username.clone()))
                        .unwrap_or_default();
                    warn!(chat_id = message.chat.id, user_id, ?username, "Unauthorized Telegram user");
                    if let Err(e) = self.send_text(message.chat.id, NOT_AUTHORIZED).await {
                        debug!(error = %e, "Could not send not-authorized notice");
                    }
                    continue;
                }
                if let Some(text) = message.text {
                    return text;
                }
            }
        }
    }
}

fn build_client(poll_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(poll_timeout + Duration::from_secs(15))
        .build()
        .expect("Failed to create HTTP client")
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn ask(&self, prompt: &str) -> Result<String, ChannelError> {
        self.skip_pending().await?;
        self.send_text(self.chat_id, prompt).await?;

        match self.ask_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.wait_for_reply()).await {
                Ok(reply) => Ok(reply),
                Err(_) => {
                    info!(timeout_secs = limit.as_secs(), "No Telegram reply in time");
                    Ok(NO_ANSWER.to_string())
                }
            },
            None => Ok(self.wait_for_reply().await),
        }
    }

    async fn notify(&self, text: &str) -> Result<(), ChannelError> {
        self.send_text(self.chat_id, text).await
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        let me: serde_json::Value = self.call("getMe", &serde_json::json!({})).await?;
        Ok(me.get("id").is_some())
    }
}
