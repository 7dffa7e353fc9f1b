//! Console channel — the human sits at the terminal.
//!
//! `notify` prints a line, `ask` prints the prompt and reads one line back.
//! Used for `miniagent run` when no Telegram bot is configured.

use async_trait::async_trait;
use miniagent_core::channel::Channel;
use miniagent_core::error::ChannelError;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// Interactive terminal channel.
pub struct ConsoleChannel<R = BufReader<io::Stdin>, W = io::Stdout> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), io::stdout())
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> ConsoleChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Use arbitrary streams instead of stdin/stdout.
    pub fn with_io(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    async fn write_line(&self, text: &str) -> Result<(), ChannelError> {
        let mut out = self.output.lock().await;
        let written = async {
            out.write_all(text.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await
        }
        .await;
        written.map_err(|e| ChannelError::DeliveryFailed {
                channel: "console".into(),
                reason: e.to_string(),
            })
    }

    /// Consume the channel and return the output stream.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }
}

#[async_trait]
impl<R, W> Channel for ConsoleChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        "console"
    }

    async fn ask(&self, prompt: &str) -> Result<String, ChannelError> {
        self.write_line(&format!("🤖 {prompt}")).await?;

        let mut line = String::new();
        let read = self
            .input
            .lock()
            .await
            .read_line(&mut line)
            .await
            .map_err(|e| ChannelError::ConnectionLost(e.to_string()))?;

        if read == 0 {
            return Err(ChannelError::ConnectionLost("stdin closed".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn notify(&self, text: &str) -> Result<(), ChannelError> {
        self.write_line(&format!("🤖 {text}")).await
    }
}
