use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{BotError, Result};

/// Messaging-platform chat identifier. Group chats are negative by
/// convention, private chats positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl ChatId {
    pub fn is_private(self) -> bool {
        self.0 > 0
    }

    pub fn is_group(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One inline button: a visible label and the callback payload sent back
/// when the user presses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub payload: String,
}

/// Platform-agnostic inline keyboard, rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// The fixed two-button language selector shown with every reply.
    pub fn language_selector() -> Self {
        Self {
            rows: vec![vec![
                InlineButton {
                    label: "🇷🇺 Русский".to_string(),
                    payload: "ru".to_string(),
                },
                InlineButton {
                    label: "🇬🇧 English".to_string(),
                    payload: "en".to_string(),
                },
            ]],
        }
    }
}

/// Outbound messaging capabilities consumed by the dispatcher and the
/// scheduled delivery job. Telegram is the production implementation;
/// tests inject recording fakes.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Plain text send. Retried per [`send_with_retry`]; exhausting the
    /// retry budget yields [`BotError::DeliveryFailed`].
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()>;

    /// Keyboard-bearing send. Best-effort, not retried.
    async fn send_with_keyboard(&self, chat: ChatId, text: &str, keyboard: &InlineKeyboard)
        -> Result<()>;

    /// "Typing..." indicator. Best-effort, not retried.
    async fn send_typing(&self, chat: ChatId) -> Result<()>;
}

pub const SEND_ATTEMPTS: usize = 3;
pub const SEND_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Run `op` up to `max_attempts` times with linearly increasing backoff
/// (1x, 2x, ... the base delay) between attempts. Success on any attempt
/// returns immediately; exhaustion surfaces the last underlying error.
pub async fn send_with_retry<F, Fut, E>(
    max_attempts: usize,
    base_delay: Duration,
    mut op: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < max_attempts => {
                warn!("Send attempt {attempt} failed, retrying: {e}");
                tokio::time::sleep(base_delay * attempt as u32).await;
            }
            Err(e) => {
                return Err(BotError::DeliveryFailed {
                    attempts: attempt,
                    source: Box::new(e),
                })
            }
        }
    }
}
