//! Hand-rolled fakes for the gateway traits, shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{BotError, Result};
use crate::messenger::{ChatId, InlineKeyboard, Messenger};
use crate::quotes::{Quote, QuoteProvider};
use crate::translate::{Language, Translator};

/// Always returns the same quote.
pub struct StaticProvider {
    quote: Quote,
}

impl StaticProvider {
    pub fn new(text: &str, author: &str) -> Self {
        Self {
            quote: Quote::new(text, author),
        }
    }
}

#[async_trait]
impl QuoteProvider for StaticProvider {
    async fn get_quote(&self) -> Result<Quote> {
        Ok(self.quote.clone())
    }
}

/// Always errors, counting invocations.
#[derive(Default)]
pub struct FailingProvider {
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for FailingProvider {
    async fn get_quote(&self) -> Result<Quote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BotError::SourceUnavailable("source down".into()))
    }
}

/// Succeeds for the first `succeed_for` calls, then fails. With
/// `succeed_for == 0` every call fails.
pub struct CountingTranslator {
    succeed_for: usize,
    calls: AtomicUsize,
}

impl CountingTranslator {
    pub fn failing_after(succeed_for: usize) -> Self {
        Self {
            succeed_for,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for CountingTranslator {
    async fn translate(&self, text: &str, _from: Language, to: Language) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.succeed_for {
            Ok(format!("{text} [{to}]"))
        } else {
            Err(BotError::TranslationFailed("translator down".into()))
        }
    }
}

/// Translates via a fixed lookup table; unknown inputs fail.
pub struct MappingTranslator {
    entries: Vec<(String, String)>,
}

impl MappingTranslator {
    pub fn new(entries: Vec<(&str, &str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Translator for MappingTranslator {
    async fn translate(&self, text: &str, _from: Language, _to: Language) -> Result<String> {
        self.entries
            .iter()
            .find(|(from, _)| from == text)
            .map(|(_, to)| to.clone())
            .ok_or_else(|| BotError::TranslationFailed(format!("no mapping for {text:?}")))
    }
}

/// One recorded outbound send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatId,
    pub text: String,
    pub with_keyboard: bool,
}

/// Records every send; optionally fails typing indicators or all sends.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    fail_typing: bool,
    fail_sends: bool,
}

impl RecordingMessenger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_failing_typing() -> Arc<Self> {
        Arc::new(Self {
            fail_typing: true,
            ..Self::default()
        })
    }

    pub fn with_failing_sends() -> Arc<Self> {
        Arc::new(Self {
            fail_sends: true,
            ..Self::default()
        })
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    async fn record(&self, chat: ChatId, text: &str, with_keyboard: bool) -> Result<()> {
        if self.fail_sends {
            return Err(BotError::DeliveryFailed {
                attempts: 3,
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "send failed",
                )),
            });
        }
        self.sent.lock().await.push(SentMessage {
            chat,
            text: text.to_string(),
            with_keyboard,
        });
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
        self.record(chat, text, false).await
    }

    async fn send_with_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        _keyboard: &InlineKeyboard,
    ) -> Result<()> {
        self.record(chat, text, true).await
    }

    async fn send_typing(&self, _chat: ChatId) -> Result<()> {
        if self.fail_typing {
            return Err(BotError::DeliveryFailed {
                attempts: 1,
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "typing failed",
                )),
            });
        }
        Ok(())
    }
}
