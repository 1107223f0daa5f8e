use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::BotError;
use crate::messenger::{ChatId, InlineKeyboard, Messenger};
use crate::pipeline::QuotePipeline;
use crate::translate::Language;

const WELCOME_TEXT: &str = "🎯 Добро пожаловать в Quote Bot!\n\n\
    Этот бот поможет вам получить вдохновляющие цитаты на русском или английском языке.\n\n\
    Выберите язык для получения цитаты:";

const HELP_TEXT: &str = "ℹ️ Помощь по использованию бота:\n\n\
    🔹 /start - начать работу с ботом\n\
    🔹 /quote - получить цитату\n\
    🔹 /help - показать эту справку\n\n\
    Просто нажимайте на кнопки для выбора языка цитаты!";

const LANGUAGE_PROMPT: &str = "Выберите язык для цитаты:";

const FETCH_ERROR_RU: &str = "❌ Ошибка при получении цитаты. Попробуйте еще раз.";
const TRANSLATE_ERROR_RU: &str = "❌ Ошибка при переводе цитаты. Попробуйте еще раз.";
const FETCH_ERROR_EN: &str = "❌ Error fetching quote. Please try again.";

/// A chat stuck on a language prompt older than this is treated as idle
/// again, so a returning user's bare "ru" is not misread weeks later.
pub const AWAITING_LANGUAGE_EXPIRY: Duration = Duration::from_secs(10 * 60);

/// Where an inbound payload came from. Button callbacks always carry a
/// trusted language code; plain text only counts as one while the chat is
/// awaiting a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Message,
    Callback,
}

/// One inbound trigger from the messaging platform.
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    pub chat: ChatId,
    pub payload: String,
    pub source: EventSource,
}

/// Closed set of commands derived from inbound payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start,
    Help,
    Quote,
    Language(Language),
    Unknown(String),
}

impl Command {
    fn parse(payload: &str) -> Self {
        let trimmed = payload.trim();
        match trimmed {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/quote" => Command::Quote,
            other => Language::from_code(other)
                .map(Command::Language)
                .unwrap_or_else(|| Command::Unknown(other.to_string())),
        }
    }
}

/// Ephemeral per-chat interaction state. Lost on restart by design.
#[derive(Debug, Clone, Copy)]
enum ChatState {
    Idle,
    AwaitingLanguage { since: Instant },
}

/// Maps inbound events to pipeline invocations and keyboard-bearing
/// replies. Every reply re-presents the language selector, so after any
/// handled event the chat is awaiting a language again.
pub struct CommandDispatcher {
    pipeline: QuotePipeline,
    messenger: Arc<dyn Messenger>,
    keyboard: InlineKeyboard,
    states: Mutex<HashMap<ChatId, ChatState>>,
    awaiting_expiry: Duration,
}

impl CommandDispatcher {
    pub fn new(
        pipeline: QuotePipeline,
        messenger: Arc<dyn Messenger>,
        keyboard: InlineKeyboard,
        awaiting_expiry: Duration,
    ) -> Self {
        Self {
            pipeline,
            messenger,
            keyboard,
            states: Mutex::new(HashMap::new()),
            awaiting_expiry,
        }
    }

    /// Handle one inbound event. Never returns an error: pipeline and
    /// delivery failures become user-facing replies or log lines.
    pub async fn handle(&self, event: IncomingEvent) {
        info!(chat = %event.chat, payload = %event.payload, "Processing command");

        if let Err(e) = self.messenger.send_typing(event.chat).await {
            warn!(chat = %event.chat, "Failed to send typing indicator: {e}");
        }

        match Command::parse(&event.payload) {
            Command::Start => self.reply(event.chat, WELCOME_TEXT).await,
            Command::Help => self.reply(event.chat, HELP_TEXT).await,
            Command::Quote => self.reply(event.chat, LANGUAGE_PROMPT).await,
            Command::Language(lang) => {
                let accepted = event.source == EventSource::Callback
                    || self.is_awaiting_language(event.chat).await;
                if accepted {
                    self.deliver_quote(event.chat, lang).await;
                } else {
                    self.reply_unknown(event.chat, &event.payload).await;
                }
            }
            Command::Unknown(raw) => self.reply_unknown(event.chat, &raw).await,
        }

        self.states.lock().await.insert(
            event.chat,
            ChatState::AwaitingLanguage {
                since: Instant::now(),
            },
        );
    }

    async fn deliver_quote(&self, chat: ChatId, lang: Language) {
        match self.pipeline.formatted_quote(lang).await {
            Ok(text) => {
                self.reply(chat, &text).await;
                info!(chat = %chat, lang = %lang, "Quote sent");
            }
            Err(e) => {
                error!(chat = %chat, lang = %lang, "Quote pipeline failed: {e}");
                self.reply(chat, pipeline_error_text(lang, &e)).await;
            }
        }
    }

    async fn reply_unknown(&self, chat: ChatId, raw: &str) {
        info!(chat = %chat, payload = raw, "Unknown command");
        let text = format!(
            "❓ Неизвестная команда: {raw}\n\n\
             Используйте /help для получения списка доступных команд. Или выберите действие:"
        );
        self.reply(chat, &text).await;
    }

    async fn reply(&self, chat: ChatId, text: &str) {
        if let Err(e) = self
            .messenger
            .send_with_keyboard(chat, text, &self.keyboard)
            .await
        {
            error!(chat = %chat, "Failed to send reply: {e}");
        }
    }

    async fn is_awaiting_language(&self, chat: ChatId) -> bool {
        match self.states.lock().await.get(&chat) {
            Some(ChatState::AwaitingLanguage { since }) => since.elapsed() <= self.awaiting_expiry,
            Some(ChatState::Idle) | None => false,
        }
    }
}

/// Localized per-path error strings: Russian texts for the `ru` request
/// path, English for `en`.
fn pipeline_error_text(lang: Language, err: &BotError) -> &'static str {
    match (lang, err) {
        (Language::Ru, BotError::TranslationFailed(_)) => TRANSLATE_ERROR_RU,
        (Language::Ru, _) => FETCH_ERROR_RU,
        (Language::En, _) => FETCH_ERROR_EN,
    }
}
