use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ChatAction, InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{error, info, warn};

use crate::dispatcher::{CommandDispatcher, EventSource, IncomingEvent};
use crate::error::{BotError, Result as BotResult};
use crate::messenger::{
    send_with_retry, ChatId, InlineKeyboard, Messenger, SEND_ATTEMPTS, SEND_RETRY_BASE_DELAY,
};

/// Telegram implementation of the outbound [`Messenger`] capabilities.
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn to_chat(chat: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.0)
}

fn to_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.payload.clone()))
            .collect::<Vec<_>>()
    }))
}

fn best_effort(err: teloxide::RequestError) -> BotError {
    BotError::DeliveryFailed {
        attempts: 1,
        source: Box::new(err),
    }
}

#[async_trait::async_trait]
impl Messenger for TelegramMessenger {
    async fn send_message(&self, chat: ChatId, text: &str) -> BotResult<()> {
        send_with_retry(SEND_ATTEMPTS, SEND_RETRY_BASE_DELAY, || {
            let bot = self.bot.clone();
            let text = text.to_string();
            async move { bot.send_message(to_chat(chat), text).await.map(|_| ()) }
        })
        .await
    }

    async fn send_with_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> BotResult<()> {
        self.bot
            .send_message(to_chat(chat), text)
            .reply_markup(to_markup(keyboard))
            .await
            .map(|_| ())
            .map_err(best_effort)
    }

    async fn send_typing(&self, chat: ChatId) -> BotResult<()> {
        self.bot
            .send_chat_action(to_chat(chat), ChatAction::Typing)
            .await
            .map(|_| ())
            .map_err(best_effort)
    }
}

/// Run the Telegram update loop until ctrl-c. Each update is routed to the
/// command dispatcher; messages and button callbacks share one path.
pub async fn run(bot: Bot, dispatcher: Arc<CommandDispatcher>) -> Result<()> {
    let commands = vec![
        BotCommand::new("start", "Начать работу с ботом"),
        BotCommand::new("help", "Помощь"),
        BotCommand::new("quote", "Получить цитату"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        error!("Failed to set bot commands: {e}");
    }

    info!("Telegram bot started and listening for updates...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(
    msg: Message,
    dispatcher: Arc<CommandDispatcher>,
) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    dispatcher
        .handle(IncomingEvent {
            chat: ChatId(msg.chat.id.0),
            payload: text,
            source: EventSource::Message,
        })
        .await;

    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dispatcher: Arc<CommandDispatcher>,
) -> ResponseResult<()> {
    // Acknowledge early so the button spinner clears even if the pipeline
    // is slow.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {e}");
    }

    let Some(data) = q.data else {
        return Ok(());
    };
    let chat = q
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .unwrap_or(q.from.id.0 as i64);

    dispatcher
        .handle(IncomingEvent {
            chat: ChatId(chat),
            payload: data,
            source: EventSource::Callback,
        })
        .await;

    Ok(())
}
