mod config;
mod dispatcher;
mod error;
mod messenger;
mod pipeline;
mod quotes;
mod scheduler;
mod telegram;
mod translate;

#[cfg(test)]
mod testutil;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::dispatcher::{CommandDispatcher, AWAITING_LANGUAGE_EXPIRY};
use crate::messenger::InlineKeyboard;
use crate::pipeline::QuotePipeline;
use crate::quotes::ZenQuotesClient;
use crate::scheduler::Scheduler;
use crate::telegram::TelegramMessenger;
use crate::translate::MyMemoryClient;

/// Bound on every outbound HTTP call so a hung upstream cannot starve the
/// handler pool.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace period for in-flight handlers after the update loop stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quotebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing .env is fine; production reads the environment directly.
    if dotenvy::dotenv().is_err() {
        info!("No .env file found, using environment variables");
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded");
    info!("  Quote API: {}", config.quote_api_url);
    info!("  Translate API: {}", config.translate_api_url);
    info!("  Schedule: {}", config.schedule);
    info!("  Scheduled language: {}", config.scheduled_lang);

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let bot = Bot::new(&config.bot_token);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let pipeline = QuotePipeline::new(
        Arc::new(ZenQuotesClient::new(http.clone(), config.quote_api_url.clone())),
        Arc::new(MyMemoryClient::new(http, config.translate_api_url.clone())),
    );
    let dispatcher = Arc::new(CommandDispatcher::new(
        pipeline.clone(),
        messenger.clone(),
        InlineKeyboard::language_selector(),
        AWAITING_LANGUAGE_EXPIRY,
    ));

    let mut scheduler = Scheduler::new().await?;
    match config.default_chat {
        Some(chat) => {
            scheduler::register_quote_delivery(
                &scheduler,
                &config.schedule,
                pipeline,
                messenger,
                chat,
                config.scheduled_lang,
            )
            .await?;
            scheduler.start().await?;
        }
        None => warn!("No default chat configured, running in interactive-only mode"),
    }

    info!("Bot is starting...");
    telegram::run(bot, dispatcher).await?;

    // The update loop returned (ctrl-c). Stop the cron jobs and give
    // in-flight handlers a moment to finish.
    info!("Shutting down bot...");
    scheduler.shutdown().await?;
    tokio::time::sleep(SHUTDOWN_GRACE).await;
    info!("Bot stopped gracefully");

    Ok(())
}
