use tracing::warn;

use crate::error::{BotError, Result};
use crate::messenger::ChatId;
use crate::translate::Language;

const DEFAULT_QUOTE_API_URL: &str = "https://zenquotes.io/api/random";
const DEFAULT_TRANSLATE_API_URL: &str = "https://api.mymemory.translated.net/get";
// Six-field cron expression (with seconds): every minute.
const DEFAULT_SCHEDULE: &str = "0 * * * * *";

/// Process configuration, read once at startup and passed explicitly into
/// the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// Destination for scheduled deliveries. `None` disables the cron path.
    pub default_chat: Option<ChatId>,
    pub quote_api_url: String,
    pub translate_api_url: String,
    pub schedule: String,
    pub scheduled_lang: Language,
}

impl Config {
    /// Read configuration from the process environment. Only the bot token
    /// is fatal when missing; everything else falls back to a default or
    /// degrades with a warning.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = lookup("TELEGRAM_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BotError::ConfigInvalid("TELEGRAM_TOKEN is not set".into()))?;

        let default_chat = match lookup("TELEGRAM_CHAT_ID") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => Some(ChatId(id)),
                Err(_) => {
                    warn!("TELEGRAM_CHAT_ID {raw:?} is not a number, scheduled delivery disabled");
                    None
                }
            },
            None => {
                warn!("TELEGRAM_CHAT_ID is not set, scheduled delivery disabled");
                None
            }
        };

        let scheduled_lang = match lookup("QUOTE_LANG") {
            Some(code) => Language::from_code(code.trim()).unwrap_or_else(|| {
                warn!("QUOTE_LANG {code:?} is not supported, falling back to ru");
                Language::Ru
            }),
            None => Language::Ru,
        };

        Ok(Self {
            bot_token,
            default_chat,
            quote_api_url: lookup("QUOTE_API_URL")
                .unwrap_or_else(|| DEFAULT_QUOTE_API_URL.to_string()),
            translate_api_url: lookup("TRANSLATE_API_URL")
                .unwrap_or_else(|| DEFAULT_TRANSLATE_API_URL.to_string()),
            schedule: lookup("QUOTE_SCHEDULE").unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
            scheduled_lang,
        })
    }
}
