use std::error::Error as StdError;

/// Domain errors for the quote bot.
///
/// Gateway clients map their transport failures into these variants so the
/// pipeline and dispatcher can decide between a user-facing message and a
/// log-and-skip.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// The quote source was unreachable, returned a non-200 status, or
    /// produced a structurally empty result.
    #[error("quote source unavailable: {0}")]
    SourceUnavailable(String),

    /// A translation call failed. A quote is never returned half-translated.
    #[error("translation failed: {0}")]
    TranslationFailed(String),

    /// All retry attempts for an outbound send were exhausted.
    #[error("delivery failed after {attempts} attempts")]
    DeliveryFailed {
        attempts: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Required configuration missing at startup. Fatal.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
