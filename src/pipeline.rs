use std::sync::Arc;

use tracing::debug;

use crate::error::{BotError, Result};
use crate::quotes::{Quote, QuoteProvider};
use crate::translate::{Language, Translator};

/// The quote source serves quotes in English; other target languages go
/// through the translator.
const SOURCE_LANGUAGE: Language = Language::En;

/// Fetch -> translate -> format, as a single operation producing a string
/// ready for delivery.
#[derive(Clone)]
pub struct QuotePipeline {
    provider: Arc<dyn QuoteProvider>,
    translator: Arc<dyn Translator>,
}

impl QuotePipeline {
    pub fn new(provider: Arc<dyn QuoteProvider>, translator: Arc<dyn Translator>) -> Self {
        Self {
            provider,
            translator,
        }
    }

    /// Produce a formatted quote in `target`. Fails with
    /// [`BotError::SourceUnavailable`] when the source errors or returns an
    /// empty quote, and with [`BotError::TranslationFailed`] when either
    /// translation call fails; a half-translated quote is never returned.
    pub async fn formatted_quote(&self, target: Language) -> Result<String> {
        let quote = self.provider.get_quote().await?;
        if quote.is_empty() {
            return Err(BotError::SourceUnavailable(
                "quote with empty text or author".into(),
            ));
        }

        let quote = if target == SOURCE_LANGUAGE {
            quote
        } else {
            self.translate(&quote, target).await?
        };

        debug!("Produced quote by {} ({target})", quote.author);
        Ok(format_quote(&quote.text, &quote.author))
    }

    /// Text and author are translated as two independent calls with the
    /// same language pair; both must succeed.
    async fn translate(&self, quote: &Quote, target: Language) -> Result<Quote> {
        let text = self
            .translator
            .translate(&quote.text, SOURCE_LANGUAGE, target)
            .await?;
        let author = self
            .translator
            .translate(&quote.author, SOURCE_LANGUAGE, target)
            .await?;
        Ok(Quote::new(text, author))
    }
}

/// Display template: quotation-mark-wrapped text, blank line, em-dash
/// attribution.
pub fn format_quote(text: &str, author: &str) -> String {
    format!("💬 \"{text}\"\n\n— {author}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{CountingTranslator, FailingProvider, MappingTranslator, StaticProvider};

    fn pipeline(
        provider: Arc<dyn QuoteProvider>,
        translator: Arc<dyn Translator>,
    ) -> QuotePipeline {
        QuotePipeline::new(provider, translator)
    }

    #[test]
    fn formatting_is_deterministic() {
        let formatted = format_quote("Be yourself", "Oscar Wilde");
        assert_eq!(formatted, "💬 \"Be yourself\"\n\n— Oscar Wilde");
        assert_eq!(formatted, format_quote("Be yourself", "Oscar Wilde"));
    }

    #[tokio::test]
    async fn english_quote_skips_translation() {
        let translator = Arc::new(CountingTranslator::failing_after(0));
        let p = pipeline(
            Arc::new(StaticProvider::new("Be yourself", "Oscar Wilde")),
            translator.clone(),
        );

        let out = p.formatted_quote(Language::En).await.unwrap();
        assert_eq!(out, "💬 \"Be yourself\"\n\n— Oscar Wilde");
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn russian_quote_translates_text_and_author() {
        let translator = MappingTranslator::new(vec![
            ("Be yourself", "Будь собой"),
            ("Oscar Wilde", "Оскар Уайльд"),
        ]);
        let p = pipeline(
            Arc::new(StaticProvider::new("Be yourself", "Oscar Wilde")),
            Arc::new(translator),
        );

        let out = p.formatted_quote(Language::Ru).await.unwrap();
        assert_eq!(out, "💬 \"Будь собой\"\n\n— Оскар Уайльд");
    }

    #[tokio::test]
    async fn author_translation_failure_yields_no_partial_quote() {
        // First call (text) succeeds, second (author) fails.
        let translator = Arc::new(CountingTranslator::failing_after(1));
        let p = pipeline(
            Arc::new(StaticProvider::new("Be yourself", "Oscar Wilde")),
            translator.clone(),
        );

        let err = p.formatted_quote(Language::Ru).await.unwrap_err();
        assert!(matches!(err, BotError::TranslationFailed(_)));
        assert_eq!(translator.calls(), 2);
    }

    #[tokio::test]
    async fn repeated_provider_failures_are_idempotent() {
        let provider = Arc::new(FailingProvider::default());
        let p = pipeline(provider.clone(), Arc::new(CountingTranslator::failing_after(0)));

        for _ in 0..2 {
            let err = p.formatted_quote(Language::Ru).await.unwrap_err();
            assert!(matches!(err, BotError::SourceUnavailable(_)));
        }
        // One provider call per invocation, no hidden retries.
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn empty_quote_from_provider_is_rejected() {
        let p = pipeline(
            Arc::new(StaticProvider::new("", "Oscar Wilde")),
            Arc::new(CountingTranslator::failing_after(0)),
        );

        let err = p.formatted_quote(Language::En).await.unwrap_err();
        assert!(matches!(err, BotError::SourceUnavailable(_)));
    }
}
