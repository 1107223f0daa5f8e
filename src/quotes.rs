use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BotError, Result};

/// A motivational saying. Immutable once constructed; translation produces
/// a new `Quote` rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }

    /// An empty text or author is never a valid quote.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() || self.author.trim().is_empty()
    }
}

/// Source of quotes in their native (English) form.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn get_quote(&self) -> Result<Quote>;
}

/// ZenQuotes returns an array with a single element for the random endpoint.
#[derive(Debug, Deserialize)]
struct ZenQuoteResponse {
    #[serde(rename = "q")]
    quote: String,
    #[serde(rename = "a")]
    author: String,
}

/// Client for the ZenQuotes-style random quote API.
pub struct ZenQuotesClient {
    client: reqwest::Client,
    api_url: String,
}

impl ZenQuotesClient {
    pub fn new(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }
}

#[async_trait]
impl QuoteProvider for ZenQuotesClient {
    async fn get_quote(&self) -> Result<Quote> {
        debug!("Fetching quote from {}", self.api_url);

        let response = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .map_err(|e| BotError::SourceUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::SourceUnavailable(format!(
                "unexpected status {status}"
            )));
        }

        let body: Vec<ZenQuoteResponse> = response
            .json()
            .await
            .map_err(|e| BotError::SourceUnavailable(format!("invalid response body: {e}")))?;

        quote_from_response(body)
    }
}

fn quote_from_response(body: Vec<ZenQuoteResponse>) -> Result<Quote> {
    let first = body
        .into_iter()
        .next()
        .ok_or_else(|| BotError::SourceUnavailable("empty quote result".into()))?;

    let quote = Quote::new(first.quote, first.author);
    if quote.is_empty() {
        return Err(BotError::SourceUnavailable(
            "quote with empty text or author".into(),
        ));
    }
    Ok(quote)
}
