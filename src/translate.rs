use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BotError, Result};

/// Languages the bot can deliver quotes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Ru,
}

impl Language {
    /// Two-letter ISO-style code used by the translation API and by
    /// keyboard callback payloads.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "ru" => Some(Language::Ru),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Translation of a single piece of text between two languages.
///
/// The pipeline calls this twice per quote (text, then author) so the
/// contract stays independent of any particular wire format.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: MyMemoryResponseData,
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponseData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for the MyMemory-style translation API.
pub struct MyMemoryClient {
    client: reqwest::Client,
    api_url: String,
}

impl MyMemoryClient {
    pub fn new(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }
}

#[async_trait]
impl Translator for MyMemoryClient {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        let langpair = format!("{from}|{to}");
        debug!("Translating {} chars ({})", text.len(), langpair);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await
            .map_err(|e| BotError::TranslationFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::TranslationFailed(format!(
                "unexpected status {status}"
            )));
        }

        let body: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| BotError::TranslationFailed(format!("invalid response body: {e}")))?;

        translated_from_response(body)
    }
}

fn translated_from_response(body: MyMemoryResponse) -> Result<String> {
    let translated = body.response_data.translated_text;
    if translated.trim().is_empty() {
        return Err(BotError::TranslationFailed("empty translation result".into()));
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes_round_trip() {
        assert_eq!(Language::from_code("ru"), Some(Language::Ru));
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::Ru.code(), "ru");
    }

    #[test]
    fn parses_the_translated_text() {
        let body: MyMemoryResponse = serde_json::from_str(
            r#"{"responseData":{"translatedText":"Будь собой","match":1.0},"responseStatus":200}"#,
        )
        .unwrap();
        assert_eq!(translated_from_response(body).unwrap(), "Будь собой");
    }

    #[test]
    fn blank_translation_is_an_error() {
        let body: MyMemoryResponse =
            serde_json::from_str(r#"{"responseData":{"translatedText":"  "}}"#).unwrap();
        let err = translated_from_response(body).unwrap_err();
        assert!(matches!(err, BotError::TranslationFailed(_)));
    }
}
