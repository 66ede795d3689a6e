use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use nd_core::{Error, Result, SpeechSynthesizer, Translator};

pub const TRANSLATE_BASE_URL: &str = "https://translate.googleapis.com";
pub const SPEECH_BASE_URL: &str = "https://translate.google.com";

/// Longest request the free translate endpoint accepts.
pub const TRANSLATE_CHUNK_CHARS: usize = 5000;
/// Longest text the speech endpoint reads in one request.
pub const SPEECH_CHUNK_CHARS: usize = 100;

/// Splits `text` into pieces of at most `max_chars` characters, breaking on
/// whitespace where possible.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars.max(1)) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: TRANSLATE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn translate_chunk(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Narration(format!(
                "Translation request failed with status {}",
                response.status()
            )));
        }
        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}

/// Joins the translated segments of a `translate_a/single` response:
/// `[[["translated", "original", ...], ...], ...]`.
pub fn parse_translation(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Narration(format!("Unexpected translation response: {}", body)))?;
    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if translated.trim().is_empty() {
        return Err(Error::Narration("Translation came back empty".to_string()));
    }
    Ok(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        if source == target {
            return Ok(text.to_string());
        }
        let mut translated = Vec::new();
        for chunk in chunk_text(text, TRANSLATE_CHUNK_CHARS) {
            translated.push(self.translate_chunk(&chunk, source, target).await?);
        }
        debug!("🌐 Translated {} chars into {}", text.chars().count(), target);
        Ok(translated.join(" "))
    }
}

#[derive(Debug, Clone)]
pub struct GoogleSpeech {
    client: Client,
    base_url: String,
}

impl GoogleSpeech {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: SPEECH_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = chunk_text(text, SPEECH_CHUNK_CHARS);
        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = self
                .client
                .get(format!("{}/translate_tts", self.base_url))
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", language),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(Error::Narration(format!(
                    "Speech request {} failed with status {}",
                    idx,
                    response.status()
                )));
            }
            // MP3 frames can be concatenated as-is.
            audio.extend_from_slice(&response.bytes().await?);
        }
        debug!("🔊 Synthesized {} chunks, {} bytes", chunks.len(), audio.len());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunks_respect_limit() {
        let text = "The Latest news about the company is mostly POSITIVE and investors are watching closely";
        let chunks = chunk_text(text, 20);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_long_words_are_split() {
        let chunks = chunk_text("abcdefghij xy", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_chunks_count_characters() {
        let text = "कंपनी के बारे में ताज़ा खबर";
        let chunks = chunk_text(text, 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert!(chunk_text("   ", 10).is_empty());
    }

    #[test]
    fn test_parse_translation() {
        let body = json!([[["नमस्ते ", "Hello ", null], ["दुनिया", "world", null]], null, "en"]);
        assert_eq!(parse_translation(&body).unwrap(), "नमस्ते दुनिया");
        assert!(parse_translation(&json!({"error": 1})).is_err());
        assert!(parse_translation(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_same_language_is_passthrough() {
        let translator = GoogleTranslator::new(Client::new()).with_base_url("http://127.0.0.1:9");
        assert_eq!(translator.translate("hello", "en", "en").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_unreachable_endpoints_fail() {
        let translator = GoogleTranslator::new(Client::new()).with_base_url("http://127.0.0.1:9");
        assert!(translator.translate("hello", "en", "hi").await.is_err());
        let speech = GoogleSpeech::new(Client::new()).with_base_url("http://127.0.0.1:9");
        assert!(speech.synthesize("hello", "hi").await.is_err());
    }
}
