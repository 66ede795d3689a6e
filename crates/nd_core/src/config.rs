use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// How search-result titles are matched with their links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairingStrategy {
    /// Title `i` goes with link `i`; both lists are truncated to the shorter one.
    #[default]
    Positional,
    /// Each link's title is read from inside the link element itself.
    Scoped,
}

impl FromStr for PairingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positional" => Ok(PairingStrategy::Positional),
            "scoped" => Ok(PairingStrategy::Scoped),
            other => Err(format!("Unknown pairing strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub search_base_url: String,
    pub title_selector: String,
    pub link_selector: String,
    pub headline_selector: String,
    pub pairing: PairingStrategy,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Characters (not bytes) kept from the article body.
    pub summary_chars: usize,
    /// Characters of the summary seen by the learned classifier.
    pub classifier_window: usize,
    pub polarity_threshold: f64,
    pub max_topics: usize,
    pub source_language: String,
    pub target_language: String,
    pub audio_path: PathBuf,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            search_base_url: "https://www.bbc.com".to_string(),
            title_selector: ".sc-87075214-3.cXFiLO".to_string(),
            link_selector: "a[href^=\"/news/articles/\"]".to_string(),
            headline_selector: "h2, [data-testid='card-headline']".to_string(),
            pairing: PairingStrategy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(20),
            summary_chars: 300,
            classifier_window: 512,
            polarity_threshold: 0.05,
            max_topics: 3,
            source_language: "en".to_string(),
            target_language: "hi".to_string(),
            audio_path: PathBuf::from("hindi_speech.mp3"),
        }
    }
}

impl DigestConfig {
    pub fn with_pairing(mut self, pairing: PairingStrategy) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn with_search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    pub fn with_audio_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_path = path.into();
        self
    }

    /// Shared HTTP client for every outbound request of one run.
    pub fn http_client(&self) -> crate::Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.request_timeout)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DigestConfig::default();
        assert_eq!(config.summary_chars, 300);
        assert_eq!(config.classifier_window, 512);
        assert_eq!(config.max_topics, 3);
        assert_eq!(config.pairing, PairingStrategy::Positional);
        assert_eq!(config.target_language, "hi");
    }

    #[test]
    fn test_pairing_from_str() {
        assert_eq!("scoped".parse::<PairingStrategy>().unwrap(), PairingStrategy::Scoped);
        assert_eq!("Positional".parse::<PairingStrategy>().unwrap(), PairingStrategy::Positional);
        assert!("nearest".parse::<PairingStrategy>().is_err());
    }

    #[test]
    fn test_builders() {
        let config = DigestConfig::default()
            .with_pairing(PairingStrategy::Scoped)
            .with_target_language("fr")
            .with_audio_path("out.mp3");
        assert_eq!(config.pairing, PairingStrategy::Scoped);
        assert_eq!(config.target_language, "fr");
        assert_eq!(config.audio_path, PathBuf::from("out.mp3"));
    }
}
