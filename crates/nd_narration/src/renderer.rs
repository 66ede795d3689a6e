use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use nd_core::{DigestConfig, Error, Result, SpeechSynthesizer, Translator};

use crate::google::{GoogleSpeech, GoogleTranslator};

/// Translates a report statement and writes it out as spoken audio.
pub struct NarrationRenderer {
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    source_language: String,
    target_language: String,
}

impl fmt::Debug for NarrationRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrationRenderer")
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .finish()
    }
}

impl NarrationRenderer {
    pub fn new(translator: Arc<dyn Translator>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            translator,
            synthesizer,
            source_language: "en".to_string(),
            target_language: "hi".to_string(),
        }
    }

    /// Google translation and speech, with languages taken from `config`.
    pub fn google(client: Client, config: &DigestConfig) -> Self {
        Self::new(
            Arc::new(GoogleTranslator::new(client.clone())),
            Arc::new(GoogleSpeech::new(client)),
        )
        .with_languages(&config.source_language, &config.target_language)
    }

    pub fn with_languages(mut self, source: &str, target: &str) -> Self {
        self.source_language = source.to_string();
        self.target_language = target.to_string();
        self
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Writes the narrated `text` to `output` and returns the written path.
    pub async fn render(&self, text: &str, output: &Path) -> Result<PathBuf> {
        if text.trim().is_empty() {
            return Err(Error::Narration("Nothing to narrate".to_string()));
        }

        info!("🌐 Translating narration into {}", self.target_language);
        let translated = self
            .translator
            .translate(text, &self.source_language, &self.target_language)
            .await
            .map_err(|e| Error::Narration(format!("Translation failed: {}", e)))?;

        info!("🔊 Synthesizing speech");
        let audio = self
            .synthesizer
            .synthesize(&translated, &self.target_language)
            .await
            .map_err(|e| Error::Narration(format!("Speech synthesis failed: {}", e)))?;
        if audio.is_empty() {
            return Err(Error::Narration("Speech synthesis returned no audio".to_string()));
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Narration(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(output, &audio)
            .await
            .map_err(|e| Error::Narration(format!("Cannot write {}: {}", output.display(), e)))?;
        info!("✨ Audio written to {}", output.display());
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockTranslator;

    #[async_trait]
    impl Translator for MockTranslator {
        async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
            Ok(format!("[{}] {}", target, text))
        }
    }

    #[derive(Default)]
    struct MockSpeech {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for MockSpeech {
        async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
            self.seen
                .lock()
                .unwrap()
                .push((text.to_string(), language.to_string()));
            Ok(text.as_bytes().to_vec())
        }
    }

    struct BrokenTranslator;

    #[async_trait]
    impl Translator for BrokenTranslator {
        async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
            Err(Error::Scraping("offline".to_string()))
        }
    }

    struct SilentSpeech;

    #[async_trait]
    impl SpeechSynthesizer for SilentSpeech {
        async fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_render_writes_audio() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("speech.mp3");
        let speech = Arc::new(MockSpeech::default());
        let renderer = NarrationRenderer::new(Arc::new(MockTranslator), speech.clone());

        let written = renderer.render("Company: Tesla.", &output).await.unwrap();
        assert_eq!(written, output);
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(bytes, b"[hi] Company: Tesla.");

        let seen = speech.seen.lock().unwrap();
        assert_eq!(seen[0], ("[hi] Company: Tesla.".to_string(), "hi".to_string()));
    }

    #[tokio::test]
    async fn test_render_uses_configured_languages() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("speech.mp3");
        let renderer = NarrationRenderer::new(Arc::new(MockTranslator), Arc::new(MockSpeech::default()))
            .with_languages("en", "fr");
        renderer.render("Bonjour", &output).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"[fr] Bonjour");
        assert_eq!(renderer.target_language(), "fr");
    }

    #[tokio::test]
    async fn test_failures_are_narration_errors() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("speech.mp3");

        let renderer = NarrationRenderer::new(Arc::new(BrokenTranslator), Arc::new(MockSpeech::default()));
        assert!(matches!(renderer.render("text", &output).await, Err(Error::Narration(_))));

        let renderer = NarrationRenderer::new(Arc::new(MockTranslator), Arc::new(SilentSpeech));
        assert!(matches!(renderer.render("text", &output).await, Err(Error::Narration(_))));
        assert!(matches!(renderer.render("  ", &output).await, Err(Error::Narration(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unwritable_output_is_a_narration_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let renderer = NarrationRenderer::new(Arc::new(MockTranslator), Arc::new(MockSpeech::default()));

        let err = renderer.render("text", &blocker.join("speech.mp3")).await.unwrap_err();
        assert!(matches!(err, Error::Narration(_)), "{:?}", err);

        let err = renderer.render("text", dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Narration(_)), "{:?}", err);
    }
}
