use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns encoded audio (MP3) speaking `text` in `language`.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}
