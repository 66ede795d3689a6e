pub mod config;
pub mod error;
pub mod models;
pub mod narration;
pub mod source;
pub mod text;
pub mod types;

pub use config::{DigestConfig, PairingStrategy};
pub use error::Error;
pub use models::{BinaryLabel, EntityRecognizer, SentimentSignal, SignalReading};
pub use narration::{SpeechSynthesizer, Translator};
pub use source::{ArticleSource, ContentExtractor};
pub use text::truncate_chars;
pub use types::{
    AggregateReport, AnalyzedArticle, Article, ComparisonEntry, DigestOutcome, DigestReport,
    Entity, EntityKind, SentimentLabel, SUMMARY_UNAVAILABLE,
};
pub type Result<T> = std::result::Result<T, Error>;
