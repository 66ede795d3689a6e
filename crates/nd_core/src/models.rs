use async_trait::async_trait;
use crate::types::Entity;
use crate::Result;

/// Direction reported by a binary sentiment classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryLabel {
    Positive,
    Negative,
}

impl BinaryLabel {
    /// Parses labels such as `POSITIVE`, `negative` or `LABEL_1`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_1" => Some(BinaryLabel::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Some(BinaryLabel::Negative),
            _ => None,
        }
    }
}

/// What a single sentiment signal says about a text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalReading {
    /// Lexicon-style polarity in `[-1, 1]`.
    Polarity(f64),
    /// Learned classifier output.
    Label(BinaryLabel),
}

#[async_trait]
pub trait SentimentSignal: Send + Sync {
    fn name(&self) -> &str;

    /// Reads the sentiment of `text`
    async fn read(&self, text: &str) -> Result<SignalReading>;
}

#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Returns entities in the order they appear in `text`.
    async fn recognize(&self, text: &str) -> Result<Vec<Entity>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary_label() {
        assert_eq!(BinaryLabel::parse("POSITIVE"), Some(BinaryLabel::Positive));
        assert_eq!(BinaryLabel::parse("negative"), Some(BinaryLabel::Negative));
        assert_eq!(BinaryLabel::parse("LABEL_1"), Some(BinaryLabel::Positive));
        assert_eq!(BinaryLabel::parse("MIXED"), None);
    }
}
