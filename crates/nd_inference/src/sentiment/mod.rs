use std::fmt;
use std::sync::Arc;

use nd_core::{BinaryLabel, SentimentLabel, SentimentSignal, SignalReading, SUMMARY_UNAVAILABLE};
use tracing::{debug, warn};

pub mod bayes;
pub mod distilbert;
pub mod lexicon;

pub use bayes::NaiveBayesClassifier;
pub use distilbert::DistilBertSentiment;
pub use lexicon::LexiconScorer;

pub const DEFAULT_POLARITY_THRESHOLD: f64 = 0.05;

/// Turns the readings of every signal into one label.
pub trait AgreementRule: Send + Sync {
    fn decide(&self, readings: &[SignalReading]) -> SentimentLabel;
}

/// Commits to a direction only when every signal points that way.
///
/// Polarities inside `(-threshold, threshold)` abstain, so they force `Neutral`.
#[derive(Debug, Clone, Copy)]
pub struct UnanimousAgreement {
    pub polarity_threshold: f64,
}

impl Default for UnanimousAgreement {
    fn default() -> Self {
        Self {
            polarity_threshold: DEFAULT_POLARITY_THRESHOLD,
        }
    }
}

impl UnanimousAgreement {
    fn direction(&self, reading: &SignalReading) -> Option<BinaryLabel> {
        match *reading {
            SignalReading::Polarity(p) if p >= self.polarity_threshold => Some(BinaryLabel::Positive),
            SignalReading::Polarity(p) if p <= -self.polarity_threshold => Some(BinaryLabel::Negative),
            SignalReading::Polarity(_) => None,
            SignalReading::Label(label) => Some(label),
        }
    }
}

impl AgreementRule for UnanimousAgreement {
    fn decide(&self, readings: &[SignalReading]) -> SentimentLabel {
        let mut directions = readings.iter().map(|r| self.direction(r));
        let Some(Some(first)) = directions.next() else {
            return SentimentLabel::Neutral;
        };
        if directions.all(|d| d == Some(first)) {
            match first {
                BinaryLabel::Positive => SentimentLabel::Positive,
                BinaryLabel::Negative => SentimentLabel::Negative,
            }
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Combines independent sentiment signals through an agreement rule.
pub struct SentimentClassifier {
    signals: Vec<Arc<dyn SentimentSignal>>,
    rule: Box<dyn AgreementRule>,
}

impl fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("signals", &self.signal_names())
            .field("rule", &"<dyn AgreementRule>")
            .finish()
    }
}

impl SentimentClassifier {
    pub fn new(signals: Vec<Arc<dyn SentimentSignal>>) -> Self {
        Self {
            signals,
            rule: Box::new(UnanimousAgreement::default()),
        }
    }

    pub fn with_rule(mut self, rule: impl AgreementRule + 'static) -> Self {
        self.rule = Box::new(rule);
        self
    }

    pub fn signal_names(&self) -> Vec<&str> {
        self.signals.iter().map(|s| s.name()).collect()
    }

    /// Labels `text`. Empty text and the unavailable-summary placeholder are
    /// `Neutral` without consulting any signal; a failing signal also yields
    /// `Neutral`.
    pub async fn classify(&self, text: &str) -> SentimentLabel {
        if text.trim().is_empty() || text == SUMMARY_UNAVAILABLE || self.signals.is_empty() {
            return SentimentLabel::Neutral;
        }

        let mut readings = Vec::with_capacity(self.signals.len());
        for signal in &self.signals {
            match signal.read(text).await {
                Ok(reading) => {
                    debug!("🎭 {} reading: {:?}", signal.name(), reading);
                    readings.push(reading);
                }
                Err(e) => {
                    warn!("⚠️ Sentiment signal {} failed, falling back to Neutral: {}", signal.name(), e);
                    return SentimentLabel::Neutral;
                }
            }
        }
        self.rule.decide(&readings)
    }
}
