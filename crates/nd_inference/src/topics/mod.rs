use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use nd_core::{EntityRecognizer, SUMMARY_UNAVAILABLE};
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

pub mod ner;
pub mod stopwords;

pub use ner::HeuristicRecognizer;
pub use stopwords::{is_business_term, is_stopword, BUSINESS_TERMS};

pub const DEFAULT_MAX_TOPICS: usize = 3;

/// Picks a handful of representative topics from a summary.
///
/// Named entities are preferred. When the recognizer finds nothing usable
/// (or fails), the most frequent content words are used instead.
pub struct TopicExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    max_topics: usize,
}

impl fmt::Debug for TopicExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicExtractor")
            .field("recognizer", &self.recognizer.name())
            .field("max_topics", &self.max_topics)
            .finish()
    }
}

impl TopicExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            recognizer,
            max_topics: DEFAULT_MAX_TOPICS,
        }
    }

    pub fn with_max_topics(mut self, max_topics: usize) -> Self {
        self.max_topics = max_topics;
        self
    }

    pub async fn extract(&self, summary: &str) -> Vec<String> {
        if summary.trim().is_empty() || summary == SUMMARY_UNAVAILABLE {
            return Vec::new();
        }

        let entities = match self.recognizer.recognize(summary).await {
            Ok(entities) => entities,
            Err(e) => {
                warn!("⚠️ Entity recognizer {} failed, using word frequency: {}", self.recognizer.name(), e);
                Vec::new()
            }
        };

        let topics: IndexSet<String> = entities
            .into_iter()
            .filter(|e| e.kind.is_topical() && !is_business_term(&e.text))
            .map(|e| e.text)
            .collect();

        if !topics.is_empty() {
            debug!("🏷️ Entity topics: {:?}", topics);
            return topics.into_iter().take(self.max_topics).collect();
        }

        let topics = frequent_words(summary, self.max_topics);
        debug!("🏷️ Frequency topics: {:?}", topics);
        topics
    }
}

/// Most frequent alphabetic content words, ties kept in order of first appearance.
pub fn frequent_words(text: &str, limit: usize) -> Vec<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for word in text.unicode_words().map(ner::strip_possessive) {
        if word.chars().all(char::is_alphabetic) && !is_stopword(word) && !is_business_term(word) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _)| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dummy::{FailingRecognizer, StaticRecognizer};
    use nd_core::{Entity, EntityKind};

    fn extractor(entities: Vec<Entity>) -> TopicExtractor {
        TopicExtractor::new(Arc::new(StaticRecognizer::new(entities)))
    }

    #[tokio::test]
    async fn test_entities_are_preferred() {
        let extractor = extractor(vec![
            Entity::new("Tesla", EntityKind::Organization),
            Entity::new("Musk", EntityKind::Person),
            Entity::new("Monday", EntityKind::Other),
        ]);
        let topics = extractor.extract("On Monday Tesla said Musk would stay.").await;
        assert_eq!(topics, vec!["Tesla", "Musk"]);
    }

    #[tokio::test]
    async fn test_business_terms_and_duplicates_dropped() {
        let extractor = extractor(vec![
            Entity::new("Market", EntityKind::Organization),
            Entity::new("Apple", EntityKind::Organization),
            Entity::new("China", EntityKind::GeopoliticalEntity),
            Entity::new("Tim Cook", EntityKind::Person),
            Entity::new("Paris Olympics", EntityKind::Event),
        ]);
        let summary = "Market watchers said Apple and Tim Cook see China and the Paris Olympics as key.";
        let topics = extractor.extract(summary).await;
        assert_eq!(topics, vec!["Apple", "Tim Cook", "China"]);
    }

    #[tokio::test]
    async fn test_frequency_fallback() {
        let extractor = extractor(vec![]);
        let summary = "battery battery factory factory factory recall the the market market market";
        let topics = extractor.extract(summary).await;
        assert_eq!(topics, vec!["factory", "battery", "recall"]);
    }

    #[tokio::test]
    async fn test_recognizer_failure_falls_back() {
        let extractor = TopicExtractor::new(Arc::new(FailingRecognizer));
        let topics = extractor.extract("chips chips shortage").await;
        assert_eq!(topics, vec!["chips", "shortage"]);
    }

    #[tokio::test]
    async fn test_placeholder_and_empty_summary() {
        let extractor = TopicExtractor::new(Arc::new(FailingRecognizer));
        assert!(extractor.extract("").await.is_empty());
        assert!(extractor.extract(SUMMARY_UNAVAILABLE).await.is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_topics_come_from_summary() {
        let extractor = TopicExtractor::new(Arc::new(HeuristicRecognizer::new()));
        let summary = "Tesla boss Elon Musk said the SEC had opened an inquiry in the US.";
        let topics = extractor.extract(summary).await;
        assert_eq!(topics, vec!["Tesla", "Elon Musk", "SEC"]);
        for topic in &topics {
            assert!(summary.contains(topic.as_str()));
            assert!(!is_business_term(topic));
        }
    }

    #[tokio::test]
    async fn test_heuristic_keeps_company_and_skips_dates() {
        let extractor = TopicExtractor::new(Arc::new(HeuristicRecognizer::new()));
        let topics = extractor.extract("Boeing said on Monday that deliveries fell.").await;
        assert_eq!(topics, vec!["Boeing"]);
        let topics = extractor
            .extract("Tesla Chief Executive Elon Musk said sales rose.")
            .await;
        assert_eq!(topics, vec!["Tesla", "Elon Musk"]);
    }

    #[test]
    fn test_frequent_words_ties_keep_first_occurrence() {
        assert_eq!(frequent_words("zeta alpha zeta alpha beta", 3), vec!["zeta", "alpha", "beta"]);
        assert_eq!(frequent_words("profit 2024 loss-making", 3), vec!["profit", "loss", "making"]);
        assert!(frequent_words("", 3).is_empty());
    }

    #[test]
    fn test_frequent_words_drop_possessive_suffix() {
        assert_eq!(
            frequent_words("boeing's jets boeing\u{2019}s planes jets", 3),
            vec!["boeing", "jets", "planes"]
        );
    }

    #[tokio::test]
    async fn test_possessive_company_survives_fallback() {
        let extractor = extractor(vec![]);
        let topics = extractor
            .extract("Boeing's new jet was grounded. Boeing's shares fell.")
            .await;
        assert_eq!(topics[0], "Boeing");
    }
}
