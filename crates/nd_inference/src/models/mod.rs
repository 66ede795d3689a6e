use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use reqwest::Client;
use tracing::info;

use nd_core::{DigestConfig, EntityRecognizer, Result, SentimentSignal};

use crate::sentiment::distilbert::DEFAULT_MODEL_DIR;
use crate::sentiment::{
    DistilBertSentiment, LexiconScorer, NaiveBayesClassifier, SentimentClassifier, UnanimousAgreement,
};
use crate::topics::{HeuristicRecognizer, TopicExtractor};

pub mod dummy;
pub mod huggingface;

pub use huggingface::{HuggingFaceClassifier, HuggingFaceRecognizer};

/// Which learned classifier backs the second sentiment signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentBackend {
    /// DistilBERT SST-2 run in-process.
    #[default]
    Local,
    /// Naive Bayes trained on a bundled corpus, for hosts that cannot fetch model weights.
    NaiveBayes,
    HuggingFace,
}

impl FromStr for SentimentBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "distilbert" => Ok(SentimentBackend::Local),
            "naive-bayes" | "bayes" | "offline" => Ok(SentimentBackend::NaiveBayes),
            "huggingface" | "hf" => Ok(SentimentBackend::HuggingFace),
            other => Err(format!("Unknown sentiment backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityBackend {
    #[default]
    Heuristic,
    HuggingFace,
}

impl FromStr for EntityBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heuristic" | "local" => Ok(EntityBackend::Heuristic),
            "huggingface" | "hf" => Ok(EntityBackend::HuggingFace),
            other => Err(format!("Unknown entity backend: {}", other)),
        }
    }
}

#[derive(Clone, Default)]
pub struct Config {
    pub sentiment_backend: SentimentBackend,
    pub entity_backend: EntityBackend,
    pub api_key: Option<String>,
    /// Where local model files are cached; `models/distilbert-sst2` when unset.
    pub model_dir: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sentiment_backend", &self.sentiment_backend)
            .field("entity_backend", &self.entity_backend)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_dir", &self.model_dir)
            .finish()
    }
}

/// Local models, built on first use and shared for the rest of the process.
#[derive(Default)]
pub struct ModelRegistry {
    lexicon: OnceCell<Arc<LexiconScorer>>,
    bayes: OnceCell<Arc<NaiveBayesClassifier>>,
    distilbert: OnceCell<Arc<DistilBertSentiment>>,
    recognizer: OnceCell<Arc<HeuristicRecognizer>>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("lexicon_loaded", &self.lexicon.get().is_some())
            .field("bayes_loaded", &self.bayes.get().is_some())
            .field("distilbert", &self.distilbert.get())
            .field("recognizer_loaded", &self.recognizer.get().is_some())
            .finish()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lexicon(&self) -> Arc<LexiconScorer> {
        self.lexicon
            .get_or_init(|| {
                let scorer = LexiconScorer::new();
                info!("📚 Loaded sentiment lexicon ({} entries)", scorer.len());
                Arc::new(scorer)
            })
            .clone()
    }

    /// The Naive Bayes model; `window` only applies on the first call.
    pub fn bayes(&self, window: usize) -> Arc<NaiveBayesClassifier> {
        self.bayes
            .get_or_init(|| {
                let model = NaiveBayesClassifier::pretrained().with_window(window);
                info!("🧠 Trained Naive Bayes classifier ({} terms)", model.vocabulary_size());
                Arc::new(model)
            })
            .clone()
    }

    /// The DistilBERT classifier. Weights are fetched and loaded on its first reading;
    /// the arguments only apply on the first call.
    pub fn distilbert(&self, client: Client, model_dir: PathBuf, window: usize) -> Arc<DistilBertSentiment> {
        self.distilbert
            .get_or_init(|| {
                info!("🧠 DistilBERT sentiment model cached in {}", model_dir.display());
                Arc::new(DistilBertSentiment::new(client, model_dir).with_window(window))
            })
            .clone()
    }

    pub fn heuristic_recognizer(&self) -> Arc<HeuristicRecognizer> {
        self.recognizer
            .get_or_init(|| {
                info!("🔎 Using heuristic entity recognizer");
                Arc::new(HeuristicRecognizer::new())
            })
            .clone()
    }
}

/// Lexicon signal plus the configured learned signal, combined unanimously.
pub fn create_classifier(
    config: &Config,
    registry: &ModelRegistry,
    client: Client,
    digest: &DigestConfig,
) -> Result<SentimentClassifier> {
    let learned: Arc<dyn SentimentSignal> = match config.sentiment_backend {
        SentimentBackend::Local => {
            let model_dir = config
                .model_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
            registry.distilbert(client, model_dir, digest.classifier_window)
        }
        SentimentBackend::NaiveBayes => registry.bayes(digest.classifier_window),
        SentimentBackend::HuggingFace => Arc::new(
            HuggingFaceClassifier::new(client, config.api_key.clone())?
                .with_window(digest.classifier_window),
        ),
    };
    let lexicon: Arc<dyn SentimentSignal> = registry.lexicon();
    info!("🤖 Sentiment signals: {} + {}", lexicon.name(), learned.name());
    Ok(
        SentimentClassifier::new(vec![lexicon, learned]).with_rule(UnanimousAgreement {
            polarity_threshold: digest.polarity_threshold,
        }),
    )
}

pub fn create_recognizer(
    config: &Config,
    registry: &ModelRegistry,
    client: Client,
) -> Result<Arc<dyn EntityRecognizer>> {
    let recognizer: Arc<dyn EntityRecognizer> = match config.entity_backend {
        EntityBackend::Heuristic => registry.heuristic_recognizer(),
        EntityBackend::HuggingFace => {
            Arc::new(HuggingFaceRecognizer::new(client, config.api_key.clone())?)
        }
    };
    Ok(recognizer)
}

pub fn create_topic_extractor(
    config: &Config,
    registry: &ModelRegistry,
    client: Client,
    digest: &DigestConfig,
) -> Result<TopicExtractor> {
    let recognizer = create_recognizer(config, registry, client)?;
    info!("🏷️ Entity recognizer: {}", recognizer.name());
    Ok(TopicExtractor::new(recognizer).with_max_topics(digest.max_topics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::SentimentLabel;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("local".parse::<SentimentBackend>().unwrap(), SentimentBackend::Local);
        assert_eq!("offline".parse::<SentimentBackend>().unwrap(), SentimentBackend::NaiveBayes);
        assert_eq!("naive-bayes".parse::<SentimentBackend>().unwrap(), SentimentBackend::NaiveBayes);
        assert_eq!("HuggingFace".parse::<SentimentBackend>().unwrap(), SentimentBackend::HuggingFace);
        assert_eq!("hf".parse::<EntityBackend>().unwrap(), EntityBackend::HuggingFace);
        assert!("spacy".parse::<EntityBackend>().is_err());
    }

    #[test]
    fn test_registry_shares_models() {
        let registry = ModelRegistry::new();
        assert!(Arc::ptr_eq(&registry.lexicon(), &registry.lexicon()));
        assert!(Arc::ptr_eq(&registry.bayes(512), &registry.bayes(64)));
        let first = registry.distilbert(Client::new(), PathBuf::from("a"), 512);
        let second = registry.distilbert(Client::new(), PathBuf::from("b"), 64);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.model_dir(), std::path::Path::new("a"));
        assert!(Arc::ptr_eq(&registry.heuristic_recognizer(), &registry.heuristic_recognizer()));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config {
            api_key: Some("hf_secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hf_secret"));
    }

    #[tokio::test]
    async fn test_local_factories() {
        let registry = ModelRegistry::new();
        let digest = DigestConfig::default();
        let config = Config::default();
        let classifier = create_classifier(&config, &registry, Client::new(), &digest).unwrap();
        assert_eq!(classifier.signal_names(), vec!["lexicon", "distilbert"]);
        // empty text never reaches the model, so nothing is downloaded
        assert_eq!(classifier.classify("").await, SentimentLabel::Neutral);

        let offline = Config {
            sentiment_backend: SentimentBackend::NaiveBayes,
            ..Config::default()
        };
        let classifier = create_classifier(&offline, &registry, Client::new(), &digest).unwrap();
        assert_eq!(classifier.signal_names(), vec!["lexicon", "naive-bayes"]);
        assert_eq!(
            classifier.classify("Profits soared and investors cheered the excellent results.").await,
            SentimentLabel::Positive
        );

        let extractor = create_topic_extractor(&config, &registry, Client::new(), &digest).unwrap();
        assert_eq!(extractor.extract("Investors praised Nvidia.").await, vec!["Nvidia"]);
    }

    #[test]
    fn test_remote_backends_need_a_key() {
        let registry = ModelRegistry::new();
        let config = Config {
            sentiment_backend: SentimentBackend::HuggingFace,
            entity_backend: EntityBackend::HuggingFace,
            api_key: None,
            model_dir: None,
        };
        let digest = DigestConfig::default();
        assert!(create_classifier(&config, &registry, Client::new(), &digest).is_err());
        assert!(create_recognizer(&config, &registry, Client::new()).is_err());
    }
}
