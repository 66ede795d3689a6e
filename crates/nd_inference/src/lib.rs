pub mod divergence;
pub mod models;
pub mod sentiment;
pub mod topics;

pub use divergence::aggregate;
pub use models::{
    create_classifier, create_recognizer, create_topic_extractor, Config, EntityBackend,
    ModelRegistry, SentimentBackend,
};
pub use sentiment::{AgreementRule, SentimentClassifier, UnanimousAgreement};
pub use topics::TopicExtractor;

pub mod prelude {
    pub use super::divergence::aggregate;
    pub use super::models::{create_classifier, create_topic_extractor, Config, ModelRegistry};
    pub use super::sentiment::SentimentClassifier;
    pub use super::topics::TopicExtractor;
    pub use nd_core::{AggregateReport, AnalyzedArticle, Error, Result, SentimentLabel};
}
