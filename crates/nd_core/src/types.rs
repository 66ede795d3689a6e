use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder summary used whenever the article body could not be extracted.
pub const SUMMARY_UNAVAILABLE: &str = "Summary not available.";

/// A search hit as scraped from the article source. No deduplication is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub sentiment: SentimentLabel,
    /// At most three topics, most relevant first.
    pub topics: Vec<String>,
}

/// Topic and sentiment diff between two neighbouring articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    #[serde(rename = "Comparison")]
    pub comparison: String,
    #[serde(rename = "Sentiment Impact")]
    pub sentiment_impact: String,
    #[serde(rename = "Topic Overlap")]
    pub topic_overlap: Vec<String>,
    #[serde(rename = "Unique Topics in Article 1")]
    pub unique_topics_left: Vec<String>,
    #[serde(rename = "Unique Topics in Article 2")]
    pub unique_topics_right: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Label counts in first-seen order. Labels that never occur are absent.
    #[serde(rename = "Sentiment Distribution")]
    pub sentiment_distribution: IndexMap<SentimentLabel, usize>,
    #[serde(rename = "Coverage Differences")]
    pub coverage_differences: Vec<ComparisonEntry>,
    #[serde(rename = "Final Sentiment")]
    pub final_sentiment: SentimentLabel,
    #[serde(rename = "final sentiments")]
    pub final_statement: String,
}

impl AggregateReport {
    /// Number of articles the report was built from.
    pub fn article_count(&self) -> usize {
        self.sentiment_distribution.values().sum()
    }
}

/// Everything produced for one company query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestReport {
    pub company: String,
    pub generated_at: DateTime<Utc>,
    pub articles: Vec<AnalyzedArticle>,
    pub analysis: AggregateReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
}

impl DigestReport {
    /// Text handed to the narration step.
    pub fn narration_text(&self) -> String {
        format!(
            "Company: {}. Sentiment Report: {}",
            self.company, self.analysis.final_statement
        )
    }
}

#[derive(Debug, Clone)]
pub enum DigestOutcome {
    /// The source returned no articles; nothing downstream was attempted.
    NoResults { company: String },
    Report(Box<DigestReport>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Organization,
    GeopoliticalEntity,
    Location,
    Product,
    Event,
    Other,
}

impl EntityKind {
    /// Kinds that are worth reporting as article topics.
    pub fn is_topical(&self) -> bool {
        matches!(
            self,
            EntityKind::Organization
                | EntityKind::Product
                | EntityKind::GeopoliticalEntity
                | EntityKind::Person
                | EntityKind::Event
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => write!(f, "PERSON"),
            EntityKind::Organization => write!(f, "ORG"),
            EntityKind::GeopoliticalEntity => write!(f, "GPE"),
            EntityKind::Location => write!(f, "LOC"),
            EntityKind::Product => write!(f, "PRODUCT"),
            EntityKind::Event => write!(f, "EVENT"),
            EntityKind::Other => write!(f, "OTHER"),
        }
    }
}

/// A named entity; `text` is always a verbatim slice of the analysed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(text: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}
