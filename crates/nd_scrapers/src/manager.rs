use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use nd_core::{
    AnalyzedArticle, Article, ArticleSource, ContentExtractor, DigestConfig, DigestOutcome,
    DigestReport, Error, Result,
};
use nd_inference::{aggregate, ModelRegistry, SentimentClassifier, TopicExtractor};
use nd_narration::NarrationRenderer;

use crate::extractor::{summarize, ReadabilityExtractor};
use crate::scrapers::BbcSearchSource;

/// Runs the per-company pipeline: search, summarize, classify, extract
/// topics, compare and optionally narrate.
pub struct DigestManager {
    config: DigestConfig,
    source: Arc<dyn ArticleSource>,
    extractor: Arc<dyn ContentExtractor>,
    classifier: SentimentClassifier,
    topics: TopicExtractor,
    narrator: Option<NarrationRenderer>,
}

impl fmt::Debug for DigestManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestManager")
            .field("source", &self.source.source())
            .field("classifier", &self.classifier)
            .field("topics", &self.topics)
            .field("narrator", &self.narrator)
            .finish()
    }
}

impl DigestManager {
    pub fn new(
        config: DigestConfig,
        source: Arc<dyn ArticleSource>,
        extractor: Arc<dyn ContentExtractor>,
        classifier: SentimentClassifier,
        topics: TopicExtractor,
    ) -> Self {
        Self {
            config,
            source,
            extractor,
            classifier,
            topics,
            narrator: None,
        }
    }

    /// BBC search, readability extraction and the model backends selected in `models`.
    pub fn from_config(
        config: DigestConfig,
        models: &nd_inference::Config,
        registry: &ModelRegistry,
    ) -> Result<Self> {
        let client = config.http_client()?;
        let source = Arc::new(BbcSearchSource::new(client.clone(), &config));
        let extractor = Arc::new(ReadabilityExtractor::new(client.clone()));
        let classifier = nd_inference::create_classifier(models, registry, client.clone(), &config)?;
        let topics = nd_inference::create_topic_extractor(models, registry, client, &config)?;
        Ok(Self::new(config, source, extractor, classifier, topics))
    }

    pub fn with_narrator(mut self, narrator: NarrationRenderer) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Lists what the source returns for `company`, without analysing anything.
    pub async fn articles(&self, company: &str) -> Result<Vec<Article>> {
        let company = validate_company(company)?;
        Ok(self.source.fetch(company).await)
    }

    pub async fn analyze(&self, article: &Article) -> AnalyzedArticle {
        info!("📰 Processing article: {}", article.title);
        let summary = summarize(self.extractor.as_ref(), &article.url, self.config.summary_chars).await;
        let sentiment = self.classifier.classify(&summary).await;
        let topics = self.topics.extract(&summary).await;
        info!("✨ {} -> {} {:?}", article.title, sentiment, topics);
        AnalyzedArticle {
            title: article.title.clone(),
            url: article.url.clone(),
            summary,
            sentiment,
            topics,
        }
    }

    /// Analyses a single article given by URL.
    pub async fn analyze_url(&self, title: &str, url: &str) -> AnalyzedArticle {
        self.analyze(&Article::new(title, url)).await
    }

    pub async fn run(&self, company: &str) -> Result<DigestOutcome> {
        let company = validate_company(company)?;
        let articles = self.source.fetch(company).await;
        if articles.is_empty() {
            info!("🔍 No articles found for {}", company);
            return Ok(DigestOutcome::NoResults {
                company: company.to_string(),
            });
        }

        info!("📑 Analysing {} articles for {}", articles.len(), company);
        let mut analyzed = Vec::with_capacity(articles.len());
        for (i, article) in articles.iter().enumerate() {
            info!("📝 Article {}/{}", i + 1, articles.len());
            analyzed.push(self.analyze(article).await);
        }

        let analysis = aggregate(&analyzed)?;
        let mut report = DigestReport {
            company: company.to_string(),
            generated_at: Utc::now(),
            articles: analyzed,
            analysis,
            audio: None,
        };

        if let Some(narrator) = &self.narrator {
            match narrator.render(&report.narration_text(), &self.config.audio_path).await {
                Ok(path) => report.audio = Some(path),
                Err(e) => warn!("⚠️ Narration failed, continuing without audio: {}", e),
            }
        }

        info!("✅ Digest completed for {}: {}", company, report.analysis.final_statement);
        Ok(DigestOutcome::Report(Box::new(report)))
    }
}

fn validate_company(company: &str) -> Result<&str> {
    let company = company.trim();
    if company.is_empty() {
        return Err(Error::InvalidInput("Company name must not be empty".to_string()));
    }
    Ok(company)
}
