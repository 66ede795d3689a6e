//! Cross-article comparison: how coverage diverges between neighbouring
//! articles and what the overall tone is.

use indexmap::{IndexMap, IndexSet};
use nd_core::{AggregateReport, AnalyzedArticle, ComparisonEntry, Error, Result, SentimentLabel};
use tracing::info;

/// Builds the comparative report for `articles`, which must be non-empty.
///
/// Only adjacent articles are compared, so `n` articles give `n - 1` entries.
/// When several labels share the highest count, the one seen first wins.
pub fn aggregate(articles: &[AnalyzedArticle]) -> Result<AggregateReport> {
    if articles.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut distribution: IndexMap<SentimentLabel, usize> = IndexMap::new();
    for article in articles {
        *distribution.entry(article.sentiment).or_insert(0) += 1;
    }

    let coverage_differences: Vec<ComparisonEntry> = articles
        .windows(2)
        .map(|pair| compare(&pair[0], &pair[1]))
        .collect();

    let mut final_sentiment = SentimentLabel::Neutral;
    let mut best = 0;
    for (label, count) in &distribution {
        if *count > best {
            best = *count;
            final_sentiment = *label;
        }
    }

    info!(
        "📊 Aggregated {} articles, {} comparisons, verdict {}",
        articles.len(),
        coverage_differences.len(),
        final_sentiment
    );

    Ok(AggregateReport {
        sentiment_distribution: distribution,
        coverage_differences,
        final_sentiment,
        final_statement: format!(
            "The Latest news about the company is mostly {}",
            final_sentiment.as_str().to_uppercase()
        ),
    })
}

/// Compares two articles' topics and sentiments.
pub fn compare(left: &AnalyzedArticle, right: &AnalyzedArticle) -> ComparisonEntry {
    let left_topics: IndexSet<&str> = left.topics.iter().map(String::as_str).collect();
    let right_topics: IndexSet<&str> = right.topics.iter().map(String::as_str).collect();

    ComparisonEntry {
        comparison: format!("{} vs {}", left.title, right.title),
        sentiment_impact: format!("{} vs {}", left.sentiment, right.sentiment),
        topic_overlap: owned(left_topics.intersection(&right_topics)),
        unique_topics_left: owned(left_topics.difference(&right_topics)),
        unique_topics_right: owned(right_topics.difference(&left_topics)),
    }
}

fn owned<'a, 'b: 'a>(topics: impl Iterator<Item = &'a &'b str>) -> Vec<String> {
    topics.map(|t| t.to_string()).collect()
}
