use std::io::Cursor;

use async_trait::async_trait;
use readability::extractor;
use reqwest::Client;
use tracing::{debug, warn};

use nd_core::{truncate_chars, ContentExtractor, Error, Result, SUMMARY_UNAVAILABLE};

use crate::scrapers::utils;

/// Downloads a page and reduces it to its main body text.
#[derive(Debug, Clone)]
pub struct ReadabilityExtractor {
    client: Client,
}

impl ReadabilityExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Runs readability over an already downloaded page.
pub fn extract_text(html: &str, url: &url::Url) -> Result<String> {
    let mut cursor = Cursor::new(html.as_bytes());
    let product = extractor::extract(&mut cursor, url)
        .map_err(|e| Error::Scraping(format!("Readability failed for {}: {:?}", url, e)))?;
    let text = product.text.trim().to_string();
    if text.is_empty() {
        return Err(Error::Scraping(format!("No article text found at {}", url)));
    }
    Ok(text)
}

#[async_trait]
impl ContentExtractor for ReadabilityExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let parsed = utils::parse_url(url)?;
        let response = self.client.get(parsed.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Scraping(format!("{} returned status {}", url, status)));
        }
        let html = response.text().await?;
        extract_text(&html, &parsed)
    }
}

/// Summarizes the article at `url` as the first `max_chars` characters of
/// its body, or [`SUMMARY_UNAVAILABLE`] when anything goes wrong.
pub async fn summarize(extractor: &dyn ContentExtractor, url: &str, max_chars: usize) -> String {
    match extractor.extract(url).await {
        Ok(text) if !text.trim().is_empty() => {
            let summary = truncate_chars(&text, max_chars).to_string();
            debug!("📝 Summary for {}: {}", url, summary);
            summary
        }
        Ok(_) => {
            warn!("⚠️ Empty article body at {}", url);
            SUMMARY_UNAVAILABLE.to_string()
        }
        Err(e) => {
            warn!("⚠️ Error summarizing article {}: {}", url, e);
            SUMMARY_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html><head><title>Tesla profits surge</title></head>
        <body>
          <nav><a href="/">Home</a><a href="/news">News</a></nav>
          <article>
            <h1>Tesla profits surge</h1>
            <p>Tesla reported record quarterly profits on Wednesday, beating analyst expectations by a wide margin.
               The carmaker said deliveries of its electric vehicles rose sharply in China and Europe.</p>
            <p>Chief executive Elon Musk told investors the company expected further growth next year,
               although he warned that supply chain pressures had not fully eased.</p>
          </article>
          <footer>Copyright BBC</footer>
        </body></html>
    "#;

    #[test]
    fn test_extract_text_finds_body() {
        let url = url::Url::parse("https://www.bbc.com/news/articles/c001").unwrap();
        let text = extract_text(ARTICLE, &url).unwrap();
        assert!(text.contains("record quarterly profits"));
        assert!(text.contains("supply chain pressures"));
    }

    #[tokio::test]
    async fn test_summary_is_truncated_by_characters() {
        struct Fixed(String);

        #[async_trait]
        impl ContentExtractor for Fixed {
            async fn extract(&self, _url: &str) -> Result<String> {
                Ok(self.0.clone())
            }
        }

        let extractor = Fixed("é".repeat(400));
        let summary = summarize(&extractor, "https://example.com", 300).await;
        assert_eq!(summary.chars().count(), 300);

        let short = Fixed("Short body.".to_string());
        assert_eq!(summarize(&short, "https://example.com", 300).await, "Short body.");
    }

    #[tokio::test]
    async fn test_failures_give_placeholder() {
        let extractor = ReadabilityExtractor::new(Client::new());
        assert_eq!(summarize(&extractor, "not a url", 300).await, SUMMARY_UNAVAILABLE);
        assert_eq!(
            summarize(&extractor, "http://127.0.0.1:9/news/articles/x", 300).await,
            SUMMARY_UNAVAILABLE
        );
    }
}
