use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::{info, warn};

use nd_core::{Article, ArticleSource, DigestConfig, Error, PairingStrategy, Result};

use super::utils;

/// Article source backed by the BBC site search.
#[derive(Debug, Clone)]
pub struct BbcSearchSource {
    client: Client,
    base_url: String,
    title_selector: String,
    link_selector: String,
    headline_selector: String,
    pairing: PairingStrategy,
}

impl BbcSearchSource {
    pub fn new(client: Client, config: &DigestConfig) -> Self {
        Self {
            client,
            base_url: config.search_base_url.trim_end_matches('/').to_string(),
            title_selector: config.title_selector.clone(),
            link_selector: config.link_selector.clone(),
            headline_selector: config.headline_selector.clone(),
            pairing: config.pairing,
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    async fn fetch_page(&self, company: &str) -> Result<String> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", company)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Scraping(format!("Failed to fetch articles. Status Code: {}", status)));
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(Error::Scraping("Empty response received from BBC News".to_string()));
        }
        Ok(body)
    }

    /// Extracts (title, url) pairs from a search result page.
    pub fn parse_results(&self, html: &str) -> Result<Vec<Article>> {
        let document = Html::parse_document(html);
        let base = utils::parse_url(&self.base_url)?;
        match self.pairing {
            PairingStrategy::Positional => self.pair_by_position(&document, &base),
            PairingStrategy::Scoped => self.pair_within_links(&document, &base),
        }
    }

    /// Titles and links are collected separately and zipped, so a page with a
    /// stray title or link shifts every later pair.
    fn pair_by_position(&self, document: &Html, base: &url::Url) -> Result<Vec<Article>> {
        let titles = utils::extract_texts(document, &self.title_selector)?;
        let link_selector = utils::selector(&self.link_selector)?;
        let urls: Vec<String> = document
            .select(&link_selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| utils::absolute_url(base, href))
            .collect();

        if titles.len() != urls.len() {
            warn!(
                "⚠️ Found {} titles but {} links, keeping {}",
                titles.len(),
                urls.len(),
                titles.len().min(urls.len())
            );
        }

        Ok(titles
            .into_iter()
            .zip(urls)
            .map(|(title, url)| Article::new(title, url))
            .collect())
    }

    fn pair_within_links(&self, document: &Html, base: &url::Url) -> Result<Vec<Article>> {
        let link_selector = utils::selector(&self.link_selector)?;
        let headline_selector = utils::selector(&self.headline_selector)?;

        Ok(document
            .select(&link_selector)
            .filter_map(|link| {
                let url = utils::absolute_url(base, link.value().attr("href")?)?;
                let title = link
                    .select(&headline_selector)
                    .map(|h| utils::element_text(&h))
                    .find(|t| !t.is_empty())
                    .unwrap_or_else(|| utils::element_text(&link));
                (!title.is_empty()).then(|| Article::new(title, url))
            })
            .collect())
    }
}

#[async_trait]
impl ArticleSource for BbcSearchSource {
    fn source(&self) -> &str {
        "BBC"
    }

    async fn fetch(&self, company: &str) -> Vec<Article> {
        info!("📰 Searching {} for {}", self.source(), company);
        let html = match self.fetch_page(company).await {
            Ok(html) => html,
            Err(e) => {
                warn!("⚠️ Search for {} failed: {}", company, e);
                return Vec::new();
            }
        };
        match self.parse_results(&html) {
            Ok(articles) => {
                info!("✨ Found {} articles for {}", articles.len(), company);
                articles
            }
            Err(e) => {
                warn!("⚠️ Could not parse search results for {}: {}", company, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers every request with the given status line and body.
    async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    async fn local_source(status: &'static str, body: &'static str) -> BbcSearchSource {
        let config = DigestConfig::default().with_search_base_url(serve(status, body).await);
        BbcSearchSource::new(Client::new(), &config)
    }

    const PAGE: &str = r#"
        <html><body>
          <div data-testid="card">
            <a href="/news/articles/c001">
              <h2 class="sc-87075214-3 cXFiLO" data-testid="card-headline">Tesla profits surge</h2>
            </a>
          </div>
          <div data-testid="card">
            <a href="/news/articles/c002">
              <h2 class="sc-87075214-3 cXFiLO" data-testid="card-headline">SEC opens inquiry</h2>
            </a>
          </div>
          <div data-testid="card">
            <a href="/news/articles/c003"><span>Musk responds</span></a>
          </div>
          <a href="/sport/football/1"><h2>Unrelated</h2></a>
        </body></html>
    "#;

    fn source(pairing: PairingStrategy) -> BbcSearchSource {
        BbcSearchSource::new(Client::new(), &DigestConfig::default().with_pairing(pairing))
    }

    #[test]
    fn test_positional_pairing_truncates_to_shorter_list() {
        let articles = source(PairingStrategy::Positional).parse_results(PAGE).unwrap();
        assert_eq!(
            articles,
            vec![
                Article::new("Tesla profits surge", "https://www.bbc.com/news/articles/c001"),
                Article::new("SEC opens inquiry", "https://www.bbc.com/news/articles/c002"),
            ]
        );
    }

    #[test]
    fn test_scoped_pairing_reads_titles_inside_links() {
        let articles = source(PairingStrategy::Scoped).parse_results(PAGE).unwrap();
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].title, "Tesla profits surge");
        assert_eq!(articles[2], Article::new("Musk responds", "https://www.bbc.com/news/articles/c003"));
    }

    #[test]
    fn test_page_without_results() {
        let articles = source(PairingStrategy::Positional)
            .parse_results("<html><body><p>No results</p></body></html>")
            .unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_search_url() {
        let config = DigestConfig::default().with_search_base_url("http://localhost:8080/");
        let source = BbcSearchSource::new(Client::new(), &config);
        assert_eq!(source.search_url(), "http://localhost:8080/search");
    }

    #[tokio::test]
    async fn test_error_status_returns_empty() {
        let source = local_source("500 Internal Server Error", "oops").await;
        let err = source.fetch_page("Tesla").await.unwrap_err();
        assert!(matches!(err, Error::Scraping(_)));
        assert!(err.to_string().contains("500"));
        assert!(source.fetch("Tesla").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_returns_empty() {
        let source = local_source("200 OK", "  \n").await;
        let err = source.fetch_page("Tesla").await.unwrap_err();
        assert_eq!(err.to_string(), "Scraping error: Empty response received from BBC News");
        assert!(source.fetch("Tesla").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_parses_served_page() {
        let source = local_source("200 OK", PAGE).await;
        let articles = source.fetch("Tesla").await;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Tesla profits surge");
        assert!(articles[0].url.starts_with("http://127.0.0.1:"));
        assert!(articles[0].url.ends_with("/news/articles/c001"));
    }

    #[tokio::test]
    async fn test_unreachable_search_returns_empty() {
        let config = DigestConfig::default().with_search_base_url("http://127.0.0.1:9");
        let source = BbcSearchSource::new(Client::new(), &config);
        assert!(source.fetch("Tesla").await.is_empty());
    }
}
