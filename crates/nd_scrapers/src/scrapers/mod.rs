pub mod bbc;

pub use bbc::BbcSearchSource;

/// Common utilities for scrapers
pub(crate) mod utils {
    use nd_core::{Error, Result};
    use scraper::{ElementRef, Html, Selector};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", selector, e)))
    }

    pub fn element_text(element: &ElementRef<'_>) -> String {
        element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn extract_texts(document: &Html, selector: &str) -> Result<Vec<String>> {
        let selector = self::selector(selector)?;
        Ok(document.select(&selector).map(|el| element_text(&el)).collect())
    }

    /// Resolves `href` against `base`, keeping already absolute links as they are.
    pub fn absolute_url(base: &Url, href: &str) -> Option<String> {
        base.join(href).ok().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use scraper::Html;

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_extract_texts() {
        let html = r#"
            <div class="item">Item 1</div>
            <div class="item">  Item
               2 </div>
        "#;
        let document = Html::parse_document(html);

        let texts = utils::extract_texts(&document, ".item").unwrap();
        assert_eq!(texts, vec!["Item 1", "Item 2"]);
        assert!(utils::extract_texts(&document, "<<bad").is_err());
    }

    #[test]
    fn test_absolute_url() {
        let base = utils::parse_url("https://www.bbc.com").unwrap();
        assert_eq!(
            utils::absolute_url(&base, "/news/articles/c1").as_deref(),
            Some("https://www.bbc.com/news/articles/c1")
        );
        assert_eq!(
            utils::absolute_url(&base, "https://other.example/x").as_deref(),
            Some("https://other.example/x")
        );
    }
}
