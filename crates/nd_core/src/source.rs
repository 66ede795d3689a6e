use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns the name of the news source
    fn source(&self) -> &str;

    /// Returns candidate articles for `company`, in the order the source lists them.
    /// Transport problems yield an empty list rather than an error.
    async fn fetch(&self, company: &str) -> Vec<Article>;
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Returns the plain body text of the page at `url`.
    async fn extract(&self, url: &str) -> Result<String>;
}
