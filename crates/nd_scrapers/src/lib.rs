pub mod extractor;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use extractor::{summarize, ReadabilityExtractor};
pub use logging::init_logging;
pub use manager::DigestManager;
pub use scrapers::BbcSearchSource;

pub mod prelude {
    pub use super::manager::DigestManager;
    pub use super::scrapers::BbcSearchSource;
    pub use nd_core::{Article, ArticleSource, DigestOutcome, DigestReport, Error, Result};
}
