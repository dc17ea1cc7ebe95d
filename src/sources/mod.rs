pub mod extract;
pub mod http;
pub mod summary;
pub mod traits;

pub use extract::{extract_articles, SelectorRule, SourceRules, TextRule};
pub use http::{HttpFetcher, RetryPolicy};
pub use summary::Summarizer;
pub use traits::PageFetcher;
