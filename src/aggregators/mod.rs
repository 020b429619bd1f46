//! News aggregators that turn feed selectors into article metadata.
//!
//! An aggregator is the only place that talks to a news source. Collectors
//! see it through [`NewsAggregator`] so a stub can stand in for it in tests.
//!
//! # Supported Sources
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Google News | [`google_news`] | RSS feeds for topics, sections, articles and stories |

pub mod google_news;

use crate::error::AggregatorError;
use crate::models::{FeedQuery, NewsArticle};

pub use google_news::GoogleNews;

/// Trait for fetching one feed's worth of articles.
pub trait NewsAggregator {
    /// Fetch the articles selected by `query`, in feed order.
    ///
    /// An empty vector means the feed had nothing this cycle; it is not an
    /// error.
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<NewsArticle>, AggregatorError>;
}

impl<T: NewsAggregator> NewsAggregator for &T {
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<NewsArticle>, AggregatorError> {
        (**self).fetch(query).await
    }
}
