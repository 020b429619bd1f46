//! News collector: fetches one feed and stores one record per article.
//!
//! # Event
//!
//! ```json
//! {
//!   "category": "topics",
//!   "category_id": "CAAqJggKIiBDQkFTRWdvSUwyMHZNRGx6TVdZU0FtVnVHZ0pWVXlnQVAB",
//!   "location": "US",
//!   "section_id": null
//! }
//! ```
//!
//! Every field is optional; blank strings count as absent. `category` and
//! `location` must name a known value or the event fails with a validation
//! error.
//!
//! # Writes
//!
//! Articles are written one at a time in feed order. A failed write is
//! logged and recorded, and the loop moves on to the next article. Only when
//! every write fails is the whole request an error.
//!
//! # Response body
//!
//! - 200: `{"message", "count", "article_ids"}`, plus `failed` (`[{id, error}]`)
//!   when some writes failed
//! - 404: `{"message"}` when the feed is empty
//! - 500: `{"message", "error"}`

use crate::aggregators::NewsAggregator;
use crate::envelope::Response;
use crate::error::{CollectorError, StoreError};
use crate::models::{FeedQuery, NewsArticle, NewsRecord, Record};
use crate::stores::RecordStore;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

const NO_ARTICLES_MESSAGE: &str = "No articles found for the requested feed";

#[derive(Debug, Default, Deserialize)]
struct NewsEvent {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    section_id: Option<String>,
}

/// Validate a raw event into a [`FeedQuery`], filling in defaults.
fn parse_query(event: Value) -> Result<FeedQuery, CollectorError> {
    let event: NewsEvent = if event.is_null() {
        NewsEvent::default()
    } else {
        serde_json::from_value(event)?
    };
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let mut query = FeedQuery::default();
    if let Some(category) = present(event.category) {
        query.category = category.parse()?;
    }
    if let Some(location) = present(event.location) {
        query.location = location.parse()?;
    }
    if let Some(category_id) = present(event.category_id) {
        query.category_id = category_id;
    }
    query.section_id = present(event.section_id);
    Ok(query)
}

/// One article whose write failed.
#[derive(Debug)]
pub struct FailedWrite {
    pub id: String,
    pub error: StoreError,
}

/// Outcome of writing one feed's articles.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Ids written, in feed order.
    pub stored: Vec<String>,
    pub failed: Vec<FailedWrite>,
}

impl BatchReport {
    fn to_body(&self) -> Value {
        let message = if self.failed.is_empty() {
            "News collected successfully"
        } else {
            "News collected with some failed writes"
        };
        let mut body = json!({
            "message": message,
            "count": self.stored.len(),
            "article_ids": self.stored,
        });
        if !self.failed.is_empty() {
            body["failed"] = self
                .failed
                .iter()
                .map(|f| json!({ "id": f.id, "error": f.error.to_string() }))
                .collect();
        }
        body
    }
}

/// Fetches a feed through an aggregator and stores each article by URL.
#[derive(Debug)]
pub struct NewsCollector<A, S> {
    aggregator: A,
    store: S,
}

impl<A: NewsAggregator, S: RecordStore> NewsCollector<A, S> {
    pub fn new(aggregator: A, store: S) -> Self {
        Self { aggregator, store }
    }

    /// Handle one event. Never fails; errors come back as a 500 envelope.
    pub async fn handle(&self, event: Value) -> Response {
        self.handle_at(event, Utc::now()).await
    }

    /// [`handle`](Self::handle) with an explicit write time.
    #[instrument(level = "info", skip_all)]
    pub async fn handle_at(&self, event: Value, now: DateTime<Utc>) -> Response {
        match self.collect(event, now).await {
            Ok(None) => {
                info!("Feed returned no articles");
                Response::not_found(NO_ARTICLES_MESSAGE)
            }
            Ok(Some(report)) => {
                info!(
                    stored = report.stored.len(),
                    failed = report.failed.len(),
                    "News collected"
                );
                Response::ok(&report.to_body())
            }
            Err(e) => {
                error!(error = %e, "Error collecting news");
                Response::error("Error collecting news", &e)
            }
        }
    }

    async fn collect(
        &self,
        event: Value,
        now: DateTime<Utc>,
    ) -> Result<Option<BatchReport>, CollectorError> {
        let query = parse_query(event)?;
        debug!(?query, "Validated news event");

        let articles = self.aggregator.fetch(&query).await?;
        if articles.is_empty() {
            return Ok(None);
        }

        let mut report = self.store_articles(&articles, now.timestamp()).await;
        if report.stored.is_empty() && !report.failed.is_empty() {
            let failed = std::mem::take(&mut report.failed);
            let count = failed.len();
            if let Some(first) = failed.into_iter().next() {
                return Err(CollectorError::BatchFailed {
                    failed: count,
                    first: first.error,
                });
            }
        }
        Ok(Some(report))
    }

    /// Write every article, continuing past failed writes.
    ///
    /// A URL repeated within one batch is written and reported once, for its
    /// first occurrence.
    async fn store_articles(&self, articles: &[NewsArticle], timestamp: i64) -> BatchReport {
        let store = &self.store;
        let unique = articles.iter().unique_by(|article| article.url.clone());
        let outcomes: Vec<(String, Result<(), StoreError>)> = stream::iter(unique)
            .then(move |article| async move {
                let record = Record::News(NewsRecord::from_article(article, timestamp));
                let result = store.put(&record).await;
                (article.url.clone(), result)
            })
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (id, result) in outcomes {
            match result {
                Ok(()) => report.stored.push(id),
                Err(error) => {
                    warn!(%id, %error, "Failed to store article; continuing");
                    report.failed.push(FailedWrite { id, error });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::testing::{FailingAggregator, RejectingStore, StubAggregator, article};
    use crate::models::{Category, DEFAULT_CATEGORY_ID, Location};
    use crate::stores::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn test_two_articles_stored_in_feed_order() {
        let store = MemoryStore::new();
        let aggregator = StubAggregator::with(vec![
            article("https://example.com/u1", "First"),
            article("https://example.com/u2", "Second"),
        ]);
        let collector = NewsCollector::new(&aggregator, &store);

        let resp = collector.handle_at(json!({}), now()).await;

        assert_eq!(resp.status_code, 200);
        let body = resp.body_json().unwrap();
        assert_eq!(body["count"], 2);
        assert_eq!(
            body["article_ids"],
            json!(["https://example.com/u1", "https://example.com/u2"])
        );
        assert!(body.get("failed").is_none());

        assert_eq!(store.len().unwrap(), 2);
        let first = store.get("https://example.com/u1").unwrap().unwrap();
        assert_eq!(first["title"], "First");
        assert_eq!(first["timestamp"], 1_700_000_000);
        assert!(first["story_url"].is_null());
        assert!(first["publish_time"].is_null());
        assert_eq!(
            store.get("https://example.com/u2").unwrap().unwrap()["title"],
            "Second"
        );
    }

    #[tokio::test]
    async fn test_empty_feed_is_a_404_without_error() {
        let store = MemoryStore::new();
        let aggregator = StubAggregator::default();
        let collector = NewsCollector::new(&aggregator, &store);

        let resp = collector.handle_at(json!({}), now()).await;

        assert_eq!(resp.status_code, 404);
        let body = resp.body_json().unwrap();
        assert_eq!(body["message"], NO_ARTICLES_MESSAGE);
        assert!(body.get("error").is_none());
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_unknown_category_is_a_500() {
        let store = MemoryStore::new();
        let aggregator = StubAggregator::with(vec![article("https://example.com/u1", "t")]);
        let collector = NewsCollector::new(&aggregator, &store);

        let resp = collector.handle_at(json!({"category": "bogus"}), now()).await;

        assert_eq!(resp.status_code, 500);
        let body = resp.body_json().unwrap();
        assert!(body["error"].as_str().unwrap().contains("bogus"));
        assert!(aggregator.seen.lock().unwrap().is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_unknown_location_is_a_500() {
        let store = MemoryStore::new();
        let aggregator = StubAggregator::default();
        let collector = NewsCollector::new(&aggregator, &store);

        let resp = collector.handle_at(json!({"location": "atlantis"}), now()).await;

        assert_eq!(resp.status_code, 500);
        assert!(resp.body_json().unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("atlantis"));
    }

    #[tokio::test]
    async fn test_aggregator_failure_is_a_500() {
        let store = MemoryStore::new();
        let collector = NewsCollector::new(FailingAggregator, &store);

        let resp = collector.handle_at(json!({}), now()).await;

        assert_eq!(resp.status_code, 500);
        let body = resp.body_json().unwrap();
        assert_eq!(body["message"], "Error collecting news");
        assert!(body["error"].as_str().unwrap().contains("news aggregator failed"));
    }

    #[tokio::test]
    async fn test_recollecting_same_url_keeps_one_record() {
        let store = MemoryStore::new();
        let first = StubAggregator::with(vec![article("https://example.com/u1", "Old title")]);
        let second = StubAggregator::with(vec![article("https://example.com/u1", "New title")]);

        NewsCollector::new(&first, &store).handle_at(json!({}), now()).await;
        NewsCollector::new(&second, &store).handle_at(json!({}), now()).await;

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(
            store.get("https://example.com/u1").unwrap().unwrap()["title"],
            "New title"
        );
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_the_batch() {
        let store = RejectingStore::rejecting(&["https://example.com/u2"]);
        let aggregator = StubAggregator::with(vec![
            article("https://example.com/u1", "One"),
            article("https://example.com/u2", "Two"),
            article("https://example.com/u3", "Three"),
        ]);
        let collector = NewsCollector::new(&aggregator, &store);

        let resp = collector.handle_at(json!({}), now()).await;

        assert_eq!(resp.status_code, 200);
        let body = resp.body_json().unwrap();
        assert_eq!(body["count"], 2);
        assert_eq!(
            body["article_ids"],
            json!(["https://example.com/u1", "https://example.com/u3"])
        );
        assert_eq!(body["failed"][0]["id"], "https://example.com/u2");
        assert!(store.inner.get("https://example.com/u3").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_repeated_url_in_batch_is_reported_once() {
        let store = MemoryStore::new();
        let aggregator = StubAggregator::with(vec![
            article("https://example.com/u1", "A"),
            article("https://example.com/u1", "B"),
        ]);
        let collector = NewsCollector::new(&aggregator, &store);

        let resp = collector.handle_at(json!({}), now()).await;

        assert_eq!(resp.status_code, 200);
        let body = resp.body_json().unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["article_ids"], json!(["https://example.com/u1"]));
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(
            store.get("https://example.com/u1").unwrap().unwrap()["title"],
            "A"
        );
    }

    #[tokio::test]
    async fn test_every_write_failing_is_a_500() {
        let store = RejectingStore::rejecting(&["https://example.com/u1"]);
        let aggregator = StubAggregator::with(vec![article("https://example.com/u1", "One")]);
        let collector = NewsCollector::new(&aggregator, &store);

        let resp = collector.handle_at(json!({}), now()).await;

        assert_eq!(resp.status_code, 500);
        assert!(resp.body_json().unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("all 1 article writes failed"));
    }

    #[tokio::test]
    async fn test_event_selectors_reach_the_aggregator() {
        let store = MemoryStore::new();
        let aggregator = StubAggregator::default();
        let collector = NewsCollector::new(&aggregator, &store);

        collector
            .handle_at(
                json!({
                    "category": "Topics",
                    "category_id": "TECH",
                    "location": "gb",
                    "section_id": "AI"
                }),
                now(),
            )
            .await;
        collector.handle_at(Value::Null, now()).await;

        let seen = aggregator.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            FeedQuery {
                category: Category::Topics,
                category_id: "TECH".to_string(),
                location: Location::UnitedKingdom,
                section_id: Some("AI".to_string()),
            }
        );
        assert_eq!(seen[1].category_id, DEFAULT_CATEGORY_ID);
        assert_eq!(seen[1].location, Location::UnitedStates);
        assert_eq!(seen[1].section_id, None);
    }

    #[test]
    fn test_parse_query_treats_blank_as_absent() {
        let query = parse_query(json!({"category": " ", "category_id": "", "section_id": null}))
            .unwrap();
        assert_eq!(query, FeedQuery::default());
    }
}
