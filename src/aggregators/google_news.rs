//! Google News RSS aggregator.
//!
//! Feeds live under `https://news.google.com/rss/` and are addressed by an
//! opaque token per category:
//!
//! ```text
//! topics/<id>                    a topic, e.g. Business
//! topics/<id>/sections/<section> one section of a topic
//! articles/<id>                  coverage related to one article
//! stories/<id>                   a "full coverage" story cluster
//! ```
//!
//! Every request carries the edition parameters `hl`, `gl` and `ceid` from
//! the [`Location`](crate::models::Location).
//!
//! # Item mapping
//!
//! - `<link>` becomes the article URL; items without one are skipped
//! - `<pubDate>` (RFC 2822) becomes the publish time when it parses
//! - the first `/stories/` link inside the HTML `<description>` becomes the
//!   story URL

use super::NewsAggregator;
use crate::error::AggregatorError;
use crate::models::{Category, FeedQuery, NewsArticle};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://news.google.com/rss/";

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector parses"));

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Client for Google News RSS feeds.
#[derive(Debug, Clone)]
pub struct GoogleNews {
    client: reqwest::Client,
    base_url: Url,
}

impl GoogleNews {
    /// Create a client that reads feeds below `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self, AggregatorError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
        })
    }

    /// Build the feed URL for `query`.
    pub fn feed_url(&self, query: &FeedQuery) -> Result<Url, AggregatorError> {
        let mut path = format!(
            "{}/{}",
            query.category.as_str(),
            urlencoding::encode(&query.category_id)
        );

        let section = query.section_id.as_deref().filter(|s| !s.is_empty());
        match (query.category, section) {
            (Category::Topics, Some(section)) => {
                path.push_str("/sections/");
                path.push_str(&urlencoding::encode(section));
            }
            (category, Some(section)) => {
                debug!(%category, %section, "section_id only applies to topics; ignoring");
            }
            (_, None) => {}
        }

        let mut url = self.base_url.join(&path)?;
        url.query_pairs_mut()
            .append_pair("hl", query.location.language())
            .append_pair("gl", query.location.code())
            .append_pair("ceid", &query.location.ceid());
        Ok(url)
    }
}

impl NewsAggregator for GoogleNews {
    #[instrument(level = "info", skip_all, fields(category = %query.category, location = %query.location))]
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<NewsArticle>, AggregatorError> {
        let url = self.feed_url(query)?;
        info!(%url, "Requesting news feed");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(bytes = body.len(), "Downloaded news feed");

        let articles = parse_feed(&body)?;
        info!(count = articles.len(), "Parsed news feed");
        Ok(articles)
    }
}

/// Parse RSS XML into articles, dropping linkless items and repeated URLs.
pub fn parse_feed(xml: &str) -> Result<Vec<NewsArticle>, AggregatorError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    let articles = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let url = item.link.trim().to_string();
            if url.is_empty() {
                warn!(title = %item.title, "Feed item has no link; skipping");
                return None;
            }
            Some(NewsArticle {
                url,
                title: item.title.trim().to_string(),
                story_url: item.description.as_deref().and_then(story_url),
                publish_time: item.pub_date.as_deref().and_then(parse_pub_date),
            })
        })
        .unique_by(|article| article.url.clone())
        .collect();

    Ok(articles)
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            debug!(%raw, error = %e, "Unparseable pubDate");
            None
        }
    }
}

/// First "full coverage" link in an item's HTML description.
fn story_url(description: &str) -> Option<String> {
    let fragment = Html::parse_fragment(description);
    fragment
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains("/stories/"))
        .map(str::to_string)
}
