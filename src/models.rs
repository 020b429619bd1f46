//! Data models for collected records and news feed selectors.
//!
//! This module defines the core data structures used throughout the application:
//! - [`GenericRecord`]: An arbitrary payload tagged with time and environment
//! - [`NewsArticle`]: Article metadata as yielded by a news aggregator
//! - [`NewsRecord`]: The stored form of a [`NewsArticle`], keyed by its URL
//! - [`Record`]: Either kind, as handed to a record store
//! - Feed selectors: [`Category`], [`Location`], [`FeedQuery`]
//!
//! Records are written once and never mutated. The `id` of a record is the
//! store key, so writing a record with an existing id replaces the old one.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Google News topic token for the Business feed, used when a news event
/// does not name a `category_id`.
pub const DEFAULT_CATEGORY_ID: &str = "CAAqJggKIiBDQkFTRWdvSUwyMHZNRGx6TVdZU0FtVnVHZ0pWVXlnQVAB";

/// An arbitrary key/value payload stored by the generic collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRecord {
    /// Caller-supplied id, or `record-<unix-seconds>`.
    pub id: String,
    /// Seconds since the Unix epoch at write time.
    pub timestamp: i64,
    /// The payload with numbers kept as exact decimal literals.
    pub data: Value,
    /// Environment tag from process configuration.
    pub environment: String,
}

/// Article metadata produced by a news aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsArticle {
    /// Canonical article URL; unique per article.
    pub url: String,
    /// The article headline.
    pub title: String,
    /// The "full coverage" story this article is clustered under, if any.
    pub story_url: Option<String>,
    /// Publication time, when the feed states one.
    pub publish_time: Option<DateTime<Utc>>,
}

/// The stored form of a [`NewsArticle`].
///
/// Identity is the article URL, so collecting the same article twice
/// overwrites the earlier record instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: String,
    pub title: String,
    pub story_url: Option<String>,
    /// Seconds since the Unix epoch.
    pub publish_time: Option<i64>,
    /// Seconds since the Unix epoch at write time.
    pub timestamp: i64,
}

impl NewsRecord {
    pub fn from_article(article: &NewsArticle, timestamp: i64) -> Self {
        Self {
            id: article.url.clone(),
            title: article.title.clone(),
            story_url: article.story_url.clone(),
            publish_time: article.publish_time.map(|t| t.timestamp()),
            timestamp,
        }
    }
}

/// A record as handed to a [`crate::stores::RecordStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Generic(GenericRecord),
    News(NewsRecord),
}

impl Record {
    /// The store key.
    pub fn id(&self) -> &str {
        match self {
            Record::Generic(r) => &r.id,
            Record::News(r) => &r.id,
        }
    }
}

impl From<GenericRecord> for Record {
    fn from(r: GenericRecord) -> Self {
        Record::Generic(r)
    }
}

impl From<NewsRecord> for Record {
    fn from(r: NewsRecord) -> Self {
        Record::News(r)
    }
}

/// Which kind of Google News feed to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    /// A topic feed, optionally narrowed to one section.
    #[default]
    Topics,
    /// The related-coverage feed of a single article.
    Articles,
    /// A "full coverage" story cluster.
    Stories,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Topics => "topics",
            Category::Articles => "articles",
            Category::Stories => "stories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topics" => Ok(Category::Topics),
            "articles" => Ok(Category::Articles),
            "stories" => Ok(Category::Stories),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}

/// A Google News regional edition.
///
/// Each edition fixes the interface language (`hl`), the country (`gl`) and
/// the combined edition id (`ceid`) sent with every feed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Location {
    #[default]
    UnitedStates,
    UnitedKingdom,
    Canada,
    Australia,
    India,
    Ireland,
    NewZealand,
    Singapore,
    SouthAfrica,
    Germany,
    France,
    Spain,
    Italy,
    Japan,
    Brazil,
    Mexico,
}

impl Location {
    pub const ALL: [Location; 16] = [
        Location::UnitedStates,
        Location::UnitedKingdom,
        Location::Canada,
        Location::Australia,
        Location::India,
        Location::Ireland,
        Location::NewZealand,
        Location::Singapore,
        Location::SouthAfrica,
        Location::Germany,
        Location::France,
        Location::Spain,
        Location::Italy,
        Location::Japan,
        Location::Brazil,
        Location::Mexico,
    ];

    /// ISO 3166 country code, also the `gl` parameter.
    pub fn code(&self) -> &'static str {
        match self {
            Location::UnitedStates => "US",
            Location::UnitedKingdom => "GB",
            Location::Canada => "CA",
            Location::Australia => "AU",
            Location::India => "IN",
            Location::Ireland => "IE",
            Location::NewZealand => "NZ",
            Location::Singapore => "SG",
            Location::SouthAfrica => "ZA",
            Location::Germany => "DE",
            Location::France => "FR",
            Location::Spain => "ES",
            Location::Italy => "IT",
            Location::Japan => "JP",
            Location::Brazil => "BR",
            Location::Mexico => "MX",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Location::UnitedStates => "united_states",
            Location::UnitedKingdom => "united_kingdom",
            Location::Canada => "canada",
            Location::Australia => "australia",
            Location::India => "india",
            Location::Ireland => "ireland",
            Location::NewZealand => "new_zealand",
            Location::Singapore => "singapore",
            Location::SouthAfrica => "south_africa",
            Location::Germany => "germany",
            Location::France => "france",
            Location::Spain => "spain",
            Location::Italy => "italy",
            Location::Japan => "japan",
            Location::Brazil => "brazil",
            Location::Mexico => "mexico",
        }
    }

    /// Interface language, the `hl` parameter.
    pub fn language(&self) -> &'static str {
        match self {
            Location::UnitedStates => "en-US",
            Location::UnitedKingdom => "en-GB",
            Location::Canada => "en-CA",
            Location::Australia => "en-AU",
            Location::India => "en-IN",
            Location::Ireland => "en-IE",
            Location::NewZealand => "en-NZ",
            Location::Singapore => "en-SG",
            Location::SouthAfrica => "en-ZA",
            Location::Germany => "de",
            Location::France => "fr",
            Location::Spain => "es",
            Location::Italy => "it",
            Location::Japan => "ja",
            Location::Brazil => "pt-BR",
            Location::Mexico => "es-419",
        }
    }

    /// Edition id, the `ceid` parameter (`<country>:<language>`).
    pub fn ceid(&self) -> String {
        let lang = match self {
            Location::Brazil => "pt-419",
            Location::Mexico => "es-419",
            other => other.language().split('-').next().unwrap_or("en"),
        };
        format!("{}:{}", self.code(), lang)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Location {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Location::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(token) || l.name().eq_ignore_ascii_case(token))
            .ok_or_else(|| ValidationError::UnknownLocation(s.to_string()))
    }
}

/// A validated request for one news feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: Category,
    pub category_id: String,
    pub location: Location,
    pub section_id: Option<String>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            category: Category::default(),
            category_id: DEFAULT_CATEGORY_ID.to_string(),
            location: Location::default(),
            section_id: None,
        }
    }
}
