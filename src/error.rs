//! Error types for the collectors and their collaborators.
//!
//! Each collaborator has its own error enum; [`CollectorError`] composes them
//! so a handler can turn any failed step into a response envelope.

use thiserror::Error;

/// A selector token that does not name a known category or location.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown category `{0}` (expected topics, articles or stories)")]
    UnknownCategory(String),
    #[error("unknown location `{0}`")]
    UnknownLocation(String),
}

/// Failure writing a record to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("in-memory store lock poisoned")]
    Poisoned,
    #[error("write rejected for `{id}`: {reason}")]
    Rejected { id: String, reason: String },
}

/// Failure fetching or parsing a news feed.
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid feed url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to parse feed: {0}")]
    Parse(#[from] quick_xml::DeError),
}

/// Any failure a collector can hit while handling one event.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("invalid event: {0}")]
    Event(#[from] serde_json::Error),
    #[error("failed to normalize payload: {0}")]
    Normalize(serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("news aggregator failed: {0}")]
    Aggregator(#[from] AggregatorError),
    #[error("record store failed: {0}")]
    Store(#[from] StoreError),
    #[error("all {failed} article writes failed; first error: {first}")]
    BatchFailed { failed: usize, first: StoreError },
}
