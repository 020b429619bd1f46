//! Generic collector: stores one arbitrary payload per event.
//!
//! # Event
//!
//! ```json
//! { "id": "unique-identifier", "data": { "key1": "value1", "price": 3.14 } }
//! ```
//!
//! Both fields are optional. A missing or empty `id` becomes
//! `record-<unix-seconds>`; a missing or `null` `data` becomes `{}`. Any
//! other non-object `data` is an invalid event.
//!
//! # Response body
//!
//! - 200: `{"message", "id", "timestamp"}`
//! - 500: `{"message", "error"}`

use crate::envelope::Response;
use crate::error::CollectorError;
use crate::models::{GenericRecord, Record};
use crate::stores::RecordStore;
use crate::utils::{normalize_data, synthesize_record_id};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{error, info, instrument};

#[derive(Debug, Default, Deserialize)]
struct GenericEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

/// Stores `{id, data}` payloads tagged with a write timestamp and the
/// configured environment.
#[derive(Debug)]
pub struct GenericCollector<S> {
    store: S,
    environment: String,
}

impl<S: RecordStore> GenericCollector<S> {
    pub fn new(store: S, environment: impl Into<String>) -> Self {
        Self {
            store,
            environment: environment.into(),
        }
    }

    /// Handle one event. Never fails; errors come back as a 500 envelope.
    pub async fn handle(&self, event: Value) -> Response {
        self.handle_at(event, Utc::now()).await
    }

    /// [`handle`](Self::handle) with an explicit write time.
    #[instrument(level = "info", skip_all, fields(environment = %self.environment))]
    pub async fn handle_at(&self, event: Value, now: DateTime<Utc>) -> Response {
        match self.collect(event, now).await {
            Ok(record) => {
                info!(id = %record.id, timestamp = record.timestamp, "Data collected");
                Response::ok(&json!({
                    "message": "Data collected successfully",
                    "id": record.id,
                    "timestamp": record.timestamp,
                }))
            }
            Err(e) => {
                error!(error = %e, "Error collecting data");
                Response::error("Error collecting data", &e)
            }
        }
    }

    async fn collect(&self, event: Value, now: DateTime<Utc>) -> Result<GenericRecord, CollectorError> {
        let event: GenericEvent = if event.is_null() {
            GenericEvent::default()
        } else {
            serde_json::from_value(event)?
        };

        let id = event
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| synthesize_record_id(now));
        let data = Value::Object(event.data.unwrap_or_default());
        let data = normalize_data(&data).map_err(CollectorError::Normalize)?;

        let record = GenericRecord {
            id,
            timestamp: now.timestamp(),
            data,
            environment: self.environment.clone(),
        };
        self.store.put(&Record::Generic(record.clone())).await?;
        Ok(record)
    }
}
