//! Redis-backed record store.
//!
//! Each record is one string key, `<table>:<id>`, holding the record's JSON
//! encoding. `SET` overwrites, which gives last-write-wins without any
//! transaction. Retries and timeouts are whatever the `redis` client provides.

use super::RecordStore;
use crate::error::StoreError;
use crate::models::Record;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::fmt;
use tracing::{debug, info, instrument};

pub struct RedisStore {
    conn: MultiplexedConnection,
    table: String,
}

impl RedisStore {
    /// Open one multiplexed connection to `url`, namespacing keys by `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redis`] if the URL is invalid or the server is
    /// unreachable.
    #[instrument(level = "info", skip_all, fields(%table))]
    pub async fn connect(url: &str, table: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to redis");
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn key_for(&self, id: &str) -> String {
        record_key(&self.table, id)
    }
}

fn record_key(table: &str, id: &str) -> String {
    format!("{table}:{id}")
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("table", &self.table)
            .finish()
    }
}

impl RecordStore for RedisStore {
    #[instrument(level = "debug", skip_all, fields(id = %record.id()))]
    async fn put(&self, record: &Record) -> Result<(), StoreError> {
        if record.id().is_empty() {
            return Err(StoreError::Rejected {
                id: String::new(),
                reason: "empty key".to_string(),
            });
        }
        let payload = serde_json::to_string(record)?;
        let key = self.key_for(record.id());
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key.as_str(), payload).await?;
        debug!(%key, "Stored record in redis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_namespaces_by_table() {
        assert_eq!(record_key("records", "abc"), "records:abc");
        assert_eq!(
            record_key("news", "https://example.com/a"),
            "news:https://example.com/a"
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let err = RedisStore::connect("not a redis url", "records")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Redis(_)));
    }
}
