use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use thiserror::Error;

use crate::models::{Alert, AlertRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence gateway for alert records: append-only writes from the
/// telemetry generator, range deletes from the retention sweeper, and a
/// newest-first read for the log endpoint.
#[derive(Clone)]
pub struct AlertStore {
    pool: Pool<Sqlite>,
}

impl AlertStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Create the alert table and its timestamp index. The timestamp index is
    /// the only one the sweeper's range delete needs.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS alert_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                source TEXT NOT NULL,
                description TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alert_log_timestamp ON alert_log (timestamp)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append one record for a raised alert, stamped with the current time.
    pub async fn append(&self, alert: &Alert) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO alert_log (type, source, description, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(alert.severity.to_string())
        .bind(&alert.source)
        .bind(&alert.desc)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete every record with `timestamp` strictly before `cutoff` and
    /// return how many were removed. A single DELETE statement, so the purge
    /// is all-or-nothing.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM alert_log WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// The newest `limit` records, most recent first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<AlertRecord>, StoreError> {
        let records = sqlx::query_as::<_, AlertRecord>(
            "SELECT id, type, source, description, timestamp FROM alert_log
             ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{memory_store, sample_alert};
    use super::*;
    use chrono::Duration;

    async fn insert_with_timestamp(store: &AlertStore, timestamp: DateTime<Utc>) {
        sqlx::query(
            "INSERT INTO alert_log (type, source, description, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind("High")
        .bind("System Monitor")
        .bind("backdated probe")
        .bind(timestamp)
        .execute(store.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn append_then_recent_round_trips() {
        let store = memory_store().await;
        store.append(&sample_alert(4)).await.unwrap();

        let records = store.recent(100).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, "High");
        assert_eq!(records[0].source, "System Monitor");
        assert!(records[0].timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let store = memory_store().await;
        for offset_days in [3, 1, 2] {
            insert_with_timestamp(&store, Utc::now() - Duration::days(offset_days)).await;
        }

        let records = store.recent(2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].timestamp > records[1].timestamp);
    }

    #[tokio::test]
    async fn purge_removes_exactly_the_expired_records() {
        let store = memory_store().await;
        insert_with_timestamp(&store, Utc::now() - Duration::days(10)).await;
        store.append(&sample_alert(5)).await.unwrap();

        let deleted = store
            .purge_older_than(Utc::now() - Duration::days(7))
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let remaining = store.recent(100).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].timestamp > Utc::now() - Duration::days(7));
    }

    #[tokio::test]
    async fn purge_with_nothing_expired_is_idempotent() {
        let store = memory_store().await;
        store.append(&sample_alert(6)).await.unwrap();

        let cutoff = Utc::now() - Duration::days(7);
        assert_eq!(store.purge_older_than(cutoff).await.unwrap(), 0);
        assert_eq!(store.purge_older_than(cutoff).await.unwrap(), 0);
        assert_eq!(store.recent(100).await.unwrap().len(), 1);
    }
}
