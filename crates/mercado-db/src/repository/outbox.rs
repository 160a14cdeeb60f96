//! # Event Outbox Repository
//!
//! Durable queue of domain events waiting to be delivered downstream.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command handler persists the sale                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  append(event) ──► INSERT INTO event_outbox (payload = event JSON)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Relay (external)                                                       │
//! │     1. pending(limit)     WHERE published_at IS NULL                    │
//! │     2. deliver each entry                                               │
//! │     3. mark_published(id)                                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use mercado_core::SaleEvent;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::get_uuid;
use crate::error::{DbError, DbResult};

/// One stored event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub id: Uuid,
    pub event_type: String,
    pub aggregate_id: Uuid,
    /// JSON of the [`SaleEvent`].
    pub payload: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl OutboxEntry {
    pub fn event(&self) -> DbResult<SaleEvent> {
        serde_json::from_str(&self.payload).map_err(|e| DbError::decode("payload", e))
    }

    fn from_row(row: &SqliteRow) -> DbResult<Self> {
        Ok(OutboxEntry {
            id: get_uuid(row, "id")?,
            event_type: row.try_get("event_type")?,
            aggregate_id: get_uuid(row, "aggregate_id")?,
            payload: row.try_get("payload")?,
            occurred_at: row.try_get("occurred_at")?,
            created_at: row.try_get("created_at")?,
            published_at: row.try_get("published_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EventOutboxRepository {
    pool: SqlitePool,
}

impl EventOutboxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EventOutboxRepository { pool }
    }

    /// Stores an event for later delivery.
    pub async fn append(&self, event: &SaleEvent) -> DbResult<OutboxEntry> {
        let payload = serde_json::to_string(event).map_err(|e| DbError::Internal(e.to_string()))?;

        let entry = OutboxEntry {
            id: Uuid::new_v4(),
            event_type: event.event_type().to_string(),
            aggregate_id: event.aggregate_id(),
            payload,
            occurred_at: event.occurred_at(),
            created_at: Utc::now(),
            published_at: None,
        };

        debug!(
            event_type = %entry.event_type,
            aggregate_id = %entry.aggregate_id,
            "Appending event to outbox"
        );

        sqlx::query(
            r#"
            INSERT INTO event_outbox (
                id, event_type, aggregate_id, payload, occurred_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.event_type)
        .bind(entry.aggregate_id.to_string())
        .bind(&entry.payload)
        .bind(entry.occurred_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Oldest undelivered entries first.
    pub async fn pending(&self, limit: u32) -> DbResult<Vec<OutboxEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, aggregate_id, payload, occurred_at,
                   created_at, published_at
            FROM event_outbox
            WHERE published_at IS NULL
            ORDER BY created_at, rowid
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(OutboxEntry::from_row).collect()
    }

    pub async fn mark_published(&self, id: Uuid) -> DbResult<()> {
        debug!(id = %id, "Marking outbox entry as published");

        let result = sqlx::query("UPDATE event_outbox SET published_at = ?2 WHERE id = ?1")
            .bind(id.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("OutboxEntry", id.to_string()));
        }
        Ok(())
    }

    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM event_outbox WHERE published_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use mercado_core::events::{SaleCreated, SaleItemCanceled};

    fn created(sale_id: Uuid) -> SaleEvent {
        SaleCreated {
            sale_id,
            sale_number: "1001".into(),
            created_at: Utc::now(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_append_and_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.event_outbox();
        let sale_id = Uuid::new_v4();

        outbox.append(&created(sale_id)).await.unwrap();
        outbox
            .append(
                &SaleItemCanceled {
                    item_id: Uuid::new_v4(),
                    sale_id,
                    canceled_at: Utc::now(),
                }
                .into(),
            )
            .await
            .unwrap();

        let pending = outbox.pending(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].event_type, "SaleCreated");
        assert_eq!(pending[1].event_type, "SaleItemCanceled");
        assert_eq!(pending[0].aggregate_id, sale_id);
        assert_eq!(pending[0].event().unwrap().event_type(), "SaleCreated");
    }

    #[tokio::test]
    async fn test_mark_published() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.event_outbox();
        let first = outbox.append(&created(Uuid::new_v4())).await.unwrap();
        let second = outbox.append(&created(Uuid::new_v4())).await.unwrap();

        outbox.mark_published(first.id).await.unwrap();

        assert_eq!(outbox.count_pending().await.unwrap(), 1);
        let pending = outbox.pending(10).await.unwrap();
        assert_eq!(pending[0].id, second.id);
        assert!(pending[0].published_at.is_none());

        assert!(outbox.mark_published(Uuid::new_v4()).await.is_err());
    }
}
