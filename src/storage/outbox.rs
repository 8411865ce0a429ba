use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::events::OutboxEvent;
use crate::domain::ports::{EventSink, OutboxFeed};
use crate::OrderError;

#[derive(Debug, sqlx::FromRow)]
struct OutboxRow {
    id: Uuid,
    #[sqlx(rename = "type")]
    event_type: String,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<OutboxRow> for OutboxEvent {
    fn from(row: OutboxRow) -> Self {
        OutboxEvent { id: row.id, event_type: row.event_type, payload: row.payload, created_at: row.created_at }
    }
}

/// Appends to `outbox_events`. Draining the table belongs to an external relay.
#[derive(Clone)]
pub struct PgOutbox {
    pool: PgPool,
}

impl PgOutbox {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl EventSink for PgOutbox {
    async fn emit(&self, event_type: &str, payload: serde_json::Value) -> Result<(), OrderError> {
        let event = OutboxEvent::new(event_type, payload);
        sqlx::query("INSERT INTO outbox_events (id, type, payload, created_at) VALUES ($1, $2, $3, $4)")
            .bind(event.id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.created_at)
            .execute(&self.pool)
            .await?;
        tracing::debug!(outbox_id = %event.id, event_type, "outbox event appended");
        Ok(())
    }
}

#[async_trait]
impl OutboxFeed for PgOutbox {
    async fn recent(&self, limit: i64) -> Result<Vec<OutboxEvent>, OrderError> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            "SELECT id, type, payload, created_at FROM outbox_events ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(OutboxEvent::from).collect())
    }
}
