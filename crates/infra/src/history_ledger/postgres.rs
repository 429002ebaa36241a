//! Postgres-backed history ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use stockroom_core::{EventId, ItemId};
use stockroom_inventory::StockChangeEvent;

use super::r#trait::HistoryLedger;
use crate::error::{StoreError, map_sqlx_error};

const EVENT_COLUMNS: &str = "id, item_id, old_quantity, new_quantity, changed_by, created_at";

#[derive(Debug, Clone)]
pub struct PostgresHistoryLedger {
    pool: PgPool,
}

impl PostgresHistoryLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryLedger for PostgresHistoryLedger {
    #[instrument(skip(self, event), fields(item_id = %event.item_id), err)]
    async fn append(&self, event: StockChangeEvent) -> Result<StockChangeEvent, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stock_change_events (id, item_id, old_quantity, new_quantity, changed_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.item_id.as_uuid())
        .bind(event.old_quantity)
        .bind(event.new_quantity)
        .bind(&event.changed_by)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_stock_change", None, e))?;
        Ok(event)
    }

    #[instrument(skip(self), fields(item_id = %item_id), err)]
    async fn for_item(&self, item_id: &ItemId) -> Result<Vec<StockChangeEvent>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM stock_change_events WHERE item_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(item_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_item_history", None, e))?;
        rows.iter().map(event_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn all(&self) -> Result<Vec<StockChangeEvent>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM stock_change_events ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_history", None, e))?;
        rows.iter().map(event_from_row).collect()
    }

    #[instrument(skip(self), fields(item_id = %item_id), err)]
    async fn delete_for_item(&self, item_id: &ItemId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM stock_change_events WHERE item_id = $1")
            .bind(item_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item_history", None, e))?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug)]
struct EventRow {
    id: uuid::Uuid,
    item_id: uuid::Uuid,
    old_quantity: i64,
    new_quantity: i64,
    changed_by: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for EventRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EventRow {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            old_quantity: row.try_get("old_quantity")?,
            new_quantity: row.try_get("new_quantity")?,
            changed_by: row.try_get("changed_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn event_from_row(row: &sqlx::postgres::PgRow) -> Result<StockChangeEvent, StoreError> {
    let r = EventRow::from_row(row)
        .map_err(|e| StoreError::backend("decode_event", format!("failed to decode event row: {e}")))?;
    Ok(StockChangeEvent {
        id: EventId::from_uuid(r.id),
        item_id: ItemId::from_uuid(r.item_id),
        old_quantity: r.old_quantity,
        new_quantity: r.new_quantity,
        changed_by: r.changed_by,
        created_at: r.created_at,
    })
}
