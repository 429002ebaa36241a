use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::ItemId;
use stockroom_inventory::StockChangeEvent;

use crate::error::StoreError;

/// Append-only ledger of stock change events.
///
/// Events are never updated. The only removal path is
/// [`HistoryLedger::delete_for_item`], used to cascade an item deletion.
#[async_trait]
pub trait HistoryLedger: Send + Sync {
    async fn append(&self, event: StockChangeEvent) -> Result<StockChangeEvent, StoreError>;

    /// Events for one item, newest first.
    async fn for_item(&self, item_id: &ItemId) -> Result<Vec<StockChangeEvent>, StoreError>;

    /// Every event in the ledger, newest first.
    async fn all(&self) -> Result<Vec<StockChangeEvent>, StoreError>;

    /// Remove every event referencing `item_id`; returns how many were removed.
    async fn delete_for_item(&self, item_id: &ItemId) -> Result<u64, StoreError>;
}

#[async_trait]
impl<L> HistoryLedger for Arc<L>
where
    L: HistoryLedger + ?Sized,
{
    async fn append(&self, event: StockChangeEvent) -> Result<StockChangeEvent, StoreError> {
        (**self).append(event).await
    }

    async fn for_item(&self, item_id: &ItemId) -> Result<Vec<StockChangeEvent>, StoreError> {
        (**self).for_item(item_id).await
    }

    async fn all(&self) -> Result<Vec<StockChangeEvent>, StoreError> {
        (**self).all().await
    }

    async fn delete_for_item(&self, item_id: &ItemId) -> Result<u64, StoreError> {
        (**self).delete_for_item(item_id).await
    }
}
