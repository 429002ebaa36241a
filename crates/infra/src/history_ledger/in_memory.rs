use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_core::ItemId;
use stockroom_inventory::{StockChangeEvent, sort_newest_first};

use super::r#trait::HistoryLedger;
use crate::error::StoreError;

/// In-memory append-only history ledger.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryHistoryLedger {
    events: RwLock<Vec<StockChangeEvent>>,
}

impl InMemoryHistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryLedger for InMemoryHistoryLedger {
    async fn append(&self, event: StockChangeEvent) -> Result<StockChangeEvent, StoreError> {
        let mut events = self.events.write().map_err(|_| StoreError::poisoned("append"))?;
        events.push(event.clone());
        Ok(event)
    }

    async fn for_item(&self, item_id: &ItemId) -> Result<Vec<StockChangeEvent>, StoreError> {
        let events = self.events.read().map_err(|_| StoreError::poisoned("for_item"))?;
        let mut found: Vec<_> = events.iter().filter(|e| e.item_id == *item_id).cloned().collect();
        sort_newest_first(&mut found);
        Ok(found)
    }

    async fn all(&self) -> Result<Vec<StockChangeEvent>, StoreError> {
        let events = self.events.read().map_err(|_| StoreError::poisoned("all"))?;
        let mut all = events.clone();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn delete_for_item(&self, item_id: &ItemId) -> Result<u64, StoreError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| StoreError::poisoned("delete_for_item"))?;
        let before = events.len();
        events.retain(|e| e.item_id != *item_id);
        Ok((before - events.len()) as u64)
    }
}
