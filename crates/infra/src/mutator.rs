//! Inventory mutation pipeline (application-level orchestration).
//!
//! `InventoryMutator` composes a [`CatalogStore`] and a [`HistoryLedger`] and
//! owns the rules that span both:
//!
//! ```text
//! update_item(id, patch, actor)
//!   ↓
//! 1. Load the stored item (NotFound if absent)
//!   ↓
//! 2. Diff patch.stock against stored.stock → maybe a StockChangeEvent
//!   ↓
//! 3. Apply patch, re-derive status, persist (DuplicateName / Validation)
//!   ↓
//! 4. Append the event (order relative to 3 is set by HistoryOrdering)
//! ```
//!
//! Status is never taken from the caller: `ItemPatch` and `NewItem` carry no
//! status, and the domain types recompute it from stock before every write.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, instrument};

use stockroom_core::{DomainError, ItemId};
use stockroom_inventory::{HistoryEntry, Item, ItemPatch, NewItem, StockChangeEvent};

use crate::catalog_store::{CatalogStore, ItemPage, ItemQuery};
use crate::config::{HistoryOrdering, InventoryConfig};
use crate::error::StoreError;
use crate::history_ledger::HistoryLedger;

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("item not found")]
    NotFound,

    #[error("item name must be unique: {0}")]
    DuplicateName(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// The item is gone but its history could not be removed.
    #[error("item {item_id} deleted but its history was not removed: {source}")]
    PartialDelete {
        item_id: ItemId,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MutationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateName(name) => MutationError::DuplicateName(name),
            StoreError::NotFound => MutationError::NotFound,
            other => MutationError::Store(other),
        }
    }
}

impl From<DomainError> for MutationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => MutationError::Validation(msg),
        }
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedItem {
    pub item: Item,
    pub history_removed: u64,
}

/// Mutator over type-erased stores, as wired by the HTTP layer.
pub type SharedInventoryMutator = InventoryMutator<Arc<dyn CatalogStore>, Arc<dyn HistoryLedger>>;

#[derive(Debug)]
pub struct InventoryMutator<C, H> {
    catalog: C,
    ledger: H,
    config: InventoryConfig,
}

impl<C, H> InventoryMutator<C, H> {
    pub fn new(catalog: C, ledger: H, config: InventoryConfig) -> Self {
        Self {
            catalog,
            ledger,
            config,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn ledger(&self) -> &H {
        &self.ledger
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn into_parts(self) -> (C, H) {
        (self.catalog, self.ledger)
    }

    fn actor<'a>(&'a self, actor: Option<&'a str>) -> &'a str {
        actor
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.config.default_actor)
    }
}

impl<C, H> InventoryMutator<C, H>
where
    C: CatalogStore,
    H: HistoryLedger,
{
    /// Validate and insert a new item. No history event is written: history
    /// starts at the first stock change after creation.
    #[instrument(skip(self, new), fields(name = %new.name), err)]
    pub async fn create_item(&self, new: NewItem) -> Result<Item, MutationError> {
        let draft = new.into_draft()?;
        let item = self.catalog.insert(draft).await?;
        info!(item_id = %item.id, stock = item.stock, "item created");
        Ok(item)
    }

    /// Apply `patch` to an existing item, recording a stock change event when
    /// the patch carries a stock value different from the stored one.
    #[instrument(skip(self, patch), fields(item_id = %id), err)]
    pub async fn update_item(
        &self,
        id: &ItemId,
        patch: ItemPatch,
        actor: Option<&str>,
    ) -> Result<Item, MutationError> {
        let stored = self.catalog.get(id).await?.ok_or(MutationError::NotFound)?;

        let change = patch.stock_change(stored.stock).map(|new_quantity| {
            StockChangeEvent::record(
                *id,
                stored.stock,
                new_quantity,
                Some(self.actor(actor)),
                Utc::now(),
            )
        });

        let mut next = stored;
        match self.config.history_ordering {
            HistoryOrdering::RecordIntentFirst => {
                // The event is kept even if the write below fails.
                if let Some(event) = change {
                    self.append_change(event).await?;
                }
                patch.apply_to(&mut next)?;
                Ok(self.catalog.update(next).await?)
            }
            HistoryOrdering::PersistFirst => {
                patch.apply_to(&mut next)?;
                let saved = self.catalog.update(next).await?;
                if let Some(event) = change {
                    self.append_change(event).await.inspect_err(|e| {
                        error!(item_id = %saved.id, error = %e, "item saved but stock change was not recorded");
                    })?;
                }
                Ok(saved)
            }
        }
    }

    async fn append_change(&self, event: StockChangeEvent) -> Result<(), MutationError> {
        let event = self.ledger.append(event).await?;
        info!(
            item_id = %event.item_id,
            old_quantity = event.old_quantity,
            new_quantity = event.new_quantity,
            changed_by = %event.changed_by,
            "stock change recorded"
        );
        Ok(())
    }

    /// Delete an item and cascade to its history.
    #[instrument(skip(self), fields(item_id = %id), err)]
    pub async fn delete_item(&self, id: &ItemId) -> Result<DeletedItem, MutationError> {
        let item = self.catalog.delete(id).await?.ok_or(MutationError::NotFound)?;

        match self.ledger.delete_for_item(id).await {
            Ok(history_removed) => {
                info!(history_removed, "item deleted");
                Ok(DeletedItem { item, history_removed })
            }
            Err(source) => {
                error!(error = %source, "item deleted but history cascade failed");
                Err(MutationError::PartialDelete { item_id: *id, source })
            }
        }
    }

    pub async fn get_item(&self, id: &ItemId) -> Result<Item, MutationError> {
        self.catalog.get(id).await?.ok_or(MutationError::NotFound)
    }

    pub async fn list_items(&self, query: &ItemQuery) -> Result<ItemPage, MutationError> {
        Ok(self.catalog.query(query).await?)
    }

    pub async fn search_items(&self, fragment: &str) -> Result<Vec<Item>, MutationError> {
        Ok(self.catalog.search_by_name(fragment).await?)
    }

    pub async fn categories(&self) -> Result<Vec<String>, MutationError> {
        Ok(self.catalog.categories().await?)
    }

    /// History of one item, newest first. `NotFound` once the item is gone.
    pub async fn item_history(&self, id: &ItemId) -> Result<Vec<StockChangeEvent>, MutationError> {
        if self.catalog.get(id).await?.is_none() {
            return Err(MutationError::NotFound);
        }
        Ok(self.ledger.for_item(id).await?)
    }

    /// Whole ledger, newest first, each event joined with its item's name.
    pub async fn all_history(&self) -> Result<Vec<HistoryEntry>, MutationError> {
        let events = self.ledger.all().await?;
        let mut names: HashMap<ItemId, Option<String>> = HashMap::new();
        let mut entries = Vec::with_capacity(events.len());
        for event in events {
            let item_name = match names.get(&event.item_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.catalog.get(&event.item_id).await?.map(|i| i.name);
                    names.insert(event.item_id, name.clone());
                    name
                }
            };
            entries.push(HistoryEntry { event, item_name });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use stockroom_inventory::ItemStatus;

    use super::*;
    use crate::catalog_store::InMemoryCatalogStore;
    use crate::history_ledger::InMemoryHistoryLedger;

    type TestMutator = InventoryMutator<Arc<InMemoryCatalogStore>, Arc<InMemoryHistoryLedger>>;

    fn setup_with(ordering: HistoryOrdering) -> TestMutator {
        let config = InventoryConfig {
            history_ordering: ordering,
            ..InventoryConfig::default()
        };
        InventoryMutator::new(
            Arc::new(InMemoryCatalogStore::new()),
            Arc::new(InMemoryHistoryLedger::new()),
            config,
        )
    }

    fn setup() -> TestMutator {
        setup_with(HistoryOrdering::PersistFirst)
    }

    fn pen(stock: i64) -> NewItem {
        NewItem::new("Pen", "pcs", "Stationery", "Acme").with_stock(stock)
    }

    #[tokio::test]
    async fn create_derives_status_and_writes_no_history() {
        let m = setup();
        let item = m.create_item(pen(10)).await.unwrap();
        assert_eq!(item.status, ItemStatus::InStock);
        assert!(m.item_history(&item.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_and_blank_fields() {
        let m = setup();
        m.create_item(pen(1)).await.unwrap();
        assert!(matches!(
            m.create_item(pen(2)).await,
            Err(MutationError::DuplicateName(name)) if name == "Pen"
        ));
        let blank = NewItem::new("Cup", "pcs", "Kitchen", " ");
        assert!(matches!(m.create_item(blank).await, Err(MutationError::Validation(_))));
    }

    #[tokio::test]
    async fn stock_update_records_one_event_and_flips_status() {
        let m = setup();
        let item = m.create_item(pen(5)).await.unwrap();

        let updated = m
            .update_item(&item.id, ItemPatch::stock(0), Some("alice"))
            .await
            .unwrap();
        assert_eq!(updated.status, ItemStatus::OutOfStock);

        let history = m.item_history(&item.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_quantity, 5);
        assert_eq!(history[0].new_quantity, 0);
        assert_eq!(history[0].changed_by, "alice");
    }

    #[tokio::test]
    async fn unchanged_stock_records_nothing() {
        let m = setup();
        let item = m.create_item(pen(5)).await.unwrap();
        let patch = ItemPatch {
            stock: Some(5),
            brand: Some("Globex".into()),
            ..ItemPatch::default()
        };
        let updated = m.update_item(&item.id, patch, Some("alice")).await.unwrap();
        assert_eq!(updated.brand, "Globex");
        assert!(m.item_history(&item.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_actor_uses_configured_default() {
        let m = setup();
        let item = m.create_item(pen(5)).await.unwrap();
        m.update_item(&item.id, ItemPatch::stock(6), None).await.unwrap();
        m.update_item(&item.id, ItemPatch::stock(7), Some("  ")).await.unwrap();
        let history = m.item_history(&item.id).await.unwrap();
        assert!(history.iter().all(|e| e.changed_by == "Admin"));
    }

    #[tokio::test]
    async fn update_of_unknown_item_is_not_found() {
        let m = setup();
        let err = m.update_item(&ItemId::new(), ItemPatch::stock(1), None).await;
        assert!(matches!(err, Err(MutationError::NotFound)));
    }

    #[tokio::test]
    async fn persist_first_skips_event_on_duplicate_name() {
        let m = setup();
        let pen = m.create_item(pen(5)).await.unwrap();
        m.create_item(NewItem::new("Pencil", "pcs", "Stationery", "Acme")).await.unwrap();

        let patch = ItemPatch {
            name: Some("Pencil".into()),
            stock: Some(9),
            ..ItemPatch::default()
        };
        let err = m.update_item(&pen.id, patch, Some("alice")).await;
        assert!(matches!(err, Err(MutationError::DuplicateName(_))));
        assert!(m.item_history(&pen.id).await.unwrap().is_empty());
        assert_eq!(m.get_item(&pen.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn record_intent_first_keeps_event_on_duplicate_name() {
        let m = setup_with(HistoryOrdering::RecordIntentFirst);
        let pen = m.create_item(pen(5)).await.unwrap();
        m.create_item(NewItem::new("Pencil", "pcs", "Stationery", "Acme")).await.unwrap();

        let patch = ItemPatch {
            name: Some("Pencil".into()),
            stock: Some(9),
            ..ItemPatch::default()
        };
        let err = m.update_item(&pen.id, patch, Some("alice")).await;
        assert!(matches!(err, Err(MutationError::DuplicateName(_))));

        let history = m.item_history(&pen.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!((history[0].old_quantity, history[0].new_quantity), (5, 9));
        assert_eq!(m.get_item(&pen.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn delete_cascades_history() {
        let m = setup();
        let item = m.create_item(pen(5)).await.unwrap();
        m.update_item(&item.id, ItemPatch::stock(3), None).await.unwrap();
        m.update_item(&item.id, ItemPatch::stock(1), None).await.unwrap();

        let deleted = m.delete_item(&item.id).await.unwrap();
        assert_eq!(deleted.history_removed, 2);
        assert!(matches!(m.get_item(&item.id).await, Err(MutationError::NotFound)));
        assert!(matches!(m.item_history(&item.id).await, Err(MutationError::NotFound)));
        assert!(m.ledger().for_item(&item.id).await.unwrap().is_empty());
        assert!(matches!(m.delete_item(&item.id).await, Err(MutationError::NotFound)));
    }

    #[derive(Debug, Default)]
    struct CascadeFailingLedger {
        inner: InMemoryHistoryLedger,
    }

    #[async_trait]
    impl HistoryLedger for CascadeFailingLedger {
        async fn append(&self, event: StockChangeEvent) -> Result<StockChangeEvent, StoreError> {
            self.inner.append(event).await
        }

        async fn for_item(&self, item_id: &ItemId) -> Result<Vec<StockChangeEvent>, StoreError> {
            self.inner.for_item(item_id).await
        }

        async fn all(&self) -> Result<Vec<StockChangeEvent>, StoreError> {
            self.inner.all().await
        }

        async fn delete_for_item(&self, _item_id: &ItemId) -> Result<u64, StoreError> {
            Err(StoreError::backend("delete_for_item", "connection reset"))
        }
    }

    #[tokio::test]
    async fn failed_cascade_is_reported_as_partial_delete() {
        let m = InventoryMutator::new(
            InMemoryCatalogStore::new(),
            CascadeFailingLedger::default(),
            InventoryConfig::default(),
        );
        let item = m.create_item(pen(5)).await.unwrap();
        let err = m.delete_item(&item.id).await.unwrap_err();
        assert!(matches!(err, MutationError::PartialDelete { item_id, .. } if item_id == item.id));
        assert!(matches!(m.get_item(&item.id).await, Err(MutationError::NotFound)));
    }

    #[tokio::test]
    async fn all_history_joins_item_names() {
        let m = setup();
        let pen = m.create_item(pen(5)).await.unwrap();
        let cup = m
            .create_item(NewItem::new("Cup", "pcs", "Kitchen", "Acme"))
            .await
            .unwrap();
        m.update_item(&pen.id, ItemPatch::stock(4), None).await.unwrap();
        m.update_item(&cup.id, ItemPatch::stock(2), None).await.unwrap();

        let entries = m.all_history().await.unwrap();
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            let expected = if entry.event.item_id == pen.id { "Pen" } else { "Cup" };
            assert_eq!(entry.item_name.as_deref(), Some(expected));
        }

        m.delete_item(&cup.id).await.unwrap();
        let entries = m.all_history().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item_name.as_deref(), Some("Pen"));
    }
}
