use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::ItemId;
use stockroom_inventory::{Item, ItemDraft};

use super::query::{ItemPage, ItemQuery};
use crate::error::StoreError;

/// Persistent collection of items keyed by a unique name.
///
/// The store is the sole arbiter of conflicting writes: `insert` and `update`
/// must reject a name already held by another item with
/// [`StoreError::DuplicateName`], atomically with the write itself. Timestamps
/// are owned by the store (`created_at`/`updated_at` are set on insert,
/// `updated_at` is bumped on update).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a new item, assigning its id and timestamps.
    async fn insert(&self, draft: ItemDraft) -> Result<Item, StoreError>;

    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError>;

    /// Exact, case-sensitive name lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError>;

    /// Replace the stored fields of `item.id`.
    async fn update(&self, item: Item) -> Result<Item, StoreError>;

    /// Remove an item, returning it if it existed.
    async fn delete(&self, id: &ItemId) -> Result<Option<Item>, StoreError>;

    /// Filtered, sorted, paginated scan.
    async fn query(&self, query: &ItemQuery) -> Result<ItemPage, StoreError>;

    /// Unpaginated case-insensitive substring search on name, ordered by name.
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Item>, StoreError>;

    /// The whole catalog ordered by name ascending.
    async fn list_all_by_name(&self) -> Result<Vec<Item>, StoreError>;

    /// Distinct categories, sorted.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert(&self, draft: ItemDraft) -> Result<Item, StoreError> {
        (**self).insert(draft).await
    }

    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn update(&self, item: Item) -> Result<Item, StoreError> {
        (**self).update(item).await
    }

    async fn delete(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        (**self).delete(id).await
    }

    async fn query(&self, query: &ItemQuery) -> Result<ItemPage, StoreError> {
        (**self).query(query).await
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Item>, StoreError> {
        (**self).search_by_name(fragment).await
    }

    async fn list_all_by_name(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list_all_by_name().await
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        (**self).categories().await
    }
}
