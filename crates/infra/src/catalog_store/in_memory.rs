use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{Entity, ItemId};
use stockroom_inventory::{Item, ItemDraft};

use super::query::{ItemPage, ItemQuery, Sort, contains_ignore_case};
use super::r#trait::CatalogStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<ItemId, Item>,
    by_name: HashMap<String, ItemId>,
}

/// In-memory catalog store.
///
/// Intended for tests/dev. The item map and the name index live under one lock
/// so the uniqueness check and the write are atomic.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Inner>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut items: Vec<Item>, sort: Sort) -> Vec<Item> {
        items.sort_by(|a, b| sort.compare(a, b));
        items
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, draft: ItemDraft) -> Result<Item, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::poisoned("insert"))?;
        if inner.by_name.contains_key(&draft.name) {
            return Err(StoreError::DuplicateName(draft.name));
        }

        let item = Item::from_draft(ItemId::new(), draft, Utc::now());
        inner.by_name.insert(item.name.clone(), *item.id());
        inner.items.insert(*item.id(), item.clone());
        Ok(item)
    }

    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::poisoned("get"))?;
        Ok(inner.items.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::poisoned("find_by_name"))?;
        Ok(inner
            .by_name
            .get(name)
            .and_then(|id| inner.items.get(id))
            .cloned())
    }

    async fn update(&self, mut item: Item) -> Result<Item, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::poisoned("update"))?;

        let previous_name = match inner.items.get(item.id()) {
            Some(stored) => stored.name.clone(),
            None => return Err(StoreError::NotFound),
        };
        if previous_name != item.name {
            if inner.by_name.contains_key(&item.name) {
                return Err(StoreError::DuplicateName(item.name));
            }
            inner.by_name.remove(&previous_name);
            inner.by_name.insert(item.name.clone(), *item.id());
        }

        item.updated_at = Utc::now();
        inner.items.insert(*item.id(), item.clone());
        Ok(item)
    }

    async fn delete(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::poisoned("delete"))?;
        let removed = inner.items.remove(id);
        if let Some(item) = &removed {
            inner.by_name.remove(&item.name);
        }
        Ok(removed)
    }

    async fn query(&self, query: &ItemQuery) -> Result<ItemPage, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::poisoned("query"))?;
        let matching: Vec<Item> = inner
            .items
            .values()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        let total = matching.len() as u64;

        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let page = Self::sorted(matching, query.sort)
            .into_iter()
            .skip(offset)
            .take(query.pagination.limit as usize)
            .collect();

        Ok(ItemPage::new(page, total, query.pagination))
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Item>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::poisoned("search_by_name"))?;
        let found = inner
            .items
            .values()
            .filter(|item| contains_ignore_case(&item.name, fragment))
            .cloned()
            .collect();
        Ok(Self::sorted(found, Sort::default()))
    }

    async fn list_all_by_name(&self) -> Result<Vec<Item>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::poisoned("list_all_by_name"))?;
        Ok(Self::sorted(inner.items.values().cloned().collect(), Sort::default()))
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::poisoned("categories"))?;
        let distinct: BTreeSet<String> = inner.items.values().map(|i| i.category.clone()).collect();
        Ok(distinct.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use stockroom_inventory::{ItemStatus, NewItem};

    use super::*;
    use crate::catalog_store::query::{Pagination, SortKey};

    fn draft(name: &str, category: &str, stock: i64) -> ItemDraft {
        NewItem::new(name, "pcs", category, "Acme")
            .with_stock(stock)
            .into_draft()
            .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_timestamps() {
        let store = InMemoryCatalogStore::new();
        let item = store.insert(draft("Pen", "Stationery", 3)).await.unwrap();
        assert_eq!(item.created_at, item.updated_at);
        assert_eq!(item.status, ItemStatus::InStock);
        assert_eq!(store.get(&item.id).await.unwrap(), Some(item.clone()));
        assert_eq!(store.find_by_name("Pen").await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn name_uniqueness_is_case_sensitive() {
        let store = InMemoryCatalogStore::new();
        store.insert(draft("Pen", "Stationery", 0)).await.unwrap();
        let err = store.insert(draft("Pen", "Stationery", 0)).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateName("Pen".into()));
        assert!(store.insert(draft("pen", "Stationery", 0)).await.is_ok());
        assert_eq!(store.find_by_name("PEN").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rename_moves_name_index() {
        let store = InMemoryCatalogStore::new();
        let mut item = store.insert(draft("Pen", "Stationery", 0)).await.unwrap();
        let other = store.insert(draft("Pencil", "Stationery", 0)).await.unwrap();

        item.name = "Pencil".into();
        let err = store.update(item.clone()).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateName("Pencil".into()));

        item.name = "Marker".into();
        let updated = store.update(item).await.unwrap();
        assert!(updated.updated_at >= updated.created_at);
        assert_eq!(store.find_by_name("Pen").await.unwrap(), None);
        assert_eq!(store.find_by_name("Marker").await.unwrap().unwrap().id, updated.id);
        assert_eq!(store.find_by_name("Pencil").await.unwrap().unwrap().id, other.id);
    }

    #[tokio::test]
    async fn update_of_missing_item_is_not_found() {
        let store = InMemoryCatalogStore::new();
        let item = store.insert(draft("Pen", "Stationery", 0)).await.unwrap();
        store.delete(&item.id).await.unwrap();
        assert_eq!(store.update(item).await.unwrap_err(), StoreError::NotFound);
    }

    #[tokio::test]
    async fn query_filters_sorts_and_paginates() {
        let store = InMemoryCatalogStore::new();
        for (name, category, stock) in [
            ("Blue Pen", "Stationery", 4),
            ("Red Pen", "Stationery", 9),
            ("Stapler", "Office", 1),
            ("Pen Holder", "Office", 0),
        ] {
            store.insert(draft(name, category, stock)).await.unwrap();
        }

        let q = ItemQuery {
            name: Some("pen".into()),
            sort: Sort {
                key: SortKey::Stock,
                descending: true,
            },
            pagination: Pagination::new(Some(1), Some(2)),
            ..ItemQuery::default()
        };
        let page = store.query(&q).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        let names: Vec<_> = page.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Red Pen", "Blue Pen"]);

        let q = ItemQuery {
            category: Some("Office".into()),
            ..ItemQuery::default()
        };
        let page = store.query(&q).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Pen Holder", "Stapler"]);

        assert_eq!(store.categories().await.unwrap(), vec!["Office", "Stationery"]);
        assert_eq!(store.search_by_name("PEN").await.unwrap().len(), 3);
    }
}
