//! End-to-end flows across the catalog, the ledger, import and export.
//!
//! Verifies:
//! - Stock edits made through the mutator are reflected in the ledger
//! - Imported items are editable and their history starts at the first edit
//! - Deleting an item removes it from export and history

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_inventory::{ItemPatch, ItemStatus, NewItem};

    use crate::catalog_store::{CatalogStore, InMemoryCatalogStore, ItemQuery, Pagination, Sort};
    use crate::config::InventoryConfig;
    use crate::export::export_csv;
    use crate::history_ledger::{HistoryLedger, InMemoryHistoryLedger};
    use crate::import::ImportPipeline;
    use crate::mutator::{InventoryMutator, MutationError};

    type Mutator = InventoryMutator<Arc<InMemoryCatalogStore>, Arc<InMemoryHistoryLedger>>;

    fn setup() -> (Mutator, ImportPipeline<Arc<InMemoryCatalogStore>>) {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let ledger = Arc::new(InMemoryHistoryLedger::new());
        let mutator = InventoryMutator::new(catalog.clone(), ledger, InventoryConfig::default());
        (mutator, ImportPipeline::new(catalog))
    }

    #[tokio::test]
    async fn imported_item_edit_is_recorded() {
        let (mutator, import) = setup();
        let report = import
            .import_bytes(b"name,unit,category,brand,stock\nPen,pcs,Stationery,Acme,0\n")
            .await
            .unwrap();
        assert_eq!(report.imported, 1);

        let pen = mutator.catalog().find_by_name("Pen").await.unwrap().unwrap();
        assert!(mutator.item_history(&pen.id).await.unwrap().is_empty());

        let updated = mutator
            .update_item(&pen.id, ItemPatch::stock(8), Some("alice"))
            .await
            .unwrap();
        assert_eq!(updated.status, ItemStatus::InStock);

        let history = mutator.item_history(&pen.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!((history[0].old_quantity, history[0].new_quantity), (0, 8));
        assert_eq!(history[0].changed_by, "alice");
    }

    #[tokio::test]
    async fn listing_filters_and_paginates_imported_rows() {
        let (mutator, import) = setup();
        let mut csv = String::from("name,unit,category,brand,stock\n");
        for i in 0..25 {
            let category = if i % 2 == 0 { "Even" } else { "Odd" };
            csv.push_str(&format!("Item {i:02},pcs,{category},Acme,{i}\n"));
        }
        import.import_bytes(csv.as_bytes()).await.unwrap();

        let query = ItemQuery {
            category: Some("Even".into()),
            sort: "-stock".parse::<Sort>().unwrap(),
            pagination: Pagination::new(Some(2), Some(5)),
            ..Default::default()
        };
        let page = mutator.list_items(&query).await.unwrap();
        assert_eq!(page.total, 13);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].stock, 14);

        assert_eq!(mutator.categories().await.unwrap(), vec!["Even", "Odd"]);
    }

    #[tokio::test]
    async fn delete_removes_item_from_export_and_history() {
        let (mutator, _) = setup();
        let cup = mutator
            .create_item(NewItem::new("Cup", "pcs", "Kitchen", "Acme").with_stock(2))
            .await
            .unwrap();
        mutator.create_item(NewItem::new("Pen", "pcs", "Office", "Acme")).await.unwrap();
        mutator.update_item(&cup.id, ItemPatch::stock(0), None).await.unwrap();

        let deleted = mutator.delete_item(&cup.id).await.unwrap();
        assert_eq!(deleted.history_removed, 1);
        assert!(mutator.ledger().for_item(&cup.id).await.unwrap().is_empty());
        assert!(matches!(
            mutator.item_history(&cup.id).await,
            Err(MutationError::NotFound)
        ));

        let csv = export_csv(mutator.catalog().as_ref()).await.unwrap();
        assert!(!csv.contains("Cup"));
        assert!(csv.contains("\"Pen\""));
    }
}
