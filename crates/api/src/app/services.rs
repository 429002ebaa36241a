//! Store wiring: Postgres when a database URL is configured, in-memory otherwise.

use std::sync::Arc;

use tracing::{info, warn};

use stockroom_infra::catalog_store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore};
use stockroom_infra::config::AppConfig;
use stockroom_infra::db;
use stockroom_infra::history_ledger::{HistoryLedger, InMemoryHistoryLedger, PostgresHistoryLedger};
use stockroom_infra::import::ImportPipeline;
use stockroom_infra::{InventoryMutator, SharedInventoryMutator, StoreError};

/// Everything request handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub mutator: SharedInventoryMutator,
    pub importer: ImportPipeline<Arc<dyn CatalogStore>>,
    pub config: AppConfig,
}

impl AppServices {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn HistoryLedger>,
        config: AppConfig,
    ) -> Self {
        let mutator = InventoryMutator::new(catalog.clone(), ledger, config.inventory.clone());
        Self {
            mutator,
            importer: ImportPipeline::new(catalog),
            config,
        }
    }

    /// In-memory stores (dev/test).
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            Arc::new(InMemoryCatalogStore::new()),
            Arc::new(InMemoryHistoryLedger::new()),
            config,
        )
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        self.mutator.catalog()
    }
}

pub async fn build_services(config: AppConfig) -> Result<AppServices, StoreError> {
    match config.database.url.clone() {
        Some(url) => {
            let pool = db::connect(&url, &config.database).await?;
            info!("using postgres stores");
            Ok(AppServices::new(
                Arc::new(PostgresCatalogStore::new(pool.clone())),
                Arc::new(PostgresHistoryLedger::new(pool)),
                config,
            ))
        }
        None => {
            warn!("database.url not set; using in-memory stores");
            Ok(AppServices::in_memory(config))
        }
    }
}
