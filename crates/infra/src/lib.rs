//! Infrastructure layer: catalog and history stores, import/export, config.

pub mod catalog_store;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod history_ledger;
pub mod import;
pub mod mutator;

#[cfg(test)]
mod integration_tests;

pub use error::StoreError;
pub use mutator::{DeletedItem, InventoryMutator, MutationError, SharedInventoryMutator};
