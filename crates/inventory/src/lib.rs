//! Inventory domain module.
//!
//! This crate contains the business rules for catalog items and their stock
//! history, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod history;
pub mod item;

pub use history::{DEFAULT_CHANGED_BY, HistoryEntry, StockChangeEvent, sort_newest_first};
pub use item::{
    Item, ItemDraft, ItemPatch, ItemStatus, NewItem, derive_status, is_blank,
};
