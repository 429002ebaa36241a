//! Catalog store boundary: the persistent collection of items.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use query::{ALL_CATEGORIES, ItemPage, ItemQuery, Pagination, Sort, SortKey};
pub use r#trait::CatalogStore;
