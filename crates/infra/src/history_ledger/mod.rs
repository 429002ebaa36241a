//! History ledger boundary: append-only stock change events.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryHistoryLedger;
pub use postgres::PostgresHistoryLedger;
pub use r#trait::HistoryLedger;
