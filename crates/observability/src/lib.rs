//! Process-wide tracing/logging setup shared by the binaries.

pub mod tracing;

pub use tracing::{DEFAULT_FILTER, LogFormat};

/// Initialize JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}
