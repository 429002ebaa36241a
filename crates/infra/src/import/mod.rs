//! CSV import: upload spooling, row parsing, and the sequential pipeline.

pub mod parse;
pub mod pipeline;
pub mod report;
pub mod upload;

use thiserror::Error;

pub use parse::{COLUMNS, CsvRow, coerce_stock, parse_rows};
pub use pipeline::ImportPipeline;
pub use report::{IMPORT_COMPLETED, ImportReport, RowIssue};
pub use upload::UploadedFile;

/// Failures that abort a whole import. Row-level problems end up in the
/// [`ImportReport`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no file uploaded")]
    MissingFile,

    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("upload could not be read: {0}")]
    Io(#[source] std::io::Error),

    #[error("upload could not be parsed: {0}")]
    Parse(String),
}
