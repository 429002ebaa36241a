//! Bulk import of uploaded catalog rows.
//!
//! Rows are handled strictly in upload order, one at a time, so a name that
//! appears twice in the same file is imported once and skipped afterwards.
//! Per-row failures are collected into the report and never abort the run.

use tracing::{info, instrument, warn};

use stockroom_inventory::{ItemDraft, ItemStatus, is_blank};

use super::parse::{CsvRow, coerce_stock, parse_rows};
use super::report::{ImportReport, REASON_DUPLICATE_NAME, REASON_MISSING_FIELDS, RowIssue};
use super::upload::UploadedFile;
use super::ImportError;
use crate::catalog_store::CatalogStore;

enum RowOutcome {
    Imported,
    Skipped(&'static str),
    Errored(String),
}

pub struct ImportPipeline<C> {
    catalog: C,
}

impl<C> ImportPipeline<C>
where
    C: CatalogStore,
{
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Import an uploaded file. The upload is consumed and its temp file is
    /// removed before this returns, whatever the outcome.
    #[instrument(skip_all)]
    pub async fn run(&self, upload: Option<UploadedFile>) -> Result<ImportReport, ImportError> {
        let mut upload = upload.ok_or(ImportError::MissingFile)?;
        let bytes = upload.read_contents().await?;
        drop(upload);

        self.import_bytes(&bytes).await
    }

    /// Import an already-buffered upload body.
    pub async fn import_bytes(&self, bytes: &[u8]) -> Result<ImportReport, ImportError> {
        let rows = parse_rows(bytes)?;
        let mut report = ImportReport::default();

        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(decode) => {
                    warn!(line = decode.line, reason = %decode.reason, "import row unreadable");
                    report.record_error(RowIssue::new(decode.line, decode.fields, decode.reason));
                    continue;
                }
            };

            match self.import_row(&row).await {
                RowOutcome::Imported => report.record_imported(),
                RowOutcome::Skipped(reason) => {
                    report.record_skipped(RowIssue::new(row.line, row.fields, reason));
                }
                RowOutcome::Errored(reason) => {
                    warn!(line = row.line, reason = %reason, "import row failed");
                    report.record_error(RowIssue::new(row.line, row.fields, reason));
                }
            }
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            errors = report.errors,
            "import completed"
        );
        Ok(report)
    }

    async fn import_row(&self, row: &CsvRow) -> RowOutcome {
        if let Some(name) = row.get("name") {
            match self.catalog.find_by_name(name).await {
                Ok(Some(_)) => return RowOutcome::Skipped(REASON_DUPLICATE_NAME),
                Ok(None) => {}
                Err(e) => return RowOutcome::Errored(e.to_string()),
            }
        }

        let (name, unit, category, brand) = match (
            row.get("name"),
            row.get("unit"),
            row.get("category"),
            row.get("brand"),
        ) {
            (Some(name), Some(unit), Some(category), Some(brand))
                if ![name, unit, category, brand].into_iter().any(|v| is_blank(Some(v))) =>
            {
                (name, unit, category, brand)
            }
            _ => return RowOutcome::Errored(REASON_MISSING_FIELDS.to_string()),
        };

        let stock = coerce_stock(row.get("stock"));
        let status = row.get("status").and_then(ItemStatus::parse_label);
        let image = row.get("image").map(str::to_string);
        let draft = ItemDraft::imported(name, unit, category, brand, stock, status, image);

        match self.catalog.insert(draft).await {
            Ok(_) => RowOutcome::Imported,
            Err(e) => RowOutcome::Errored(e.to_string()),
        }
    }
}
