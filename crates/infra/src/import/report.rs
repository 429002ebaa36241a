use std::collections::BTreeMap;

use serde::Serialize;

pub const IMPORT_COMPLETED: &str = "Import completed";
pub const REASON_DUPLICATE_NAME: &str = "duplicate name";
pub const REASON_MISSING_FIELDS: &str = "missing required fields";

/// A skipped or errored row: the row as uploaded plus why it was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub line: u64,
    pub product: BTreeMap<String, String>,
    pub reason: String,
}

impl RowIssue {
    pub fn new(line: u64, product: BTreeMap<String, String>, reason: impl Into<String>) -> Self {
        Self {
            line,
            product,
            reason: reason.into(),
        }
    }
}

/// Summary of one import run.
///
/// `imported + skipped + errors` always equals the number of data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub message: String,
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub skipped_items: Vec<RowIssue>,
    pub error_items: Vec<RowIssue>,
}

impl Default for ImportReport {
    fn default() -> Self {
        Self {
            message: IMPORT_COMPLETED.to_string(),
            imported: 0,
            skipped: 0,
            errors: 0,
            skipped_items: Vec::new(),
            error_items: Vec::new(),
        }
    }
}

impl ImportReport {
    pub fn record_imported(&mut self) {
        self.imported += 1;
    }

    pub fn record_skipped(&mut self, issue: RowIssue) {
        self.skipped += 1;
        self.skipped_items.push(issue);
    }

    pub fn record_error(&mut self, issue: RowIssue) {
        self.errors += 1;
        self.error_items.push(issue);
    }

    pub fn rows(&self) -> usize {
        self.imported + self.skipped + self.errors
    }
}
