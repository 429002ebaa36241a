//! CSV export of the whole catalog.

use tracing::{info, instrument};

use stockroom_inventory::Item;

use crate::catalog_store::CatalogStore;
use crate::error::StoreError;

pub const CSV_HEADER: &str = "Name,Unit,Category,Brand,Stock,Status,Image";
pub const EXPORT_FILENAME: &str = "products.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Render every item in the catalog, ordered by name ascending.
#[instrument(skip_all)]
pub async fn export_csv<C>(catalog: &C) -> Result<String, StoreError>
where
    C: CatalogStore + ?Sized,
{
    let items = catalog.list_all_by_name().await?;
    let csv = render_csv(&items).map_err(|e| StoreError::backend("export", e.to_string()))?;
    info!(rows = items.len(), "catalog exported");
    Ok(csv)
}

/// Header line followed by one line per item, `\n` separated.
///
/// The name is always quoted; the remaining fields go through the CSV writer,
/// which quotes only when a value contains a delimiter, quote, or line break.
pub fn render_csv(items: &[Item]) -> Result<String, csv::Error> {
    let mut out = String::with_capacity(CSV_HEADER.len() + items.len() * 64);
    out.push_str(CSV_HEADER);
    for item in items {
        out.push('\n');
        out.push_str(&quoted(&item.name));
        out.push(',');
        out.push_str(&render_tail(item)?);
    }
    Ok(out)
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn render_tail(item: &Item) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(64));
    let stock = item.stock.to_string();
    writer.write_record([
        item.unit.as_str(),
        item.category.as_str(),
        item.brand.as_str(),
        stock.as_str(),
        item.status.label(),
        item.image.as_str(),
    ])?;

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let line = bytes.strip_suffix(b"\n").unwrap_or(&bytes);
    Ok(String::from_utf8_lossy(line).into_owned())
}
