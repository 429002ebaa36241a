//! Tabular upload parsing.

use std::collections::BTreeMap;

use super::ImportError;

/// Columns understood by the importer. Matching against the header is
/// case-insensitive and position-independent.
pub const COLUMNS: [&str; 7] = ["name", "unit", "category", "brand", "stock", "status", "image"];

/// One data row keyed by the header as it appeared in the upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line of the record in the upload.
    pub line: u64,
    pub fields: BTreeMap<String, String>,
}

impl CsvRow {
    /// Case-insensitive field lookup. Empty values count as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

/// A record the CSV reader could not decode; it becomes an errored row.
///
/// `fields` holds whatever cells were recovered (invalid UTF-8 replaced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDecodeError {
    pub line: u64,
    pub fields: BTreeMap<String, String>,
    pub reason: String,
}

/// Parse `bytes` into rows. Only an unreadable header fails the whole parse;
/// bad records are returned in place so they can be reported individually.
///
/// Cell values are kept verbatim (only headers are trimmed) so names compare
/// exactly against the catalog. Rows shorter than the header simply lack the
/// trailing columns.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<Result<CsvRow, RowDecodeError>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(ImportError::Parse("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                rows.push(Err(RowDecodeError {
                    line: e.position().map(|p| p.line()).unwrap_or_default(),
                    fields: BTreeMap::new(),
                    reason: e.to_string(),
                }));
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let mut fields = BTreeMap::new();
        let mut invalid = None;
        for (idx, raw) in record.iter().enumerate() {
            let value = match std::str::from_utf8(raw) {
                Ok(v) => v.to_string(),
                Err(e) => {
                    if invalid.is_none() {
                        invalid = Some(format!("invalid UTF-8 in field {}: {e}", idx + 1));
                    }
                    String::from_utf8_lossy(raw).into_owned()
                }
            };
            let key = match headers.get(idx) {
                Some(h) if !h.is_empty() => h.clone(),
                _ => format!("_{idx}"),
            };
            fields.entry(key).or_insert(value);
        }

        rows.push(match invalid {
            None => Ok(CsvRow { line, fields }),
            Some(reason) => Err(RowDecodeError { line, fields, reason }),
        });
    }
    Ok(rows)
}

/// Coerce a stock cell to an integer: the leading integer prefix is used
/// (`"12abc"` → 12, `"3.9"` → 3), anything unparseable is 0. Out-of-range
/// values saturate at the `i64` bounds.
pub fn coerce_stock(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else { return 0 };
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|d| i64::from(d - b'0'))
        .fold(0i64, |acc, d| {
            let shifted = acc.saturating_mul(10);
            if negative { shifted.saturating_sub(d) } else { shifted.saturating_add(d) }
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive_and_positional() {
        let rows = parse_rows(b"Brand,NAME,unit,Category\nAcme,Pen,pcs,Stationery\n").unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.get("name"), Some("Pen"));
        assert_eq!(row.get("brand"), Some("Acme"));
        assert_eq!(row.get("stock"), None);
        assert_eq!(row.line, 2);
    }

    #[test]
    fn short_rows_lack_trailing_columns() {
        let rows = parse_rows(b"name,unit,category,brand,stock\nPen,pcs,Stationery\nCup,pcs,Kitchen,Acme,2\n").unwrap();
        assert_eq!(rows.len(), 2);
        let short = rows[0].as_ref().unwrap();
        assert_eq!(short.line, 2);
        assert_eq!(short.get("category"), Some("Stationery"));
        assert_eq!(short.get("brand"), None);
        assert_eq!(short.fields.len(), 3);
        assert_eq!(rows[1].as_ref().unwrap().get("stock"), Some("2"));
    }

    #[test]
    fn cell_values_are_not_trimmed() {
        let rows = parse_rows(b" Name , Unit \n\"Pen \", pcs\n").unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.get("name"), Some("Pen "));
        assert_eq!(row.get("unit"), Some(" pcs"));
    }

    #[test]
    fn empty_cells_read_as_absent() {
        let rows = parse_rows(b"name,unit,category,brand\nPen,pcs,,\n").unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.get("unit"), Some("pcs"));
        assert_eq!(row.get("brand"), None);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let rows = parse_rows(b"name,unit,category,brand\n\"Pen, blue\",pcs,\"Office, misc\",Acme\n").unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.get("name"), Some("Pen, blue"));
        assert_eq!(row.get("category"), Some("Office, misc"));
    }

    #[test]
    fn invalid_utf8_record_is_reported_in_place() {
        let mut bytes = b"name,unit\nPen,pcs\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b',', b'x', b'\n']);
        let rows = parse_rows(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_ok());
        let bad = rows[1].as_ref().unwrap_err();
        assert_eq!(bad.line, 3);
        assert_eq!(bad.fields["unit"], "x");
        assert!(bad.fields.contains_key("name"));
    }

    #[test]
    fn empty_upload_is_a_parse_error() {
        assert!(matches!(parse_rows(b""), Err(ImportError::Parse(_))));
    }

    #[test]
    fn stock_coercion() {
        assert_eq!(coerce_stock(Some("10")), 10);
        assert_eq!(coerce_stock(Some(" 12abc")), 12);
        assert_eq!(coerce_stock(Some("3.9")), 3);
        assert_eq!(coerce_stock(Some("-4")), -4);
        assert_eq!(coerce_stock(Some("abc")), 0);
        assert_eq!(coerce_stock(Some("")), 0);
        assert_eq!(coerce_stock(None), 0);
        assert_eq!(coerce_stock(Some("99999999999999999999999")), i64::MAX);
        assert_eq!(coerce_stock(Some("-9223372036854775808")), i64::MIN);
        assert_eq!(coerce_stock(Some("-99999999999999999999999")), i64::MIN);
    }

    proptest! {
        #[test]
        fn coercion_matches_integer_parse(n in any::<i64>()) {
            prop_assert_eq!(coerce_stock(Some(&n.to_string())), n);
        }
    }
}
