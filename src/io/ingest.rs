//! CSV ingest for a single numeric column.
//!
//! This module is responsible for turning an air-quality CSV into a clean
//! `Vec<f64>` for the requested column (usually `no2`).
//!
//! Design goals:
//! - **Pure header lookup**: the column is resolved without rewriting the
//!   table's headers (exact name first, then its lower-cased form, then a
//!   case-insensitive match)
//! - **Missing values are dropped**, not errors
//! - **Row-level validation** (skip unparsable cells, but report what happened)
//! - **Separation of concerns**: no perturbation or fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::error::AppError;

/// Cell spellings treated as missing (compared case-insensitively).
const MISSING_MARKERS: [&str; 9] = [
    "", "na", "n/a", "nan", "-nan", "null", "none", "#n/a", "<na>",
];

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the extracted values plus bookkeeping.
#[derive(Debug, Clone)]
pub struct ColumnData {
    /// Header as spelled in the file.
    pub column: String,
    pub values: Vec<f64>,
    pub rows_read: usize,
    pub missing: usize,
    pub invalid: Vec<RowError>,
}

/// Outcome of parsing one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Missing,
    Value(f64),
    Invalid,
}

/// Load one numeric column from a CSV file, dropping missing entries.
pub fn load_column(path: &Path, column: &str) -> Result<ColumnData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}'", path.display()), e))?;
    info!(path = %path.display(), column, "loading column");
    read_column(file, column)
}

/// Same as [`load_column`] for any reader (used by tests and stdin-like sources).
pub fn read_column<R: Read>(source: R, column: &str) -> Result<ColumnData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::csv("Failed to read CSV headers", e))?
        .clone();

    let idx = resolve_column(&headers, column).ok_or_else(|| AppError::MissingColumn {
        column: column.to_string(),
        available: headers.iter().map(str::to_string).collect(),
    })?;
    let resolved = headers.get(idx).unwrap_or(column).to_string();
    debug!(requested = column, resolved = %resolved, index = idx, "resolved column");

    let mut values = Vec::new();
    let mut invalid = Vec::new();
    let mut missing = 0usize;
    let mut rows_read = 0usize;

    for (i, result) in reader.records().enumerate() {
        // Line 1 is the header row.
        let line = i + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                invalid.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let raw = record.get(idx).unwrap_or("");
        match parse_cell(raw) {
            Cell::Value(v) => values.push(v),
            Cell::Missing => missing += 1,
            Cell::Invalid => invalid.push(RowError {
                line,
                message: format!("Non-numeric `{resolved}` value '{raw}'"),
            }),
        }
    }

    if !invalid.is_empty() {
        warn!(
            skipped = invalid.len(),
            first_line = invalid[0].line,
            first_error = %invalid[0].message,
            "skipped rows with unusable values"
        );
    }

    if values.is_empty() {
        return Err(AppError::EmptyData { column: resolved });
    }

    info!(rows_read, used = values.len(), missing, "column loaded");

    Ok(ColumnData {
        column: resolved,
        values,
        rows_read,
        missing,
        invalid,
    })
}

/// Find the index of `name` among `headers` without modifying them.
///
/// Tries, in order: the exact name, the lower-cased name, and a case-insensitive
/// match against trimmed headers (ignoring a UTF-8 BOM on the first header).
pub fn resolve_column(headers: &StringRecord, name: &str) -> Option<usize> {
    if let Some(idx) = headers.iter().position(|h| h == name) {
        return Some(idx);
    }
    let lowered = name.to_lowercase();
    if let Some(idx) = headers.iter().position(|h| h == lowered) {
        return Some(idx);
    }
    headers
        .iter()
        .position(|h| normalize_header_name(h) == normalize_header_name(name))
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, the lookup reports a missing column.
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

fn parse_cell(raw: &str) -> Cell {
    let s = raw.trim();
    if MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
        return Cell::Missing;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Cell::Missing,
        Ok(v) => Cell::Value(v),
        Err(_) => Cell::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    #[test]
    fn exact_header_wins_over_lowercase() {
        let h = headers(&["NO2", "no2"]);
        assert_eq!(resolve_column(&h, "NO2"), Some(0));
        assert_eq!(resolve_column(&h, "no2"), Some(1));
    }

    #[test]
    fn lowercase_and_case_insensitive_fallbacks() {
        assert_eq!(resolve_column(&headers(&["so2", "no2"]), "NO2"), Some(1));
        assert_eq!(resolve_column(&headers(&["SO2", " No2 "]), "no2"), Some(1));
        assert_eq!(resolve_column(&headers(&["\u{feff}NO2", "x"]), "no2"), Some(0));
        assert_eq!(resolve_column(&headers(&["so2", "rspm"]), "no2"), None);
    }

    #[test]
    fn parse_cell_classifies_values() {
        assert_eq!(parse_cell("12.5"), Cell::Value(12.5));
        assert_eq!(parse_cell(" 3 "), Cell::Value(3.0));
        assert_eq!(parse_cell(""), Cell::Missing);
        assert_eq!(parse_cell("NaN"), Cell::Missing);
        assert_eq!(parse_cell("NA"), Cell::Missing);
        assert_eq!(parse_cell("abc"), Cell::Invalid);
        assert_eq!(parse_cell("-"), Cell::Invalid);
    }

    #[test]
    fn read_column_drops_missing_and_counts_invalid() {
        let csv = "stn_code,SO2,NO2\n1,4.8,17.4\n2,3.1,\n3,6.2,NA\n4,6.3,bad\n5,4.7,7.5\n";
        let data = read_column(csv.as_bytes(), "no2").unwrap();
        assert_eq!(data.column, "NO2");
        assert_eq!(data.values, vec![17.4, 7.5]);
        assert_eq!(data.rows_read, 5);
        assert_eq!(data.missing, 2);
        assert_eq!(data.invalid.len(), 1);
        assert_eq!(data.invalid[0].line, 5);
    }

    #[test]
    fn dash_is_an_invalid_value_not_a_missing_one() {
        let csv = "no2\n1.5\n-\n2.5\n";
        let data = read_column(csv.as_bytes(), "no2").unwrap();
        assert_eq!(data.values, vec![1.5, 2.5]);
        assert_eq!(data.missing, 0);
        assert_eq!(data.invalid.len(), 1);
        assert_eq!(data.invalid[0].line, 3);
    }

    #[test]
    fn short_rows_count_as_missing() {
        let csv = "a,no2\n1,2.0\n2\n3,4.0\n";
        let data = read_column(csv.as_bytes(), "no2").unwrap();
        assert_eq!(data.values, vec![2.0, 4.0]);
        assert_eq!(data.missing, 1);
    }

    #[test]
    fn all_missing_is_empty_data() {
        let csv = "no2\n\nNA\nnan\n";
        let err = read_column(csv.as_bytes(), "no2").unwrap_err();
        assert!(matches!(err, AppError::EmptyData { .. }), "{err:?}");
    }

    #[test]
    fn absent_column_is_missing_column() {
        let csv = "so2,rspm\n1,2\n";
        let err = read_column(csv.as_bytes(), "no2").unwrap_err();
        match err {
            AppError::MissingColumn { column, available } => {
                assert_eq!(column, "no2");
                assert_eq!(available, vec!["so2".to_string(), "rspm".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
