//! Tabular input contract — the boundary between loaders and the engine.
//!
//! A price table must carry a date column plus `open`, `high`, `low` and `close`.
//! Header matching is case-insensitive and surrounding whitespace is ignored.
//! Extra columns are allowed and ignored.
//!
//! The check is standalone so callers can reject a table before building a run.

use thiserror::Error;

/// Name of the date index column.
pub const DATE_COLUMN: &str = "date";

/// Required price columns, in the order they are resolved.
pub const PRICE_COLUMNS: [&str; 4] = ["open", "high", "low", "close"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OhlcColumns {
    pub date: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
}

impl OhlcColumns {
    /// Resolve the required columns from a header row.
    ///
    /// Reports the first missing column, date first, then open/high/low/close.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        Ok(Self {
            date: find_column(headers, DATE_COLUMN)?,
            open: find_column(headers, PRICE_COLUMNS[0])?,
            high: find_column(headers, PRICE_COLUMNS[1])?,
            low: find_column(headers, PRICE_COLUMNS[2])?,
            close: find_column(headers, PRICE_COLUMNS[3])?,
        })
    }
}

/// True if all four price columns are present (the date column is not checked).
pub fn has_price_columns<S: AsRef<str>>(headers: &[S]) -> bool {
    PRICE_COLUMNS
        .iter()
        .all(|name| find_column(headers, name).is_ok())
}

fn find_column<S: AsRef<str>>(headers: &[S], name: &str) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_mixed_case_headers() {
        let headers = ["Date", "Open", "HIGH", "low", " Close ", "Volume"];
        let cols = OhlcColumns::resolve(&headers).unwrap();
        assert_eq!(
            cols,
            OhlcColumns {
                date: 0,
                open: 1,
                high: 2,
                low: 3,
                close: 4
            }
        );
    }

    #[test]
    fn resolves_reordered_headers() {
        let headers = ["close", "low", "high", "open", "date"];
        let cols = OhlcColumns::resolve(&headers).unwrap();
        assert_eq!(cols.close, 0);
        assert_eq!(cols.date, 4);
    }

    #[test]
    fn reports_missing_close() {
        let headers = ["date", "open", "high", "low", "adj_close"];
        let err = OhlcColumns::resolve(&headers).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("close".into()));
    }

    #[test]
    fn reports_missing_date() {
        let headers = ["open", "high", "low", "close"];
        let err = OhlcColumns::resolve(&headers).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("date".into()));
    }

    #[test]
    fn price_column_check_ignores_date() {
        assert!(has_price_columns(&["OPEN", "High", "low", "CLOSE"]));
        assert!(!has_price_columns(&["open", "high", "close"]));
    }
}
