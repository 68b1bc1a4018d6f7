//! Price loading for the runner.
//!
//! Two sources:
//! 1. CSV files with a `date` column and `open/high/low/close` columns in
//!    any letter case. Extra columns are ignored, rows are sorted by date
//!    before validation.
//! 2. Synthetic mean-reverting series, deterministic per label. Intended
//!    for demos, tests, and benchmarks only.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

use revertlab_core::{Bar, OhlcColumns, PriceSeries, SchemaError, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("row {row}: unparseable date '{value}'")]
    Date { row: usize, value: String },

    #[error("row {row}: unparseable {column} value '{value}'")]
    Number {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Load a price series from a CSV file.
pub fn load_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_csv(file)?;
    tracing::debug!(path = %path.display(), bars = series.len(), "loaded price series");
    Ok(series)
}

/// Read a price series from any CSV source.
///
/// Row numbers in errors are 1-based data rows (the header is not counted).
pub fn read_csv<R: Read>(reader: R) -> Result<PriceSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let columns = OhlcColumns::resolve(&headers)?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let date_str = field(columns.date);
        let date = parse_date(date_str).ok_or_else(|| LoadError::Date {
            row,
            value: date_str.to_string(),
        })?;

        bars.push(Bar::new(
            date,
            parse_price(field(columns.open), row, "open")?,
            parse_price(field(columns.high), row, "high")?,
            parse_price(field(columns.low), row, "low")?,
            parse_price(field(columns.close), row, "close")?,
        ));
    }

    Ok(PriceSeries::from_unsorted(bars)?)
}

/// Parse a date cell. Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, and
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` timestamps (time dropped).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ts.date());
        }
    }
    None
}

/// Empty cells read as NaN so the series validation reports the bar.
fn parse_price(value: &str, row: usize, column: &'static str) -> Result<f64, LoadError> {
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value.parse::<f64>().map_err(|_| LoadError::Number {
        row,
        column,
        value: value.to_string(),
    })
}

// ─── Synthetic ──────────────────────────────────────────────────────

/// Parameters of the synthetic mean-reverting series.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSpec {
    pub start: NaiveDate,
    pub bars: usize,
    pub start_price: f64,
    /// Pull toward the long-run level per bar, in (0, 1].
    pub reversion: f64,
    /// Half-width of the uniform log-price shock per bar.
    pub volatility: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2015, 1, 2).unwrap_or_default(),
            bars: 2_000,
            start_price: 100.0,
            reversion: 0.08,
            volatility: 0.02,
        }
    }
}

/// Generate a deterministic mean-reverting series.
///
/// The log price deviation follows a discrete Ornstein–Uhlenbeck step
/// `x += -reversion * x + shock`. The seed is the BLAKE3 hash of `label`,
/// so equal labels produce equal series. Weekend dates are skipped.
pub fn generate_synthetic(label: &str, spec: &SyntheticSpec) -> Result<PriceSeries, SeriesError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let level = spec.start_price.ln();
    let mut deviation = 0.0_f64;
    let mut prev_close = spec.start_price;
    let mut current = spec.start;
    let mut bars = Vec::with_capacity(spec.bars);

    while bars.len() < spec.bars {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let shock = if spec.volatility > 0.0 {
            rng.gen_range(-spec.volatility..spec.volatility)
        } else {
            0.0
        };
        deviation += -spec.reversion * deviation + shock;

        let open = prev_close;
        let close = (level + deviation).exp();
        let wick = spec.volatility.abs() * 0.25;
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..=wick));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..=wick));

        bars.push(Bar::new(current, open, high, low, close));
        prev_close = close;
        current += chrono::Duration::days(1);
    }

    PriceSeries::new(bars)
}
