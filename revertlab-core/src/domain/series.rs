//! PriceSeries — a validated, chronologically ordered sequence of bars.
//!
//! Construction is the only place the ordering and positivity invariants are
//! checked. Everything downstream (estimators, latch, simulator) assumes them.

use chrono::NaiveDate;
use thiserror::Error;

use super::Bar;

/// Violations of the price series invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} ({date}) is not strictly after the previous bar")]
    NonIncreasingDate { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) has a non-positive or non-finite close")]
    InvalidClose { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) has a negative or non-finite open/high/low")]
    NegativePrice { index: usize, date: NaiveDate },
}

/// Date-indexed OHLC series.
///
/// Invariants: dates strictly increasing, close finite and `> 0`, open/high/low
/// finite and `>= 0`. Calendar gaps are allowed and never filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(SeriesError::NonIncreasingDate {
                    index,
                    date: bar.date,
                });
            }
            if !bar.has_valid_close() {
                return Err(SeriesError::InvalidClose {
                    index,
                    date: bar.date,
                });
            }
            if !bar.has_valid_range() {
                return Err(SeriesError::NegativePrice {
                    index,
                    date: bar.date,
                });
            }
        }
        Ok(Self { bars })
    }

    /// Sort by date before validating. Duplicate dates still fail.
    pub fn from_unsorted(mut bars: Vec<Bar>) -> Result<Self, SeriesError> {
        bars.sort_by_key(|b| b.date);
        Self::new(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Series of the same bars with bar `index`'s close replaced.
    ///
    /// Used by look-ahead checks; the replacement must itself be a valid close.
    pub fn with_close(&self, index: usize, close: f64) -> Result<Self, SeriesError> {
        let mut bars = self.bars.clone();
        if let Some(bar) = bars.get_mut(index) {
            bar.close = close;
        }
        Self::new(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> Bar {
        Bar::new(day(d), close, close + 1.0, close - 1.0, close)
    }

    #[test]
    fn accepts_ordered_positive_series() {
        let series = PriceSeries::new(vec![bar(2, 100.0), bar(3, 101.0), bar(5, 99.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![100.0, 101.0, 99.0]);
        assert_eq!(series.first_date(), Some(day(2)));
        assert_eq!(series.last_date(), Some(day(5)));
    }

    #[test]
    fn empty_series_is_allowed() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![bar(2, 100.0), bar(2, 101.0)]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::NonIncreasingDate {
                index: 1,
                date: day(2)
            }
        );
    }

    #[test]
    fn rejects_zero_close() {
        let err = PriceSeries::new(vec![bar(2, 100.0), bar(3, 0.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidClose { index: 1, .. }));
    }

    #[test]
    fn rejects_negative_low() {
        let mut b = bar(2, 100.0);
        b.low = -1.0;
        let err = PriceSeries::new(vec![b]).unwrap_err();
        assert!(matches!(err, SeriesError::NegativePrice { index: 0, .. }));
    }

    #[test]
    fn from_unsorted_orders_by_date() {
        let series = PriceSeries::from_unsorted(vec![bar(5, 99.0), bar(2, 100.0)]).unwrap();
        assert_eq!(series.dates(), vec![day(2), day(5)]);
    }

    #[test]
    fn with_close_replaces_single_bar() {
        let series = PriceSeries::new(vec![bar(2, 100.0), bar(3, 101.0)]).unwrap();
        let bumped = series.with_close(1, 150.0).unwrap();
        assert_eq!(bumped.closes(), vec![100.0, 150.0]);
        assert_eq!(series.closes(), vec![100.0, 101.0]);
    }
}
