//! Historical billing observations.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A calendar month.
///
/// Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month, 1..=12.
    pub month: u32,
}

impl YearMonth {
    /// Create a `YearMonth`, rejecting months outside 1..=12.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidMonth` if `month` is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(CoreError::InvalidMonth(month))
        }
    }

    /// The following month, rolling December over into January.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Signed number of months from `self` to `later`.
    #[must_use]
    pub fn months_until(self, later: Self) -> i64 {
        (i64::from(later.year) - i64::from(self.year)) * 12
            + (i64::from(later.month) - i64::from(self.month))
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One row of the monthly history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalObservation {
    /// The month this row describes.
    pub period: YearMonth,
    /// Inflation rate for the month.
    pub inflation_rate: f64,
    /// Utility generation charge for the month.
    pub generation_charge: f64,
    /// Average temperature for the month.
    pub avg_temperature: f64,
    /// Total bill for the month.
    pub total_bill: f64,
}

/// One entry of the historical-rates reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRate {
    /// Calendar year.
    #[serde(rename = "Year")]
    pub year: i32,
    /// Month, 1..=12.
    #[serde(rename = "Month")]
    pub month: u32,
    /// Total bill (rate) recorded for the month.
    #[serde(rename = "Total Bill")]
    pub total_bill: f64,
}
