//! Loading the history and historical-rates tables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use kwh_core::{HistoricalObservation, HistoricalRate, YearMonth};

use crate::error::{ForecastError, Result};

const YEAR: &str = "Year";
const MONTH: &str = "Month";
const INFLATION_RATE: &str = "Inflation Rate";
const GENERATION_CHARGE: &str = "Generation Charge";
const AVG_TEMPERATURE: &str = "Avg_Temperature";
const TOTAL_BILL: &str = "Total Bill";

/// Column positions of the fields we read.
struct Columns {
    year: usize,
    month: usize,
    inflation_rate: usize,
    generation_charge: usize,
    avg_temperature: usize,
    total_bill: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(ForecastError::MissingColumn(name))
        };

        Ok(Self {
            year: find(YEAR)?,
            month: find(MONTH)?,
            inflation_rate: find(INFLATION_RATE)?,
            generation_charge: find(GENERATION_CHARGE)?,
            avg_temperature: find(AVG_TEMPERATURE)?,
            total_bill: find(TOTAL_BILL)?,
        })
    }

    /// Parse one row; `None` if any required value is missing or invalid.
    fn parse(&self, record: &StringRecord) -> Option<HistoricalObservation> {
        let number = |idx: usize| -> Option<f64> {
            let value: f64 = record.get(idx)?.trim().parse().ok()?;
            value.is_finite().then_some(value)
        };
        let integer = |idx: usize| -> Option<i64> {
            let raw = record.get(idx)?.trim();
            raw.parse::<i64>().ok().or_else(|| {
                // Spreadsheet exports sometimes write "2023.0"
                let value: f64 = raw.parse().ok()?;
                if value.fract() != 0.0 || value.abs() >= 1e9 {
                    return None;
                }
                #[allow(clippy::cast_possible_truncation)]
                let whole = value as i64;
                Some(whole)
            })
        };

        let year = i32::try_from(integer(self.year)?).ok()?;
        let month = u32::try_from(integer(self.month)?).ok()?;

        Some(HistoricalObservation {
            period: YearMonth::new(year, month).ok()?,
            inflation_rate: number(self.inflation_rate)?,
            generation_charge: number(self.generation_charge)?,
            avg_temperature: number(self.avg_temperature)?,
            total_bill: number(self.total_bill)?,
        })
    }
}

/// Read the history table from any CSV source.
///
/// Columns are matched by header name and extra columns are ignored. Rows
/// with a missing or unparsable required value are skipped. The result is
/// sorted chronologically.
///
/// # Errors
///
/// Returns an error if a required column is missing, the CSV is malformed,
/// or no complete rows remain.
pub fn read_history_csv<R: Read>(reader: R) -> Result<Vec<HistoricalObservation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    let mut skipped = 0_usize;
    for result in rdr.records() {
        let record = result?;
        match columns.parse(&record) {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped incomplete history rows");
    }
    if rows.is_empty() {
        return Err(ForecastError::EmptyHistory);
    }

    rows.sort_by_key(|row| row.period);
    Ok(rows)
}

/// Load the history table from a CSV file.
///
/// # Errors
///
/// See [`read_history_csv`]; also fails if the file cannot be opened.
pub fn load_history_csv(path: &Path) -> Result<Vec<HistoricalObservation>> {
    let file = File::open(path).map_err(|source| ForecastError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_history_csv(file)
}

/// Load the historical-rates JSON array.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not an array of
/// `{Year, Month, "Total Bill"}` objects.
pub fn load_rates_json(path: &Path) -> Result<Vec<HistoricalRate>> {
    let contents = std::fs::read_to_string(path).map_err(|source| ForecastError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}
