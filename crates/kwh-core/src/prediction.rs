//! Feature vectors and bill predictions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::YearMonth;

/// Feature names in the column order the bill model was trained with.
pub const FEATURE_NAMES: [&str; 14] = [
    "Month",
    "Inflation Rate",
    "Generation Charge",
    "Avg_Temperature",
    "Total_Bill_Lag1",
    "Generation_Charge_Lag1",
    "Inflation_Lag1",
    "Avg_Temp_Lag1",
    "Total_Bill_Rolling3",
    "Gen_Charge_Rolling3",
    "Inflation_Rolling3",
    "Temp_Rolling3",
    "Is_Hot_Season",
    "Is_Cold_Season",
];

/// Round to four decimal places.
#[must_use]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// April and May.
#[must_use]
pub fn is_hot_season(month: u32) -> bool {
    matches!(month, 4 | 5)
}

/// December through February.
#[must_use]
pub fn is_cold_season(month: u32) -> bool {
    matches!(month, 12 | 1 | 2)
}

/// Model input for one target month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastInput {
    /// The month being predicted.
    pub target: YearMonth,
    /// Months between the last observed row and `target`.
    pub periods_ahead: u32,

    /// Forecast inflation rate for the target month.
    pub inflation_rate: f64,
    /// Forecast generation charge for the target month.
    pub generation_charge: f64,
    /// Forecast average temperature for the target month.
    pub avg_temperature: f64,

    /// Last observed total bill.
    pub total_bill_lag1: f64,
    /// Last observed generation charge.
    pub generation_charge_lag1: f64,
    /// Last observed inflation rate.
    pub inflation_lag1: f64,
    /// Last observed average temperature.
    pub avg_temp_lag1: f64,

    /// Mean total bill over the last three rows.
    pub total_bill_rolling3: f64,
    /// Mean generation charge over the last three rows.
    pub gen_charge_rolling3: f64,
    /// Mean inflation rate over the last three rows.
    pub inflation_rolling3: f64,
    /// Mean average temperature over the last three rows.
    pub temp_rolling3: f64,

    /// Target month is April or May.
    pub is_hot_season: bool,
    /// Target month is December, January or February.
    pub is_cold_season: bool,
}

impl ForecastInput {
    /// Look up a feature by its model column name.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let value = match name {
            "Month" => f64::from(self.target.month),
            "Inflation Rate" => self.inflation_rate,
            "Generation Charge" => self.generation_charge,
            "Avg_Temperature" => self.avg_temperature,
            "Total_Bill_Lag1" => self.total_bill_lag1,
            "Generation_Charge_Lag1" => self.generation_charge_lag1,
            "Inflation_Lag1" => self.inflation_lag1,
            "Avg_Temp_Lag1" => self.avg_temp_lag1,
            "Total_Bill_Rolling3" => self.total_bill_rolling3,
            "Gen_Charge_Rolling3" => self.gen_charge_rolling3,
            "Inflation_Rolling3" => self.inflation_rolling3,
            "Temp_Rolling3" => self.temp_rolling3,
            "Is_Hot_Season" => flag(self.is_hot_season),
            "Is_Cold_Season" => flag(self.is_cold_season),
            _ => return None,
        };
        Some(value)
    }

    /// All features keyed by column name, for echoing back to callers.
    ///
    /// Integral features (month, season flags) are emitted as integers.
    #[must_use]
    pub fn to_feature_map(&self) -> BTreeMap<String, serde_json::Value> {
        FEATURE_NAMES
            .iter()
            .filter_map(|name| {
                let value = self.feature(name)?;
                let json = match *name {
                    "Month" => serde_json::Value::from(self.target.month),
                    "Is_Hot_Season" => serde_json::Value::from(u8::from(self.is_hot_season)),
                    "Is_Cold_Season" => serde_json::Value::from(u8::from(self.is_cold_season)),
                    _ => serde_json::Value::from(value),
                };
                Some(((*name).to_string(), json))
            })
            .collect()
    }
}

/// A calibrated bill prediction with every intermediate value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Final prediction: raw × calibration × seasonal.
    pub prediction: f64,
    /// Raw regression model output.
    pub raw_prediction: f64,
    /// Raw output after the calibration factor.
    pub calibrated_prediction: f64,
    /// Fixed calibration factor.
    pub calibration_factor: f64,
    /// Seasonal multiplier applied last.
    pub seasonal_factor: f64,
    /// Target month.
    pub month: u32,
    /// Target year.
    pub year: i32,
    /// The feature vector the model saw.
    pub input_used: BTreeMap<String, serde_json::Value>,
    /// Latest recorded value for the target month, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_month_value: Option<f64>,
    /// Year of `reference_month_value`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
}
