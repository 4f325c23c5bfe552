//! Calibrated total-bill prediction.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use kwh_core::{round4, HistoricalRate, PredictionResult, YearMonth};

use crate::data::{load_history_csv, load_rates_json};
use crate::error::{ForecastError, Result};
use crate::features::build_forecast_input;
use crate::model::TreeEnsemble;

/// Reference output the model produced when it was validated.
const REFERENCE_OUTPUT: f64 = 14.2376;
/// Output observed from the deployed model for the same input.
const DEPLOYED_OUTPUT: f64 = 12.8;

/// Seasonal factor when the target month has no historical rates.
const DEFAULT_SEASONAL_FACTOR: f64 = 1.01;
/// How strongly a month's deviation from the overall mean is amplified.
const SEASONAL_AMPLIFICATION: f64 = 1.5;
const MIN_SEASONAL_FACTOR: f64 = 0.95;
const MAX_SEASONAL_FACTOR: f64 = 1.10;

/// Multiplier that aligns raw model output with the reference output.
#[must_use]
pub fn calibration_factor() -> f64 {
    REFERENCE_OUTPUT / DEPLOYED_OUTPUT
}

/// Seasonal multiplier and the reference value it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalAdjustment {
    /// Multiplier applied to the calibrated prediction.
    pub factor: f64,
    /// Latest recorded `(total bill, year)` for the target month.
    pub reference: Option<(f64, i32)>,
}

/// Seasonal factor from the historical-rates table.
///
/// The month's mean relative to the overall mean is amplified and clamped to
/// `[0.95, 1.10]`. A month with no entries gets 1.01 and no reference.
#[must_use]
pub fn dynamic_seasonal_factor(rates: &[HistoricalRate], month: u32) -> SeasonalAdjustment {
    let for_month: Vec<&HistoricalRate> = rates.iter().filter(|r| r.month == month).collect();
    let Some(latest_year) = for_month.iter().map(|r| r.year).max() else {
        return SeasonalAdjustment {
            factor: DEFAULT_SEASONAL_FACTOR,
            reference: None,
        };
    };
    let reference = for_month
        .iter()
        .find(|r| r.year == latest_year)
        .map(|r| (r.total_bill, r.year));

    let mean = |values: &mut dyn Iterator<Item = f64>| {
        let (sum, count) = values.fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
        sum / count as f64
    };
    let month_mean = mean(&mut for_month.iter().map(|r| r.total_bill));
    let overall_mean = mean(&mut rates.iter().map(|r| r.total_bill));

    let variation = month_mean / overall_mean;
    let factor = 1.0 + (variation - 1.0) * SEASONAL_AMPLIFICATION;
    let factor = if factor.is_finite() {
        factor.clamp(MIN_SEASONAL_FACTOR, MAX_SEASONAL_FACTOR)
    } else {
        DEFAULT_SEASONAL_FACTOR
    };

    SeasonalAdjustment { factor, reference }
}

/// Fixed seasonal factor used when the rates table is unavailable.
#[must_use]
pub fn static_seasonal_factor(month: u32) -> f64 {
    match month {
        5 => 1.04,
        4 => 1.03,
        _ => DEFAULT_SEASONAL_FACTOR,
    }
}

/// Locations of the predictor's input files.
#[derive(Debug, Clone)]
pub struct PredictorPaths {
    /// `XGBoost` JSON model.
    pub model: PathBuf,
    /// Monthly history CSV.
    pub history: PathBuf,
    /// Historical-rates JSON.
    pub rates: PathBuf,
}

/// Predicts the total bill for a month.
///
/// The history and rates tables are read on every prediction so edits take
/// effect immediately. The model is loaded on first use and cached until
/// [`BillPredictor::reload_model`].
pub struct BillPredictor {
    paths: PredictorPaths,
    model: RwLock<Option<Arc<TreeEnsemble>>>,
}

impl BillPredictor {
    /// Create a predictor. Nothing is read until the first prediction.
    #[must_use]
    pub fn new(paths: PredictorPaths) -> Self {
        Self {
            paths,
            model: RwLock::new(None),
        }
    }

    /// The configured file locations.
    #[must_use]
    pub fn paths(&self) -> &PredictorPaths {
        &self.paths
    }

    /// Whether the model has been loaded.
    #[must_use]
    pub fn is_model_loaded(&self) -> bool {
        self.model.read().map(|m| m.is_some()).unwrap_or(false)
    }

    /// Re-read the model file, replacing the cached model.
    ///
    /// On failure the previously cached model is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file cannot be loaded.
    pub fn reload_model(&self) -> Result<Arc<TreeEnsemble>> {
        let model = Arc::new(TreeEnsemble::load(&self.paths.model)?);
        let mut slot = self.model.write().map_err(|_| ForecastError::LockPoisoned)?;
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    fn model(&self) -> Result<Arc<TreeEnsemble>> {
        if let Some(model) = self
            .model
            .read()
            .map_err(|_| ForecastError::LockPoisoned)?
            .as_ref()
        {
            return Ok(Arc::clone(model));
        }

        let mut slot = self.model.write().map_err(|_| ForecastError::LockPoisoned)?;
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }
        let model = Arc::new(TreeEnsemble::load(&self.paths.model)?);
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    fn seasonal_adjustment(&self, month: u32) -> SeasonalAdjustment {
        match load_rates_json(&self.paths.rates) {
            Ok(rates) => dynamic_seasonal_factor(&rates, month),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Historical rates unavailable, using static seasonal factor"
                );
                SeasonalAdjustment {
                    factor: static_seasonal_factor(month),
                    reference: None,
                }
            }
        }
    }

    /// Predict the total bill for `target`, or for the month after the last
    /// history row when `target` is `None`.
    ///
    /// Blocking: reads files and fits time-series models.
    ///
    /// # Errors
    ///
    /// Returns an error if the history table or model cannot be loaded, or
    /// the model needs a feature the input does not provide.
    pub fn predict_total_bill(&self, target: Option<YearMonth>) -> Result<PredictionResult> {
        let history = load_history_csv(&self.paths.history)?;
        let input = build_forecast_input(&history, target)?;
        let model = self.model()?;

        let features = model
            .feature_names()
            .iter()
            .map(|name| {
                input
                    .feature(name)
                    .ok_or_else(|| ForecastError::UnknownFeature(name.clone()))
            })
            .collect::<Result<Vec<f64>>>()?;

        let raw = model.predict(&features)?;
        let calibration = calibration_factor();
        let calibrated = raw * calibration;
        let seasonal = self.seasonal_adjustment(input.target.month);
        let prediction = calibrated * seasonal.factor;

        tracing::debug!(
            month = %input.target,
            periods_ahead = input.periods_ahead,
            raw,
            calibration,
            calibrated,
            seasonal = seasonal.factor,
            prediction,
            "Predicted total bill"
        );

        Ok(PredictionResult {
            prediction: round4(prediction),
            raw_prediction: round4(raw),
            calibrated_prediction: round4(calibrated),
            calibration_factor: round4(calibration),
            seasonal_factor: round4(seasonal.factor),
            month: input.target.month,
            year: input.target.year,
            input_used: input.to_feature_map(),
            reference_month_value: seasonal.reference.map(|(value, _)| value),
            reference_year: seasonal.reference.map(|(_, year)| year),
        })
    }
}
