//! Feature forecasting and bill prediction.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`features::build_forecast_input`] forecasts the external covariates for
//!    the target month with a seasonal ARIMA model ([`sarima`]) and adds lag,
//!    rolling-mean and season features from the history table.
//! 2. [`model::TreeEnsemble`] evaluates a gradient-boosted tree model exported
//!    in `XGBoost` JSON format.
//! 3. [`predictor::BillPredictor`] applies the calibration factor and the
//!    seasonal multiplier to the raw model output.
//!
//! All computation is synchronous; callers on an async runtime should run
//! predictions on a blocking thread.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Month counts and row counts are small; float conversions are exact.
#![allow(clippy::cast_precision_loss)]

pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod optimize;
pub mod predictor;
pub mod sarima;

pub use data::{load_history_csv, load_rates_json, read_history_csv};
pub use error::{ForecastError, Result};
pub use features::{build_forecast_input, forecast_one_series, MAX_FORECAST_HORIZON};
pub use model::TreeEnsemble;
pub use predictor::{
    calibration_factor, dynamic_seasonal_factor, static_seasonal_factor, BillPredictor,
    PredictorPaths, SeasonalAdjustment,
};
pub use sarima::SeasonalArima;
