//! Core types for the kWh tracker backend.
//!
//! This crate provides the domain types shared by the store, the forecasting
//! pipeline and the HTTP service:
//!
//! - **Identifiers**: `OtpId`
//! - **Password reset**: `OtpRecord`, `OtpCode`
//! - **History**: `YearMonth`, `HistoricalObservation`, `HistoricalRate`
//! - **Prediction**: `ForecastInput`, `PredictionResult`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod history;
pub mod ids;
pub mod otp;
pub mod prediction;

pub use error::{CoreError, Result};
pub use history::{HistoricalObservation, HistoricalRate, YearMonth};
pub use ids::{IdError, OtpId};
pub use otp::{normalize_email, OtpCode, OtpRecord, OTP_TTL_SECONDS};
pub use prediction::{
    is_cold_season, is_hot_season, round4, ForecastInput, PredictionResult, FEATURE_NAMES,
};
