//! Error types for forecasting and prediction.

use std::path::PathBuf;

/// Result type for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while forecasting or predicting.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// A data or model file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The history CSV is malformed.
    #[error("history table error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document is malformed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required CSV column is missing.
    #[error("history table is missing column {0:?}")]
    MissingColumn(&'static str),

    /// No usable rows in the history table.
    #[error("history table has no complete rows")]
    EmptyHistory,

    /// Too few observations to fit the time-series model.
    #[error("need at least {needed} observations, got {got}")]
    InsufficientData {
        /// Minimum required observations.
        needed: usize,
        /// Observations supplied.
        got: usize,
    },

    /// `forecast` called before a successful `fit`.
    #[error("model has not been fitted")]
    NotFitted,

    /// The target month is further past the history than the model forecasts.
    #[error("target is {requested} months after the latest record; at most {max} are forecast")]
    HorizonTooFar {
        /// Months between the last observation and the target.
        requested: i64,
        /// Largest supported horizon.
        max: u32,
    },

    /// Zero-step forecast requested.
    #[error("forecast horizon must be at least one period")]
    EmptyHorizon,

    /// A NaN or infinite value appeared in the input or the result.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// The model artifact is invalid or unsupported.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// The model expects a feature the input does not provide.
    #[error("model feature {0:?} is not produced by the feature builder")]
    UnknownFeature(String),

    /// The feature vector length does not match the model.
    #[error("model expects {expected} features, got {got}")]
    FeatureCount {
        /// Features the model was trained on.
        expected: usize,
        /// Features supplied.
        got: usize,
    },

    /// A shared lock was poisoned by a panicking thread.
    #[error("model cache lock poisoned")]
    LockPoisoned,
}
