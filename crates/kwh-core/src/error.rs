//! Error types for the core crate.

use crate::ids::IdError;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing or validating domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// An OTP code that is not exactly six ASCII digits.
    #[error("OTP code must be exactly 6 digits")]
    InvalidOtpCode,

    /// A month outside 1..=12.
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
}
