//! API error types and responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::gemini::GeminiError;
use crate::identity::IdentityError;
use crate::mailer::MailError;
use crate::recommend::RecommendError;

/// Message returned for any OTP that does not authorize a reset.
pub const INVALID_OTP_MESSAGE: &str = "Invalid or expired OTP";

/// Message returned when the recommendation slot is taken.
pub const BUSY_MESSAGE: &str =
    "Model is currently processing another request. Please wait and try again.";

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - missing fields or invalid input.
    #[error("{0}")]
    Validation(String),

    /// Token verification failed.
    #[error("{0}")]
    Unauthorized(String),

    /// No OTP record authorizes the reset.
    #[error("Invalid or expired OTP")]
    InvalidOtp,

    /// The recommendation model is serving another request.
    #[error("Model is currently processing another request. Please wait and try again.")]
    Busy,

    /// External service error.
    #[error("{message}")]
    Upstream {
        /// Client-facing message.
        message: String,
        /// Underlying error text.
        detail: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for an upstream failure with a fixed public message.
    #[must_use]
    pub fn upstream(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Upstream {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg, None),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            Self::InvalidOtp => (
                StatusCode::BAD_REQUEST,
                "not_found",
                INVALID_OTP_MESSAGE.to_string(),
                None,
            ),
            Self::Busy => (
                StatusCode::TOO_MANY_REQUESTS,
                "busy",
                BUSY_MESSAGE.to_string(),
                None,
            ),
            Self::Upstream { message, detail } => {
                tracing::error!(error = %detail, "Upstream service error");
                (StatusCode::BAD_GATEWAY, "upstream", message, Some(detail))
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal error occurred".to_string(),
                    Some(msg),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code,
            detail: detail.filter(|_| cfg!(debug_assertions)),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<kwh_store::StoreError> for ApiError {
    fn from(err: kwh_store::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<kwh_forecast::ForecastError> for ApiError {
    fn from(err: kwh_forecast::ForecastError) -> Self {
        match err {
            kwh_forecast::ForecastError::HorizonTooFar { .. } => {
                Self::Validation(format!("Invalid target month: {err}"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken(msg) => Self::Unauthorized(msg),
            IdentityError::Configuration(msg) => Self::Internal(msg),
            other => Self::upstream("Identity provider request failed", other),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        Self::upstream("Failed to send email", err)
    }
}

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        Self::upstream("Wattage lookup failed", err)
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::Busy => Self::Busy,
            other => Self::upstream("Recommendation request failed", other),
        }
    }
}
