//! Password reset handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Request a reset code.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Redeem a reset code.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Six-digit code from the email.
    #[serde(default)]
    pub otp: Option<String>,
    /// Replacement password.
    #[serde(default, rename = "newPassword")]
    pub new_password: Option<String>,
}

/// Email a reset code if the account exists.
pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SendOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state
        .otp_service()
        .request_reset(body.email.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(MessageResponse::ok(message)))
}

/// Check a reset code and set the new password.
pub async fn verify_otp_and_reset(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state
        .otp_service()
        .verify_and_reset(
            body.email.as_deref().unwrap_or_default(),
            body.otp.as_deref().unwrap_or_default(),
            body.new_password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(MessageResponse::ok(message)))
}
