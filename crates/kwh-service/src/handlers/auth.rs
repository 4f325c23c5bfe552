//! Sign-in token verification handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::identity::VerifiedToken;
use crate::state::AppState;

/// Body carrying an ID token from the client SDK.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Firebase ID token.
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Reply to a verified email/password sign-in.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always `true`.
    pub success: bool,
    /// Firebase user ID.
    pub uid: String,
    /// Outcome message.
    pub message: String,
}

/// Reply to a verified Google sign-in.
#[derive(Debug, Serialize)]
pub struct GoogleLoginResponse {
    /// Always `true`.
    pub success: bool,
    /// Firebase user ID.
    pub uid: String,
    /// Email claim, empty when the token has none.
    pub email: String,
    /// Outcome message.
    pub message: String,
}

async fn verify(state: &AppState, body: TokenRequest) -> Result<VerifiedToken, ApiError> {
    let token = body
        .id_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("ID token is required.".into()))?;

    let verified = state.identity.verify_id_token(token.trim()).await?;
    tracing::info!(uid = %verified.uid, "ID token verified");
    Ok(verified)
}

/// Verify an email/password sign-in token.
pub async fn verify_login_token(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<TokenRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let verified = verify(&state, body).await?;

    Ok(Json(LoginResponse {
        success: true,
        uid: verified.uid,
        message: "Login successful".into(),
    }))
}

/// Verify a Google sign-in token.
pub async fn verify_google_token(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<TokenRequest>,
) -> Result<Json<GoogleLoginResponse>, ApiError> {
    let verified = verify(&state, body).await?;

    Ok(Json(GoogleLoginResponse {
        success: true,
        uid: verified.uid,
        email: verified.email.unwrap_or_default(),
        message: "Google Sign-In verified successfully".into(),
    }))
}
