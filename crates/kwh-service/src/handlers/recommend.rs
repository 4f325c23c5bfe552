//! Energy-saving recommendation handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Appliance usage description to get advice for.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Free-text appliance information.
    #[serde(default)]
    pub appliance_info: Option<String>,
}

/// Recommendation reply.
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    /// Advice text from the model.
    pub recommendation: String,
}

/// Ask the recommendation model for advice. Only one request runs at a time;
/// others get 429.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let info = body
        .appliance_info
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Appliance info is required.".into()))?;

    let recommender = state
        .recommender
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Recommendations are not configured".into()))?;

    let recommendation = recommender.recommend(&info).await?;

    Ok(Json(RecommendResponse { recommendation }))
}
