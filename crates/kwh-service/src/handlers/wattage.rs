//! Appliance wattage lookup handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Query for a wattage lookup.
#[derive(Debug, Deserialize)]
pub struct WattageQuery {
    /// Appliance name, e.g. "electric fan".
    #[serde(default)]
    pub appliance: Option<String>,
}

/// Wattage lookup reply.
#[derive(Debug, Serialize)]
pub struct WattageResponse {
    /// The model's answer, normally a bare number.
    pub wattage_info: String,
}

/// Estimate an appliance's typical wattage.
pub async fn get_wattage(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<WattageQuery>,
) -> Result<Json<WattageResponse>, ApiError> {
    let appliance = query
        .appliance
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::Validation("Appliance name is required".into()))?;

    let gemini = state
        .gemini
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Wattage lookup is not configured".into()))?;

    let wattage_info = gemini.lookup_wattage(appliance).await?;

    Ok(Json(WattageResponse { wattage_info }))
}
