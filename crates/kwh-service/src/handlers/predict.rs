//! Bill prediction handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use kwh_core::{PredictionResult, YearMonth};

use super::MessageResponse;
use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Optional target month. Both fields must be present to take effect.
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// Month, 1-12.
    #[serde(default)]
    pub month: Option<String>,
    /// Four-digit year.
    #[serde(default)]
    pub year: Option<String>,
}

impl PredictQuery {
    /// The explicit target, if both month and year were given.
    fn target(&self) -> Result<Option<YearMonth>, ApiError> {
        let (Some(month), Some(year)) = (
            non_empty(self.month.as_deref()),
            non_empty(self.year.as_deref()),
        ) else {
            return Ok(None);
        };

        let month: u32 = month
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid month: {month}")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid year: {year}")))?;

        YearMonth::new(year, month)
            .map(Some)
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Predict the total bill for the requested month, or the month after the
/// last recorded one.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PredictQuery>,
) -> Result<Json<PredictionResult>, ApiError> {
    let target = query.target()?;
    match target {
        Some(t) => tracing::info!(month = t.month, year = t.year, "Predicting bill"),
        None => tracing::info!("Predicting bill for the month after the latest record"),
    }

    let predictor = state.predictor.clone();
    let result = tokio::task::spawn_blocking(move || predictor.predict_total_bill(target))
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {e}")))??;

    Ok(Json(result))
}

/// Re-read the model file (admin only).
pub async fn reload_model(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
) -> Result<Json<MessageResponse>, ApiError> {
    let predictor = state.predictor.clone();
    let model = tokio::task::spawn_blocking(move || predictor.reload_model())
        .await
        .map_err(|e| ApiError::Internal(format!("reload task failed: {e}")))??;

    tracing::info!(admin_id = %admin.admin_id, trees = model.num_trees(), "Bill model reloaded");

    Ok(Json(MessageResponse::ok(format!(
        "Model reloaded with {} trees",
        model.num_trees()
    ))))
}
