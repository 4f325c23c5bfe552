//! Building the model input for a target month.

use kwh_core::{
    is_cold_season, is_hot_season, round4, ForecastInput, HistoricalObservation, YearMonth,
};

use crate::error::{ForecastError, Result};
use crate::sarima::SeasonalArima;

/// Rows averaged by the rolling features.
const ROLLING_WINDOW: usize = 3;

/// Furthest target, in months past the last observation, that is forecast.
pub const MAX_FORECAST_HORIZON: u32 = 120;

/// Forecast `periods_ahead` steps past the end of `series` and return the
/// last step, rounded to 4 decimals.
///
/// Never fails: a series that cannot be fitted or forecast yields 0.0 and a
/// warning.
#[must_use]
pub fn forecast_one_series(series: &[f64], periods_ahead: u32) -> f64 {
    let attempt = || -> Result<f64> {
        let mut model = SeasonalArima::new(SeasonalArima::MONTHLY);
        model.fit(series)?;
        let forecast = model.forecast(periods_ahead as usize)?;
        forecast
            .last()
            .copied()
            .ok_or(ForecastError::EmptyHorizon)
    };

    match attempt() {
        Ok(value) => round4(value),
        Err(e) => {
            tracing::warn!(
                error = %e,
                len = series.len(),
                periods_ahead,
                "Series forecast failed, using 0.0"
            );
            0.0
        }
    }
}

/// Build the feature vector for `target`, or for the month after the last
/// row when `target` is `None`.
///
/// `history` must be sorted chronologically (as returned by the loaders).
/// A target at or before the last row is replaced by the next month.
///
/// # Errors
///
/// - `ForecastError::EmptyHistory` if `history` is empty.
/// - `ForecastError::HorizonTooFar` if `target` is more than
///   [`MAX_FORECAST_HORIZON`] months after the last row.
pub fn build_forecast_input(
    history: &[HistoricalObservation],
    target: Option<YearMonth>,
) -> Result<ForecastInput> {
    let last = history.last().ok_or(ForecastError::EmptyHistory)?;
    let next = last.period.next();

    let target = match target {
        Some(target) if last.period.months_until(target) >= 1 => target,
        Some(target) => {
            tracing::warn!(
                requested = %target,
                last = %last.period,
                using = %next,
                "Target is not after the last observed month"
            );
            next
        }
        None => next,
    };
    let gap = last.period.months_until(target);
    let periods_ahead = u32::try_from(gap)
        .ok()
        .filter(|months| *months <= MAX_FORECAST_HORIZON)
        .ok_or(ForecastError::HorizonTooFar {
            requested: gap,
            max: MAX_FORECAST_HORIZON,
        })?;

    let column = |f: fn(&HistoricalObservation) -> f64| -> Vec<f64> {
        history.iter().map(f).collect()
    };
    let inflation = column(|r| r.inflation_rate);
    let generation = column(|r| r.generation_charge);
    let temperature = column(|r| r.avg_temperature);

    let window = &history[history.len().saturating_sub(ROLLING_WINDOW)..];
    let rolling = |f: fn(&HistoricalObservation) -> f64| -> f64 {
        window.iter().map(f).sum::<f64>() / window.len() as f64
    };

    Ok(ForecastInput {
        target,
        periods_ahead,

        inflation_rate: forecast_one_series(&inflation, periods_ahead),
        generation_charge: forecast_one_series(&generation, periods_ahead),
        avg_temperature: forecast_one_series(&temperature, periods_ahead),

        total_bill_lag1: last.total_bill,
        generation_charge_lag1: last.generation_charge,
        inflation_lag1: last.inflation_rate,
        avg_temp_lag1: last.avg_temperature,

        total_bill_rolling3: rolling(|r| r.total_bill),
        gen_charge_rolling3: rolling(|r| r.generation_charge),
        inflation_rolling3: rolling(|r| r.inflation_rate),
        temp_rolling3: rolling(|r| r.avg_temperature),

        is_hot_season: is_hot_season(target.month),
        is_cold_season: is_cold_season(target.month),
    })
}
