//! Seasonal ARIMA (1,1,1)×(0,1,1)ₛ.
//!
//! The model is
//!
//! ```text
//! (1 − φB)(1 − B)(1 − Bˢ) yₜ = (1 + θB)(1 + ΘBˢ) εₜ
//! ```
//!
//! Fitting differences the series once at lag 1 and once at lag `s`, then
//! estimates (φ, θ, Θ) by conditional sum of squares with presample
//! innovations set to zero. Coefficients are searched through a scaled `tanh`
//! so each stays strictly inside (−1, 1) and the fit remains stationary and
//! invertible.

use crate::error::{ForecastError, Result};
use crate::optimize::{nelder_mead, NelderMead};

/// Fitted coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Non-seasonal AR(1) coefficient φ.
    pub ar: f64,
    /// Non-seasonal MA(1) coefficient θ.
    pub ma: f64,
    /// Seasonal MA(1) coefficient Θ.
    pub seasonal_ma: f64,
}

/// Largest coefficient magnitude the search can reach.
const COEFFICIENT_BOUND: f64 = 0.995;

impl Coefficients {
    fn from_unconstrained(u: &[f64]) -> Self {
        Self {
            ar: COEFFICIENT_BOUND * u[0].tanh(),
            ma: COEFFICIENT_BOUND * u[1].tanh(),
            seasonal_ma: COEFFICIENT_BOUND * u[2].tanh(),
        }
    }
}

/// A seasonal ARIMA model with orders (1,1,1)×(0,1,1) and period `s`.
#[derive(Debug, Clone)]
pub struct SeasonalArima {
    period: usize,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    coefficients: Coefficients,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
}

impl SeasonalArima {
    /// Seasonal period for monthly data.
    pub const MONTHLY: usize = 12;

    /// Create an unfitted model with the given seasonal period.
    ///
    /// Periods below 2 are raised to 2.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(2),
            fitted: None,
        }
    }

    /// Fewest observations `fit` accepts: `period + 1` are consumed by
    /// differencing and three more are needed for the likelihood.
    #[must_use]
    pub fn min_observations(&self) -> usize {
        self.period + 4
    }

    /// Fitted coefficients, if `fit` has succeeded.
    #[must_use]
    pub fn coefficients(&self) -> Option<Coefficients> {
        self.fitted.as_ref().map(|f| f.coefficients)
    }

    /// Estimate the coefficients from `series`.
    ///
    /// # Errors
    ///
    /// - `ForecastError::InsufficientData` if the series is too short.
    /// - `ForecastError::NonFinite` if the series or the fit contains NaN/inf.
    pub fn fit(&mut self, series: &[f64]) -> Result<()> {
        let needed = self.min_observations();
        if series.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: series.len(),
            });
        }
        if !series.iter().all(|v| v.is_finite()) {
            return Err(ForecastError::NonFinite("input series"));
        }

        let differenced = difference(series, self.period);
        let period = self.period;
        let objective = |u: &[f64]| {
            let residuals = residuals(&differenced, Coefficients::from_unconstrained(u), period);
            residuals.iter().skip(1).map(|e| e * e).sum::<f64>()
        };

        let minimum = nelder_mead(objective, &[0.0, 0.0, 0.0], NelderMead::default());
        if !minimum.value.is_finite() {
            return Err(ForecastError::NonFinite("conditional sum of squares"));
        }
        if !minimum.converged {
            tracing::debug!(
                iterations = minimum.iterations,
                "SARIMA fit stopped at the iteration cap"
            );
        }

        let coefficients = Coefficients::from_unconstrained(&minimum.point);
        let residuals = residuals(&differenced, coefficients, period);

        self.fitted = Some(Fitted {
            coefficients,
            history: series.to_vec(),
            differenced,
            residuals,
        });

        Ok(())
    }

    /// Forecast the next `steps` values after the fitted series.
    ///
    /// # Errors
    ///
    /// - `ForecastError::NotFitted` before a successful `fit`.
    /// - `ForecastError::EmptyHorizon` if `steps` is zero.
    /// - `ForecastError::NonFinite` if the recursion diverges.
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        if steps == 0 {
            return Err(ForecastError::EmptyHorizon);
        }

        let s = self.period;
        let c = fitted.coefficients;
        let mut w = fitted.differenced.clone();
        let mut e = fitted.residuals.clone();
        let mut y = fitted.history.clone();

        for _ in 0..steps {
            let t = w.len();
            let lag = |v: &[f64], k: usize| if t >= k { v[t - k] } else { 0.0 };

            let w_next = c.ar * lag(w.as_slice(), 1)
                + c.ma * lag(e.as_slice(), 1)
                + c.seasonal_ma * lag(e.as_slice(), s)
                + c.ma * c.seasonal_ma * lag(e.as_slice(), s + 1);
            w.push(w_next);
            e.push(0.0);

            // Undo (1 − B)(1 − Bˢ)
            let n = y.len();
            let y_next = w_next + y[n - 1] + y[n - s] - y[n - s - 1];
            y.push(y_next);
        }

        let forecast = y.split_off(fitted.history.len());
        if forecast.iter().all(|v| v.is_finite()) {
            Ok(forecast)
        } else {
            Err(ForecastError::NonFinite("forecast"))
        }
    }
}

/// Apply (1 − B)(1 − Bˢ) to a series.
fn difference(series: &[f64], period: usize) -> Vec<f64> {
    (period + 1..series.len())
        .map(|t| series[t] - series[t - 1] - series[t - period] + series[t - period - 1])
        .collect()
}

/// Innovations implied by the coefficients, with presample values zero.
fn residuals(w: &[f64], c: Coefficients, period: usize) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in 0..w.len() {
        let ar = if t >= 1 { c.ar * w[t - 1] } else { 0.0 };
        let e1 = if t >= 1 { e[t - 1] } else { 0.0 };
        let es = if t >= period { e[t - period] } else { 0.0 };
        let es1 = if t > period { e[t - period - 1] } else { 0.0 };
        e[t] = w[t] - ar - c.ma * e1 - c.seasonal_ma * es - c.ma * c.seasonal_ma * es1;
    }
    e
}
