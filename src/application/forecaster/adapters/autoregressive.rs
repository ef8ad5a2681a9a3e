//! Auto-order autoregressive forecaster.
//!
//! Fits AR(p) models (p <= 3) over the monthly totals, with and without
//! first differencing, and keeps the candidate with the lowest AIC. The
//! one-step-ahead monthly forecast is scaled to the requested horizon and
//! carries a 95% interval from the residual variance.

use crate::application::forecaster::adapters::{AdapterOutcome, ForecastAdapter};
use crate::application::forecaster::series::DailySeries;
use crate::domain::ports::HolidayCalendar;
use tracing::debug;

const MIN_DAYS: usize = 60;
const MIN_MONTHS: usize = 3;
const MAX_ORDER: usize = 3;

pub struct AutoRegressive;

#[derive(Debug, Clone)]
struct ArCandidate {
    forecast: f64,
    sigma: f64,
    aic: f64,
    order: usize,
    differenced: bool,
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

/// Least-squares AR(p) fit with intercept; returns the one-step forecast,
/// residual sigma and AIC. `p = 0` reduces to the mean model.
fn fit_ar(y: &[f64], p: usize) -> Option<(f64, f64, f64)> {
    let m = y.len();
    if m < p + 2 {
        return None;
    }
    let n_eff = m - p;
    let k = p + 1;

    // Normal equations X'X c = X'y over rows [1, y[t-1], .., y[t-p]].
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for t in p..m {
        let mut row = Vec::with_capacity(k);
        row.push(1.0);
        for lag in 1..=p {
            row.push(y[t - lag]);
        }
        for i in 0..k {
            xty[i] += row[i] * y[t];
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let coeffs = solve_linear(xtx, xty)?;

    let mut sse = 0.0;
    for t in p..m {
        let mut fitted = coeffs[0];
        for lag in 1..=p {
            fitted += coeffs[lag] * y[t - lag];
        }
        sse += (y[t] - fitted) * (y[t] - fitted);
    }

    let mut forecast = coeffs[0];
    for lag in 1..=p {
        forecast += coeffs[lag] * y[m - lag];
    }

    let sigma = (sse / n_eff as f64).sqrt();
    let aic = n_eff as f64 * (sse / n_eff as f64 + 1e-12).ln() + 2.0 * k as f64;
    Some((forecast, sigma, aic))
}

fn best_candidate(monthly: &[f64]) -> Option<ArCandidate> {
    let mut best: Option<ArCandidate> = None;

    let mut consider = |forecast: f64, sigma: f64, aic: f64, order: usize, differenced: bool| {
        if !forecast.is_finite() || !aic.is_finite() {
            return;
        }
        if best.as_ref().is_none_or(|b| aic < b.aic) {
            best = Some(ArCandidate {
                forecast,
                sigma,
                aic,
                order,
                differenced,
            });
        }
    };

    for p in 0..=MAX_ORDER.min(monthly.len().saturating_sub(2)) {
        if let Some((forecast, sigma, aic)) = fit_ar(monthly, p) {
            consider(forecast, sigma, aic, p, false);
        }
    }

    if monthly.len() >= 3 {
        let diffed: Vec<f64> = monthly.windows(2).map(|w| w[1] - w[0]).collect();
        let last = *monthly.last()?;
        for p in 0..=MAX_ORDER.min(diffed.len().saturating_sub(2)) {
            if let Some((delta, sigma, aic)) = fit_ar(&diffed, p) {
                consider(last + delta, sigma, aic, p, true);
            }
        }
    }

    best
}

impl ForecastAdapter for AutoRegressive {
    fn name(&self) -> &'static str {
        "autoregressive"
    }

    fn trust_weight(&self) -> f64 {
        0.35
    }

    fn forecast(
        &self,
        series: &DailySeries,
        horizon_days: usize,
        _calendar: &dyn HolidayCalendar,
    ) -> AdapterOutcome {
        if series.len() < MIN_DAYS {
            return AdapterOutcome::skipped(format!(
                "needs {MIN_DAYS} days, have {}",
                series.len()
            ));
        }

        let monthly: Vec<f64> = series.monthly_totals().into_iter().map(|(_, v)| v).collect();
        if monthly.len() < MIN_MONTHS {
            return AdapterOutcome::skipped(format!(
                "needs {MIN_MONTHS} months, have {}",
                monthly.len()
            ));
        }

        let Some(candidate) = best_candidate(&monthly) else {
            return AdapterOutcome::skipped("order search found no stable fit");
        };

        debug!(
            order = candidate.order,
            differenced = candidate.differenced,
            aic = candidate.aic,
            "autoregressive order selected"
        );

        let scale = horizon_days as f64 / 30.0;
        let point = (candidate.forecast * scale).max(0.0);
        let spread = 1.96 * candidate.sigma * scale;

        AdapterOutcome::Estimate {
            point,
            bounds: Some(((point - spread).max(0.0), point + spread)),
        }
    }
}
