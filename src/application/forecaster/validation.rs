//! Rolling-origin (expanding-window) backtest.
//!
//! The last `test_periods` months are held out one at a time: each is
//! forecast using only transactions dated before it, then folded back into
//! the training window before the next forecast.

use crate::application::forecaster::series::build_daily_series;
use crate::application::forecaster::{DEFAULT_HORIZON_DAYS, Forecaster};
use crate::domain::errors::ValidationError;
use crate::domain::types::{Transaction, ValidationReport};
use chrono::NaiveDate;
use tracing::debug;

const MIN_HISTORY_DAYS: usize = 90;
const MIN_MONTHS: usize = 3;

pub fn validate(
    forecaster: &Forecaster,
    transactions: &[Transaction],
    test_periods: usize,
) -> Result<ValidationReport, ValidationError> {
    let series = build_daily_series(transactions).ok_or(ValidationError::InsufficientHistory {
        required: MIN_HISTORY_DAYS,
        actual: 0,
    })?;

    if series.len() < MIN_HISTORY_DAYS {
        return Err(ValidationError::InsufficientHistory {
            required: MIN_HISTORY_DAYS,
            actual: series.len(),
        });
    }

    let monthly = series.monthly_totals();
    let test_periods = test_periods.max(1);
    if monthly.len() < MIN_MONTHS || monthly.len() <= test_periods {
        return Err(ValidationError::TooFewMonths {
            months: monthly.len(),
            test_periods,
        });
    }

    let mut predictions = Vec::with_capacity(test_periods);
    let mut actuals = Vec::with_capacity(test_periods);

    for ((year, month), actual) in monthly.iter().skip(monthly.len() - test_periods) {
        let Some(cutoff) = NaiveDate::from_ymd_opt(*year, *month, 1) else {
            continue;
        };

        // Expanding window: everything strictly before the held-out month.
        let train: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.date() < cutoff)
            .cloned()
            .collect();

        let forecast = forecaster.predict_next_period(&train, DEFAULT_HORIZON_DAYS);
        debug!(
            year,
            month,
            predicted = forecast.predicted_amount,
            actual,
            "backtest period"
        );

        predictions.push(forecast.predicted_amount);
        actuals.push(*actual);
    }

    let n = predictions.len() as f64;
    let mape = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (a - p).abs() / a.abs().max(1e-9))
        .sum::<f64>()
        / n
        * 100.0;
    let rmse = (predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (a - p) * (a - p))
        .sum::<f64>()
        / n)
        .sqrt();
    let mae = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (a - p).abs())
        .sum::<f64>()
        / n;

    Ok(ValidationReport {
        accuracy_percent: (100.0 - mape).max(0.0),
        mape,
        rmse,
        mae,
        test_periods,
        predictions,
        actuals,
    })
}
