//! Ridge regression over calendar features.
//!
//! The always-attempted fallback model: a regularized linear fit of daily
//! spend on day offset, day-of-week, day-of-month and month, scaled to the
//! horizon. Deliberately simple; its trust weight is the lowest.

use crate::application::forecaster::adapters::{AdapterOutcome, ForecastAdapter};
use crate::application::forecaster::series::DailySeries;
use crate::domain::ports::HolidayCalendar;
use chrono::{Datelike, Days};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};

const MIN_DAYS: usize = 7;
const RIDGE_ALPHA: f64 = 1.0;

pub struct CalendarRidge;

fn feature_row(offset: f64, date: chrono::NaiveDate) -> Vec<f64> {
    vec![
        offset,
        date.weekday().num_days_from_monday() as f64,
        date.day() as f64,
        date.month() as f64,
    ]
}

impl ForecastAdapter for CalendarRidge {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn trust_weight(&self) -> f64 {
        0.10
    }

    fn forecast(
        &self,
        series: &DailySeries,
        horizon_days: usize,
        _calendar: &dyn HolidayCalendar,
    ) -> AdapterOutcome {
        let n = series.len();
        if n < MIN_DAYS {
            return AdapterOutcome::skipped(format!("needs {MIN_DAYS} days, have {n}"));
        }

        let mut x: Vec<Vec<f64>> = (0..n)
            .map(|i| feature_row(i as f64, series.date_at(i)))
            .collect();
        let future_date = series.last_date() + Days::new(horizon_days as u64);
        let future_offset = (n - 1 + horizon_days) as f64;
        let mut future = feature_row(future_offset, future_date);

        // Column standardization, applied to the future row with the same
        // training statistics.
        let cols = future.len();
        for col in 0..cols {
            let mean: f64 = x.iter().map(|r| r[col]).sum::<f64>() / n as f64;
            let var: f64 = x.iter().map(|r| (r[col] - mean) * (r[col] - mean)).sum::<f64>() / n as f64;
            let std = var.sqrt().max(1e-9);
            for row in x.iter_mut() {
                row[col] = (row[col] - mean) / std;
            }
            future[col] = (future[col] - mean) / std;
        }

        let matrix = match DenseMatrix::from_2d_vec(&x) {
            Ok(m) => m,
            Err(e) => return AdapterOutcome::skipped(format!("matrix build failed: {e}")),
        };

        let model = match RidgeRegression::fit(
            &matrix,
            &series.values,
            RidgeRegressionParameters::default().with_alpha(RIDGE_ALPHA),
        ) {
            Ok(m) => m,
            Err(e) => return AdapterOutcome::skipped(format!("ridge fit failed: {e}")),
        };

        let future_matrix = match DenseMatrix::from_2d_vec(&vec![future]) {
            Ok(m) => m,
            Err(e) => return AdapterOutcome::skipped(format!("matrix build failed: {e}")),
        };
        let daily = match model.predict(&future_matrix) {
            Ok(p) => p.first().copied().unwrap_or(0.0),
            Err(e) => return AdapterOutcome::skipped(format!("ridge predict failed: {e}")),
        };

        // The fit is per-day; scale the predicted day to the horizon total.
        AdapterOutcome::Estimate {
            point: daily.max(0.0) * horizon_days as f64,
            bounds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct NoHolidays;
    impl HolidayCalendar for NoHolidays {
        fn is_holiday(&self, _date: NaiveDate) -> bool {
            false
        }
    }

    fn series_of(values: Vec<f64>) -> DailySeries {
        DailySeries {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            values,
        }
    }

    #[test]
    fn test_skips_below_one_week() {
        let outcome = CalendarRidge.forecast(&series_of(vec![50.0; 6]), 30, &NoHolidays);
        assert!(matches!(outcome, AdapterOutcome::Skipped { .. }));
    }

    #[test]
    fn test_flat_series_scales_to_horizon() {
        let outcome = CalendarRidge.forecast(&series_of(vec![100.0; 30]), 30, &NoHolidays);
        match outcome {
            AdapterOutcome::Estimate { point, bounds } => {
                assert!((point - 3000.0).abs() < 300.0, "point = {point}");
                assert!(bounds.is_none());
            }
            AdapterOutcome::Skipped { reason } => panic!("skipped: {reason}"),
        }
    }

    #[test]
    fn test_point_never_negative() {
        // Steeply decreasing series would extrapolate below zero.
        let values: Vec<f64> = (0..30).map(|i| (300.0 - 10.0 * i as f64).max(0.0)).collect();
        let outcome = CalendarRidge.forecast(&series_of(values), 30, &NoHolidays);
        match outcome {
            AdapterOutcome::Estimate { point, .. } => assert!(point >= 0.0),
            AdapterOutcome::Skipped { reason } => panic!("skipped: {reason}"),
        }
    }
}
