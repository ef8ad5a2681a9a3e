//! Holt-Winters exponential smoothing.
//!
//! Additive level + trend + weekly seasonal recursion over the daily
//! series. Point estimate only; the smoothing state carries no usable
//! interval.

use crate::application::forecaster::adapters::{AdapterOutcome, ForecastAdapter};
use crate::application::forecaster::series::DailySeries;
use crate::domain::ports::HolidayCalendar;

const MIN_DAYS: usize = 14;
const PERIOD: usize = 7;
const ALPHA: f64 = 0.3;
const BETA: f64 = 0.05;
const GAMMA: f64 = 0.2;

pub struct ExponentialSmoothing;

impl ForecastAdapter for ExponentialSmoothing {
    fn name(&self) -> &'static str {
        "smoothing"
    }

    fn trust_weight(&self) -> f64 {
        0.15
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

        let y = &series.values;

        // Initial components from the first two weekly periods.
        let first_mean: f64 = y[..PERIOD].iter().sum::<f64>() / PERIOD as f64;
        let second_mean: f64 = y[PERIOD..2 * PERIOD].iter().sum::<f64>() / PERIOD as f64;
        let mut level = first_mean;
        let mut trend = (second_mean - first_mean) / PERIOD as f64;
        let mut season: Vec<f64> = (0..PERIOD).map(|i| y[i] - first_mean).collect();

        for (t, &value) in y.iter().enumerate() {
            let s = season[t % PERIOD];
            let prev_level = level;
            level = ALPHA * (value - s) + (1.0 - ALPHA) * (level + trend);
            trend = BETA * (level - prev_level) + (1.0 - BETA) * trend;
            season[t % PERIOD] = GAMMA * (value - level) + (1.0 - GAMMA) * s;
        }

        let mut point = 0.0;
        for k in 0..horizon_days {
            let day = level + (k + 1) as f64 * trend + season[(n + k) % PERIOD];
            point += day.max(0.0);
        }

        if !point.is_finite() {
            return AdapterOutcome::skipped("smoothing diverged");
        }

        AdapterOutcome::Estimate {
            point,
            bounds: None,
        }
    }
}
