//! Forecasting strategy adapters.
//!
//! Each adapter is an independent model behind a common trait. An adapter
//! never fails the request: anything it cannot do — too little data,
//! degenerate numerics — comes back as [`AdapterOutcome::Skipped`] so the
//! ensemble can deterministically enumerate its contributors.

pub mod autoregressive;
pub mod ridge;
pub mod seasonal;
pub mod smoothing;

use crate::application::forecaster::series::DailySeries;
use crate::domain::ports::HolidayCalendar;

#[derive(Debug, Clone)]
pub enum AdapterOutcome {
    Estimate {
        /// Total spend predicted over the horizon.
        point: f64,
        /// Optional (lower, upper) confidence bounds.
        bounds: Option<(f64, f64)>,
    },
    Skipped {
        reason: String,
    },
}

impl AdapterOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        AdapterOutcome::Skipped {
            reason: reason.into(),
        }
    }
}

pub trait ForecastAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fixed trust weight used by the ensemble combination.
    fn trust_weight(&self) -> f64;

    fn forecast(
        &self,
        series: &DailySeries,
        horizon_days: usize,
        calendar: &dyn HolidayCalendar,
    ) -> AdapterOutcome;
}

/// The standard adapter set in trust-weight order.
pub fn default_adapters() -> Vec<Box<dyn ForecastAdapter>> {
    vec![
        Box::new(seasonal::SeasonalDecomposition),
        Box::new(autoregressive::AutoRegressive),
        Box::new(smoothing::ExponentialSmoothing),
        Box::new(ridge::CalendarRidge),
    ]
}
