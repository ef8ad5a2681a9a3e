//! Next-period spending forecast.

pub mod adapters;
pub mod ensemble;
pub mod series;
pub mod validation;

use crate::application::forecaster::adapters::{AdapterOutcome, ForecastAdapter, default_adapters};
use crate::application::forecaster::ensemble::{AdapterEstimate, classify_trend, combine};
use crate::application::forecaster::series::{build_daily_series, dampen_outliers};
use crate::domain::errors::ValidationError;
use crate::domain::ports::HolidayCalendar;
use crate::domain::types::{ForecastInterval, ForecastResult, Transaction, ValidationReport};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_HORIZON_DAYS: usize = 30;
/// Below this many days of series the forecast is not attempted at all.
const MIN_SERIES_DAYS: usize = 7;
/// Window for the "last period actual" comparison.
const TRAILING_DAYS: usize = 30;

pub struct Forecaster {
    calendar: Arc<dyn HolidayCalendar>,
    adapters: Vec<Box<dyn ForecastAdapter>>,
}

impl Forecaster {
    pub fn new(calendar: Arc<dyn HolidayCalendar>) -> Self {
        Self {
            calendar,
            adapters: default_adapters(),
        }
    }

    /// Forecast total expense spend over the next `horizon_days`.
    pub fn predict_next_period(
        &self,
        transactions: &[Transaction],
        horizon_days: usize,
    ) -> ForecastResult {
        if transactions.is_empty() {
            return ForecastResult::empty("Sem transações para analisar.");
        }

        let Some(mut series) = build_daily_series(transactions) else {
            return ForecastResult::empty("Sem despesas registradas no período.");
        };

        if series.len() < MIN_SERIES_DAYS {
            let mut result =
                ForecastResult::empty(format!("Histórico insuficiente (mínimo {MIN_SERIES_DAYS} dias)."));
            result.sample_count = series.len();
            return result;
        }

        dampen_outliers(&mut series);
        let trailing_actual = series.trailing_sum(TRAILING_DAYS);

        let mut estimates: Vec<AdapterEstimate> = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            match adapter.forecast(&series, horizon_days, self.calendar.as_ref()) {
                AdapterOutcome::Estimate { point, bounds } => {
                    estimates.push(AdapterEstimate {
                        name: adapter.name(),
                        weight: adapter.trust_weight(),
                        point,
                        bounds,
                    });
                }
                AdapterOutcome::Skipped { reason } => {
                    debug!(adapter = adapter.name(), reason, "adapter skipped");
                }
            }
        }

        let models_used: Vec<&'static str> = estimates.iter().map(|e| e.name).collect();

        let (point, lower, upper, message) = match combine(&estimates) {
            Some(combined) => (
                combined.point,
                combined.lower,
                combined.upper,
                format!(
                    "Previsão baseada em {} modelo(s) com {} dias de histórico.",
                    estimates.len(),
                    series.len()
                ),
            ),
            None => (
                // Every adapter was skipped: trailing actual ±15%.
                trailing_actual,
                trailing_actual * 0.85,
                trailing_actual * 1.15,
                "Sem modelos disponíveis; usando a soma dos últimos 30 dias.".to_string(),
            ),
        };

        let variation_percent = if trailing_actual > 1e-9 {
            (point - trailing_actual) / trailing_actual * 100.0
        } else {
            0.0
        };

        ForecastResult {
            predicted_amount: point,
            interval: ForecastInterval { lower, upper },
            trend: classify_trend(point, trailing_actual),
            models_used,
            sample_count: series.len(),
            last_period_actual: trailing_actual,
            variation_percent,
            message,
        }
    }

    /// Same pipeline, restricted to one category label.
    pub fn forecast_by_category(
        &self,
        transactions: &[Transaction],
        category: &str,
        horizon_days: usize,
    ) -> ForecastResult {
        let filtered: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.category_label() == category)
            .cloned()
            .collect();

        if filtered.is_empty() {
            return ForecastResult::empty(format!("Sem dados para a categoria '{category}'."));
        }

        self.predict_next_period(&filtered, horizon_days)
    }

    /// Expanding-window backtest over the last `test_periods` months.
    pub fn validate(
        &self,
        transactions: &[Transaction],
        test_periods: usize,
    ) -> Result<ValidationReport, ValidationError> {
        validation::validate(self, transactions, test_periods)
    }
}
