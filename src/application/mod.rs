//! Application services and the engine facade.

pub mod analyzer;
pub mod categorizer;
pub mod forecaster;

use crate::application::analyzer::Analyzer;
use crate::application::categorizer::Categorizer;
use crate::application::forecaster::{DEFAULT_HORIZON_DAYS, Forecaster};
use crate::domain::errors::ValidationError;
use crate::domain::ports::{FeedbackStore, HolidayCalendar, ModelStore};
use crate::domain::types::{
    AnomalyStats, ForecastResult, Insight, ModelMetrics, PredictionResult, Transaction,
    ValidationReport,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Single entry point for a request-handling boundary. Wires the three
/// services to the persistence and calendar ports; every operation returns
/// a structured result and never propagates a panic.
pub struct FinanceEngine {
    categorizer: Categorizer,
    analyzer: Analyzer,
    forecaster: Forecaster,
}

impl FinanceEngine {
    /// Build the engine and load (or train) the categorization model.
    pub fn new(
        feedback: Arc<dyn FeedbackStore>,
        model_store: Arc<dyn ModelStore>,
        calendar: Arc<dyn HolidayCalendar>,
    ) -> Self {
        let categorizer = Categorizer::new(feedback, model_store);
        categorizer.bootstrap();

        Self {
            categorizer,
            analyzer: Analyzer::new(calendar.clone()),
            forecaster: Forecaster::new(calendar),
        }
    }

    pub fn categorize(
        &self,
        description: &str,
        amount: Option<Decimal>,
    ) -> Option<PredictionResult> {
        self.categorizer.predict(description, amount)
    }

    pub fn submit_feedback(&self, description: &str, category: &str) -> bool {
        self.categorizer.learn(description, category)
    }

    pub fn analyze(&self, transactions: &[Transaction]) -> Vec<Insight> {
        self.analyzer.analyze(transactions)
    }

    pub fn anomaly_stats(&self, transactions: &[Transaction]) -> Option<AnomalyStats> {
        self.analyzer.anomaly_stats(transactions)
    }

    pub fn forecast(
        &self,
        transactions: &[Transaction],
        horizon_days: Option<usize>,
    ) -> ForecastResult {
        self.forecaster
            .predict_next_period(transactions, horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS))
    }

    pub fn forecast_by_category(
        &self,
        transactions: &[Transaction],
        category: &str,
    ) -> ForecastResult {
        self.forecaster
            .forecast_by_category(transactions, category, DEFAULT_HORIZON_DAYS)
    }

    pub fn validate_forecast(
        &self,
        transactions: &[Transaction],
        test_periods: usize,
    ) -> Result<ValidationReport, ValidationError> {
        self.forecaster.validate(transactions, test_periods)
    }

    pub fn model_metrics(&self) -> Option<ModelMetrics> {
        self.categorizer.model_metrics()
    }
}
