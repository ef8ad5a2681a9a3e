use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Income,
    Expense,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Income => write!(f, "INCOME"),
            Direction::Expense => write!(f, "EXPENSE"),
        }
    }
}

/// A single ledger movement. Immutable once ingested; the engine never
/// mutates transactions, it only derives series and insights from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Option<String>,
    pub account: Option<String>,
}

impl Transaction {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Amount at the f64 statistical boundary.
    pub fn amount_f64(&self) -> f64 {
        self.amount.to_f64().unwrap_or(0.0)
    }

    pub fn is_expense(&self) -> bool {
        self.direction == Direction::Expense
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("Outros")
    }
}

/// Outcome of a categorization request.
///
/// Invariant: `accepted == (confidence > threshold)`. A rejected prediction
/// keeps its confidence and alternatives so the caller can inspect them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub category: Option<String>,
    pub confidence: f64,
    pub threshold: f64,
    /// Top candidates, descending by probability, at most 3.
    pub alternatives: Vec<(String, f64)>,
    pub accepted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightKind {
    Warning,
    Tip,
    Success,
    Danger,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
    /// Relevance in [0, 1]; insight lists are sorted descending by score.
    pub score: f64,
}

impl Insight {
    pub fn new(kind: InsightKind, text: impl Into<String>, score: f64) -> Self {
        Self {
            kind,
            text: text.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
            Trend::Stable => write!(f, "stable"),
            Trend::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForecastInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Next-period spending forecast.
///
/// Invariant: `lower <= predicted_amount <= upper` and `predicted_amount >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_amount: f64,
    pub interval: ForecastInterval,
    pub trend: Trend,
    #[serde(skip_deserializing)]
    pub models_used: Vec<&'static str>,
    pub sample_count: usize,
    pub last_period_actual: f64,
    pub variation_percent: f64,
    pub message: String,
}

impl ForecastResult {
    /// Zero-amount result for the insufficient-data and empty-filter paths.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            predicted_amount: 0.0,
            interval: ForecastInterval {
                lower: 0.0,
                upper: 0.0,
            },
            trend: Trend::InsufficientData,
            models_used: Vec::new(),
            sample_count: 0,
            last_period_actual: 0.0,
            variation_percent: 0.0,
            message: message.into(),
        }
    }
}

/// Expanding-window backtest metrics for the forecaster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub accuracy_percent: f64,
    pub mape: f64,
    pub rmse: f64,
    pub mae: f64,
    pub test_periods: usize,
    pub predictions: Vec<f64>,
    pub actuals: Vec<f64>,
}

/// Cross-validated quality of the currently loaded categorization model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub sample_count: usize,
    pub feature_count: usize,
    pub class_count: usize,
}

/// Per-detector outlier counts over an expense set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyStats {
    pub total_transactions: usize,
    pub outliers_isolation: usize,
    pub outliers_local_density: usize,
    pub outlier_rate: f64,
    pub mean_amount: f64,
    pub median_amount: f64,
    pub std_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_amount_boundary() {
        let tx = Transaction {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            description: "padaria".to_string(),
            amount: dec!(42.50),
            direction: Direction::Expense,
            category: None,
            account: None,
        };

        assert!((tx.amount_f64() - 42.5).abs() < 1e-9);
        assert!(tx.is_expense());
        assert_eq!(tx.category_label(), "Outros");
    }

    #[test]
    fn test_trend_display() {
        assert_eq!(Trend::InsufficientData.to_string(), "insufficient_data");
        assert_eq!(Trend::Increasing.to_string(), "increasing");
    }

    #[test]
    fn test_empty_forecast_is_zeroed() {
        let r = ForecastResult::empty("no data");
        assert_eq!(r.predicted_amount, 0.0);
        assert_eq!(r.trend, Trend::InsufficientData);
        assert!(r.models_used.is_empty());
    }
}
