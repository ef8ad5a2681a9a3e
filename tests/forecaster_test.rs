//! Forecasting scenarios over synthetic expense histories.

use chrono::{Datelike, Days, NaiveDate, TimeZone, Utc};
use finsight::application::forecaster::{DEFAULT_HORIZON_DAYS, Forecaster};
use finsight::domain::types::{Direction, Transaction, Trend};
use finsight::infrastructure::calendar::BrazilianHolidays;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::sync::Arc;
use uuid::Uuid;

fn tx(date: NaiveDate, amount: f64, category: &str) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        timestamp: Utc.from_utc_datetime(&date.and_hms_opt(11, 0, 0).unwrap()),
        description: "compra".to_string(),
        amount: Decimal::from_f64(amount).unwrap(),
        direction: Direction::Expense,
        category: Some(category.to_string()),
        account: None,
    }
}

/// Daily transactions producing the given total in each calendar month of 2025.
fn months_of_spending(monthly_totals: &[f64], category: &str) -> Vec<Transaction> {
    let mut txs = Vec::new();
    for (m, &total) in monthly_totals.iter().enumerate() {
        let month = m as u32 + 1;
        let days_in_month = NaiveDate::from_ymd_opt(2025, month, 1)
            .unwrap()
            .iter_days()
            .take_while(|d| d.month() == month)
            .count() as u32;
        for d in 1..=days_in_month {
            txs.push(tx(
                NaiveDate::from_ymd_opt(2025, month, d).unwrap(),
                total / days_in_month as f64,
                category,
            ));
        }
    }
    txs
}

fn forecaster() -> Forecaster {
    Forecaster::new(Arc::new(BrazilianHolidays))
}

#[test]
fn test_empty_input_returns_insufficient_data() {
    let result = forecaster().predict_next_period(&[], DEFAULT_HORIZON_DAYS);

    assert_eq!(result.predicted_amount, 0.0);
    assert_eq!(result.trend, Trend::InsufficientData);
    assert!(result.models_used.is_empty());
    assert_eq!(result.sample_count, 0);
}

#[test]
fn test_under_seven_days_returns_insufficient_data() {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let txs: Vec<Transaction> = (0..6)
        .map(|d| tx(start + Days::new(d), 80.0, "Alimentação"))
        .collect();

    let result = forecaster().predict_next_period(&txs, DEFAULT_HORIZON_DAYS);
    assert_eq!(result.predicted_amount, 0.0);
    assert_eq!(result.trend, Trend::InsufficientData);
    assert!(result.models_used.is_empty());
}

#[test]
fn test_forecast_interval_invariants() {
    for totals in [
        vec![1500.0; 3],
        vec![2000.0, 2100.0, 2200.0, 2300.0, 2400.0, 2500.0],
        vec![3000.0, 2700.0, 2400.0, 2100.0],
    ] {
        let result =
            forecaster().predict_next_period(&months_of_spending(&totals, "Alimentação"), 30);

        assert!(result.predicted_amount >= 0.0);
        assert!(result.interval.lower <= result.predicted_amount);
        assert!(result.predicted_amount <= result.interval.upper);
        assert!(!result.models_used.is_empty());
    }
}

#[test]
fn test_steadily_rising_months_forecast_above_last_month() {
    // Strictly increasing monthly totals, 2000 -> 2500.
    let txs = months_of_spending(
        &[2000.0, 2100.0, 2200.0, 2300.0, 2400.0, 2500.0],
        "Alimentação",
    );
    let result = forecaster().predict_next_period(&txs, DEFAULT_HORIZON_DAYS);

    assert!(
        result.predicted_amount > 2500.0,
        "forecast {} should exceed the last monthly total",
        result.predicted_amount
    );
    assert_ne!(result.trend, Trend::Decreasing);
    assert_ne!(result.trend, Trend::InsufficientData);
}

#[test]
fn test_accelerating_growth_labelled_increasing() {
    // Six months of daily spend compounding 1% a day: monthly totals are
    // strictly increasing and the forecast lands well above 110% of the
    // trailing 30-day total.
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let txs: Vec<Transaction> = (0..180)
        .map(|d| {
            tx(
                start + Days::new(d),
                50.0 * 1.01f64.powi(d as i32),
                "Alimentação",
            )
        })
        .collect();
    let last_month_total: f64 = txs
        .iter()
        .filter(|t| t.date().month() == 6)
        .map(|t| t.amount_f64())
        .sum();

    let result = forecaster().predict_next_period(&txs, DEFAULT_HORIZON_DAYS);

    assert_eq!(result.trend, Trend::Increasing, "{result:?}");
    assert!(result.predicted_amount > last_month_total, "{result:?}");
    assert!(result.variation_percent > 10.0);
}

#[test]
fn test_collapsing_spend_labelled_decreasing() {
    let txs = months_of_spending(
        &[6000.0, 5000.0, 4000.0, 3000.0, 2000.0, 1000.0],
        "Alimentação",
    );
    let result = forecaster().predict_next_period(&txs, DEFAULT_HORIZON_DAYS);

    assert_eq!(result.trend, Trend::Decreasing, "{result:?}");
}

#[test]
fn test_adapter_activation_by_history_length() {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    // 10 days: only the linear adapter qualifies.
    let txs: Vec<Transaction> = (0..10)
        .map(|d| tx(start + Days::new(d), 70.0, "Alimentação"))
        .collect();
    let result = forecaster().predict_next_period(&txs, DEFAULT_HORIZON_DAYS);
    assert_eq!(result.models_used, vec!["linear"]);

    // 20 days: smoothing joins.
    let txs: Vec<Transaction> = (0..20)
        .map(|d| tx(start + Days::new(d), 70.0, "Alimentação"))
        .collect();
    let result = forecaster().predict_next_period(&txs, DEFAULT_HORIZON_DAYS);
    assert_eq!(result.models_used, vec!["smoothing", "linear"]);

    // 40 days: seasonal joins, autoregressive still needs 60.
    let txs: Vec<Transaction> = (0..40)
        .map(|d| tx(start + Days::new(d), 70.0, "Alimentação"))
        .collect();
    let result = forecaster().predict_next_period(&txs, DEFAULT_HORIZON_DAYS);
    assert_eq!(result.models_used, vec!["seasonal", "smoothing", "linear"]);
}

#[test]
fn test_category_scoped_forecast() {
    let mut txs = months_of_spending(&[1800.0, 1850.0, 1900.0, 1950.0], "Alimentação");
    txs.extend(months_of_spending(&[400.0, 420.0, 430.0, 450.0], "Transporte"));

    let food = forecaster().forecast_by_category(&txs, "Alimentação", DEFAULT_HORIZON_DAYS);
    let transit = forecaster().forecast_by_category(&txs, "Transporte", DEFAULT_HORIZON_DAYS);
    assert!(food.predicted_amount > transit.predicted_amount);

    let missing = forecaster().forecast_by_category(&txs, "Pets", DEFAULT_HORIZON_DAYS);
    assert_eq!(missing.predicted_amount, 0.0);
    assert_eq!(missing.trend, Trend::InsufficientData);
    assert!(missing.message.contains("Pets"));
}

#[test]
fn test_rolling_validation_metrics() {
    let txs = months_of_spending(
        &[2000.0, 2050.0, 2120.0, 2180.0, 2260.0, 2320.0],
        "Alimentação",
    );
    let report = forecaster().validate(&txs, 2).expect("validation runs");

    assert_eq!(report.test_periods, 2);
    assert_eq!(report.predictions.len(), 2);
    assert_eq!(report.actuals.len(), 2);
    assert!(report.mape >= 0.0);
    assert!(report.mae >= 0.0);
    assert!(report.rmse >= 0.0);
    assert!((report.accuracy_percent - (100.0 - report.mape).max(0.0)).abs() < 1e-9);
    // Smooth series should backtest reasonably well.
    assert!(report.mape < 50.0, "{report:?}");
}

#[test]
fn test_validation_rejects_short_history() {
    let txs = months_of_spending(&[2000.0, 2100.0], "Alimentação");
    assert!(forecaster().validate(&txs, 2).is_err());
}
