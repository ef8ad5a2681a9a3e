//! Fixed per-transaction feature schema.
//!
//! The detectors consume a declared struct rather than an ad-hoc map, so
//! feature order and count are checked at compile time.

use crate::domain::ports::HolidayCalendar;
use crate::domain::types::Transaction;
use chrono::{Datelike, NaiveDate};

/// One expense row with engineered calendar features.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub amount: f64,
    pub date: NaiveDate,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    pub day_of_month: u32,
    pub month: u32,
    pub is_weekend: bool,
    pub is_month_start: bool,
    pub is_month_end: bool,
    pub is_holiday: bool,
    pub category: String,
    pub description: String,
}

impl FeatureRow {
    /// Numeric vector consumed by the geometric outlier detectors.
    pub fn detector_vector(&self) -> [f64; 3] {
        [
            self.amount,
            self.day_of_week as f64,
            self.day_of_month as f64,
        ]
    }
}

/// Expense rows in chronological order, income filtered out.
pub fn expense_rows(transactions: &[Transaction], calendar: &dyn HolidayCalendar) -> Vec<FeatureRow> {
    let mut rows: Vec<FeatureRow> = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| {
            let date = t.date();
            let day_of_week = date.weekday().num_days_from_monday();
            let day_of_month = date.day();
            FeatureRow {
                amount: t.amount_f64(),
                date,
                day_of_week,
                day_of_month,
                month: date.month(),
                is_weekend: day_of_week >= 5,
                is_month_start: day_of_month <= 5,
                is_month_end: day_of_month >= 25,
                is_holiday: calendar.is_holiday(date),
                category: t.category_label().to_string(),
                description: t.description.clone(),
            }
        })
        .collect();

    rows.sort_by_key(|r| r.date);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Direction;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    struct NoHolidays;
    impl HolidayCalendar for NoHolidays {
        fn is_holiday(&self, _date: NaiveDate) -> bool {
            false
        }
    }

    fn tx(day: u32, direction: Direction) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            description: "mercado".to_string(),
            amount: dec!(50),
            direction,
            category: Some("Alimentação".to_string()),
            account: None,
        }
    }

    #[test]
    fn test_income_filtered_out() {
        let txs = vec![tx(1, Direction::Expense), tx(2, Direction::Income)];
        let rows = expense_rows(&txs, &NoHolidays);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_calendar_flags() {
        // 2025-03-01 is a Saturday.
        let rows = expense_rows(&[tx(1, Direction::Expense)], &NoHolidays);
        assert!(rows[0].is_weekend);
        assert!(rows[0].is_month_start);
        assert!(!rows[0].is_month_end);
        assert_eq!(rows[0].day_of_week, 5);

        let rows = expense_rows(&[tx(28, Direction::Expense)], &NoHolidays);
        assert!(rows[0].is_month_end);
        assert!(!rows[0].is_weekend);
    }

    #[test]
    fn test_rows_sorted_by_date() {
        let txs = vec![
            tx(20, Direction::Expense),
            tx(5, Direction::Expense),
            tx(12, Direction::Expense),
        ];
        let rows = expense_rows(&txs, &NoHolidays);
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    }
}
