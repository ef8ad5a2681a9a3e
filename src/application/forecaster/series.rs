//! Daily spending series construction.
//!
//! Expense amounts are summed per calendar day over a contiguous,
//! zero-filled date range. Extreme days are dampened rather than removed so
//! the series keeps its length and weekday alignment: a single large
//! purchase should not dominate every downstream model.

use crate::domain::types::Transaction;
use chrono::{Datelike, Days, NaiveDate};
use statrs::statistics::{Data, OrderStatistics};
use std::collections::BTreeMap;

/// Minimum points before IQR dampening is applied.
const MIN_DAMPEN_POINTS: usize = 10;
const IQR_MULTIPLIER: f64 = 3.0;

/// Contiguous per-day expense totals starting at `start`.
#[derive(Debug, Clone)]
pub struct DailySeries {
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Days::new(index as u64)
    }

    pub fn last_date(&self) -> NaiveDate {
        self.date_at(self.len().saturating_sub(1))
    }

    /// Sum of the trailing `days` values (whole series when shorter).
    pub fn trailing_sum(&self, days: usize) -> f64 {
        let skip = self.values.len().saturating_sub(days);
        self.values[skip..].iter().sum()
    }

    /// Calendar-month totals in chronological order. The first and last
    /// months may be partial; callers decide whether that matters.
    pub fn monthly_totals(&self) -> Vec<((i32, u32), f64)> {
        let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for (i, &v) in self.values.iter().enumerate() {
            let date = self.date_at(i);
            *months.entry((date.year(), date.month())).or_insert(0.0) += v;
        }
        months.into_iter().collect()
    }
}

/// Build the zero-filled daily expense series. `None` when the input has no
/// expense transactions.
pub fn build_daily_series(transactions: &[Transaction]) -> Option<DailySeries> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        *per_day.entry(t.date()).or_insert(0.0) += t.amount_f64();
    }

    let (&start, _) = per_day.iter().next()?;
    let (&end, _) = per_day.iter().next_back()?;

    let mut values = Vec::new();
    let mut date = start;
    while date <= end {
        values.push(per_day.get(&date).copied().unwrap_or(0.0));
        date = date.succ_opt()?;
    }

    Some(DailySeries { start, values })
}

/// Dampen extreme days in place: values above `Q3 + 3*IQR` become the series
/// median, values below `Q1 - 3*IQR` become 0. No-op under
/// [`MIN_DAMPEN_POINTS`] points.
pub fn dampen_outliers(series: &mut DailySeries) {
    if series.len() < MIN_DAMPEN_POINTS {
        return;
    }

    let mut data = Data::new(series.values.clone());
    let q1 = data.quantile(0.25);
    let q3 = data.quantile(0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_MULTIPLIER * iqr;
    let upper = q3 + IQR_MULTIPLIER * iqr;
    let median = data.median();

    for v in series.values.iter_mut() {
        if *v > upper {
            *v = median;
        } else if *v < lower {
            *v = 0.0;
        }
    }
}
