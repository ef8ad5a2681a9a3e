//! Spending trend and concentration analysis.
//!
//! Monthly totals are tested for a significant linear trend (p < 0.05 and
//! R² > 0.5), the two latest months are compared directly, and category
//! shares are checked against their budget thresholds and the
//! Herfindahl-Hirschman concentration index.

use crate::application::analyzer::features::FeatureRow;
use crate::domain::profiles::profile_for;
use crate::domain::types::{Insight, InsightKind};
use chrono::Datelike;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

/// Minimum expense rows before trend analysis is attempted.
pub const MIN_ROWS: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct Regression {
    pub slope: f64,
    pub r_squared: f64,
    pub p_value: f64,
}

/// OLS over `y` with x = 0..n, with slope significance via the Student-t
/// distribution. `None` below 3 points (no residual degrees of freedom).
pub fn linear_regression(y: &[f64]) -> Option<Regression> {
    let n = y.len();
    if n < 3 {
        return None;
    }

    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (yi - mean_y);
    }
    if sxx < 1e-12 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += (yi - fitted) * (yi - fitted);
        ss_tot += (yi - mean_y) * (yi - mean_y);
    }

    if ss_tot < 1e-12 {
        // Flat series: no trend, no significance.
        return Some(Regression {
            slope: 0.0,
            r_squared: 0.0,
            p_value: 1.0,
        });
    }

    let r_squared = 1.0 - ss_res / ss_tot;
    let df = nf - 2.0;
    let se = (ss_res / df / sxx).sqrt();

    let p_value = if se < 1e-12 {
        0.0
    } else {
        let t = (slope / se).abs();
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        2.0 * (1.0 - dist.cdf(t))
    };

    Some(Regression {
        slope,
        r_squared,
        p_value,
    })
}

/// Chronologically ordered (year, month) expense totals.
pub fn monthly_totals(rows: &[FeatureRow]) -> Vec<f64> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for row in rows {
        *months
            .entry((row.date.year(), row.date.month()))
            .or_insert(0.0) += row.amount;
    }
    months.into_values().collect()
}

/// Regression trend plus latest-vs-previous month comparison.
/// Caller enforces the [`MIN_ROWS`] activation rule.
pub fn trend_insights(rows: &[FeatureRow]) -> Vec<Insight> {
    let mut insights = Vec::new();

    let monthly = monthly_totals(rows);
    if monthly.len() < 2 {
        return insights;
    }

    if let Some(reg) = linear_regression(&monthly) {
        if reg.p_value < 0.05 && reg.r_squared > 0.5 {
            let avg = monthly.iter().sum::<f64>() / monthly.len() as f64;
            if avg > 1e-9 {
                let monthly_change = reg.slope / avg * 100.0;
                if monthly_change > 5.0 {
                    insights.push(Insight::new(
                        InsightKind::Warning,
                        format!(
                            "Tendência de alta: seus gastos crescem {:.1}% ao mês de forma consistente.",
                            monthly_change
                        ),
                        0.90,
                    ));
                } else if monthly_change < -5.0 {
                    insights.push(Insight::new(
                        InsightKind::Success,
                        format!(
                            "Tendência de queda: seus gastos caem {:.1}% ao mês. Continue assim.",
                            monthly_change.abs()
                        ),
                        0.85,
                    ));
                }
            }
        }
    }

    let current = monthly[monthly.len() - 1];
    let previous = monthly[monthly.len() - 2];
    if previous > 1e-9 {
        let variation = (current - previous) / previous * 100.0;
        if variation > 25.0 {
            insights.push(Insight::new(
                InsightKind::Danger,
                format!(
                    "Alerta: gastos subiram {:.1}% em relação ao mês anterior (de R$ {:.2} para R$ {:.2}).",
                    variation, previous, current
                ),
                0.95,
            ));
        } else if variation > 15.0 {
            insights.push(Insight::new(
                InsightKind::Warning,
                format!(
                    "Aumento moderado: gastos {:.1}% maiores que no mês anterior.",
                    variation
                ),
                0.80,
            ));
        } else if variation < -15.0 {
            insights.push(Insight::new(
                InsightKind::Success,
                format!(
                    "Economia: você gastou {:.1}% menos que no mês passado.",
                    variation.abs()
                ),
                0.85,
            ));
        }
    }

    insights
}

/// Top-category budget share and HHI diversification check.
pub fn concentration_insights(rows: &[FeatureRow]) -> Vec<Insight> {
    let mut insights = Vec::new();

    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *by_category.entry(row.category.as_str()).or_insert(0.0) += row.amount;
    }
    let total: f64 = by_category.values().sum();
    if total < 1e-9 {
        return insights;
    }

    if let Some((top_category, top_amount)) = by_category
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(c, a)| (*c, *a))
    {
        let percent = top_amount / total * 100.0;
        let budget_threshold = profile_for(top_category).budget_warn_fraction * 100.0;

        if percent > budget_threshold + 15.0 {
            insights.push(Insight::new(
                InsightKind::Warning,
                format!(
                    "'{}' representa {:.1}% dos seus gastos (R$ {:.2}). Considere redistribuir o orçamento.",
                    top_category, percent, top_amount
                ),
                0.88,
            ));
        } else if percent > budget_threshold {
            insights.push(Insight::new(
                InsightKind::Info,
                format!(
                    "'{}' é sua maior categoria de gastos ({:.1}%, R$ {:.2}).",
                    top_category, percent, top_amount
                ),
                0.70,
            ));
        }
    }

    let hhi: f64 = by_category
        .values()
        .map(|a| (a / total) * (a / total))
        .sum();
    if hhi > 0.3 {
        insights.push(Insight::new(
            InsightKind::Tip,
            "Seus gastos estão concentrados em poucas categorias. Diversificar facilita o planejamento.",
            0.60,
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row_on(date: NaiveDate, amount: f64, category: &str) -> FeatureRow {
        FeatureRow {
            amount,
            date,
            day_of_week: date.weekday().num_days_from_monday(),
            day_of_month: date.day(),
            month: date.month(),
            is_weekend: false,
            is_month_start: false,
            is_month_end: false,
            is_holiday: false,
            category: category.to_string(),
            description: "compra".to_string(),
        }
    }

    /// `totals[m]` spread over `per_month` equal transactions in month m+1.
    fn rows_for_monthly_totals(totals: &[f64], per_month: usize) -> Vec<FeatureRow> {
        let mut rows = Vec::new();
        for (m, &total) in totals.iter().enumerate() {
            for d in 0..per_month {
                let date =
                    NaiveDate::from_ymd_opt(2025, m as u32 + 1, d as u32 + 1).unwrap();
                rows.push(row_on(date, total / per_month as f64, "Alimentação"));
            }
        }
        rows
    }

    #[test]
    fn test_regression_detects_steady_growth() {
        let y = vec![2000.0, 2100.0, 2200.0, 2300.0, 2400.0, 2500.0];
        let reg = linear_regression(&y).unwrap();
        assert!((reg.slope - 100.0).abs() < 1e-6);
        assert!(reg.r_squared > 0.99);
        assert!(reg.p_value < 0.01);
    }

    #[test]
    fn test_regression_flat_series_not_significant() {
        let reg = linear_regression(&[500.0, 500.0, 500.0, 500.0]).unwrap();
        assert_eq!(reg.slope, 0.0);
        assert!(reg.p_value > 0.5);
    }

    #[test]
    fn test_noise_has_high_p_value() {
        let y = vec![1000.0, 1400.0, 900.0, 1300.0, 950.0, 1350.0];
        let reg = linear_regression(&y).unwrap();
        assert!(reg.p_value > 0.05 || reg.r_squared < 0.5);
    }

    #[test]
    fn test_increasing_trend_emits_warning() {
        // ~8% monthly growth: comfortably past the 5%-per-month gate.
        let rows = rows_for_monthly_totals(&[2000.0, 2160.0, 2333.0, 2520.0, 2721.0, 2939.0], 12);
        let insights = trend_insights(&rows);
        assert!(
            insights
                .iter()
                .any(|i| i.kind == InsightKind::Warning && i.score == 0.90),
            "{insights:?}"
        );
    }

    #[test]
    fn test_month_over_month_danger() {
        let rows = rows_for_monthly_totals(&[1000.0, 1400.0], 10);
        let insights = trend_insights(&rows);
        assert!(
            insights
                .iter()
                .any(|i| i.kind == InsightKind::Danger && i.score == 0.95)
        );
    }

    #[test]
    fn test_month_over_month_savings() {
        let rows = rows_for_monthly_totals(&[1000.0, 800.0], 10);
        let insights = trend_insights(&rows);
        assert!(
            insights
                .iter()
                .any(|i| i.kind == InsightKind::Success && i.score == 0.85)
        );
    }

    #[test]
    fn test_concentration_warning_over_budget() {
        // Eletrônicos warns above 5% of spend; 60% is far past +15pp.
        let mut rows = rows_for_monthly_totals(&[400.0], 4);
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        rows.push(row_on(date, 600.0, "Eletrônicos"));

        let insights = concentration_insights(&rows);
        assert!(
            insights
                .iter()
                .any(|i| i.kind == InsightKind::Warning && i.text.contains("Eletrônicos"))
        );
    }

    #[test]
    fn test_hhi_tip_for_concentrated_spend() {
        let rows = rows_for_monthly_totals(&[1000.0], 10);
        let insights = concentration_insights(&rows);
        assert!(insights.iter().any(|i| i.kind == InsightKind::Tip));
    }
}
