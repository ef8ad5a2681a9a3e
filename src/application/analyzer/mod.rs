//! Spending analysis: anomalies, recurring patterns, trends, ranked insights.

pub mod features;
pub mod outliers;
pub mod patterns;
pub mod trends;

use crate::application::analyzer::features::{FeatureRow, expense_rows};
use crate::application::analyzer::outliers::{
    consensus_outliers, isolation_flags, local_density_flags,
};
use crate::application::analyzer::patterns::{Cadence, mine_recurring};
use crate::application::analyzer::trends::{concentration_insights, trend_insights};
use crate::domain::ports::HolidayCalendar;
use crate::domain::types::{AnomalyStats, Insight, InsightKind, Transaction};
use chrono::Days;
use statrs::statistics::{Data, Distribution, OrderStatistics};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const MAX_INSIGHTS: usize = 10;
const MIN_GAMIFICATION_ROWS: usize = 30;

pub struct Analyzer {
    calendar: Arc<dyn HolidayCalendar>,
}

impl Analyzer {
    pub fn new(calendar: Arc<dyn HolidayCalendar>) -> Self {
        Self { calendar }
    }

    /// Full analysis pass. Empty input yields an empty list; a period with
    /// no expenses yields a single congratulatory insight.
    pub fn analyze(&self, transactions: &[Transaction]) -> Vec<Insight> {
        if transactions.is_empty() {
            return Vec::new();
        }

        let rows = expense_rows(transactions, self.calendar.as_ref());
        if rows.is_empty() {
            return vec![Insight::new(
                InsightKind::Success,
                "Sem despesas registradas recentemente. Continue economizando!",
                1.0,
            )];
        }

        let mut insights = Vec::new();

        for report in consensus_outliers(&rows) {
            insights.push(Insight::new(
                InsightKind::Warning,
                format!(
                    "Gasto atípico: R$ {:.2} em '{}' ({:+.0}% em relação à mediana da categoria). Verifique!",
                    report.amount, report.category, report.deviation_pct
                ),
                0.92,
            ));
        }

        if rows.len() >= patterns::MIN_ROWS {
            let monthly: Vec<_> = mine_recurring(&rows)
                .into_iter()
                .filter(|p| p.cadence == Cadence::Monthly)
                .collect();
            let total: f64 = monthly.iter().map(|p| p.avg_amount).sum();
            if total > 0.0 {
                insights.push(Insight::new(
                    InsightKind::Info,
                    format!(
                        "Gastos recorrentes identificados: R$ {:.2}/mês em {} assinaturas ou contas fixas.",
                        total,
                        monthly.len()
                    ),
                    0.75,
                ));
            }
        }

        if rows.len() >= trends::MIN_ROWS {
            insights.extend(trend_insights(&rows));
        }

        insights.extend(concentration_insights(&rows));
        insights.extend(self.seasonality_insight(&rows));
        insights.extend(weekly_savings_insight(&rows));

        if insights.is_empty() {
            insights.push(Insight::new(
                InsightKind::Tip,
                "Continue registrando seus gastos diariamente para receber insights mais precisos.",
                0.10,
            ));
        }

        insights.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        insights.truncate(MAX_INSIGHTS);

        debug!(count = insights.len(), "analysis complete");
        insights
    }

    /// Detector summary over the expense set; `None` when there are no
    /// expenses to score.
    pub fn anomaly_stats(&self, transactions: &[Transaction]) -> Option<AnomalyStats> {
        let rows = expense_rows(transactions, self.calendar.as_ref());
        if rows.is_empty() {
            return None;
        }

        let isolation = isolation_flags(&rows);
        let local = local_density_flags(&rows);
        let amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
        let mut data = Data::new(amounts);
        let outliers_isolation = isolation.iter().filter(|&&f| f).count();

        Some(AnomalyStats {
            total_transactions: rows.len(),
            outliers_isolation,
            outliers_local_density: local.iter().filter(|&&f| f).count(),
            outlier_rate: outliers_isolation as f64 / rows.len() as f64,
            mean_amount: data.mean().unwrap_or(0.0),
            median_amount: data.median(),
            std_amount: data.std_dev().unwrap_or(0.0),
        })
    }

    /// Holiday vs non-holiday average daily spend, over distinct dates.
    fn seasonality_insight(&self, rows: &[FeatureRow]) -> Option<Insight> {
        let mut per_day: BTreeMap<_, (f64, bool)> = BTreeMap::new();
        for row in rows {
            let entry = per_day.entry(row.date).or_insert((0.0, row.is_holiday));
            entry.0 += row.amount;
        }

        let (holiday, normal): (Vec<_>, Vec<_>) =
            per_day.values().partition(|(_, is_holiday)| *is_holiday);
        if holiday.is_empty() || normal.is_empty() {
            return None;
        }

        let avg_holiday = holiday.iter().map(|(a, _)| a).sum::<f64>() / holiday.len() as f64;
        let avg_normal = normal.iter().map(|(a, _)| a).sum::<f64>() / normal.len() as f64;

        if avg_normal > 1e-9 && avg_holiday > avg_normal * 1.5 {
            return Some(Insight::new(
                InsightKind::Tip,
                format!(
                    "Seus gastos em feriados são {:.0}% maiores que nos demais dias. Planeje com antecedência.",
                    (avg_holiday / avg_normal - 1.0) * 100.0
                ),
                0.70,
            ));
        }
        None
    }
}

/// Trailing week vs the week before it; fires on a >20% reduction.
fn weekly_savings_insight(rows: &[FeatureRow]) -> Option<Insight> {
    if rows.len() < MIN_GAMIFICATION_ROWS {
        return None;
    }

    let max_date = rows.iter().map(|r| r.date).max()?;
    let week_ago = max_date.checked_sub_days(Days::new(7))?;
    let two_weeks_ago = max_date.checked_sub_days(Days::new(14))?;

    let last_week: f64 = rows
        .iter()
        .filter(|r| r.date >= week_ago)
        .map(|r| r.amount)
        .sum();
    let prev_rows: Vec<_> = rows
        .iter()
        .filter(|r| r.date >= two_weeks_ago && r.date < week_ago)
        .collect();
    if prev_rows.is_empty() {
        return None;
    }
    let prev_week: f64 = prev_rows.iter().map(|r| r.amount).sum();

    if prev_week > 1e-9 && last_week < prev_week * 0.8 {
        return Some(Insight::new(
            InsightKind::Success,
            format!(
                "Semana econômica: você gastou {:.0}% menos que na semana anterior.",
                (1.0 - last_week / prev_week) * 100.0
            ),
            0.90,
        ));
    }
    None
}
