//! Recurring-transaction mining.
//!
//! Subscriptions and fixed bills show up as equal descriptions with regular
//! inter-arrival gaps. Grouping is on the exact description string; fuzzy
//! merchant matching is the categorizer's job, not the miner's.

use crate::application::analyzer::features::FeatureRow;
use statrs::statistics::{Data, Distribution};
use std::collections::BTreeMap;

/// Minimum expense rows before mining is attempted.
pub const MIN_ROWS: usize = 30;
const MIN_OCCURRENCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Monthly,
    Weekly,
}

#[derive(Debug, Clone)]
pub struct RecurringPattern {
    pub description: String,
    pub cadence: Cadence,
    pub avg_amount: f64,
    pub occurrences: usize,
    /// 1 - (gap stddev / gap mean): regularity of the schedule.
    pub confidence: f64,
}

/// Detect monthly (gap 28-32d, σ < 5) and weekly (gap 6-8d, σ < 2) patterns.
/// Caller enforces the [`MIN_ROWS`] activation rule.
pub fn mine_recurring(rows: &[FeatureRow]) -> Vec<RecurringPattern> {
    let mut groups: BTreeMap<&str, Vec<&FeatureRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.description.as_str()).or_default().push(row);
    }

    let mut patterns = Vec::new();
    for (description, group) in groups {
        if group.len() < MIN_OCCURRENCES {
            continue;
        }

        let mut dates: Vec<_> = group.iter().map(|r| r.date).collect();
        dates.sort();
        let gaps: Vec<f64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64)
            .collect();
        if gaps.len() < 2 {
            continue;
        }

        let data = Data::new(gaps);
        let mean_gap = data.mean().unwrap_or(0.0);
        let std_gap = data.std_dev().unwrap_or(f64::MAX);

        let cadence = if (28.0..=32.0).contains(&mean_gap) && std_gap < 5.0 {
            Some(Cadence::Monthly)
        } else if (6.0..=8.0).contains(&mean_gap) && std_gap < 2.0 {
            Some(Cadence::Weekly)
        } else {
            None
        };

        if let Some(cadence) = cadence {
            let avg_amount = group.iter().map(|r| r.amount).sum::<f64>() / group.len() as f64;
            patterns.push(RecurringPattern {
                description: description.to_string(),
                cadence,
                avg_amount,
                occurrences: group.len(),
                confidence: 1.0 - (std_gap / mean_gap),
            });
        }
    }

    patterns
}
