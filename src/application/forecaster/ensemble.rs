//! Weighted combination of adapter estimates.
//!
//! Fixed trust weights are renormalized over the adapters that actually
//! produced output. The interval is conservative: the minimum of the
//! available lower bounds and the maximum of the available upper bounds,
//! with ±20% synthetic bounds when no adapter provided any.

use crate::domain::types::Trend;

#[derive(Debug, Clone)]
pub struct AdapterEstimate {
    pub name: &'static str,
    pub weight: f64,
    pub point: f64,
    pub bounds: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy)]
pub struct Combined {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Combine available estimates; `None` when the list is empty.
pub fn combine(estimates: &[AdapterEstimate]) -> Option<Combined> {
    if estimates.is_empty() {
        return None;
    }

    let total_weight: f64 = estimates.iter().map(|e| e.weight).sum();
    let point = if total_weight > 1e-12 {
        estimates.iter().map(|e| e.weight * e.point).sum::<f64>() / total_weight
    } else {
        estimates.iter().map(|e| e.point).sum::<f64>() / estimates.len() as f64
    };

    let lowers: Vec<f64> = estimates.iter().filter_map(|e| e.bounds.map(|b| b.0)).collect();
    let uppers: Vec<f64> = estimates.iter().filter_map(|e| e.bounds.map(|b| b.1)).collect();

    let lower = if lowers.is_empty() {
        point * 0.8
    } else {
        lowers.iter().cloned().fold(f64::INFINITY, f64::min)
    };
    let upper = if uppers.is_empty() {
        point * 1.2
    } else {
        uppers.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    };

    let point = point.max(0.0);
    Some(Combined {
        point,
        lower: lower.clamp(0.0, point),
        upper: upper.max(point),
    })
}

/// Trend label vs the trailing actual total: ±10% band is "stable".
pub fn classify_trend(predicted: f64, trailing_actual: f64) -> Trend {
    if trailing_actual <= 1e-9 {
        return Trend::Stable;
    }
    let variation = (predicted - trailing_actual) / trailing_actual * 100.0;
    if variation > 10.0 {
        Trend::Increasing
    } else if variation < -10.0 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
