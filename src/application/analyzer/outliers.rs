//! Multi-method outlier detection with consensus.
//!
//! Three detectors with different failure modes run independently:
//! an isolation forest (global, partition-based), a local-density ratio
//! detector (contextual), and a per-category MAD threshold (robust
//! univariate). A transaction is only reported when at least
//! [`CONSENSUS_VOTES`] of the three agree, which keeps single-method false
//! positives out of the insight feed.

use crate::application::analyzer::features::FeatureRow;
use crate::domain::profiles::profile_for;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use statrs::statistics::{Data, Distribution, OrderStatistics};
use std::collections::BTreeMap;
use tracing::debug;

/// Expected share of anomalous transactions.
const CONTAMINATION: f64 = 0.05;
/// Minimum rows for the whole-set geometric detectors.
pub const MIN_GLOBAL_ROWS: usize = 10;
/// Minimum rows for the per-category statistical detector.
pub const MIN_CATEGORY_ROWS: usize = 3;
const CONSENSUS_VOTES: usize = 2;
const ISOLATION_TREES: usize = 100;
const ISOLATION_SAMPLE: usize = 256;
const RNG_SEED: u64 = 42;

/// A transaction flagged by detector consensus.
#[derive(Debug, Clone)]
pub struct OutlierReport {
    /// Index into the analyzed expense-row slice.
    pub row_index: usize,
    pub amount: f64,
    pub category: String,
    /// Percent deviation from the category median.
    pub deviation_pct: f64,
}

fn median_of(values: &[f64]) -> f64 {
    let mut data = Data::new(values.to_vec());
    data.median()
}

/// Column-wise z-score standardization of the detector vectors.
fn standardized(rows: &[FeatureRow]) -> Vec<[f64; 3]> {
    let vectors: Vec<[f64; 3]> = rows.iter().map(|r| r.detector_vector()).collect();
    let mut result = vectors.clone();

    for col in 0..3 {
        let column: Vec<f64> = vectors.iter().map(|v| v[col]).collect();
        let data = Data::new(column);
        let mean = data.mean().unwrap_or(0.0);
        let std = data.std_dev().unwrap_or(0.0);
        for (out, v) in result.iter_mut().zip(vectors.iter()) {
            out[col] = if std > 1e-12 { (v[col] - mean) / std } else { 0.0 };
        }
    }

    result
}

/// Flag the top `contamination` fraction of scores.
fn flag_top(scores: &[f64]) -> Vec<bool> {
    let n = scores.len();
    let k = ((n as f64) * CONTAMINATION).ceil() as usize;

    let mut ranked: Vec<usize> = (0..n).collect();
    ranked.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut flags = vec![false; n];
    for &i in ranked.iter().take(k) {
        flags[i] = true;
    }
    flags
}

// --- density-isolation detector -------------------------------------------

enum IsoNode {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        value: f64,
        left: Box<IsoNode>,
        right: Box<IsoNode>,
    },
}

/// Average unsuccessful-search path length in a BST of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    2.0 * ((n - 1.0).ln() + 0.577_215_664_9) - 2.0 * (n - 1.0) / n
}

fn build_iso_tree(
    points: &[[f64; 3]],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> IsoNode {
    if indices.len() <= 1 || depth >= max_depth {
        return IsoNode::Leaf {
            size: indices.len(),
        };
    }

    let feature = rng.random_range(0..3);
    let lo = indices
        .iter()
        .map(|&i| points[i][feature])
        .fold(f64::INFINITY, f64::min);
    let hi = indices
        .iter()
        .map(|&i| points[i][feature])
        .fold(f64::NEG_INFINITY, f64::max);

    if hi - lo < 1e-12 {
        return IsoNode::Leaf {
            size: indices.len(),
        };
    }

    let value = rng.random_range(lo..hi);
    let (left, right): (Vec<usize>, Vec<usize>) =
        indices.iter().partition(|&&i| points[i][feature] < value);

    IsoNode::Split {
        feature,
        value,
        left: Box::new(build_iso_tree(points, &left, depth + 1, max_depth, rng)),
        right: Box::new(build_iso_tree(points, &right, depth + 1, max_depth, rng)),
    }
}

fn iso_path_length(node: &IsoNode, point: &[f64; 3], depth: usize) -> f64 {
    match node {
        IsoNode::Leaf { size } => depth as f64 + average_path_length(*size),
        IsoNode::Split {
            feature,
            value,
            left,
            right,
        } => {
            if point[*feature] < *value {
                iso_path_length(left, point, depth + 1)
            } else {
                iso_path_length(right, point, depth + 1)
            }
        }
    }
}

/// Ensemble-of-random-partitioning outlier flags over the whole expense set.
/// Requires at least [`MIN_GLOBAL_ROWS`] rows; returns all-false otherwise.
pub fn isolation_flags(rows: &[FeatureRow]) -> Vec<bool> {
    let n = rows.len();
    if n < MIN_GLOBAL_ROWS {
        return vec![false; n];
    }

    let points = standardized(rows);
    let sample_size = ISOLATION_SAMPLE.min(n);
    let max_depth = (sample_size as f64).log2().ceil() as usize;
    let mut rng = StdRng::seed_from_u64(RNG_SEED);

    let mut trees = Vec::with_capacity(ISOLATION_TREES);
    for _ in 0..ISOLATION_TREES {
        let sample: Vec<usize> = (0..sample_size).map(|_| rng.random_range(0..n)).collect();
        trees.push(build_iso_tree(&points, &sample, 0, max_depth, &mut rng));
    }

    let norm = average_path_length(sample_size);
    let scores: Vec<f64> = points
        .iter()
        .map(|p| {
            let avg: f64 = trees
                .iter()
                .map(|t| iso_path_length(t, p, 0))
                .sum::<f64>()
                / ISOLATION_TREES as f64;
            2f64.powf(-avg / norm)
        })
        .collect();

    flag_top(&scores)
}

// --- local-density detector -----------------------------------------------

/// k-nearest-neighbor local density ratio flags (LOF-style), k = min(20, n-1).
/// Requires at least [`MIN_GLOBAL_ROWS`] rows; returns all-false otherwise.
pub fn local_density_flags(rows: &[FeatureRow]) -> Vec<bool> {
    let n = rows.len();
    if n < MIN_GLOBAL_ROWS {
        return vec![false; n];
    }

    let points = standardized(rows);
    let k = 20.min(n - 1);

    let dist = |a: &[f64; 3], b: &[f64; 3]| -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    };

    // k nearest neighbors and k-distance per point.
    let mut neighbors: Vec<Vec<usize>> = Vec::with_capacity(n);
    let mut k_distance = vec![0.0; n];
    for i in 0..n {
        let mut order: Vec<usize> = (0..n).filter(|&j| j != i).collect();
        order.sort_by(|&a, &b| {
            dist(&points[i], &points[a])
                .partial_cmp(&dist(&points[i], &points[b]))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(k);
        k_distance[i] = dist(&points[i], &points[order[k - 1]]);
        neighbors.push(order);
    }

    // Local reachability density.
    let lrd: Vec<f64> = (0..n)
        .map(|i| {
            let reach_sum: f64 = neighbors[i]
                .iter()
                .map(|&j| dist(&points[i], &points[j]).max(k_distance[j]))
                .sum();
            k as f64 / (reach_sum + 1e-12)
        })
        .collect();

    let scores: Vec<f64> = (0..n)
        .map(|i| {
            let neighbor_lrd: f64 = neighbors[i].iter().map(|&j| lrd[j]).sum();
            neighbor_lrd / (k as f64 * lrd[i] + 1e-12)
        })
        .collect();

    flag_top(&scores)
}

// --- robust statistical detector ------------------------------------------

/// MAD-threshold flags over one category's amounts, plus the threshold used.
/// Falls back to mean + factor * stddev when MAD is zero.
pub fn mad_flags(amounts: &[f64], outlier_factor: f64) -> (Vec<bool>, f64) {
    let median = median_of(amounts);
    let deviations: Vec<f64> = amounts.iter().map(|a| (a - median).abs()).collect();
    let mad = median_of(&deviations);

    let threshold = if mad < 1e-12 {
        let data = Data::new(amounts.to_vec());
        let mean = data.mean().unwrap_or(0.0);
        let std = data.std_dev().unwrap_or(0.0);
        mean + outlier_factor * std
    } else {
        // 0.6745 scales MAD to stddev-equivalent units.
        median + outlier_factor * mad / 0.6745
    };

    let flags = amounts.iter().map(|&a| a > threshold).collect();
    (flags, threshold)
}

// --- consensus -------------------------------------------------------------

/// 2-of-3 consensus over the three detectors, grouped per category.
/// Categories with fewer than [`MIN_CATEGORY_ROWS`] expense rows are
/// degenerate and skipped.
pub fn consensus_outliers(rows: &[FeatureRow]) -> Vec<OutlierReport> {
    let isolation = isolation_flags(rows);
    let local = local_density_flags(rows);

    let mut by_category: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        by_category.entry(row.category.as_str()).or_default().push(i);
    }

    let mut reports = Vec::new();
    for (category, indices) in by_category {
        if indices.len() < MIN_CATEGORY_ROWS {
            debug!(
                category,
                rows = indices.len(),
                "too few rows for outlier consensus"
            );
            continue;
        }

        let amounts: Vec<f64> = indices.iter().map(|&i| rows[i].amount).collect();
        let factor = profile_for(category).outlier_factor;
        let (stat_flags, _) = mad_flags(&amounts, factor);
        let category_median = median_of(&amounts);

        for (pos, &i) in indices.iter().enumerate() {
            let votes = usize::from(isolation[i])
                + usize::from(local[i])
                + usize::from(stat_flags[pos]);
            if votes >= CONSENSUS_VOTES && category_median > 1e-9 {
                reports.push(OutlierReport {
                    row_index: i,
                    amount: rows[i].amount,
                    category: category.to_string(),
                    deviation_pct: (rows[i].amount - category_median) / category_median * 100.0,
                });
            }
        }
    }

    reports
}
