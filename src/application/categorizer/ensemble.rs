//! Stacked classification ensemble.
//!
//! Three heterogeneous base models (random forest, k-NN, multinomial
//! naive-Bayes) feed a softmax meta-learner trained on their out-of-fold
//! probability outputs, and the combined distribution is calibrated with
//! temperature scaling on a held-out partition. Training is always from
//! scratch over the full corpus; the result is an immutable, serializable
//! [`TrainedModel`] value that is swapped in wholesale.

use crate::application::categorizer::bow::BagOfWordsModel;
use crate::application::categorizer::normalizer::normalize;
use crate::application::categorizer::vectorizer::Vectorizer;
use crate::domain::errors::TrainingError;
use crate::domain::types::ModelMetrics;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_classifier::{KNNClassifier, KNNClassifierParameters};
use tracing::{debug, info};

type Forest = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;
type Knn = KNNClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>, Euclidian<f64>>;

const RNG_SEED: u64 = 42;
const NB_ALPHA: f64 = 0.1;
const TEMPERATURE_GRID: &[f64] = &[0.5, 0.65, 0.8, 1.0, 1.25, 1.5, 2.0, 2.5, 3.0];

/// Multinomial logistic meta-learner over stacked base-model outputs.
///
/// Hand-rolled batch gradient descent; the input dimension is small
/// (3 x class count), so a few hundred epochs converge quickly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    /// `weights[class]` has one weight per feature plus a trailing bias.
    weights: Vec<Vec<f64>>,
}

impl SoftmaxRegression {
    fn fit(x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Self {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let mut weights = vec![vec![0.0; n_features + 1]; n_classes];
        let n = x.len().max(1) as f64;
        let lr = 0.5;
        let l2 = 1e-3;

        for _ in 0..300 {
            let mut grad = vec![vec![0.0; n_features + 1]; n_classes];

            for (row, &label) in x.iter().zip(y.iter()) {
                let probs = Self::softmax(&weights, row);
                for (c, p) in probs.iter().enumerate() {
                    let err = p - if c == label { 1.0 } else { 0.0 };
                    for (j, &v) in row.iter().enumerate() {
                        grad[c][j] += err * v;
                    }
                    grad[c][n_features] += err;
                }
            }

            for (wc, gc) in weights.iter_mut().zip(grad.iter()) {
                for (w, g) in wc.iter_mut().zip(gc.iter()) {
                    *w -= lr * (g / n + l2 * *w);
                }
            }
        }

        Self { weights }
    }

    fn softmax(weights: &[Vec<f64>], row: &[f64]) -> Vec<f64> {
        let scores: Vec<f64> = weights
            .iter()
            .map(|wc| {
                let bias = wc[wc.len() - 1];
                wc[..wc.len() - 1]
                    .iter()
                    .zip(row.iter())
                    .map(|(w, v)| w * v)
                    .sum::<f64>()
                    + bias
            })
            .collect();

        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / sum).collect()
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        Self::softmax(&self.weights, row)
    }
}

/// The fitted base models plus meta-learner and calibration temperature.
#[derive(Serialize, Deserialize)]
pub struct StackedEnsemble {
    forest: Forest,
    knn: Knn,
    bow: BagOfWordsModel,
    meta: SoftmaxRegression,
    temperature: f64,
    n_classes: usize,
}

impl StackedEnsemble {
    /// Stacked feature row: forest one-hot ++ k-NN one-hot ++ NB posterior.
    fn base_features(&self, tf: &[f64], counts: &[u64]) -> Option<Vec<f64>> {
        let matrix = DenseMatrix::from_2d_vec(&vec![tf.to_vec()]).ok()?;
        let forest_pred = *self.forest.predict(&matrix).ok()?.first()?;
        let knn_pred = *self.knn.predict(&matrix).ok()?.first()?;

        let mut row = one_hot(forest_pred as usize, self.n_classes);
        row.extend(one_hot(knn_pred as usize, self.n_classes));
        row.extend(self.bow.posterior(counts));
        Some(row)
    }

    /// Calibrated class distribution. `None` on internal model failure.
    pub fn predict_proba(&self, tf: &[f64], counts: &[u64]) -> Option<Vec<f64>> {
        let stacked = self.base_features(tf, counts)?;
        let raw = self.meta.predict_proba(&stacked);
        Some(apply_temperature(&raw, self.temperature))
    }
}

/// Immutable trained artifact: vocabulary, label encoding, models, metrics.
#[derive(Serialize, Deserialize)]
pub struct TrainedModel {
    pub version: u64,
    pub trained_at: DateTime<Utc>,
    pub vectorizer: Vectorizer,
    pub labels: Vec<String>,
    ensemble: StackedEnsemble,
    pub metrics: ModelMetrics,
}

impl TrainedModel {
    /// Class distribution for an already-normalized description.
    pub fn probabilities(&self, normalized: &str) -> Option<Vec<f64>> {
        let tf = self.vectorizer.transform_tf(normalized);
        let counts = self.vectorizer.transform_counts(normalized);
        self.ensemble.predict_proba(&tf, &counts)
    }
}

fn one_hot(class: usize, n_classes: usize) -> Vec<f64> {
    let mut v = vec![0.0; n_classes];
    if class < n_classes {
        v[class] = 1.0;
    }
    v
}

/// Monotonic recalibration: softmax of `ln p / t`. `t > 1` flattens an
/// overconfident distribution, `t < 1` sharpens an underconfident one.
fn apply_temperature(probs: &[f64], t: f64) -> Vec<f64> {
    let scores: Vec<f64> = probs.iter().map(|&p| (p + 1e-12).ln() / t).collect();
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

struct FittedBases {
    forest: Forest,
    knn: Knn,
    bow: BagOfWordsModel,
}

fn fit_bases(
    x_tf: &[Vec<f64>],
    x_counts: &[Vec<u64>],
    y: &[usize],
    n_classes: usize,
    n_features: usize,
) -> Result<FittedBases, TrainingError> {
    let matrix = DenseMatrix::from_2d_vec(&x_tf.to_vec()).map_err(|e| {
        TrainingError::FitFailed {
            model: "matrix",
            reason: e.to_string(),
        }
    })?;
    let y_u32: Vec<u32> = y.iter().map(|&v| v as u32).collect();

    let forest_params = RandomForestClassifierParameters::default()
        .with_n_trees(40)
        .with_max_depth(12)
        .with_min_samples_split(2)
        .with_seed(RNG_SEED);
    let forest =
        Forest::fit(&matrix, &y_u32, forest_params).map_err(|e| TrainingError::FitFailed {
            model: "random_forest",
            reason: e.to_string(),
        })?;

    let k = 5.min(y.len().saturating_sub(1)).max(1);
    let knn = Knn::fit(
        &matrix,
        &y_u32,
        KNNClassifierParameters::default().with_k(k),
    )
    .map_err(|e| TrainingError::FitFailed {
        model: "knn",
        reason: e.to_string(),
    })?;

    let bow = BagOfWordsModel::fit(x_counts, y, n_classes, n_features, NB_ALPHA);

    Ok(FittedBases { forest, knn, bow })
}

/// Batch stacked features for a set of sample indices.
fn stacked_features(
    bases: &FittedBases,
    x_tf: &[Vec<f64>],
    x_counts: &[Vec<u64>],
    indices: &[usize],
    n_classes: usize,
) -> Result<Vec<Vec<f64>>, TrainingError> {
    let rows: Vec<Vec<f64>> = indices.iter().map(|&i| x_tf[i].clone()).collect();
    let matrix = DenseMatrix::from_2d_vec(&rows).map_err(|e| TrainingError::FitFailed {
        model: "matrix",
        reason: e.to_string(),
    })?;

    let forest_preds = bases
        .forest
        .predict(&matrix)
        .map_err(|e| TrainingError::FitFailed {
            model: "random_forest",
            reason: e.to_string(),
        })?;
    let knn_preds = bases
        .knn
        .predict(&matrix)
        .map_err(|e| TrainingError::FitFailed {
            model: "knn",
            reason: e.to_string(),
        })?;

    Ok(indices
        .iter()
        .enumerate()
        .map(|(pos, &i)| {
            let mut row = one_hot(forest_preds[pos] as usize, n_classes);
            row.extend(one_hot(knn_preds[pos] as usize, n_classes));
            row.extend(bases.bow.posterior(&x_counts[i]));
            row
        })
        .collect())
}

/// Train the full stacked ensemble from raw (description, category) pairs.
///
/// Pairs are normalized here; empty descriptions are dropped. Fails without
/// touching any existing model when fewer than 2 distinct labels remain.
pub fn train_model(pairs: &[(String, String)], version: u64) -> Result<TrainedModel, TrainingError> {
    let mut docs: Vec<String> = Vec::with_capacity(pairs.len());
    let mut raw_labels: Vec<&str> = Vec::with_capacity(pairs.len());
    for (description, category) in pairs {
        let normalized = normalize(description);
        if normalized.is_empty() {
            continue;
        }
        docs.push(normalized);
        raw_labels.push(category);
    }

    if docs.is_empty() {
        return Err(TrainingError::EmptyCorpus);
    }

    let mut labels: Vec<String> = raw_labels.iter().map(|l| l.to_string()).collect();
    labels.sort();
    labels.dedup();
    if labels.len() < 2 {
        return Err(TrainingError::TooFewLabels {
            labels: labels.len(),
        });
    }

    let n_classes = labels.len();
    let y: Vec<usize> = raw_labels
        .iter()
        .map(|l| labels.iter().position(|c| c == l).unwrap_or(0))
        .collect();

    let vectorizer = Vectorizer::fit(&docs);
    let n_features = vectorizer.feature_count();
    let x_tf: Vec<Vec<f64>> = docs.iter().map(|d| vectorizer.transform_tf(d)).collect();
    let x_counts: Vec<Vec<u64>> = docs.iter().map(|d| vectorizer.transform_counts(d)).collect();

    info!(
        samples = docs.len(),
        classes = n_classes,
        features = n_features,
        "training categorization ensemble"
    );

    // Held-out partition for calibration and the reported accuracy metric.
    let mut shuffled: Vec<usize> = (0..docs.len()).collect();
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    shuffled.shuffle(&mut rng);

    let holdout_size = docs.len() / 5;
    let (holdout_idx, mut train_idx): (Vec<usize>, Vec<usize>) = (
        shuffled[..holdout_size].to_vec(),
        shuffled[holdout_size..].to_vec(),
    );

    // The training partition must still cover every class; tiny corpora
    // collapse to calibrating on the training data itself.
    let covered: std::collections::HashSet<usize> = train_idx.iter().map(|&i| y[i]).collect();
    let holdout_idx = if holdout_idx.is_empty() || covered.len() < n_classes {
        train_idx = shuffled.clone();
        train_idx.clone()
    } else {
        holdout_idx
    };

    // Out-of-fold stacked features for the meta-learner, k = min(5, classes).
    let k_folds = 5.min(n_classes).max(2);
    let folds: Vec<Vec<usize>> = (0..k_folds)
        .map(|f| {
            train_idx
                .iter()
                .enumerate()
                .filter(|(pos, _)| pos % k_folds == f)
                .map(|(_, &i)| i)
                .collect()
        })
        .collect();

    let fold_outputs: Result<Vec<(Vec<Vec<f64>>, Vec<usize>)>, TrainingError> = folds
        .par_iter()
        .map(|fold| {
            let fit_idx: Vec<usize> = train_idx
                .iter()
                .filter(|&&i| !fold.contains(&i))
                .copied()
                .collect();

            let fit_tf: Vec<Vec<f64>> = fit_idx.iter().map(|&i| x_tf[i].clone()).collect();
            let fit_counts: Vec<Vec<u64>> = fit_idx.iter().map(|&i| x_counts[i].clone()).collect();
            let fit_y: Vec<usize> = fit_idx.iter().map(|&i| y[i]).collect();

            let bases = fit_bases(&fit_tf, &fit_counts, &fit_y, n_classes, n_features)?;
            let rows = stacked_features(&bases, &x_tf, &x_counts, fold, n_classes)?;
            let fold_y: Vec<usize> = fold.iter().map(|&i| y[i]).collect();
            Ok((rows, fold_y))
        })
        .collect();

    let mut meta_x = Vec::with_capacity(train_idx.len());
    let mut meta_y = Vec::with_capacity(train_idx.len());
    for (rows, fold_y) in fold_outputs? {
        meta_x.extend(rows);
        meta_y.extend(fold_y);
    }

    // Final bases see the whole training partition.
    let train_tf: Vec<Vec<f64>> = train_idx.iter().map(|&i| x_tf[i].clone()).collect();
    let train_counts: Vec<Vec<u64>> = train_idx.iter().map(|&i| x_counts[i].clone()).collect();
    let train_y: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();
    let bases = fit_bases(&train_tf, &train_counts, &train_y, n_classes, n_features)?;

    let meta = SoftmaxRegression::fit(&meta_x, &meta_y, n_classes);

    // Calibrate on the held-out partition.
    let holdout_rows = stacked_features(&bases, &x_tf, &x_counts, &holdout_idx, n_classes)?;
    let holdout_probs: Vec<Vec<f64>> = holdout_rows.iter().map(|r| meta.predict_proba(r)).collect();
    let holdout_y: Vec<usize> = holdout_idx.iter().map(|&i| y[i]).collect();
    let temperature = fit_temperature(&holdout_probs, &holdout_y);

    let correct = holdout_probs
        .iter()
        .zip(holdout_y.iter())
        .filter(|&(probs, &label)| {
            let calibrated = apply_temperature(probs, temperature);
            argmax(&calibrated) == label
        })
        .count();
    let accuracy = correct as f64 / holdout_y.len().max(1) as f64;

    debug!(temperature, accuracy, "calibration complete");

    Ok(TrainedModel {
        version,
        trained_at: Utc::now(),
        vectorizer,
        labels,
        ensemble: StackedEnsemble {
            forest: bases.forest,
            knn: bases.knn,
            bow: bases.bow,
            meta,
            temperature,
            n_classes,
        },
        metrics: ModelMetrics {
            accuracy,
            sample_count: docs.len(),
            feature_count: n_features,
            class_count: n_classes,
        },
    })
}

fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Pick the temperature minimising negative log-likelihood on held-out data.
fn fit_temperature(probs: &[Vec<f64>], y: &[usize]) -> f64 {
    let nll = |t: f64| -> f64 {
        probs
            .iter()
            .zip(y.iter())
            .map(|(p, &label)| {
                let calibrated = apply_temperature(p, t);
                -(calibrated[label] + 1e-12).ln()
            })
            .sum()
    };

    TEMPERATURE_GRID
        .iter()
        .copied()
        .min_by(|&a, &b| {
            nll(a)
                .partial_cmp(&nll(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(1.0)
}
