//! Multinomial naive-Bayes bag-of-words model.
//!
//! One of the three base classifiers in the stacked ensemble. Kept
//! hand-rolled (log-space, Laplace smoothing) because stacking consumes the
//! full class posterior, not just the argmax label.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagOfWordsModel {
    log_priors: Vec<f64>,
    /// `log_likelihoods[class][feature]` = log P(feature | class).
    log_likelihoods: Vec<Vec<f64>>,
}

impl BagOfWordsModel {
    /// Fit from term-count rows and class labels in `0..n_classes`.
    pub fn fit(x: &[Vec<u64>], y: &[usize], n_classes: usize, n_features: usize, alpha: f64) -> Self {
        let mut class_doc_counts = vec![0usize; n_classes];
        let mut term_counts = vec![vec![0u64; n_features]; n_classes];

        for (row, &label) in x.iter().zip(y.iter()) {
            class_doc_counts[label] += 1;
            for (i, &c) in row.iter().enumerate() {
                term_counts[label][i] += c;
            }
        }

        let n_docs = y.len().max(1) as f64;
        let log_priors = class_doc_counts
            .iter()
            .map(|&c| ((c as f64 + 1.0) / (n_docs + n_classes as f64)).ln())
            .collect();

        let log_likelihoods = term_counts
            .iter()
            .map(|counts| {
                let total: u64 = counts.iter().sum();
                let denom = total as f64 + alpha * n_features as f64;
                counts
                    .iter()
                    .map(|&c| ((c as f64 + alpha) / denom).ln())
                    .collect()
            })
            .collect();

        Self {
            log_priors,
            log_likelihoods,
        }
    }

    /// Class posterior for one term-count row, normalized to sum to 1.
    pub fn posterior(&self, counts: &[u64]) -> Vec<f64> {
        let scores: Vec<f64> = self
            .log_priors
            .iter()
            .zip(self.log_likelihoods.iter())
            .map(|(prior, likelihood)| {
                prior
                    + counts
                        .iter()
                        .zip(likelihood.iter())
                        .filter(|&(&c, _)| c > 0)
                        .map(|(&c, &ll)| c as f64 * ll)
                        .sum::<f64>()
            })
            .collect();

        // Log-sum-exp for numerical stability before exponentiating.
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / sum).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posterior_favours_seen_class() {
        // Class 0 uses feature 0, class 1 uses feature 1.
        let x = vec![
            vec![3, 0],
            vec![2, 0],
            vec![0, 3],
            vec![0, 2],
        ];
        let y = vec![0, 0, 1, 1];
        let model = BagOfWordsModel::fit(&x, &y, 2, 2, 0.1);

        let p = model.posterior(&[4, 0]);
        assert!(p[0] > 0.9, "expected class 0 dominance, got {p:?}");

        let p = model.posterior(&[0, 4]);
        assert!(p[1] > 0.9);
    }

    #[test]
    fn test_posterior_sums_to_one() {
        let x = vec![vec![1, 1], vec![2, 0], vec![0, 2]];
        let y = vec![0, 0, 1];
        let model = BagOfWordsModel::fit(&x, &y, 2, 2, 0.1);

        let p = model.posterior(&[1, 0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_document_falls_back_to_priors() {
        let x = vec![vec![1, 0], vec![1, 0], vec![1, 0], vec![0, 1]];
        let y = vec![0, 0, 0, 1];
        let model = BagOfWordsModel::fit(&x, &y, 2, 2, 0.1);

        // No known terms: posterior reduces to the (smoothed) priors.
        let p = model.posterior(&[0, 0]);
        assert!(p[0] > p[1]);
    }
}
