//! Term-frequency feature extraction over unigrams and bigrams.
//!
//! The vocabulary is fixed at fit time: terms are ranked by document
//! frequency, capped at [`MAX_FEATURES`], and terms present in more than
//! [`MAX_DF`] of documents are excluded as uninformative. Feature order is
//! part of the fitted state, so vectors produced before and after
//! serialization are identical.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const MAX_FEATURES: usize = 1000;
const MAX_DF: f64 = 0.90;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vectorizer {
    /// Term -> feature index. Indices are dense in `0..feature_count`.
    index: HashMap<String, usize>,
    feature_count: usize,
}

/// Unigrams plus adjacent-pair bigrams of a normalized document.
fn tokenize(doc: &str) -> Vec<String> {
    let words: Vec<&str> = doc.split_whitespace().collect();
    let mut tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

impl Vectorizer {
    /// Build the vocabulary from normalized documents.
    pub fn fit(docs: &[String]) -> Self {
        let n_docs = docs.len().max(1);
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in docs {
            let unique: HashSet<String> = tokenize(doc).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_df_count = (MAX_DF * n_docs as f64).floor() as usize;
        let mut ranked: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df <= max_df_count.max(1))
            .collect();

        // Highest document frequency first; ties broken lexicographically so
        // the vocabulary is deterministic across rebuilds.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(MAX_FEATURES);

        let index: HashMap<String, usize> = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (term, _))| (term, i))
            .collect();

        let feature_count = index.len();
        Self {
            index,
            feature_count,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Raw term counts, for the bag-of-words model.
    pub fn transform_counts(&self, doc: &str) -> Vec<u64> {
        let mut counts = vec![0u64; self.feature_count];
        for token in tokenize(doc) {
            if let Some(&i) = self.index.get(&token) {
                counts[i] += 1;
            }
        }
        counts
    }

    /// Sublinear term-frequency weights (`1 + ln tf`), for the geometric
    /// base models and the meta-learner.
    pub fn transform_tf(&self, doc: &str) -> Vec<f64> {
        self.transform_counts(doc)
            .into_iter()
            .map(|c| if c == 0 { 0.0 } else { 1.0 + (c as f64).ln() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_unigrams_and_bigrams() {
        let v = Vectorizer::fit(&docs(&["uber corrida", "uber eats"]));
        // uber, corrida, eats, "uber corrida", "uber eats"
        assert_eq!(v.feature_count(), 5);
    }

    #[test]
    fn test_vocabulary_cap() {
        let many: Vec<String> = (0..2000).map(|i| format!("term{i}")).collect();
        let v = Vectorizer::fit(&many);
        assert_eq!(v.feature_count(), MAX_FEATURES);
    }

    #[test]
    fn test_high_df_terms_excluded() {
        // "posto" appears in every document and is dropped by the max-df rule.
        let corpus: Vec<String> = (0..20)
            .map(|i| format!("posto combustivel{i}"))
            .collect();
        let v = Vectorizer::fit(&corpus);
        let counts = v.transform_counts("posto");
        assert!(counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_sublinear_scaling() {
        let v = Vectorizer::fit(&docs(&["luz luz luz", "agua"]));
        let tf = v.transform_tf("luz luz luz");
        let max = tf.iter().cloned().fold(0.0f64, f64::max);
        assert!((max - (1.0 + 3.0f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_terms_ignored() {
        let v = Vectorizer::fit(&docs(&["mercado"]));
        let counts = v.transform_counts("palavra desconhecida");
        assert!(counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_deterministic_across_fits() {
        let corpus = docs(&["uber corrida", "netflix assinatura", "mercado compras"]);
        let a = Vectorizer::fit(&corpus);
        let b = Vectorizer::fit(&corpus);
        assert_eq!(
            a.transform_counts("uber corrida mercado"),
            b.transform_counts("uber corrida mercado")
        );
    }
}
