//! Transaction description categorization.
//!
//! Pipeline: normalize -> vectorize -> stacked ensemble -> adaptive
//! threshold. The trained model is an immutable versioned value behind an
//! `RwLock`; readers clone the `Arc`, retraining builds a fresh value and
//! swaps it in. Retraining is serialized by a dedicated mutex so concurrent
//! `learn` calls cannot interleave rebuilds.

pub mod bow;
pub mod ensemble;
pub mod normalizer;
pub mod seed;
pub mod threshold;
pub mod vectorizer;

use crate::application::categorizer::ensemble::{TrainedModel, train_model};
use crate::application::categorizer::normalizer::normalize;
use crate::application::categorizer::threshold::dynamic_threshold;
use crate::domain::ports::{FeedbackRecord, FeedbackStore, ModelStore};
use crate::domain::types::{ModelMetrics, PredictionResult};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, error, info, warn};

const MAX_ALTERNATIVES: usize = 3;

pub struct Categorizer {
    feedback: Arc<dyn FeedbackStore>,
    store: Arc<dyn ModelStore>,
    model: RwLock<Option<Arc<TrainedModel>>>,
    /// Single-writer discipline for retraining.
    train_lock: Mutex<()>,
}

impl Categorizer {
    pub fn new(feedback: Arc<dyn FeedbackStore>, store: Arc<dyn ModelStore>) -> Self {
        Self {
            feedback,
            store,
            model: RwLock::new(None),
            train_lock: Mutex::new(()),
        }
    }

    /// Load the persisted artifact, or train from seed + feedback when no
    /// usable artifact exists.
    pub fn bootstrap(&self) {
        match self.store.load() {
            Ok(Some(bytes)) => match serde_json::from_slice::<TrainedModel>(&bytes) {
                Ok(model) => {
                    info!(
                        version = model.version,
                        samples = model.metrics.sample_count,
                        "loaded categorization model from store"
                    );
                    self.swap(model);
                    return;
                }
                Err(e) => warn!("stored model artifact unreadable, retraining: {e}"),
            },
            Ok(None) => info!("no categorization model artifact found, training from scratch"),
            Err(e) => warn!("model store unavailable, training from scratch: {e}"),
        }

        if !self.rebuild() {
            warn!("initial model training failed; categorize will return null");
        }
    }

    /// Classify a description. Returns `None` when the trimmed input is
    /// shorter than 2 characters or no model is loaded. The `amount` is
    /// accepted for interface compatibility; the current models are purely
    /// textual.
    pub fn predict(&self, description: &str, _amount: Option<Decimal>) -> Option<PredictionResult> {
        if description.trim().chars().count() < 2 {
            return None;
        }

        let model = self.snapshot()?;
        let normalized = normalize(description);
        let probs = model.probabilities(&normalized)?;

        let mut ranked: Vec<(usize, f64)> = probs.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (top_class, confidence) = ranked[0];
        let alternatives: Vec<(String, f64)> = ranked
            .iter()
            .take(MAX_ALTERNATIVES)
            .map(|&(i, p)| (model.labels[i].clone(), p))
            .collect();

        let threshold = dynamic_threshold(&normalized, &probs);
        let accepted = confidence > threshold;

        if !accepted {
            debug!(
                candidate = %model.labels[top_class],
                confidence,
                threshold,
                "prediction below acceptance threshold"
            );
        }

        Some(PredictionResult {
            category: accepted.then(|| model.labels[top_class].clone()),
            confidence,
            threshold,
            alternatives,
            accepted,
        })
    }

    /// Record user feedback and rebuild the model from the full corpus.
    /// Returns `false` when the store rejects the record or the rebuild
    /// fails; the previously loaded model stays in place either way.
    pub fn learn(&self, description: &str, category: &str) -> bool {
        if description.trim().is_empty() || category.trim().is_empty() {
            return false;
        }

        let record = FeedbackRecord {
            description: description.trim().to_lowercase(),
            category: category.trim().to_string(),
        };

        if let Err(e) = self.feedback.append(&record) {
            error!("failed to append feedback record: {e}");
            return false;
        }

        self.rebuild()
    }

    pub fn model_metrics(&self) -> Option<ModelMetrics> {
        self.snapshot().map(|m| m.metrics)
    }

    /// Force a full rebuild regardless of any loaded artifact.
    pub fn retrain(&self) -> bool {
        self.rebuild()
    }

    fn snapshot(&self) -> Option<Arc<TrainedModel>> {
        self.model.read().ok()?.clone()
    }

    fn swap(&self, model: TrainedModel) {
        if let Ok(mut slot) = self.model.write() {
            *slot = Some(Arc::new(model));
        }
    }

    /// Full from-scratch rebuild over seed + feedback. Serialized by
    /// `train_lock`; readers keep the previous snapshot until the swap.
    fn rebuild(&self) -> bool {
        let _guard = match self.train_lock.lock() {
            Ok(g) => g,
            Err(_) => return false,
        };

        let mut corpus = seed::seed_corpus();
        match self.feedback.load_all() {
            Ok(records) => {
                corpus.extend(records.into_iter().map(|r| (r.description, r.category)));
            }
            Err(e) => warn!("feedback store unreadable, training on seed data only: {e}"),
        }

        let next_version = self.snapshot().map(|m| m.version + 1).unwrap_or(1);
        let model = match train_model(&corpus, next_version) {
            Ok(m) => m,
            Err(e) => {
                error!("model rebuild failed, keeping previous model: {e}");
                return false;
            }
        };

        info!(
            version = model.version,
            accuracy = model.metrics.accuracy,
            samples = model.metrics.sample_count,
            features = model.metrics.feature_count,
            "categorization model rebuilt"
        );

        match serde_json::to_vec(&model) {
            Ok(bytes) => {
                if let Err(e) = self.store.save(&bytes) {
                    warn!("model trained but could not be persisted: {e}");
                }
            }
            Err(e) => warn!("model trained but could not be serialized: {e}"),
        }

        self.swap(model);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::StoreError;

    #[derive(Default)]
    struct MemFeedback(Mutex<Vec<FeedbackRecord>>);

    impl FeedbackStore for MemFeedback {
        fn append(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
            let mut rows = self.0.lock().unwrap();
            if !rows.contains(record) {
                rows.push(record.clone());
            }
            Ok(())
        }

        fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct MemModelStore(Mutex<Option<Vec<u8>>>);

    impl ModelStore for MemModelStore {
        fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save(&self, artifact: &[u8]) -> Result<(), StoreError> {
            *self.0.lock().unwrap() = Some(artifact.to_vec());
            Ok(())
        }
    }

    fn categorizer() -> Categorizer {
        Categorizer::new(
            Arc::new(MemFeedback::default()),
            Arc::new(MemModelStore::default()),
        )
    }

    #[test]
    fn test_predict_without_model_returns_none() {
        let cat = categorizer();
        assert!(cat.predict("netflix assinatura", None).is_none());
    }

    #[test]
    fn test_short_description_returns_none() {
        let cat = categorizer();
        cat.bootstrap();
        assert!(cat.predict("x", None).is_none());
        assert!(cat.predict("  ", None).is_none());
        assert!(cat.predict("", None).is_none());
    }

    #[test]
    fn test_predict_known_merchant() {
        let cat = categorizer();
        cat.bootstrap();

        let result = cat.predict("netflix assinatura", None).expect("prediction");
        assert!(result.alternatives.len() <= MAX_ALTERNATIVES);
        assert_eq!(result.accepted, result.confidence > result.threshold);
        assert!(result.accepted, "seed keyword should be accepted: {result:?}");
        assert_eq!(result.category.as_deref(), Some("Lazer"));
    }

    #[test]
    fn test_predict_is_idempotent() {
        let cat = categorizer();
        cat.bootstrap();

        let a = cat.predict("posto ipiranga", None).expect("prediction");
        let b = cat.predict("posto ipiranga", None).expect("prediction");
        assert_eq!(a.category, b.category);
        assert!((a.confidence - b.confidence).abs() < 1e-12);
        assert!((a.threshold - b.threshold).abs() < 1e-12);
    }

    #[test]
    fn test_alternatives_sorted_descending() {
        let cat = categorizer();
        cat.bootstrap();

        let result = cat.predict("pagamento boleto", None).expect("prediction");
        for pair in result.alternatives.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        let total: f64 = result.alternatives.iter().map(|(_, p)| p).sum();
        assert!(total <= 1.0 + 1e-9);
    }

    #[test]
    fn test_learn_rejects_blank_input() {
        let cat = categorizer();
        cat.bootstrap();
        assert!(!cat.learn("", "Transporte"));
        assert!(!cat.learn("uber corrida", "  "));
    }

    #[test]
    fn test_learn_and_reclassify() {
        let cat = categorizer();
        cat.bootstrap();

        assert!(cat.learn("uber corrida", "Transporte"));
        let result = cat.predict("uber corrida", None).expect("prediction");
        assert_eq!(result.category.as_deref(), Some("Transporte"));
        assert!(result.accepted);
    }

    #[test]
    fn test_model_metrics_available_after_bootstrap() {
        let cat = categorizer();
        assert!(cat.model_metrics().is_none());
        cat.bootstrap();

        let metrics = cat.model_metrics().expect("metrics");
        assert!(metrics.class_count >= 2);
        assert!(metrics.feature_count > 0);
    }
}
