// src/analyze/mod.rs
//! Classification pipeline entry: record → features → (confidence ∥ reasons).

pub mod debug;
pub mod features;
pub mod reasons;
pub mod scoring;
pub mod weights;

use std::sync::Arc;

use crate::classification::ClassificationResult;
use crate::message::MessageRecord;

// Re-export convenient types.
pub use crate::analyze::features::{FeatureExtractor, FeatureVector};
pub use crate::analyze::scoring::{detection_confidence, training_confidence};
pub use crate::analyze::weights::{HotReloadWeights, Weights};

/// Detection-mode classifier. Synchronous and pure apart from reading the
/// hot-reloaded config handles it was built with.
#[derive(Clone)]
pub struct Classifier {
    extractor: FeatureExtractor,
    weights: Arc<HotReloadWeights>,
}

impl Classifier {
    pub fn new(weights: Arc<HotReloadWeights>) -> Self {
        Self {
            extractor: FeatureExtractor::detection(),
            weights,
        }
    }

    /// Classifier over `config/weights.json`; built-in defaults when it's absent.
    pub fn with_default_paths() -> Self {
        Self::new(Arc::new(weights::hot_weights(None)))
    }

    /// Built-in weights; never reads config files.
    pub fn builtin() -> Self {
        Self::new(Arc::new(HotReloadWeights::fixed(Weights::default())))
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn weights(&self) -> Weights {
        self.weights.current()
    }

    /// Order:
    /// 1) feature extraction
    /// 2) detection confidence from the current weights
    /// 3) reasons, derived independently of (2)
    pub fn classify(&self, record: &MessageRecord) -> ClassificationResult {
        let features = self.extractor.extract(record);
        self.classify_features(record, &features)
    }

    /// Same as `classify` for callers that already hold the feature vector.
    pub fn classify_features(
        &self,
        record: &MessageRecord,
        features: &FeatureVector,
    ) -> ClassificationResult {
        let w = self.weights.current();

        let confidence = detection_confidence(features, &w.detection);
        let reasons = reasons::explain(record, features);

        ClassificationResult::new(confidence)
            .with_reasons(reasons)
            .with_suspicious_links(features::suspicious_links(&record.links))
    }
}
