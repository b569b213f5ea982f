//! classification.rs: verdict returned for one message.
//!
//! `is_phishing` is never set independently: every constructor derives it from
//! the clamped confidence, so `is_phishing == (confidence > 0.5)` always holds
//! for results built here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence strictly above this value is a phishing verdict.
pub const PHISHING_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// Scorer output in `[0.0, 1.0]`.
    pub confidence: f32,
    pub is_phishing: bool,
    /// Reason Generator output, in rule evaluation order.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Hrefs of links the feature extractor flagged, one per flagged link.
    #[serde(default)]
    pub suspicious_links: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Present only when classification itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassificationResult {
    pub fn new(confidence: f32) -> Self {
        let confidence = clamp01(confidence);
        Self {
            confidence,
            is_phishing: is_phishing(confidence),
            reasons: Vec::new(),
            suspicious_links: Vec::new(),
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Failure marker handed back instead of leaving a caller waiting.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(0.0)
        }
    }

    pub fn with_reasons(mut self, reasons: Vec<String>) -> Self {
        self.reasons = reasons;
        self
    }

    pub fn with_suspicious_links(mut self, links: Vec<String>) -> Self {
        self.suspicious_links = links;
        self
    }

    pub fn at(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

pub fn is_phishing(confidence: f32) -> bool {
    confidence > PHISHING_THRESHOLD
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_follows_confidence() {
        assert!(!ClassificationResult::new(0.5).is_phishing);
        assert!(ClassificationResult::new(0.51).is_phishing);
        let over = ClassificationResult::new(1.7);
        assert_eq!(over.confidence, 1.0);
        assert!(over.is_phishing);
        assert_eq!(ClassificationResult::new(-0.3).confidence, 0.0);
        assert_eq!(ClassificationResult::new(f32::NAN).confidence, 0.0);
    }

    #[test]
    fn failure_is_never_phishing() {
        let r = ClassificationResult::failed("boom");
        assert!(!r.is_phishing);
        assert!(r.is_failure());
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn serialize_shape_matches_extension_contract() {
        let r = ClassificationResult::new(0.7)
            .with_reasons(vec!["Contains 1 suspicious link(s)".into()])
            .with_suspicious_links(vec!["http://bit.ly/x".into()]);
        let v = serde_json::to_value(&r).unwrap();

        assert_eq!(v["isPhishing"], serde_json::json!(true));
        let conf = v["confidence"].as_f64().unwrap();
        assert!((conf - 0.7).abs() < 1e-6, "confidence ~= 0.7, got {}", conf);
        assert_eq!(v["suspiciousLinks"][0], serde_json::json!("http://bit.ly/x"));
        assert!(v["timestamp"].is_string());
        assert!(v.get("error").is_none());
    }
}
