//! Heuristic scorers over a `FeatureVector`.
//!
//! Two variants share the feature extractor but not the aggregation:
//! - detection: threshold-gated blocks (each signal adds its full weight or
//!   nothing), drives real verdicts;
//! - training: continuous per-hit weighting, drives attack-mode feedback and
//!   the inverse reward.
//!
//! Both clamp to `[0, 1]`. Training runs in `f64` end to end so the floored
//! reward lands on the exact point value.

use super::features::FeatureVector;
use super::weights::{DetectionWeights, TrainingWeights};
use crate::classification::clamp01;

pub use crate::classification::{is_phishing, PHISHING_THRESHOLD};

/// Detection-mode confidence.
pub fn detection_confidence(f: &FeatureVector, w: &DetectionWeights) -> f32 {
    let mut score = 0.0f32;

    if f.urgency_word_count > w.urgency_threshold {
        score += w.urgency;
    }
    if f.suspicious_link_count > 0 {
        score += w.suspicious_link;
    }
    if f.sender_domain_mismatch {
        score += w.sender_mismatch;
    }
    if f.link_count > w.link_count_threshold {
        score += w.link_count;
    }

    clamp01(score)
}

/// Training-mode confidence (how detectable the authored text is).
pub fn training_confidence(f: &FeatureVector, w: &TrainingWeights) -> f64 {
    let raw = f64::from(f.urgency_word_count) * w.urgency
        + f64::from(f.credential_word_count) * w.credential
        + f64::from(f.suspicious_phrase_count) * w.suspicious_phrase
        + f64::from(f.all_caps_token_count) * w.all_caps
        + f64::from(f.exclamation_count) * w.exclamation;
    raw.clamp(0.0, 1.0)
}

/// Inverse reward: the less detectable, the more points, never below the floor.
pub fn reward_points(confidence: f64, w: &TrainingWeights) -> u32 {
    let scaled = ((1.0 - confidence.clamp(0.0, 1.0)) * f64::from(w.max_reward)).floor() as u32;
    scaled.max(w.min_reward)
}

/// Experience granted alongside `points`.
pub fn xp_for(points: u32, w: &TrainingWeights) -> u32 {
    (f64::from(points) * w.xp_ratio).floor() as u32
}
