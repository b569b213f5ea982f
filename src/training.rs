//! Attack (training) mode: score user-authored phishing text.
//!
//! Uses the training lexicon and the continuous training scorer. The less
//! detectable the message, the more points it earns.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::analyze::features::{FeatureExtractor, FeatureVector};
use crate::analyze::scoring::{reward_points, training_confidence, xp_for};
use crate::analyze::weights::TrainingWeights;
use crate::message::MessageRecord;

/// All-caps tokens above this count produce a trigger.
const CAPS_TRIGGER_MIN: u32 = 2;
/// Exclamation marks above this count produce a trigger.
const PUNCT_TRIGGER_MIN: u32 = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct AttackDraft {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detectability {
    #[serde(rename = "Hard to Detect")]
    HardToDetect,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Easy to Detect")]
    EasyToDetect,
    #[serde(rename = "Very Obvious")]
    VeryObvious,
}

impl Detectability {
    pub fn from_confidence(c: f64) -> Self {
        if c < 0.25 {
            Self::HardToDetect
        } else if c < 0.5 {
            Self::Moderate
        } else if c < 0.75 {
            Self::EasyToDetect
        } else {
            Self::VeryObvious
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::HardToDetect => "Hard to Detect",
            Self::Moderate => "Moderate",
            Self::EasyToDetect => "Easy to Detect",
            Self::VeryObvious => "Very Obvious",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackReport {
    /// Confidence as a 0-100 percentage, rounded.
    pub threat_score: u32,
    pub confidence: f64,
    pub points: u32,
    pub xp: u32,
    pub triggers: Vec<String>,
    pub detectability: Detectability,
}

pub fn score_attack(subject: &str, body: &str, w: &TrainingWeights) -> Result<AttackReport> {
    if subject.trim().is_empty() || body.trim().is_empty() {
        bail!("attack needs both a subject and a body");
    }

    let record = MessageRecord::new("attack").subject(subject).body(body);
    let features = FeatureExtractor::training().extract(&record);
    let confidence = training_confidence(&features, w);
    let points = reward_points(confidence, w);

    tracing::debug!(
        target: "training",
        confidence,
        points,
        "scored attack draft"
    );

    Ok(AttackReport {
        threat_score: (confidence * 100.0).round() as u32,
        confidence,
        points,
        xp: xp_for(points, w),
        triggers: triggers(&features),
        detectability: Detectability::from_confidence(confidence),
    })
}

/// Feedback lines for the signals that fired, in a fixed order.
pub fn triggers(f: &FeatureVector) -> Vec<String> {
    let mut out = Vec::new();
    if f.urgency_word_count > 0 {
        out.push(format!("Urgency indicators: {}", f.urgency_word_count));
    }
    if f.credential_word_count > 0 {
        out.push(format!("Credential requests: {}", f.credential_word_count));
    }
    if f.suspicious_phrase_count > 0 {
        out.push(format!("Suspicious phrases: {}", f.suspicious_phrase_count));
    }
    if f.all_caps_token_count > CAPS_TRIGGER_MIN {
        out.push(format!("Excessive caps: {}", f.all_caps_token_count));
    }
    if f.exclamation_count > PUNCT_TRIGGER_MIN {
        out.push(format!("Excessive punctuation: {}!", f.exclamation_count));
    }
    out
}
