//! Scorer coefficients with hot-reload from `config/weights.json`.
//!
//! JSON shape (every field optional, missing ones keep the defaults):
//! {
//!   "detection": {
//!     "urgency_threshold": 3, "urgency": 0.3,
//!     "suspicious_link": 0.4, "sender_mismatch": 0.3,
//!     "link_count_threshold": 10, "link_count": 0.2
//!   },
//!   "training": {
//!     "urgency": 0.12, "credential": 0.18, "suspicious_phrase": 0.15,
//!     "all_caps": 0.08, "exclamation": 0.05,
//!     "max_reward": 200, "min_reward": 30, "xp_ratio": 0.7
//!   }
//! }

use serde::{Deserialize, Serialize};

use crate::hot_reload::HotReload;

pub const DEFAULT_WEIGHTS_PATH: &str = "config/weights.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub detection: DetectionWeights,
    pub training: TrainingWeights,
}

/// Step-function blocks: each signal fires at full weight past its threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionWeights {
    /// Urgency block fires once `urgency_word_count` exceeds this.
    pub urgency_threshold: u32,
    pub urgency: f32,
    /// Fires on any suspicious link.
    pub suspicious_link: f32,
    pub sender_mismatch: f32,
    /// Link-volume block fires once `link_count` exceeds this.
    pub link_count_threshold: u32,
    pub link_count: f32,
}

impl Default for DetectionWeights {
    fn default() -> Self {
        Self {
            urgency_threshold: 3,
            urgency: 0.3,
            suspicious_link: 0.4,
            sender_mismatch: 0.3,
            link_count_threshold: 10,
            link_count: 0.2,
        }
    }
}

/// Per-hit coefficients for attack/training mode plus the reward curve.
/// Kept in `f64`: `floor` on the reward turns single-precision error into
/// lost points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingWeights {
    pub urgency: f64,
    pub credential: f64,
    pub suspicious_phrase: f64,
    pub all_caps: f64,
    pub exclamation: f64,
    pub max_reward: u32,
    pub min_reward: u32,
    pub xp_ratio: f64,
}

impl Default for TrainingWeights {
    fn default() -> Self {
        Self {
            urgency: 0.12,
            credential: 0.18,
            suspicious_phrase: 0.15,
            all_caps: 0.08,
            exclamation: 0.05,
            max_reward: 200,
            min_reward: 30,
            xp_ratio: 0.7,
        }
    }
}

pub type HotReloadWeights = HotReload<Weights>;

/// Hot-reloading weights at `path` (defaults to `config/weights.json`).
pub fn hot_weights(path: Option<&std::path::Path>) -> HotReloadWeights {
    HotReload::new(
        path.map(std::path::Path::to_path_buf)
            .unwrap_or_else(|| DEFAULT_WEIGHTS_PATH.into()),
    )
}
