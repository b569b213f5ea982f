//! Debug endpoints: inspect the live weights and preview a verdict.
//! Mounted by `api::router` only when `DEBUG_ROUTES=1`.

use serde::Serialize;
use shuttle_axum::axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use super::{detection_confidence, reasons, Classifier, FeatureVector, Weights};
use crate::message::MessageRecord;

pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesOut {
    pub features: FeatureVector,
    pub reasons: Vec<String>,
    pub detection_confidence: f32,
}

pub fn enabled() -> bool {
    std::env::var(ENV_DEBUG_ROUTES).is_ok_and(|v| v == "1")
}

pub fn router(classifier: Classifier) -> Router {
    Router::new()
        .route("/debug/weights", get(get_weights))
        .route("/debug/features", post(post_features))
        .with_state(classifier)
}

async fn get_weights(State(classifier): State<Classifier>) -> Json<Weights> {
    Json(classifier.weights())
}

/// Features, reasons and confidence for a record, without persisting anything.
async fn post_features(
    State(classifier): State<Classifier>,
    Json(record): Json<MessageRecord>,
) -> Json<FeaturesOut> {
    let features = classifier.extractor().extract(&record);
    let weights = classifier.weights();
    let reasons = reasons::explain(&record, &features);
    Json(FeaturesOut {
        detection_confidence: detection_confidence(&features, &weights.detection),
        reasons,
        features,
    })
}
