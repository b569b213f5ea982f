// src/lib.rs
// Public library surface for the service binary, the demo and integration tests.

pub mod adapters;
pub mod analyze;
pub mod api;
pub mod change_detector;
pub mod classification;
pub mod config;
pub mod history;
pub mod hot_reload;
pub mod lexicon;
pub mod message;
pub mod metrics;
pub mod service;
pub mod storage;
pub mod training;

use std::sync::Arc;

use anyhow::Result;
use shuttle_axum::axum::Router;
use tracing::info;

use crate::analyze::{weights, Classifier};
use crate::config::AppConfig;
use crate::history::AnalysisStore;
use crate::service::AnalysisService;
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};

pub use crate::api::router;
pub use crate::classification::ClassificationResult;
pub use crate::message::MessageRecord;

/// Classifier + history store wired from `config`.
pub fn build_service(config: &AppConfig) -> Arc<AnalysisService> {
    let classifier = Classifier::new(Arc::new(weights::hot_weights(Some(
        config.weights_path.as_path(),
    ))));
    let kv: Arc<dyn KeyValueStore> = match &config.history_path {
        Some(p) => Arc::new(JsonFileStore::new(p)),
        None => Arc::new(MemoryStore::new()),
    };
    let store = Arc::new(AnalysisStore::with_capacity(kv, config.history_cap));
    Arc::new(AnalysisService::new(classifier, store))
}

/// Full HTTP app for `config`, `/metrics` included.
pub async fn app_with(config: &AppConfig) -> Result<Router> {
    let metrics = crate::metrics::Metrics::init();
    let service = build_service(config);
    let state = api::AppState::spawn(service, config.worker_queue);
    info!(
        history_cap = config.history_cap,
        persistent = config.history_path.is_some(),
        "phishing detector ready"
    );
    Ok(api::router(state).merge(metrics.router()))
}

/// Same as `app_with`, configuration resolved from file + env.
pub async fn app() -> Result<Router> {
    let config = AppConfig::load()?;
    app_with(&config).await
}
