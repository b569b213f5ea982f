use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::analyze::debug;
use crate::classification::ClassificationResult;
use crate::history::{AnalysisRecord, HistoryStats};
use crate::message::MessageRecord;
use crate::service::{spawn_worker, AnalysisService, Dispatcher};
use crate::training::{self, AttackDraft, AttackReport};

const DEFAULT_HISTORY_LIMIT: usize = 5;

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    service: Arc<AnalysisService>,
    dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(service: Arc<AnalysisService>, dispatcher: Dispatcher) -> Self {
        Self {
            service,
            dispatcher,
        }
    }

    /// Spawn the classification worker and wrap it. Needs a Tokio runtime.
    pub fn spawn(service: Arc<AnalysisService>, queue: usize) -> Self {
        let (dispatcher, _worker) = spawn_worker(service.clone(), queue);
        Self::new(service, dispatcher)
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/attack", post(attack))
        .route("/history", get(history).delete(clear_history))
        .route("/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state.clone());

    if debug::enabled() {
        app = app.merge(debug::router(state.service.classifier().clone()));
    }
    app
}

async fn analyze(
    State(state): State<AppState>,
    Json(record): Json<MessageRecord>,
) -> Json<ClassificationResult> {
    let result = state.dispatcher.dispatch(record).await.result().await;
    Json(result)
}

async fn attack(
    State(state): State<AppState>,
    Json(draft): Json<AttackDraft>,
) -> Result<Json<AttackReport>, ApiError> {
    let w = state.service.classifier().weights().training;
    training::score_attack(&draft.subject, &draft.body, &w)
        .map(Json)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<AnalysisRecord>>, ApiError> {
    let store = state.service.store();
    let limit = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(store.cap());
    store.list_recent(limit).await.map(Json).map_err(internal)
}

#[derive(Serialize)]
struct Cleared {
    removed: usize,
}

async fn clear_history(State(state): State<AppState>) -> Result<Json<Cleared>, ApiError> {
    let removed = state.service.store().clear().await.map_err(internal)?;
    tracing::info!(target: "history", removed, "history cleared");
    Ok(Json(Cleared { removed }))
}

async fn stats(State(state): State<AppState>) -> Result<Json<HistoryStats>, ApiError> {
    state.service.store().stats().await.map(Json).map_err(internal)
}

fn internal(e: anyhow::Error) -> ApiError {
    tracing::warn!(error = %format!("{e:#}"), "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "storage error".to_string())
}
