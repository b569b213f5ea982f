//! Request/response seam between whoever observes messages and the classifier.
//!
//! A single worker task owns the `AnalysisService` and handles requests one at
//! a time; callers hold a cloneable `Dispatcher` and get a
//! `PendingClassification` back for each record they send.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use metrics::counter;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::analyze::Classifier;
use crate::classification::ClassificationResult;
use crate::history::AnalysisStore;
use crate::message::MessageRecord;

pub const DEFAULT_WORKER_QUEUE: usize = 64;

#[derive(Debug)]
pub struct ClassificationRequest {
    pub record: MessageRecord,
    pub respond_to: oneshot::Sender<ClassificationResult>,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<ClassificationRequest>,
}

impl Dispatcher {
    pub fn new(tx: mpsc::Sender<ClassificationRequest>) -> Self {
        Self { tx }
    }

    /// Queue `record`; waits for queue space, never for the verdict.
    pub async fn dispatch(&self, record: MessageRecord) -> PendingClassification {
        let (respond_to, rx) = oneshot::channel();
        let id = record.log_id();
        if self
            .tx
            .send(ClassificationRequest { record, respond_to })
            .await
            .is_err()
        {
            // The request (and its sender half) is dropped here, so the
            // pending result resolves to a failure.
            warn!(target: "service", %id, "classification worker is gone");
        }
        PendingClassification { rx }
    }
}

#[derive(Debug)]
pub struct PendingClassification {
    rx: oneshot::Receiver<ClassificationResult>,
}

impl PendingClassification {
    pub async fn result(self) -> ClassificationResult {
        self.rx.await.unwrap_or_else(|_| {
            counter!("classification_failures_total").increment(1);
            ClassificationResult::failed("classification worker unavailable")
        })
    }
}

/// Classify, then persist.
pub struct AnalysisService {
    classifier: Classifier,
    store: Arc<AnalysisStore>,
}

impl AnalysisService {
    pub fn new(classifier: Classifier, store: Arc<AnalysisStore>) -> Self {
        Self { classifier, store }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn store(&self) -> &Arc<AnalysisStore> {
        &self.store
    }

    /// Never fails: a panicking classifier becomes a failure result and a
    /// storage error is logged while the verdict is still returned.
    pub async fn analyze(&self, record: &MessageRecord) -> ClassificationResult {
        self.analyze_with(record, |r| self.classifier.classify(r))
            .await
    }

    async fn analyze_with<F>(&self, record: &MessageRecord, classify: F) -> ClassificationResult
    where
        F: FnOnce(&MessageRecord) -> ClassificationResult,
    {
        let id = record.log_id();
        let classified = catch_unwind(AssertUnwindSafe(|| classify(record)));
        let result = match classified {
            Ok(r) => r,
            Err(_) => {
                counter!("classification_failures_total").increment(1);
                warn!(target: "service", %id, "classifier panicked");
                return ClassificationResult::failed("classification failed");
            }
        };

        counter!("classifications_total").increment(1);
        if result.is_phishing {
            counter!("classifications_phishing_total").increment(1);
        }
        info!(
            target: "service",
            %id,
            confidence = result.confidence,
            is_phishing = result.is_phishing,
            reasons = result.reasons.len(),
            "classified"
        );

        if let Err(e) = self.store.put(&record.subject, &record.sender, &result).await {
            counter!("history_write_errors_total").increment(1);
            warn!(target: "service", %id, error = %format!("{e:#}"), "failed to persist analysis");
        }
        result
    }
}

/// Start the worker. It exits once every `Dispatcher` clone is dropped.
pub fn spawn_worker(
    service: Arc<AnalysisService>,
    capacity: usize,
) -> (Dispatcher, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ClassificationRequest>(capacity.max(1));
    let handle = tokio::spawn(async move {
        while let Some(req) = rx.recv().await {
            let result = service.analyze(&req.record).await;
            if req.respond_to.send(result).is_err() {
                debug!(target: "service", id = %req.record.log_id(), "requester went away");
            }
        }
        debug!(target: "service", "worker stopped");
    });
    (Dispatcher::new(tx), handle)
}
