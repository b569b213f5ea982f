//! Watches the displayed document and dispatches each new message once.
//!
//! `Idle` until `attach()`; afterwards every `check()` runs the platform
//! adapter and, if the candidate's id has not been seen, records the id and
//! dispatches exactly one classification. The id is recorded before anything
//! is awaited, so a message can never be dispatched twice.

use std::collections::HashSet;
use std::time::Duration;

use metrics::counter;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::adapters::{adapter_for, DocumentSnapshot, MessageAdapter, Platform};
use crate::classification::ClassificationResult;
use crate::message::MessageRecord;
use crate::service::{Dispatcher, PendingClassification};

pub const DEFAULT_INITIAL_CHECK_DELAY: Duration = Duration::from_millis(2000);

/// Ids already handed to the classifier during this process.
#[derive(Debug, Default)]
pub struct AnalyzedIdSet {
    ids: HashSet<String>,
}

impl AnalyzedIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `id` was not seen before.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Watching,
}

/// A message together with the verdict it received.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub record: MessageRecord,
    pub result: ClassificationResult,
}

pub struct ChangeDetector {
    adapter: Box<dyn MessageAdapter>,
    analyzed: AnalyzedIdSet,
    dispatcher: Dispatcher,
    state: DetectorState,
    initial_check_delay: Duration,
}

impl ChangeDetector {
    pub fn new(adapter: Box<dyn MessageAdapter>, dispatcher: Dispatcher) -> Self {
        Self {
            adapter,
            analyzed: AnalyzedIdSet::new(),
            dispatcher,
            state: DetectorState::Idle,
            initial_check_delay: DEFAULT_INITIAL_CHECK_DELAY,
        }
    }

    /// Detector with the adapter for whatever platform `url` belongs to.
    pub fn for_url(url: &str, dispatcher: Dispatcher) -> Self {
        Self::new(adapter_for(Platform::detect(url)), dispatcher)
    }

    pub fn with_initial_check_delay(mut self, delay: Duration) -> Self {
        self.initial_check_delay = delay;
        self
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn analyzed(&self) -> &AnalyzedIdSet {
        &self.analyzed
    }

    pub fn attach(&mut self) {
        if self.state == DetectorState::Idle {
            info!(target: "detector", platform = ?self.adapter.platform(), "watching document");
        }
        self.state = DetectorState::Watching;
    }

    /// Evaluate one document state. `None` when idle, when nothing could be
    /// extracted, or when the message was already dispatched.
    pub async fn check(&mut self, doc: &DocumentSnapshot) -> Option<(MessageRecord, PendingClassification)> {
        if self.state == DetectorState::Idle {
            return None;
        }
        let record = self.adapter.extract_candidate(doc)?;
        if !self.analyzed.insert(&record.id) {
            counter!("dedup_skipped_total").increment(1);
            debug!(target: "detector", id = %record.log_id(), "already analyzed");
            return None;
        }
        debug!(target: "detector", id = %record.log_id(), "dispatching");
        let pending = self.dispatcher.dispatch(record.clone()).await;
        Some((record, pending))
    }

    /// Attach, wait `initial_check_delay`, check once, then check on every
    /// document change until the document channel closes. Verdicts are
    /// forwarded as they arrive; returns after the last one is delivered.
    pub async fn run(
        mut self,
        mut document: watch::Receiver<DocumentSnapshot>,
        verdicts: mpsc::Sender<Verdict>,
    ) {
        self.attach();
        tokio::time::sleep(self.initial_check_delay).await;

        let mut forwards = JoinSet::new();
        loop {
            let doc = document.borrow_and_update().clone();
            if let Some((record, pending)) = self.check(&doc).await {
                let verdicts = verdicts.clone();
                forwards.spawn(async move {
                    let result = pending.result().await;
                    let _ = verdicts.send(Verdict { record, result }).await;
                });
            }
            if document.changed().await.is_err() {
                break;
            }
        }

        while forwards.join_next().await.is_some() {}
        debug!(target: "detector", analyzed = self.analyzed.len(), "document closed");
    }
}
