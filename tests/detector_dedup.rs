// tests/detector_dedup.rs
//
// Document changes → detector → worker → store, on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use phishing_detector::adapters::DocumentSnapshot;
use phishing_detector::analyze::Classifier;
use phishing_detector::change_detector::{ChangeDetector, DEFAULT_INITIAL_CHECK_DELAY};
use phishing_detector::history::AnalysisStore;
use phishing_detector::service::{spawn_worker, AnalysisService};
use phishing_detector::storage::MemoryStore;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

const GMAIL: &str = "https://mail.google.com/mail/u/0/#inbox";

fn page(id: &str, body: &str) -> DocumentSnapshot {
    DocumentSnapshot::new(
        GMAIL,
        format!(
            r#"<h2 class="hP">Subject {id}</h2>
               <span class="gD" email="someone@corp.example">Someone</span>
               <div data-message-id="{id}">{body}</div>"#
        ),
    )
}

fn service() -> (Arc<AnalysisStore>, Arc<AnalysisService>) {
    let store = Arc::new(AnalysisStore::new(Arc::new(MemoryStore::new())));
    let svc = Arc::new(AnalysisService::new(Classifier::builtin(), store.clone()));
    (store, svc)
}

#[tokio::test(start_paused = true)]
async fn first_check_waits_for_initial_delay() {
    let (_store, svc) = service();
    let (dispatcher, _worker) = spawn_worker(svc, 8);
    let (_doc_tx, doc_rx) = watch::channel(page("m1", "hello"));
    let (vtx, mut vrx) = mpsc::channel(8);

    let start = Instant::now();
    tokio::spawn(ChangeDetector::for_url(GMAIL, dispatcher).run(doc_rx, vtx));

    let first = vrx.recv().await.expect("one verdict");
    assert_eq!(first.record.id, "m1");
    assert!(start.elapsed() >= DEFAULT_INITIAL_CHECK_DELAY);
}

#[tokio::test(start_paused = true)]
async fn repeated_mutations_analyze_each_message_once() {
    let (store, svc) = service();
    let (dispatcher, worker) = spawn_worker(svc, 8);
    let (doc_tx, doc_rx) = watch::channel(page("m1", "hello"));
    let (vtx, mut vrx) = mpsc::channel(8);

    let run = tokio::spawn(
        ChangeDetector::for_url(GMAIL, dispatcher)
            .with_initial_check_delay(Duration::from_millis(50))
            .run(doc_rx, vtx),
    );

    assert_eq!(vrx.recv().await.unwrap().record.id, "m1");

    // Unrelated DOM churn around the same message.
    for _ in 0..3 {
        doc_tx.send_replace(page("m1", "hello"));
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    doc_tx.send_replace(page(
        "m2",
        r#"URGENT: verify now <a href="http://198.51.100.4/">Sign in</a>"#,
    ));
    tokio::time::sleep(Duration::from_millis(10)).await;
    doc_tx.send_replace(page("m1", "hello"));
    drop(doc_tx);

    let mut rest = Vec::new();
    while let Some(v) = vrx.recv().await {
        rest.push(v);
    }
    run.await.unwrap();
    worker.await.unwrap();

    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].record.id, "m2");
    assert_eq!(rest[0].result.suspicious_links, vec!["http://198.51.100.4/".to_string()]);
    assert_eq!(store.stats().await.unwrap().emails_scanned, 2);
}

#[tokio::test(start_paused = true)]
async fn unknown_platform_dispatches_nothing() {
    let (store, svc) = service();
    let (dispatcher, _worker) = spawn_worker(svc, 8);
    let (doc_tx, doc_rx) = watch::channel(DocumentSnapshot::new(
        "https://example.com/inbox",
        r#"<div data-message-id="x">hi</div>"#,
    ));
    let (vtx, mut vrx) = mpsc::channel(8);

    let run = tokio::spawn(
        ChangeDetector::for_url("https://example.com/inbox", dispatcher).run(doc_rx, vtx),
    );
    drop(doc_tx);
    run.await.unwrap();

    assert!(vrx.recv().await.is_none());
    assert_eq!(store.stats().await.unwrap().emails_scanned, 0);
}
