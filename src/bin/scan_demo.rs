//! Offline demo: run a saved webmail page through detector → worker → store.
//!
//! Usage: `scan_demo [page.html] [url]`. Without arguments a built-in Gmail
//! page is scanned. The page is published twice to show the dedup gate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use phishing_detector::adapters::DocumentSnapshot;
use phishing_detector::analyze::Classifier;
use phishing_detector::change_detector::ChangeDetector;
use phishing_detector::history::AnalysisStore;
use phishing_detector::service::{spawn_worker, AnalysisService};
use phishing_detector::storage::MemoryStore;
use tokio::sync::{mpsc, watch};

const SAMPLE_URL: &str = "https://mail.google.com/mail/u/0/#inbox/demo";
const SAMPLE_PAGE: &str = r#"
<h2 class="hP">Urgent: your account is suspended</h2>
<span class="gD" email="noreply@paypal-security-update.com">PayPal Security</span>
<div data-message-id="demo-1">
  <p>URGENT action required. Act now and verify your account immediately,
     or it will be locked. Sign in at https://paypal.com to confirm now.</p>
  <a href="http://203.0.113.5/login">https://paypal.com/login</a>
  <a href="http://bit.ly/pp-verify">Verify now</a>
</div>"#;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let (html, url) = match args.next() {
        Some(path) => (
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
            args.next().unwrap_or_else(|| SAMPLE_URL.to_string()),
        ),
        None => (SAMPLE_PAGE.to_string(), SAMPLE_URL.to_string()),
    };

    let store = Arc::new(AnalysisStore::new(Arc::new(MemoryStore::new())));
    let service = Arc::new(AnalysisService::new(Classifier::with_default_paths(), store.clone()));
    let (dispatcher, worker) = spawn_worker(service, 8);

    let snapshot = DocumentSnapshot::new(url.as_str(), html);
    let (doc_tx, doc_rx) = watch::channel(snapshot.clone());
    let (verdict_tx, mut verdict_rx) = mpsc::channel(8);

    let detector = ChangeDetector::for_url(&url, dispatcher)
        .with_initial_check_delay(Duration::from_millis(100));
    let run = tokio::spawn(detector.run(doc_rx, verdict_tx));

    tokio::time::sleep(Duration::from_millis(300)).await;
    // Same message again: the detector must not re-dispatch it.
    doc_tx.send_replace(snapshot);
    drop(doc_tx);

    while let Some(v) = verdict_rx.recv().await {
        println!("{}", serde_json::to_string_pretty(&v.result)?);
    }
    run.await?;
    worker.await?;

    let stats = store.stats().await?;
    println!(
        "scan-demo done: {} scanned, {} flagged",
        stats.emails_scanned, stats.threats_blocked
    );
    Ok(())
}
