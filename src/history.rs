//! history.rs: bounded analysis history on top of a `KeyValueStore`.
//!
//! Records live under `analysis_<20-digit id>` keys. Ids are microseconds
//! since the epoch, bumped so every new key is strictly greater than any key
//! issued or stored before; string order is therefore insertion order and the
//! oldest records are simply the smallest keys.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::classification::ClassificationResult;
use crate::storage::KeyValueStore;

pub const KEY_PREFIX: &str = "analysis_";
pub const DEFAULT_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(skip)]
    pub key: String,
    pub subject: String,
    pub sender: String,
    pub analysis: ClassificationResult,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub emails_scanned: usize,
    pub threats_blocked: usize,
}

pub struct AnalysisStore {
    kv: Arc<dyn KeyValueStore>,
    cap: usize,
    /// Last issued id; the mutex also serializes the put transaction.
    last_id: Mutex<u64>,
}

impl AnalysisStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(kv, DEFAULT_HISTORY_CAP)
    }

    pub fn with_capacity(kv: Arc<dyn KeyValueStore>, cap: usize) -> Self {
        Self {
            kv,
            cap: cap.max(1),
            last_id: Mutex::new(0),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Append one record and evict the oldest ones beyond the cap.
    pub async fn put(
        &self,
        subject: &str,
        sender: &str,
        analysis: &ClassificationResult,
    ) -> Result<AnalysisRecord> {
        let mut last_id = self.last_id.lock().await;

        let existing = namespaced_keys(&*self.kv).await?;
        let stored_max = existing.iter().filter_map(|k| parse_id(k)).max().unwrap_or(0);
        let now = Utc::now();
        let micros = u64::try_from(now.timestamp_micros()).unwrap_or(0);
        let id = micros
            .max(last_id.saturating_add(1))
            .max(stored_max.saturating_add(1));
        let key = make_key(id);

        let record = AnalysisRecord {
            key: key.clone(),
            subject: subject.to_string(),
            sender: sender.to_string(),
            analysis: analysis.clone(),
            timestamp: now,
        };
        let value = serde_json::to_value(&record).context("encode analysis record")?;
        self.kv
            .set(&key, value)
            .await
            .with_context(|| format!("store {key}"))?;
        *last_id = id;

        // `existing` is sorted ascending and every entry is older than `key`.
        let live = existing.len() + 1;
        if live > self.cap {
            let evict: Vec<String> = existing.into_iter().take(live - self.cap).collect();
            self.kv.remove(&evict).await.context("evict old analyses")?;
            counter!("history_evictions_total").increment(evict.len() as u64);
            tracing::debug!(target: "history", evicted = evict.len(), "history over cap");
        }

        Ok(record)
    }

    /// Up to `n` records, newest first (ties broken by key, newest first).
    pub async fn list_recent(&self, n: usize) -> Result<Vec<AnalysisRecord>> {
        let mut records = self.load_all().await?;
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.key.cmp(&a.key))
        });
        records.truncate(n);
        Ok(records)
    }

    /// Remove every analysis record; other keys in the namespace stay.
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.last_id.lock().await;
        let keys = namespaced_keys(&*self.kv).await?;
        let removed = keys.len();
        if removed > 0 {
            self.kv.remove(&keys).await.context("clear analyses")?;
        }
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<HistoryStats> {
        let records = self.load_all().await?;
        Ok(HistoryStats {
            emails_scanned: records.len(),
            threats_blocked: records.iter().filter(|r| r.analysis.is_phishing).count(),
        })
    }

    /// Live records in key order. Entries that fail to decode are skipped.
    async fn load_all(&self) -> Result<Vec<AnalysisRecord>> {
        let all = self.kv.get_all().await?;
        let mut out = Vec::new();
        for (key, value) in all.into_iter().filter(|(k, _)| is_analysis_key(k)) {
            match serde_json::from_value::<AnalysisRecord>(value) {
                Ok(mut r) => {
                    r.key = key;
                    out.push(r);
                }
                Err(e) => tracing::warn!(target: "history", %key, error = %e, "skipping undecodable record"),
            }
        }
        Ok(out)
    }
}

pub fn is_analysis_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX)
}

fn make_key(id: u64) -> String {
    format!("{KEY_PREFIX}{id:020}")
}

fn parse_id(key: &str) -> Option<u64> {
    key.strip_prefix(KEY_PREFIX)?.parse().ok()
}

/// Analysis keys, ascending.
async fn namespaced_keys(kv: &dyn KeyValueStore) -> Result<Vec<String>> {
    Ok(kv
        .get_all()
        .await?
        .into_keys()
        .filter(|k| is_analysis_key(k))
        .collect())
}
