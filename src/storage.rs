//! Key/value namespace the analysis history lives in.
//!
//! The namespace may be shared with unrelated keys; callers filter by prefix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::{fs, sync::Mutex};

#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Every key currently in the namespace.
    async fn get_all(&self) -> Result<BTreeMap<String, Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Missing keys are ignored.
    async fn remove(&self, keys: &[String]) -> Result<()>;
}

/// In-process namespace.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_all(&self) -> Result<BTreeMap<String, Value>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        for k in keys {
            entries.remove(k);
        }
        Ok(())
    }
}

/// Whole namespace as one JSON object on disk. Every write rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<BTreeMap<String, Value>> {
        match fs::read_to_string(&self.path).await {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parse store {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e).with_context(|| format!("read store {}", self.path.display())),
        }
    }

    async fn write(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create store dir {}", dir.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(entries).context("encode store")?;
        fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("write store {}", self.path.display()))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_all(&self) -> Result<BTreeMap<String, Value>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        entries.insert(key.to_string(), value);
        self.write(&entries).await
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        let before = entries.len();
        for k in keys {
            entries.remove(k);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.write(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_set_get_remove() {
        let s = MemoryStore::new();
        s.set("a", json!(1)).await.unwrap();
        s.set("b", json!({"x": true})).await.unwrap();
        s.remove(&["a".to_string(), "zz".to_string()]).await.unwrap();
        let all = s.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["b"], json!({"x": true}));
    }

    #[tokio::test]
    async fn json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store.json");

        let s = JsonFileStore::new(&path);
        assert!(s.get_all().await.unwrap().is_empty());
        s.set("k", json!("v")).await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get_all().await.unwrap()["k"], json!("v"));
        reopened.remove(&["k".to_string()]).await.unwrap();
        assert!(s.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::new(&path).get_all().await.is_err());
    }
}
