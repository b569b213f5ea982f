//! Hot-reloaded JSON config values.
//!
//! On each `current()` call we check the file's modified time and reload if it
//! changed. A missing file keeps the current value (defaults on first use); a
//! file that fails to parse is logged and the previous value is kept.
//! `HotReload::fixed` holds a value with no backing file.

use serde::de::DeserializeOwned;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
    time::SystemTime,
};

#[derive(Debug)]
pub struct HotReload<T> {
    path: Option<PathBuf>,
    inner: RwLock<State<T>>,
}

#[derive(Debug)]
struct State<T> {
    value: T,
    last_modified: Option<SystemTime>,
}

impl<T> HotReload<T>
where
    T: DeserializeOwned + Default + Clone,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_value(path, T::default())
    }

    /// Start from an explicit value instead of `T::default()`.
    pub fn with_value(path: impl Into<PathBuf>, value: T) -> Self {
        Self {
            path: Some(path.into()),
            inner: RwLock::new(State {
                value,
                last_modified: None,
            }),
        }
    }

    /// Value that never reloads.
    pub fn fixed(value: T) -> Self {
        Self {
            path: None,
            inner: RwLock::new(State {
                value,
                last_modified: None,
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Latest value, reloading if the file changed since the last call.
    pub fn current(&self) -> T {
        let Some(path) = self.path.as_deref() else {
            let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
            return guard.value.clone();
        };

        // Fast path: compare mtime under the read lock.
        let needs_reload = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => {
                let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
                guard.last_modified != Some(mtime)
            }
            Err(_) => false,
        };

        if !needs_reload {
            let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
            return guard.value.clone();
        }

        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        // Double-check in case another caller reloaded meanwhile.
        if let Ok(mtime) = fs::metadata(path).and_then(|m| m.modified()) {
            if guard.last_modified != Some(mtime) {
                match load_json_file::<T>(path) {
                    Ok(v) => {
                        guard.value = v;
                        tracing::info!(target: "config", path = %path.display(), "reloaded");
                    }
                    Err(e) => {
                        tracing::warn!(target: "config", path = %path.display(), error = %e, "reload failed, keeping previous value");
                    }
                }
                guard.last_modified = Some(mtime);
            }
        }
        guard.value.clone()
    }
}

/// Load a JSON file directly (no caching). Public for tests/tools.
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> io::Result<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
