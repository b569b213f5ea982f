// src/config.rs
//! Runtime settings.
//!
//! Resolution order, later wins:
//! 1) built-in defaults
//! 2) TOML file: $PHISH_CONFIG_PATH, else config/app.toml if present
//! 3) individual env vars (`PHISH_*`, `.env` honoured via dotenvy in main)

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::analyze::weights::DEFAULT_WEIGHTS_PATH;
use crate::history::DEFAULT_HISTORY_CAP;
use crate::service::DEFAULT_WORKER_QUEUE;

pub const ENV_CONFIG_PATH: &str = "PHISH_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

const ENV_HISTORY_CAP: &str = "PHISH_HISTORY_CAP";
const ENV_INITIAL_DELAY_MS: &str = "PHISH_INITIAL_DELAY_MS";
const ENV_HISTORY_PATH: &str = "PHISH_HISTORY_PATH";
const ENV_WEIGHTS_PATH: &str = "PHISH_WEIGHTS_PATH";
const ENV_WORKER_QUEUE: &str = "PHISH_WORKER_QUEUE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history_cap: usize,
    pub initial_check_delay_ms: u64,
    /// `None` keeps history in memory.
    pub history_path: Option<PathBuf>,
    pub weights_path: PathBuf,
    pub worker_queue: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            initial_check_delay_ms: 2000,
            history_path: None,
            weights_path: DEFAULT_WEIGHTS_PATH.into(),
            worker_queue: DEFAULT_WORKER_QUEUE,
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file, then env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match config_file_path()? {
            Some(p) => Self::load_from(&p)?,
            None => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn initial_check_delay(&self) -> Duration {
        Duration::from_millis(self.initial_check_delay_ms)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_parse::<usize>(ENV_HISTORY_CAP)? {
            self.history_cap = v;
        }
        if let Some(v) = env_parse::<u64>(ENV_INITIAL_DELAY_MS)? {
            self.initial_check_delay_ms = v;
        }
        if let Some(v) = env_nonempty(ENV_HISTORY_PATH) {
            self.history_path = Some(v.into());
        }
        if let Some(v) = env_nonempty(ENV_WEIGHTS_PATH) {
            self.weights_path = v.into();
        }
        if let Some(v) = env_parse::<usize>(ENV_WORKER_QUEUE)? {
            self.worker_queue = v;
        }
        Ok(())
    }
}

fn config_file_path() -> Result<Option<PathBuf>> {
    if let Some(p) = env_nonempty(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
    Ok(fallback.exists().then_some(fallback))
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_nonempty(key)
        .map(|v| v.parse::<T>().with_context(|| format!("{key}={v:?}")))
        .transpose()
}
