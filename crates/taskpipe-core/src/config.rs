//! Service configuration.
//!
//! A single optional `taskpipe.toml` in the data directory; every field has
//! a default, and a missing file is not an error. The data directory itself
//! resolves flag → `TASKPIPE_DATA_DIR` → the platform user data dir.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "taskpipe.toml";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TASKPIPE_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Topic name for the event bus; also names the log file.
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            bus: BusConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Upper bound on waiting for the event-log lock, so a stuck writer
    /// cannot stall user-visible latency unboundedly.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl BusConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite busy timeout for both the primary store and the KV sink.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl ServiceConfig {
    /// Path of the primary task database under `data_dir`.
    #[must_use]
    pub fn primary_db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("todos.sqlite3")
    }

    /// Path of the projection sink database under `data_dir`.
    #[must_use]
    pub fn state_db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("statestore.sqlite3")
    }

    /// Path of the event log for this config's topic under `data_dir`.
    #[must_use]
    pub fn events_log_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.jsonl", self.topic))
    }
}

/// Load the service config from `data_dir`, falling back to defaults when
/// the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(data_dir: &Path) -> Result<ServiceConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ServiceConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    toml::from_str::<ServiceConfig>(&content)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Resolve the data directory: explicit flag, then `TASKPIPE_DATA_DIR`,
/// then `<user data dir>/taskpipe`.
///
/// # Errors
///
/// Returns an error only when no candidate can be determined (no flag, no
/// env var, and the platform reports no user data directory).
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|base| base.join("taskpipe"))
        .context("no data directory: pass --data-dir or set TASKPIPE_DATA_DIR")
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_topic() -> String {
    "todo-events".to_string()
}
