//! Tracker configuration.
//!
//! Stored as pretty-printed JSON. A missing file is created with defaults; a
//! malformed one is reported and ignored.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::memory::layout::timing;
use crate::process::DEFAULT_TARGETS;

/// Default config file name, resolved against the working directory
pub const CONFIG_FILE: &str = "sunhook.json";

/// Sleep durations of the polling loop, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// Wait after a failed attach attempt
    pub attach_backoff_ms: u64,
    /// Wait after a connection loss
    pub failure_backoff_ms: u64,
    /// Wait after a published tick
    pub poll_interval_ms: u64,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            attach_backoff_ms: timing::ATTACH_BACKOFF_MS,
            failure_backoff_ms: timing::FAILURE_BACKOFF_MS,
            poll_interval_ms: timing::POLL_INTERVAL_MS,
        }
    }
}

impl TimingPolicy {
    pub fn attach_backoff(&self) -> Duration {
        Duration::from_millis(self.attach_backoff_ms)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.failure_backoff_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Emulator image names to attach to, tried in order
    pub process_names: Vec<String>,
    pub timing: TimingPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            process_names: DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect(),
            timing: TimingPolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from `path`, writing defaults there first if it does not exist.
    ///
    /// Parse failures fall back to defaults without touching the file.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            match config.save(path) {
                Ok(()) => info!("Created default config at {}", path.display()),
                Err(e) => warn!("Failed to write default config: {}", e),
            }
            return config;
        }

        match Self::load(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
