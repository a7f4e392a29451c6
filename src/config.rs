use crate::clock::SECONDS_PER_DAY;
use crate::error::{ScheduleError, ScheduleResult};
use crate::packer::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_DIR: &str = "storecast";
const CONFIG_FILE: &str = "config.json";

/// Default broadcast day: 15 hours.
pub const DEFAULT_TOTAL_DURATION_SECS: u32 = 15 * 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Tunables for a scheduling run, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Length of the broadcast day to fill.
    #[serde(default = "default_total_duration")]
    pub total_duration_secs: u32,
    /// Occurrences per round-robin batch when packing flexible clips.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fail the run when a fixed-window clip ends up outside its window.
    #[serde(default)]
    pub strict_windows: bool,
}

fn default_total_duration() -> u32 {
    DEFAULT_TOTAL_DURATION_SECS
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl SchedulerConfig {
    pub fn new() -> Self {
        SchedulerConfig {
            total_duration_secs: DEFAULT_TOTAL_DURATION_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            strict_windows: false,
        }
    }

    /// Config file location under the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from JSON, or fall back to defaults if missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(config) => return config,
                    Err(e) => log::warn!(
                        "Corrupt config file '{}', using defaults: {}",
                        path.display(),
                        e
                    ),
                },
                Err(e) => log::warn!("Could not read config file '{}': {}", path.display(), e),
            }
        }
        SchedulerConfig::new()
    }

    /// Persist config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> ScheduleResult<()> {
        if self.total_duration_secs == 0 || self.total_duration_secs > SECONDS_PER_DAY {
            return Err(ScheduleError::InvalidConfig(format!(
                "total duration {}s must be between 1 and {}",
                self.total_duration_secs, SECONDS_PER_DAY
            )));
        }
        if self.batch_size == 0 {
            return Err(ScheduleError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
