//! User preferences stored in `{data_dir}/config.yaml`.
//!
//! ```yaml
//! precision: 4
//! output_format: scientific
//! history_limit: 200
//! record_history: true
//! ```
//!
//! Every key is optional; command line flags override whatever is loaded.

use std::fs;
use std::path::{Path, PathBuf};

use calckit_core::OutputFormat;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::io::atomic_write;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Decimal places for displayed values
    pub precision: u32,
    pub output_format: OutputFormat,
    /// Oldest history entries are dropped beyond this many
    pub history_limit: usize,
    pub record_history: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            precision: 2,
            output_format: OutputFormat::Decimal,
            history_limit: 500,
            record_history: true,
        }
    }
}

impl AppConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load(data_dir: &Path) -> Result<Self, StorageError> {
        let path = Self::path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        Self::from_yaml(&content).map_err(|e| StorageError::Parse {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), StorageError> {
        fs::create_dir_all(data_dir).map_err(|e| StorageError::io(data_dir, e))?;
        let yaml = self
            .to_yaml()
            .map_err(|e| StorageError::Serialize(format!("Failed to serialize config: {e}")))?;
        let path = Self::path(data_dir);
        atomic_write(&path, &yaml).map_err(|e| StorageError::io(&path, e))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }
}

/// Get the default data directory path (~/.calckit/)
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".calckit")
}
