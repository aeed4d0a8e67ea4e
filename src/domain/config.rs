//! Configuration models.
//!
//! Every section and field has a default, so a partial `config.toml`
//! (or none at all) is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::models::Theme;

/// Configuration for the local database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file name inside the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
        }
    }
}

fn default_database_file() -> String {
    "applications.db".to_string()
}

/// Limits applied when attaching documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Maximum attachment size in megabytes.
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
        }
    }
}

const fn default_max_size_mb() -> u64 {
    10
}

/// Display preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Theme used until the user picks one.
    #[serde(default)]
    pub default_theme: Theme,
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub attachments: AttachmentConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".job-tracker")
    }

    /// Get the storage database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.database_file)
    }

    /// Get the exports directory path.
    #[must_use]
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir().join("exports")
    }

    /// Maximum attachment size in bytes, capped at `u64::MAX`.
    #[must_use]
    pub const fn max_attachment_bytes(&self) -> u64 {
        self.attachments.max_size_mb.saturating_mul(1024 * 1024)
    }
}
