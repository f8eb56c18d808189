//! Catalog configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Configuration for ingestion and reconciliation.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CatalogConfig {
    /// Root of the tree holding original files.
    pub original_root: PathBuf,

    /// Root of the tree holding exported derivatives.
    #[builder(default)]
    #[serde(default)]
    pub export_root: Option<PathBuf>,

    /// SQLite database file.
    #[builder(default = "default_database()")]
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// User that owns newly ingested entries.
    #[builder(default = "1")]
    #[serde(default = "default_user_id")]
    pub user_id: i64,

    /// Metadata tool program.
    #[builder(default = "default_exiftool()")]
    #[serde(default = "default_exiftool")]
    pub exiftool: String,

    /// Per-invocation limit for the metadata tool, in seconds.
    #[builder(default = "60")]
    #[serde(default = "default_extractor_timeout")]
    pub extractor_timeout_secs: u64,

    /// Overall scan deadline in seconds (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub scan_timeout_secs: Option<u64>,

    /// Number of threads for hashing (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub hash_threads: usize,
}

fn default_database() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shoebox")
        .join("shoebox.db")
}

fn default_user_id() -> i64 {
    1
}

fn default_exiftool() -> String {
    "exiftool".to_string()
}

fn default_extractor_timeout() -> u64 {
    60
}

impl CatalogConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.original_root {
            Some(ref root) if root.as_os_str().is_empty() => {
                Err("Original root cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Original root is required".to_string()),
        }?;
        if let Some(Some(ref root)) = self.export_root {
            if root.as_os_str().is_empty() {
                return Err("Export root cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl CatalogConfig {
    /// Create a new config builder.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Create a config for an original tree with defaults elsewhere.
    pub fn new(original_root: impl Into<PathBuf>) -> Self {
        Self {
            original_root: original_root.into(),
            export_root: None,
            database: default_database(),
            user_id: default_user_id(),
            exiftool: default_exiftool(),
            extractor_timeout_secs: default_extractor_timeout(),
            scan_timeout_secs: None,
            hash_threads: 0,
        }
    }

    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shoebox")
            .join("config.toml")
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ScanError> {
        let config: Self = toml::from_str(content).map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })?;
        if config.original_root.as_os_str().is_empty() {
            return Err(ScanError::InvalidConfig {
                message: "original_root cannot be empty".to_string(),
            });
        }
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Per-invocation limit for the metadata tool.
    pub fn extractor_timeout(&self) -> Duration {
        Duration::from_secs(self.extractor_timeout_secs)
    }

    /// Overall scan deadline, if any.
    pub fn scan_timeout(&self) -> Option<Duration> {
        self.scan_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
