//! TOML-driven archive configuration.
//!
//! `ArchiveConfig` names the storage bucket, the content type recorded
//! assets are stored under, and the timeouts for the two network steps.
//! Load from TOML via `from_toml_str`/`from_file`, or use `Default` for
//! the stock settings.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use custodia_contracts::error::{CustodiaError, CustodiaResult};

/// Configuration for the archival pipeline.
///
/// ```toml
/// bucket = "archived-streams"
/// content-type = "video/mp4"
/// fetch-timeout-secs = 30
/// upload-timeout-secs = 60
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ArchiveConfig {
    /// Object storage bucket archived media lands in.
    pub bucket: String,
    /// Content type stored with each archived asset.
    pub content_type: String,
    /// Budget for downloading the recorded asset.
    pub fetch_timeout_secs: u64,
    /// Budget for the upload to object storage.
    pub upload_timeout_secs: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: "archived-streams".to_string(),
            content_type: "video/mp4".to_string(),
            fetch_timeout_secs: 30,
            upload_timeout_secs: 60,
        }
    }
}

impl ArchiveConfig {
    /// Parse `s` as TOML configuration.
    ///
    /// Returns `CustodiaError::Config` if the TOML is malformed or the
    /// bucket is empty.
    pub fn from_toml_str(s: &str) -> CustodiaResult<Self> {
        let config: ArchiveConfig = toml::from_str(s).map_err(|e| CustodiaError::Config {
            reason: format!("failed to parse archive config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> CustodiaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustodiaError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> CustodiaResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(CustodiaError::Config {
                reason: "archive bucket must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
