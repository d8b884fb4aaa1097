//! Resolver settings
//!
//! Stored in `~/.config/chartpin/config.yaml`. Every field is optional.

use chartpin_core::InvalidVersionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RepoError, Result};

/// Default number of tags requested per OCI tag-list page
pub const DEFAULT_TAG_PAGE_SIZE: usize = 100;

/// Settings shared by the HTTP and OCI transports and the resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Deadline for fetching a version list, in seconds (0 disables it)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Tags requested per OCI tag-list page
    #[serde(default = "default_tag_page_size")]
    pub tag_page_size: usize,

    /// Redirects followed when fetching a classic index
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Registries reached over plain HTTP (`localhost:5000`)
    #[serde(default)]
    pub insecure_registries: Vec<String>,

    /// Treatment of versions that do not parse
    #[serde(default)]
    pub invalid_versions: InvalidVersionPolicy,

    /// User-Agent sent to classic repositories
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_tag_page_size() -> usize {
    DEFAULT_TAG_PAGE_SIZE
}

fn default_max_redirects() -> u32 {
    10
}

fn default_user_agent() -> String {
    format!("chartpin/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            tag_page_size: default_tag_page_size(),
            max_redirects: default_max_redirects(),
            insecure_registries: Vec::new(),
            invalid_versions: InvalidVersionPolicy::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl Settings {
    /// Load settings from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default settings path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("chartpin").join("config.yaml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tag_page_size == 0 {
            return Err(RepoError::InvalidConfig {
                message: "tagPageSize must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Fetch deadline, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}
