//! Repository URL classification
//!
//! The scheme of a repository URL is inspected exactly once, here. Everything
//! downstream works with a [`RepositoryReference`].

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, Result};

/// Index document every classic repository serves at its root
pub const INDEX_FILE: &str = "index.yaml";

/// Repository protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// HTTP/S repository serving an `index.yaml`
    ClassicHttp,
    /// Repository inside an OCI registry
    Oci,
}

impl RepositoryKind {
    /// Detect the protocol from the URL scheme
    pub fn detect(url: &str) -> Result<Self> {
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(RepositoryKind::ClassicHttp)
        } else if url.starts_with("oci://") {
            Ok(RepositoryKind::Oci)
        } else {
            Err(RepoError::InvalidRepositoryUrl {
                url: url.to_string(),
                reason: "URL must start with http://, https:// or oci://".to_string(),
            })
        }
    }
}

impl std::fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClassicHttp => write!(f, "HTTP"),
            Self::Oci => write!(f, "OCI"),
        }
    }
}

/// A classified repository plus the chart to look up in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    url: String,
    kind: RepositoryKind,
    chart: Option<String>,
}

impl RepositoryReference {
    /// Classify `url` and validate `chart` against the protocol
    ///
    /// Classic repositories host many charts, so `chart` must be non-empty.
    /// An OCI URL already names one chart; a chart name given for it is
    /// dropped with a warning.
    pub fn new(url: &str, chart: &str) -> Result<Self> {
        let kind = RepositoryKind::detect(url)?;

        let chart = match kind {
            RepositoryKind::ClassicHttp => {
                if chart.is_empty() {
                    return Err(RepoError::ChartNameRequired {
                        url: url.to_string(),
                    });
                }
                Some(chart.to_string())
            }
            RepositoryKind::Oci => {
                if !chart.is_empty() {
                    tracing::warn!(
                        "Ignoring chart name {:?} for OCI repository {}: the URL identifies the chart",
                        chart,
                        url
                    );
                }
                None
            }
        };

        Ok(Self {
            url: url.to_string(),
            kind,
            chart,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> RepositoryKind {
        self.kind
    }

    /// Chart name, present only for classic repositories
    pub fn chart(&self) -> Option<&str> {
        self.chart.as_deref()
    }

    /// Index document URL for classic repositories
    pub fn index_url(&self) -> Option<String> {
        match self.kind {
            RepositoryKind::ClassicHttp => Some(index_url(&self.url)),
            RepositoryKind::Oci => None,
        }
    }
}

/// `<repo_url>/index.yaml`, dropping one trailing slash from `repo_url`
pub fn index_url(repo_url: &str) -> String {
    let base = repo_url.strip_suffix('/').unwrap_or(repo_url);
    format!("{}/{}", base, INDEX_FILE)
}
