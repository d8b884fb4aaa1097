//! Error types for repository operations

use chartpin_core::{ErrorKind, ResolveError};
use thiserror::Error;

/// Repository operation errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Input Errors ============
    #[error("repository URL {url:?} is invalid: {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("a chart name is required for repository {url:?}")]
    ChartNameRequired { url: String },

    #[error("error parsing OCI reference {reference:?}: {reason}")]
    InvalidOciReference { reference: String, reason: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("credentials unavailable: {message}")]
    CredentialsUnavailable { message: String },

    // ============ Lookup Errors ============
    #[error("no versions of chart {chart:?} found in repository index from {index_url:?}")]
    ChartNotFound { chart: String, index_url: String },

    // ============ Network Errors ============
    #[error("received unexpected HTTP {status} when querying repository index at {url:?}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("network error: {message}")]
    NetworkError { message: String },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("too many redirects (max {max}) while fetching {url:?}")]
    TooManyRedirects { url: String, max: u32 },

    #[error("server at {url:?} redirected to invalid location {location:?}: {reason}")]
    InvalidRedirect {
        url: String,
        location: String,
        reason: String,
    },

    #[error("error unmarshaling repository index from {url:?}: {message}")]
    IndexParseError { url: String, message: String },

    #[error("OCI registry error: {message}")]
    OciError { message: String },

    // ============ Tooling Errors ============
    #[error("error running `{command}` for chart at {chart_path:?}:\n{output}")]
    DependencyUpdateFailed {
        command: String,
        chart_path: String,
        output: String,
    },

    // ============ Resolution ============
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRepositoryUrl { .. }
            | Self::ChartNameRequired { .. }
            | Self::InvalidOciReference { .. }
            | Self::InvalidConfig { .. }
            | Self::CredentialsUnavailable { .. }
            | Self::Serialization(_) => ErrorKind::InvalidInput,
            Self::ChartNotFound { .. } => ErrorKind::NotFound,
            Self::UnexpectedStatus { .. }
            | Self::NetworkError { .. }
            | Self::Timeout { .. }
            | Self::TooManyRedirects { .. }
            | Self::InvalidRedirect { .. }
            | Self::IndexParseError { .. }
            | Self::OciError { .. }
            | Self::DependencyUpdateFailed { .. }
            | Self::Io(_) => ErrorKind::Upstream,
            Self::Resolve(e) => e.kind(),
        }
    }
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<reqwest::Error> for RepoError {
    fn from(e: reqwest::Error) -> Self {
        // Strip the URL: it may carry userinfo
        let e = e.without_url();
        if e.is_timeout() {
            RepoError::NetworkError {
                message: format!("request timed out: {}", e),
            }
        } else if e.is_connect() {
            RepoError::NetworkError {
                message: format!("connection failed: {}", e),
            }
        } else {
            RepoError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(e: serde_yaml::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<oci_distribution::errors::OciDistributionError> for RepoError {
    fn from(e: oci_distribution::errors::OciDistributionError) -> Self {
        RepoError::OciError {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = RepoError::ChartNotFound {
            chart: "nginx".to_string(),
            index_url: "https://example.com/index.yaml".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("\"nginx\""));
        assert!(err.to_string().contains("https://example.com/index.yaml"));

        let err = RepoError::UnexpectedStatus {
            status: 503,
            url: "https://example.com/index.yaml".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("HTTP 503"));

        let err = RepoError::from(ResolveError::NoVersionsAvailable);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
