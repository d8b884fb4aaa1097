//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use chartpin_core::ErrorKind;
use chartpin_repo::{RepoError, SelectError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Bad repository URL, chart name, reference, constraint or settings
    #[error("Invalid input: {message}")]
    #[diagnostic(code(chartpin::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Versions exist, none satisfies the constraint
    #[error("No version of chart {chart:?} in {repo_url:?} satisfies {constraint:?}")]
    #[diagnostic(
        code(chartpin::cli::no_match),
        help("Relax the constraint or check the published versions")
    )]
    NoMatch {
        chart: String,
        repo_url: String,
        constraint: String,
    },

    /// Chart absent, or no versions published
    #[error("Not found: {message}")]
    #[diagnostic(code(chartpin::cli::not_found))]
    NotFound { message: String },

    /// Repository, registry or helm failure
    #[error("Upstream failure: {message}")]
    #[diagnostic(code(chartpin::cli::upstream))]
    Upstream { message: String },

    /// A published version does not parse
    #[error("Parse error: {message}")]
    #[diagnostic(
        code(chartpin::cli::parse),
        help("Set `invalidVersions: skip` in the config file, or pass --skip-invalid, to ignore such versions")
    )]
    Parse { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chartpin::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::NoMatch { .. } => exit_codes::NO_MATCH,
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Upstream { .. } => exit_codes::UPSTREAM_ERROR,
            CliError::Parse { .. } => exit_codes::PARSE_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    fn from_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::InvalidInput => Self::Input {
                message,
                help: None,
            },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::Upstream => Self::Upstream { message },
            ErrorKind::Parse => Self::Parse { message },
        }
    }
}

/// `error: cause: cause...` for the whole source chain
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<SelectError> for CliError {
    fn from(err: SelectError) -> Self {
        Self::from_kind(err.kind(), error_chain(&err))
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        Self::from_kind(err.kind(), error_chain(&err))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        let err = CliError::from(RepoError::InvalidRepositoryUrl {
            url: "ftp://host".to_string(),
            reason: "unsupported scheme".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::INPUT_ERROR);

        let err = CliError::from(RepoError::UnexpectedStatus {
            status: 502,
            url: "https://example.com/index.yaml".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::UPSTREAM_ERROR);

        let err = CliError::NoMatch {
            chart: "nginx".to_string(),
            repo_url: "https://example.com".to_string(),
            constraint: "^9".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::NO_MATCH);
    }

    #[test]
    fn test_error_chain_includes_causes() {
        let err = RepoError::from(chartpin_core::ResolveError::NoVersionsAvailable);
        let message = CliError::from(err).to_string();
        assert_eq!(message, "Not found: no versions available");
    }
}
