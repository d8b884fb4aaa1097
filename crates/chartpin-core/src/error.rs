//! Core error types

use thiserror::Error;

/// Coarse classification shared by every chartpin error
///
/// Callers branch on this instead of matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied something unusable (URL, chart name, constraint)
    InvalidInput,
    /// The chart or any version of it does not exist
    NotFound,
    /// The repository, registry or network failed
    Upstream,
    /// A version listed by the repository is not a semantic version
    Parse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid input"),
            Self::NotFound => write!(f, "not found"),
            Self::Upstream => write!(f, "upstream failure"),
            Self::Parse => write!(f, "parse failure"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("error parsing version {raw:?}: {reason}")]
    InvalidVersion { raw: String, reason: String },

    #[error("error parsing constraint {raw:?}: {reason}")]
    InvalidConstraint { raw: String, reason: String },

    #[error("no versions available")]
    NoVersionsAvailable,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidVersion { .. } => ErrorKind::Parse,
            Self::InvalidConstraint { .. } => ErrorKind::InvalidInput,
            Self::NoVersionsAvailable => ErrorKind::NotFound,
        }
    }

    /// The raw string that failed to parse, if any
    pub fn offending_input(&self) -> Option<&str> {
        match self {
            Self::InvalidVersion { raw, .. } | Self::InvalidConstraint { raw, .. } => Some(raw),
            Self::NoVersionsAvailable => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = ResolveError::InvalidVersion {
            raw: "nope".to_string(),
            reason: "unexpected character".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.offending_input(), Some("nope"));
        assert!(err.to_string().contains("\"nope\""));

        assert_eq!(ResolveError::NoVersionsAvailable.kind(), ErrorKind::NotFound);
        assert_eq!(ResolveError::NoVersionsAvailable.offending_input(), None);
    }
}
