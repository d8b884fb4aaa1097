//! Semantic version parsing and ordering
//!
//! Versions are parsed with the `semver` crate after a small normalization
//! step that mirrors what chart repositories publish in practice: an optional
//! leading `v` and partial versions (`1`, `1.2`) are accepted and padded with
//! zeros. The raw string is kept for error messages and serialization;
//! [`SemanticVersion::normalized`] gives the canonical form.

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ResolveError, Result};

/// A parsed `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` version
///
/// Ordering compares major, minor and patch numerically, then places a
/// prerelease before the matching release. Build metadata is ignored, so two
/// versions differing only in build metadata compare equal.
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    raw: String,
    version: Version,
}

impl SemanticVersion {
    /// Parse a raw version string
    pub fn parse(raw: &str) -> Result<Self> {
        let version =
            Version::parse(&normalize(raw)).map_err(|e| ResolveError::InvalidVersion {
                raw: raw.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            raw: raw.to_string(),
            version,
        })
    }

    /// The string this version was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized `semver` value
    pub fn as_semver(&self) -> &Version {
        &self.version
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }

    /// Canonical `MAJOR.MINOR.PATCH[-PRE][+BUILD]` form
    pub fn normalized(&self) -> String {
        self.version.to_string()
    }
}

/// Strip a leading `v` and pad missing minor/patch components
fn normalize(raw: &str) -> String {
    let stripped = raw.strip_prefix('v').unwrap_or(raw);
    let split = stripped.find(['-', '+']).unwrap_or(stripped.len());
    let (core, suffix) = stripped.split_at(split);

    match core.split('.').count() {
        1 => format!("{}.0.0{}", core, suffix),
        2 => format!("{}.0{}", core, suffix),
        _ => stripped.to_string(),
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.version, &other.version);
        a.major
            .cmp(&b.major)
            .then(a.minor.cmp(&b.minor))
            .then(a.patch.cmp(&b.patch))
            // semver orders an empty prerelease above any non-empty one
            .then_with(|| a.pre.cmp(&b.pre))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for SemanticVersion {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full() {
        let version = v("1.2.3-rc.1+build.5");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert!(version.is_prerelease());
        assert_eq!(version.raw(), "1.2.3-rc.1+build.5");
    }

    #[test]
    fn test_parse_lenient_forms() {
        assert_eq!(v("v1.2.3").normalized(), "1.2.3");
        assert_eq!(v("1.2").normalized(), "1.2.0");
        assert_eq!(v("2").normalized(), "2.0.0");
        assert_eq!(v("v3-alpha").normalized(), "3.0.0-alpha");
        assert_eq!(v("1.4+meta").normalized(), "1.4.0+meta");

        // Raw form is preserved
        assert_eq!(v("v1.2").raw(), "v1.2");
        assert_eq!(v("v1.2").to_string(), "v1.2");
    }

    #[test]
    fn test_parse_invalid() {
        for raw in ["", "not-a-version", "1.2.3.4", "latest", "1.x", "vv1.0.0"] {
            let err = SemanticVersion::parse(raw).unwrap_err();
            assert_eq!(err.offending_input(), Some(raw), "input {:?}", raw);
        }
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("2.0.0") > v("1.99.99"));
        assert!(v("1.0.10") > v("1.0.2"));
    }

    #[test]
    fn test_prerelease_before_release() {
        assert!(v("2.0.0-beta") < v("2.0.0"));
        assert!(v("2.0.0-alpha") < v("2.0.0-beta"));
        assert!(v("2.0.0-beta") > v("1.2.0"));
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert_eq!(v("1.0.0+a"), v("1.0.0+b"));
        assert_eq!(v("1.0.0+a").cmp(&v("1.0.0")), Ordering::Equal);
        assert_eq!(v("v1.0"), v("1.0.0"));
    }

    #[test]
    fn test_serde_uses_raw_string() {
        let version = v("v1.2");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"v1.2\"");

        let parsed: SemanticVersion = serde_json::from_str("\"1.2.3\"").unwrap();
        assert_eq!(parsed, v("1.2.3"));
        assert!(serde_json::from_str::<SemanticVersion>("\"bogus\"").is_err());
    }
}
