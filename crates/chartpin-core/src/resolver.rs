//! Version selection
//!
//! [`VersionResolver`] picks the semantically greatest version from a raw
//! list, optionally restricted by a [`Constraint`]. How malformed entries are
//! treated is decided in one place, [`InvalidVersionPolicy`].

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::{ResolveError, Result};
use crate::version::SemanticVersion;

/// What to do with raw versions that are not semantic versions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidVersionPolicy {
    /// Any malformed entry fails the whole resolution
    #[default]
    Strict,
    /// Malformed entries are logged and left out
    Skip,
}

impl InvalidVersionPolicy {
    /// Parse a raw list according to this policy, preserving order
    pub fn parse_all<S: AsRef<str>>(self, raw_versions: &[S]) -> Result<Vec<SemanticVersion>> {
        let mut parsed = Vec::with_capacity(raw_versions.len());

        for raw in raw_versions {
            match (SemanticVersion::parse(raw.as_ref()), self) {
                (Ok(version), _) => parsed.push(version),
                (Err(e), Self::Strict) => return Err(e),
                (Err(e), Self::Skip) => {
                    tracing::warn!("Skipping unparsable version: {}", e);
                }
            }
        }

        Ok(parsed)
    }
}

/// Selects the winning version from a candidate list
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionResolver {
    policy: InvalidVersionPolicy,
}

impl VersionResolver {
    pub fn new(policy: InvalidVersionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InvalidVersionPolicy {
        self.policy
    }

    /// Resolve the greatest version satisfying `constraint`
    ///
    /// An empty `constraint` selects the greatest version overall and fails
    /// with [`ResolveError::NoVersionsAvailable`] when there is none.
    /// Otherwise `Ok(None)` means no version satisfies the constraint.
    /// The winner is returned in canonical `MAJOR.MINOR.PATCH[-PRE][+BUILD]`
    /// form, so a listed `v1.2` comes back as `1.2.0`.
    pub fn resolve<S: AsRef<str>>(
        &self,
        raw_versions: &[S],
        constraint: &str,
    ) -> Result<Option<String>> {
        let mut versions = self.policy.parse_all(raw_versions)?;

        // Stable: equal versions keep their listed order
        versions.sort();

        if constraint.is_empty() {
            return versions
                .last()
                .map(|v| Some(v.normalized()))
                .ok_or(ResolveError::NoVersionsAvailable);
        }

        let constraint = Constraint::parse(constraint)?;

        let winner = versions.iter().rev().find(|v| constraint.matches(v));
        tracing::debug!(
            "Resolved {:?} against {} candidate(s): {:?}",
            constraint.raw(),
            versions.len(),
            winner.map(SemanticVersion::raw)
        );

        Ok(winner.map(SemanticVersion::normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: [&str; 3] = ["1.0.0", "1.2.0", "2.0.0-beta"];

    fn strict() -> VersionResolver {
        VersionResolver::default()
    }

    #[test]
    fn test_no_constraint_selects_greatest() {
        let winner = strict().resolve(&SAMPLE, "").unwrap();
        assert_eq!(winner.as_deref(), Some("2.0.0-beta"));
    }

    #[test]
    fn test_constraint_selects_greatest_match() {
        let winner = strict().resolve(&SAMPLE, "^1.0.0").unwrap();
        assert_eq!(winner.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let winner = strict().resolve(&SAMPLE, "^3.0.0").unwrap();
        assert_eq!(winner, None);
    }

    #[test]
    fn test_unordered_input() {
        let raw = ["0.9.0", "1.10.0", "1.9.0", "1.2.0"];
        assert_eq!(
            strict().resolve(&raw, "").unwrap().as_deref(),
            Some("1.10.0")
        );
        assert_eq!(
            strict().resolve(&raw, "<1.5.0").unwrap().as_deref(),
            Some("1.2.0")
        );
    }

    #[test]
    fn test_release_beats_its_prerelease() {
        let raw = ["2.0.0", "2.0.0-rc.1"];
        assert_eq!(strict().resolve(&raw, "").unwrap().as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_returns_canonical_form() {
        let raw = ["v1.0.0", "v1.1"];
        assert_eq!(strict().resolve(&raw, "").unwrap().as_deref(), Some("1.1.0"));
        assert_eq!(
            strict().resolve(&raw, "~1.0").unwrap().as_deref(),
            Some("1.0.0")
        );
        assert_eq!(
            strict().resolve(&["2", "v2.0.1-rc.1"], "").unwrap().as_deref(),
            Some("2.0.1-rc.1")
        );
    }

    #[test]
    fn test_ties_keep_listed_order() {
        let raw = ["1.0.0+b", "1.0.0+a"];
        // Equal precedence: the later listed entry is last after a stable sort
        assert_eq!(strict().resolve(&raw, "").unwrap().as_deref(), Some("1.0.0+a"));
        assert_eq!(
            strict().resolve(&raw, "=1.0.0").unwrap().as_deref(),
            Some("1.0.0+a")
        );
    }

    #[test]
    fn test_strict_policy_rejects_whole_list() {
        let raw = ["1.0.0", "not-a-version"];
        for constraint in ["", "^1.0.0", "*"] {
            let err = strict().resolve(&raw, constraint).unwrap_err();
            assert_eq!(err.offending_input(), Some("not-a-version"));
            assert!(matches!(err, ResolveError::InvalidVersion { .. }));
        }
    }

    #[test]
    fn test_strict_policy_names_first_offender() {
        let raw = ["bad-one", "1.0.0", "bad-two"];
        let err = strict().resolve(&raw, "").unwrap_err();
        assert_eq!(err.offending_input(), Some("bad-one"));
    }

    #[test]
    fn test_skip_policy_drops_invalid() {
        let resolver = VersionResolver::new(InvalidVersionPolicy::Skip);
        let raw = ["1.0.0", "not-a-version", "latest"];
        assert_eq!(resolver.resolve(&raw, "").unwrap().as_deref(), Some("1.0.0"));

        let err = resolver.resolve(&["latest"], "").unwrap_err();
        assert_eq!(err, ResolveError::NoVersionsAvailable);
    }

    #[test]
    fn test_empty_list() {
        let empty: [&str; 0] = [];
        assert_eq!(
            strict().resolve(&empty, "").unwrap_err(),
            ResolveError::NoVersionsAvailable
        );
        assert_eq!(strict().resolve(&empty, "^1.0.0").unwrap(), None);
    }

    #[test]
    fn test_invalid_constraint() {
        let err = strict().resolve(&SAMPLE, "not a constraint").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidConstraint { .. }));
    }

    #[test]
    fn test_version_errors_precede_constraint_errors() {
        let err = strict().resolve(&["oops"], ">>>").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidVersion { .. }));
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: InvalidVersionPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, InvalidVersionPolicy::Skip);
        assert_eq!(InvalidVersionPolicy::default(), InvalidVersionPolicy::Strict);
    }

    fn version_strategy() -> impl Strategy<Value = String> {
        (
            0u64..4,
            0u64..4,
            0u64..4,
            prop::option::of(prop::sample::select(vec!["alpha", "beta", "rc.1"])),
        )
            .prop_map(|(major, minor, patch, pre)| match pre {
                Some(pre) => format!("{}.{}.{}-{}", major, minor, patch, pre),
                None => format!("{}.{}.{}", major, minor, patch),
            })
    }

    fn constraint_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["", "^1.0.0", "~2.1.0", ">=1.0.0, <3.0.0", "<2.0.0", "*"])
    }

    proptest! {
        #[test]
        fn prop_winner_is_greatest_satisfying(
            raw in prop::collection::vec(version_strategy(), 0..20),
            constraint in constraint_strategy(),
        ) {
            let result = strict().resolve(raw.as_slice(), constraint);
            let parsed: Vec<SemanticVersion> =
                raw.iter().map(|r| SemanticVersion::parse(r).unwrap()).collect();

            if constraint.is_empty() {
                match result {
                    Ok(Some(winner)) => {
                        let winner = SemanticVersion::parse(&winner).unwrap();
                        prop_assert!(parsed.iter().all(|v| *v <= winner));
                    }
                    Ok(None) => prop_assert!(false, "no constraint never yields no match"),
                    Err(e) => prop_assert_eq!(e, ResolveError::NoVersionsAvailable),
                }
            } else {
                let predicate = Constraint::parse(constraint).unwrap();
                let satisfying: Vec<&SemanticVersion> =
                    parsed.iter().filter(|v| predicate.matches(v)).collect();

                match result.unwrap() {
                    Some(winner) => {
                        let winner = SemanticVersion::parse(&winner).unwrap();
                        prop_assert!(predicate.matches(&winner));
                        prop_assert!(satisfying.iter().all(|v| **v <= winner));
                    }
                    None => prop_assert!(satisfying.is_empty()),
                }
            }
        }

        #[test]
        fn prop_resolution_is_idempotent(
            raw in prop::collection::vec(version_strategy(), 0..20),
            constraint in constraint_strategy(),
        ) {
            let first = strict().resolve(raw.as_slice(), constraint);
            let second = strict().resolve(raw.as_slice(), constraint);
            prop_assert_eq!(first, second);
        }
    }
}
