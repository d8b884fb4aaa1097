//! Version constraint expressions
//!
//! A constraint is a disjunction (`||`) of ranges. Each range is either a
//! hyphen range (`1.2 - 1.4.5`) or a conjunction of comparators separated
//! by commas or whitespace (`>=1.2, <2` and `>= 1.2 < 2` are the same).
//! Comparators use `=`, `>`, `>=`, `<`, `<=`, caret (`^`), tilde (`~`) or
//! wildcards (`*`, `1.x`). A bare version is an exact pin, unlike Cargo where
//! it would mean a caret range. A caret on a `0.x` version only fixes the
//! major version: `^0.2.3` is `>=0.2.3, <1.0.0`.
//!
//! Each range compiles to a [`semver::VersionReq`], so prerelease versions
//! only satisfy a range that mentions a prerelease of the same
//! `MAJOR.MINOR.PATCH`.

use semver::VersionReq;
use std::fmt;
use std::str::FromStr;

use crate::error::{ResolveError, Result};
use crate::version::SemanticVersion;

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '^', '~'];

/// A parsed version constraint
#[derive(Debug, Clone)]
pub struct Constraint {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl Constraint {
    /// Parse a constraint expression
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: String| ResolveError::InvalidConstraint {
            raw: raw.to_string(),
            reason,
        };

        if raw.trim().is_empty() {
            return Err(invalid("constraint is empty".to_string()));
        }

        let alternatives = raw
            .split("||")
            .map(|range| parse_range(range).map_err(invalid))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// Check whether a version satisfies any of the ranges
    pub fn matches(&self, version: &SemanticVersion) -> bool {
        self.alternatives
            .iter()
            .any(|req| req.matches(version.as_semver()))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn parse_range(range: &str) -> std::result::Result<VersionReq, String> {
    let range = range.trim();
    if range.is_empty() {
        return Err("empty range".to_string());
    }

    let comparators = match range.split_once(" - ") {
        Some((low, high)) => vec![
            format!(">={}", strip_v(low.trim())),
            format!("<={}", strip_v(high.trim())),
        ],
        None => split_comparators(range)
            .iter()
            .map(|comparator| normalize_comparator(comparator))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    VersionReq::parse(&comparators.join(", ")).map_err(|e| e.to_string())
}

/// Split a conjunction on commas and whitespace, keeping `>= 1.2` together
///
/// A part with no version yields its bare operator (or nothing) so that
/// [`normalize_comparator`] rejects it.
fn split_comparators(range: &str) -> Vec<String> {
    let mut comparators = Vec::new();
    for part in range.split(',') {
        let mut pending_op = String::new();
        let mut found = false;
        for token in part.split_whitespace() {
            if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
                pending_op.push_str(token);
            } else {
                comparators.push(format!("{}{}", pending_op, token));
                pending_op.clear();
                found = true;
            }
        }
        if !found || !pending_op.is_empty() {
            comparators.push(pending_op);
        }
    }
    comparators
}

/// Rewrite one comparator into the syntax `semver::VersionReq` expects
fn normalize_comparator(comparator: &str) -> std::result::Result<String, String> {
    let comparator = comparator.trim();
    if comparator.is_empty() {
        return Err("empty comparator".to_string());
    }

    let split = comparator
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(comparator.len());
    let (op, version) = comparator.split_at(split);
    let version = strip_v(version.trim());

    if version.is_empty() {
        return Err(format!("comparator {:?} has no version", comparator));
    }

    if op.is_empty() && !is_wildcard(version) {
        return Ok(format!("={}", version));
    }

    if op == "^" && !is_wildcard(version) && version.split('.').next() == Some("0") {
        return Ok(format!(">={}, <1.0.0", version));
    }

    Ok(format!("{}{}", op, version))
}

fn strip_v(version: &str) -> &str {
    match version.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => version,
    }
}

fn is_wildcard(version: &str) -> bool {
    version
        .split('.')
        .any(|part| matches!(part, "*" | "x" | "X"))
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Constraint {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
