//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - a version was selected or the command completed
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - bad repository URL, chart name, OCI reference or constraint
pub const INPUT_ERROR: i32 = 2;

/// No match - versions exist but none satisfies the constraint
pub const NO_MATCH: i32 = 3;

/// Not found - chart missing from the repository, or no versions at all
pub const NOT_FOUND: i32 = 4;

/// Upstream error - HTTP status, network, registry or helm failure
pub const UPSTREAM_ERROR: i32 = 5;

/// Parse error - a published version is not a semantic version
pub const PARSE_ERROR: i32 = 6;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
