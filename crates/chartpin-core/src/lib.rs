//! chartpin Core - version model and resolution for chart repositories
//!
//! This crate holds the pure, I/O-free part of chartpin:
//! - `SemanticVersion`: parsing and precedence ordering
//! - `Constraint`: range expressions (`^1.2`, `>=1.0, <2`, `1.x || 3.0.0`)
//! - `VersionResolver`: picks the winning version from a raw candidate list
//! - `ErrorKind`: the error taxonomy shared with `chartpin-repo`

pub mod version;
pub mod constraint;
pub mod resolver;
pub mod error;

pub use version::SemanticVersion;
pub use constraint::Constraint;
pub use resolver::{InvalidVersionPolicy, VersionResolver};
pub use error::{ErrorKind, ResolveError};
