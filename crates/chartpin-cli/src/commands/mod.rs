//! CLI commands

pub mod select;
pub mod dep;
