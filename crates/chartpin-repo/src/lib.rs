//! Chart version discovery
//!
//! This crate finds the newest published version of a chart that satisfies a
//! semantic-version constraint, in either kind of chart repository:
//!
//! - **HTTP repositories**: Traditional Helm-style repos with index.yaml
//! - **OCI registries**: Tags of a repository in GHCR, ECR, Harbor, etc.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chartpin_repo::{ChartVersionSelector, Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let selector = ChartVersionSelector::new(&Settings::load()?)?;
//!
//! let version = selector
//!     .select_version("https://charts.bitnami.com/bitnami", "nginx", "^15.0.0", None)
//!     .await?;
//! println!("{:?}", version);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Notes
//!
//! - Credentials are NEVER sent after cross-origin redirects
//! - Credentials never appear in errors or `Debug` output

pub mod error;
pub mod classify;
pub mod config;
pub mod credentials;
pub mod transport;
pub mod index;
pub mod http;
pub mod oci;
pub mod select;
pub mod dependency;

// Re-exports for convenience
pub use error::{RepoError, Result};
pub use classify::{RepositoryKind, RepositoryReference};
pub use config::Settings;
pub use credentials::{
    CredentialChain, CredentialResolver, CredentialSource, CredentialStore, Credentials,
    DockerConfig, StaticCredentials,
};
pub use transport::{HttpResponse, HttpTransport, SecureHttpClient};
pub use index::RepositoryIndex;
pub use http::HttpRepository;
pub use oci::{OciReference, OciTagClient, TagLister};
pub use select::{ChartVersionSelector, Operation, SelectError, select_version};
pub use dependency::{DependencyUpdater, update_chart_dependencies};
