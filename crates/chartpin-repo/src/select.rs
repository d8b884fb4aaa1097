//! Chart version selection
//!
//! [`ChartVersionSelector`] ties the pieces together: classify the repository
//! URL, fetch the raw version list from the matching source, then pick the
//! greatest version satisfying the constraint.

use std::sync::Arc;
use std::time::Duration;

use chartpin_core::{ErrorKind, VersionResolver};
use thiserror::Error;

use crate::classify::{RepositoryKind, RepositoryReference};
use crate::config::Settings;
use crate::credentials::{CredentialResolver, Credentials, StaticCredentials, host_of};
use crate::error::RepoError;
use crate::http::HttpRepository;
use crate::oci::{self, OciTagClient, TagLister};
use crate::transport::{HttpTransport, SecureHttpClient};

/// Stage of a selection that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RetrievingVersions,
    DeterminingLatestVersion,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RetrievingVersions => write!(f, "retrieving versions"),
            Self::DeterminingLatestVersion => write!(f, "determining latest version"),
        }
    }
}

/// A failed selection, with the chart and repository it was for
///
/// Credentials are never part of this error.
#[derive(Debug, Error)]
#[error("error {operation} of chart {chart:?} from repository {repo_url:?}")]
pub struct SelectError {
    pub operation: Operation,
    pub chart: String,
    pub repo_url: String,
    #[source]
    pub source: RepoError,
}

impl SelectError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Selects the newest chart version matching a constraint
#[derive(Clone)]
pub struct ChartVersionSelector {
    http: HttpRepository,
    tags: Arc<dyn TagLister>,
    resolver: VersionResolver,
    tag_page_size: usize,
    timeout: Option<Duration>,
}

impl ChartVersionSelector {
    /// Selector over the real network transports
    pub fn new(settings: &Settings) -> Result<Self, RepoError> {
        settings.validate()?;
        let http = SecureHttpClient::new(settings)?;
        let tags = OciTagClient::new(settings);
        Ok(Self::with_transports(settings, Arc::new(http), Arc::new(tags)))
    }

    /// Selector over caller-supplied transports
    pub fn with_transports(
        settings: &Settings,
        http: Arc<dyn HttpTransport>,
        tags: Arc<dyn TagLister>,
    ) -> Self {
        Self {
            http: HttpRepository::new(http),
            tags,
            resolver: VersionResolver::new(settings.invalid_versions),
            tag_page_size: settings.tag_page_size,
            timeout: settings.timeout(),
        }
    }

    /// Override the fetch deadline (`None` disables it)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Greatest version of `chart` in `repo_url` satisfying `constraint`
    ///
    /// An empty constraint selects the greatest version outright. `Ok(None)`
    /// means versions exist but none satisfies the constraint. For `oci://`
    /// URLs the URL names the chart and `chart` is ignored.
    pub async fn select_version(
        &self,
        repo_url: &str,
        chart: &str,
        constraint: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Option<String>, SelectError> {
        let resolver = StaticCredentials::new(credentials.cloned());
        self.select_version_with(repo_url, chart, constraint, &resolver)
            .await
    }

    /// Like [`select_version`](Self::select_version), looking credentials
    /// up per host
    pub async fn select_version_with(
        &self,
        repo_url: &str,
        chart: &str,
        constraint: &str,
        credentials: &dyn CredentialResolver,
    ) -> Result<Option<String>, SelectError> {
        let wrap = |operation: Operation| {
            move |source: RepoError| SelectError {
                operation,
                chart: chart.to_string(),
                repo_url: repo_url.to_string(),
                source,
            }
        };

        let repo = RepositoryReference::new(repo_url, chart)
            .map_err(wrap(Operation::RetrievingVersions))?;

        let versions = self
            .fetch_versions(&repo, credentials)
            .await
            .map_err(wrap(Operation::RetrievingVersions))?;

        let selected = self
            .resolver
            .resolve(versions.as_slice(), constraint)
            .map_err(|e| wrap(Operation::DeterminingLatestVersion)(e.into()))?;

        match &selected {
            Some(version) => tracing::info!("Selected {} {} from {}", chart, version, repo_url),
            None => tracing::info!(
                "No version of {} in {} satisfies {:?}",
                chart,
                repo_url,
                constraint
            ),
        }

        Ok(selected)
    }

    /// Raw version list of a classified repository, within the deadline
    pub async fn fetch_versions(
        &self,
        repo: &RepositoryReference,
        credentials: &dyn CredentialResolver,
    ) -> Result<Vec<String>, RepoError> {
        let fetch = async {
            match (repo.kind(), repo.chart()) {
                (RepositoryKind::ClassicHttp, Some(chart)) => {
                    let creds = match host_of(repo.url()) {
                        Some(host) => credentials.resolve_credential(&host)?,
                        None => None,
                    };
                    self.http
                        .chart_versions(repo.url(), chart, creds.as_ref())
                        .await
                }
                (RepositoryKind::ClassicHttp, None) => Err(RepoError::ChartNameRequired {
                    url: repo.url().to_string(),
                }),
                (RepositoryKind::Oci, _) => {
                    oci::fetch_tags(
                        self.tags.as_ref(),
                        repo.url(),
                        credentials,
                        self.tag_page_size,
                    )
                    .await
                }
            }
        };

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .map_err(|_| RepoError::Timeout {
                    seconds: timeout.as_secs(),
                })?,
            None => fetch.await,
        }
    }
}

impl std::fmt::Debug for ChartVersionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartVersionSelector")
            .field("resolver", &self.resolver)
            .field("tag_page_size", &self.tag_page_size)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// One-shot selection with default settings
pub async fn select_version(
    repo_url: &str,
    chart: &str,
    constraint: &str,
    credentials: Option<&Credentials>,
) -> Result<Option<String>, SelectError> {
    let selector = ChartVersionSelector::new(&Settings::default()).map_err(|source| SelectError {
        operation: Operation::RetrievingVersions,
        chart: chart.to_string(),
        repo_url: repo_url.to_string(),
        source,
    })?;
    selector
        .select_version(repo_url, chart, constraint, credentials)
        .await
}
