//! OCI registry tag listing
//!
//! A chart in an OCI registry is one repository; its published versions are
//! its tags. Tags are listed page by page through the distribution API
//! (`/v2/<repo>/tags/list?n=<n>&last=<last>`).

use async_trait::async_trait;
use oci_distribution::Reference;
use oci_distribution::client::{Client, ClientConfig, ClientProtocol};
use oci_distribution::secrets::RegistryAuth;

use crate::config::Settings;
use crate::credentials::{CredentialResolver, Credentials};
use crate::error::{RepoError, Result};

/// Parsed `oci://registry/repository[:tag][@digest]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciReference {
    pub registry: String,
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl OciReference {
    /// Parse an OCI reference string
    ///
    /// Accepts the reference with or without the `oci://` scheme. Errors name
    /// the input exactly as given.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| RepoError::InvalidOciReference {
            reference: s.to_string(),
            reason: reason.to_string(),
        };

        let clean = s.trim_start_matches("oci://").trim_end_matches('/');

        // Split registry from path
        let (registry, rest) = clean
            .split_once('/')
            .ok_or_else(|| invalid("expected <registry>/<repository>"))?;

        if registry.is_empty() {
            return Err(invalid("registry host is empty"));
        }

        let (repo_tag, digest) = match rest.rsplit_once('@') {
            Some((repo_tag, digest)) => (repo_tag, Some(digest.to_string())),
            None => (rest, None),
        };

        // A ':' in the last path segment separates the tag
        let (repository, tag) = match repo_tag.rsplit_once(':') {
            Some((r, t)) if !t.contains('/') => (r, Some(t.to_string())),
            _ => (repo_tag, None),
        };

        if repository.is_empty() {
            return Err(invalid("repository path is empty"));
        }

        let reference = Self {
            registry: registry.to_string(),
            repository: repository.to_string(),
            tag,
            digest,
        };

        // Full grammar check (lowercase path components, tag charset, digest form)
        Reference::try_from(reference.to_oci_string().as_str())
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(reference)
    }

    /// Convert to string representation
    pub fn to_oci_string(&self) -> String {
        let mut s = format!("{}/{}", self.registry, self.repository);
        if let Some(tag) = &self.tag {
            s.push(':');
            s.push_str(tag);
        }
        if let Some(digest) = &self.digest {
            s.push('@');
            s.push_str(digest);
        }
        s
    }

    /// Client reference for repository-level calls; the tag is irrelevant there
    fn to_reference(&self) -> Reference {
        Reference::with_tag(
            self.registry.clone(),
            self.repository.clone(),
            self.tag.clone().unwrap_or_else(|| "latest".to_string()),
        )
    }
}

/// Lists one page of tags for a repository
#[async_trait]
pub trait TagLister: Send + Sync {
    /// Up to `page_size` tags following `last`, in registry order
    async fn list_tags_page(
        &self,
        reference: &OciReference,
        credentials: Option<&Credentials>,
        page_size: usize,
        last: Option<&str>,
    ) -> Result<Vec<String>>;
}

/// `oci-distribution` backed tag lister
///
/// Only the protocol settings are kept. A `Client` remembers the first auth
/// it used for a registry, so each request gets a fresh one and the caller's
/// credentials always apply.
#[derive(Debug, Clone)]
pub struct OciTagClient {
    protocol: ClientProtocol,
}

impl OciTagClient {
    pub fn new(settings: &Settings) -> Self {
        let protocol = if settings.insecure_registries.is_empty() {
            ClientProtocol::Https
        } else {
            ClientProtocol::HttpsExcept(settings.insecure_registries.clone())
        };

        Self { protocol }
    }

    fn client(&self) -> Client {
        Client::new(ClientConfig {
            protocol: self.protocol.clone(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl TagLister for OciTagClient {
    async fn list_tags_page(
        &self,
        reference: &OciReference,
        credentials: Option<&Credentials>,
        page_size: usize,
        last: Option<&str>,
    ) -> Result<Vec<String>> {
        let auth = match credentials {
            Some(creds) => RegistryAuth::Basic(creds.username.clone(), creds.password.clone()),
            None => RegistryAuth::Anonymous,
        };

        let response = self
            .client()
            .list_tags(&reference.to_reference(), &auth, Some(page_size), last)
            .await
            .map_err(|e| RepoError::OciError {
                message: format!("failed to list tags of {}: {}", reference.to_oci_string(), e),
            })?;

        Ok(response.tags)
    }
}

/// Every tag of the repository at `url`, in registry order
///
/// Credentials are looked up by registry host; none means anonymous access.
/// Paging stops on an empty page or on a page that ends on the same tag as
/// the one before it. A short page does not end the listing: registries may
/// cap `n` below `page_size`.
pub async fn fetch_tags(
    lister: &dyn TagLister,
    url: &str,
    resolver: &dyn CredentialResolver,
    page_size: usize,
) -> Result<Vec<String>> {
    let reference = OciReference::parse(url)?;
    if reference.tag.is_some() || reference.digest.is_some() {
        tracing::debug!("Ignoring tag/digest of {} while listing versions", url);
    }

    let credentials = resolver.resolve_credential(&reference.registry)?;
    let page_size = page_size.max(1);

    let mut tags = Vec::new();
    let mut last: Option<String> = None;

    loop {
        let page = lister
            .list_tags_page(&reference, credentials.as_ref(), page_size, last.as_deref())
            .await?;

        let Some(page_last) = page.last().cloned() else {
            break;
        };
        if last.as_deref() == Some(page_last.as_str()) {
            tracing::warn!(
                "Registry returned the same page twice for {}; stopping",
                reference.to_oci_string()
            );
            break;
        }

        tags.extend(page);
        last = Some(page_last);
    }

    tracing::debug!(
        "Listed {} tags for {}",
        tags.len(),
        reference.to_oci_string()
    );
    Ok(tags)
}
