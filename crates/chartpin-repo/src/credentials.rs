//! Credentials and per-host credential resolution
//!
//! Key points:
//! - [`Credentials`] never prints its password, not even through `Debug`
//! - Lookup goes through the [`CredentialResolver`] capability, keyed by
//!   registry host, so callers can plug in their own policy
//! - [`CredentialStore`] (YAML) and [`DockerConfig`] (`~/.docker/config.json`)
//!   are the two file-backed resolvers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{RepoError, Result};

/// Username/password pair for basic auth or a registry credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Authorization` header value for HTTP basic auth
    pub fn basic_auth_header(&self) -> String {
        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{}:{}", self.username, self.password),
        );
        format!("Basic {}", encoded)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolves credentials for a registry or repository host
///
/// `host` includes the port when the URL has one (`localhost:5000`).
/// `Ok(None)` means anonymous access.
pub trait CredentialResolver: Send + Sync {
    fn resolve_credential(&self, host: &str) -> Result<Option<Credentials>>;
}

/// The same credentials (or none) for every host
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(Option<Credentials>);

impl StaticCredentials {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self(credentials)
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CredentialResolver for StaticCredentials {
    fn resolve_credential(&self, _host: &str) -> Result<Option<Credentials>> {
        Ok(self.0.clone())
    }
}

/// Tries each resolver in order; the first hit wins
#[derive(Default)]
pub struct CredentialChain {
    resolvers: Vec<Box<dyn CredentialResolver>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl CredentialResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }
}

impl CredentialResolver for CredentialChain {
    fn resolve_credential(&self, host: &str) -> Result<Option<Credentials>> {
        for resolver in &self.resolvers {
            if let Some(creds) = resolver.resolve_credential(host)? {
                return Ok(Some(creds));
            }
        }
        Ok(None)
    }
}

/// Host (with port, if any) of a repository URL
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Where stored credentials come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CredentialSource {
    /// Inline username/password
    Basic { username: String, password: String },

    /// Environment variable references (CI/CD friendly)
    Env {
        username_var: String,
        password_var: String,
    },
}

impl CredentialSource {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        CredentialSource::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_env(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        CredentialSource::Env {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    /// Resolve to actual values
    pub fn resolve(&self) -> Result<Credentials> {
        match self {
            CredentialSource::Basic { username, password } => {
                Ok(Credentials::new(username.clone(), password.clone()))
            }
            CredentialSource::Env {
                username_var,
                password_var,
            } => {
                let read = |var: &str| {
                    std::env::var(var).map_err(|_| RepoError::CredentialsUnavailable {
                        message: format!("environment variable {} not set", var),
                    })
                };
                Ok(Credentials::new(read(username_var)?, read(password_var)?))
            }
        }
    }
}

/// Credential store - credentials keyed by host or repository URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default)]
    credentials: HashMap<String, CredentialSource>,
}

impl CredentialStore {
    /// Load credential store from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let store: Self = serde_yaml::from_str(&content)?;
        Ok(store)
    }

    /// Save to specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;

        // Owner-only permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true).mode(0o600);
            std::io::Write::write_all(&mut options.open(path)?, content.as_bytes())?;
            Ok(())
        }

        #[cfg(not(unix))]
        {
            std::fs::write(path, content)?;
            Ok(())
        }
    }

    /// Get default credential store path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("chartpin").join("credentials.yaml"))
    }

    /// Store credentials under a host (`ghcr.io`) or URL (`https://charts.example.com`)
    pub fn set(&mut self, key: &str, source: CredentialSource) {
        self.credentials
            .insert(key.trim_end_matches('/').to_string(), source);
    }

    pub fn get(&self, key: &str) -> Option<&CredentialSource> {
        self.credentials.get(key.trim_end_matches('/'))
    }

    pub fn remove(&mut self, key: &str) -> Option<CredentialSource> {
        self.credentials.remove(key.trim_end_matches('/'))
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl CredentialResolver for CredentialStore {
    fn resolve_credential(&self, host: &str) -> Result<Option<Credentials>> {
        if let Some(source) = self.credentials.get(host) {
            return source.resolve().map(Some);
        }

        // Entries keyed by URL match on their host
        let by_url = self
            .credentials
            .iter()
            .filter(|(key, _)| key.contains("://"))
            .find(|(key, _)| host_of(key).as_deref() == Some(host));

        by_url.map(|(_, source)| source.resolve()).transpose()
    }
}

/// Docker config.json format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, DockerAuth>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DockerAuth {
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for DockerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl DockerConfig {
    /// Load Docker config from default or specified path
    ///
    /// A missing file is an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let home = dirs::home_dir().ok_or_else(|| RepoError::InvalidConfig {
                    message: "could not determine home directory".to_string(),
                })?;
                home.join(".docker").join("config.json")
            }
        };

        if !config_path.exists() {
            return Ok(DockerConfig::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: DockerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Credentials for a registry host
    pub fn credentials_for_host(&self, host: &str) -> Option<Credentials> {
        // Try exact match first, then registry variations
        let candidates = [
            host.to_string(),
            format!("https://{}", host),
            format!("http://{}", host),
        ];

        candidates
            .iter()
            .find_map(|candidate| self.auths.get(candidate))
            .and_then(DockerAuth::credentials)
    }
}

impl DockerAuth {
    fn credentials(&self) -> Option<Credentials> {
        if let (Some(u), Some(p)) = (&self.username, &self.password) {
            return Some(Credentials::new(u.clone(), p.clone()));
        }

        let encoded = self.auth.as_ref()?;
        let decoded =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, pass) = decoded.split_once(':')?;
        Some(Credentials::new(user, pass))
    }
}

impl CredentialResolver for DockerConfig {
    fn resolve_credential(&self, host: &str) -> Result<Option<Credentials>> {
        Ok(self.credentials_for_host(host))
    }
}
