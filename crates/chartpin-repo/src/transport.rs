//! HTTP transport for classic repositories
//!
//! [`HttpTransport`] is the seam between the index fetcher and the network,
//! so tests can substitute a fake. [`SecureHttpClient`] is the real one:
//! - redirects are followed by hand, up to a configured limit
//! - credentials are NEVER sent after a cross-origin redirect
//! - non-2xx statuses are returned, not turned into errors, so the caller
//!   can report them with its own context

use async_trait::async_trait;
use url::Url;

use crate::config::Settings;
use crate::credentials::Credentials;
use crate::error::{RepoError, Result};

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Issues GET requests, with optional basic auth
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<HttpResponse>;
}

/// reqwest-backed transport with redirect protection
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct SecureHttpClient {
    client: reqwest::Client,
    max_redirects: u32,
}

impl SecureHttpClient {
    /// Create a new secure HTTP client
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            // Redirects are handled in `get` to keep credentials same-origin
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(settings.user_agent.clone());

        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| RepoError::NetworkError {
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            max_redirects: settings.max_redirects,
        })
    }

    /// Check if two URLs are same-origin (for redirect safety)
    pub fn same_origin(url1: &str, url2: &str) -> bool {
        match (Url::parse(url1), Url::parse(url2)) {
            (Ok(u1), Ok(u2)) => {
                u1.scheme() == u2.scheme()
                    && u1.host() == u2.host()
                    && u1.port_or_known_default() == u2.port_or_known_default()
            }
            _ => false,
        }
    }
}

#[async_trait]
impl HttpTransport for SecureHttpClient {
    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<HttpResponse> {
        let mut current_url = url.to_string();
        let mut redirects = 0;

        loop {
            let mut request = self.client.get(&current_url);

            if let Some(creds) = credentials {
                if Self::same_origin(url, &current_url) {
                    request = request.header(reqwest::header::AUTHORIZATION, creds.basic_auth_header());
                } else {
                    tracing::warn!(
                        "Cross-origin redirect from {} to {} - credentials not forwarded",
                        url,
                        current_url
                    );
                }
            }

            tracing::debug!("GET {}", current_url);
            let response = request.send().await?;
            let status = response.status();

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok());

            if let (true, Some(location)) = (status.is_redirection(), location) {
                redirects += 1;
                if redirects > self.max_redirects {
                    return Err(RepoError::TooManyRedirects {
                        url: url.to_string(),
                        max: self.max_redirects,
                    });
                }

                // Resolve relative locations
                current_url = Url::parse(&current_url)
                    .and_then(|base| base.join(location))
                    .map_err(|e| RepoError::InvalidRedirect {
                        url: current_url.clone(),
                        location: location.to_string(),
                        reason: e.to_string(),
                    })?
                    .to_string();
                continue;
            }

            let body = response.bytes().await?;

            return Ok(HttpResponse {
                status: status.as_u16(),
                body: body.to_vec(),
            });
        }
    }
}
