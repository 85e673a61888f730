//! Shared HTTP plumbing.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use thiserror::Error;

use digioh_core::config::BackendCredentials;
use digioh_core::secrets::{AccessToken, ApiKey, PROVIDER_SECRET_PATTERNS, scrub_secrets};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client construction and health errors.
#[derive(Error, Debug)]
pub enum BackendError {
    /// HTTP client could not be built or the request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Health endpoint answered with a failure status.
    #[error("Backend unhealthy: {service} returned {status}")]
    Unhealthy {
        /// Which API was probed.
        service: &'static str,
        /// HTTP status code.
        status: u16,
    },
}

/// Client for the auth and table APIs of one backend project.
#[derive(Clone)]
pub struct BackendClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: ApiKey,
}

impl BackendClient {
    /// Create a client from validated credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(credentials: &BackendCredentials) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("digioh/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, credentials))
    }

    /// Create with a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(http: Client, credentials: &BackendCredentials) -> Self {
        Self {
            http,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
        }
    }

    /// Project URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request carrying the project key. Without a user token the key also
    /// serves as the bearer, which is how anonymous table reads are made.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> RequestBuilder {
        let bearer = token.map_or_else(|| self.api_key.expose(), AccessToken::expose);
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", self.api_key.expose())
            .bearer_auth(bearer)
    }

    /// Probe the auth and table APIs.
    ///
    /// # Errors
    ///
    /// Returns `Unhealthy` naming the first API that failed.
    pub async fn health(&self) -> Result<(), BackendError> {
        for (service, path) in [("auth", "/auth/v1/health"), ("rest", "/rest/v1/")] {
            let response = self.request(Method::GET, path, None).send().await?;
            let status = response.status();
            if !status.is_success() {
                tracing::warn!(service, status = status.as_u16(), "Backend health check failed");
                return Err(BackendError::Unhealthy {
                    service,
                    status: status.as_u16(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

/// Transport errors rendered without credentials.
pub(crate) fn scrub(err: &impl std::fmt::Display) -> String {
    scrub_secrets(&err.to_string(), PROVIDER_SECRET_PATTERNS)
}
