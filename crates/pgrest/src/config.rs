//! Client configuration.

use crate::error::{RestError, RestResult};
use std::time::Duration;

/// Environment variable holding the project URL.
pub const ENV_URL: &str = "SUPABASE_URL";
/// Environment variable holding the service credential.
pub const ENV_SERVICE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
/// Optional environment variable holding a request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PGREST_TIMEOUT_SECS";

/// Path under the project URL where the REST API is mounted.
pub const DEFAULT_REST_PATH: &str = "/rest/v1";

/// Configuration for [`RestClient`](crate::RestClient).
///
/// By default there is no request timeout: a hung request stays pending
/// until the transport gives up.
#[derive(Clone)]
pub struct RestConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Service credential, sent both as `apikey` and as a bearer token.
    pub service_key: String,
    /// REST mount path appended to `url`.
    pub rest_path: String,
    /// Total request timeout. `None` means no timeout (default).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: String,
}

impl RestConfig {
    /// Create a configuration with the given URL and credential.
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            rest_path: DEFAULT_REST_PATH.to_string(),
            timeout: None,
            user_agent: format!("pgrest/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// Fails with [`RestError::Config`] when the URL or the key is missing.
    pub fn from_env() -> RestResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RestResult<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let url = non_empty(ENV_URL)
            .ok_or_else(|| RestError::config(format!("{ENV_URL} is not set")))?;
        let key = non_empty(ENV_SERVICE_KEY)
            .ok_or_else(|| RestError::config(format!("{ENV_SERVICE_KEY} is not set")))?;

        let mut config = Self::new(url, key);
        if let Some(raw) = non_empty(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                RestError::config(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Override the REST mount path.
    pub fn rest_path(mut self, path: impl Into<String>) -> Self {
        self.rest_path = path.into();
        self
    }

    /// Set the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check that the URL and key are present.
    pub fn validate(&self) -> RestResult<()> {
        if self.url.trim().is_empty() {
            return Err(RestError::config("project URL is empty"));
        }
        if self.service_key.trim().is_empty() {
            return Err(RestError::config("service key is empty"));
        }
        Ok(())
    }

    /// Root of the REST API: `url` without trailing slash, plus `rest_path`.
    pub fn rest_root(&self) -> String {
        let base = self.url.trim_end_matches('/');
        let path = self.rest_path.trim_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("rest_path", &self.rest_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}
