//! The REST client: base URL, credential, transport.

use crate::config::RestConfig;
use crate::error::{RestError, RestResult};
use crate::monitor::RequestHook;
use crate::qb::{Many, QueryBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;
use url::Url;

const APIKEY: &str = "apikey";

/// Immutable handle to one PostgREST endpoint.
///
/// Cloning is cheap. Each [`from`](Self::from) call returns an independent
/// builder; nothing is cached or shared between requests, and idle
/// connections are not kept around.
///
/// # Example
///
/// ```ignore
/// let client = pgrest::RestClient::from_env()?;
///
/// let contacts = client
///     .from("crm_contacts")
///     .select("*")
///     .order_desc("created_at")
///     .limit(200)
///     .execute()
///     .await?;
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

#[derive(Clone)]
struct RestClientInner {
    rest_root: Url,
    api_key: HeaderValue,
    bearer: HeaderValue,
    http: reqwest::Client,
    hook: Option<Arc<dyn RequestHook>>,
}

impl RestClient {
    /// Create a client, failing fast on an empty URL or key.
    pub fn new(config: RestConfig) -> RestResult<Self> {
        config.validate()?;

        let rest_root = Url::parse(&config.rest_root())
            .map_err(|e| RestError::config(format!("invalid project URL {:?}: {e}", config.url)))?;
        if rest_root.cannot_be_a_base() {
            return Err(RestError::config(format!(
                "project URL {:?} cannot be a base URL",
                config.url
            )));
        }

        let mut api_key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| RestError::config("service key contains invalid header characters"))?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| RestError::config("service key contains invalid header characters"))?;
        bearer.set_sensitive(true);

        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RestError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(RestClientInner {
                rest_root,
                api_key,
                bearer,
                http,
                hook: None,
            }),
        })
    }

    /// Create a client from `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn from_env() -> RestResult<Self> {
        Self::new(RestConfig::from_env()?)
    }

    /// Attach a request hook.
    pub fn with_hook(self, hook: impl RequestHook + 'static) -> Self {
        let mut inner = (*self.inner).clone();
        inner.hook = Some(Arc::new(hook));
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Start a query against `table`.
    pub fn from(&self, table: &str) -> QueryBuilder<Many> {
        QueryBuilder::new(self.clone(), table)
    }

    /// Root of the REST API, e.g. `https://abc.supabase.co/rest/v1`.
    pub fn rest_root(&self) -> &str {
        self.inner.rest_root.as_str()
    }

    pub(crate) fn table_url(&self, table: &str) -> RestResult<Url> {
        let mut url = self.inner.rest_root.clone();
        url.path_segments_mut()
            .map_err(|_| RestError::config("project URL cannot be a base URL"))?
            .pop_if_empty()
            .push(table);
        Ok(url)
    }

    /// `apikey`, `Authorization` and `Content-Type`, sent with every request.
    pub(crate) fn standard_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(APIKEY, self.inner.api_key.clone());
        headers.insert(AUTHORIZATION, self.inner.bearer.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn hook(&self) -> Option<&dyn RequestHook> {
        self.inner.hook.as_deref()
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("rest_root", &self.inner.rest_root.as_str())
            .field("hook", &self.inner.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_missing_credentials() {
        let err = RestClient::new(RestConfig::new("", "key")).unwrap_err();
        assert!(matches!(err, RestError::Config(_)));

        let err = RestClient::new(RestConfig::new("https://abc.supabase.co", "")).unwrap_err();
        assert!(matches!(err, RestError::Config(_)));
    }

    #[test]
    fn new_rejects_bad_url() {
        let err = RestClient::new(RestConfig::new("not a url", "key")).unwrap_err();
        assert!(matches!(err, RestError::Config(_)));
    }

    #[test]
    fn table_url_appends_segment() {
        let client = RestClient::new(RestConfig::new("https://abc.supabase.co/", "key")).unwrap();
        assert_eq!(client.rest_root(), "https://abc.supabase.co/rest/v1");
        let url = client.table_url("crm_contacts").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/crm_contacts");
    }

    #[test]
    fn standard_headers_reuse_the_key() {
        let client = RestClient::new(RestConfig::new("http://localhost:3000", "secret")).unwrap();
        let headers = client.standard_headers();
        assert_eq!(headers.get("apikey").unwrap(), "secret");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn debug_hides_key() {
        let client = RestClient::new(RestConfig::new("http://localhost:3000", "secret")).unwrap();
        assert!(!format!("{client:?}").contains("secret"));
    }
}
