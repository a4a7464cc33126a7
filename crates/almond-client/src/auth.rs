//! Request authentication.
//!
//! An [`AlmondAuth`] knows the server host, holds the caller's HTTP client
//! and decides which headers prove who is calling. Two providers ship with
//! the crate:
//!
//! - [`LocalAuth`] marks the caller as the trusted local-loopback origin.
//! - [`BearerAuth`] asks a [`TokenProvider`] for a token on every request.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, ORIGIN};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{BoxError, Error, Result};

/// Origin the server trusts without a bearer token.
pub const LOCAL_ORIGIN: &str = "http://127.0.0.1:3000";

/// Extra parts of an outgoing request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Caller headers. Auth headers are applied on top of these.
    pub headers: HeaderMap,
    /// JSON body, if any.
    pub json: Option<Value>,
}

impl RequestOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: impl Into<Value>) -> Self {
        self.json = Some(body.into());
        self
    }

    /// Add a caller header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ============================================================================
// AlmondAuth Trait
// ============================================================================

/// Authenticated access to an Almond server.
#[async_trait]
pub trait AlmondAuth: Send + Sync + fmt::Debug {
    /// Base URL of the server. Paths are appended verbatim.
    fn host(&self) -> &str;

    /// Transport used to send requests.
    fn http(&self) -> &reqwest::Client;

    /// Headers that authenticate the next request.
    async fn auth_headers(&self) -> Result<HeaderMap>;

    /// Send an authenticated request and return the raw response.
    ///
    /// The URL is `host + path`; `path` should start with `/`. Auth headers
    /// are inserted after the caller's headers, so they win on a name clash.
    /// The status is not checked and the body is not read.
    async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<reqwest::Response> {
        let url = Url::parse(&format!("{}{}", self.host(), path))?;

        let mut headers = options.headers;
        for (name, value) in self.auth_headers().await?.iter() {
            if headers.insert(name.clone(), value.clone()).is_some() {
                warn!(header = %name, "Caller header replaced by auth header");
            }
        }

        debug!(%method, %url, "Sending request");

        let mut builder = self.http().request(method, url).headers(headers);
        if let Some(body) = &options.json {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }
}

// ============================================================================
// LocalAuth
// ============================================================================

/// Auth for callers on the same machine or LAN as the server.
///
/// Sends a fixed `origin` header and never an `Authorization` header.
#[derive(Debug, Clone)]
pub struct LocalAuth {
    http: reqwest::Client,
    host: String,
}

impl LocalAuth {
    /// Create a local provider for `host`.
    pub fn new(http: reqwest::Client, host: impl Into<String>) -> Self {
        Self {
            http,
            host: host.into(),
        }
    }
}

#[async_trait]
impl AlmondAuth for LocalAuth {
    fn host(&self) -> &str {
        &self.host
    }

    fn http(&self) -> &reqwest::Client {
        &self.http
    }

    async fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static(LOCAL_ORIGIN));
        Ok(headers)
    }
}

// ============================================================================
// Token providers
// ============================================================================

/// Source of bearer tokens.
///
/// Called once per request. Refreshing and caching are up to the
/// implementation.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current access token.
    async fn access_token(&self) -> std::result::Result<String, BoxError>;
}

#[async_trait]
impl<F, Fut, E> TokenProvider for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<String, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    async fn access_token(&self) -> std::result::Result<String, BoxError> {
        (self)().await.map_err(Into::into)
    }
}

/// A token that never changes.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a fixed token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> std::result::Result<String, BoxError> {
        Ok(self.0.clone())
    }
}

// ============================================================================
// BearerAuth
// ============================================================================

/// Auth through an `Authorization: Bearer` header.
#[derive(Clone)]
pub struct BearerAuth {
    http: reqwest::Client,
    host: String,
    tokens: Arc<dyn TokenProvider>,
}

impl BearerAuth {
    /// Create a bearer provider that asks `tokens` before every request.
    pub fn new(
        http: reqwest::Client,
        host: impl Into<String>,
        tokens: impl TokenProvider + 'static,
    ) -> Self {
        Self::with_shared(http, host, Arc::new(tokens))
    }

    /// Like [`BearerAuth::new`] with an already shared provider.
    pub fn with_shared(
        http: reqwest::Client,
        host: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            host: host.into(),
            tokens,
        }
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AlmondAuth for BearerAuth {
    fn host(&self) -> &str {
        &self.host
    }

    fn http(&self) -> &reqwest::Client {
        &self.http
    }

    async fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.tokens.access_token().await.map_err(Error::Auth)?;

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::Auth(Box::new(e)))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn http() -> reqwest::Client {
        reqwest::Client::new()
    }

    #[tokio::test]
    async fn test_local_headers() {
        let auth = LocalAuth::new(http(), "http://almond.local");
        let headers = auth.auth_headers().await.unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("origin").unwrap(), "http://127.0.0.1:3000");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_bearer_static_token() {
        let auth = BearerAuth::new(http(), "https://almond.example", StaticToken::new("abc"));
        let headers = auth.auth_headers().await.unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_bearer_asks_provider_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let auth = BearerAuth::new(http(), "https://almond.example", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, BoxError>(format!("token-{}", n)) }
        });

        let first = auth.auth_headers().await.unwrap();
        let second = auth.auth_headers().await.unwrap();

        assert_eq!(first.get(AUTHORIZATION).unwrap(), "Bearer token-0");
        assert_eq!(second.get(AUTHORIZATION).unwrap(), "Bearer token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_bearer_provider_failure() {
        let auth = BearerAuth::new(http(), "https://almond.example", || async {
            Err::<String, _>("session expired")
        });

        let err = auth.auth_headers().await.unwrap_err();
        assert!(err.is_auth_error());
        assert_eq!(err.to_string(), "Authentication failed: session expired");
    }

    #[tokio::test]
    async fn test_bearer_rejects_unprintable_token() {
        let auth = BearerAuth::new(
            http(),
            "https://almond.example",
            StaticToken::new("bad\ntoken"),
        );
        let err = auth.auth_headers().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_request_rejects_bad_url_before_sending() {
        let auth = LocalAuth::new(http(), "not a url");
        let err = auth
            .request(Method::GET, "/api/apps/list", RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = BearerAuth::new(http(), "https://almond.example", StaticToken::new("secret"));
        let printed = format!("{:?}", auth);
        assert!(printed.contains("almond.example"));
        assert!(!printed.contains("secret"));
        assert!(!format!("{:?}", StaticToken::new("secret")).contains("secret"));
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .header(HeaderName::from_static("x-trace"), HeaderValue::from_static("1"))
            .json(serde_json::json!({"kind": "x"}));
        assert_eq!(options.headers.get("x-trace").unwrap(), "1");
        assert_eq!(options.json.unwrap()["kind"], "x");
    }
}
