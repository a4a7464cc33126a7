//! Main client implementation.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::api::{AppsApi, ConverseApi, DevicesApi};
use crate::auth::{AlmondAuth, BearerAuth, LocalAuth, RequestOptions, StaticToken, TokenProvider};
use crate::error::{Error, Result};
use crate::types::ConverseRequest;

/// Almond API client.
///
/// Holds one auth provider and nothing else, so clones are cheap and a
/// single client can serve concurrent tasks.
///
/// # Example
///
/// ```no_run
/// use almond_client::AlmondApi;
///
/// # async fn example() -> almond_client::Result<()> {
/// let client = AlmondApi::builder()
///     .host("https://almond.example.com")
///     .access_token("secret")
///     .build()?;
///
/// let devices = client.list_devices().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AlmondApi {
    auth: Arc<dyn AlmondAuth>,
}

impl AlmondApi {
    /// Wrap an auth provider.
    pub fn new(auth: impl AlmondAuth + 'static) -> Self {
        Self::with_shared(Arc::new(auth))
    }

    /// Wrap an auth provider that is shared elsewhere.
    pub fn with_shared(auth: Arc<dyn AlmondAuth>) -> Self {
        Self { auth }
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client for a server that trusts local callers.
    pub fn local(host: impl Into<String>) -> Result<Self> {
        Self::builder().host(host).local().build()
    }

    /// The auth provider used for every request.
    pub fn auth(&self) -> &Arc<dyn AlmondAuth> {
        &self.auth
    }

    /// Base URL of the server.
    pub fn host(&self) -> &str {
        self.auth.host()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the apps API.
    pub fn apps(&self) -> AppsApi {
        AppsApi::new(self.clone())
    }

    /// Access the devices API.
    pub fn devices(&self) -> DevicesApi {
        DevicesApi::new(self.clone())
    }

    /// Access the conversation API.
    pub fn conversation(&self) -> ConverseApi {
        ConverseApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shortcuts
    // ─────────────────────────────────────────────────────────────────────────

    /// List the apps running on the assistant.
    pub async fn list_apps(&self) -> Result<Value> {
        self.apps().list().await
    }

    /// List configured devices.
    pub async fn list_devices(&self) -> Result<Value> {
        self.devices().list().await
    }

    /// Create a device. See [`DevicesApi::create`].
    pub async fn create_device(&self, config: impl Into<Value>) -> Result<Value> {
        self.devices().create(config).await
    }

    /// Create a device that needs nothing but its kind.
    pub async fn create_simple_device(&self, kind: impl Into<String>) -> Result<Value> {
        self.devices().create_simple(kind).await
    }

    /// Send a converse request and return the assistant's reply.
    pub async fn converse(&self, request: &ConverseRequest) -> Result<Value> {
        self.conversation().send(request).await
    }

    /// Send a natural language message.
    pub async fn converse_text(
        &self,
        text: impl Into<String>,
        conversation_id: Option<&str>,
    ) -> Result<Value> {
        self.conversation().text(text, conversation_id).await
    }

    /// Send a ThingTalk program to be executed.
    pub async fn converse_program(
        &self,
        code: impl Into<String>,
        conversation_id: Option<&str>,
    ) -> Result<Value> {
        self.conversation().program(code, conversation_id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Make a GET request.
    pub(crate) async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, RequestOptions::new()).await
    }

    /// Make a POST request with a JSON body.
    pub(crate) async fn post<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, RequestOptions::new().json(body))
            .await
    }

    async fn send(&self, method: Method, path: &str, options: RequestOptions) -> Result<Value> {
        let response = self.auth.request(method, path, options).await?;
        self.handle_response(response).await
    }

    /// Check the status, then decode the body.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status.as_u16() >= 400 {
            debug!(status = status.as_u16(), url = %response.url(), "Request failed");
            return Err(Error::from_status(status));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

enum AuthMode {
    Local,
    Bearer(Arc<dyn TokenProvider>),
}

/// Builder for creating an [`AlmondApi`].
pub struct ClientBuilder {
    host: Option<String>,
    http: Option<reqwest::Client>,
    auth: AuthMode,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder. Auth defaults to local.
    pub fn new() -> Self {
        Self {
            host: None,
            http: None,
            auth: AuthMode::Local,
            user_agent: None,
        }
    }

    /// Set the server base URL.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Use an existing HTTP client instead of creating one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Set a custom user agent. Ignored when an HTTP client is supplied.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Authenticate as the local-loopback origin.
    pub fn local(mut self) -> Self {
        self.auth = AuthMode::Local;
        self
    }

    /// Authenticate with a fixed bearer token.
    pub fn access_token(self, token: impl Into<String>) -> Self {
        self.token_provider(StaticToken::new(token))
    }

    /// Authenticate with tokens fetched from `provider` before each request.
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.auth = AuthMode::Bearer(Arc::new(provider));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AlmondApi> {
        let host = self
            .host
            .ok_or_else(|| Error::Config("host is required".to_string()))?;

        Url::parse(&host).map_err(|e| Error::Config(format!("invalid host {:?}: {}", host, e)))?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("almond-client/{}", env!("CARGO_PKG_VERSION")));
                reqwest::Client::builder().user_agent(user_agent).build()?
            }
        };

        Ok(match self.auth {
            AuthMode::Local => AlmondApi::new(LocalAuth::new(http, host)),
            AuthMode::Bearer(tokens) => {
                AlmondApi::new(BearerAuth::with_shared(http, host, tokens))
            }
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auth = match self.auth {
            AuthMode::Local => "local",
            AuthMode::Bearer(_) => "bearer",
        };
        f.debug_struct("ClientBuilder")
            .field("host", &self.host)
            .field("http", &self.http.is_some())
            .field("auth", &auth)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_host() {
        let err = ClientBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_rejects_invalid_host() {
        let err = ClientBuilder::new().host("almond").build().unwrap_err();
        assert!(err.to_string().contains("invalid host"));
    }

    #[test]
    fn test_builder_keeps_host_verbatim() {
        let client = ClientBuilder::new()
            .host("http://localhost:3000/")
            .build()
            .unwrap();

        assert_eq!(client.host(), "http://localhost:3000/");
    }

    #[tokio::test]
    async fn test_builder_defaults_to_local() {
        let client = AlmondApi::local("http://localhost:3000").unwrap();
        let headers = client.auth().auth_headers().await.unwrap();
        assert_eq!(headers.get("origin").unwrap(), "http://127.0.0.1:3000");
    }

    #[tokio::test]
    async fn test_builder_access_token() {
        let client = ClientBuilder::new()
            .host("https://almond.example.com")
            .access_token("t0k3n")
            .build()
            .unwrap();

        let headers = client.auth().auth_headers().await.unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer t0k3n");
    }

    #[test]
    fn test_builder_debug_hides_token() {
        let builder = ClientBuilder::new()
            .host("https://almond.example.com")
            .access_token("t0k3n");

        let printed = format!("{:?}", builder);
        assert!(printed.contains("almond.example.com"));
        assert!(printed.contains("bearer"));
        assert!(!printed.contains("t0k3n"));
    }

    #[tokio::test]
    async fn test_local_overrides_earlier_token() {
        let client = ClientBuilder::new()
            .host("https://almond.example.com")
            .access_token("t0k3n")
            .local()
            .build()
            .unwrap();

        let headers = client.auth().auth_headers().await.unwrap();
        assert!(headers.get("authorization").is_none());
    }
}
