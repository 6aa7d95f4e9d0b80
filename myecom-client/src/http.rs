use reqwest::{Client, Method, RequestBuilder, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("myecom-client/", env!("CARGO_PKG_VERSION"));

/// Thin request wrapper: base URL plus the process-wide bearer credential.
///
/// Clones share the credential slot, so every [`crate::ApiClient`] handed out
/// by the application sees the token the session store last installed.
#[derive(Clone)]
pub struct HttpAdapter {
    base_url: Url,
    client: Client,
    bearer: Arc<Mutex<Option<String>>>,
}

impl fmt::Debug for HttpAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAdapter")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.has_auth_token())
            .finish_non_exhaustive()
    }
}

impl HttpAdapter {
    /// Create an adapter rooted at `base_url` (normally `<origin>/api/`).
    ///
    /// # Errors
    /// Returns [`ClientError::Network`] if the TLS backend cannot be initialised.
    pub fn new(base_url: Url, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create an adapter around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(mut base_url: Url, client: Client) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            client,
            bearer: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Install or remove the bearer credential for all later requests.
    pub(crate) fn set_auth_token(&self, token: Option<&str>) {
        let mut slot = self.bearer.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = token.map(str::to_string);
    }

    /// `true` while a bearer credential is installed.
    #[must_use]
    pub fn has_auth_token(&self) -> bool {
        self.bearer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_token(&self) -> Option<String> {
        self.bearer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Start a request for `path`, relative to the base URL.
    pub(crate) fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.url(path)?;
        debug!(%method, %url, "issuing request");
        let builder = self.client.request(method, url);
        Ok(match self.current_token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        })
    }

    /// Send a request and return the body of a 2xx response.
    async fn execute(&self, builder: RequestBuilder) -> ClientResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            debug!(%status, "request rejected");
            Err(ClientError::from_status(status, &body))
        }
    }

    /// Send a request and decode a JSON response body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ClientResult<T> {
        let body = self.execute(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        self.execute(builder).await.map(|_| ())
    }
}
