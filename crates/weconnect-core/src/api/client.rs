//! HTTP client wrapper for the WeConnect REST API.
//!
//! `ApiClient` owns a configured `reqwest::Client` and an injected
//! `TokenStore`. Every outgoing request except login and registration
//! reads the store at send time and carries `Authorization: Bearer <token>`
//! when a credential is held.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::{Credential, TokenStore};
use crate::config::Config;

use super::ApiError;

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API client for the WeConnect backend.
/// Clone is cheap - reqwest::Client and the store are both reference counted.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, store, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL {:?}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "unsupported URL scheme {:?}",
                parsed.scheme()
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            store,
        })
    }

    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::with_timeout(
            &config.base_url,
            store,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(credential: Option<&Credential>) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(credential) = credential {
            let mut value = header::HeaderValue::from_str(&credential.bearer()).map_err(|_| {
                ApiError::Config("stored credential is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Attach the current credential and send.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Sent, ApiError> {
        let credential = self.store.get();
        let request = request.headers(Self::auth_headers(credential.as_ref())?);
        self.execute(request, credential).await
    }

    /// Send without any credential, for endpoints that issue or create one.
    pub(crate) async fn send_anonymous(&self, request: RequestBuilder) -> Result<Sent, ApiError> {
        self.execute(request, None).await
    }

    async fn execute(&self, request: RequestBuilder, credential: Option<Credential>) -> Result<Sent, ApiError> {
        let request = request.build()?;
        debug!(
            method = %request.method(),
            path = request.url().path(),
            authorized = credential.is_some(),
            "Sending request"
        );
        let response = self.client.execute(request).await?;
        debug!(status = response.status().as_u16(), "Response received");
        Ok(Sent { response, credential })
    }

    /// Drop the credential a rejected request carried.
    ///
    /// A credential stored after the request went out is kept.
    fn expire_session(&self, rejected: Option<&Credential>) {
        match rejected {
            Some(credential) if self.store.clear_if(credential) => {
                warn!("Backend rejected the session token, clearing it");
            }
            Some(_) => debug!("Ignoring rejection of a credential that was already replaced"),
            None => {}
        }
    }

    /// Pass through a successful response, otherwise map it to an error.
    ///
    /// `classify` sees rejections first so an operation can name its own
    /// conflicts; anything it declines falls back to `ApiError::from_status`.
    pub(crate) async fn check_response<F>(&self, sent: Sent, classify: F) -> Result<Response, ApiError>
    where
        F: FnOnce(StatusCode, &str) -> Option<ApiError>,
    {
        let Sent { response, credential } = sent;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if let Some(err) = classify(status, &body) {
            return Err(err);
        }
        let err = ApiError::from_status(status, &body);
        if err.is_unauthorized() {
            self.expire_session(credential.as_ref());
        }
        Err(err)
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let path = response.url().path().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let sent = self.send(self.request(Method::GET, path)).await?;
        let response = self.check_response(sent, no_override).await?;
        Self::decode(response).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let sent = self.send(self.request(Method::GET, path).query(query)).await?;
        let response = self.check_response(sent, no_override).await?;
        Self::decode(response).await
    }

    pub(crate) async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let sent = self.send(self.request(method, path).json(body)).await?;
        let response = self.check_response(sent, no_override).await?;
        Self::decode(response).await
    }

    /// Bodiless request whose success carries no payload (likes, follows, deletes).
    pub(crate) async fn action<F>(&self, method: Method, path: &str, classify: F) -> Result<(), ApiError>
    where
        F: FnOnce(StatusCode, &str) -> Option<ApiError>,
    {
        let sent = self.send(self.request(method, path)).await?;
        self.check_response(sent, classify).await?;
        Ok(())
    }
}

/// A response together with the credential its request carried.
pub(crate) struct Sent {
    response: Response,
    credential: Option<Credential>,
}

pub(crate) fn no_override(_: StatusCode, _: &str) -> Option<ApiError> {
    None
}
