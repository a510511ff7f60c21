//! NiFi bearer token exchange.
//!
//! NiFi trades a username and password for a token at
//! `POST /nifi-api/access/token`. The token comes back as plain text with
//! status 201.

use parking_lot::Mutex;
use reqwest::StatusCode;
use tracing::debug;

use crate::auth::{BearerToken, Credentials};
use crate::client::HttpJsonClient;
use crate::AdapterError;

/// Path segments of the token endpoint.
pub const TOKEN_PATH: &[&str] = &["nifi-api", "access", "token"];

/// Obtains bearer tokens for one NiFi endpoint.
///
/// By default every call to [`get_token`](Self::get_token) performs a fresh
/// exchange. With caching enabled the first token is reused until
/// [`invalidate`](Self::invalidate) is called.
#[derive(Debug)]
pub struct TokenProvider {
    client: HttpJsonClient,
    credentials: Credentials,
    cache: Option<Mutex<Option<BearerToken>>>,
}

impl TokenProvider {
    pub fn new(client: HttpJsonClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            cache: None,
        }
    }

    /// Reuse the first issued token across calls.
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(|| Mutex::new(None));
        self
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Return a token, exchanging credentials unless a cached one exists.
    pub async fn get_token(&self) -> Result<BearerToken, AdapterError> {
        if let Some(token) = self.cache.as_ref().and_then(|c| c.lock().clone()) {
            debug!("reusing cached NiFi token");
            return Ok(token);
        }

        let token = fetch_token(&self.client, &self.credentials).await?;

        if let Some(cache) = &self.cache {
            *cache.lock() = Some(token.clone());
        }

        Ok(token)
    }

    /// Forget the cached token, if any.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().take();
        }
    }
}

/// Exchange credentials for a token against the client's endpoint.
pub async fn fetch_token(
    client: &HttpJsonClient,
    credentials: &Credentials,
) -> Result<BearerToken, AdapterError> {
    let url = client.url(TOKEN_PATH);
    let (status, text) = client
        .post_form(
            url.clone(),
            &[
                ("username", credentials.username()),
                ("password", credentials.password()),
            ],
        )
        .await?;

    if status != StatusCode::CREATED {
        return Err(AdapterError::Auth(format!(
            "(POST) token request to {} returned status {}",
            url,
            status.as_u16()
        )));
    }

    let token = text.trim();
    if token.is_empty() {
        return Err(AdapterError::Auth(format!(
            "token endpoint {} returned an empty token",
            url
        )));
    }

    debug!(user = credentials.username(), "obtained NiFi token");
    Ok(BearerToken::new(token))
}
