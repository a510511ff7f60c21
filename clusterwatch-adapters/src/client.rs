//! Authenticated HTTP client for JSON management APIs.
//!
//! Every adapter goes through [`HttpJsonClient`]: it appends percent-encoded
//! path segments to the base endpoint, attaches the requested [`Auth`],
//! checks the status code and parses the body as JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clusterwatch_adapters::{Auth, Credentials, HttpJsonClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpJsonClient::builder()
//!         .endpoint("https://ambari.example.com:8443")
//!         .ca_bundle("/etc/pki/cluster-bundle.pem")
//!         .build()?;
//!
//!     let auth = Auth::Basic(Credentials::new("admin", "admin"));
//!     let url = client.url(&["api", "v1", "clusters"]);
//!     let clusters = client.get(url, &auth).await?;
//!     println!("{}", clusters);
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONNECTION};
use reqwest::{Certificate, Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Auth;
use crate::AdapterError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one management API endpoint.
///
/// Holds no session state besides the connection pool and TLS settings;
/// authentication is supplied per request.
#[derive(Debug, Clone)]
pub struct HttpJsonClient {
    client: Client,
    base: Url,
}

impl HttpJsonClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HttpJsonClientBuilder {
        HttpJsonClientBuilder::default()
    }

    /// The base endpoint, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// URL of the resource below the endpoint named by `segments`.
    ///
    /// Each segment is percent-encoded, so ids containing `/`, `?` or `#`
    /// stay inside their segment.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Like [`url`](Self::url), with form-encoded query pairs appended.
    pub fn url_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.url(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Perform a request and return the parsed JSON body.
    ///
    /// Only 200 and 201 count as success; anything else is returned as
    /// [`AdapterError::HttpStatus`] without retrying.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        auth: &Auth,
        body: Option<&Value>,
    ) -> Result<Value, AdapterError> {
        debug!(%method, %url, "sending request");

        let mut builder = apply_auth(self.client.request(method.clone(), url.clone()), auth);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        check_status(&method, url.as_str(), response.status())?;

        let text = response.text().await?;
        parse_body(url.as_str(), &text)
    }

    pub async fn get(&self, url: Url, auth: &Auth) -> Result<Value, AdapterError> {
        self.request(Method::GET, url, auth, None).await
    }

    pub async fn post(&self, url: Url, auth: &Auth, body: &Value) -> Result<Value, AdapterError> {
        self.request(Method::POST, url, auth, Some(body)).await
    }

    pub async fn put(&self, url: Url, auth: &Auth, body: &Value) -> Result<Value, AdapterError> {
        self.request(Method::PUT, url, auth, Some(body)).await
    }

    pub async fn delete(&self, url: Url, auth: &Auth) -> Result<Value, AdapterError> {
        self.request(Method::DELETE, url, auth, None).await
    }

    /// GET a URL and decode the body into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, url: Url, auth: &Auth) -> Result<T, AdapterError> {
        let label = url.to_string();
        let value = self.get(url, auth).await?;
        decode(&label, value)
    }

    /// POST a form-encoded body and return the status with the raw text.
    ///
    /// The status is not checked; used for endpoints that answer with
    /// plain text rather than JSON.
    pub async fn post_form(
        &self,
        url: Url,
        form: &[(&str, &str)],
    ) -> Result<(StatusCode, String), AdapterError> {
        debug!(method = "POST", %url, "sending form request");

        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Builder for HttpJsonClient.
#[derive(Debug, Default)]
pub struct HttpJsonClientBuilder {
    endpoint: Option<String>,
    ca_bundle: Option<PathBuf>,
    accept_invalid_certs: bool,
    timeout: Option<Duration>,
}

impl HttpJsonClientBuilder {
    /// Set the base endpoint, scheme and port included (e.g., "https://nifi:9091").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Trust the certificates of a PEM bundle in addition to the system roots.
    pub fn ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }

    /// Skip server certificate verification.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpJsonClient, AdapterError> {
        let mut builder = Client::builder().timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT));

        if let Some(path) = &self.ca_bundle {
            let pem = std::fs::read(path).map_err(|e| {
                AdapterError::Tls(format!("cannot read CA bundle {}: {}", path.display(), e))
            })?;
            let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| {
                AdapterError::Tls(format!("invalid CA bundle {}: {}", path.display(), e))
            })?;
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        if self.accept_invalid_certs {
            warn!("server certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| AdapterError::Tls(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost".to_string());
        let base = Url::parse(&endpoint)
            .map_err(|e| AdapterError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if base.cannot_be_a_base() {
            return Err(AdapterError::InvalidEndpoint(endpoint));
        }

        Ok(HttpJsonClient { client, base })
    }
}

fn apply_auth(builder: RequestBuilder, auth: &Auth) -> RequestBuilder {
    match auth {
        Auth::Basic(credentials) => {
            builder.basic_auth(credentials.username(), Some(credentials.password()))
        }
        Auth::Bearer(token) => builder
            .bearer_auth(token.as_str())
            .header(ACCEPT, "*/*")
            .header(CONNECTION, "keep-alive")
            .header("X-Requested-With", "XMLHttpRequest"),
        Auth::None => builder,
    }
}

/// Accept 200 and 201, reject everything else.
pub fn check_status(method: &Method, url: &str, status: StatusCode) -> Result<(), AdapterError> {
    if status == StatusCode::OK || status == StatusCode::CREATED {
        Ok(())
    } else {
        Err(AdapterError::HttpStatus {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

// An empty body is treated as JSON null; NiFi answers some deletes without one.
fn parse_body(url: &str, text: &str) -> Result<Value, AdapterError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| AdapterError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Decode an already parsed body into a typed response.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, AdapterError> {
    serde_json::from_value(value).map_err(|e| AdapterError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
