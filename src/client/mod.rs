//! Resilient Trakt API client.
//!
//! Owns one pooled, keep-alive reqwest client configured with the Trakt auth
//! headers. Every call goes through [`TraktClient::execute`], which classifies
//! the outcome into success or a [`TraktError`] and retries network-class
//! failures with exponential backoff.
//!
//! The client is `Send + Sync` and meant to be shared behind an `Arc` by all
//! concurrent tool invocations of a session.

pub mod endpoints;
pub mod retry;

use std::sync::{Arc, RwLock};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use url::Url;

use crate::config::{ClientConfig, ConfigError, TimeoutConfig};
use crate::error::{BODY_EXCERPT_LIMIT, TraktError, excerpt};
use retry::{RetryPolicy, with_retry};

pub use endpoints::Endpoint;

const MAX_REDIRECTS: usize = 10;

// ── Request / response shapes ───────────────────────────────────────────────

/// One outbound call: method, path under the API base, query and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Merged over the client's default headers for this call only.
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Parsed body of a successful response. No schema is imposed.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 204, an empty body, or a JSON scalar.
    Empty,
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    /// Array payload, or an empty list for any other shape.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            ApiResponse::Array(items) => items,
            _ => Vec::new(),
        }
    }

    /// Object payload, or an empty object for any other shape.
    pub fn into_object(self) -> Value {
        match self {
            ApiResponse::Object(map) => Value::Object(map),
            _ => Value::Object(Map::new()),
        }
    }

    fn from_body(bytes: &[u8]) -> Result<Self, TraktError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResponse::Empty);
        }
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            TraktError::api(format!("Invalid JSON in Trakt response: {}", e), None)
        })?;
        Ok(match value {
            Value::Object(map) => ApiResponse::Object(map),
            Value::Array(items) => ApiResponse::Array(items),
            _ => ApiResponse::Empty,
        })
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

pub struct TraktClient {
    /// `None` once closed. reqwest clients are cheap `Arc` clones, so each
    /// attempt takes its own handle and the lock is never held across I/O.
    http: RwLock<Option<reqwest::Client>>,
    /// Total-connection cap. Waiting for a permit is bounded by `timeouts.pool`.
    slots: Arc<Semaphore>,
    max_connections: usize,
    base_url: String,
    timeouts: TimeoutConfig,
    retry: RetryPolicy,
}

impl std::fmt::Debug for TraktClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraktClient")
            .field("base_url", &self.base_url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl TraktClient {
    /// Configure the connection pool. Performs no network I/O.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let missing = config.credentials.missing();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let base = Url::parse(&config.base_url).map_err(|e| ConfigError::Invalid {
            name: "base_url".to_string(),
            reason: e.to_string(),
        })?;

        let headers = default_headers(&config)?;

        // HTTP/2 is negotiated through ALPN on TLS connections; plain
        // connections and servers without h2 stay on HTTP/1.1.
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeouts.connect)
            .read_timeout(config.timeouts.read)
            .pool_max_idle_per_host(config.pool.max_keepalive_connections)
            .pool_idle_timeout(config.pool.keepalive_expiry)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "http_client".to_string(),
                reason: e.to_string(),
            })?;

        let max_connections = config.pool.max_connections.max(1);

        tracing::info!(
            base_url = %base,
            max_connections,
            keepalive = config.pool.max_keepalive_connections,
            "TraktClient initialized"
        );

        Ok(Self {
            http: RwLock::new(Some(http)),
            slots: Arc::new(Semaphore::new(max_connections)),
            max_connections,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeouts: config.timeouts,
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_closed(&self) -> bool {
        self.http
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .is_none()
    }

    /// Release the connection pool. Safe to call more than once; later calls
    /// are no-ops and never reopen anything.
    pub fn close(&self) {
        let taken = self
            .http
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .take();

        match taken {
            Some(http) => {
                tracing::info!("Closing TraktClient and releasing connections");
                // Wake any task still waiting for a slot.
                self.slots.close();
                drop(http);
            }
            None => tracing::debug!("TraktClient already closed"),
        }
    }

    /// Execute a request with classification and network retries.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TraktError> {
        with_retry(&self.retry, &request.path, |attempt| {
            self.send_once(request, attempt)
        })
        .await
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        attempt: u32,
    ) -> Result<ApiResponse, TraktError> {
        let http = self
            .http
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(closed_error)?;

        let _slot = match tokio::time::timeout(
            self.timeouts.pool,
            self.slots.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(closed_error()),
            Err(_) => {
                return Err(TraktError::network(format!(
                    "Timed out after {:?} waiting for a free connection (limit {})",
                    self.timeouts.pool, self.max_connections
                )));
            }
        };

        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            attempt,
            "Trakt request"
        );

        let mut builder = http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone())
            .timeout(self.timeouts.request_budget());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            let err = TraktError::from_transport(&e);
            tracing::warn!("Request error on {}: {}", request.path, err);
            err
        })?;

        tracing::debug!(version = ?response.version(), status = %response.status(), "Trakt response");

        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(ApiResponse::Empty);
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| TraktError::from_transport(&e))?;
            return ApiResponse::from_body(&bytes);
        }

        let body = response.text().await.unwrap_or_default();
        let err = TraktError::from_status(status.as_u16(), &body);
        match &err {
            TraktError::Authentication { .. } => {
                tracing::error!("Authentication failed - check TRAKT_ACCESS_TOKEN");
            }
            TraktError::NotFound { .. } => {
                tracing::warn!("Resource not found: {}", request.path);
            }
            e if e.is_rate_limited() => {
                tracing::warn!("Rate limited on {}", request.path);
            }
            _ => {
                tracing::error!(
                    "HTTP {} error on {}: {}",
                    status.as_u16(),
                    request.path,
                    excerpt(&body, BODY_EXCERPT_LIMIT)
                );
            }
        }
        Err(err)
    }
}

fn closed_error() -> TraktError {
    TraktError::api("TraktClient is closed", None)
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap, ConfigError> {
    let value = |name: &str, raw: &str| {
        HeaderValue::from_str(raw).map_err(|e| ConfigError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        })
    };

    let creds = &config.credentials;
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("trakt-api-version"),
        value("TRAKT_API_VERSION", &creds.api_version)?,
    );

    let mut key = value("TRAKT_CLIENT_ID", &creds.client_id)?;
    key.set_sensitive(true);
    headers.insert(HeaderName::from_static("trakt-api-key"), key);

    let mut bearer = value(
        "TRAKT_ACCESS_TOKEN",
        &format!("Bearer {}", creds.access_token),
    )?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    Ok(headers)
}
