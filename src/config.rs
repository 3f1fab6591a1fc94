//! Process configuration.
//!
//! Credentials come from the environment (optionally seeded from a `.env`
//! file). Everything else has shipped defaults that tests may override.

use std::time::Duration;

use thiserror::Error;

use crate::client::retry::RetryPolicy;

/// Fixed Trakt API base.
pub const TRAKT_API_BASE: &str = "https://api.trakt.tv";

const ENV_CLIENT_ID: &str = "TRAKT_CLIENT_ID";
const ENV_ACCESS_TOKEN: &str = "TRAKT_ACCESS_TOKEN";
const ENV_API_VERSION: &str = "TRAKT_API_VERSION";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variables: {0:?}")]
    MissingVariables(Vec<String>),

    #[error("Invalid configuration value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

// ── Transport selection ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http { port: u16 },
}

// ── Settings ────────────────────────────────────────────────────────────────

/// Validated process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub transport: Transport,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub access_token: String,
    pub api_version: String,
}

// Keep tokens out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Credentials {
    /// Names of credential fields that are empty.
    pub fn missing(&self) -> Vec<String> {
        [
            (ENV_CLIENT_ID, &self.client_id),
            (ENV_ACCESS_TOKEN, &self.access_token),
            (ENV_API_VERSION, &self.api_version),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k.to_string())
        .collect()
    }
}

impl Settings {
    /// Load settings from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// All missing credentials are reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let credentials = Credentials {
            client_id: read(ENV_CLIENT_ID),
            access_token: read(ENV_ACCESS_TOKEN),
            api_version: read(ENV_API_VERSION),
        };

        let missing = credentials.missing();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let transport = match read("MCP_TRANSPORT").to_lowercase().as_str() {
            "" | "stdio" => Transport::Stdio,
            "http" => {
                let raw = read("PORT");
                let port = if raw.is_empty() {
                    8081
                } else {
                    raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                        name: "PORT".to_string(),
                        reason: e.to_string(),
                    })?
                };
                Transport::Http { port }
            }
            other => {
                return Err(ConfigError::Invalid {
                    name: "MCP_TRANSPORT".to_string(),
                    reason: format!("expected 'stdio' or 'http', got '{}'", other),
                });
            }
        };

        Ok(Self {
            credentials,
            transport,
        })
    }
}

// ── Client tuning ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub connect: Duration,
    pub read: Duration,
    /// Not enforced on its own: reqwest has no write timeout. It only widens
    /// the per-attempt deadline, see [`TimeoutConfig::request_budget`].
    pub write: Duration,
    /// How long a request may wait for a free connection slot.
    pub pool: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            read: Duration::from_secs(30),
            write: Duration::from_secs(10),
            pool: Duration::from_secs(5),
        }
    }
}

impl TimeoutConfig {
    /// Upper bound for one attempt once a connection slot is held.
    pub fn request_budget(&self) -> Duration {
        self.connect + self.write + self.read
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: usize,
    pub max_keepalive_connections: usize,
    pub keepalive_expiry: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            max_keepalive_connections: 20,
            keepalive_expiry: Duration::from_secs(30),
        }
    }
}

/// Everything `TraktClient::new` needs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub credentials: Credentials,
    pub timeouts: TimeoutConfig,
    pub pool: PoolConfig,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: TRAKT_API_BASE.to_string(),
            user_agent: format!("TraktMCPServer/{}", env!("CARGO_PKG_VERSION")),
            credentials,
            timeouts: TimeoutConfig::default(),
            pool: PoolConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at another base URL (local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl From<&Settings> for ClientConfig {
    fn from(settings: &Settings) -> Self {
        ClientConfig::new(settings.credentials.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const FULL: &[(&str, &str)] = &[
        ("TRAKT_CLIENT_ID", "id"),
        ("TRAKT_ACCESS_TOKEN", "token"),
        ("TRAKT_API_VERSION", "2"),
    ];

    #[test]
    fn test_all_credentials_present() {
        let settings = Settings::from_lookup(lookup(FULL)).unwrap();
        assert_eq!(settings.credentials.client_id, "id");
        assert_eq!(settings.credentials.api_version, "2");
        assert_eq!(settings.transport, Transport::Stdio);
    }

    #[test]
    fn test_missing_credentials_reported_together() {
        let err = Settings::from_lookup(lookup(&[("TRAKT_CLIENT_ID", "id")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVariables(vec![
                "TRAKT_ACCESS_TOKEN".to_string(),
                "TRAKT_API_VERSION".to_string(),
            ])
        );
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let err = Settings::from_lookup(lookup(&[
            ("TRAKT_CLIENT_ID", "id"),
            ("TRAKT_ACCESS_TOKEN", "   "),
            ("TRAKT_API_VERSION", "2"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVariables(vec!["TRAKT_ACCESS_TOKEN".to_string()])
        );
    }

    #[test]
    fn test_http_transport_with_port() {
        let mut pairs = FULL.to_vec();
        pairs.push(("MCP_TRANSPORT", "http"));
        pairs.push(("PORT", "9000"));
        let settings = Settings::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(settings.transport, Transport::Http { port: 9000 });
    }

    #[test]
    fn test_unknown_transport_rejected() {
        let mut pairs = FULL.to_vec();
        pairs.push(("MCP_TRANSPORT", "carrier-pigeon"));
        assert!(matches!(
            Settings::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_shipped_defaults() {
        let t = TimeoutConfig::default();
        assert_eq!(t.connect, Duration::from_secs(5));
        assert_eq!(t.read, Duration::from_secs(30));
        assert_eq!(t.write, Duration::from_secs(10));
        assert_eq!(t.pool, Duration::from_secs(5));

        let p = PoolConfig::default();
        assert_eq!(p.max_connections, 100);
        assert_eq!(p.max_keepalive_connections, 20);
        assert_eq!(p.keepalive_expiry, Duration::from_secs(30));
    }

    #[test]
    fn test_write_timeout_only_widens_request_budget() {
        let t = TimeoutConfig::default();
        assert_eq!(t.request_budget(), Duration::from_secs(45));

        let wider = TimeoutConfig {
            write: Duration::from_secs(20),
            ..t
        };
        assert_eq!(wider.request_budget() - t.request_budget(), Duration::from_secs(10));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let settings = Settings::from_lookup(lookup(FULL)).unwrap();
        let dbg = format!("{:?}", settings.credentials);
        assert!(!dbg.contains("\"token\""));
        assert!(dbg.contains("redacted"));
    }
}
