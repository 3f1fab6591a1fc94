//! Error taxonomy for Trakt API calls.
//!
//! Transport and HTTP failures are classified exactly once, inside the
//! client. Everything above the client only ever sees a `TraktError`.

use thiserror::Error;

/// Maximum number of response-body characters embedded in an error message.
pub const BODY_EXCERPT_LIMIT: usize = 200;

const AUTH_MESSAGE: &str = "Authentication required. Please configure TRAKT_ACCESS_TOKEN.";
const NOT_FOUND_MESSAGE: &str = "Resource not found on Trakt";
const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TraktError {
    /// HTTP 401. Never retried.
    #[error("{message}")]
    Authentication { message: String },

    /// HTTP 404. Never retried.
    #[error("{message}")]
    NotFound { message: String },

    /// Timeout, connect failure or other transport I/O error. The only retried kind.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Any other non-2xx response (including 429), or a non-transport failure
    /// such as an unparseable body.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },
}

impl TraktError {
    pub fn authentication() -> Self {
        TraktError::Authentication {
            message: AUTH_MESSAGE.to_string(),
        }
    }

    pub fn not_found() -> Self {
        TraktError::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        TraktError::Network {
            message: message.into(),
        }
    }

    pub fn rate_limited() -> Self {
        TraktError::Api {
            message: RATE_LIMIT_MESSAGE.to_string(),
            status: Some(429),
        }
    }

    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        TraktError::Api {
            message: message.into(),
            status,
        }
    }

    /// HTTP status associated with the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TraktError::Authentication { .. } => Some(401),
            TraktError::NotFound { .. } => Some(404),
            TraktError::Network { .. } => None,
            TraktError::Api { status, .. } => *status,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, TraktError::Network { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TraktError::Api { status: Some(429), .. })
    }

    /// Classify a non-2xx HTTP response.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => TraktError::authentication(),
            404 => TraktError::not_found(),
            429 => TraktError::rate_limited(),
            _ => TraktError::api(
                format!("HTTP {}: {}", status, excerpt(body, BODY_EXCERPT_LIMIT)),
                Some(status),
            ),
        }
    }

    /// Classify a transport-level failure from reqwest.
    ///
    /// Timeouts, connect failures and other request/body I/O errors are all
    /// `Network`. Errors raised while building the request (bad URL, bad
    /// header) are not transient and become `Api` without a status.
    pub fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_builder() {
            TraktError::api(format!("Invalid request: {}", e), None)
        } else if e.is_timeout() {
            TraktError::network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            TraktError::network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            TraktError::api(format!("Invalid response body: {}", e), None)
        } else {
            TraktError::network(e.to_string())
        }
    }
}

/// Truncate `s` to at most `max_chars` characters on a char boundary,
/// appending `...` when something was cut.
pub fn excerpt(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
