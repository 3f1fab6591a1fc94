//! Tool registry and adapters.
//!
//! Each tool validates its arguments, makes exactly one `TraktClient` call,
//! and renders the result with a pure formatter. The registry is built once
//! at startup; the MCP layer advertises and dispatches through it.
//!
//! Tools:
//! - `get_watched_shows`, `mark_episode_as_watched` (history)
//! - `get_watchlist`, `add_to_watchlist`, `remove_from_watchlist` (watchlist)
//! - `search_shows`, `get_trending_shows`, `get_show_all_episodes`,
//!   `get_show_season_episodes` (discovery)

pub mod args;
pub mod discovery;
pub mod history;
pub mod watchlist;

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::{Value, json};
use thiserror::Error;
use tokio_util::task::AbortOnDropHandle;

use crate::client::TraktClient;
use crate::error::TraktError;

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Trakt(#[from] TraktError),
}

impl ToolError {
    /// Text shown to the assistant in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            ToolError::InvalidArgument(msg) => format!("❌ Invalid argument: {}", msg),
            ToolError::Trakt(TraktError::Authentication { message }) => format!(
                "🔒 Trakt authentication failed: {} Check that TRAKT_ACCESS_TOKEN is a valid, \
                 unexpired OAuth token and TRAKT_CLIENT_ID matches its application.",
                message
            ),
            ToolError::Trakt(TraktError::NotFound { .. }) => {
                "❌ Not found: the requested show, season or episode does not exist on Trakt."
                    .to_string()
            }
            ToolError::Trakt(e) if e.is_rate_limited() => {
                "⏳ Trakt rate limit exceeded. Please wait a moment and try again.".to_string()
            }
            ToolError::Trakt(e @ TraktError::Network { .. }) => {
                format!("🌐 Could not reach Trakt. {}", e)
            }
            ToolError::Trakt(e) => format!("❌ Trakt API error: {}", e),
        }
    }
}

// ── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    pub fn error(text: String) -> Self {
        Self {
            text,
            is_error: true,
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

pub type ToolFuture<'a> = BoxFuture<'a, Result<String, ToolError>>;

/// A tool body. The shared client is passed in explicitly on every call.
pub type ToolHandler = for<'a> fn(&'a TraktClient, &'a Value) -> ToolFuture<'a>;

#[derive(Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    handler: ToolHandler,
}

impl ToolSpec {
    pub fn new(
        name: &'static str,
        description: &'static str,
        input_schema: Value,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            description,
            input_schema,
            handler,
        }
    }

    /// MCP `tools/list` entry.
    pub fn to_mcp(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every Trakt tool.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        history::register(&mut registry);
        watchlist::register(&mut registry);
        discovery::register(&mut registry);
        tracing::debug!("Registered {} tools", registry.len());
        registry
    }

    /// Add a tool. A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, spec: ToolSpec) {
        match self.index.get(spec.name) {
            Some(&i) => self.tools[i] = spec,
            None => {
                self.index.insert(spec.name, self.tools.len());
                self.tools.push(spec);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool and fold every failure into an error `ToolOutput`.
    ///
    /// Returns `None` for an unknown tool name. The handler runs in its own
    /// task so a panic is contained; dropping the returned future aborts it.
    pub async fn call(
        &self,
        client: Arc<TraktClient>,
        name: &str,
        arguments: Value,
    ) -> Option<ToolOutput> {
        let spec = self.get(name)?;
        let handler = spec.handler;
        let tool = spec.name;

        let task = AbortOnDropHandle::new(tokio::spawn(async move {
            handler(&client, &arguments).await
        }));

        let output = match task.await {
            Ok(Ok(text)) => ToolOutput::text(text),
            Ok(Err(e)) => {
                match &e {
                    ToolError::InvalidArgument(msg) => {
                        tracing::warn!(tool, "invalid arguments: {}", msg)
                    }
                    ToolError::Trakt(err) => tracing::warn!(tool, "Trakt call failed: {}", err),
                }
                ToolOutput::error(e.user_message())
            }
            Err(join_err) => {
                tracing::error!(tool, "tool task failed unexpectedly: {:?}", join_err);
                ToolOutput::error(format!(
                    "❌ Unexpected error while running '{}'. See server logs for details.",
                    tool
                ))
            }
        };
        Some(output)
    }
}
