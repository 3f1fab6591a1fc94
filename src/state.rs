// Shared application state, handed explicitly to every transport.

use std::sync::Arc;
use std::time::Instant;

use crate::client::TraktClient;
use crate::config::{ClientConfig, ConfigError, Settings};
use crate::tools::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<TraktClient>,
    pub registry: Arc<ToolRegistry>,
    pub start_time: Instant,
}

impl AppState {
    /// State with the default Trakt tool set.
    pub fn new(client: Arc<TraktClient>) -> Self {
        Self::with_registry(client, ToolRegistry::with_default_tools())
    }

    /// Build the Trakt client from loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let client = TraktClient::new(ClientConfig::from(settings))?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn with_registry(client: Arc<TraktClient>, registry: ToolRegistry) -> Self {
        Self {
            client,
            registry: Arc::new(registry),
            start_time: Instant::now(),
        }
    }
}
