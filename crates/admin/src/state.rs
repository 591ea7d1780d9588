//! Application state shared across handlers.

use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// panel configuration and the task service client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    client: ApiClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let client = ApiClient::new(&config.api_base_url);

        Self {
            inner: Arc::new(AppStateInner { config, client }),
        }
    }

    /// Get a reference to the panel configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the task service client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }
}
