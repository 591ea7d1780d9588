//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtValidator;
use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    jwt: JwtValidator,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let jwt = JwtValidator::new(&config.jwt_secret);

        Self {
            inner: Arc::new(AppStateInner { config, pool, jwt }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the JWT validator.
    #[must_use]
    pub fn jwt(&self) -> &JwtValidator {
        &self.inner.jwt
    }
}
