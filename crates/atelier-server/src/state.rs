use crate::config::ServerConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state. Stateless per request: the pool and the
/// outbound HTTP client are the only shared resources, and neither is
/// mutated by handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<ServerConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}
