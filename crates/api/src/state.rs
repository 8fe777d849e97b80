use std::sync::Arc;

use mdrrmo_db::retry::RetryPolicy;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mdrrmo_db::DbPool,
    /// Server configuration (JWT secret, cookie flags, integrations).
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP client shared by the Ollama and Cloudinary integrations.
    pub http: reqwest::Client,
    /// Backoff used by the polled read endpoints.
    pub retry: RetryPolicy,
}

impl AppState {
    pub fn new(pool: mdrrmo_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            http: reqwest::Client::new(),
            retry: RetryPolicy::default(),
        }
    }
}
