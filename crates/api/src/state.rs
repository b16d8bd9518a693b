use std::sync::Arc;

use herald_notifier::Notifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: herald_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Notifier writing through the PostgreSQL gateway.
    pub notifier: Notifier,
}
