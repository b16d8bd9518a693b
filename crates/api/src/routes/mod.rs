pub mod health;
pub mod notice;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /notices                      list (GET), dispatch (POST)
/// /notices/unviewed-count       unviewed count
/// /notices/{id}                 single notice with details
/// /notices/{id}/viewed          mark viewed (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/notices", notice::router())
}
