//! Route definitions for the `/notices` resource.
//!
//! All endpoints require authentication. `POST /` is trusted: the caller
//! may address any user, so it is meant for internal services.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notice;
use crate::state::AppState;

/// Routes mounted at `/notices`.
///
/// ```text
/// GET    /                 -> list_notices
/// POST   /                 -> dispatch_notice
/// GET    /unviewed-count   -> unviewed_count
/// GET    /{id}             -> get_notice
/// POST   /{id}/viewed      -> mark_viewed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notice::list_notices).post(notice::dispatch_notice),
        )
        .route("/unviewed-count", get(notice::unviewed_count))
        .route("/{id}", get(notice::get_notice))
        .route("/{id}/viewed", post(notice::mark_viewed))
}
