//! Handlers for the `/notices` resource.
//!
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use herald_core::normalize::RawMessage;
use herald_core::options::OptionOverrides;
use herald_core::types::DbId;
use herald_db::repositories::NoticeRepo;
use herald_notifier::DispatchContext;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::flash::FlashContext;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Action name recorded on notices dispatched through this API.
pub const DISPATCH_REQUEST_TYPE: &str = "notices___create";

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notices`.
#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    /// If `true`, return only notices not yet viewed. Defaults to `false`.
    pub unviewed_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Body for `POST /notices`.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    /// A line, a list of lines or nested lists; `null` entries are skipped.
    pub message: RawMessage,
    /// Option overrides as a JSON object. Unknown keys are rejected.
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}

/// Maximum page size for notice listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notice listing.
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// GET /api/v1/notices
///
/// List the authenticated user's notices, newest first.
pub async fn list_notices(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NoticeQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);
    let unviewed_only = params.unviewed_only.unwrap_or(false);

    let notices =
        NoticeRepo::list_for_user(&state.pool, auth.user_id, unviewed_only, limit, offset).await?;

    Ok(Json(json!({ "data": notices })))
}

/// GET /api/v1/notices/unviewed-count
pub async fn unviewed_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NoticeRepo::unviewed_count(&state.pool, auth.user_id).await?;

    Ok(Json(json!({ "data": { "unviewed_count": count } })))
}

/// GET /api/v1/notices/{id}
///
/// A single notice including its details text. Visible when addressed to
/// the caller or global.
pub async fn get_notice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notice_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let notice = NoticeRepo::find_for_user(&state.pool, notice_id, auth.user_id)
        .await?
        .ok_or(AppError::NotFound {
            entity: "Notice",
            id: notice_id,
        })?;

    Ok(Json(json!({ "data": notice })))
}

/// POST /api/v1/notices/{id}/viewed
///
/// Returns 204 No Content on success, or 404 if the caller has no unviewed
/// copy of the notice.
pub async fn mark_viewed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = NoticeRepo::mark_viewed(&state.pool, notice_id, auth.user_id).await?;

    if !found {
        return Err(AppError::NotFound {
            entity: "Notice",
            id: notice_id,
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// POST /api/v1/notices
///
/// Dispatch a notice from within this request. The caller is the default
/// recipient and the session's organization the default organization. Inline
/// notices come back under `flash`.
///
/// Trusted endpoint: any authenticated caller may address another user
/// through `options.user`. Expose it only to internal services or behind an
/// admin gateway.
pub async fn dispatch_notice(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<DispatchRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let caller = match body.options {
        Some(value) => OptionOverrides::from_json(value)?,
        None => OptionOverrides::new(),
    };
    let session = match auth.organization {
        Some(org) => OptionOverrides::new().with_organization(org),
        None => OptionOverrides::new(),
    };

    let mut flash =
        FlashContext::new(state.config.notices_url()).with_request_type(DISPATCH_REQUEST_TYPE);
    let outcome = {
        let mut ctx = DispatchContext::request(&auth, &mut flash);
        state
            .notifier
            .notice(&mut ctx, body.message, session.merge(caller))
            .await?
    };

    tracing::debug!(
        user_id = auth.user_id,
        notice_id = ?outcome.notice_id,
        delivered_inline = outcome.delivered_inline,
        "Notice dispatched via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "notice_id": outcome.notice_id,
                "delivered_inline": outcome.delivered_inline,
                "flash": flash.to_json(),
            }
        })),
    ))
}
