//! Notice entity models.

use herald_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notice {
    pub id: DbId,
    pub text: String,
    pub details: Option<String>,
    pub level: String,
    pub global: bool,
    pub request_type: Option<String>,
    pub organization_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// A row from the `user_notices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserNotice {
    pub id: DbId,
    pub notice_id: DbId,
    pub user_id: DbId,
    pub viewed: bool,
    pub created_at: Timestamp,
}

/// A notice as seen from one recipient's list.
///
/// Details are left out of listings; `has_details` tells the client whether
/// fetching the full notice is worthwhile.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InboxNotice {
    pub id: DbId,
    pub text: String,
    pub level: String,
    pub global: bool,
    pub request_type: Option<String>,
    pub organization_id: Option<DbId>,
    pub has_details: bool,
    pub viewed: bool,
    pub created_at: Timestamp,
}
