//! Repository for the `notices` and `user_notices` tables.

use herald_core::gateway::NewNotice;
use herald_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::notice::{InboxNotice, Notice, UserNotice};

/// Column list for `notices` queries.
const COLUMNS: &str =
    "id, text, details, level, global, request_type, organization_id, created_at";

/// Column list for `user_notices` queries.
const RECIPIENT_COLUMNS: &str = "id, notice_id, user_id, viewed, created_at";

/// Provides storage operations for notices.
pub struct NoticeRepo;

impl NoticeRepo {
    /// Insert a notice and all its recipient rows in one transaction,
    /// returning the notice id.
    pub async fn create(pool: &PgPool, notice: &NewNotice) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let notice_id: DbId = sqlx::query_scalar(
            "INSERT INTO notices (text, details, level, global, request_type, organization_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(&notice.text)
        .bind(&notice.details)
        .bind(notice.level.as_str())
        .bind(notice.global)
        .bind(&notice.request_type)
        .bind(notice.organization)
        .fetch_one(&mut *tx)
        .await?;

        for recipient in &notice.recipients {
            sqlx::query(
                "INSERT INTO user_notices (notice_id, user_id, viewed) \
                 VALUES ($1, $2, $3)",
            )
            .bind(notice_id)
            .bind(recipient.user)
            .bind(recipient.viewed)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            notice_id,
            recipients = notice.recipients.len(),
            "Inserted notice"
        );
        Ok(notice_id)
    }

    /// Find a notice by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Notice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notices WHERE id = $1");
        sqlx::query_as::<_, Notice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a notice visible to `user_id`: either addressed to them or
    /// global.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: UserId,
    ) -> Result<Option<Notice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notices n \
             WHERE n.id = $1 \
             AND (n.global OR EXISTS ( \
                 SELECT 1 FROM user_notices un \
                 WHERE un.notice_id = n.id AND un.user_id = $2))"
        );
        sqlx::query_as::<_, Notice>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the recipient rows of a notice.
    pub async fn list_recipients(
        pool: &PgPool,
        notice_id: DbId,
    ) -> Result<Vec<UserNotice>, sqlx::Error> {
        let query = format!(
            "SELECT {RECIPIENT_COLUMNS} FROM user_notices \
             WHERE notice_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, UserNotice>(&query)
            .bind(notice_id)
            .fetch_all(pool)
            .await
    }

    /// List notices addressed to a user, newest first.
    ///
    /// When `unviewed_only` is `true`, only notices the user has not seen
    /// yet are returned. This is what a polling client asks for.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
        unviewed_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InboxNotice>, sqlx::Error> {
        let filter = if unviewed_only {
            "AND un.viewed = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT n.id, n.text, n.level, n.global, n.request_type, n.organization_id, \
                    (n.details IS NOT NULL) AS has_details, un.viewed, n.created_at \
             FROM user_notices un \
             JOIN notices n ON n.id = un.notice_id \
             WHERE un.user_id = $1 {filter} \
             ORDER BY n.created_at DESC, n.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, InboxNotice>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a user's copy of a notice as viewed.
    ///
    /// Returns `true` if an unviewed row was found and updated.
    pub async fn mark_viewed(
        pool: &PgPool,
        notice_id: DbId,
        user_id: UserId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_notices \
             SET viewed = true \
             WHERE notice_id = $1 AND user_id = $2 AND viewed = false",
        )
        .bind(notice_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of notices the user has not seen yet.
    pub async fn unviewed_count(pool: &PgPool, user_id: UserId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_notices WHERE user_id = $1 AND viewed = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
