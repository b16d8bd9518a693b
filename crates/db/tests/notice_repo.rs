//! Integration tests for notice storage.
//!
//! Exercises the repository layer and the PostgreSQL gateway against a real
//! database to verify that:
//! - A notice and its recipient rows are written together
//! - Listing and counting follow the per-recipient viewed flag
//! - Details are only visible to recipients (or everyone, for global notices)
//! - A failed insert surfaces as a `PersistenceError`

use assert_matches::assert_matches;
use herald_core::gateway::{NewNotice, NoticeRecipient, PersistenceGateway};
use herald_core::level::Level;
use herald_db::repositories::NoticeRepo;
use herald_db::PgNoticeGateway;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_notice(text: &str, recipients: &[(i64, bool)]) -> NewNotice {
    NewNotice {
        text: text.to_string(),
        details: None,
        level: Level::Success,
        global: false,
        request_type: Some("systems___update".to_string()),
        organization: Some(3),
        recipients: recipients
            .iter()
            .map(|&(user, viewed)| NoticeRecipient { user, viewed })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Test: create writes the notice and its recipient rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_writes_notice_and_recipients(pool: PgPool) {
    let mut notice = new_notice("Saved<br />2 items", &[(7, true), (8, false)]);
    notice.details = Some("trace".to_string());
    notice.level = Level::Error;

    let id = NoticeRepo::create(&pool, &notice).await.unwrap();

    let stored = NoticeRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Saved<br />2 items");
    assert_eq!(stored.details.as_deref(), Some("trace"));
    assert_eq!(stored.level, "error");
    assert!(!stored.global);
    assert_eq!(stored.request_type.as_deref(), Some("systems___update"));
    assert_eq!(stored.organization_id, Some(3));

    let recipients = NoticeRepo::list_recipients(&pool, id).await.unwrap();
    assert_eq!(recipients.len(), 2);
    assert_eq!((recipients[0].user_id, recipients[0].viewed), (7, true));
    assert_eq!((recipients[1].user_id, recipients[1].viewed), (8, false));
}

// ---------------------------------------------------------------------------
// Test: listing and counting follow the viewed flag
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_filters_unviewed(pool: PgPool) {
    let seen = NoticeRepo::create(&pool, &new_notice("seen", &[(7, true)]))
        .await
        .unwrap();
    let pending = NoticeRepo::create(&pool, &new_notice("pending", &[(7, false)]))
        .await
        .unwrap();
    NoticeRepo::create(&pool, &new_notice("someone else", &[(8, false)]))
        .await
        .unwrap();

    let all = NoticeRepo::list_for_user(&pool, 7, false, 50, 0).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![pending, seen], "newest first, only user 7");

    let unviewed = NoticeRepo::list_for_user(&pool, 7, true, 50, 0).await.unwrap();
    assert_eq!(unviewed.len(), 1);
    assert_eq!(unviewed[0].id, pending);
    assert!(!unviewed[0].has_details);

    assert_eq!(NoticeRepo::unviewed_count(&pool, 7).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_viewed_is_idempotent(pool: PgPool) {
    let id = NoticeRepo::create(&pool, &new_notice("pending", &[(7, false)]))
        .await
        .unwrap();

    assert!(NoticeRepo::mark_viewed(&pool, id, 7).await.unwrap());
    assert!(!NoticeRepo::mark_viewed(&pool, id, 7).await.unwrap());
    assert!(
        !NoticeRepo::mark_viewed(&pool, id, 8).await.unwrap(),
        "another user's copy does not exist"
    );
    assert_eq!(NoticeRepo::unviewed_count(&pool, 7).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Test: details visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_for_user_requires_recipient_or_global(pool: PgPool) {
    let private = NoticeRepo::create(&pool, &new_notice("private", &[(7, true)]))
        .await
        .unwrap();
    let mut global = new_notice("maintenance tonight", &[(7, false)]);
    global.global = true;
    let global = NoticeRepo::create(&pool, &global).await.unwrap();

    assert!(NoticeRepo::find_for_user(&pool, private, 7).await.unwrap().is_some());
    assert!(NoticeRepo::find_for_user(&pool, private, 8).await.unwrap().is_none());
    assert!(NoticeRepo::find_for_user(&pool, global, 8).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Test: gateway
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_gateway_creates_notice(pool: PgPool) {
    let gateway = PgNoticeGateway::new(pool.clone());

    let id = gateway
        .create_notice(new_notice("done", &[(7, false)]))
        .await
        .unwrap();

    let recipients = NoticeRepo::list_recipients(&pool, id).await.unwrap();
    assert_eq!(recipients.len(), 1);
    assert!(!recipients[0].viewed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_gateway_failure_rolls_back_notice(pool: PgPool) {
    let gateway = PgNoticeGateway::new(pool.clone());

    // The same recipient twice violates uq_user_notices_notice_user.
    let result = gateway
        .create_notice(new_notice("duplicate", &[(7, false), (7, true)]))
        .await;
    let err = result.unwrap_err();
    assert_matches!(
        err.inner().downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(_))
    );

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notices")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0, "notice insert should be rolled back");
}
