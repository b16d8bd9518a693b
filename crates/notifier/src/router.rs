//! Inline vs persisted delivery.
//!
//! [`DeliveryRouter::dispatch`] takes already-resolved options and
//! normalized lines and carries out one of two modes:
//!
//! - **asynchronous**: the notice is stored with an unviewed recipient row
//!   and picked up later by polling. Nothing is shown inline.
//! - **synchronous**: the notice is stored (when `persist`) with a viewed
//!   recipient row, then attached to the requester for immediate display.
//!
//! Persistence always completes before inline delivery, so a details link
//! points at a record that already exists.

use std::sync::Arc;

use herald_core::error::NotifyError;
use herald_core::gateway::{NewNotice, NoticeRecipient, PersistenceGateway, RequesterContext};
use herald_core::normalize::join_lines;
use herald_core::options::DispatchOptions;
use herald_core::types::DbId;

/// What a dispatch call ended up doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Id of the stored notice, if one was persisted.
    pub notice_id: Option<DbId>,
    /// Whether the lines were attached to a requester.
    pub delivered_inline: bool,
}

/// Routes a resolved dispatch to storage and/or the requester.
#[derive(Clone)]
pub struct DeliveryRouter {
    gateway: Arc<dyn PersistenceGateway>,
}

impl DeliveryRouter {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Deliver `lines` according to `options`.
    ///
    /// An empty message is a no-op. A synchronous, non-persisted dispatch
    /// without a requester reaches nobody; it is logged, not rejected.
    pub async fn dispatch(
        &self,
        mut lines: Vec<String>,
        options: &DispatchOptions,
        requester: Option<&mut (dyn RequesterContext + '_)>,
    ) -> Result<DispatchOutcome, NotifyError> {
        if lines.is_empty() {
            tracing::debug!(user = options.user, level = %options.level, "Empty notice, nothing to dispatch");
            return Ok(DispatchOutcome::default());
        }

        tracing::debug!(
            user = options.user,
            level = %options.level,
            asynchronous = options.asynchronous,
            persist = options.persist,
            has_requester = requester.is_some(),
            "Dispatching notice"
        );

        if options.asynchronous {
            // Picked up by the recipient's next poll.
            let notice_id = self.persist(&lines, false, options).await?;
            return Ok(DispatchOutcome {
                notice_id: Some(notice_id),
                delivered_inline: false,
            });
        }

        let notice_id = if options.persist {
            Some(self.persist(&lines, true, options).await?)
        } else {
            None
        };

        let Some(requester) = requester else {
            if notice_id.is_none() {
                tracing::warn!(
                    user = options.user,
                    level = %options.level,
                    "Synchronous notice without requester or persistence reached nobody"
                );
            }
            return Ok(DispatchOutcome {
                notice_id,
                delivered_inline: false,
            });
        };

        if notice_id.is_some() && options.details.is_some() {
            lines.push(details_link_line(&requester.details_url()));
        }
        requester.attach_inline_notice(options.level, options.send_as, lines);

        Ok(DispatchOutcome {
            notice_id,
            delivered_inline: true,
        })
    }

    async fn persist(
        &self,
        lines: &[String],
        viewed: bool,
        options: &DispatchOptions,
    ) -> Result<DbId, NotifyError> {
        let notice = NewNotice {
            text: join_lines(lines),
            details: options.details.clone(),
            level: options.level,
            global: options.global,
            request_type: options.request_type.clone(),
            organization: options.organization,
            recipients: vec![NoticeRecipient {
                user: options.user,
                viewed,
            }],
        };

        let notice_id = self.gateway.create_notice(notice).await?;
        tracing::info!(
            notice_id,
            user = options.user,
            level = %options.level,
            viewed,
            "Notice persisted"
        );
        Ok(notice_id)
    }
}

/// Extra line pointing the requester at the stored details.
pub fn details_link_line(url: &str) -> String {
    format!(
        "<a href=\"{}\">Click here</a> for more details.",
        url.replace('"', "&quot;")
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use herald_core::level::{Level, SendAs};

    use super::*;
    use crate::test_support::{FakeRequester, RecordingGateway, DETAILS_URL};

    fn options() -> DispatchOptions {
        DispatchOptions {
            level: Level::Success,
            asynchronous: false,
            persist: true,
            global: false,
            details: None,
            request_type: None,
            send_as: SendAs::Notices,
            user: 7,
            organization: None,
        }
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn router() -> (DeliveryRouter, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::default());
        (DeliveryRouter::new(gateway.clone()), gateway)
    }

    #[tokio::test]
    async fn asynchronous_persists_unviewed_and_skips_inline() {
        let (router, gateway) = router();
        let mut requester = FakeRequester::default();
        let opts = DispatchOptions {
            asynchronous: true,
            ..options()
        };

        let outcome = router
            .dispatch(lines(&["done"]), &opts, Some(&mut requester))
            .await
            .unwrap();

        assert_eq!(outcome.notice_id, Some(1));
        assert!(!outcome.delivered_inline);
        assert!(requester.inline.is_empty());

        let created = gateway.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].text, "done");
        assert_eq!(
            created[0].recipients,
            vec![NoticeRecipient {
                user: 7,
                viewed: false
            }]
        );
    }

    #[tokio::test]
    async fn synchronous_persist_marks_viewed_and_delivers_inline() {
        let (router, gateway) = router();
        let mut requester = FakeRequester::default();

        let outcome = router
            .dispatch(lines(&["saved", "2 items"]), &options(), Some(&mut requester))
            .await
            .unwrap();

        assert_eq!(outcome.notice_id, Some(1));
        assert!(outcome.delivered_inline);

        let created = gateway.created();
        assert_eq!(created[0].text, "saved<br />2 items");
        assert!(created[0].recipients[0].viewed);

        assert_eq!(
            requester.inline,
            vec![(Level::Success, SendAs::Notices, lines(&["saved", "2 items"]))]
        );
    }

    #[tokio::test]
    async fn synchronous_without_persist_never_touches_storage() {
        let (router, gateway) = router();
        let mut requester = FakeRequester::default();
        let opts = DispatchOptions {
            persist: false,
            level: Level::Warning,
            ..options()
        };

        let outcome = router
            .dispatch(lines(&["careful"]), &opts, Some(&mut requester))
            .await
            .unwrap();

        assert_eq!(outcome.notice_id, None);
        assert!(outcome.delivered_inline);
        assert!(gateway.created().is_empty());
        assert_eq!(requester.inline.len(), 1);
    }

    #[tokio::test]
    async fn details_link_appended_after_persisting() {
        let (router, gateway) = router();
        let mut requester = FakeRequester::default();
        let opts = DispatchOptions {
            level: Level::Error,
            details: Some("at main.rs:1".into()),
            ..options()
        };

        router
            .dispatch(lines(&["boom"]), &opts, Some(&mut requester))
            .await
            .unwrap();

        // Stored text has no link; only the inline copy gets one.
        let created = gateway.created();
        assert_eq!(created[0].text, "boom");
        assert_eq!(created[0].details.as_deref(), Some("at main.rs:1"));

        let (_, _, inline) = &requester.inline[0];
        assert_eq!(inline.len(), 2);
        assert_eq!(inline[1], details_link_line(DETAILS_URL));
    }

    #[tokio::test]
    async fn synchronous_without_requester_only_persists() {
        let (router, gateway) = router();

        let outcome = router
            .dispatch(lines(&["done"]), &options(), None)
            .await
            .unwrap();

        assert_eq!(outcome.notice_id, Some(1));
        assert!(!outcome.delivered_inline);
        assert!(gateway.created()[0].recipients[0].viewed);
    }

    #[tokio::test]
    async fn inert_dispatch_is_not_an_error() {
        let (router, gateway) = router();
        let opts = DispatchOptions {
            persist: false,
            ..options()
        };

        let outcome = router.dispatch(lines(&["lost"]), &opts, None).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::default());
        assert!(gateway.created().is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_a_no_op() {
        let (router, gateway) = router();
        let mut requester = FakeRequester::default();

        let outcome = router
            .dispatch(Vec::new(), &options(), Some(&mut requester))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::default());
        assert!(gateway.created().is_empty());
        assert!(requester.inline.is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_propagates_and_skips_inline() {
        let gateway = Arc::new(RecordingGateway::failing());
        let router = DeliveryRouter::new(gateway);
        let mut requester = FakeRequester::default();

        let result = router
            .dispatch(lines(&["done"]), &options(), Some(&mut requester))
            .await;

        assert_matches!(result, Err(NotifyError::Persistence(_)));
        assert!(requester.inline.is_empty());
    }

    #[tokio::test]
    async fn notice_carries_resolved_metadata() {
        let (router, gateway) = router();
        let opts = DispatchOptions {
            asynchronous: true,
            global: true,
            level: Level::Message,
            request_type: Some("changesets___promote".into()),
            organization: Some(3),
            ..options()
        };

        router.dispatch(lines(&["promoted"]), &opts, None).await.unwrap();

        let created = gateway.created();
        let created = &created[0];
        assert!(created.global);
        assert_eq!(created.level, Level::Message);
        assert_eq!(created.request_type.as_deref(), Some("changesets___promote"));
        assert_eq!(created.organization, Some(3));
    }

    #[test]
    fn details_link_escapes_quotes() {
        assert_eq!(
            details_link_line("/notices?q=\"x\""),
            "<a href=\"/notices?q=&quot;x&quot;\">Click here</a> for more details."
        );
    }
}
