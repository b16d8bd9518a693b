//! Interfaces the dispatch core calls into.
//!
//! The core never looks up the current user or request on its own; callers
//! pass implementations of these traits into every dispatch.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::PersistenceError;
use crate::level::{Level, SendAs};
use crate::types::{DbId, UserId};

/// Supplies the recipient when a dispatch does not name one.
pub trait CurrentUserProvider: Send + Sync {
    fn current(&self) -> Option<UserId>;
}

impl CurrentUserProvider for Option<UserId> {
    fn current(&self) -> Option<UserId> {
        *self
    }
}

/// The request currently being handled, when a dispatch happens inside one.
///
/// Inline notices attached here are presented with the response instead of
/// being polled for.
pub trait RequesterContext: Send {
    fn attach_inline_notice(&mut self, level: Level, send_as: SendAs, lines: Vec<String>);

    /// URL of the page listing notice details.
    fn details_url(&self) -> String;

    /// Name of the action being handled (e.g. `"systems___update"`), used as
    /// the default `request_type`.
    fn request_type(&self) -> Option<String> {
        None
    }
}

/// One recipient row of a persisted notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoticeRecipient {
    pub user: UserId,
    /// Already seen inline when the notice was created.
    pub viewed: bool,
}

/// A notice ready to be written, together with its recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNotice {
    pub text: String,
    pub details: Option<String>,
    pub level: Level,
    pub global: bool,
    pub request_type: Option<String>,
    pub organization: Option<DbId>,
    pub recipients: Vec<NoticeRecipient>,
}

/// Durable storage for notices.
///
/// Implementations must write the notice and all its recipient rows
/// atomically.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn create_notice(&self, notice: NewNotice) -> Result<DbId, PersistenceError>;
}
