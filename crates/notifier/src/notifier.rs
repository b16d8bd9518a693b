//! Application-facing notice entry points.
//!
//! Each entry point is a thin layer of option defaults over
//! [`Notifier::notice`]:
//!
//! | entry point      | defaults                                         |
//! |------------------|--------------------------------------------------|
//! | `success`        | none                                             |
//! | `message`        | level = message, asynchronous                    |
//! | `warning`        | level = warning, not persisted                   |
//! | `error`          | level = error                                    |
//! | `invalid_record` | level = error, sent as validation errors, not persisted |
//! | `exception`      | see [`herald_core::translate::from_exception`]   |
//!
//! Options passed by the caller always win over these defaults.

use std::sync::Arc;

use herald_core::error::NotifyError;
use herald_core::gateway::{CurrentUserProvider, PersistenceGateway, RequesterContext};
use herald_core::level::Level;
use herald_core::normalize::{normalize, RawMessage};
use herald_core::options::{resolve, OptionOverrides};
use herald_core::translate::{self, Failure, InvalidRecord};

use crate::router::{DeliveryRouter, DispatchOutcome};

/// Who a dispatch is for and where it was triggered from.
///
/// Code running inside a request passes the request as `requester`;
/// background work passes `None` and gets asynchronous delivery by default.
pub struct DispatchContext<'a> {
    pub current_user: &'a dyn CurrentUserProvider,
    pub requester: Option<&'a mut dyn RequesterContext>,
}

impl<'a> DispatchContext<'a> {
    /// Context for work that is not tied to a request.
    pub fn background(current_user: &'a dyn CurrentUserProvider) -> Self {
        Self {
            current_user,
            requester: None,
        }
    }

    /// Context for a dispatch made while handling `requester`.
    pub fn request(
        current_user: &'a dyn CurrentUserProvider,
        requester: &'a mut dyn RequesterContext,
    ) -> Self {
        Self {
            current_user,
            requester: Some(requester),
        }
    }
}

/// Sends notices.
///
/// Cheap to clone; holds only the gateway handle and the immutable default
/// options it was built with.
#[derive(Clone)]
pub struct Notifier {
    router: DeliveryRouter,
    defaults: OptionOverrides,
}

impl Notifier {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            router: DeliveryRouter::new(gateway),
            defaults: OptionOverrides::new(),
        }
    }

    /// Defaults applied to every dispatch from this notifier, above the
    /// built-in ones and the requester's action.
    pub fn with_defaults(mut self, defaults: OptionOverrides) -> Self {
        self.defaults = defaults;
        self
    }

    pub async fn success(
        &self,
        ctx: &mut DispatchContext<'_>,
        message: impl Into<RawMessage>,
        options: OptionOverrides,
    ) -> Result<DispatchOutcome, NotifyError> {
        self.notice(ctx, message, options).await
    }

    /// Informational notice, delivered asynchronously unless overridden.
    pub async fn message(
        &self,
        ctx: &mut DispatchContext<'_>,
        message: impl Into<RawMessage>,
        options: OptionOverrides,
    ) -> Result<DispatchOutcome, NotifyError> {
        let defaults = OptionOverrides::new()
            .with_level(Level::Message)
            .with_asynchronous(true);
        self.notice(ctx, message, defaults.merge(options)).await
    }

    /// Warning, shown inline and not stored unless overridden.
    pub async fn warning(
        &self,
        ctx: &mut DispatchContext<'_>,
        message: impl Into<RawMessage>,
        options: OptionOverrides,
    ) -> Result<DispatchOutcome, NotifyError> {
        let defaults = OptionOverrides::new()
            .with_level(Level::Warning)
            .with_persist(false);
        self.notice(ctx, message, defaults.merge(options)).await
    }

    pub async fn error(
        &self,
        ctx: &mut DispatchContext<'_>,
        message: impl Into<RawMessage>,
        options: OptionOverrides,
    ) -> Result<DispatchOutcome, NotifyError> {
        let defaults = OptionOverrides::new().with_level(Level::Error);
        self.notice(ctx, message, defaults.merge(options)).await
    }

    /// Report validation errors for data the user just submitted.
    ///
    /// For a validation failure that escaped as an error, use
    /// [`exception`](Self::exception) instead; that one is persisted.
    pub async fn invalid_record(
        &self,
        ctx: &mut DispatchContext<'_>,
        record: &InvalidRecord,
        options: OptionOverrides,
    ) -> Result<DispatchOutcome, NotifyError> {
        let t = translate::from_validation_failure(record, options);
        self.notice(ctx, t.message, t.options).await
    }

    /// Report a failure, optionally prefixed by a human-written `note`.
    pub async fn exception(
        &self,
        ctx: &mut DispatchContext<'_>,
        note: Option<&str>,
        failure: &Failure,
        options: OptionOverrides,
    ) -> Result<DispatchOutcome, NotifyError> {
        let t = translate::from_exception(note, failure, options);
        self.notice(ctx, t.message, t.options).await
    }

    /// Resolve options, normalize the message and deliver it.
    ///
    /// Options are validated before anything else happens, so an invalid
    /// option set fails even for an empty message.
    pub async fn notice(
        &self,
        ctx: &mut DispatchContext<'_>,
        message: impl Into<RawMessage>,
        options: OptionOverrides,
    ) -> Result<DispatchOutcome, NotifyError> {
        let resolved = resolve(
            options,
            self.context_defaults(ctx),
            ctx.requester.is_some(),
            ctx.current_user,
        )?;
        let lines = normalize(message);
        self.router
            .dispatch(lines, &resolved, ctx.requester.as_deref_mut())
            .await
    }

    fn context_defaults(&self, ctx: &DispatchContext<'_>) -> OptionOverrides {
        let from_request = match ctx.requester.as_deref().and_then(|r| r.request_type()) {
            Some(action) => OptionOverrides::new().with_request_type(action),
            None => OptionOverrides::new(),
        };
        from_request.merge(self.defaults.clone())
    }
}
