//! Dispatch option layering and validation.
//!
//! Options are supplied as [`OptionOverrides`] layers. Each layer only sets
//! the fields it cares about; [`resolve`] stacks them on top of the built-in
//! defaults, fills in the recipient and checks the cross-field invariants,
//! producing a fully populated [`DispatchOptions`].
//!
//! Layer precedence, lowest first:
//!
//! 1. built-in defaults ([`builtin_defaults`])
//! 2. context defaults (notifier-level defaults, the requester's action)
//! 3. entry-point defaults (`warning` turns persistence off, ...)
//! 4. caller options

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::NotifyError;
use crate::gateway::CurrentUserProvider;
use crate::level::{Level, SendAs};
use crate::types::{DbId, UserId};

/// Option keys accepted from untyped (JSON) callers.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "level",
    "asynchronous",
    "persist",
    "global",
    "details",
    "request_type",
    "send_as",
    "user",
    "organization",
];

// ---------------------------------------------------------------------------
// OptionOverrides
// ---------------------------------------------------------------------------

/// A partial set of dispatch options.
///
/// `None` means "not set by this layer". The clearable fields (`details`,
/// `request_type`, `organization`) use `Some(None)` to explicitly remove a
/// value set by a lower layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionOverrides {
    #[serde(default, deserialize_with = "present")]
    pub level: Option<Level>,
    #[serde(default, deserialize_with = "present")]
    pub asynchronous: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub persist: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub global: Option<bool>,
    #[serde(default, deserialize_with = "explicit")]
    pub details: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub request_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub send_as: Option<SendAs>,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default, deserialize_with = "explicit")]
    pub organization: Option<Option<DbId>>,
}

/// A key that, when present, must carry a real value (`null` is rejected).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A key where `null` means "clear the value from lower layers".
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl OptionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options arriving as JSON.
    ///
    /// Unknown keys, unknown enum values and non-boolean flags are all
    /// reported as [`NotifyError::InvalidOptions`].
    pub fn from_json(value: serde_json::Value) -> Result<Self, NotifyError> {
        if !value.is_object() {
            return Err(NotifyError::invalid("options must be a JSON object"));
        }
        serde_json::from_value(value).map_err(|e| NotifyError::invalid(e.to_string()))
    }

    /// Stack `over` on top of `self`. Fields set in `over` win.
    pub fn merge(self, over: OptionOverrides) -> OptionOverrides {
        OptionOverrides {
            level: over.level.or(self.level),
            asynchronous: over.asynchronous.or(self.asynchronous),
            persist: over.persist.or(self.persist),
            global: over.global.or(self.global),
            details: over.details.or(self.details),
            request_type: over.request_type.or(self.request_type),
            send_as: over.send_as.or(self.send_as),
            user: over.user.or(self.user),
            organization: over.organization.or(self.organization),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_asynchronous(mut self, asynchronous: bool) -> Self {
        self.asynchronous = Some(asynchronous);
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = Some(persist);
        self
    }

    pub fn with_global(mut self, global: bool) -> Self {
        self.global = Some(global);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(Some(details.into()));
        self
    }

    /// Explicitly drop details set by a lower layer.
    pub fn without_details(mut self) -> Self {
        self.details = Some(None);
        self
    }

    pub fn with_request_type(mut self, request_type: impl Into<String>) -> Self {
        self.request_type = Some(Some(request_type.into()));
        self
    }

    pub fn with_send_as(mut self, send_as: SendAs) -> Self {
        self.send_as = Some(send_as);
        self
    }

    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_organization(mut self, organization: DbId) -> Self {
        self.organization = Some(Some(organization));
        self
    }
}

// ---------------------------------------------------------------------------
// DispatchOptions
// ---------------------------------------------------------------------------

/// Fully resolved options for a single dispatch call.
///
/// Only obtainable through [`resolve`], so `asynchronous` and a non-empty
/// `details` always imply `persist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOptions {
    pub level: Level,
    pub asynchronous: bool,
    pub persist: bool,
    pub global: bool,
    pub details: Option<String>,
    pub request_type: Option<String>,
    pub send_as: SendAs,
    pub user: UserId,
    pub organization: Option<DbId>,
}

/// The lowest option layer.
///
/// Dispatches without an attached requester default to asynchronous, since
/// there is nobody to present an inline notice to.
pub fn builtin_defaults(has_requester: bool) -> OptionOverrides {
    OptionOverrides {
        level: Some(Level::Success),
        asynchronous: Some(!has_requester),
        persist: Some(true),
        global: Some(false),
        details: Some(None),
        request_type: Some(None),
        send_as: Some(SendAs::Notices),
        user: None,
        organization: Some(None),
    }
}

/// Merge `caller` over `context_defaults` over the built-in defaults and
/// validate the result.
///
/// A missing `user` is taken from `current_user`. An empty `details` string
/// is treated as no details: it resolves to `None` and does not require
/// `persist`.
pub fn resolve(
    caller: OptionOverrides,
    context_defaults: OptionOverrides,
    has_requester: bool,
    current_user: &dyn CurrentUserProvider,
) -> Result<DispatchOptions, NotifyError> {
    let merged = builtin_defaults(has_requester)
        .merge(context_defaults)
        .merge(caller);

    let user = match merged.user {
        Some(user) => user,
        None => current_user.current().ok_or_else(|| {
            NotifyError::invalid("no recipient: `user` is not set and there is no current user")
        })?,
    };

    let level = merged.level.ok_or_else(|| missing("level"))?;
    let send_as = merged.send_as.ok_or_else(|| missing("send_as"))?;
    let asynchronous = merged.asynchronous.ok_or_else(|| missing("asynchronous"))?;
    let persist = merged.persist.ok_or_else(|| missing("persist"))?;
    let global = merged.global.ok_or_else(|| missing("global"))?;

    // An empty details string carries nothing worth a link or a column.
    let details = merged.details.flatten().filter(|d| !d.is_empty());

    if asynchronous && !persist {
        return Err(NotifyError::invalid("cannot be asynchronous without persist"));
    }
    if details.is_some() && !persist {
        return Err(NotifyError::invalid("cannot use details without persist"));
    }

    Ok(DispatchOptions {
        level,
        asynchronous,
        persist,
        global,
        details,
        request_type: merged.request_type.flatten(),
        send_as,
        user,
        organization: merged.organization.flatten(),
    })
}

fn missing(key: &str) -> NotifyError {
    NotifyError::invalid(format!("option '{key}' has no value"))
}
