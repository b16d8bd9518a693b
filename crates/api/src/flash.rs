//! Request-scoped inline notices.
//!
//! [`FlashContext`] is what a handler hands to the notifier as the
//! requester. Inline notices are grouped by level, then by how they should
//! be shown, and returned with the response body.

use std::collections::BTreeMap;

use herald_core::gateway::RequesterContext;
use herald_core::level::{Level, SendAs};
use serde_json::Value;

/// Inline notices collected while handling one request.
#[derive(Debug, Clone, Default)]
pub struct FlashContext {
    details_url: String,
    request_type: Option<String>,
    entries: BTreeMap<&'static str, BTreeMap<&'static str, Vec<String>>>,
}

impl FlashContext {
    /// `details_url` is where the details link in an inline notice points.
    pub fn new(details_url: impl Into<String>) -> Self {
        Self {
            details_url: details_url.into(),
            ..Self::default()
        }
    }

    /// Name of the action being handled, used as the default request type.
    pub fn with_request_type(mut self, request_type: impl Into<String>) -> Self {
        self.request_type = Some(request_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines attached so far for one level and presentation.
    pub fn lines(&self, level: Level, send_as: SendAs) -> &[String] {
        self.entries
            .get(level.as_str())
            .and_then(|by_kind| by_kind.get(send_as.as_str()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `{ "<level>": { "<send_as>": [lines] } }`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.entries).unwrap_or(Value::Null)
    }
}

impl RequesterContext for FlashContext {
    fn attach_inline_notice(&mut self, level: Level, send_as: SendAs, lines: Vec<String>) {
        self.entries
            .entry(level.as_str())
            .or_default()
            .entry(send_as.as_str())
            .or_default()
            .extend(lines);
    }

    fn details_url(&self) -> String {
        self.details_url.clone()
    }

    fn request_type(&self) -> Option<String> {
        self.request_type.clone()
    }
}
