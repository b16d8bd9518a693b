//! Turning failures into notice content.
//!
//! A failure is either a record that did not pass validation or any other
//! error. The two produce different messages and different option defaults;
//! see [`from_validation_failure`] and [`from_exception`].

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;

use crate::level::{Level, SendAs};
use crate::normalize::RawMessage;
use crate::options::OptionOverrides;

// ---------------------------------------------------------------------------
// InvalidRecord
// ---------------------------------------------------------------------------

/// Field-level validation messages collected for one record.
///
/// Also usable as an error value, so validation code can bubble it up with
/// `?` and still have it reported as a validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {}", .messages.join(", "))]
pub struct InvalidRecord {
    messages: Vec<String>,
}

impl InvalidRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for `field`, e.g. `("name", "can't be blank")` becomes
    /// `"Name can't be blank"`.
    pub fn add(&mut self, field: &str, message: &str) -> &mut Self {
        self.messages.push(format!("{} {message}", humanize(field)));
        self
    }

    /// Add a message that is not tied to a single field.
    pub fn add_base(&mut self, message: impl Into<String>) -> &mut Self {
        self.messages.push(message.into());
        self
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InvalidRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.trim_end_matches("_id").replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// ExceptionReport
// ---------------------------------------------------------------------------

/// Everything a notice needs to know about a general (non-validation) error.
///
/// Missing pieces are tolerated: an absent backtrace or empty message just
/// yields empty text in the notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionReport {
    /// Short name of the error type, e.g. `"ConnectError"`.
    pub kind: String,
    pub message: String,
    pub backtrace: Option<String>,
    /// Body returned by a remote service, if the error came from one.
    pub response: Option<String>,
}

impl ExceptionReport {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            backtrace: None,
            response: None,
        }
    }

    /// Build a report from a typed error. The kind is the error's type name
    /// without its module path.
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        Self::new(short_type_name::<E>(), err.to_string())
    }

    /// Build a report from an [`anyhow::Error`], taking its backtrace when
    /// one was captured.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let mut report = Self::new("anyhow::Error", err.to_string());
        report.backtrace = captured(err.backtrace());
        report
    }

    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}

fn captured(backtrace: &Backtrace) -> Option<String> {
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

/// A failure to be reported as a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A record failed validation outside the normal form flow.
    RecordInvalid(InvalidRecord),
    Exception(ExceptionReport),
}

impl Failure {
    /// Classify a typed error: an [`InvalidRecord`] is a record failure,
    /// everything else is a general exception.
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        let as_dyn: &(dyn StdError + 'static) = err;
        match as_dyn.downcast_ref::<InvalidRecord>() {
            Some(record) => Failure::RecordInvalid(record.clone()),
            None => Failure::Exception(ExceptionReport::from_error(err)),
        }
    }

    /// Classify an [`anyhow::Error`] by the same rule as
    /// [`from_error`](Self::from_error).
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<InvalidRecord>() {
            Some(record) => Failure::RecordInvalid(record.clone()),
            None => Failure::Exception(ExceptionReport::from_anyhow(err)),
        }
    }
}

impl From<InvalidRecord> for Failure {
    fn from(record: InvalidRecord) -> Self {
        Failure::RecordInvalid(record)
    }
}

impl From<ExceptionReport> for Failure {
    fn from(report: ExceptionReport) -> Self {
        Failure::Exception(report)
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Message content plus the options to dispatch it with.
///
/// `options` already has the caller's options merged over the translation
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub message: RawMessage,
    pub options: OptionOverrides,
}

/// Defaults for reporting user-input validation errors: shown as a list next
/// to the form and not kept.
pub fn validation_defaults() -> OptionOverrides {
    OptionOverrides::new()
        .with_level(Level::Error)
        .with_send_as(SendAs::ValidationErrors)
        .with_persist(false)
}

pub fn from_validation_failure(record: &InvalidRecord, options: OptionOverrides) -> Translation {
    Translation {
        message: record.messages().to_vec().into(),
        options: validation_defaults().merge(options),
    }
}

/// Translate a failure, optionally prefixed by `note`.
///
/// A record failure that arrives as an exception escaped the regular form
/// flow, so it is persisted by default. The note is not used on that path.
pub fn from_exception(note: Option<&str>, failure: &Failure, options: OptionOverrides) -> Translation {
    match failure {
        Failure::RecordInvalid(record) => {
            let forced = OptionOverrides::new().with_persist(true).merge(options);
            from_validation_failure(record, forced)
        }
        Failure::Exception(report) => {
            let defaults = OptionOverrides::new()
                .with_level(Level::Error)
                .with_details(report.backtrace.clone().unwrap_or_default());
            let message = vec![
                note.map(str::to_string),
                Some(format!("{} ({})", report.message, report.kind)),
                report.response.clone(),
            ];
            Translation {
                message: message.into(),
                options: defaults.merge(options),
            }
        }
    }
}
