//! Notice severity levels and inline grouping keys.
//!
//! Both enums round-trip through their lowercase string form, which is what
//! the `notices.level` column stores and what JSON callers send.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

pub const LEVEL_MESSAGE: &str = "message";
pub const LEVEL_SUCCESS: &str = "success";
pub const LEVEL_WARNING: &str = "warning";
pub const LEVEL_ERROR: &str = "error";

/// All valid level values.
pub const VALID_LEVELS: &[&str] = &[LEVEL_MESSAGE, LEVEL_SUCCESS, LEVEL_WARNING, LEVEL_ERROR];

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Informational, typically produced by background work.
    Message,
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Message => LEVEL_MESSAGE,
            Level::Success => LEVEL_SUCCESS,
            Level::Warning => LEVEL_WARNING,
            Level::Error => LEVEL_ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LEVEL_MESSAGE => Ok(Level::Message),
            LEVEL_SUCCESS => Ok(Level::Success),
            LEVEL_WARNING => Ok(Level::Warning),
            LEVEL_ERROR => Ok(Level::Error),
            other => Err(NotifyError::invalid(format!(
                "unknown notice level '{other}'. Must be one of: {}",
                VALID_LEVELS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SendAs
// ---------------------------------------------------------------------------

pub const SEND_AS_NOTICES: &str = "notices";
pub const SEND_AS_VALIDATION_ERRORS: &str = "validation_errors";

/// All valid send-as values.
pub const VALID_SEND_AS: &[&str] = &[SEND_AS_NOTICES, SEND_AS_VALIDATION_ERRORS];

/// Key an inline notice is grouped under when presented to the requester.
///
/// Validation errors are rendered as a list next to the form that produced
/// them; everything else goes to the regular notice area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendAs {
    Notices,
    ValidationErrors,
}

impl SendAs {
    pub fn as_str(self) -> &'static str {
        match self {
            SendAs::Notices => SEND_AS_NOTICES,
            SendAs::ValidationErrors => SEND_AS_VALIDATION_ERRORS,
        }
    }
}

impl fmt::Display for SendAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SendAs {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SEND_AS_NOTICES => Ok(SendAs::Notices),
            SEND_AS_VALIDATION_ERRORS => Ok(SendAs::ValidationErrors),
            other => Err(NotifyError::invalid(format!(
                "unknown send as '{other}'. Must be one of: {}",
                VALID_SEND_AS.join(", ")
            ))),
        }
    }
}
