use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a report event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Warning,
    Critical,
    Action,
    Info,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Action => "action",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified event waiting to be rendered by the reporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEvent {
    pub at: DateTime<Utc>,
    pub kind: EventKind,
    pub message: String,
}

impl ReportEvent {
    pub fn new(at: DateTime<Utc>, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            at,
            kind,
            message: message.into(),
        }
    }

    pub fn warning(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(at, EventKind::Warning, message)
    }

    pub fn critical(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(at, EventKind::Critical, message)
    }

    pub fn action(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(at, EventKind::Action, message)
    }

    pub fn info(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(at, EventKind::Info, message)
    }
}
