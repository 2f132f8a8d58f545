use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEBUG: &str = "DEBUG";
pub const INFO: &str = "INFO";
pub const WARN: &str = "WARN";
pub const ERROR: &str = "ERROR";

/// Level used when a producer does not supply one.
pub const DEFAULT_LEVEL: &str = INFO;

/// Source used when a producer does not supply one.
pub const DEFAULT_SOURCE: &str = "app";

/// One log event as it is persisted: five columns in table order.
///
/// Records are immutable once built. `context` is the only nullable field
/// and conventionally carries a serialized JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub source: String,
    pub message: String,
    pub context: Option<String>,
}

impl LogRecord {
    /// Build a record stamped with the current time and no context.
    pub fn new(
        level: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level: level.into(),
            source: source.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Build a record from optional parts, filling in the defaults for any
    /// missing field (now, `INFO`, `app`, empty message).
    pub fn from_parts(
        timestamp: Option<DateTime<Utc>>,
        level: Option<String>,
        source: Option<String>,
        message: Option<String>,
        context: Option<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.unwrap_or_else(Utc::now),
            level: level.unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            source: source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            message: message.unwrap_or_default(),
            context,
        }
    }

    /// Attach an already serialized JSON context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach a JSON value as context, serialized compactly.
    pub fn with_json_context(mut self, context: &serde_json::Value) -> Self {
        self.context = Some(context.to_string());
        self
    }
}

impl Default for LogRecord {
    fn default() -> Self {
        Self::from_parts(None, None, None, None, None)
    }
}
