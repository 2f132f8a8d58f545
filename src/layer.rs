use crate::logger::AsyncDbLogger;
use crate::record::LogRecord;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Targets whose events are never forwarded: the crate's own worker
/// diagnostics and the database driver it drives.
const IGNORED_TARGET_PREFIXES: &[&str] = &[env!("CARGO_CRATE_NAME"), "sqlx"];

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// hands them to an [`AsyncDbLogger`].
///
/// Forwarding is a non-blocking queue push, so application threads never
/// wait on the database. The event target becomes the record's `source`,
/// the `message` field its message, and every other field is collected
/// into a JSON object stored as `context`.
pub struct DbLogLayer {
    logger: AsyncDbLogger,
    max_level: Level,
}

impl DbLogLayer {
    /// Forward events at `INFO` and above.
    pub fn new(logger: AsyncDbLogger) -> Self {
        Self::with_max_level(logger, Level::INFO)
    }

    /// Forward events at `max_level` and anything less verbose.
    pub fn with_max_level(logger: AsyncDbLogger, max_level: Level) -> Self {
        Self { logger, max_level }
    }
}

fn is_ignored(target: &str) -> bool {
    IGNORED_TARGET_PREFIXES.iter().any(|prefix| {
        target == *prefix
            || target
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

impl<S> Layer<S> for DbLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level || is_ignored(meta.target()) {
            return;
        }

        let mut fields = Map::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let context = if fields.is_empty() {
            None
        } else {
            Some(Value::Object(fields).to_string())
        };

        self.logger.log(LogRecord {
            timestamp: Utc::now(),
            level: meta.level().to_string(),
            source: meta.target().to_string(),
            message: message.unwrap_or_default(),
            context,
        });
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut Map<String, Value>,
    message: &'a mut Option<String>,
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_and_driver_targets_are_ignored() {
        assert!(is_ignored("async_db_log"));
        assert!(is_ignored("async_db_log::worker"));
        assert!(is_ignored("sqlx::query"));
        assert!(!is_ignored("sqlx_like_app"));
        assert!(!is_ignored("billing::orders"));
    }
}
