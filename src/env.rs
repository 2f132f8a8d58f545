//! Environment variable names used by this crate for convenient
//! configuration of the logger from services.
//!
//! These are purely helpers; the core types remain decoupled from
//! environment access.

/// Maximum number of records held by the intake queue.
pub const LOG_SINK_QUEUE_CAPACITY_ENV: &str = "LOG_SINK_QUEUE_CAPACITY";

/// Number of records that triggers a flush.
pub const LOG_SINK_BATCH_SIZE_ENV: &str = "LOG_SINK_BATCH_SIZE";

/// Maximum time between flushes, in milliseconds.
pub const LOG_SINK_FLUSH_INTERVAL_MS_ENV: &str = "LOG_SINK_FLUSH_INTERVAL_MS";

/// Bounded wait used by `stop()`, in milliseconds.
pub const LOG_SINK_STOP_TIMEOUT_MS_ENV: &str = "LOG_SINK_STOP_TIMEOUT_MS";

/// Database URL, e.g. `postgres://127.0.0.1:5432/app` or `sqlite://logs.db`.
pub const LOG_SINK_DATABASE_URL_ENV: &str = "LOG_SINK_DATABASE_URL";

/// Optional database user, overrides the one in the URL.
pub const LOG_SINK_DATABASE_USER_ENV: &str = "LOG_SINK_DATABASE_USER";

/// Optional database password, overrides the one in the URL.
pub const LOG_SINK_DATABASE_PASSWORD_ENV: &str = "LOG_SINK_DATABASE_PASSWORD";

/// Target table name used to build the default insert statement.
pub const LOG_SINK_TABLE_ENV: &str = "LOG_SINK_TABLE";

/// Full insert statement, overrides the table-derived default.
pub const LOG_SINK_INSERT_SQL_ENV: &str = "LOG_SINK_INSERT_SQL";

/// Read an environment variable, treating unset and blank values alike.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
