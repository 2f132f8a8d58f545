use crate::env::{
    env_opt, LOG_SINK_BATCH_SIZE_ENV, LOG_SINK_FLUSH_INTERVAL_MS_ENV, LOG_SINK_QUEUE_CAPACITY_ENV,
    LOG_SINK_STOP_TIMEOUT_MS_ENV,
};
use std::time::Duration;

pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;
pub const DEFAULT_BATCH_SIZE: usize = 200;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(1_000);
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Lower bound applied to `flush_interval`.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Logger configuration.
///
/// Controls the size of the intake queue, the batch size handed to the
/// sink, how often a partial batch is flushed anyway, and how long
/// `stop()` waits for the worker to drain.
///
/// **Fields**
/// - `queue_capacity`: maximum number of records held before the oldest
///   ones start being dropped.
/// - `batch_size`: number of accumulated records that triggers a flush.
/// - `flush_interval`: maximum time between flushes even with a partial
///   batch; also the worker's wait timeout.
/// - `stop_timeout`: bounded wait for draining on `stop()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub stop_timeout: Duration,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// Error returned when configuration values cannot be parsed.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: expected a non-negative integer")]
    InvalidNumber { key: String, value: String },
}

impl LoggerConfig {
    /// Return a copy with minimum thresholds enforced to avoid degenerate
    /// configurations: at least one queued record, a batch size of at least
    /// one and a flush interval of at least [`MIN_FLUSH_INTERVAL`].
    pub fn normalized(&self) -> Self {
        Self {
            queue_capacity: self.queue_capacity.max(1),
            batch_size: self.batch_size.max(1),
            flush_interval: self.flush_interval.max(MIN_FLUSH_INTERVAL),
            stop_timeout: self.stop_timeout,
        }
    }

    /// Load configuration from `LOG_SINK_*` environment variables, using
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_opt)
    }

    /// Same as [`LoggerConfig::from_env`] but reading values through
    /// `lookup`, which keeps tests away from process-global state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |key: &str| -> Result<Option<u64>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidNumber {
                        key: key.to_string(),
                        value: raw,
                    }),
            }
        };

        Ok(Self {
            queue_capacity: number(LOG_SINK_QUEUE_CAPACITY_ENV)?
                .map_or(defaults.queue_capacity, |v| v as usize),
            batch_size: number(LOG_SINK_BATCH_SIZE_ENV)?
                .map_or(defaults.batch_size, |v| v as usize),
            flush_interval: number(LOG_SINK_FLUSH_INTERVAL_MS_ENV)?
                .map_or(defaults.flush_interval, Duration::from_millis),
            stop_timeout: number(LOG_SINK_STOP_TIMEOUT_MS_ENV)?
                .map_or(defaults.stop_timeout, Duration::from_millis),
        })
    }
}
