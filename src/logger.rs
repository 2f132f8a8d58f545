use crate::backend::{BackendBuildError, SinkConfig};
use crate::config::LoggerConfig;
use crate::record::{self, LogRecord};
use crate::sink::SinkConnector;
use crate::stats::StatsSnapshot;
use crate::worker::{Shared, Worker, WorkerState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Outcome of [`AsyncDbLogger::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStatus {
    /// The worker flushed its backlog and released the connection.
    Drained,
    /// The bounded wait elapsed first. The worker keeps draining in the
    /// background, but nothing is guaranteed about the remaining records.
    TimedOut,
    /// The worker never ran (sink initialization failed) or it panicked.
    Failed,
}

struct Inner {
    shared: Arc<Shared>,
    closed: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
    stop_timeout: Duration,
}

/// Non-blocking logger that batches records into a database sink.
///
/// Cloning is cheap and every clone feeds the same queue, so a handle can
/// be passed to any number of producer threads. Producers never block and
/// never observe sink failures: when the queue is full the oldest record is
/// dropped, and a batch that fails to commit is discarded.
#[derive(Clone)]
pub struct AsyncDbLogger {
    inner: Arc<Inner>,
}

impl AsyncDbLogger {
    /// Create the intake queue and spawn the background worker.
    ///
    /// The worker opens the sink through `connector` before serving; if
    /// that fails it logs the error and exits, and records keep being
    /// accepted without ever being drained.
    ///
    /// **Parameters**
    /// - `config`: queue and batching settings; minimum thresholds are
    ///   enforced (see [`LoggerConfig::normalized`]).
    /// - `connector`: opens the sink from inside the worker task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: LoggerConfig, connector: Box<dyn SinkConnector>) -> Self {
        let config = config.normalized();
        let shared = Arc::new(Shared::new(config.queue_capacity));

        let worker = Worker {
            shared: Arc::clone(&shared),
            batch_size: config.batch_size,
            flush_interval: config.flush_interval,
        };
        let handle = tokio::spawn(worker.run(connector));

        Self {
            inner: Arc::new(Inner {
                shared,
                closed: AtomicBool::new(false),
                worker: Mutex::new(Some(handle)),
                stop_timeout: config.stop_timeout,
            }),
        }
    }

    /// Build the connector described by `sink` and start the logger.
    pub fn connect(config: LoggerConfig, sink: &SinkConfig) -> Result<Self, BackendBuildError> {
        let connector = sink.connector()?;
        Ok(Self::start(config, connector))
    }

    /// Enqueue a record. Never blocks and never fails.
    ///
    /// Records logged after [`AsyncDbLogger::stop`] was called are dropped.
    pub fn log(&self, record: LogRecord) {
        if self.inner.closed.load(Ordering::Acquire) {
            self.inner.shared.stats.record_rejected();
            return;
        }
        let evicted = self.inner.shared.queue.push(record);
        self.inner.shared.stats.record_accepted(evicted.is_some());
    }

    pub fn debug(&self, source: &str, message: &str) {
        self.log(LogRecord::new(record::DEBUG, source, message));
    }

    pub fn info(&self, source: &str, message: &str) {
        self.log(LogRecord::new(record::INFO, source, message));
    }

    pub fn warn(&self, source: &str, message: &str) {
        self.log(LogRecord::new(record::WARN, source, message));
    }

    /// Log at `ERROR` with an optional serialized JSON context.
    pub fn error(&self, source: &str, message: &str, context_json: Option<&str>) {
        let mut record = LogRecord::new(record::ERROR, source, message);
        record.context = context_json.map(str::to_string);
        self.log(record);
    }

    /// Request drain-and-close and wait, bounded by the configured stop
    /// timeout, for the worker to finish.
    ///
    /// Returns regardless of whether the backlog was fully flushed; a
    /// timeout is reported, not treated as an error. Calling `stop` again
    /// reports the current state without waiting.
    pub async fn stop(&self) -> StopStatus {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.shared.state.request_drain();
        self.inner.shared.queue.wake();

        let handle = self
            .inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            return match self.state() {
                WorkerState::Stopped => StopStatus::Drained,
                WorkerState::Failed => StopStatus::Failed,
                WorkerState::Running | WorkerState::Draining => StopStatus::TimedOut,
            };
        };

        match tokio::time::timeout(self.inner.stop_timeout, handle).await {
            Ok(Ok(())) if self.state() == WorkerState::Stopped => StopStatus::Drained,
            Ok(Ok(())) => StopStatus::Failed,
            Ok(Err(e)) => {
                error!(error = %e, "log worker terminated abnormally");
                StopStatus::Failed
            }
            Err(_) => {
                warn!(
                    pending = self.pending(),
                    timeout_ms = self.inner.stop_timeout.as_millis() as u64,
                    "log worker did not drain before stop timeout"
                );
                StopStatus::TimedOut
            }
        }
    }

    pub fn state(&self) -> WorkerState {
        self.inner.shared.state.get()
    }

    /// Records currently waiting in the intake queue.
    pub fn pending(&self) -> usize {
        self.inner.shared.queue.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.shared.stats.snapshot()
    }
}
