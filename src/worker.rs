use crate::queue::IntakeQueue;
use crate::record::LogRecord;
use crate::sink::{BatchSink, SinkConnector};
use crate::stats::LoggerStats;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Lifecycle of the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Accepting and flushing.
    Running = 0,
    /// Stop requested; flushing the remaining backlog.
    Draining = 1,
    /// Terminal: backlog flushed, connection released.
    Stopped = 2,
    /// Terminal: the sink could not be initialized, nothing is drained.
    Failed = 3,
}

impl WorkerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WorkerState::Running,
            1 => WorkerState::Draining,
            2 => WorkerState::Stopped,
            _ => WorkerState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerState::Stopped | WorkerState::Failed)
    }
}

#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    fn new() -> Self {
        StateCell(AtomicU8::new(WorkerState::Running as u8))
    }

    pub(crate) fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Running -> Draining. Leaves any other state untouched.
    pub(crate) fn request_drain(&self) -> bool {
        self.0
            .compare_exchange(
                WorkerState::Running as u8,
                WorkerState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// State shared between the producer-facing handle and the worker task.
pub(crate) struct Shared {
    pub(crate) queue: IntakeQueue,
    pub(crate) state: StateCell,
    pub(crate) stats: LoggerStats,
}

impl Shared {
    pub(crate) fn new(queue_capacity: usize) -> Self {
        Self {
            queue: IntakeQueue::new(queue_capacity),
            state: StateCell::new(),
            stats: LoggerStats::new(),
        }
    }
}

/// Single consumer of the intake queue.
pub(crate) struct Worker {
    pub(crate) shared: std::sync::Arc<Shared>,
    pub(crate) batch_size: usize,
    pub(crate) flush_interval: Duration,
}

impl Worker {
    /// Open the sink and run the loop until stop is requested and the
    /// backlog is drained.
    pub(crate) async fn run(self, connector: Box<dyn SinkConnector>) {
        let sink = match connector.connect().await {
            Ok(sink) => sink,
            Err(e) => {
                error!(error = %e, "log sink initialization failed, worker not started");
                self.shared.state.set(WorkerState::Failed);
                return;
            }
        };

        info!(
            batch_size = self.batch_size,
            flush_interval_ms = self.flush_interval.as_millis() as u64,
            "log worker started"
        );

        let sink = self.serve(sink).await;

        if let Err(e) = sink.close().await {
            warn!(error = %e, "failed to close log sink");
        }
        self.shared.state.set(WorkerState::Stopped);
        info!("log worker stopped");
    }

    async fn serve(&self, mut sink: Box<dyn BatchSink>) -> Box<dyn BatchSink> {
        let queue = &self.shared.queue;
        // batch_size has no upper bound; the batch itself grows on demand.
        let mut batch: Vec<LogRecord> =
            Vec::with_capacity(self.batch_size.min(queue.capacity()));
        let mut last_flush = Instant::now();

        while self.shared.state.get() == WorkerState::Running || !queue.is_empty() {
            // With records pending, wake up no later than their flush deadline.
            let wait = if batch.is_empty() {
                self.flush_interval
            } else {
                self.flush_interval.saturating_sub(last_flush.elapsed())
            };

            if let Some(first) = queue.pop_timeout(wait).await {
                batch.push(first);
                let room = self.batch_size.saturating_sub(batch.len());
                queue.drain_into(&mut batch, room);
            }

            if self.flush_due(&batch, last_flush) {
                self.flush(sink.as_mut(), &mut batch).await;
                last_flush = Instant::now();
            }
        }

        if !batch.is_empty() {
            debug!(records = batch.len(), "flushing remaining log batch");
            self.flush(sink.as_mut(), &mut batch).await;
        }
        sink
    }

    fn flush_due(&self, batch: &[LogRecord], last_flush: Instant) -> bool {
        !batch.is_empty()
            && (batch.len() >= self.batch_size || last_flush.elapsed() >= self.flush_interval)
    }

    /// Hand the batch to the sink and clear it whatever the outcome.
    /// A failed batch is discarded, never retried.
    async fn flush(&self, sink: &mut dyn BatchSink, batch: &mut Vec<LogRecord>) {
        let count = batch.len();
        let started = Instant::now();

        match sink.write_batch(batch).await {
            Ok(()) => {
                self.shared.stats.record_flush(count);
                debug!(
                    records = count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "flushed log batch"
                );
            }
            Err(e) => {
                self.shared.stats.record_failure(count);
                error!(records = count, error = %e, "log batch write failed, batch discarded");
            }
        }

        batch.clear();
    }
}
