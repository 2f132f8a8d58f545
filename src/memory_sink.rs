use crate::record::LogRecord;
use crate::sink::{BatchSink, SinkConnector, SinkError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A sink that simply drops all batches.
///
/// Useful for measuring the overhead of the queue and worker without any
/// external I/O.
#[derive(Clone, Debug, Default)]
pub struct NoopSink;

#[async_trait]
impl BatchSink for NoopSink {
    async fn write_batch(&mut self, _records: &[LogRecord]) -> Result<(), SinkError> {
        Ok(())
    }
}

#[async_trait]
impl SinkConnector for NoopSink {
    async fn connect(self: Box<Self>) -> Result<Box<dyn BatchSink>, SinkError> {
        Ok(self)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    batches: Vec<Vec<LogRecord>>,
    fail_next: usize,
    attempts: usize,
    closed: bool,
}

/// In-process sink that keeps every committed batch.
///
/// Clones share the same storage, so a test can hand one clone to the
/// logger and inspect another. Failures can be injected for the next `n`
/// batches, and connecting can be refused altogether.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
    refuse_connect: bool,
    write_delay: Option<Duration>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `connect` always fails.
    pub fn unreachable() -> Self {
        Self {
            refuse_connect: true,
            ..Self::default()
        }
    }

    /// Sleep this long inside every `write_batch`, simulating a slow database.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Make the next `n` batch writes fail.
    pub fn fail_next(&self, n: usize) {
        self.lock().fail_next = n;
    }

    /// Committed batches, in commit order.
    pub fn batches(&self) -> Vec<Vec<LogRecord>> {
        self.lock().batches.clone()
    }

    /// All committed records, flattened in commit order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().batches.iter().flatten().cloned().collect()
    }

    pub fn record_count(&self) -> usize {
        self.lock().batches.iter().map(Vec::len).sum()
    }

    /// Number of `write_batch` calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BatchSink for MemorySink {
    async fn write_batch(&mut self, records: &[LogRecord]) -> Result<(), SinkError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        state.attempts += 1;
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(SinkError::write("injected write failure"));
        }
        state.batches.push(records.to_vec());
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), SinkError> {
        self.lock().closed = true;
        Ok(())
    }
}

#[async_trait]
impl SinkConnector for MemorySink {
    async fn connect(self: Box<Self>) -> Result<Box<dyn BatchSink>, SinkError> {
        if self.refuse_connect {
            return Err(SinkError::init("memory sink refused connection"));
        }
        Ok(self)
    }
}
