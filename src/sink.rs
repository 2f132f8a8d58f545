use crate::record::LogRecord;
use async_trait::async_trait;
use std::error::Error;

/// Boxed error carried by [`SinkError`]; the concrete cause stays opaque
/// to the worker.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failures reported by a sink.
///
/// The worker treats every [`SinkError::Write`] the same way regardless of
/// the underlying cause: the batch is rolled back and discarded.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    /// Connection could not be opened or the insert statement could not be
    /// prepared. Fatal to the worker.
    #[error("sink initialization failed: {0}")]
    Init(#[source] BoxError),

    /// A batch could not be bound, executed or committed.
    #[error("sink write failed: {0}")]
    Write(#[source] BoxError),

    /// Releasing the connection failed.
    #[error("sink close failed: {0}")]
    Close(#[source] BoxError),
}

impl SinkError {
    pub fn init(err: impl Into<BoxError>) -> Self {
        SinkError::Init(err.into())
    }

    pub fn write(err: impl Into<BoxError>) -> Self {
        SinkError::Write(err.into())
    }

    pub fn close(err: impl Into<BoxError>) -> Self {
        SinkError::Close(err.into())
    }
}

/// Destination that persists whole batches of [`LogRecord`]s.
///
/// A sink is owned exclusively by the worker task for its entire lifetime,
/// so methods take `&mut self` and implementations need no locking around
/// their connection.
#[async_trait]
pub trait BatchSink: Send {
    /// Persist `records` as a single unit.
    ///
    /// **Parameters**
    /// - `records`: the accumulated batch, in enqueue order. Records must be
    ///   written in this order.
    ///
    /// **Returns**
    /// - `Ok(())` once the batch is committed.
    /// - `Err(SinkError::Write(..))` if anything failed. The implementation
    ///   is expected to have rolled back already; the worker discards the
    ///   batch and never retries it.
    async fn write_batch(&mut self, records: &[LogRecord]) -> Result<(), SinkError>;

    /// Release the underlying connection. Called once when the worker stops.
    ///
    /// Default implementation is a no-op.
    async fn close(self: Box<Self>) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Opens a [`BatchSink`] from inside the worker task.
///
/// Connecting is deferred to the worker so the connection is created on,
/// and owned by, the task that uses it.
#[async_trait]
pub trait SinkConnector: Send + 'static {
    /// Open the connection and prepare the insert statement.
    ///
    /// **Returns**
    /// - A ready sink.
    /// - `Err(SinkError::Init(..))` if the worker must not start.
    async fn connect(self: Box<Self>) -> Result<Box<dyn BatchSink>, SinkError>;
}
