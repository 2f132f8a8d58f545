pub mod record;
pub mod queue;
pub mod sink;
pub mod stats;
pub mod worker;
pub mod logger;
pub mod config;
pub mod env;
pub mod backend;
pub mod layer;
pub mod init;
pub mod memory_sink;

#[cfg(any(feature = "postgres", feature = "sqlite"))]
mod sql;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::SinkConfig;
pub use config::LoggerConfig;
pub use logger::{AsyncDbLogger, StopStatus};
pub use record::LogRecord;
pub use sink::{BatchSink, SinkConnector, SinkError};
pub use worker::WorkerState;
