use async_trait::async_trait;

use async_db_log::{
    AsyncDbLogger, BatchSink, LogRecord, LoggerConfig, SinkConnector, SinkError,
};

/// Example of integrating a completely custom backend by implementing
/// `SinkConnector` and `BatchSink` directly. Imagine this talks to some
/// proprietary DB for which this crate does not provide a built-in sink.
struct MyCustomDb;

struct MyCustomDbSink {
    batches: usize,
}

#[async_trait]
impl SinkConnector for MyCustomDb {
    async fn connect(self: Box<Self>) -> Result<Box<dyn BatchSink>, SinkError> {
        // Open your client here; returning Err stops the worker.
        Ok(Box::new(MyCustomDbSink { batches: 0 }))
    }
}

#[async_trait]
impl BatchSink for MyCustomDbSink {
    async fn write_batch(&mut self, records: &[LogRecord]) -> Result<(), SinkError> {
        // Here you would write the batch with your own client library.
        // For the sake of example we just print it.
        self.batches += 1;
        println!("[my-custom-db] batch #{} with {} records", self.batches, records.len());
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let logger = AsyncDbLogger::start(LoggerConfig::default(), Box::new(MyCustomDb));

    logger.info("custom", "custom backend example started");
    logger.error("custom", "simulated error sent via custom backend", Some(r#"{"db":"my-custom-db"}"#));

    println!("stop: {:?}", logger.stop().await);
}
