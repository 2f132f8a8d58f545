use std::time::Instant;

use async_db_log::memory_sink::NoopSink;
use async_db_log::{AsyncDbLogger, LogRecord, LoggerConfig};

#[tokio::main]
async fn main() {
    let logger = AsyncDbLogger::start(LoggerConfig::default(), Box::new(NoopSink));

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.log(
            LogRecord::new("DEBUG", "demo", format!("hello #{i}"))
                .with_context(format!("{{\"iteration\":{i}}}")),
        );
    }
    logger.info("demo", "done!");

    let elapsed = start.elapsed();
    println!("default config: enqueued {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    let status = logger.stop().await;
    let stats = logger.stats();
    println!("stop: {:?}, flushed {} records in {} batches, evicted {}",
        status, stats.records_flushed, stats.batches_flushed, stats.evicted
    );
}
