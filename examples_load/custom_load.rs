use std::time::{Duration, Instant};

use async_db_log::memory_sink::NoopSink;
use async_db_log::{AsyncDbLogger, LoggerConfig};

#[tokio::main]
async fn main() {
    let config = LoggerConfig {
        queue_capacity: 50_000,
        batch_size: 1_000,
        flush_interval: Duration::from_millis(200),
        stop_timeout: Duration::from_secs(10),
    };
    let logger = AsyncDbLogger::start(config, Box::new(NoopSink));

    let threads: u64 = 4;
    let per_thread: u64 = 100_000;
    let start = Instant::now();

    let producers: Vec<_> = (0..threads)
        .map(|t| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..per_thread {
                    logger.error("load", &format!("custom load test error {t}-{i}"), None);
                }
            })
        })
        .collect();
    for p in producers {
        let _ = p.join();
    }

    let n = threads * per_thread;
    let elapsed = start.elapsed();
    println!("custom config: enqueued {} records from {} threads in {:?} (~{:.0} rec/s)",
        n,
        threads,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    let status = logger.stop().await;
    println!("stop: {:?}, {:?}", status, logger.stats());
}
