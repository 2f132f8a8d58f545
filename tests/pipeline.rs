use async_db_log::memory_sink::MemorySink;
use async_db_log::{AsyncDbLogger, LogRecord, LoggerConfig, StopStatus, WorkerState};
use std::collections::HashSet;
use std::time::{Duration, Instant};

fn config(batch_size: usize, flush_ms: u64) -> LoggerConfig {
    LoggerConfig {
        queue_capacity: 10_000,
        batch_size,
        flush_interval: Duration::from_millis(flush_ms),
        stop_timeout: Duration::from_secs(5),
    }
}

async fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

fn messages(records: &[LogRecord]) -> Vec<String> {
    records.iter().map(|r| r.message.clone()).collect()
}

#[tokio::test]
async fn full_batch_flushes_before_interval() {
    let sink = MemorySink::new();
    let logger = AsyncDbLogger::start(config(2, 1_000), Box::new(sink.clone()));

    let started = Instant::now();
    logger.info("test", "a");
    logger.info("test", "b");

    assert!(wait_until(Duration::from_secs(3), || sink.record_count() == 2).await);
    assert!(started.elapsed() < Duration::from_millis(900));
    assert_eq!(sink.batches().len(), 1);
    assert_eq!(messages(&sink.records()), vec!["a", "b"]);

    assert_eq!(logger.stop().await, StopStatus::Drained);
}

#[tokio::test(start_paused = true)]
async fn partial_batch_flushes_one_interval_after_arrival() {
    let sink = MemorySink::new();
    let logger = AsyncDbLogger::start(config(100, 100), Box::new(sink.clone()));

    let logged_at = tokio::time::Instant::now();
    logger.info("test", "lonely");

    while sink.record_count() == 0 {
        assert!(logged_at.elapsed() < Duration::from_secs(2), "record never flushed");
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    let flushed_after = logged_at.elapsed();
    assert!(
        flushed_after >= Duration::from_millis(100),
        "flushed too early: {flushed_after:?}"
    );
    assert!(
        flushed_after <= Duration::from_millis(110),
        "flushed too late: {flushed_after:?}"
    );

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].message, "lonely");
    assert_eq!(logger.pending(), 0);

    assert_eq!(logger.stop().await, StopStatus::Drained);
}

#[tokio::test]
async fn unbounded_batch_size_still_flushes_by_time() {
    let sink = MemorySink::new();
    let logger = AsyncDbLogger::start(config(usize::MAX, 100), Box::new(sink.clone()));

    logger.info("test", "first");
    logger.info("test", "second");

    assert!(wait_until(Duration::from_secs(2), || sink.record_count() == 2).await);
    assert_eq!(logger.state(), WorkerState::Running);
    assert_eq!(logger.stop().await, StopStatus::Drained);
    assert_eq!(messages(&sink.records()), vec!["first", "second"]);
}

#[tokio::test]
async fn failed_batch_is_discarded_and_worker_keeps_going() {
    let sink = MemorySink::new();
    sink.fail_next(1);
    let logger = AsyncDbLogger::start(config(2, 1_000), Box::new(sink.clone()));

    logger.error("test", "lost-1", Some(r#"{"n":1}"#));
    logger.error("test", "lost-2", None);
    assert!(wait_until(Duration::from_secs(3), || sink.attempts() == 1).await);

    logger.info("test", "kept-1");
    logger.info("test", "kept-2");
    assert!(wait_until(Duration::from_secs(3), || sink.attempts() == 2).await);

    assert_eq!(messages(&sink.records()), vec!["kept-1", "kept-2"]);
    assert_eq!(logger.state(), WorkerState::Running);

    let stats = logger.stats();
    assert_eq!(stats.batches_failed, 1);
    assert_eq!(stats.records_discarded, 2);
    assert_eq!(stats.records_flushed, 2);

    assert_eq!(logger.stop().await, StopStatus::Drained);
    assert_eq!(sink.attempts(), 2);
}

#[tokio::test]
async fn stop_drains_backlog_in_order() {
    let sink = MemorySink::new();
    let logger = AsyncDbLogger::start(config(1_000, 10_000), Box::new(sink.clone()));

    for i in 0..50 {
        logger.info("test", &i.to_string());
    }

    assert_eq!(logger.stop().await, StopStatus::Drained);
    assert_eq!(logger.state(), WorkerState::Stopped);
    assert!(sink.is_closed());

    let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
    assert_eq!(messages(&sink.records()), expected);
    assert_eq!(logger.stats().records_flushed, 50);
}

#[tokio::test]
async fn records_after_stop_are_rejected() {
    let sink = MemorySink::new();
    let logger = AsyncDbLogger::start(config(10, 100), Box::new(sink.clone()));

    logger.info("test", "before");
    assert_eq!(logger.stop().await, StopStatus::Drained);

    logger.info("test", "after");
    assert_eq!(logger.pending(), 0);
    assert_eq!(logger.stats().rejected, 1);
    assert_eq!(messages(&sink.records()), vec!["before"]);

    // A second stop reports the terminal state without waiting.
    assert_eq!(logger.stop().await, StopStatus::Drained);
}

#[tokio::test]
async fn stop_returns_after_timeout_when_sink_is_slow() {
    let sink = MemorySink::new().with_write_delay(Duration::from_secs(3));
    let cfg = LoggerConfig {
        stop_timeout: Duration::from_millis(100),
        ..config(1, 100)
    };
    let logger = AsyncDbLogger::start(cfg, Box::new(sink.clone()));

    logger.info("test", "slow");

    let started = Instant::now();
    assert_eq!(logger.stop().await, StopStatus::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(logger.state(), WorkerState::Draining);
}

#[tokio::test]
async fn unreachable_sink_stalls_without_failing_producers() {
    let cfg = LoggerConfig {
        queue_capacity: 3,
        ..config(10, 100)
    };
    let logger = AsyncDbLogger::start(cfg, Box::new(MemorySink::unreachable()));

    assert!(wait_until(Duration::from_secs(2), || logger.state() == WorkerState::Failed).await);

    for m in ["A", "B", "C", "D"] {
        logger.info("test", m);
    }
    assert_eq!(logger.pending(), 3);

    let stats = logger.stats();
    assert_eq!(stats.accepted, 4);
    assert_eq!(stats.evicted, 1);
    assert_eq!(stats.records_flushed, 0);

    assert_eq!(logger.stop().await, StopStatus::Failed);
}

#[tokio::test]
async fn batch_size_below_one_is_treated_as_one() {
    let sink = MemorySink::new();
    let logger = AsyncDbLogger::start(config(0, 10_000), Box::new(sink.clone()));

    logger.info("test", "solo");
    assert!(wait_until(Duration::from_secs(2), || sink.record_count() == 1).await);

    assert_eq!(logger.stop().await, StopStatus::Drained);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_producers_flush_every_record_once() {
    let sink = MemorySink::new();
    let logger = AsyncDbLogger::start(config(64, 100), Box::new(sink.clone()));

    let producers: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    logger.log(LogRecord::new("DEBUG", format!("producer-{t}"), i.to_string()));
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    assert_eq!(logger.stop().await, StopStatus::Drained);

    let records = sink.records();
    assert_eq!(records.len(), 2_000);
    assert!(sink.batches().iter().all(|b| !b.is_empty() && b.len() <= 64));

    let unique: HashSet<(String, String)> = records
        .iter()
        .map(|r| (r.source.clone(), r.message.clone()))
        .collect();
    assert_eq!(unique.len(), 2_000);

    for t in 0..4 {
        let source = format!("producer-{t}");
        let seq: Vec<u32> = records
            .iter()
            .filter(|r| r.source == source)
            .map(|r| r.message.parse().unwrap())
            .collect();
        assert_eq!(seq, (0..500).collect::<Vec<u32>>());
    }
}
