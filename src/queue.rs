use crate::record::LogRecord;
use crossbeam::queue::ArrayQueue;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

/// Fixed-capacity intake buffer shared by producers and the worker.
///
/// Pushing never blocks: when the ring is full the oldest resident record
/// is evicted to make room. The ring itself is lock-free, so producers on
/// any thread only ever pay for a couple of atomic operations. The worker
/// parks on a [`Notify`] between records.
pub struct IntakeQueue {
    ring: ArrayQueue<LogRecord>,
    notify: Notify,
}

impl IntakeQueue {
    /// Create a queue holding at most `capacity` records (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: ArrayQueue::new(capacity.max(1)),
            notify: Notify::new(),
        }
    }

    /// Insert a record, evicting the oldest one if the queue is full.
    ///
    /// **Returns**
    /// - `Some(evicted)` when a resident record had to be dropped.
    /// - `None` when there was room.
    pub fn push(&self, record: LogRecord) -> Option<LogRecord> {
        let evicted = self.ring.force_push(record);
        self.notify.notify_one();
        evicted
    }

    /// Wait up to `wait` for a record.
    ///
    /// Returns `None` on timeout, and also when the worker is woken through
    /// [`IntakeQueue::wake`] while the queue is empty, so callers must treat
    /// `None` as "re-check your loop condition".
    pub async fn pop_timeout(&self, wait: Duration) -> Option<LogRecord> {
        let notified = self.notify.notified();
        if let Some(record) = self.ring.pop() {
            return Some(record);
        }
        let _ = timeout(wait, notified).await;
        self.ring.pop()
    }

    /// Move up to `max` records into `out`, oldest first, without waiting.
    ///
    /// **Returns** the number of records moved.
    pub fn drain_into(&self, out: &mut Vec<LogRecord>, max: usize) -> usize {
        let mut moved = 0;
        while moved < max {
            match self.ring.pop() {
                Some(record) => {
                    out.push(record);
                    moved += 1;
                }
                None => break,
            }
        }
        moved
    }

    /// Remove and return up to `max` records, oldest first.
    pub fn drain_up_to(&self, max: usize) -> Vec<LogRecord> {
        let mut out = Vec::with_capacity(max.min(self.ring.len()));
        self.drain_into(&mut out, max);
        out
    }

    /// Wake a worker blocked in [`IntakeQueue::pop_timeout`].
    pub fn wake(&self) {
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn rec(message: &str) -> LogRecord {
        LogRecord::new("INFO", "test", message)
    }

    fn messages(records: &[LogRecord]) -> Vec<&str> {
        records.iter().map(|r| r.message.as_str()).collect()
    }

    #[test]
    fn full_queue_evicts_oldest() {
        let queue = IntakeQueue::new(3);
        assert!(queue.push(rec("A")).is_none());
        assert!(queue.push(rec("B")).is_none());
        assert!(queue.push(rec("C")).is_none());

        let evicted = queue.push(rec("D")).expect("A should be evicted");
        assert_eq!(evicted.message, "A");

        let left = queue.drain_up_to(10);
        assert_eq!(messages(&left), vec!["B", "C", "D"]);
    }

    #[test]
    fn keeps_most_recent_capacity_records_in_order() {
        let queue = IntakeQueue::new(5);
        for i in 0..12 {
            queue.push(rec(&i.to_string()));
        }

        assert_eq!(queue.len(), 5);
        let left = queue.drain_up_to(100);
        assert_eq!(messages(&left), vec!["7", "8", "9", "10", "11"]);
    }

    #[test]
    fn drain_stops_at_requested_count() {
        let queue = IntakeQueue::new(10);
        for m in ["a", "b", "c", "d"] {
            queue.push(rec(m));
        }

        let mut out = vec![rec("first")];
        assert_eq!(queue.drain_into(&mut out, 2), 2);
        assert_eq!(messages(&out), vec!["first", "a", "b"]);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.drain_into(&mut out, 0), 0);
        assert_eq!(queue.drain_into(&mut out, 10), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let queue = IntakeQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.push(rec("x"));
        queue.push(rec("y"));
        assert_eq!(messages(&queue.drain_up_to(5)), vec!["y"]);
    }

    #[test]
    fn concurrent_producers_never_exceed_capacity() {
        let queue = Arc::new(IntakeQueue::new(64));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..1_000 {
                        queue.push(rec(&format!("{t}-{i}")));
                        assert!(queue.len() <= 64);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(queue.len(), 64);
        // Each producer's surviving records keep their relative order.
        let left = queue.drain_up_to(64);
        for t in 0..8 {
            let prefix = format!("{t}-");
            let seq: Vec<u32> = left
                .iter()
                .filter_map(|r| r.message.strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert!(seq.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[tokio::test]
    async fn pop_timeout_returns_none_when_idle() {
        let queue = IntakeQueue::new(4);
        let started = Instant::now();
        assert!(queue.pop_timeout(Duration::from_millis(30)).await.is_none());
        assert!(started.elapsed() >= Duration::from_millis(25));
    }

    #[tokio::test]
    async fn pop_timeout_wakes_on_push() {
        let queue = Arc::new(IntakeQueue::new(4));
        let producer = Arc::clone(&queue);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.push(rec("late"));
        });

        let started = Instant::now();
        let got = queue.pop_timeout(Duration::from_secs(5)).await;
        assert_eq!(got.map(|r| r.message), Some("late".to_string()));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn wake_interrupts_wait_without_record() {
        let queue = Arc::new(IntakeQueue::new(4));
        let waker = Arc::clone(&queue);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waker.wake();
        });

        let started = Instant::now();
        assert!(queue.pop_timeout(Duration::from_secs(5)).await.is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
