//! Per-subsystem task queue and scheduler
//!
//! Each subsystem runs as one tokio task that owns the subsystem state and
//! drains a FIFO of [`Request`]s. That single worker is the serialization
//! guarantee the call state machine relies on: no two tasks for the same
//! subsystem ever run concurrently, and all mutation of a subsystem's state
//! happens inside its worker.
//!
//! Delayed work waits in a deadline-ordered heap inside the worker. A pending
//! timer never blocks already-ready tasks behind it; expired timers drain in
//! deadline order before the next channel receive. There is no cancellation:
//! once scheduled, a delayed task fires unless the whole subsystem is torn
//! down (every external handle dropped).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use crate::request::Request;

/// A subsystem: a named bundle of state with a task processor.
///
/// `process` must be non-blocking and must not panic on malformed input;
/// failures are converted into failure completions inside the implementation.
pub trait Subsystem: Send + 'static {
    fn name(&self) -> &'static str;

    /// Handle one task. `queue` addresses this subsystem's own queue so
    /// handlers can schedule follow-up work (delayed transitions, ticks).
    fn process(&mut self, req: Request, queue: &QueueHandle);
}

struct Scheduled {
    req: Request,
    delay: Duration,
}

/// Handle for enqueueing work onto a subsystem's queue.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    name: &'static str,
    tx: mpsc::UnboundedSender<Scheduled>,
}

impl QueueHandle {
    /// Append a task to the FIFO; it runs after everything already eligible.
    pub fn add(&self, req: Request) {
        self.send(Scheduled {
            req,
            delay: Duration::ZERO,
        });
    }

    /// Schedule a task to become eligible no earlier than now + `delay_ms`.
    /// Non-positive delays are treated as "as soon as possible", not errors.
    pub fn add_delayed(&self, req: Request, delay_ms: i64) {
        let delay = Duration::from_millis(delay_ms.max(0) as u64);
        self.send(Scheduled { req, delay });
    }

    fn send(&self, item: Scheduled) {
        if self.tx.send(item).is_err() {
            warn!(subsystem = self.name, "queue closed, task dropped");
        }
    }
}

struct PendingTimer {
    fire_at: Instant,
    seq: u64,
    req: Request,
}

impl PartialEq for PendingTimer {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for PendingTimer {}

impl PartialOrd for PendingTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingTimer {
    // Reversed so the earliest deadline sits on top of the max-heap; the
    // sequence number keeps equal deadlines in schedule order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Spawn the worker task for `subsystem` and return the handle to its queue.
///
/// The worker exits once every external [`QueueHandle`] has been dropped;
/// timers still pending at that point are discarded with the subsystem.
pub fn spawn_subsystem<S: Subsystem>(mut subsystem: S) -> QueueHandle {
    let name = subsystem.name();
    let (tx, mut rx) = mpsc::unbounded_channel::<Scheduled>();
    // The worker keeps only a weak sender to itself so self-scheduled work
    // does not prevent teardown when external handles are gone.
    let weak_tx = tx.downgrade();
    let handle = QueueHandle { name, tx };

    tokio::spawn(async move {
        let mut pending: BinaryHeap<PendingTimer> = BinaryHeap::new();
        let mut seq: u64 = 0;
        info!(subsystem = name, "worker started");

        loop {
            // Fire everything whose deadline has elapsed, in deadline order.
            let now = Instant::now();
            while pending.peek().is_some_and(|t| t.fire_at <= now) {
                let timer = pending.pop().expect("peeked timer");
                run_one(&mut subsystem, timer.req, &weak_tx, name);
            }

            let next_deadline = pending.peek().map(|t| t.fire_at);
            tokio::select! {
                item = rx.recv() => {
                    let Some(Scheduled { req, delay }) = item else {
                        break;
                    };
                    if delay.is_zero() {
                        run_one(&mut subsystem, req, &weak_tx, name);
                    } else {
                        seq += 1;
                        pending.push(PendingTimer {
                            fire_at: Instant::now() + delay,
                            seq,
                            req,
                        });
                    }
                }
                _ = async { sleep_until(next_deadline.expect("deadline")).await },
                        if next_deadline.is_some() => {}
            }
        }

        if !pending.is_empty() {
            debug!(
                subsystem = name,
                dropped = pending.len(),
                "discarding pending timers at teardown"
            );
        }
        info!(subsystem = name, "worker stopped");
    });

    handle
}

fn run_one<S: Subsystem>(
    subsystem: &mut S,
    req: Request,
    weak_tx: &mpsc::WeakUnboundedSender<Scheduled>,
    name: &'static str,
) {
    // Re-materialize a handle for the duration of the call so handlers can
    // enqueue follow-ups onto their own queue.
    let Some(tx) = weak_tx.upgrade() else {
        debug!(subsystem = name, code = req.code, "queue gone, task dropped");
        return;
    };
    let queue = QueueHandle { name, tx };
    subsystem.process(req, &queue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestSource;
    use std::sync::{Arc, Mutex};

    /// Records the order tasks were processed in; re-enqueues follow-ups when
    /// a task carries the marker code.
    struct Recorder {
        log: Arc<Mutex<Vec<i32>>>,
    }

    const FOLLOW_UP: i32 = 9000;

    impl Subsystem for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn process(&mut self, req: Request, queue: &QueueHandle) {
            self.log.lock().unwrap().push(req.code);
            if req.code == FOLLOW_UP {
                queue.add(Request {
                    code: FOLLOW_UP + 1,
                    token: 0,
                    source: RequestSource::Internal,
                    body: None,
                });
            }
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<i32>>>, QueueHandle) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handle = spawn_subsystem(Recorder { log: log.clone() });
        (log, handle)
    }

    fn task(code: i32) -> Request {
        Request {
            code,
            token: 0,
            source: RequestSource::Internal,
            body: None,
        }
    }

    async fn settle() {
        // Let the worker drain; yields are enough for immediate tasks.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (log, queue) = recorder();
        for code in [1, 2, 3, 4] {
            queue.add(task(code));
        }
        settle().await;
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_handler_can_self_enqueue() {
        let (log, queue) = recorder();
        queue.add(task(FOLLOW_UP));
        settle().await;
        assert_eq!(*log.lock().unwrap(), vec![FOLLOW_UP, FOLLOW_UP + 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_task_does_not_block_ready_tasks() {
        let (log, queue) = recorder();
        queue.add_delayed(task(99), 5_000);
        queue.add(task(1));
        queue.add(task(2));

        settle().await;
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        settle().await;
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 99]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_tasks_fire_in_deadline_order() {
        let (log, queue) = recorder();
        queue.add_delayed(task(3), 300);
        queue.add_delayed(task(1), 100);
        queue.add_delayed(task(2), 200);

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_non_positive_delay_fires_immediately() {
        let (log, queue) = recorder();
        queue.add_delayed(task(7), -250);
        queue.add_delayed(task(8), 0);
        settle().await;
        assert_eq!(*log.lock().unwrap(), vec![7, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_equal_deadlines_keep_schedule_order() {
        let (log, queue) = recorder();
        for code in [10, 11, 12] {
            queue.add_delayed(task(code), 100);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(*log.lock().unwrap(), vec![10, 11, 12]);
    }
}
