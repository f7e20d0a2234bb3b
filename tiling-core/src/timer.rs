//! Single-threaded scheduled task queue driving animated runs.
//!
//! Animated execution never blocks: "suspending" an algorithm means
//! scheduling its continuation at `now + delay` on this queue. One worker
//! thread executes tasks in deadline order (FIFO among equal deadlines), so
//! all algorithm state mutation in animated mode happens on a single logical
//! thread.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};

type Job = Box<dyn FnOnce() + Send>;

struct ScheduledJob {
    due: Instant,
    seq: u64,
    job: Job,
}

// BinaryHeap is a max-heap; order is inverted so the earliest deadline
// (lowest sequence number on ties) pops first.
impl PartialEq for ScheduledJob {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledJob {}

impl PartialOrd for ScheduledJob {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledJob {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct TimerState {
    queue: BinaryHeap<ScheduledJob>,
    next_seq: u64,
    shutdown: bool,
}

type SharedState = (Mutex<TimerState>, Condvar);

/// Host-owned timer queue with a dedicated worker thread.
///
/// Dropping the timer cancels all outstanding tasks and joins the worker,
/// satisfying the requirement that the queue is fully stopped before a new
/// run starts or the host tears down.
pub struct StepTimer {
    shared: Arc<SharedState>,
    worker: Option<thread::JoinHandle<()>>,
}

/// Cloneable scheduling handle onto a [`StepTimer`].
///
/// Scheduled tasks hold one of these to schedule their own continuations.
#[derive(Clone)]
pub struct TimerHandle {
    shared: Arc<SharedState>,
}

impl StepTimer {
    /// Starts the worker thread.
    pub fn new() -> Self {
        let shared: Arc<SharedState> = Arc::new((
            Mutex::new(TimerState {
                queue: BinaryHeap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            Condvar::new(),
        ));
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("step-timer".to_string())
            .spawn(move || worker_loop(&worker_shared))
            .expect("failed to spawn timer worker thread");
        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Returns a cloneable scheduling handle.
    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Schedules `job` to run on the worker thread after `delay`.
    pub fn schedule(&self, delay: Duration, job: impl FnOnce() + Send + 'static) {
        self.handle().schedule(delay, job);
    }
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StepTimer {
    fn drop(&mut self) {
        {
            let (lock, cv) = &*self.shared;
            let mut state = lock.lock().expect("timer state poisoned");
            state.shutdown = true;
            // Outstanding tasks are cancelled, not drained.
            state.queue.clear();
            cv.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("timer worker thread panicked during shutdown");
            }
        }
    }
}

impl TimerHandle {
    /// Schedules `job` to run on the worker thread after `delay`.
    ///
    /// Jobs scheduled after shutdown are silently discarded.
    pub fn schedule(&self, delay: Duration, job: impl FnOnce() + Send + 'static) {
        let (lock, cv) = &*self.shared;
        let mut state = lock.lock().expect("timer state poisoned");
        if state.shutdown {
            debug!("dropping task scheduled after timer shutdown");
            return;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.queue.push(ScheduledJob {
            due: Instant::now() + delay,
            seq,
            job: Box::new(job),
        });
        cv.notify_one();
    }
}

fn worker_loop(shared: &SharedState) {
    let (lock, cv) = shared;
    let mut state = lock.lock().expect("timer state poisoned");
    loop {
        if state.shutdown {
            return;
        }
        let next_due = state.queue.peek().map(|job| job.due);
        let Some(due) = next_due else {
            state = cv.wait(state).expect("timer state poisoned");
            continue;
        };
        let now = Instant::now();
        if due > now {
            let (guard, _) = cv
                .wait_timeout(state, due - now)
                .expect("timer state poisoned");
            state = guard;
            continue;
        }
        if let Some(job) = state.queue.pop() {
            drop(state);
            // A panicking task must not take the queue down with it.
            if catch_unwind(AssertUnwindSafe(job.job)).is_err() {
                error!("scheduled task panicked; timer continues");
            }
            state = lock.lock().expect("timer state poisoned");
        }
    }
}

/// Counts in-flight animated continuations for one run.
///
/// Fan-out recursion adds a slot per scheduled continuation; each finished
/// continuation calls [`done`](Self::done), and the one that drains the
/// count to zero owns the completion notification.
#[derive(Debug)]
pub struct TaskGroup {
    active: AtomicUsize,
}

impl TaskGroup {
    /// Creates a group with no active continuations.
    pub fn new() -> Self {
        Self {
            active: AtomicUsize::new(0),
        }
    }

    /// Registers `n` newly scheduled continuations.
    pub fn add(&self, n: usize) {
        self.active.fetch_add(n, Ordering::AcqRel);
    }

    /// Marks one continuation finished. Returns true when it was the last
    /// one in flight.
    pub fn done(&self) -> bool {
        self.active.fetch_sub(1, Ordering::AcqRel) == 1
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}
