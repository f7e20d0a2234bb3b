//! Shared test sink recording every notification in arrival order.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use tiling_core::{Board, TilingSink};

/// One recorded notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started { board_size: usize, max_depth: u32 },
    Step { sequence: u64, board: Option<Board> },
    Completed,
    Error(String),
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error(_))
    }
}

/// Sink that records notifications and lets tests block until a terminal
/// event (or a step count) arrives.
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
    cv: Condvar,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cv: Condvar::new(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn step_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, Event::Step { .. }))
            .count()
    }

    /// Blocks until a terminal notification arrives; false on timeout.
    pub fn wait_for_terminal(&self, timeout: Duration) -> bool {
        self.wait_until(timeout, |events| events.iter().any(Event::is_terminal))
    }

    /// Blocks until at least `n` steps have been recorded; false on timeout.
    pub fn wait_for_steps(&self, n: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |events| {
            events.iter().filter(|e| matches!(e, Event::Step { .. })).count() >= n
        })
    }

    fn wait_until(&self, timeout: Duration, predicate: impl Fn(&[Event]) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut events = self.events.lock().unwrap();
        loop {
            if predicate(&events) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self.cv.wait_timeout(events, deadline - now).unwrap();
            events = guard;
        }
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
        self.cv.notify_all();
    }
}

impl TilingSink for RecordingSink {
    fn started(&self, board_size: usize, max_depth: u32) {
        self.record(Event::Started {
            board_size,
            max_depth,
        });
    }

    fn step(&self, sequence: u64, board: Option<&Board>) {
        self.record(Event::Step {
            sequence,
            board: board.cloned(),
        });
    }

    fn completed(&self) {
        self.record(Event::Completed);
    }

    fn error(&self, message: &str) {
        self.record(Event::Error(message.to_string()));
    }
}
