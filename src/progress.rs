//! Console notification sink: renders board snapshots and tracks the run's
//! terminal state for the host to wait on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use colored::{Color, Colorize};
use tiling_core::{Board, TilingSink, CELL_EMPTY, CELL_HOLE};

/// How a run ended, as observed through the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Completed,
    Failed(String),
}

struct SinkState {
    last_render: Option<Instant>,
    steps: u64,
    terminal: Option<Terminal>,
}

/// Sink that logs lifecycle events, renders board snapshots to the terminal
/// (throttled, animated grid runs only) and signals the terminal state.
pub struct ConsoleSink {
    render_steps: bool,
    throttle: Duration,
    state: Mutex<SinkState>,
    cv: Condvar,
}

impl ConsoleSink {
    /// Creates a sink. `render_steps` enables live board rendering;
    /// `throttle` is the minimum time between two renders.
    pub fn new(render_steps: bool, throttle: Duration) -> Self {
        Self {
            render_steps,
            throttle,
            state: Mutex::new(SinkState {
                last_render: None,
                steps: 0,
                terminal: None,
            }),
            cv: Condvar::new(),
        }
    }

    /// Steps observed so far.
    pub fn steps(&self) -> u64 {
        self.state.lock().expect("sink state poisoned").steps
    }

    /// Blocks until the run reaches a terminal state.
    ///
    /// Cancellation produces no terminal notification, so the wait also
    /// watches the host's own run flag: once it flips, a short grace period
    /// lets any in-flight terminal land, then `None` is returned.
    pub fn wait_for_terminal(&self, running: &AtomicBool, grace: Duration) -> Option<Terminal> {
        let mut state = self.state.lock().expect("sink state poisoned");
        loop {
            if let Some(terminal) = &state.terminal {
                return Some(terminal.clone());
            }
            if !running.load(Ordering::Relaxed) {
                let (guard, _) = self
                    .cv
                    .wait_timeout(state, grace)
                    .expect("sink state poisoned");
                state = guard;
                return state.terminal.clone();
            }
            let (guard, _) = self
                .cv
                .wait_timeout(state, Duration::from_millis(100))
                .expect("sink state poisoned");
            state = guard;
        }
    }

    fn finish(&self, terminal: Terminal) {
        let mut state = self.state.lock().expect("sink state poisoned");
        state.terminal = Some(terminal);
        self.cv.notify_all();
    }
}

impl TilingSink for ConsoleSink {
    fn started(&self, board_size: usize, max_depth: u32) {
        log::info!("run started: board size {board_size}, depth {max_depth}");
    }

    fn step(&self, sequence: u64, board: Option<&Board>) {
        let mut state = self.state.lock().expect("sink state poisoned");
        state.steps += 1;
        log::debug!("step {sequence}");
        if let Some(board) = board {
            if self.render_steps {
                let now = Instant::now();
                let due = state
                    .last_render
                    .map_or(true, |last| now.duration_since(last) >= self.throttle);
                if due {
                    state.last_render = Some(now);
                    drop(state);
                    render_board(board);
                    return;
                }
            }
        }
        drop(state);
    }

    fn completed(&self) {
        log::info!("run completed");
        self.finish(Terminal::Completed);
    }

    fn error(&self, message: &str) {
        log::error!("run failed: {message}");
        self.finish(Terminal::Failed(message.to_string()));
    }
}

const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// Prints a board to stdout, one colored cell per tile id.
pub fn render_board(board: &Board) {
    let mut out = String::new();
    for row in board.rows() {
        for &cell in row {
            let text = match cell {
                CELL_HOLE => "   ■".white().to_string(),
                CELL_EMPTY => "   ·".dimmed().to_string(),
                id => {
                    let color = PALETTE[(id as usize - 1) % PALETTE.len()];
                    format!("{id:>4}").as_str().color(color).to_string()
                }
            };
            out.push_str(&text);
        }
        out.push('\n');
    }
    println!("{out}");
}
