//! The six generator variants and the machinery they share.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::board::Board;
use crate::path::{PathElement, PointPath};
use crate::sink::TilingSink;
use crate::timer::TimerHandle;
use crate::TilingError;

pub mod carpet;
pub mod domino;
pub mod hilbert;
pub mod koch;
pub mod sierpinski;
pub mod tromino;

pub use carpet::SquareCarpet;
pub use domino::DominoTiling;
pub use hilbert::HilbertCurve;
pub use koch::KochCurve;
pub use sierpinski::SierpinskiTriangle;
pub use tromino::TrominoTiling;

/// Shared handle to the artifact a run is populating.
///
/// Handed to the caller when the run starts; the host and sink read board or
/// path state through it while an animated run is in flight, and the final
/// result after completion.
#[derive(Debug, Clone)]
pub enum RunArtifact {
    Board(Arc<Mutex<Board>>),
    Path(Arc<Mutex<PointPath>>),
}

impl RunArtifact {
    /// The board handle, for the grid variants.
    pub fn board(&self) -> Option<&Arc<Mutex<Board>>> {
        match self {
            Self::Board(board) => Some(board),
            Self::Path(_) => None,
        }
    }

    /// The path handle, for the curve and fractal variants.
    pub fn path(&self) -> Option<&Arc<Mutex<PointPath>>> {
        match self {
            Self::Board(_) => None,
            Self::Path(path) => Some(path),
        }
    }
}

/// Everything an animated run needs besides the algorithm itself: the
/// host-owned timer and run flag, the sink, and the per-tick delay.
#[derive(Clone)]
pub struct AnimatedContext {
    pub timer: TimerHandle,
    pub sink: Arc<dyn TilingSink>,
    pub running: Arc<AtomicBool>,
    pub step_delay: Duration,
}

impl AnimatedContext {
    /// Reads the host's run flag; false means abandon silently.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Common contract of the six variants: populate the artifact and notify the
/// sink. The engine emits `started` before dispatching and owns the terminal
/// notification in batch mode; animated runs emit their own `completed` when
/// the scheduled work drains.
pub trait TilingAlgorithm: Send + Sync {
    /// Edge length of the coordinate space this variant fills.
    fn board_size(&self) -> usize;

    /// Handle to the board or path this instance populates.
    fn artifact(&self) -> RunArtifact;

    /// Computes the full result, emitting exactly one step with the final
    /// artifact. Fork/join variants parallelize internally on the rayon
    /// pool; the others run on the calling worker.
    fn run_batch(&self, sink: &dyn TilingSink) -> Result<(), TilingError>;

    /// Unfolds the result incrementally on the timer, one unit per tick.
    /// Returns once the initial work is scheduled; progress and the terminal
    /// notification arrive on the timer thread.
    fn run_animated(self: Arc<Self>, ctx: AnimatedContext);
}

/// Reveals a precomputed element sequence one element per tick.
///
/// Shared by the curve and fractal variants: the visible path is seeded with
/// the first element, then each tick appends the next one and reports it,
/// until the final tick emits `completed`. Every tick re-checks the run flag
/// and stops scheduling once it flips.
pub(crate) fn reveal_elements(full: Vec<PathElement>, path: &Arc<Mutex<PointPath>>, ctx: AnimatedContext) {
    {
        let mut visible = path.lock().expect("path mutex poisoned");
        visible.clear();
        if let Some(first) = full.first() {
            visible.push(*first);
        }
    }
    schedule_reveal_tick(Arc::new(full), 1, Arc::clone(path), ctx);
}

fn schedule_reveal_tick(
    full: Arc<Vec<PathElement>>,
    index: usize,
    path: Arc<Mutex<PointPath>>,
    ctx: AnimatedContext,
) {
    let timer = ctx.timer.clone();
    let delay = ctx.step_delay;
    timer.schedule(delay, move || {
        if !ctx.is_running() {
            return;
        }
        let Some(element) = full.get(index) else {
            ctx.sink.completed();
            return;
        };
        // The path lock is released before notifying so the sink can read
        // the artifact without deadlocking.
        let revealed = {
            let mut visible = path.lock().expect("path mutex poisoned");
            visible.push(*element);
            visible.len() as u64
        };
        ctx.sink.step(revealed, None);
        schedule_reveal_tick(full, index + 1, path, ctx);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Point;
    use crate::sink::NullSink;
    use crate::timer::StepTimer;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_reveal_stops_after_cancellation() {
        let timer = StepTimer::new();
        let running = Arc::new(AtomicBool::new(false));
        let path = Arc::new(Mutex::new(PointPath::new()));
        let ctx = AnimatedContext {
            timer: timer.handle(),
            sink: Arc::new(NullSink),
            running,
            step_delay: Duration::from_millis(1),
        };
        let full = vec![
            PathElement::Point(Point::new(0.0, 0.0)),
            PathElement::Point(Point::new(1.0, 0.0)),
            PathElement::Point(Point::new(2.0, 0.0)),
        ];
        reveal_elements(full, &path, ctx);
        std::thread::sleep(Duration::from_millis(50));
        // Only the seed element is visible; the cancelled ticks did nothing.
        assert_eq!(path.lock().unwrap().len(), 1);
    }
}
