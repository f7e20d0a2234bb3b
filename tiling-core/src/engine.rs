//! Run orchestration: validation, mode dispatch, lifecycle notifications.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};

use crate::algo::{
    AnimatedContext, DominoTiling, HilbertCurve, KochCurve, RunArtifact, SierpinskiTriangle,
    SquareCarpet, TilingAlgorithm, TrominoTiling,
};
use crate::sink::TilingSink;
use crate::timer::TimerHandle;
use crate::{AlgorithmKind, TilingError};

/// Upper bound on recursion depth for the curve and fractal variants, keeping
/// point buffers bounded.
pub const MAX_DEPTH: u32 = 12;

/// How a run is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Compute everything on the worker pool, emit a single final step.
    #[default]
    Batch,
    /// Unfold incrementally on the timer queue, one unit per fixed-delay
    /// tick, cancellable mid-flight.
    Animated,
}

/// One fully specified computation request.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub algorithm: AlgorithmKind,
    pub board_size: usize,
    pub max_depth: u32,
    /// Excluded cell for the deficient-board variant.
    pub missing_cell: Option<(usize, usize)>,
}

/// Configuration options for one engine run.
pub struct RunConfig {
    pub mode: ExecutionMode,
    /// Host-owned run flag; flipping it to false requests cooperative
    /// cancellation. The engine only ever reads it.
    pub running: Arc<AtomicBool>,
    /// Overrides the variant's default per-tick delay in animated mode.
    pub step_delay: Option<Duration>,
    /// Scheduling handle of the host's timer queue; required for animated
    /// runs.
    pub timer: Option<TimerHandle>,
}

impl RunConfig {
    /// Creates a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Batch,
            running: Arc::new(AtomicBool::new(true)),
            step_delay: None,
            timer: None,
        }
    }
}

/// Builder for `RunConfig`.
#[derive(Default)]
pub struct RunConfigBuilder {
    mode: ExecutionMode,
    running: Option<Arc<AtomicBool>>,
    step_delay: Option<Duration>,
    timer: Option<TimerHandle>,
}

impl RunConfigBuilder {
    /// Sets the execution mode.
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Provides the host's run flag.
    /// If not provided, a flag permanently set to true is created.
    pub fn running(mut self, flag: Arc<AtomicBool>) -> Self {
        self.running = Some(flag);
        self
    }

    /// Overrides the per-tick animation delay.
    pub fn step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    /// Provides the host timer's scheduling handle.
    pub fn timer(mut self, timer: TimerHandle) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Builds the `RunConfig` instance.
    pub fn build(self) -> RunConfig {
        RunConfig {
            mode: self.mode,
            running: self
                .running
                .unwrap_or_else(|| Arc::new(AtomicBool::new(true))),
            step_delay: self.step_delay,
            timer: self.timer,
        }
    }
}

/// Drives one run of the selected variant under the selected mode.
///
/// All validation happens before any notification; a rejected request
/// returns an error without `started` ever being emitted. After `started`,
/// exactly one terminal notification follows: `completed` on success,
/// `error` on failure. The exception is host cancellation, which drops the
/// remaining work silently.
///
/// Batch runs block until the terminal notification has been delivered.
/// Animated runs return as soon as the initial tick is scheduled; progress
/// arrives on the timer thread and the returned [`RunArtifact`] handle
/// observes the board or path as it fills.
pub fn run(
    request: &RunRequest,
    config: &RunConfig,
    sink: Arc<dyn TilingSink>,
) -> Result<RunArtifact, TilingError> {
    validate(request)?;
    let timer = match config.mode {
        ExecutionMode::Animated => Some(config.timer.clone().ok_or_else(|| {
            TilingError::Configuration("animated mode requires a step timer".to_string())
        })?),
        ExecutionMode::Batch => None,
    };

    info!(
        "starting {} run: mode {:?}, board size {}, depth {}",
        request.algorithm, config.mode, request.board_size, request.max_depth
    );
    let algorithm = build_algorithm(request);
    let artifact = algorithm.artifact();
    sink.started(request.board_size, request.max_depth);

    match config.mode {
        ExecutionMode::Batch => {
            let outcome = catch_unwind(AssertUnwindSafe(|| algorithm.run_batch(sink.as_ref())));
            match outcome {
                Ok(Ok(())) => {
                    sink.completed();
                    Ok(artifact)
                }
                Ok(Err(e)) => {
                    error!("{} run failed: {e}", request.algorithm);
                    sink.error(&e.to_string());
                    Err(e)
                }
                Err(payload) => {
                    let message = panic_message(&payload);
                    error!("{} run panicked: {message}", request.algorithm);
                    sink.error(&message);
                    Err(TilingError::Internal(message))
                }
            }
        }
        ExecutionMode::Animated => {
            let ctx = AnimatedContext {
                timer: timer.expect("timer presence checked before dispatch"),
                sink,
                running: Arc::clone(&config.running),
                step_delay: config
                    .step_delay
                    .unwrap_or_else(|| request.algorithm.step_delay()),
            };
            algorithm.run_animated(ctx);
            Ok(artifact)
        }
    }
}

fn validate(request: &RunRequest) -> Result<(), TilingError> {
    if request.board_size == 0 {
        return Err(TilingError::Configuration(
            "board size must be positive".to_string(),
        ));
    }
    match request.algorithm {
        AlgorithmKind::Domino => {
            if request.board_size % 2 != 0 {
                return Err(TilingError::Configuration(format!(
                    "domino tiling requires an even board size, got {}",
                    request.board_size
                )));
            }
        }
        AlgorithmKind::Tromino => {
            if !request.board_size.is_power_of_two() {
                return Err(TilingError::NotPowerOfTwo(request.board_size));
            }
            let (row, col) = request.missing_cell.ok_or_else(|| {
                TilingError::Configuration(
                    "tromino tiling requires a missing cell".to_string(),
                )
            })?;
            if row >= request.board_size || col >= request.board_size {
                return Err(TilingError::MissingCellOutOfRange {
                    row,
                    col,
                    size: request.board_size,
                });
            }
        }
        AlgorithmKind::Hilbert => {
            if request.max_depth == 0 {
                return Err(TilingError::Configuration(
                    "hilbert curve requires a depth of at least 1".to_string(),
                ));
            }
            check_depth(request.max_depth)?;
        }
        AlgorithmKind::Koch | AlgorithmKind::Sierpinski | AlgorithmKind::SquareCarpet => {
            check_depth(request.max_depth)?;
        }
    }
    Ok(())
}

fn check_depth(depth: u32) -> Result<(), TilingError> {
    if depth > MAX_DEPTH {
        return Err(TilingError::Configuration(format!(
            "depth {depth} exceeds the maximum of {MAX_DEPTH}"
        )));
    }
    Ok(())
}

fn build_algorithm(request: &RunRequest) -> Arc<dyn TilingAlgorithm> {
    let size = request.board_size;
    let depth = request.max_depth;
    match request.algorithm {
        AlgorithmKind::Domino => Arc::new(DominoTiling::new(size)),
        AlgorithmKind::Tromino => {
            // Presence is guaranteed by validation.
            let (row, col) = request.missing_cell.unwrap_or((0, 0));
            Arc::new(TrominoTiling::new(size, row, col))
        }
        AlgorithmKind::Hilbert => Arc::new(HilbertCurve::new(size, depth)),
        AlgorithmKind::Koch => Arc::new(KochCurve::new(size, depth)),
        AlgorithmKind::Sierpinski => Arc::new(SierpinskiTriangle::new(size, depth)),
        AlgorithmKind::SquareCarpet => Arc::new(SquareCarpet::new(size, depth)),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "computation panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullSink;

    fn request(algorithm: AlgorithmKind, board_size: usize, max_depth: u32) -> RunRequest {
        RunRequest {
            algorithm,
            board_size,
            max_depth,
            missing_cell: None,
        }
    }

    #[test]
    fn test_rejects_zero_board_size() {
        let result = run(
            &request(AlgorithmKind::Koch, 0, 3),
            &RunConfig::default(),
            Arc::new(NullSink),
        );
        assert!(matches!(result, Err(TilingError::Configuration(_))));
    }

    #[test]
    fn test_rejects_odd_domino_board() {
        let result = run(
            &request(AlgorithmKind::Domino, 5, 0),
            &RunConfig::default(),
            Arc::new(NullSink),
        );
        assert!(matches!(result, Err(TilingError::Configuration(_))));
    }

    #[test]
    fn test_rejects_non_power_of_two_tromino_board() {
        let mut req = request(AlgorithmKind::Tromino, 6, 0);
        req.missing_cell = Some((0, 0));
        let result = run(&req, &RunConfig::default(), Arc::new(NullSink));
        assert!(matches!(result, Err(TilingError::NotPowerOfTwo(6))));
    }

    #[test]
    fn test_rejects_missing_cell_out_of_range() {
        let mut req = request(AlgorithmKind::Tromino, 8, 0);
        req.missing_cell = Some((8, 3));
        let result = run(&req, &RunConfig::default(), Arc::new(NullSink));
        assert!(matches!(
            result,
            Err(TilingError::MissingCellOutOfRange { row: 8, col: 3, size: 8 })
        ));
    }

    #[test]
    fn test_rejects_hilbert_depth_zero() {
        let result = run(
            &request(AlgorithmKind::Hilbert, 8, 0),
            &RunConfig::default(),
            Arc::new(NullSink),
        );
        assert!(matches!(result, Err(TilingError::Configuration(_))));
    }

    #[test]
    fn test_rejects_excessive_depth() {
        let result = run(
            &request(AlgorithmKind::SquareCarpet, 81, MAX_DEPTH + 1),
            &RunConfig::default(),
            Arc::new(NullSink),
        );
        assert!(matches!(result, Err(TilingError::Configuration(_))));
    }

    #[test]
    fn test_animated_without_timer_is_a_configuration_error() {
        let config = RunConfig::builder().mode(ExecutionMode::Animated).build();
        let result = run(
            &request(AlgorithmKind::Koch, 10, 2),
            &config,
            Arc::new(NullSink),
        );
        assert!(matches!(result, Err(TilingError::Configuration(_))));
    }

    #[test]
    fn test_batch_run_returns_artifact() {
        let artifact = run(
            &request(AlgorithmKind::Koch, 10, 2),
            &RunConfig::default(),
            Arc::new(NullSink),
        )
        .expect("run failed");
        let path = artifact.path().expect("koch produces a path");
        assert_eq!(path.lock().unwrap().len(), 17);
    }
}
