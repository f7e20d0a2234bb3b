//! Core library for the tiling and fractal computation engine.
//!
//! Six generators (domino and tromino board tilings, Hilbert and Koch
//! curves, the Sierpinski triangle and the square-carpet fractal) share one
//! compute-and-notify contract and two scheduling strategies: parallel batch
//! execution on a worker pool, and paced animated execution on a
//! single-threaded timer queue with cooperative cancellation. Rendering and
//! run control live outside this crate; it only fills boards and point paths
//! and notifies a [`TilingSink`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// The generator variants.
pub mod algo;
/// Grid board model and tile-id allocation.
pub mod board;
/// Run orchestration and the execution modes.
pub mod engine;
/// Point-path model for the curve and fractal variants.
pub mod path;
/// The notification sink contract.
pub mod sink;
/// The animated-mode timer queue.
pub mod timer;

pub use crate::algo::{RunArtifact, TilingAlgorithm};
pub use crate::board::{Board, TileCounter, CELL_EMPTY, CELL_HOLE};
pub use crate::engine::{run, ExecutionMode, RunConfig, RunRequest};
pub use crate::path::{PathElement, Point, PointPath};
pub use crate::sink::{NullSink, TilingSink};
pub use crate::timer::{StepTimer, TaskGroup, TimerHandle};

/// Errors surfaced by the engine, all detected before any notification is
/// emitted except `Internal`, which doubles as the terminal `error`
/// notification payload.
#[derive(Error, Debug)]
pub enum TilingError {
    /// The requested name matches none of the six variants.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    /// The request failed validation before dispatch.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The excluded cell of a deficient board lies outside the grid.
    #[error("missing cell ({row}, {col}) out of range for board size {size}")]
    MissingCellOutOfRange {
        row: usize,
        col: usize,
        size: usize,
    },
    /// Deficient-board tiling requires a power-of-two board edge.
    #[error("board size {0} is not a power of two")]
    NotPowerOfTwo(usize),
    /// An unexpected failure inside a computation, caught at the engine
    /// boundary.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The six generator variants the engine can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    Domino,
    Tromino,
    Hilbert,
    Koch,
    Sierpinski,
    SquareCarpet,
}

impl AlgorithmKind {
    /// All variants, in presentation order.
    pub const ALL: [Self; 6] = [
        Self::Domino,
        Self::Tromino,
        Self::Hilbert,
        Self::Koch,
        Self::Sierpinski,
        Self::SquareCarpet,
    ];

    /// Canonical lowercase name, accepted back by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Domino => "domino",
            Self::Tromino => "tromino",
            Self::Hilbert => "hilbert",
            Self::Koch => "koch",
            Self::Sierpinski => "sierpinski",
            Self::SquareCarpet => "square",
        }
    }

    /// Whether the variant fills a board (as opposed to a point path).
    pub const fn is_grid(self) -> bool {
        matches!(self, Self::Domino | Self::Tromino)
    }

    /// Default per-tick delay in animated mode.
    pub const fn step_delay(self) -> Duration {
        match self {
            Self::Hilbert => Duration::from_millis(20),
            _ => Duration::from_millis(50),
        }
    }

    /// Rough number of animation steps a run will take.
    pub fn estimated_steps(self, board_size: usize, max_depth: u32) -> u64 {
        let area = (board_size * board_size) as u64;
        let pow = |base: u64| base.checked_pow(max_depth).unwrap_or(u64::MAX);
        match self {
            Self::Domino => area / 2,
            Self::Tromino => area.saturating_sub(1) / 3,
            Self::Hilbert | Self::Koch => pow(4),
            Self::Sierpinski => pow(3),
            Self::SquareCarpet => pow(8),
        }
    }

    /// Estimated wall time for a run: the animation cadence dominates in
    /// animated mode, a small compute-bound floor applies in batch mode.
    pub fn estimated_runtime(
        self,
        board_size: usize,
        max_depth: u32,
        mode: engine::ExecutionMode,
    ) -> Duration {
        let steps = self.estimated_steps(board_size, max_depth);
        match mode {
            engine::ExecutionMode::Animated => self
                .step_delay()
                .checked_mul(u32::try_from(steps).unwrap_or(u32::MAX))
                .unwrap_or(Duration::MAX),
            engine::ExecutionMode::Batch => Duration::from_millis(steps.max(100)),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = TilingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "domino" => Ok(Self::Domino),
            "tromino" => Ok(Self::Tromino),
            "hilbert" => Ok(Self::Hilbert),
            "koch" => Ok(Self::Koch),
            "sierpinski" => Ok(Self::Sierpinski),
            "square" | "square-carpet" | "carpet" => Ok(Self::SquareCarpet),
            _ => Err(TilingError::UnknownAlgorithm(s.to_string())),
        }
    }
}
