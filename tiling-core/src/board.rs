//! Square board of tile-id cells filled by the grid tiling variants.

use std::sync::atomic::{AtomicI32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cell value for a position no tile has claimed yet.
pub const CELL_EMPTY: i32 = 0;

/// Cell value for the excluded hole of a deficient board.
pub const CELL_HOLE: i32 = -1;

/// N×N grid of cell identifiers.
///
/// `0` marks an empty cell, `-1` the excluded hole of a deficient board, and
/// positive values identify placed tiles in creation order. A board is owned
/// by the algorithm instance that created it and observed read-only by the
/// notification sink at each step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Board {
    size: usize,
    cells: Vec<i32>,
}

impl Board {
    /// Creates an empty board with the given edge length.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![CELL_EMPTY; size * size],
        }
    }

    /// Creates a deficient board with a single hole at `(row, col)`.
    ///
    /// Coordinates outside the grid leave the board without a hole; callers
    /// are expected to have validated them.
    pub fn with_hole(size: usize, row: usize, col: usize) -> Self {
        let mut board = Self::new(size);
        if let Some(cell) = board.get_mut(row, col) {
            *cell = CELL_HOLE;
        }
        board
    }

    /// Edge length of the board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell value at the given coordinates, or None if the
    /// coordinates are out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        self.index(row, col).and_then(|idx| self.cells.get(idx)).copied()
    }

    /// Returns a mutable reference to the cell at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut i32> {
        self.index(row, col)
            .and_then(move |idx| self.cells.get_mut(idx))
    }

    /// First empty cell in row-major order, if any.
    pub fn first_empty(&self) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|&c| c == CELL_EMPTY)
            .map(|idx| (idx / self.size, idx % self.size))
    }

    /// True once no empty cells remain.
    pub fn is_complete(&self) -> bool {
        !self.cells.contains(&CELL_EMPTY)
    }

    /// Iterates over the board rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Calculates the 1D index for the given coordinates.
    /// Returns None if the coordinates are out of bounds.
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.size && col < self.size {
            Some(row * self.size + col)
        } else {
            None
        }
    }
}

/// Monotonically increasing tile-id source, shared across one run.
///
/// Incremented atomically when quadrant recursion fans out in parallel.
/// `release_last` exists solely for the sequential domino backtracking path,
/// which undoes its most recent allocation when a placement fails.
#[derive(Debug)]
pub struct TileCounter {
    next: AtomicI32,
}

impl TileCounter {
    /// Creates a counter whose first allocated id is `1`.
    pub fn new() -> Self {
        Self {
            next: AtomicI32::new(1),
        }
    }

    /// Claims the next tile id.
    pub fn allocate(&self) -> i32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the most recently allocated id to the pool.
    pub fn release_last(&self) {
        self.next.fetch_sub(1, Ordering::Relaxed);
    }

    /// Highest id handed out so far, or `0` before the first allocation.
    pub fn last_allocated(&self) -> i32 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for TileCounter {
    fn default() -> Self {
        Self::new()
    }
}
