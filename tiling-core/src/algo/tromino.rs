//! Deficient-board L-tromino tiling by quadrant recursion.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::debug;

use crate::board::{Board, TileCounter};
use crate::sink::TilingSink;
use crate::timer::TaskGroup;
use crate::TilingError;

use super::{AnimatedContext, RunArtifact, TilingAlgorithm};

/// One square region together with its (possibly virtual) missing cell.
#[derive(Debug, Clone, Copy)]
struct Quadrant {
    row: usize,
    col: usize,
    size: usize,
    missing_row: usize,
    missing_col: usize,
}

/// One placed L-tromino: a fresh id on the three inner-corner cells of the
/// quadrants that do not contain the missing cell.
#[derive(Debug, Clone, Copy)]
struct Placement {
    id: i32,
    cells: [(usize, usize); 3],
}

/// Tiling of a 2^k deficient board with L-trominoes.
///
/// Batch mode fans the four sub-quadrants out as fork/join tasks; their
/// placement lists are joined in TL, TR, BL, BR order regardless of which
/// finishes first, so concurrency never changes the emitted artifact order.
/// Animated mode schedules each quadrant continuation as a timed task and
/// tracks the in-flight count with a [`TaskGroup`]; the continuation that
/// drains the group emits `completed`.
pub struct TrominoTiling {
    size: usize,
    missing: (usize, usize),
    board: Arc<Mutex<Board>>,
    counter: TileCounter,
}

impl TrominoTiling {
    pub fn new(size: usize, missing_row: usize, missing_col: usize) -> Self {
        Self {
            size,
            missing: (missing_row, missing_col),
            board: Arc::new(Mutex::new(Board::with_hole(size, missing_row, missing_col))),
            counter: TileCounter::new(),
        }
    }

    fn root(&self) -> Quadrant {
        Quadrant {
            row: 0,
            col: 0,
            size: self.size,
            missing_row: self.missing.0,
            missing_col: self.missing.1,
        }
    }

    /// Splits `q`, placing one tromino across the three quadrants that do
    /// not hold the missing cell. Returns the placement plus the four child
    /// quadrants in TL, TR, BL, BR order, each carrying either the true
    /// missing cell or its freshly covered inner corner as a virtual one.
    fn split(counter: &TileCounter, q: Quadrant) -> (Placement, [Quadrant; 4]) {
        let half = q.size / 2;
        let center_r = q.row + half - 1;
        let center_c = q.col + half - 1;
        let in_top = q.missing_row < q.row + half;
        let in_left = q.missing_col < q.col + half;
        let missing = [
            in_top && in_left,   // TL
            in_top && !in_left,  // TR
            !in_top && in_left,  // BL
            !in_top && !in_left, // BR
        ];
        let corners = [
            (center_r, center_c),
            (center_r, center_c + 1),
            (center_r + 1, center_c),
            (center_r + 1, center_c + 1),
        ];

        let id = counter.allocate();
        let mut cells = [(0, 0); 3];
        let mut filled = 0;
        for (corner, &is_missing) in corners.iter().zip(missing.iter()) {
            if !is_missing {
                cells[filled] = *corner;
                filled += 1;
            }
        }
        let placement = Placement { id, cells };

        let origins = [
            (q.row, q.col),
            (q.row, q.col + half),
            (q.row + half, q.col),
            (q.row + half, q.col + half),
        ];
        let children = std::array::from_fn(|i| {
            let (row, col) = origins[i];
            let (missing_row, missing_col) = if missing[i] {
                (q.missing_row, q.missing_col)
            } else {
                corners[i]
            };
            Quadrant {
                row,
                col,
                size: half,
                missing_row,
                missing_col,
            }
        });

        (placement, children)
    }

    /// Batch recursion: placements for this region, parent first, then the
    /// four children joined in corner order.
    fn tile_region(counter: &TileCounter, q: Quadrant) -> Vec<Placement> {
        if q.size == 1 {
            return Vec::new();
        }
        let (placement, [tl, tr, bl, br]) = Self::split(counter, q);
        let ((a, b), (c, d)) = rayon::join(
            || {
                rayon::join(
                    || Self::tile_region(counter, tl),
                    || Self::tile_region(counter, tr),
                )
            },
            || {
                rayon::join(
                    || Self::tile_region(counter, bl),
                    || Self::tile_region(counter, br),
                )
            },
        );
        let mut out = Vec::with_capacity(1 + a.len() + b.len() + c.len() + d.len());
        out.push(placement);
        out.extend(a);
        out.extend(b);
        out.extend(c);
        out.extend(d);
        out
    }

    fn apply(board: &mut Board, placement: Placement) {
        for (r, c) in placement.cells {
            if let Some(cell) = board.get_mut(r, c) {
                *cell = placement.id;
            }
        }
    }

    fn schedule_quadrant(
        this: Arc<Self>,
        ctx: AnimatedContext,
        group: Arc<TaskGroup>,
        q: Quadrant,
        delay: Duration,
    ) {
        let timer = ctx.timer.clone();
        timer.schedule(delay, move || Self::quadrant_tick(&this, &ctx, &group, q));
    }

    /// One animated quadrant continuation.
    ///
    /// A cancelled tick performs no mutation, emits nothing and does not
    /// reschedule; the group never drains, so no terminal call is made.
    fn quadrant_tick(this: &Arc<Self>, ctx: &AnimatedContext, group: &Arc<TaskGroup>, q: Quadrant) {
        if !ctx.is_running() {
            return;
        }
        if q.size == 1 {
            if group.done() {
                ctx.sink.completed();
            }
            return;
        }
        let (placement, children) = Self::split(&this.counter, q);
        {
            let mut board = this.board.lock().expect("board mutex poisoned");
            Self::apply(&mut board, placement);
            debug!(
                "placed tromino {} in quadrant ({}, {}) size {}",
                placement.id, q.row, q.col, q.size
            );
            ctx.sink.step(placement.id as u64, Some(&*board));
        }
        group.add(children.len());
        for child in children {
            Self::schedule_quadrant(
                Arc::clone(this),
                ctx.clone(),
                Arc::clone(group),
                child,
                ctx.step_delay,
            );
        }
        if group.done() {
            ctx.sink.completed();
        }
    }
}

impl TilingAlgorithm for TrominoTiling {
    fn board_size(&self) -> usize {
        self.size
    }

    fn artifact(&self) -> RunArtifact {
        RunArtifact::Board(Arc::clone(&self.board))
    }

    fn run_batch(&self, sink: &dyn TilingSink) -> Result<(), TilingError> {
        let placements = Self::tile_region(&self.counter, self.root());
        let mut board = self.board.lock().expect("board mutex poisoned");
        for placement in placements {
            Self::apply(&mut board, placement);
        }
        sink.step(self.counter.last_allocated() as u64, Some(&*board));
        Ok(())
    }

    fn run_animated(self: Arc<Self>, ctx: AnimatedContext) {
        let group = Arc::new(TaskGroup::new());
        group.add(1);
        let root = self.root();
        Self::schedule_quadrant(self, ctx, group, root, Duration::ZERO);
    }
}
