//! Square-carpet fractal: 3×3 subdivision with the center cell skipped.

use std::sync::{Arc, Mutex};

use crate::path::{PathElement, Point, PointPath};
use crate::sink::TilingSink;
use crate::TilingError;

use super::{reveal_elements, AnimatedContext, RunArtifact, TilingAlgorithm};

/// Carpet fractal over the full board square.
///
/// Sequential recursion over the eight non-center sub-squares; depth 0 emits
/// the square outline as four point pairs plus a pen lift.
pub struct SquareCarpet {
    size: usize,
    depth: u32,
    path: Arc<Mutex<PointPath>>,
}

impl SquareCarpet {
    pub fn new(size: usize, depth: u32) -> Self {
        Self {
            size,
            depth,
            path: Arc::new(Mutex::new(PointPath::new())),
        }
    }

    fn generate_elements(&self) -> Vec<PathElement> {
        let mut out = Vec::new();
        Self::subdivide(0.0, 0.0, self.size as f64, self.depth, &mut out);
        out
    }

    fn subdivide(x: f64, y: f64, size: f64, level: u32, out: &mut Vec<PathElement>) {
        if level == 0 {
            Self::outline(x, y, size, out);
            return;
        }
        let third = size / 3.0;
        for i in 0..3 {
            for j in 0..3 {
                if i == 1 && j == 1 {
                    continue; // skip center
                }
                Self::subdivide(
                    x + f64::from(i) * third,
                    y + f64::from(j) * third,
                    third,
                    level - 1,
                    out,
                );
            }
        }
    }

    fn outline(x: f64, y: f64, size: f64, out: &mut Vec<PathElement>) {
        let corners = [
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ];
        for i in 0..4 {
            out.push(PathElement::Point(corners[i]));
            out.push(PathElement::Point(corners[(i + 1) % 4]));
        }
        out.push(PathElement::Break);
    }
}

impl TilingAlgorithm for SquareCarpet {
    fn board_size(&self) -> usize {
        self.size
    }

    fn artifact(&self) -> RunArtifact {
        RunArtifact::Path(Arc::clone(&self.path))
    }

    fn run_batch(&self, sink: &dyn TilingSink) -> Result<(), TilingError> {
        let elements = self.generate_elements();
        let revealed = {
            let mut path = self.path.lock().expect("path mutex poisoned");
            *path = elements.into_iter().collect();
            path.len() as u64
        };
        sink.step(revealed, None);
        Ok(())
    }

    fn run_animated(self: Arc<Self>, ctx: AnimatedContext) {
        let full = self.generate_elements();
        reveal_elements(full, &self.path, ctx);
    }
}
