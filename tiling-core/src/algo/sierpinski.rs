//! Sierpinski triangle by recursive midpoint subdivision.

use std::sync::{Arc, Mutex};

use crate::path::{PathElement, Point, PointPath};
use crate::sink::TilingSink;
use crate::TilingError;

use super::{reveal_elements, AnimatedContext, RunArtifact, TilingAlgorithm};

/// Sierpinski triangle inscribed in the board with a 5% margin.
///
/// Each level splits the triangle into its three corner triangles (the
/// center is skipped). At depth 0 the three edges are emitted as point pairs
/// followed by a pen lift. Batch mode forks one child and computes the other
/// two inline, joining in a, b, c corner order.
pub struct SierpinskiTriangle {
    size: usize,
    depth: u32,
    path: Arc<Mutex<PointPath>>,
}

impl SierpinskiTriangle {
    pub fn new(size: usize, depth: u32) -> Self {
        Self {
            size,
            depth,
            path: Arc::new(Mutex::new(PointPath::new())),
        }
    }

    fn generate_elements(&self) -> Vec<PathElement> {
        let n = self.size as f64;
        let margin = n * 0.05;
        let side = n - 2.0 * margin;
        let height = side * 3f64.sqrt() / 2.0;
        let a = Point::new(margin, n - margin);
        let b = Point::new(n - margin, n - margin);
        let c = Point::new(n / 2.0, n - margin - height);
        Self::subdivide(a, b, c, self.depth)
    }

    fn subdivide(a: Point, b: Point, c: Point, depth: u32) -> Vec<PathElement> {
        if depth == 0 {
            return vec![
                PathElement::Point(a),
                PathElement::Point(b),
                PathElement::Point(b),
                PathElement::Point(c),
                PathElement::Point(c),
                PathElement::Point(a),
                PathElement::Break,
            ];
        }
        let ab = a.midpoint(b);
        let bc = b.midpoint(c);
        let ca = c.midpoint(a);
        let (first, (second, third)) = rayon::join(
            || Self::subdivide(a, ab, ca, depth - 1),
            || {
                (
                    Self::subdivide(b, bc, ab, depth - 1),
                    Self::subdivide(c, ca, bc, depth - 1),
                )
            },
        );
        let mut result = first;
        result.extend(second);
        result.extend(third);
        result
    }
}

impl TilingAlgorithm for SierpinskiTriangle {
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
