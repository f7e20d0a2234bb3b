//! Koch curve by recursive segment subdivision.

use std::f64::consts::PI;
use std::sync::{Arc, Mutex};

use crate::path::{PathElement, Point, PointPath};
use crate::sink::TilingSink;
use crate::TilingError;

use super::{reveal_elements, AnimatedContext, RunArtifact, TilingAlgorithm};

/// Koch curve across the horizontal midline of the board.
///
/// Each segment splits into four via its one-third points and an
/// equilateral-bump apex; sub-segments recurse independently, so batch mode
/// runs them as nested fork/join tasks and joins the point lists in segment
/// order, dropping the duplicate joint point between consecutive children.
pub struct KochCurve {
    size: usize,
    depth: u32,
    path: Arc<Mutex<PointPath>>,
}

impl KochCurve {
    pub fn new(size: usize, depth: u32) -> Self {
        Self {
            size,
            depth,
            path: Arc::new(Mutex::new(PointPath::new())),
        }
    }

    fn generate_points(&self) -> Vec<Point> {
        let n = self.size as f64;
        let start = Point::new(0.0, n / 2.0);
        let end = Point::new(n - 1.0, n / 2.0);
        Self::subdivide(start, end, self.depth)
    }

    fn subdivide(a: Point, b: Point, depth: u32) -> Vec<Point> {
        if depth == 0 {
            return vec![a, b];
        }
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let p1 = Point::new(a.x + dx / 3.0, a.y + dy / 3.0);
        let p3 = Point::new(a.x + 2.0 * dx / 3.0, a.y + 2.0 * dy / 3.0);
        let angle = dy.atan2(dx) - PI / 3.0;
        let dist = dx.hypot(dy) / 3.0;
        let p2 = Point::new(p1.x + dist * angle.cos(), p1.y + dist * angle.sin());

        let ((first, second), (third, fourth)) = rayon::join(
            || {
                rayon::join(
                    || Self::subdivide(a, p1, depth - 1),
                    || Self::subdivide(p1, p2, depth - 1),
                )
            },
            || {
                rayon::join(
                    || Self::subdivide(p2, p3, depth - 1),
                    || Self::subdivide(p3, b, depth - 1),
                )
            },
        );

        let mut result = first;
        for child in [second, third, fourth] {
            // The child's first point duplicates the joint we already hold.
            result.pop();
            result.extend(child);
        }
        result
    }
}

impl TilingAlgorithm for KochCurve {
    fn board_size(&self) -> usize {
        self.size
    }

    fn artifact(&self) -> RunArtifact {
        RunArtifact::Path(Arc::clone(&self.path))
    }

    fn run_batch(&self, sink: &dyn TilingSink) -> Result<(), TilingError> {
        let points = self.generate_points();
        let revealed = {
            let mut path = self.path.lock().expect("path mutex poisoned");
            *path = PointPath::from(points);
            path.len() as u64
        };
        sink.step(revealed, None);
        Ok(())
    }

    fn run_animated(self: Arc<Self>, ctx: AnimatedContext) {
        let full: Vec<PathElement> = self
            .generate_points()
            .into_iter()
            .map(PathElement::Point)
            .collect();
        reveal_elements(full, &self.path, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero_is_the_two_endpoints() {
        let curve = KochCurve::new(10, 0);
        let points = curve.generate_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Point::new(0.0, 5.0));
        assert_eq!(points[1], Point::new(9.0, 5.0));
    }

    #[test]
    fn test_point_count_quadruples_per_depth() {
        for depth in 0..=6 {
            let curve = KochCurve::new(100, depth);
            // 4^d segments share joints, leaving 4^d + 1 distinct points.
            assert_eq!(curve.generate_points().len(), 4usize.pow(depth) + 1);
        }
    }

    #[test]
    fn test_endpoints_are_preserved() {
        let curve = KochCurve::new(50, 4);
        let points = curve.generate_points();
        assert_eq!(points.first().copied(), Some(Point::new(0.0, 25.0)));
        assert_eq!(points.last().copied(), Some(Point::new(49.0, 25.0)));
    }

    #[test]
    fn test_parallel_subdivision_matches_fixed_order() {
        // Joined output must not depend on task completion order; repeated
        // runs over the pool produce the identical sequence.
        let reference = KochCurve::new(60, 5).generate_points();
        for _ in 0..5 {
            assert_eq!(KochCurve::new(60, 5).generate_points(), reference);
        }
    }
}
