//! Hilbert curve via recursive turtle traversal.

use std::sync::{Arc, Mutex};

use crate::path::{PathElement, Point, PointPath};
use crate::sink::TilingSink;
use crate::TilingError;

use super::{reveal_elements, AnimatedContext, RunArtifact, TilingAlgorithm};

/// Space-filling Hilbert curve of a given order.
///
/// Position and heading thread through every recursive call, so the
/// traversal is inherently sequential. Animated mode computes the full point
/// sequence once and reveals it one point per tick.
pub struct HilbertCurve {
    size: usize,
    depth: u32,
    path: Arc<Mutex<PointPath>>,
}

/// Turtle state: current position, heading in degrees, fixed step length.
struct Turtle {
    x: f64,
    y: f64,
    heading: f64,
    step: f64,
}

impl Turtle {
    fn rotate(&mut self, degrees: f64) {
        self.heading += degrees;
    }

    fn forward(&mut self, out: &mut Vec<Point>) {
        let rad = self.heading.to_radians();
        self.x += self.step * rad.cos();
        self.y += self.step * rad.sin();
        out.push(Point::new(self.x, self.y));
    }
}

impl HilbertCurve {
    pub fn new(size: usize, depth: u32) -> Self {
        Self {
            size,
            depth,
            path: Arc::new(Mutex::new(PointPath::new())),
        }
    }

    /// Full point sequence: the seed point plus one point per forward step.
    fn generate_points(&self) -> Vec<Point> {
        let step = (self.size as f64 - 1.0) / (f64::from(2u32.pow(self.depth)) - 1.0);
        let mut turtle = Turtle {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            step,
        };
        let mut points = vec![Point::new(0.0, 0.0)];
        Self::generate(&mut turtle, self.depth, 90.0, &mut points);
        points
    }

    fn generate(turtle: &mut Turtle, level: u32, theta: f64, out: &mut Vec<Point>) {
        if level == 0 {
            return;
        }
        turtle.rotate(theta);
        Self::generate(turtle, level - 1, -theta, out);
        turtle.forward(out);
        turtle.rotate(-theta);
        Self::generate(turtle, level - 1, theta, out);
        turtle.forward(out);
        Self::generate(turtle, level - 1, theta, out);
        turtle.rotate(-theta);
        turtle.forward(out);
        Self::generate(turtle, level - 1, -theta, out);
        turtle.rotate(theta);
    }
}

impl TilingAlgorithm for HilbertCurve {
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
