//! Polyline point sequences produced by the curve and fractal variants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D point in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// One element of a path: a vertex, or a pen lift separating segments.
///
/// Consumers must never draw a line connecting the point before a `Break`
/// to the point after it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathElement {
    Point(Point),
    Break,
}

/// Ordered sequence of path elements describing one or more disconnected
/// polylines. Append-only during construction.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointPath {
    elements: Vec<PathElement>,
}

impl PointPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex.
    pub fn push_point(&mut self, point: Point) {
        self.elements.push(PathElement::Point(point));
    }

    /// Appends a pen lift.
    pub fn push_break(&mut self) {
        self.elements.push(PathElement::Break);
    }

    /// Appends any element.
    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Number of elements, pen lifts included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in order.
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// Iterates over the vertices only, skipping pen lifts.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Point(p) => Some(*p),
            PathElement::Break => None,
        })
    }

    /// Iterates over the connected segments, split at pen lifts.
    pub fn segments(&self) -> impl Iterator<Item = &[PathElement]> {
        self.elements
            .split(|e| matches!(e, PathElement::Break))
            .filter(|s| !s.is_empty())
    }

    /// Discards all elements, keeping the allocation.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

impl From<Vec<Point>> for PointPath {
    fn from(points: Vec<Point>) -> Self {
        Self {
            elements: points.into_iter().map(PathElement::Point).collect(),
        }
    }
}

impl FromIterator<PathElement> for PointPath {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_split_at_breaks() {
        let mut path = PointPath::new();
        path.push_point(Point::new(0.0, 0.0));
        path.push_point(Point::new(1.0, 0.0));
        path.push_break();
        path.push_point(Point::new(2.0, 2.0));
        path.push_point(Point::new(3.0, 2.0));

        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 2);
        assert_eq!(path.points().count(), 4);
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_trailing_break_yields_no_empty_segment() {
        let mut path = PointPath::new();
        path.push_point(Point::new(0.0, 0.0));
        path.push_break();
        assert_eq!(path.segments().count(), 1);
    }

    #[test]
    fn test_midpoint() {
        let m = Point::new(0.0, 2.0).midpoint(Point::new(4.0, 0.0));
        assert!((m.x - 2.0).abs() < f64::EPSILON);
        assert!((m.y - 1.0).abs() < f64::EPSILON);
    }
}
