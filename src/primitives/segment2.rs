//! 2D line segment type.

use super::Vec2;
use num_traits::Float;

/// A 2D line segment defined by two endpoints.
///
/// Generic over floating-point types (`f32` or `f64`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2<F> {
    pub start: Vec2<F>,
    pub end: Vec2<F>,
}

impl<F: Float> Segment2<F> {
    /// Creates a new segment from two points.
    #[inline]
    pub fn new(start: Vec2<F>, end: Vec2<F>) -> Self {
        Self { start, end }
    }

    /// Creates a segment from coordinate pairs.
    #[inline]
    pub fn from_coords(x1: F, y1: F, x2: F, y2: F) -> Self {
        Self {
            start: Vec2::new(x1, y1),
            end: Vec2::new(x2, y2),
        }
    }

    /// Returns the direction vector from start to end.
    #[inline]
    pub fn direction(self) -> Vec2<F> {
        self.end - self.start
    }

    /// Returns the squared length of the segment.
    #[inline]
    pub fn length_squared(self) -> F {
        self.start.distance_squared(self.end)
    }

    /// Returns the length of the segment.
    #[inline]
    pub fn length(self) -> F {
        self.start.distance(self.end)
    }

    /// Returns the midpoint of the segment.
    #[inline]
    pub fn midpoint(self) -> Vec2<F> {
        (self.start + self.end) / F::from(2.0).unwrap()
    }

    /// Returns the point at parameter `t` along the segment.
    ///
    /// - `t = 0` returns `start`
    /// - `t = 1` returns `end`
    /// - Values outside [0, 1] extrapolate beyond the segment
    #[inline]
    pub fn point_at(self, t: F) -> Vec2<F> {
        self.start.lerp(self.end, t)
    }

    /// Returns the reversed segment (start and end swapped).
    #[inline]
    pub fn reversed(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    /// Returns a direction-independent representation of the segment.
    ///
    /// Endpoints are ordered by x, then y, so that the two directed
    /// versions of the same edge normalize identically.
    pub fn undirected(self) -> Self {
        let a = self.start;
        let b = self.end;
        if a.x < b.x || (a.x == b.x && a.y < b.y) {
            self
        } else {
            self.reversed()
        }
    }

    /// Returns `true` if the segment is degenerate (start equals end within
    /// the welding tolerance).
    #[inline]
    pub fn is_degenerate(self) -> bool {
        self.start.fuzzy_eq(self.end)
    }
}

impl<F: Float> From<(Vec2<F>, Vec2<F>)> for Segment2<F> {
    fn from((start, end): (Vec2<F>, Vec2<F>)) -> Self {
        Self::new(start, end)
    }
}
