//! Core polygon type and basic operations.

use crate::intersect::{
    check_intersect_segment_segment, distance_point_segment_squared, intersect_polygon_ray,
    point_orientation,
};
use crate::primitives::{epsilon, Segment2, Vec2};
use num_traits::Float;
use std::cmp::Ordering;

/// Classification of a point against a polygon.
///
/// This is a three-valued result, not a boolean: boolean-operation fragment
/// classification depends on distinguishing boundary membership from strict
/// containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// The point lies strictly outside the polygon.
    Outside = 0,
    /// The point lies strictly inside the polygon.
    Inside = 1,
    /// The point lies on the polygon boundary (within the welding tolerance).
    Boundary = 2,
}

impl Containment {
    /// Returns true for `Inside` and `Boundary`.
    #[inline]
    pub fn is_inside(self) -> bool {
        !matches!(self, Containment::Outside)
    }
}

/// A 2D polygon represented as an ordered point ring.
///
/// The polygon is implicitly closed: the last point connects back to the
/// first. Orientation (clockwise or counter-clockwise) is derived from the
/// points, never stored. A polygon may be self-intersecting as input to
/// convex decomposition, but boolean operations assume simple polygons.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon<F> {
    /// The polygon vertices in ring order.
    pub points: Vec<Vec2<F>>,
}

impl<F: Float> Polygon<F> {
    /// Creates a new, empty polygon.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a polygon from a list of points.
    #[inline]
    pub fn from_points(points: Vec<Vec2<F>>) -> Self {
        Self { points }
    }

    /// Creates a polygon from `(x, y)` coordinate tuples.
    pub fn from_tuples(tuples: &[(F, F)]) -> Self {
        Self {
            points: tuples.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
        }
    }

    /// Creates a regular polygon around `center` with the given vertex count.
    pub fn regular(center: Vec2<F>, radius: F, points: usize) -> Self {
        let tau = F::from(2.0 * std::f64::consts::PI).unwrap();
        let step = tau / F::from(points).unwrap();

        let mut p = Polygon::new();
        for i in 0..points {
            let phi = step * F::from(i).unwrap();
            p.add_point(Vec2::new(
                center.x + radius * phi.cos(),
                center.y + radius * phi.sin(),
            ));
        }
        p
    }

    /// Appends a point to the end of the ring.
    #[inline]
    pub fn add_point(&mut self, point: Vec2<F>) {
        self.points.push(point);
    }

    /// Appends multiple points to the end of the ring.
    #[inline]
    pub fn add_points(&mut self, points: impl IntoIterator<Item = Vec2<F>>) {
        self.points.extend(points);
    }

    /// Returns the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the polygon has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the mean of the polygon's vertices.
    ///
    /// This is the center of the vertex set, not the area centroid; see
    /// [`Polygon::centroid`] for the area-weighted center.
    pub fn center(&self) -> Option<Vec2<F>> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self.points.iter().fold(Vec2::zero(), |acc, &p| acc + p);
        Some(sum / F::from(self.points.len()).unwrap())
    }

    /// Returns the signed area of the polygon using the shoelace formula.
    ///
    /// The sign depends on winding order; use [`Polygon::area`] for the
    /// absolute value.
    pub fn signed_area(&self) -> F {
        if self.points.len() < 3 {
            return F::zero();
        }

        let n = self.points.len();
        let mut area = F::zero();
        for i in 0..n {
            let j = (i + 1) % n;
            area = area + self.points[i].x * self.points[j].y;
            area = area - self.points[j].x * self.points[i].y;
        }
        area / F::from(2.0).unwrap()
    }

    /// Returns the absolute area of the polygon.
    pub fn area(&self) -> F {
        self.signed_area().abs()
    }

    /// Returns the area centroid of the polygon.
    ///
    /// Returns `None` for degenerate polygons (fewer than 3 points or zero
    /// area).
    pub fn centroid(&self) -> Option<Vec2<F>> {
        if self.points.len() < 3 {
            return None;
        }

        let area = self.signed_area();
        if area.abs() < F::epsilon() {
            return None;
        }

        let n = self.points.len();
        let mut cx = F::zero();
        let mut cy = F::zero();
        for i in 0..n {
            let j = (i + 1) % n;
            let cross = self.points[i].x * self.points[j].y - self.points[j].x * self.points[i].y;
            cx = cx + (self.points[i].x + self.points[j].x) * cross;
            cy = cy + (self.points[i].y + self.points[j].y) * cross;
        }

        let six = F::from(6.0).unwrap();
        Some(Vec2::new(cx / (six * area), cy / (six * area)))
    }

    /// Re-orders points by their angle around a center point.
    pub fn sort_around(&mut self, center: Vec2<F>) {
        let tau = F::from(2.0 * std::f64::consts::PI).unwrap();

        let angle = |p: &Vec2<F>| {
            let d = *p - center;
            let mut phi = d.y.atan2(d.x);
            if phi < F::zero() {
                phi = phi + tau;
            }
            phi
        };

        self.points
            .sort_by(|a, b| angle(a).partial_cmp(&angle(b)).unwrap_or(Ordering::Equal));
    }

    /// Determines whether the polygon has clockwise orientation.
    pub fn is_clockwise(&self) -> bool {
        Self::is_clockwise_points(&self.points)
    }

    /// Determines the orientation of a raw point ring.
    ///
    /// The orientation is computed at the point with minimal x-coordinate,
    /// which is always a hull vertex, so local concavities elsewhere cannot
    /// flip the answer. An empty ring is reported as counter-clockwise.
    pub fn is_clockwise_points(pts: &[Vec2<F>]) -> bool {
        if pts.is_empty() {
            return false;
        }
        let n = pts.len();
        let i_min = (0..n)
            .min_by(|&i, &j| pts[i].x.partial_cmp(&pts[j].x).unwrap_or(Ordering::Equal))
            .unwrap_or(0);

        let a = pts[(i_min + n - 1) % n];
        let b = pts[i_min];
        let c = pts[(i_min + 1) % n];

        point_orientation(a, b, c)
    }

    /// Determines whether the polygon is convex.
    pub fn is_convex(&self) -> bool {
        Self::is_convex_points(&self.points)
    }

    /// Determines whether a raw point ring forms a convex polygon.
    ///
    /// Every vertex must turn the same way as the first one. Rings with
    /// fewer than three points are trivially convex.
    pub fn is_convex_points(pts: &[Vec2<F>]) -> bool {
        let n = pts.len();
        if n < 3 {
            return true;
        }
        let ori = point_orientation(pts[n - 1], pts[0], pts[1]);

        for i in 1..n {
            if point_orientation(pts[i - 1], pts[i], pts[(i + 1) % n]) != ori {
                return false;
            }
        }
        true
    }

    /// Reverses the orientation of the polygon in place.
    pub fn flip(&mut self) -> &mut Self {
        self.points.reverse();
        self
    }

    /// Returns a copy with reversed orientation.
    pub fn flipped(&self) -> Self {
        let mut p = self.clone();
        p.flip();
        p
    }

    /// Returns a counter-clockwise copy of the polygon.
    pub fn clone_ccw(&self) -> Self {
        let mut p = self.clone();
        if p.is_clockwise() {
            p.flip();
        }
        p
    }

    /// Returns a clockwise copy of the polygon.
    pub fn clone_cw(&self) -> Self {
        let mut p = self.clone();
        if !p.is_clockwise() {
            p.flip();
        }
        p
    }

    /// Classifies a point against this polygon.
    pub fn contains(&self, p: Vec2<F>) -> Containment {
        Self::contains_points(&self.points, p)
    }

    /// Classifies a point against a raw point ring.
    ///
    /// The boundary test runs first: any point within the welding tolerance
    /// of an edge is [`Containment::Boundary`]. Otherwise a ray is cast in
    /// +x direction and crossings are counted. Crossings that coincide with
    /// a polygon vertex are discarded when both adjacent vertices lie on the
    /// same side of the ray, since the ray grazes the vertex without
    /// entering.
    pub fn contains_points(pts: &[Vec2<F>], p: Vec2<F>) -> Containment {
        if pts.len() < 3 {
            return Containment::Outside;
        }

        let eps = epsilon::<F>();
        let n = pts.len();

        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            if distance_point_segment_squared(p, a, b) < eps * eps {
                return Containment::Boundary;
            }
        }

        let mut crossings = intersect_polygon_ray(pts, p, p + Vec2::unit_x());
        dedup_fuzzy(&mut crossings);

        crossings.retain(|&ip| match pts.iter().position(|&v| v.fuzzy_eq(ip)) {
            Some(i) => {
                let prv = pts[(i + n - 1) % n];
                let nxt = pts[(i + 1) % n];
                point_orientation(p, ip, nxt) != point_orientation(p, ip, prv)
            }
            None => true,
        });

        if crossings.len() % 2 == 1 {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }

    /// Simplifies a point sequence so that no point is a fuzzy duplicate of
    /// its cyclic neighbors and no point lies on the line between them.
    ///
    /// Applying this twice yields the same result as applying it once.
    pub fn simplify_sequence(mut seq: Vec<Vec2<F>>) -> Vec<Vec2<F>> {
        let eps = epsilon::<F>();
        let mut i = 0;
        while i < seq.len() {
            let n = seq.len();
            let p = seq[(i + n - 1) % n];
            let c = seq[i];
            let nx = seq[(i + 1) % n];

            if p.fuzzy_eq(c)
                || c.fuzzy_eq(nx)
                || p.fuzzy_eq(nx)
                || distance_point_segment_squared(c, p, nx) < eps
            {
                seq.remove(i);
            } else {
                i += 1;
            }
        }
        seq
    }

    /// Removes duplicate and collinear points from this polygon in place.
    pub fn simplify(&mut self) {
        self.points = Self::simplify_sequence(std::mem::take(&mut self.points));
    }

    /// Tests whether any two non-adjacent edges of the polygon cross.
    pub fn is_self_intersecting(&self) -> bool {
        let pts = &self.points;
        let n = pts.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let a = pts[i];
                let b = pts[(i + 1) % n];
                let c = pts[j];
                let d = pts[(j + 1) % n];

                if !(b.fuzzy_eq(c) || d.fuzzy_eq(a))
                    && check_intersect_segment_segment(a, b, c, d)
                {
                    return true;
                }
            }
        }
        false
    }

    /// Returns the implicitly-closed edge list of the polygon.
    pub fn edges(&self) -> Vec<Segment2<F>> {
        crate::intersect::polygon_edges(&self.points)
    }

    /// Returns the bounding box as `(min, max)` corners.
    pub fn bounding_box(&self) -> Option<(Vec2<F>, Vec2<F>)> {
        if self.points.is_empty() {
            return None;
        }

        let mut min = self.points[0];
        let mut max = self.points[0];
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Smallest x-coordinate of any point.
    pub fn left(&self) -> F {
        self.points.iter().map(|p| p.x).fold(F::infinity(), F::min)
    }

    /// Largest x-coordinate of any point.
    pub fn right(&self) -> F {
        self.points
            .iter()
            .map(|p| p.x)
            .fold(F::neg_infinity(), F::max)
    }

    /// Smallest y-coordinate of any point.
    pub fn top(&self) -> F {
        self.points.iter().map(|p| p.y).fold(F::infinity(), F::min)
    }

    /// Largest y-coordinate of any point.
    pub fn bottom(&self) -> F {
        self.points
            .iter()
            .map(|p| p.y)
            .fold(F::neg_infinity(), F::max)
    }

    /// Horizontal extent of the polygon.
    pub fn width(&self) -> F {
        self.right() - self.left()
    }

    /// Vertical extent of the polygon.
    pub fn height(&self) -> F {
        self.bottom() - self.top()
    }

    /// Converts the polygon to a list of `(x, y)` tuples.
    pub fn as_tuples(&self) -> Vec<(F, F)> {
        self.points.iter().map(|p| (p.x, p.y)).collect()
    }
}

/// Removes fuzzy-duplicate points from a list, keeping first occurrences.
pub(crate) fn dedup_fuzzy<F: Float>(points: &mut Vec<Vec2<F>>) {
    let mut i = 0;
    while i < points.len() {
        let p = points[i];
        let mut j = i + 1;
        while j < points.len() {
            if points[j].fuzzy_eq(p) {
                points.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon<f64> {
        Polygon::from_tuples(&[(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)])
    }

    fn l_shape() -> Polygon<f64> {
        Polygon::from_tuples(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ])
    }

    #[test]
    fn test_from_tuples() {
        let p = square(1.0);
        assert_eq!(p.len(), 4);
        assert!(!p.is_empty());
    }

    #[test]
    fn test_regular_polygon() {
        let p: Polygon<f64> = Polygon::regular(Vec2::new(1.0, 2.0), 3.0, 6);
        assert_eq!(p.len(), 6);
        for v in &p.points {
            assert_relative_eq!((*v - Vec2::new(1.0, 2.0)).length(), 3.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_center() {
        let c = square(2.0).center().unwrap();
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 1.0);
    }

    #[test]
    fn test_area() {
        assert_relative_eq!(square(2.0).area(), 4.0);
        assert_relative_eq!(l_shape().area(), 3.0);
    }

    #[test]
    fn test_centroid_square() {
        let c = square(2.0).centroid().unwrap();
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_flip_changes_orientation() {
        let p = square(1.0);
        assert_ne!(p.is_clockwise(), p.flipped().is_clockwise());
    }

    #[test]
    fn test_double_flip_is_identity() {
        let p = l_shape();
        let mut q = p.clone();
        q.flip();
        q.flip();
        assert_eq!(p, q);
    }

    #[test]
    fn test_clone_cw_ccw() {
        let p = square(1.0);
        assert!(p.clone_cw().is_clockwise());
        assert!(!p.clone_ccw().is_clockwise());
        assert_relative_eq!(p.clone_cw().area(), p.area());
    }

    #[test]
    fn test_is_convex() {
        assert!(square(1.0).is_convex());
        assert!(!l_shape().is_convex());
    }

    #[test]
    fn test_sort_around() {
        let mut p = Polygon::from_tuples(&[(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)]);
        p.sort_around(Vec2::zero());
        assert_eq!(
            p.points,
            vec![
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(-1.0, 0.0),
                Vec2::new(0.0, -1.0),
            ]
        );
    }

    #[test]
    fn test_contains_inside_outside() {
        let p = square(2.0);
        assert_eq!(p.contains(Vec2::new(1.0, 1.0)), Containment::Inside);
        assert_eq!(p.contains(Vec2::new(3.0, 1.0)), Containment::Outside);
        assert_eq!(p.contains(Vec2::new(-1.0, 1.0)), Containment::Outside);
    }

    #[test]
    fn test_contains_boundary() {
        let p = square(2.0);
        assert_eq!(p.contains(Vec2::new(1.0, 0.0)), Containment::Boundary);
        assert_eq!(p.contains(Vec2::new(2.0, 2.0)), Containment::Boundary);
    }

    #[test]
    fn test_contains_ray_through_vertex() {
        // The +x ray from the origin passes exactly through the (2, 0)
        // vertex and must still count a single crossing.
        let diamond = Polygon::from_tuples(&[(0.0, -2.0), (2.0, 0.0), (0.0, 2.0), (-2.0, 0.0)]);
        assert_eq!(diamond.contains(Vec2::new(0.0, 0.0)), Containment::Inside);
        assert_eq!(diamond.contains(Vec2::new(-3.0, 0.0)), Containment::Outside);
    }

    #[test]
    fn test_contains_center_of_convex() {
        for n in 3..9 {
            let p: Polygon<f64> = Polygon::regular(Vec2::zero(), 5.0, n);
            assert_eq!(p.contains(p.center().unwrap()), Containment::Inside);
        }
    }

    #[test]
    fn test_contains_degenerate() {
        let p = Polygon::from_tuples(&[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(p.contains(Vec2::new(0.5, 0.0)), Containment::Outside);
    }

    #[test]
    fn test_simplify_sequence() {
        let seq = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0), // collinear
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 0.0), // duplicate
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        let simplified = Polygon::simplify_sequence(seq);
        assert_eq!(simplified.len(), 4);
    }

    #[test]
    fn test_simplify_sequence_idempotent() {
        let seq = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 4.0),
        ];
        let once = Polygon::simplify_sequence(seq.clone());
        let twice = Polygon::simplify_sequence(once.clone());
        assert_eq!(once, twice);
        assert!(once.len() < seq.len());
    }

    #[test]
    fn test_is_self_intersecting() {
        let bowtie = Polygon::from_tuples(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert!(bowtie.is_self_intersecting());
        assert!(!square(1.0).is_self_intersecting());
    }

    #[test]
    fn test_bounds() {
        let p = Polygon::from_tuples(&[(1.0, 2.0), (3.0, 1.0), (4.0, 3.0), (2.0, 4.0)]);
        assert_relative_eq!(p.left(), 1.0);
        assert_relative_eq!(p.right(), 4.0);
        assert_relative_eq!(p.top(), 1.0);
        assert_relative_eq!(p.bottom(), 4.0);
        assert_relative_eq!(p.width(), 3.0);
        assert_relative_eq!(p.height(), 3.0);

        let (min, max) = p.bounding_box().unwrap();
        assert_eq!(min, Vec2::new(1.0, 1.0));
        assert_eq!(max, Vec2::new(4.0, 4.0));
    }

    #[test]
    fn test_as_tuples_round_trip() {
        let p = square(3.0);
        assert_eq!(Polygon::from_tuples(&p.as_tuples()), p);
    }
}
