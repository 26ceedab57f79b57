//! Line, ray and segment intersection math.
//!
//! All intersection functions share one 2x2 linear solve over the direction
//! vectors of the two lines, differing only in how the resulting parameters
//! are gated: `u ∈ [0, 1]` restricts to a segment, `u ≥ 0` restricts to a
//! ray, and an unrestricted parameter describes an infinite line.

use crate::primitives::{Segment2, Vec2};
use num_traits::Float;

/// Solves for the line parameters of the intersection of lines `(p1, p2)`
/// and `(q1, q2)`.
///
/// Returns `(u_p, u_q)` such that the intersection point is
/// `p1 + u_p * (p2 - p1)` and also `q1 + u_q * (q2 - q1)`. Returns `None`
/// when the determinant is exactly zero (parallel or coincident lines);
/// callers must not rely on near-parallel robustness.
fn line_line_params<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    q1: Vec2<F>,
    q2: Vec2<F>,
) -> Option<(F, F)> {
    let d = (q2.y - q1.y) * (p2.x - p1.x) - (q2.x - q1.x) * (p2.y - p1.y);
    if d == F::zero() {
        return None;
    }

    let n1 = (q2.x - q1.x) * (p1.y - q1.y) - (q2.y - q1.y) * (p1.x - q1.x);
    let n2 = (p2.x - p1.x) * (p1.y - q1.y) - (p2.y - p1.y) * (p1.x - q1.x);

    Some((n1 / d, n2 / d))
}

#[inline]
fn point_at<F: Float>(p1: Vec2<F>, p2: Vec2<F>, u: F) -> Vec2<F> {
    p1 + (p2 - p1) * u
}

/// Intersects two infinite lines given by point pairs.
///
/// Returns `None` for parallel or coincident lines.
pub fn intersect_line_line<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    q1: Vec2<F>,
    q2: Vec2<F>,
) -> Option<Vec2<F>> {
    let (u_p, _) = line_line_params(p1, p2, q1, q2)?;
    Some(point_at(p1, p2, u_p))
}

/// Intersects the segment `(p1, p2)` with the infinite line `(q1, q2)`.
pub fn intersect_segment_line<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    q1: Vec2<F>,
    q2: Vec2<F>,
) -> Option<Vec2<F>> {
    let (u_p, _) = line_line_params(p1, p2, q1, q2)?;
    if u_p < F::zero() || u_p > F::one() {
        return None;
    }
    Some(point_at(p1, p2, u_p))
}

/// Intersects the segment `(p1, p2)` with the ray from `q1` through `q2`.
pub fn intersect_segment_ray<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    q1: Vec2<F>,
    q2: Vec2<F>,
) -> Option<Vec2<F>> {
    let (u_p, u_q) = line_line_params(p1, p2, q1, q2)?;
    if u_p < F::zero() || u_p > F::one() {
        return None;
    }
    if u_q < F::zero() {
        return None;
    }
    Some(point_at(p1, p2, u_p))
}

#[inline]
fn bbox_reject<F: Float>(p1: Vec2<F>, p2: Vec2<F>, q1: Vec2<F>, q2: Vec2<F>) -> bool {
    q1.x.max(q2.x) < p1.x.min(p2.x)
        || q1.x.min(q2.x) > p1.x.max(p2.x)
        || q1.y.max(q2.y) < p1.y.min(p2.y)
        || q1.y.min(q2.y) > p1.y.max(p2.y)
}

/// Intersects the two segments `(p1, p2)` and `(q1, q2)`.
///
/// An axis-aligned bounding box rejection runs before the linear solve; the
/// solve itself is shared with the line and ray variants.
pub fn intersect_segment_segment<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    q1: Vec2<F>,
    q2: Vec2<F>,
) -> Option<Vec2<F>> {
    if bbox_reject(p1, p2, q1, q2) {
        return None;
    }

    let (u_p, u_q) = line_line_params(p1, p2, q1, q2)?;
    if u_p < F::zero() || u_p > F::one() {
        return None;
    }
    if u_q < F::zero() || u_q > F::one() {
        return None;
    }
    Some(point_at(p1, p2, u_p))
}

/// Tests whether two segments intersect without computing the point.
pub fn check_intersect_segment_segment<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    q1: Vec2<F>,
    q2: Vec2<F>,
) -> bool {
    if bbox_reject(p1, p2, q1, q2) {
        return false;
    }

    match line_line_params(p1, p2, q1, q2) {
        Some((u_p, u_q)) => {
            u_p >= F::zero() && u_p <= F::one() && u_q >= F::zero() && u_q <= F::one()
        }
        None => false,
    }
}

/// Intersects a list of segments with the segment `(p1, p2)`.
///
/// Intersections at a segment endpoint coinciding with `p2` are skipped, so
/// that probing from a shared vertex does not report the vertex itself.
pub fn intersect_segments_segment<F: Float>(
    segs: &[Segment2<F>],
    p1: Vec2<F>,
    p2: Vec2<F>,
) -> Vec<Vec2<F>> {
    let mut points = Vec::new();
    for seg in segs {
        if let Some(p) = intersect_segment_segment(seg.start, seg.end, p1, p2) {
            if !seg.start.fuzzy_eq(p2) && !seg.end.fuzzy_eq(p2) {
                points.push(p);
            }
        }
    }
    points
}

/// Intersects a list of segments with the ray from `p1` through `p2`.
pub fn intersect_segments_ray<F: Float>(
    segs: &[Segment2<F>],
    p1: Vec2<F>,
    p2: Vec2<F>,
) -> Vec<Vec2<F>> {
    let mut points = Vec::new();
    for seg in segs {
        if let Some(p) = intersect_segment_ray(seg.start, seg.end, p1, p2) {
            points.push(p);
        }
    }
    points
}

/// Intersects two lists of segments, returning all pairwise intersections.
pub fn intersect_segments_segments<F: Float>(
    segs1: &[Segment2<F>],
    segs2: &[Segment2<F>],
) -> Vec<Vec2<F>> {
    let mut points = Vec::new();
    for seg in segs1 {
        points.extend(intersect_segments_segment(segs2, seg.start, seg.end));
    }
    points
}

/// Returns the implicitly-closed edge list of a point ring.
pub fn polygon_edges<F: Float>(points: &[Vec2<F>]) -> Vec<Segment2<F>> {
    let n = points.len();
    (0..n)
        .map(|i| Segment2::new(points[i], points[(i + 1) % n]))
        .collect()
}

/// Intersects the edges of a (closed) point ring with a segment.
pub fn intersect_polygon_segment<F: Float>(
    points: &[Vec2<F>],
    p1: Vec2<F>,
    p2: Vec2<F>,
) -> Vec<Vec2<F>> {
    intersect_segments_segment(&polygon_edges(points), p1, p2)
}

/// Intersects the edges of a (closed) point ring with a ray.
pub fn intersect_polygon_ray<F: Float>(
    points: &[Vec2<F>],
    p1: Vec2<F>,
    p2: Vec2<F>,
) -> Vec<Vec2<F>> {
    intersect_segments_ray(&polygon_edges(points), p1, p2)
}

/// Intersects the boundaries of two point rings.
pub fn intersect_polygon_polygon<F: Float>(
    points1: &[Vec2<F>],
    points2: &[Vec2<F>],
) -> Vec<Vec2<F>> {
    intersect_segments_segments(&polygon_edges(points1), &polygon_edges(points2))
}

/// Squared distance from a point to the segment `(a, b)`.
///
/// Projects the point onto the segment's line and clamps the projection
/// parameter to [0, 1], returning the squared perpendicular distance or the
/// squared distance to the nearer endpoint. No square root is taken; this is
/// the inner-loop primitive of offsetting and decomposition.
pub fn distance_point_segment_squared<F: Float>(p: Vec2<F>, a: Vec2<F>, b: Vec2<F>) -> F {
    let ap = p - a;
    let ab = b - a;
    let len_sq = ab.length_squared();

    if len_sq == F::zero() {
        return ap.length_squared();
    }

    let r = ap.dot(ab) / len_sq;
    if r <= F::zero() {
        return ap.length_squared();
    }
    if r >= F::one() {
        return (p - b).length_squared();
    }

    let s = (a.y - p.y) * (b.x - a.x) - (a.x - p.x) * (b.y - a.y);
    s * s / len_sq
}

/// Distance from a point to the infinite line through `a` and `b`.
pub fn distance_point_line<F: Float>(p: Vec2<F>, a: Vec2<F>, b: Vec2<F>) -> F {
    let num = ((p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)).abs();
    num / ((b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y)).sqrt()
}

/// Orientation of the triangle `a`, `b`, `c`.
///
/// Returns `true` iff the signed area is strictly positive (clockwise under
/// this coordinate convention). Collinear triples return `false`; notch
/// detection and convexity tests rely on that tie-break and treat collinear
/// configurations as "not convex".
#[inline]
pub fn point_orientation<F: Float>(a: Vec2<F>, b: Vec2<F>, c: Vec2<F>) -> bool {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y) > F::zero()
}

/// Tests whether `p` lies strictly inside the triangle `a`, `b`, `c`.
pub fn point_in_triangle<F: Float>(p: Vec2<F>, a: Vec2<F>, b: Vec2<F>, c: Vec2<F>) -> bool {
    let o = point_orientation(a, b, c);
    point_orientation(a, b, p) == o
        && point_orientation(b, c, p) == o
        && point_orientation(a, p, c) == o
}
