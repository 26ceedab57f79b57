//! Polygon offsetting (grow/shrink) by computing winding numbers.
//!
//! Implements the approach from Xiaorui Chen and Sara McMains, "Polygon
//! Offsetting by Computing Winding Numbers", Proceedings of IDETC/CIE 2005.
//! Every edge is translated along its normal, corner gaps are filled by a
//! tip decorator, the resulting self-intersecting ring is split into simple
//! loops and each loop is kept or discarded based on the winding number of
//! its interior.

use super::core::Polygon;
use crate::error::GeometryError;
use crate::intersect::{
    intersect_line_line, intersect_segment_ray, intersect_segment_segment, point_in_triangle,
    point_orientation,
};
use crate::primitives::Vec2;
use num_traits::Float;
use std::cmp::Ordering;

/// Fills the corner gap between two translated edges.
///
/// Receives the translated previous edge `(a, b)` and the translated next
/// edge `(c, d)`; returns the points to insert between `b` and `c`.
pub type TipDecorator<F> = fn(Vec2<F>, Vec2<F>, Vec2<F>, Vec2<F>) -> Vec<Vec2<F>>;

/// Miter-style tip: extends both edges to their intersection point.
///
/// Produces an empty tip when the edges are parallel.
pub fn tip_decorator_pointy<F: Float>(
    a: Vec2<F>,
    b: Vec2<F>,
    c: Vec2<F>,
    d: Vec2<F>,
) -> Vec<Vec2<F>> {
    intersect_line_line(a, b, c, d).into_iter().collect()
}

/// Bevel-style tip: connects the edge ends with a straight line.
pub fn tip_decorator_flat<F: Float>(
    _a: Vec2<F>,
    _b: Vec2<F>,
    _c: Vec2<F>,
    _d: Vec2<F>,
) -> Vec<Vec2<F>> {
    Vec::new()
}

/// Translates each edge of the ring along its normal by `amount` and fills
/// convex corner gaps with the tip decorator. The result usually
/// self-intersects and must be filtered by winding number.
fn offset_ring<F: Float>(
    poly: &Polygon<F>,
    amount: F,
    tip: TipDecorator<F>,
) -> Result<Vec<Vec2<F>>, GeometryError> {
    let pts = &poly.points;
    let n = pts.len();
    let mut r = Vec::with_capacity(n * 3);

    for i in 0..n {
        let c = pts[i];
        let nx = pts[(i + 1) % n];
        let n2 = pts[(i + 2) % n];
        let is_convex = point_orientation(c, nx, n2);

        let unit_normal = (nx - c).normal().normalize().ok_or_else(|| {
            GeometryError::InvalidGeometry("cannot offset zero-length edge".into())
        })?;
        let unit_normal2 = (n2 - nx).normal().normalize().ok_or_else(|| {
            GeometryError::InvalidGeometry("cannot offset zero-length edge".into())
        })?;

        let c_prime = c + unit_normal * amount;
        let n_prime = nx + unit_normal * amount;
        let n_prime2 = nx + unit_normal2 * amount;
        let n2_prime = n2 + unit_normal2 * amount;

        r.push(c_prime);
        r.push(n_prime);

        if is_convex == (amount > F::zero()) {
            // Reflex gap: route through the original corner.
            r.push(nx);
        } else {
            r.extend(tip(c_prime, n_prime, n_prime2, n2_prime));
        }
    }
    Ok(r)
}

/// Splits a possibly self-intersecting ring into simple loops.
///
/// Self-intersection points are spliced into the ring in traversal order,
/// then loops are peeled off by walking until a point repeats.
fn split_loops<F: Float>(ring: Vec<Vec2<F>>) -> Vec<Vec<Vec2<F>>> {
    let n = ring.len();

    let mut splices: Vec<Vec<Vec2<F>>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            let c = ring[j];
            let d = ring[(j + 1) % n];

            if let Some(x) = intersect_segment_segment(a, b, c, d) {
                if !(x.fuzzy_eq(a) || x.fuzzy_eq(b) || x.fuzzy_eq(c) || x.fuzzy_eq(d)) {
                    splices[i].push(x);
                    splices[j].push(x);
                }
            }
        }
    }

    let mut pts = Vec::with_capacity(n);
    for i in 0..n {
        pts.push(ring[i]);

        let dir = ring[(i + 1) % n] - ring[i];
        let mut splice = std::mem::take(&mut splices[i]);
        splice.sort_by(|a, b| {
            let ta = (*a - ring[i]).dot(dir);
            let tb = (*b - ring[i]).dot(dir);
            ta.partial_cmp(&tb).unwrap_or(Ordering::Equal)
        });
        pts.extend(splice);
    }

    let mut out = Vec::new();
    while !pts.is_empty() {
        let mut seen: Vec<Vec2<F>> = Vec::new();
        let mut revisit = 0;
        for &p in pts.iter().chain(std::iter::once(&pts[0])) {
            match seen.iter().position(|s| s.fuzzy_eq(p)) {
                Some(i) => {
                    revisit = i;
                    break;
                }
                None => seen.push(p),
            }
        }

        let loop_pts = seen.split_off(revisit);
        for p in &loop_pts {
            if let Some(i) = pts.iter().position(|q| q.fuzzy_eq(*p)) {
                pts.remove(i);
            }
        }
        out.push(loop_pts);
    }
    out
}

/// Computes the winding number of `p` with respect to a set of loops using
/// the crossing-number method on a +x ray.
fn winding_number<F: Float>(p: Vec2<F>, loops: &[Vec<Vec2<F>>]) -> i32 {
    let mut wn = 0;
    for ring in loops {
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];

            if a.y < p.y && b.y > p.y {
                if let Some(x) = intersect_segment_ray(a, b, p, p + Vec2::unit_x()) {
                    if x.x > p.x {
                        wn -= 1;
                    }
                }
            }
            if a.y > p.y && b.y < p.y {
                if let Some(x) = intersect_segment_ray(a, b, p, p + Vec2::unit_x()) {
                    if x.x > p.x {
                        wn += 1;
                    }
                }
            }
        }
    }
    wn
}

/// Finds a point strictly inside a simple loop.
///
/// Picks a convex vertex `v`; if no other loop point lies inside the ear
/// triangle around `v`, the ear is empty and the midpoint of its base works.
/// Otherwise the midpoint of the shortest diagonal from `v` to a contained
/// point is interior.
fn interior_point<F: Float>(pts: &[Vec2<F>]) -> Vec2<F> {
    let n = pts.len();
    if n == 3 {
        return (pts[0] + pts[1] + pts[2]) / F::from(3.0).unwrap();
    }

    let mut a = pts[n - 2];
    let mut v = pts[n - 1];
    let mut b = pts[0];
    for i in 0..n {
        let pa = pts[(i + n - 1) % n];
        let pv = pts[i];
        let pb = pts[(i + 1) % n];
        if !point_orientation(pa, pv, pb) {
            a = pa;
            v = pv;
            b = pb;
            break;
        }
    }

    let candidates: Vec<Vec2<F>> = pts
        .iter()
        .copied()
        .filter(|&q| {
            !(q.fuzzy_eq(a) || q.fuzzy_eq(v) || q.fuzzy_eq(b)) && point_in_triangle(q, a, v, b)
        })
        .collect();

    match candidates.into_iter().min_by(|p, q| {
        (*p - v)
            .length_squared()
            .partial_cmp(&(*q - v).length_squared())
            .unwrap_or(Ordering::Equal)
    }) {
        Some(q) => (q - v) / F::from(2.0).unwrap() + v,
        None => (b - a) / F::from(2.0).unwrap() + a,
    }
}

/// Shrinks or grows a set of polygons by a given amount.
///
/// Counter-clockwise rings are treated as islands, clockwise rings as holes.
/// Positive `amount` grows, negative shrinks. A polygon that collapses under
/// shrinking simply disappears from the output.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] when an input ring has a
/// zero-length edge, since such an edge has no normal to offset along.
pub fn offset<F: Float>(
    polys: &[Polygon<F>],
    amount: F,
    tip: TipDecorator<F>,
) -> Result<Vec<Polygon<F>>, GeometryError> {
    if amount == F::zero() {
        return Ok(polys.to_vec());
    }

    let mut raw = Vec::new();
    for poly in polys {
        let ring = offset_ring(poly, amount, tip)?;
        raw.extend(split_loops(ring));
    }

    let mut output = Vec::new();
    for ring in &raw {
        let simplified = Polygon::simplify_sequence(ring.clone());
        if simplified.len() < 3 {
            continue;
        }

        let p = interior_point(&simplified);
        let wn = winding_number(p, &raw);

        // Shrink keeps regions still wound positively, grow keeps only the
        // singly-wound outer region.
        if (amount < F::zero() && wn > 0) || (amount > F::zero() && wn == 1) {
            output.push(Polygon::from_points(simplified));
        }
    }

    Ok(output)
}

impl<F: Float> Polygon<F> {
    /// Offsets this polygon with the miter tip decorator.
    ///
    /// See [`offset`] for the full-control variant.
    pub fn offset(&self, amount: F) -> Result<Vec<Polygon<F>>, GeometryError> {
        offset(std::slice::from_ref(self), amount, tip_decorator_pointy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Containment;
    use approx::assert_relative_eq;

    /// Counter-clockwise square in y-down screen coordinates.
    fn island_square(size: f64) -> Polygon<f64> {
        Polygon::from_tuples(&[(0.0, 0.0), (0.0, size), (size, size), (size, 0.0)])
    }

    #[test]
    fn test_grow_square_pointy() {
        let p = island_square(2.0);
        assert!(!p.is_clockwise());

        let grown = p.offset(2.0).unwrap();
        assert_eq!(grown.len(), 1);
        assert_relative_eq!(grown[0].area(), 36.0, epsilon = 1e-6);

        let (min, max) = grown[0].bounding_box().unwrap();
        assert_relative_eq!(min.x, -2.0, epsilon = 1e-6);
        assert_relative_eq!(min.y, -2.0, epsilon = 1e-6);
        assert_relative_eq!(max.x, 4.0, epsilon = 1e-6);
        assert_relative_eq!(max.y, 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_grow_square_flat() {
        let p = island_square(2.0);

        let grown = offset(std::slice::from_ref(&p), 1.0, tip_decorator_flat).unwrap();
        assert_eq!(grown.len(), 1);
        // 4x4 square with four corner triangles of area 1/2 cut off.
        assert_relative_eq!(grown[0].area(), 14.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shrink_square() {
        let p = island_square(4.0);

        let shrunk = p.offset(-1.0).unwrap();
        assert_eq!(shrunk.len(), 1);
        assert_relative_eq!(shrunk[0].area(), 4.0, epsilon = 1e-6);

        let (min, max) = shrunk[0].bounding_box().unwrap();
        assert_relative_eq!(min.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(min.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(max.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(max.y, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_offset_zero_is_identity() {
        let p = island_square(2.0);
        let out = p.offset(0.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], p);
    }

    #[test]
    fn test_offset_rejects_zero_length_edge() {
        let p = Polygon::from_tuples(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(matches!(
            p.offset(1.0),
            Err(GeometryError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_winding_number() {
        let ring = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 0.0),
        ];
        assert_eq!(winding_number(Vec2::new(1.0, 1.0), &[ring.clone()]), 1);
        assert_eq!(winding_number(Vec2::new(5.0, 1.0), &[ring]), 0);
    }

    #[test]
    fn test_interior_point_is_inside() {
        let p = Polygon::from_tuples(&[
            (0.0, 0.0),
            (0.0, 3.0),
            (1.0, 3.0),
            (1.0, 1.0),
            (3.0, 1.0),
            (3.0, 0.0),
        ]);
        let ip = interior_point(&p.points);
        assert_eq!(p.contains(ip), Containment::Inside);
    }
}
