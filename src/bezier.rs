//! Bezier curve evaluation and flattening.
//!
//! Curves run from `p1` to `p2` with shape given by one (quadratic) or two
//! (cubic) control points. Flattening recursively subdivides at the midpoint
//! until the control points are close enough to the chord.

use crate::intersect::distance_point_line;
use crate::primitives::Vec2;
use num_traits::Float;

/// Default flatness bound used by the SVG importer.
pub const DEFAULT_FLATNESS: f64 = 0.1;

/// Evaluates a cubic bezier curve at parameter `t` in [0, 1].
pub fn point_on_cubic_bezier<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    c1: Vec2<F>,
    c2: Vec2<F>,
    t: F,
) -> Vec2<F> {
    let three = F::from(3.0).unwrap();
    let mt = F::one() - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;
    let t2 = t * t;
    let t3 = t2 * t;

    p1 * mt3 + c1 * (three * mt2 * t) + c2 * (three * mt * t2) + p2 * t3
}

/// Subdivides a cubic bezier at `t`.
///
/// Returns `(a, m, p, n, c)` where `p` is the point on the curve; the two
/// halves are `(p1, p, a, m)` and `(p, p2, n, c)`.
pub fn subdivide_cubic_bezier<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    c1: Vec2<F>,
    c2: Vec2<F>,
    t: F,
) -> (Vec2<F>, Vec2<F>, Vec2<F>, Vec2<F>, Vec2<F>) {
    let mt = F::one() - t;

    let a = p1 * mt + c1 * t;
    let b = c1 * mt + c2 * t;
    let c = c2 * mt + p2 * t;

    let m = a * mt + b * t;
    let n = b * mt + c * t;

    let p = m * mt + n * t;

    (a, m, p, n, c)
}

/// Flattens a cubic bezier into intermediate points (start and end points
/// are not included).
///
/// Subdivision stops when the flatness drops to `max_flatness` or when
/// `max_divisions` (if given) is exhausted.
pub fn flatten_cubic_bezier<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    c1: Vec2<F>,
    c2: Vec2<F>,
    max_divisions: Option<u32>,
    max_flatness: F,
) -> Vec<Vec2<F>> {
    let mut out = Vec::new();

    if !is_flat(max_divisions, max_flatness, flatness(p1, p2, &[c1, c2])) {
        let half = F::from(0.5).unwrap();
        let (a, m, p, n, c) = subdivide_cubic_bezier(p1, p2, c1, c2, half);
        let md = max_divisions.map(|d| d.saturating_sub(1));

        out.extend(flatten_cubic_bezier(p1, p, a, m, md, max_flatness));
        out.push(p);
        out.extend(flatten_cubic_bezier(p, p2, n, c, md, max_flatness));
    }
    out
}

/// Evaluates a quadratic bezier curve at parameter `t` in [0, 1].
pub fn point_on_quadratic_bezier<F: Float>(p1: Vec2<F>, p2: Vec2<F>, c: Vec2<F>, t: F) -> Vec2<F> {
    let two = F::from(2.0).unwrap();
    let mt = F::one() - t;

    p1 * (mt * mt) + c * (two * mt * t) + p2 * (t * t)
}

/// Subdivides a quadratic bezier at `t`.
///
/// Returns `(a, p, b)` where `p` is the point on the curve; the two halves
/// are `(p1, p, a)` and `(p, p2, b)`.
pub fn subdivide_quadratic_bezier<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    c: Vec2<F>,
    t: F,
) -> (Vec2<F>, Vec2<F>, Vec2<F>) {
    let mt = F::one() - t;

    let a = p1 * mt + c * t;
    let b = c * mt + p2 * t;
    let p = a * mt + b * t;

    (a, p, b)
}

/// Flattens a quadratic bezier into intermediate points (start and end
/// points are not included).
pub fn flatten_quadratic_bezier<F: Float>(
    p1: Vec2<F>,
    p2: Vec2<F>,
    c: Vec2<F>,
    max_divisions: Option<u32>,
    max_flatness: F,
) -> Vec<Vec2<F>> {
    let mut out = Vec::new();

    if !is_flat(max_divisions, max_flatness, flatness(p1, p2, &[c])) {
        let half = F::from(0.5).unwrap();
        let (a, p, b) = subdivide_quadratic_bezier(p1, p2, c, half);
        let md = max_divisions.map(|d| d.saturating_sub(1));

        out.extend(flatten_quadratic_bezier(p1, p, a, md, max_flatness));
        out.push(p);
        out.extend(flatten_quadratic_bezier(p, p2, b, md, max_flatness));
    }
    out
}

fn is_flat<F: Float>(max_divisions: Option<u32>, max_flatness: F, flatness: F) -> bool {
    max_divisions == Some(0) || flatness <= max_flatness
}

/// Flatness of a curve: maximal distance of any control point from the
/// chord line.
fn flatness<F: Float>(p1: Vec2<F>, p2: Vec2<F>, controls: &[Vec2<F>]) -> F {
    controls
        .iter()
        .map(|&c| distance_point_line(c, p1, p2))
        .fold(F::zero(), F::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_endpoints() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(3.0, 0.0);
        let c1 = Vec2::new(1.0, 2.0);
        let c2 = Vec2::new(2.0, 2.0);

        assert_eq!(point_on_cubic_bezier(p1, p2, c1, c2, 0.0), p1);
        assert_eq!(point_on_cubic_bezier(p1, p2, c1, c2, 1.0), p2);
    }

    #[test]
    fn test_cubic_subdivision_matches_evaluation() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(3.0, 0.0);
        let c1 = Vec2::new(1.0, 2.0);
        let c2 = Vec2::new(2.0, 2.0);

        let (_, _, p, _, _) = subdivide_cubic_bezier(p1, p2, c1, c2, 0.5);
        let q = point_on_cubic_bezier(p1, p2, c1, c2, 0.5);
        assert_relative_eq!(p.x, q.x, epsilon = 1e-12);
        assert_relative_eq!(p.y, q.y, epsilon = 1e-12);
    }

    #[test]
    fn test_cubic_flattening_stays_on_curve() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(3.0, 0.0);
        let c1 = Vec2::new(1.0, 2.0);
        let c2 = Vec2::new(2.0, 2.0);

        let pts = flatten_cubic_bezier(p1, p2, c1, c2, None, 0.01);
        assert!(!pts.is_empty());

        // Subdivision midpoints are exact curve points, so each flattened
        // point must be hit by some parameter.
        for p in pts {
            let mut found = false;
            for k in 1..256 {
                let t = k as f64 / 256.0;
                if (point_on_cubic_bezier(p1, p2, c1, c2, t) - p).length() < 1e-9 {
                    found = true;
                    break;
                }
            }
            assert!(found, "point {:?} not on curve", p);
        }
    }

    #[test]
    fn test_flat_curve_needs_no_subdivision() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(3.0, 0.0);
        let on_chord = Vec2::new(1.5, 0.0);

        assert!(flatten_cubic_bezier(p1, p2, on_chord, on_chord, None, 0.1).is_empty());
        assert!(flatten_quadratic_bezier(p1, p2, on_chord, None, 0.1).is_empty());
    }

    #[test]
    fn test_max_divisions_limits_recursion() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(3.0, 0.0);
        let c1 = Vec2::new(0.0, 100.0);
        let c2 = Vec2::new(3.0, 100.0);

        let pts = flatten_cubic_bezier(p1, p2, c1, c2, Some(2), 1e-9);
        // Two levels of subdivision yield at most 3 intermediate points.
        assert!(pts.len() <= 3);
        assert!(!pts.is_empty());
    }

    #[test]
    fn test_quadratic_midpoint() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(2.0, 0.0);
        let c = Vec2::new(1.0, 2.0);

        let m = point_on_quadratic_bezier(p1, p2, c, 0.5);
        assert_relative_eq!(m.x, 1.0);
        assert_relative_eq!(m.y, 1.0);

        let (_, p, _) = subdivide_quadratic_bezier(p1, p2, c, 0.5);
        assert_relative_eq!(p.x, m.x);
        assert_relative_eq!(p.y, m.y);
    }
}
