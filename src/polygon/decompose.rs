//! Decomposition of concave polygons (optionally with holes) into convex
//! parts.
//!
//! Implements the diagonal-insertion heuristic from Jose Fernandez, Boglarka
//! Toth, Lazaro Canovas and Blas Pelegrin, "A practical algorithm for
//! decomposing polygonal domains into convex polygons by diagonals", TOP
//! Vol. 16, No. 2, 367-387, doi 10.1007/s11750-008-0055-2.

use super::core::{Containment, Polygon};
use crate::error::GeometryError;
use crate::intersect::{intersect_segment_segment, point_orientation};
use crate::primitives::Vec2;
use num_traits::Float;
use std::cmp::Ordering;

/// Working state of a decomposition run.
///
/// Points live in an append-only arena; the outline under reduction is a
/// ring of arena indices. Cutting off a convex part removes indices from
/// the ring, absorbing a hole splices new indices in. Point identity is by
/// arena index, so duplicated coordinates (hole slits) stay distinct.
struct Decomposition<F> {
    arena: Vec<Vec2<F>>,
    ring: Vec<usize>,
    holes: Vec<Polygon<F>>,
    out: Vec<Polygon<F>>,
}

impl<F: Float> Decomposition<F> {
    fn new(polygon: &Polygon<F>, holes: &[Polygon<F>]) -> Self {
        let arena = polygon.points.clone();
        let ring = (0..arena.len()).collect();
        Self {
            arena,
            ring,
            holes: holes.to_vec(),
            out: Vec::new(),
        }
    }

    #[inline]
    fn pt(&self, pos: usize) -> Vec2<F> {
        self.arena[self.ring[pos]]
    }

    fn ring_points(&self) -> Vec<Vec2<F>> {
        self.ring.iter().map(|&i| self.arena[i]).collect()
    }

    /// A notch is a reflex vertex of the (clockwise) working ring.
    fn is_notch(&self, pos: usize) -> bool {
        let n = self.ring.len();
        !point_orientation(
            self.pt((pos + n - 1) % n),
            self.pt(pos),
            self.pt((pos + 1) % n),
        )
    }

    /// Validates a candidate part `l` (ring positions) against the rest of
    /// the ring.
    ///
    /// The part must be convex, at least one diagonal endpoint must be a
    /// notch (criterion MP3 of the paper), and no notch of the remaining
    /// ring may lie strictly inside the part.
    fn check_decomp(&self, l: &[usize], p_minus_l: &[usize]) -> bool {
        let l_v: Vec<Vec2<F>> = l.iter().map(|&v| self.pt(v)).collect();

        if !(self.is_notch(l[0]) || self.is_notch(l[l.len() - 1])) {
            return false;
        }
        if !Polygon::is_convex_points(&l_v) {
            return false;
        }

        let x_min = l_v.iter().map(|v| v.x).fold(F::infinity(), F::min);
        let x_max = l_v.iter().map(|v| v.x).fold(F::neg_infinity(), F::max);
        let y_min = l_v.iter().map(|v| v.y).fold(F::infinity(), F::min);
        let y_max = l_v.iter().map(|v| v.y).fold(F::neg_infinity(), F::max);

        for &v in p_minus_l {
            let p = self.pt(v);
            if p.x >= x_min
                && p.x <= x_max
                && p.y >= y_min
                && p.y <= y_max
                && self.is_notch(v)
                && Polygon::contains_points(&l_v, p) == Containment::Inside
            {
                return false;
            }
        }
        true
    }

    /// Splices a hole into the working ring as a slit at ring position
    /// `d_b_pos`, entering the hole at its vertex `d_a`.
    fn absorb_hole(&mut self, d_b_pos: usize, hole_idx: usize, d_a: Vec2<F>) {
        let hole = self.holes.remove(hole_idx).clone_ccw();
        let i = hole
            .points
            .iter()
            .position(|p| p.fuzzy_eq(d_a))
            .unwrap_or(0);
        let m = hole.points.len();

        // d_b, hole[i], hole[i+1], ..., hole[i-1], hole[i]; the original
        // d_b after the splice point closes the slit.
        let mut extension = Vec::with_capacity(m + 2);
        extension.push(self.ring[d_b_pos]);
        for k in 0..=m {
            let p = hole.points[(i + k) % m];
            extension.push(self.arena.len());
            self.arena.push(p);
        }

        self.ring.splice(d_b_pos..d_b_pos, extension);
    }

    /// Checks the diagonal `d_a -> d_b` of a candidate part against the
    /// holes. A hole crossed by the diagonal or contained in the part is
    /// absorbed into the ring and the candidate is rejected so the caller
    /// retries on the extended ring.
    ///
    /// Returns true when the candidate is hole-free and can be emitted.
    fn handle_holes(&mut self, l_v: &[Vec2<F>], d_a: Vec2<F>, d_b_pos: usize) -> bool {
        let d_b = self.pt(d_b_pos);
        let mut d_a = d_a;
        let mut closest: Option<F> = None;
        let mut closest_hole: Option<usize> = None;

        // Walk the diagonal towards the nearest crossed hole edge; each pass
        // snaps the far end onto a hole vertex until no closer crossing
        // remains.
        let mut moved = true;
        while moved {
            moved = false;
            for (hi, hole) in self.holes.iter().enumerate() {
                let hp = &hole.points;
                let m = hp.len();
                for k in 0..m {
                    let a = hp[k];
                    let b = hp[(k + 1) % m];
                    if let Some(x) = intersect_segment_segment(d_a, d_b, a, b) {
                        if x.fuzzy_eq(a) || x.fuzzy_eq(b) {
                            continue;
                        }
                        let dist = (x - d_b).length_squared();
                        if closest.map_or(true, |c| c > dist) {
                            closest = Some(dist);
                            closest_hole = Some(hi);
                            d_a = if (a - d_b).length_squared() <= (b - d_b).length_squared() {
                                a
                            } else {
                                b
                            };
                            moved = true;
                        }
                    }
                }
            }
        }

        // No crossing: the part may still swallow a hole completely.
        if closest_hole.is_none() {
            let mut closest: Option<F> = None;
            for (hi, hole) in self.holes.iter().enumerate() {
                if Polygon::contains_points(l_v, hole.points[0]).is_inside() {
                    if let Some(v) = nearest_vertex(&hole.points, d_b) {
                        let dist = (v - d_b).length_squared();
                        if closest.map_or(true, |c| c > dist) {
                            closest = Some(dist);
                            closest_hole = Some(hi);
                            d_a = v;
                        }
                    }
                }
            }
        }

        match closest_hole {
            Some(hi) => {
                self.absorb_hole(d_b_pos, hi, d_a);
                false
            }
            None => true,
        }
    }

    /// Absorbs the hole closest to ring position 0. Used when the outline
    /// has become convex while holes remain.
    fn absorb_nearest_hole(&mut self) {
        let d_b = self.pt(0);
        let mut closest: Option<F> = None;
        let mut pick: Option<(usize, Vec2<F>)> = None;

        for (hi, hole) in self.holes.iter().enumerate() {
            if let Some(v) = nearest_vertex(&hole.points, d_b) {
                let dist = (v - d_b).length_squared();
                if closest.map_or(true, |c| c > dist) {
                    closest = Some(dist);
                    pick = Some((hi, v));
                }
            }
        }

        if let Some((hi, d_a)) = pick {
            self.absorb_hole(0, hi, d_a);
        }
    }

    /// Tries to cut off one convex part whose chain starts at ring position
    /// `i_start`. Returns true when a part was emitted and removed from the
    /// ring.
    fn try_decompose(&mut self, i_start: usize) -> bool {
        let n = self.ring.len();

        // Extend the chain forward to the next notch.
        let i_extend = match (i_start + 1..n)
            .chain(0..=i_start)
            .find(|&i| self.is_notch(i))
        {
            Some(i) => i,
            None => return false,
        };

        let mut l: Vec<usize> = if i_start < i_extend {
            (i_start..=i_extend).collect()
        } else {
            (i_start..n).chain(0..=i_extend).collect()
        };

        // Shrink from the end until the part is valid.
        let mut p_minus_l: Vec<usize> = (0..n).filter(|k| !l.contains(k)).collect();
        while l.len() > 2 && !self.check_decomp(&l, &p_minus_l) {
            let popped = l.pop().unwrap();
            p_minus_l.insert(0, popped);
        }

        // Extend backward to the previous notch.
        let i_extend2 = std::iter::once(i_start)
            .chain((i_start + 1..n).rev())
            .find(|&i| self.is_notch(i))
            .unwrap_or(i_start);

        let l2: Vec<usize> = if i_extend2 > i_start {
            (i_extend2..n).chain(0..i_start).collect()
        } else {
            (i_extend2..i_start).collect()
        };

        let mut full = l2;
        full.append(&mut l);
        let mut l = full;

        // Shrink from the front until the part is valid again.
        let mut p_minus_l: Vec<usize> = (0..n).filter(|k| !l.contains(k)).collect();
        while l.len() > 2 && !self.check_decomp(&l, &p_minus_l) {
            p_minus_l.push(l.remove(0));
        }

        if l.len() <= 2 {
            return false;
        }

        // The diagonal l[0] -> l[last] now closes a convex part; it may
        // still be blocked by a hole.
        let l_v: Vec<Vec2<F>> = l.iter().map(|&v| self.pt(v)).collect();
        let last_pos = l[l.len() - 1];
        if !self.handle_holes(&l_v, self.pt(l[0]), last_pos) {
            return false;
        }

        self.out.push(Polygon::from_points(l_v));

        let mut interior: Vec<usize> = l[1..l.len() - 1].to_vec();
        interior.sort_unstable_by(|a, b| b.cmp(a));
        for pos in interior {
            self.ring.remove(pos);
        }
        true
    }
}

/// Hole vertex closest to a reference point.
fn nearest_vertex<F: Float>(pts: &[Vec2<F>], to: Vec2<F>) -> Option<Vec2<F>> {
    pts.iter().copied().min_by(|a, b| {
        (*a - to)
            .length_squared()
            .partial_cmp(&(*b - to).length_squared())
            .unwrap_or(Ordering::Equal)
    })
}

/// Decomposes a polygon, minus the given holes, into convex parts.
///
/// Self-intersecting input yields an empty list; convex input without holes
/// is returned as-is. Holes must lie inside the polygon and must not touch
/// each other or the outline; they are connected to the outline by slits,
/// so hole edges appear in the output parts.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] when the polygon has fewer
/// than three points, and [`GeometryError::InvariantViolation`] when the
/// reduction gets stuck or leaves a degenerate remainder, which indicates
/// input outside the supported class.
pub fn convex_decompose<F: Float>(
    polygon: &Polygon<F>,
    holes: &[Polygon<F>],
) -> Result<Vec<Polygon<F>>, GeometryError> {
    if polygon.len() < 3 {
        return Err(GeometryError::InvalidGeometry(
            "convex decomposition needs at least 3 points".into(),
        ));
    }
    if polygon.is_self_intersecting() {
        return Ok(Vec::new());
    }
    if polygon.is_convex() && holes.is_empty() {
        return Ok(vec![polygon.clone()]);
    }

    let cw = polygon.clone_cw();
    let mut d = Decomposition::new(&cw, holes);

    if Polygon::is_convex_points(&d.ring_points()) && !d.holes.is_empty() {
        d.absorb_nearest_hole();
    }

    let mut i = 0;
    let mut failures = 0;
    while d.ring.len() > 3 && !Polygon::is_convex_points(&d.ring_points()) {
        if d.try_decompose(i) {
            failures = 0;
        } else {
            i += 1;
            failures += 1;
            if failures > d.ring.len() + d.holes.len() {
                return Err(GeometryError::InvariantViolation(
                    "convex decomposition made no progress".into(),
                ));
            }
        }

        if Polygon::is_convex_points(&d.ring_points()) && !d.holes.is_empty() {
            d.absorb_nearest_hole();
        }

        i %= d.ring.len();
    }

    if d.ring.len() >= 3 {
        let remainder = d.ring_points();
        d.out.push(Polygon::from_points(remainder));
    } else if !d.ring.is_empty() {
        return Err(GeometryError::InvariantViolation(
            "leftover points after convex decomposition".into(),
        ));
    }

    Ok(d.out)
}

impl<F: Float> Polygon<F> {
    /// Decomposes this polygon into convex parts.
    ///
    /// See [`convex_decompose`] for decomposition with holes.
    pub fn convex_decomposition(&self) -> Result<Vec<Polygon<F>>, GeometryError> {
        convex_decompose(self, &[])
    }
}
