//! Polygonal field-of-view (FOV) calculation.
//!
//! A [`Vision`] object holds a set of obstructor polylines and computes the
//! polygon visible from an eye point, clipped to a boundary polygon and a
//! vision radius. The result is cached and only recomputed when the eye
//! moves far enough.

use crate::error::GeometryError;
use crate::intersect::{
    check_intersect_segment_segment, distance_point_segment_squared, intersect_polygon_ray,
    intersect_segments_ray, intersect_segments_segments, polygon_edges,
};
use crate::polygon::Polygon;
use crate::primitives::{epsilon, Segment2, Vec2};
use num_traits::Float;
use std::cmp::Ordering;

/// Last computed vision polygon together with the inputs it was computed
/// for.
struct CachedVision<F> {
    position: Vec2<F>,
    radius: F,
    polygon: Polygon<F>,
}

/// Computes polygonal fields of vision against a set of obstructors.
///
/// Obstructors are open polylines given as point lists. The vision polygon
/// is cached; [`Vision::get_vision`] only recomputes when the eye has moved
/// by more than one unit since the cached computation.
pub struct Vision<F> {
    obs_points: Vec<Vec2<F>>,
    obs_segs: Vec<Segment2<F>>,
    cached: Option<CachedVision<F>>,
}

impl<F: Float> Vision<F> {
    /// Creates a new vision object for a set of obstructor polylines.
    pub fn new(obstructors: &[Vec<Vec2<F>>]) -> Self {
        let mut v = Self {
            obs_points: Vec::new(),
            obs_segs: Vec::new(),
            cached: None,
        };
        v.set_obstructors(obstructors);
        v
    }

    /// Replaces the obstructor data, invalidating the cached vision polygon.
    pub fn set_obstructors(&mut self, obstructors: &[Vec<Vec2<F>>]) {
        self.obs_points = obstructors.iter().flatten().copied().collect();
        self.obs_segs = obstructors
            .iter()
            .flat_map(|strip| strip.windows(2).map(|w| Segment2::new(w[0], w[1])))
            .collect();
        self.cached = None;
    }

    /// Returns the cached vision radius, if any polygon has been computed.
    pub fn cached_radius(&self) -> Option<F> {
        self.cached.as_ref().map(|c| c.radius)
    }

    /// Returns the vision polygon for an eye position and boundary polygon.
    ///
    /// `boundary` describes the maximal field of vision (normally a regular
    /// polygon around `eye` with the vision radius). The cached polygon is
    /// reused until the eye moves more than one unit away from the cached
    /// position.
    pub fn get_vision(
        &mut self,
        eye: Vec2<F>,
        radius: F,
        boundary: &Polygon<F>,
    ) -> Result<Polygon<F>, GeometryError> {
        if let Some(c) = &self.cached {
            if (c.position - eye).length_squared() <= F::one() {
                return Ok(c.polygon.clone());
            }
        }
        self.calculate(eye, radius, boundary)
    }

    /// Recomputes the vision polygon unconditionally.
    ///
    /// Use [`Vision::get_vision`] for normal queries; this bypasses the
    /// cache.
    pub fn calculate(
        &mut self,
        eye: Vec2<F>,
        radius: F,
        boundary: &Polygon<F>,
    ) -> Result<Polygon<F>, GeometryError> {
        if boundary.len() < 3 {
            return Err(GeometryError::InvalidGeometry(
                "vision boundary needs at least 3 points".into(),
            ));
        }

        let eps = epsilon::<F>();
        let radius_squared = radius * radius;

        // Only obstructor segments within the vision radius matter.
        let obs_segs: Vec<Segment2<F>> = self
            .obs_segs
            .iter()
            .copied()
            .filter(|s| distance_point_segment_squared(eye, s.start, s.end) <= radius_squared)
            .collect();

        let sub_segment = |small: (Vec2<F>, Vec2<F>), big: Segment2<F>| {
            distance_point_segment_squared(small.0, big.start, big.end) < eps
                && distance_point_segment_squared(small.1, big.start, big.end) < eps
        };

        // Tests against the full obstructor set, not the radius-filtered
        // one, so silhouette walks near the radius edge stay consistent.
        let segment_in_obs =
            |seg: (Vec2<F>, Vec2<F>)| self.obs_segs.iter().any(|&ls| sub_segment(seg, ls));

        let check_visibility = |p: Vec2<F>| {
            let on_boundary = boundary.points.iter().any(|&b| b.fuzzy_eq(p));
            if !on_boundary {
                if (eye - p).length_squared() > radius_squared {
                    return false;
                }
                if !boundary.contains(p).is_inside() {
                    return false;
                }
            }

            for seg in &obs_segs {
                if check_intersect_segment_segment(eye, p, seg.start, seg.end)
                    && !seg.start.fuzzy_eq(p)
                    && !seg.end.fuzzy_eq(p)
                {
                    return false;
                }
            }
            true
        };

        // Candidate silhouette points: obstructor endpoints and boundary
        // vertices that are directly visible from the eye.
        let mut candidates = self.obs_points.clone();
        candidates.extend(boundary.points.iter().copied());
        crate::polygon::dedup_fuzzy(&mut candidates);

        let mut visible_points: Vec<Vec2<F>> =
            candidates.into_iter().filter(|&p| check_visibility(p)).collect();

        // Points where obstructors cross the boundary polygon.
        let boundary_edges = polygon_edges(&boundary.points);
        let mut boundary_hits = intersect_segments_segments(&obs_segs, &boundary_edges);

        // Keep only boundary hits that are not occluded by some other
        // obstructor segment. A hit lying on a segment does not count as
        // occluded by that segment.
        for seg in &obs_segs {
            let mut i = 0;
            while i < boundary_hits.len() {
                let p = boundary_hits[i];
                if distance_point_segment_squared(p, seg.start, seg.end) > eps
                    && check_intersect_segment_segment(eye, p, seg.start, seg.end)
                {
                    boundary_hits.remove(i);
                } else {
                    i += 1;
                }
            }
        }

        visible_points.append(&mut boundary_hits);

        let mut poly = Polygon::from_points(visible_points);
        poly.sort_around(eye);

        // Silhouette walk: for every visible point, cast a ray through it
        // and insert the closest hit on an obstructor or the boundary,
        // before or after the point depending on which adjacent edge runs
        // along an obstructor.
        let mut i = 0;
        while i < poly.points.len() {
            let len = poly.points.len();
            let p = poly.points[(i + len - 1) % len];
            let c = poly.points[i];
            let n = poly.points[(i + 1) % len];

            let mut hits = intersect_segments_ray(&obs_segs, eye, c);
            hits.extend(intersect_polygon_ray(&boundary.points, eye, c));
            crate::polygon::dedup_fuzzy(&mut hits);
            hits.retain(|&ip| !ip.fuzzy_eq(c) && boundary.contains(ip).is_inside());

            if let Some(hit) = hits.into_iter().min_by(|a, b| {
                (*a - eye)
                    .length_squared()
                    .partial_cmp(&(*b - eye).length_squared())
                    .unwrap_or(Ordering::Equal)
            }) {
                let sio_pc = segment_in_obs((p, c));
                let sio_cn = segment_in_obs((c, n));

                if !sio_pc {
                    poly.points.insert(i, hit);
                    i += 1;

                    // A point may have been wrongly inserted one step back
                    // because this hit was still missing. Remove it again.
                    let len = poly.points.len();
                    let back3 = poly.points[(i + len - 3) % len];
                    let back1 = poly.points[(i + len - 1) % len];
                    if segment_in_obs((back3, back1)) {
                        poly.points.remove((i + len - 2) % len);
                        i -= 1;
                    }
                } else if !sio_cn {
                    poly.points.insert(i + 1, hit);
                    i += 1;
                }
            }

            i += 1;
        }

        // The point at index 0 may have been inserted before the walk
        // reached the wrap-around edge; swap it into place.
        if poly.points.len() > 2 {
            let last = poly.points[poly.points.len() - 1];
            let second = poly.points[1];
            if segment_in_obs((last, second)) {
                poly.points.swap(0, 1);
            }
        }

        self.cached = Some(CachedVision {
            position: eye,
            radius,
            polygon: poly.clone(),
        });

        Ok(poly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Containment;
    use approx::assert_relative_eq;

    fn boundary_around(eye: Vec2<f64>, radius: f64) -> Polygon<f64> {
        Polygon::regular(eye, radius, 8)
    }

    #[test]
    fn test_open_field_vision_covers_boundary() {
        let mut vision: Vision<f64> = Vision::new(&[]);
        let eye = Vec2::zero();
        let boundary = boundary_around(eye, 10.0);

        let poly = vision.get_vision(eye, 10.0, &boundary).unwrap();
        assert_relative_eq!(poly.area(), boundary.area(), epsilon = 1e-6);
    }

    #[test]
    fn test_wall_blocks_vision() {
        let wall = vec![Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0)];
        let mut vision = Vision::new(&[wall]);

        let eye = Vec2::zero();
        let boundary = boundary_around(eye, 10.0);
        let poly = vision.get_vision(eye, 10.0, &boundary).unwrap();

        // In front of the wall: visible. Straight behind it: shadowed.
        assert_eq!(poly.contains(Vec2::new(1.0, 0.0)), Containment::Inside);
        assert_eq!(poly.contains(Vec2::new(4.0, 0.0)), Containment::Outside);
        assert!(poly.area() < boundary.area());
    }

    #[test]
    fn test_wall_endpoints_are_silhouette_points() {
        let wall = vec![Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0)];
        let mut vision = Vision::new(&[wall.clone()]);

        let eye = Vec2::zero();
        let boundary = boundary_around(eye, 10.0);
        let poly = vision.get_vision(eye, 10.0, &boundary).unwrap();

        for w in &wall {
            assert!(
                poly.points.iter().any(|p| p.fuzzy_eq(*w)),
                "wall endpoint {:?} missing from vision polygon",
                w
            );
        }
    }

    #[test]
    fn test_vision_is_cached_for_small_eye_movement() {
        let wall = vec![Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0)];
        let mut vision = Vision::new(&[wall]);

        let eye = Vec2::zero();
        let first = vision
            .get_vision(eye, 10.0, &boundary_around(eye, 10.0))
            .unwrap();

        // Within one unit of the cached position: no recomputation, even
        // though the boundary moved.
        let nearby = Vec2::new(0.5, 0.0);
        let cached = vision
            .get_vision(nearby, 10.0, &boundary_around(nearby, 10.0))
            .unwrap();
        assert_eq!(first, cached);

        // Far away: recomputed.
        let far = Vec2::new(5.0, 0.0);
        let fresh = vision
            .get_vision(far, 10.0, &boundary_around(far, 10.0))
            .unwrap();
        assert_ne!(first, fresh);
    }

    #[test]
    fn test_set_obstructors_invalidates_cache() {
        let mut vision: Vision<f64> = Vision::new(&[]);
        let eye = Vec2::zero();
        let boundary = boundary_around(eye, 10.0);

        let open = vision.get_vision(eye, 10.0, &boundary).unwrap();

        vision.set_obstructors(&[vec![Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0)]]);
        let blocked = vision.get_vision(eye, 10.0, &boundary).unwrap();

        assert!(blocked.area() < open.area());
    }

    #[test]
    fn test_degenerate_boundary_is_rejected() {
        let mut vision: Vision<f64> = Vision::new(&[]);
        let boundary = Polygon::from_tuples(&[(0.0, 0.0), (1.0, 0.0)]);

        assert!(matches!(
            vision.get_vision(Vec2::zero(), 10.0, &boundary),
            Err(GeometryError::InvalidGeometry(_))
        ));
    }
}
