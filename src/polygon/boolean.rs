//! Boolean operations (union, intersection, difference) on simple polygons.
//!
//! Implements the algorithm from Avraham Margalit, "An Algorithm for
//! Computing the Union, Intersection or Difference of Two Polygons",
//! Computers & Graphics Vol. 13, No. 2, pp. 167-183, 1989. Only island-type
//! polygons are considered, so the paper's control tables reduce to small
//! boolean expressions.

use super::core::{Containment, Polygon};
use crate::error::GeometryError;
use crate::intersect::intersect_segment_segment;
use crate::primitives::Vec2;
use num_traits::Float;
use std::cmp::Ordering;
use std::collections::HashMap;

/// The boolean operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Area covered by either polygon.
    Union,
    /// Area covered by both polygons.
    Intersection,
    /// Area covered by the first polygon but not the second.
    Difference,
}

/// Grid key for welding-consistent point identity in the fragment graph.
type PointKey = (i64, i64);

/// Directed edge-fragment graph keyed by quantized start point.
///
/// Each entry keeps a representative coordinate for the key plus the list of
/// successor points. Insertion order of keys is recorded so that stitching
/// picks start points deterministically.
struct FragmentGraph<F> {
    map: HashMap<PointKey, (Vec2<F>, Vec<Vec2<F>>)>,
    order: Vec<PointKey>,
}

impl<F: Float> FragmentGraph<F> {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Adds the edge `from -> to`. A fragment both rings contribute (shared
    /// collinear edge runs) is recorded only once, so every fragment is
    /// consumed by exactly one cycle.
    fn add(&mut self, from: Vec2<F>, to: Vec2<F>) {
        let key = from.quantized();
        let to_key = to.quantized();
        match self.map.get_mut(&key) {
            Some((_, succ)) => {
                if !succ.iter().any(|p| p.quantized() == to_key) {
                    succ.push(to);
                }
            }
            None => {
                self.map.insert(key, (from, vec![to]));
                self.order.push(key);
            }
        }
    }

    /// Removes the edge `from -> to`, dropping the key once its successor
    /// list is empty.
    fn remove(&mut self, from: Vec2<F>, to: Vec2<F>) -> Result<(), GeometryError> {
        let key = from.quantized();
        let (_, succ) = self.map.get_mut(&key).ok_or_else(|| {
            GeometryError::InvariantViolation("fragment edge removed twice".into())
        })?;

        let to_key = to.quantized();
        let i = succ
            .iter()
            .position(|p| p.quantized() == to_key)
            .ok_or_else(|| {
                GeometryError::InvariantViolation("fragment edge not in graph".into())
            })?;
        succ.remove(i);

        if succ.is_empty() {
            self.map.remove(&key);
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// First key, in insertion order, that still has outgoing edges.
    fn first_live(&self) -> Option<Vec2<F>> {
        self.order
            .iter()
            .find_map(|k| self.map.get(k).map(|(p, _)| *p))
    }

    fn successor(&self, of: Vec2<F>) -> Option<Vec2<F>> {
        self.map.get(&of.quantized()).map(|(_, succ)| succ[0])
    }
}

/// A ring vertex together with its classification against the other polygon.
type ClassedRing<F> = Vec<(Vec2<F>, Containment)>;

/// Builds the extended vector ring for one polygon: original vertices
/// classified against the other polygon, with intersection points spliced
/// into their edges in traversal order as boundary vertices.
///
/// Intersection points within the welding tolerance of a host edge endpoint
/// (corner-on-edge contact) are not spliced, and near-duplicates within one
/// edge are collapsed, so the ring never carries zero-length fragments.
fn build_ring<F: Float>(
    pts: &[Vec2<F>],
    other: &Polygon<F>,
    edge_intersections: &[Vec<Vec2<F>>],
) -> ClassedRing<F> {
    let n = pts.len();
    let mut ring = Vec::with_capacity(n + edge_intersections.iter().map(Vec::len).sum::<usize>());

    for i in 0..n {
        ring.push((pts[i], other.contains(pts[i])));

        let start = pts[i];
        let end = pts[(i + 1) % n];
        let dir = end - start;

        let mut splice = edge_intersections[i].clone();
        splice.retain(|&p| !p.fuzzy_eq(start) && !p.fuzzy_eq(end));
        crate::polygon::dedup_fuzzy(&mut splice);
        splice.sort_by(|a, b| {
            let ta = (*a - start).dot(dir);
            let tb = (*b - start).dot(dir);
            ta.partial_cmp(&tb).unwrap_or(Ordering::Equal)
        });

        for p in splice {
            ring.push((p, Containment::Boundary));
        }
    }
    ring
}

/// Adds every ring edge that belongs to the output to the fragment graph.
///
/// An edge qualifies if one endpoint has the required classification, or if
/// both endpoints are boundary vertices and the edge midpoint tests as
/// required (or boundary) against the other polygon.
fn extend_fragments<F: Float>(
    ring: &ClassedRing<F>,
    other: &Polygon<F>,
    required: Containment,
    graph: &mut FragmentGraph<F>,
) {
    let n = ring.len();
    for i in 0..n {
        let (v1, c1) = ring[i];
        let (v2, c2) = ring[(i + 1) % n];

        if c1 == required || c2 == required {
            graph.add(v1, v2);
        } else if c1 == Containment::Boundary && c2 == Containment::Boundary {
            let mid = (v1 + v2) / F::from(2.0).unwrap();
            let t = other.contains(mid);
            if t == required || t == Containment::Boundary {
                graph.add(v1, v2);
            }
        }
    }
}

/// Performs a boolean operation on two simple polygons.
///
/// Returns the resulting fragment polygons. A difference that punches a hole
/// yields two rings with opposite orientation: the outline and the hole.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] when either input has fewer
/// than three points, and [`GeometryError::InvariantViolation`] when the
/// fragment graph cannot be stitched into closed rings (input outside the
/// supported island-polygon class).
///
/// # Example
///
/// ```
/// use polynav::{BooleanOp, Polygon};
///
/// let a: Polygon<f64> = Polygon::from_tuples(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
/// let b = Polygon::from_tuples(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]);
///
/// let overlap = polynav::boolean_operation(&a, &b, BooleanOp::Intersection).unwrap();
/// assert_eq!(overlap.len(), 1);
/// assert!((overlap[0].area() - 1.0).abs() < 1e-9);
/// ```
pub fn boolean_operation<F: Float>(
    polygon_a: &Polygon<F>,
    polygon_b: &Polygon<F>,
    op: BooleanOp,
) -> Result<Vec<Polygon<F>>, GeometryError> {
    if polygon_a.len() < 3 || polygon_b.len() < 3 {
        return Err(GeometryError::InvalidGeometry(
            "boolean operands need at least 3 points".into(),
        ));
    }

    // Union and intersection want matching orientation on both operands,
    // difference wants opposite orientation.
    let matching = polygon_a.is_clockwise() == polygon_b.is_clockwise();
    let b_fixed;
    let polygon_b = if matching != (op != BooleanOp::Difference) {
        b_fixed = polygon_b.flipped();
        &b_fixed
    } else {
        polygon_b
    };

    let pa = &polygon_a.points;
    let pb = &polygon_b.points;
    let na = pa.len();
    let nb = pb.len();

    // All pairwise edge intersections, bucketed per edge of each operand.
    let mut ints_a: Vec<Vec<Vec2<F>>> = vec![Vec::new(); na];
    let mut ints_b: Vec<Vec<Vec2<F>>> = vec![Vec::new(); nb];
    for i in 0..na {
        for j in 0..nb {
            if let Some(p) = intersect_segment_segment(
                pa[i],
                pa[(i + 1) % na],
                pb[j],
                pb[(j + 1) % nb],
            ) {
                ints_a[i].push(p);
                ints_b[j].push(p);
            }
        }
    }

    let ring_a = build_ring(pa, polygon_b, &ints_a);
    let ring_b = build_ring(pb, polygon_a, &ints_b);

    let required_a = if op == BooleanOp::Intersection {
        Containment::Inside
    } else {
        Containment::Outside
    };
    let required_b = if op == BooleanOp::Union {
        Containment::Outside
    } else {
        Containment::Inside
    };

    let mut graph = FragmentGraph::new();
    extend_fragments(&ring_a, polygon_b, required_a, &mut graph);
    extend_fragments(&ring_b, polygon_a, required_b, &mut graph);

    // Stitch fragments into closed rings.
    let mut output = Vec::new();
    while !graph.is_empty() {
        let start = match graph.first_live() {
            Some(p) => p,
            None => break,
        };

        let mut sequence = vec![start];
        let mut seen: HashMap<PointKey, usize> = HashMap::new();
        seen.insert(start.quantized(), 0);

        let mut current = graph.successor(start).ok_or_else(|| {
            GeometryError::InvariantViolation("fragment start has no successor".into())
        })?;

        while !seen.contains_key(&current.quantized()) {
            seen.insert(current.quantized(), sequence.len());
            sequence.push(current);
            current = graph.successor(current).ok_or_else(|| {
                GeometryError::InvariantViolation("open fragment chain in boolean result".into())
            })?;
        }

        // Keep only the cyclic part and consume its edges.
        let cycle_start = seen[&current.quantized()];
        let cycle = sequence.split_off(cycle_start);
        let m = cycle.len();
        for i in 0..m {
            graph.remove(cycle[i], cycle[(i + 1) % m])?;
        }

        let simplified = Polygon::simplify_sequence(cycle);
        if simplified.len() >= 3 {
            output.push(Polygon::from_points(simplified));
        }
    }

    Ok(output)
}

impl<F: Float> Polygon<F> {
    /// Computes the union of this polygon with another.
    pub fn union(&self, other: &Polygon<F>) -> Result<Vec<Polygon<F>>, GeometryError> {
        boolean_operation(self, other, BooleanOp::Union)
    }

    /// Computes the intersection of this polygon with another.
    pub fn intersect(&self, other: &Polygon<F>) -> Result<Vec<Polygon<F>>, GeometryError> {
        boolean_operation(self, other, BooleanOp::Intersection)
    }

    /// Subtracts the area of another polygon from this one.
    pub fn subtract(&self, other: &Polygon<F>) -> Result<Vec<Polygon<F>>, GeometryError> {
        boolean_operation(self, other, BooleanOp::Difference)
    }
}
