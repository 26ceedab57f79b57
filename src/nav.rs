//! Navigation mesh generation and path planning.
//!
//! A [`NavMesh`] is built by carving wall polygons out of a navigable
//! boundary, decomposing the rest into convex cells and linking cells that
//! share an edge. All-pair shortest cell sequences are precomputed with
//! Floyd-Warshall; [`NavPath::get_next_move_to`] then steers an agent along
//! a cell sequence with the Simple Stupid Funnel algorithm.

use crate::error::GeometryError;
use crate::intersect::point_orientation;
use crate::polygon::{convex_decompose, Polygon};
use crate::primitives::{Segment2, Vec2};
use num_traits::Float;
use std::collections::HashMap;

/// Cell distance used by [`NavMesh::generate`]: euclidean distance between
/// the vertex means of the two cells.
pub fn poly_midpoint_distance<F: Float>(a: &Polygon<F>, b: &Polygon<F>) -> F {
    match (a.center(), b.center()) {
        (Some(ca), Some(cb)) => (ca - cb).length(),
        _ => F::infinity(),
    }
}

/// A convex cell of a navigation mesh.
///
/// Neighbors are keyed by cell index and store the distance to the neighbor
/// plus the shared portal edge.
#[derive(Debug, Clone)]
pub struct NavPolygon<F> {
    /// The convex cell geometry.
    pub polygon: Polygon<F>,
    neighbors: HashMap<usize, (F, Segment2<F>)>,
}

impl<F: Float> NavPolygon<F> {
    fn new(polygon: Polygon<F>) -> Self {
        Self {
            polygon,
            neighbors: HashMap::new(),
        }
    }

    /// The portal edge shared with a neighboring cell, if any.
    pub fn portal_to(&self, neighbor: usize) -> Option<Segment2<F>> {
        self.neighbors.get(&neighbor).map(|&(_, e)| e)
    }

    /// Indices of the neighboring cells.
    pub fn neighbor_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.neighbors.keys().copied()
    }
}

/// Identifies a mesh location in a path query: either a point to locate or
/// a known cell index.
#[derive(Debug, Clone, Copy)]
pub enum NavQuery<F> {
    /// Locate the cell containing this point.
    Point(Vec2<F>),
    /// Use the cell with this index.
    Cell(usize),
}

impl<F> From<Vec2<F>> for NavQuery<F> {
    fn from(p: Vec2<F>) -> Self {
        NavQuery::Point(p)
    }
}

impl<F> From<usize> for NavQuery<F> {
    fn from(i: usize) -> Self {
        NavQuery::Cell(i)
    }
}

/// Shortest-path table entry: distance and the next hop to route through,
/// `None` when unreachable.
type NavData<F> = (F, Option<usize>);

/// A navigation mesh of convex cells with precomputed all-pair routing.
pub struct NavMesh<F> {
    polygons: Vec<NavPolygon<F>>,
    nav_data: Vec<Vec<NavData<F>>>,
}

impl<F: Float> NavMesh<F> {
    /// Generates a navigation mesh from a boundary polygon and wall
    /// polygons, using [`poly_midpoint_distance`] as the cell metric.
    pub fn generate(boundary: &Polygon<F>, walls: &[Polygon<F>]) -> Result<Self, GeometryError> {
        Self::generate_with(boundary, walls, poly_midpoint_distance)
    }

    /// Generates a navigation mesh with a custom cell distance function.
    ///
    /// Wall areas are removed from the boundary, the remaining area is
    /// decomposed into convex cells, and cells sharing an edge become
    /// neighbors with that edge as their portal.
    pub fn generate_with(
        boundary: &Polygon<F>,
        walls: &[Polygon<F>],
        distance_function: impl Fn(&Polygon<F>, &Polygon<F>) -> F,
    ) -> Result<Self, GeometryError> {
        let cells = convex_decompose(boundary, walls)?;
        let mut polygons: Vec<NavPolygon<F>> = cells.into_iter().map(NavPolygon::new).collect();

        // Bucket cells by undirected, quantized edge.
        type EdgeKey = ((i64, i64), (i64, i64));
        let mut shared: HashMap<EdgeKey, (Segment2<F>, Vec<usize>)> = HashMap::new();
        for (idx, np) in polygons.iter().enumerate() {
            for edge in np.polygon.edges() {
                let e = edge.undirected();
                let key = (e.start.quantized(), e.end.quantized());
                shared.entry(key).or_insert_with(|| (e, Vec::new())).1.push(idx);
            }
        }

        for (edge, owners) in shared.into_values() {
            for i in 0..owners.len() {
                for j in (i + 1)..owners.len() {
                    let (a, b) = (owners[i], owners[j]);
                    let dist = distance_function(&polygons[a].polygon, &polygons[b].polygon);
                    polygons[a].neighbors.insert(b, (dist, edge));
                    polygons[b].neighbors.insert(a, (dist, edge));
                }
            }
        }

        let mut mesh = Self {
            polygons,
            nav_data: Vec::new(),
        };
        mesh.update_nav();
        Ok(mesh)
    }

    /// Recomputes the all-pair routing table.
    ///
    /// Called automatically by the generators; call it again after mutating
    /// the mesh topology.
    pub fn update_nav(&mut self) {
        let n = self.polygons.len();

        self.nav_data = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| match self.polygons[i].neighbors.get(&j) {
                        Some(&(dist, _)) => (dist, Some(j)),
                        None => (F::infinity(), None),
                    })
                    .collect()
            })
            .collect();

        // Floyd-Warshall; the hop entry records the intermediate cell that
        // improved the route.
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if k == i || k == j || i == j {
                        continue;
                    }
                    let dist = self.nav_data[i][j].0;
                    let dist2 = self.nav_data[i][k].0 + self.nav_data[k][j].0;
                    if dist2 < dist {
                        self.nav_data[i][j] = (dist2, Some(k));
                    }
                }
            }
        }
    }

    /// Finds the index of the first cell containing `p`.
    pub fn find_polygon(&self, p: Vec2<F>) -> Option<usize> {
        self.polygons
            .iter()
            .position(|np| np.polygon.contains(p).is_inside())
    }

    /// Resolves a high-level cell path from `start` to `stop`.
    ///
    /// Both endpoints accept either a point ([`Vec2`]) or a cell index.
    /// Returns `None` when an endpoint cannot be located in the mesh or the
    /// target is unreachable.
    pub fn get_path(
        &self,
        start: impl Into<NavQuery<F>>,
        stop: impl Into<NavQuery<F>>,
    ) -> Option<NavPath<'_, F>> {
        let i = self.resolve(start.into())?;
        let j = self.resolve(stop.into())?;

        let mut cells = vec![i];
        if !self.path_rec(i, j, &mut cells) {
            return None;
        }

        Some(NavPath { mesh: self, cells })
    }

    fn resolve(&self, q: NavQuery<F>) -> Option<usize> {
        match q {
            NavQuery::Point(p) => self.find_polygon(p),
            NavQuery::Cell(i) if i < self.polygons.len() => Some(i),
            NavQuery::Cell(_) => None,
        }
    }

    /// Expands the routing table entry `(i, j)` into the cell sequence
    /// between them (exclusive of `i`, inclusive of `j`).
    fn path_rec(&self, i: usize, j: usize, out: &mut Vec<usize>) -> bool {
        if i == j {
            return true;
        }

        match self.nav_data[i][j].1 {
            None => false,
            Some(d) if d == j => {
                out.push(j);
                true
            }
            Some(d) => self.path_rec(i, d, out) && self.path_rec(d, j, out),
        }
    }

    /// The cells of the mesh.
    pub fn polygons(&self) -> &[NavPolygon<F>] {
        &self.polygons
    }

    /// Routed distance between two cells, infinite when unreachable.
    pub fn distance(&self, i: usize, j: usize) -> F {
        if i == j {
            F::zero()
        } else {
            self.nav_data[i][j].0
        }
    }
}

/// A solved navigation path: an optimal sequence of mesh cells.
pub struct NavPath<'a, F> {
    mesh: &'a NavMesh<F>,
    cells: Vec<usize>,
}

impl<'a, F: Float> NavPath<'a, F> {
    /// The cell indices of the path, start cell first.
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// The cell geometry along the path.
    pub fn polygons(&self) -> impl Iterator<Item = &NavPolygon<F>> + '_ {
        self.cells.iter().map(|&i| &self.mesh.polygons[i])
    }

    /// Returns the next point an agent at `position` should move towards to
    /// follow this path to `final_target`.
    ///
    /// Uses the Simple Stupid Funnel algorithm
    /// (<http://digestingduck.blogspot.com/2010/03/simple-stupid-funnel-algorithm.html>):
    /// the funnel through the remaining portal edges is narrowed until it
    /// closes, and the closing portal corner is the steering target.
    ///
    /// Returns `None` when `position` is not inside any path cell.
    pub fn get_next_move_to(&self, position: Vec2<F>, final_target: Vec2<F>) -> Option<Vec2<F>> {
        // The furthest path cell containing the agent.
        let i = (0..self.cells.len())
            .rev()
            .find(|&i| self.mesh.polygons[self.cells[i]].polygon.contains(position).is_inside())?;

        if i == self.cells.len() - 1 {
            return Some(final_target);
        }

        let orient = |a, b, c| point_orientation(a, b, c);

        let portal = |at: usize| -> Option<Segment2<F>> {
            self.mesh.polygons[self.cells[at]].portal_to(self.cells[at + 1])
        };

        let edge = portal(i)?;
        let (mut left, mut right) = if orient(position, edge.start, edge.end) {
            (edge.start, edge.end)
        } else {
            (edge.end, edge.start)
        };

        for j in (i + 1)..(self.cells.len() - 1) {
            let edge = portal(j)?;
            let (new_left, new_right) = if orient(position, edge.start, edge.end) {
                (edge.start, edge.end)
            } else {
                (edge.end, edge.start)
            };

            // Narrow the funnel; if a side crosses over, steer for the
            // opposite corner.
            if orient(position, left, new_left) {
                left = new_left;
            }
            if !orient(position, left, right) {
                return Some(right);
            }

            if !orient(position, right, new_right) {
                right = new_right;
            }
            if !orient(position, left, right) {
                return Some(left);
            }
        }

        if orient(position, left, final_target) {
            left = final_target;
        }
        if !orient(position, left, right) {
            return Some(right);
        }

        if !orient(position, right, final_target) {
            right = final_target;
        }
        if !orient(position, left, right) {
            return Some(left);
        }

        Some(final_target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Containment;
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
    fn test_single_cell_mesh() {
        let mesh = NavMesh::generate(&square(2.0), &[]).unwrap();
        assert_eq!(mesh.polygons().len(), 1);

        let path = mesh
            .get_path(Vec2::new(0.5, 0.5), Vec2::new(1.5, 1.5))
            .unwrap();
        assert_eq!(path.cells(), &[0]);

        // Inside a single cell the funnel degenerates to the target.
        let target = Vec2::new(1.5, 1.5);
        assert_eq!(
            path.get_next_move_to(Vec2::new(0.5, 0.5), target),
            Some(target)
        );
    }

    #[test]
    fn test_two_cell_mesh_links_cells() {
        let mesh = NavMesh::generate(&l_shape(), &[]).unwrap();
        assert_eq!(mesh.polygons().len(), 2);

        let a = &mesh.polygons()[0];
        assert_eq!(a.neighbor_indices().collect::<Vec<_>>(), vec![1]);
        assert!(a.portal_to(1).is_some());
        assert!(mesh.distance(0, 1).is_finite());
    }

    #[test]
    fn test_path_across_two_cells() {
        let mesh = NavMesh::generate(&l_shape(), &[]).unwrap();

        let start = Vec2::new(1.5, 0.5);
        let stop = Vec2::new(0.5, 1.5);
        let path = mesh.get_path(start, stop).unwrap();
        assert_eq!(path.cells().len(), 2);

        let step = path.get_next_move_to(start, stop).unwrap();
        assert_ne!(step, start);
        assert_eq!(l_shape().contains(step), Containment::Boundary);
    }

    #[test]
    fn test_path_by_cell_index() {
        let mesh = NavMesh::generate(&l_shape(), &[]).unwrap();
        let path = mesh.get_path(0usize, 1usize).unwrap();
        assert_eq!(path.cells(), &[0, 1]);
    }

    #[test]
    fn test_degenerate_boundary_is_rejected() {
        assert!(matches!(
            NavMesh::generate(&Polygon::<f64>::new(), &[]),
            Err(GeometryError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_point_outside_mesh_has_no_path() {
        let mesh = NavMesh::generate(&square(2.0), &[]).unwrap();
        assert!(mesh
            .get_path(Vec2::new(5.0, 5.0), Vec2::new(0.5, 0.5))
            .is_none());
        assert!(mesh.get_path(0usize, 7usize).is_none());
    }

    #[test]
    fn test_mesh_with_wall() {
        let boundary = square(4.0);
        let wall = Polygon::from_tuples(&[(1.5, 1.5), (2.5, 1.5), (2.5, 2.5), (1.5, 2.5)]);

        let mesh = NavMesh::generate(&boundary, &[wall]).unwrap();
        assert!(mesh.polygons().len() >= 2);

        // No cell covers the wall interior.
        let wall_center = Vec2::new(2.0, 2.0);
        assert!(mesh.find_polygon(wall_center).is_none());

        // Routing around the wall still works.
        let start = Vec2::new(0.5, 2.0);
        let stop = Vec2::new(3.5, 2.0);
        let path = mesh.get_path(start, stop).unwrap();
        assert!(path.cells().len() >= 2);

        let total_area: f64 = mesh.polygons().iter().map(|np| np.polygon.area()).sum();
        assert_relative_eq!(total_area, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_funnel_reaches_target_iteratively() {
        let mesh = NavMesh::generate(&l_shape(), &[]).unwrap();
        let stop = Vec2::new(0.5, 1.75);

        let mut position = Vec2::new(1.75, 0.5);
        for _ in 0..16 {
            let path = match mesh.get_path(position, stop) {
                Some(p) => p,
                None => break,
            };
            let next = path.get_next_move_to(position, stop).unwrap();
            if next.fuzzy_eq(stop) {
                return;
            }
            // Step towards the suggested point, nudged slightly off the
            // boundary so the position stays inside a cell.
            position = position.lerp(next, 0.9);
        }
        let dist = (position - stop).length();
        assert!(dist < 1.0, "agent did not approach target, at {:?}", position);
    }
}
