//! polynav - 2D polygon geometry, visibility and navigation
//!
//! Polygon boolean operations, offsetting and convex decomposition, plus the
//! two things games usually build on top of them: polygonal field-of-view
//! calculation and navigation meshes with funnel-based steering. Level
//! geometry can be imported from a small SVG subset.

pub mod bezier;
pub mod error;
pub mod fov;
pub mod intersect;
pub mod nav;
pub mod polygon;
pub mod primitives;
pub mod svg;
pub mod transform;

pub use error::GeometryError;
pub use fov::Vision;
pub use nav::{NavMesh, NavPath, NavPolygon, NavQuery};
pub use polygon::{
    boolean_operation, convex_decompose, offset, BooleanOp, Containment, Polygon,
};
pub use primitives::{Segment2, Vec2, EPSILON};
pub use svg::{convert_svg_str, SvgError};
pub use transform::Transform;
