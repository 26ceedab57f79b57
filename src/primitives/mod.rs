//! Floating-point geometric primitives.

mod segment2;
mod vec2;

pub use segment2::Segment2;
pub use vec2::{epsilon, Vec2, EPSILON};
