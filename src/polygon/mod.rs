//! Polygon type, boolean set operations, offsetting and convex
//! decomposition.

mod boolean;
mod core;
mod decompose;
mod offset;

pub use self::boolean::{boolean_operation, BooleanOp};
pub(crate) use self::core::dedup_fuzzy;
pub use self::core::{Containment, Polygon};
pub use self::decompose::convex_decompose;
pub use self::offset::{offset, tip_decorator_flat, tip_decorator_pointy, TipDecorator};
