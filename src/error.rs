//! Error types for polynav operations.

use thiserror::Error;

/// Errors that can occur during geometric operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The caller supplied degenerate input, e.g. a polygon with fewer than
    /// three points or a zero-length edge where a normal is required.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An internal consistency check failed. This indicates either an
    /// algorithm bug or input outside the supported class (for example a
    /// multiply self-intersecting polygon with coincident crossing points).
    #[error("geometry invariant violated: {0}")]
    InvariantViolation(String),
}
