//! 2D vector type used for both points and directions.

use num_traits::Float;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Comparison tolerance for fuzzy vector equality and point welding.
///
/// Two vectors are considered equal when both coordinate deltas are below
/// this value. Grid keys produced by [`Vec2::quantized`] use the same
/// resolution so that welding and hashing agree.
pub const EPSILON: f64 = 1e-4;

/// Returns [`EPSILON`] converted to the target float type.
#[inline]
pub fn epsilon<F: Float>() -> F {
    F::from(EPSILON).unwrap()
}

/// A 2D vector, used both for positions and for directions/offsets.
///
/// Generic over floating-point types (`f32` or `f64`). Values are immutable
/// in practice: all arithmetic returns new vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vec2<F> {
    /// Creates a new vector.
    #[inline]
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// Creates a zero vector.
    #[inline]
    pub fn zero() -> Self {
        Self {
            x: F::zero(),
            y: F::zero(),
        }
    }

    /// Creates a unit vector along the X axis.
    #[inline]
    pub fn unit_x() -> Self {
        Self {
            x: F::one(),
            y: F::zero(),
        }
    }

    /// Creates a unit vector along the Y axis.
    #[inline]
    pub fn unit_y() -> Self {
        Self {
            x: F::zero(),
            y: F::one(),
        }
    }

    /// Computes the dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y
    }

    /// Computes the 2D cross product (perpendicular dot product).
    ///
    /// Returns the z-component of the 3D cross product if the vectors were
    /// extended to 3D with z=0.
    #[inline]
    pub fn cross(self, other: Self) -> F {
        self.x * other.y - self.y * other.x
    }

    /// Returns the left-hand normal `(-y, x)` of this vector.
    #[inline]
    pub fn normal(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Returns the squared length of the vector.
    #[inline]
    pub fn length_squared(self) -> F {
        self.dot(self)
    }

    /// Returns the length of the vector.
    #[inline]
    pub fn length(self) -> F {
        self.length_squared().sqrt()
    }

    /// Returns a normalized (unit length) vector.
    ///
    /// Returns `None` if the vector is zero or too small to normalize
    /// reliably.
    #[inline]
    pub fn normalize(self) -> Option<Self> {
        let len = self.length();
        if len > F::epsilon() {
            Some(self / len)
        } else {
            None
        }
    }

    /// Linearly interpolates between `self` and `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: F) -> Self {
        self + (other - self) * t
    }

    /// Returns the squared distance to another vector interpreted as a point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> F {
        (other - self).length_squared()
    }

    /// Returns the distance to another vector interpreted as a point.
    #[inline]
    pub fn distance(self, other: Self) -> F {
        self.distance_squared(other).sqrt()
    }

    /// Tolerance-based equality: both coordinate deltas below [`EPSILON`].
    #[inline]
    pub fn fuzzy_eq(self, other: Self) -> bool {
        let eps = epsilon::<F>();
        (self.x - other.x).abs() < eps && (self.y - other.y).abs() < eps
    }

    /// Quantizes the coordinates to the [`EPSILON`] grid.
    ///
    /// The resulting integer pair is usable as a hash key consistent with
    /// [`Vec2::fuzzy_eq`] for points that were produced by welding.
    #[inline]
    pub fn quantized(self) -> (i64, i64) {
        let scale = F::from(1.0 / EPSILON).unwrap();
        (
            (self.x * scale).round().to_i64().unwrap_or(i64::MAX),
            (self.y * scale).round().to_i64().unwrap_or(i64::MAX),
        )
    }
}

impl<F: Float> Add for Vec2<F> {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl<F: Float> Sub for Vec2<F> {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl<F: Float> Mul<F> for Vec2<F> {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: F) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl<F: Float> Div<F> for Vec2<F> {
    type Output = Self;

    #[inline]
    fn div(self, scalar: F) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl<F: Float> Neg for Vec2<F> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl<F: Float> Default for Vec2<F> {
    fn default() -> Self {
        Self::zero()
    }
}
