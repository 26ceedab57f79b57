//! 2D affine transformations.

use crate::polygon::Polygon;
use crate::primitives::Vec2;
use num_traits::Float;
use std::ops::Mul;

/// A 2D affine transformation.
///
/// Represented as a 2x3 matrix in row-major order:
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// ```
///
/// Points transform as `(a*x + b*y + tx, c*x + d*y + ty)`. Transforms
/// compose with `*`, applying the right-hand side first:
///
/// # Example
///
/// ```
/// use polynav::{Transform, Vec2};
///
/// let t: Transform<f64> = Transform::translate(10.0, 0.0)
///     * Transform::rotation(std::f64::consts::FRAC_PI_2);
///
/// let p = t.apply(Vec2::new(1.0, 0.0));
/// assert!((p.x - 10.0).abs() < 1e-10);
/// assert!((p.y - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform<F> {
    pub a: F,
    pub b: F,
    pub c: F,
    pub d: F,
    pub tx: F,
    pub ty: F,
}

impl<F: Float> Transform<F> {
    /// Creates a transform from matrix components.
    #[inline]
    pub fn new(a: F, b: F, c: F, d: F, tx: F, ty: F) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// The identity transform.
    #[inline]
    pub fn identity() -> Self {
        Self::new(
            F::one(),
            F::zero(),
            F::zero(),
            F::one(),
            F::zero(),
            F::zero(),
        )
    }

    /// A translation by `(dx, dy)`.
    #[inline]
    pub fn translate(dx: F, dy: F) -> Self {
        Self::new(F::one(), F::zero(), F::zero(), F::one(), dx, dy)
    }

    /// A rotation by `phi` radians around the origin.
    #[inline]
    pub fn rotation(phi: F) -> Self {
        let (sin, cos) = phi.sin_cos();
        Self::new(cos, -sin, sin, cos, F::zero(), F::zero())
    }

    /// A rotation by `phi` radians around `(cx, cy)`.
    pub fn rotation_around(cx: F, cy: F, phi: F) -> Self {
        Self::translate(cx, cy) * Self::rotation(phi) * Self::translate(-cx, -cy)
    }

    /// A non-uniform scale around the origin.
    #[inline]
    pub fn scale(sx: F, sy: F) -> Self {
        Self::new(sx, F::zero(), F::zero(), sy, F::zero(), F::zero())
    }

    /// A mirror along the x axis (negates x).
    #[inline]
    pub fn mirror_x() -> Self {
        Self::scale(-F::one(), F::one())
    }

    /// A mirror along the y axis (negates y).
    #[inline]
    pub fn mirror_y() -> Self {
        Self::scale(F::one(), -F::one())
    }

    /// Applies this transform to a point.
    #[inline]
    pub fn apply(&self, p: Vec2<F>) -> Vec2<F> {
        Vec2::new(
            self.a * p.x + self.b * p.y + self.tx,
            self.c * p.x + self.d * p.y + self.ty,
        )
    }

    /// Applies this transform to every point of a polygon.
    pub fn apply_polygon(&self, poly: &Polygon<F>) -> Polygon<F> {
        Polygon::from_points(poly.points.iter().map(|&p| self.apply(p)).collect())
    }

    /// Composes with another transform; the result applies `other` first.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            tx: self.a * other.tx + self.b * other.ty + self.tx,
            ty: self.c * other.tx + self.d * other.ty + self.ty,
        }
    }
}

impl<F: Float> Mul for Transform<F> {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        self.compose(&other)
    }
}

impl<F: Float> Mul<Vec2<F>> for Transform<F> {
    type Output = Vec2<F>;

    fn mul(self, p: Vec2<F>) -> Vec2<F> {
        self.apply(p)
    }
}

impl<F: Float> Default for Transform<F> {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_vec_eq(a: Vec2<f64>, b: Vec2<f64>) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-10);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-10);
    }

    #[test]
    fn test_identity() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(Transform::identity().apply(p), p);
    }

    #[test]
    fn test_translate() {
        let t = Transform::translate(2.0, -1.0);
        assert_vec_eq(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_rotation() {
        let t = Transform::rotation(FRAC_PI_2);
        assert_vec_eq(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_rotation_around() {
        let t = Transform::rotation_around(1.0, 1.0, PI);
        assert_vec_eq(t.apply(Vec2::new(2.0, 1.0)), Vec2::new(0.0, 1.0));
        // The pivot is a fixed point.
        assert_vec_eq(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_scale_and_mirror() {
        assert_vec_eq(
            Transform::scale(2.0, 3.0).apply(Vec2::new(1.0, 1.0)),
            Vec2::new(2.0, 3.0),
        );
        assert_vec_eq(
            Transform::mirror_x().apply(Vec2::new(2.0, 1.0)),
            Vec2::new(-2.0, 1.0),
        );
        assert_vec_eq(
            Transform::mirror_y().apply(Vec2::new(2.0, 1.0)),
            Vec2::new(2.0, -1.0),
        );
    }

    #[test]
    fn test_composition_order() {
        // self * other applies other first.
        let t = Transform::translate(10.0, 0.0) * Transform::rotation(FRAC_PI_2);
        assert_vec_eq(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(10.0, 1.0));
    }

    #[test]
    fn test_apply_polygon() {
        let square =
            Polygon::from_tuples(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let moved = Transform::translate(5.0, 5.0).apply_polygon(&square);
        assert_relative_eq!(moved.area(), 1.0);
        assert_relative_eq!(moved.left(), 5.0);
        assert_relative_eq!(moved.top(), 5.0);
    }
}
