use crate::math::{Transform, Vector};

/// A 2×2 linear matrix.
///
/// Unlike `euclid`'s `Transform2D` this carries no translation, which makes
/// it a good fit for pen shapes: an elliptical pen is entirely described by
/// the linear image of the unit circle, and folding a render transform into
/// the pen must ignore the transform's translation.
///
/// The matrix maps column vectors: `v ↦ (m11·x + m12·y, m21·x + m22·y)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Matrix2x2 {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
}

impl Matrix2x2 {
    pub const IDENTITY: Self = Matrix2x2 {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
    };

    #[inline]
    pub fn new(m11: f32, m12: f32, m21: f32, m22: f32) -> Self {
        Matrix2x2 { m11, m12, m21, m22 }
    }

    /// A rotation by `angle` radians (counter-clockwise).
    pub fn rotation(angle: f32) -> Self {
        let (s, c) = (angle.sin(), angle.cos());
        Matrix2x2::new(c, -s, s, c)
    }

    /// A non-uniform scale.
    #[inline]
    pub fn scale(sx: f32, sy: f32) -> Self {
        Matrix2x2::new(sx, 0.0, 0.0, sy)
    }

    /// The linear part of an affine transform, dropping its translation.
    ///
    /// `euclid`'s `Transform2D` uses the row-vector convention, so its
    /// `m12`/`m21` entries swap places here.
    #[inline]
    pub fn from_linear(t: &Transform) -> Self {
        Matrix2x2::new(t.m11, t.m21, t.m12, t.m22)
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// The inverse matrix, or `None` when the determinant vanishes.
    pub fn inverse(&self) -> Option<Matrix2x2> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Matrix2x2::new(
            self.m22 * inv_det,
            -self.m12 * inv_det,
            -self.m21 * inv_det,
            self.m11 * inv_det,
        ))
    }

    #[inline]
    pub fn transform_vector(&self, v: Vector) -> Vector {
        Vector::new(
            self.m11 * v.x + self.m12 * v.y,
            self.m21 * v.x + self.m22 * v.y,
        )
    }

    /// Composition: `self.then(&other)` applies `self` first.
    pub fn then(&self, other: &Matrix2x2) -> Matrix2x2 {
        Matrix2x2::new(
            other.m11 * self.m11 + other.m12 * self.m21,
            other.m11 * self.m12 + other.m12 * self.m22,
            other.m21 * self.m11 + other.m22 * self.m21,
            other.m21 * self.m12 + other.m22 * self.m22,
        )
    }

    /// First column, the image of the x axis.
    #[inline]
    pub fn col0(&self) -> Vector {
        Vector::new(self.m11, self.m21)
    }

    /// Second column, the image of the y axis.
    #[inline]
    pub fn col1(&self) -> Vector {
        Vector::new(self.m12, self.m22)
    }

    pub fn is_finite(&self) -> bool {
        self.m11.is_finite() && self.m12.is_finite() && self.m21.is_finite() && self.m22.is_finite()
    }
}
