//! 3x3 matrix, column-major storage
use log::warn;

use crate::{MathError, Matrix4, Result, Vector3};

/// Elements are stored column-major: `elements[0..3]` is the first column.
/// [`Matrix3::set`] takes its arguments in row-major reading order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub elements: [f64; 9],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    pub const fn identity() -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    pub const fn zero() -> Self {
        Self { elements: [0.0; 9] }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n11: f64, n12: f64, n13: f64,
        n21: f64, n22: f64, n23: f64,
        n31: f64, n32: f64, n33: f64,
    ) -> Self {
        let mut m = Self::zero();
        m.set(n11, n12, n13, n21, n22, n23, n31, n32, n33);
        m
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &mut self,
        n11: f64, n12: f64, n13: f64,
        n21: f64, n22: f64, n23: f64,
        n31: f64, n32: f64, n33: f64,
    ) -> &mut Self {
        let te = &mut self.elements;
        te[0] = n11; te[3] = n12; te[6] = n13;
        te[1] = n21; te[4] = n22; te[7] = n23;
        te[2] = n31; te[5] = n32; te[8] = n33;
        self
    }

    pub fn set_identity(&mut self) -> &mut Self {
        *self = Self::identity();
        self
    }

    pub fn multiply_scalar(&mut self, s: f64) -> &mut Self {
        for e in self.elements.iter_mut() {
            *e *= s;
        }
        self
    }

    /// Apply to every `(x, y, z)` triple of a flat array in place.
    pub fn apply_to_vector3_array(&self, array: &mut [f64]) {
        for chunk in array.chunks_exact_mut(3) {
            let v = Vector3::new(chunk[0], chunk[1], chunk[2]).apply_matrix3(self);
            chunk[0] = v.x;
            chunk[1] = v.y;
            chunk[2] = v.z;
        }
    }

    /// Full cofactor expansion.
    pub fn determinant(&self) -> f64 {
        let te = &self.elements;
        let (a, b, c) = (te[0], te[1], te[2]);
        let (d, e, f) = (te[3], te[4], te[5]);
        let (g, h, i) = (te[6], te[7], te[8]);
        a * e * i - a * f * h - b * d * i + b * f * g + c * d * h - c * e * g
    }

    /// Inverse via the adjugate. A singular matrix yields the zero matrix.
    pub fn inverse(&self) -> Self {
        let (adjugate, det) = self.adjugate();
        finish_inverse(adjugate, det).unwrap_or_else(|_| {
            warn!("Matrix3::inverse: determinant is 0, returning zero matrix");
            Self::zero()
        })
    }

    /// Inverse via the adjugate, rejecting singular input.
    pub fn try_inverse(&self) -> Result<Self> {
        let (adjugate, det) = self.adjugate();
        finish_inverse(adjugate, det)
    }

    /// Inverse of the upper-left 3x3 block of `m`. Singular blocks yield
    /// the zero matrix.
    pub fn inverse_of_matrix4(m: &Matrix4) -> Self {
        Self::from_matrix4(m).inverse()
    }

    /// Upper-left 3x3 block of `m`.
    pub fn from_matrix4(m: &Matrix4) -> Self {
        let me = &m.elements;
        Self {
            elements: [
                me[0], me[1], me[2], me[4], me[5], me[6], me[8], me[9], me[10],
            ],
        }
    }

    /// Inverse-transpose of the upper 3x3 of `m`, for transforming normals.
    pub fn normal_matrix(m: &Matrix4) -> Self {
        let mut n = Self::inverse_of_matrix4(m);
        n.transpose();
        n
    }

    pub fn transpose(&mut self) -> &mut Self {
        self.elements.swap(1, 3);
        self.elements.swap(2, 6);
        self.elements.swap(5, 7);
        self
    }

    /// Row-major copy of the elements.
    pub fn transpose_into_array(&self) -> [f64; 9] {
        let mut t = *self;
        t.transpose();
        t.elements
    }

    pub fn to_array(&self) -> [f64; 9] {
        self.elements
    }

    fn adjugate(&self) -> (Self, f64) {
        let me = &self.elements;
        let mut adj = Self::zero();
        let te = &mut adj.elements;

        te[0] = me[8] * me[4] - me[5] * me[7];
        te[1] = -me[8] * me[1] + me[2] * me[7];
        te[2] = me[5] * me[1] - me[2] * me[4];
        te[3] = -me[8] * me[3] + me[5] * me[6];
        te[4] = me[8] * me[0] - me[2] * me[6];
        te[5] = -me[5] * me[0] + me[2] * me[3];
        te[6] = me[7] * me[3] - me[4] * me[6];
        te[7] = -me[7] * me[0] + me[1] * me[6];
        te[8] = me[4] * me[0] - me[1] * me[3];

        let det = me[0] * te[0] + me[1] * te[3] + me[2] * te[6];
        (adj, det)
    }
}

fn finish_inverse(mut adjugate: Matrix3, det: f64) -> Result<Matrix3> {
    if det == 0.0 {
        return Err(MathError::SingularMatrix);
    }
    adjugate.multiply_scalar(1.0 / det);
    Ok(adjugate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_row_major_storage_column_major() {
        let m = Matrix3::new(0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0);
        assert_eq!(m.elements, [0.0, 3.0, 6.0, 1.0, 4.0, 7.0, 2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_determinant() {
        assert_eq!(Matrix3::identity().determinant(), 1.0);
        let m = Matrix3::new(2.0, 3.0, 4.0, 5.0, 13.0, 7.0, 8.0, 9.0, 11.0);
        assert_eq!(m.determinant(), -73.0);
        assert_eq!(Matrix3::zero().determinant(), 0.0);
    }

    #[test]
    fn test_inverse() {
        let m = Matrix3::new(2.0, 3.0, 4.0, 5.0, 13.0, 7.0, 8.0, 9.0, 11.0);
        let inv = m.inverse();
        let product = Matrix4::from_matrix3(&m) * Matrix4::from_matrix3(&inv);
        assert!(product.approx_eq(&Matrix4::identity(), 1e-12));
    }

    #[test]
    fn test_singular_inverse_is_zero() {
        let m = Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0);
        assert_eq!(m.inverse(), Matrix3::zero());
        assert_eq!(m.try_inverse(), Err(MathError::SingularMatrix));
    }

    #[test]
    fn test_transpose() {
        let mut m = Matrix3::new(0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0);
        let original = m;
        m.transpose();
        assert_eq!(m, Matrix3::new(0.0, 3.0, 6.0, 1.0, 4.0, 7.0, 2.0, 5.0, 8.0));
        assert_eq!(m.transpose_into_array(), original.elements);
        m.transpose();
        assert_eq!(m, original);
    }

    #[test]
    fn test_normal_matrix_undoes_scale() {
        let mut m = Matrix4::identity();
        m.make_scale(2.0, 4.0, 8.0);
        let n = Matrix3::normal_matrix(&m);
        assert_eq!(n, Matrix3::new(0.5, 0.0, 0.0, 0.0, 0.25, 0.0, 0.0, 0.0, 0.125));
    }

    #[test]
    fn test_apply_to_vector3_array() {
        let m = Matrix3::new(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0);
        let mut array = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        m.apply_to_vector3_array(&mut array);
        assert_eq!(array, [2.0, 3.0, 4.0, 4.0, 6.0, 8.0]);
    }
}
