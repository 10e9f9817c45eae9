//! 4x4 affine/projective matrix, column-major storage
use std::ops::Mul;

use log::warn;

use crate::math_utils::DEG2RAD;
use crate::{Euler, MathError, Matrix3, Quaternion, Result, RotationOrder, Vector3};

/// Elements are stored column-major: `elements[12..15]` hold the
/// translation. [`Matrix4::set`] takes its arguments in row-major reading
/// order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub elements: [f64; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    pub const fn identity() -> Self {
        Self {
            elements: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub const fn zero() -> Self {
        Self { elements: [0.0; 16] }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n11: f64, n12: f64, n13: f64, n14: f64,
        n21: f64, n22: f64, n23: f64, n24: f64,
        n31: f64, n32: f64, n33: f64, n34: f64,
        n41: f64, n42: f64, n43: f64, n44: f64,
    ) -> Self {
        let mut m = Self::zero();
        m.set(
            n11, n12, n13, n14, n21, n22, n23, n24, n31, n32, n33, n34, n41, n42, n43, n44,
        );
        m
    }

    /// Embed a 3x3 block with zero translation.
    pub fn from_matrix3(m: &Matrix3) -> Self {
        let me = &m.elements;
        Self::new(
            me[0], me[3], me[6], 0.0,
            me[1], me[4], me[7], 0.0,
            me[2], me[5], me[8], 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn from_array(array: &[f64]) -> Result<Self> {
        let mut elements = [0.0; 16];
        let src = array.get(..16).ok_or(MathError::ArrayTooShort {
            needed: 16,
            offset: 0,
            len: array.len(),
        })?;
        elements.copy_from_slice(src);
        Ok(Self { elements })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &mut self,
        n11: f64, n12: f64, n13: f64, n14: f64,
        n21: f64, n22: f64, n23: f64, n24: f64,
        n31: f64, n32: f64, n33: f64, n34: f64,
        n41: f64, n42: f64, n43: f64, n44: f64,
    ) -> &mut Self {
        let te = &mut self.elements;
        te[0] = n11; te[4] = n12; te[8] = n13; te[12] = n14;
        te[1] = n21; te[5] = n22; te[9] = n23; te[13] = n24;
        te[2] = n31; te[6] = n32; te[10] = n33; te[14] = n34;
        te[3] = n41; te[7] = n42; te[11] = n43; te[15] = n44;
        self
    }

    pub fn set_identity(&mut self) -> &mut Self {
        *self = Self::identity();
        self
    }

    /// Element at `row`, `col` (both zero-based).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.elements[col * 4 + row]
    }

    /// Copy the upper 3x3 of `m` with each column rescaled to unit length.
    /// The remaining elements of `self` are left untouched.
    pub fn extract_rotation(&mut self, m: &Matrix4) -> &mut Self {
        let me = &m.elements;
        for col in 0..3 {
            let base = col * 4;
            let len = Vector3::new(me[base], me[base + 1], me[base + 2]).length();
            let inv = if len == 0.0 { 0.0 } else { 1.0 / len };
            for row in 0..3 {
                self.elements[base + row] = me[base + row] * inv;
            }
        }
        self
    }

    pub fn make_rotation_from_euler(&mut self, euler: &Euler) -> &mut Self {
        let (b, a) = euler.x.sin_cos();
        let (d, c) = euler.y.sin_cos();
        let (f, e) = euler.z.sin_cos();
        let te = &mut self.elements;

        match euler.order {
            RotationOrder::XYZ => {
                let (ae, af, be, bf) = (a * e, a * f, b * e, b * f);
                te[0] = c * e;
                te[4] = -c * f;
                te[8] = d;
                te[1] = af + be * d;
                te[5] = ae - bf * d;
                te[9] = -b * c;
                te[2] = bf - ae * d;
                te[6] = be + af * d;
                te[10] = a * c;
            }
            RotationOrder::YXZ => {
                let (ce, cf, de, df) = (c * e, c * f, d * e, d * f);
                te[0] = ce + df * b;
                te[4] = de * b - cf;
                te[8] = a * d;
                te[1] = a * f;
                te[5] = a * e;
                te[9] = -b;
                te[2] = cf * b - de;
                te[6] = df + ce * b;
                te[10] = a * c;
            }
            RotationOrder::ZXY => {
                let (ce, cf, de, df) = (c * e, c * f, d * e, d * f);
                te[0] = ce - df * b;
                te[4] = -a * f;
                te[8] = de + cf * b;
                te[1] = cf + de * b;
                te[5] = a * e;
                te[9] = df - ce * b;
                te[2] = -a * d;
                te[6] = b;
                te[10] = a * c;
            }
            RotationOrder::ZYX => {
                let (ae, af, be, bf) = (a * e, a * f, b * e, b * f);
                te[0] = c * e;
                te[4] = be * d - af;
                te[8] = ae * d + bf;
                te[1] = c * f;
                te[5] = bf * d + ae;
                te[9] = af * d - be;
                te[2] = -d;
                te[6] = b * c;
                te[10] = a * c;
            }
            RotationOrder::YZX => {
                let (ac, ad, bc, bd) = (a * c, a * d, b * c, b * d);
                te[0] = c * e;
                te[4] = bd - ac * f;
                te[8] = bc * f + ad;
                te[1] = f;
                te[5] = a * e;
                te[9] = -b * e;
                te[2] = -d * e;
                te[6] = ad * f + bc;
                te[10] = ac - bd * f;
            }
            RotationOrder::XZY => {
                let (ac, ad, bc, bd) = (a * c, a * d, b * c, b * d);
                te[0] = c * e;
                te[4] = -f;
                te[8] = d * e;
                te[1] = ac * f + bd;
                te[5] = a * e;
                te[9] = ad * f - bc;
                te[2] = bc * f - ad;
                te[6] = b * e;
                te[10] = bd * f + ac;
            }
        }

        te[3] = 0.0;
        te[7] = 0.0;
        te[11] = 0.0;
        te[12] = 0.0;
        te[13] = 0.0;
        te[14] = 0.0;
        te[15] = 1.0;
        self
    }

    /// Rotation block from a unit quaternion, translation cleared.
    pub fn make_rotation_from_quaternion(&mut self, q: &Quaternion) -> &mut Self {
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);

        self.set(
            1.0 - (yy + zz), xy - wz, xz + wy, 0.0,
            xy + wz, 1.0 - (xx + zz), yz - wx, 0.0,
            xz - wy, yz + wx, 1.0 - (xx + yy), 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Orient the rotation block so -Z looks from `eye` toward `target`.
    /// Translation is left untouched.
    pub fn look_at(&mut self, eye: Vector3, target: Vector3, up: Vector3) -> &mut Self {
        let mut z = (eye - target).normalize();
        if z.length() == 0.0 {
            z.z = 1.0;
        }

        let mut x = up.cross(z).normalize();
        if x.length() == 0.0 {
            z.x += 0.0001;
            x = up.cross(z).normalize();
        }

        let y = z.cross(x);
        let te = &mut self.elements;
        te[0] = x.x;
        te[4] = y.x;
        te[8] = z.x;
        te[1] = x.y;
        te[5] = y.y;
        te[9] = z.y;
        te[2] = x.z;
        te[6] = y.z;
        te[10] = z.z;
        self
    }

    /// `self = self * m`
    pub fn multiply(&mut self, m: &Matrix4) -> &mut Self {
        *self = Self::multiply_matrices(self, m);
        self
    }

    /// `self = m * self`
    pub fn premultiply(&mut self, m: &Matrix4) -> &mut Self {
        *self = Self::multiply_matrices(m, self);
        self
    }

    pub fn multiply_matrices(a: &Matrix4, b: &Matrix4) -> Matrix4 {
        let mut out = Self::zero();
        for col in 0..4 {
            for row in 0..4 {
                out.elements[col * 4 + row] = (0..4).map(|k| a.get(row, k) * b.get(k, col)).sum();
            }
        }
        out
    }

    /// Multiply `a * b`, store the product in `self` and write it
    /// column-major into the first 16 slots of `r`.
    pub fn multiply_to_array(&mut self, a: &Matrix4, b: &Matrix4, r: &mut [f64]) -> Result<&mut Self> {
        *self = Self::multiply_matrices(a, b);
        self.flatten_to_array_offset(r, 0)?;
        Ok(self)
    }

    pub fn multiply_scalar(&mut self, s: f64) -> &mut Self {
        for e in self.elements.iter_mut() {
            *e *= s;
        }
        self
    }

    /// Apply to every `(x, y, z)` triple of a flat array as a point.
    pub fn apply_to_vector3_array(&self, array: &mut [f64]) {
        for chunk in array.chunks_exact_mut(3) {
            let v = Vector3::new(chunk[0], chunk[1], chunk[2]).apply_matrix4(self);
            chunk[0] = v.x;
            chunk[1] = v.y;
            chunk[2] = v.z;
        }
    }

    fn minor(&self, row: usize, col: usize) -> f64 {
        let mut sub = [0.0; 9];
        let mut k = 0;
        for c in (0..4).filter(|&c| c != col) {
            for r in (0..4).filter(|&r| r != row) {
                sub[k] = self.get(r, c);
                k += 1;
            }
        }
        Matrix3 { elements: sub }.determinant()
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
        sign * self.minor(row, col)
    }

    /// Cofactor expansion along the first row.
    pub fn determinant(&self) -> f64 {
        (0..4).map(|col| self.get(0, col) * self.cofactor(0, col)).sum()
    }

    pub fn transpose(&mut self) -> &mut Self {
        let te = &mut self.elements;
        te.swap(1, 4);
        te.swap(2, 8);
        te.swap(6, 9);
        te.swap(3, 12);
        te.swap(7, 13);
        te.swap(11, 14);
        self
    }

    /// Write the elements column-major into `array` starting at `offset`.
    pub fn flatten_to_array_offset(&self, array: &mut [f64], offset: usize) -> Result<()> {
        let len = array.len();
        let dst = array
            .get_mut(offset..offset + 16)
            .ok_or(MathError::ArrayTooShort {
                needed: 16,
                offset,
                len,
            })?;
        dst.copy_from_slice(&self.elements);
        Ok(())
    }

    pub fn to_array(&self) -> [f64; 16] {
        self.elements
    }

    pub fn position(&self) -> Vector3 {
        Vector3::from_matrix_position(self)
    }

    pub fn set_position(&mut self, v: Vector3) -> &mut Self {
        self.elements[12] = v.x;
        self.elements[13] = v.y;
        self.elements[14] = v.z;
        self
    }

    pub fn copy_position(&mut self, m: &Matrix4) -> &mut Self {
        self.elements[12] = m.elements[12];
        self.elements[13] = m.elements[13];
        self.elements[14] = m.elements[14];
        self
    }

    /// Inverse by cofactors. A singular matrix yields the zero matrix and a
    /// warning; use [`Matrix4::try_inverse`] to treat that as an error.
    pub fn inverse(&self) -> Matrix4 {
        self.try_inverse().unwrap_or_else(|_| {
            warn!("Matrix4::inverse: determinant is 0, returning zero matrix");
            Self::zero()
        })
    }

    pub fn try_inverse(&self) -> Result<Matrix4> {
        let mut adjugate = Self::zero();
        for row in 0..4 {
            for col in 0..4 {
                // adjugate is the transposed cofactor matrix
                adjugate.elements[row * 4 + col] = self.cofactor(row, col);
            }
        }

        let det: f64 = (0..4).map(|col| self.get(0, col) * adjugate.get(col, 0)).sum();
        if det == 0.0 {
            return Err(MathError::SingularMatrix);
        }

        adjugate.multiply_scalar(1.0 / det);
        Ok(adjugate)
    }

    /// Post-multiply by a scale: column `i` is scaled by component `i` of `v`.
    pub fn scale(&mut self, v: Vector3) -> &mut Self {
        for (col, s) in [v.x, v.y, v.z].into_iter().enumerate() {
            for row in 0..4 {
                self.elements[col * 4 + row] *= s;
            }
        }
        self
    }

    /// Square root of the largest squared column length of the 3x3 block.
    pub fn max_scale_on_axis(&self) -> f64 {
        let te = &self.elements;
        let sx = te[0] * te[0] + te[1] * te[1] + te[2] * te[2];
        let sy = te[4] * te[4] + te[5] * te[5] + te[6] * te[6];
        let sz = te[8] * te[8] + te[9] * te[9] + te[10] * te[10];
        sx.max(sy).max(sz).sqrt()
    }

    pub fn make_translation(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.set(
            1.0, 0.0, 0.0, x,
            0.0, 1.0, 0.0, y,
            0.0, 0.0, 1.0, z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn make_rotation_x(&mut self, theta: f64) -> &mut Self {
        let (s, c) = theta.sin_cos();
        self.set(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn make_rotation_y(&mut self, theta: f64) -> &mut Self {
        let (s, c) = theta.sin_cos();
        self.set(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn make_rotation_z(&mut self, theta: f64) -> &mut Self {
        let (s, c) = theta.sin_cos();
        self.set(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation of `angle` radians about the unit vector `axis`.
    pub fn make_rotation_axis(&mut self, axis: Vector3, angle: f64) -> &mut Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        let (tx, ty) = (t * x, t * y);

        self.set(
            tx * x + c, tx * y - s * z, tx * z + s * y, 0.0,
            tx * y + s * z, ty * y + c, ty * z - s * x, 0.0,
            tx * z - s * y, ty * z + s * x, t * z * z + c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn make_scale(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.set(
            x, 0.0, 0.0, 0.0,
            0.0, y, 0.0, 0.0,
            0.0, 0.0, z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Columns set to the three basis vectors.
    pub fn make_basis(&mut self, x_axis: Vector3, y_axis: Vector3, z_axis: Vector3) -> &mut Self {
        self.set(
            x_axis.x, y_axis.x, z_axis.x, 0.0,
            x_axis.y, y_axis.y, z_axis.y, 0.0,
            x_axis.z, y_axis.z, z_axis.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn extract_basis(&self) -> (Vector3, Vector3, Vector3) {
        (
            Vector3::from_matrix_column(self, 0),
            Vector3::from_matrix_column(self, 1),
            Vector3::from_matrix_column(self, 2),
        )
    }

    /// Translation * rotation * scale.
    pub fn compose(&mut self, position: Vector3, quaternion: &Quaternion, scale: Vector3) -> &mut Self {
        self.make_rotation_from_quaternion(quaternion);
        self.scale(scale);
        self.set_position(position)
    }

    /// Split into `(position, quaternion, scale)`.
    ///
    /// A negative determinant is attributed to the X scale.
    pub fn decompose(&self) -> (Vector3, Quaternion, Vector3) {
        let te = &self.elements;
        let mut sx = Vector3::new(te[0], te[1], te[2]).length();
        let sy = Vector3::new(te[4], te[5], te[6]).length();
        let sz = Vector3::new(te[8], te[9], te[10]).length();

        if self.determinant() < 0.0 {
            sx = -sx;
        }

        let position = Vector3::new(te[12], te[13], te[14]);

        let mut rotation = *self;
        for (col, s) in [sx, sy, sz].into_iter().enumerate() {
            let inv = if s == 0.0 { 0.0 } else { 1.0 / s };
            for row in 0..3 {
                rotation.elements[col * 4 + row] *= inv;
            }
        }

        let quaternion = Quaternion::from_rotation_matrix(&rotation);
        (position, quaternion, Vector3::new(sx, sy, sz))
    }

    /// Perspective projection for an off-axis view volume.
    pub fn make_frustum(
        &mut self,
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
    ) -> &mut Self {
        let x = 2.0 * near / (right - left);
        let y = 2.0 * near / (top - bottom);

        let a = (right + left) / (right - left);
        let b = (top + bottom) / (top - bottom);
        let c = -(far + near) / (far - near);
        let d = -2.0 * far * near / (far - near);

        self.set(
            x, 0.0, a, 0.0,
            0.0, y, b, 0.0,
            0.0, 0.0, c, d,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Symmetric perspective projection, `fov` is the vertical field of
    /// view in degrees.
    pub fn make_perspective(&mut self, fov: f64, aspect: f64, near: f64, far: f64) -> &mut Self {
        let ymax = near * (fov * 0.5 * DEG2RAD).tan();
        let ymin = -ymax;
        let xmin = ymin * aspect;
        let xmax = ymax * aspect;
        self.make_frustum(xmin, xmax, ymin, ymax, near, far)
    }

    pub fn make_orthographic(
        &mut self,
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    ) -> &mut Self {
        let w = right - left;
        let h = top - bottom;
        let p = far - near;

        let x = (right + left) / w;
        let y = (top + bottom) / h;
        let z = (far + near) / p;

        self.set(
            2.0 / w, 0.0, 0.0, -x,
            0.0, 2.0 / h, 0.0, -y,
            0.0, 0.0, -2.0 / p, -z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Every element within `epsilon` of the counterpart.
    pub fn approx_eq(&self, m: &Matrix4, epsilon: f64) -> bool {
        self.elements
            .iter()
            .zip(m.elements.iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        Matrix4::multiply_matrices(&self, &rhs)
    }
}

impl Mul<&Matrix4> for &Matrix4 {
    type Output = Matrix4;
    fn mul(self, rhs: &Matrix4) -> Matrix4 {
        Matrix4::multiply_matrices(self, rhs)
    }
}
