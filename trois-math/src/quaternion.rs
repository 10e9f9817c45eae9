//! Unit quaternion rotations
//!
//! Conversions from Euler angles are order-aware: each of the six rotation
//! orders composes the half-angle sines and cosines differently.
use std::ops::{Mul, Neg};

use crate::euler::{Euler, RotationOrder};
use crate::{MathError, Matrix4, Result, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_euler(euler: &Euler) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_euler(euler);
        q
    }

    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_axis_angle(axis, angle);
        q
    }

    pub fn from_rotation_matrix(m: &Matrix4) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_rotation_matrix(m);
        q
    }

    pub fn set(&mut self, x: f64, y: f64, z: f64, w: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self.w = w;
        self
    }

    pub fn set_from_euler(&mut self, euler: &Euler) -> &mut Self {
        let c1 = (euler.x / 2.0).cos();
        let c2 = (euler.y / 2.0).cos();
        let c3 = (euler.z / 2.0).cos();
        let s1 = (euler.x / 2.0).sin();
        let s2 = (euler.y / 2.0).sin();
        let s3 = (euler.z / 2.0).sin();

        let (x, y, z, w) = match euler.order {
            RotationOrder::XYZ => (
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            RotationOrder::YXZ => (
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            RotationOrder::ZXY => (
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            RotationOrder::ZYX => (
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            RotationOrder::YZX => (
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            RotationOrder::XZY => (
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
        };
        self.set(x, y, z, w)
    }

    /// Rotation of `angle` radians about `axis`, which must be normalized.
    pub fn set_from_axis_angle(&mut self, axis: Vector3, angle: f64) -> &mut Self {
        let half = angle / 2.0;
        let s = half.sin();
        self.set(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Read the rotation from the upper 3x3 of `m`, which must be unscaled.
    pub fn set_from_rotation_matrix(&mut self, m: &Matrix4) -> &mut Self {
        let te = &m.elements;
        let (m11, m12, m13) = (te[0], te[4], te[8]);
        let (m21, m22, m23) = (te[1], te[5], te[9]);
        let (m31, m32, m33) = (te[2], te[6], te[10]);
        let trace = m11 + m22 + m33;

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            self.set(
                (m32 - m23) * s,
                (m13 - m31) * s,
                (m21 - m12) * s,
                0.25 / s,
            )
        } else if m11 > m22 && m11 > m33 {
            let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
            self.set(
                0.25 * s,
                (m12 + m21) / s,
                (m13 + m31) / s,
                (m32 - m23) / s,
            )
        } else if m22 > m33 {
            let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
            self.set(
                (m12 + m21) / s,
                0.25 * s,
                (m23 + m32) / s,
                (m13 - m31) / s,
            )
        } else {
            let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
            self.set(
                (m13 + m31) / s,
                (m23 + m32) / s,
                0.25 * s,
                (m21 - m12) / s,
            )
        }
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`.
    pub fn set_from_unit_vectors(&mut self, from: Vector3, to: Vector3) -> &mut Self {
        const EPS: f64 = 0.000001;

        let mut r = from.dot(to) + 1.0;
        let axis = if r < EPS {
            // opposite vectors: pick any perpendicular axis
            r = 0.0;
            if from.x.abs() > from.z.abs() {
                Vector3::new(-from.y, from.x, 0.0)
            } else {
                Vector3::new(0.0, -from.z, from.y)
            }
        } else {
            from.cross(to)
        };

        *self = Self::new(axis.x, axis.y, axis.z, r).normalize();
        self
    }

    #[must_use]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        self.conjugate().normalize()
    }

    pub fn dot(self, q: Self) -> f64 {
        self.x * q.x + self.y * q.y + self.z * q.z + self.w * q.w
    }

    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    /// Scale to unit length. A zero quaternion becomes the identity.
    #[must_use]
    pub fn normalize(self) -> Self {
        let l = self.length();
        if l == 0.0 {
            Self::IDENTITY
        } else {
            let inv = 1.0 / l;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        }
    }

    /// Hamilton product `self * q`.
    #[must_use]
    pub fn multiply(self, q: Self) -> Self {
        Self::multiply_quaternions(self, q)
    }

    pub fn multiply_quaternions(a: Self, b: Self) -> Self {
        let (qax, qay, qaz, qaw) = (a.x, a.y, a.z, a.w);
        let (qbx, qby, qbz, qbw) = (b.x, b.y, b.z, b.w);
        Self::new(
            qax * qbw + qaw * qbx + qay * qbz - qaz * qby,
            qay * qbw + qaw * qby + qaz * qbx - qax * qbz,
            qaz * qbw + qaw * qbz + qax * qby - qay * qbx,
            qaw * qbw - qax * qbx - qay * qby - qaz * qbz,
        )
    }

    /// Spherical interpolation along the shorter arc.
    #[must_use]
    pub fn slerp(self, qb: Self, t: f64) -> Self {
        if t == 0.0 {
            return self;
        }
        if t == 1.0 {
            return qb;
        }

        let mut cos_half_theta = self.dot(qb);
        let qb = if cos_half_theta < 0.0 {
            cos_half_theta = -cos_half_theta;
            -qb
        } else {
            qb
        };

        if cos_half_theta >= 1.0 {
            return self;
        }

        let sqr_sin_half_theta = 1.0 - cos_half_theta * cos_half_theta;
        if sqr_sin_half_theta <= f64::EPSILON {
            let s = 1.0 - t;
            return Self::new(
                s * self.x + t * qb.x,
                s * self.y + t * qb.y,
                s * self.z + t * qb.z,
                s * self.w + t * qb.w,
            )
            .normalize();
        }

        let sin_half_theta = sqr_sin_half_theta.sqrt();
        let half_theta = sin_half_theta.atan2(cos_half_theta);
        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;

        Self::new(
            self.x * ratio_a + qb.x * ratio_b,
            self.y * ratio_a + qb.y * ratio_b,
            self.z * ratio_a + qb.z * ratio_b,
            self.w * ratio_a + qb.w * ratio_b,
        )
    }

    /// Slerp over raw `[x, y, z, w]` runs stored in flat arrays.
    ///
    /// Writes the blend of `src0[src_offset0..]` and `src1[src_offset1..]`
    /// into `dst[dst_offset..]`. Near-parallel inputs fall back to a
    /// normalized linear blend.
    pub fn slerp_flat(
        dst: &mut [f64],
        dst_offset: usize,
        src0: &[f64],
        src_offset0: usize,
        src1: &[f64],
        src_offset1: usize,
        t: f64,
    ) -> Result<()> {
        check_run(dst, dst_offset)?;
        check_run(src0, src_offset0)?;
        check_run(src1, src_offset1)?;

        let (mut x0, mut y0, mut z0, mut w0) = (
            src0[src_offset0],
            src0[src_offset0 + 1],
            src0[src_offset0 + 2],
            src0[src_offset0 + 3],
        );
        let (x1, y1, z1, w1) = (
            src1[src_offset1],
            src1[src_offset1 + 1],
            src1[src_offset1 + 2],
            src1[src_offset1 + 3],
        );

        if w0 != w1 || x0 != x1 || y0 != y1 || z0 != z1 {
            let mut s = 1.0 - t;
            let cos = x0 * x1 + y0 * y1 + z0 * z1 + w0 * w1;
            let dir = if cos >= 0.0 { 1.0 } else { -1.0 };
            let sqr_sin = 1.0 - cos * cos;

            let mut t = t;
            if sqr_sin > f64::EPSILON {
                let sin = sqr_sin.sqrt();
                let len = sin.atan2(cos * dir);
                s = (s * len).sin() / sin;
                t = (t * len).sin() / sin;
            }

            let t_dir = t * dir;
            x0 = x0 * s + x1 * t_dir;
            y0 = y0 * s + y1 * t_dir;
            z0 = z0 * s + z1 * t_dir;
            w0 = w0 * s + w1 * t_dir;

            // linear fallback taken: renormalize
            if s == 1.0 - t {
                let f = 1.0 / (x0 * x0 + y0 * y0 + z0 * z0 + w0 * w0).sqrt();
                x0 *= f;
                y0 *= f;
                z0 *= f;
                w0 *= f;
            }
        }

        dst[dst_offset] = x0;
        dst[dst_offset + 1] = y0;
        dst[dst_offset + 2] = z0;
        dst[dst_offset + 3] = w0;
        Ok(())
    }

    pub fn from_array(array: &[f64], offset: usize) -> Self {
        Self::new(
            array[offset],
            array[offset + 1],
            array[offset + 2],
            array[offset + 3],
        )
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// True when both represent the same rotation within `epsilon`,
    /// treating `q` and `-q` as equal.
    pub fn approx_eq(self, q: Self, epsilon: f64) -> bool {
        let close = |a: Self, b: Self| {
            (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs() + (a.w - b.w).abs() < epsilon
        };
        close(self, q) || close(self, -q)
    }
}

fn check_run(array: &[f64], offset: usize) -> Result<()> {
    if array.len() < offset + 4 {
        return Err(MathError::ArrayTooShort {
            needed: 4,
            offset,
            len: array.len(),
        });
    }
    Ok(())
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl Neg for Quaternion {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_zero_is_identity() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0).normalize();
        assert_eq!(q, Quaternion::IDENTITY);
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0).normalize();
        assert!((q.length_sq() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_cancels() {
        let q = Quaternion::from_axis_angle(Vector3::new(0.0, 0.6, 0.8), 1.1);
        let p = q * q.inverse();
        assert!(p.approx_eq(Quaternion::IDENTITY, 1e-12));
    }

    #[test]
    fn test_multiply_composes_rotations() {
        let a = Quaternion::from_axis_angle(Vector3::Z, FRAC_PI_2);
        let b = Quaternion::from_axis_angle(Vector3::Z, FRAC_PI_2);
        let c = a * b;
        assert!(c.approx_eq(Quaternion::from_axis_angle(Vector3::Z, PI), 1e-12));
    }

    #[test]
    fn test_unit_vectors() {
        let mut q = Quaternion::IDENTITY;
        q.set_from_unit_vectors(Vector3::X, Vector3::Y);
        assert!(Vector3::X.apply_quaternion(&q).approx_eq(Vector3::Y, 1e-12));

        q.set_from_unit_vectors(Vector3::X, -Vector3::X);
        assert!(Vector3::X.apply_quaternion(&q).approx_eq(-Vector3::X, 1e-12));
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(Vector3::Y, FRAC_PI_2);
        assert_eq!(a.slerp(b, 0.0), a);
        assert_eq!(a.slerp(b, 1.0), b);
        let mid = a.slerp(b, 0.5);
        assert!(mid.approx_eq(Quaternion::from_axis_angle(Vector3::Y, PI / 4.0), 1e-12));
    }

    #[test]
    fn test_slerp_takes_short_path() {
        let a = Quaternion::IDENTITY;
        let b = -Quaternion::from_axis_angle(Vector3::Y, 0.4);
        let mid = a.slerp(b, 0.5);
        assert!(mid.approx_eq(Quaternion::from_axis_angle(Vector3::Y, 0.2), 1e-12));
    }

    #[test]
    fn test_slerp_flat_matches_slerp() {
        let a = Quaternion::from_axis_angle(Vector3::X, 0.3);
        let b = Quaternion::from_axis_angle(Vector3::new(0.0, 0.6, 0.8), -1.2);
        let src0 = [9.0, a.x, a.y, a.z, a.w];
        let src1 = [b.x, b.y, b.z, b.w];
        let mut dst = [0.0; 6];
        for &t in &[0.0, 0.25, 0.5, 0.9, 1.0] {
            Quaternion::slerp_flat(&mut dst, 2, &src0, 1, &src1, 0, t).unwrap();
            let flat = Quaternion::from_array(&dst, 2);
            assert!(flat.approx_eq(a.slerp(b, t), 1e-9), "t = {t}");
        }
    }

    #[test]
    fn test_slerp_flat_near_identical_stays_unit() {
        let a = Quaternion::from_axis_angle(Vector3::X, 0.3);
        let b = Quaternion::from_axis_angle(Vector3::X, 0.3 + 1e-10);
        let mut dst = [0.0; 4];
        Quaternion::slerp_flat(&mut dst, 0, &a.to_array(), 0, &b.to_array(), 0, 0.5).unwrap();
        let q = Quaternion::from_array(&dst, 0);
        assert!((q.length() - 1.0).abs() < 1e-12);
        assert!(!q.x.is_nan());
    }

    #[test]
    fn test_slerp_flat_rejects_short_arrays() {
        let mut dst = [0.0; 3];
        let err = Quaternion::slerp_flat(&mut dst, 0, &[0.0; 4], 0, &[0.0; 4], 0, 0.5).unwrap_err();
        assert_eq!(
            err,
            MathError::ArrayTooShort {
                needed: 4,
                offset: 0,
                len: 3
            }
        );
    }

    #[test]
    fn test_rotation_matrix_round_trip() {
        let q = Quaternion::from_axis_angle(Vector3::new(1.0, 2.0, -2.0).normalize(), 2.5);
        let mut m = Matrix4::identity();
        m.make_rotation_from_quaternion(&q);
        assert!(Quaternion::from_rotation_matrix(&m).approx_eq(q, 1e-9));
    }
}
