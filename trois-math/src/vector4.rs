//! Four component vector used for homogeneous points, tangents and skin data
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::{Matrix4, Quaternion, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Vector4 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Vector4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_vector3(v: Vector3, w: f64) -> Self {
        Self::new(v.x, v.y, v.z, w)
    }

    pub fn xyz(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn set(&mut self, x: f64, y: f64, z: f64, w: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self.w = w;
        self
    }

    pub fn set_component(&mut self, index: usize, value: f64) -> &mut Self {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            3 => self.w = value,
            _ => panic!("Vector4 component index out of range: {index}"),
        }
        self
    }

    pub fn component(&self, index: usize) -> f64 {
        match index {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            3 => self.w,
            _ => panic!("Vector4 component index out of range: {index}"),
        }
    }

    #[must_use]
    pub fn multiply_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }

    #[must_use]
    pub fn divide_scalar(self, s: f64) -> Self {
        if s != 0.0 {
            self.multiply_scalar(1.0 / s)
        } else {
            Self::new(0.0, 0.0, 0.0, 1.0)
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }

    pub fn dot(self, v: Self) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z + self.w * v.w
    }

    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn length_manhattan(self) -> f64 {
        self.x.abs() + self.y.abs() + self.z.abs() + self.w.abs()
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        self.divide_scalar(self.length())
    }

    #[must_use]
    pub fn lerp(self, target: Self, t: f64) -> Self {
        Self::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
            self.z + (target.z - self.z) * t,
            self.w + (target.w - self.w) * t,
        )
    }

    #[must_use]
    pub fn apply_matrix4(self, m: &Matrix4) -> Self {
        let e = &m.elements;
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);
        Self::new(
            e[0] * x + e[4] * y + e[8] * z + e[12] * w,
            e[1] * x + e[5] * y + e[9] * z + e[13] * w,
            e[2] * x + e[6] * y + e[10] * z + e[14] * w,
            e[3] * x + e[7] * y + e[11] * z + e[15] * w,
        )
    }

    /// Axis in xyz, angle in w. Assumes `q` is normalized.
    pub fn set_axis_angle_from_quaternion(&mut self, q: &Quaternion) -> &mut Self {
        self.w = 2.0 * q.w.acos();
        let s = (1.0 - q.w * q.w).sqrt();
        if s < 0.0001 {
            self.x = 1.0;
            self.y = 0.0;
            self.z = 0.0;
        } else {
            self.x = q.x / s;
            self.y = q.y / s;
            self.z = q.z / s;
        }
        self
    }

    /// Axis in xyz, angle in w. Assumes the upper 3x3 of `m` is a pure rotation.
    pub fn set_axis_angle_from_rotation_matrix(&mut self, m: &Matrix4) -> &mut Self {
        const EPSILON: f64 = 0.01;
        const EPSILON2: f64 = 0.1;
        const HALF_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

        let te = &m.elements;
        let (m11, m12, m13) = (te[0], te[4], te[8]);
        let (m21, m22, m23) = (te[1], te[5], te[9]);
        let (m31, m32, m33) = (te[2], te[6], te[10]);

        if (m12 - m21).abs() < EPSILON && (m13 - m31).abs() < EPSILON && (m23 - m32).abs() < EPSILON {
            // symmetric: angle is 0 or 180
            if (m12 + m21).abs() < EPSILON2
                && (m13 + m31).abs() < EPSILON2
                && (m23 + m32).abs() < EPSILON2
                && (m11 + m22 + m33 - 3.0).abs() < EPSILON2
            {
                return self.set(1.0, 0.0, 0.0, 0.0);
            }

            let xx = (m11 + 1.0) / 2.0;
            let yy = (m22 + 1.0) / 2.0;
            let zz = (m33 + 1.0) / 2.0;
            let xy = (m12 + m21) / 4.0;
            let xz = (m13 + m31) / 4.0;
            let yz = (m23 + m32) / 4.0;

            let (x, y, z) = if xx > yy && xx > zz {
                if xx < EPSILON {
                    (0.0, HALF_SQRT2, HALF_SQRT2)
                } else {
                    let x = xx.sqrt();
                    (x, xy / x, xz / x)
                }
            } else if yy > zz {
                if yy < EPSILON {
                    (HALF_SQRT2, 0.0, HALF_SQRT2)
                } else {
                    let y = yy.sqrt();
                    (xy / y, y, yz / y)
                }
            } else if zz < EPSILON {
                (HALF_SQRT2, HALF_SQRT2, 0.0)
            } else {
                let z = zz.sqrt();
                (xz / z, yz / z, z)
            };
            return self.set(x, y, z, std::f64::consts::PI);
        }

        let mut s = ((m32 - m23) * (m32 - m23) + (m13 - m31) * (m13 - m31) + (m21 - m12) * (m21 - m12)).sqrt();
        if s.abs() < 0.001 {
            s = 1.0;
        }
        self.x = (m32 - m23) / s;
        self.y = (m13 - m31) / s;
        self.z = (m21 - m12) / s;
        self.w = ((m11 + m22 + m33 - 1.0) / 2.0).acos();
        self
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
}

impl Add for Vector4 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Vector4 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Mul<f64> for Vector4 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        self.multiply_scalar(s)
    }
}

impl Neg for Vector4 {
    type Output = Self;
    fn neg(self) -> Self {
        self.negate()
    }
}

impl AddAssign for Vector4 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector4 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
