//! Three component vector used for positions, directions and scales
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::math_utils::clamp;
use crate::{Matrix3, Matrix4, Quaternion};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    pub fn set(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    pub fn set_x(&mut self, x: f64) -> &mut Self {
        self.x = x;
        self
    }

    pub fn set_y(&mut self, y: f64) -> &mut Self {
        self.y = y;
        self
    }

    pub fn set_z(&mut self, z: f64) -> &mut Self {
        self.z = z;
        self
    }

    /// Set a component by index (0 = x, 1 = y, 2 = z).
    ///
    /// Panics on any other index, like slice indexing does.
    pub fn set_component(&mut self, index: usize, value: f64) -> &mut Self {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => panic!("Vector3 component index out of range: {index}"),
        }
        self
    }

    pub fn component(&self, index: usize) -> f64 {
        match index {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("Vector3 component index out of range: {index}"),
        }
    }

    #[must_use]
    pub fn add_scalar(self, s: f64) -> Self {
        Self::new(self.x + s, self.y + s, self.z + s)
    }

    /// Component-wise product.
    #[must_use]
    pub fn multiply(self, v: Self) -> Self {
        Self::new(self.x * v.x, self.y * v.y, self.z * v.z)
    }

    #[must_use]
    pub fn multiply_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Component-wise quotient.
    #[must_use]
    pub fn divide(self, v: Self) -> Self {
        Self::new(self.x / v.x, self.y / v.y, self.z / v.z)
    }

    /// Divide by a scalar; dividing by zero yields the zero vector.
    #[must_use]
    pub fn divide_scalar(self, s: f64) -> Self {
        if s != 0.0 {
            self.multiply_scalar(1.0 / s)
        } else {
            Self::ZERO
        }
    }

    #[must_use]
    pub fn min(self, v: Self) -> Self {
        Self::new(self.x.min(v.x), self.y.min(v.y), self.z.min(v.z))
    }

    #[must_use]
    pub fn max(self, v: Self) -> Self {
        Self::new(self.x.max(v.x), self.y.max(v.y), self.z.max(v.z))
    }

    /// Clamp each component into `[min, max]`; assumes `min <= max`.
    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self::new(
            clamp(self.x, min.x, max.x),
            clamp(self.y, min.y, max.y),
            clamp(self.z, min.z, max.z),
        )
    }

    #[must_use]
    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor(), self.z.floor())
    }

    #[must_use]
    pub fn ceil(self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil(), self.z.ceil())
    }

    #[must_use]
    pub fn round(self) -> Self {
        Self::new(self.x.round(), self.y.round(), self.z.round())
    }

    #[must_use]
    pub fn round_to_zero(self) -> Self {
        Self::new(self.x.trunc(), self.y.trunc(), self.z.trunc())
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    pub fn dot(self, v: Self) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    #[must_use]
    pub fn cross(self, v: Self) -> Self {
        Self::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn length_manhattan(self) -> f64 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    #[must_use]
    pub fn normalize(self) -> Self {
        self.divide_scalar(self.length())
    }

    /// Rescale to the given length. The zero vector stays zero.
    #[must_use]
    pub fn set_length(self, l: f64) -> Self {
        let old = self.length();
        if old != 0.0 && l != old {
            self.multiply_scalar(l / old)
        } else {
            self
        }
    }

    /// `self + (target - self) * t`, unclamped.
    #[must_use]
    pub fn lerp(self, target: Self, t: f64) -> Self {
        Self::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
            self.z + (target.z - self.z) * t,
        )
    }

    pub fn distance_to(self, v: Self) -> f64 {
        self.distance_to_squared(v).sqrt()
    }

    pub fn distance_to_squared(self, v: Self) -> f64 {
        (self - v).length_sq()
    }

    /// Angle between the two vectors in radians.
    pub fn angle_to(self, v: Self) -> f64 {
        let denominator = (self.length_sq() * v.length_sq()).sqrt();
        if denominator == 0.0 {
            return std::f64::consts::FRAC_PI_2;
        }
        clamp(self.dot(v) / denominator, -1.0, 1.0).acos()
    }

    #[must_use]
    pub fn project_on_vector(self, v: Self) -> Self {
        let denominator = v.length_sq();
        if denominator == 0.0 {
            return Self::ZERO;
        }
        v.multiply_scalar(v.dot(self) / denominator)
    }

    #[must_use]
    pub fn project_on_plane(self, plane_normal: Self) -> Self {
        self - self.project_on_vector(plane_normal)
    }

    /// Reflect off the plane orthogonal to `normal` (assumed unit length).
    #[must_use]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal.multiply_scalar(2.0 * self.dot(normal))
    }

    #[must_use]
    pub fn apply_matrix3(self, m: &Matrix3) -> Self {
        let e = &m.elements;
        Self::new(
            e[0] * self.x + e[3] * self.y + e[6] * self.z,
            e[1] * self.x + e[4] * self.y + e[7] * self.z,
            e[2] * self.x + e[5] * self.y + e[8] * self.z,
        )
    }

    /// Affine transform, ignoring the projective row.
    #[must_use]
    pub fn apply_matrix4(self, m: &Matrix4) -> Self {
        let e = &m.elements;
        Self::new(
            e[0] * self.x + e[4] * self.y + e[8] * self.z + e[12],
            e[1] * self.x + e[5] * self.y + e[9] * self.z + e[13],
            e[2] * self.x + e[6] * self.y + e[10] * self.z + e[14],
        )
    }

    /// Full projective transform with perspective divide.
    #[must_use]
    pub fn apply_projection(self, m: &Matrix4) -> Self {
        let e = &m.elements;
        let d = 1.0 / (e[3] * self.x + e[7] * self.y + e[11] * self.z + e[15]);
        Self::new(
            (e[0] * self.x + e[4] * self.y + e[8] * self.z + e[12]) * d,
            (e[1] * self.x + e[5] * self.y + e[9] * self.z + e[13]) * d,
            (e[2] * self.x + e[6] * self.y + e[10] * self.z + e[14]) * d,
        )
    }

    #[must_use]
    pub fn apply_quaternion(self, q: &Quaternion) -> Self {
        let (x, y, z) = (self.x, self.y, self.z);
        let (qx, qy, qz, qw) = (q.x, q.y, q.z, q.w);

        // q * v
        let ix = qw * x + qy * z - qz * y;
        let iy = qw * y + qz * x - qx * z;
        let iz = qw * z + qx * y - qy * x;
        let iw = -qx * x - qy * y - qz * z;

        // (q * v) * q^-1
        Self::new(
            ix * qw + iw * -qx + iy * -qz - iz * -qy,
            iy * qw + iw * -qy + iz * -qx - ix * -qz,
            iz * qw + iw * -qz + ix * -qy - iy * -qx,
        )
    }

    /// Rotate/scale by the upper 3x3 of `m` and normalize; translation is ignored.
    #[must_use]
    pub fn transform_direction(self, m: &Matrix4) -> Self {
        let e = &m.elements;
        Self::new(
            e[0] * self.x + e[4] * self.y + e[8] * self.z,
            e[1] * self.x + e[5] * self.y + e[9] * self.z,
            e[2] * self.x + e[6] * self.y + e[10] * self.z,
        )
        .normalize()
    }

    /// Translation column of `m`.
    pub fn from_matrix_position(m: &Matrix4) -> Self {
        Self::new(m.elements[12], m.elements[13], m.elements[14])
    }

    /// Lengths of the first three columns of `m`.
    pub fn from_matrix_scale(m: &Matrix4) -> Self {
        let sx = Self::from_matrix_column(m, 0).length();
        let sy = Self::from_matrix_column(m, 1).length();
        let sz = Self::from_matrix_column(m, 2).length();
        Self::new(sx, sy, sz)
    }

    /// First three entries of column `index` of `m`.
    pub fn from_matrix_column(m: &Matrix4, index: usize) -> Self {
        let offset = index * 4;
        Self::new(
            m.elements[offset],
            m.elements[offset + 1],
            m.elements[offset + 2],
        )
    }

    pub fn from_array(array: &[f64], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1], array[offset + 2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn write_to(self, array: &mut [f64], offset: usize) {
        array[offset] = self.x;
        array[offset + 1] = self.y;
        array[offset + 2] = self.z;
    }

    pub fn equals(self, v: Self) -> bool {
        self == v
    }

    /// Sum of absolute component differences is below `epsilon`.
    pub fn approx_eq(self, v: Self, epsilon: f64) -> bool {
        (self - v).length_manhattan() < epsilon
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        self.multiply_scalar(s)
    }
}

impl Mul<Vector3> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: Vector3) -> Self {
        self.multiply(rhs)
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;
    fn div(self, s: f64) -> Self {
        self.divide_scalar(s)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        self.negate()
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<f64> for Vector3 {
    fn mul_assign(&mut self, s: f64) {
        *self = *self * s;
    }
}

impl DivAssign<f64> for Vector3 {
    fn div_assign(&mut self, s: f64) {
        *self = *self / s;
    }
}
