//! Euler angles with an explicit rotation order
use std::fmt;
use std::str::FromStr;

use crate::math_utils::clamp;
use crate::{MathError, Matrix4, Quaternion, Vector3};

/// Order in which the three axis rotations are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum RotationOrder {
    #[default]
    XYZ,
    YXZ,
    ZXY,
    ZYX,
    YZX,
    XZY,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::XYZ,
        RotationOrder::YXZ,
        RotationOrder::ZXY,
        RotationOrder::ZYX,
        RotationOrder::YZX,
        RotationOrder::XZY,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RotationOrder::XYZ => "XYZ",
            RotationOrder::YXZ => "YXZ",
            RotationOrder::ZXY => "ZXY",
            RotationOrder::ZYX => "ZYX",
            RotationOrder::YZX => "YZX",
            RotationOrder::XZY => "XZY",
        }
    }
}

impl FromStr for RotationOrder {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RotationOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| MathError::InvalidEulerOrder(s.to_string()))
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rotation angles in radians about X, Y and Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub order: RotationOrder,
}

impl Euler {
    pub const fn new(x: f64, y: f64, z: f64, order: RotationOrder) -> Self {
        Self { x, y, z, order }
    }

    pub fn from_rotation_matrix(m: &Matrix4, order: RotationOrder) -> Self {
        let mut e = Self::default();
        e.set_from_rotation_matrix(m, order);
        e
    }

    pub fn from_quaternion(q: &Quaternion, order: RotationOrder) -> Self {
        let mut e = Self::default();
        e.set_from_quaternion(q, order);
        e
    }

    pub fn set(&mut self, x: f64, y: f64, z: f64, order: RotationOrder) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self.order = order;
        self
    }

    pub fn angles(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn set_angles(&mut self, v: Vector3) -> &mut Self {
        self.x = v.x;
        self.y = v.y;
        self.z = v.z;
        self
    }

    /// Extract angles from the upper 3x3 of `m`, which must be unscaled.
    ///
    /// Near gimbal lock (middle-axis cosine below 1e-5) the first or last
    /// angle is pinned to zero.
    pub fn set_from_rotation_matrix(&mut self, m: &Matrix4, order: RotationOrder) -> &mut Self {
        const LOCK: f64 = 0.99999;

        let te = &m.elements;
        let (m11, m12, m13) = (te[0], te[4], te[8]);
        let (m21, m22, m23) = (te[1], te[5], te[9]);
        let (m31, m32, m33) = (te[2], te[6], te[10]);

        let (x, y, z) = match order {
            RotationOrder::XYZ => {
                let y = clamp(m13, -1.0, 1.0).asin();
                if m13.abs() < LOCK {
                    ((-m23).atan2(m33), y, (-m12).atan2(m11))
                } else {
                    (m32.atan2(m22), y, 0.0)
                }
            }
            RotationOrder::YXZ => {
                let x = (-clamp(m23, -1.0, 1.0)).asin();
                if m23.abs() < LOCK {
                    (x, m13.atan2(m33), m21.atan2(m22))
                } else {
                    (x, (-m31).atan2(m11), 0.0)
                }
            }
            RotationOrder::ZXY => {
                let x = clamp(m32, -1.0, 1.0).asin();
                if m32.abs() < LOCK {
                    (x, (-m31).atan2(m33), (-m12).atan2(m22))
                } else {
                    (x, 0.0, m21.atan2(m11))
                }
            }
            RotationOrder::ZYX => {
                let y = (-clamp(m31, -1.0, 1.0)).asin();
                if m31.abs() < LOCK {
                    (m32.atan2(m33), y, m21.atan2(m11))
                } else {
                    (0.0, y, (-m12).atan2(m22))
                }
            }
            RotationOrder::YZX => {
                let z = clamp(m21, -1.0, 1.0).asin();
                if m21.abs() < LOCK {
                    ((-m23).atan2(m22), (-m31).atan2(m11), z)
                } else {
                    (0.0, m13.atan2(m33), z)
                }
            }
            RotationOrder::XZY => {
                let z = (-clamp(m12, -1.0, 1.0)).asin();
                if m12.abs() < LOCK {
                    (m32.atan2(m22), m13.atan2(m11), z)
                } else {
                    ((-m23).atan2(m33), 0.0, z)
                }
            }
        };

        self.set(x, y, z, order)
    }

    /// Goes through the rotation matrix so gimbal lock resolves exactly as
    /// in [`Euler::set_from_rotation_matrix`].
    pub fn set_from_quaternion(&mut self, q: &Quaternion, order: RotationOrder) -> &mut Self {
        let mut m = Matrix4::identity();
        m.make_rotation_from_quaternion(q);
        self.set_from_rotation_matrix(&m, order)
    }

    /// Re-express the same rotation in another order.
    pub fn reorder(&mut self, order: RotationOrder) -> &mut Self {
        let q = Quaternion::from_euler(self);
        self.set_from_quaternion(&q, order)
    }

    /// Equal angles and equal order.
    pub fn equals(&self, e: &Euler) -> bool {
        self == e
    }

    /// Same order and sum of absolute angle differences below `epsilon`.
    pub fn approx_eq(&self, e: &Euler, epsilon: f64) -> bool {
        self.order == e.order
            && (self.x - e.x).abs() + (self.y - e.y).abs() + (self.z - e.z).abs() < epsilon
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}
