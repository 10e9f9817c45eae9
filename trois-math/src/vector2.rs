//! Two component vector used for UVs and 2D bounds
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::math_utils::clamp;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn set(&mut self, x: f64, y: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn set_component(&mut self, index: usize, value: f64) -> &mut Self {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            _ => panic!("Vector2 component index out of range: {index}"),
        }
        self
    }

    pub fn component(&self, index: usize) -> f64 {
        match index {
            0 => self.x,
            1 => self.y,
            _ => panic!("Vector2 component index out of range: {index}"),
        }
    }

    #[must_use]
    pub fn add_scalar(self, s: f64) -> Self {
        Self::new(self.x + s, self.y + s)
    }

    #[must_use]
    pub fn multiply_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
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
        Self::new(self.x.min(v.x), self.y.min(v.y))
    }

    #[must_use]
    pub fn max(self, v: Self) -> Self {
        Self::new(self.x.max(v.x), self.y.max(v.y))
    }

    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self::new(clamp(self.x, min.x, max.x), clamp(self.y, min.y, max.y))
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    pub fn dot(self, v: Self) -> f64 {
        self.x * v.x + self.y * v.y
    }

    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        self.divide_scalar(self.length())
    }

    #[must_use]
    pub fn set_length(self, l: f64) -> Self {
        let old = self.length();
        if old != 0.0 && l != old {
            self.multiply_scalar(l / old)
        } else {
            self
        }
    }

    pub fn distance_to(self, v: Self) -> f64 {
        self.distance_to_squared(v).sqrt()
    }

    pub fn distance_to_squared(self, v: Self) -> f64 {
        let dx = self.x - v.x;
        let dy = self.y - v.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn lerp(self, target: Self, t: f64) -> Self {
        Self::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
        )
    }

    pub fn from_array(array: &[f64], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1])
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn equals(self, v: Self) -> bool {
        self == v
    }
}

impl From<[f64; 2]> for Vector2 {
    fn from(arr: [f64; 2]) -> Self {
        Self::new(arr[0], arr[1])
    }
}

impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        self.multiply_scalar(s)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;
    fn div(self, s: f64) -> Self {
        self.divide_scalar(s)
    }
}

impl Neg for Vector2 {
    type Output = Self;
    fn neg(self) -> Self {
        self.negate()
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<f64> for Vector2 {
    fn mul_assign(&mut self, s: f64) {
        *self = *self * s;
    }
}
