//! Infinite plane in Hessian normal form
use crate::{Line3, Matrix3, Matrix4, Sphere, Vector3};

/// Points `p` on the plane satisfy `normal · p + constant == 0`.
///
/// Distance queries assume `normal` has unit length; call
/// [`Plane::normalize`] after [`Plane::set_components`] if it may not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub constant: f64,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vector3::X, 0.0)
    }
}

impl Plane {
    pub const fn new(normal: Vector3, constant: f64) -> Self {
        Self { normal, constant }
    }

    pub fn set(&mut self, normal: Vector3, constant: f64) -> &mut Self {
        self.normal = normal;
        self.constant = constant;
        self
    }

    pub fn set_components(&mut self, x: f64, y: f64, z: f64, w: f64) -> &mut Self {
        self.normal.set(x, y, z);
        self.constant = w;
        self
    }

    pub fn set_from_normal_and_coplanar_point(&mut self, normal: Vector3, point: Vector3) -> &mut Self {
        self.normal = normal;
        self.constant = -point.dot(normal);
        self
    }

    /// Plane through three points, facing the side from which `a`, `b`, `c`
    /// appear counter-clockwise.
    pub fn set_from_coplanar_points(&mut self, a: Vector3, b: Vector3, c: Vector3) -> &mut Self {
        let normal = (c - b).cross(a - b).normalize();
        self.set_from_normal_and_coplanar_point(normal, a)
    }

    pub fn from_coplanar_points(a: Vector3, b: Vector3, c: Vector3) -> Self {
        let mut plane = Self::default();
        plane.set_from_coplanar_points(a, b, c);
        plane
    }

    /// Scale so the normal has unit length. A zero normal is left as is.
    pub fn normalize(&mut self) -> &mut Self {
        let length = self.normal.length();
        if length == 0.0 {
            return self;
        }
        let inverse_length = 1.0 / length;
        self.normal *= inverse_length;
        self.constant *= inverse_length;
        self
    }

    pub fn negate(&mut self) -> &mut Self {
        self.constant = -self.constant;
        self.normal = -self.normal;
        self
    }

    /// Signed distance, positive on the side the normal points to.
    pub fn distance_to_point(&self, point: Vector3) -> f64 {
        self.normal.dot(point) + self.constant
    }

    pub fn distance_to_sphere(&self, sphere: &Sphere) -> f64 {
        self.distance_to_point(sphere.center) - sphere.radius
    }

    /// Closest point on the plane.
    pub fn project_point(&self, point: Vector3) -> Vector3 {
        point - self.ortho_point(point)
    }

    /// Offset from the plane to `point` along the normal.
    pub fn ortho_point(&self, point: Vector3) -> Vector3 {
        self.normal * self.distance_to_point(point)
    }

    /// True when the segment endpoints lie strictly on opposite sides.
    pub fn intersects_line(&self, line: &Line3) -> bool {
        let start = self.distance_to_point(line.start);
        let end = self.distance_to_point(line.end);
        (start < 0.0 && end > 0.0) || (end < 0.0 && start > 0.0)
    }

    /// Crossing point of the segment with the plane.
    ///
    /// A segment parallel to the plane only hits when it lies in it, in
    /// which case `line.start` is returned.
    pub fn intersect_line(&self, line: &Line3) -> Option<Vector3> {
        let direction = line.delta();
        let denominator = self.normal.dot(direction);

        if denominator == 0.0 {
            return (self.distance_to_point(line.start) == 0.0).then_some(line.start);
        }

        let t = -(line.start.dot(self.normal) + self.constant) / denominator;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        Some(direction * t + line.start)
    }

    /// The point on the plane closest to the origin.
    pub fn coplanar_point(&self) -> Vector3 {
        self.normal * -self.constant
    }

    /// Transform by `m`. The normal is carried by the inverse-transpose of
    /// `m`, computed unless supplied, and renormalized.
    pub fn apply_matrix4(&mut self, m: &Matrix4, normal_matrix: Option<&Matrix3>) -> &mut Self {
        let normal_matrix = normal_matrix.copied().unwrap_or_else(|| Matrix3::normal_matrix(m));
        let normal = self.normal.apply_matrix3(&normal_matrix).normalize();
        let point = self.coplanar_point().apply_matrix4(m);
        self.set_from_normal_and_coplanar_point(normal, point)
    }

    pub fn translate(&mut self, offset: Vector3) -> &mut Self {
        self.constant -= offset.dot(self.normal);
        self
    }

    pub fn equals(&self, plane: &Plane) -> bool {
        self == plane
    }
}
