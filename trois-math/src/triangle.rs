//! Triangle helpers used by face normals and ray picking
use crate::{Plane, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triangle {
    pub a: Vector3,
    pub b: Vector3,
    pub c: Vector3,
}

impl Triangle {
    pub const fn new(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self { a, b, c }
    }

    /// Unit normal of the counter-clockwise winding `a`, `b`, `c`.
    /// Degenerate triangles give the zero vector.
    pub fn normal_of(a: Vector3, b: Vector3, c: Vector3) -> Vector3 {
        let n = (c - b).cross(a - b);
        let length_sq = n.length_sq();
        if length_sq > 0.0 {
            n * (1.0 / length_sq.sqrt())
        } else {
            Vector3::ZERO
        }
    }

    /// Barycentric weights of `point` relative to `a`, `b`, `c`.
    ///
    /// A degenerate triangle yields the sentinel `(-2, -1, -1)`, which no
    /// containment test accepts.
    pub fn barycoord_of(point: Vector3, a: Vector3, b: Vector3, c: Vector3) -> Vector3 {
        let v0 = c - a;
        let v1 = b - a;
        let v2 = point - a;

        let dot00 = v0.dot(v0);
        let dot01 = v0.dot(v1);
        let dot02 = v0.dot(v2);
        let dot11 = v1.dot(v1);
        let dot12 = v1.dot(v2);

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom == 0.0 {
            return Vector3::new(-2.0, -1.0, -1.0);
        }

        let inv_denom = 1.0 / denom;
        let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
        let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;

        Vector3::new(1.0 - u - v, v, u)
    }

    /// Inclusive of the edges.
    pub fn contains(point: Vector3, a: Vector3, b: Vector3, c: Vector3) -> bool {
        let bary = Self::barycoord_of(point, a, b, c);
        bary.x >= 0.0 && bary.y >= 0.0 && bary.x + bary.y <= 1.0
    }

    pub fn set(&mut self, a: Vector3, b: Vector3, c: Vector3) -> &mut Self {
        self.a = a;
        self.b = b;
        self.c = c;
        self
    }

    pub fn set_from_points_and_indices(
        &mut self,
        points: &[Vector3],
        i0: usize,
        i1: usize,
        i2: usize,
    ) -> &mut Self {
        self.set(points[i0], points[i1], points[i2])
    }

    pub fn area(&self) -> f64 {
        (self.c - self.b).cross(self.a - self.b).length() * 0.5
    }

    pub fn midpoint(&self) -> Vector3 {
        (self.a + self.b + self.c) * (1.0 / 3.0)
    }

    pub fn normal(&self) -> Vector3 {
        Self::normal_of(self.a, self.b, self.c)
    }

    pub fn plane(&self) -> Plane {
        Plane::from_coplanar_points(self.a, self.b, self.c)
    }

    pub fn barycoord_from_point(&self, point: Vector3) -> Vector3 {
        Self::barycoord_of(point, self.a, self.b, self.c)
    }

    pub fn contains_point(&self, point: Vector3) -> bool {
        Self::contains(point, self.a, self.b, self.c)
    }

    pub fn equals(&self, t: &Triangle) -> bool {
        self == t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right() -> Triangle {
        Triangle::new(Vector3::ZERO, Vector3::X, Vector3::Y)
    }

    #[test]
    fn test_normal_area_midpoint() {
        let t = right();
        assert_eq!(t.normal(), Vector3::Z);
        assert_eq!(t.area(), 0.5);
        assert!(t.midpoint().approx_eq(Vector3::new(1.0 / 3.0, 1.0 / 3.0, 0.0), 1e-12));

        let degenerate = Triangle::new(Vector3::ZERO, Vector3::X, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(degenerate.normal(), Vector3::ZERO);
        assert_eq!(degenerate.area(), 0.0);
    }

    #[test]
    fn test_barycoord() {
        let t = right();
        assert_eq!(t.barycoord_from_point(t.a), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(t.barycoord_from_point(t.b), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(t.barycoord_from_point(t.c), Vector3::new(0.0, 0.0, 1.0));

        let degenerate = Triangle::new(Vector3::ZERO, Vector3::ZERO, Vector3::ZERO);
        assert_eq!(degenerate.barycoord_from_point(Vector3::ONE), Vector3::new(-2.0, -1.0, -1.0));
        assert!(!degenerate.contains_point(Vector3::ZERO));
    }

    #[test]
    fn test_contains_point() {
        let t = right();
        assert!(t.contains_point(Vector3::new(0.25, 0.25, 0.0)));
        assert!(t.contains_point(Vector3::new(0.5, 0.5, 0.0)));
        assert!(!t.contains_point(Vector3::new(1.0, 1.0, 0.0)));
        assert!(!t.contains_point(Vector3::new(-0.1, 0.5, 0.0)));
    }

    #[test]
    fn test_plane_and_indices() {
        let points = [Vector3::Y, Vector3::ZERO, Vector3::X];
        let mut t = Triangle::default();
        t.set_from_points_and_indices(&points, 1, 2, 0);
        assert_eq!(t, right());
        let plane = t.plane();
        assert_eq!(plane.normal, Vector3::Z);
        assert_eq!(plane.distance_to_point(Vector3::new(3.0, 3.0, 2.0)), 2.0);
    }
}
