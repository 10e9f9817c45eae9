//! Bounding sphere
use crate::{Box3, Matrix4, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: f64,
}

impl Sphere {
    pub const fn new(center: Vector3, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn set(&mut self, center: Vector3, radius: f64) -> &mut Self {
        self.center = center;
        self.radius = radius;
        self
    }

    /// Enclose `points`. Without an explicit `center` the center of their
    /// bounding box is used; the radius is the farthest point's distance.
    pub fn set_from_points(&mut self, points: &[Vector3], center: Option<Vector3>) -> &mut Self {
        let center = center.unwrap_or_else(|| Box3::from_points(points).center());
        let max_radius_sq = points
            .iter()
            .map(|p| center.distance_to_squared(*p))
            .fold(0.0, f64::max);

        self.center = center;
        self.radius = max_radius_sq.sqrt();
        self
    }

    pub fn from_points(points: &[Vector3], center: Option<Vector3>) -> Self {
        let mut s = Self::default();
        s.set_from_points(points, center);
        s
    }

    /// A non-positive radius encloses nothing.
    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0
    }

    pub fn contains_point(&self, p: Vector3) -> bool {
        p.distance_to_squared(self.center) <= self.radius * self.radius
    }

    /// Signed: negative inside the sphere.
    pub fn distance_to_point(&self, p: Vector3) -> f64 {
        p.distance_to(self.center) - self.radius
    }

    pub fn intersects_sphere(&self, s: &Sphere) -> bool {
        let radius_sum = self.radius + s.radius;
        s.center.distance_to_squared(self.center) <= radius_sum * radius_sum
    }

    /// Pull `p` onto the surface when it lies outside.
    pub fn clamp_point(&self, p: Vector3) -> Vector3 {
        if self.center.distance_to_squared(p) > self.radius * self.radius {
            (p - self.center).normalize() * self.radius + self.center
        } else {
            p
        }
    }

    pub fn bounding_box(&self) -> Box3 {
        Box3::new(
            self.center.add_scalar(-self.radius),
            self.center.add_scalar(self.radius),
        )
    }

    /// Transform the center; the radius grows by the largest axis scale.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        self.center = self.center.apply_matrix4(m);
        self.radius *= m.max_scale_on_axis();
        self
    }

    pub fn translate(&mut self, offset: Vector3) -> &mut Self {
        self.center += offset;
        self
    }

    pub fn equals(&self, s: &Sphere) -> bool {
        self == s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(Sphere::default().is_empty());
        assert!(!Sphere::new(Vector3::ZERO, 1.0).is_empty());
    }

    #[test]
    fn test_set_from_points() {
        let points = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.5, 0.0),
        ];
        let s = Sphere::from_points(&points, None);
        assert_eq!(s.center, Vector3::new(0.0, 0.25, 0.0));
        assert!((s.radius - (1.0f64 + 0.0625).sqrt()).abs() < 1e-12);

        let around_origin = Sphere::from_points(&points, Some(Vector3::ZERO));
        assert_eq!(around_origin.radius, 1.0);
    }

    #[test]
    fn test_point_queries() {
        let s = Sphere::new(Vector3::ONE, 1.0);
        assert!(s.contains_point(Vector3::new(1.0, 1.0, 2.0)));
        assert!(!s.contains_point(Vector3::ZERO));
        assert_eq!(s.distance_to_point(Vector3::new(1.0, 1.0, 4.0)), 2.0);
        assert_eq!(s.distance_to_point(Vector3::ONE), -1.0);
        assert_eq!(s.clamp_point(Vector3::new(1.0, 1.0, 5.0)), Vector3::new(1.0, 1.0, 2.0));
        assert_eq!(s.clamp_point(Vector3::ONE), Vector3::ONE);
    }

    #[test]
    fn test_intersects_sphere() {
        let a = Sphere::new(Vector3::ZERO, 1.0);
        assert!(a.intersects_sphere(&Sphere::new(Vector3::new(2.0, 0.0, 0.0), 1.0)));
        assert!(!a.intersects_sphere(&Sphere::new(Vector3::new(2.1, 0.0, 0.0), 1.0)));
    }

    #[test]
    fn test_bounding_box_and_transform() {
        let mut s = Sphere::new(Vector3::ZERO, 1.0);
        assert_eq!(s.bounding_box(), Box3::new(Vector3::splat(-1.0), Vector3::ONE));

        let mut m = Matrix4::identity();
        m.make_scale(1.0, 3.0, 2.0);
        m.set_position(Vector3::new(0.0, 0.0, 5.0));
        s.apply_matrix4(&m);
        assert_eq!(s, Sphere::new(Vector3::new(0.0, 0.0, 5.0), 3.0));

        s.translate(Vector3::new(0.0, 0.0, -5.0));
        assert_eq!(s.center, Vector3::ZERO);
    }
}
