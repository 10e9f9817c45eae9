//! Axis-aligned bounding box in 3D
use crate::{Matrix4, Sphere, Vector3};

/// Axis-aligned box given by its `min` and `max` corners.
///
/// The default box is empty: `min` is `+inf` and `max` is `-inf` on every
/// axis, so that expanding it by any point yields that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    pub min: Vector3,
    pub max: Vector3,
}

impl Default for Box3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box3 {
    pub const EMPTY: Self = Self {
        min: Vector3::splat(f64::INFINITY),
        max: Vector3::splat(f64::NEG_INFINITY),
    };

    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vector3]) -> Self {
        let mut b = Self::EMPTY;
        b.set_from_points(points);
        b
    }

    pub fn set(&mut self, min: Vector3, max: Vector3) -> &mut Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Smallest box containing all `points`; empty when there are none.
    pub fn set_from_points(&mut self, points: &[Vector3]) -> &mut Self {
        self.make_empty();
        for &p in points {
            self.expand_by_point(p);
        }
        self
    }

    pub fn set_from_center_and_size(&mut self, center: Vector3, size: Vector3) -> &mut Self {
        let half = size * 0.5;
        self.min = center - half;
        self.max = center + half;
        self
    }

    pub fn make_empty(&mut self) -> &mut Self {
        *self = Self::EMPTY;
        self
    }

    /// True when `max < min` on any axis.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn expand_by_point(&mut self, point: Vector3) -> &mut Self {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
        self
    }

    pub fn expand_by_vector(&mut self, v: Vector3) -> &mut Self {
        self.min -= v;
        self.max += v;
        self
    }

    pub fn expand_by_scalar(&mut self, s: f64) -> &mut Self {
        self.min = self.min.add_scalar(-s);
        self.max = self.max.add_scalar(s);
        self
    }

    /// Inclusive on all faces.
    pub fn contains_point(&self, p: Vector3) -> bool {
        !(p.x < self.min.x
            || p.x > self.max.x
            || p.y < self.min.y
            || p.y > self.max.y
            || p.z < self.min.z
            || p.z > self.max.z)
    }

    pub fn contains_box(&self, b: &Box3) -> bool {
        self.min.x <= b.min.x
            && b.max.x <= self.max.x
            && self.min.y <= b.min.y
            && b.max.y <= self.max.y
            && self.min.z <= b.min.z
            && b.max.z <= self.max.z
    }

    /// Position of `p` in box-relative units: 0 at `min`, 1 at `max`.
    /// Axes where the box is flat map to 0.
    pub fn get_parameter(&self, p: Vector3) -> Vector3 {
        let size = self.size();
        Vector3::new(
            axis_parameter(p.x - self.min.x, size.x),
            axis_parameter(p.y - self.min.y, size.y),
            axis_parameter(p.z - self.min.z, size.z),
        )
    }

    /// Touching boxes count as intersecting.
    pub fn intersects_box(&self, b: &Box3) -> bool {
        !(b.max.x < self.min.x
            || b.min.x > self.max.x
            || b.max.y < self.min.y
            || b.min.y > self.max.y
            || b.max.z < self.min.z
            || b.min.z > self.max.z)
    }

    pub fn clamp_point(&self, p: Vector3) -> Vector3 {
        p.clamp(self.min, self.max)
    }

    /// Zero for points inside the box.
    pub fn distance_to_point(&self, p: Vector3) -> f64 {
        self.clamp_point(p).distance_to(p)
    }

    /// Sphere through the corners, centered on the box.
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::new(self.center(), self.size().length() * 0.5)
    }

    /// Keep only the overlap; disjoint boxes leave `self` empty.
    pub fn intersect(&mut self, b: &Box3) -> &mut Self {
        self.min = self.min.max(b.min);
        self.max = self.max.min(b.max);
        self
    }

    pub fn union(&mut self, b: &Box3) -> &mut Self {
        self.min = self.min.min(b.min);
        self.max = self.max.max(b.max);
        self
    }

    /// Replace with the box around the eight transformed corners.
    /// An empty box stays empty.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        if self.is_empty() {
            return self;
        }

        let (lo, hi) = (self.min, self.max);
        let corners = [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
        .map(|c| c.apply_matrix4(m));

        self.set_from_points(&corners)
    }

    pub fn translate(&mut self, offset: Vector3) -> &mut Self {
        self.min += offset;
        self.max += offset;
        self
    }

    pub fn equals(&self, b: &Box3) -> bool {
        self == b
    }
}

fn axis_parameter(offset: f64, extent: f64) -> f64 {
    if extent == 0.0 {
        0.0
    } else {
        offset / extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Box3 {
        Box3::new(Vector3::ZERO, Vector3::ONE)
    }

    #[test]
    fn test_default_is_empty() {
        let b = Box3::default();
        assert!(b.is_empty());
        assert!(!b.contains_point(Vector3::ZERO));
        assert!(!unit().is_empty());
        assert!(!Box3::new(Vector3::ONE, Vector3::ONE).is_empty());
    }

    #[test]
    fn test_set_from_points() {
        let b = Box3::from_points(&[
            Vector3::new(-1.0, 2.0, 0.0),
            Vector3::new(3.0, -4.0, 1.0),
            Vector3::new(0.0, 0.0, -5.0),
        ]);
        assert_eq!(b.min, Vector3::new(-1.0, -4.0, -5.0));
        assert_eq!(b.max, Vector3::new(3.0, 2.0, 1.0));
        assert!(Box3::from_points(&[]).is_empty());
    }

    #[test]
    fn test_center_and_size() {
        let mut b = Box3::EMPTY;
        b.set_from_center_and_size(Vector3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(b.min, Vector3::new(0.0, -1.0, -2.0));
        assert_eq!(b.center(), Vector3::ONE);
        assert_eq!(b.size(), Vector3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_expand() {
        let mut b = unit();
        b.expand_by_scalar(1.0);
        assert_eq!(b.min, Vector3::splat(-1.0));
        b.expand_by_vector(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(b.max, Vector3::new(2.0, 3.0, 2.0));
    }

    #[test]
    fn test_containment_and_parameter() {
        let b = unit();
        assert!(b.contains_point(Vector3::ONE));
        assert!(!b.contains_point(Vector3::new(1.0, 1.0, 1.01)));
        assert!(b.contains_box(&Box3::new(Vector3::splat(0.25), Vector3::splat(0.75))));
        assert!(!Box3::new(Vector3::splat(0.25), Vector3::splat(0.75)).contains_box(&b));
        assert_eq!(b.get_parameter(Vector3::new(0.5, 0.0, 1.0)), Vector3::new(0.5, 0.0, 1.0));

        let flat = Box3::new(Vector3::ZERO, Vector3::new(2.0, 0.0, 4.0));
        assert_eq!(flat.get_parameter(Vector3::new(1.0, 3.0, 1.0)), Vector3::new(0.5, 0.0, 0.25));
    }

    #[test]
    fn test_intersection_and_union() {
        let a = unit();
        let b = Box3::new(Vector3::splat(0.5), Vector3::splat(2.0));
        let far = Box3::new(Vector3::splat(3.0), Vector3::splat(4.0));
        assert!(a.intersects_box(&b));
        assert!(!a.intersects_box(&far));
        assert!(a.intersects_box(&Box3::new(Vector3::ONE, Vector3::splat(2.0))));

        let mut i = a;
        i.intersect(&b);
        assert_eq!(i, Box3::new(Vector3::splat(0.5), Vector3::ONE));

        let mut disjoint = a;
        disjoint.intersect(&far);
        assert!(disjoint.is_empty());

        let mut u = a;
        u.union(&far);
        assert_eq!(u, Box3::new(Vector3::ZERO, Vector3::splat(4.0)));
    }

    #[test]
    fn test_distance_and_clamp() {
        let b = unit();
        assert_eq!(b.distance_to_point(Vector3::splat(0.5)), 0.0);
        assert_eq!(b.distance_to_point(Vector3::new(3.0, 0.5, 0.5)), 2.0);
        assert_eq!(b.clamp_point(Vector3::new(-1.0, 0.5, 2.0)), Vector3::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_bounding_sphere() {
        let s = Box3::new(Vector3::splat(-1.0), Vector3::ONE).bounding_sphere();
        assert_eq!(s.center, Vector3::ZERO);
        assert!((s.radius - 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_apply_matrix4() {
        let mut m = Matrix4::identity();
        m.make_rotation_z(std::f64::consts::FRAC_PI_2);
        m.set_position(Vector3::new(10.0, 0.0, 0.0));

        let mut b = Box3::new(Vector3::ZERO, Vector3::new(2.0, 1.0, 1.0));
        b.apply_matrix4(&m);
        assert!(b.min.approx_eq(Vector3::new(9.0, 0.0, 0.0), 1e-12));
        assert!(b.max.approx_eq(Vector3::new(10.0, 2.0, 1.0), 1e-12));

        let mut empty = Box3::EMPTY;
        empty.apply_matrix4(&m);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_translate() {
        let mut b = unit();
        b.translate(Vector3::new(1.0, -1.0, 0.0));
        assert_eq!(b, Box3::new(Vector3::new(1.0, -1.0, 0.0), Vector3::new(2.0, 0.0, 1.0)));
    }
}
