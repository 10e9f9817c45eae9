//! View frustum as six inward-facing planes
use crate::{Box3, Matrix4, Plane, Sphere, Vector3};

/// Planes are ordered left, right, top, bottom, near, far. Each normal
/// points into the frustum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub const fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    pub fn from_matrix(m: &Matrix4) -> Self {
        let mut f = Self::default();
        f.set_from_matrix(m);
        f
    }

    pub fn set(&mut self, planes: [Plane; 6]) -> &mut Self {
        self.planes = planes;
        self
    }

    /// Extract the clip planes of a projection (or projection * view)
    /// matrix. Each plane is normalized.
    pub fn set_from_matrix(&mut self, m: &Matrix4) -> &mut Self {
        let me = &m.elements;
        let (me0, me1, me2, me3) = (me[0], me[1], me[2], me[3]);
        let (me4, me5, me6, me7) = (me[4], me[5], me[6], me[7]);
        let (me8, me9, me10, me11) = (me[8], me[9], me[10], me[11]);
        let (me12, me13, me14, me15) = (me[12], me[13], me[14], me[15]);

        let components = [
            (me3 + me0, me7 + me4, me11 + me8, me15 + me12),
            (me3 - me0, me7 - me4, me11 - me8, me15 - me12),
            (me3 - me1, me7 - me5, me11 - me9, me15 - me13),
            (me3 + me1, me7 + me5, me11 + me9, me15 + me13),
            (me3 + me2, me7 + me6, me11 + me10, me15 + me14),
            (me3 - me2, me7 - me6, me11 - me10, me15 - me14),
        ];

        for (plane, (x, y, z, w)) in self.planes.iter_mut().zip(components) {
            plane.set_components(x, y, z, w).normalize();
        }
        self
    }

    /// Inclusive of the boundary.
    pub fn contains_point(&self, point: Vector3) -> bool {
        self.planes.iter().all(|p| p.distance_to_point(point) >= 0.0)
    }

    /// Conservative: spheres straddling a plane count as intersecting.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let negative_radius = -sphere.radius;
        self.planes
            .iter()
            .all(|p| p.distance_to_point(sphere.center) >= negative_radius)
    }

    /// Rejects the box only when its most inward corner is outside some plane.
    pub fn intersects_box(&self, b: &Box3) -> bool {
        self.planes.iter().all(|plane| {
            let n = plane.normal;
            let corner = Vector3::new(
                if n.x > 0.0 { b.max.x } else { b.min.x },
                if n.y > 0.0 { b.max.y } else { b.min.y },
                if n.z > 0.0 { b.max.z } else { b.min.z },
            );
            plane.distance_to_point(corner) >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ortho() -> Frustum {
        let mut m = Matrix4::identity();
        m.make_orthographic(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        Frustum::from_matrix(&m)
    }

    #[test]
    fn test_planes_are_normalized() {
        let mut m = Matrix4::identity();
        m.make_perspective(60.0, 1.5, 0.1, 50.0);
        let f = Frustum::from_matrix(&m);
        for p in f.planes {
            assert!((p.normal.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_plane_slots() {
        let mut m = Matrix4::identity();
        m.make_orthographic(-1.0, 1.0, 1.0, -1.0, 1.0, 100.0);
        let f = Frustum::from_matrix(&m);

        let normals = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        for (plane, normal) in f.planes.iter().zip(normals) {
            assert!(plane.normal.approx_eq(normal, 1e-12), "{plane:?}");
        }
        assert!(f.planes[0].distance_to_point(Vector3::new(-1.0, 0.0, -5.0)).abs() < 1e-12);
        assert!(f.planes[2].distance_to_point(Vector3::new(0.0, 1.0, -5.0)).abs() < 1e-12);
        assert!(f.planes[4].distance_to_point(Vector3::new(0.0, 0.0, -1.0)).abs() < 1e-12);
        assert!(f.planes[5].distance_to_point(Vector3::new(0.0, 0.0, -100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_matrix_has_no_nan_planes() {
        let f = Frustum::from_matrix(&Matrix4::zero());
        for p in f.planes {
            assert!(!p.normal.x.is_nan() && !p.normal.y.is_nan() && !p.normal.z.is_nan());
            assert!(p.constant.is_finite());
        }
    }

    #[test]
    fn test_contains_point_orthographic() {
        let f = ortho();
        assert!(!f.contains_point(Vector3::ZERO));
        assert!(f.contains_point(Vector3::new(0.0, 0.0, -50.0)));
        assert!(f.contains_point(Vector3::new(-1.0, -1.0, -1.0001)));
        assert!(!f.contains_point(Vector3::new(-1.1, 0.0, -50.0)));
        assert!(f.contains_point(Vector3::new(0.0, 0.0, -99.999)));
        assert!(!f.contains_point(Vector3::new(0.0, 0.0, -101.0)));
    }

    #[test]
    fn test_contains_point_perspective() {
        let mut m = Matrix4::identity();
        m.make_frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        let f = Frustum::from_matrix(&m);
        assert!(!f.contains_point(Vector3::ZERO));
        assert!(f.contains_point(Vector3::new(0.0, 0.0, -50.0)));
        assert!(f.contains_point(Vector3::new(-99.0, 99.0, -99.999)));
        assert!(!f.contains_point(Vector3::new(-1.1, 0.0, -1.0)));
        assert!(!f.contains_point(Vector3::new(0.0, 0.0, -101.0)));
    }

    #[test]
    fn test_intersects_sphere() {
        let f = ortho();
        assert!(!f.intersects_sphere(&Sphere::new(Vector3::ZERO, 0.0)));
        assert!(!f.intersects_sphere(&Sphere::new(Vector3::ZERO, 0.9)));
        assert!(f.intersects_sphere(&Sphere::new(Vector3::ZERO, 1.1)));
        assert!(f.intersects_sphere(&Sphere::new(Vector3::new(0.0, 0.0, -50.0), 0.0)));
        assert!(!f.intersects_sphere(&Sphere::new(Vector3::new(0.0, 0.0, -101.0), 0.5)));
    }

    #[test]
    fn test_intersects_box() {
        let f = ortho();
        let straddling = Box3::new(Vector3::new(-0.5, -0.5, -2.0), Vector3::new(0.5, 0.5, 2.0));
        assert!(f.intersects_box(&straddling));
        let behind = Box3::new(Vector3::splat(-0.5), Vector3::splat(0.5));
        assert!(!f.intersects_box(&behind));
        let beside = Box3::new(Vector3::new(2.0, 0.0, -10.0), Vector3::new(3.0, 1.0, -5.0));
        assert!(!f.intersects_box(&beside));
    }
}
