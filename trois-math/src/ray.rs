//! Half-line queries against points, segments and bounding volumes
use crate::{Box3, Matrix4, Plane, Sphere, Vector3};

/// A ray from `origin` along the unit vector `direction`.
///
/// Constructors and [`Ray::set`] normalize the direction; code writing the
/// public field directly is responsible for keeping it unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0))
    }
}

/// Closest approach between a ray and a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDistance {
    pub distance_sq: f64,
    pub point_on_ray: Vector3,
    pub point_on_segment: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn set(&mut self, origin: Vector3, direction: Vector3) -> &mut Self {
        self.origin = origin;
        self.direction = direction.normalize();
        self
    }

    pub fn at(&self, t: f64) -> Vector3 {
        self.direction * t + self.origin
    }

    /// Move the origin `t` units along the ray.
    pub fn recast(&mut self, t: f64) -> &mut Self {
        self.origin = self.at(t);
        self
    }

    /// Points behind the origin project onto the origin.
    pub fn closest_point_to_point(&self, point: Vector3) -> Vector3 {
        let t = (point - self.origin).dot(self.direction);
        if t < 0.0 {
            self.origin
        } else {
            self.at(t)
        }
    }

    pub fn distance_to_point(&self, point: Vector3) -> f64 {
        self.closest_point_to_point(point).distance_to(point)
    }

    /// Squared distance between the ray and the segment `v0`-`v1`, with the
    /// closest point on each.
    ///
    /// Follows the region classification of the Geometric Tools
    /// `DistRaySegment` query.
    pub fn distance_sq_to_segment(&self, v0: Vector3, v1: Vector3) -> SegmentDistance {
        let seg_center = (v0 + v1) * 0.5;
        let seg_dir = (v1 - v0).normalize();
        let diff = self.origin - seg_center;

        let seg_extent = v0.distance_to(v1) * 0.5;
        let a01 = -self.direction.dot(seg_dir);
        let b0 = diff.dot(self.direction);
        let b1 = -diff.dot(seg_dir);
        let c = diff.length_sq();
        let det = (1.0 - a01 * a01).abs();

        let (s0, s1, distance_sq);

        if det > 0.0 {
            // not parallel
            let mut t0 = a01 * b1 - b0;
            let mut t1 = a01 * b0 - b1;
            let ext_det = seg_extent * det;

            if t0 >= 0.0 {
                if t1 >= -ext_det {
                    if t1 <= ext_det {
                        // interior of both
                        let inv_det = 1.0 / det;
                        t0 *= inv_det;
                        t1 *= inv_det;
                        s0 = t0;
                        s1 = t1;
                        distance_sq = t0 * (t0 + a01 * t1 + 2.0 * b0) + t1 * (a01 * t0 + t1 + 2.0 * b1) + c;
                    } else {
                        s1 = seg_extent;
                        s0 = (-(a01 * s1 + b0)).max(0.0);
                        distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
                    }
                } else {
                    s1 = -seg_extent;
                    s0 = (-(a01 * s1 + b0)).max(0.0);
                    distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
                }
            } else if t1 <= -ext_det {
                s0 = (-(-a01 * seg_extent + b0)).max(0.0);
                s1 = if s0 > 0.0 {
                    -seg_extent
                } else {
                    (-b1).max(-seg_extent).min(seg_extent)
                };
                distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
            } else if t1 <= ext_det {
                s0 = 0.0;
                s1 = (-b1).max(-seg_extent).min(seg_extent);
                distance_sq = s1 * (s1 + 2.0 * b1) + c;
            } else {
                s0 = (-(a01 * seg_extent + b0)).max(0.0);
                s1 = if s0 > 0.0 {
                    seg_extent
                } else {
                    (-b1).max(-seg_extent).min(seg_extent)
                };
                distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
            }
        } else {
            // parallel
            s1 = if a01 > 0.0 { -seg_extent } else { seg_extent };
            s0 = (-(a01 * s1 + b0)).max(0.0);
            distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
        }

        SegmentDistance {
            distance_sq,
            point_on_ray: self.at(s0),
            point_on_segment: seg_dir * s1 + seg_center,
        }
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.distance_to_point(sphere.center) <= sphere.radius
    }

    /// First point where the ray enters the sphere, or where it leaves when
    /// the origin is inside.
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<Vector3> {
        let to_center = sphere.center - self.origin;
        let tca = to_center.dot(self.direction);
        let d2 = to_center.dot(to_center) - tca * tca;
        let radius2 = sphere.radius * sphere.radius;

        if d2 > radius2 {
            return None;
        }

        let thc = (radius2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;

        if t0 < 0.0 && t1 < 0.0 {
            return None;
        }

        Some(if t0 < 0.0 { self.at(t1) } else { self.at(t0) })
    }

    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        let dist_to_point = plane.distance_to_point(self.origin);
        if dist_to_point == 0.0 {
            return true;
        }
        plane.normal.dot(self.direction) * dist_to_point < 0.0
    }

    /// Ray parameter of the plane crossing. A ray lying in the plane gives 0.
    pub fn distance_to_plane(&self, plane: &Plane) -> Option<f64> {
        let denominator = plane.normal.dot(self.direction);
        if denominator == 0.0 {
            return (plane.distance_to_point(self.origin) == 0.0).then_some(0.0);
        }

        let t = -(self.origin.dot(plane.normal) + plane.constant) / denominator;
        (t >= 0.0).then_some(t)
    }

    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vector3> {
        self.distance_to_plane(plane).map(|t| self.at(t))
    }

    pub fn intersects_box(&self, b: &Box3) -> bool {
        self.intersect_box(b).is_some()
    }

    /// Slab test. Returns the entry point, or the exit point when the origin
    /// is inside the box.
    pub fn intersect_box(&self, b: &Box3) -> Option<Vector3> {
        let origin = self.origin;
        let inv_x = 1.0 / self.direction.x;
        let inv_y = 1.0 / self.direction.y;
        let inv_z = 1.0 / self.direction.z;

        let (mut tmin, mut tmax) = slab(b.min.x, b.max.x, origin.x, inv_x);
        let (tymin, tymax) = slab(b.min.y, b.max.y, origin.y, inv_y);

        if tmin > tymax || tymin > tmax {
            return None;
        }

        // NaN arises from 0 * inf when the origin lies on a slab face
        if tymin > tmin || tmin.is_nan() {
            tmin = tymin;
        }
        if tymax < tmax || tmax.is_nan() {
            tmax = tymax;
        }

        let (tzmin, tzmax) = slab(b.min.z, b.max.z, origin.z, inv_z);

        if tmin > tzmax || tzmin > tmax {
            return None;
        }

        if tzmin > tmin || tmin.is_nan() {
            tmin = tzmin;
        }
        if tzmax < tmax || tmax.is_nan() {
            tmax = tzmax;
        }

        if tmax < 0.0 {
            return None;
        }

        Some(self.at(if tmin >= 0.0 { tmin } else { tmax }))
    }

    /// Möller–Trumbore intersection with the triangle `a`, `b`, `c`.
    ///
    /// The front face is the one from which the vertices appear
    /// counter-clockwise. With `backface_culling` hits on the back face are
    /// rejected.
    pub fn intersect_triangle(
        &self,
        a: Vector3,
        b: Vector3,
        c: Vector3,
        backface_culling: bool,
    ) -> Option<Vector3> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2);

        let mut d_dot_n = self.direction.dot(normal);
        let sign = if d_dot_n > 0.0 {
            if backface_culling {
                return None;
            }
            1.0
        } else if d_dot_n < 0.0 {
            d_dot_n = -d_dot_n;
            -1.0
        } else {
            return None;
        };

        let diff = self.origin - a;
        let d_dot_q_x_e2 = sign * self.direction.dot(diff.cross(edge2));
        if d_dot_q_x_e2 < 0.0 {
            return None;
        }

        let d_dot_e1_x_q = sign * self.direction.dot(edge1.cross(diff));
        if d_dot_e1_x_q < 0.0 {
            return None;
        }

        if d_dot_q_x_e2 + d_dot_e1_x_q > d_dot_n {
            return None;
        }

        let q_dot_n = -sign * diff.dot(normal);
        if q_dot_n < 0.0 {
            return None;
        }

        Some(self.at(q_dot_n / d_dot_n))
    }

    /// Transform origin and direction; the direction is renormalized.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        let tip = (self.origin + self.direction).apply_matrix4(m);
        self.origin = self.origin.apply_matrix4(m);
        self.direction = (tip - self.origin).normalize();
        self
    }

    pub fn equals(&self, ray: &Ray) -> bool {
        self == ray
    }
}

fn slab(min: f64, max: f64, origin: f64, inv_dir: f64) -> (f64, f64) {
    if inv_dir >= 0.0 {
        ((min - origin) * inv_dir, (max - origin) * inv_dir)
    } else {
        ((max - origin) * inv_dir, (min - origin) * inv_dir)
    }
}
