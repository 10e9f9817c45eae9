//! Derived data: normals, tangents, bounds, welding
use std::collections::HashMap;

use log::debug;
use trois_math::{Box3, Matrix3, Matrix4, Sphere, Triangle, Vector3, Vector4};

use super::{Geometry, Stream};
use crate::{Result, SceneError};

/// Decimal places kept when welding vertices.
const MERGE_PRECISION: f64 = 1e4;

impl Geometry {
    /// Positions of the corners of face `index`, checked against the
    /// vertex list.
    pub(crate) fn face_corners(&self, index: usize) -> Result<[Vector3; 3]> {
        let face = &self.faces[index];
        let len = self.vertices.len();
        let corner = |i: usize| {
            self.vertices
                .get(i)
                .copied()
                .ok_or(SceneError::VertexIndexOutOfRange { face: index, index: i, len })
        };
        Ok([corner(face.a)?, corner(face.b)?, corner(face.c)?])
    }

    /// Transform positions by `m` and normals by its normal matrix.
    pub fn apply_matrix(&mut self, m: &Matrix4) {
        let normal_matrix = Matrix3::normal_matrix(m);

        for v in self.vertices_mut() {
            *v = v.apply_matrix4(m);
        }
        for face in &mut self.faces {
            face.normal = face.normal.apply_matrix3(&normal_matrix).normalize();
            for n in &mut face.vertex_normals {
                *n = n.apply_matrix3(&normal_matrix).normalize();
            }
            face.centroid = face.centroid.apply_matrix4(m);
        }
        self.revisions.bump(Stream::Normals);

        if self.bounding_box.is_some() {
            self.compute_bounding_box();
        }
        if self.bounding_sphere.is_some() {
            self.compute_bounding_sphere();
        }
    }

    pub fn compute_centroids(&mut self) -> Result<()> {
        for index in 0..self.faces.len() {
            let [a, b, c] = self.face_corners(index)?;
            self.faces[index].centroid = (a + b + c) * (1.0 / 3.0);
        }
        Ok(())
    }

    pub fn compute_face_normals(&mut self) -> Result<()> {
        for index in 0..self.faces.len() {
            let [a, b, c] = self.face_corners(index)?;
            self.faces[index].normal = Triangle::normal_of(a, b, c);
        }
        self.revisions.bump(Stream::Normals);
        Ok(())
    }

    /// Average face normals into per-corner normals. With `area_weighted`
    /// larger faces pull harder; otherwise the stored face normals are
    /// averaged as they are.
    pub fn compute_vertex_normals(&mut self, area_weighted: bool) -> Result<()> {
        let mut sums = vec![Vector3::ZERO; self.vertices.len()];

        for index in 0..self.faces.len() {
            let [a, b, c] = self.face_corners(index)?;
            let face = &self.faces[index];
            let n = if area_weighted {
                (c - b).cross(a - b)
            } else {
                face.normal
            };
            for i in face.indices() {
                sums[i] += n;
            }
        }

        for face in &mut self.faces {
            face.vertex_normals = face.indices().iter().map(|&i| sums[i].normalize()).collect();
        }
        self.revisions.bump(Stream::Normals);
        Ok(())
    }

    /// Per-corner tangents from layer-0 UVs and vertex normals. Faces
    /// without UVs contribute nothing.
    pub fn compute_tangents(&mut self) -> Result<()> {
        let count = self.vertices.len();
        let mut tan1 = vec![Vector3::ZERO; count];
        let mut tan2 = vec![Vector3::ZERO; count];

        for index in 0..self.faces.len() {
            let [va, vb, vc] = self.face_corners(index)?;
            let Some(&[uva, uvb, uvc]) = self.face_vertex_uvs[0].get(index) else {
                continue;
            };

            let (x1, x2) = (vb.x - va.x, vc.x - va.x);
            let (y1, y2) = (vb.y - va.y, vc.y - va.y);
            let (z1, z2) = (vb.z - va.z, vc.z - va.z);
            let (s1, s2) = (uvb.x - uva.x, uvc.x - uva.x);
            let (t1, t2) = (uvb.y - uva.y, uvc.y - uva.y);

            let det = s1 * t2 - s2 * t1;
            if det == 0.0 {
                continue;
            }
            let r = 1.0 / det;
            let sdir = Vector3::new(t2 * x1 - t1 * x2, t2 * y1 - t1 * y2, t2 * z1 - t1 * z2) * r;
            let tdir = Vector3::new(s1 * x2 - s2 * x1, s1 * y2 - s2 * y1, s1 * z2 - s2 * z1) * r;

            for i in self.faces[index].indices() {
                tan1[i] += sdir;
                tan2[i] += tdir;
            }
        }

        for face in &mut self.faces {
            let indices = face.indices();
            face.vertex_tangents = (0..3)
                .map(|corner| {
                    let n = face.vertex_normals.get(corner).copied().unwrap_or(face.normal);
                    let t = tan1[indices[corner]];
                    let tangent = (t - n * n.dot(t)).normalize();
                    let w = if n.cross(t).dot(tan2[indices[corner]]) < 0.0 { -1.0 } else { 1.0 };
                    Vector4::from_vector3(tangent, w)
                })
                .collect();
        }

        self.has_tangents = true;
        self.revisions.bump(Stream::Tangents);
        Ok(())
    }

    /// Cumulative distance along the vertex list, for dashed lines.
    pub fn compute_line_distances(&mut self) {
        let mut total = 0.0;
        let distances: Vec<f64> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if i > 0 {
                    total += self.vertices[i - 1].distance_to(*v);
                }
                total
            })
            .collect();
        *self.line_distances_mut() = distances;
    }

    pub fn compute_bounding_box(&mut self) -> Box3 {
        let b = Box3::from_points(&self.vertices);
        self.bounding_box = Some(b);
        b
    }

    pub fn compute_bounding_sphere(&mut self) -> Sphere {
        let s = Sphere::from_points(&self.vertices, None);
        self.bounding_sphere = Some(s);
        s
    }

    /// Cached bounding sphere, computed on first use.
    pub fn ensure_bounding_sphere(&mut self) -> Sphere {
        match self.bounding_sphere {
            Some(s) => s,
            None => self.compute_bounding_sphere(),
        }
    }

    /// Weld vertices that agree to four decimal places and drop faces that
    /// collapse as a result. Returns the number of vertices removed.
    pub fn merge_vertices(&mut self) -> usize {
        let key = |v: &Vector3| {
            (
                (v.x * MERGE_PRECISION).round() as i64,
                (v.y * MERGE_PRECISION).round() as i64,
                (v.z * MERGE_PRECISION).round() as i64,
            )
        };

        let mut seen = HashMap::new();
        let mut unique = Vec::new();
        let mut remap = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            let index = *seen.entry(key(v)).or_insert_with(|| {
                unique.push(*v);
                unique.len() - 1
            });
            remap.push(index);
        }

        let mut kept = Vec::with_capacity(self.faces.len());
        for face in &mut self.faces {
            for i in [&mut face.a, &mut face.b, &mut face.c] {
                if let Some(&to) = remap.get(*i) {
                    *i = to;
                }
            }
            kept.push(face.a != face.b && face.b != face.c && face.a != face.c);
        }

        let mut flags = kept.iter();
        self.faces.retain(|_| flags.next().copied().unwrap_or(true));
        for layer in &mut self.face_vertex_uvs {
            let mut flags = kept.iter();
            layer.retain(|_| flags.next().copied().unwrap_or(true));
        }

        let removed = self.vertices.len() - unique.len();
        self.vertices = unique;
        for stream in [Stream::Vertices, Stream::Elements, Stream::Uvs] {
            self.revisions.bump(stream);
        }
        debug!("merged {removed} duplicate vertices");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Face3;
    use trois_math::Vector2;

    fn quad() -> Geometry {
        let mut g = Geometry::new();
        *g.vertices_mut() = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        *g.faces_mut() = vec![Face3::new(0, 1, 2), Face3::new(0, 2, 3)];
        g
    }

    #[test]
    fn test_face_and_vertex_normals() {
        let mut g = quad();
        g.compute_face_normals().unwrap();
        assert!(g.faces().iter().all(|f| f.normal == Vector3::Z));

        g.compute_vertex_normals(true).unwrap();
        for face in g.faces() {
            assert_eq!(face.vertex_normals, vec![Vector3::Z; 3]);
        }
    }

    #[test]
    fn test_bad_index_is_reported() {
        let mut g = quad();
        g.faces_mut().push(Face3::new(0, 1, 9));
        assert!(matches!(
            g.compute_face_normals(),
            Err(SceneError::VertexIndexOutOfRange { face: 2, index: 9, len: 4 })
        ));
    }

    #[test]
    fn test_centroids_and_bounds() {
        let mut g = quad();
        g.compute_centroids().unwrap();
        assert!(g.faces()[0].centroid.approx_eq(Vector3::new(2.0 / 3.0, 1.0 / 3.0, 0.0), 1e-12));

        let b = g.compute_bounding_box();
        assert_eq!(b, Box3::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 0.0)));
        let s = g.ensure_bounding_sphere();
        assert_eq!(s.center, Vector3::new(0.5, 0.5, 0.0));
        assert!((s.radius - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_apply_matrix_moves_vertices_and_bounds() {
        let mut g = quad();
        g.compute_face_normals().unwrap();
        g.compute_bounding_box();
        let mut m = Matrix4::identity();
        m.make_rotation_x(std::f64::consts::PI);
        g.apply_matrix(&m);

        assert!(g.vertices()[2].approx_eq(Vector3::new(1.0, -1.0, 0.0), 1e-12));
        assert!(g.faces()[0].normal.approx_eq(Vector3::new(0.0, 0.0, -1.0), 1e-12));
        let b = g.bounding_box.unwrap();
        assert!(b.min.approx_eq(Vector3::new(0.0, -1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_tangents_follow_u_direction() {
        let mut g = quad();
        *g.face_vertex_uvs_mut(0) = vec![
            [Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), Vector2::new(1.0, 1.0)],
            [Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0), Vector2::new(0.0, 1.0)],
        ];
        g.compute_face_normals().unwrap();
        g.compute_vertex_normals(false).unwrap();
        g.compute_tangents().unwrap();

        assert!(g.has_tangents);
        for face in g.faces() {
            for t in &face.vertex_tangents {
                assert!(t.xyz().approx_eq(Vector3::X, 1e-12));
                assert_eq!(t.w, 1.0);
            }
        }
    }

    #[test]
    fn test_line_distances() {
        let mut g = Geometry::new();
        *g.vertices_mut() = vec![Vector3::ZERO, Vector3::new(3.0, 4.0, 0.0), Vector3::new(3.0, 4.0, 1.0)];
        g.compute_line_distances();
        assert_eq!(g.line_distances(), &[0.0, 5.0, 6.0]);
    }

    #[test]
    fn test_merge_vertices_drops_collapsed_faces() {
        let mut g = quad();
        g.vertices_mut().push(Vector3::new(1.00001, 0.0, 0.0));
        g.faces_mut().push(Face3::new(1, 4, 2));
        g.face_vertex_uvs_mut(0).extend([[Vector2::ZERO; 3]; 3]);

        let removed = g.merge_vertices();
        assert_eq!(removed, 1);
        assert_eq!(g.vertices().len(), 4);
        assert_eq!(g.faces().len(), 2);
        assert_eq!(g.face_vertex_uvs(0).len(), 2);
    }
}
