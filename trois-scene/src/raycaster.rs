//! Picking: intersecting a world-space ray with scene nodes
use log::warn;
use trois_math::{Ray, Vector2, Vector3};

use crate::geometry::SharedGeometry;
use crate::material::Side;
use crate::{LineMode, NodeId, Object3D, ObjectKind, Result, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycasterParams {
    /// Hits closer than this are ignored.
    pub near: f64,
    /// Hits farther than this are ignored.
    pub far: f64,
    /// Hits closer than this to the ray origin are treated as
    /// self-intersections and ignored.
    pub precision: f64,
    /// Largest ray-to-segment distance that counts as a line hit, in the
    /// line's local units.
    pub line_precision: f64,
    /// Largest ray-to-vertex distance that counts as a particle hit.
    pub point_threshold: f64,
}

impl Default for RaycasterParams {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: f64::INFINITY,
            precision: 1e-4,
            line_precision: 1.0,
            point_threshold: 1.0,
        }
    }
}

/// One hit, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// From the ray origin to `point`.
    pub distance: f64,
    pub point: Vector3,
    pub object: NodeId,
    /// Hit triangle of a mesh.
    pub face_index: Option<usize>,
    /// First vertex of the hit line segment, or the hit particle.
    pub index: Option<usize>,
    /// How far a hit particle lies from the ray.
    pub distance_to_ray: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Raycaster {
    pub ray: Ray,
    pub params: RaycasterParams,
}

impl Raycaster {
    /// `direction` is normalized.
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            ray: Ray::new(origin, direction),
            params: RaycasterParams::default(),
        }
    }

    pub fn set(&mut self, origin: Vector3, direction: Vector3) -> &mut Self {
        self.ray.set(origin, direction);
        self
    }

    /// Aim through `coords` in normalized device coordinates of `camera`.
    /// The camera's world matrix and projection must be current.
    pub fn set_from_camera(&mut self, coords: Vector2, graph: &SceneGraph, camera: NodeId) -> Result<&mut Self> {
        let lens = graph.camera(camera)?;
        let world = graph.get(camera)?.matrix_world;

        if lens.is_perspective() {
            let origin = world.position();
            let through = lens.unproject(Vector3::new(coords.x, coords.y, 0.5), &world);
            self.ray.set(origin, through - origin);
        } else {
            let origin = lens.unproject(Vector3::new(coords.x, coords.y, -1.0), &world);
            self.ray.set(origin, Vector3::new(0.0, 0.0, -1.0).transform_direction(&world));
        }
        Ok(self)
    }

    /// Hits on `id`, and on its descendants when `recursive`, nearest first.
    /// Invisible nodes and their subtrees are ignored.
    pub fn intersect_object(&self, graph: &SceneGraph, id: NodeId, recursive: bool) -> Result<Vec<Intersection>> {
        let mut hits = Vec::new();
        self.collect(graph, id, recursive, &mut hits)?;
        sort_by_distance(&mut hits);
        Ok(hits)
    }

    pub fn intersect_objects(&self, graph: &SceneGraph, ids: &[NodeId], recursive: bool) -> Result<Vec<Intersection>> {
        let mut hits = Vec::new();
        for &id in ids {
            self.collect(graph, id, recursive, &mut hits)?;
        }
        sort_by_distance(&mut hits);
        Ok(hits)
    }

    fn collect(&self, graph: &SceneGraph, id: NodeId, recursive: bool, hits: &mut Vec<Intersection>) -> Result<()> {
        let object = graph.get(id)?;
        if !object.visible {
            return Ok(());
        }
        self.intersect_node(graph, object, hits)?;

        if recursive {
            for &child in object.children() {
                // LOD levels were already tested through the level selection.
                if let ObjectKind::Lod(lod) = &object.kind {
                    if lod.levels().iter().any(|level| level.object == child) {
                        continue;
                    }
                }
                self.collect(graph, child, true, hits)?;
            }
        }
        Ok(())
    }

    fn intersect_node(&self, graph: &SceneGraph, object: &Object3D, hits: &mut Vec<Intersection>) -> Result<()> {
        match &object.kind {
            ObjectKind::Lod(lod) => {
                let distance = self.ray.origin.distance_to(object.world_position());
                if let Some(level) = lod.object_for_distance(distance) {
                    self.intersect_node(graph, graph.get(level)?, hits)?;
                }
                Ok(())
            }
            ObjectKind::Mesh(mesh) => self.intersect_mesh(object, &mesh.geometry, mesh.material.borrow().side, hits),
            ObjectKind::SkinnedMesh(mesh) => {
                self.intersect_mesh(object, &mesh.geometry, mesh.material.borrow().side, hits)
            }
            ObjectKind::Line(line) => {
                self.intersect_line(object, &line.geometry, line.mode, hits);
                Ok(())
            }
            ObjectKind::ParticleSystem(system) => {
                self.intersect_particles(object, &system.geometry, hits);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The world ray in the object's local space.
    fn local_ray(&self, object: &Object3D) -> Ray {
        let mut ray = self.ray;
        ray.apply_matrix4(&object.matrix_world.inverse());
        ray
    }

    /// Cheap rejection against the world-space bounding sphere, grown by
    /// `margin`.
    fn misses_bounds(&self, object: &Object3D, geometry: &SharedGeometry, margin: f64) -> bool {
        let mut sphere = geometry.borrow_mut().ensure_bounding_sphere();
        sphere.apply_matrix4(&object.matrix_world);
        sphere.radius += margin;
        !self.ray.intersects_sphere(&sphere)
    }

    fn in_range(&self, distance: f64) -> bool {
        distance >= self.params.precision && distance >= self.params.near && distance <= self.params.far
    }

    fn intersect_mesh(
        &self,
        object: &Object3D,
        geometry: &SharedGeometry,
        side: Side,
        hits: &mut Vec<Intersection>,
    ) -> Result<()> {
        if self.misses_bounds(object, geometry, 0.0) {
            return Ok(());
        }
        let local = self.local_ray(object);
        let geometry = geometry.borrow();
        if let Some(bounds) = &geometry.bounding_box {
            if !local.intersects_box(bounds) {
                return Ok(());
            }
        }

        for index in 0..geometry.faces().len() {
            let [a, b, c] = geometry.face_corners(index)?;
            let hit = match side {
                Side::Front => local.intersect_triangle(a, b, c, true),
                Side::Back => local.intersect_triangle(c, b, a, true),
                Side::Double => local.intersect_triangle(a, b, c, false),
            };
            let Some(hit) = hit else {
                continue;
            };

            let point = hit.apply_matrix4(&object.matrix_world);
            let distance = self.ray.origin.distance_to(point);
            if !self.in_range(distance) {
                continue;
            }
            hits.push(Intersection {
                distance,
                point,
                object: object.id(),
                face_index: Some(index),
                index: None,
                distance_to_ray: None,
            });
        }
        Ok(())
    }

    fn intersect_line(&self, object: &Object3D, geometry: &SharedGeometry, mode: LineMode, hits: &mut Vec<Intersection>) {
        if self.misses_bounds(object, geometry, self.params.line_precision) {
            return;
        }
        let local = self.local_ray(object);
        let precision_sq = self.params.line_precision * self.params.line_precision;
        let step = match mode {
            LineMode::Strip => 1,
            LineMode::Pieces => 2,
        };
        let geometry = geometry.borrow();
        let vertices = geometry.vertices();
        if mode == LineMode::Pieces && vertices.len() % 2 == 1 {
            warn!("line {} has an unpaired last vertex", object.id());
        }

        for i in (0..vertices.len().saturating_sub(1)).step_by(step) {
            let closest = local.distance_sq_to_segment(vertices[i], vertices[i + 1]);
            if closest.distance_sq > precision_sq {
                continue;
            }
            let on_ray = closest.point_on_ray.apply_matrix4(&object.matrix_world);
            let distance = self.ray.origin.distance_to(on_ray);
            if !self.in_range(distance) {
                continue;
            }
            hits.push(Intersection {
                distance,
                point: closest.point_on_segment.apply_matrix4(&object.matrix_world),
                object: object.id(),
                face_index: None,
                index: Some(i),
                distance_to_ray: None,
            });
        }
    }

    fn intersect_particles(&self, object: &Object3D, geometry: &SharedGeometry, hits: &mut Vec<Intersection>) {
        let threshold = self.params.point_threshold;
        if self.misses_bounds(object, geometry, threshold) {
            return;
        }
        let scale = object.matrix_world.max_scale_on_axis();
        if scale == 0.0 {
            return;
        }
        let local = self.local_ray(object);
        let local_threshold = threshold / scale;
        let geometry = geometry.borrow();

        for (index, &vertex) in geometry.vertices().iter().enumerate() {
            let to_ray = local.distance_to_point(vertex);
            if to_ray >= local_threshold {
                continue;
            }
            let point = local.closest_point_to_point(vertex).apply_matrix4(&object.matrix_world);
            let distance = self.ray.origin.distance_to(point);
            if !self.in_range(distance) {
                continue;
            }
            hits.push(Intersection {
                distance,
                point,
                object: object.id(),
                face_index: None,
                index: Some(index),
                distance_to_ray: Some(to_ray),
            });
        }
    }
}

fn sort_by_distance(hits: &mut [Intersection]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
