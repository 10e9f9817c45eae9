//! Scene graph node and the closed set of node kinds
use trois_math::{Euler, Matrix4, Quaternion, Vector3};

use crate::geometry::SharedGeometry;
use crate::material::SharedMaterial;
use crate::{Bone, Camera, Lod, NodeId, SkinnedMesh};

/// Triangle mesh drawn from a shared geometry.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: SharedGeometry,
    pub material: SharedMaterial,
}

/// How consecutive line vertices are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    /// Every vertex connects to the next one.
    #[default]
    Strip,
    /// Vertices pair up into independent segments.
    Pieces,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub geometry: SharedGeometry,
    pub material: SharedMaterial,
    pub mode: LineMode,
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub geometry: SharedGeometry,
    pub material: SharedMaterial,
    /// Rewrite vertices back to front every frame.
    pub sort_particles: bool,
}

#[derive(Debug, Clone)]
pub struct Ribbon {
    pub geometry: SharedGeometry,
    pub material: SharedMaterial,
}

/// What a node is, beyond its transform.
#[derive(Debug, Clone, Default)]
pub enum ObjectKind {
    /// Plain transform node.
    #[default]
    Group,
    Bone(Bone),
    Lod(Lod),
    Camera(Camera),
    Mesh(Mesh),
    SkinnedMesh(SkinnedMesh),
    Line(Line),
    ParticleSystem(ParticleSystem),
    Ribbon(Ribbon),
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Group => "group",
            ObjectKind::Bone(_) => "bone",
            ObjectKind::Lod(_) => "lod",
            ObjectKind::Camera(_) => "camera",
            ObjectKind::Mesh(_) => "mesh",
            ObjectKind::SkinnedMesh(_) => "skinned mesh",
            ObjectKind::Line(_) => "line",
            ObjectKind::ParticleSystem(_) => "particle system",
            ObjectKind::Ribbon(_) => "ribbon",
        }
    }

    /// Geometry and material of renderable kinds.
    pub fn renderable(&self) -> Option<(&SharedGeometry, &SharedMaterial)> {
        match self {
            ObjectKind::Mesh(m) => Some((&m.geometry, &m.material)),
            ObjectKind::SkinnedMesh(m) => Some((&m.geometry, &m.material)),
            ObjectKind::Line(l) => Some((&l.geometry, &l.material)),
            ObjectKind::ParticleSystem(p) => Some((&p.geometry, &p.material)),
            ObjectKind::Ribbon(r) => Some((&r.geometry, &r.material)),
            _ => None,
        }
    }
}

/// A transform node.
///
/// `matrix` and `matrix_world` are only written by [`Object3D::update_matrix`]
/// and the graph's world update. Setting `position`, `rotation`,
/// `quaternion` or `scale` takes effect on the next world update as long
/// as `matrix_auto_update` is set.
#[derive(Debug, Clone)]
pub struct Object3D {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    pub name: String,
    pub up: Vector3,

    pub position: Vector3,
    pub rotation: Euler,
    pub quaternion: Quaternion,
    /// Build `matrix` from `quaternion` instead of `rotation`.
    pub use_quaternion: bool,
    pub scale: Vector3,

    pub matrix: Matrix4,
    pub matrix_world: Matrix4,
    pub matrix_auto_update: bool,
    pub matrix_world_needs_update: bool,
    /// Let [`Object3D::look_at`] overwrite the rotation.
    pub rotation_auto_update: bool,

    pub visible: bool,
    pub frustum_culled: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,

    pub kind: ObjectKind,
}

impl Default for Object3D {
    fn default() -> Self {
        Self::new(ObjectKind::Group)
    }
}

impl Object3D {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: NodeId::DETACHED,
            parent: None,
            children: Vec::new(),
            name: String::new(),
            up: Vector3::Y,
            position: Vector3::ZERO,
            rotation: Euler::default(),
            quaternion: Quaternion::IDENTITY,
            use_quaternion: false,
            scale: Vector3::ONE,
            matrix: Matrix4::identity(),
            matrix_world: Matrix4::identity(),
            matrix_auto_update: true,
            matrix_world_needs_update: true,
            rotation_auto_update: true,
            visible: true,
            frustum_culled: true,
            cast_shadow: false,
            receive_shadow: false,
            kind,
        }
    }

    pub fn group() -> Self {
        Self::new(ObjectKind::Group)
    }

    pub fn mesh(geometry: SharedGeometry, material: SharedMaterial) -> Self {
        Self::new(ObjectKind::Mesh(Mesh { geometry, material }))
    }

    pub fn line(geometry: SharedGeometry, material: SharedMaterial, mode: LineMode) -> Self {
        Self::new(ObjectKind::Line(Line { geometry, material, mode }))
    }

    pub fn particle_system(geometry: SharedGeometry, material: SharedMaterial) -> Self {
        Self::new(ObjectKind::ParticleSystem(ParticleSystem {
            geometry,
            material,
            sort_particles: false,
        }))
    }

    pub fn ribbon(geometry: SharedGeometry, material: SharedMaterial) -> Self {
        Self::new(ObjectKind::Ribbon(Ribbon { geometry, material }))
    }

    pub fn camera(camera: Camera) -> Self {
        Self::new(ObjectKind::Camera(camera))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: Vector3) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Rotation as a quaternion, whichever representation is active.
    pub fn orientation(&self) -> Quaternion {
        if self.use_quaternion {
            self.quaternion
        } else {
            Quaternion::from_euler(&self.rotation)
        }
    }

    /// Set both rotation representations from `q`.
    pub fn set_orientation(&mut self, q: Quaternion) -> &mut Self {
        self.quaternion = q;
        self.rotation.set_from_quaternion(&q, self.rotation.order);
        self
    }

    /// Recompute `matrix` from position, rotation and scale. Always marks
    /// the world matrix stale.
    pub fn update_matrix(&mut self) {
        if self.use_quaternion {
            self.matrix.make_rotation_from_quaternion(&self.quaternion);
        } else {
            self.matrix.make_rotation_from_euler(&self.rotation);
        }
        if self.scale != Vector3::ONE {
            self.matrix.scale(self.scale);
        }
        self.matrix.set_position(self.position);
        self.matrix_world_needs_update = true;
    }

    /// World update for this node alone. Returns the `force` flag its
    /// children must be updated with.
    pub(crate) fn update_world(&mut self, parent_world: Option<&Matrix4>, force: bool) -> bool {
        if self.matrix_auto_update {
            self.update_matrix();
        }
        if self.matrix_world_needs_update || force {
            self.matrix_world = match parent_world {
                Some(parent) => parent * &self.matrix,
                None => self.matrix,
            };
            self.matrix_world_needs_update = false;
            return true;
        }
        force
    }

    /// Premultiply the local matrix by `m` and read position, rotation and
    /// scale back out of the result.
    pub fn apply_matrix(&mut self, m: &Matrix4) -> &mut Self {
        self.matrix.premultiply(m);
        let (position, quaternion, scale) = self.matrix.decompose();
        self.position = position;
        self.scale = scale;
        self.set_orientation(quaternion)
    }

    /// Rotate around a unit axis in local space.
    pub fn rotate_on_axis(&mut self, axis: Vector3, angle: f64) -> &mut Self {
        let q = self.orientation() * Quaternion::from_axis_angle(axis, angle);
        self.set_orientation(q)
    }

    /// Move along a unit axis in local space.
    pub fn translate_on_axis(&mut self, axis: Vector3, distance: f64) -> &mut Self {
        let offset = axis.apply_quaternion(&self.orientation());
        self.position += offset * distance;
        self
    }

    pub fn translate_x(&mut self, distance: f64) -> &mut Self {
        self.translate_on_axis(Vector3::X, distance)
    }

    pub fn translate_y(&mut self, distance: f64) -> &mut Self {
        self.translate_on_axis(Vector3::Y, distance)
    }

    pub fn translate_z(&mut self, distance: f64) -> &mut Self {
        self.translate_on_axis(Vector3::Z, distance)
    }

    /// Uses the world matrix from the last world update.
    pub fn local_to_world(&self, v: Vector3) -> Vector3 {
        v.apply_matrix4(&self.matrix_world)
    }

    pub fn world_to_local(&self, v: Vector3) -> Vector3 {
        v.apply_matrix4(&self.matrix_world.inverse())
    }

    pub fn world_position(&self) -> Vector3 {
        Vector3::from_matrix_position(&self.matrix_world)
    }

    /// Turn to face `target`, given in the parent's space. Cameras point
    /// their -Z axis at it, every other node its +Z axis.
    pub fn look_at(&mut self, target: Vector3) -> &mut Self {
        let mut m = Matrix4::identity();
        if matches!(self.kind, ObjectKind::Camera(_)) {
            m.look_at(self.position, target, self.up);
        } else {
            m.look_at(target, self.position, self.up);
        }
        if self.rotation_auto_update {
            self.set_orientation(Quaternion::from_rotation_matrix(&m));
        }
        self
    }

    pub fn geometry(&self) -> Option<&SharedGeometry> {
        self.kind.renderable().map(|(g, _)| g)
    }

    pub fn material(&self) -> Option<&SharedMaterial> {
        self.kind.renderable().map(|(_, m)| m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_update_matrix_uses_active_rotation() {
        let mut o = Object3D::default();
        o.position = Vector3::new(1.0, 2.0, 3.0);
        o.rotation.y = FRAC_PI_2;
        o.scale = Vector3::new(2.0, 2.0, 2.0);
        o.matrix_world_needs_update = false;
        o.update_matrix();
        assert!(o.matrix_world_needs_update);
        assert_eq!(o.matrix.position(), o.position);
        let x = Vector3::X.apply_matrix4(&o.matrix);
        assert!(x.approx_eq(Vector3::new(1.0, 2.0, 1.0), 1e-12));

        o.use_quaternion = true;
        o.update_matrix();
        let x = Vector3::X.apply_matrix4(&o.matrix);
        assert!(x.approx_eq(Vector3::new(3.0, 2.0, 3.0), 1e-12));
    }

    #[test]
    fn test_update_world_honours_force() {
        let mut parent = Matrix4::identity();
        parent.make_translation(5.0, 0.0, 0.0);

        let mut o = Object3D::default();
        o.matrix_auto_update = false;
        o.matrix_world_needs_update = false;
        assert!(!o.update_world(Some(&parent), false));
        assert_eq!(o.matrix_world, Matrix4::identity());

        assert!(o.update_world(Some(&parent), true));
        assert_eq!(o.world_position(), Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_translate_on_rotated_axis() {
        let mut o = Object3D::default();
        o.rotate_on_axis(Vector3::Z, FRAC_PI_2);
        o.translate_x(2.0);
        assert!(o.position.approx_eq(Vector3::new(0.0, 2.0, 0.0), 1e-12));
        assert!((o.rotation.z - FRAC_PI_2).abs() < 1e-12);
        o.translate_z(-1.0);
        assert!(o.position.approx_eq(Vector3::new(0.0, 2.0, -1.0), 1e-12));
    }

    #[test]
    fn test_apply_matrix_decomposes() {
        let mut o = Object3D::default();
        o.update_matrix();
        let mut m = Matrix4::identity();
        m.compose(
            Vector3::new(1.0, -1.0, 4.0),
            &Quaternion::from_axis_angle(Vector3::Y, 0.5),
            Vector3::new(2.0, 3.0, 4.0),
        );
        o.apply_matrix(&m);
        assert!(o.position.approx_eq(Vector3::new(1.0, -1.0, 4.0), 1e-12));
        assert!(o.scale.approx_eq(Vector3::new(2.0, 3.0, 4.0), 1e-9));
        assert!((o.rotation.y - 0.5).abs() < 1e-9);

        o.update_matrix();
        assert!(o.matrix.approx_eq(&m, 1e-9));
    }

    #[test]
    fn test_look_at_points_forward_axis() {
        let target = Vector3::new(10.0, 0.0, 0.0);

        let mut node = Object3D::default();
        node.look_at(target);
        let forward = Vector3::Z.apply_quaternion(&node.orientation());
        assert!(forward.approx_eq(Vector3::X, 1e-12));

        let mut cam = Object3D::camera(Camera::default());
        cam.look_at(target);
        let forward = Vector3::new(0.0, 0.0, -1.0).apply_quaternion(&cam.orientation());
        assert!(forward.approx_eq(Vector3::X, 1e-12));
    }

    #[test]
    fn test_world_round_trip() {
        let mut o = Object3D::default().with_position(Vector3::new(0.0, 3.0, 0.0));
        o.scale = Vector3::splat(2.0);
        o.update_world(None, false);
        let p = Vector3::new(1.0, 1.0, 1.0);
        let world = o.local_to_world(p);
        assert_eq!(world, Vector3::new(2.0, 5.0, 2.0));
        assert!(o.world_to_local(world).approx_eq(p, 1e-12));
    }
}
