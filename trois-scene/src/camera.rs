//! Camera projections
use trois_math::{Matrix4, Vector3};

use crate::{NodeId, ObjectKind, Result, SceneError, SceneGraph};

/// Symmetric perspective frustum, `fov` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov: 50.0,
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective(PerspectiveCamera),
    Orthographic(OrthographicCamera),
}

/// Projection state carried by a camera node. The view matrix is the
/// inverse of the node's world matrix and is refreshed by
/// [`SceneGraph::update_camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub projection: Projection,
    pub projection_matrix: Matrix4,
    pub projection_matrix_inverse: Matrix4,
    pub matrix_world_inverse: Matrix4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Projection::Perspective(PerspectiveCamera::default()))
    }
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            projection_matrix: Matrix4::identity(),
            projection_matrix_inverse: Matrix4::identity(),
            matrix_world_inverse: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn perspective(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Perspective(PerspectiveCamera { fov, aspect, near, far }))
    }

    pub fn orthographic(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Orthographic(OrthographicCamera {
            left,
            right,
            top,
            bottom,
            near,
            far,
        }))
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective(_))
    }

    /// Rebuild the projection matrix after changing the parameters.
    pub fn update_projection_matrix(&mut self) {
        match self.projection {
            Projection::Perspective(p) => {
                self.projection_matrix.make_perspective(p.fov, p.aspect, p.near, p.far);
            }
            Projection::Orthographic(o) => {
                self.projection_matrix
                    .make_orthographic(o.left, o.right, o.top, o.bottom, o.near, o.far);
            }
        }
        self.projection_matrix_inverse = self.projection_matrix.inverse();
    }

    pub fn update_matrix_world_inverse(&mut self, matrix_world: &Matrix4) {
        self.matrix_world_inverse = matrix_world.inverse();
    }

    /// `projection * view`, the matrix frustums and particle sorting use.
    pub fn view_projection(&self) -> Matrix4 {
        self.projection_matrix * self.matrix_world_inverse
    }

    /// World space to normalized device coordinates.
    pub fn project(&self, v: Vector3) -> Vector3 {
        v.apply_projection(&self.view_projection())
    }

    /// Normalized device coordinates back to world space.
    pub fn unproject(&self, v: Vector3, matrix_world: &Matrix4) -> Vector3 {
        v.apply_projection(&(matrix_world * &self.projection_matrix_inverse))
    }
}

impl SceneGraph {
    pub fn camera(&self, id: NodeId) -> Result<&Camera> {
        match &self.get(id)?.kind {
            ObjectKind::Camera(camera) => Ok(camera),
            _ => Err(SceneError::WrongKind(id, "camera")),
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Result<&mut Camera> {
        match &mut self.get_mut(id)?.kind {
            ObjectKind::Camera(camera) => Ok(camera),
            _ => Err(SceneError::WrongKind(id, "camera")),
        }
    }

    /// Refresh the camera's view matrix from its world matrix.
    pub fn update_camera(&mut self, id: NodeId) -> Result<&Camera> {
        let node = self.get_mut(id)?;
        let world = node.matrix_world;
        match &mut node.kind {
            ObjectKind::Camera(camera) => {
                camera.update_matrix_world_inverse(&world);
                Ok(camera)
            }
            _ => Err(SceneError::WrongKind(id, "camera")),
        }
    }

    pub fn project(&self, camera: NodeId, v: Vector3) -> Result<Vector3> {
        Ok(self.camera(camera)?.project(v))
    }

    pub fn unproject(&self, camera: NodeId, v: Vector3) -> Result<Vector3> {
        let world = self.get(camera)?.matrix_world;
        Ok(self.camera(camera)?.unproject(v, &world))
    }
}
