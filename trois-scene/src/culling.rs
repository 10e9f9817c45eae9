//! View-frustum tests for scene nodes
use trois_math::Frustum;

use crate::Object3D;

/// Whether the world-space bounding sphere of a renderable node touches
/// `frustum`. Nodes without geometry always pass. Computes the geometry's
/// bounding sphere on first use.
pub fn intersects_object(frustum: &Frustum, object: &Object3D) -> bool {
    let Some(geometry) = object.geometry() else {
        return true;
    };
    let mut sphere = geometry.borrow_mut().ensure_bounding_sphere();
    sphere.apply_matrix4(&object.matrix_world);
    frustum.intersects_sphere(&sphere)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Geometry, Material};
    use trois_math::{Matrix4, Vector3};

    fn unit_mesh(position: Vector3) -> Object3D {
        let mut g = Geometry::new();
        *g.vertices_mut() = vec![Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)];
        let mut object = Object3D::mesh(g.into_shared(), Material::default().into_shared());
        object.position = position;
        object.update_matrix();
        object.matrix_world = object.matrix;
        object
    }

    #[test]
    fn test_sphere_in_world_space() {
        let mut m = Matrix4::identity();
        m.make_orthographic(-1.0, 1.0, 1.0, -1.0, 1.0, 100.0);
        let frustum = Frustum::from_matrix(&m);

        assert!(intersects_object(&frustum, &unit_mesh(Vector3::new(0.0, 0.0, -10.0))));
        assert!(intersects_object(&frustum, &unit_mesh(Vector3::new(1.5, 0.0, -10.0))));
        assert!(!intersects_object(&frustum, &unit_mesh(Vector3::new(5.0, 0.0, -10.0))));
        assert!(!intersects_object(&frustum, &unit_mesh(Vector3::new(0.0, 0.0, 5.0))));
        assert!(intersects_object(&frustum, &Object3D::group()));
    }
}
