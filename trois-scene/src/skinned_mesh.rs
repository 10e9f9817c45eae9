//! Meshes deformed by a bone hierarchy
use log::{debug, warn};
use trois_math::Matrix4;

use crate::geometry::SharedGeometry;
use crate::material::SharedMaterial;
use crate::{Bone, NodeId, Object3D, ObjectKind, Result, SceneError, SceneGraph};

#[derive(Debug, Clone)]
pub struct SkinnedMesh {
    pub geometry: SharedGeometry,
    pub material: SharedMaterial,
    /// Bone nodes, in the order of the geometry's bone descriptions.
    pub bones: Vec<NodeId>,
    /// Inverse skin matrices captured at the first world update.
    pub bone_inverses: Option<Vec<Matrix4>>,
    /// `skin * inverse` per bone, 16 column-major floats each.
    pub bone_matrices: Vec<f64>,
}

impl SkinnedMesh {
    fn new(geometry: SharedGeometry, material: SharedMaterial) -> Self {
        Self {
            geometry,
            material,
            bones: Vec::new(),
            bone_inverses: None,
            bone_matrices: Vec::new(),
        }
    }
}

impl SceneGraph {
    /// Insert a skinned mesh together with the skeleton described by its
    /// geometry, then pose it.
    pub fn add_skinned_mesh(&mut self, geometry: SharedGeometry, material: SharedMaterial) -> Result<NodeId> {
        let descriptions = geometry.borrow().bones.clone();
        let mesh = self.insert(Object3D::new(ObjectKind::SkinnedMesh(SkinnedMesh::new(
            geometry, material,
        ))));

        let mut bones = Vec::with_capacity(descriptions.len());
        for description in &descriptions {
            let mut node = Object3D::new(ObjectKind::Bone(Bone::default()));
            node.name = description.name.clone();
            node.position = description.position;
            node.quaternion = description.rotation;
            node.use_quaternion = true;
            node.scale = description.scale;
            bones.push(self.insert(node));
        }

        for (index, description) in descriptions.iter().enumerate() {
            let parent = match description.parent {
                Some(p) if p < bones.len() && p != index => bones[p],
                Some(p) => {
                    warn!("bone {index} has invalid parent {p}; attaching it to the mesh");
                    mesh
                }
                None => mesh,
            };
            self.add(parent, bones[index])?;
        }

        let skinned = self.skinned_mesh_mut(mesh)?;
        skinned.bone_matrices = vec![0.0; bones.len() * 16];
        skinned.bones = bones;
        debug!("skinned mesh {mesh} with {} bones", descriptions.len());

        self.pose(mesh)?;
        Ok(mesh)
    }

    pub fn skinned_mesh(&self, id: NodeId) -> Result<&SkinnedMesh> {
        match &self.get(id)?.kind {
            ObjectKind::SkinnedMesh(mesh) => Ok(mesh),
            _ => Err(SceneError::WrongKind(id, "skinned mesh")),
        }
    }

    pub fn skinned_mesh_mut(&mut self, id: NodeId) -> Result<&mut SkinnedMesh> {
        match &mut self.get_mut(id)?.kind {
            ObjectKind::SkinnedMesh(mesh) => Ok(mesh),
            _ => Err(SceneError::WrongKind(id, "skinned mesh")),
        }
    }

    /// Force a world update and normalize the skin weights.
    pub fn pose(&mut self, id: NodeId) -> Result<()> {
        self.update_matrix_world(id, true)?;
        self.skinned_mesh(id)?.geometry.borrow_mut().normalize_skin_weights();
        Ok(())
    }

    /// Flatten `skin * inverse` for every bone into `bone_matrices`,
    /// capturing the inverses on first use.
    pub(crate) fn refresh_bone_matrices(&mut self, id: NodeId) -> Result<()> {
        let bones = self.skinned_mesh(id)?.bones.clone();
        let skins = bones
            .iter()
            .map(|&b| self.skin_matrix(b).ok_or(SceneError::WrongKind(b, "bone")))
            .collect::<Result<Vec<_>>>()?;

        let mesh = self.skinned_mesh_mut(id)?;
        let inverses = mesh
            .bone_inverses
            .get_or_insert_with(|| skins.iter().map(Matrix4::inverse).collect());

        mesh.bone_matrices.resize(skins.len() * 16, 0.0);
        for (index, (skin, inverse)) in skins.iter().zip(inverses.iter()).enumerate() {
            (skin * inverse).flatten_to_array_offset(&mut mesh.bone_matrices, index * 16)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoneDescription, Geometry};
    use crate::material::Material;
    use trois_math::{Quaternion, Vector3, Vector4};

    fn skeleton() -> SharedGeometry {
        let mut geometry = Geometry::new();
        geometry.bones = vec![
            BoneDescription {
                parent: None,
                name: "hip".into(),
                position: Vector3::new(0.0, 1.0, 0.0),
                rotation: Quaternion::IDENTITY,
                scale: Vector3::ONE,
            },
            BoneDescription {
                parent: Some(0),
                name: "knee".into(),
                position: Vector3::new(0.0, -0.5, 0.0),
                rotation: Quaternion::IDENTITY,
                scale: Vector3::ONE,
            },
        ];
        geometry.vertices_mut().push(Vector3::ZERO);
        *geometry.skin_weights_mut() = vec![Vector4::new(2.0, 2.0, 0.0, 0.0)];
        *geometry.skin_indices_mut() = vec![Vector4::new(0.0, 1.0, 0.0, 0.0)];
        geometry.into_shared()
    }

    #[test]
    fn test_skeleton_is_built_and_posed() {
        let mut g = SceneGraph::new();
        let mesh = g.add_skinned_mesh(skeleton(), Material::default().into_shared()).unwrap();

        let skinned = g.skinned_mesh(mesh).unwrap();
        assert_eq!(skinned.bones.len(), 2);
        let (hip, knee) = (skinned.bones[0], skinned.bones[1]);
        assert_eq!(g.get(mesh).unwrap().children(), &[hip]);
        assert_eq!(g.get(hip).unwrap().children(), &[knee]);
        assert_eq!(g.child_by_name(mesh, "knee", true).unwrap(), Some(knee));

        assert_eq!(g.skin_matrix(knee).unwrap().position(), Vector3::new(0.0, 0.5, 0.0));

        // At rest every bone matrix is the identity.
        let skinned = g.skinned_mesh(mesh).unwrap();
        for chunk in skinned.bone_matrices.chunks(16) {
            let m = Matrix4::from_array(chunk).unwrap();
            assert!(m.approx_eq(&Matrix4::identity(), 1e-12));
        }

        let weights = skinned.geometry.borrow().skin_weights().to_vec();
        assert_eq!(weights, vec![Vector4::new(0.5, 0.5, 0.0, 0.0)]);
    }

    #[test]
    fn test_bone_matrices_follow_motion() {
        let mut g = SceneGraph::new();
        let mesh = g.add_skinned_mesh(skeleton(), Material::default().into_shared()).unwrap();
        let hip = g.skinned_mesh(mesh).unwrap().bones[0];

        g.get_mut(hip).unwrap().position = Vector3::new(2.0, 1.0, 0.0);
        g.update_matrix_world(mesh, false).unwrap();

        let skinned = g.skinned_mesh(mesh).unwrap();
        for chunk in skinned.bone_matrices.chunks(16) {
            let m = Matrix4::from_array(chunk).unwrap();
            assert_eq!(m.position(), Vector3::new(2.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_wrong_kind() {
        let mut g = SceneGraph::new();
        let group = g.insert(Object3D::group());
        assert!(matches!(g.skinned_mesh(group), Err(SceneError::WrongKind(_, _))));
    }
}
