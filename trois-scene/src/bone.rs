//! Skeleton joints
use trois_math::Matrix4;

use crate::{NodeId, ObjectKind, Result, SceneGraph};

/// A joint of a skinned mesh. Instead of a world matrix it accumulates a
/// skin matrix relative to the mesh that owns the skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bone {
    pub skin_matrix: Matrix4,
}

impl SceneGraph {
    /// Refresh the skin matrices of the bone chain rooted at `id`, with the
    /// same lazy forcing rule as the world-matrix sweep.
    pub fn update_bone(&mut self, id: NodeId, parent_skin: Option<Matrix4>, force: bool) -> Result<()> {
        let mut stack = vec![(id, parent_skin, force)];
        let mut others = Vec::new();

        while let Some((id, parent_skin, force)) = stack.pop() {
            let node = self.get_mut(id)?;
            if node.matrix_auto_update {
                node.update_matrix();
            }
            let matrix = node.matrix;
            let stale = node.matrix_world_needs_update;

            let ObjectKind::Bone(bone) = &mut node.kind else {
                others.push(id);
                continue;
            };

            let mut force = force;
            if force || stale {
                bone.skin_matrix = match parent_skin {
                    Some(parent) => parent * matrix,
                    None => matrix,
                };
                node.matrix_world_needs_update = false;
                force = true;
            }

            let skin = bone.skin_matrix;
            stack.extend(node.children.iter().rev().map(|&c| (c, Some(skin), force)));
        }

        for id in others {
            self.update_matrix_world(id, true)?;
        }
        Ok(())
    }
}
