//! Arena of scene nodes and the world-matrix sweep
use std::collections::HashMap;

use log::{debug, warn};
use trois_math::Matrix4;

use crate::{IdAllocator, NodeId, Object3D, ObjectKind, Result, SceneError};

/// Owns every node. Parent links are plain ids; a node's children list is
/// the only place that decides the hierarchy.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<Object3D>>,
    ids: IdAllocator,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a detached object and give it an id.
    pub fn insert(&mut self, mut object: Object3D) -> NodeId {
        let id = self.ids.next_id();
        object.id = id;
        object.parent = None;
        object.children.clear();
        debug_assert_eq!(id.index(), self.nodes.len());
        self.nodes.push(Some(object));
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(Option::is_some)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: NodeId) -> Result<&Object3D> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(SceneError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Object3D> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(SceneError::NodeNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object3D> {
        self.nodes.iter().flatten()
    }

    /// Attach `child` under `parent`, detaching it from any previous parent
    /// first. Adding a node to itself is ignored with a warning.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent == child {
            warn!("node {child} can't be added as a child of itself");
            return Ok(());
        }
        self.get(parent)?;
        let previous = self.get(child)?.parent;
        if previous == Some(parent) {
            return Ok(());
        }
        if self.is_ancestor(child, parent)? {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }
        if let Some(previous) = previous {
            self.detach(previous, child)?;
        }

        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`. Does nothing if it is not a child.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(child)?.parent == Some(parent) {
            self.detach(parent, child)?;
        }
        Ok(())
    }

    /// Take a node out of the graph. Its children become roots.
    pub fn destroy(&mut self, id: NodeId) -> Result<Object3D> {
        if let Some(parent) = self.get(id)?.parent {
            self.detach(parent, id)?;
        }
        let mut object = self.nodes[id.index()]
            .take()
            .ok_or(SceneError::NodeNotFound(id))?;
        for &child in &object.children {
            if let Some(Some(node)) = self.nodes.get_mut(child.index()) {
                node.parent = None;
            }
        }
        object.children.clear();
        object.id = NodeId::DETACHED;
        debug!("destroyed node {id}");
        Ok(object)
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get_mut(parent)?.children.retain(|&c| c != child);
        self.get_mut(child)?.parent = None;
        Ok(())
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> Result<bool> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent;
        }
        Ok(false)
    }

    /// Recompute world matrices below and including `id`.
    ///
    /// A node whose world matrix is stale (or that is reached with `force`)
    /// refreshes it and forces its whole subtree to refresh as well.
    pub fn update_matrix_world(&mut self, id: NodeId, force: bool) -> Result<()> {
        let mut stack = vec![(id, force)];
        while let Some((id, force)) = stack.pop() {
            let parent = self.get(id)?.parent;

            if matches!(self.get(id)?.kind, ObjectKind::Bone(_)) {
                let parent_skin = parent.and_then(|p| self.skin_matrix(p));
                self.update_bone(id, parent_skin, force)?;
                continue;
            }

            let parent_world = match parent {
                Some(p) => Some(self.get(p)?.matrix_world),
                None => None,
            };
            let node = self.get_mut(id)?;
            let force = node.update_world(parent_world.as_ref(), force);
            let children = node.children.clone();

            if matches!(node.kind, ObjectKind::SkinnedMesh(_)) {
                for child in children.into_iter().rev() {
                    if matches!(self.get(child)?.kind, ObjectKind::Bone(_)) {
                        self.update_bone(child, None, false)?;
                    } else {
                        stack.push((child, true));
                    }
                }
                self.refresh_bone_matrices(id)?;
            } else {
                stack.extend(children.into_iter().rev().map(|c| (c, force)));
            }
        }
        Ok(())
    }

    /// Update every root and its subtree.
    pub fn update(&mut self) -> Result<()> {
        let roots: Vec<NodeId> = self.iter().filter(|n| n.parent.is_none()).map(|n| n.id).collect();
        for root in roots {
            self.update_matrix_world(root, false)?;
        }
        Ok(())
    }

    /// Visit `id` and then its descendants, depth first.
    pub fn traverse(&self, id: NodeId, mut visit: impl FnMut(&Object3D)) -> Result<()> {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.get(id)?;
            visit(node);
            stack.extend(node.children.iter().rev());
        }
        Ok(())
    }

    /// Every node below `id` in depth-first order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.traverse(id, |node| out.push(node.id))?;
        out.remove(0);
        Ok(out)
    }

    /// First child named `name`. With `recursive`, each child's subtree is
    /// searched before moving on to the next sibling.
    pub fn child_by_name(&self, id: NodeId, name: &str, recursive: bool) -> Result<Option<NodeId>> {
        for &child in &self.get(id)?.children {
            if self.get(child)?.name == name {
                return Ok(Some(child));
            }
            if recursive {
                if let Some(found) = self.child_by_name(child, name, true)? {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    /// Deep copy of the subtree at `id`. The copy is a new root; geometry
    /// and material stay shared. Bone and level references inside the
    /// subtree are remapped to the copies.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let mut order = vec![id];
        order.extend(self.descendants(id)?);

        let mut mapping = HashMap::with_capacity(order.len());
        for &old in &order {
            let copy = self.get(old)?.clone();
            mapping.insert(old, self.insert(copy));
        }

        for &old in &order[1..] {
            let old_parent = self.get(old)?.parent.ok_or(SceneError::NodeNotFound(old))?;
            self.add(mapping[&old_parent], mapping[&old])?;
        }

        for &new in mapping.values() {
            match &mut self.get_mut(new)?.kind {
                ObjectKind::SkinnedMesh(mesh) => {
                    for bone in &mut mesh.bones {
                        *bone = mapping.get(bone).copied().unwrap_or(*bone);
                    }
                }
                ObjectKind::Lod(lod) => lod.remap(&mapping),
                _ => {}
            }
        }

        Ok(mapping[&id])
    }

    pub(crate) fn skin_matrix(&self, id: NodeId) -> Option<Matrix4> {
        match &self.get(id).ok()?.kind {
            ObjectKind::Bone(bone) => Some(bone.skin_matrix),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trois_math::Vector3;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn named(graph: &mut SceneGraph, name: &str) -> NodeId {
        graph.insert(Object3D::group().with_name(name))
    }

    #[test]
    fn test_add_reparents() {
        let mut g = SceneGraph::new();
        let a = named(&mut g, "a");
        let b = named(&mut g, "b");
        let c = named(&mut g, "c");

        g.add(a, c).unwrap();
        g.add(a, c).unwrap();
        assert_eq!(g.get(a).unwrap().children(), &[c]);

        g.add(b, c).unwrap();
        assert!(g.get(a).unwrap().children().is_empty());
        assert_eq!(g.get(b).unwrap().children(), &[c]);
        assert_eq!(g.get(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_add_rejects_self_and_cycles() {
        init();
        let mut g = SceneGraph::new();
        let a = named(&mut g, "a");
        let b = named(&mut g, "b");
        g.add(a, a).unwrap();
        assert!(g.get(a).unwrap().children().is_empty());

        g.add(a, b).unwrap();
        assert!(matches!(g.add(b, a), Err(SceneError::WouldCreateCycle { .. })));
    }

    #[test]
    fn test_remove_and_destroy() {
        let mut g = SceneGraph::new();
        let a = named(&mut g, "a");
        let b = named(&mut g, "b");
        let c = named(&mut g, "c");
        g.add(a, b).unwrap();
        g.add(b, c).unwrap();

        g.remove(a, c).unwrap();
        assert_eq!(g.get(c).unwrap().parent(), Some(b));

        let removed = g.destroy(b).unwrap();
        assert_eq!(removed.name, "b");
        assert!(!g.contains(b));
        assert!(g.get(a).unwrap().children().is_empty());
        assert_eq!(g.get(c).unwrap().parent(), None);
        assert!(matches!(g.get(b), Err(SceneError::NodeNotFound(_))));
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_forced_subtree_refresh() {
        let mut g = SceneGraph::new();
        let root = g.insert(Object3D::group());
        let mid = g.insert(Object3D::group());
        let leaf = g.insert(Object3D::group().with_position(Vector3::Z));
        g.add(root, mid).unwrap();
        g.add(mid, leaf).unwrap();
        g.update_matrix_world(root, false).unwrap();

        for id in [mid, leaf] {
            g.get_mut(id).unwrap().matrix_auto_update = false;
        }
        g.get_mut(root).unwrap().position = Vector3::new(0.0, 7.0, 0.0);
        g.update_matrix_world(root, false).unwrap();

        let leaf = g.get(leaf).unwrap();
        assert!(!leaf.matrix_world_needs_update);
        assert_eq!(leaf.world_position(), Vector3::new(0.0, 7.0, 1.0));
    }

    #[test]
    fn test_clean_subtree_is_left_alone() {
        let mut g = SceneGraph::new();
        let root = g.insert(Object3D::group());
        let child = g.insert(Object3D::group());
        g.add(root, child).unwrap();
        g.update_matrix_world(root, false).unwrap();

        for id in [root, child] {
            g.get_mut(id).unwrap().matrix_auto_update = false;
        }
        g.get_mut(child).unwrap().matrix.make_translation(3.0, 0.0, 0.0);
        g.update_matrix_world(root, false).unwrap();
        assert_eq!(g.get(child).unwrap().world_position(), Vector3::ZERO);

        g.get_mut(child).unwrap().matrix_world_needs_update = true;
        g.update_matrix_world(root, false).unwrap();
        assert_eq!(g.get(child).unwrap().world_position(), Vector3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_lookup_and_traversal() {
        let mut g = SceneGraph::new();
        let root = named(&mut g, "root");
        let a = named(&mut g, "a");
        let a1 = named(&mut g, "target");
        let b = named(&mut g, "b");
        let b1 = named(&mut g, "target");
        g.add(root, a).unwrap();
        g.add(a, a1).unwrap();
        g.add(root, b).unwrap();
        g.add(b, b1).unwrap();

        assert_eq!(g.descendants(root).unwrap(), vec![a, a1, b, b1]);
        assert_eq!(g.child_by_name(root, "target", false).unwrap(), None);
        assert_eq!(g.child_by_name(root, "target", true).unwrap(), Some(a1));
        assert_eq!(g.child_by_name(root, "b", false).unwrap(), Some(b));

        let mut names = Vec::new();
        g.traverse(root, |n| names.push(n.name.clone())).unwrap();
        assert_eq!(names, ["root", "a", "target", "b", "target"]);
    }

    #[test]
    fn test_clone_subtree() {
        let mut g = SceneGraph::new();
        let root = named(&mut g, "root");
        let child = g.insert(Object3D::group().with_name("child").with_position(Vector3::X));
        g.add(root, child).unwrap();

        let copy = g.clone_subtree(root).unwrap();
        assert_ne!(copy, root);
        assert_eq!(g.get(copy).unwrap().parent(), None);
        let copied_child = g.get(copy).unwrap().children()[0];
        assert_ne!(copied_child, child);
        assert_eq!(g.get(copied_child).unwrap().position, Vector3::X);
        assert_eq!(g.get(root).unwrap().children(), &[child]);
    }
}
