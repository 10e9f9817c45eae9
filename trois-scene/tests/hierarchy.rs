//! World-matrix propagation, re-parenting and level-of-detail switching.

use trois_math::Vector3;
use trois_scene::{Camera, Lod, NodeId, Object3D, ObjectKind, SceneGraph};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parent_and_child(graph: &mut SceneGraph) -> (NodeId, NodeId) {
    let parent = graph.insert(Object3D::group().with_position(Vector3::new(1.0, 0.0, 0.0)));
    let child = graph.insert(Object3D::group().with_position(Vector3::new(0.0, 1.0, 0.0)));
    graph.add(parent, child).unwrap();
    (parent, child)
}

#[test]
fn child_world_position_follows_parent() {
    init();
    let mut graph = SceneGraph::new();
    let (parent, child) = parent_and_child(&mut graph);

    graph.update_matrix_world(parent, false).unwrap();
    assert_eq!(graph.get(child).unwrap().matrix_world.position(), Vector3::new(1.0, 1.0, 0.0));
    assert_eq!(graph.get(child).unwrap().world_position(), Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn dirty_ancestor_forces_the_subtree() {
    init();
    let mut graph = SceneGraph::new();
    let (parent, child) = parent_and_child(&mut graph);
    graph.update_matrix_world(parent, false).unwrap();

    // The child's own transform never changes again, and it is clean.
    {
        let node = graph.get_mut(child).unwrap();
        node.matrix_auto_update = false;
        assert!(!node.matrix_world_needs_update);
    }
    graph.get_mut(parent).unwrap().position = Vector3::new(5.0, 0.0, 0.0);
    graph.update_matrix_world(parent, false).unwrap();
    assert_eq!(graph.get(child).unwrap().world_position(), Vector3::new(5.0, 1.0, 0.0));

    // With the whole chain frozen nothing is recomputed.
    graph.get_mut(parent).unwrap().matrix_auto_update = false;
    graph.get_mut(child).unwrap().position = Vector3::new(0.0, 9.0, 0.0);
    graph.update_matrix_world(parent, false).unwrap();
    assert_eq!(graph.get(child).unwrap().world_position(), Vector3::new(5.0, 1.0, 0.0));

    // An explicit local update marks only the child.
    graph.get_mut(child).unwrap().update_matrix();
    graph.update_matrix_world(parent, false).unwrap();
    assert_eq!(graph.get(child).unwrap().world_position(), Vector3::new(5.0, 9.0, 0.0));
}

#[test]
fn reparenting_moves_the_child() {
    init();
    let mut graph = SceneGraph::new();
    let (first, child) = parent_and_child(&mut graph);
    let second = graph.insert(Object3D::group().with_position(Vector3::new(0.0, 0.0, -3.0)));

    graph.add(second, child).unwrap();
    graph.add(second, child).unwrap();
    assert!(graph.get(first).unwrap().children().is_empty());
    assert_eq!(graph.get(second).unwrap().children(), &[child]);
    assert_eq!(graph.get(child).unwrap().parent(), Some(second));

    graph.update().unwrap();
    assert_eq!(graph.get(child).unwrap().world_position(), Vector3::new(0.0, 1.0, -3.0));

    let removed = graph.destroy(second).unwrap();
    assert!(removed.children().is_empty());
    assert_eq!(graph.get(child).unwrap().parent(), None);
    assert!(!graph.contains(second));
}

fn lod_scene(graph: &mut SceneGraph) -> (NodeId, [NodeId; 3]) {
    let lod = graph.insert(Object3D::new(ObjectKind::Lod(Lod::default())));
    let high = graph.insert(Object3D::group().with_name("high"));
    let medium = graph.insert(Object3D::group().with_name("medium"));
    let low = graph.insert(Object3D::group().with_name("low"));
    graph.add_lod_level(lod, low, 50.0).unwrap();
    graph.add_lod_level(lod, high, 0.0).unwrap();
    graph.add_lod_level(lod, medium, 10.0).unwrap();
    (lod, [high, medium, low])
}

#[test]
fn lod_shows_one_level_for_camera_depth() {
    init();
    let mut graph = SceneGraph::new();
    let (lod, [high, medium, low]) = lod_scene(&mut graph);
    let camera = graph.insert(Object3D::camera(Camera::default()).with_position(Vector3::new(0.0, 0.0, 30.0)));

    graph.update().unwrap();
    graph.update_lod(lod, camera).unwrap();
    let visible = |graph: &SceneGraph| [high, medium, low].map(|id| graph.get(id).unwrap().visible);
    assert_eq!(visible(&graph), [false, true, false]);

    graph.get_mut(camera).unwrap().position = Vector3::new(0.0, 0.0, 80.0);
    graph.update().unwrap();
    graph.update_lod(lod, camera).unwrap();
    assert_eq!(visible(&graph), [false, false, true]);

    graph.get_mut(camera).unwrap().position = Vector3::new(0.0, 0.0, 2.0);
    graph.update().unwrap();
    graph.update_lod(lod, camera).unwrap();
    assert_eq!(visible(&graph), [true, false, false]);
}

#[test]
fn cloned_lod_points_at_cloned_levels() {
    init();
    let mut graph = SceneGraph::new();
    let (lod, levels) = lod_scene(&mut graph);

    let copy = graph.clone_subtree(lod).unwrap();
    let copied_levels: Vec<NodeId> = graph.lod(copy).unwrap().levels().iter().map(|l| l.object).collect();
    assert_eq!(copied_levels.len(), 3);
    for id in &copied_levels {
        assert!(!levels.contains(id));
        assert_eq!(graph.get(*id).unwrap().parent(), Some(copy));
    }
    let names: Vec<&str> = copied_levels.iter().map(|&id| graph.get(id).unwrap().name.as_str()).collect();
    assert_eq!(names, ["high", "medium", "low"]);
    assert_eq!(graph.child_by_name(copy, "medium", false).unwrap(), Some(copied_levels[1]));
}
