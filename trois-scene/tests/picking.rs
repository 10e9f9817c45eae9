//! Picking through a camera into a small scene.

use trois_math::{Vector2, Vector3};
use trois_scene::{Camera, Face3, Geometry, Material, NodeId, Object3D, Raycaster, SceneGraph};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn quad(z: f64) -> Object3D {
    let mut g = Geometry::new();
    *g.vertices_mut() = vec![
        Vector3::new(-1.0, -1.0, 0.0),
        Vector3::new(1.0, -1.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(-1.0, 1.0, 0.0),
    ];
    *g.faces_mut() = vec![Face3::new(0, 1, 2), Face3::new(0, 2, 3)];
    // Offset so the view axis lands inside the first triangle.
    Object3D::mesh(g.into_shared(), Material::default().into_shared()).with_position(Vector3::new(-0.5, 0.25, z))
}

struct Stage {
    graph: SceneGraph,
    scene: NodeId,
    near: NodeId,
    far: NodeId,
}

fn stage() -> Stage {
    let mut graph = SceneGraph::new();
    let scene = graph.insert(Object3D::group());
    let far = graph.insert(quad(-4.0));
    let near = graph.insert(quad(0.0));
    let mut hidden = quad(2.0);
    hidden.visible = false;
    let hidden = graph.insert(hidden);
    for id in [far, near, hidden] {
        graph.add(scene, id).unwrap();
    }
    graph.update().unwrap();
    Stage { graph, scene, near, far }
}

#[test]
fn perspective_pick_returns_nearest_first() {
    init();
    let mut stage = stage();
    let camera = stage
        .graph
        .insert(Object3D::camera(Camera::perspective(90.0, 1.0, 1.0, 100.0)).with_position(Vector3::new(0.0, 0.0, 10.0)));
    stage.graph.update().unwrap();

    let mut caster = Raycaster::default();
    caster.set_from_camera(Vector2::ZERO, &stage.graph, camera).unwrap();
    let hits = caster.intersect_object(&stage.graph, stage.scene, true).unwrap();

    let objects: Vec<NodeId> = hits.iter().map(|h| h.object).collect();
    assert_eq!(objects, [stage.near, stage.far]);
    assert!((hits[0].distance - 10.0).abs() < 1e-9);
    assert!((hits[1].distance - 14.0).abs() < 1e-9);
    assert_eq!(hits[0].face_index, Some(0));
    assert!(hits[0].point.approx_eq(Vector3::new(0.0, 0.0, 0.0), 1e-9));

    // Without recursion only the group itself is tested.
    assert!(caster.intersect_object(&stage.graph, stage.scene, false).unwrap().is_empty());
}

#[test]
fn orthographic_pick_starts_on_the_near_plane() {
    init();
    let mut stage = stage();
    let camera = stage.graph.insert(
        Object3D::camera(Camera::orthographic(-2.0, 2.0, 2.0, -2.0, 0.1, 100.0))
            .with_position(Vector3::new(0.0, 0.0, 10.0)),
    );
    stage.graph.update().unwrap();

    let mut caster = Raycaster::default();
    caster.set_from_camera(Vector2::new(0.125, 0.0), &stage.graph, camera).unwrap();
    assert!(caster.ray.origin.approx_eq(Vector3::new(0.25, 0.0, 9.9), 1e-9));

    let hits = caster.intersect_objects(&stage.graph, &[stage.far, stage.near], false).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].object, stage.near);
    assert!((hits[0].distance - 9.9).abs() < 1e-9);
    assert!(hits[0].point.approx_eq(Vector3::new(0.25, 0.0, 0.0), 1e-9));

    // Nothing beyond the far limit.
    caster.params.far = 12.0;
    let hits = caster.intersect_objects(&stage.graph, &[stage.far, stage.near], false).unwrap();
    assert_eq!(hits.iter().map(|h| h.object).collect::<Vec<_>>(), [stage.near]);
}
