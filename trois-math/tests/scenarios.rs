//! Bounding-volume algebra, culling and picking scenarios, and the sentinel
//! values returned for degenerate input.

use trois_math::{
    Box3, Frustum, Matrix3, Matrix4, Plane, Quaternion, Ray, Sphere, Triangle, Vector3, Vector4,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn boxes() -> Vec<Box3> {
    vec![
        Box3::EMPTY,
        Box3::new(Vector3::ZERO, Vector3::ONE),
        Box3::new(Vector3::splat(-2.0), Vector3::new(0.5, 0.5, 0.5)),
        Box3::new(Vector3::new(3.0, -1.0, 0.0), Vector3::new(4.0, 1.0, 6.0)),
    ]
}

#[test]
fn box_union_and_intersect_commute() {
    for a in boxes() {
        for b in boxes() {
            let mut ab = a;
            ab.union(&b);
            let mut ba = b;
            ba.union(&a);
            assert_eq!(ab, ba);

            let mut ab = a;
            ab.intersect(&b);
            let mut ba = b;
            ba.intersect(&a);
            assert_eq!(ab, ba);
        }
    }
}

#[test]
fn box_operations_are_idempotent() {
    for a in boxes() {
        let mut u = a;
        u.union(&a);
        assert_eq!(u, a);

        let mut i = a;
        i.intersect(&a);
        assert_eq!(i, a);

        if !a.is_empty() {
            let mut grown = a;
            grown.expand_by_point(a.center());
            assert_eq!(grown, a);
        }
    }
}

#[test]
fn empty_box_is_neutral_for_union() {
    for a in boxes() {
        let mut u = Box3::EMPTY;
        u.union(&a);
        assert_eq!(u, a);
    }
}

#[test]
fn orthographic_frustum_culls_points() {
    let mut m = Matrix4::identity();
    m.make_orthographic(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
    let f = Frustum::from_matrix(&m);

    assert!(f.contains_point(Vector3::new(0.0, 0.0, -50.0)));
    assert!(!f.contains_point(Vector3::ZERO));
    assert!(!f.contains_point(Vector3::new(0.0, 0.0, -101.0)));
}

#[test]
fn camera_frustum_culls_spheres() {
    let mut projection = Matrix4::identity();
    projection.make_perspective(50.0, 1.0, 0.1, 100.0);

    let mut camera_world = Matrix4::identity();
    camera_world.set_position(Vector3::new(0.0, 0.0, 10.0));
    let view = camera_world.inverse();

    let f = Frustum::from_matrix(&(projection * view));
    assert!(f.intersects_sphere(&Sphere::new(Vector3::ZERO, 1.0)));
    assert!(!f.intersects_sphere(&Sphere::new(Vector3::new(0.0, 0.0, 20.0), 1.0)));
    assert!(!f.intersects_sphere(&Sphere::new(Vector3::new(50.0, 0.0, 0.0), 1.0)));
}

#[test]
fn ray_picks_box_faces() {
    let b = Box3::new(Vector3::splat(-1.0), Vector3::ONE);

    let toward = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(toward.intersect_box(&b), Some(Vector3::new(0.0, 0.0, 1.0)));

    let diagonal = Ray::new(Vector3::splat(-5.0), Vector3::ONE);
    let hit = diagonal.intersect_box(&b).unwrap();
    assert!(hit.approx_eq(Vector3::splat(-1.0), 1e-12));

    let away = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::Z);
    assert_eq!(away.intersect_box(&b), None);

    let mut m = Matrix4::identity();
    m.make_translation(10.0, 0.0, 0.0);
    let mut moved = b;
    moved.apply_matrix4(&m);
    assert_eq!(toward.intersect_box(&moved), None);
}

#[test]
fn degenerate_input_yields_sentinels() {
    init();

    assert_eq!(Vector3::ZERO.normalize(), Vector3::ZERO);
    assert_eq!(Vector3::ONE.divide_scalar(0.0), Vector3::ZERO);
    assert_eq!(Vector4::new(1.0, 2.0, 3.0, 4.0).divide_scalar(0.0), Vector4::new(0.0, 0.0, 0.0, 1.0));
    assert_eq!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalize(), Quaternion::IDENTITY);

    assert_eq!(Matrix4::zero().inverse(), Matrix4::zero());
    assert_eq!(Matrix3::inverse_of_matrix4(&Matrix4::zero()), Matrix3::zero());

    let point = Triangle::new(Vector3::ZERO, Vector3::X, Vector3::new(2.0, 0.0, 0.0));
    assert_eq!(point.barycoord_from_point(Vector3::ONE), Vector3::new(-2.0, -1.0, -1.0));
    assert_eq!(point.normal(), Vector3::ZERO);

    let parallel = Ray::new(Vector3::Y, Vector3::X);
    assert_eq!(parallel.intersect_plane(&Plane::new(Vector3::Y, 0.0)), None);

    assert!(Box3::default().is_empty());
    assert!(Sphere::default().is_empty());
}
