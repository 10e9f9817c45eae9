//! Back-to-front ordering of particles
use trois_math::{Matrix4, Vector3};

/// Vertex indices ordered by descending projected depth under `matrix`
/// (`projection * view * world`), so the farthest particle is drawn first.
/// Equal depths keep their original order.
pub fn depth_order(vertices: &[Vector3], matrix: &Matrix4) -> Vec<usize> {
    let mut depths: Vec<(f64, usize)> = vertices
        .iter()
        .enumerate()
        .map(|(i, v)| (v.apply_projection(matrix).z, i))
        .collect();
    depths.sort_by(|a, b| b.0.total_cmp(&a.0));
    depths.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_farthest_first() {
        let mut projection = Matrix4::identity();
        projection.make_perspective(90.0, 1.0, 1.0, 100.0);
        let vertices = [
            Vector3::new(0.0, 0.0, -5.0),
            Vector3::new(0.0, 0.0, -50.0),
            Vector3::new(0.0, 0.0, -2.0),
            Vector3::new(1.0, 0.0, -50.0),
        ];
        assert_eq!(depth_order(&vertices, &projection), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_identity_sorts_by_z() {
        let vertices = [Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 3.0), Vector3::ZERO];
        assert_eq!(depth_order(&vertices, &Matrix4::identity()), vec![1, 0, 2]);
        assert!(depth_order(&[], &Matrix4::identity()).is_empty());
    }
}
