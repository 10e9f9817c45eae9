//! Splitting faces into independently buffered groups
use std::collections::{BTreeMap, HashMap};

use log::debug;
use trois_math::{Color, Vector2, Vector3, Vector4};

use super::mesh::MeshLayout;
use super::{StreamData, StreamKey, MAX_GROUP_VERTICES};
use crate::geometry::Face3;

/// Staging arrays for a run of faces sharing one material index. Every
/// face is expanded into three corners, so a group never holds more
/// corners than a 16-bit index can address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryGroup {
    pub material_index: usize,
    /// Indices into the geometry's face list, in staging order.
    pub faces: Vec<usize>,

    pub positions: Vec<f32>,
    pub normals: Option<Vec<f32>>,
    pub colors: Option<Vec<f32>>,
    pub uvs: Option<Vec<f32>>,
    pub uvs2: Option<Vec<f32>>,
    pub tangents: Option<Vec<f32>>,
    pub skin_indices: Option<Vec<f32>>,
    pub skin_weights: Option<Vec<f32>>,
    pub morph_targets: Vec<Vec<f32>>,
    pub morph_normals: Vec<Vec<f32>>,

    /// Three indices per face for triangle drawing.
    pub face_indices: Vec<u16>,
    /// Six indices per face for wireframe drawing.
    pub line_indices: Vec<u16>,

    pub custom: BTreeMap<String, Vec<f32>>,
}

impl GeometryGroup {
    /// Zeroed arrays sized for `faces` under `layout`.
    pub(crate) fn new(material_index: usize, faces: Vec<usize>, layout: &MeshLayout) -> Self {
        let corners = faces.len() * 3;
        let sized = |enabled: bool, arity: usize| enabled.then(|| vec![0.0; corners * arity]);

        Self {
            material_index,
            positions: vec![0.0; corners * 3],
            normals: sized(layout.normals, 3),
            colors: sized(layout.colors, 3),
            uvs: sized(layout.uvs, 2),
            uvs2: sized(layout.uvs2, 2),
            tangents: sized(layout.tangents, 4),
            skin_indices: sized(layout.skin, 4),
            skin_weights: sized(layout.skin, 4),
            morph_targets: vec![vec![0.0; corners * 3]; layout.morph_targets],
            morph_normals: vec![vec![0.0; corners * 3]; layout.morph_normals],
            face_indices: vec![0; faces.len() * 3],
            line_indices: vec![0; faces.len() * 6],
            custom: layout
                .custom
                .iter()
                .map(|(name, arity)| (name.clone(), vec![0.0; corners * arity]))
                .collect(),
            faces,
        }
    }

    /// Number of staged corners.
    pub fn vertex_count(&self) -> usize {
        self.faces.len() * 3
    }

    pub fn stream(&self, key: &StreamKey) -> Option<StreamData<'_>> {
        fn float(data: &Option<Vec<f32>>) -> Option<StreamData<'_>> {
            data.as_deref().map(StreamData::Float)
        }

        match key {
            StreamKey::Position => Some(StreamData::Float(&self.positions)),
            StreamKey::Normal => float(&self.normals),
            StreamKey::Color => float(&self.colors),
            StreamKey::Uv => float(&self.uvs),
            StreamKey::Uv2 => float(&self.uvs2),
            StreamKey::Tangent => float(&self.tangents),
            StreamKey::SkinIndex => float(&self.skin_indices),
            StreamKey::SkinWeight => float(&self.skin_weights),
            StreamKey::Face => Some(StreamData::Index(&self.face_indices)),
            StreamKey::Line => Some(StreamData::Index(&self.line_indices)),
            StreamKey::LineDistance => None,
            StreamKey::MorphTarget(i) => self.morph_targets.get(*i).map(|d| StreamData::Float(d)),
            StreamKey::MorphNormal(i) => self.morph_normals.get(*i).map(|d| StreamData::Float(d)),
            StreamKey::Custom(name) => self.custom.get(name).map(|d| StreamData::Float(d)),
        }
    }
}

/// Assign faces to groups: one open group per material index, and a fresh
/// one whenever the next face would push the open group past
/// `max_vertices`. Groups come out in the order they were opened.
pub(crate) fn plan_groups(faces: &[Face3], max_vertices: usize) -> Vec<(usize, Vec<usize>)> {
    let max_vertices = max_vertices.clamp(3, MAX_GROUP_VERTICES);
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut open: HashMap<usize, usize> = HashMap::new();

    for (index, face) in faces.iter().enumerate() {
        let slot = match open.get(&face.material_index) {
            Some(&slot) if (groups[slot].1.len() + 1) * 3 <= max_vertices => slot,
            _ => {
                groups.push((face.material_index, Vec::new()));
                open.insert(face.material_index, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].1.push(index);
    }

    if groups.len() > 1 {
        debug!("split {} faces into {} groups", faces.len(), groups.len());
    }
    groups
}

pub(crate) fn put_vector2(out: &mut [f32], slot: usize, v: Vector2) {
    out[slot * 2] = v.x as f32;
    out[slot * 2 + 1] = v.y as f32;
}

pub(crate) fn put_vector3(out: &mut [f32], slot: usize, v: Vector3) {
    out[slot * 3] = v.x as f32;
    out[slot * 3 + 1] = v.y as f32;
    out[slot * 3 + 2] = v.z as f32;
}

pub(crate) fn put_vector4(out: &mut [f32], slot: usize, v: Vector4) {
    out[slot * 4] = v.x as f32;
    out[slot * 4 + 1] = v.y as f32;
    out[slot * 4 + 2] = v.z as f32;
    out[slot * 4 + 3] = v.w as f32;
}

pub(crate) fn put_color(out: &mut [f32], slot: usize, c: Color) {
    out[slot * 3] = c.r as f32;
    out[slot * 3 + 1] = c.g as f32;
    out[slot * 3 + 2] = c.b as f32;
}
