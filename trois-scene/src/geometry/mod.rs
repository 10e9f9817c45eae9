//! CPU-side vertex and face data with per-stream change tracking
use std::cell::RefCell;
use std::rc::Rc;

use trois_math::{Box3, Color, Quaternion, Sphere, Vector2, Vector3, Vector4};

use crate::buffers::GeometryBuffers;

mod compute;

pub type SharedGeometry = Rc<RefCell<Geometry>>;

/// A group of staging arrays whose contents derive from the same geometry
/// data and are rewritten together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Vertices,
    Colors,
    Normals,
    Uvs,
    Elements,
    MorphTargets,
    Tangents,
    LineDistances,
}

impl Stream {
    pub const ALL: [Stream; 8] = [
        Stream::Vertices,
        Stream::Colors,
        Stream::Normals,
        Stream::Uvs,
        Stream::Elements,
        Stream::MorphTargets,
        Stream::Tangents,
        Stream::LineDistances,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Monotonic revision counter per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Revisions([u64; 8]);

impl Revisions {
    pub fn get(&self, stream: Stream) -> u64 {
        self.0[stream.index()]
    }

    fn bump(&mut self, stream: Stream) {
        self.0[stream.index()] += 1;
    }
}

/// Which streams changed since the last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags {
    pub vertices: bool,
    pub colors: bool,
    pub normals: bool,
    pub uvs: bool,
    pub elements: bool,
    pub morph_targets: bool,
    pub tangents: bool,
    pub line_distances: bool,
}

impl DirtyFlags {
    pub const ALL: DirtyFlags = DirtyFlags {
        vertices: true,
        colors: true,
        normals: true,
        uvs: true,
        elements: true,
        morph_targets: true,
        tangents: true,
        line_distances: true,
    };

    pub fn between(current: &Revisions, synced: &Revisions) -> Self {
        let changed = |s| current.get(s) != synced.get(s);
        Self {
            vertices: changed(Stream::Vertices),
            colors: changed(Stream::Colors),
            normals: changed(Stream::Normals),
            uvs: changed(Stream::Uvs),
            elements: changed(Stream::Elements),
            morph_targets: changed(Stream::MorphTargets),
            tangents: changed(Stream::Tangents),
            line_distances: changed(Stream::LineDistances),
        }
    }

    pub fn get(&self, stream: Stream) -> bool {
        match stream {
            Stream::Vertices => self.vertices,
            Stream::Colors => self.colors,
            Stream::Normals => self.normals,
            Stream::Uvs => self.uvs,
            Stream::Elements => self.elements,
            Stream::MorphTargets => self.morph_targets,
            Stream::Tangents => self.tangents,
            Stream::LineDistances => self.line_distances,
        }
    }

    pub fn any(&self) -> bool {
        Stream::ALL.iter().any(|&s| self.get(s))
    }
}

/// Triangle referencing three vertices by index, with optional per-corner
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Face3 {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub normal: Vector3,
    /// Empty, or one normal per corner.
    pub vertex_normals: Vec<Vector3>,
    pub color: Color,
    /// Empty, or one color per corner.
    pub vertex_colors: Vec<Color>,
    /// Empty, or one tangent per corner with handedness in `w`.
    pub vertex_tangents: Vec<Vector4>,
    pub material_index: usize,
    pub centroid: Vector3,
}

impl Face3 {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self {
            a,
            b,
            c,
            normal: Vector3::ZERO,
            vertex_normals: Vec::new(),
            color: Color::WHITE,
            vertex_colors: Vec::new(),
            vertex_tangents: Vec::new(),
            material_index: 0,
            centroid: Vector3::ZERO,
        }
    }

    pub fn with_material_index(mut self, index: usize) -> Self {
        self.material_index = index;
        self
    }

    pub fn with_normal(mut self, normal: Vector3) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphTarget {
    pub name: String,
    pub vertices: Vec<Vector3>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphNormals {
    pub face_normals: Vec<Vector3>,
    pub vertex_normals: Vec<[Vector3; 3]>,
}

/// Rest pose of one bone of a skinned mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneDescription {
    /// Index of the parent bone, `None` for bones attached to the mesh.
    pub parent: Option<usize>,
    pub name: String,
    pub position: Vector3,
    pub rotation: Quaternion,
    pub scale: Vector3,
}

/// Vertex, face and attribute data shared by renderable nodes.
///
/// Every `*_mut` accessor bumps the revision of the streams derived from
/// what it hands out, so the next buffer sync rewrites exactly those
/// staging arrays.
#[derive(Debug, Default)]
pub struct Geometry {
    vertices: Vec<Vector3>,
    colors: Vec<Color>,
    normals: Vec<Vector3>,
    faces: Vec<Face3>,
    face_vertex_uvs: [Vec<[Vector2; 3]>; 2],
    morph_targets: Vec<MorphTarget>,
    morph_normals: Vec<MorphNormals>,
    skin_weights: Vec<Vector4>,
    skin_indices: Vec<Vector4>,
    line_distances: Vec<f64>,

    pub bones: Vec<BoneDescription>,
    pub bounding_box: Option<Box3>,
    pub bounding_sphere: Option<Sphere>,
    pub has_tangents: bool,
    /// Keep staging arrays after upload so later edits are patched in place.
    pub dynamic: bool,

    revisions: Revisions,
    pub(crate) buffers: Option<GeometryBuffers>,
}

impl Clone for Geometry {
    /// The copy starts without staging buffers.
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            colors: self.colors.clone(),
            normals: self.normals.clone(),
            faces: self.faces.clone(),
            face_vertex_uvs: self.face_vertex_uvs.clone(),
            morph_targets: self.morph_targets.clone(),
            morph_normals: self.morph_normals.clone(),
            skin_weights: self.skin_weights.clone(),
            skin_indices: self.skin_indices.clone(),
            line_distances: self.line_distances.clone(),
            bones: self.bones.clone(),
            bounding_box: self.bounding_box,
            bounding_sphere: self.bounding_sphere,
            has_tangents: self.has_tangents,
            dynamic: self.dynamic,
            revisions: self.revisions,
            buffers: None,
        }
    }
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedGeometry {
        Rc::new(RefCell::new(self))
    }

    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut Vec<Vector3> {
        self.revisions.bump(Stream::Vertices);
        &mut self.vertices
    }

    /// Per-vertex colors of lines, particles and ribbons.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut Vec<Color> {
        self.revisions.bump(Stream::Colors);
        &mut self.colors
    }

    /// Per-vertex normals of ribbons.
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    pub fn normals_mut(&mut self) -> &mut Vec<Vector3> {
        self.revisions.bump(Stream::Normals);
        &mut self.normals
    }

    pub fn faces(&self) -> &[Face3] {
        &self.faces
    }

    /// Faces carry topology, normals, colors and tangents, so all of those
    /// streams are marked.
    pub fn faces_mut(&mut self) -> &mut Vec<Face3> {
        for stream in [Stream::Elements, Stream::Normals, Stream::Colors, Stream::Tangents] {
            self.revisions.bump(stream);
        }
        &mut self.faces
    }

    /// Per-face corner UVs of layer 0 or 1.
    pub fn face_vertex_uvs(&self, layer: usize) -> &[[Vector2; 3]] {
        &self.face_vertex_uvs[layer]
    }

    pub fn face_vertex_uvs_mut(&mut self, layer: usize) -> &mut Vec<[Vector2; 3]> {
        self.revisions.bump(Stream::Uvs);
        &mut self.face_vertex_uvs[layer]
    }

    pub fn morph_targets(&self) -> &[MorphTarget] {
        &self.morph_targets
    }

    pub fn morph_targets_mut(&mut self) -> &mut Vec<MorphTarget> {
        self.revisions.bump(Stream::MorphTargets);
        &mut self.morph_targets
    }

    pub fn morph_normals(&self) -> &[MorphNormals] {
        &self.morph_normals
    }

    pub fn morph_normals_mut(&mut self) -> &mut Vec<MorphNormals> {
        self.revisions.bump(Stream::MorphTargets);
        &mut self.morph_normals
    }

    pub fn skin_weights(&self) -> &[Vector4] {
        &self.skin_weights
    }

    /// Skin data is staged together with positions.
    pub fn skin_weights_mut(&mut self) -> &mut Vec<Vector4> {
        self.revisions.bump(Stream::Vertices);
        &mut self.skin_weights
    }

    pub fn skin_indices(&self) -> &[Vector4] {
        &self.skin_indices
    }

    pub fn skin_indices_mut(&mut self) -> &mut Vec<Vector4> {
        self.revisions.bump(Stream::Vertices);
        &mut self.skin_indices
    }

    pub fn line_distances(&self) -> &[f64] {
        &self.line_distances
    }

    pub fn line_distances_mut(&mut self) -> &mut Vec<f64> {
        self.revisions.bump(Stream::LineDistances);
        &mut self.line_distances
    }

    /// Mark a stream changed without touching the data, e.g. after editing
    /// through a handle obtained earlier.
    pub fn mark_needs_update(&mut self, stream: Stream) {
        self.revisions.bump(stream);
    }

    pub fn revisions(&self) -> &Revisions {
        &self.revisions
    }

    /// Streams changed since the last sync. Before the first sync every
    /// stream is dirty.
    pub fn dirty_flags(&self) -> DirtyFlags {
        match &self.buffers {
            Some(buffers) => DirtyFlags::between(&self.revisions, &buffers.synced),
            None => DirtyFlags::ALL,
        }
    }

    /// Staging state, present once the geometry has been synced.
    pub fn buffers(&self) -> Option<&GeometryBuffers> {
        self.buffers.as_ref()
    }

    pub(crate) fn buffers_mut(&mut self) -> Option<&mut GeometryBuffers> {
        self.buffers.as_mut()
    }

    /// Scale every skin weight so its components sum to one. All-zero
    /// weights bind fully to the first influence.
    pub fn normalize_skin_weights(&mut self) {
        for weight in self.skin_weights_mut() {
            let sum = weight.length_manhattan();
            *weight = if sum > 0.0 {
                weight.multiply_scalar(1.0 / sum)
            } else {
                Vector4::new(1.0, 0.0, 0.0, 0.0)
            };
        }
    }
}
