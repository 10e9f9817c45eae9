//! Flattening geometry into GPU staging arrays
//!
//! Every renderable kind has its own layout: meshes expand each face into
//! three corners split into groups addressable by 16-bit indices, while
//! lines, particles and ribbons stage one entry per vertex. A sync pass only
//! rewrites the arrays whose source streams changed since the previous pass
//! and reports which ones it touched, so the caller uploads nothing else.
use std::collections::{BTreeMap, HashMap};

use log::trace;
use trois_math::Matrix4;

use crate::backend::{BufferHandle, BufferTarget};
use crate::geometry::{DirtyFlags, Geometry, Revisions};
use crate::material::Material;
use crate::{Object3D, ObjectKind, Result};

mod groups;
mod mesh;
mod particles;
mod points;

pub use groups::GeometryGroup;
pub use mesh::MeshLayout;
pub use particles::depth_order;
pub use points::PointArrays;

/// Largest vertex count a 16-bit index buffer can address.
pub const MAX_GROUP_VERTICES: usize = 65535;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncOptions {
    /// Split meshes so no group has more corners than this. Clamped to
    /// [`MAX_GROUP_VERTICES`].
    pub max_vertices_per_group: usize,
    /// Drop the staging arrays of non-dynamic geometry once uploaded.
    pub release_static_arrays: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_vertices_per_group: MAX_GROUP_VERTICES,
            release_static_arrays: true,
        }
    }
}

/// One staging array within a geometry's buffers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKey {
    Position,
    Normal,
    Color,
    Uv,
    Uv2,
    Tangent,
    SkinIndex,
    SkinWeight,
    Face,
    Line,
    LineDistance,
    MorphTarget(usize),
    MorphNormal(usize),
    Custom(String),
}

impl StreamKey {
    pub fn target(&self) -> BufferTarget {
        match self {
            StreamKey::Face | StreamKey::Line => BufferTarget::ElementArray,
            _ => BufferTarget::Array,
        }
    }
}

/// Borrowed contents of a staging array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamData<'a> {
    Float(&'a [f32]),
    Index(&'a [u16]),
}

impl<'a> StreamData<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        match *self {
            StreamData::Float(data) => bytemuck::cast_slice(data),
            StreamData::Index(data) => bytemuck::cast_slice(data),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StreamData::Float(data) => data.len(),
            StreamData::Index(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Staging arrays laid out for one renderable kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Staging {
    Mesh { layout: MeshLayout, groups: Vec<GeometryGroup> },
    Line(PointArrays),
    Particles(PointArrays),
    Ribbon(PointArrays),
}

impl Staging {
    pub fn groups(&self) -> &[GeometryGroup] {
        match self {
            Staging::Mesh { groups, .. } => groups,
            _ => &[],
        }
    }

    pub fn points(&self) -> Option<&PointArrays> {
        match self {
            Staging::Line(p) | Staging::Particles(p) | Staging::Ribbon(p) => Some(p),
            Staging::Mesh { .. } => None,
        }
    }

    pub fn stream(&self, group: usize, key: &StreamKey) -> Option<StreamData<'_>> {
        match self {
            Staging::Mesh { groups, .. } => groups.get(group)?.stream(key),
            Staging::Line(p) | Staging::Particles(p) | Staging::Ribbon(p) => {
                if group == 0 {
                    p.stream(key)
                } else {
                    None
                }
            }
        }
    }
}

/// Sync state kept alongside a geometry. Objects sharing the geometry
/// share it, so a stream is copied at most once per change.
#[derive(Debug, Default)]
pub struct GeometryBuffers {
    pub(crate) synced: Revisions,
    pub(crate) custom_synced: HashMap<String, u64>,
    pub(crate) staging: Option<Staging>,
    pub(crate) handles: BTreeMap<(usize, StreamKey), BufferHandle>,
}

impl GeometryBuffers {
    pub fn staging(&self) -> Option<&Staging> {
        self.staging.as_ref()
    }

    pub fn handle(&self, group: usize, key: &StreamKey) -> Option<BufferHandle> {
        self.handles.get(&(group, key.clone())).copied()
    }

    pub(crate) fn release_staging(&mut self) {
        self.staging = None;
    }

    /// Install freshly laid out staging, forgetting GPU buffers for
    /// streams the new layout no longer has.
    pub(crate) fn replace_staging(&mut self, staging: Staging) {
        self.handles.retain(|(group, key), _| staging.stream(*group, key).is_some());
        self.staging = Some(staging);
    }

    pub(crate) fn custom_dirty(&self, material: &Material, name: &str) -> bool {
        let current = material.attribute(name).map(|a| a.revision());
        current != self.custom_synced.get(name).copied()
    }
}

/// Streams rewritten by one sync pass, as `(group, stream)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub written: Vec<(usize, StreamKey)>,
}

impl SyncReport {
    pub(crate) fn push(&mut self, group: usize, key: StreamKey) {
        self.written.push((group, key));
    }

    pub fn contains(&self, group: usize, key: &StreamKey) -> bool {
        self.written.iter().any(|(g, k)| *g == group && k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// Bring the staging arrays of a renderable object up to date.
///
/// `view_projection` is `projection * view` of the active camera; only
/// depth-sorted particle systems use it. Non-renderable objects yield an
/// empty report.
pub fn sync_object(object: &Object3D, view_projection: &Matrix4, options: &SyncOptions) -> Result<SyncReport> {
    let Some((geometry, material)) = object.kind.renderable() else {
        return Ok(SyncReport::default());
    };
    let mut geometry = geometry.borrow_mut();
    let material = material.borrow();

    let report = match &object.kind {
        ObjectKind::Mesh(_) | ObjectKind::SkinnedMesh(_) => {
            sync_geometry(&mut geometry, &material, false, |g, m, b, dirty| {
                mesh::sync(g, m, b, dirty, options)
            })
        }
        ObjectKind::Line(_) => {
            sync_geometry(&mut geometry, &material, false, points::sync_line)
        }
        ObjectKind::Ribbon(_) => {
            sync_geometry(&mut geometry, &material, false, points::sync_ribbon)
        }
        ObjectKind::ParticleSystem(system) => {
            let order = system
                .sort_particles
                .then(|| depth_order(geometry.vertices(), &(view_projection * &object.matrix_world)));
            let sorted = order.is_some();
            sync_geometry(&mut geometry, &material, sorted, |g, m, b, dirty| {
                points::sync_particles(g, m, b, dirty, order.as_deref())
            })
        }
        _ => Ok(SyncReport::default()),
    }?;

    trace!("synced {} ({} streams)", object.id(), report.written.len());
    Ok(report)
}

/// Run one kind-specific pass with the geometry's buffers detached, then
/// record what is now in sync. Released staging is only rebuilt when
/// something changed, unless `always` is set.
fn sync_geometry<F>(geometry: &mut Geometry, material: &Material, always: bool, pass: F) -> Result<SyncReport>
where
    F: FnOnce(&Geometry, &Material, &mut GeometryBuffers, DirtyFlags) -> Result<SyncReport>,
{
    let dirty = geometry.dirty_flags();
    let mut buffers = geometry.buffers.take().unwrap_or_default();

    let custom_changed = material
        .attributes()
        .iter()
        .any(|a| buffers.custom_dirty(material, a.name()));
    if buffers.staging.is_none() && !dirty.any() && !custom_changed && !always {
        geometry.buffers = Some(buffers);
        return Ok(SyncReport::default());
    }

    let result = pass(geometry, material, &mut buffers, dirty);
    if result.is_ok() {
        buffers.synced = *geometry.revisions();
        buffers.custom_synced = material
            .attributes()
            .iter()
            .map(|a| (a.name().to_string(), a.revision()))
            .collect();
    }
    geometry.buffers = Some(buffers);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_bytes() {
        let floats = [1.0f32, 2.0];
        let data = StreamData::Float(&floats);
        assert_eq!(data.bytes().len(), 8);
        assert_eq!(data.len(), 2);

        let indices = [0u16, 1, 2];
        assert_eq!(StreamData::Index(&indices).bytes(), &[0, 0, 1, 0, 2, 0][..]);
    }

    #[test]
    fn test_targets() {
        assert_eq!(StreamKey::Face.target(), BufferTarget::ElementArray);
        assert_eq!(StreamKey::Line.target(), BufferTarget::ElementArray);
        assert_eq!(StreamKey::Custom("size".into()).target(), BufferTarget::Array);
        assert_eq!(SyncOptions::default().max_vertices_per_group, 65535);
    }
}
