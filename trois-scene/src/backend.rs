//! GPU buffer seam and the per-frame sync driver
use log::{debug, error, trace};
use trois_math::{Frustum, Matrix4};

use crate::buffers::{self, SyncOptions, SyncReport};
use crate::culling::intersects_object;
use crate::{NodeId, Object3D, ObjectKind, Result, SceneGraph};

/// Opaque name of a buffer owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attributes.
    Array,
    /// 16-bit indices.
    ElementArray,
}

/// The buffer operations staging needs from a graphics API.
pub trait GpuBackend {
    fn allocate(&mut self, target: BufferTarget) -> BufferHandle;

    fn bind(&mut self, target: BufferTarget, handle: BufferHandle);

    /// Replace the contents of the buffer bound to `target`. `dynamic`
    /// hints that the contents will be rewritten often.
    fn upload(&mut self, target: BufferTarget, data: &[u8], dynamic: bool);
}

/// Counters from one [`FrameSync::render_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Renderable nodes whose sync pass succeeded.
    pub synced: usize,
    /// Renderable nodes outside the view frustum.
    pub culled: usize,
    /// Renderable nodes whose sync pass failed.
    pub skipped: usize,
    /// Streams handed to the backend.
    pub uploads: usize,
}

/// Walks a scene once per frame, keeps staging arrays current and uploads
/// the streams each pass rewrote.
#[derive(Debug)]
pub struct FrameSync<B: GpuBackend> {
    backend: B,
    pub options: SyncOptions,
}

impl<B: GpuBackend> FrameSync<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, SyncOptions::default())
    }

    pub fn with_options(backend: B, options: SyncOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Sync one node and upload what changed. Static geometry drops its
    /// staging arrays afterwards when the options ask for it.
    pub fn sync_object(&mut self, object: &Object3D, view_projection: &Matrix4) -> Result<SyncReport> {
        let report = buffers::sync_object(object, view_projection, &self.options)?;
        let Some(geometry) = object.geometry() else {
            return Ok(report);
        };
        let mut geometry = geometry.borrow_mut();
        let dynamic = geometry.dynamic;
        let Some(buffers) = geometry.buffers_mut() else {
            return Ok(report);
        };

        if let Some(staging) = &buffers.staging {
            for (group, key) in &report.written {
                let Some(data) = staging.stream(*group, key) else {
                    continue;
                };
                let target = key.target();
                let backend = &mut self.backend;
                let handle = *buffers
                    .handles
                    .entry((*group, key.clone()))
                    .or_insert_with(|| backend.allocate(target));
                self.backend.bind(target, handle);
                self.backend.upload(target, data.bytes(), dynamic);
                trace!("uploaded {:?} of group {} ({} bytes)", key, group, data.bytes().len());
            }
        }

        if !dynamic && self.options.release_static_arrays && buffers.staging.is_some() {
            buffers.release_staging();
            debug!("released staging arrays of {}", object.id());
        }
        Ok(report)
    }

    /// Update world matrices, LOD levels and the camera, then sync every
    /// visible renderable node under `scene` that survives frustum culling.
    /// A node that fails to sync is logged and skipped.
    pub fn render_frame(&mut self, graph: &mut SceneGraph, scene: NodeId, camera: NodeId) -> Result<FrameStats> {
        graph.update_matrix_world(scene, false)?;
        if !graph.is_ancestor(scene, camera)? {
            let camera_root = root_of(graph, camera)?;
            graph.update_matrix_world(camera_root, false)?;
        }
        let view_projection = graph.update_camera(camera)?.view_projection();
        let frustum = Frustum::from_matrix(&view_projection);

        let mut stats = FrameStats::default();
        let mut stack = vec![scene];
        while let Some(id) = stack.pop() {
            if matches!(graph.get(id)?.kind, ObjectKind::Lod(_)) {
                graph.update_lod(id, camera)?;
            }
            let object = graph.get(id)?;
            if !object.visible {
                continue;
            }
            stack.extend(object.children().iter().rev());

            let Some((_, material)) = object.kind.renderable() else {
                continue;
            };
            if !material.borrow().visible {
                continue;
            }
            if object.frustum_culled && !intersects_object(&frustum, object) {
                stats.culled += 1;
                continue;
            }
            match self.sync_object(object, &view_projection) {
                Ok(report) => {
                    stats.synced += 1;
                    stats.uploads += report.written.len();
                }
                Err(e) => {
                    error!("skipping {} this frame: {}", id, e);
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats)
    }
}

fn root_of(graph: &SceneGraph, id: NodeId) -> Result<NodeId> {
    let mut current = id;
    while let Some(parent) = graph.get(current)?.parent() {
        current = parent;
    }
    Ok(current)
}
