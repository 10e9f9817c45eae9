//! Per-vertex staging of lines, ribbons and particle systems
use std::collections::BTreeMap;

use log::{debug, warn};
use trois_math::Color;

use super::groups::{put_color, put_vector3};
use super::{GeometryBuffers, Staging, StreamData, StreamKey, SyncReport};
use crate::geometry::{DirtyFlags, Geometry};
use crate::material::{AttributeData, BoundTo, Material};
use crate::Result;

/// One entry per geometry vertex, drawn without an index buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointArrays {
    pub vertex_count: usize,
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    /// Ribbons only.
    pub normals: Option<Vec<f32>>,
    /// Lines only.
    pub line_distances: Option<Vec<f32>>,
    pub custom: BTreeMap<String, Vec<f32>>,
}

impl PointArrays {
    fn new(vertex_count: usize, normals: bool, line_distances: bool, custom: &[(String, usize)]) -> Self {
        Self {
            vertex_count,
            positions: vec![0.0; vertex_count * 3],
            colors: vec![0.0; vertex_count * 3],
            normals: normals.then(|| vec![0.0; vertex_count * 3]),
            line_distances: line_distances.then(|| vec![0.0; vertex_count]),
            custom: custom
                .iter()
                .map(|(name, arity)| (name.clone(), vec![0.0; vertex_count * arity]))
                .collect(),
        }
    }

    pub fn stream(&self, key: &StreamKey) -> Option<StreamData<'_>> {
        use StreamData::Float;
        match key {
            StreamKey::Position => Some(Float(&self.positions)),
            StreamKey::Color => Some(Float(&self.colors)),
            StreamKey::Normal => self.normals.as_deref().map(Float),
            StreamKey::LineDistance => self.line_distances.as_deref().map(Float),
            StreamKey::Custom(name) => self.custom.get(name).map(|d| Float(d)),
            _ => None,
        }
    }

    fn matches(&self, vertex_count: usize, custom: &[(String, usize)]) -> bool {
        self.vertex_count == vertex_count
            && self.custom.len() == custom.len()
            && custom
                .iter()
                .all(|(name, arity)| self.custom.get(name).map(Vec::len) == Some(vertex_count * arity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointKind {
    Line,
    Ribbon,
    Particles,
}

impl PointKind {
    fn wrap(self, arrays: PointArrays) -> Staging {
        match self {
            PointKind::Line => Staging::Line(arrays),
            PointKind::Ribbon => Staging::Ribbon(arrays),
            PointKind::Particles => Staging::Particles(arrays),
        }
    }

    fn arrays_mut(self, staging: &mut Staging) -> Option<&mut PointArrays> {
        match (self, staging) {
            (PointKind::Line, Staging::Line(p))
            | (PointKind::Ribbon, Staging::Ribbon(p))
            | (PointKind::Particles, Staging::Particles(p)) => Some(p),
            _ => None,
        }
    }
}

pub(crate) fn sync_line(
    geometry: &Geometry,
    material: &Material,
    buffers: &mut GeometryBuffers,
    dirty: DirtyFlags,
) -> Result<SyncReport> {
    sync_points(PointKind::Line, geometry, material, buffers, dirty, None)
}

pub(crate) fn sync_ribbon(
    geometry: &Geometry,
    material: &Material,
    buffers: &mut GeometryBuffers,
    dirty: DirtyFlags,
) -> Result<SyncReport> {
    sync_points(PointKind::Ribbon, geometry, material, buffers, dirty, None)
}

/// With an `order`, slot `i` receives vertex `order[i]` and every stream is
/// rewritten.
pub(crate) fn sync_particles(
    geometry: &Geometry,
    material: &Material,
    buffers: &mut GeometryBuffers,
    dirty: DirtyFlags,
    order: Option<&[usize]>,
) -> Result<SyncReport> {
    sync_points(PointKind::Particles, geometry, material, buffers, dirty, order)
}

fn sync_points(
    kind: PointKind,
    geometry: &Geometry,
    material: &Material,
    buffers: &mut GeometryBuffers,
    dirty: DirtyFlags,
    order: Option<&[usize]>,
) -> Result<SyncReport> {
    let vertex_count = geometry.vertices().len();
    let (per_vertex, skipped): (Vec<_>, Vec<_>) = material
        .attributes()
        .iter()
        .partition(|a| a.data().bound_to() == BoundTo::Vertices);
    let custom: Vec<(String, usize)> = per_vertex
        .iter()
        .map(|a| (a.name().to_string(), a.kind().arity()))
        .collect();

    let current = buffers
        .staging
        .as_mut()
        .and_then(|s| kind.arrays_mut(s))
        .is_some_and(|p| p.matches(vertex_count, &custom));
    let rebuilt = !current;
    if rebuilt {
        debug!("initialising {:?} buffers for {} vertices", kind, vertex_count);
        for attribute in &skipped {
            warn!("attribute {:?} is not bound to vertices; skipped for {:?}", attribute.name(), kind);
        }
        let arrays = PointArrays::new(vertex_count, kind == PointKind::Ribbon, kind == PointKind::Line, &custom);
        buffers.replace_staging(kind.wrap(arrays));
    }

    let everything = rebuilt || order.is_some();
    let dirty = if everything { DirtyFlags::ALL } else { dirty };
    let changed: Vec<bool> = custom
        .iter()
        .map(|(name, _)| everything || buffers.custom_dirty(material, name))
        .collect();

    let mut report = SyncReport::default();
    let Some(arrays) = buffers.staging.as_mut().and_then(|s| kind.arrays_mut(s)) else {
        return Ok(report);
    };
    let source = |slot: usize| order.map_or(slot, |o| o[slot]);

    if dirty.vertices {
        for slot in 0..vertex_count {
            put_vector3(&mut arrays.positions, slot, geometry.vertices()[source(slot)]);
        }
        report.push(0, StreamKey::Position);
    }
    if dirty.colors {
        for slot in 0..vertex_count {
            let color = geometry.colors().get(source(slot)).copied().unwrap_or(Color::BLACK);
            put_color(&mut arrays.colors, slot, color);
        }
        report.push(0, StreamKey::Color);
    }
    if let (true, Some(normals)) = (dirty.normals, arrays.normals.as_mut()) {
        for slot in 0..vertex_count {
            let normal = geometry.normals().get(source(slot)).copied().unwrap_or_default();
            put_vector3(normals, slot, normal);
        }
        report.push(0, StreamKey::Normal);
    }
    if let (true, Some(distances)) = (dirty.line_distances, arrays.line_distances.as_mut()) {
        for (slot, out) in distances.iter_mut().enumerate() {
            *out = geometry.line_distances().get(source(slot)).copied().unwrap_or(0.0) as f32;
        }
        report.push(0, StreamKey::LineDistance);
    }

    for ((name, arity), changed) in custom.iter().zip(changed) {
        let (Some(attribute), Some(out)) = (material.attribute(name), arrays.custom.get_mut(name)) else {
            continue;
        };
        if !changed {
            continue;
        }
        let AttributeData::Vertices(values) = attribute.data() else {
            continue;
        };
        for slot in 0..vertex_count {
            let index = source(slot);
            let value = values.get(index).ok_or_else(|| attribute.missing(index))?;
            attribute.write_value(value, &mut out[slot * arity..(slot + 1) * arity])?;
        }
        report.push(0, StreamKey::Custom(name.clone()));
    }

    Ok(report)
}
