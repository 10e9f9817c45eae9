//! Per-corner staging of triangle meshes
use log::debug;

use super::groups::{plan_groups, put_color, put_vector2, put_vector3, put_vector4, GeometryGroup};
use super::{GeometryBuffers, Staging, StreamKey, SyncOptions, SyncReport};
use crate::geometry::{DirtyFlags, Geometry};
use crate::material::{AttributeData, CustomAttribute, Material, Shading, VertexColors};
use crate::{Result, SceneError};

/// Which optional arrays a mesh's groups carry, derived from what the
/// material consumes and what the geometry provides.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshLayout {
    pub normals: bool,
    pub colors: bool,
    pub uvs: bool,
    pub uvs2: bool,
    pub tangents: bool,
    pub skin: bool,
    pub morph_targets: usize,
    pub morph_normals: usize,
    /// Custom attributes as `(name, floats per corner)`.
    pub custom: Vec<(String, usize)>,
}

impl MeshLayout {
    pub fn new(geometry: &Geometry, material: &Material) -> Self {
        let uses_uvs = material.uses_uvs();
        let morph_targets = if material.morph_targets {
            geometry.morph_targets().len()
        } else {
            0
        };
        let morph_normals = if material.morph_normals {
            geometry.morph_normals().len().min(morph_targets)
        } else {
            0
        };

        Self {
            normals: material.normal_type().is_some(),
            colors: material.vertex_color_type().is_some(),
            uvs: uses_uvs && !geometry.face_vertex_uvs(0).is_empty(),
            uvs2: uses_uvs && !geometry.face_vertex_uvs(1).is_empty(),
            tangents: geometry.has_tangents,
            skin: material.skinning
                && !geometry.skin_indices().is_empty()
                && !geometry.skin_weights().is_empty(),
            morph_targets,
            morph_normals,
            custom: material
                .attributes()
                .iter()
                .map(|a| (a.name().to_string(), a.kind().arity()))
                .collect(),
        }
    }
}

/// Sync pass for meshes and skinned meshes.
pub(crate) fn sync(
    geometry: &Geometry,
    material: &Material,
    buffers: &mut GeometryBuffers,
    dirty: DirtyFlags,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let layout = MeshLayout::new(geometry, material);
    let plan = plan_groups(geometry.faces(), options.max_vertices_per_group);

    let current = match &buffers.staging {
        Some(Staging::Mesh { layout: staged, groups }) => {
            *staged == layout
                && groups.len() == plan.len()
                && groups
                    .iter()
                    .zip(&plan)
                    .all(|(g, (material_index, faces))| g.material_index == *material_index && g.faces == *faces)
        }
        _ => false,
    };

    let rebuilt = !current;
    if rebuilt {
        debug!(
            "initialising mesh buffers: {} faces in {} groups",
            geometry.faces().len(),
            plan.len()
        );
        let groups = plan
            .into_iter()
            .map(|(material_index, faces)| GeometryGroup::new(material_index, faces, &layout))
            .collect();
        buffers.replace_staging(Staging::Mesh {
            layout: layout.clone(),
            groups,
        });
    }

    let dirty = if rebuilt { DirtyFlags::ALL } else { dirty };
    let custom: Vec<(&CustomAttribute, bool)> = material
        .attributes()
        .iter()
        .map(|a| (a, rebuilt || buffers.custom_dirty(material, a.name())))
        .collect();

    let mut report = SyncReport::default();
    if let Some(Staging::Mesh { groups, .. }) = buffers.staging.as_mut() {
        for (index, group) in groups.iter_mut().enumerate() {
            let mut writer = GroupWriter {
                geometry,
                material,
                layout: &layout,
                group,
                index,
                report: &mut report,
            };
            writer.write(dirty, &custom)?;
        }
    }
    Ok(report)
}

struct GroupWriter<'a> {
    geometry: &'a Geometry,
    material: &'a Material,
    layout: &'a MeshLayout,
    group: &'a mut GeometryGroup,
    index: usize,
    report: &'a mut SyncReport,
}

impl GroupWriter<'_> {
    fn write(&mut self, dirty: DirtyFlags, custom: &[(&CustomAttribute, bool)]) -> Result<()> {
        if dirty.vertices {
            self.positions()?;
            if self.layout.skin {
                self.skin()?;
            }
        }
        if dirty.morph_targets && self.layout.morph_targets > 0 {
            self.morph_targets()?;
        }
        if dirty.colors && self.layout.colors {
            self.colors();
        }
        if dirty.tangents && self.layout.tangents {
            self.tangents()?;
        }
        if dirty.normals && self.layout.normals {
            self.normals();
        }
        if dirty.uvs {
            if self.layout.uvs {
                self.uvs(0);
            }
            if self.layout.uvs2 {
                self.uvs(1);
            }
        }
        if dirty.elements {
            self.elements();
        }
        for (attribute, changed) in custom {
            if *changed {
                self.custom(attribute)?;
            }
        }
        Ok(())
    }

    fn positions(&mut self) -> Result<()> {
        for (i, &face) in self.group.faces.iter().enumerate() {
            for (corner, v) in self.geometry.face_corners(face)?.into_iter().enumerate() {
                put_vector3(&mut self.group.positions, i * 3 + corner, v);
            }
        }
        self.report.push(self.index, StreamKey::Position);
        Ok(())
    }

    fn skin(&mut self) -> Result<()> {
        let (Some(indices), Some(weights)) = (self.group.skin_indices.as_mut(), self.group.skin_weights.as_mut())
        else {
            return Ok(());
        };
        let faces = self.geometry.faces();
        for (i, &face) in self.group.faces.iter().enumerate() {
            for (corner, v) in faces[face].indices().into_iter().enumerate() {
                let index = self.geometry.skin_indices().get(v).ok_or(SceneError::MissingAttribute {
                    name: "skin_index".into(),
                    index: v,
                })?;
                let weight = self.geometry.skin_weights().get(v).ok_or(SceneError::MissingAttribute {
                    name: "skin_weight".into(),
                    index: v,
                })?;
                put_vector4(indices, i * 3 + corner, *index);
                put_vector4(weights, i * 3 + corner, *weight);
            }
        }
        self.report.push(self.index, StreamKey::SkinIndex);
        self.report.push(self.index, StreamKey::SkinWeight);
        Ok(())
    }

    fn morph_targets(&mut self) -> Result<()> {
        let faces = self.geometry.faces();
        let smooth = self.material.needs_smooth_normals();

        for (m, target) in self.geometry.morph_targets().iter().take(self.layout.morph_targets).enumerate() {
            let out = &mut self.group.morph_targets[m];
            for (i, &face) in self.group.faces.iter().enumerate() {
                for (corner, v) in faces[face].indices().into_iter().enumerate() {
                    let position = target.vertices.get(v).ok_or(SceneError::MissingAttribute {
                        name: target.name.clone(),
                        index: v,
                    })?;
                    put_vector3(out, i * 3 + corner, *position);
                }
            }
            self.report.push(self.index, StreamKey::MorphTarget(m));
        }

        for (m, normals) in self.geometry.morph_normals().iter().take(self.layout.morph_normals).enumerate() {
            let out = &mut self.group.morph_normals[m];
            for (i, &face) in self.group.faces.iter().enumerate() {
                let missing = || SceneError::MissingAttribute {
                    name: format!("morph_normals[{m}]"),
                    index: face,
                };
                let corners = if smooth {
                    *normals.vertex_normals.get(face).ok_or_else(missing)?
                } else {
                    [*normals.face_normals.get(face).ok_or_else(missing)?; 3]
                };
                for (corner, n) in corners.into_iter().enumerate() {
                    put_vector3(out, i * 3 + corner, n);
                }
            }
            self.report.push(self.index, StreamKey::MorphNormal(m));
        }
        Ok(())
    }

    fn colors(&mut self) {
        let Some(out) = self.group.colors.as_mut() else {
            return;
        };
        let per_vertex = self.material.vertex_colors == VertexColors::Vertex;
        let faces = self.geometry.faces();

        for (i, &face) in self.group.faces.iter().enumerate() {
            let face = &faces[face];
            for corner in 0..3 {
                let color = if per_vertex && face.vertex_colors.len() == 3 {
                    face.vertex_colors[corner]
                } else {
                    face.color
                };
                put_color(out, i * 3 + corner, color);
            }
        }
        self.report.push(self.index, StreamKey::Color);
    }

    fn tangents(&mut self) -> Result<()> {
        let Some(out) = self.group.tangents.as_mut() else {
            return Ok(());
        };
        let faces = self.geometry.faces();

        for (i, &index) in self.group.faces.iter().enumerate() {
            let face = &faces[index];
            if face.vertex_tangents.len() != 3 {
                return Err(SceneError::MissingAttribute {
                    name: "tangent".into(),
                    index,
                });
            }
            for (corner, t) in face.vertex_tangents.iter().enumerate() {
                put_vector4(out, i * 3 + corner, *t);
            }
        }
        self.report.push(self.index, StreamKey::Tangent);
        Ok(())
    }

    fn normals(&mut self) {
        let Some(out) = self.group.normals.as_mut() else {
            return;
        };
        let smooth = self.material.normal_type() == Some(Shading::Smooth);
        let faces = self.geometry.faces();

        for (i, &face) in self.group.faces.iter().enumerate() {
            let face = &faces[face];
            for corner in 0..3 {
                let normal = if smooth && face.vertex_normals.len() == 3 {
                    face.vertex_normals[corner]
                } else {
                    face.normal
                };
                put_vector3(out, i * 3 + corner, normal);
            }
        }
        self.report.push(self.index, StreamKey::Normal);
    }

    /// Faces past the end of the UV layer keep zeros in their slots.
    fn uvs(&mut self, layer: usize) {
        let (out, key) = match layer {
            0 => (self.group.uvs.as_mut(), StreamKey::Uv),
            _ => (self.group.uvs2.as_mut(), StreamKey::Uv2),
        };
        let Some(out) = out else {
            return;
        };
        let uvs = self.geometry.face_vertex_uvs(layer);

        for (i, &face) in self.group.faces.iter().enumerate() {
            let corners = uvs.get(face).copied().unwrap_or_default();
            for (corner, uv) in corners.into_iter().enumerate() {
                put_vector2(out, i * 3 + corner, uv);
            }
        }
        self.report.push(self.index, key);
    }

    fn elements(&mut self) {
        for i in 0..self.group.faces.len() {
            let base = (i * 3) as u16;
            self.group.face_indices[i * 3..i * 3 + 3].copy_from_slice(&[base, base + 1, base + 2]);
            self.group.line_indices[i * 6..i * 6 + 6]
                .copy_from_slice(&[base, base + 1, base, base + 2, base + 1, base + 2]);
        }
        self.report.push(self.index, StreamKey::Face);
        self.report.push(self.index, StreamKey::Line);
    }

    fn custom(&mut self, attribute: &CustomAttribute) -> Result<()> {
        let Some(out) = self.group.custom.get_mut(attribute.name()) else {
            return Ok(());
        };
        let arity = attribute.kind().arity();
        let faces = self.geometry.faces();

        for (i, &index) in self.group.faces.iter().enumerate() {
            let face = &faces[index];
            for corner in 0..3 {
                let value = match attribute.data() {
                    AttributeData::Vertices(values) => {
                        let v = face.indices()[corner];
                        values.get(v).ok_or_else(|| attribute.missing(v))?
                    }
                    AttributeData::Faces(values) => values.get(index).ok_or_else(|| attribute.missing(index))?,
                    AttributeData::FaceVertices(values) => {
                        &values.get(index).ok_or_else(|| attribute.missing(index))?[corner]
                    }
                };
                let slot = (i * 3 + corner) * arity;
                attribute.write_value(value, &mut out[slot..slot + arity])?;
            }
        }
        self.report.push(self.index, StreamKey::Custom(attribute.name().to_string()));
        Ok(())
    }
}
