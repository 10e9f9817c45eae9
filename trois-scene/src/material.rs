//! Render-state description consumed by buffer staging and picking
use std::cell::RefCell;
use std::rc::Rc;

use trois_math::{Color, Vector2, Vector3, Vector4};

use crate::{Result, SceneError};

pub type SharedMaterial = Rc<RefCell<Material>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialKind {
    #[default]
    Basic,
    Lambert,
    Phong,
    Depth,
    Normal,
    LineBasic,
    LineDashed,
    ParticleBasic,
    Shader,
}

/// Which triangle windings are drawn and hit by rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    Flat,
    #[default]
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexColors {
    #[default]
    None,
    /// One color per face, replicated to its corners.
    Face,
    /// One color per face corner.
    Vertex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Vector2,
    Vector3,
    Vector4,
    Color,
}

impl AttributeType {
    /// Floats per vertex in the staging array.
    pub fn arity(self) -> usize {
        match self {
            AttributeType::Float => 1,
            AttributeType::Vector2 => 2,
            AttributeType::Vector3 | AttributeType::Color => 3,
            AttributeType::Vector4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    Float(f64),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Color(Color),
}

impl AttributeValue {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            AttributeValue::Float(_) => AttributeType::Float,
            AttributeValue::Vector2(_) => AttributeType::Vector2,
            AttributeValue::Vector3(_) => AttributeType::Vector3,
            AttributeValue::Vector4(_) => AttributeType::Vector4,
            AttributeValue::Color(_) => AttributeType::Color,
        }
    }

    /// Write the components into `out`, which must hold exactly the
    /// arity of the value.
    pub(crate) fn write(&self, out: &mut [f32]) {
        match *self {
            AttributeValue::Float(v) => out[0] = v as f32,
            AttributeValue::Vector2(v) => {
                out[0] = v.x as f32;
                out[1] = v.y as f32;
            }
            AttributeValue::Vector3(v) => {
                out[0] = v.x as f32;
                out[1] = v.y as f32;
                out[2] = v.z as f32;
            }
            AttributeValue::Vector4(v) => {
                out[0] = v.x as f32;
                out[1] = v.y as f32;
                out[2] = v.z as f32;
                out[3] = v.w as f32;
            }
            AttributeValue::Color(c) => {
                out[0] = c.r as f32;
                out[1] = c.g as f32;
                out[2] = c.b as f32;
            }
        }
    }
}

/// How attribute values map onto triangle corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundTo {
    Vertices,
    Faces,
    FaceVertices,
}

/// Attribute values, shaped by what they are bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    /// Indexed by vertex index.
    Vertices(Vec<AttributeValue>),
    /// One value per face, replicated to its three corners.
    Faces(Vec<AttributeValue>),
    /// Three values per face, one per corner.
    FaceVertices(Vec<[AttributeValue; 3]>),
}

impl AttributeData {
    pub fn bound_to(&self) -> BoundTo {
        match self {
            AttributeData::Vertices(_) => BoundTo::Vertices,
            AttributeData::Faces(_) => BoundTo::Faces,
            AttributeData::FaceVertices(_) => BoundTo::FaceVertices,
        }
    }
}

/// Named per-vertex input of a shader material.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttribute {
    name: String,
    kind: AttributeType,
    data: AttributeData,
    revision: u64,
}

impl CustomAttribute {
    pub fn new(name: impl Into<String>, kind: AttributeType, data: AttributeData) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
            revision: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeType {
        self.kind
    }

    pub fn data(&self) -> &AttributeData {
        &self.data
    }

    /// Mutable access; the next sync rewrites this attribute.
    pub fn data_mut(&mut self) -> &mut AttributeData {
        self.revision += 1;
        &mut self.data
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Checked write of `value` into one corner's slot of a staging array.
    pub(crate) fn write_value(&self, value: &AttributeValue, out: &mut [f32]) -> Result<()> {
        if value.attribute_type() != self.kind {
            return Err(SceneError::AttributeArity {
                name: self.name.clone(),
                expected: self.kind.arity(),
            });
        }
        value.write(out);
        Ok(())
    }

    pub(crate) fn missing(&self, index: usize) -> SceneError {
        SceneError::MissingAttribute {
            name: self.name.clone(),
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub side: Side,
    pub shading: Shading,
    pub vertex_colors: VertexColors,
    pub color: Color,
    pub opacity: f64,
    pub transparent: bool,
    pub visible: bool,

    pub wireframe: bool,
    pub wireframe_linewidth: f64,
    pub linewidth: f64,

    pub map: bool,
    pub env_map: bool,
    pub light_map: bool,
    pub bump_map: bool,
    pub normal_map: bool,
    pub specular_map: bool,

    pub skinning: bool,
    pub morph_targets: bool,
    pub morph_normals: bool,

    attributes: Vec<CustomAttribute>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new(MaterialKind::Basic)
    }
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            side: Side::Front,
            shading: Shading::Smooth,
            vertex_colors: VertexColors::None,
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            visible: true,
            wireframe: false,
            wireframe_linewidth: 1.0,
            linewidth: 1.0,
            map: false,
            env_map: false,
            light_map: false,
            bump_map: false,
            normal_map: false,
            specular_map: false,
            skinning: false,
            morph_targets: false,
            morph_normals: false,
            attributes: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    pub fn needs_smooth_normals(&self) -> bool {
        self.shading == Shading::Smooth
    }

    /// Normals the material consumes, if any. Unlit basic materials and
    /// depth materials need none.
    pub fn normal_type(&self) -> Option<Shading> {
        let unlit = match self.kind {
            MaterialKind::Basic => !self.env_map,
            MaterialKind::Depth => true,
            _ => false,
        };
        if unlit {
            None
        } else {
            Some(self.shading)
        }
    }

    /// Whether texture coordinates are sampled.
    pub fn uses_uvs(&self) -> bool {
        self.map
            || self.light_map
            || self.bump_map
            || self.normal_map
            || self.specular_map
            || self.kind == MaterialKind::Shader
    }

    pub fn vertex_color_type(&self) -> Option<VertexColors> {
        match self.vertex_colors {
            VertexColors::None => None,
            other => Some(other),
        }
    }

    pub fn attributes(&self) -> &[CustomAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&CustomAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut CustomAttribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    /// Add or replace the attribute with the same name.
    pub fn set_attribute(&mut self, attribute: CustomAttribute) -> &mut Self {
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => {
                let revision = existing.revision + 1;
                *existing = attribute;
                existing.revision = revision;
            }
            None => self.attributes.push(attribute),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_type() {
        let mut m = Material::new(MaterialKind::Basic);
        assert_eq!(m.normal_type(), None);
        m.env_map = true;
        assert_eq!(m.normal_type(), Some(Shading::Smooth));

        let mut m = Material::new(MaterialKind::Lambert);
        m.shading = Shading::Flat;
        assert_eq!(m.normal_type(), Some(Shading::Flat));
        assert!(!m.needs_smooth_normals());
        assert_eq!(Material::new(MaterialKind::Depth).normal_type(), None);
    }

    #[test]
    fn test_uv_and_color_predicates() {
        let mut m = Material::new(MaterialKind::Phong);
        assert!(!m.uses_uvs());
        m.bump_map = true;
        assert!(m.uses_uvs());
        assert!(Material::new(MaterialKind::Shader).uses_uvs());

        assert_eq!(m.vertex_color_type(), None);
        m.vertex_colors = VertexColors::Face;
        assert_eq!(m.vertex_color_type(), Some(VertexColors::Face));
    }

    #[test]
    fn test_attribute_revisions() {
        let mut m = Material::new(MaterialKind::Shader);
        m.set_attribute(CustomAttribute::new(
            "size",
            AttributeType::Float,
            AttributeData::Vertices(vec![AttributeValue::Float(1.0)]),
        ));
        let first = m.attribute("size").unwrap().revision();

        if let Some(attribute) = m.attribute_mut("size") {
            if let AttributeData::Vertices(values) = attribute.data_mut() {
                values.push(AttributeValue::Float(2.0));
            }
        }
        let second = m.attribute("size").unwrap().revision();
        assert!(second > first);

        m.set_attribute(CustomAttribute::new(
            "size",
            AttributeType::Float,
            AttributeData::Faces(Vec::new()),
        ));
        assert_eq!(m.attributes().len(), 1);
        assert!(m.attribute("size").unwrap().revision() > second);
        assert_eq!(m.attribute("size").unwrap().data().bound_to(), BoundTo::Faces);
    }

    #[test]
    fn test_value_type_is_checked() {
        let attribute = CustomAttribute::new(
            "offset",
            AttributeType::Vector3,
            AttributeData::Vertices(Vec::new()),
        );
        let mut out = [0.0f32; 3];
        attribute
            .write_value(&AttributeValue::Vector3(Vector3::new(1.0, 2.0, 3.0)), &mut out)
            .unwrap();
        assert_eq!(out, [1.0, 2.0, 3.0]);
        assert!(matches!(
            attribute.write_value(&AttributeValue::Float(1.0), &mut out),
            Err(SceneError::AttributeArity { expected: 3, .. })
        ));
    }
}
