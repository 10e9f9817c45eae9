//! Trois Scene - transform hierarchy, CPU geometry and buffer staging
//!
//! The scene graph is an arena of [`Object3D`] nodes addressed by
//! [`NodeId`]. Renderable nodes share [`Geometry`] through
//! [`SharedGeometry`]; the [`buffers`] module flattens that geometry into
//! the staging arrays a GPU backend uploads, and [`Raycaster`] picks
//! against it.

pub mod error;
pub mod id;

pub mod object3d;
pub mod graph;
pub mod bone;
pub mod skinned_mesh;
pub mod lod;
pub mod camera;

pub mod material;
pub mod geometry;
pub mod buffers;
pub mod backend;

pub mod culling;
pub mod raycaster;

// Re-export commonly used types
pub use error::{Result, SceneError};
pub use id::{IdAllocator, NodeId};
pub use object3d::{Line, LineMode, Mesh, Object3D, ObjectKind, ParticleSystem, Ribbon};
pub use graph::SceneGraph;
pub use bone::Bone;
pub use skinned_mesh::SkinnedMesh;
pub use lod::{Lod, LodLevel};
pub use camera::{Camera, OrthographicCamera, PerspectiveCamera, Projection};
pub use material::{
    AttributeData, AttributeType, AttributeValue, BoundTo, CustomAttribute, Material, MaterialKind,
    SharedMaterial, Shading, Side, VertexColors,
};
pub use geometry::{BoneDescription, DirtyFlags, Face3, Geometry, MorphNormals, MorphTarget, SharedGeometry, Stream};
pub use buffers::{GeometryBuffers, Staging, StreamKey, SyncOptions, SyncReport};
pub use backend::{BufferHandle, BufferTarget, FrameStats, FrameSync, GpuBackend};
pub use raycaster::{Intersection, Raycaster, RaycasterParams};
