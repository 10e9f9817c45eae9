//! Trois Math - value types and geometric kernels for the scene graph
//!
//! Vectors, colors, rotations, matrices and the bounding/intersection
//! primitives the scene graph, buffer synchronizer and raycaster rely on.
//! All types are `Copy` values in double precision; in-place `*_mut`
//! style mutators return `&mut Self` so calls can be chained.

pub mod error;
pub mod math_utils;

pub mod vector2;
pub mod vector3;
pub mod vector4;
pub mod color;
mod color_style;
pub mod quaternion;
pub mod euler;

pub mod matrix3;
pub mod matrix4;

pub mod box2;
pub mod box3;
pub mod sphere;
pub mod plane;
pub mod line3;
pub mod ray;
pub mod triangle;
pub mod frustum;

pub mod interop;

// Re-export commonly used types
pub use error::{MathError, Result};
pub use vector2::Vector2;
pub use vector3::Vector3;
pub use vector4::Vector4;
pub use color::Color;
pub use quaternion::Quaternion;
pub use euler::{Euler, RotationOrder};
pub use matrix3::Matrix3;
pub use matrix4::Matrix4;
pub use box2::Box2;
pub use box3::Box3;
pub use sphere::Sphere;
pub use plane::Plane;
pub use line3::Line3;
pub use ray::Ray;
pub use triangle::Triangle;
pub use frustum::Frustum;
