//! Conversions to and from nalgebra types
//!
//! Both sides store matrices column-major, so element order is preserved.
use nalgebra as na;

use crate::{Matrix3, Matrix4, Quaternion, Vector3, Vector4};

impl From<Matrix4> for na::Matrix4<f64> {
    fn from(m: Matrix4) -> Self {
        na::Matrix4::from_column_slice(&m.elements)
    }
}

impl From<na::Matrix4<f64>> for Matrix4 {
    fn from(m: na::Matrix4<f64>) -> Self {
        let mut elements = [0.0; 16];
        elements.copy_from_slice(m.as_slice());
        Matrix4 { elements }
    }
}

impl From<Matrix3> for na::Matrix3<f64> {
    fn from(m: Matrix3) -> Self {
        na::Matrix3::from_column_slice(&m.elements)
    }
}

impl From<na::Matrix3<f64>> for Matrix3 {
    fn from(m: na::Matrix3<f64>) -> Self {
        let mut elements = [0.0; 9];
        elements.copy_from_slice(m.as_slice());
        Matrix3 { elements }
    }
}

impl From<Vector3> for na::Vector3<f64> {
    fn from(v: Vector3) -> Self {
        na::Vector3::new(v.x, v.y, v.z)
    }
}

impl From<na::Vector3<f64>> for Vector3 {
    fn from(v: na::Vector3<f64>) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for na::Point3<f64> {
    fn from(v: Vector3) -> Self {
        na::Point3::new(v.x, v.y, v.z)
    }
}

impl From<na::Point3<f64>> for Vector3 {
    fn from(p: na::Point3<f64>) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

impl From<Vector4> for na::Vector4<f64> {
    fn from(v: Vector4) -> Self {
        na::Vector4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<na::Vector4<f64>> for Vector4 {
    fn from(v: na::Vector4<f64>) -> Self {
        Vector4::new(v.x, v.y, v.z, v.w)
    }
}

/// nalgebra puts the scalar part first in its constructor.
impl From<Quaternion> for na::Quaternion<f64> {
    fn from(q: Quaternion) -> Self {
        na::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl From<na::Quaternion<f64>> for Quaternion {
    fn from(q: na::Quaternion<f64>) -> Self {
        Quaternion::new(q.i, q.j, q.k, q.w)
    }
}

impl From<na::UnitQuaternion<f64>> for Quaternion {
    fn from(q: na::UnitQuaternion<f64>) -> Self {
        q.into_inner().into()
    }
}
