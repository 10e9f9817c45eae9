//! Line segment between two points
use crate::math_utils::clamp;
use crate::{Matrix4, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line3 {
    pub start: Vector3,
    pub end: Vector3,
}

impl Line3 {
    pub const fn new(start: Vector3, end: Vector3) -> Self {
        Self { start, end }
    }

    pub fn set(&mut self, start: Vector3, end: Vector3) -> &mut Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn center(&self) -> Vector3 {
        (self.start + self.end) * 0.5
    }

    /// `end - start`
    pub fn delta(&self) -> Vector3 {
        self.end - self.start
    }

    pub fn distance_sq(&self) -> f64 {
        self.start.distance_to_squared(self.end)
    }

    pub fn distance(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Point at parameter `t`: `start` at 0, `end` at 1.
    pub fn at(&self, t: f64) -> Vector3 {
        self.delta() * t + self.start
    }

    /// Parameter of the point on the infinite line closest to `point`,
    /// optionally clamped to the segment. A degenerate segment returns 0.
    pub fn closest_point_to_point_parameter(&self, point: Vector3, clamp_to_line: bool) -> f64 {
        let start_to_point = point - self.start;
        let start_to_end = self.delta();

        let denominator = start_to_end.dot(start_to_end);
        if denominator == 0.0 {
            return 0.0;
        }

        let t = start_to_end.dot(start_to_point) / denominator;
        if clamp_to_line {
            clamp(t, 0.0, 1.0)
        } else {
            t
        }
    }

    pub fn closest_point_to_point(&self, point: Vector3, clamp_to_line: bool) -> Vector3 {
        self.at(self.closest_point_to_point_parameter(point, clamp_to_line))
    }

    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        self.start = self.start.apply_matrix4(m);
        self.end = self.end.apply_matrix4(m);
        self
    }

    pub fn equals(&self, line: &Line3) -> bool {
        self == line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> Line3 {
        Line3::new(Vector3::ZERO, Vector3::new(4.0, 0.0, 0.0))
    }

    #[test]
    fn test_measurements() {
        let l = segment();
        assert_eq!(l.center(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(l.delta(), Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(l.distance(), 4.0);
        assert_eq!(l.distance_sq(), 16.0);
        assert_eq!(l.at(-0.5), Vector3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_closest_point() {
        let l = segment();
        let p = Vector3::new(6.0, 3.0, 0.0);
        assert_eq!(l.closest_point_to_point_parameter(p, false), 1.5);
        assert_eq!(l.closest_point_to_point_parameter(p, true), 1.0);
        assert_eq!(l.closest_point_to_point(p, true), Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(l.closest_point_to_point(Vector3::new(1.0, 1.0, 1.0), false), Vector3::X);

        let degenerate = Line3::new(Vector3::ONE, Vector3::ONE);
        assert_eq!(degenerate.closest_point_to_point_parameter(p, false), 0.0);
    }

    #[test]
    fn test_apply_matrix4() {
        let mut l = segment();
        let mut m = Matrix4::identity();
        m.make_translation(0.0, 1.0, 0.0);
        l.apply_matrix4(&m);
        assert_eq!(l, Line3::new(Vector3::Y, Vector3::new(4.0, 1.0, 0.0)));
    }
}
