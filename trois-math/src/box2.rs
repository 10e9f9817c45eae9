//! Axis-aligned bounding rectangle in 2D
use crate::Vector2;

/// Default is empty, see [`crate::Box3`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box2 {
    pub min: Vector2,
    pub max: Vector2,
}

impl Default for Box2 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box2 {
    pub const EMPTY: Self = Self {
        min: Vector2::new(f64::INFINITY, f64::INFINITY),
        max: Vector2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    pub const fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vector2]) -> Self {
        let mut b = Self::EMPTY;
        b.set_from_points(points);
        b
    }

    pub fn set(&mut self, min: Vector2, max: Vector2) -> &mut Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn set_from_points(&mut self, points: &[Vector2]) -> &mut Self {
        self.make_empty();
        for &p in points {
            self.expand_by_point(p);
        }
        self
    }

    pub fn set_from_center_and_size(&mut self, center: Vector2, size: Vector2) -> &mut Self {
        let half = size * 0.5;
        self.min = center - half;
        self.max = center + half;
        self
    }

    pub fn make_empty(&mut self) -> &mut Self {
        *self = Self::EMPTY;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y
    }

    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    pub fn expand_by_point(&mut self, point: Vector2) -> &mut Self {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
        self
    }

    pub fn expand_by_vector(&mut self, v: Vector2) -> &mut Self {
        self.min -= v;
        self.max += v;
        self
    }

    pub fn expand_by_scalar(&mut self, s: f64) -> &mut Self {
        self.min = self.min.add_scalar(-s);
        self.max = self.max.add_scalar(s);
        self
    }

    pub fn contains_point(&self, p: Vector2) -> bool {
        !(p.x < self.min.x || p.x > self.max.x || p.y < self.min.y || p.y > self.max.y)
    }

    pub fn contains_box(&self, b: &Box2) -> bool {
        self.min.x <= b.min.x
            && b.max.x <= self.max.x
            && self.min.y <= b.min.y
            && b.max.y <= self.max.y
    }

    /// Axes where the box is flat map to 0.
    pub fn get_parameter(&self, p: Vector2) -> Vector2 {
        let size = self.size();
        let axis = |offset: f64, extent: f64| if extent == 0.0 { 0.0 } else { offset / extent };
        Vector2::new(axis(p.x - self.min.x, size.x), axis(p.y - self.min.y, size.y))
    }

    pub fn intersects_box(&self, b: &Box2) -> bool {
        !(b.max.x < self.min.x || b.min.x > self.max.x || b.max.y < self.min.y || b.min.y > self.max.y)
    }

    pub fn clamp_point(&self, p: Vector2) -> Vector2 {
        p.clamp(self.min, self.max)
    }

    pub fn distance_to_point(&self, p: Vector2) -> f64 {
        self.clamp_point(p).distance_to(p)
    }

    pub fn intersect(&mut self, b: &Box2) -> &mut Self {
        self.min = self.min.max(b.min);
        self.max = self.max.min(b.max);
        self
    }

    pub fn union(&mut self, b: &Box2) -> &mut Self {
        self.min = self.min.min(b.min);
        self.max = self.max.max(b.max);
        self
    }

    pub fn translate(&mut self, offset: Vector2) -> &mut Self {
        self.min += offset;
        self.max += offset;
        self
    }
}
