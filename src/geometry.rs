//! Integer screen-space geometry shared by the placement solver and the
//! window hierarchy.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2D extent. Dimensions are expected to be non-negative; degenerate
/// (zero) extents are valid and behave as points or lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scales both dimensions, rounding to the nearest integer.
    pub fn scaled(&self, factor: f64) -> Size {
        Size::new(
            (self.width as f64 * factor).round() as i32,
            (self.height as f64 * factor).round() as i32,
        )
    }
}

impl From<Size> for Point {
    fn from(size: Size) -> Point {
        Point::new(size.width, size.height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub top_left: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(top_left: Point, size: Size) -> Self {
        Rect { top_left, size }
    }

    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { top_left: Point::new(x, y), size: Size::new(width, height) }
    }

    pub fn right(&self) -> i32 {
        self.top_left.x + self.size.width
    }

    pub fn bottom(&self) -> i32 {
        self.top_left.y + self.size.height
    }

    /// Checks if this rectangle fully contains `other`, boundary inclusive.
    /// An empty rectangle can still contain other empty rectangles, which
    /// are treated as points or lines of thickness zero.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.top_left.x >= self.top_left.x
            && other.right() <= self.right()
            && other.top_left.y >= self.top_left.y
            && other.bottom() <= self.bottom()
    }

    /// Clamps `point` into this rectangle, edges inclusive.
    pub fn clamp_point(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.top_left.x, self.right()),
            point.y.clamp(self.top_left.y, self.bottom()),
        )
    }

    pub fn intersection(&self, other: &Rect) -> Rect {
        let left = self.top_left.x.max(other.top_left.x);
        let top = self.top_left.y.max(other.top_left.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::from_xywh(left, top, (right - left).max(0), (bottom - top).max(0))
    }

    pub fn overlap_area(&self, other: &Rect) -> i64 {
        let overlap = self.intersection(other);
        overlap.size.width as i64 * overlap.size.height as i64
    }

    /// Returns a rectangle of `size` centered within this one.
    pub fn centered(&self, size: Size) -> Rect {
        Rect::new(
            Point::new(
                self.top_left.x + (self.size.width - size.width) / 2,
                self.top_left.y + (self.size.height - size.height) / 2,
            ),
            size,
        )
    }

    pub fn translated(&self, delta: Point) -> Rect {
        Rect::new(self.top_left + delta, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_rect_is_boundary_inclusive() {
        let rect = Rect::from_xywh(0, 0, 100, 100);
        assert!(rect.contains_rect(&rect));
        assert!(rect.contains_rect(&Rect::from_xywh(10, 10, 80, 80)));
        assert!(rect.contains_rect(&Rect::from_xywh(0, 0, 100, 100)));
        assert!(!rect.contains_rect(&Rect::from_xywh(1, 1, 100, 100)));
        assert!(!rect.contains_rect(&Rect::from_xywh(-1, 0, 100, 100)));
    }

    #[test]
    fn test_contains_rect_with_empty_rects() {
        let rect = Rect::from_xywh(0, 0, 100, 100);
        assert!(rect.contains_rect(&Rect::from_xywh(50, 50, 0, 0)));

        let empty = Rect::from_xywh(10, 10, 0, 0);
        assert!(empty.contains_rect(&Rect::from_xywh(10, 10, 0, 0)));
        assert!(!empty.contains_rect(&Rect::from_xywh(11, 10, 0, 0)));
    }

    #[test]
    fn test_clamp_point_includes_far_edges() {
        let rect = Rect::from_xywh(0, 0, 400, 300);
        assert_eq!(rect.clamp_point(Point::new(400, 300)), Point::new(400, 300));
        assert_eq!(rect.clamp_point(Point::new(500, -10)), Point::new(400, 0));
        assert_eq!(rect.clamp_point(Point::new(50, 60)), Point::new(50, 60));
    }

    #[test]
    fn test_intersection_and_overlap_area() {
        let a = Rect::from_xywh(0, 0, 100, 100);
        let b = Rect::from_xywh(50, 50, 100, 100);
        assert_eq!(a.intersection(&b), Rect::from_xywh(50, 50, 50, 50));
        assert_eq!(a.overlap_area(&b), 2500);

        let c = Rect::from_xywh(200, 200, 10, 10);
        assert_eq!(a.intersection(&c).size, Size::new(0, 0));
        assert_eq!(a.overlap_area(&c), 0);
    }

    #[test]
    fn test_centered() {
        let outer = Rect::from_xywh(100, 100, 400, 300);
        let inner = outer.centered(Size::new(200, 100));
        assert_eq!(inner, Rect::from_xywh(200, 200, 200, 100));
    }

    #[test]
    fn test_point_ops() {
        assert_eq!(Point::new(1, 2) + Point::new(3, 4), Point::new(4, 6));
        assert_eq!(Point::new(3, 4) - Point::new(1, 2), Point::new(2, 2));
    }

    #[test]
    fn test_size_scaled_rounds() {
        assert_eq!(Size::new(100, 50).scaled(1.5), Size::new(150, 75));
        assert_eq!(Size::new(101, 51).scaled(0.5), Size::new(51, 26));
    }
}
