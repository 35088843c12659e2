//! Points and sizes on the layout plane.
//!
//! The plane uses screen orientation: `x` grows to the right, `y` grows
//! downward, so rank 0 sits at the top.

use std::ops::{Add, Sub, Neg};

/// A position on the layout plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Origin of the plane.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert a rectangle center into its top-left corner.
    pub fn center_to_top_left(self, size: Size) -> Self {
        Self {
            x: self.x - size.width / 2.0,
            y: self.y - size.height / 2.0,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Width and height of a node rectangle.
///
/// Nodes that have not been measured by the rendering surface yet are
/// laid out as zero-sized rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// A zero-sized rectangle.
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_shifts_by_half_size() {
        let center = Point::new(100.0, 50.0);
        let top_left = center.center_to_top_left(Size::new(80.0, 40.0));
        assert_eq!(top_left, Point::new(60.0, 30.0));
    }

    #[test]
    fn zero_size_keeps_center() {
        let center = Point::new(7.0, -3.0);
        assert_eq!(center.center_to_top_left(Size::ZERO), center);
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 5.0);
        assert_eq!(a + b, Point::new(4.0, 7.0));
        assert_eq!(b - a, Point::new(2.0, 3.0));
        assert_eq!(-a, Point::new(-1.0, -2.0));
    }
}
