//! Pixel geometry used by the layout engine: points, sizes and rectangles.
//!
//! Rectangles are stored as `left/top/width/height` with `y` growing downwards,
//! the way chart backends hand out bounds.

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Swap the roles of `x` and `y` (chart transposition).
    pub fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }
}

/// Width/height pair, e.g. a measured text box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a rectangle from two opposite corners, in any order.
    pub fn from_corners(a: Point2D, b: Point2D) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self::new(left, top, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right()
            && other.left <= self.right()
            && self.top <= other.bottom()
            && other.top <= self.bottom()
    }

    /// True only when the two rectangles share an area larger than `eps` in both axes.
    pub fn overlaps(&self, other: &Rect, eps: f64) -> bool {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        w > eps && h > eps
    }

    /// Smallest rectangle containing both.
    pub fn bounding_rect(&self, other: &Rect) -> Rect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Flip the origin of a rectangle with negative extent so both sizes are non-negative.
    pub fn normalized(&self) -> Rect {
        let mut r = *self;
        if r.width < 0.0 {
            r.left += r.width;
            r.width = -r.width;
        }
        if r.height < 0.0 {
            r.top += r.height;
            r.height = -r.height;
        }
        r
    }

    /// Swap the x and y axes, used to move bounds between pixel and category/value space
    /// on transposed charts.
    pub fn transposed(&self) -> Rect {
        Rect::new(self.top, self.left, self.height, self.width)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_intersect_but_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.overlaps(&b, 1e-9));
    }

    #[test]
    fn negative_height_is_flipped() {
        let r = Rect::new(5.0, 100.0, 20.0, -40.0).normalized();
        assert_eq!(r, Rect::new(5.0, 60.0, 20.0, 40.0));
    }

    #[test]
    fn bounding_rect_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, -5.0, 5.0, 5.0);
        assert_eq!(a.bounding_rect(&b), Rect::new(0.0, -5.0, 25.0, 15.0));
    }

    #[test]
    fn transposed_swaps_axes() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.transposed(), Rect::new(2.0, 1.0, 4.0, 3.0));
        assert_eq!(r.transposed().transposed(), r);
    }
}
