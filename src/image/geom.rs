//! Integer rectangles, points, and offsets.

use std::fmt;

/// Axis-aligned rectangle in pixel coordinates (top-left plus size).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Returns true if `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        let (Some(right), Some(bottom)) = (
            other.x.checked_add(other.width),
            other.y.checked_add(other.height),
        ) else {
            return false;
        };
        other.x >= self.x && other.y >= self.y && right <= self.right() && bottom <= self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Annotated object center. Centers may lie outside the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Vector from an object center to a patch center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.dx, self.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn contains_rect_checks_all_edges() {
        let outer = Rect::new(2, 3, 10, 8);
        assert!(outer.contains_rect(&Rect::new(2, 3, 10, 8)));
        assert!(outer.contains_rect(&Rect::new(4, 5, 3, 3)));
        assert!(!outer.contains_rect(&Rect::new(1, 3, 3, 3)));
        assert!(!outer.contains_rect(&Rect::new(10, 3, 3, 3)));
        assert!(!outer.contains_rect(&Rect::new(2, 9, 3, 3)));
        assert!(!outer.contains_rect(&Rect::new(usize::MAX, 3, 3, 3)));
    }
}
