//! Rectangular pixel regions.

use core::ops::Range;

/// An axis-aligned rectangle of pixels, given by its bottom-left corner
/// and its size. May extend outside the framebuffer, and may be empty.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Returns a new rectangle with the given corner and size.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the rectangle at origin with the given size.
    pub const fn of_size(w: u32, h: u32) -> Self {
        Self::new(0, 0, w as i32, h as i32)
    }

    /// Returns the exclusive right bound of `self`.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }
    /// Returns the exclusive top bound of `self`.
    pub const fn top(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Returns whether the pixel `(x, y)` is inside `self`.
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.x <= x && x < self.right() && self.y <= y && y < self.top()
    }

    /// Returns the intersection of `self` and `other`.
    ///
    /// If the rectangles do not overlap, the result is empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let t = self.top().min(other.top());
        let (w, h) = (r.saturating_sub(x), t.saturating_sub(y));
        Self::new(x, y, w.max(0), h.max(0))
    }

    /// Returns the column and row ranges of `self`, clipped to
    /// non-negative coordinates.
    pub fn ranges(&self) -> (Range<usize>, Range<usize>) {
        let clamp = |v: i32| v.max(0) as usize;
        let xs = clamp(self.x)..clamp(self.right());
        let ys = clamp(self.y)..clamp(self.top());
        (xs.start..xs.end.max(xs.start), ys.start..ys.end.max(ys.start))
    }

    /// Returns `self` as four floats `[x, y, w, h]`.
    pub fn to_f32s(&self) -> [f32; 4] {
        [self.x as f32, self.y as f32, self.w as f32, self.h as f32]
    }
}
