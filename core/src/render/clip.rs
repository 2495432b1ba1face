//! Clipping primitives against planes.
//!
//! Clipping means converting a shape into another, such that only the
//! points inside a volume enclosed by one or more planes remain. Here the
//! volume is the view frustum in homogeneous clip space, optionally further
//! narrowed by the four sides of the scissor box. Clipping happens before
//! the perspective division, so it also takes care of geometry behind the
//! viewer; the first plane, `w ≥ ε`, guarantees that the division that
//! follows is well defined.
//!
//! Polygons are clipped with the Sutherland–Hodgman algorithm [^1] into
//! a fixed-capacity buffer, so clipping never allocates. Lines are clipped
//! parametrically against the same planes. Points are either kept or
//! discarded as a whole.
//!
//! [^1]: Ivan Sutherland, Gary W. Hodgman: Reentrant Polygon Clipping.
//!       Communications of the ACM, vol. 17, pp. 32–42, 1974

use core::ops::Deref;

use crate::config::{CLIP_EPSILON, MAX_POLYGON_VERTS};
use crate::math::{ClipVec, Lerp, vec4};
use crate::util::rect::Rect;

/// A vertex in clip space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClipVert<A> {
    pub pos: ClipVec,
    pub attrib: A,
}

/// A plane in homogeneous clip space.
///
/// Stores the plane coefficients, a constant offset, and the plane's bit
/// in an outcode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipPlane(ClipVec, f32, u16);

/// Visibility of a shape with respect to a set of planes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    /// Entirely inside all planes
    Visible,
    /// Partly inside, needs clipping
    Clipped,
    /// Entirely outside at least one plane
    Hidden,
}

/// A set of up to eleven clip planes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Planes {
    planes: [ClipPlane; 11],
    len: usize,
}

/// A convex polygon of at most [`MAX_POLYGON_VERTS`] vertices.
#[derive(Copy, Clone, Debug)]
pub struct Polygon<A> {
    verts: [ClipVert<A>; MAX_POLYGON_VERTS],
    len: usize,
}

impl ClipPlane {
    /// Creates a clip plane given coefficients, offset, and outcode bit.
    const fn new(x: f32, y: f32, z: f32, w: f32, off: f32, bit: u16) -> Self {
        Self(vec4(x, y, z, w), off, bit)
    }

    /// Returns the signed distance between `pt` and `self`.
    ///
    /// The return value is positive if `pt` is outside the plane,
    /// negative if it is inside, and zero if it lies on the plane.
    #[inline]
    pub fn signed_dist(&self, pt: &ClipVec) -> f32 {
        self.0.dot(pt) + self.1
    }

    /// Computes this plane's outcode bit for a point.
    ///
    /// The result is the plane's bit if `pt` is outside, 0 otherwise.
    #[inline]
    pub fn outcode(&self, pt: &ClipVec) -> u16 {
        (self.signed_dist(pt) > 0.0) as u16 * self.2
    }

    /// Returns the intersection of the edge `v0`–`v1` with `self`, if the
    /// endpoints are strictly on opposite sides of the plane.
    pub fn intersect<A: Lerp>(
        &self,
        [v0, v1]: [&ClipVert<A>; 2],
    ) -> Option<ClipVert<A>> {
        let d0 = self.signed_dist(&v0.pos);
        let d1 = self.signed_dist(&v1.pos);
        (d0 * d1 < 0.0).then(|| {
            // The condition guarantees that `d0 - d1` is nonzero
            let t = d0 / (d0 - d1);
            ClipVert {
                pos: v0.pos.lerp(&v1.pos, t),
                attrib: v0.attrib.lerp(&v1.attrib, t),
            }
        })
    }

    /// Clips the convex polygon `input` against `self`, replacing the
    /// contents of `out` with the result.
    ///
    /// In the diagram below, clipping triangle ABC results in quad ABPQ,
    /// where P and Q are new vertices generated by interpolating between
    /// A and C, and B and C, respectively.
    ///
    /// ```text
    ///     n
    ///     ^            C
    ///     |           / \         outside
    ///     |         /    \
    /// ----+-------Q-------P--------self-----
    ///           /          \
    ///         A--___        \     inside
    ///               `---__   \
    ///                     `---B
    /// ```
    pub fn clip_polygon<A: Lerp + Copy>(
        &self,
        input: &Polygon<A>,
        out: &mut Polygon<A>,
    ) {
        out.clear();
        let Some(mut v0) = input.last() else {
            return;
        };
        for v1 in input.iter() {
            if let Some(v) = self.intersect([v0, v1]) {
                out.push(v);
            }
            if self.signed_dist(&v1.pos) <= 0.0 {
                out.push(*v1);
            }
            v0 = v1;
        }
    }
}

/// The `w ≥ ε` plane, followed by the six sides of the view frustum:
/// right, left, top, bottom, far, and near.
#[rustfmt::skip]
pub const FRUSTUM: [ClipPlane; 7] = [
    ClipPlane::new( 0.0,  0.0,  0.0, -1.0, CLIP_EPSILON, 0x001), // W
    ClipPlane::new( 1.0,  0.0,  0.0, -1.0, 0.0, 0x002), // Right
    ClipPlane::new(-1.0,  0.0,  0.0, -1.0, 0.0, 0x004), // Left
    ClipPlane::new( 0.0,  1.0,  0.0, -1.0, 0.0, 0x008), // Top
    ClipPlane::new( 0.0, -1.0,  0.0, -1.0, 0.0, 0x010), // Bottom
    ClipPlane::new( 0.0,  0.0,  1.0, -1.0, 0.0, 0x020), // Far
    ClipPlane::new( 0.0,  0.0, -1.0, -1.0, 0.0, 0x040), // Near
];

impl Planes {
    /// Returns the frustum planes, plus the planes of `scissor` if any.
    ///
    /// The scissor box is given in window pixels and mapped to normalized
    /// device coordinates relative to `viewport`.
    pub fn new(viewport: &Rect, scissor: Option<&Rect>) -> Self {
        let mut planes = [FRUSTUM[0]; 11];
        planes[..7].copy_from_slice(&FRUSTUM);
        let mut len = 7;

        if let Some(s) = scissor
            && !viewport.is_empty()
        {
            let ndc_x = |x: i32| {
                2.0 * (x as f32 - viewport.x as f32) / viewport.w as f32 - 1.0
            };
            let ndc_y = |y: i32| {
                2.0 * (y as f32 - viewport.y as f32) / viewport.h as f32 - 1.0
            };
            let (x0, x1) = (ndc_x(s.x), ndc_x(s.right()));
            let (y0, y1) = (ndc_y(s.y), ndc_y(s.top()));
            #[rustfmt::skip]
            let sc = [
                ClipPlane::new(-1.0,  0.0, 0.0,  x0, 0.0, 0x080), // Left
                ClipPlane::new( 1.0,  0.0, 0.0, -x1, 0.0, 0x100), // Right
                ClipPlane::new( 0.0, -1.0, 0.0,  y0, 0.0, 0x200), // Bottom
                ClipPlane::new( 0.0,  1.0, 0.0, -y1, 0.0, 0x400), // Top
            ];
            planes[7..].copy_from_slice(&sc);
            len = 11;
        }
        Self { planes, len }
    }

    /// Returns the frustum planes only.
    pub fn frustum() -> Self {
        Self::new(&Rect::default(), None)
    }

    /// Returns the outcode of `pt`: a bitset where the bit of each plane
    /// is 1 if the point is outside the plane, 0 otherwise.
    #[inline]
    pub fn outcode(&self, pt: &ClipVec) -> u16 {
        self.iter().fold(0, |code, p| code | p.outcode(pt))
    }

    /// Returns the visibility status of the convex hull of `pts`.
    pub fn status<'a>(
        &self,
        pts: impl IntoIterator<Item = &'a ClipVec>,
    ) -> Status {
        let (all, any) = pts.into_iter().fold((!0, 0), |(all, any), pt| {
            let code = self.outcode(pt);
            (all & code, any | code)
        });
        if all != 0 {
            // All vertices outside the *same* plane; the shape is hidden
            Status::Hidden
        } else if any == 0 {
            Status::Visible
        } else {
            Status::Clipped
        }
    }

    /// Clips the polygon `poly` in place against all planes.
    ///
    /// Returns `false` if fewer than three vertices remain, in which case
    /// the polygon should be discarded.
    pub fn clip_polygon<A: Lerp + Copy + Default>(
        &self,
        poly: &mut Polygon<A>,
    ) -> bool {
        match self.status(poly.iter().map(|v| &v.pos)) {
            Status::Visible => return poly.len() >= 3,
            Status::Hidden => {
                poly.clear();
                return false;
            }
            Status::Clipped => {}
        }
        let mut tmp = Polygon::new();
        for p in self.iter() {
            p.clip_polygon(poly, &mut tmp);
            core::mem::swap(poly, &mut tmp);
            if poly.len() < 3 {
                return false;
            }
        }
        true
    }

    /// Clips the line segment `[a, b]` in place against all planes.
    ///
    /// Returns `false` if the segment is entirely outside.
    pub fn clip_line<A: Lerp + Copy>(
        &self,
        [a, b]: &mut [ClipVert<A>; 2],
    ) -> bool {
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        for p in self.iter() {
            let d0 = p.signed_dist(&a.pos);
            let d1 = p.signed_dist(&b.pos);
            match (d0 > 0.0, d1 > 0.0) {
                (true, true) => return false,
                (false, false) => {}
                (true, false) => t0 = t0.max(d0 / (d0 - d1)),
                (false, true) => t1 = t1.min(d0 / (d0 - d1)),
            }
            if t0 > t1 {
                return false;
            }
        }
        let (a0, b0) = (*a, *b);
        let lerp = |t: f32| ClipVert {
            pos: a0.pos.lerp(&b0.pos, t),
            attrib: a0.attrib.lerp(&b0.attrib, t),
        };
        if t0 > 0.0 {
            *a = lerp(t0);
        }
        if t1 < 1.0 {
            *b = lerp(t1);
        }
        true
    }

    /// Returns whether the point `pt` is inside all planes.
    #[inline]
    pub fn contains(&self, pt: &ClipVec) -> bool {
        self.outcode(pt) == 0
    }
}

impl Deref for Planes {
    type Target = [ClipPlane];
    fn deref(&self) -> &[ClipPlane] {
        &self.planes[..self.len]
    }
}

impl<A: Copy + Default> Polygon<A> {
    /// Returns a new empty polygon.
    pub fn new() -> Self {
        Self {
            verts: [ClipVert::default(); MAX_POLYGON_VERTS],
            len: 0,
        }
    }

    /// Returns a polygon with the vertices `vs`.
    ///
    /// Vertices beyond the capacity are ignored.
    pub fn from_verts(vs: &[ClipVert<A>]) -> Self {
        let mut res = Self::new();
        for v in vs {
            res.push(*v);
        }
        res
    }
}

impl<A: Copy + Default> Default for Polygon<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Copy> Polygon<A> {
    /// Appends `v` to `self`. No-op if `self` is already full.
    #[inline]
    pub fn push(&mut self, v: ClipVert<A>) {
        if let Some(slot) = self.verts.get_mut(self.len) {
            *slot = v;
            self.len += 1;
        }
    }
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<A> Deref for Polygon<A> {
    type Target = [ClipVert<A>];
    fn deref(&self) -> &[ClipVert<A>] {
        &self.verts[..self.len]
    }
}
