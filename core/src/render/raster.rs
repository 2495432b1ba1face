//! Translation of vector shapes into discrete pixels in the framebuffer.
//!
//! Rasterization proceeds by turning a primitive such as a triangle into
//! a sequence of *scanlines*, each corresponding to a horizontal span of
//! pixels covered by the primitive on a given row. The scanlines, in turn,
//! are converted into a series of *fragments* by the span functions in
//! [`shade`][super::shade].
//!
//! All functions here take an inclusive-exclusive pixel `bounds` rectangle
//! and never emit pixels outside it. Rows are numbered bottom-up.

use core::{
    fmt::{self, Debug, Formatter},
    mem::swap,
    ops::Range,
};

use crate::math::{Lerp, ScreenPt, Vary, float};
use crate::util::rect::Rect;

/// A projected vertex: screen position and varyings.
///
/// The position holds window x and y, depth, and the reciprocal of the
/// clip-space w. The varyings are premultiplied by that reciprocal.
pub type ScreenVert<V> = (ScreenPt, V);

type Diff<V> = <ScreenVert<V> as Vary>::Diff;

/// A fragment, or a single "pixel" in a rasterized primitive.
#[derive(Copy, Clone, Debug)]
pub struct Frag<V> {
    pub pos: ScreenPt,
    pub var: V,
}

/// A horizontal, 1-pixel-thick "slice" of a primitive being rasterized.
pub struct Scanline<V: Vary> {
    /// The y coordinate of the row.
    pub y: usize,
    /// The range of x coordinates spanned by the line.
    pub xs: Range<usize>,
    /// The varyings at the center of the first pixel.
    pub v0: ScreenVert<V>,
    /// Rate of change of the varyings per pixel in x.
    pub dv_dx: Diff<V>,
    /// Rate of change of the varyings per pixel in y.
    pub dv_dy: Diff<V>,
}

/// Iterator emitting scanlines, linearly interpolating values between the
/// left and right endpoints as it goes.
pub struct ScanlineIter<V: Vary> {
    y: f32,
    left: <ScreenVert<V> as Vary>::Iter,
    right: <f32 as Vary>::Iter,
    dv_dx: Diff<V>,
    dv_dy: Diff<V>,
    xs: Range<i32>,
    n: u32,
}

impl<V: Vary> Scanline<V> {
    /// Returns an iterator over the varyings of each pixel, still divided
    /// by w.
    pub fn varyings(&self) -> <ScreenVert<V> as Vary>::Iter {
        self.v0.vary(self.dv_dx, Some(self.xs.len() as u32))
    }

    /// Returns an iterator over the perspective-correct fragments.
    pub fn fragments(&self) -> impl Iterator<Item = Frag<V>> + use<V> {
        self.varyings().map(|(pos, var)| Frag {
            pos,
            var: var.z_div(pos.w().recip()),
        })
    }
}

impl<V: Vary> Debug for Scanline<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanline")
            .field("y", &self.y)
            .field("xs", &self.xs)
            .finish_non_exhaustive()
    }
}

impl<V: Vary> Iterator for ScanlineIter<V> {
    type Item = Scanline<V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.n > 0 {
            let v0 = self.left.next()?;
            let x1 = self.right.next()?;
            let y = self.y;
            self.y += 1.0;
            self.n -= 1;

            // Find the next pixel centers to the right
            //
            // If the left x fraction is < 0.5, the pixel is covered and thus
            // drawn; otherwise it's not, and we skip to the next pixel.
            //
            // Similarly, if the right x fraction is < 0.5, that's the
            // "one-past-the-end" pixel, otherwise it's the last covered
            // pixel and the next one is the actual one-past-the-end pixel.
            let x0 = first_px(v0.0.x());
            let x1 = first_px(x1);

            let Some(xs) = clamp_span(x0..x1, &self.xs) else {
                continue;
            };
            let x0 = xs.start as f32 + 0.5;
            // Adjust v0 to match the first pixel center
            let v0 = v0.step_by(&self.dv_dx, x0 - v0.0.x());

            return Some(Scanline {
                y: y as usize,
                xs,
                v0,
                dv_dx: self.dv_dx,
                dv_dy: self.dv_dy,
            });
        }
        None
    }
}

/// Rasterizes a one-pixel-thick line between two vertices, repeated
/// `width` times perpendicular to the major axis.
///
/// Invokes `scan_fn` with a one-pixel scanline for each pixel drawn.
pub fn line<V, F>(
    [mut v0, mut v1]: [ScreenVert<V>; 2],
    width: u32,
    bounds: &Rect,
    mut scan_fn: F,
) where
    V: Vary,
    F: FnMut(Scanline<V>),
{
    let [dx, dy, ..] = (v1.0 - v0.0).0;
    let x_major = dx.abs() > dy.abs();

    // Always draw in the positive direction of the major axis
    if (x_major && dx < 0.0) || (!x_major && dy < 0.0) {
        swap(&mut v0, &mut v1);
    }
    let (major, minor) = if x_major { (0, 1) } else { (1, 0) };
    let d_major = v1.0[major] - v0.0[major];

    if d_major <= 0.0 {
        return;
    }
    // Pixel centers along the major axis, limited to the bounds
    let (lo, hi) = if x_major {
        (bounds.x, bounds.right())
    } else {
        (bounds.y, bounds.top())
    };
    let m0 = round_up_to_half(v0.0[major]).max(lo as f32 + 0.5);
    let m1 = round_up_to_half(v1.0[major]).min(hi as f32 + 0.5);

    let dv = v0.dv_dt(&v1, d_major.recip());
    // Adjust to match the rounded starting pixel center
    let mut v = v0.step_by(&dv, m0 - v0.0[major]);
    let zero = v0.dv_dt(&v0, 0.0);

    let width = width.max(1) as i32;
    let offsets = -(width - 1) / 2..width / 2 + 1;

    let mut m = m0;
    while m < m1 {
        let n = float::f32::floor(v.0[minor]) as i32;
        let i = float::f32::floor(m) as i32;
        for off in offsets.clone() {
            let (x, y) = if x_major { (i, n + off) } else { (n + off, i) };
            if bounds.contains(x, y) {
                let (x, y) = (x as usize, y as usize);
                scan_fn(Scanline {
                    y,
                    xs: x..x + 1,
                    v0: v,
                    dv_dx: zero,
                    dv_dy: zero,
                });
            }
        }
        // The minor coordinate is part of the position; it steps along
        // with the other varyings.
        v = v.step(&dv);
        m += 1.0;
    }
}

/// Rasterizes a point of diameter `size` centered at `v`.
///
/// A point of size ≤ 1 covers the single pixel containing its center.
/// Larger points are filled circles, emitted as one scanline per row.
pub fn point<V, F>(v: ScreenVert<V>, size: f32, bounds: &Rect, mut scan_fn: F)
where
    V: Vary,
    F: FnMut(Scanline<V>),
{
    const MAX_R: usize = 32;

    let cx = float::f32::floor(v.0.x()) as i32;
    let cy = float::f32::floor(v.0.y()) as i32;
    let zero = v.dv_dt(&v, 0.0);

    let mut emit = |y: i32, xs: Range<i32>| {
        if y < bounds.y || y >= bounds.top() {
            return;
        }
        if let Some(xs) = clamp_span(xs, &(bounds.x..bounds.right())) {
            scan_fn(Scanline {
                y: y as usize,
                xs,
                v0: v,
                dv_dx: zero,
                dv_dy: zero,
            });
        }
    };

    let r = ((size * 0.5) as usize).min(MAX_R);
    if r == 0 {
        emit(cy, cx..cx + 1);
        return;
    }

    // Midpoint circle; record the half-width of each row so that the
    // filled spans do not overlap.
    let mut half_w = [0i32; MAX_R + 1];
    let (mut x, mut y) = (r as i32, 0i32);
    let mut err = 1 - x;
    while x >= y {
        half_w[y as usize] = half_w[y as usize].max(x);
        half_w[x as usize] = half_w[x as usize].max(y);
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
    for (dy, hw) in half_w[..=r].iter().enumerate() {
        let dy = dy as i32;
        emit(cy - dy, cx - hw..cx + hw + 1);
        if dy != 0 {
            emit(cy + dy, cx - hw..cx + hw + 1);
        }
    }
}

/// Rasterizes a filled triangle defined by three vertices.
///
/// Converts the triangle into [scanlines][Scanline] and invokes
/// `scanline_fn` for each scanline. The scanlines are guaranteed to cover
/// exactly those pixels whose center point lies inside the triangle. For
/// more information on the scanline conversion, see [`scan`].
///
/// Triangles with zero area produce no scanlines.
pub fn tri_fill<V, F>(
    mut verts: [ScreenVert<V>; 3],
    bounds: &Rect,
    mut scanline_fn: F,
) where
    V: Vary,
    F: FnMut(Scanline<V>),
{
    if signed_area(&verts) == 0.0 {
        return;
    }
    // Sort by y coordinate, start from the bottom
    verts.sort_by(|a, b| a.0.y().total_cmp(&b.0.y()));
    let [bot, mid0, top] = verts;

    let [bot_y, mid_y, top_y] = [bot.0.y(), mid0.0.y(), top.0.y()];

    // Interpolate a point on the "long" edge at the same y as `mid0`
    let mid1 = bot.lerp(&top, (mid_y - bot_y) / (top_y - bot_y));

    let (left, right) = if mid0.0.x() < mid1.0.x() {
        (mid0, mid1)
    } else {
        (mid1, mid0)
    };

    //                            X <--top
    //                         ******
    //                      ********
    //                  ** upper **
    // mid0/left--> X**********X <--right/mid1
    //                ** lower **
    //                   ********
    //                      ******
    //                         X <--bot

    // The widest horizontal chord runs through `mid0`; dv/dx taken along
    // it holds for the whole triangle.
    let dx = right.0.x() - left.0.x();
    if dx <= 0.0 {
        return;
    }
    let dv_dx = left.dv_dt(&right, dx.recip());

    // Rasterize the lower half triangle...
    scan(bot_y..mid_y, &bot..&left, &bot..&right, dv_dx, bounds)
        .for_each(&mut scanline_fn);

    // ...and the upper half triangle
    scan(mid_y..top_y, &left..&top, &right..&top, dv_dx, bounds)
        .for_each(&mut scanline_fn);
}

/// Rasterizes an axis-aligned rectangle given its four corners in either
/// winding order.
///
/// Returns `false` without drawing anything if the quad is not an
/// axis-aligned rectangle with all corners at the same w.
pub fn rect_fill<V, F>(
    verts: &[ScreenVert<V>; 4],
    bounds: &Rect,
    mut scanline_fn: F,
) -> bool
where
    V: Vary,
    F: FnMut(Scanline<V>),
{
    let Some([bl, br, tl, tr]) = rect_corners(verts) else {
        return false;
    };
    let (x0, x1) = (bl.0.x(), br.0.x());
    let (y0, y1) = (bl.0.y(), tl.0.y());

    let dv_dy = bl.dv_dt(tl, (y1 - y0).recip());
    let recip_dx = (x1 - x0).recip();

    let xs = first_px(x0)..first_px(x1);
    let Some(xs) = clamp_span(xs, &(bounds.x..bounds.right())) else {
        return true;
    };
    let ys = first_px(y0).max(bounds.y)..first_px(y1).min(bounds.top());

    for y in ys {
        let yc = y as f32 + 0.5;
        let t = (yc - y0) / (y1 - y0);
        let left = bl.lerp(tl, t);
        let right = br.lerp(tr, t);
        let dv_dx = left.dv_dt(&right, recip_dx);
        let v0 = left.step_by(&dv_dx, xs.start as f32 + 0.5 - x0);
        scanline_fn(Scanline {
            y: y as usize,
            xs: xs.clone(),
            v0,
            dv_dx,
            dv_dy,
        });
    }
    true
}

/// Returns twice the signed area of a triangle in window coordinates.
///
/// The result is positive if the vertices are in counter-clockwise order,
/// negative if clockwise, and zero if they are collinear.
pub fn signed_area<V>([a, b, c]: &[ScreenVert<V>; 3]) -> f32 {
    let (ax, ay) = (b.0.x() - a.0.x(), b.0.y() - a.0.y());
    let (bx, by) = (c.0.x() - a.0.x(), c.0.y() - a.0.y());
    ax * by - ay * bx
}

/// Returns an iterator that emits a scanline for each line from `y0` to
/// `y1`, interpolating varyings from `l0` to `l1` on the left and from `r0`
/// to `r1` on the right side.
///
/// The three input ranges define a *trapezoid* with horizontal bases, or, in
/// the special case where `l0 == r0` or `l1 == r1`, a triangle:
/// ```text
/// y1   l1_____________________r1
///      |_____________________|    ...
///       |__________________|      ...
///         |_______________|     .next()
/// y0        |____________|      .next()
///            l0           r0
/// ```
/// Any convex polygon can be converted into scanlines by dividing it into
/// trapezoidal segments and calling this function for each segment.
///
/// `dv_dx` is the horizontal rate of change of the varyings over the whole
/// polygon, not just this segment.
///
/// The exact pixels that are drawn are determined by whether the vector
/// shape *covers* a pixel or not. A pixel is covered, and drawn, if and
/// only if its center point lies inside the shape. This ensures that if two
/// polygons share an edge, or several share a vertex, each pixel at the
/// boundary will be drawn by exactly one of the polygons, with no gaps or
/// overdrawn pixels.
pub fn scan<V: Vary>(
    Range { start: y0, end: y1 }: Range<f32>,
    Range { start: l0, end: l1 }: Range<&ScreenVert<V>>,
    Range { start: r0, end: r1 }: Range<&ScreenVert<V>>,
    dv_dx: Diff<V>,
    bounds: &Rect,
) -> ScanlineIter<V> {
    let recip_dy = (y1 - y0).recip();

    // dv/dy for the left edge
    let dl_dy = l0.dv_dt(l1, recip_dy);
    // dv/dy for the right edge
    let dr_dy = r0.dv_dt(r1, recip_dy);

    // Step one row along the left edge, then back horizontally by the
    // edge's x offset, to get the pure vertical rate of change.
    let dv_dy = {
        let below = l0.step(&dl_dy).step_by(&dv_dx, -dl_dy.0.x());
        l0.dv_dt(&below, 1.0)
    };

    // Find the y value of the next pixel center (.5) vertically, clamped
    // to the bounds.
    //
    // We want to draw exactly those pixels whose center is *covered* by
    // this polygon. Thus if y0.fract() > 0.5, we skip to the next line.
    // We align the y values with the pixel grid so that on each line, if
    // x0.fract() <= 0.5, the pixel is covered, otherwise it is not.
    let y0_rounded = round_up_to_half(y0).max(bounds.y as f32 + 0.5);
    let y1_rounded = round_up_to_half(y1).min(bounds.top() as f32 + 0.5);

    let y_tweak = y0_rounded - y0;

    // Adjust varyings to correspond to the aligned y value
    let l0 = l0.step_by(&dl_dy, y_tweak);
    let r0 = r0.0.x() + dr_dy.0.x() * y_tweak;

    ScanlineIter {
        y: y0_rounded,
        left: l0.vary(dl_dy, None),
        right: r0.vary(dr_dy.0.x(), None),
        dv_dx,
        dv_dy,
        xs: bounds.x..bounds.right(),
        n: (y1_rounded - y0_rounded).max(0.0) as u32,
    }
}

/// Returns the corners of an axis-aligned rectangle in order bottom-left,
/// bottom-right, top-left, top-right, or `None` if `verts` is not one.
fn rect_corners<V: Copy>(
    verts: &[ScreenVert<V>; 4],
) -> Option<[&ScreenVert<V>; 4]> {
    let w = verts[0].0.w();
    if verts.iter().any(|v| v.0.w() != w) {
        return None;
    }
    let [a, b, c, d] = verts;
    let x_first = a.0.y() == b.0.y()
        && b.0.x() == c.0.x()
        && c.0.y() == d.0.y()
        && d.0.x() == a.0.x();
    let y_first = a.0.x() == b.0.x()
        && b.0.y() == c.0.y()
        && c.0.x() == d.0.x()
        && d.0.y() == a.0.y();
    if !x_first && !y_first {
        return None;
    }
    let (mut bl, mut br, mut tl, mut tr) = (a, a, a, a);
    for v in verts {
        let (x, y) = (v.0.x(), v.0.y());
        if x <= bl.0.x() && y <= bl.0.y() {
            bl = v;
        }
        if x >= br.0.x() && y <= br.0.y() {
            br = v;
        }
        if x <= tl.0.x() && y >= tl.0.y() {
            tl = v;
        }
        if x >= tr.0.x() && y >= tr.0.y() {
            tr = v;
        }
    }
    let degenerate = bl.0.x() == br.0.x() || bl.0.y() == tl.0.y();
    (!degenerate).then_some([bl, br, tl, tr])
}

/// Clamps the pixel range `xs` to `bounds`, returning `None` if empty.
#[inline]
fn clamp_span(xs: Range<i32>, bounds: &Range<i32>) -> Option<Range<usize>> {
    let start = xs.start.max(bounds.start).max(0);
    let end = xs.end.min(bounds.end);
    (start < end).then(|| start as usize..end as usize)
}

/// Returns the index of the first pixel whose center is at or right of `x`,
/// excluding a center exactly at `x`.
#[inline]
fn first_px(x: f32) -> i32 {
    float::f32::floor(x + 0.5) as i32
}

#[inline]
fn round_up_to_half(x: f32) -> f32 {
    float::f32::floor(x + 0.5) + 0.5
}
