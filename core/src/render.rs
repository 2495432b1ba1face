//! Turning geometry into raster images.
//!
//! This module constitutes the fixed-function rendering pipeline. It
//! contains code for [clipping][clip], [rasterizing][raster], [shading]
//! [shade], [texturing][tex], [blending][blend] and [outputting][target]
//! points, lines, triangles and quads.
//!
//! A primitive arrives here as a list of vertices in homogeneous clip
//! space. It is clipped against the view frustum (and the scissor box if
//! enabled), projected to window coordinates by dividing by w and applying
//! the viewport transform, culled if facing away, and finally converted
//! into scanlines that are handed to one of the [span functions][shade].

use crate::config::MAX_POLYGON_VERTS;
use crate::error::tokens;
use crate::math::{
    Color4f, Lerp, TexCoord, Vary, float, vary::Iter, vec4,
};
use crate::util::rect::Rect;

use self::{
    clip::{ClipVert, FRUSTUM, Planes, Polygon, Status},
    raster::{ScreenVert, Scanline},
    shade::{FragState, SpanFn},
    stats::Stats,
    target::Framebuf,
};

pub mod blend;
pub mod clip;
pub mod raster;
pub mod shade;
pub mod stats;
pub mod target;
pub mod tex;

tokens! {
    /// Kind of primitive assembled from submitted vertices.
    pub enum PrimitiveKind {
        Points = 0x0000,
        Lines = 0x0001,
        Triangles = 0x0004,
        Quads = 0x0007,
    }
}

tokens! {
    /// How the interior of polygons is rasterized.
    pub enum PolygonMode {
        /// Draw each vertex as a point.
        Point = 0x1B00,
        /// Draw the edges as lines.
        Line = 0x1B01,
        /// Fill the interior.
        Fill = 0x1B02,
    }
}

tokens! {
    /// Polygon face, for culling.
    pub enum Face {
        Front = 0x0404,
        Back = 0x0405,
    }
}

/// Values interpolated across the face of a primitive.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Varyings {
    pub color: Color4f,
    pub uv: TexCoord,
}

/// Parameters and targets of rasterization, shared by the primitives
/// of one draw call.
pub struct Pipeline<'a> {
    /// Target framebuffer.
    pub fb: &'a mut Framebuf,
    /// Statistics to update.
    pub stats: &'a mut Stats,
    /// Viewport rectangle in window coordinates.
    pub viewport: Rect,
    /// Scissor rectangle, if the scissor test is enabled.
    pub scissor: Option<Rect>,
    /// Span function selected by the enabled capabilities.
    pub span: SpanFn,
    /// Fragment state.
    pub frag: FragState<'a>,
    /// Which face to cull, if any.
    pub cull: Option<Face>,
    pub mode: PolygonMode,
    /// Point diameter in pixels.
    pub point_size: f32,
    /// Line width in pixels.
    pub line_width: f32,
}

impl PrimitiveKind {
    /// Returns the number of vertices in one primitive of this kind.
    pub const fn vertex_count(self) -> usize {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::Triangles => 3,
            Self::Quads => 4,
        }
    }
}

impl Lerp for Varyings {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            color: self.color.lerp(&other.color, t),
            uv: self.uv.lerp(&other.uv, t),
        }
    }
}

impl Vary for Varyings {
    type Iter = Iter<Self>;
    type Diff = Self;

    #[inline]
    fn vary(self, step: Self, n: Option<u32>) -> Self::Iter {
        Iter { val: self, step, n }
    }
    #[inline]
    fn dv_dt(&self, other: &Self, recip_dt: f32) -> Self {
        Self {
            color: self.color.dv_dt(&other.color, recip_dt),
            uv: self.uv.dv_dt(&other.uv, recip_dt),
        }
    }
    #[inline]
    fn step(&self, d: &Self) -> Self {
        Self {
            color: self.color.step(&d.color),
            uv: self.uv.step(&d.uv),
        }
    }
    #[inline]
    fn step_by(&self, d: &Self, t: f32) -> Self {
        Self {
            color: self.color.step_by(&d.color, t),
            uv: self.uv.step_by(&d.uv, t),
        }
    }
    #[inline]
    fn z_div(&self, f: f32) -> Self {
        Self {
            color: self.color.z_div(f),
            uv: self.uv.z_div(f),
        }
    }
}

/// Projects a clip-space vertex to window coordinates.
///
/// Divides the position by w and maps normalized device coordinates
/// to `viewport`; depth is mapped from [-1, 1] to [0, 1]. The resulting
/// position's w is 1/w, and the varyings are multiplied by 1/w for
/// perspective-correct interpolation.
pub fn project<V: Vary>(v: &ClipVert<V>, viewport: &Rect) -> ScreenVert<V> {
    let rw = v.pos.w().recip();
    let [x, y, z, _] = (v.pos * rw).0;
    let [vx, vy, vw, vh] = viewport.to_f32s();
    let pos = vec4(
        vx + (x + 1.0) * 0.5 * vw,
        vy + (y + 1.0) * 0.5 * vh,
        (z + 1.0) * 0.5,
        rw,
    );
    (pos, v.attrib.z_div(rw))
}

/// Returns twice the signed area of a polygon in window coordinates;
/// positive if counter-clockwise.
fn signed_area<V>(verts: &[ScreenVert<V>]) -> f32 {
    let Some(mut prev) = verts.last() else {
        return 0.0;
    };
    let mut sum = 0.0;
    for v in verts {
        sum += prev.0.x() * v.0.y() - v.0.x() * prev.0.y();
        prev = v;
    }
    sum
}

impl Pipeline<'_> {
    /// Renders a point.
    pub fn point(&mut self, v: &ClipVert<Varyings>) {
        self.stats.prims.i += 1;
        self.stats.verts.i += 1;
        if FRUSTUM.iter().any(|p| p.signed_dist(&v.pos) > 0.0) {
            log::trace!("point outside frustum");
            return;
        }
        self.stats.prims.o += 1;
        self.stats.verts.o += 1;
        self.raster_point(project(v, &self.viewport));
    }

    /// Renders a line segment.
    pub fn line(&mut self, verts: &[ClipVert<Varyings>; 2]) {
        self.stats.prims.i += 1;
        self.stats.verts.i += 2;
        if self.raster_line(*verts) {
            self.stats.prims.o += 1;
            self.stats.verts.o += 2;
        } else {
            log::trace!("line clipped away");
        }
    }

    /// Renders a convex polygon: a triangle or a quad.
    pub fn polygon(&mut self, verts: &[ClipVert<Varyings>]) {
        self.stats.prims.i += 1;
        self.stats.verts.i += verts.len();

        let planes = Planes::new(&self.viewport, self.scissor.as_ref());
        let mut poly = Polygon::from_verts(verts);

        if let Ok(quad) = <[_; 4]>::try_from(verts)
            && self.mode == PolygonMode::Fill
            && planes.status(quad.iter().map(|v| &v.pos)) == Status::Visible
        {
            let vp = self.viewport;
            let sv = quad.map(|v| project(&v, &vp));
            if self.is_culled(signed_area(&sv)) {
                log::trace!("quad culled");
                return;
            }
            let bounds = self.bounds();
            if raster::rect_fill(&sv, &bounds, |sl| self.emit(sl)) {
                self.stats.prims.o += 1;
                self.stats.verts.o += 4;
                return;
            }
        }

        if !planes.clip_polygon(&mut poly) {
            log::trace!("polygon clipped away");
            return;
        }
        let mut buf = [<ScreenVert<Varyings>>::default(); MAX_POLYGON_VERTS];
        for (s, v) in buf.iter_mut().zip(poly.iter()) {
            *s = project(v, &self.viewport);
        }
        let sv = &buf[..poly.len()];
        if self.is_culled(signed_area(sv)) {
            log::trace!("polygon culled");
            return;
        }
        self.stats.prims.o += 1;
        self.stats.verts.o += sv.len();

        let bounds = self.bounds();
        match self.mode {
            PolygonMode::Fill => {
                for i in 1..sv.len() - 1 {
                    let tri = [sv[0], sv[i], sv[i + 1]];
                    raster::tri_fill(tri, &bounds, |sl| self.emit(sl));
                }
            }
            PolygonMode::Line => {
                let mut prev = verts[verts.len() - 1];
                for v in verts {
                    self.raster_line([prev, *v]);
                    prev = *v;
                }
            }
            PolygonMode::Point => {
                for v in verts {
                    if FRUSTUM.iter().all(|p| p.signed_dist(&v.pos) <= 0.0) {
                        self.raster_point(project(v, &self.viewport));
                    }
                }
            }
        }
    }

    /// Returns the pixels that may be written: the viewport, intersected
    /// with the scissor box if any, and with the framebuffer.
    pub fn bounds(&self) -> Rect {
        let b = self.viewport.intersect(&self.fb.bounds());
        match &self.scissor {
            Some(s) => b.intersect(s),
            None => b,
        }
    }

    fn is_culled(&self, area: f32) -> bool {
        match self.cull {
            Some(Face::Back) => area < 0.0,
            Some(Face::Front) => area > 0.0,
            None => false,
        }
    }

    fn raster_point(&mut self, v: ScreenVert<Varyings>) {
        let bounds = self.bounds();
        let size = self.point_size;
        raster::point(v, size, &bounds, |sl| self.emit(sl));
    }

    /// Clips, projects and rasterizes a line. Returns `false` if the line
    /// was clipped away.
    fn raster_line(&mut self, mut verts: [ClipVert<Varyings>; 2]) -> bool {
        let planes = Planes::new(&self.viewport, self.scissor.as_ref());
        if !planes.clip_line(&mut verts) {
            return false;
        }
        let vp = self.viewport;
        let sv = verts.map(|v| project(&v, &vp));
        let bounds = self.bounds();
        let width = float::f32::floor(self.line_width + 0.5).max(1.0) as u32;
        raster::line(sv, width, &bounds, |sl| self.emit(sl));
        true
    }

    fn emit(&mut self, sl: Scanline<Varyings>) {
        let io = (self.span)(self.fb, &self.frag, &sl);
        self.stats.frags += io;
    }
}
