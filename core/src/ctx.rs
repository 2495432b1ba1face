//! Rendering context: pipeline state and the immediate-mode API.
//!
//! A [`Context`] owns everything the pipeline needs: the framebuffer, the
//! matrix stacks, the current vertex attributes, the capability flags and
//! other rendering state, the texture store, and the primitive assembler.
//! Its methods follow the vocabulary of the classic fixed-function API:
//!
//! ```
//! use softgl_core::prelude::*;
//!
//! let mut ctx = Context::new(4, 4, Config::default());
//! ctx.matrix_mode(MatrixMode::Projection);
//! ctx.ortho(0.0, 4.0, 0.0, 4.0, -1.0, 1.0);
//! ctx.clear(ClearMask::COLOR);
//!
//! ctx.begin(PrimitiveKind::Points);
//! ctx.color3f(1.0, 1.0, 1.0);
//! ctx.vertex2(2.0, 2.0);
//! ctx.end();
//!
//! assert_eq!(ctx.get_error(), None);
//! ```
//!
//! No method panics or returns an error directly. Instead, a method that
//! fails records an [`Error`] in a sticky slot, to be retrieved later with
//! [`Context::get_error`], and returns without any other side effect.
//! Enumerated arguments may be given either as typed values or as raw
//! numeric tokens; an unknown raw token is an [`Error::InvalidEnum`].
//!
//! Between [`begin`][Context::begin] and [`end`][Context::end] only vertex
//! submission and setting the current color and texture coordinates is
//! allowed; any other state change fails with [`Error::InvalidOperation`].

use alloc::{borrow::Cow, vec::Vec};
use core::ops::BitOr;

use crate::config::{self, Config};
use crate::error::{Error, ErrorSlot, Token, tokens};
use crate::math::{
    Clip, Color4, Color4f, Mat4x4, Model, ModelVec, RealToReal, TexCoord,
    rgba, uv, vec3, vec4,
};
use crate::pool::TexturePool;
use crate::render::{
    Face, Pipeline, PolygonMode, PrimitiveKind, Varyings,
    blend::{Blend, BlendFactor},
    clip::ClipVert,
    shade::{self, FragState},
    stats::Stats,
    target::Framebuf,
    tex::TexParam,
};
use crate::util::{
    pixfmt::{PixelFormat, PixelType, ReadFormat, TexFormat},
    rect::Rect,
};

tokens! {
    /// A capability that can be enabled or disabled.
    pub enum Capability {
        /// Test fragments against the depth buffer.
        DepthTest = 0x0B71,
        /// Blend fragments with the color buffer.
        Blend = 0x0BE2,
        /// Discard polygons facing away.
        CullFace = 0x0B44,
        /// Modulate fragments with the bound texture.
        Texture2D = 0x0DE1,
        /// Discard fragments outside the scissor box.
        ScissorTest = 0x0C11,
    }
}

tokens! {
    /// The matrix stack targeted by matrix operations.
    pub enum MatrixMode {
        Modelview = 0x1700,
        Projection = 0x1701,
        Texture = 0x1702,
    }
}

tokens! {
    /// A state value queryable with [`Context::get_floatv`].
    pub enum FloatParam {
        Viewport = 0x0BA2,
        ScissorBox = 0x0C10,
        ColorClearValue = 0x0C22,
        CurrentColor = 0x0B00,
        CurrentTexCoords = 0x0B03,
        PointSize = 0x0B11,
        LineWidth = 0x0B21,
        ModelviewMatrix = 0x0BA6,
        ProjectionMatrix = 0x0BA7,
        TextureMatrix = 0x0BA8,
    }
}

tokens! {
    /// A string queryable with [`Context::get_string`].
    pub enum StringName {
        Vendor = 0x1F00,
        Renderer = 0x1F01,
        Version = 0x1F02,
        Extensions = 0x1F03,
    }
}

/// A set of buffers to [clear][Context::clear].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClearMask(pub u32);

/// An external vertex attribute array, for [`Context::draw_arrays`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Array<'a> {
    /// Positions, three floats per vertex.
    Position(&'a [f32]),
    /// Texture coordinates, two floats per vertex.
    TexCoord(&'a [f32]),
    /// Colors, four bytes per vertex.
    Color(&'a [u8]),
}

/// A stack of matrices with a fixed capacity.
#[derive(Copy, Clone, Debug)]
struct MatrixStack {
    mats: [Mat4x4; STACK_CAP],
    len: usize,
    cap: usize,
}

const STACK_CAP: usize = max(
    config::MODELVIEW_STACK_DEPTH,
    max(config::PROJECTION_STACK_DEPTH, config::TEXTURE_STACK_DEPTH),
);

const fn max(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

/// The currently bound vertex arrays.
#[derive(Copy, Clone, Debug, Default)]
struct Arrays<'a> {
    pos: Option<&'a [f32]>,
    uv: Option<&'a [f32]>,
    color: Option<&'a [u8]>,
}

/// The rendering context.
///
/// The lifetime `'a` is that of caller-owned data the context borrows:
/// texture images uploaded without copying and bound vertex arrays.
/// Dropping the context frees everything it owns.
#[derive(Clone, Debug)]
pub struct Context<'a> {
    fb: Framebuf,
    textures: TexturePool<'a>,
    stats: Stats,
    error: ErrorSlot,

    /// Enabled capabilities, one bit each.
    caps: u8,

    matrix_mode: MatrixMode,
    modelview: MatrixStack,
    projection: MatrixStack,
    texture: MatrixStack,
    /// Combined model-view-projection matrix.
    mvp: Mat4x4<RealToReal<Model, Clip>>,
    /// Whether `mvp` must be recomputed before the next primitive.
    mvp_dirty: bool,

    color: Color4f,
    uv: TexCoord,

    clear_color: Color4f,
    viewport: Rect,
    scissor: Rect,
    blend: Blend,
    cull_face: Face,
    polygon_mode: PolygonMode,
    point_size: f32,
    line_width: f32,

    arrays: Arrays<'a>,

    /// The primitive being assembled, if inside `begin`/`end`.
    prim: Option<PrimitiveKind>,
    verts: [ClipVert<Varyings>; 4],
    n_verts: usize,
}

const VENDOR: &str = "softgl";
const RENDERER: &str = "softgl software rasterizer";
const VERSION: &str = concat!("1.1 softgl-core ", env!("CARGO_PKG_VERSION"));
const EXTENSIONS: &str =
    "GL_EXT_bgra GL_EXT_texture_edge_clamp GL_ARB_texture_mirrored_repeat";

impl ClearMask {
    pub const DEPTH: Self = Self(0x0100);
    pub const COLOR: Self = Self(0x4000);
}

impl BitOr for ClearMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Self::DepthTest => 1,
            Self::Blend => 1 << 1,
            Self::CullFace => 1 << 2,
            Self::Texture2D => 1 << 3,
            Self::ScissorTest => 1 << 4,
        }
    }
}

impl FloatParam {
    /// Returns the number of values returned for `self`.
    pub const fn len(self) -> usize {
        use FloatParam::*;
        match self {
            PointSize | LineWidth => 1,
            ModelviewMatrix | ProjectionMatrix | TextureMatrix => 16,
            _ => 4,
        }
    }
}

impl MatrixStack {
    fn new(cap: usize) -> Self {
        Self {
            mats: [Mat4x4::identity(); STACK_CAP],
            len: 1,
            cap,
        }
    }
    fn top(&self) -> &Mat4x4 {
        &self.mats[self.len - 1]
    }
    fn top_mut(&mut self) -> &mut Mat4x4 {
        &mut self.mats[self.len - 1]
    }
    fn push(&mut self) -> Result<(), Error> {
        if self.len == self.cap {
            return Err(Error::StackOverflow);
        }
        self.mats[self.len] = self.mats[self.len - 1];
        self.len += 1;
        Ok(())
    }
    fn pop(&mut self) -> Result<(), Error> {
        if self.len == 1 {
            return Err(Error::StackUnderflow);
        }
        self.len -= 1;
        Ok(())
    }
}

//
// Lifecycle
//

impl<'a> Context<'a> {
    /// Creates a context with a `w`×`h` framebuffer.
    ///
    /// The dimensions are clamped to [`config::MAX_FRAMEBUF_DIM`]. The
    /// color buffer is cleared to transparent black and the depth buffer
    /// to 1. See the [module docs](self) for the initial state.
    pub fn new(w: u32, h: u32, cfg: Config) -> Self {
        let w = w.min(config::MAX_FRAMEBUF_DIM);
        let h = h.min(config::MAX_FRAMEBUF_DIM);
        log::info!("creating {w}x{h} context with {cfg:?}");

        let fb = Framebuf::new(w, h, cfg.color_format, cfg.depth_format);
        let bounds = fb.bounds();
        Self {
            fb,
            textures: TexturePool::new(cfg.max_textures),
            stats: Stats::new(),
            error: ErrorSlot::default(),
            caps: 0,
            matrix_mode: MatrixMode::Modelview,
            modelview: MatrixStack::new(config::MODELVIEW_STACK_DEPTH),
            projection: MatrixStack::new(config::PROJECTION_STACK_DEPTH),
            texture: MatrixStack::new(config::TEXTURE_STACK_DEPTH),
            mvp: Mat4x4::identity(),
            mvp_dirty: false,
            color: Color4f::WHITE,
            uv: uv(0.0, 0.0),
            clear_color: rgba(0.0, 0.0, 0.0, 1.0),
            viewport: bounds,
            scissor: bounds,
            blend: Blend::REPLACE,
            cull_face: Face::Back,
            polygon_mode: PolygonMode::Fill,
            point_size: 1.0,
            line_width: 1.0,
            arrays: Arrays::default(),
            prim: None,
            verts: [ClipVert::default(); 4],
            n_verts: 0,
        }
    }

    /// Resizes the framebuffer, clearing its contents.
    ///
    /// The viewport and scissor box are left unchanged.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if a dimension exceeds
    /// [`config::MAX_FRAMEBUF_DIM`].
    pub fn resize(&mut self, w: u32, h: u32) {
        self.outside("resize", |c| {
            if w > config::MAX_FRAMEBUF_DIM || h > config::MAX_FRAMEBUF_DIM {
                return Err(Error::InvalidValue);
            }
            log::info!("resizing framebuffer to {w}x{h}");
            c.fb.resize(w, h);
            Ok(())
        });
    }

    /// Returns the framebuffer.
    pub fn framebuf(&self) -> &Framebuf {
        &self.fb
    }

    /// Returns the rendering statistics accumulated since creation or
    /// the last [reset][Self::reset_stats].
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = Stats::new();
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        log::info!("shutting down, stats:\n{}", self.stats);
    }
}

//
// Capabilities and rendering state
//

impl<'a> Context<'a> {
    pub fn enable(&mut self, cap: impl Token<Capability>) {
        self.outside("enable", |c| {
            c.caps |= cap.token()?.bit();
            Ok(())
        });
    }

    pub fn disable(&mut self, cap: impl Token<Capability>) {
        self.outside("disable", |c| {
            c.caps &= !cap.token()?.bit();
            Ok(())
        });
    }

    /// Returns whether `cap` is enabled.
    ///
    /// Records an error and returns `false` if `cap` is invalid.
    pub fn is_enabled(&mut self, cap: impl Token<Capability>) -> bool {
        match cap.token() {
            Ok(cap) => self.caps & cap.bit() != 0,
            Err(e) => {
                self.error.record("is_enabled", e);
                false
            }
        }
    }

    /// Sets the viewport: the window rectangle that normalized device
    /// coordinates are mapped to.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `w` or `h` is negative.
    pub fn viewport(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.outside("viewport", |c| {
            c.viewport = valid_rect(x, y, w, h)?;
            Ok(())
        });
    }

    /// Sets the scissor box, used if the scissor test is enabled.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `w` or `h` is negative.
    pub fn scissor(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.outside("scissor", |c| {
            c.scissor = valid_rect(x, y, w, h)?;
            Ok(())
        });
    }

    /// Sets the color used by [`clear`][Self::clear]. The channels are
    /// clamped to [0, 1].
    pub fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.outside("clear_color", |c| {
            c.clear_color = rgba(r, g, b, a).saturate();
            Ok(())
        });
    }

    /// Sets the source and destination blend factors.
    pub fn blend_func(
        &mut self,
        src: impl Token<BlendFactor>,
        dst: impl Token<BlendFactor>,
    ) {
        self.outside("blend_func", |c| {
            c.blend = Blend { src: src.token()?, dst: dst.token()? };
            Ok(())
        });
    }

    pub fn polygon_mode(&mut self, mode: impl Token<PolygonMode>) {
        self.outside("polygon_mode", |c| {
            c.polygon_mode = mode.token()?;
            Ok(())
        });
    }

    /// Sets the face culled if [`Capability::CullFace`] is enabled.
    /// Front faces are counter-clockwise in window coordinates.
    pub fn cull_face(&mut self, face: impl Token<Face>) {
        self.outside("cull_face", |c| {
            c.cull_face = face.token()?;
            Ok(())
        });
    }

    /// Sets the point diameter in pixels, clamped to
    /// [`config::MAX_POINT_SIZE`].
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `size` is not positive.
    pub fn point_size(&mut self, size: f32) {
        self.outside("point_size", |c| {
            c.point_size = valid_size(size, config::MAX_POINT_SIZE)?;
            Ok(())
        });
    }

    /// Sets the line width in pixels, clamped to
    /// [`config::MAX_LINE_WIDTH`].
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `width` is not positive.
    pub fn line_width(&mut self, width: f32) {
        self.outside("line_width", |c| {
            c.line_width = valid_size(width, config::MAX_LINE_WIDTH)?;
            Ok(())
        });
    }
}

//
// Matrices
//

impl<'a> Context<'a> {
    /// Selects the matrix stack targeted by subsequent matrix operations.
    pub fn matrix_mode(&mut self, mode: impl Token<MatrixMode>) {
        self.outside("matrix_mode", |c| {
            c.matrix_mode = mode.token()?;
            Ok(())
        });
    }

    /// Pushes a copy of the current matrix on the current stack.
    ///
    /// # Errors
    /// [`Error::StackOverflow`] if the stack is full.
    pub fn push_matrix(&mut self) {
        self.outside("push_matrix", |c| c.stack().push());
    }

    /// Pops the current matrix off the current stack.
    ///
    /// # Errors
    /// [`Error::StackUnderflow`] if the stack has only one matrix.
    pub fn pop_matrix(&mut self) {
        self.outside("pop_matrix", |c| c.stack().pop());
    }

    pub fn load_identity(&mut self) {
        self.outside("load_identity", |c| {
            *c.stack().top_mut() = Mat4x4::identity();
            Ok(())
        });
    }

    /// Replaces the current matrix with `m`, given in column-major order.
    pub fn load_matrix(&mut self, m: &[f32; 16]) {
        self.outside("load_matrix", |c| {
            *c.stack().top_mut() = Mat4x4::from_cols(m);
            Ok(())
        });
    }

    /// Multiplies the current matrix by `m`, given in column-major order.
    pub fn mult_matrix(&mut self, m: &[f32; 16]) {
        self.outside("mult_matrix", |c| c.mul_top(&Mat4x4::from_cols(m)));
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        let m = crate::math::translate(vec3(x, y, z));
        self.outside("translate", |c| c.mul_top(&m));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        let m = crate::math::scale(vec3(x, y, z));
        self.outside("scale", |c| c.mul_top(&m));
    }

    /// Rotates counter-clockwise by `degs` degrees about the axis
    /// `(x, y, z)`.
    #[cfg(feature = "fp")]
    pub fn rotate(&mut self, degs: f32, x: f32, y: f32, z: f32) {
        let m = crate::math::rotate(degs, vec3(x, y, z));
        self.outside("rotate", |c| c.mul_top(&m));
    }

    /// Multiplies the current matrix by an orthographic projection.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if any pair of opposite planes coincides.
    pub fn ortho(&mut self, l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) {
        self.outside("ortho", |c| {
            if l == r || b == t || n == f {
                return Err(Error::InvalidValue);
            }
            c.mul_top(&crate::math::ortho(l, r, b, t, n, f))
        });
    }

    /// Multiplies the current matrix by a perspective projection.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `n` or `f` is not positive, or any pair
    /// of opposite planes coincides.
    pub fn frustum(&mut self, l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) {
        self.outside("frustum", |c| {
            if !(n > 0.0 && f > 0.0) || l == r || b == t || n == f {
                return Err(Error::InvalidValue);
            }
            c.mul_top(&crate::math::frustum(l, r, b, t, n, f))
        });
    }

    fn stack(&mut self) -> &mut MatrixStack {
        match self.matrix_mode {
            MatrixMode::Modelview => {
                self.mvp_dirty = true;
                &mut self.modelview
            }
            MatrixMode::Projection => {
                self.mvp_dirty = true;
                &mut self.projection
            }
            MatrixMode::Texture => &mut self.texture,
        }
    }

    /// Post-multiplies the top of the current stack by `m`.
    fn mul_top(&mut self, m: &Mat4x4) -> Result<(), Error> {
        let top = self.stack().top_mut();
        *top = top.compose(m);
        Ok(())
    }

    fn update_mvp(&mut self) {
        if self.mvp_dirty {
            let m = self.projection.top().compose(self.modelview.top());
            self.mvp = m.to();
            self.mvp_dirty = false;
        }
    }
}

//
// Drawing
//

impl<'a> Context<'a> {
    /// Starts assembling primitives of the given kind.
    ///
    /// # Errors
    /// [`Error::InvalidOperation`] if already inside `begin`/`end`.
    pub fn begin(&mut self, kind: impl Token<PrimitiveKind>) {
        self.outside("begin", |c| {
            let kind = kind.token()?;
            c.update_mvp();
            c.stats.calls += 1;
            c.prim = Some(kind);
            c.n_verts = 0;
            Ok(())
        });
    }

    /// Ends primitive assembly. A trailing incomplete primitive is
    /// discarded.
    ///
    /// # Errors
    /// [`Error::InvalidOperation`] if not inside `begin`/`end`.
    pub fn end(&mut self) {
        self.run("end", |c| {
            c.prim.take().ok_or(Error::InvalidOperation)?;
            c.n_verts = 0;
            Ok(())
        });
    }

    /// Submits a vertex with z = 0 and w = 1.
    pub fn vertex2(&mut self, x: f32, y: f32) {
        self.vertex4(x, y, 0.0, 1.0);
    }

    /// Submits a vertex with w = 1.
    pub fn vertex3(&mut self, x: f32, y: f32, z: f32) {
        self.vertex4(x, y, z, 1.0);
    }

    /// Submits a vertex with the current color and texture coordinates.
    ///
    /// When enough vertices for a primitive have been submitted, the
    /// primitive is drawn.
    ///
    /// # Errors
    /// [`Error::InvalidOperation`] if not inside `begin`/`end`.
    pub fn vertex4(&mut self, x: f32, y: f32, z: f32, w: f32) {
        self.run("vertex", |c| c.submit(vec4(x, y, z, w)));
    }

    /// Sets the current color, with alpha = 1.
    pub fn color3f(&mut self, r: f32, g: f32, b: f32) {
        self.color = rgba(r, g, b, 1.0);
    }

    pub fn color4f(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.color = rgba(r, g, b, a);
    }

    /// Sets the current color from byte channels.
    pub fn color4ub(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.color = rgba(r, g, b, a).to_color4f();
    }

    /// Sets the current color from a packed value with red in the lowest
    /// byte, that is, with channels in RGBA order in memory.
    pub fn color_u32(&mut self, c: u32) {
        self.color = Color4::from_abgr_u32(c).to_color4f();
    }

    /// Sets the current texture coordinates, transformed by the current
    /// texture matrix.
    pub fn tex_coord(&mut self, u: f32, v: f32) {
        let tc = self.texture.top().apply(&vec4(u, v, 0.0, 1.0));
        self.uv = uv(tc.x(), tc.y());
    }

    /// Binds an external vertex attribute array.
    pub fn bind_array(&mut self, arr: Array<'a>) {
        self.outside("bind_array", |c| {
            match arr {
                Array::Position(a) => c.arrays.pos = Some(a),
                Array::TexCoord(a) => c.arrays.uv = Some(a),
                Array::Color(a) => c.arrays.color = Some(a),
            }
            Ok(())
        });
    }

    /// Unbinds all vertex attribute arrays.
    pub fn unbind_arrays(&mut self) {
        self.outside("unbind_arrays", |c| {
            c.arrays = Arrays::default();
            Ok(())
        });
    }

    /// Draws primitives from elements `first..first + count` of the bound
    /// arrays.
    ///
    /// Texture coordinates and colors are taken from their arrays if
    /// bound, otherwise the current values are used. After the call, the
    /// current texture coordinates and color are those of the last vertex.
    ///
    /// # Errors
    /// * [`Error::InvalidOperation`] if no position array is bound.
    /// * [`Error::InvalidValue`] if a bound array is too short.
    pub fn draw_arrays(
        &mut self,
        kind: impl Token<PrimitiveKind>,
        first: usize,
        count: usize,
    ) {
        self.outside("draw_arrays", |c| {
            let kind = kind.token()?;
            let Arrays { pos, uv, color } = c.arrays;
            let pos = pos.ok_or(Error::InvalidOperation)?;
            let end = first.checked_add(count).ok_or(Error::InvalidValue)?;
            let fits = |len: Option<usize>, stride| {
                len.is_none_or(|len| end.saturating_mul(stride) <= len)
            };
            if !fits(Some(pos.len()), 3)
                || !fits(uv.map(<[_]>::len), 2)
                || !fits(color.map(<[_]>::len), 4)
            {
                return Err(Error::InvalidValue);
            }

            c.update_mvp();
            c.stats.calls += 1;
            c.prim = Some(kind);
            c.n_verts = 0;
            for i in first..end {
                if let Some(uv) = uv {
                    c.tex_coord(uv[2 * i], uv[2 * i + 1]);
                }
                if let Some(col) = color {
                    let [r, g, b, a] = [0, 1, 2, 3].map(|j| col[4 * i + j]);
                    c.color4ub(r, g, b, a);
                }
                let p = &pos[3 * i..3 * i + 3];
                c.submit(vec4(p[0], p[1], p[2], 1.0))?;
            }
            c.prim = None;
            c.n_verts = 0;
            Ok(())
        });
    }

    fn submit(&mut self, pos: ModelVec) -> Result<(), Error> {
        let kind = self.prim.ok_or(Error::InvalidOperation)?;
        self.verts[self.n_verts] = ClipVert {
            pos: self.mvp.apply(&pos),
            attrib: Varyings { color: self.color, uv: self.uv },
        };
        self.n_verts += 1;
        if self.n_verts == kind.vertex_count() {
            self.draw(kind);
            self.n_verts = 0;
        }
        Ok(())
    }

    /// Draws the assembled primitive.
    fn draw(&mut self, kind: PrimitiveKind) {
        log::trace!("drawing {kind:?}");
        let enabled = |cap: Capability| self.caps & cap.bit() != 0;
        let span = shade::select(
            enabled(Capability::Texture2D),
            enabled(Capability::DepthTest),
            enabled(Capability::Blend),
        );
        let scissor = enabled(Capability::ScissorTest).then_some(self.scissor);
        let cull = enabled(Capability::CullFace).then_some(self.cull_face);
        let blend = if enabled(Capability::Blend) {
            self.blend
        } else {
            Blend::REPLACE
        };
        let verts = self.verts;

        let mut pipe = Pipeline {
            fb: &mut self.fb,
            stats: &mut self.stats,
            viewport: self.viewport,
            scissor,
            span,
            frag: FragState { tex: self.textures.current(), blend },
            cull,
            mode: self.polygon_mode,
            point_size: self.point_size,
            line_width: self.line_width,
        };
        match kind {
            PrimitiveKind::Points => pipe.point(&verts[0]),
            PrimitiveKind::Lines => pipe.line(&[verts[0], verts[1]]),
            PrimitiveKind::Triangles => pipe.polygon(&verts[..3]),
            PrimitiveKind::Quads => pipe.polygon(&verts),
        }
    }

    /// Clears the given buffers, within the scissor box if the scissor
    /// test is enabled.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `mask` has unknown bits set.
    pub fn clear(&mut self, mask: ClearMask) {
        self.outside("clear", |c| {
            let known = ClearMask::COLOR.0 | ClearMask::DEPTH.0;
            if mask.0 & !known != 0 {
                return Err(Error::InvalidValue);
            }
            let rect = if c.caps & Capability::ScissorTest.bit() != 0 {
                c.scissor
            } else {
                c.fb.bounds()
            };
            let color = (mask.0 & ClearMask::COLOR.0 != 0)
                .then_some(c.clear_color);
            let depth = (mask.0 & ClearMask::DEPTH.0 != 0).then_some(1.0);
            c.fb.clear(&rect, color, depth);
            Ok(())
        });
    }
}

//
// Textures
//

impl<'a> Context<'a> {
    /// Generates `ids.len()` texture ids into `ids`.
    ///
    /// # Errors
    /// [`Error::StackOverflow`] if not enough ids are available. No id is
    /// generated in that case.
    pub fn gen_textures(&mut self, ids: &mut [u32]) {
        self.outside("gen_textures", |c| c.textures.generate(ids));
    }

    /// Deletes the textures `ids`. Deleting the bound texture binds the
    /// default texture 0. The id 0 and unused ids are ignored.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if an id is beyond the capacity of the
    /// texture store.
    pub fn delete_textures(&mut self, ids: &[u32]) {
        self.outside("delete_textures", |c| c.textures.delete(ids));
    }

    /// Binds the texture `id`.
    ///
    /// # Errors
    /// * [`Error::InvalidValue`] if `id` is beyond the store capacity.
    /// * [`Error::InvalidOperation`] if `id` has not been generated.
    pub fn bind_texture(&mut self, id: u32) {
        self.outside("bind_texture", |c| c.textures.bind(id));
    }

    /// Returns the id of the bound texture.
    pub fn bound_texture(&self) -> u32 {
        self.textures.bound()
    }

    /// Uploads an image to the bound texture.
    ///
    /// If `copy` is true, the texture stores a private copy of `data`,
    /// otherwise it references `data` directly.
    ///
    /// # Errors
    /// * [`Error::InvalidEnum`] if `fmt` and `ty` are not a valid pair.
    /// * [`Error::InvalidValue`] if a dimension is zero or `data` is too
    ///   short.
    /// * [`Error::InvalidOperation`] if the default texture is bound.
    pub fn tex_image(
        &mut self,
        w: u32,
        h: u32,
        fmt: impl Token<PixelFormat>,
        ty: impl Token<PixelType>,
        data: &'a [u8],
        copy: bool,
    ) {
        self.outside("tex_image", |c| {
            let fmt = TexFormat::from_upload(fmt.token()?, ty.token()?)?;
            let tex = c.textures.bound_mut()?;
            let data = if copy {
                Cow::Owned(Vec::from(data))
            } else {
                Cow::Borrowed(data)
            };
            tex.set_image(w, h, fmt, data)?;
            let owned = tex.is_owned();
            log::debug!(
                "texture {}: {w}x{h} {fmt:?} image, owned: {owned}",
                c.textures.bound()
            );
            Ok(())
        });
    }

    /// Sets a sampling parameter of the bound texture.
    ///
    /// # Errors
    /// * [`Error::InvalidEnum`] if `param` or `value` is invalid.
    /// * [`Error::InvalidOperation`] if the default texture is bound.
    pub fn tex_parameter(&mut self, param: impl Token<TexParam>, value: u32) {
        self.outside("tex_parameter", |c| {
            let param = param.token()?;
            c.textures.bound_mut()?.set_param(param, value)
        });
    }
}

//
// Readback and queries
//

impl<'a> Context<'a> {
    /// Copies the pixels in the given rectangle of the color buffer into
    /// `out` in the requested format. Rows are written bottom-up.
    ///
    /// # Errors
    /// * [`Error::InvalidEnum`] if `fmt` and `ty` are not a valid pair.
    /// * [`Error::InvalidValue`] if the rectangle is negative-sized or not
    ///   inside the framebuffer, or `out` is too small.
    pub fn read_pixels(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        fmt: impl Token<PixelFormat>,
        ty: impl Token<PixelType>,
        out: &mut [u8],
    ) {
        self.run("read_pixels", |c| {
            let rf = ReadFormat::new(fmt.token()?, ty.token()?)?;
            c.fb.read_pixels(&Rect::new(x, y, w, h), rf, out)
        });
    }

    /// Copies the pixels in the rectangle `src` of the color buffer into
    /// a `w`×`h` image in `out`, scaling as needed.
    ///
    /// # Errors
    /// As [`read_pixels`][Self::read_pixels].
    pub fn blit(
        &mut self,
        src: Rect,
        w: u32,
        h: u32,
        fmt: impl Token<PixelFormat>,
        ty: impl Token<PixelType>,
        out: &mut [u8],
    ) {
        self.run("blit", |c| {
            let rf = ReadFormat::new(fmt.token()?, ty.token()?)?;
            c.fb.blit(&src, w, h, rf, out)
        });
    }

    /// Writes the value of `param` into the start of `out`.
    ///
    /// Matrices are written in column-major order.
    ///
    /// # Errors
    /// * [`Error::InvalidEnum`] if `param` is invalid.
    /// * [`Error::InvalidValue`] if `out` is shorter than `param.len()`.
    pub fn get_floatv(
        &mut self,
        param: impl Token<FloatParam>,
        out: &mut [f32],
    ) {
        self.run("get_floatv", |c| {
            let param = param.token()?;
            let out = out.get_mut(..param.len()).ok_or(Error::InvalidValue)?;
            use FloatParam::*;
            match param {
                Viewport => out.copy_from_slice(&c.viewport.to_f32s()),
                ScissorBox => out.copy_from_slice(&c.scissor.to_f32s()),
                ColorClearValue => out.copy_from_slice(&c.clear_color.0),
                CurrentColor => out.copy_from_slice(&c.color.0),
                CurrentTexCoords => {
                    out.copy_from_slice(&[c.uv.u(), c.uv.v(), 0.0, 1.0])
                }
                PointSize => out[0] = c.point_size,
                LineWidth => out[0] = c.line_width,
                ModelviewMatrix => {
                    out.copy_from_slice(&c.modelview.top().to_cols())
                }
                ProjectionMatrix => {
                    out.copy_from_slice(&c.projection.top().to_cols())
                }
                TextureMatrix => {
                    out.copy_from_slice(&c.texture.top().to_cols())
                }
            }
            Ok(())
        });
    }

    /// Returns an identifying string, or `None` if `name` is invalid.
    pub fn get_string(
        &mut self,
        name: impl Token<StringName>,
    ) -> Option<&'static str> {
        match name.token() {
            Ok(StringName::Vendor) => Some(VENDOR),
            Ok(StringName::Renderer) => Some(RENDERER),
            Ok(StringName::Version) => Some(VERSION),
            Ok(StringName::Extensions) => Some(EXTENSIONS),
            Err(e) => {
                self.error.record("get_string", e);
                None
            }
        }
    }

    /// Returns the first error recorded since the last call, if any, and
    /// clears it.
    pub fn get_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Runs `f`, recording its error if any.
    fn run<F>(&mut self, op: &'static str, f: F)
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        if let Err(e) = f(self) {
            self.error.record(op, e);
        }
    }

    /// Runs `f` if not inside `begin`/`end`, recording an error if any.
    fn outside<F>(&mut self, op: &'static str, f: F)
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.run(op, |c| {
            if c.prim.is_some() {
                return Err(Error::InvalidOperation);
            }
            f(c)
        });
    }
}

fn valid_rect(x: i32, y: i32, w: i32, h: i32) -> Result<Rect, Error> {
    if w < 0 || h < 0 {
        return Err(Error::InvalidValue);
    }
    Ok(Rect::new(x, y, w, h))
}

fn valid_size(s: f32, max: f32) -> Result<f32, Error> {
    if s > 0.0 {
        Ok(s.min(max))
    } else {
        Err(Error::InvalidValue)
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;

    use super::*;

    fn ctx() -> Context<'static> {
        Context::new(8, 8, Config::default())
    }

    fn floats<const N: usize>(
        ctx: &mut Context,
        p: FloatParam,
    ) -> [f32; N] {
        let mut out = [0.0; N];
        ctx.get_floatv(p, &mut out);
        out
    }

    #[test]
    fn initial_state() {
        let mut c = ctx();
        assert_eq!(floats(&mut c, FloatParam::Viewport), [0.0, 0.0, 8.0, 8.0]);
        assert_eq!(floats(&mut c, FloatParam::ScissorBox), [0.0, 0.0, 8.0, 8.0]);
        assert_eq!(floats(&mut c, FloatParam::CurrentColor), [1.0; 4]);
        assert_eq!(
            floats(&mut c, FloatParam::ColorClearValue),
            [0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(floats(&mut c, FloatParam::PointSize), [1.0]);
        assert_eq!(
            floats(&mut c, FloatParam::ModelviewMatrix),
            Mat4x4::<RealToReal<(), ()>>::identity().to_cols()
        );
        assert!(!c.is_enabled(Capability::DepthTest));
        assert_eq!(c.bound_texture(), 0);
        assert_eq!(c.get_error(), None);
    }

    #[test]
    fn enable_disable() {
        let mut c = ctx();
        c.enable(Capability::Blend);
        c.enable(0x0B71u32);
        assert!(c.is_enabled(Capability::Blend));
        assert!(c.is_enabled(Capability::DepthTest));
        assert!(!c.is_enabled(Capability::CullFace));
        c.disable(Capability::Blend);
        assert!(!c.is_enabled(0x0BE2u32));
        assert_eq!(c.get_error(), None);
    }

    #[test]
    fn invalid_token_is_invalid_enum() {
        let mut c = ctx();
        c.enable(0x1234u32);
        assert_eq!(c.get_error(), Some(Error::InvalidEnum));
        assert!(!c.is_enabled(0x1234u32));
        assert_eq!(c.get_error(), Some(Error::InvalidEnum));
        assert_eq!(c.caps, 0);
    }

    #[test]
    fn matrix_stack_depths() {
        let mut c = ctx();
        c.matrix_mode(MatrixMode::Projection);
        c.push_matrix();
        assert_eq!(c.get_error(), None);
        c.push_matrix();
        assert_eq!(c.get_error(), Some(Error::StackOverflow));
        c.pop_matrix();
        c.pop_matrix();
        assert_eq!(c.get_error(), Some(Error::StackUnderflow));

        c.matrix_mode(MatrixMode::Modelview);
        for _ in 1..config::MODELVIEW_STACK_DEPTH {
            c.push_matrix();
        }
        assert_eq!(c.get_error(), None);
        c.push_matrix();
        assert_eq!(c.get_error(), Some(Error::StackOverflow));
    }

    #[test]
    fn push_pop_restores_matrix() {
        let mut c = ctx();
        c.translate(1.0, 2.0, 3.0);
        let before: [f32; 16] = floats(&mut c, FloatParam::ModelviewMatrix);
        c.push_matrix();
        c.scale(2.0, 2.0, 2.0);
        assert_ne!(floats(&mut c, FloatParam::ModelviewMatrix), before);
        c.pop_matrix();
        assert_eq!(floats(&mut c, FloatParam::ModelviewMatrix), before);
    }

    #[test]
    fn matrix_ops_post_multiply() {
        let mut c = ctx();
        c.translate(1.0, 0.0, 0.0);
        c.scale(2.0, 2.0, 2.0);
        let m: [f32; 16] = floats(&mut c, FloatParam::ModelviewMatrix);
        // T · S: scaling happens first, then translation
        let expected = crate::math::translate(vec3(1.0, 0.0, 0.0))
            .compose(&crate::math::scale(vec3(2.0, 2.0, 2.0)));
        assert_approx_eq!(m, expected.to_cols());
        assert_eq!(m[12], 1.0);
        assert_eq!(m[0], 2.0);
    }

    #[test]
    fn load_and_mult_matrix_are_column_major() {
        let mut c = ctx();
        let mut m = Mat4x4::<RealToReal<(), ()>>::identity().to_cols();
        m[12] = 5.0;
        c.load_matrix(&m);
        c.mult_matrix(&m);
        let res: [f32; 16] = floats(&mut c, FloatParam::ModelviewMatrix);
        assert_eq!(res[12], 10.0);
    }

    #[test]
    fn projection_validation() {
        let mut c = ctx();
        c.frustum(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        c.frustum(-1.0, 1.0, -1.0, 1.0, 1.0, -10.0);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        c.ortho(1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        c.frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        assert_eq!(c.get_error(), None);
    }

    #[test]
    fn size_validation() {
        let mut c = ctx();
        c.point_size(0.0);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        c.line_width(f32::NAN);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        c.point_size(1000.0);
        assert_eq!(floats(&mut c, FloatParam::PointSize), [64.0]);
        c.viewport(0, 0, -1, 4);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        assert_eq!(floats(&mut c, FloatParam::Viewport), [0.0, 0.0, 8.0, 8.0]);
    }

    #[test]
    fn state_guard() {
        let mut c = ctx();
        c.end();
        assert_eq!(c.get_error(), Some(Error::InvalidOperation));
        c.vertex2(0.0, 0.0);
        assert_eq!(c.get_error(), Some(Error::InvalidOperation));

        c.begin(PrimitiveKind::Triangles);
        c.enable(Capability::Blend);
        assert_eq!(c.get_error(), Some(Error::InvalidOperation));
        assert!(!c.is_enabled(Capability::Blend));
        c.begin(PrimitiveKind::Points);
        assert_eq!(c.get_error(), Some(Error::InvalidOperation));
        c.translate(1.0, 0.0, 0.0);
        assert_eq!(c.get_error(), Some(Error::InvalidOperation));

        // Color and texcoords are allowed
        c.color3f(1.0, 0.0, 0.0);
        c.tex_coord(0.5, 0.5);
        c.end();
        assert_eq!(c.get_error(), None);
        assert_eq!(c.stats().calls, 1);
    }

    #[test]
    fn tex_coord_uses_texture_matrix() {
        let mut c = ctx();
        c.matrix_mode(MatrixMode::Texture);
        c.scale(2.0, 3.0, 1.0);
        c.tex_coord(0.5, 0.25);
        assert_eq!(
            floats(&mut c, FloatParam::CurrentTexCoords),
            [1.0, 0.75, 0.0, 1.0]
        );
    }

    #[test]
    fn color_forms() {
        let mut c = ctx();
        c.color4ub(255, 0, 51, 255);
        assert_approx_eq!(
            floats::<4>(&mut c, FloatParam::CurrentColor),
            [1.0, 0.0, 0.2, 1.0]
        );
        c.color_u32(0xFF_33_00_FF);
        assert_approx_eq!(
            floats::<4>(&mut c, FloatParam::CurrentColor),
            [1.0, 0.0, 0.2, 1.0]
        );
    }

    #[test]
    fn get_floatv_needs_room() {
        let mut c = ctx();
        let mut out = [0.0; 4];
        c.get_floatv(FloatParam::ProjectionMatrix, &mut out);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn strings() {
        let mut c = ctx();
        assert_eq!(c.get_string(StringName::Vendor), Some("softgl"));
        assert!(c.get_string(0x1F02u32).is_some_and(|v| v.starts_with("1.1")));
        assert_eq!(c.get_string(0x1F04u32), None);
        assert_eq!(c.get_error(), Some(Error::InvalidEnum));
    }

    #[test]
    fn clear_rejects_unknown_bits() {
        let mut c = ctx();
        c.clear(ClearMask(0x0001));
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
    }

    #[test]
    fn resize_limits() {
        let mut c = ctx();
        c.resize(config::MAX_FRAMEBUF_DIM + 1, 4);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));
        assert_eq!(c.framebuf().width(), 8);
        c.resize(16, 4);
        assert_eq!(c.framebuf().width(), 16);
        assert_eq!(c.framebuf().height(), 4);
    }

    #[test]
    fn draw_arrays_validation() {
        let pos = [0.0; 9];
        let col = [0xFF; 8];
        let mut c = Context::new(4, 4, Config::default());
        c.draw_arrays(PrimitiveKind::Triangles, 0, 3);
        assert_eq!(c.get_error(), Some(Error::InvalidOperation));

        c.bind_array(Array::Position(&pos));
        c.bind_array(Array::Color(&col));
        c.draw_arrays(PrimitiveKind::Triangles, 0, 3);
        assert_eq!(c.get_error(), Some(Error::InvalidValue));

        c.draw_arrays(PrimitiveKind::Lines, 0, 2);
        assert_eq!(c.get_error(), None);
        assert_eq!(c.stats().calls, 1);
        assert_eq!(c.stats().prims.i, 1);
    }
}
