//! Per-fragment processing of scanlines.
//!
//! Each scanline is turned into fragments that are optionally textured,
//! depth tested, and blended before being written to the framebuffer. The
//! three optional stages are selected by const generic flags, and the eight
//! resulting span functions are collected into a table indexed by the
//! enabled capabilities, so the per-pixel loop contains no state branches.

use crate::math::Vary;

use super::{
    Varyings,
    blend::Blend,
    raster::Scanline,
    stats::Throughput,
    target::Framebuf,
    tex::Texture,
};

/// Fragment state shared by all scanlines of a primitive.
#[derive(Copy, Clone, Debug)]
pub struct FragState<'t> {
    /// Texture to sample, if texturing is enabled.
    pub tex: &'t Texture<'t>,
    /// Blend function, if blending is enabled.
    pub blend: Blend,
}

/// A span function: writes the fragments of one scanline to a framebuffer.
///
/// Returns the count of fragments input and output.
pub type SpanFn =
    fn(&mut Framebuf, &FragState, &Scanline<Varyings>) -> Throughput;

/// Span functions for every combination of texturing, depth testing,
/// and blending, indexed by [`index`].
pub const SPANS: [SpanFn; 8] = [
    span::<false, false, false>,
    span::<true, false, false>,
    span::<false, true, false>,
    span::<true, true, false>,
    span::<false, false, true>,
    span::<true, false, true>,
    span::<false, true, true>,
    span::<true, true, true>,
];

/// Returns the index into [`SPANS`] of the span function with the given
/// stages enabled.
#[inline]
pub const fn index(tex: bool, depth: bool, blend: bool) -> usize {
    tex as usize | (depth as usize) << 1 | (blend as usize) << 2
}

/// Returns the span function with the given stages enabled.
#[inline]
pub fn select(tex: bool, depth: bool, blend: bool) -> SpanFn {
    SPANS[index(tex, depth, blend)]
}

/// Writes the fragments of `sl` to `fb`.
///
/// * `TEX`: modulate the vertex color with the texture color.
/// * `DEPTH`: test against and update the depth buffer.
/// * `BLEND`: blend with the existing color.
pub fn span<const TEX: bool, const DEPTH: bool, const BLEND: bool>(
    fb: &mut Framebuf,
    st: &FragState,
    sl: &Scanline<Varyings>,
) -> Throughput {
    let mut io = Throughput { i: sl.xs.len(), o: 0 };
    let i0 = fb.index(sl.xs.start, sl.y);

    for (i, (pos, var)) in (i0..).zip(sl.varyings()) {
        let z = pos.z().clamp(0.0, 1.0);
        if DEPTH && !fb.depth_test(i, z) {
            continue;
        }
        // Perspective correction
        let w = pos.w().recip();
        let var = var.z_div(w);

        let mut color = var.color;
        if TEX {
            let dtc_dx = sl.dv_dx.1.uv * w;
            let dtc_dy = sl.dv_dy.1.uv * w;
            color = st.tex.sample(var.uv, dtc_dx, dtc_dy).mul_color(color);
        }
        if BLEND {
            color = st.blend.apply(color, fb.color(i));
        }
        fb.put_color(i, color);
        if DEPTH {
            fb.put_depth(i, z);
        }
        io.o += 1;
    }
    io
}
