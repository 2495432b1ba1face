//! Frontends for creating simple windowed applications with `softgl`.

use std::time::Duration;

use softgl_core::ctx::Context;
use softgl_core::math::rgba;
use softgl_core::util::pixfmt::{IntoPixel, Xrgb8888};

#[cfg(feature = "minifb")]
pub mod minifb;

/// Window dimensions in pixels.
pub type Dims = (u32, u32);

pub mod dims {
    use super::Dims;

    pub const QVGA_320_240: Dims = (320, 240);
    pub const VGA_640_480: Dims = (640, 480);
    pub const SVGA_800_600: Dims = (800, 600);
}

/// Per-frame state. The window run method passes an instance of `Frame`
/// to the callback function on every iteration of the main loop.
pub struct Frame<'a, 'c, Win> {
    /// Elapsed time since the start of the first frame.
    pub t: Duration,
    /// Elapsed time since the start of the previous frame.
    pub dt: Duration,
    /// Reference to the window object.
    pub win: &'a mut Win,
    /// Rendering context to draw with.
    pub ctx: &'a mut Context<'c>,
}

/// Converts the bottom-up RGBA rows in `src` into top-down [`Xrgb8888`]
/// pixels in `dst`.
///
/// # Panics
/// If `w` is zero.
pub fn rgba_to_xrgb(src: &[u8], w: usize, dst: &mut [u32]) {
    let src_rows = src.chunks_exact(4 * w).rev();
    for (dst, src) in dst.chunks_exact_mut(w).zip(src_rows) {
        for (d, s) in dst.iter_mut().zip(src.chunks_exact(4)) {
            *d = rgba(s[0], s[1], s[2], s[3]).into_pixel_fmt(Xrgb8888);
        }
    }
}
