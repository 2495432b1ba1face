//! Render targets.
//!
//! The render target is a framebuffer comprising a color buffer and a depth
//! buffer, stored as raw bytes in one of several pixel formats. Row 0 is the
//! bottom row of the image.

use alloc::{vec, vec::Vec};

use crate::error::Error;
use crate::math::Color4f;
use crate::util::pixfmt::{ColorFormat, DepthFormat, ReadFormat};
use crate::util::rect::Rect;

/// Framebuffer, combining a color (pixel) buffer and a depth buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuf {
    w: u32,
    h: u32,
    color_fmt: ColorFormat,
    depth_fmt: DepthFormat,
    color: Vec<u8>,
    depth: Vec<u8>,
}

impl Framebuf {
    /// Returns a new framebuffer of size `w`×`h`, with color cleared to
    /// transparent black and depth to 1.
    pub fn new(
        w: u32,
        h: u32,
        color_fmt: ColorFormat,
        depth_fmt: DepthFormat,
    ) -> Self {
        let mut res = Self {
            w: 0,
            h: 0,
            color_fmt,
            depth_fmt,
            color: Vec::new(),
            depth: Vec::new(),
        };
        res.resize(w, h);
        res
    }

    /// Reallocates the buffers for size `w`×`h`, keeping the formats.
    ///
    /// The contents are reset as in [`new`][Self::new].
    pub fn resize(&mut self, w: u32, h: u32) {
        let n = w as usize * h as usize;
        self.w = w;
        self.h = h;
        self.color = vec![0; n * self.color_fmt.bytes_per_pixel()];
        self.depth = vec![0; n * self.depth_fmt.bytes_per_pixel()];
        self.clear(&self.bounds(), None, Some(1.0));
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.w
    }
    #[inline]
    pub fn height(&self) -> u32 {
        self.h
    }
    /// Returns the rectangle covering the whole framebuffer.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::of_size(self.w, self.h)
    }
    pub fn color_format(&self) -> ColorFormat {
        self.color_fmt
    }
    pub fn depth_format(&self) -> DepthFormat {
        self.depth_fmt
    }
    /// Returns the raw bytes of the color buffer.
    pub fn color_buf(&self) -> &[u8] {
        &self.color
    }
    /// Returns the raw bytes of the depth buffer.
    pub fn depth_buf(&self) -> &[u8] {
        &self.depth
    }

    /// Returns the linear index of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.w as usize + x
    }

    /// Returns the color of the pixel with index `i`.
    #[inline]
    pub fn color(&self, i: usize) -> Color4f {
        let n = self.color_fmt.bytes_per_pixel();
        self.color_fmt.decode(&self.color[i * n..])
    }
    /// Sets the color of the pixel with index `i`.
    #[inline]
    pub fn put_color(&mut self, i: usize, c: Color4f) {
        let n = self.color_fmt.bytes_per_pixel();
        self.color_fmt.encode(c, &mut self.color[i * n..]);
    }
    /// Returns the depth of the pixel with index `i`.
    #[inline]
    pub fn depth(&self, i: usize) -> f32 {
        let n = self.depth_fmt.bytes_per_pixel();
        self.depth_fmt.decode(&self.depth[i * n..])
    }
    /// Sets the depth of the pixel with index `i`.
    #[inline]
    pub fn put_depth(&mut self, i: usize, d: f32) {
        let n = self.depth_fmt.bytes_per_pixel();
        self.depth_fmt.encode(d, &mut self.depth[i * n..]);
    }
    /// Returns whether a fragment at depth `d` passes the depth test at
    /// the pixel with index `i`.
    ///
    /// The comparison is done at the precision of the depth buffer, so a
    /// fragment at the same depth as the stored value always passes.
    #[inline]
    pub fn depth_test(&self, i: usize, d: f32) -> bool {
        self.depth_fmt.round(d) <= self.depth(i)
    }

    /// Clears the part of the buffers within `rect` to `color` and/or
    /// `depth`.
    pub fn clear(
        &mut self,
        rect: &Rect,
        color: Option<Color4f>,
        depth: Option<f32>,
    ) {
        let (xs, ys) = rect.intersect(&self.bounds()).ranges();
        if let Some(c) = color {
            let n = self.color_fmt.bytes_per_pixel();
            let mut px = [0u8; 4];
            self.color_fmt.encode(c, &mut px);
            for y in ys.clone() {
                let i = self.index(0, y);
                let row = &mut self.color[(i + xs.start) * n..(i + xs.end) * n];
                for dst in row.chunks_exact_mut(n) {
                    dst.copy_from_slice(&px[..n]);
                }
            }
        }
        if let Some(d) = depth {
            let n = self.depth_fmt.bytes_per_pixel();
            let mut px = [0u8; 4];
            self.depth_fmt.encode(d.clamp(0.0, 1.0), &mut px);
            for y in ys {
                let i = self.index(0, y);
                let row = &mut self.depth[(i + xs.start) * n..(i + xs.end) * n];
                for dst in row.chunks_exact_mut(n) {
                    dst.copy_from_slice(&px[..n]);
                }
            }
        }
    }

    /// Copies the pixels within `rect` into `out`, converting them to
    /// `fmt`. Rows are written bottom-up and tightly packed.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `rect` is not within the framebuffer or
    /// `out` is too small.
    pub fn read_pixels(
        &self,
        rect: &Rect,
        fmt: ReadFormat,
        out: &mut [u8],
    ) -> Result<(), Error> {
        self.blit(rect, rect.w as u32, rect.h as u32, fmt, out)
    }

    /// Copies the pixels within `src` into a `w`×`h` image in `out`,
    /// scaling with nearest-neighbour sampling and converting to `fmt`.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `src` is negative-sized or not within the
    /// framebuffer, or `out` is too small.
    pub fn blit(
        &self,
        src: &Rect,
        w: u32,
        h: u32,
        fmt: ReadFormat,
        out: &mut [u8],
    ) -> Result<(), Error> {
        if src.w < 0 || src.h < 0 || src.intersect(&self.bounds()) != *src {
            return Err(Error::InvalidValue);
        }
        let n = fmt.bytes_per_pixel();
        let len = (w as usize)
            .checked_mul(h as usize)
            .and_then(|p| p.checked_mul(n))
            .ok_or(Error::InvalidValue)?;
        if out.len() < len {
            return Err(Error::InvalidValue);
        }
        if src.is_empty() || len == 0 {
            return Ok(());
        }
        let (sw, sh) = (src.w as usize, src.h as usize);
        let (w, h) = (w as usize, h as usize);

        for (dy, row) in out[..len].chunks_exact_mut(w * n).enumerate() {
            let sy = src.y as usize + dy * sh / h;
            for (dx, px) in row.chunks_exact_mut(n).enumerate() {
                let sx = src.x as usize + dx * sw / w;
                fmt.encode(self.color(self.index(sx, sy)), px);
            }
        }
        Ok(())
    }
}
