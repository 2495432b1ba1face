//! Textures and texture sampling.

use alloc::borrow::Cow;

use crate::error::{Error, tokens};
use crate::math::{Color4f, Lerp, TexCoord, float};
use crate::util::pixfmt::TexFormat;

tokens! {
    /// Texture filtering mode.
    pub enum Filter {
        /// Sample the texel covering the coordinate.
        Nearest = 0x2600,
        /// Bilinearly interpolate the four nearest texels.
        Linear = 0x2601,
    }
}

tokens! {
    /// Texture coordinate wrapping mode.
    pub enum Wrap {
        /// Tile the texture infinitely.
        Repeat = 0x2901,
        /// Repeat the edge texels.
        ClampToEdge = 0x812F,
        /// Tile the texture, mirroring every other copy.
        MirroredRepeat = 0x8370,
    }
}

tokens! {
    /// Settable texture parameter.
    pub enum TexParam {
        MagFilter = 0x2800,
        MinFilter = 0x2801,
        WrapS = 0x2802,
        WrapT = 0x2803,
    }
}

/// A texture record: image data plus sampling parameters.
///
/// The image data is either owned by the texture or borrowed from the
/// caller for the lifetime `'a`.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture<'a> {
    w: u32,
    h: u32,
    fmt: TexFormat,
    data: Cow<'a, [u8]>,
    /// Filter used when a texel covers less than a pixel.
    pub min: Filter,
    /// Filter used when a texel covers a pixel or more.
    pub mag: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

impl Wrap {
    /// Maps the texel index `i` into `0..n` according to `self`.
    #[inline]
    pub fn apply(self, i: i32, n: i32) -> i32 {
        match self {
            Self::Repeat => i.rem_euclid(n),
            Self::ClampToEdge => i.clamp(0, n - 1),
            Self::MirroredRepeat => {
                let m = i.rem_euclid(2 * n);
                if m >= n { 2 * n - 1 - m } else { m }
            }
        }
    }
}

impl<'a> Texture<'a> {
    /// Returns a texture with no image and default parameters: linear
    /// filtering, repeat wrapping.
    pub const fn empty() -> Self {
        Self {
            w: 0,
            h: 0,
            fmt: TexFormat::Rgba8888,
            data: Cow::Borrowed(&[]),
            min: Filter::Linear,
            mag: Filter::Linear,
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
        }
    }

    /// Returns the 2×2 opaque white texture with nearest filtering.
    pub fn white() -> Texture<'static> {
        Texture {
            w: 2,
            h: 2,
            data: Cow::Owned([0xFF; 16].into()),
            min: Filter::Nearest,
            mag: Filter::Nearest,
            ..Texture::empty()
        }
    }

    /// Replaces the image of `self`, keeping the parameters.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if a dimension is zero or `data` holds fewer
    /// than `w * h` texels of format `fmt`.
    pub fn set_image(
        &mut self,
        w: u32,
        h: u32,
        fmt: TexFormat,
        data: Cow<'a, [u8]>,
    ) -> Result<(), Error> {
        let len = (w as usize)
            .checked_mul(h as usize)
            .and_then(|n| n.checked_mul(fmt.bytes_per_texel()))
            .ok_or(Error::InvalidValue)?;
        if w == 0 || h == 0 || data.len() < len {
            return Err(Error::InvalidValue);
        }
        let data = match data {
            Cow::Borrowed(d) => Cow::Borrowed(&d[..len]),
            Cow::Owned(mut d) => {
                d.truncate(len);
                Cow::Owned(d)
            }
        };
        *self = Self { w, h, fmt, data, ..*self };
        Ok(())
    }

    /// Sets the parameter `p` to the raw token `value`.
    ///
    /// # Errors
    /// [`Error::InvalidEnum`] if `value` is not valid for `p`.
    pub fn set_param(&mut self, p: TexParam, value: u32) -> Result<(), Error> {
        match p {
            TexParam::MagFilter => self.mag = value.try_into()?,
            TexParam::MinFilter => self.min = value.try_into()?,
            TexParam::WrapS => self.wrap_s = value.try_into()?,
            TexParam::WrapT => self.wrap_t = value.try_into()?,
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.w
    }
    #[inline]
    pub fn height(&self) -> u32 {
        self.h
    }
    #[inline]
    pub fn format(&self) -> TexFormat {
        self.fmt
    }
    /// Returns whether an image has been set.
    #[inline]
    pub fn has_image(&self) -> bool {
        self.w > 0 && self.h > 0
    }
    /// Returns whether the image data is a private copy.
    pub fn is_owned(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }
    /// Returns the raw image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the texel at `(x, y)`, wrapping the indices.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> Color4f {
        let (w, h) = (self.w as i32, self.h as i32);
        let x = self.wrap_s.apply(x, w);
        let y = self.wrap_t.apply(y, h);
        self.fmt.decode(&self.data, (y * w + x) as usize)
    }

    /// Samples `self` at `tc`, choosing the filter based on the screen
    /// space derivatives of the texture coordinates.
    ///
    /// The derivatives are estimated per primitive rather than per pixel.
    pub fn sample(
        &self,
        tc: TexCoord,
        dtc_dx: TexCoord,
        dtc_dy: TexCoord,
    ) -> Color4f {
        let (w, h) = (self.w as f32, self.h as f32);
        let (w2, h2) = (w * w, h * h);
        let len_sq = |d: TexCoord| d.u() * d.u() * w2 + d.v() * d.v() * h2;
        let rho_sq = len_sq(dtc_dx).max(len_sq(dtc_dy));

        let filter = if rho_sq > 1.0 { self.min } else { self.mag };
        match filter {
            Filter::Nearest => self.sample_nearest(tc),
            Filter::Linear => self.sample_linear(tc),
        }
    }

    /// Returns the texel covering `tc`.
    pub fn sample_nearest(&self, tc: TexCoord) -> Color4f {
        let x = float::f32::floor(tc.u() * self.w as f32) as i32;
        let y = float::f32::floor(tc.v() * self.h as f32) as i32;
        self.texel(x, y)
    }

    /// Returns the bilinear interpolation of the four texels nearest
    /// to `tc`.
    pub fn sample_linear(&self, tc: TexCoord) -> Color4f {
        let u = tc.u() * self.w as f32 - 0.5;
        let v = tc.v() * self.h as f32 - 0.5;
        let (x0, y0) = (float::f32::floor(u), float::f32::floor(v));
        let (fx, fy) = (u - x0, v - y0);
        let (x0, y0) = (x0 as i32, y0 as i32);

        let bot = self.texel(x0, y0).lerp(&self.texel(x0 + 1, y0), fx);
        let top = self.texel(x0, y0 + 1).lerp(&self.texel(x0 + 1, y0 + 1), fx);
        bot.lerp(&top, fy)
    }
}

impl Default for Texture<'_> {
    fn default() -> Self {
        Self::empty()
    }
}
