//! Pixel formats and conversions.
//!
//! Three families of formats meet here:
//! * [`ColorFormat`] and [`DepthFormat`]: the storage formats of the
//!   framebuffer, chosen once at context creation,
//! * [`TexFormat`]: the storage formats of texture images, resolved from
//!   a caller-supplied (format, type) pair on upload,
//! * [`ReadFormat`]: the formats the color buffer can be converted to
//!   when it is read back.
//!
//! Every format decodes to and encodes from normalized [`Color4f`].
//! Encoding clamps each channel to [0, 1] and rounds to the nearest
//! representable value.

use crate::error::{Error, tokens};
use crate::math::{Color4, Color4f, rgba};

//
// Packed pixel conversions
//

pub trait IntoPixel<T, F>: Sized {
    /// Converts `self` to `T` in format `F`.
    fn into_pixel(self) -> T;

    /// Converts `self` to `T`, taking an `F` to help type inference.
    ///
    /// This can be used to avoid the awkward fully-qualified syntax
    /// `IntoPixel::<_, F>::into_pixel(self)`.
    fn into_pixel_fmt(self, _: F) -> T {
        self.into_pixel()
    }
}

pub trait FromPixel<T, F>: Sized {
    /// Converts `pix` in format `F` to `Self`.
    fn from_pixel(pix: T) -> Self;

    /// Converts `pix` to `Self`, taking an `F` to help type inference.
    fn from_pixel_fmt(pix: T, _: F) -> Self {
        Self::from_pixel(pix)
    }
}

/// 3,3,2-bit channels in R,G,B order, red in the high bits.
#[derive(Copy, Clone, Debug, Default)]
pub struct Rgb332;
/// 5,6,5-bit channels in R,G,B order, red in the high bits.
#[derive(Copy, Clone, Debug, Default)]
pub struct Rgb565;
/// 5,5,5,1-bit channels in R,G,B,A order, red in the high bits.
#[derive(Copy, Clone, Debug, Default)]
pub struct Rgba5551;
/// Four-bit channels in R,G,B,A order, red in the high bits.
#[derive(Copy, Clone, Debug, Default)]
pub struct Rgba4444;
/// Eight-bit channels in X,R,G,B order, where X is unused.
#[derive(Copy, Clone, Debug, Default)]
pub struct Xrgb8888;

/// Returns `c` clamped to [0, 1] and scaled to `0..=max` with rounding.
#[inline]
fn quantize(c: f32, max: u32) -> u32 {
    (c.clamp(0.0, 1.0) * max as f32 + 0.5) as u32
}

#[inline]
fn unquantize(c: u32, max: u32) -> f32 {
    c as f32 / max as f32
}

impl IntoPixel<u8, Rgb332> for Color4f {
    fn into_pixel(self) -> u8 {
        let [r, g, b, _] = self.0;
        (quantize(r, 7) << 5 | quantize(g, 7) << 2 | quantize(b, 3)) as u8
    }
}
impl FromPixel<u8, Rgb332> for Color4f {
    fn from_pixel(pix: u8) -> Self {
        let pix = pix as u32;
        rgba(
            unquantize(pix >> 5, 7),
            unquantize(pix >> 2 & 0x7, 7),
            unquantize(pix & 0x3, 3),
            1.0,
        )
    }
}

impl IntoPixel<u16, Rgb565> for Color4f {
    fn into_pixel(self) -> u16 {
        let [r, g, b, _] = self.0;
        (quantize(r, 31) << 11 | quantize(g, 63) << 5 | quantize(b, 31)) as u16
    }
}
impl FromPixel<u16, Rgb565> for Color4f {
    fn from_pixel(pix: u16) -> Self {
        let pix = pix as u32;
        rgba(
            unquantize(pix >> 11, 31),
            unquantize(pix >> 5 & 0x3F, 63),
            unquantize(pix & 0x1F, 31),
            1.0,
        )
    }
}

impl IntoPixel<u16, Rgba5551> for Color4f {
    fn into_pixel(self) -> u16 {
        let [r, g, b, a] = self.0;
        (quantize(r, 31) << 11
            | quantize(g, 31) << 6
            | quantize(b, 31) << 1
            | quantize(a, 1)) as u16
    }
}
impl FromPixel<u16, Rgba5551> for Color4f {
    fn from_pixel(pix: u16) -> Self {
        let pix = pix as u32;
        rgba(
            unquantize(pix >> 11, 31),
            unquantize(pix >> 6 & 0x1F, 31),
            unquantize(pix >> 1 & 0x1F, 31),
            unquantize(pix & 0x1, 1),
        )
    }
}

impl IntoPixel<u16, Rgba4444> for Color4f {
    fn into_pixel(self) -> u16 {
        let [r, g, b, a] = self.0.map(|c| quantize(c, 15));
        (r << 12 | g << 8 | b << 4 | a) as u16
    }
}
impl FromPixel<u16, Rgba4444> for Color4f {
    fn from_pixel(pix: u16) -> Self {
        let pix = pix as u32;
        rgba(
            unquantize(pix >> 12, 15),
            unquantize(pix >> 8 & 0xF, 15),
            unquantize(pix >> 4 & 0xF, 15),
            unquantize(pix & 0xF, 15),
        )
    }
}

impl IntoPixel<u32, Xrgb8888> for Color4 {
    fn into_pixel(self) -> u32 {
        let [r, g, b, _] = self.0;
        // From [0x00, 0xRR, 0xGG, 0xBB] to 0x00_RR_GG_BB -> big-endian!
        u32::from_be_bytes([0, r, g, b])
    }
}

/// Converts an IEEE 754 half-precision float to `f32`.
///
/// Subnormal halves are flushed to zero; infinities and NaNs are
/// preserved.
pub fn half_to_f32(h: u16) -> f32 {
    let sign = ((h & 0x8000) as u32) << 16;
    let em = (h & 0x7FFF) as u32;
    // Rebias the exponent from 15 to 127 and widen the mantissa
    let mut bits = (em + (112 << 10)) << 13;
    if em < 1 << 10 {
        bits = 0;
    }
    if em >= 31 << 10 {
        bits += 112 << 23;
    }
    f32::from_bits(sign | bits)
}

#[inline]
fn u16_at(bytes: &[u8], i: usize) -> u16 {
    u16::from_ne_bytes([bytes[i], bytes[i + 1]])
}

#[inline]
fn f32_at(bytes: &[u8], i: usize) -> f32 {
    f32::from_ne_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
}

#[inline]
fn half_at(bytes: &[u8], i: usize) -> f32 {
    half_to_f32(u16_at(bytes, i))
}

//
// Framebuffer formats
//

/// Storage format of the framebuffer color buffer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ColorFormat {
    /// 8 bits per pixel: 3-bit red and green, 2-bit blue.
    R3G3B2,
    /// 16 bits per pixel: 5-bit red and blue, 6-bit green.
    R5G6B5,
    /// 24 bits per pixel, 8 bits per channel.
    R8G8B8,
    /// 32 bits per pixel, 8 bits per channel including alpha.
    #[default]
    R8G8B8A8,
}

impl ColorFormat {
    /// Returns the number of bytes per pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::R3G3B2 => 1,
            Self::R5G6B5 => 2,
            Self::R8G8B8 => 3,
            Self::R8G8B8A8 => 4,
        }
    }

    /// Returns whether the format stores an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::R8G8B8A8)
    }

    /// Encodes `c` into the first `bytes_per_pixel` bytes of `out`.
    ///
    /// # Panics
    /// If `out` is too short.
    #[inline]
    pub fn encode(self, c: Color4f, out: &mut [u8]) {
        match self {
            Self::R3G3B2 => out[0] = c.into_pixel_fmt(Rgb332),
            Self::R5G6B5 => {
                let p: u16 = c.into_pixel_fmt(Rgb565);
                out[..2].copy_from_slice(&p.to_ne_bytes());
            }
            Self::R8G8B8 => {
                let [r, g, b, _] = c.to_color4().0;
                out[..3].copy_from_slice(&[r, g, b]);
            }
            Self::R8G8B8A8 => out[..4].copy_from_slice(&c.to_color4().0),
        }
    }

    /// Decodes a color from the first `bytes_per_pixel` bytes of `bytes`.
    /// Formats without alpha decode with alpha = 1.
    ///
    /// # Panics
    /// If `bytes` is too short.
    #[inline]
    pub fn decode(self, bytes: &[u8]) -> Color4f {
        match self {
            Self::R3G3B2 => Color4f::from_pixel_fmt(bytes[0], Rgb332),
            Self::R5G6B5 => Color4f::from_pixel_fmt(u16_at(bytes, 0), Rgb565),
            Self::R8G8B8 => {
                rgba(bytes[0], bytes[1], bytes[2], 0xFF).to_color4f()
            }
            Self::R8G8B8A8 => {
                rgba(bytes[0], bytes[1], bytes[2], bytes[3]).to_color4f()
            }
        }
    }
}

/// Storage format of the framebuffer depth buffer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DepthFormat {
    /// 8-bit unsigned normalized depth.
    D8,
    /// 16-bit unsigned normalized depth.
    #[default]
    D16,
    /// 24-bit unsigned normalized depth, little-endian.
    D24,
}

impl DepthFormat {
    /// Returns the number of bytes per depth value.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::D8 => 1,
            Self::D16 => 2,
            Self::D24 => 3,
        }
    }

    const fn max(self) -> u32 {
        match self {
            Self::D8 => 0xFF,
            Self::D16 => 0xFFFF,
            Self::D24 => 0xFF_FFFF,
        }
    }

    /// Returns `d` rounded to the precision of `self`.
    #[inline]
    pub fn round(self, d: f32) -> f32 {
        unquantize(quantize(d, self.max()), self.max())
    }

    /// Encodes depth `d` into the first `bytes_per_pixel` bytes of `out`.
    #[inline]
    pub fn encode(self, d: f32, out: &mut [u8]) {
        let q = quantize(d, self.max());
        match self {
            Self::D8 => out[0] = q as u8,
            Self::D16 => out[..2].copy_from_slice(&(q as u16).to_ne_bytes()),
            Self::D24 => out[..3].copy_from_slice(&q.to_le_bytes()[..3]),
        }
    }

    /// Decodes a depth value from the first `bytes_per_pixel` bytes
    /// of `bytes`.
    #[inline]
    pub fn decode(self, bytes: &[u8]) -> f32 {
        let q = match self {
            Self::D8 => bytes[0] as u32,
            Self::D16 => u16_at(bytes, 0) as u32,
            Self::D24 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
        };
        unquantize(q, self.max())
    }
}

//
// External formats
//

tokens! {
    /// Channel layout of caller-supplied or caller-requested pixel data.
    pub enum PixelFormat {
        Red = 0x1903,
        Rgb = 0x1907,
        Rgba = 0x1908,
        Luminance = 0x1909,
        LuminanceAlpha = 0x190A,
        Bgr = 0x80E0,
        Bgra = 0x80E1,
    }
}

tokens! {
    /// Channel data type of caller-supplied or caller-requested pixel data.
    pub enum PixelType {
        UnsignedByte = 0x1401,
        UnsignedShort = 0x1403,
        UnsignedInt = 0x1405,
        Float = 0x1406,
        HalfFloat = 0x140B,
        UnsignedShort4444 = 0x8033,
        UnsignedShort5551 = 0x8034,
        UnsignedShort565 = 0x8363,
    }
}

//
// Texture formats
//

/// Storage format of a texture image.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TexFormat {
    /// 8-bit luminance, replicated to RGB; alpha = 1.
    Luminance,
    /// 8-bit luminance followed by 8-bit alpha.
    LuminanceAlpha,
    Rgb565,
    Rgb888,
    Rgba5551,
    Rgba4444,
    Rgba8888,
    /// 32-bit float, replicated to RGB; alpha = 1.
    R32f,
    Rgb32f,
    Rgba32f,
    /// 16-bit half float, replicated to RGB; alpha = 1.
    R16f,
    Rgb16f,
    Rgba16f,
}

impl TexFormat {
    /// Resolves the texture format of uploaded data in the given layout.
    ///
    /// # Errors
    /// [`Error::InvalidEnum`] if the combination is not supported.
    pub fn from_upload(fmt: PixelFormat, ty: PixelType) -> Result<Self, Error> {
        use {PixelFormat as P, PixelType as T};
        Ok(match (fmt, ty) {
            (P::Luminance, T::UnsignedByte) => Self::Luminance,
            (P::LuminanceAlpha, T::UnsignedByte) => Self::LuminanceAlpha,
            (P::Rgb, T::UnsignedByte) => Self::Rgb888,
            (P::Rgb, T::UnsignedShort565) => Self::Rgb565,
            (P::Rgb, T::Float) => Self::Rgb32f,
            (P::Rgb, T::HalfFloat) => Self::Rgb16f,
            (P::Rgba, T::UnsignedByte) => Self::Rgba8888,
            (P::Rgba, T::UnsignedShort5551) => Self::Rgba5551,
            (P::Rgba, T::UnsignedShort4444) => Self::Rgba4444,
            (P::Rgba, T::Float) => Self::Rgba32f,
            (P::Rgba, T::HalfFloat) => Self::Rgba16f,
            (P::Red, T::Float) => Self::R32f,
            (P::Red, T::HalfFloat) => Self::R16f,
            _ => return Err(Error::InvalidEnum),
        })
    }

    /// Returns the number of bytes per texel.
    pub const fn bytes_per_texel(self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::LuminanceAlpha | Self::Rgb565 => 2,
            Self::Rgba5551 | Self::Rgba4444 | Self::R16f => 2,
            Self::Rgb888 => 3,
            Self::Rgba8888 | Self::R32f => 4,
            Self::Rgb16f => 6,
            Self::Rgba16f => 8,
            Self::Rgb32f => 12,
            Self::Rgba32f => 16,
        }
    }

    /// Decodes the texel with index `i` in `data`.
    ///
    /// # Panics
    /// If `data` is too short to contain texel `i`.
    #[inline]
    pub fn decode(self, data: &[u8], i: usize) -> Color4f {
        let o = i * self.bytes_per_texel();
        let gray = |l: f32, a: f32| rgba(l, l, l, a);
        match self {
            Self::Luminance => gray(unquantize(data[o] as u32, 255), 1.0),
            Self::LuminanceAlpha => gray(
                unquantize(data[o] as u32, 255),
                unquantize(data[o + 1] as u32, 255),
            ),
            Self::Rgb565 => Color4f::from_pixel_fmt(u16_at(data, o), Rgb565),
            Self::Rgba5551 => {
                Color4f::from_pixel_fmt(u16_at(data, o), Rgba5551)
            }
            Self::Rgba4444 => {
                Color4f::from_pixel_fmt(u16_at(data, o), Rgba4444)
            }
            Self::Rgb888 => {
                rgba(data[o], data[o + 1], data[o + 2], 0xFF).to_color4f()
            }
            Self::Rgba8888 => {
                rgba(data[o], data[o + 1], data[o + 2], data[o + 3])
                    .to_color4f()
            }
            Self::R32f => gray(f32_at(data, o), 1.0),
            Self::Rgb32f => rgba(
                f32_at(data, o),
                f32_at(data, o + 4),
                f32_at(data, o + 8),
                1.0,
            ),
            Self::Rgba32f => rgba(
                f32_at(data, o),
                f32_at(data, o + 4),
                f32_at(data, o + 8),
                f32_at(data, o + 12),
            ),
            Self::R16f => gray(half_at(data, o), 1.0),
            Self::Rgb16f => rgba(
                half_at(data, o),
                half_at(data, o + 2),
                half_at(data, o + 4),
                1.0,
            ),
            Self::Rgba16f => rgba(
                half_at(data, o),
                half_at(data, o + 2),
                half_at(data, o + 4),
                half_at(data, o + 6),
            ),
        }
    }
}

//
// Readback formats
//

/// Channel representation of a [`ReadFormat`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum Channels {
    U8,
    U16,
    U32,
    F32,
    Packed565,
    Packed5551,
    Packed4444,
}

/// A pixel format the color buffer can be converted to on readback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ReadFormat {
    /// Whether red and blue are swapped.
    bgr: bool,
    /// Whether alpha is included.
    alpha: bool,
    repr: Channels,
}

impl ReadFormat {
    /// Resolves the readback format for the given layout.
    ///
    /// # Errors
    /// [`Error::InvalidEnum`] if the combination is not supported.
    pub fn new(fmt: PixelFormat, ty: PixelType) -> Result<Self, Error> {
        use {PixelFormat as P, PixelType as T};
        let (bgr, alpha) = match fmt {
            P::Rgb => (false, false),
            P::Bgr => (true, false),
            P::Rgba => (false, true),
            P::Bgra => (true, true),
            _ => return Err(Error::InvalidEnum),
        };
        let repr = match (ty, alpha) {
            (T::UnsignedByte, _) => Channels::U8,
            (T::UnsignedShort, _) => Channels::U16,
            (T::UnsignedInt, _) => Channels::U32,
            (T::Float, _) => Channels::F32,
            (T::UnsignedShort565, false) => Channels::Packed565,
            (T::UnsignedShort5551, true) => Channels::Packed5551,
            (T::UnsignedShort4444, true) => Channels::Packed4444,
            _ => return Err(Error::InvalidEnum),
        };
        Ok(Self { bgr, alpha, repr })
    }

    /// Returns the number of bytes per pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        let n = if self.alpha { 4 } else { 3 };
        match self.repr {
            Channels::U8 => n,
            Channels::U16 => 2 * n,
            Channels::U32 | Channels::F32 => 4 * n,
            Channels::Packed565
            | Channels::Packed5551
            | Channels::Packed4444 => 2,
        }
    }

    /// Encodes `c` into the first `bytes_per_pixel` bytes of `out`.
    ///
    /// # Panics
    /// If `out` is too short.
    pub fn encode(self, c: Color4f, out: &mut [u8]) {
        let [r, g, b, a] = c.0;
        let c = if self.bgr { rgba(b, g, r, a) } else { c };
        let n = if self.alpha { 4 } else { 3 };

        match self.repr {
            Channels::U8 => {
                for (o, ch) in out.iter_mut().zip(&c.0[..n]) {
                    *o = quantize(*ch, 0xFF) as u8;
                }
            }
            Channels::U16 => {
                for (o, ch) in out.chunks_exact_mut(2).zip(&c.0[..n]) {
                    let q = quantize(*ch, 0xFFFF) as u16;
                    o.copy_from_slice(&q.to_ne_bytes());
                }
            }
            Channels::U32 => {
                for (o, ch) in out.chunks_exact_mut(4).zip(&c.0[..n]) {
                    let q = (ch.clamp(0.0, 1.0) as f64 * u32::MAX as f64
                        + 0.5) as u32;
                    o.copy_from_slice(&q.to_ne_bytes());
                }
            }
            Channels::F32 => {
                for (o, ch) in out.chunks_exact_mut(4).zip(&c.0[..n]) {
                    o.copy_from_slice(&ch.to_ne_bytes());
                }
            }
            Channels::Packed565 => {
                let p: u16 = c.into_pixel_fmt(Rgb565);
                out[..2].copy_from_slice(&p.to_ne_bytes());
            }
            Channels::Packed5551 => {
                let p: u16 = c.into_pixel_fmt(Rgba5551);
                out[..2].copy_from_slice(&p.to_ne_bytes());
            }
            Channels::Packed4444 => {
                let p: u16 = c.into_pixel_fmt(Rgba4444);
                out[..2].copy_from_slice(&p.to_ne_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;

    use super::*;

    const COL: Color4f = rgba(0.2, 0.4, 0.6, 0.8);

    fn roundtrip_color(fmt: ColorFormat, c: Color4f) -> Color4f {
        let mut buf = [0u8; 4];
        fmt.encode(c, &mut buf);
        fmt.decode(&buf)
    }

    #[test]
    fn color_format_quantization_error() {
        use ColorFormat::*;
        let cases = [
            (R3G3B2, [1.0 / 7.0, 1.0 / 7.0, 1.0 / 3.0]),
            (R5G6B5, [1.0 / 31.0, 1.0 / 63.0, 1.0 / 31.0]),
            (R8G8B8, [1.0 / 255.0; 3]),
            (R8G8B8A8, [1.0 / 255.0; 3]),
        ];
        for (fmt, max_err) in cases {
            let res = roundtrip_color(fmt, COL);
            for i in 0..3 {
                let err = (res.0[i] - COL.0[i]).abs();
                assert!(err <= max_err[i] / 2.0 + 1e-6, "{fmt:?}: {res:?}");
            }
        }
    }

    #[test]
    fn color_format_alpha() {
        let res = roundtrip_color(ColorFormat::R8G8B8A8, COL);
        assert_approx_eq!(res.a(), 0.8, eps = 0.002);
        let res = roundtrip_color(ColorFormat::R5G6B5, COL);
        assert_eq!(res.a(), 1.0);
        let res = roundtrip_color(ColorFormat::R8G8B8, COL);
        assert_eq!(res.a(), 1.0);
    }

    #[test]
    fn color_format_extremes_are_exact() {
        use ColorFormat::*;
        for fmt in [R3G3B2, R5G6B5, R8G8B8, R8G8B8A8] {
            assert_eq!(roundtrip_color(fmt, Color4f::WHITE), Color4f::WHITE);
            let black = rgba(0.0, 0.0, 0.0, 1.0);
            assert_eq!(roundtrip_color(fmt, black), black);
        }
    }

    #[test]
    fn color_format_layout() {
        let mut buf = [0u8; 4];
        ColorFormat::R3G3B2.encode(rgba(1.0, 0.0, 1.0, 1.0), &mut buf);
        assert_eq!(buf[0], 0b111_000_11);

        ColorFormat::R5G6B5.encode(rgba(0.0, 1.0, 0.0, 1.0), &mut buf);
        assert_eq!(u16::from_ne_bytes([buf[0], buf[1]]), 0b00000_111111_00000);

        ColorFormat::R8G8B8A8.encode(rgba(1.0, 0.0, 0.5, 1.0), &mut buf);
        assert_eq!(buf, [0xFF, 0x00, 0x80, 0xFF]);
    }

    #[test]
    fn depth_format_roundtrip() {
        use DepthFormat::*;
        for (fmt, max) in [(D8, 255.0), (D16, 65535.0), (D24, 16777215.0)] {
            let mut buf = [0u8; 3];
            for d in [0.0, 0.25, 0.5, 0.999, 1.0] {
                fmt.encode(d, &mut buf);
                let res = fmt.decode(&buf);
                assert!((res - d).abs() <= 0.5 / max + 1e-6, "{fmt:?} {d}");
            }
        }
    }

    #[test]
    fn depth_format_clamps() {
        let mut buf = [0u8; 2];
        DepthFormat::D16.encode(2.0, &mut buf);
        assert_eq!(DepthFormat::D16.decode(&buf), 1.0);
        DepthFormat::D16.encode(-1.0, &mut buf);
        assert_eq!(DepthFormat::D16.decode(&buf), 0.0);
    }

    #[test]
    fn half_float_conversion() {
        assert_eq!(half_to_f32(0x0000), 0.0);
        assert_eq!(half_to_f32(0x3C00), 1.0);
        assert_eq!(half_to_f32(0xC000), -2.0);
        assert_eq!(half_to_f32(0x3800), 0.5);
        assert_eq!(half_to_f32(0x7C00), f32::INFINITY);
        assert!(half_to_f32(0x7E00).is_nan());
        // Subnormal flushed to zero
        assert_eq!(half_to_f32(0x0001), 0.0);
    }

    #[test]
    fn tex_format_from_upload() {
        use {PixelFormat as P, PixelType as T};
        assert_eq!(
            TexFormat::from_upload(P::Rgba, T::UnsignedByte),
            Ok(TexFormat::Rgba8888)
        );
        assert_eq!(
            TexFormat::from_upload(P::Rgb, T::UnsignedShort565),
            Ok(TexFormat::Rgb565)
        );
        assert_eq!(
            TexFormat::from_upload(P::Red, T::UnsignedByte),
            Err(Error::InvalidEnum)
        );
        assert_eq!(
            TexFormat::from_upload(P::Bgra, T::UnsignedByte),
            Err(Error::InvalidEnum)
        );
    }

    #[test]
    fn tex_format_decode() {
        let lum = [0x00, 0xFF];
        assert_eq!(TexFormat::Luminance.decode(&lum, 1), Color4f::WHITE);

        let la = [0xFF, 0x00];
        assert_eq!(
            TexFormat::LuminanceAlpha.decode(&la, 0),
            rgba(1.0, 1.0, 1.0, 0.0)
        );

        let rgb = [0, 0, 0, 0xFF, 0x00, 0xFF];
        assert_eq!(
            TexFormat::Rgb888.decode(&rgb, 1),
            rgba(1.0, 0.0, 1.0, 1.0)
        );

        let p: u16 = 0b11111_00000_11111_1;
        assert_eq!(
            TexFormat::Rgba5551.decode(&p.to_ne_bytes(), 0),
            rgba(1.0, 0.0, 1.0, 1.0)
        );

        let p: u16 = 0xF0_0F;
        assert_eq!(
            TexFormat::Rgba4444.decode(&p.to_ne_bytes(), 0),
            rgba(1.0, 0.0, 0.0, 1.0)
        );

        let mut f = [0u8; 12];
        f[4..8].copy_from_slice(&0.5f32.to_ne_bytes());
        assert_eq!(TexFormat::Rgb32f.decode(&f, 0), rgba(0.0, 0.5, 0.0, 1.0));

        let h = 0x3C00u16.to_ne_bytes();
        assert_eq!(TexFormat::R16f.decode(&h, 0), Color4f::WHITE);
    }

    #[test]
    fn read_format_validation() {
        use {PixelFormat as P, PixelType as T};
        assert!(ReadFormat::new(P::Bgra, T::UnsignedByte).is_ok());
        assert!(ReadFormat::new(P::Rgb, T::UnsignedShort565).is_ok());
        assert_eq!(
            ReadFormat::new(P::Rgba, T::UnsignedShort565),
            Err(Error::InvalidEnum)
        );
        assert_eq!(
            ReadFormat::new(P::Rgb, T::UnsignedShort4444),
            Err(Error::InvalidEnum)
        );
        assert_eq!(
            ReadFormat::new(P::Luminance, T::UnsignedByte),
            Err(Error::InvalidEnum)
        );
    }

    #[test]
    fn read_format_encode() {
        use {PixelFormat as P, PixelType as T};
        let c = rgba(1.0, 0.5, 0.0, 1.0);

        let fmt = ReadFormat::new(P::Bgra, T::UnsignedByte).unwrap();
        let mut out = [0u8; 4];
        fmt.encode(c, &mut out);
        assert_eq!(out, [0x00, 0x80, 0xFF, 0xFF]);

        let fmt = ReadFormat::new(P::Rgb, T::UnsignedShort).unwrap();
        assert_eq!(fmt.bytes_per_pixel(), 6);
        let mut out = [0u8; 6];
        fmt.encode(c, &mut out);
        assert_eq!(u16::from_ne_bytes([out[0], out[1]]), 0xFFFF);
        assert_eq!(u16::from_ne_bytes([out[2], out[3]]), 0x8000);
        assert_eq!(u16::from_ne_bytes([out[4], out[5]]), 0x0000);

        let fmt = ReadFormat::new(P::Rgba, T::Float).unwrap();
        let mut out = [0u8; 16];
        fmt.encode(c, &mut out);
        assert_eq!(f32::from_ne_bytes([out[4], out[5], out[6], out[7]]), 0.5);

        let fmt = ReadFormat::new(P::Bgr, T::UnsignedShort565).unwrap();
        let mut out = [0u8; 2];
        fmt.encode(c, &mut out);
        assert_eq!(u16::from_ne_bytes(out), 0b00000_100000_11111);
    }

    #[test]
    fn color4_to_xrgb8888() {
        let pix: u32 = rgba(0x11u8, 0x22, 0x33, 0x44).into_pixel_fmt(Xrgb8888);
        assert_eq!(pix, 0x00_11_22_33);
    }
}
