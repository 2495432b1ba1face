//! RGBA colors.

use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::ops::{Add, Mul, Sub};

use super::{Lerp, approx::ApproxEq};

/// A generic color type, similar to [`Vector`][super::Vector].
///
/// # Type parameters
/// * `Repr`: the representation of the channels of `Self`.
/// * `Space`: the color space that `Self` is an element of.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq)]
pub struct Color<Repr, Space = Rgba>(pub Repr, PhantomData<Space>);

/// The RGBA color space (RGB plus alpha, or opacity).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Rgba;

/// An RGBA color with `u8` channels.
pub type Color4<Space = Rgba> = Color<[u8; 4], Space>;

/// An RGBA color with `f32` channels, nominally in range [0, 1].
pub type Color4f<Space = Rgba> = Color<[f32; 4], Space>;

/// Returns a new RGBA color with `r`, `g`, `b`, and `a` channels.
pub const fn rgba<Ch>(r: Ch, g: Ch, b: Ch, a: Ch) -> Color<[Ch; 4], Rgba> {
    Color([r, g, b, a], PhantomData)
}

impl Color4 {
    /// Returns a color from a `u32` in format `0xAA_BB_GG_RR`, that is,
    /// with red in the least significant byte.
    #[inline]
    pub const fn from_abgr_u32(c: u32) -> Self {
        Color(c.to_le_bytes(), PhantomData)
    }
    /// Returns `self` with each channel mapped to `[0.0, 1.0]`.
    #[inline]
    pub fn to_color4f(self) -> Color4f {
        Color(self.0.map(|c| c as f32 / 255.0), PhantomData)
    }
}

impl Color4f {
    pub const BLACK: Self = rgba(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Self = rgba(1.0, 1.0, 1.0, 1.0);

    /// Returns a `Color4` with the channels of `self` clamped to
    /// `[0.0, 1.0]` and mapped to `u8` with rounding.
    #[inline]
    pub fn to_color4(self) -> Color4 {
        Color(
            self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8),
            PhantomData,
        )
    }
    /// Returns `self` with each channel clamped to `[0.0, 1.0]`.
    #[inline]
    pub fn saturate(self) -> Self {
        Color(self.0.map(|c| c.clamp(0.0, 1.0)), PhantomData)
    }
    /// Returns the channel-wise product of `self` and `other`.
    #[inline]
    pub fn mul_color(self, other: Self) -> Self {
        let [r, g, b, a] = self.0;
        let [s, t, u, v] = other.0;
        rgba(r * s, g * t, b * u, a * v)
    }
}

impl<Ch: Copy> Color<[Ch; 4], Rgba> {
    /// Returns the red channel of `self`.
    #[inline]
    pub const fn r(&self) -> Ch {
        self.0[0]
    }
    /// Returns the green channel of `self`.
    #[inline]
    pub const fn g(&self) -> Ch {
        self.0[1]
    }
    /// Returns the blue channel of `self`.
    #[inline]
    pub const fn b(&self) -> Ch {
        self.0[2]
    }
    /// Returns the alpha channel of `self`.
    #[inline]
    pub const fn a(&self) -> Ch {
        self.0[3]
    }
}

impl<Ch, Sp> From<[Ch; 4]> for Color<[Ch; 4], Sp> {
    #[inline]
    fn from(els: [Ch; 4]) -> Self {
        Self(els, PhantomData)
    }
}

impl<R: Debug, Sp: Debug + Default> Debug for Color<R, Sp> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Color<{:?}>{:?}", Sp::default(), self.0)
    }
}

impl<Sp> Add for Color<[f32; 4], Sp> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut res = self.0;
        for (c, d) in res.iter_mut().zip(rhs.0) {
            *c += d;
        }
        Self(res, PhantomData)
    }
}

impl<Sp> Sub for Color<[f32; 4], Sp> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut res = self.0;
        for (c, d) in res.iter_mut().zip(rhs.0) {
            *c -= d;
        }
        Self(res, PhantomData)
    }
}

impl<Sp> Mul<f32> for Color<[f32; 4], Sp> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self(self.0.map(|c| c * rhs), PhantomData)
    }
}

impl<Sp> Lerp for Color<[f32; 4], Sp> {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut res = self.0;
        for (c, d) in res.iter_mut().zip(other.0) {
            *c = c.lerp(&d, t);
        }
        Self(res, PhantomData)
    }
}

impl<Sp> ApproxEq<Self, f32> for Color<[f32; 4], Sp> {
    fn approx_eq_eps(&self, other: &Self, rel_eps: &f32) -> bool {
        self.0.approx_eq_eps(&other.0, rel_eps)
    }
    fn relative_epsilon() -> f32 {
        f32::relative_epsilon()
    }
}
