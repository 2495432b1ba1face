//! Alpha blending.

use crate::error::tokens;
use crate::math::{Color4f, rgba};

tokens! {
    /// A source or destination blend factor.
    pub enum BlendFactor {
        Zero = 0,
        One = 1,
        SrcColor = 0x0300,
        OneMinusSrcColor = 0x0301,
        SrcAlpha = 0x0302,
        OneMinusSrcAlpha = 0x0303,
        DstAlpha = 0x0304,
        OneMinusDstAlpha = 0x0305,
        DstColor = 0x0306,
        OneMinusDstColor = 0x0307,
        /// `min(src alpha, 1 - dst alpha)` for color, 1 for alpha.
        SrcAlphaSaturate = 0x0308,
    }
}

/// A blend function: a pair of source and destination factors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Blend {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFactor {
    /// Returns the per-channel weights of `self` given the source and
    /// destination colors.
    #[inline]
    pub fn weights(self, src: Color4f, dst: Color4f) -> Color4f {
        use BlendFactor::*;
        let splat = |x: f32| rgba(x, x, x, x);
        let inv = |c: Color4f| Color4f::WHITE - c;
        match self {
            Zero => splat(0.0),
            One => splat(1.0),
            SrcColor => src,
            OneMinusSrcColor => inv(src),
            SrcAlpha => splat(src.a()),
            OneMinusSrcAlpha => splat(1.0 - src.a()),
            DstAlpha => splat(dst.a()),
            OneMinusDstAlpha => splat(1.0 - dst.a()),
            DstColor => dst,
            OneMinusDstColor => inv(dst),
            SrcAlphaSaturate => {
                let f = src.a().min(1.0 - dst.a());
                rgba(f, f, f, 1.0)
            }
        }
    }
}

impl Blend {
    /// Replaces the destination with the source.
    pub const REPLACE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::Zero,
    };

    /// Returns the blend of `src` over `dst`, clamped to [0, 1].
    #[inline]
    pub fn apply(&self, src: Color4f, dst: Color4f) -> Color4f {
        let sf = self.src.weights(src, dst);
        let df = self.dst.weights(src, dst);
        (src.mul_color(sf) + dst.mul_color(df)).saturate()
    }
}

impl Default for Blend {
    fn default() -> Self {
        Self::REPLACE
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;

    use super::{BlendFactor::*, *};

    const SRC: Color4f = rgba(0.8, 0.4, 0.2, 0.25);
    const DST: Color4f = rgba(0.2, 0.6, 1.0, 0.5);

    fn blend(src: BlendFactor, dst: BlendFactor) -> Color4f {
        Blend { src, dst }.apply(SRC, DST)
    }

    #[test]
    fn one_zero_is_source() {
        assert_approx_eq!(blend(One, Zero), SRC);
    }

    #[test]
    fn zero_one_is_destination() {
        assert_approx_eq!(blend(Zero, One), DST);
    }

    #[test]
    fn alpha_over() {
        let res = blend(SrcAlpha, OneMinusSrcAlpha);
        assert_approx_eq!(
            res,
            rgba(
                0.8 * 0.25 + 0.2 * 0.75,
                0.4 * 0.25 + 0.6 * 0.75,
                0.2 * 0.25 + 1.0 * 0.75,
                0.25 * 0.25 + 0.5 * 0.75,
            )
        );
    }

    #[test]
    fn additive_saturates() {
        let res = blend(One, One);
        assert_approx_eq!(res, rgba(1.0, 1.0, 1.0, 0.75));
    }

    #[test]
    fn color_factors() {
        assert_approx_eq!(blend(DstColor, Zero), SRC.mul_color(DST));
        assert_approx_eq!(
            blend(Zero, OneMinusSrcColor),
            rgba(0.2 * 0.2, 0.6 * 0.6, 1.0 * 0.8, 0.5 * 0.75)
        );
    }

    #[test]
    fn src_alpha_saturate() {
        let f = SrcAlphaSaturate.weights(SRC, DST);
        assert_approx_eq!(f, rgba(0.25, 0.25, 0.25, 1.0));
        let f = SrcAlphaSaturate.weights(rgba(0.0, 0.0, 0.0, 0.9), DST);
        assert_approx_eq!(f, rgba(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn factor_tokens() {
        assert_eq!(BlendFactor::try_from(0x0302), Ok(SrcAlpha));
        assert_eq!(SrcAlphaSaturate.to_raw(), 0x0308);
        assert_eq!(
            BlendFactor::try_from(0x0309),
            Err(crate::error::Error::InvalidEnum)
        );
    }
}
