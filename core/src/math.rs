//! Linear algebra and other mathematics needed by the pipeline.
//!
//! Includes [vectors][self::vec], [matrices][mat], [colors][color], and
//! support for [varying][vary] types, as well as utilities such as
//! approximate equality comparisons and `no_std` floating-point functions.
//!
//! Vectors and colors are tagged with a type that represents the *space*
//! they are embedded in, and values in different spaces cannot be mixed
//! without explicit conversion. Matrices, similarly, are tagged by source
//! and destination space, and can only be applied to matching vectors.

pub use {
    approx::ApproxEq,
    color::{Color, Color4, Color4f, rgba},
    mat::{Mat4x4, Matrix, RealToReal, frustum, ortho, scale, translate},
    vary::Vary,
    vec::{
        Clip, ClipVec, Model, ModelVec, Screen, ScreenPt, Tex, TexCoord,
        Vec2, Vec3, Vec4, Vector, uv, vec2, vec3, vec4,
    },
};
#[cfg(feature = "fp")]
pub use mat::rotate;

pub mod approx;
pub mod color;
pub mod float;
pub mod mat;
pub mod vary;
pub mod vec;

/// Trait for linear interpolation between two values.
pub trait Lerp: Sized {
    /// Linearly interpolates between `self` and `other`.
    ///
    /// if `t` = 0, returns `self`; if `t` = 1, returns `other`.
    /// For 0 < `t` < 1, returns the weighted average of `self` and `other`
    /// ```text
    /// (1 - t) * self + t * other
    /// ```
    /// Values of `t` outside [0, 1] extrapolate.
    ///
    /// # Examples
    /// ```
    /// use softgl_core::math::Lerp;
    ///
    /// assert_eq!(f32::lerp(&1.0, &5.0, 0.25), 2.0);
    /// ```
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Returns the (unweighted) average of `self` and `other`.
    fn midpoint(&self, other: &Self) -> Self {
        self.lerp(other, 0.5)
    }
}

/// Linearly interpolates between two values.
///
/// For more information, see [`Lerp::lerp`].
#[inline]
pub fn lerp<T: Lerp>(t: f32, from: T, to: T) -> T {
    from.lerp(&to, t)
}

/// Returns the relative position of `t` between `min` and `max`.
///
/// That is, returns 0 when `t` = `min`, 1 when `t` = `max`, and linearly
/// interpolates in between. The result is unspecified if `min` = `max`.
///
/// # Examples
/// ```
/// use softgl_core::math::inv_lerp;
///
/// assert_eq!(inv_lerp(2.0, 1.0, 5.0), 0.25);
/// assert_eq!(inv_lerp(0.0, -2.0, 2.0), 0.5);
/// ```
#[inline]
pub fn inv_lerp(t: f32, min: f32, max: f32) -> f32 {
    (t - min) / (max - min)
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + t * (other - self)
    }
}

impl Lerp for () {
    fn lerp(&self, _: &Self, _: f32) {}
}

impl<U: Lerp, V: Lerp> Lerp for (U, V) {
    fn lerp(&self, (u, v): &Self, t: f32) -> Self {
        (self.0.lerp(u, t), self.1.lerp(v, t))
    }
}
