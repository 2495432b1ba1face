//! Linear interpolation of varyings.

use core::mem;

use super::{Color4f, Lerp, Vector};

/// A trait for types that can be linearly interpolated and distributed
/// between two endpoints.
///
/// This trait is especially designed for *varyings:* values that are
/// interpolated across the face of a primitive when rendering, such as
/// vertex colors, texture coordinates, and depth.
pub trait Vary: Lerp + Copy {
    /// The iterator returned by the [vary][Self::vary] method.
    type Iter: Iterator<Item = Self>;
    /// The difference type of `Self`.
    type Diff: Copy;

    /// Returns an iterator that yields values such that the first value
    /// equals `self`, and each subsequent value is offset by `step` from its
    /// predecessor using the [step][Self::step] method. If `max` is `Some(n)`,
    /// stops after `n` steps, otherwise infinite.
    ///
    /// # Examples
    /// ```
    /// # use softgl_core::math::vary::Vary;
    /// let mut iter = 0.0f32.vary(0.25, Some(3));
    /// assert_eq!(iter.next(), Some(0.0));
    /// assert_eq!(iter.next(), Some(0.25));
    /// assert_eq!(iter.next(), Some(0.5));
    /// assert_eq!(iter.next(), None);
    /// ```
    fn vary(self, step: Self::Diff, max: Option<u32>) -> Self::Iter;

    /// Returns the rate of change from `self` to `other` given the
    /// reciprocal of the distance between them.
    fn dv_dt(&self, other: &Self, recip_dt: f32) -> Self::Diff;

    /// Returns the result of offsetting `self` by `delta`.
    /// For normal arithmetic types this is simply addition.
    fn step(&self, delta: &Self::Diff) -> Self;

    /// Returns the result of offsetting `self` by `delta` scaled by `t`.
    fn step_by(&self, delta: &Self::Diff, t: f32) -> Self;

    /// Returns `self` multiplied by `f`.
    ///
    /// Used to divide varyings by the homogeneous w before interpolation
    /// and to recover them afterwards.
    fn z_div(&self, f: f32) -> Self;

    /// Returns an iterator of `n + 1` values evenly spaced from `self`
    /// to `other`, inclusive.
    fn vary_to(self, other: Self, n: u32) -> Self::Iter {
        let recip = if n == 0 { 0.0 } else { 1.0 / n as f32 };
        let step = self.dv_dt(&other, recip);
        self.vary(step, Some(n + 1))
    }
}

/// Iterator returned by [`Vary::vary`].
#[derive(Copy, Clone, Debug)]
pub struct Iter<T: Vary> {
    pub val: T,
    pub step: T::Diff,
    pub n: Option<u32>,
}

impl<T: Vary> Iterator for Iter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        match &mut self.n {
            Some(0) => return None,
            Some(n) => *n -= 1,
            None => (),
        }
        let new = self.val.step(&self.step);
        Some(mem::replace(&mut self.val, new))
    }
}

impl Vary for f32 {
    type Iter = Iter<Self>;
    type Diff = Self;

    #[inline]
    fn vary(self, step: Self, n: Option<u32>) -> Self::Iter {
        Iter { val: self, step, n }
    }
    #[inline]
    fn dv_dt(&self, other: &Self, recip_dt: f32) -> Self {
        (other - self) * recip_dt
    }
    #[inline]
    fn step(&self, delta: &Self) -> Self {
        self + delta
    }
    #[inline]
    fn step_by(&self, delta: &Self, t: f32) -> Self {
        self + delta * t
    }
    #[inline]
    fn z_div(&self, f: f32) -> Self {
        self * f
    }
}

impl<const N: usize, Sp> Vary for Vector<N, Sp> {
    type Iter = Iter<Self>;
    type Diff = Self;

    #[inline]
    fn vary(self, step: Self, n: Option<u32>) -> Self::Iter {
        Iter { val: self, step, n }
    }
    #[inline]
    fn dv_dt(&self, other: &Self, recip_dt: f32) -> Self {
        (*other - *self) * recip_dt
    }
    #[inline]
    fn step(&self, delta: &Self) -> Self {
        *self + *delta
    }
    #[inline]
    fn step_by(&self, delta: &Self, t: f32) -> Self {
        *self + *delta * t
    }
    #[inline]
    fn z_div(&self, f: f32) -> Self {
        *self * f
    }
}

impl Vary for Color4f {
    type Iter = Iter<Self>;
    type Diff = Self;

    #[inline]
    fn vary(self, step: Self, n: Option<u32>) -> Self::Iter {
        Iter { val: self, step, n }
    }
    #[inline]
    fn dv_dt(&self, other: &Self, recip_dt: f32) -> Self {
        (*other - *self) * recip_dt
    }
    #[inline]
    fn step(&self, delta: &Self) -> Self {
        *self + *delta
    }
    #[inline]
    fn step_by(&self, delta: &Self, t: f32) -> Self {
        *self + *delta * t
    }
    #[inline]
    fn z_div(&self, f: f32) -> Self {
        *self * f
    }
}

impl<U: Vary, V: Vary> Vary for (U, V) {
    type Iter = Iter<Self>;
    type Diff = (U::Diff, V::Diff);

    #[inline]
    fn vary(self, step: Self::Diff, n: Option<u32>) -> Self::Iter {
        Iter { val: self, step, n }
    }
    #[inline]
    fn dv_dt(&self, (u, v): &Self, recip_dt: f32) -> Self::Diff {
        (self.0.dv_dt(u, recip_dt), self.1.dv_dt(v, recip_dt))
    }
    #[inline]
    fn step(&self, (du, dv): &Self::Diff) -> Self {
        (self.0.step(du), self.1.step(dv))
    }
    #[inline]
    fn step_by(&self, (du, dv): &Self::Diff, t: f32) -> Self {
        (self.0.step_by(du, t), self.1.step_by(dv, t))
    }
    #[inline]
    fn z_div(&self, f: f32) -> Self {
        (self.0.z_div(f), self.1.z_div(f))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::assert_approx_eq;
    use crate::math::{rgba, vec2, Vec2};

    use super::*;

    #[test]
    fn vary_f32() {
        let varying = (-6.0f32).vary(1.2, Some(10));
        assert_approx_eq!(
            varying.collect::<Vec<_>>()[..],
            [-6.0, -4.8, -3.6, -2.4, -1.2, 0.0, 1.2, 2.4, 3.6, 4.8]
        );
    }

    #[test]
    fn vary_to_includes_endpoints() {
        let vs: Vec<f32> = 1.0f32.vary_to(3.0, 4).collect();
        assert_eq!(vs, [1.0, 1.5, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn vary_vector() {
        let a: Vec2 = vec2(0.0, 1.0);
        let vs: Vec<_> = a.vary_to(vec2(2.0, -1.0), 2).collect();
        assert_eq!(vs, [vec2(0.0, 1.0), vec2(1.0, 0.0), vec2(2.0, -1.0)]);
    }

    #[test]
    fn vary_color() {
        let c: Color4f = rgba(0.0, 0.0, 1.0, 1.0);
        let d = c.dv_dt(&rgba(1.0, 0.5, 1.0, 1.0), 0.5);
        assert_approx_eq!(d, rgba(0.5, 0.25, 0.0, 0.0));
        assert_approx_eq!(c.step_by(&d, 2.0), rgba(1.0, 0.5, 1.0, 1.0));
    }

    #[test]
    fn vary_pair() {
        let a = (0.0f32, vec2::<()>(0.0, 4.0));
        let b = (2.0f32, vec2::<()>(4.0, 0.0));
        let mid = a.vary_to(b, 2).nth(1);
        assert_eq!(mid, Some((1.0, vec2(2.0, 2.0))));
    }

    #[test]
    fn z_div_scales() {
        assert_eq!(3.0f32.z_div(0.5), 1.5);
        assert_eq!(vec2::<()>(2.0, 4.0).z_div(0.25), vec2(0.5, 1.0));
    }
}
