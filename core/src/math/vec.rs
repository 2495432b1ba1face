//! Real-valued vectors tagged with the space they belong to.

use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::ops::{Add, Index, IndexMut, Mul, Sub};

use super::{Lerp, approx::ApproxEq};

/// A vector of `N` `f32` components in space `Space`.
///
/// Vectors in different spaces cannot be mixed without an explicit
/// conversion (usually a matrix transform), which catches many mixups
/// between object, clip, and screen coordinates at compile time.
#[repr(transparent)]
pub struct Vector<const N: usize, Space = ()>(pub [f32; N], PhantomData<Space>);

/// Object (model) space, where the caller submits vertex positions.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Model;

/// Homogeneous clip space, after the model-view-projection transform.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Clip;

/// Window space: pixel x and y, normalized depth, and `1/w`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Screen;

/// Texture coordinate space.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Tex;

pub type Vec2<Space = ()> = Vector<2, Space>;
pub type Vec3<Space = ()> = Vector<3, Space>;
pub type Vec4<Space = ()> = Vector<4, Space>;

/// A homogeneous position in object space.
pub type ModelVec = Vec4<Model>;
/// A homogeneous position in clip space.
pub type ClipVec = Vec4<Clip>;
/// A projected position: `[x, y, depth, 1/w]`.
pub type ScreenPt = Vec4<Screen>;
/// A texture coordinate pair `(u, v)`.
pub type TexCoord = Vec2<Tex>;

/// Returns a 2-vector with components `x` and `y`.
#[inline]
pub const fn vec2<Sp>(x: f32, y: f32) -> Vec2<Sp> {
    Vector([x, y], PhantomData)
}

/// Returns a 3-vector with components `x`, `y`, and `z`.
#[inline]
pub const fn vec3<Sp>(x: f32, y: f32, z: f32) -> Vec3<Sp> {
    Vector([x, y, z], PhantomData)
}

/// Returns a 4-vector with components `x`, `y`, `z`, and `w`.
#[inline]
pub const fn vec4<Sp>(x: f32, y: f32, z: f32, w: f32) -> Vec4<Sp> {
    Vector([x, y, z, w], PhantomData)
}

/// Returns a texture coordinate pair.
#[inline]
pub const fn uv(u: f32, v: f32) -> TexCoord {
    vec2(u, v)
}

impl<const N: usize, Sp> Vector<N, Sp> {
    /// Returns a new vector with components `els`.
    #[inline]
    pub const fn new(els: [f32; N]) -> Self {
        Self(els, PhantomData)
    }
    /// Returns the zero vector.
    #[inline]
    pub const fn zero() -> Self {
        Self([0.0; N], PhantomData)
    }

    /// Returns the dot product of `self` and `other`.
    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        let mut res = 0.0;
        for i in 0..N {
            res += self.0[i] * other.0[i];
        }
        res
    }

    /// Returns `self` with each component mapped by `f`.
    #[inline]
    pub fn map(self, f: impl FnMut(f32) -> f32) -> Self {
        Self(self.0.map(f), PhantomData)
    }

    /// Reinterprets `self` as a vector in another space.
    #[inline]
    pub const fn to<T>(self) -> Vector<N, T> {
        Vector(self.0, PhantomData)
    }
}

impl<Sp> Vec2<Sp> {
    #[inline]
    pub const fn x(&self) -> f32 {
        self.0[0]
    }
    #[inline]
    pub const fn y(&self) -> f32 {
        self.0[1]
    }
}

impl TexCoord {
    #[inline]
    pub const fn u(&self) -> f32 {
        self.0[0]
    }
    #[inline]
    pub const fn v(&self) -> f32 {
        self.0[1]
    }
}

impl<Sp> Vec4<Sp> {
    #[inline]
    pub const fn x(&self) -> f32 {
        self.0[0]
    }
    #[inline]
    pub const fn y(&self) -> f32 {
        self.0[1]
    }
    #[inline]
    pub const fn z(&self) -> f32 {
        self.0[2]
    }
    #[inline]
    pub const fn w(&self) -> f32 {
        self.0[3]
    }
}

//
// Trait impls
//

impl<const N: usize, Sp> Copy for Vector<N, Sp> {}

impl<const N: usize, Sp> Clone for Vector<N, Sp> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<const N: usize, Sp> Default for Vector<N, Sp> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize, Sp> PartialEq for Vector<N, Sp> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<const N: usize, Sp: Debug + Default> Debug for Vector<N, Sp> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Vec<{:?}>{:?}", Sp::default(), self.0)
    }
}

impl<const N: usize, Sp> From<[f32; N]> for Vector<N, Sp> {
    #[inline]
    fn from(els: [f32; N]) -> Self {
        Self::new(els)
    }
}

impl<const N: usize, Sp> Index<usize> for Vector<N, Sp> {
    type Output = f32;
    #[inline]
    fn index(&self, i: usize) -> &f32 {
        &self.0[i]
    }
}

impl<const N: usize, Sp> IndexMut<usize> for Vector<N, Sp> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.0[i]
    }
}

impl<const N: usize, Sp> Add for Vector<N, Sp> {
    type Output = Self;
    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        for i in 0..N {
            self.0[i] += rhs.0[i];
        }
        self
    }
}

impl<const N: usize, Sp> Sub for Vector<N, Sp> {
    type Output = Self;
    #[inline]
    fn sub(mut self, rhs: Self) -> Self {
        for i in 0..N {
            self.0[i] -= rhs.0[i];
        }
        self
    }
}

impl<const N: usize, Sp> Mul<f32> for Vector<N, Sp> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.map(|c| c * rhs)
    }
}

impl<const N: usize, Sp> Lerp for Vector<N, Sp> {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

impl<const N: usize, Sp> ApproxEq<Self, f32> for Vector<N, Sp> {
    fn approx_eq_eps(&self, other: &Self, rel_eps: &f32) -> bool {
        self.0.approx_eq_eps(&other.0, rel_eps)
    }
    fn relative_epsilon() -> f32 {
        f32::relative_epsilon()
    }
}
