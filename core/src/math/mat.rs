//! Matrices and linear transforms.
//!
//! Matrices are stored in row-major order and applied to column vectors,
//! so that `A.compose(&B)` applied to `v` equals `A(B(v))`. The
//! column-major layout used by the public context API is converted at the
//! boundary with [`Mat4x4::from_cols`] and [`Mat4x4::to_cols`].

use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;

use super::approx::ApproxEq;
use super::vec::{Vec3, Vec4, vec4};

/// Tag type for a linear map from space `F` to space `T`.
pub struct RealToReal<F, T>(PhantomData<(F, T)>);

/// A generic matrix type, tagged with the map it represents.
#[repr(transparent)]
pub struct Matrix<Repr, Map>(pub Repr, PhantomData<Map>);

/// A 4×4 `f32` matrix, by default mapping from an unspecified space
/// to another.
pub type Mat4x4<Map = RealToReal<(), ()>> = Matrix<[[f32; 4]; 4], Map>;

impl<M> Mat4x4<M> {
    /// Returns a new matrix with rows `els`.
    pub const fn new(els: [[f32; 4]; 4]) -> Self {
        Self(els, PhantomData)
    }

    /// Returns the 4×4 identity matrix.
    pub const fn identity() -> Self {
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Returns a matrix from sixteen values in column-major order.
    pub fn from_cols(els: &[f32; 16]) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, e) in els.iter().enumerate() {
            m[i % 4][i / 4] = *e;
        }
        Self::new(m)
    }

    /// Returns the elements of `self` in column-major order.
    pub fn to_cols(&self) -> [f32; 16] {
        let mut res = [0.0; 16];
        for (i, r) in res.iter_mut().enumerate() {
            *r = self.0[i % 4][i / 4];
        }
        res
    }

    #[inline]
    pub fn row_vec(&self, i: usize) -> Vec4 {
        self.0[i].into()
    }
    #[inline]
    pub fn col_vec(&self, i: usize) -> Vec4 {
        vec4(self.0[0][i], self.0[1][i], self.0[2][i], self.0[3][i])
    }

    /// Returns `self` retagged as a different map.
    pub const fn to<N>(&self) -> Mat4x4<N> {
        Matrix(self.0, PhantomData)
    }
}

impl<F, T> Mat4x4<RealToReal<F, T>> {
    /// Returns the composite transform that first applies `other`, then
    /// `self`. In matrix terms, returns the product `self · other`.
    pub fn compose<G>(
        &self,
        other: &Mat4x4<RealToReal<G, F>>,
    ) -> Mat4x4<RealToReal<G, T>> {
        let mut els = [[0.0f32; 4]; 4];
        for (i, row) in els.iter_mut().enumerate() {
            for (j, e) in row.iter_mut().enumerate() {
                *e = self.row_vec(i).dot(&other.col_vec(j));
            }
        }
        Matrix(els, PhantomData)
    }

    /// Returns the composite transform that first applies `self`, then
    /// `other`.
    pub fn then<U>(
        &self,
        other: &Mat4x4<RealToReal<T, U>>,
    ) -> Mat4x4<RealToReal<F, U>> {
        other.compose(self)
    }

    /// Maps the homogeneous vector `v` from space `F` to space `T`.
    #[inline]
    pub fn apply(&self, v: &Vec4<F>) -> Vec4<T> {
        let v = v.to();
        vec4(
            self.row_vec(0).dot(&v),
            self.row_vec(1).dot(&v),
            self.row_vec(2).dot(&v),
            self.row_vec(3).dot(&v),
        )
    }
}

//
// Trait impls
//

impl<R: Copy, M> Copy for Matrix<R, M> {}

impl<R: Clone, M> Clone for Matrix<R, M> {
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<R: PartialEq, M> PartialEq for Matrix<R, M> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<M> Default for Mat4x4<M> {
    /// Returns the identity matrix.
    fn default() -> Self {
        Self::identity()
    }
}

impl<M: Debug + Default> Debug for Mat4x4<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix<{:?}>[", M::default())?;
        for row in &self.0 {
            writeln!(f, "    {row:6.2?}")?;
        }
        write!(f, "]")
    }
}

impl<F, T> Default for RealToReal<F, T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<F: Debug + Default, T: Debug + Default> Debug for RealToReal<F, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}->{:?}", F::default(), T::default())
    }
}

impl<M> From<[[f32; 4]; 4]> for Mat4x4<M> {
    fn from(els: [[f32; 4]; 4]) -> Self {
        Self::new(els)
    }
}

impl<M> ApproxEq<Self, f32> for Mat4x4<M> {
    fn approx_eq_eps(&self, other: &Self, eps: &f32) -> bool {
        self.0.approx_eq_eps(&other.0, eps)
    }
    fn relative_epsilon() -> f32 {
        f32::relative_epsilon()
    }
}

//
// Free functions
//

/// Returns a matrix scaling by the components of `s`.
pub fn scale(s: Vec3) -> Mat4x4 {
    [
        [s[0], 0.0, 0.0, 0.0],
        [0.0, s[1], 0.0, 0.0],
        [0.0, 0.0, s[2], 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
    .into()
}

/// Returns a matrix translating by `t`.
pub fn translate(t: Vec3) -> Mat4x4 {
    [
        [1.0, 0.0, 0.0, t[0]],
        [0.0, 1.0, 0.0, t[1]],
        [0.0, 0.0, 1.0, t[2]],
        [0.0, 0.0, 0.0, 1.0],
    ]
    .into()
}

/// Returns a matrix rotating counter-clockwise by `degs` degrees about
/// `axis`. The axis does not need to be normalized.
///
/// If `axis` is the zero vector, returns the identity matrix.
#[cfg(feature = "fp")]
pub fn rotate(degs: f32, axis: Vec3) -> Mat4x4 {
    use super::float::f32;

    let len_sq = axis.dot(&axis);
    if len_sq <= 0.0 {
        return Mat4x4::identity();
    }
    let [x, y, z] = (axis * (1.0 / f32::sqrt(len_sq))).0;
    let rads = degs.to_radians();
    let (s, c) = (f32::sin(rads), f32::cos(rads));
    let t = 1.0 - c;
    [
        [x * x * t + c, x * y * t - z * s, x * z * t + y * s, 0.0],
        [y * x * t + z * s, y * y * t + c, y * z * t - x * s, 0.0],
        [z * x * t - y * s, z * y * t + x * s, z * z * t + c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
    .into()
}

/// Returns a perspective projection matrix for the view frustum bounded
/// by the given planes at the near distance.
///
/// The caller is responsible for validating that `near` and `far` are
/// positive and that no pair of opposite planes coincides.
pub fn frustum(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Mat4x4 {
    let (w, h, d) = (right - left, top - bottom, far - near);
    [
        [2.0 * near / w, 0.0, (right + left) / w, 0.0],
        [0.0, 2.0 * near / h, (top + bottom) / h, 0.0],
        [0.0, 0.0, -(far + near) / d, -2.0 * far * near / d],
        [0.0, 0.0, -1.0, 0.0],
    ]
    .into()
}

/// Returns an orthographic projection matrix mapping the given box
/// to the normalized device coordinate cube [-1, 1]³.
pub fn ortho(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Mat4x4 {
    let (w, h, d) = (right - left, top - bottom, far - near);
    [
        [2.0 / w, 0.0, 0.0, -(right + left) / w],
        [0.0, 2.0 / h, 0.0, -(top + bottom) / h],
        [0.0, 0.0, -2.0 / d, -(far + near) / d],
        [0.0, 0.0, 0.0, 1.0],
    ]
    .into()
}

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;
    use crate::math::vec::{Clip, Model, vec3};

    use super::*;

    #[test]
    fn matrix_debug() {
        let m: Mat4x4 = [
            [0.0, 1.0, 2.0, 3.0],
            [10.0, 11.0, 12.0, 13.0],
            [20.0, 21.0, 22.0, 23.0],
            [30.0, 31.0, 32.0, 33.0],
        ]
        .into();

        let expected = r#"Matrix<()->()>[
    [  0.00,   1.00,   2.00,   3.00]
    [ 10.00,  11.00,  12.00,  13.00]
    [ 20.00,  21.00,  22.00,  23.00]
    [ 30.00,  31.00,  32.00,  33.00]
]"#;
        assert_eq!(alloc::format!("{m:?}"), expected);
    }

    #[test]
    fn column_major_roundtrip() {
        let cols: [f32; 16] = core::array::from_fn(|i| i as f32);
        let m: Mat4x4 = Mat4x4::from_cols(&cols);
        assert_eq!(m.0[0], [0.0, 4.0, 8.0, 12.0]);
        assert_eq!(m.0[3], [3.0, 7.0, 11.0, 15.0]);
        assert_eq!(m.to_cols(), cols);
    }

    #[test]
    fn mat_vec_scale() {
        let m = scale(vec3(1.0, -2.0, 3.0));
        let v = vec4(0.0, 4.0, -3.0, 1.0);
        assert_eq!(m.apply(&v), vec4(0.0, -8.0, -9.0, 1.0));
    }

    #[test]
    fn mat_vec_translate() {
        let m = translate(vec3(1.0, 2.0, 3.0));
        let v = vec4(0.0, 5.0, -3.0, 1.0);
        assert_eq!(m.apply(&v), vec4(1.0, 7.0, 0.0, 1.0));
        // Directions are unaffected by translation
        let d = vec4(0.0, 5.0, -3.0, 0.0);
        assert_eq!(m.apply(&d), d);
    }

    #[test]
    fn compose_applies_rhs_first() {
        let t = translate(vec3(1.0, 0.0, 0.0));
        let s = scale(vec3(2.0, 2.0, 2.0));
        let v = vec4(1.0, 1.0, 1.0, 1.0);

        assert_eq!(t.compose(&s).apply(&v), vec4(3.0, 2.0, 2.0, 1.0));
        assert_eq!(t.then(&s).apply(&v), vec4(4.0, 2.0, 2.0, 1.0));
    }

    #[test]
    fn compose_with_identity() {
        let m = translate(vec3(1.0, 2.0, 3.0));
        assert_eq!(m.compose(&Mat4x4::identity()), m);
        assert_eq!(Mat4x4::identity().compose(&m), m);
    }

    #[test]
    fn ortho_maps_box_to_ndc() {
        let m = ortho(0.0, 4.0, 0.0, 2.0, -1.0, 1.0).to::<RealToReal<Model, Clip>>();

        assert_approx_eq!(m.apply(&vec4(0.0, 0.0, 1.0, 1.0)), vec4(-1.0, -1.0, -1.0, 1.0));
        assert_approx_eq!(m.apply(&vec4(4.0, 2.0, -1.0, 1.0)), vec4(1.0, 1.0, 1.0, 1.0));
        assert_approx_eq!(m.apply(&vec4(2.0, 1.0, 0.0, 1.0)), vec4(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn frustum_maps_near_and_far() {
        let m = frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);

        let near = m.apply(&vec4(1.0, 1.0, -1.0, 1.0));
        assert_approx_eq!(near, vec4(1.0, 1.0, -1.0, 1.0));

        let far = m.apply(&vec4(10.0, -10.0, -10.0, 1.0));
        assert_approx_eq!(far.0.map(|c| c / far.w()), [1.0, -1.0, 1.0, 1.0]);
    }

    #[cfg(feature = "fp")]
    #[test]
    fn rotate_about_z() {
        let m = rotate(90.0, vec3(0.0, 0.0, 2.0));
        let v = m.apply(&vec4(1.0, 0.0, 0.0, 1.0));
        assert_approx_eq!(v, vec4(0.0, 1.0, 0.0, 1.0), eps = 1e-6);
    }

    #[cfg(feature = "fp")]
    #[test]
    fn rotate_about_zero_axis_is_identity() {
        assert_eq!(rotate(45.0, vec3(0.0, 0.0, 0.0)), Mat4x4::identity());
    }
}
