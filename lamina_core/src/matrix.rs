// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 matrix for 3-D modelview and projection transforms.
//!
//! Only the operations the render state needs are provided: identity,
//! multiplication, in-place prepend/append, a handful of constructors, and
//! homogeneous point transformation. Mutation happens in place so that a
//! state can keep reusing the same storage across a frame.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 matrix stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column*. Points are treated as column vectors,
/// so `a * b` applies `b` first and `a` second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Matrix3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// The all-zero matrix.
    pub const ZERO: Self = Self {
        cols: [[0.0; 4]; 4],
    };

    /// Creates a matrix from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns the element at `row`, `col` (both 0-based).
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= 4`.
    #[inline]
    #[must_use]
    pub const fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Overwrites `self` with the identity matrix.
    #[inline]
    pub fn set_identity(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Returns `true` if every element matches the identity exactly.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Prepends `rhs`: `self = self * rhs`.
    ///
    /// `rhs` is applied to points *before* the existing transform, i.e. in
    /// the more local coordinate space.
    #[inline]
    pub fn prepend(&mut self, rhs: &Self) {
        *self = *self * *rhs;
    }

    /// Appends `lhs`: `self = lhs * self`.
    #[inline]
    pub fn append(&mut self, lhs: &Self) {
        *self = *lhs * *self;
    }

    /// Prepends a translation by `(x, y, z)`.
    #[inline]
    pub fn prepend_translation(&mut self, x: f64, y: f64, z: f64) {
        self.prepend(&Self::from_translation(x, y, z));
    }

    /// Transforms the point `(x, y, z, 1)` and returns homogeneous
    /// `[x, y, z, w]` without dividing by `w`.
    #[must_use]
    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 4] {
        let c = &self.cols;
        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * p[0] + c[1][i] * p[1] + c[2][i] * p[2] + c[3][i];
        }
        out
    }

    /// Transforms a point and performs the perspective divide.
    ///
    /// Returns `None` when the resulting `w` is zero.
    #[must_use]
    pub fn project_point(&self, p: [f64; 3]) -> Option<[f64; 3]> {
        let [x, y, z, w] = self.transform_point(p);
        if w == 0.0 {
            return None;
        }
        Some([x / w, y / w, z / w])
    }

    /// Returns the elements in column-major order as `f32`, ready for a
    /// uniform buffer.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "GPU uniforms are single precision"
    )]
    pub fn to_cols_array_f32(&self) -> [f32; 16] {
        let mut out = [0.0_f32; 16];
        for (j, col) in self.cols.iter().enumerate() {
            for (i, v) in col.iter().enumerate() {
                out[j * 4 + i] = *v as f32;
            }
        }
        out
    }

    /// Is every element [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Returns `true` if all elements are within `eps` of `other`'s.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Matrix3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn default_is_identity() {
        assert_eq!(Matrix3d::default(), Matrix3d::IDENTITY);
        assert!(Matrix3d::default().is_identity());
    }

    #[test]
    fn prepend_applies_rhs_first() {
        let mut m = Matrix3d::from_translation(10.0, 0.0, 0.0);
        m.prepend(&Matrix3d::from_scale(2.0, 2.0, 1.0));
        // Scale first, then translate.
        let p = m.transform_point([1.0, 1.0, 0.0]);
        assert_eq!(p, [12.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn append_applies_lhs_last() {
        let mut m = Matrix3d::from_translation(10.0, 0.0, 0.0);
        m.append(&Matrix3d::from_scale(2.0, 2.0, 1.0));
        // Translate first, then scale.
        let p = m.transform_point([1.0, 1.0, 0.0]);
        assert_eq!(p, [22.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn prepend_translation_matches_explicit_product() {
        let base = Matrix3d::from_rotation_z(0.3);
        let mut m = base;
        m.prepend_translation(1.0, 2.0, 3.0);
        assert!(m.approx_eq(&(base * Matrix3d::from_translation(1.0, 2.0, 3.0)), EPS));
    }

    #[test]
    fn get_reads_row_then_column() {
        let m = Matrix3d::from_translation(5.0, 6.0, 7.0);
        assert_eq!(m.get(0, 3), 5.0);
        assert_eq!(m.get(1, 3), 6.0);
        assert_eq!(m.get(2, 3), 7.0);
        assert_eq!(m.get(3, 0), 0.0);
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let r = Matrix3d::from_rotation_y(core::f64::consts::FRAC_PI_2);
        let p = r.transform_point([1.0, 0.0, 0.0]);
        assert!(p[0].abs() < 1e-6, "x should vanish, got {}", p[0]);
        assert!((p[2] + 1.0).abs() < 1e-6, "x axis rotates onto -z");
    }

    #[test]
    fn project_point_divides_by_w() {
        let mut m = Matrix3d::IDENTITY;
        m.cols[3][3] = 2.0;
        assert_eq!(m.project_point([2.0, 4.0, 6.0]), Some([1.0, 2.0, 3.0]));
        assert_eq!(Matrix3d::ZERO.project_point([1.0, 1.0, 1.0]), None);
    }

    #[test]
    fn f32_export_is_column_major() {
        let arr = Matrix3d::from_translation(1.0, 2.0, 3.0).to_cols_array_f32();
        assert_eq!(&arr[12..], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(arr[0], 1.0);
    }

    #[test]
    fn non_finite_detected() {
        let mut m = Matrix3d::IDENTITY;
        assert!(m.is_finite());
        m.cols[2][1] = f64::NAN;
        assert!(!m.is_finite());
    }

    #[test]
    fn set_identity_overwrites() {
        let mut m = Matrix3d::from_scale(3.0, 3.0, 3.0);
        m.set_identity();
        assert!(m.is_identity());
    }
}
