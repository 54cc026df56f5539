// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provides the column-major 4x4 matrix used for node transforms.

use super::{Quaternion, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A 4x4 column-major matrix, used for 3D affine transformations.
///
/// Vectors are treated as column vectors, so a point is transformed with
/// `matrix * vector` and composed transforms read right to left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        let pick = |c: &Vec4| match index {
            0 => c.x,
            1 => c.y,
            2 => c.z,
            _ => c.w,
        };
        Vec4::new(
            pick(&self.cols[0]),
            pick(&self.cols[1]),
            pick(&self.cols[2]),
            pick(&self.cols[3]),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = Vec4::new(v.x, v.y, v.z, 1.0);
        m
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0].x = scale.x;
        m.cols[1].y = scale.y;
        m.cols[2].z = scale.z;
        m
    }

    /// Creates a rotation matrix from a quaternion.
    pub fn from_quat(q: Quaternion) -> Self {
        let q = q.normalize();
        let (x2, y2, z2) = (q.x + q.x, q.y + q.y, q.z + q.z);
        let (xx, xy, xz) = (q.x * x2, q.x * y2, q.x * z2);
        let (yy, yz, zz) = (q.y * y2, q.y * z2, q.z * z2);
        let (wx, wy, wz) = (q.w * x2, q.w * y2, q.w * z2);

        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    /// Transforms a point (implicit `w = 1`).
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(p, 1.0)).truncate()
    }

    /// Returns the translation component stored in the last column.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }
}

impl Default for Mat4 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;

    /// Multiplies two matrices; the right-hand side is applied first.
    fn mul(self, rhs: Mat4) -> Self::Output {
        let rows = [
            self.get_row(0),
            self.get_row(1),
            self.get_row(2),
            self.get_row(3),
        ];
        let mut out = Self::IDENTITY;
        for (c, col) in rhs.cols.iter().enumerate() {
            out.cols[c] = Vec4::new(
                rows[0].dot(*col),
                rows[1].dot(*col),
                rows[2].dot(*col),
                rows[3].dot(*col),
            );
        }
        out
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, v: Vec4) -> Self::Output {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}
