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

//! Provides a Quaternion type for representing 3D rotations.

use serde::{Deserialize, Serialize};

use super::{Vec3, EPSILON};
use std::ops::Mul;

/// Represents a unit quaternion rotation stored as `(x, y, z, w)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Quaternion {
    /// The x component of the vector part.
    pub x: f32,
    /// The y component of the vector part.
    pub y: f32,
    /// The z component of the vector part.
    pub z: f32,
    /// The scalar (real) part.
    pub w: f32,
}

impl Quaternion {
    /// The identity quaternion, representing no rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Creates a new quaternion from its raw components.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a quaternion representing a rotation around a given axis by a given angle.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle_radians * 0.5).sin_cos();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: c,
        }
    }

    /// Creates a quaternion from Euler angles in radians, applied in `XYZ` order.
    ///
    /// The resulting rotation matrix is `Rx * Ry * Rz`, so a column vector is
    /// rotated around Z first, then Y, then X.
    pub fn from_euler_xyz(angles: Vec3) -> Self {
        let qx = Self::from_axis_angle(Vec3::X, angles.x);
        let qy = Self::from_axis_angle(Vec3::Y, angles.y);
        let qz = Self::from_axis_angle(Vec3::Z, angles.z);
        qx * qy * qz
    }

    /// Calculates the squared length (magnitude) of the quaternion.
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Returns a normalized version of the quaternion with a length of 1.
    /// If the quaternion has a near-zero magnitude, it returns the identity quaternion.
    pub fn normalize(&self) -> Self {
        let mag_sq = self.magnitude_squared();
        if mag_sq > EPSILON {
            let inv_mag = 1.0 / mag_sq.sqrt();
            Self::new(
                self.x * inv_mag,
                self.y * inv_mag,
                self.z * inv_mag,
                self.w * inv_mag,
            )
        } else {
            Self::IDENTITY
        }
    }

    /// Rotates a 3D vector by this quaternion.
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let s = self.w;
        2.0 * u.dot(v) * u + (s * s - u.dot(u)) * v + 2.0 * s * u.cross(v)
    }
}

impl Default for Quaternion {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Combines two rotations; the right-hand side is applied first.
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Mat4, FRAC_PI_2, PI};
    use approx::assert_relative_eq;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = EPSILON * 10.0);
        assert_relative_eq!(a.y, b.y, epsilon = EPSILON * 10.0);
        assert_relative_eq!(a.z, b.z, epsilon = EPSILON * 10.0);
    }

    #[test]
    fn test_axis_angle_rotation() {
        let q = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert_vec3_eq(q.rotate_vec3(Vec3::X), -Vec3::Z);
    }

    #[test]
    fn test_euler_single_axis_matches_axis_angle() {
        let e = Quaternion::from_euler_xyz(Vec3::new(0.0, 0.0, PI / 3.0));
        let a = Quaternion::from_axis_angle(Vec3::Z, PI / 3.0);
        assert_relative_eq!(e.x, a.x, epsilon = EPSILON);
        assert_relative_eq!(e.w, a.w, epsilon = EPSILON);
    }

    #[test]
    fn test_euler_xyz_order_matches_matrix_product() {
        let angles = Vec3::new(0.3, -0.7, 1.1);
        let q = Quaternion::from_euler_xyz(angles);
        let rx = Mat4::from_quat(Quaternion::from_axis_angle(Vec3::X, angles.x));
        let ry = Mat4::from_quat(Quaternion::from_axis_angle(Vec3::Y, angles.y));
        let rz = Mat4::from_quat(Quaternion::from_axis_angle(Vec3::Z, angles.z));
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_vec3_eq(q.rotate_vec3(p), (rx * ry * rz).transform_point(p));
    }

    #[test]
    fn test_normalize_degenerate_is_identity() {
        assert_eq!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalize(), Quaternion::IDENTITY);
    }
}
