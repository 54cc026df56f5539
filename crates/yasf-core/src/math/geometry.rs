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

//! Provides the axis-aligned bounding box used to summarise mesh extents.

use super::Vec3;

/// Represents an Axis-Aligned Bounding Box (AABB), defined by its minimum and
/// maximum corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new `Aabb` from two corner points, in any order.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates an `Aabb` that tightly encloses a given set of points.
    ///
    /// Returns `None` if the input slice is empty.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(
            rest.iter()
                .fold(Self::from_min_max(*first, *first), |acc, p| {
                    Self::from_min_max(
                        Vec3::new(acc.min.x.min(p.x), acc.min.y.min(p.y), acc.min.z.min(p.z)),
                        Vec3::new(acc.max.x.max(p.x), acc.max.y.max(p.y), acc.max.z.max(p.z)),
                    )
                }),
        )
    }

    /// Returns the center point of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the full size of the box along each axis.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for Aabb {
    /// A degenerate box at the origin.
    fn default() -> Self {
        Self::from_min_max(Vec3::ZERO, Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_min_max_orders_corners() {
        let aabb = Aabb::from_min_max(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_points() {
        assert_eq!(Aabb::from_points(&[]), None);
        let aabb = Aabb::from_points(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, -1.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 3.0, 0.5));
        assert_eq!(aabb.center(), Vec3::new(0.5, 1.0, 0.25));
        assert_eq!(aabb.size(), Vec3::new(3.0, 4.0, 0.5));
    }
}
