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

//! Geometry factories: one pure function per primitive kind.
//!
//! Each factory validates its wire fields and returns a [`Mesh`] or the
//! [`GeometryError`] describing the first problem found. Attaching a surface
//! and shadow flags is the graph builder's job.
//!
//! [`Mesh`]: yasf_core::renderer::Mesh

mod cuboid;
mod cylinder;
mod polygon;
mod rectangle;
mod sphere;
mod triangle;

pub use cuboid::build_box;
pub use cylinder::build_cylinder;
pub use polygon::build_polygon;
pub use rectangle::build_rectangle;
pub use sphere::build_sphere;
pub use triangle::build_triangle;

use crate::error::GeometryError;

/// Unwraps a required field.
pub(crate) fn require<T>(
    value: Option<T>,
    primitive: &'static str,
    field: &'static str,
) -> Result<T, GeometryError> {
    value.ok_or(GeometryError::MissingField { primitive, field })
}

/// Unwraps a required segment count, which must be at least one.
pub(crate) fn require_segments(
    value: Option<u32>,
    primitive: &'static str,
    field: &'static str,
) -> Result<u32, GeometryError> {
    let count = require(value, primitive, field)?;
    positive_segments(count, primitive, field)
}

/// Reads an optional segment count, defaulting when absent.
pub(crate) fn segments_or(
    value: Option<u32>,
    default: u32,
    primitive: &'static str,
    field: &'static str,
) -> Result<u32, GeometryError> {
    positive_segments(value.unwrap_or(default), primitive, field)
}

fn positive_segments(
    count: u32,
    primitive: &'static str,
    field: &'static str,
) -> Result<u32, GeometryError> {
    if count == 0 {
        return Err(GeometryError::InvalidValue {
            primitive,
            field,
            value: 0.0,
        });
    }
    Ok(count)
}

/// Largest vertex count a generated mesh may have. Keeps every index well
/// inside `u32` and bounds the allocation a document can request.
pub(crate) const MAX_VERTICES: u64 = 1 << 24;

/// Vertex count of a `(columns + 1) x (rows + 1)` grid, saturating.
pub(crate) fn grid_vertices(columns: u32, rows: u32) -> u64 {
    (u64::from(columns) + 1).saturating_mul(u64::from(rows) + 1)
}

/// Fails with [`GeometryError::TooManyVertices`] when `vertices` is over
/// [`MAX_VERTICES`]. Call it before any index arithmetic.
pub(crate) fn check_vertex_budget(
    vertices: u64,
    primitive: &'static str,
) -> Result<(), GeometryError> {
    if vertices > MAX_VERTICES {
        return Err(GeometryError::TooManyVertices {
            primitive,
            vertices,
            limit: MAX_VERTICES,
        });
    }
    Ok(())
}

/// Rejects values that are not finite and strictly positive.
pub(crate) fn require_positive(
    value: f32,
    primitive: &'static str,
    field: &'static str,
) -> Result<f32, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidValue {
            primitive,
            field,
            value: value as f64,
        })
    }
}
