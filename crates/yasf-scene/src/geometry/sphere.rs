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

//! Sphere factory.

use super::{check_vertex_budget, grid_vertices, require, require_positive, require_segments};
use crate::document::SphereSpec;
use crate::error::GeometryError;
use yasf_core::math::{Vec2, Vec3, PI, TAU};
use yasf_core::renderer::Mesh;

const KIND: &str = "sphere";

/// Builds a full or partial UV sphere centred on the origin.
///
/// `theta` is the longitude sweep around Y (`thetastart`, default 0, over
/// `thetalength`, default a full turn) and `phi` the latitude sweep from the
/// north pole (`phistart`, default 0, over `philength`, default PI).
pub fn build_sphere(spec: &SphereSpec) -> Result<Mesh, GeometryError> {
    let radius = require_positive(require(spec.radius, KIND, "radius")?, KIND, "radius")?;
    let width_segments = require_segments(spec.slices, KIND, "slices")?;
    let height_segments = require_segments(spec.stacks, KIND, "stacks")?;
    check_vertex_budget(grid_vertices(width_segments, height_segments), KIND)?;
    let lon_start = spec.thetastart.unwrap_or(0.0);
    let lon_length = spec.thetalength.unwrap_or(TAU);
    let lat_start = spec.phistart.unwrap_or(0.0);
    let lat_length = spec.philength.unwrap_or(PI);
    let lat_end = (lat_start + lat_length).min(PI);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut tex_coords = Vec::new();
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        // Pole rows pinch to a point; shift their uvs half a segment.
        let u_offset = if iy == 0 && lat_start == 0.0 {
            0.5 / width_segments as f32
        } else if iy == height_segments && lat_end == PI {
            -0.5 / width_segments as f32
        } else {
            0.0
        };
        let (sin_lat, cos_lat) = (lat_start + v * lat_length).sin_cos();
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_lon, cos_lon) = (lon_start + u * lon_length).sin_cos();
            let p = Vec3::new(
                -radius * cos_lon * sin_lat,
                radius * cos_lat,
                radius * sin_lon * sin_lat,
            );
            positions.push(p);
            normals.push(p.normalize());
            tex_coords.push(Vec2::new(u + u_offset, 1.0 - v));
        }
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 || lat_start > 0.0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 || lat_end < PI {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Ok(Mesh::new(positions)
        .with_normals(normals)
        .with_tex_coords(tex_coords)
        .with_indices(indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spec() -> SphereSpec {
        SphereSpec {
            radius: Some(2.0),
            slices: Some(8),
            stacks: Some(4),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_sphere() {
        let mesh = build_sphere(&spec()).unwrap();
        assert_eq!(mesh.vertex_count(), 9 * 5);
        // Pole rows contribute one triangle per segment, the others two.
        assert_eq!(mesh.triangle_count(), 8 * 2 + 8 * 2 * 2);
        for p in &mesh.positions {
            assert_relative_eq!(p.length(), 2.0, epsilon = 1e-5);
        }
        assert_relative_eq!(mesh.bounding_box.max.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(mesh.bounding_box.min.y, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_upper_hemisphere() {
        let mesh = build_sphere(&SphereSpec {
            philength: Some(PI / 2.0),
            ..spec()
        })
        .unwrap();
        for p in &mesh.positions {
            assert!(p.y >= -1e-5);
        }
        // The open rim keeps both triangles of the last row.
        assert_eq!(mesh.triangle_count(), 8 + 8 * 2 * 3);
    }

    #[test]
    fn test_radius_is_required() {
        assert!(build_sphere(&SphereSpec { radius: None, ..spec() }).is_err());
        assert!(build_sphere(&SphereSpec { radius: Some(0.0), ..spec() }).is_err());
        assert!(build_sphere(&SphereSpec { stacks: Some(0), ..spec() }).is_err());
    }

    #[test]
    fn test_oversized_segment_counts_are_rejected() {
        let err = build_sphere(&SphereSpec {
            slices: Some(u32::MAX),
            ..spec()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::TooManyVertices { primitive: "sphere", .. }
        ));
    }
}
