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

//! Radial polygon tessellator.

use super::{check_vertex_budget, require, require_positive, require_segments};
use crate::document::PolygonSpec;
use crate::error::GeometryError;
use yasf_core::math::{LinearRgba, Vec3, TAU};
use yasf_core::renderer::Mesh;

const KIND: &str = "polygon";

/// Builds a flat disc in the XY plane made of concentric rings.
///
/// Vertex 0 is the centre, coloured `color_c`. Ring `stack` (1-based) holds
/// `slices` vertices at radius `stack / stacks * radius`, coloured
/// `color_c * (1 - t) + color_p * t` with `t = stack / stacks`. The first ring
/// is fanned from the centre; each later ring is stitched to the previous one
/// with two triangles per slice, the last slice wrapping to slice 0.
pub fn build_polygon(spec: &PolygonSpec) -> Result<Mesh, GeometryError> {
    let radius = require_positive(require(spec.radius, KIND, "radius")?, KIND, "radius")?;
    let stacks = require_segments(spec.stacks, KIND, "stacks")?;
    let slices = require_segments(spec.slices, KIND, "slices")?;
    let color_c: LinearRgba = require(spec.color_c, KIND, "color_c")?.into();
    let color_p: LinearRgba = require(spec.color_p, KIND, "color_p")?.into();

    let vertex_count = u64::from(stacks)
        .saturating_mul(u64::from(slices))
        .saturating_add(1);
    check_vertex_budget(vertex_count, KIND)?;
    let vertex_count = vertex_count as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut colors = Vec::with_capacity(vertex_count);
    let mut indices = Vec::new();

    positions.push(Vec3::ZERO);
    colors.push(color_c.to_vec4());

    for stack in 1..=stacks {
        let t = stack as f32 / stacks as f32;
        let ring_radius = t * radius;
        let color = color_c * (1.0 - t) + color_p * t;

        for slice in 0..slices {
            let (sin, cos) = (slice as f32 / slices as f32 * TAU).sin_cos();
            positions.push(Vec3::new(ring_radius * cos, ring_radius * sin, 0.0));
            colors.push(color.to_vec4());

            let next_slice = if slice == slices - 1 { 0 } else { slice + 1 };
            if stack == 1 {
                indices.extend_from_slice(&[0, slice + 1, next_slice + 1]);
            } else {
                let current = 1 + (stack - 1) * slices + slice;
                let previous = 1 + (stack - 2) * slices + slice;
                let current_next = 1 + (stack - 1) * slices + next_slice;
                let previous_next = 1 + (stack - 2) * slices + next_slice;
                indices.extend_from_slice(&[previous, current, previous_next]);
                indices.extend_from_slice(&[current, current_next, previous_next]);
            }
        }
    }

    let mut mesh = Mesh::new(positions)
        .with_colors(colors)
        .with_indices(indices);
    mesh.compute_vertex_normals();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ColorSpec;
    use approx::assert_relative_eq;
    use yasf_core::math::Vec4;

    fn spec(stacks: u32, slices: u32) -> PolygonSpec {
        PolygonSpec {
            radius: Some(1.0),
            stacks: Some(stacks),
            slices: Some(slices),
            color_c: Some(ColorSpec { r: 1.0, g: 0.0, b: 0.0 }),
            color_p: Some(ColorSpec { r: 0.0, g: 0.0, b: 1.0 }),
        }
    }

    #[test]
    fn test_vertex_count_and_colours() {
        let mesh = build_polygon(&spec(2, 4)).unwrap();
        assert_eq!(mesh.vertex_count(), 9);
        let colors = mesh.colors.as_ref().unwrap();
        assert_eq!(colors[0], Vec4::new(1.0, 0.0, 0.0, 1.0));
        // Ring 1 of 2 sits halfway between the two colours.
        assert_relative_eq!(colors[1].x, 0.5);
        assert_relative_eq!(colors[1].z, 0.5);
        assert_ne!(colors[1], colors[0]);
        // The outer ring is the rim colour.
        assert_eq!(colors[8], Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_ring_radii() {
        let mesh = build_polygon(&spec(2, 4)).unwrap();
        assert_relative_eq!(mesh.positions[1].length(), 0.5, epsilon = 1e-6);
        assert_relative_eq!(mesh.positions[5].length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fan_and_stitch_indices() {
        let mesh = build_polygon(&spec(2, 4)).unwrap();
        let indices = mesh.indices.as_ref().unwrap();
        assert_eq!(mesh.triangle_count(), 4 + 4 * 2);
        assert_eq!(&indices[..12], &[0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1]);
        // Last slice of ring 2 wraps back to the first slice of each ring.
        assert_eq!(&indices[indices.len() - 6..], &[4, 8, 1, 8, 5, 1]);
    }

    #[test]
    fn test_disc_faces_positive_z() {
        let mesh = build_polygon(&spec(3, 6)).unwrap();
        for n in mesh.normals.unwrap() {
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_missing_colour() {
        let mut s = spec(2, 4);
        s.color_p = None;
        assert_eq!(
            build_polygon(&s).unwrap_err(),
            GeometryError::MissingField {
                primitive: "polygon",
                field: "color_p"
            }
        );
    }

    #[test]
    fn test_oversized_ring_count_is_rejected() {
        let err = build_polygon(&spec(65536, 65536)).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::TooManyVertices { primitive: "polygon", vertices, .. }
                if vertices == 65536 * 65536 + 1
        ));
    }
}
