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

//! Rectangle factory.

use super::{check_vertex_budget, grid_vertices, require, segments_or};
use crate::document::RectangleSpec;
use crate::error::GeometryError;
use yasf_core::math::{Vec2, Vec3};
use yasf_core::renderer::Mesh;

const KIND: &str = "rectangle";

/// Builds a subdivided rectangle in the XY plane spanning the corners `xy1`
/// and `xy2`.
///
/// Width and height are `xy2 - xy1` and may be negative; a negative extent
/// mirrors the grid, which reverses the winding and so the facing. Normals
/// are derived from the winding.
pub fn build_rectangle(spec: &RectangleSpec) -> Result<Mesh, GeometryError> {
    let xy1: Vec2 = require(spec.xy1, KIND, "xy1")?.into();
    let xy2: Vec2 = require(spec.xy2, KIND, "xy2")?.into();
    let grid_x = segments_or(spec.parts_x, 1, KIND, "parts_x")?;
    let grid_y = segments_or(spec.parts_y, 1, KIND, "parts_y")?;
    check_vertex_budget(grid_vertices(grid_x, grid_y), KIND)?;

    let extent = xy2 - xy1;
    let segment_width = extent.x / grid_x as f32;
    let segment_height = extent.y / grid_y as f32;

    let mut positions = Vec::new();
    let mut tex_coords = Vec::new();
    for iy in 0..=grid_y {
        // Rows run from the xy2 edge towards xy1, like a texture's top row.
        let y = xy2.y - iy as f32 * segment_height;
        for ix in 0..=grid_x {
            let x = xy1.x + ix as f32 * segment_width;
            positions.push(Vec3::new(x, y, 0.0));
            tex_coords.push(Vec2::new(
                ix as f32 / grid_x as f32,
                1.0 - iy as f32 / grid_y as f32,
            ));
        }
    }

    let row = grid_x + 1;
    let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = (ix + 1) + row * (iy + 1);
            let d = (ix + 1) + row * iy;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    let mut mesh = Mesh::new(positions)
        .with_tex_coords(tex_coords)
        .with_indices(indices);
    mesh.compute_vertex_normals();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XySpec;
    use approx::assert_relative_eq;

    fn spec(x1: f32, y1: f32, x2: f32, y2: f32) -> RectangleSpec {
        RectangleSpec {
            xy1: Some(XySpec { x: x1, y: y1 }),
            xy2: Some(XySpec { x: x2, y: y2 }),
            ..Default::default()
        }
    }

    #[test]
    fn test_unit_rectangle_faces_positive_z() {
        let mesh = build_rectangle(&spec(0.0, 0.0, 2.0, 1.0)).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.bounding_box.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.bounding_box.max, Vec3::new(2.0, 1.0, 0.0));
        for n in mesh.normals.unwrap() {
            assert_relative_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_negative_width_flips_facing() {
        let mesh = build_rectangle(&spec(0.0, 0.0, -1.0, 2.0)).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        for n in mesh.normals.unwrap() {
            assert_relative_eq!(n.z, -1.0);
        }
    }

    #[test]
    fn test_subdivision() {
        let mut s = spec(-1.0, -1.0, 1.0, 1.0);
        s.parts_x = Some(4);
        s.parts_y = Some(2);
        let mesh = build_rectangle(&s).unwrap();
        assert_eq!(mesh.vertex_count(), 5 * 3);
        assert_eq!(mesh.triangle_count(), 4 * 2 * 2);
    }

    #[test]
    fn test_missing_corner() {
        let s = RectangleSpec {
            xy1: Some(XySpec { x: 0.0, y: 0.0 }),
            ..Default::default()
        };
        assert_eq!(
            build_rectangle(&s).unwrap_err(),
            GeometryError::MissingField {
                primitive: "rectangle",
                field: "xy2"
            }
        );
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let mut s = spec(0.0, 0.0, 1.0, 1.0);
        s.parts_x = Some(u32::MAX);
        s.parts_y = Some(u32::MAX);
        assert!(matches!(
            build_rectangle(&s),
            Err(GeometryError::TooManyVertices { primitive: "rectangle", .. })
        ));
    }
}
