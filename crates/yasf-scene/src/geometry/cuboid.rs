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

//! Box factory.

use super::{check_vertex_budget, grid_vertices, require, segments_or};
use crate::document::BoxSpec;
use crate::error::GeometryError;
use yasf_core::math::{Vec2, Vec3};
use yasf_core::renderer::Mesh;

const KIND: &str = "box";

/// Vertex streams accumulated face by face.
#[derive(Default)]
struct Buffers {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    indices: Vec<u32>,
}

/// One face of the box, expressed in the face's own `(u, v, w)` axes.
struct Face {
    /// Component indices (0 = x, 1 = y, 2 = z) of the face's u, v and w axes.
    axes: [usize; 3],
    u_dir: f32,
    v_dir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
}

impl Face {
    fn new(
        axes: [usize; 3],
        u_dir: f32,
        v_dir: f32,
        (width, height, depth): (f32, f32, f32),
        (grid_x, grid_y): (u32, u32),
    ) -> Self {
        Self {
            axes,
            u_dir,
            v_dir,
            width,
            height,
            depth,
            grid_x,
            grid_y,
        }
    }
}

impl Buffers {
    fn push_face(&mut self, face: &Face, center: Vec3) {
        let [u, v, w] = face.axes;
        let base = self.positions.len() as u32;
        let segment_width = face.width / face.grid_x as f32;
        let segment_height = face.height / face.grid_y as f32;
        let depth_half = face.depth / 2.0;

        for iy in 0..=face.grid_y {
            let y = iy as f32 * segment_height - face.height / 2.0;
            for ix in 0..=face.grid_x {
                let x = ix as f32 * segment_width - face.width / 2.0;
                let mut p = [0.0f32; 3];
                p[u] = x * face.u_dir;
                p[v] = y * face.v_dir;
                p[w] = depth_half;
                let mut n = [0.0f32; 3];
                n[w] = if face.depth > 0.0 { 1.0 } else { -1.0 };
                self.positions.push(center + Vec3::new(p[0], p[1], p[2]));
                self.normals.push(Vec3::new(n[0], n[1], n[2]));
                self.tex_coords.push(Vec2::new(
                    ix as f32 / face.grid_x as f32,
                    1.0 - iy as f32 / face.grid_y as f32,
                ));
            }
        }

        let row = face.grid_x + 1;
        for iy in 0..face.grid_y {
            for ix in 0..face.grid_x {
                let a = base + ix + row * iy;
                let b = base + ix + row * (iy + 1);
                let c = base + (ix + 1) + row * (iy + 1);
                let d = base + (ix + 1) + row * iy;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }
}

/// Builds an axis-aligned box spanning the corners `xyz1` and `xyz2`.
///
/// Unlike the rectangle, every extent `xyz2 - xyz1` must be strictly positive.
/// `parts_x|y|z` subdivide each face and default to 1.
pub fn build_box(spec: &BoxSpec) -> Result<Mesh, GeometryError> {
    let min: Vec3 = require(spec.xyz1, KIND, "xyz1")?.into();
    let max: Vec3 = require(spec.xyz2, KIND, "xyz2")?.into();
    let size = max - min;
    if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
        return Err(GeometryError::NonPositiveDimension {
            width: size.x,
            height: size.y,
            depth: size.z,
        });
    }
    let parts_x = segments_or(spec.parts_x, 1, KIND, "parts_x")?;
    let parts_y = segments_or(spec.parts_y, 1, KIND, "parts_y")?;
    let parts_z = segments_or(spec.parts_z, 1, KIND, "parts_z")?;
    // Two faces per axis pair.
    let vertices = [(parts_z, parts_y), (parts_x, parts_z), (parts_x, parts_y)]
        .into_iter()
        .fold(0u64, |total, (columns, rows)| {
            total.saturating_add(grid_vertices(columns, rows).saturating_mul(2))
        });
    check_vertex_budget(vertices, KIND)?;
    let center = (min + max) * 0.5;
    let (width, height, depth) = (size.x, size.y, size.z);

    // (axes, u_dir, v_dir, (width, height, depth), (grid_x, grid_y)) per face.
    let faces = [
        Face::new([2, 1, 0], -1.0, -1.0, (depth, height, width), (parts_z, parts_y)), // +X
        Face::new([2, 1, 0], 1.0, -1.0, (depth, height, -width), (parts_z, parts_y)), // -X
        Face::new([0, 2, 1], 1.0, 1.0, (width, depth, height), (parts_x, parts_z)), // +Y
        Face::new([0, 2, 1], 1.0, -1.0, (width, depth, -height), (parts_x, parts_z)), // -Y
        Face::new([0, 1, 2], 1.0, -1.0, (width, height, depth), (parts_x, parts_y)), // +Z
        Face::new([0, 1, 2], -1.0, -1.0, (width, height, -depth), (parts_x, parts_y)), // -Z
    ];

    let mut buffers = Buffers::default();
    for face in &faces {
        buffers.push_face(face, center);
    }

    Ok(Mesh::new(buffers.positions)
        .with_normals(buffers.normals)
        .with_tex_coords(buffers.tex_coords)
        .with_indices(buffers.indices))
}
