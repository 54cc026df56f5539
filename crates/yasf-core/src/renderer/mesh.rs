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

//! Defines the CPU-side triangle mesh produced by the geometry factories.

use crate::{
    asset::Asset,
    math::{Aabb, Vec2, Vec3, Vec4},
};

/// Size in bytes of one interleaved vertex: position, normal, uv, colour.
pub const VERTEX_STRIDE: usize = 12 + 12 + 8 + 16;

/// Represents a triangle-list mesh with optional indices.
///
/// When `indices` is `None` every three consecutive positions form a triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals
    pub normals: Option<Vec<Vec3>>,
    /// Vertex texture coordinates
    pub tex_coords: Option<Vec<Vec2>>,
    /// Vertex colors
    pub colors: Option<Vec<Vec4>>,
    /// Index data for primitive assembly
    pub indices: Option<Vec<u32>>,
    /// Axis-aligned bounding box
    pub bounding_box: Aabb,
}

impl Asset for Mesh {}

impl Mesh {
    /// Creates a non-indexed mesh from raw positions.
    pub fn new(positions: Vec<Vec3>) -> Self {
        let bounding_box = Aabb::from_points(&positions).unwrap_or_default();
        Self {
            positions,
            normals: None,
            tex_coords: None,
            colors: None,
            indices: None,
            bounding_box,
        }
    }

    /// Attaches an index buffer.
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Attaches per-vertex normals.
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Attaches per-vertex texture coordinates.
    pub fn with_tex_coords(mut self, tex_coords: Vec<Vec2>) -> Self {
        self.tex_coords = Some(tex_coords);
        self
    }

    /// Attaches per-vertex colours.
    pub fn with_colors(mut self, colors: Vec<Vec4>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles described by the mesh.
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Iterates the vertex indices of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let count = self.triangle_count();
        (0..count).map(move |t| match &self.indices {
            Some(indices) => [indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]],
            None => {
                let base = (t * 3) as u32;
                [base, base + 1, base + 2]
            }
        })
    }

    /// Recomputes smooth per-vertex normals from the triangle winding.
    ///
    /// Each face contributes `(c - b) x (a - b)` to its three vertices and the
    /// sums are normalized, so counter-clockwise faces point towards the viewer.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        let faces: Vec<[u32; 3]> = self.triangles().collect();
        for [ia, ib, ic] in faces {
            let (ia, ib, ic) = (ia as usize, ib as usize, ic as usize);
            if ia >= normals.len() || ib >= normals.len() || ic >= normals.len() {
                log::warn!("Skipping triangle with out-of-range index while computing normals");
                continue;
            }
            let (a, b, c) = (self.positions[ia], self.positions[ib], self.positions[ic]);
            let face = (c - b).cross(a - b);
            normals[ia] += face;
            normals[ib] += face;
            normals[ic] += face;
        }
        self.normals = Some(normals.into_iter().map(|n| n.normalize()).collect());
    }

    /// Creates an interleaved vertex buffer (position, normal, uv, colour),
    /// [`VERTEX_STRIDE`] bytes per vertex in native byte order. This is the
    /// layout handed to a renderer for upload.
    ///
    /// Missing attributes are filled with zero normals, zero uvs and white.
    pub fn create_vertex_buffer(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.positions.len() * VERTEX_STRIDE);
        for (i, position) in self.positions.iter().enumerate() {
            let normal = self
                .normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or(Vec3::ZERO);
            let uv = self
                .tex_coords
                .as_ref()
                .and_then(|t| t.get(i).copied())
                .unwrap_or(Vec2::ZERO);
            let color = self
                .colors
                .as_ref()
                .and_then(|c| c.get(i).copied())
                .unwrap_or(Vec4::new(1.0, 1.0, 1.0, 1.0));
            buffer.extend_from_slice(bytemuck::bytes_of(position));
            buffer.extend_from_slice(bytemuck::bytes_of(&normal));
            buffer.extend_from_slice(bytemuck::bytes_of(&uv));
            buffer.extend_from_slice(bytemuck::bytes_of(&color));
        }
        buffer
    }

    /// The index data as raw bytes (`u32`, native byte order), if indexed.
    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Mesh {
        Mesh::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_counterclockwise_triangle_faces_positive_z() {
        let mut mesh = unit_triangle();
        mesh.compute_vertex_normals();
        let normals = mesh.normals.unwrap();
        assert_eq!(normals.len(), 3);
        for n in normals {
            assert_relative_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_indexed_normals_are_averaged() {
        // Two triangles folded along the x axis, sharing vertices 0 and 1.
        let mut mesh = Mesh::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
        ])
        .with_indices(vec![0, 1, 2, 1, 0, 3]);
        mesh.compute_vertex_normals();
        let normals = mesh.normals.unwrap();
        let shared = normals[0];
        assert_relative_eq!(shared.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(shared.y, -shared.z, epsilon = 1e-5);
        assert_relative_eq!(normals[2].z, 1.0);
    }

    #[test]
    fn test_counts_and_bounds() {
        let mesh = unit_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
        assert_eq!(mesh.bounding_box.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_vertex_buffer_stride() {
        let mesh = unit_triangle();
        assert_eq!(mesh.create_vertex_buffer().len(), 3 * VERTEX_STRIDE);
    }

    #[test]
    fn test_index_bytes() {
        assert!(unit_triangle().index_bytes().is_none());
        let mesh = unit_triangle().with_indices(vec![0, 2, 1]);
        let bytes = mesh.index_bytes().unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[4..8], &2u32.to_ne_bytes());
    }
}
