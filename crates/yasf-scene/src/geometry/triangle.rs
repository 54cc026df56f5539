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

//! Triangle factory.

use super::require;
use crate::document::TriangleSpec;
use crate::error::GeometryError;
use yasf_core::renderer::Mesh;

const KIND: &str = "triangle";

/// Builds a single non-indexed triangle from three explicit vertices.
///
/// No ordering or area check is made; the normal follows the winding.
pub fn build_triangle(spec: &TriangleSpec) -> Result<Mesh, GeometryError> {
    let positions = vec![
        require(spec.xyz1, KIND, "xyz1")?.into(),
        require(spec.xyz2, KIND, "xyz2")?.into(),
        require(spec.xyz3, KIND, "xyz3")?.into(),
    ];
    let mut mesh = Mesh::new(positions);
    mesh.compute_vertex_normals();
    Ok(mesh)
}
