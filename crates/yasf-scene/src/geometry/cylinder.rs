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

//! Cylinder factory.

use super::{check_vertex_budget, grid_vertices, require, require_positive, require_segments};
use crate::document::CylinderSpec;
use crate::error::GeometryError;
use yasf_core::math::{Vec2, Vec3, TAU};
use yasf_core::renderer::Mesh;

const KIND: &str = "cylinder";

/// Builds a cylinder (or cone frustum) centred on the origin along Y.
///
/// `base` is the bottom radius and `top` the top radius; either may be zero
/// but not negative. `capsclose` (default `true`) closes both ends. The
/// angular sweep starts at `thetastart` (default 0) and covers
/// `thetalength` radians (default a full turn).
pub fn build_cylinder(spec: &CylinderSpec) -> Result<Mesh, GeometryError> {
    let radius_bottom = non_negative(require(spec.base, KIND, "base")?, "base")?;
    let radius_top = non_negative(require(spec.top, KIND, "top")?, "top")?;
    let height = require_positive(require(spec.height, KIND, "height")?, KIND, "height")?;
    let radial = require_segments(spec.slices, KIND, "slices")?;
    let height_segments = require_segments(spec.stacks, KIND, "stacks")?;
    let closed = spec.capsclose.unwrap_or(true);
    let theta_start = spec.thetastart.unwrap_or(0.0);
    let theta_length = spec.thetalength.unwrap_or(TAU);

    let cap_vertices = if closed {
        // Per cap: one centre per slice plus the rim.
        (u64::from(radial) * 2 + 1).saturating_mul(2)
    } else {
        0
    };
    check_vertex_budget(
        grid_vertices(radial, height_segments).saturating_add(cap_vertices),
        KIND,
    )?;

    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut tex_coords = Vec::new();
    let mut indices = Vec::new();

    // --- Torso ---
    let row = radial + 1;
    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let (sin_t, cos_t) = (u * theta_length + theta_start).sin_cos();
            positions.push(Vec3::new(radius * sin_t, -v * height + half_height, radius * cos_t));
            normals.push(Vec3::new(sin_t, slope, cos_t).normalize());
            tex_coords.push(Vec2::new(u, 1.0 - v));
        }
    }
    for x in 0..radial {
        for y in 0..height_segments {
            let a = y * row + x;
            let b = (y + 1) * row + x;
            let c = (y + 1) * row + x + 1;
            let d = y * row + x + 1;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    // --- Caps ---
    if closed {
        for top in [true, false] {
            let radius = if top { radius_top } else { radius_bottom };
            let sign = if top { 1.0 } else { -1.0 };
            let normal = Vec3::new(0.0, sign, 0.0);

            let center_start = positions.len() as u32;
            for _ in 0..radial {
                positions.push(Vec3::new(0.0, half_height * sign, 0.0));
                normals.push(normal);
                tex_coords.push(Vec2::new(0.5, 0.5));
            }
            let rim_start = positions.len() as u32;
            for x in 0..=radial {
                let u = x as f32 / radial as f32;
                let (sin_t, cos_t) = (u * theta_length + theta_start).sin_cos();
                positions.push(Vec3::new(radius * sin_t, half_height * sign, radius * cos_t));
                normals.push(normal);
                tex_coords.push(Vec2::new(cos_t * 0.5 + 0.5, sin_t * 0.5 * sign + 0.5));
            }
            for x in 0..radial {
                let c = center_start + x;
                let i = rim_start + x;
                if top {
                    indices.extend_from_slice(&[i, i + 1, c]);
                } else {
                    indices.extend_from_slice(&[i + 1, i, c]);
                }
            }
        }
    }

    Ok(Mesh::new(positions)
        .with_normals(normals)
        .with_tex_coords(tex_coords)
        .with_indices(indices))
}

fn non_negative(value: f32, field: &'static str) -> Result<f32, GeometryError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidValue {
            primitive: KIND,
            field,
            value: value as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spec() -> CylinderSpec {
        CylinderSpec {
            base: Some(1.0),
            top: Some(0.5),
            height: Some(2.0),
            slices: Some(8),
            stacks: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_closed_cylinder_counts() {
        let mesh = build_cylinder(&spec()).unwrap();
        let torso_vertices = 9 * 3;
        let cap_vertices = 8 + 9;
        assert_eq!(mesh.vertex_count(), torso_vertices + 2 * cap_vertices);
        assert_eq!(mesh.triangle_count(), 8 * 2 * 2 + 2 * 8);
    }

    #[test]
    fn test_base_is_the_bottom_radius() {
        let mesh = build_cylinder(&CylinderSpec {
            capsclose: Some(false),
            ..spec()
        })
        .unwrap();
        assert_eq!(mesh.triangle_count(), 8 * 2 * 2);
        // First row is the top ring, last row the bottom ring.
        let top = mesh.positions[0];
        let bottom = mesh.positions[9 * 2];
        assert_relative_eq!(top.y, 1.0);
        assert_relative_eq!(top.x.hypot(top.z), 0.5, epsilon = 1e-6);
        assert_relative_eq!(bottom.y, -1.0);
        assert_relative_eq!(bottom.x.hypot(bottom.z), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_partial_sweep() {
        let mesh = build_cylinder(&CylinderSpec {
            thetastart: Some(0.0),
            thetalength: Some(std::f32::consts::PI),
            capsclose: Some(false),
            ..spec()
        })
        .unwrap();
        // The sweep ends at theta = PI, i.e. on -Z.
        let last = mesh.positions[8];
        assert_relative_eq!(last.z, -0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(build_cylinder(&CylinderSpec { height: None, ..spec() }).is_err());
        assert!(build_cylinder(&CylinderSpec { slices: Some(0), ..spec() }).is_err());
        assert!(build_cylinder(&CylinderSpec { base: Some(-1.0), ..spec() }).is_err());
        assert!(build_cylinder(&CylinderSpec { top: Some(0.0), ..spec() }).is_ok());
    }

    #[test]
    fn test_oversized_segment_counts_are_rejected() {
        let err = build_cylinder(&CylinderSpec {
            slices: Some(1 << 20),
            stacks: Some(1 << 20),
            ..spec()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::TooManyVertices { primitive: "cylinder", .. }
        ));
        // The torso alone sits exactly at the limit; the caps push it over.
        let err = build_cylinder(&CylinderSpec {
            slices: Some((1 << 23) - 1),
            stacks: Some(1),
            capsclose: Some(true),
            ..spec()
        })
        .unwrap_err();
        assert!(matches!(err, GeometryError::TooManyVertices { .. }));
    }
}
