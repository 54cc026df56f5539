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

//! Rational B-spline surface evaluation and tessellation.
//!
//! Every patch uses clamped knot vectors with no interior knots, so each
//! direction is a single Bezier-like span over `[0, 1]`. Evaluation still goes
//! through the general span search and de Boor recursion, carried out in
//! homogeneous coordinates so that weights are honoured exactly.

use crate::document::{ControlPointSpec, NurbsSpec};
use crate::error::GeometryError;
use crate::geometry::{check_vertex_budget, grid_vertices, require, require_segments};
use yasf_core::math::{Vec2, Vec3, Vec4};
use yasf_core::renderer::Mesh;

const KIND: &str = "nurbs";

/// Returns the clamped knot vector for a single span of the given degree:
/// `degree + 1` zeros followed by `degree + 1` ones.
pub fn clamped_knots(degree: usize) -> Vec<f32> {
    let mut knots = vec![0.0; degree + 1];
    knots.resize(2 * (degree + 1), 1.0);
    knots
}

/// Finds the knot span containing `t`, for `n + 1` control points of degree `p`.
fn find_span(n: usize, p: usize, t: f32, knots: &[f32]) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[p] {
        return p;
    }

    let mut low = p;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Collapses the `p + 1` homogeneous points in `d` onto `d[p]`.
fn de_boor(d: &mut [Vec4], span: usize, p: usize, t: f32, knots: &[f32]) {
    for r in 1..=p {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == 0.0 { 0.0 } else { (t - knots[i]) / denom };
            d[j] = d[j - 1].lerp_unclamped(d[j], alpha);
        }
    }
}

/// A validated NURBS patch ready for sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsSurface {
    degree_u: usize,
    degree_v: usize,
    knots_u: Vec<f32>,
    knots_v: Vec<f32>,
    /// Homogeneous `(x*w, y*w, z*w, w)` points, `degree_v + 1` rows of `degree_u + 1`.
    points: Vec<Vec4>,
}

impl NurbsSurface {
    /// Creates a patch from row-major control points.
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        control_points: &[ControlPointSpec],
    ) -> Result<Self, GeometryError> {
        let expected = degree_u
            .saturating_add(1)
            .saturating_mul(degree_v.saturating_add(1));
        if control_points.len() != expected {
            return Err(GeometryError::ControlPointCount {
                expected,
                actual: control_points.len(),
            });
        }

        let points = control_points
            .iter()
            .enumerate()
            .map(|(index, cp)| {
                if !cp.w.is_finite() || cp.w <= 0.0 {
                    return Err(GeometryError::InvalidWeight {
                        index,
                        weight: cp.w,
                    });
                }
                Ok(Vec4::new(cp.x * cp.w, cp.y * cp.w, cp.z * cp.w, cp.w))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            degree_u,
            degree_v,
            knots_u: clamped_knots(degree_u),
            knots_v: clamped_knots(degree_v),
            points,
        })
    }

    /// Evaluates the surface at `(u, v)`, both in `[0, 1]`.
    pub fn point(&self, u: f32, v: f32) -> Option<Vec3> {
        let (pu, pv) = (self.degree_u, self.degree_v);
        let span_u = find_span(pu, pu, u, &self.knots_u);
        let span_v = find_span(pv, pv, v, &self.knots_v);
        let columns = pu + 1;

        let mut rows = Vec::with_capacity(pv + 1);
        let mut scratch = vec![Vec4::ZERO; pu + 1];
        for row in span_v - pv..=span_v {
            for (k, slot) in scratch.iter_mut().enumerate() {
                *slot = self.points[row * columns + span_u - pu + k];
            }
            de_boor(&mut scratch, span_u, pu, u, &self.knots_u);
            rows.push(scratch[pu]);
        }
        de_boor(&mut rows, span_v, pv, v, &self.knots_v);
        rows[pv].to_point3()
    }

    /// Samples a `(parts_u + 1) x (parts_v + 1)` grid and triangulates it.
    ///
    /// Fails when the grid has more vertices than a mesh may hold.
    pub fn tessellate(&self, parts_u: u32, parts_v: u32) -> Result<Mesh, GeometryError> {
        let vertex_count = grid_vertices(parts_u, parts_v);
        check_vertex_budget(vertex_count, KIND)?;
        let stride = parts_u + 1;
        let mut positions = Vec::with_capacity(vertex_count as usize);
        let mut tex_coords = Vec::with_capacity(positions.capacity());

        for i in 0..=parts_v {
            let v = i as f32 / parts_v as f32;
            for j in 0..=parts_u {
                let u = j as f32 / parts_u as f32;
                let p = self.point(u, v).unwrap_or_else(|| {
                    log::warn!("NURBS sample ({u}, {v}) has zero weight; using origin");
                    Vec3::ZERO
                });
                positions.push(p);
                tex_coords.push(Vec2::new(u, v));
            }
        }

        let mut indices = Vec::with_capacity(parts_u as usize * parts_v as usize * 6);
        for i in 0..parts_v {
            for j in 0..parts_u {
                let a = i * stride + j;
                let b = a + 1;
                let c = (i + 1) * stride + j + 1;
                let d = (i + 1) * stride + j;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let mut mesh = Mesh::new(positions)
            .with_tex_coords(tex_coords)
            .with_indices(indices);
        mesh.compute_vertex_normals();
        Ok(mesh)
    }
}

/// Builds a NURBS mesh from its wire description.
pub fn build_nurbs(spec: &NurbsSpec) -> Result<Mesh, GeometryError> {
    let degree_u = require_segments(spec.degree_u, KIND, "degree_u")? as usize;
    let degree_v = require_segments(spec.degree_v, KIND, "degree_v")? as usize;
    let parts_u = require_segments(spec.parts_u, KIND, "parts_u")?;
    let parts_v = require_segments(spec.parts_v, KIND, "parts_v")?;
    let control_points = require(spec.controlpoints.as_ref(), KIND, "controlpoints")?;

    let surface = NurbsSurface::new(degree_u, degree_v, control_points)?;
    surface.tessellate(parts_u, parts_v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn cp(x: f32, y: f32, z: f32, w: f32) -> ControlPointSpec {
        ControlPointSpec { x, y, z, w }
    }

    fn bilinear() -> NurbsSpec {
        NurbsSpec {
            degree_u: Some(1),
            degree_v: Some(1),
            parts_u: Some(2),
            parts_v: Some(2),
            controlpoints: Some(vec![
                cp(0.0, 0.0, 0.0, 1.0),
                cp(1.0, 0.0, 0.0, 1.0),
                cp(0.0, 1.0, 0.0, 1.0),
                cp(1.0, 1.0, 0.0, 1.0),
            ]),
        }
    }

    #[test]
    fn test_clamped_knots() {
        assert_eq!(clamped_knots(1), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(clamped_knots(2), vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_find_span_single_segment() {
        let knots = clamped_knots(3);
        assert_eq!(find_span(3, 3, 0.0, &knots), 3);
        assert_eq!(find_span(3, 3, 0.5, &knots), 3);
        assert_eq!(find_span(3, 3, 1.0, &knots), 3);
    }

    #[test]
    fn test_bilinear_patch() {
        let mesh = build_nurbs(&bilinear()).unwrap();
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);
        let centre = mesh.positions[4];
        assert_relative_eq!(centre.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(centre.y, 0.5, epsilon = 1e-6);
        assert_eq!(mesh.positions[8], Vec3::new(1.0, 1.0, 0.0));
        for n in mesh.normals.as_ref().unwrap() {
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-5);
        }
        assert_eq!(mesh.tex_coords.as_ref().unwrap()[2], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_weights_trace_a_circular_arc() {
        // A quadratic quarter circle extruded along Z.
        let w = FRAC_1_SQRT_2;
        let points = vec![
            cp(1.0, 0.0, 0.0, 1.0),
            cp(1.0, 1.0, 0.0, w),
            cp(0.0, 1.0, 0.0, 1.0),
            cp(1.0, 0.0, 1.0, 1.0),
            cp(1.0, 1.0, 1.0, w),
            cp(0.0, 1.0, 1.0, 1.0),
        ];
        let surface = NurbsSurface::new(2, 1, &points).unwrap();
        for step in 0..=8 {
            let u = step as f32 / 8.0;
            let p = surface.point(u, 0.25).unwrap();
            assert_relative_eq!(p.x.hypot(p.y), 1.0, epsilon = 1e-5);
            assert_relative_eq!(p.z, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_control_point_count_is_checked() {
        let mut spec = bilinear();
        spec.degree_u = Some(2);
        assert_eq!(
            build_nurbs(&spec).unwrap_err(),
            GeometryError::ControlPointCount {
                expected: 6,
                actual: 4
            }
        );
    }

    #[test]
    fn test_invalid_weight_and_missing_points() {
        let mut spec = bilinear();
        if let Some(points) = spec.controlpoints.as_mut() {
            points[3].w = 0.0;
        }
        assert_eq!(
            build_nurbs(&spec).unwrap_err(),
            GeometryError::InvalidWeight {
                index: 3,
                weight: 0.0
            }
        );

        spec.controlpoints = None;
        assert!(matches!(
            build_nurbs(&spec),
            Err(GeometryError::MissingField {
                field: "controlpoints",
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_sampling_is_rejected() {
        let mut spec = bilinear();
        spec.parts_u = Some(u32::MAX);
        spec.parts_v = Some(u32::MAX);
        assert!(matches!(
            build_nurbs(&spec),
            Err(GeometryError::TooManyVertices { primitive: "nurbs", vertices: u64::MAX, .. })
        ));

        spec.parts_u = Some(2);
        spec.degree_u = Some(u32::MAX);
        spec.degree_v = Some(u32::MAX);
        assert!(matches!(
            build_nurbs(&spec),
            Err(GeometryError::ControlPointCount { actual: 4, .. })
        ));
    }
}
