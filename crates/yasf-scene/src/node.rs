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

//! The renderable tree produced by a graph build.

use crate::document::TransformSpec;
use crate::lod::Lod;
use yasf_core::asset::AssetHandle;
use yasf_core::math::{degrees_to_radians, Mat4, Quaternion, Vec3};
use yasf_core::renderer::{LightType, Mesh, ShadedSurface};

/// A node's position, Euler rotation and scale relative to its parent.
///
/// Rotation is stored as `XYZ` Euler angles in radians so that successive
/// rotate steps add up per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The translation (position) of the node.
    pub translation: Vec3,
    /// Euler angles in radians, applied in `XYZ` order.
    pub rotation: Vec3,
    /// The scale of the node.
    pub scale: Vec3,
}

impl Transform {
    /// Creates a new identity `Transform`.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Compounds one document transform step onto this transform.
    ///
    /// Translations and rotations add, scales multiply.
    pub fn apply(&mut self, step: &TransformSpec) {
        match *step {
            TransformSpec::Translate { amount } => self.translation += Vec3::from(amount),
            TransformSpec::Rotate { amount } => {
                self.rotation += Vec3::new(
                    degrees_to_radians(amount.x),
                    degrees_to_radians(amount.y),
                    degrees_to_radians(amount.z),
                )
            }
            TransformSpec::Scale { amount } => self.scale = self.scale.mul_elem(amount.into()),
        }
    }

    /// The rotation as a quaternion.
    pub fn rotation_quat(&self) -> Quaternion {
        Quaternion::from_euler_xyz(self.rotation)
    }

    /// Calculates the local-to-parent matrix, `T * R * S`.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_quat(self.rotation_quat())
            * Mat4::from_scale(self.scale)
    }
}

impl Default for Transform {
    /// Returns the identity `Transform`.
    fn default() -> Self {
        Self::identity()
    }
}

/// A mesh with its resolved surface and shadow flags.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    /// Name of the inline child that produced the mesh.
    pub name: String,
    /// Geometry.
    pub mesh: AssetHandle<Mesh>,
    /// Resolved surface.
    pub material: ShadedSurface,
    /// Whether the mesh casts shadows.
    pub cast_shadow: bool,
    /// Whether the mesh receives shadows.
    pub receive_shadow: bool,
}

/// A light attached to the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LightInstance {
    /// Name of the inline child that produced the light.
    pub name: String,
    /// The light.
    pub light: LightType,
}

/// Anything that can hang below a [`RenderNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    /// A nested node.
    Node(RenderNode),
    /// A distance-switched set of nodes.
    Lod(Lod),
    /// A mesh.
    Mesh(MeshInstance),
    /// A light.
    Light(LightInstance),
}

impl SceneObject {
    /// Name of the object.
    pub fn name(&self) -> &str {
        match self {
            SceneObject::Node(node) => &node.name,
            SceneObject::Lod(lod) => &lod.name,
            SceneObject::Mesh(mesh) => &mesh.name,
            SceneObject::Light(light) => &light.name,
        }
    }

    /// Returns the node if this object is one.
    pub fn as_node(&self) -> Option<&RenderNode> {
        match self {
            SceneObject::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the LOD if this object is one.
    pub fn as_lod(&self) -> Option<&Lod> {
        match self {
            SceneObject::Lod(lod) => Some(lod),
            _ => None,
        }
    }

    /// Returns the mesh if this object is one.
    pub fn as_mesh(&self) -> Option<&MeshInstance> {
        match self {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Returns the light if this object is one.
    pub fn as_light(&self) -> Option<&LightInstance> {
        match self {
            SceneObject::Light(light) => Some(light),
            _ => None,
        }
    }
}

/// A resolved graph node: a named group with a local transform.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    /// Id of the node in the graph table.
    pub name: String,
    /// Material id in effect for primitives below this node.
    pub material_ref: Option<String>,
    /// Resolved shadow-cast flag.
    pub cast_shadow: bool,
    /// Resolved shadow-receive flag.
    pub receive_shadow: bool,
    /// Local transform.
    pub transform: Transform,
    /// Children in build order.
    pub children: Vec<SceneObject>,
}

impl RenderNode {
    /// Creates an empty node with an identity transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material_ref: None,
            cast_shadow: false,
            receive_shadow: false,
            transform: Transform::identity(),
            children: Vec::new(),
        }
    }

    /// Child nodes, skipping meshes, lights and LODs.
    pub fn child_nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.children.iter().filter_map(SceneObject::as_node)
    }

    /// Child meshes.
    pub fn meshes(&self) -> impl Iterator<Item = &MeshInstance> {
        self.children.iter().filter_map(SceneObject::as_mesh)
    }

    /// Child lights.
    pub fn lights(&self) -> impl Iterator<Item = &LightInstance> {
        self.children.iter().filter_map(SceneObject::as_light)
    }

    /// Child LODs.
    pub fn lods(&self) -> impl Iterator<Item = &Lod> {
        self.children.iter().filter_map(SceneObject::as_lod)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XyzSpec;
    use approx::assert_relative_eq;
    use yasf_core::math::FRAC_PI_2;

    fn xyz(x: f32, y: f32, z: f32) -> XyzSpec {
        XyzSpec { x, y, z }
    }

    #[test]
    fn test_steps_compound() {
        let mut t = Transform::identity();
        t.apply(&TransformSpec::Translate { amount: xyz(1.0, 2.0, 3.0) });
        t.apply(&TransformSpec::Translate { amount: xyz(1.0, 0.0, 0.0) });
        t.apply(&TransformSpec::Scale { amount: xyz(2.0, 2.0, 2.0) });
        t.apply(&TransformSpec::Scale { amount: xyz(1.0, 3.0, 0.5) });
        t.apply(&TransformSpec::Rotate { amount: xyz(0.0, 45.0, 0.0) });
        t.apply(&TransformSpec::Rotate { amount: xyz(0.0, 45.0, 0.0) });
        assert_eq!(t.translation, Vec3::new(2.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::new(2.0, 6.0, 1.0));
        assert_relative_eq!(t.rotation.y, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_to_mat4_rotates_then_translates() {
        let mut t = Transform::identity();
        t.apply(&TransformSpec::Rotate { amount: xyz(0.0, 0.0, 90.0) });
        t.apply(&TransformSpec::Translate { amount: xyz(5.0, 0.0, 0.0) });
        let p = t.to_mat4().transform_point(Vec3::X);
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_child_filters() {
        let mut node = RenderNode::new("root");
        node.children.push(SceneObject::Node(RenderNode::new("a")));
        node.children.push(SceneObject::Node(RenderNode::new("b")));
        assert_eq!(node.child_nodes().count(), 2);
        assert_eq!(node.meshes().count(), 0);
        assert_eq!(node.children[1].name(), "b");
    }
}
