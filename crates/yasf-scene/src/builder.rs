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

//! Recursive construction of the render tree from the graph table.
//!
//! A build starts at the document's root id and descends through each node's
//! children in a fixed order: the `nodesList`, then the `lodsList`, then inline
//! primitives and lights in declaration order. Material and shadow settings
//! flow down as an [`InheritedContext`]. Any failure below the root is logged
//! and only removes the affected piece of content.

use crate::config::SceneConfig;
use crate::document::{ChildSpec, GraphEntry, Lenient, LodSpec, NodeSpec, SceneDescription};
use crate::error::GraphError;
use crate::geometry::{
    build_box, build_cylinder, build_polygon, build_rectangle, build_sphere, build_triangle,
};
use crate::lights::{build_directional_light, build_point_light, build_spot_light};
use crate::lod::{Lod, LodLevel};
use crate::node::{LightInstance, MeshInstance, RenderNode, SceneObject, Transform};
use crate::nurbs::build_nurbs;
use crate::registry::NodeRegistry;
use crate::resolver::MaterialResolver;
use crate::texture_loader::{PendingLoads, TextureLoader};
use std::fmt;
use std::ops::Deref;
use yasf_core::asset::AssetHandle;
use yasf_core::math::{Mat4, Vec3};
use yasf_core::renderer::{LightType, Mesh, ShadedSurface, UnlitMaterial};

/// Settings a node passes down to its children.
///
/// A node's own value wins when present, otherwise the parent's resolved value
/// is used. Contexts are never modified in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InheritedContext {
    /// Material applied to meshes that do not name one.
    pub material_ref: Option<String>,
    /// Whether meshes cast shadows.
    pub cast_shadow: bool,
    /// Whether meshes receive shadows.
    pub receive_shadow: bool,
}

impl InheritedContext {
    /// Resolves the context of `spec` as a child of `self`.
    pub fn for_node(&self, spec: &NodeSpec) -> Self {
        Self {
            material_ref: spec
                .materialref
                .as_ref()
                .map(|m| m.id().to_string())
                .or_else(|| self.material_ref.clone()),
            cast_shadow: spec.castshadows.unwrap_or(self.cast_shadow),
            receive_shadow: spec.receiveshadows.unwrap_or(self.receive_shadow),
        }
    }
}

/// Counts of what a tree contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    /// Group nodes, including the root and LOD level nodes.
    pub nodes: usize,
    /// Mesh instances.
    pub meshes: usize,
    /// Lights.
    pub lights: usize,
    /// LOD groups.
    pub lods: usize,
    /// Triangles over every mesh instance.
    pub triangles: usize,
}

impl fmt::Display for SceneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} meshes, {} lights, {} LODs, {} triangles",
            self.nodes, self.meshes, self.lights, self.lods, self.triangles
        )
    }
}

/// A built tree plus its name index.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    root: RenderNode,
    registry: NodeRegistry,
}

impl SceneGraph {
    /// Wraps a tree, indexing every named node.
    pub fn new(root: RenderNode) -> Self {
        let registry = NodeRegistry::index(&root);
        Self { root, registry }
    }

    /// The root node.
    pub fn root(&self) -> &RenderNode {
        &self.root
    }

    /// The name index.
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Looks up a node by name, logging a warning when it does not exist.
    pub fn get_node(&self, name: &str) -> Option<&RenderNode> {
        let node = self.registry.resolve(&self.root, name);
        if node.is_none() {
            log::warn!("Node '{name}' not found in scene graph");
        }
        node
    }

    /// Mutable variant of [`SceneGraph::get_node`].
    ///
    /// The returned [`NodeMut`] edits a node in place but cannot rename it or
    /// add, remove or reorder children, so the name index stays valid.
    pub fn get_node_mut(&mut self, name: &str) -> Option<NodeMut<'_>> {
        let node = self.registry.resolve_mut(&mut self.root, name);
        if node.is_none() {
            log::warn!("Node '{name}' not found in scene graph");
        }
        node.map(|node| NodeMut { node })
    }

    /// Re-selects the active level of every LOD for a camera at `camera_position`.
    ///
    /// Each LOD is measured from its world position, which accumulates the
    /// transforms of every enclosing node.
    pub fn update_lods(&mut self, camera_position: Vec3) {
        update_node_lods(&mut self.root, Mat4::IDENTITY, camera_position);
    }

    /// Counts the content of the tree.
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        collect_stats(&self.root, &mut stats);
        stats
    }

    /// Consumes the graph, returning the root.
    pub fn into_root(self) -> RenderNode {
        self.root
    }
}

/// Shape-preserving mutable access to a node of a [`SceneGraph`].
///
/// Reads go through `Deref`. Writes are limited to the transform, the
/// resolved flags and the contents of existing meshes and lights.
#[derive(Debug)]
pub struct NodeMut<'a> {
    node: &'a mut RenderNode,
}

impl NodeMut<'_> {
    /// The node's local transform.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.node.transform
    }

    /// Sets the material id recorded on the node.
    pub fn set_material_ref(&mut self, material_ref: Option<String>) {
        self.node.material_ref = material_ref;
    }

    /// Sets the node's shadow-cast flag.
    pub fn set_cast_shadow(&mut self, cast_shadow: bool) {
        self.node.cast_shadow = cast_shadow;
    }

    /// Sets the node's shadow-receive flag.
    pub fn set_receive_shadow(&mut self, receive_shadow: bool) {
        self.node.receive_shadow = receive_shadow;
    }

    /// Direct child meshes.
    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut MeshInstance> {
        self.node.children.iter_mut().filter_map(|child| match child {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    /// Direct child lights.
    pub fn lights_mut(&mut self) -> impl Iterator<Item = &mut LightInstance> {
        self.node.children.iter_mut().filter_map(|child| match child {
            SceneObject::Light(light) => Some(light),
            _ => None,
        })
    }
}

impl Deref for NodeMut<'_> {
    type Target = RenderNode;

    fn deref(&self) -> &RenderNode {
        self.node
    }
}

fn update_node_lods(node: &mut RenderNode, parent_world: Mat4, camera: Vec3) {
    let world = parent_world * node.transform.to_mat4();
    for child in &mut node.children {
        match child {
            SceneObject::Node(child) => update_node_lods(child, world, camera),
            SceneObject::Lod(lod) => {
                lod.update(camera, world.translation());
                for level in lod.level_objects_mut().flatten() {
                    update_node_lods(level, world, camera);
                }
            }
            SceneObject::Mesh(_) | SceneObject::Light(_) => {}
        }
    }
}

fn collect_stats(node: &RenderNode, stats: &mut SceneStats) {
    stats.nodes += 1;
    for child in &node.children {
        match child {
            SceneObject::Node(child) => collect_stats(child, stats),
            SceneObject::Lod(lod) => {
                stats.lods += 1;
                for level in lod.levels().iter().filter_map(|l| l.object.as_ref()) {
                    collect_stats(level, stats);
                }
            }
            SceneObject::Mesh(mesh) => {
                stats.meshes += 1;
                stats.triangles += mesh.mesh.triangle_count();
            }
            SceneObject::Light(_) => stats.lights += 1,
        }
    }
}

/// Builds a [`SceneGraph`] from a parsed scene description.
pub struct GraphBuilder<'a> {
    description: &'a SceneDescription,
    config: &'a SceneConfig,
    loader: Option<&'a TextureLoader>,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder that issues no texture loads.
    pub fn new(description: &'a SceneDescription, config: &'a SceneConfig) -> Self {
        Self {
            description,
            config,
            loader: None,
        }
    }

    /// Issues texture loads through `loader` while building.
    pub fn with_loader(mut self, loader: &'a TextureLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Builds the tree. Loads issued meanwhile keep running detached.
    pub fn build(self) -> Result<SceneGraph, GraphError> {
        self.build_with_loads().map(|(graph, _)| graph)
    }

    /// Builds the tree and returns the texture loads it issued.
    ///
    /// Fails only when the root id is absent or names no buildable node.
    pub fn build_with_loads(self) -> Result<(SceneGraph, PendingLoads), GraphError> {
        let graph = &self.description.graph;
        let root_id = match &graph.root_id {
            Some(id) if matches!(graph.entry(id), Some(GraphEntry::Node(_))) => id,
            other => {
                let err = GraphError::MissingRoot(other.clone());
                log::error!("{err}");
                return Err(err);
            }
        };

        log::info!("Building scene graph from root '{root_id}'");
        let mut resolver = MaterialResolver::new(self.description, self.config);
        if let Some(loader) = self.loader {
            resolver = resolver.with_loader(loader);
        }
        let mut pass = BuildPass {
            description: self.description,
            config: self.config,
            resolver,
            ancestors: Vec::new(),
        };

        let root = pass.build_node(root_id, &InheritedContext::default()).map_err(|err| {
            log::error!("{err}");
            GraphError::MissingRoot(Some(root_id.clone()))
        })?;
        let pending = pass.resolver.into_pending();
        let graph = SceneGraph::new(root);
        log::info!(
            "Scene graph built: {}; {} texture loads issued",
            graph.stats(),
            pending.len()
        );
        Ok((graph, pending))
    }
}

/// Mutable state of a single build.
struct BuildPass<'a> {
    description: &'a SceneDescription,
    config: &'a SceneConfig,
    resolver: MaterialResolver<'a>,
    /// Ids of the nodes currently being built, outermost first.
    ancestors: Vec<String>,
}

impl<'a> BuildPass<'a> {
    fn build_node(&mut self, id: &str, parent: &InheritedContext) -> Result<RenderNode, GraphError> {
        if self.ancestors.iter().any(|ancestor| ancestor == id) {
            return Err(GraphError::Cycle(id.to_string()));
        }
        let description = self.description;
        let spec = match description.graph.entry(id) {
            Some(GraphEntry::Node(spec)) => spec,
            Some(GraphEntry::Lod(_)) => {
                return Err(GraphError::MalformedEntry {
                    id: id.to_string(),
                    reason: "listed as a node but is of type 'lod'".to_string(),
                })
            }
            Some(GraphEntry::Malformed(reason)) => {
                return Err(GraphError::MalformedEntry {
                    id: id.to_string(),
                    reason: reason.clone(),
                })
            }
            None => return Err(GraphError::MissingNode(id.to_string())),
        };
        log::trace!("Building node '{id}'");

        let context = parent.for_node(spec);
        let mut node = RenderNode::new(id);
        node.material_ref = context.material_ref.clone();
        node.cast_shadow = context.cast_shadow;
        node.receive_shadow = context.receive_shadow;

        self.ancestors.push(id.to_string());
        if let Some(children) = &spec.children {
            for child_id in &children.nodes_list {
                match self.build_node(child_id, &context) {
                    Ok(child) => node.children.push(SceneObject::Node(child)),
                    Err(err) => log::error!("In node '{id}': {err}"),
                }
            }
            for lod_id in &children.lods_list {
                match self.build_lod(lod_id, &context) {
                    Ok(lod) => node.children.push(SceneObject::Lod(lod)),
                    Err(err) => log::error!("In node '{id}': {err}"),
                }
            }
            for (name, child) in &children.inline {
                match child {
                    Lenient::Valid(child) => {
                        if let Some(object) = self.build_inline(name, child, &context) {
                            node.children.push(object);
                        }
                    }
                    Lenient::Invalid { kind, reason } => log::warn!(
                        "Skipping child '{name}' of node '{id}' (type {kind:?}): {reason}"
                    ),
                }
            }
        }
        self.ancestors.pop();

        for step in &spec.transforms {
            match step {
                Lenient::Valid(step) => node.transform.apply(step),
                Lenient::Invalid { kind, reason } => {
                    log::warn!("Ignoring transform of node '{id}' (type {kind:?}): {reason}")
                }
            }
        }

        log::debug!("Built node '{id}' with {} children", node.children.len());
        Ok(node)
    }

    fn build_lod(&mut self, id: &str, context: &InheritedContext) -> Result<Lod, GraphError> {
        let description = self.description;
        let spec: &LodSpec = match description.graph.entry(id) {
            Some(GraphEntry::Lod(spec)) => spec,
            Some(GraphEntry::Node(_)) => return Err(GraphError::NotALod(id.to_string())),
            Some(GraphEntry::Malformed(reason)) => {
                return Err(GraphError::MalformedEntry {
                    id: id.to_string(),
                    reason: reason.clone(),
                })
            }
            None => return Err(GraphError::MissingNode(id.to_string())),
        };
        let level_specs = match &spec.lod_nodes {
            Some(levels) if !levels.is_empty() => levels,
            _ => return Err(GraphError::MalformedLod(id.to_string())),
        };

        let mut levels = Vec::with_capacity(level_specs.len());
        for level in level_specs {
            if level.node_id == self.config.empty_lod_id {
                levels.push(LodLevel {
                    min_distance: level.mindist,
                    object: None,
                });
                continue;
            }
            match self.build_node(&level.node_id, context) {
                Ok(mut object) => {
                    object.cast_shadow = context.cast_shadow;
                    object.receive_shadow = context.receive_shadow;
                    levels.push(LodLevel {
                        min_distance: level.mindist,
                        object: Some(object),
                    });
                }
                Err(GraphError::MissingNode(node)) => log::error!(
                    "{}",
                    GraphError::MissingLodTarget {
                        lod: id.to_string(),
                        node,
                    }
                ),
                Err(err) => log::error!("In LOD '{id}': {err}"),
            }
        }

        log::debug!("Built LOD '{id}' with {} levels", levels.len());
        Ok(Lod::new(id, levels))
    }

    fn build_inline(
        &mut self,
        name: &str,
        child: &ChildSpec,
        context: &InheritedContext,
    ) -> Option<SceneObject> {
        let mesh = match child {
            ChildSpec::Rectangle(spec) => build_rectangle(spec),
            ChildSpec::Triangle(spec) => build_triangle(spec),
            ChildSpec::Box(spec) => build_box(spec),
            ChildSpec::Cylinder(spec) => build_cylinder(spec),
            ChildSpec::Sphere(spec) => build_sphere(spec),
            ChildSpec::Nurbs(spec) => build_nurbs(spec),
            ChildSpec::Polygon(spec) => {
                let surface = ShadedSurface::Unlit(UnlitMaterial {
                    vertex_colors: true,
                    wireframe: true,
                    ..Default::default()
                });
                return match build_polygon(spec) {
                    Ok(mesh) => Some(self.mesh_instance(name, mesh, surface, context)),
                    Err(err) => {
                        log::error!("Skipping polygon '{name}': {err}");
                        None
                    }
                };
            }
            ChildSpec::PointLight(spec) => return self.light(name, build_point_light(spec)),
            ChildSpec::SpotLight(spec) => return self.light(name, build_spot_light(spec)),
            ChildSpec::DirectionalLight(spec) => {
                return self.light(name, build_directional_light(spec))
            }
        };

        let mesh = match mesh {
            Ok(mesh) => mesh,
            Err(err) => {
                log::error!("Skipping primitive '{name}': {err}");
                return None;
            }
        };
        match self.resolver.resolve_material(context.material_ref.as_deref()) {
            Ok(surface) => Some(self.mesh_instance(name, mesh, surface, context)),
            Err(err) => {
                log::error!("Skipping primitive '{name}': {err}");
                None
            }
        }
    }

    fn mesh_instance(
        &self,
        name: &str,
        mesh: Mesh,
        material: ShadedSurface,
        context: &InheritedContext,
    ) -> SceneObject {
        SceneObject::Mesh(MeshInstance {
            name: name.to_string(),
            mesh: AssetHandle::new(mesh),
            material,
            cast_shadow: context.cast_shadow,
            receive_shadow: context.receive_shadow,
        })
    }

    fn light<E: fmt::Display>(
        &self,
        name: &str,
        light: Result<LightType, E>,
    ) -> Option<SceneObject> {
        match light {
            Ok(light) => Some(SceneObject::Light(LightInstance {
                name: name.to_string(),
                light,
            })),
            Err(err) => {
                log::error!("Skipping light '{name}': {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SceneDocument;
    use serde_json::{json, Value};

    fn build(value: Value) -> Result<SceneGraph, GraphError> {
        let doc = SceneDocument::from_value(value).unwrap();
        GraphBuilder::new(&doc.description, &SceneConfig::default()).build()
    }

    #[test]
    fn test_missing_root_is_fatal() {
        assert_eq!(
            build(json!({ "graph": { "scene": {} } })).unwrap_err(),
            GraphError::MissingRoot(None)
        );
        assert_eq!(
            build(json!({ "graph": { "rootid": "scene" } })).unwrap_err(),
            GraphError::MissingRoot(Some("scene".into()))
        );
    }

    #[test]
    fn test_context_inheritance() {
        let parent = InheritedContext {
            material_ref: Some("wood".into()),
            cast_shadow: true,
            receive_shadow: false,
        };
        let plain: NodeSpec = serde_json::from_value(json!({})).unwrap();
        assert_eq!(parent.for_node(&plain), parent);

        let own: NodeSpec = serde_json::from_value(json!({
            "materialref": { "materialId": "stone" },
            "castshadows": false,
            "receiveshadows": true
        }))
        .unwrap();
        let child = parent.for_node(&own);
        assert_eq!(child.material_ref.as_deref(), Some("stone"));
        assert!(!child.cast_shadow);
        assert!(child.receive_shadow);
    }

    #[test]
    fn test_cycle_is_skipped() {
        let graph = build(json!({
            "graph": {
                "rootid": "a",
                "a": { "children": { "nodesList": ["b"] } },
                "b": { "children": { "nodesList": ["a"] } }
            }
        }))
        .unwrap();
        let b = graph.get_node("b").unwrap();
        assert!(b.children.is_empty());
        assert_eq!(graph.stats().nodes, 2);
    }

    #[test]
    fn test_failed_children_do_not_abort_siblings() {
        let graph = build(json!({
            "graph": {
                "rootid": "root",
                "root": {
                    "children": {
                        "nodesList": ["ghost", "leaf"],
                        "lodsList": ["leaf"],
                        "bad_box": { "type": "box", "xyz1": { "x": 0, "y": 0, "z": 0 },
                                     "xyz2": { "x": -1, "y": 2, "z": 3 } },
                        "mystery": { "type": "teapot" },
                        "lamp": { "type": "pointlight" },
                        "tri": { "type": "triangle",
                                 "xyz1": { "x": 0, "y": 0, "z": 0 },
                                 "xyz2": { "x": 1, "y": 0, "z": 0 },
                                 "xyz3": { "x": 0, "y": 1, "z": 0 } }
                    }
                },
                "leaf": {}
            }
        }))
        .unwrap();
        let names: Vec<&str> = graph.root().children.iter().map(SceneObject::name).collect();
        assert_eq!(names, vec!["leaf", "tri"]);
    }

    #[test]
    fn test_unknown_material_drops_mesh() {
        let graph = build(json!({
            "graph": {
                "rootid": "root",
                "root": {
                    "materialref": { "materialId": "nope" },
                    "children": { "s": { "type": "sphere", "radius": 1, "slices": 4, "stacks": 4 } }
                }
            }
        }))
        .unwrap();
        assert_eq!(graph.stats().meshes, 0);
    }

    #[test]
    fn test_polygon_gets_vertex_colour_wireframe() {
        let graph = build(json!({
            "graph": {
                "rootid": "root",
                "root": {
                    "materialref": { "materialId": "ignored" },
                    "children": {
                        "disc": { "type": "polygon", "radius": 1, "stacks": 1, "slices": 3,
                                  "color_c": { "r": 1, "g": 1, "b": 1 },
                                  "color_p": { "r": 0, "g": 0, "b": 0 } }
                    }
                }
            }
        }))
        .unwrap();
        let disc = graph.root().meshes().next().unwrap();
        match &disc.material {
            ShadedSurface::Unlit(m) => assert!(m.vertex_colors && m.wireframe),
            other => panic!("unexpected surface {other:?}"),
        }
    }

    #[test]
    fn test_update_lods_uses_world_position() {
        let mut graph = build(json!({
            "graph": {
                "rootid": "root",
                "root": {
                    "transforms": [{ "type": "translate", "amount": { "x": 100, "y": 0, "z": 0 } }],
                    "children": { "lodsList": ["tree"] }
                },
                "tree": { "type": "lod", "lodNodes": [
                    { "nodeId": "far", "mindist": 50 },
                    { "nodeId": "near", "mindist": 0 }
                ] },
                "near": {},
                "far": {}
            }
        }))
        .unwrap();

        graph.update_lods(Vec3::ZERO);
        let lod = graph.root().lods().next().unwrap();
        assert_eq!(lod.active_object().map(|n| n.name.as_str()), Some("far"));

        graph.update_lods(Vec3::new(95.0, 0.0, 0.0));
        let lod = graph.root().lods().next().unwrap();
        assert_eq!(lod.active_object().map(|n| n.name.as_str()), Some("near"));
    }

    #[test]
    fn test_get_node_unknown_name() {
        let mut graph = build(json!({ "graph": { "rootid": "root", "root": {} } })).unwrap();
        assert!(graph.get_node("root").is_some());
        assert!(graph.get_node("missing").is_none());
        assert!(graph.get_node_mut("missing").is_none());
    }

    #[test]
    fn test_node_edits_keep_lookups_valid() {
        let mut graph = build(json!({
            "graph": {
                "rootid": "root",
                "root": { "children": { "nodesList": ["a", "b"] } },
                "a": { "children": { "light": {
                    "type": "pointlight",
                    "color": { "r": 1, "g": 1, "b": 1 },
                    "position": { "x": 0, "y": 0, "z": 0 }
                } } },
                "b": {}
            }
        }))
        .unwrap();

        {
            let mut a = graph.get_node_mut("a").unwrap();
            a.transform_mut().translation = Vec3::new(1.0, 2.0, 3.0);
            a.set_cast_shadow(true);
            assert_eq!(a.lights_mut().count(), 1);
            assert_eq!(a.name, "a");
        }

        let a = graph.get_node("a").unwrap();
        assert_eq!(a.transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert!(a.cast_shadow);
        assert_eq!(graph.get_node("b").map(|n| n.name.as_str()), Some("b"));
    }
}
