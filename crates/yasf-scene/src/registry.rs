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

//! Name lookup into a built tree.
//!
//! The registry does not own nodes. It records, for every node name, the path
//! of child indices leading to it from the root, and resolves that path on
//! demand. A name that appears more than once keeps the last node registered,
//! in the order the builder finishes nodes (children before their parent).

use crate::node::{RenderNode, SceneObject};
use std::collections::HashMap;

/// One hop from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Index into the parent's `children`.
    pub child: usize,
    /// When the child is a LOD, the level whose node to enter.
    pub level: Option<usize>,
}

/// Maps node names to their position in a tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRegistry {
    paths: HashMap<String, Vec<PathStep>>,
}

impl NodeRegistry {
    /// Indexes every node reachable from `root`, LOD levels included.
    pub fn index(root: &RenderNode) -> Self {
        let mut registry = Self::default();
        let mut path = Vec::new();
        registry.visit(root, &mut path);
        registry
    }

    fn visit(&mut self, node: &RenderNode, path: &mut Vec<PathStep>) {
        for (child_index, child) in node.children.iter().enumerate() {
            match child {
                SceneObject::Node(child_node) => {
                    path.push(PathStep {
                        child: child_index,
                        level: None,
                    });
                    self.visit(child_node, path);
                    path.pop();
                }
                SceneObject::Lod(lod) => {
                    for (level_index, level) in lod.levels().iter().enumerate() {
                        if let Some(level_node) = &level.object {
                            path.push(PathStep {
                                child: child_index,
                                level: Some(level_index),
                            });
                            self.visit(level_node, path);
                            path.pop();
                        }
                    }
                }
                SceneObject::Mesh(_) | SceneObject::Light(_) => {}
            }
        }
        self.register(&node.name, path.clone());
    }

    fn register(&mut self, name: &str, path: Vec<PathStep>) {
        if self.paths.insert(name.to_string(), path).is_some() {
            log::debug!("Node name '{name}' registered more than once; keeping the latest");
        }
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no node is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Path from the root to `name`.
    pub fn path(&self, name: &str) -> Option<&[PathStep]> {
        self.paths.get(name).map(Vec::as_slice)
    }

    /// Resolves `name` against the tree it was built from.
    ///
    /// Returns `None` when the recorded path no longer leads to a node of that
    /// name, which happens if the tree was restructured after indexing.
    pub fn resolve<'a>(&self, root: &'a RenderNode, name: &str) -> Option<&'a RenderNode> {
        self.path(name)?
            .iter()
            .try_fold(root, |node, step| match (node.children.get(step.child)?, step.level) {
                (SceneObject::Node(child), None) => Some(child),
                (SceneObject::Lod(lod), Some(level)) => lod.levels().get(level)?.object.as_ref(),
                _ => None,
            })
            .filter(|node| node.name == name)
    }

    /// Mutable variant of [`NodeRegistry::resolve`].
    pub fn resolve_mut<'a>(&self, root: &'a mut RenderNode, name: &str) -> Option<&'a mut RenderNode> {
        let mut node = root;
        for step in self.path(name)? {
            node = match (node.children.get_mut(step.child)?, step.level) {
                (SceneObject::Node(child), None) => child,
                (SceneObject::Lod(lod), Some(level)) => {
                    lod.level_objects_mut().nth(level)?.as_mut()?
                }
                _ => return None,
            };
        }
        (node.name == name).then_some(node)
    }
}
