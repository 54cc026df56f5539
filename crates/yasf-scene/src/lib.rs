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

//! # YASF Scene
//!
//! Turns a parsed YASF scene document into a tree of renderable nodes.
//!
//! The [`builder::GraphBuilder`] walks the document's graph table from its
//! root, consulting the geometry and light factories for inline primitives and
//! the [`resolver::MaterialResolver`] for shared materials and textures.
//! [`assembly::SceneAssembler`] wraps it together with the globals and camera
//! sections of the document.

#![warn(missing_docs)]

pub mod assembly;
pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod lights;
pub mod lod;
pub mod node;
pub mod nurbs;
pub mod registry;
pub mod resolver;
pub mod texture_loader;

pub use assembly::{Scene, SceneAssembler};
pub use builder::{GraphBuilder, InheritedContext, NodeMut, SceneGraph, SceneStats};
pub use config::SceneConfig;
pub use document::{SceneDescription, SceneDocument};
pub use error::{
    DocumentError, GeometryError, GraphError, LightError, MaterialError, SceneError, TextureError,
};
