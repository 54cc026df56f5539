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

//! Top-level scene assembly: globals, cameras and the render tree.

use crate::builder::{GraphBuilder, SceneGraph};
use crate::config::SceneConfig;
use crate::document::{CamerasSpec, GlobalsSpec, Lenient, SceneDocument};
use crate::error::{GraphError, SceneError};
use crate::texture_loader::{PendingLoads, TextureLoader};
use std::path::{Path, PathBuf};
use yasf_core::math::{LinearRgba, Vec3};

/// Scene-wide ambient light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Light colour.
    pub color: LinearRgba,
    /// Intensity multiplier.
    pub intensity: f32,
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Fog colour.
    pub color: LinearRgba,
    /// Distance where fog starts.
    pub near: f32,
    /// Distance where fog is opaque.
    pub far: f32,
}

/// Image paths of the six faces of a skybox.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxFaces {
    /// +Z face.
    pub front: PathBuf,
    /// -Z face.
    pub back: PathBuf,
    /// +Y face.
    pub up: PathBuf,
    /// -Y face.
    pub down: PathBuf,
    /// -X face.
    pub left: PathBuf,
    /// +X face.
    pub right: PathBuf,
}

/// An emissive box surrounding the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Skybox {
    /// Box extents.
    pub size: Vec3,
    /// Box centre.
    pub center: Vec3,
    /// Emissive tint.
    pub emissive: LinearRgba,
    /// Emissive intensity.
    pub intensity: f32,
    /// Face images, resolved against the asset root.
    pub faces: SkyboxFaces,
}

/// Global rendering settings of a scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Globals {
    /// Clear colour.
    pub background: Option<LinearRgba>,
    /// Ambient light.
    pub ambient: Option<AmbientLight>,
    /// Fog.
    pub fog: Option<Fog>,
    /// Skybox.
    pub skybox: Option<Skybox>,
}

fn valid<'s, T>(entry: &'s Option<Lenient<T>>, section: &str) -> Option<&'s T> {
    match entry.as_ref()? {
        Lenient::Valid(value) => Some(value),
        Lenient::Invalid { reason, .. } => {
            log::warn!("Ignoring malformed globals.{section}: {reason}");
            None
        }
    }
}

impl Globals {
    /// Builds the descriptors, skipping malformed sections.
    pub fn from_spec(spec: &GlobalsSpec, config: &SceneConfig) -> Self {
        Self {
            background: valid(&spec.background, "background").map(|&c| c.into()),
            ambient: valid(&spec.ambient, "ambient").map(|a| AmbientLight {
                color: LinearRgba::rgb(a.r, a.g, a.b),
                intensity: a.intensity.unwrap_or(1.0),
            }),
            fog: valid(&spec.fog, "fog").map(|f| Fog {
                color: f.color.into(),
                near: f.near.unwrap_or(1.0),
                far: f.far.unwrap_or(100.0),
            }),
            skybox: valid(&spec.skybox, "skybox").map(|s| Skybox {
                size: s.size.into(),
                center: s.center.into(),
                emissive: s.emissive.into(),
                intensity: s.intensity.unwrap_or(1.0),
                faces: SkyboxFaces {
                    front: config.resolve_asset_path(&s.front),
                    back: config.resolve_asset_path(&s.back),
                    up: config.resolve_asset_path(&s.up),
                    down: config.resolve_asset_path(&s.down),
                    left: config.resolve_asset_path(&s.left),
                    right: config.resolve_asset_path(&s.right),
                },
            }),
        }
    }
}

/// Camera projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in degrees.
        fov_degrees: f32,
        /// Width over height.
        aspect: f32,
        /// Near plane.
        near: f32,
        /// Far plane.
        far: f32,
    },
    /// Orthographic projection.
    Orthographic {
        /// Left plane.
        left: f32,
        /// Right plane.
        right: f32,
        /// Top plane.
        top: f32,
        /// Bottom plane.
        bottom: f32,
        /// Near plane.
        near: f32,
        /// Far plane.
        far: f32,
    },
}

/// A named camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera id.
    pub id: String,
    /// Projection settings.
    pub projection: Projection,
    /// Camera position.
    pub location: Vec3,
    /// Look-at point.
    pub target: Vec3,
}

/// Every camera of a scene plus the one active at start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cameras {
    cameras: Vec<Camera>,
    initial: Option<String>,
}

impl Cameras {
    /// Builds the descriptors, skipping malformed cameras.
    ///
    /// An `initial` id that names no camera is logged and dropped.
    pub fn from_spec(spec: &CamerasSpec) -> Self {
        let mut cameras = Vec::with_capacity(spec.cameras.len());
        for (id, entry) in &spec.cameras {
            let camera = match entry {
                Lenient::Valid(camera) => camera,
                Lenient::Invalid { reason, .. } => {
                    log::warn!("Ignoring malformed camera '{id}': {reason}");
                    continue;
                }
            };
            let near = camera.near.unwrap_or(1.0);
            let far = camera.far.unwrap_or(1000.0);
            let projection = if camera.kind == "perspective" {
                Projection::Perspective {
                    fov_degrees: camera.angle.unwrap_or(45.0),
                    aspect: camera.aspect.unwrap_or(1.0),
                    near,
                    far,
                }
            } else {
                Projection::Orthographic {
                    left: camera.left.unwrap_or(-1.0),
                    right: camera.right.unwrap_or(1.0),
                    top: camera.top.unwrap_or(1.0),
                    bottom: camera.bottom.unwrap_or(-1.0),
                    near,
                    far,
                }
            };
            cameras.push(Camera {
                id: id.clone(),
                projection,
                location: camera.location.map_or(Vec3::ZERO, Into::into),
                target: camera.target.map_or(Vec3::ZERO, Into::into),
            });
        }

        let initial = spec.initial.clone().filter(|initial| {
            let known = cameras.iter().any(|c| &c.id == initial);
            if !known {
                log::warn!("Initial camera '{initial}' is not defined; ignoring it");
            }
            known
        });
        Self { cameras, initial }
    }

    /// Cameras in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.iter()
    }

    /// Number of cameras.
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Returns `true` when no camera is defined.
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Looks up a camera by id.
    pub fn get(&self, id: &str) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    /// The camera active at start, if a valid one was named.
    pub fn initial(&self) -> Option<&Camera> {
        self.initial.as_deref().and_then(|id| self.get(id))
    }
}

/// A fully assembled scene.
#[derive(Debug)]
pub struct Scene {
    /// Global rendering settings.
    pub globals: Globals,
    /// Camera descriptors.
    pub cameras: Cameras,
    /// The render tree.
    pub graph: SceneGraph,
    /// Texture loads issued while building the tree.
    pub pending: PendingLoads,
}

/// Feeds each section of a document to its builder.
#[derive(Debug, Clone)]
pub struct SceneAssembler<'a> {
    config: &'a SceneConfig,
    loader: Option<&'a TextureLoader>,
}

impl<'a> SceneAssembler<'a> {
    /// Creates an assembler that issues no texture loads.
    pub fn new(config: &'a SceneConfig) -> Self {
        Self {
            config,
            loader: None,
        }
    }

    /// Issues texture loads through `loader`.
    pub fn with_loader(mut self, loader: &'a TextureLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Assembles a parsed document. Fails only when the graph has no usable root.
    pub fn assemble(&self, document: &SceneDocument) -> Result<Scene, GraphError> {
        let globals = document
            .globals
            .as_ref()
            .map(|spec| Globals::from_spec(spec, self.config))
            .unwrap_or_default();
        let cameras = document
            .cameras
            .as_ref()
            .map(Cameras::from_spec)
            .unwrap_or_default();

        let mut builder = GraphBuilder::new(&document.description, self.config);
        if let Some(loader) = self.loader {
            builder = builder.with_loader(loader);
        }
        let (graph, pending) = builder.build_with_loads()?;
        Ok(Scene {
            globals,
            cameras,
            graph,
            pending,
        })
    }

    /// Reads, decodes and assembles a document file.
    pub fn assemble_file(&self, path: impl AsRef<Path>) -> Result<Scene, SceneError> {
        let document = SceneDocument::from_file(path)?;
        Ok(self.assemble(&document)?)
    }
}
