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

//! Renderer-facing resource descriptions produced by a scene build.
//!
//! Nothing in this module talks to a GPU. These are the CPU-side descriptions
//! (meshes, shaded surfaces, textures and lights) that an external rendering
//! layer consumes.

pub mod light;
pub mod material;
pub mod mesh;
pub mod texture;

pub use self::light::{DirectionalLight, LightType, PointLight, ShadowFrustum, ShadowSettings, SpotLight};
pub use self::material::{PhongMaterial, ShadedSurface, Side, TextureBinding, UnlitMaterial};
pub use self::mesh::Mesh;
pub use self::texture::{
    ColorSpace, DecodedImage, FilterMode, Texture, TextureSource, VideoSource, WrapMode,
};
