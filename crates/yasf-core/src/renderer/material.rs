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

//! Defines the shaded-surface descriptions attached to meshes.

use super::texture::{Texture, WrapMode};
use crate::{
    asset::AssetHandle,
    math::{LinearRgba, Vec2},
};

/// Which faces of a surface are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Only counter-clockwise (front) faces.
    #[default]
    Front,
    /// Both faces.
    Double,
}

/// A texture bound to a material slot, with per-material sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    /// The shared texture object.
    pub texture: AssetHandle<Texture>,
    /// Wrapping along U.
    pub wrap_s: WrapMode,
    /// Wrapping along V.
    pub wrap_t: WrapMode,
    /// How many times the texture repeats across the surface on each axis.
    pub repeat: Vec2,
}

impl TextureBinding {
    /// Binds a texture with the given repeat factors and repeat wrapping.
    pub fn repeating(texture: AssetHandle<Texture>, repeat: Vec2) -> Self {
        Self {
            texture,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            repeat,
        }
    }

    /// Binds a texture with default sampling (clamped, no repeat).
    pub fn plain(texture: AssetHandle<Texture>) -> Self {
        Self {
            texture,
            wrap_s: WrapMode::ClampToEdge,
            wrap_t: WrapMode::ClampToEdge,
            repeat: Vec2::ONE,
        }
    }
}

/// A lit Blinn-Phong surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    /// Diffuse colour.
    pub color: LinearRgba,
    /// Emitted colour, unaffected by lighting.
    pub emissive: LinearRgba,
    /// Specular highlight colour.
    pub specular: LinearRgba,
    /// Specular exponent.
    pub shininess: f32,
    /// Whether the surface is alpha blended.
    pub transparent: bool,
    /// Opacity used when `transparent` is set.
    pub opacity: f32,
    /// Rendered faces.
    pub side: Side,
    /// Render edges only.
    pub wireframe: bool,
    /// Diffuse colour map.
    pub map: Option<TextureBinding>,
    /// Bump map.
    pub bump_map: Option<TextureBinding>,
    /// Strength of the bump map.
    pub bump_scale: f32,
    /// Identifier of a specular map, carried through for the renderer.
    pub specular_ref: Option<String>,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            emissive: LinearRgba::BLACK,
            specular: LinearRgba::rgb(0.067, 0.067, 0.067),
            shininess: 30.0,
            transparent: false,
            opacity: 1.0,
            side: Side::Front,
            wireframe: false,
            map: None,
            bump_map: None,
            bump_scale: 1.0,
            specular_ref: None,
        }
    }
}

/// A surface that ignores lighting.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlitMaterial {
    /// Base colour, multiplied with vertex colours when enabled.
    pub color: LinearRgba,
    /// Rendered faces.
    pub side: Side,
    /// Use the mesh's per-vertex colours.
    pub vertex_colors: bool,
    /// Render edges only.
    pub wireframe: bool,
}

impl Default for UnlitMaterial {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            side: Side::Front,
            vertex_colors: false,
            wireframe: false,
        }
    }
}

/// A resolved surface description, ready to be attached to a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum ShadedSurface {
    /// Lit surface.
    Phong(PhongMaterial),
    /// Unlit surface.
    Unlit(UnlitMaterial),
}

impl ShadedSurface {
    /// Rendered faces of the surface.
    pub fn side(&self) -> Side {
        match self {
            ShadedSurface::Phong(m) => m.side,
            ShadedSurface::Unlit(m) => m.side,
        }
    }

    /// Iterates every texture the surface samples.
    pub fn textures(&self) -> impl Iterator<Item = &AssetHandle<Texture>> + '_ {
        let bindings: [Option<&TextureBinding>; 2] = match self {
            ShadedSurface::Phong(m) => [m.map.as_ref(), m.bump_map.as_ref()],
            ShadedSurface::Unlit(_) => [None, None],
        };
        bindings.into_iter().flatten().map(|b| &b.texture)
    }
}
