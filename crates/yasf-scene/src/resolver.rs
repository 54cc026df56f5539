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

//! Resolves material and texture references against the shared tables of a
//! scene document.

use crate::config::SceneConfig;
use crate::document::{MaterialSpec, SceneDescription, TextureSpec};
use crate::error::{MaterialError, TextureError};
use crate::texture_loader::{PendingLoads, TextureLoader};
use std::collections::HashMap;
use yasf_core::asset::AssetHandle;
use yasf_core::math::{LinearRgba, Vec2};
use yasf_core::renderer::{
    PhongMaterial, ShadedSurface, Side, Texture, TextureBinding, UnlitMaterial, VideoSource,
};

/// Turns material references into [`ShadedSurface`]s for one build.
///
/// Textures are created once per id and shared by every material that samples
/// them. When a [`TextureLoader`] is attached, each new image texture issues
/// its loads immediately; the handles are collected for the caller.
pub struct MaterialResolver<'a> {
    description: &'a SceneDescription,
    config: &'a SceneConfig,
    loader: Option<&'a TextureLoader>,
    textures: HashMap<String, AssetHandle<Texture>>,
    pending: PendingLoads,
}

impl<'a> MaterialResolver<'a> {
    /// Creates a resolver that issues no loads.
    pub fn new(description: &'a SceneDescription, config: &'a SceneConfig) -> Self {
        Self {
            description,
            config,
            loader: None,
            textures: HashMap::new(),
            pending: PendingLoads::new(),
        }
    }

    /// Attaches a loader used for every texture created from now on.
    pub fn with_loader(mut self, loader: &'a TextureLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// The surface used when a node carries no material reference.
    pub fn default_surface(&self) -> ShadedSurface {
        ShadedSurface::Unlit(UnlitMaterial {
            color: LinearRgba::from_hex(self.config.default_color),
            side: Side::Double,
            ..Default::default()
        })
    }

    /// Resolves a material reference.
    ///
    /// `None` yields [`MaterialResolver::default_surface`]. Missing textures are
    /// logged and leave the corresponding map unset.
    pub fn resolve_material(&mut self, material_ref: Option<&str>) -> Result<ShadedSurface, MaterialError> {
        let Some(id) = material_ref else {
            return Ok(self.default_surface());
        };
        let description = self.description;
        let spec = description
            .materials
            .get(id)
            .ok_or_else(|| MaterialError::NotFound(id.to_string()))?;
        Ok(ShadedSurface::Phong(self.phong(spec)))
    }

    fn phong(&mut self, spec: &MaterialSpec) -> PhongMaterial {
        let defaults = PhongMaterial::default();
        let map = spec.textureref.as_deref().and_then(|id| {
            let repeat = Vec2::new(spec.texlength_s.unwrap_or(1.0), spec.texlength_t.unwrap_or(1.0));
            self.texture_or_log(id)
                .map(|texture| TextureBinding::repeating(texture, repeat))
        });
        let bump_map = spec
            .bumpref
            .as_deref()
            .and_then(|id| self.texture_or_log(id))
            .map(TextureBinding::plain);

        PhongMaterial {
            color: spec.color.map_or(defaults.color, Into::into),
            emissive: spec.emissive.map_or(defaults.emissive, Into::into),
            specular: spec.specular.map_or(defaults.specular, Into::into),
            shininess: spec.shininess.unwrap_or(defaults.shininess),
            transparent: spec.transparent.unwrap_or(defaults.transparent),
            opacity: spec.opacity.unwrap_or(defaults.opacity),
            side: if spec.twosided { Side::Double } else { Side::Front },
            wireframe: spec.wireframe.unwrap_or(false),
            map,
            bump_map,
            bump_scale: spec.bumpscale.unwrap_or(defaults.bump_scale),
            specular_ref: spec.specularref.clone(),
        }
    }

    fn texture_or_log(&mut self, id: &str) -> Option<AssetHandle<Texture>> {
        self.resolve_texture(id)
            .map_err(|err| log::error!("{err}"))
            .ok()
    }

    /// Resolves a texture reference, creating the texture on first use.
    pub fn resolve_texture(&mut self, texture_ref: &str) -> Result<AssetHandle<Texture>, TextureError> {
        if let Some(texture) = self.textures.get(texture_ref) {
            return Ok(texture.clone());
        }
        let description = self.description;
        let spec = description
            .textures
            .get(texture_ref)
            .ok_or_else(|| TextureError::NotFound(texture_ref.to_string()))?;

        let texture = AssetHandle::new(self.create_texture(texture_ref, spec));
        self.issue_loads(&texture, spec);
        self.textures.insert(texture_ref.to_string(), texture.clone());
        Ok(texture)
    }

    fn create_texture(&self, id: &str, spec: &TextureSpec) -> Texture {
        let path = self.config.resolve_asset_path(&spec.filepath);
        if spec.is_video {
            return Texture::video(
                id,
                VideoSource {
                    path,
                    mime_type: self.config.video_mime_type.clone(),
                    width: self.config.video_width,
                    height: self.config.video_height,
                    autoplay: true,
                    muted: true,
                    looping: true,
                    preload: true,
                },
            );
        }
        match &spec.mipmaps {
            Some(levels) => Texture::image_with_mipmaps(id, path, levels.len()),
            None => Texture::image(id, path),
        }
    }

    /// Issues the base load, then one load per declared mipmap level.
    ///
    /// Discovery of the levels already stopped at the first gap; the loads
    /// themselves may finish in any order.
    fn issue_loads(&mut self, texture: &AssetHandle<Texture>, spec: &TextureSpec) {
        let Some(loader) = self.loader else {
            return;
        };
        if texture.is_video() {
            return;
        }
        let base = self.config.resolve_asset_path(&spec.filepath);
        self.pending.push(loader.load_base(texture, base));
        for (level, path) in spec.mipmaps.iter().flatten().enumerate() {
            let path = self.config.resolve_asset_path(path);
            self.pending.push(loader.load_mipmap(texture, level, path));
        }
    }

    /// Number of distinct textures created so far.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Loads issued so far.
    pub fn pending(&self) -> &PendingLoads {
        &self.pending
    }

    /// Consumes the resolver, returning every load it issued.
    pub fn into_pending(self) -> PendingLoads {
        self.pending
    }
}
