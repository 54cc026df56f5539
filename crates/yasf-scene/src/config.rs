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

//! Build settings that are not part of the scene document itself.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings applied to every scene build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory that relative texture and video paths are resolved against.
    /// `None` leaves them relative to the working directory.
    pub asset_root: Option<PathBuf>,
    /// LOD node id meaning "render nothing at this distance".
    pub empty_lod_id: String,
    /// Colour of the fallback material, packed as `0xRRGGBB`.
    pub default_color: u32,
    /// Presentation width of video textures, in pixels.
    pub video_width: u32,
    /// Presentation height of video textures, in pixels.
    pub video_height: u32,
    /// MIME type announced for video sources.
    pub video_mime_type: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: None,
            empty_lod_id: "empty_lod".to_string(),
            default_color: 0x808080,
            video_width: 640,
            video_height: 264,
            video_mime_type: "video/mp4".to_string(),
        }
    }
}

impl SceneConfig {
    /// Load the configuration from a JSON string. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Save the configuration to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves a path from the document against [`SceneConfig::asset_root`].
    pub fn resolve_asset_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.asset_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
