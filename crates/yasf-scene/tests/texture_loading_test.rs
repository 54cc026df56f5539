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

//! Integration tests for asynchronous texture and mipmap loading.

use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use yasf_core::renderer::{DecodedImage, ShadedSurface};
use yasf_scene::document::SceneDocument;
use yasf_scene::texture_loader::{ImageSource, LoadTarget, TextureLoader};
use yasf_scene::{SceneAssembler, SceneConfig, TextureError};

/// Serves a tiny image for any path except those containing "missing",
/// recording every request.
#[derive(Default)]
struct RecordingSource {
    requested: Mutex<Vec<PathBuf>>,
}

impl ImageSource for RecordingSource {
    fn load(&self, path: &Path) -> Result<DecodedImage, TextureError> {
        self.requested
            .lock()
            .unwrap()
            .push(path.to_path_buf());
        if path.to_string_lossy().contains("missing") {
            return Err(TextureError::Fetch {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(DecodedImage::new(2, 2, vec![128; 16]).unwrap())
    }
}

fn document() -> SceneDocument {
    SceneDocument::from_value(json!({
        "yasf": {
            "materials": {
                "wood": { "textureref": "wood_tex", "texlength_s": 4, "texlength_t": 2 },
                "tv": { "textureref": "clip" },
                "rust": { "textureref": "broken" }
            },
            "textures": {
                "wood_tex": {
                    "filepath": "wood.png",
                    "mipmap0": "wood_0.png",
                    "mipmap1": "wood_1.png",
                    "mipmap3": "wood_3.png"
                },
                "clip": { "filepath": "clip.mp4", "isVideo": true },
                "broken": { "filepath": "missing.png" }
            },
            "graph": {
                "rootid": "root",
                "root": { "children": { "nodesList": ["floor", "screen", "pipe"] } },
                "floor": {
                    "materialref": { "materialId": "wood" },
                    "children": {
                        "a": { "type": "rectangle", "xy1": { "x": 0, "y": 0 }, "xy2": { "x": 1, "y": 1 } },
                        "b": { "type": "rectangle", "xy1": { "x": 1, "y": 0 }, "xy2": { "x": 2, "y": 1 } }
                    }
                },
                "screen": {
                    "materialref": { "materialId": "tv" },
                    "children": {
                        "panel": { "type": "rectangle", "xy1": { "x": 0, "y": 0 }, "xy2": { "x": 1, "y": 1 } }
                    }
                },
                "pipe": {
                    "materialref": { "materialId": "rust" },
                    "children": {
                        "p": { "type": "cylinder", "base": 1, "top": 1, "height": 2, "slices": 6, "stacks": 1 }
                    }
                }
            }
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn test_mipmap_discovery_stops_at_first_gap() {
    let source = Arc::new(RecordingSource::default());
    let loader = TextureLoader::new(Handle::current(), source.clone());
    let config = SceneConfig::default();
    let doc = document();

    let scene = SceneAssembler::new(&config)
        .with_loader(&loader)
        .assemble(&doc)
        .unwrap();

    // wood base + two mipmaps + broken base; the video is never fetched.
    assert_eq!(scene.pending.len(), 4);
    let targets: Vec<LoadTarget> = scene
        .pending
        .iter()
        .filter(|task| task.texture_id() == "wood_tex")
        .map(|task| task.target())
        .collect();
    assert_eq!(
        targets,
        vec![LoadTarget::Base, LoadTarget::Mipmap(0), LoadTarget::Mipmap(1)]
    );

    let floor = scene.graph.get_node("floor").unwrap();
    let meshes: Vec<_> = floor.meshes().collect();
    let texture = match &meshes[0].material {
        ShadedSurface::Phong(m) => m.map.as_ref().unwrap().texture.clone(),
        other => panic!("expected phong, got {other:?}"),
    };
    // Both rectangles share one texture.
    match &meshes[1].material {
        ShadedSurface::Phong(m) => {
            assert!(yasf_core::asset::AssetHandle::ptr_eq(
                &texture,
                &m.map.as_ref().unwrap().texture
            ))
        }
        other => panic!("expected phong, got {other:?}"),
    }

    let results = scene.pending.wait_all().await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(TextureError::Fetch { .. }))));

    assert!(texture.is_loaded());
    assert!(!texture.generate_mipmaps);
    assert_eq!(texture.mipmap_slot_count(), 2);
    assert_eq!(texture.loaded_mipmap_levels(), vec![0, 1]);

    let requested = source.requested.lock().unwrap();
    assert!(!requested.iter().any(|p| p.ends_with("wood_3.png")));
    assert!(!requested.iter().any(|p| p.ends_with("clip.mp4")));
}

#[tokio::test]
async fn test_failed_load_leaves_texture_empty() {
    let loader = TextureLoader::new(Handle::current(), Arc::new(RecordingSource::default()));
    let config = SceneConfig::default();
    let doc = document();
    let scene = SceneAssembler::new(&config)
        .with_loader(&loader)
        .assemble(&doc)
        .unwrap();

    let pipe = scene.graph.get_node("pipe").unwrap();
    let texture = match &pipe.meshes().next().unwrap().material {
        ShadedSurface::Phong(m) => m.map.as_ref().unwrap().texture.clone(),
        other => panic!("expected phong, got {other:?}"),
    };
    scene.pending.wait_all().await;
    assert!(!texture.is_loaded());
}

#[test]
fn test_build_without_loader_issues_nothing() {
    let config = SceneConfig::default();
    let scene = SceneAssembler::new(&config).assemble(&document()).unwrap();
    assert!(scene.pending.is_empty());
    assert_eq!(scene.graph.stats().meshes, 4);
}
