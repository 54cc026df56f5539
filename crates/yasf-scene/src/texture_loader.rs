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

//! Asynchronous texture loading.
//!
//! Loads never block the graph build: each one runs as a blocking task on a
//! tokio runtime, decodes its image and installs it into its own slot of the
//! target [`Texture`]. Failures are logged by the task and leave the slot
//! empty. Handles to every issued load are gathered in [`PendingLoads`] so the
//! caller can await them, or drop them to let the loads finish detached.

use crate::error::TextureError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use yasf_core::asset::AssetHandle;
use yasf_core::renderer::{DecodedImage, Texture};

/// Provides decoded image data for a path.
pub trait ImageSource: Send + Sync {
    /// Fetches and decodes the image at `path` into RGBA8 pixels.
    fn load(&self, path: &Path) -> Result<DecodedImage, TextureError>;
}

/// Decodes an in-memory encoded image into RGBA8 pixels.
pub fn decode_image(path: &Path, bytes: &[u8]) -> Result<DecodedImage, TextureError> {
    let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Reads images from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn load(&self, path: &Path) -> Result<DecodedImage, TextureError> {
        let bytes = std::fs::read(path).map_err(|source| TextureError::Fetch {
            path: path.to_path_buf(),
            source,
        })?;
        decode_image(path, &bytes)
    }
}

/// Which slot of a texture a load fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    /// The base image.
    Base,
    /// A custom mipmap level.
    Mipmap(usize),
}

/// A single in-flight texture load.
#[derive(Debug)]
pub struct LoadTask {
    texture_id: String,
    path: PathBuf,
    target: LoadTarget,
    handle: JoinHandle<Result<(), TextureError>>,
}

impl LoadTask {
    /// Id of the texture being filled.
    pub fn texture_id(&self) -> &str {
        &self.texture_id
    }

    /// Path being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The slot this load fills.
    pub fn target(&self) -> LoadTarget {
        self.target
    }

    /// Returns `true` once the load has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the load to finish.
    pub async fn wait(self) -> Result<(), TextureError> {
        match self.handle.await {
            Ok(result) => result,
            Err(join_error) => Err(TextureError::Task {
                path: self.path,
                reason: join_error.to_string(),
            }),
        }
    }
}

/// Every load issued while building one scene.
#[derive(Debug, Default)]
pub struct PendingLoads {
    tasks: Vec<LoadTask>,
}

impl PendingLoads {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task.
    pub fn push(&mut self, task: LoadTask) {
        self.tasks.push(task);
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no load was issued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterates over the tracked tasks.
    pub fn iter(&self) -> impl Iterator<Item = &LoadTask> {
        self.tasks.iter()
    }

    /// Waits for every task, returning their results in issue order.
    pub async fn wait_all(self) -> Vec<Result<(), TextureError>> {
        let mut results = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            results.push(task.wait().await);
        }
        results
    }
}

/// Issues texture loads on a tokio runtime.
#[derive(Clone)]
pub struct TextureLoader {
    handle: Handle,
    source: Arc<dyn ImageSource>,
}

impl fmt::Debug for TextureLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureLoader").finish_non_exhaustive()
    }
}

impl TextureLoader {
    /// Creates a loader that spawns onto `handle` and reads through `source`.
    pub fn new(handle: Handle, source: Arc<dyn ImageSource>) -> Self {
        Self { handle, source }
    }

    /// Creates a loader that reads from the filesystem.
    pub fn from_files(handle: Handle) -> Self {
        Self::new(handle, Arc::new(FileImageSource))
    }

    /// Creates a filesystem loader on the runtime of the calling context.
    ///
    /// Returns `None` outside of a tokio runtime.
    pub fn from_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_files)
    }

    /// Loads the base image of `texture`.
    pub fn load_base(&self, texture: &AssetHandle<Texture>, path: PathBuf) -> LoadTask {
        self.spawn(texture, path, LoadTarget::Base)
    }

    /// Loads one custom mipmap level of `texture`.
    pub fn load_mipmap(&self, texture: &AssetHandle<Texture>, level: usize, path: PathBuf) -> LoadTask {
        self.spawn(texture, path, LoadTarget::Mipmap(level))
    }

    fn spawn(&self, texture: &AssetHandle<Texture>, path: PathBuf, target: LoadTarget) -> LoadTask {
        let source = Arc::clone(&self.source);
        let slot = texture.clone();
        let task_path = path.clone();
        log::trace!("Issuing {target:?} load of '{}' for texture '{}'", path.display(), texture.id);

        let handle = self.handle.spawn_blocking(move || {
            let image = source.load(&task_path).map_err(|err| {
                log::error!("Texture '{}': {err}", slot.id);
                err
            })?;
            match target {
                LoadTarget::Base => slot.install_image(image),
                LoadTarget::Mipmap(level) => {
                    if !slot.install_mipmap(level, image) {
                        log::warn!("Texture '{}' has no mipmap slot {level}", slot.id);
                    }
                }
            }
            log::debug!("Loaded '{}' into texture '{}'", task_path.display(), slot.id);
            Ok(())
        });

        LoadTask {
            texture_id: texture.id.clone(),
            path,
            target,
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Serves a 1x1 image for known paths and fails for everything else.
    struct MemorySource(HashSet<PathBuf>);

    impl ImageSource for MemorySource {
        fn load(&self, path: &Path) -> Result<DecodedImage, TextureError> {
            if self.0.contains(path) {
                Ok(DecodedImage {
                    width: 1,
                    height: 1,
                    pixels: vec![255; 4],
                })
            } else {
                Err(TextureError::Fetch {
                    path: path.to_path_buf(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }
        }
    }

    fn loader(known: &[&str]) -> TextureLoader {
        let paths = known.iter().map(PathBuf::from).collect();
        TextureLoader::new(Handle::current(), Arc::new(MemorySource(paths)))
    }

    #[tokio::test]
    async fn test_base_image_is_installed() {
        let texture = AssetHandle::new(Texture::image("wood", "wood.png"));
        let task = loader(&["wood.png"]).load_base(&texture, PathBuf::from("wood.png"));
        assert_eq!(task.target(), LoadTarget::Base);
        assert_eq!(task.texture_id(), "wood");
        task.wait().await.unwrap();
        assert_eq!(texture.dimensions(), Some((1, 1)));
    }

    #[tokio::test]
    async fn test_failed_load_leaves_slot_empty() {
        let texture = AssetHandle::new(Texture::image_with_mipmaps("wood", "wood.png", 2));
        let loader = loader(&["m0.png"]);
        let mut pending = PendingLoads::new();
        pending.push(loader.load_mipmap(&texture, 0, PathBuf::from("m0.png")));
        pending.push(loader.load_mipmap(&texture, 1, PathBuf::from("missing.png")));
        assert_eq!(pending.len(), 2);

        let results = pending.wait_all().await;
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(TextureError::Fetch { .. })));
        assert_eq!(texture.loaded_mipmap_levels(), vec![0]);
        assert!(!texture.is_loaded());
    }

    #[test]
    fn test_file_source_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let decoded = FileImageSource.load(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);

        let missing = FileImageSource.load(&dir.path().join("nope.png"));
        assert!(matches!(missing, Err(TextureError::Fetch { .. })));
    }

    #[test]
    fn test_from_current_needs_a_runtime() {
        assert!(TextureLoader::from_current().is_none());
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let _guard = runtime.enter();
        assert!(TextureLoader::from_current().is_some());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = decode_image(Path::new("x.png"), b"not an image").unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }
}
