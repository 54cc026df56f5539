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

//! Defines texture objects and the image data installed into them.
//!
//! A [`Texture`] is created synchronously during a scene build and filled in
//! later by asynchronous load tasks. Its pixel storage is therefore interior
//! mutable: the base image and every custom mipmap level live in their own
//! slot, and a load task only ever writes the slot it was issued for.

use crate::asset::Asset;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An 8-bit RGBA image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixel data, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Creates an image, returning `None` if the pixel buffer has the wrong length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Texture-coordinate wrapping behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Coordinates outside `[0, 1]` are clamped to the edge texel.
    #[default]
    ClampToEdge,
    /// The texture tiles.
    Repeat,
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest texel, no interpolation.
    Nearest,
    /// Bilinear interpolation within one level.
    Linear,
    /// Trilinear interpolation across mipmap levels.
    LinearMipmapLinear,
}

/// Colour space the texel values are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// No transfer function applied.
    #[default]
    Linear,
    /// sRGB-encoded texels.
    Srgb,
}

/// Playback settings of a video-backed texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    /// Path to the video file.
    pub path: PathBuf,
    /// MIME type of the video stream.
    pub mime_type: String,
    /// Presentation width in pixels.
    pub width: u32,
    /// Presentation height in pixels.
    pub height: u32,
    /// Start playing as soon as possible.
    pub autoplay: bool,
    /// Play without audio.
    pub muted: bool,
    /// Restart from the beginning when the end is reached.
    pub looping: bool,
    /// Buffer the whole stream ahead of playback.
    pub preload: bool,
}

/// Where a texture's texels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// A static image file, decoded by a load task.
    Image {
        /// Path to the image file.
        path: PathBuf,
    },
    /// A continuously updated video frame.
    Video(VideoSource),
}

/// A texture object shared by every material that references it.
///
/// Equality compares the descriptor (id, source and sampling state), never the
/// load progress, so two resolutions of the same texture compare equal whether
/// or not their images have arrived yet.
#[derive(Debug)]
pub struct Texture {
    /// Identifier of the texture in the scene document.
    pub id: String,
    /// Where the texels come from.
    pub source: TextureSource,
    /// Colour space of the texels.
    pub color_space: ColorSpace,
    /// Whether the renderer should generate the mipmap chain itself.
    pub generate_mipmaps: bool,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    image: Mutex<Option<DecodedImage>>,
    mipmaps: Mutex<Vec<Option<DecodedImage>>>,
}

impl Asset for Texture {}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Texture {
    /// Creates an image texture whose mipmaps are generated by the renderer.
    pub fn image(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source: TextureSource::Image { path: path.into() },
            color_space: ColorSpace::Linear,
            generate_mipmaps: true,
            min_filter: FilterMode::LinearMipmapLinear,
            mag_filter: FilterMode::Nearest,
            image: Mutex::new(None),
            mipmaps: Mutex::new(Vec::new()),
        }
    }

    /// Creates an image texture with `levels` custom mipmap slots.
    ///
    /// Automatic mipmap generation is disabled; the slots start empty and are
    /// filled by [`Texture::install_mipmap`].
    pub fn image_with_mipmaps(id: impl Into<String>, path: impl Into<PathBuf>, levels: usize) -> Self {
        Self {
            generate_mipmaps: false,
            mag_filter: FilterMode::Linear,
            mipmaps: Mutex::new(vec![None; levels]),
            ..Self::image(id, path)
        }
    }

    /// Creates a video-backed texture. Video frames are never mipmapped.
    pub fn video(id: impl Into<String>, video: VideoSource) -> Self {
        Self {
            id: id.into(),
            source: TextureSource::Video(video),
            color_space: ColorSpace::Srgb,
            generate_mipmaps: false,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            image: Mutex::new(None),
            mipmaps: Mutex::new(Vec::new()),
        }
    }

    /// Returns `true` for video-backed textures.
    pub fn is_video(&self) -> bool {
        matches!(self.source, TextureSource::Video(_))
    }

    /// Installs the base image.
    pub fn install_image(&self, image: DecodedImage) {
        *lock(&self.image) = Some(image);
    }

    /// Installs a custom mipmap level.
    ///
    /// Returns `false` (and installs nothing) if `level` has no slot.
    pub fn install_mipmap(&self, level: usize, image: DecodedImage) -> bool {
        match lock(&self.mipmaps).get_mut(level) {
            Some(slot) => {
                *slot = Some(image);
                true
            }
            None => false,
        }
    }

    /// Returns `true` once the base image has been installed.
    pub fn is_loaded(&self) -> bool {
        lock(&self.image).is_some()
    }

    /// Size of the base image, if loaded.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        lock(&self.image).as_ref().map(|img| (img.width, img.height))
    }

    /// Number of custom mipmap slots.
    pub fn mipmap_slot_count(&self) -> usize {
        lock(&self.mipmaps).len()
    }

    /// Indices of the custom mipmap levels that have been installed.
    pub fn loaded_mipmap_levels(&self) -> Vec<usize> {
        lock(&self.mipmaps)
            .iter()
            .enumerate()
            .filter_map(|(level, slot)| slot.as_ref().map(|_| level))
            .collect()
    }

    /// Returns a copy of an installed mipmap level.
    pub fn mipmap(&self, level: usize) -> Option<DecodedImage> {
        lock(&self.mipmaps).get(level).cloned().flatten()
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.source == other.source
            && self.color_space == other.color_space
            && self.generate_mipmaps == other.generate_mipmaps
            && self.min_filter == other.min_filter
            && self.mag_filter == other.mag_filter
            && self.mipmap_slot_count() == other.mipmap_slot_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> DecodedImage {
        DecodedImage::new(1, 1, vec![255, 0, 0, 255]).unwrap()
    }

    #[test]
    fn test_decoded_image_validates_length() {
        assert!(DecodedImage::new(2, 2, vec![0; 16]).is_some());
        assert!(DecodedImage::new(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_plain_image_uses_generated_mipmaps() {
        let tex = Texture::image("wood", "textures/wood.png");
        assert!(tex.generate_mipmaps);
        assert_eq!(tex.min_filter, FilterMode::LinearMipmapLinear);
        assert_eq!(tex.mag_filter, FilterMode::Nearest);
        assert_eq!(tex.mipmap_slot_count(), 0);
        assert!(!tex.is_video());
    }

    #[test]
    fn test_mipmap_slots_install_independently() {
        let tex = Texture::image_with_mipmaps("wood", "wood.png", 3);
        assert!(!tex.generate_mipmaps);
        assert!(tex.install_mipmap(2, pixel()));
        assert!(tex.install_mipmap(0, pixel()));
        assert!(!tex.install_mipmap(3, pixel()));
        assert_eq!(tex.loaded_mipmap_levels(), vec![0, 2]);
        assert_eq!(tex.mipmap(2), Some(pixel()));
        assert_eq!(tex.mipmap(1), None);
    }

    #[test]
    fn test_equality_ignores_load_state() {
        let a = Texture::image("wood", "wood.png");
        let b = Texture::image("wood", "wood.png");
        a.install_image(pixel());
        assert!(a.is_loaded());
        assert!(!b.is_loaded());
        assert_eq!(a, b);
        assert_eq!(a.dimensions(), Some((1, 1)));
    }
}
