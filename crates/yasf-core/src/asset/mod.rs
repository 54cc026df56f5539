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

//! Provides the foundational traits for shared scene resources.
//!
//! Meshes, materials and textures produced by a scene build are shared between
//! nodes (several meshes may reference the same texture). They are held through
//! an [`AssetHandle`], a cheap reference-counted pointer.

mod handle;

pub use handle::*;

/// A marker trait for types that can be shared through an [`AssetHandle`].
///
/// The supertraits allow asset data to be shared with background loading tasks:
/// - `Send` + `Sync`: The asset type can be safely shared and sent between threads.
/// - `'static`: The asset type does not contain any non-static references.
///
/// # Examples
///
/// ```
/// use yasf_core::asset::{Asset, AssetHandle};
///
/// struct Heightfield {
///     samples: Vec<f32>,
/// }
///
/// impl Asset for Heightfield {}
///
/// let handle = AssetHandle::new(Heightfield { samples: vec![0.0; 4] });
/// assert_eq!(handle.samples.len(), 4);
/// ```
pub trait Asset: Send + Sync + 'static {}
