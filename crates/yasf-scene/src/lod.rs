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

//! Distance-switched level-of-detail groups.

use crate::node::RenderNode;
use yasf_core::math::Vec3;

/// One level of a [`Lod`].
#[derive(Debug, Clone, PartialEq)]
pub struct LodLevel {
    /// Camera distance from which this level is active.
    pub min_distance: f32,
    /// Content shown at this level. `None` renders nothing.
    pub object: Option<RenderNode>,
}

/// A group that shows exactly one of its levels, chosen by camera distance.
///
/// Levels are kept sorted by ascending `min_distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lod {
    /// Id of the LOD entry in the graph table.
    pub name: String,
    levels: Vec<LodLevel>,
    active: usize,
}

impl Lod {
    /// Creates a LOD from levels in any order. The nearest level starts active.
    pub fn new(name: impl Into<String>, mut levels: Vec<LodLevel>) -> Self {
        levels.sort_by(|a, b| a.min_distance.total_cmp(&b.min_distance));
        Self {
            name: name.into(),
            levels,
            active: 0,
        }
    }

    /// Levels in ascending distance order.
    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    /// Mutable access to the level contents. The distance order cannot change.
    pub fn level_objects_mut(&mut self) -> impl Iterator<Item = &mut Option<RenderNode>> {
        self.levels.iter_mut().map(|level| &mut level.object)
    }

    /// Index of the level that would be shown at `distance`.
    ///
    /// That is the level with the greatest `min_distance` not exceeding
    /// `distance`, falling back to the nearest level.
    pub fn level_index_for(&self, distance: f32) -> usize {
        self.levels
            .iter()
            .rposition(|level| level.min_distance <= distance)
            .unwrap_or(0)
    }

    /// Re-selects the active level from the camera position and the LOD's
    /// world position, returning the new active index.
    pub fn update(&mut self, camera_position: Vec3, world_position: Vec3) -> usize {
        self.select(camera_position.distance(world_position))
    }

    /// Re-selects the active level for a known distance.
    pub fn select(&mut self, distance: f32) -> usize {
        let next = self.level_index_for(distance);
        if next != self.active {
            log::trace!("LOD '{}' switched from level {} to {}", self.name, self.active, next);
        }
        self.active = next;
        next
    }

    /// Index of the active level.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The active level, if the LOD has any.
    pub fn active_level(&self) -> Option<&LodLevel> {
        self.levels.get(self.active)
    }

    /// Content of the active level, if any.
    pub fn active_object(&self) -> Option<&RenderNode> {
        self.active_level().and_then(|level| level.object.as_ref())
    }
}
