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

//! Defines light types for the rendering system.
//!
//! Lights carry their own position (and target, for spot lights) in the local
//! space of the node they are attached to, plus the configuration of the
//! shadow map they render when casting shadows.

use crate::math::{LinearRgba, Vec3};

/// Shadow-map configuration shared by every light kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Whether the light renders a shadow map.
    pub cast_shadow: bool,
    /// Far plane of the shadow camera.
    pub far: f32,
    /// Shadow map resolution in texels, `(width, height)`.
    pub map_size: (u32, u32),
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            cast_shadow: false,
            far: 500.0,
            map_size: (512, 512),
        }
    }
}

/// Orthographic box of a directional light's shadow camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowFrustum {
    /// Left plane.
    pub left: f32,
    /// Right plane.
    pub right: f32,
    /// Bottom plane.
    pub bottom: f32,
    /// Top plane.
    pub top: f32,
}

impl Default for ShadowFrustum {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            bottom: -5.0,
            top: 5.0,
        }
    }
}

/// A directional light source, aimed from its position at the local origin.
///
/// # Examples
///
/// ```
/// use yasf_core::renderer::light::DirectionalLight;
/// use yasf_core::math::Vec3;
///
/// let sun = DirectionalLight {
///     position: Vec3::new(0.0, 10.0, 0.0),
///     ..Default::default()
/// };
/// assert_eq!(sun.direction(), Vec3::new(0.0, -1.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// Position the light shines from.
    pub position: Vec3,
    /// Shadow map configuration.
    pub shadow: ShadowSettings,
    /// Orthographic shadow camera bounds.
    pub shadow_frustum: ShadowFrustum,
}

impl DirectionalLight {
    /// Normalized direction from the light towards the origin.
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize()
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
            position: Vec3::Y,
            shadow: ShadowSettings::default(),
            shadow_frustum: ShadowFrustum::default(),
        }
    }
}

/// A point light source that emits light in all directions from a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// Maximum range of the light. Zero means unlimited.
    pub distance: f32,
    /// How fast the light dims along `distance`.
    pub decay: f32,
    /// Position of the light.
    pub position: Vec3,
    /// Shadow map configuration.
    pub shadow: ShadowSettings,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
            distance: 1000.0,
            decay: 2.0,
            position: Vec3::ZERO,
            shadow: ShadowSettings::default(),
        }
    }
}

/// A spot light source that emits light in a cone towards a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// Maximum range of the light. Zero means unlimited.
    pub distance: f32,
    /// How fast the light dims along `distance`.
    pub decay: f32,
    /// Cone angle as given by the scene document.
    pub angle: f32,
    /// Fraction of the cone that is attenuated, `0` hard edge, `1` fully soft.
    pub penumbra: f32,
    /// Position of the light.
    pub position: Vec3,
    /// Point the light aims at.
    pub target: Vec3,
    /// Shadow map configuration.
    pub shadow: ShadowSettings,
}

impl SpotLight {
    /// Normalized direction from the light towards its target.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
            distance: 1000.0,
            decay: 2.0,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 1.0,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            shadow: ShadowSettings::default(),
        }
    }
}

/// An enumeration of all supported light types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightType {
    /// A directional light.
    Directional(DirectionalLight),
    /// A point light.
    Point(PointLight),
    /// A spotlight.
    Spot(SpotLight),
}

impl LightType {
    /// Shadow configuration of the wrapped light.
    pub fn shadow(&self) -> &ShadowSettings {
        match self {
            LightType::Directional(l) => &l.shadow,
            LightType::Point(l) => &l.shadow,
            LightType::Spot(l) => &l.shadow,
        }
    }

    /// A short lowercase name for the light kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LightType::Directional(_) => "directional",
            LightType::Point(_) => "point",
            LightType::Spot(_) => "spot",
        }
    }
}
