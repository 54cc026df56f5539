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

//! Light factory: turns light descriptors into renderer light types.
//!
//! Colour and position are required for every kind; spot lights also need a
//! target and a cone angle. Every optional field falls back to its default
//! only when absent, so an explicit zero is kept.

use crate::document::{DirectionalLightSpec, PointLightSpec, SpotLightSpec};
use crate::error::LightError;
use yasf_core::renderer::{
    DirectionalLight, LightType, PointLight, ShadowFrustum, ShadowSettings, SpotLight,
};

fn require<T>(value: Option<T>, light: &'static str, field: &'static str) -> Result<T, LightError> {
    value.ok_or(LightError::MissingField { light, field })
}

fn shadow_settings(castshadow: Option<bool>, far: Option<f32>, map_size: Option<u32>) -> ShadowSettings {
    let defaults = ShadowSettings::default();
    let size = map_size.unwrap_or(defaults.map_size.0);
    ShadowSettings {
        cast_shadow: castshadow.unwrap_or(defaults.cast_shadow),
        far: far.unwrap_or(defaults.far),
        map_size: (size, size),
    }
}

/// Builds a point light.
pub fn build_point_light(spec: &PointLightSpec) -> Result<LightType, LightError> {
    let defaults = PointLight::default();
    Ok(LightType::Point(PointLight {
        color: require(spec.color, "point", "color")?.into(),
        intensity: spec.intensity.unwrap_or(defaults.intensity),
        distance: spec.distance.unwrap_or(defaults.distance),
        decay: spec.decay.unwrap_or(defaults.decay),
        position: require(spec.position, "point", "position")?.into(),
        shadow: shadow_settings(spec.castshadow, spec.shadowfar, spec.shadowmapsize),
    }))
}

/// Builds a spot light aimed at its `target` point.
pub fn build_spot_light(spec: &SpotLightSpec) -> Result<LightType, LightError> {
    let defaults = SpotLight::default();
    Ok(LightType::Spot(SpotLight {
        color: require(spec.color, "spot", "color")?.into(),
        intensity: spec.intensity.unwrap_or(defaults.intensity),
        distance: spec.distance.unwrap_or(defaults.distance),
        decay: spec.decay.unwrap_or(defaults.decay),
        angle: require(spec.angle, "spot", "angle")?,
        penumbra: spec.penumbra.unwrap_or(defaults.penumbra),
        position: require(spec.position, "spot", "position")?.into(),
        target: require(spec.target, "spot", "target")?.into(),
        shadow: shadow_settings(spec.castshadow, spec.shadowfar, spec.shadowmapsize),
    }))
}

/// Builds a directional light with its orthographic shadow box.
pub fn build_directional_light(spec: &DirectionalLightSpec) -> Result<LightType, LightError> {
    let defaults = DirectionalLight::default();
    let frustum = ShadowFrustum::default();
    Ok(LightType::Directional(DirectionalLight {
        color: require(spec.color, "directional", "color")?.into(),
        intensity: spec.intensity.unwrap_or(defaults.intensity),
        position: require(spec.position, "directional", "position")?.into(),
        shadow: shadow_settings(spec.castshadow, spec.shadowfar, spec.shadowmapsize),
        shadow_frustum: ShadowFrustum {
            left: spec.shadowleft.unwrap_or(frustum.left),
            right: spec.shadowright.unwrap_or(frustum.right),
            bottom: spec.shadowbottom.unwrap_or(frustum.bottom),
            top: spec.shadowtop.unwrap_or(frustum.top),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ColorSpec, XyzSpec};
    use yasf_core::math::{LinearRgba, Vec3};

    const WHITE: ColorSpec = ColorSpec { r: 1.0, g: 1.0, b: 1.0 };
    const UP: XyzSpec = XyzSpec { x: 0.0, y: 10.0, z: 0.0 };

    #[test]
    fn test_point_light_defaults() {
        let spec = PointLightSpec {
            color: Some(WHITE),
            position: Some(UP),
            ..Default::default()
        };
        let LightType::Point(light) = build_point_light(&spec).unwrap() else {
            panic!("expected a point light");
        };
        assert_eq!(light.color, LinearRgba::WHITE);
        assert_eq!(light.intensity, 1.0);
        assert_eq!(light.distance, 1000.0);
        assert_eq!(light.decay, 2.0);
        assert_eq!(light.position, Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(light.shadow, ShadowSettings::default());
    }

    #[test]
    fn test_explicit_zero_is_kept() {
        let spec = PointLightSpec {
            color: Some(WHITE),
            position: Some(UP),
            intensity: Some(0.0),
            distance: Some(0.0),
            ..Default::default()
        };
        let LightType::Point(light) = build_point_light(&spec).unwrap() else {
            panic!("expected a point light");
        };
        assert_eq!(light.intensity, 0.0);
        assert_eq!(light.distance, 0.0);
    }

    #[test]
    fn test_spot_light_requires_target_and_angle() {
        let mut spec = SpotLightSpec {
            color: Some(WHITE),
            position: Some(UP),
            angle: Some(0.5),
            ..Default::default()
        };
        assert_eq!(
            build_spot_light(&spec).unwrap_err(),
            LightError::MissingField {
                light: "spot",
                field: "target"
            }
        );

        spec.target = Some(XyzSpec { x: 0.0, y: 0.0, z: 0.0 });
        spec.castshadow = Some(true);
        spec.shadowmapsize = Some(1024);
        let LightType::Spot(light) = build_spot_light(&spec).unwrap() else {
            panic!("expected a spot light");
        };
        assert_eq!(light.penumbra, 1.0);
        assert_eq!(light.angle, 0.5);
        assert_eq!(light.direction(), Vec3::new(0.0, -1.0, 0.0));
        assert!(light.shadow.cast_shadow);
        assert_eq!(light.shadow.map_size, (1024, 1024));

        spec.angle = None;
        assert!(matches!(
            build_spot_light(&spec),
            Err(LightError::MissingField { field: "angle", .. })
        ));
    }

    #[test]
    fn test_directional_shadow_box() {
        let spec = DirectionalLightSpec {
            color: Some(WHITE),
            position: Some(UP),
            shadowleft: Some(-20.0),
            shadowfar: Some(80.0),
            ..Default::default()
        };
        let LightType::Directional(light) = build_directional_light(&spec).unwrap() else {
            panic!("expected a directional light");
        };
        assert_eq!(light.shadow_frustum.left, -20.0);
        assert_eq!(light.shadow_frustum.right, 5.0);
        assert_eq!(light.shadow_frustum.top, 5.0);
        assert_eq!(light.shadow.far, 80.0);
    }

    #[test]
    fn test_missing_colour() {
        let spec = DirectionalLightSpec {
            position: Some(UP),
            ..Default::default()
        };
        assert_eq!(
            build_directional_light(&spec).unwrap_err(),
            LightError::MissingField {
                light: "directional",
                field: "color"
            }
        );
    }
}
