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

//! Serde model of a YASF scene document.
//!
//! The document is a JSON object, optionally wrapped in a top-level `"yasf"`
//! key, with the sections `globals`, `cameras`, `graph`, `materials` and
//! `textures`. Only `graph` is required.
//!
//! Parsing is lenient below the section level. A material, texture, graph
//! entry, child or transform that does not decode is kept as
//! [`Lenient::Invalid`] (or dropped with a log line) instead of failing the
//! whole document, so one bad entry only removes that piece of content.
//!
//! Primitive and light fields are all optional here. Their factories decide
//! which ones are required and report the missing ones.

use crate::error::DocumentError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use yasf_core::math::{LinearRgba, Vec2, Vec3};

// --- Lenient decoding ---

/// A value that either decoded into `T` or was kept aside with the reason it failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Lenient<T> {
    /// The value decoded.
    Valid(T),
    /// The value did not decode.
    Invalid {
        /// The `type` tag of the raw value, when it had one.
        kind: Option<String>,
        /// Decoder message.
        reason: String,
    },
}

impl<T: DeserializeOwned> Lenient<T> {
    /// Decodes `value`, capturing any failure.
    pub fn from_value(value: Value) -> Self {
        match T::deserialize(&value) {
            Ok(parsed) => Lenient::Valid(parsed),
            Err(err) => Lenient::Invalid {
                kind: value.get("type").and_then(Value::as_str).map(str::to_owned),
                reason: err.to_string(),
            },
        }
    }
}

impl<T> Lenient<T> {
    /// Returns the decoded value, if any.
    pub fn valid(&self) -> Option<&T> {
        match self {
            Lenient::Valid(value) => Some(value),
            Lenient::Invalid { .. } => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Lenient::from_value(Value::deserialize(deserializer)?))
    }
}

/// Decodes a section table, dropping (and logging) entries that fail.
fn decode_table<T: DeserializeOwned>(section: &str, table: Map<String, Value>) -> HashMap<String, T> {
    table
        .into_iter()
        .filter_map(|(id, value)| match Lenient::<T>::from_value(value) {
            Lenient::Valid(entry) => Some((id, entry)),
            Lenient::Invalid { reason, .. } => {
                log::error!("Skipping malformed {section} entry '{id}': {reason}");
                None
            }
        })
        .collect()
}

/// Accepts `true`, `"true"` and treats everything else as `false`.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => text == "true",
        _ => false,
    })
}

/// Like [`deserialize_flag`] for node flags, where absence means "inherit".
/// A value that is neither a boolean nor a string is logged and ignored.
fn deserialize_optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Bool(flag) => Some(flag),
        Value::String(text) => Some(text == "true"),
        other => {
            log::warn!("Ignoring non-boolean shadow flag {other}");
            None
        }
    })
}

/// Reads a list of ids, dropping (and logging) anything that is not a string.
fn deserialize_id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id),
                other => {
                    log::warn!("Ignoring non-string id {other} in child list");
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            log::warn!("Ignoring child list that is not an array: {other}");
            Vec::new()
        }
    })
}

// --- Shared value types ---

/// An `{r, g, b}` colour triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSpec {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl From<ColorSpec> for LinearRgba {
    fn from(c: ColorSpec) -> Self {
        LinearRgba::rgb(c.r, c.g, c.b)
    }
}

/// An `{x, y, z}` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyzSpec {
    /// X.
    pub x: f32,
    /// Y.
    pub y: f32,
    /// Z.
    pub z: f32,
}

impl From<XyzSpec> for Vec3 {
    fn from(v: XyzSpec) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// An `{x, y}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XySpec {
    /// X.
    pub x: f32,
    /// Y.
    pub y: f32,
}

impl From<XySpec> for Vec2 {
    fn from(v: XySpec) -> Self {
        Vec2::new(v.x, v.y)
    }
}

// --- Graph ---

/// A material reference, either `{"materialId": "id"}` or a bare `"id"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialRefSpec {
    /// The wrapped wire form.
    Wrapped {
        /// Material id.
        #[serde(rename = "materialId")]
        material_id: String,
    },
    /// A bare id.
    Bare(String),
}

impl MaterialRefSpec {
    /// The referenced material id.
    pub fn id(&self) -> &str {
        match self {
            MaterialRefSpec::Wrapped { material_id } => material_id,
            MaterialRefSpec::Bare(id) => id,
        }
    }
}

/// One step of a node's ordered transform list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformSpec {
    /// Adds `amount` to the node position.
    Translate {
        /// Offset.
        amount: XyzSpec,
    },
    /// Adds `amount` (degrees) to the node's Euler angles.
    Rotate {
        /// Angles in degrees.
        amount: XyzSpec,
    },
    /// Multiplies the node scale by `amount`.
    Scale {
        /// Factors.
        amount: XyzSpec,
    },
}

/// A node entry of the graph table.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NodeSpec {
    /// Material inherited by primitives below this node.
    #[serde(default)]
    pub materialref: Option<MaterialRefSpec>,
    /// Whether meshes below this node cast shadows.
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub castshadows: Option<bool>,
    /// Whether meshes below this node receive shadows.
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub receiveshadows: Option<bool>,
    /// Local transform steps, applied in order.
    #[serde(default)]
    pub transforms: Vec<Lenient<TransformSpec>>,
    /// Child references and inline children.
    #[serde(default)]
    pub children: Option<ChildrenSpec>,
}

/// The `children` block of a node.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawChildren")]
pub struct ChildrenSpec {
    /// Ids of child nodes.
    pub nodes_list: Vec<String>,
    /// Ids of child LODs.
    pub lods_list: Vec<String>,
    /// Inline primitives and lights, in declaration order.
    pub inline: Vec<(String, Lenient<ChildSpec>)>,
}

#[derive(Deserialize)]
struct RawChildren {
    #[serde(rename = "nodesList", default, deserialize_with = "deserialize_id_list")]
    nodes_list: Vec<String>,
    #[serde(rename = "lodsList", default, deserialize_with = "deserialize_id_list")]
    lods_list: Vec<String>,
    #[serde(flatten)]
    inline: Map<String, Value>,
}

impl From<RawChildren> for ChildrenSpec {
    fn from(raw: RawChildren) -> Self {
        Self {
            nodes_list: raw.nodes_list,
            lods_list: raw.lods_list,
            inline: raw
                .inline
                .into_iter()
                .map(|(name, value)| (name, Lenient::from_value(value)))
                .collect(),
        }
    }
}

/// An inline child, dispatched on its `type` tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildSpec {
    /// Axis-aligned rectangle in the XY plane.
    Rectangle(RectangleSpec),
    /// Single triangle.
    Triangle(TriangleSpec),
    /// Subdivided box.
    Box(BoxSpec),
    /// Cylinder or cone frustum.
    Cylinder(CylinderSpec),
    /// Full or partial sphere.
    Sphere(SphereSpec),
    /// Radially tessellated disc with a colour gradient.
    Polygon(PolygonSpec),
    /// Single-span NURBS patch.
    Nurbs(NurbsSpec),
    /// Point light.
    PointLight(PointLightSpec),
    /// Spot light.
    SpotLight(SpotLightSpec),
    /// Directional light.
    DirectionalLight(DirectionalLightSpec),
}

/// Rectangle wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RectangleSpec {
    /// First corner.
    pub xy1: Option<XySpec>,
    /// Opposite corner.
    pub xy2: Option<XySpec>,
    /// Subdivisions along X.
    pub parts_x: Option<u32>,
    /// Subdivisions along Y.
    pub parts_y: Option<u32>,
}

/// Triangle wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TriangleSpec {
    /// First vertex.
    pub xyz1: Option<XyzSpec>,
    /// Second vertex.
    pub xyz2: Option<XyzSpec>,
    /// Third vertex.
    pub xyz3: Option<XyzSpec>,
}

/// Box wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BoxSpec {
    /// Minimum corner.
    pub xyz1: Option<XyzSpec>,
    /// Maximum corner.
    pub xyz2: Option<XyzSpec>,
    /// Subdivisions along X.
    pub parts_x: Option<u32>,
    /// Subdivisions along Y.
    pub parts_y: Option<u32>,
    /// Subdivisions along Z.
    pub parts_z: Option<u32>,
}

/// Cylinder wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CylinderSpec {
    /// Bottom radius.
    pub base: Option<f32>,
    /// Top radius.
    pub top: Option<f32>,
    /// Height along Y.
    pub height: Option<f32>,
    /// Radial segments.
    pub slices: Option<u32>,
    /// Height segments.
    pub stacks: Option<u32>,
    /// Whether the ends are closed with caps.
    pub capsclose: Option<bool>,
    /// Start angle in radians.
    pub thetastart: Option<f32>,
    /// Angular sweep in radians.
    pub thetalength: Option<f32>,
}

/// Sphere wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SphereSpec {
    /// Radius.
    pub radius: Option<f32>,
    /// Longitude segments.
    pub slices: Option<u32>,
    /// Latitude segments.
    pub stacks: Option<u32>,
    /// Longitude start in radians.
    pub thetastart: Option<f32>,
    /// Longitude sweep in radians.
    pub thetalength: Option<f32>,
    /// Latitude start in radians.
    pub phistart: Option<f32>,
    /// Latitude sweep in radians.
    pub philength: Option<f32>,
}

/// Polygon wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PolygonSpec {
    /// Outer radius.
    pub radius: Option<f32>,
    /// Number of concentric rings.
    pub stacks: Option<u32>,
    /// Vertices per ring.
    pub slices: Option<u32>,
    /// Centre colour.
    pub color_c: Option<ColorSpec>,
    /// Rim colour.
    pub color_p: Option<ColorSpec>,
}

/// A NURBS control point; `w` defaults to 1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ControlPointSpec {
    /// X.
    pub x: f32,
    /// Y.
    pub y: f32,
    /// Z.
    pub z: f32,
    /// Weight.
    #[serde(default = "unit_weight")]
    pub w: f32,
}

fn unit_weight() -> f32 {
    1.0
}

/// NURBS wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NurbsSpec {
    /// Degree along U (columns).
    pub degree_u: Option<u32>,
    /// Degree along V (rows).
    pub degree_v: Option<u32>,
    /// Samples along U.
    pub parts_u: Option<u32>,
    /// Samples along V.
    pub parts_v: Option<u32>,
    /// `degree_v + 1` rows of `degree_u + 1` points, row-major.
    pub controlpoints: Option<Vec<ControlPointSpec>>,
}

/// Point light wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PointLightSpec {
    /// Light colour.
    pub color: Option<ColorSpec>,
    /// Intensity.
    pub intensity: Option<f32>,
    /// Range.
    pub distance: Option<f32>,
    /// Falloff exponent.
    pub decay: Option<f32>,
    /// Position.
    pub position: Option<XyzSpec>,
    /// Whether the light casts shadows.
    pub castshadow: Option<bool>,
    /// Shadow camera far plane.
    pub shadowfar: Option<f32>,
    /// Square shadow map resolution.
    pub shadowmapsize: Option<u32>,
}

/// Spot light wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpotLightSpec {
    /// Light colour.
    pub color: Option<ColorSpec>,
    /// Intensity.
    pub intensity: Option<f32>,
    /// Range.
    pub distance: Option<f32>,
    /// Falloff exponent.
    pub decay: Option<f32>,
    /// Cone angle.
    pub angle: Option<f32>,
    /// Cone edge softness.
    pub penumbra: Option<f32>,
    /// Position.
    pub position: Option<XyzSpec>,
    /// Aim point.
    pub target: Option<XyzSpec>,
    /// Whether the light casts shadows.
    pub castshadow: Option<bool>,
    /// Shadow camera far plane.
    pub shadowfar: Option<f32>,
    /// Square shadow map resolution.
    pub shadowmapsize: Option<u32>,
}

/// Directional light wire fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DirectionalLightSpec {
    /// Light colour.
    pub color: Option<ColorSpec>,
    /// Intensity.
    pub intensity: Option<f32>,
    /// Position.
    pub position: Option<XyzSpec>,
    /// Whether the light casts shadows.
    pub castshadow: Option<bool>,
    /// Shadow frustum left plane.
    pub shadowleft: Option<f32>,
    /// Shadow frustum right plane.
    pub shadowright: Option<f32>,
    /// Shadow frustum bottom plane.
    pub shadowbottom: Option<f32>,
    /// Shadow frustum top plane.
    pub shadowtop: Option<f32>,
    /// Shadow camera far plane.
    pub shadowfar: Option<f32>,
    /// Square shadow map resolution.
    pub shadowmapsize: Option<u32>,
}

/// One level of a LOD descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LodLevelSpec {
    /// Node shown at this level, or the empty-level sentinel.
    #[serde(rename = "nodeId")]
    pub node_id: String,
    /// Camera distance from which this level is active.
    pub mindist: f32,
}

/// A LOD entry of the graph table.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LodSpec {
    /// Levels in document order. `None` when the list is absent.
    #[serde(rename = "lodNodes", default)]
    pub lod_nodes: Option<Vec<LodLevelSpec>>,
}

/// A decoded graph table entry.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEntry {
    /// A node.
    Node(Box<NodeSpec>),
    /// A LOD descriptor (`"type": "lod"`).
    Lod(LodSpec),
    /// An entry that did not decode.
    Malformed(String),
}

impl GraphEntry {
    fn from_value(value: Value) -> Self {
        let is_lod = value.get("type").and_then(Value::as_str) == Some("lod");
        let decoded = if is_lod {
            LodSpec::deserialize(&value).map(GraphEntry::Lod)
        } else {
            NodeSpec::deserialize(&value).map(|node| GraphEntry::Node(Box::new(node)))
        };
        decoded.unwrap_or_else(|err| GraphEntry::Malformed(err.to_string()))
    }
}

/// The `graph` section: a root id plus every node and LOD keyed by id.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawGraph")]
pub struct GraphSpec {
    /// Id of the root node.
    pub root_id: Option<String>,
    /// Every entry keyed by id.
    pub entries: HashMap<String, GraphEntry>,
}

#[derive(Deserialize)]
struct RawGraph {
    #[serde(default)]
    rootid: Option<String>,
    #[serde(flatten)]
    entries: Map<String, Value>,
}

impl From<RawGraph> for GraphSpec {
    fn from(raw: RawGraph) -> Self {
        Self {
            root_id: raw.rootid,
            entries: raw
                .entries
                .into_iter()
                .map(|(id, value)| (id, GraphEntry::from_value(value)))
                .collect(),
        }
    }
}

impl GraphSpec {
    /// Looks up an entry by id.
    pub fn entry(&self, id: &str) -> Option<&GraphEntry> {
        self.entries.get(id)
    }
}

// --- Materials and textures ---

/// A material table entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MaterialSpec {
    /// Diffuse colour.
    pub color: Option<ColorSpec>,
    /// Emissive colour.
    pub emissive: Option<ColorSpec>,
    /// Specular colour.
    pub specular: Option<ColorSpec>,
    /// Specular exponent.
    pub shininess: Option<f32>,
    /// Alpha blending.
    pub transparent: Option<bool>,
    /// Opacity.
    pub opacity: Option<f32>,
    /// Render both faces. The wire value is the string `"true"` or a boolean.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub twosided: bool,
    /// Render edges only.
    pub wireframe: Option<bool>,
    /// Diffuse texture id.
    pub textureref: Option<String>,
    /// Texture repeat along U.
    pub texlength_s: Option<f32>,
    /// Texture repeat along V.
    pub texlength_t: Option<f32>,
    /// Bump texture id.
    pub bumpref: Option<String>,
    /// Bump strength.
    pub bumpscale: Option<f32>,
    /// Specular map id.
    pub specularref: Option<String>,
}

/// A texture table entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawTexture")]
pub struct TextureSpec {
    /// Image or video path.
    pub filepath: String,
    /// Whether the texture is backed by a video.
    pub is_video: bool,
    /// Custom mipmap chain. `Some` whenever `mipmap0` is declared.
    pub mipmaps: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawTexture {
    #[serde(default)]
    filepath: String,
    #[serde(rename = "isVideo", default, deserialize_with = "deserialize_flag")]
    is_video: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawTexture> for TextureSpec {
    fn from(raw: RawTexture) -> Self {
        let mipmaps = raw.extra.contains_key("mipmap0").then(|| {
            (0..)
                .map_while(|level| {
                    raw.extra
                        .get(&format!("mipmap{level}"))
                        .and_then(Value::as_str)
                        .filter(|path| !path.is_empty())
                        .map(str::to_owned)
                })
                .collect::<Vec<_>>()
        });
        Self {
            filepath: raw.filepath,
            is_video: raw.is_video,
            mipmaps,
        }
    }
}

// --- Globals and cameras ---

/// Ambient light settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmbientSpec {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Intensity.
    pub intensity: Option<f32>,
}

/// Fog settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FogSpec {
    /// Fog colour.
    pub color: ColorSpec,
    /// Distance where fog starts.
    pub near: Option<f32>,
    /// Distance where fog is opaque.
    pub far: Option<f32>,
}

/// Skybox settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkyboxSpec {
    /// Box extents.
    pub size: XyzSpec,
    /// Box centre.
    pub center: XyzSpec,
    /// Emissive tint of every face.
    pub emissive: ColorSpec,
    /// Emissive intensity.
    pub intensity: Option<f32>,
    /// +Z face image.
    pub front: String,
    /// -Z face image.
    pub back: String,
    /// +Y face image.
    pub up: String,
    /// -Y face image.
    pub down: String,
    /// -X face image.
    pub left: String,
    /// +X face image.
    pub right: String,
}

/// The `globals` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GlobalsSpec {
    /// Clear colour.
    pub background: Option<Lenient<ColorSpec>>,
    /// Ambient light.
    pub ambient: Option<Lenient<AmbientSpec>>,
    /// Fog.
    pub fog: Option<Lenient<FogSpec>>,
    /// Skybox.
    pub skybox: Option<Lenient<SkyboxSpec>>,
}

/// One camera of the `cameras` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CameraSpec {
    /// `"perspective"`; anything else is orthographic.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Vertical field of view in degrees.
    pub angle: Option<f32>,
    /// Aspect ratio.
    pub aspect: Option<f32>,
    /// Near plane.
    pub near: Option<f32>,
    /// Far plane.
    pub far: Option<f32>,
    /// Orthographic left plane.
    pub left: Option<f32>,
    /// Orthographic right plane.
    pub right: Option<f32>,
    /// Orthographic top plane.
    pub top: Option<f32>,
    /// Orthographic bottom plane.
    pub bottom: Option<f32>,
    /// Camera position.
    pub location: Option<XyzSpec>,
    /// Look-at point.
    pub target: Option<XyzSpec>,
}

/// The `cameras` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawCameras")]
pub struct CamerasSpec {
    /// Id of the camera active at start.
    pub initial: Option<String>,
    /// Cameras in declaration order.
    pub cameras: Vec<(String, Lenient<CameraSpec>)>,
}

#[derive(Deserialize)]
struct RawCameras {
    #[serde(default)]
    initial: Option<String>,
    #[serde(flatten)]
    cameras: Map<String, Value>,
}

impl From<RawCameras> for CamerasSpec {
    fn from(raw: RawCameras) -> Self {
        Self {
            initial: raw.initial,
            cameras: raw
                .cameras
                .into_iter()
                .map(|(id, value)| (id, Lenient::from_value(value)))
                .collect(),
        }
    }
}

// --- Documents ---

/// The part of a document consumed by the graph builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDescription {
    /// Node and LOD table.
    pub graph: GraphSpec,
    /// Material table.
    pub materials: HashMap<String, MaterialSpec>,
    /// Texture table.
    pub textures: HashMap<String, TextureSpec>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    globals: Option<GlobalsSpec>,
    #[serde(default)]
    cameras: Option<CamerasSpec>,
    #[serde(default)]
    graph: Option<GraphSpec>,
    #[serde(default)]
    materials: Map<String, Value>,
    #[serde(default)]
    textures: Map<String, Value>,
}

impl SceneDescription {
    /// Decodes the `graph`, `materials` and `textures` sections of a document.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        Ok(SceneDocument::from_value(value)?.description)
    }
}

/// A complete parsed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDocument {
    /// Global rendering settings.
    pub globals: Option<GlobalsSpec>,
    /// Camera definitions.
    pub cameras: Option<CamerasSpec>,
    /// Graph, materials and textures.
    pub description: SceneDescription,
}

impl SceneDocument {
    /// Decodes a document from a JSON value, unwrapping a top-level `yasf` key.
    pub fn from_value(mut value: Value) -> Result<Self, DocumentError> {
        if let Some(inner) = value.get_mut("yasf") {
            value = inner.take();
        }
        let raw = RawDocument::deserialize(value)?;
        let graph = raw.graph.ok_or(DocumentError::MissingGraph)?;
        Ok(Self {
            globals: raw.globals,
            cameras: raw.cameras,
            description: SceneDescription {
                graph,
                materials: decode_table("material", raw.materials),
                textures: decode_table("texture", raw.textures),
            },
        })
    }

    /// Decodes a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Reads and decodes a document file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwraps_yasf_key() {
        let doc = SceneDocument::from_value(json!({
            "yasf": { "graph": { "rootid": "scene", "scene": {} } }
        }))
        .unwrap();
        assert_eq!(doc.description.graph.root_id.as_deref(), Some("scene"));
        assert!(matches!(
            doc.description.graph.entry("scene"),
            Some(GraphEntry::Node(_))
        ));
    }

    #[test]
    fn test_missing_graph_is_an_error() {
        let err = SceneDocument::from_value(json!({ "materials": {} })).unwrap_err();
        assert!(matches!(err, DocumentError::MissingGraph));
    }

    #[test]
    fn test_graph_entries_are_classified() {
        let graph: GraphSpec = serde_json::from_value(json!({
            "rootid": "root",
            "root": { "materialref": { "materialId": "wood" }, "castshadows": true },
            "tree_lod": { "type": "lod", "lodNodes": [{ "nodeId": "a", "mindist": 0 }] },
            "broken": { "transforms": 3 }
        }))
        .unwrap();
        match graph.entry("root") {
            Some(GraphEntry::Node(node)) => {
                assert_eq!(node.materialref.as_ref().map(|m| m.id()), Some("wood"));
                assert_eq!(node.castshadows, Some(true));
            }
            other => panic!("unexpected entry {other:?}"),
        }
        match graph.entry("tree_lod") {
            Some(GraphEntry::Lod(lod)) => assert_eq!(lod.lod_nodes.as_ref().map(Vec::len), Some(1)),
            other => panic!("unexpected entry {other:?}"),
        }
        assert!(matches!(graph.entry("broken"), Some(GraphEntry::Malformed(_))));
    }

    #[test]
    fn test_bare_material_ref() {
        let node: NodeSpec = serde_json::from_value(json!({ "materialref": "stone" })).unwrap();
        assert_eq!(node.materialref.unwrap().id(), "stone");
    }

    #[test]
    fn test_children_keep_declaration_order_and_isolate_bad_entries() {
        let children: ChildrenSpec = serde_json::from_value(json!({
            "nodesList": ["leg"],
            "zeta": { "type": "sphere", "radius": 1, "slices": 8, "stacks": 8 },
            "alpha": { "type": "teapot" },
            "mid": { "type": "pointlight", "color": { "r": 1, "g": 1, "b": 1 } }
        }))
        .unwrap();
        assert_eq!(children.nodes_list, vec!["leg"]);
        assert!(children.lods_list.is_empty());
        let names: Vec<&str> = children.inline.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(matches!(children.inline[0].1, Lenient::Valid(ChildSpec::Sphere(_))));
        match &children.inline[1].1 {
            Lenient::Invalid { kind, .. } => assert_eq!(kind.as_deref(), Some("teapot")),
            other => panic!("unexpected child {other:?}"),
        }
        assert!(matches!(children.inline[2].1, Lenient::Valid(ChildSpec::PointLight(_))));
    }

    #[test]
    fn test_transform_list() {
        let node: NodeSpec = serde_json::from_value(json!({
            "transforms": [
                { "type": "translate", "amount": { "x": 1, "y": 0, "z": 0 } },
                { "type": "shear", "amount": { "x": 1, "y": 0, "z": 0 } }
            ]
        }))
        .unwrap();
        assert!(matches!(node.transforms[0], Lenient::Valid(TransformSpec::Translate { .. })));
        assert!(matches!(node.transforms[1], Lenient::Invalid { .. }));
    }

    #[test]
    fn test_off_type_node_fields_do_not_drop_the_node() {
        let graph: GraphSpec = serde_json::from_value(json!({
            "rootid": "root",
            "root": {
                "castshadows": "true",
                "receiveshadows": 1,
                "children": { "nodesList": ["a", 7, "b"], "lodsList": "tree" }
            }
        }))
        .unwrap();
        match graph.entry("root") {
            Some(GraphEntry::Node(node)) => {
                assert_eq!(node.castshadows, Some(true));
                assert_eq!(node.receiveshadows, None);
                let children = node.children.as_ref().unwrap();
                assert_eq!(children.nodes_list, vec!["a", "b"]);
                assert!(children.lods_list.is_empty());
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn test_twosided_accepts_string_and_bool() {
        let parse = |v: Value| serde_json::from_value::<MaterialSpec>(v).unwrap().twosided;
        assert!(parse(json!({ "twosided": "true" })));
        assert!(parse(json!({ "twosided": true })));
        assert!(!parse(json!({ "twosided": "false" })));
        assert!(!parse(json!({ "twosided": "yes" })));
        assert!(!parse(json!({})));
    }

    #[test]
    fn test_mipmap_chain_stops_at_first_gap() {
        let tex: TextureSpec = serde_json::from_value(json!({
            "filepath": "wood.png",
            "mipmap0": "wood0.png",
            "mipmap1": "wood1.png",
            "mipmap3": "wood3.png"
        }))
        .unwrap();
        assert_eq!(
            tex.mipmaps,
            Some(vec!["wood0.png".to_string(), "wood1.png".to_string()])
        );
        let plain: TextureSpec = serde_json::from_value(json!({ "filepath": "a.png" })).unwrap();
        assert_eq!(plain.mipmaps, None);
        assert!(!plain.is_video);
    }

    #[test]
    fn test_malformed_material_is_dropped() {
        let doc = SceneDocument::from_value(json!({
            "graph": { "rootid": "r", "r": {} },
            "materials": {
                "good": { "color": { "r": 1, "g": 0, "b": 0 } },
                "bad": { "color": "red" }
            }
        }))
        .unwrap();
        assert!(doc.description.materials.contains_key("good"));
        assert!(!doc.description.materials.contains_key("bad"));
    }

    #[test]
    fn test_cameras_section() {
        let cams: CamerasSpec = serde_json::from_value(json!({
            "initial": "cam1",
            "cam1": { "type": "perspective", "angle": 60, "location": { "x": 0, "y": 1, "z": 2 } },
            "cam2": { "type": "orthogonal", "left": -1, "right": 1, "top": 1, "bottom": -1 }
        }))
        .unwrap();
        assert_eq!(cams.initial.as_deref(), Some("cam1"));
        assert_eq!(cams.cameras.len(), 2);
        assert_eq!(cams.cameras[0].0, "cam1");
    }
}
