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

//! Defines the error types raised while turning a scene document into a graph.
//!
//! Every error except [`GraphError::MissingRoot`] is recoverable: the builder
//! logs it and leaves the affected piece of content out of the tree.

use std::path::PathBuf;
use thiserror::Error;

/// An error raised while reading or decoding the scene document itself.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document could not be read from disk.
    #[error("Failed to read scene document '{path}': {source}")]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON or does not match the expected shape.
    #[error("Invalid scene document: {0}")]
    Json(#[from] serde_json::Error),
    /// The document has no `graph` section.
    #[error("Scene document has no 'graph' section")]
    MissingGraph,
}

/// An error raised by a geometry factory.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A required field is absent.
    #[error("{primitive} is missing required field '{field}'")]
    MissingField {
        /// Kind of primitive being built.
        primitive: &'static str,
        /// Wire name of the missing field.
        field: &'static str,
    },
    /// A numeric field holds a value the primitive cannot use.
    #[error("{primitive} field '{field}' has invalid value {value}")]
    InvalidValue {
        /// Kind of primitive being built.
        primitive: &'static str,
        /// Wire name of the field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// A derived box dimension is zero or negative.
    #[error("Invalid box dimensions {width} x {height} x {depth}; ensure xyz1 and xyz2 are ordered")]
    NonPositiveDimension {
        /// Extent along X.
        width: f32,
        /// Extent along Y.
        height: f32,
        /// Extent along Z.
        depth: f32,
    },
    /// The requested subdivision produces more vertices than a mesh can index.
    #[error("{primitive} would need {vertices} vertices, more than the limit of {limit}")]
    TooManyVertices {
        /// Kind of primitive being built.
        primitive: &'static str,
        /// Vertex count implied by the segment counts, saturated at `u64::MAX`.
        vertices: u64,
        /// Largest vertex count accepted.
        limit: u64,
    },
    /// A NURBS surface received the wrong number of control points.
    #[error("Expected {expected} control points, but got {actual}")]
    ControlPointCount {
        /// `(degree_u + 1) * (degree_v + 1)`.
        expected: usize,
        /// Number of points supplied.
        actual: usize,
    },
    /// A control point has a weight that cannot be projected.
    #[error("Control point {index} has non-positive or non-finite weight {weight}")]
    InvalidWeight {
        /// Row-major index of the control point.
        index: usize,
        /// The offending weight.
        weight: f32,
    },
}

/// An error raised by the light factory.
#[derive(Debug, Error, PartialEq)]
pub enum LightError {
    /// A required field is absent.
    #[error("{light} light is missing required field '{field}'")]
    MissingField {
        /// Kind of light being built.
        light: &'static str,
        /// Wire name of the missing field.
        field: &'static str,
    },
}

/// An error raised while resolving a material reference.
#[derive(Debug, Error, PartialEq)]
pub enum MaterialError {
    /// The reference names no entry of the material table.
    #[error("Material reference '{0}' not found")]
    NotFound(String),
}

/// An error raised while resolving or loading a texture.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The reference names no entry of the texture table.
    #[error("Texture reference '{0}' not found")]
    NotFound(String),
    /// The image bytes could not be fetched.
    #[error("Unable to read image '{path}': {source}")]
    Fetch {
        /// Resolved path of the image.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The image bytes could not be decoded.
    #[error("Unable to decode image '{path}': {source}")]
    Decode {
        /// Resolved path of the image.
        path: PathBuf,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },
    /// The load task panicked or was cancelled by the runtime.
    #[error("Load task for '{path}' did not complete: {reason}")]
    Task {
        /// Resolved path of the image.
        path: PathBuf,
        /// Description reported by the runtime.
        reason: String,
    },
}

/// An error raised while assembling the graph.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// The root id is absent or names no node. Fatal to the whole build.
    #[error("Root node or root ID is missing in graph data (rootid: {0:?})")]
    MissingRoot(Option<String>),
    /// A referenced node id is absent from the graph table.
    #[error("Node '{0}' not found in graph")]
    MissingNode(String),
    /// A LOD descriptor has no usable level list.
    #[error("LOD '{0}' is missing or has an invalid 'lodNodes' list")]
    MalformedLod(String),
    /// A LOD level targets a node that does not exist.
    #[error("Invalid LOD node reference '{node}' in LOD '{lod}'")]
    MissingLodTarget {
        /// The LOD being expanded.
        lod: String,
        /// The dangling node id.
        node: String,
    },
    /// A `lodsList` entry names something that is not a LOD.
    #[error("'{0}' is listed as a LOD but is not of type 'lod'")]
    NotALod(String),
    /// A node lists itself among its own descendants.
    #[error("Node '{0}' references itself through its descendants")]
    Cycle(String),
    /// A graph entry could not be decoded.
    #[error("Graph entry '{id}' is malformed: {reason}")]
    MalformedEntry {
        /// Id of the entry.
        id: String,
        /// Decoder message.
        reason: String,
    },
}

/// An error raised while assembling a complete scene from a document file.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The document could not be read or decoded.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// The graph could not be built.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
