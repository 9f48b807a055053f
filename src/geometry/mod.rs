//! Buffer geometry: attribute storage, draw groups and derivation algorithms.
//!
//! This module family provides the CPU-side mesh-data container:
//!
//! - [`AttributeBuffer`] / [`AttributeData`] - typed flat per-vertex arrays
//! - [`Geometry`] - index, attributes, morph targets, groups, draw range,
//!   cached bounding volumes
//! - Derivation: `compute_bounding_box`, `compute_bounding_sphere`,
//!   `compute_vertex_normals`, `compute_tangents`
//! - Conversion (`to_non_indexed`) and the JSON interchange form
//!   (`to_json` / `from_json`)

mod attribute;
mod bounds;
mod convert;
mod data;
mod json;
mod normals;
mod tangents;
mod transform;

pub use attribute::{AttributeBuffer, AttributeData};
pub use data::{DrawGroup, DrawRange, Geometry, IndexData};
pub use json::{
    AttributeJson, BoundingSphereJson, GeometryDataJson, GeometryJson, IndexJson, JsonError,
    JsonMetadata, FORMAT_VERSION,
};
