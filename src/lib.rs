//! # Geometry Engine
//!
//! CPU-side buffer geometry core for real-time 3D rendering.
//!
//! The crate stores per-vertex attribute channels (position, normal, uv,
//! tangent, color, custom), an optional index buffer and multi-material draw
//! groups, and derives auxiliary geometric data from the raw arrays:
//!
//! - [`geometry::Geometry`] - the aggregate: buffers, groups, draw range,
//!   cached bounding volumes, morph targets and user metadata
//! - [`geometry::AttributeBuffer`] - a typed flat array with a fixed item width
//! - Bounding box / bounding sphere computation with morph-target expansion
//! - Smooth vertex-normal averaging and Gram-Schmidt tangent-space construction
//! - Indexed to non-indexed conversion and a versioned JSON interchange form
//! - [`generators`] - box and plane producers filling the buffers above
//!
//! All operations are synchronous and run on the caller's thread; a `Geometry`
//! shared across threads must be serialized externally.

pub mod events;
pub mod generators;
pub mod geometry;
pub mod math;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
