//! Shape generators producing [`Geometry`] values.
//!
//! Generators fill flat numeric arrays (positions, normals, uvs, indices) and
//! install them on a fresh geometry, with one draw group per material slot.
//! The construction parameters are recorded on the geometry so serialization
//! can short-circuit to them.

use serde::{Deserialize, Serialize};

use crate::geometry::{AttributeBuffer, DrawGroup, Geometry};

/// Construction parameters of a generator-backed geometry.
///
/// Serialized flat into the interchange record; the variant is identified by
/// the record's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeParameters {
    /// Axis-aligned box centered at the origin.
    #[serde(rename = "BoxGeometry", rename_all = "camelCase")]
    Box {
        /// Extent along X.
        width: f32,
        /// Extent along Y.
        height: f32,
        /// Extent along Z.
        depth: f32,
        /// Subdivisions along X.
        width_segments: u32,
        /// Subdivisions along Y.
        height_segments: u32,
        /// Subdivisions along Z.
        depth_segments: u32,
    },
    /// Plane in the XY plane centered at the origin.
    #[serde(rename = "PlaneGeometry", rename_all = "camelCase")]
    Plane {
        /// Extent along X.
        width: f32,
        /// Extent along Y.
        height: f32,
        /// Subdivisions along X.
        width_segments: u32,
        /// Subdivisions along Y.
        height_segments: u32,
    },
}

impl ShapeParameters {
    /// The type name carried in the interchange record.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "BoxGeometry",
            Self::Plane { .. } => "PlaneGeometry",
        }
    }
}

/// Accumulator threaded through per-face construction.
///
/// Carries the flat output arrays plus the running vertex and group offsets
/// that successive faces build on.
#[derive(Default)]
struct PlaneAccumulator {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    indices: Vec<u32>,
    groups: Vec<DrawGroup>,
    vertex_count: u32,
    group_start: usize,
}

impl PlaneAccumulator {
    /// Emit one subdivided plane.
    ///
    /// `u`, `v`, `w` are component slots (0 = x, 1 = y, 2 = z) mapping the
    /// plane's local axes onto world axes; `udir`/`vdir` flip the local axes
    /// so all six box faces wind outward. The face spans `width` x `height`
    /// in its local frame and sits at `depth / 2` along `w`.
    #[allow(clippy::too_many_arguments)]
    fn build_plane(
        &mut self,
        u: usize,
        v: usize,
        w: usize,
        udir: f32,
        vdir: f32,
        width: f32,
        height: f32,
        depth: f32,
        grid_x: u32,
        grid_y: u32,
        material_index: u32,
    ) {
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;

        let width_half = width / 2.0;
        let height_half = height / 2.0;
        let depth_half = depth / 2.0;

        let grid_x1 = grid_x + 1;
        let grid_y1 = grid_y + 1;

        let mut vertex_counter = 0;
        let mut group_count = 0;

        for iy in 0..grid_y1 {
            let y = iy as f32 * segment_height - height_half;
            for ix in 0..grid_x1 {
                let x = ix as f32 * segment_width - width_half;

                let mut vector = [0.0f32; 3];
                vector[u] = x * udir;
                vector[v] = y * vdir;
                vector[w] = depth_half;
                self.positions.extend_from_slice(&vector);

                vector = [0.0; 3];
                vector[w] = if depth > 0.0 { 1.0 } else { -1.0 };
                self.normals.extend_from_slice(&vector);

                self.uvs.push(ix as f32 / grid_x as f32);
                self.uvs.push(1.0 - iy as f32 / grid_y as f32);

                vertex_counter += 1;
            }
        }

        // Two triangles per grid cell, wound counter-clockwise.
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = self.vertex_count + ix + grid_x1 * iy;
                let b = self.vertex_count + ix + grid_x1 * (iy + 1);
                let c = self.vertex_count + (ix + 1) + grid_x1 * (iy + 1);
                let d = self.vertex_count + (ix + 1) + grid_x1 * iy;

                self.indices.extend_from_slice(&[a, b, d]);
                self.indices.extend_from_slice(&[b, c, d]);
                group_count += 6;
            }
        }

        self.groups.push(DrawGroup {
            start: self.group_start,
            count: group_count,
            material_index,
        });
        self.group_start += group_count;
        self.vertex_count += vertex_counter;
    }

    /// Install the accumulated arrays on a fresh geometry.
    fn into_geometry(self) -> Geometry {
        let mut geometry = Geometry::new();
        geometry.set_index(self.indices);
        geometry.set_attribute("position", AttributeBuffer::from_f32(self.positions, 3));
        geometry.set_attribute("normal", AttributeBuffer::from_f32(self.normals, 3));
        geometry.set_attribute("uv", AttributeBuffer::from_f32(self.uvs, 2));
        for group in self.groups {
            geometry.add_group(group.start, group.count, group.material_index);
        }
        geometry
    }
}

/// Generate an axis-aligned box centered at the origin.
///
/// Each of the six faces gets its own draw group with material indices 0..5
/// in face order +x, -x, +y, -y, +z, -z, enabling per-face materials in a
/// single draw call. Segment counts are clamped to at least 1.
pub fn generate_box(
    width: f32,
    height: f32,
    depth: f32,
    width_segments: u32,
    height_segments: u32,
    depth_segments: u32,
) -> Geometry {
    let ws = width_segments.max(1);
    let hs = height_segments.max(1);
    let ds = depth_segments.max(1);

    let mut acc = PlaneAccumulator::default();
    acc.build_plane(2, 1, 0, -1.0, -1.0, depth, height, width, ds, hs, 0); // +x
    acc.build_plane(2, 1, 0, 1.0, -1.0, depth, height, -width, ds, hs, 1); // -x
    acc.build_plane(0, 2, 1, 1.0, 1.0, width, depth, height, ws, ds, 2); // +y
    acc.build_plane(0, 2, 1, 1.0, -1.0, width, depth, -height, ws, ds, 3); // -y
    acc.build_plane(0, 1, 2, 1.0, -1.0, width, height, depth, ws, hs, 4); // +z
    acc.build_plane(0, 1, 2, -1.0, -1.0, width, height, -depth, ws, hs, 5); // -z

    let mut geometry = acc.into_geometry();
    geometry.set_parameters(ShapeParameters::Box {
        width,
        height,
        depth,
        width_segments,
        height_segments,
        depth_segments,
    });
    geometry
}

/// Generate a subdivided plane in the XY plane, centered at the origin, with
/// +Z normals. Produces a single implicit material (no draw groups).
pub fn generate_plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let ws = width_segments.max(1);
    let hs = height_segments.max(1);

    let mut acc = PlaneAccumulator::default();
    acc.build_plane(0, 1, 2, 1.0, -1.0, width, height, 0.0, ws, hs, 0);

    let mut geometry = acc.into_geometry();
    // A plane is one implicit material; the per-face group bookkeeping of the
    // box does not apply.
    geometry.clear_groups();
    // The degenerate depth leaves the normal direction ambiguous; a plane
    // always faces +Z.
    if let Some(normal) = geometry.attribute_mut("normal") {
        for i in 0..normal.count() {
            normal.set_xyz(i, 0.0, 0.0, 1.0);
        }
    }
    geometry.set_parameters(ShapeParameters::Plane {
        width,
        height,
        width_segments,
        height_segments,
    });
    geometry
}
