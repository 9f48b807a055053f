//! Per-vertex attribute buffers.
//!
//! An [`AttributeBuffer`] owns a flat numeric backing array plus an item width
//! (components per vertex) and a normalization flag. The backing storage is a
//! closed set of representations ([`AttributeData`]): f32 for positions,
//! normals, uvs and friends, u16/u32 for index data, and a device-resident
//! placeholder for buffers that live only on the GPU and cannot be read back.

use crate::math::{Vec2, Vec3};

/// Backing storage of an attribute buffer.
///
/// The variant doubles as the buffer's numeric type tag; pattern matching on
/// it replaces runtime type probing.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    /// 32-bit floats (positions, normals, uvs, tangents, colors).
    Float32(Vec<f32>),
    /// 16-bit unsigned integers (narrow index data).
    Uint16(Vec<u16>),
    /// 32-bit unsigned integers (wide index data).
    Uint32(Vec<u32>),
    /// Device-resident storage of a known length; not readable from the CPU.
    Device {
        /// Number of scalar elements held on the device.
        len: usize,
    },
}

impl AttributeData {
    /// Number of scalar elements in the backing array.
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Uint16(v) => v.len(),
            Self::Uint32(v) => v.len(),
            Self::Device { len } => *len,
        }
    }

    /// Whether the backing array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable tag naming the numeric representation, used by the JSON
    /// interchange form.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Float32(_) => "Float32Array",
            Self::Uint16(_) => "Uint16Array",
            Self::Uint32(_) => "Uint32Array",
            Self::Device { .. } => "Device",
        }
    }

    /// Whether element values can be read from the CPU.
    pub fn is_readable(&self) -> bool {
        !matches!(self, Self::Device { .. })
    }
}

/// A typed per-vertex value array with a fixed item width.
///
/// The array length is always an exact multiple of `item_size`; the vertex
/// count is derived as `len / item_size`. Component reads on device-resident
/// data yield 0.0 and writes are dropped; callers that care must check
/// [`AttributeBuffer::is_readable`] first.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBuffer {
    data: AttributeData,
    item_size: usize,
    normalized: bool,
}

impl AttributeBuffer {
    /// Create a buffer from backing data and an item width.
    ///
    /// # Panics
    ///
    /// Panics if the data length is not a multiple of `item_size`.
    pub fn new(data: AttributeData, item_size: usize) -> Self {
        assert!(item_size > 0, "item_size must be positive");
        assert!(
            data.len() % item_size == 0,
            "attribute length {} is not a multiple of item size {}",
            data.len(),
            item_size
        );
        Self {
            data,
            item_size,
            normalized: false,
        }
    }

    /// Create a buffer over an f32 array.
    pub fn from_f32(array: Vec<f32>, item_size: usize) -> Self {
        Self::new(AttributeData::Float32(array), item_size)
    }

    /// Create a zero-filled f32 buffer for `count` vertices.
    pub fn zeroed_f32(count: usize, item_size: usize) -> Self {
        Self::new(AttributeData::Float32(vec![0.0; count * item_size]), item_size)
    }

    /// Build an index buffer (item width 1) from vertex references, choosing
    /// the narrowest integer width that can represent the maximum value.
    pub fn from_indices(indices: &[u32]) -> Self {
        let needs_wide = indices.iter().any(|&i| i > u16::MAX as u32);
        let data = if needs_wide {
            AttributeData::Uint32(indices.to_vec())
        } else {
            AttributeData::Uint16(indices.iter().map(|&i| i as u16).collect())
        };
        Self::new(data, 1)
    }

    /// Create a device-resident placeholder of `count` vertices.
    pub fn device(count: usize, item_size: usize) -> Self {
        Self::new(
            AttributeData::Device {
                len: count * item_size,
            },
            item_size,
        )
    }

    /// Set the normalization flag (integer data maps to [0,1] / [-1,1] on the
    /// consumer side).
    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Backing storage.
    pub fn data(&self) -> &AttributeData {
        &self.data
    }

    /// Components per vertex.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Normalization flag.
    pub fn normalized(&self) -> bool {
        self.normalized
    }

    /// Number of vertices (array length / item width).
    pub fn count(&self) -> usize {
        self.data.len() / self.item_size
    }

    /// Whether element values can be read from the CPU.
    pub fn is_readable(&self) -> bool {
        self.data.is_readable()
    }

    /// Read component `component` of vertex `index` as f32.
    pub fn get(&self, index: usize, component: usize) -> f32 {
        debug_assert!(component < self.item_size);
        let i = index * self.item_size + component;
        match &self.data {
            AttributeData::Float32(v) => v.get(i).copied().unwrap_or(0.0),
            AttributeData::Uint16(v) => v.get(i).copied().unwrap_or(0) as f32,
            AttributeData::Uint32(v) => v.get(i).copied().unwrap_or(0) as f32,
            AttributeData::Device { .. } => 0.0,
        }
    }

    /// Write component `component` of vertex `index`. Values are truncated to
    /// the backing integer width where applicable; device writes are dropped.
    pub fn set(&mut self, index: usize, component: usize, value: f32) {
        debug_assert!(component < self.item_size);
        let i = index * self.item_size + component;
        match &mut self.data {
            AttributeData::Float32(v) => {
                if let Some(slot) = v.get_mut(i) {
                    *slot = value;
                }
            }
            AttributeData::Uint16(v) => {
                if let Some(slot) = v.get_mut(i) {
                    *slot = value as u16;
                }
            }
            AttributeData::Uint32(v) => {
                if let Some(slot) = v.get_mut(i) {
                    *slot = value as u32;
                }
            }
            AttributeData::Device { .. } => {}
        }
    }

    /// X component of vertex `index`.
    pub fn x(&self, index: usize) -> f32 {
        self.get(index, 0)
    }

    /// Y component of vertex `index`.
    pub fn y(&self, index: usize) -> f32 {
        self.get(index, 1)
    }

    /// Z component of vertex `index`.
    pub fn z(&self, index: usize) -> f32 {
        self.get(index, 2)
    }

    /// W component of vertex `index`.
    pub fn w(&self, index: usize) -> f32 {
        self.get(index, 3)
    }

    /// Write the first two components of vertex `index`.
    pub fn set_xy(&mut self, index: usize, x: f32, y: f32) {
        self.set(index, 0, x);
        self.set(index, 1, y);
    }

    /// Write the first three components of vertex `index`.
    pub fn set_xyz(&mut self, index: usize, x: f32, y: f32, z: f32) {
        self.set(index, 0, x);
        self.set(index, 1, y);
        self.set(index, 2, z);
    }

    /// Write all four components of vertex `index`.
    pub fn set_xyzw(&mut self, index: usize, x: f32, y: f32, z: f32, w: f32) {
        self.set(index, 0, x);
        self.set(index, 1, y);
        self.set(index, 2, z);
        self.set(index, 3, w);
    }

    /// Read vertex `index` as an integer vertex reference (index data).
    pub fn u32_at(&self, index: usize) -> u32 {
        let i = index * self.item_size;
        match &self.data {
            AttributeData::Float32(v) => v.get(i).copied().unwrap_or(0.0) as u32,
            AttributeData::Uint16(v) => v.get(i).copied().unwrap_or(0) as u32,
            AttributeData::Uint32(v) => v.get(i).copied().unwrap_or(0),
            AttributeData::Device { .. } => 0,
        }
    }

    /// Read the first two components of vertex `index` as a [`Vec2`].
    pub fn vec2_at(&self, index: usize) -> Vec2 {
        Vec2::new(self.x(index), self.y(index))
    }

    /// Read the first three components of vertex `index` as a [`Vec3`].
    pub fn vec3_at(&self, index: usize) -> Vec3 {
        Vec3::new(self.x(index), self.y(index), self.z(index))
    }

    /// Write the first three components of vertex `index` from a [`Vec3`].
    pub fn set_vec3(&mut self, index: usize, v: Vec3) {
        self.set_xyz(index, v.x, v.y, v.z);
    }

    /// Zero-copy byte view over the backing array for upload consumers.
    /// Returns `None` for device-resident data.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            AttributeData::Float32(v) => Some(bytemuck::cast_slice(v)),
            AttributeData::Uint16(v) => Some(bytemuck::cast_slice(v)),
            AttributeData::Uint32(v) => Some(bytemuck::cast_slice(v)),
            AttributeData::Device { .. } => None,
        }
    }
}
