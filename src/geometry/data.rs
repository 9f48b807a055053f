//! The geometry aggregate: buffers, groups, draw range, cached bounds.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::{Event, EventDispatcher, ListenerId};
use crate::generators::ShapeParameters;
use crate::math::{BoundingSphere, Box3, Vec3};

use super::attribute::AttributeBuffer;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(0);

/// A sub-range of the index/vertex stream bound to one material slot.
///
/// Ranges are caller-defined and may overlap or leave gaps; the core does not
/// validate coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawGroup {
    /// Offset into the index (or vertex) stream.
    pub start: usize,
    /// Length of the range.
    pub count: usize,
    /// Material slot this range renders with.
    pub material_index: u32,
}

/// Restriction of which vertices participate in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    /// First element of the range.
    pub start: usize,
    /// Length of the range; [`DrawRange::UNLIMITED`] draws everything from
    /// `start`.
    pub count: usize,
}

impl DrawRange {
    /// Sentinel count meaning "draw everything from start".
    pub const UNLIMITED: usize = usize::MAX;
}

impl Default for DrawRange {
    fn default() -> Self {
        Self {
            start: 0,
            count: Self::UNLIMITED,
        }
    }
}

/// Index input accepted by [`Geometry::set_index`]: either a ready buffer or
/// a raw sequence of vertex references.
pub enum IndexData {
    /// A pre-built index attribute (item width 1).
    Buffer(AttributeBuffer),
    /// Raw vertex references; the narrowest representable width is chosen.
    Raw(Vec<u32>),
}

impl From<AttributeBuffer> for IndexData {
    fn from(buffer: AttributeBuffer) -> Self {
        Self::Buffer(buffer)
    }
}

impl From<Vec<u32>> for IndexData {
    fn from(indices: Vec<u32>) -> Self {
        Self::Raw(indices)
    }
}

impl From<&[u32]> for IndexData {
    fn from(indices: &[u32]) -> Self {
        Self::Raw(indices.to_vec())
    }
}

/// Mesh-data container: per-vertex attribute buffers, an optional index
/// buffer, morph-target attribute lists and multi-material draw groups.
///
/// Created empty, populated through the `set_*` operations, optionally
/// transformed in place, then handed to derivation methods
/// (`compute_bounding_box`, `compute_vertex_normals`, `compute_tangents`, …)
/// on demand. Derived bounds stay cached until a transform recomputes them;
/// arbitrary attribute edits do not invalidate them, re-triggering the
/// computation is the caller's responsibility.
pub struct Geometry {
    id: u64,
    uuid: Uuid,
    /// Optional name carried into the interchange form.
    pub name: String,
    pub(crate) index: Option<AttributeBuffer>,
    pub(crate) attributes: BTreeMap<String, AttributeBuffer>,
    pub(crate) morph_attributes: BTreeMap<String, Vec<AttributeBuffer>>,
    /// Whether morph buffers store deltas from the base attribute (true) or
    /// absolute values (false).
    pub morph_targets_relative: bool,
    pub(crate) groups: Vec<DrawGroup>,
    pub(crate) draw_range: DrawRange,
    pub(crate) bounding_box: Option<Box3>,
    pub(crate) bounding_sphere: Option<BoundingSphere>,
    /// Free-form user metadata, passed through serialization verbatim.
    pub user_data: serde_json::Value,
    pub(crate) parameters: Option<ShapeParameters>,
    events: EventDispatcher,
}

impl Geometry {
    /// Create an empty geometry with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed),
            uuid: Uuid::new_v4(),
            name: String::new(),
            index: None,
            attributes: BTreeMap::new(),
            morph_attributes: BTreeMap::new(),
            morph_targets_relative: false,
            groups: Vec::new(),
            draw_range: DrawRange::default(),
            bounding_box: None,
            bounding_sphere: None,
            user_data: serde_json::Value::Null,
            parameters: None,
            events: EventDispatcher::new(),
        }
    }

    /// Process-lifetime-ordered numeric id, assigned at construction.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stable unique identifier, assigned at construction.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    // -- Index ---------------------------------------------------------------

    /// Install an index buffer, replacing any existing one. Raw sequences get
    /// the narrowest integer width that represents their maximum value.
    pub fn set_index(&mut self, index: impl Into<IndexData>) {
        self.index = Some(match index.into() {
            IndexData::Buffer(buffer) => buffer,
            IndexData::Raw(values) => AttributeBuffer::from_indices(&values),
        });
    }

    /// Remove the index buffer, making the geometry non-indexed.
    pub fn clear_index(&mut self) {
        self.index = None;
    }

    /// The index buffer, if present.
    pub fn index(&self) -> Option<&AttributeBuffer> {
        self.index.as_ref()
    }

    // -- Attributes ----------------------------------------------------------

    /// Install an attribute buffer under `name`, replacing any prior buffer.
    pub fn set_attribute(&mut self, name: impl Into<String>, buffer: AttributeBuffer) {
        self.attributes.insert(name.into(), buffer);
    }

    /// The attribute installed under `name`, if any.
    pub fn attribute(&self, name: &str) -> Option<&AttributeBuffer> {
        self.attributes.get(name)
    }

    /// Mutable access to the attribute installed under `name`.
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut AttributeBuffer> {
        self.attributes.get_mut(name)
    }

    /// Whether an attribute is installed under `name`.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Remove and return the attribute installed under `name`.
    pub fn delete_attribute(&mut self, name: &str) -> Option<AttributeBuffer> {
        self.attributes.remove(name)
    }

    /// All installed attributes, keyed by name.
    pub fn attributes(&self) -> &BTreeMap<String, AttributeBuffer> {
        &self.attributes
    }

    // -- Morph targets -------------------------------------------------------

    /// Install the morph-target buffer list for the attribute `name`.
    pub fn set_morph_attribute(&mut self, name: impl Into<String>, targets: Vec<AttributeBuffer>) {
        self.morph_attributes.insert(name.into(), targets);
    }

    /// The morph-target buffers registered for `name`, if any.
    pub fn morph_attribute(&self, name: &str) -> Option<&[AttributeBuffer]> {
        self.morph_attributes.get(name).map(|v| v.as_slice())
    }

    /// Remove and return the morph-target buffers registered for `name`.
    pub fn delete_morph_attribute(&mut self, name: &str) -> Option<Vec<AttributeBuffer>> {
        self.morph_attributes.remove(name)
    }

    /// All morph-target buffer lists, keyed by attribute name.
    pub fn morph_attributes(&self) -> &BTreeMap<String, Vec<AttributeBuffer>> {
        &self.morph_attributes
    }

    // -- Groups and draw range -----------------------------------------------

    /// Append a draw group covering `[start, start + count)` of the
    /// index/vertex stream.
    pub fn add_group(&mut self, start: usize, count: usize, material_index: u32) {
        self.groups.push(DrawGroup {
            start,
            count,
            material_index,
        });
    }

    /// Remove all draw groups.
    pub fn clear_groups(&mut self) {
        self.groups.clear();
    }

    /// The ordered draw-group list.
    pub fn groups(&self) -> &[DrawGroup] {
        &self.groups
    }

    /// Overwrite the draw range. Pass [`DrawRange::UNLIMITED`] as `count` to
    /// draw everything from `start`.
    pub fn set_draw_range(&mut self, start: usize, count: usize) {
        self.draw_range = DrawRange { start, count };
    }

    /// The current draw range.
    pub fn draw_range(&self) -> DrawRange {
        self.draw_range
    }

    // -- Cached bounds -------------------------------------------------------

    /// The cached bounding box; `None` until computed.
    pub fn bounding_box(&self) -> Option<&Box3> {
        self.bounding_box.as_ref()
    }

    /// The cached bounding sphere; `None` until computed.
    pub fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere.as_ref()
    }

    // -- Generator parameters ------------------------------------------------

    /// Construction parameters when this geometry was produced by a shape
    /// builder; serialization short-circuits to these.
    pub fn parameters(&self) -> Option<&ShapeParameters> {
        self.parameters.as_ref()
    }

    /// Record the shape-builder parameters this geometry was built from.
    pub fn set_parameters(&mut self, parameters: ShapeParameters) {
        self.parameters = Some(parameters);
    }

    // -- Point assignment ----------------------------------------------------

    /// Write `points` into the position attribute.
    ///
    /// Overwrites an existing position buffer in place; if the point list
    /// exceeds its capacity, only the portion that fits is written and a
    /// warning is reported. Creates a fresh 3-component f32 position buffer
    /// when none exists.
    pub fn set_from_points(&mut self, points: &[Vec3]) {
        match self.attributes.get_mut("position") {
            Some(position) => {
                let capacity = position.count();
                for (i, p) in points.iter().take(capacity).enumerate() {
                    position.set_xyz(i, p.x, p.y, p.z);
                }
                if points.len() > capacity {
                    log::warn!(
                        "set_from_points: position buffer holds {} vertices, {} points given; extra points dropped",
                        capacity,
                        points.len()
                    );
                }
            }
            None => {
                let mut array = Vec::with_capacity(points.len() * 3);
                for p in points {
                    array.extend_from_slice(&[p.x, p.y, p.z]);
                }
                self.set_attribute("position", AttributeBuffer::from_f32(array, 3));
            }
        }
    }

    // -- Copying -------------------------------------------------------------

    /// Deep-copy all data from `source` into this geometry, keeping this
    /// geometry's identity and listeners.
    pub fn copy(&mut self, source: &Geometry) {
        self.name = source.name.clone();
        self.index = source.index.clone();
        self.attributes = source.attributes.clone();
        self.morph_attributes = source.morph_attributes.clone();
        self.morph_targets_relative = source.morph_targets_relative;
        self.groups = source.groups.clone();
        self.draw_range = source.draw_range;
        self.bounding_box = source.bounding_box;
        self.bounding_sphere = source.bounding_sphere;
        self.user_data = source.user_data.clone();
        self.parameters = source.parameters.clone();
    }

    // -- Disposal ------------------------------------------------------------

    /// Register a listener on this geometry's event dispatcher.
    pub fn add_event_listener(
        &mut self,
        kind: impl Into<String>,
        callback: impl FnMut(&Event) + Send + 'static,
    ) -> ListenerId {
        self.events.add_event_listener(kind, callback)
    }

    /// Remove a previously registered listener.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.events.remove_event_listener(id)
    }

    /// Broadcast the `"dispose"` notification so render-side resources can be
    /// released. Does not free any buffer memory itself.
    pub fn dispose(&mut self) {
        self.events.dispatch_event("dispose");
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Geometry {
    /// Deep copy with a fresh identity; event listeners are not carried over.
    fn clone(&self) -> Self {
        let mut geometry = Geometry::new();
        geometry.copy(self);
        geometry
    }
}

impl std::fmt::Debug for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("indexed", &self.index.is_some())
            .field("groups", &self.groups.len())
            .field("morph_targets_relative", &self.morph_targets_relative)
            .finish()
    }
}
