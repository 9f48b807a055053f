//! Versioned JSON interchange form.
//!
//! [`Geometry::to_json`] produces a self-describing record (format version
//! 4.6): identity, index, attributes, morph sets, groups and the bounding
//! sphere when computed. Generator-backed geometries short-circuit to their
//! construction parameters and omit buffer contents entirely.
//! [`Geometry::from_json`] reconstructs an equivalent geometry from either
//! shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::generators::{generate_box, generate_plane, ShapeParameters};
use crate::math::{BoundingSphere, Vec3};

use super::attribute::{AttributeBuffer, AttributeData};
use super::data::{DrawGroup, Geometry};

/// Interchange format version.
pub const FORMAT_VERSION: f64 = 4.6;

/// Errors reconstructing a geometry from its interchange form.
#[derive(Debug)]
pub enum JsonError {
    /// The record carries neither buffer data nor generator parameters.
    MissingData,
    /// An attribute or index carries an unknown numeric type tag.
    UnknownArrayType(String),
    /// An attribute's array length is not a multiple of its item size.
    BadArrayLength {
        /// Attribute name.
        name: String,
        /// Array length found.
        len: usize,
        /// Declared item size.
        item_size: usize,
    },
    /// The record is not valid JSON for this format.
    Parse(serde_json::Error),
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingData => write!(f, "record has no buffer data and no shape parameters"),
            Self::UnknownArrayType(tag) => write!(f, "unknown array type tag: {tag}"),
            Self::BadArrayLength {
                name,
                len,
                item_size,
            } => write!(
                f,
                "attribute '{name}': array length {len} is not a multiple of item size {item_size}"
            ),
            Self::Parse(e) => write!(f, "parse error: {e}"),
        }
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Format metadata header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonMetadata {
    /// Format version; [`FORMAT_VERSION`] when written by this crate.
    pub version: f64,
    /// Record type, always `"Geometry"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Producing library.
    pub generator: String,
}

/// Serialized form of one attribute buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeJson {
    /// Components per vertex.
    pub item_size: usize,
    /// Numeric type tag (`"Float32Array"`, `"Uint16Array"`, `"Uint32Array"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Flat value sequence.
    pub array: Vec<f64>,
    /// Normalization flag.
    #[serde(default)]
    pub normalized: bool,
}

/// Serialized form of the index buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexJson {
    /// Numeric type tag (`"Uint16Array"` or `"Uint32Array"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Flat vertex-reference sequence.
    pub array: Vec<u32>,
}

/// Serialized bounding sphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingSphereJson {
    /// Center as `[x, y, z]`.
    pub center: [f32; 3],
    /// Radius.
    pub radius: f32,
}

/// Buffer payload of a geometry record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryDataJson {
    /// Index buffer, if the geometry is indexed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexJson>,
    /// All attribute buffers, keyed by name.
    pub attributes: BTreeMap<String, AttributeJson>,
    /// Morph-target buffer lists, keyed by attribute name; omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morph_attributes: Option<BTreeMap<String, Vec<AttributeJson>>>,
    /// Morph interpretation switch; omitted without morph attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morph_targets_relative: Option<bool>,
    /// Draw groups, verbatim; omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<DrawGroup>>,
    /// Bounding sphere, if computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_sphere: Option<BoundingSphereJson>,
}

/// A complete geometry interchange record.
///
/// Exactly one of `data` (raw buffers) or the flattened generator parameters
/// is present. For generator-backed records `kind` names the shape type and
/// `extra` holds its flat construction arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryJson {
    /// Format header.
    pub metadata: JsonMetadata,
    /// Stable identity of the source geometry.
    pub uuid: String,
    /// `"Geometry"`, or the shape type name for generator-backed records.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional geometry name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form user metadata.
    #[serde(rename = "userData", skip_serializing_if = "Option::is_none")]
    pub user_data: Option<serde_json::Value>,
    /// Buffer payload; absent for generator-backed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GeometryDataJson>,
    /// Flat generator parameters; empty for raw-buffer records.
    #[serde(flatten, default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn attribute_to_json(attribute: &AttributeBuffer) -> AttributeJson {
    let array: Vec<f64> = match attribute.data() {
        AttributeData::Float32(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeData::Uint16(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeData::Uint32(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeData::Device { .. } => {
            log::warn!("to_json: device-resident attribute serialized as an empty array");
            Vec::new()
        }
    };
    AttributeJson {
        item_size: attribute.item_size(),
        kind: attribute.data().type_tag().to_string(),
        array,
        normalized: attribute.normalized(),
    }
}

fn attribute_from_json(name: &str, json: &AttributeJson) -> Result<AttributeBuffer, JsonError> {
    let data = match json.kind.as_str() {
        "Float32Array" => AttributeData::Float32(json.array.iter().map(|&x| x as f32).collect()),
        "Uint16Array" => AttributeData::Uint16(json.array.iter().map(|&x| x as u16).collect()),
        "Uint32Array" => AttributeData::Uint32(json.array.iter().map(|&x| x as u32).collect()),
        other => return Err(JsonError::UnknownArrayType(other.to_string())),
    };
    if json.item_size == 0 || data.len() % json.item_size != 0 {
        return Err(JsonError::BadArrayLength {
            name: name.to_string(),
            len: data.len(),
            item_size: json.item_size,
        });
    }
    Ok(AttributeBuffer::new(data, json.item_size).with_normalized(json.normalized))
}

impl Geometry {
    /// Serialize into the versioned interchange record.
    ///
    /// Generator-backed geometries emit only identity plus construction
    /// parameters: the instance is reconstructible from its arguments and the
    /// buffer contents are omitted.
    pub fn to_json(&self) -> GeometryJson {
        let metadata = JsonMetadata {
            version: FORMAT_VERSION,
            kind: "Geometry".to_string(),
            generator: concat!("geometry-engine ", env!("CARGO_PKG_VERSION")).to_string(),
        };

        if let Some(parameters) = &self.parameters {
            // The shape's tag lands in `kind`; the flat arguments in `extra`.
            let extra = match serde_json::to_value(parameters) {
                Ok(serde_json::Value::Object(mut map)) => {
                    map.remove("type");
                    map
                }
                _ => serde_json::Map::new(),
            };
            return GeometryJson {
                metadata,
                uuid: self.uuid().to_string(),
                kind: parameters.type_name().to_string(),
                name: (!self.name.is_empty()).then(|| self.name.clone()),
                user_data: (!self.user_data.is_null()).then(|| self.user_data.clone()),
                data: None,
                extra,
            };
        }

        let mut data = GeometryDataJson {
            index: self.index.as_ref().map(|index| IndexJson {
                kind: index.data().type_tag().to_string(),
                array: (0..index.count()).map(|i| index.u32_at(i)).collect(),
            }),
            ..Default::default()
        };

        for (name, attribute) in &self.attributes {
            data.attributes
                .insert(name.clone(), attribute_to_json(attribute));
        }

        if !self.morph_attributes.is_empty() {
            let mut morphs = BTreeMap::new();
            for (name, targets) in &self.morph_attributes {
                morphs.insert(
                    name.clone(),
                    targets.iter().map(attribute_to_json).collect::<Vec<_>>(),
                );
            }
            data.morph_attributes = Some(morphs);
            data.morph_targets_relative = Some(self.morph_targets_relative);
        }

        if !self.groups.is_empty() {
            data.groups = Some(self.groups.clone());
        }

        if let Some(sphere) = &self.bounding_sphere {
            data.bounding_sphere = Some(BoundingSphereJson {
                center: [sphere.center.x, sphere.center.y, sphere.center.z],
                radius: sphere.radius,
            });
        }

        GeometryJson {
            metadata,
            uuid: self.uuid().to_string(),
            kind: "Geometry".to_string(),
            name: (!self.name.is_empty()).then(|| self.name.clone()),
            user_data: (!self.user_data.is_null()).then(|| self.user_data.clone()),
            data: Some(data),
            extra: serde_json::Map::new(),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&self.to_json())?)
    }

    /// Reconstruct a geometry from an interchange record.
    ///
    /// Generator-backed records are rebuilt by re-running the generator with
    /// the recorded parameters. The reconstructed geometry has a fresh
    /// identity.
    pub fn from_json(json: &GeometryJson) -> Result<Geometry, JsonError> {
        let parameters: Option<ShapeParameters> = if json.kind != "Geometry" {
            let mut map = json.extra.clone();
            map.insert(
                "type".to_string(),
                serde_json::Value::String(json.kind.clone()),
            );
            Some(serde_json::from_value(serde_json::Value::Object(map))?)
        } else {
            None
        };

        let mut geometry = match (parameters, &json.data) {
            (Some(parameters), _) => match parameters {
                ShapeParameters::Box {
                    width,
                    height,
                    depth,
                    width_segments,
                    height_segments,
                    depth_segments,
                } => generate_box(
                    width,
                    height,
                    depth,
                    width_segments,
                    height_segments,
                    depth_segments,
                ),
                ShapeParameters::Plane {
                    width,
                    height,
                    width_segments,
                    height_segments,
                } => generate_plane(width, height, width_segments, height_segments),
            },
            (None, Some(data)) => {
                let mut geometry = Geometry::new();

                if let Some(index) = &data.index {
                    let buffer = match index.kind.as_str() {
                        "Uint16Array" => AttributeBuffer::new(
                            AttributeData::Uint16(
                                index.array.iter().map(|&i| i as u16).collect(),
                            ),
                            1,
                        ),
                        "Uint32Array" => {
                            AttributeBuffer::new(AttributeData::Uint32(index.array.clone()), 1)
                        }
                        other => return Err(JsonError::UnknownArrayType(other.to_string())),
                    };
                    geometry.set_index(buffer);
                }

                for (name, attribute) in &data.attributes {
                    geometry.set_attribute(name.clone(), attribute_from_json(name, attribute)?);
                }

                if let Some(morphs) = &data.morph_attributes {
                    for (name, targets) in morphs {
                        let targets = targets
                            .iter()
                            .map(|t| attribute_from_json(name, t))
                            .collect::<Result<Vec<_>, _>>()?;
                        geometry.set_morph_attribute(name.clone(), targets);
                    }
                    geometry.morph_targets_relative =
                        data.morph_targets_relative.unwrap_or(false);
                }

                if let Some(groups) = &data.groups {
                    for group in groups {
                        geometry.add_group(group.start, group.count, group.material_index);
                    }
                }

                if let Some(sphere) = &data.bounding_sphere {
                    geometry.bounding_sphere = Some(BoundingSphere::new(
                        Vec3::new(sphere.center[0], sphere.center[1], sphere.center[2]),
                        sphere.radius,
                    ));
                }

                geometry
            }
            (None, None) => return Err(JsonError::MissingData),
        };

        if let Some(name) = &json.name {
            geometry.name = name.clone();
        }
        if let Some(user_data) = &json.user_data {
            geometry.user_data = user_data.clone();
        }

        Ok(geometry)
    }

    /// Reconstruct a geometry from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Geometry, JsonError> {
        let json: GeometryJson = serde_json::from_str(input)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_geometry() -> Geometry {
        let mut g = Geometry::new();
        g.name = "sample".to_string();
        g.set_attribute(
            "position",
            AttributeBuffer::from_f32(
                vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
                3,
            ),
        );
        g.set_attribute(
            "uv",
            AttributeBuffer::from_f32(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2),
        );
        g.set_index(vec![0u32, 1, 2, 2, 1, 3]);
        g.add_group(0, 3, 0);
        g.add_group(3, 3, 1);
        g.set_morph_attribute(
            "position",
            vec![AttributeBuffer::from_f32(vec![0.5; 12], 3)],
        );
        g.morph_targets_relative = true;
        g.user_data = serde_json::json!({ "lod": 2 });
        g
    }

    #[test]
    fn round_trip_preserves_buffers() {
        let mut g = sample_geometry();
        g.compute_bounding_sphere();

        let record = g.to_json();
        assert_eq!(record.metadata.version, FORMAT_VERSION);
        assert_eq!(record.kind, "Geometry");

        let text = serde_json::to_string(&record).unwrap();
        let rebuilt = Geometry::from_json_str(&text).unwrap();

        assert_eq!(rebuilt.name, "sample");
        assert_eq!(rebuilt.user_data, g.user_data);
        assert!(rebuilt.morph_targets_relative);
        assert_eq!(rebuilt.groups(), g.groups());
        assert_eq!(rebuilt.index().unwrap(), g.index().unwrap());
        assert_eq!(
            rebuilt.attribute("position").unwrap(),
            g.attribute("position").unwrap()
        );
        assert_eq!(rebuilt.attribute("uv").unwrap(), g.attribute("uv").unwrap());
        assert_eq!(
            rebuilt.morph_attribute("position").unwrap(),
            g.morph_attribute("position").unwrap()
        );
        assert_eq!(
            rebuilt.bounding_sphere().unwrap(),
            g.bounding_sphere().unwrap()
        );
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut g = Geometry::new();
        g.set_attribute("position", AttributeBuffer::from_f32(vec![0.0; 3], 3));
        let record = g.to_json();
        let data = record.data.as_ref().unwrap();
        assert!(data.index.is_none());
        assert!(data.morph_attributes.is_none());
        assert!(data.groups.is_none());
        assert!(data.bounding_sphere.is_none());
        assert!(record.name.is_none());
        assert!(record.user_data.is_none());
    }

    #[test]
    fn generator_backed_records_short_circuit() {
        let g = crate::generators::generate_box(2.0, 1.0, 1.0, 1, 1, 1);
        let record = g.to_json();
        assert_eq!(record.kind, "BoxGeometry");
        assert!(record.data.is_none());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["width"], 2.0);
        assert_eq!(value["type"], "BoxGeometry");
        assert!(value.get("data").is_none());

        let rebuilt = Geometry::from_json(&record).unwrap();
        assert_eq!(rebuilt.attribute("position").unwrap().count(), 24);
        assert_eq!(rebuilt.index().unwrap().count(), 36);
        assert_eq!(rebuilt.groups().len(), 6);
    }

    #[test]
    fn index_width_survives_round_trip() {
        let mut g = Geometry::new();
        g.set_attribute("position", AttributeBuffer::zeroed_f32(70000, 3));
        g.set_index(vec![0u32, 69999]);
        let rebuilt = Geometry::from_json(&g.to_json()).unwrap();
        assert_eq!(rebuilt.index().unwrap().data().type_tag(), "Uint32Array");
        assert_eq!(rebuilt.index().unwrap().u32_at(1), 69999);
    }

    #[test]
    fn rejects_malformed_records() {
        let err = Geometry::from_json_str("{\"not\": \"a geometry\"}").unwrap_err();
        assert!(matches!(err, JsonError::Parse(_)));

        let mut record = sample_geometry().to_json();
        if let Some(data) = record.data.as_mut() {
            data.attributes.get_mut("position").unwrap().item_size = 5;
        }
        let err = Geometry::from_json(&record).unwrap_err();
        assert!(matches!(err, JsonError::BadArrayLength { .. }));

        let mut record = sample_geometry().to_json();
        if let Some(data) = record.data.as_mut() {
            data.attributes.get_mut("position").unwrap().kind = "Float64Array".into();
        }
        let err = Geometry::from_json(&record).unwrap_err();
        assert!(matches!(err, JsonError::UnknownArrayType(_)));
    }
}
