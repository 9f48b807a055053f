//! Indexed to non-indexed conversion.

use super::attribute::{AttributeBuffer, AttributeData};
use super::data::Geometry;

/// Materialize the index indirection for one attribute: every index entry
/// becomes an independent vertex, preserving the numeric representation.
fn convert_attribute(attribute: &AttributeBuffer, index: &AttributeBuffer) -> AttributeBuffer {
    let item_size = attribute.item_size();
    let expanded = index.count() * item_size;

    let data = match attribute.data() {
        AttributeData::Float32(source) => {
            let mut array = Vec::with_capacity(expanded);
            for i in 0..index.count() {
                let offset = index.u32_at(i) as usize * item_size;
                array.extend_from_slice(&source[offset..offset + item_size]);
            }
            AttributeData::Float32(array)
        }
        AttributeData::Uint16(source) => {
            let mut array = Vec::with_capacity(expanded);
            for i in 0..index.count() {
                let offset = index.u32_at(i) as usize * item_size;
                array.extend_from_slice(&source[offset..offset + item_size]);
            }
            AttributeData::Uint16(array)
        }
        AttributeData::Uint32(source) => {
            let mut array = Vec::with_capacity(expanded);
            for i in 0..index.count() {
                let offset = index.u32_at(i) as usize * item_size;
                array.extend_from_slice(&source[offset..offset + item_size]);
            }
            AttributeData::Uint32(array)
        }
        AttributeData::Device { .. } => AttributeData::Device { len: expanded },
    };

    AttributeBuffer::new(data, item_size).with_normalized(attribute.normalized())
}

impl Geometry {
    /// Build a non-indexed copy: every attribute (and morph-target attribute)
    /// is expanded through the index so each triangle stores independent,
    /// unshared vertices. Draw groups and the morph-relativity flag carry
    /// over verbatim; the result has no index.
    ///
    /// Calling this on an already non-indexed geometry is reported and
    /// returns an unchanged copy.
    pub fn to_non_indexed(&self) -> Geometry {
        let index = match &self.index {
            Some(index) => index,
            None => {
                log::warn!("to_non_indexed: geometry is already non-indexed");
                return self.clone();
            }
        };

        let mut geometry = Geometry::new();

        for (name, attribute) in &self.attributes {
            geometry.set_attribute(name.clone(), convert_attribute(attribute, index));
        }

        for (name, targets) in &self.morph_attributes {
            let expanded = targets
                .iter()
                .map(|target| convert_attribute(target, index))
                .collect();
            geometry.set_morph_attribute(name.clone(), expanded);
        }
        geometry.morph_targets_relative = self.morph_targets_relative;

        for group in &self.groups {
            geometry.add_group(group.start, group.count, group.material_index);
        }

        geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_attributes_through_the_index() {
        let mut g = Geometry::new();
        g.set_attribute(
            "position",
            AttributeBuffer::from_f32(
                vec![
                    0.0, 0.0, 0.0, //
                    1.0, 0.0, 0.0, //
                    0.0, 1.0, 0.0, //
                    1.0, 1.0, 0.0,
                ],
                3,
            ),
        );
        g.set_index(vec![0u32, 1, 2, 2, 1, 3]);

        let expanded = g.to_non_indexed();
        assert!(expanded.index().is_none());

        let position = expanded.attribute("position").unwrap();
        assert_eq!(position.count(), 6);
        for (slot, &src) in [0usize, 1, 2, 2, 1, 3].iter().enumerate() {
            assert_eq!(
                position.vec3_at(slot),
                g.attribute("position").unwrap().vec3_at(src)
            );
        }
    }

    #[test]
    fn carries_groups_morphs_and_relativity() {
        let mut g = Geometry::new();
        g.set_attribute("position", AttributeBuffer::zeroed_f32(3, 3));
        g.set_morph_attribute(
            "position",
            vec![AttributeBuffer::from_f32(
                vec![1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0],
                3,
            )],
        );
        g.morph_targets_relative = true;
        g.set_index(vec![2u32, 1, 0]);
        g.add_group(0, 3, 7);

        let expanded = g.to_non_indexed();
        assert!(expanded.morph_targets_relative);
        assert_eq!(expanded.groups(), g.groups());

        let morph = &expanded.morph_attribute("position").unwrap()[0];
        assert_eq!(morph.count(), 3);
        assert_eq!(morph.x(0), 3.0);
        assert_eq!(morph.x(2), 1.0);
    }

    #[test]
    fn preserves_integer_representations() {
        let mut g = Geometry::new();
        g.set_attribute(
            "joints",
            AttributeBuffer::new(AttributeData::Uint16(vec![5, 6, 7]), 1),
        );
        g.set_index(vec![2u32, 0]);
        let expanded = g.to_non_indexed();
        let joints = expanded.attribute("joints").unwrap();
        assert_eq!(joints.data().type_tag(), "Uint16Array");
        assert_eq!(joints.u32_at(0), 7);
        assert_eq!(joints.u32_at(1), 5);
    }

    #[test]
    fn non_indexed_input_returns_unchanged_copy() {
        let mut g = Geometry::new();
        g.set_attribute("position", AttributeBuffer::from_f32(vec![1.0, 2.0, 3.0], 3));
        let copy = g.to_non_indexed();
        assert!(copy.index().is_none());
        assert_eq!(
            copy.attribute("position").unwrap(),
            g.attribute("position").unwrap()
        );
    }
}
