//! Tangent-space construction from UV-mapped triangles.

use crate::math::Vec3;

use super::attribute::AttributeBuffer;
use super::data::{DrawGroup, Geometry};

impl Geometry {
    /// Compute a 4-component tangent attribute (xyz = direction, w =
    /// handedness sign) from index, position, normal and uv data.
    ///
    /// Per-triangle tangent and bitangent directions are accumulated into
    /// per-vertex totals, then each referenced vertex gets its total
    /// orthogonalized against the vertex normal (Gram-Schmidt) and a
    /// handedness sign resolving mirrored UV mappings. Triangles with a
    /// degenerate (collapsed) UV mapping contribute nothing. The operation is
    /// reported and aborts without effect when any required attribute is
    /// missing.
    pub fn compute_tangents(&mut self) {
        let has_inputs = self.index.is_some()
            && self.attributes.contains_key("position")
            && self.attributes.contains_key("normal")
            && self.attributes.contains_key("uv");
        if !has_inputs {
            log::error!(
                "compute_tangents: missing required attributes (index, position, normal and uv)"
            );
            return;
        }

        let vertex_count = self.attributes["position"].count();

        // Take any existing tangent buffer out of the map so the read-only
        // inputs can be borrowed while it is written.
        let mut tangent = match self.attributes.remove("tangent") {
            Some(t) if t.count() == vertex_count && t.item_size() == 4 => t,
            _ => AttributeBuffer::zeroed_f32(vertex_count, 4),
        };

        let index = match &self.index {
            Some(index) => index,
            None => return,
        };
        let position = &self.attributes["position"];
        let normal = &self.attributes["normal"];
        let uv = &self.attributes["uv"];

        let mut tan1 = vec![Vec3::zeros(); vertex_count];
        let mut tan2 = vec![Vec3::zeros(); vertex_count];

        let whole_range;
        let groups: &[DrawGroup] = if self.groups.is_empty() {
            whole_range = [DrawGroup {
                start: 0,
                count: index.count(),
                material_index: 0,
            }];
            &whole_range
        } else {
            &self.groups
        };

        // Pass 1: accumulate per-triangle tangent/bitangent directions.
        for group in groups {
            let end = (group.start + group.count).min(index.count());
            let mut i = group.start;
            while i + 3 <= end {
                let a = index.u32_at(i) as usize;
                let b = index.u32_at(i + 1) as usize;
                let c = index.u32_at(i + 2) as usize;

                let v_b = position.vec3_at(b) - position.vec3_at(a);
                let v_c = position.vec3_at(c) - position.vec3_at(a);
                let uv_b = uv.vec2_at(b) - uv.vec2_at(a);
                let uv_c = uv.vec2_at(c) - uv.vec2_at(a);

                let r = 1.0 / (uv_b.x * uv_c.y - uv_c.x * uv_b.y);

                // Degenerate UV triangle: skip its contribution entirely so
                // NaN never propagates into the accumulators.
                if r.is_finite() {
                    let sdir = (v_b * uv_c.y - v_c * uv_b.y) * r;
                    let tdir = (v_c * uv_b.x - v_b * uv_c.x) * r;
                    for corner in [a, b, c] {
                        tan1[corner] += sdir;
                        tan2[corner] += tdir;
                    }
                }

                i += 3;
            }
        }

        // Pass 2: orthogonalize and resolve handedness per referenced vertex.
        for group in groups {
            let end = (group.start + group.count).min(index.count());
            for i in group.start..end {
                let v = index.u32_at(i) as usize;

                let n = normal.vec3_at(v);
                let t = tan1[v];

                // Gram-Schmidt: remove the normal component, then normalize.
                let mut orthogonal = t - n * n.dot(&t);
                let len = orthogonal.norm();
                if len > 0.0 {
                    orthogonal /= len;
                }

                let w = if n.cross(&t).dot(&tan2[v]) < 0.0 {
                    -1.0
                } else {
                    1.0
                };

                tangent.set_xyzw(v, orthogonal.x, orthogonal.y, orthogonal.z, w);
            }
        }

        self.attributes.insert("tangent".into(), tangent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A unit quad in the XY plane with +Z normals, standard UVs and two
    /// triangles.
    fn uv_quad(uvs: Vec<f32>) -> Geometry {
        let mut g = Geometry::new();
        g.set_attribute(
            "position",
            AttributeBuffer::from_f32(
                vec![
                    0.0, 0.0, 0.0, //
                    1.0, 0.0, 0.0, //
                    1.0, 1.0, 0.0, //
                    0.0, 1.0, 0.0,
                ],
                3,
            ),
        );
        g.set_attribute(
            "normal",
            AttributeBuffer::from_f32(
                vec![
                    0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0,
                ],
                3,
            ),
        );
        g.set_attribute("uv", AttributeBuffer::from_f32(uvs, 2));
        g.set_index(vec![0u32, 1, 2, 0, 2, 3]);
        g
    }

    #[test]
    fn quad_tangent_follows_u_axis() {
        let mut g = uv_quad(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        g.compute_tangents();

        let tangent = g.attribute("tangent").unwrap();
        assert_eq!(tangent.item_size(), 4);
        assert_eq!(tangent.count(), 4);
        for i in 0..4 {
            assert!((tangent.vec3_at(i) - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
            assert_eq!(tangent.w(i), 1.0);
        }
    }

    #[test]
    fn mirrored_uvs_flip_handedness() {
        // Two quads side by side; the right quad's U axis is mirrored.
        let mut g = Geometry::new();
        g.set_attribute(
            "position",
            AttributeBuffer::from_f32(
                vec![
                    0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, // left quad
                    1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 1.0, 0.0, 1.0, 1.0, 0.0, // right quad
                ],
                3,
            ),
        );
        g.set_attribute(
            "normal",
            AttributeBuffer::from_f32(
                (0..8).flat_map(|_| [0.0, 0.0, 1.0]).collect::<Vec<f32>>(),
                3,
            ),
        );
        g.set_attribute(
            "uv",
            AttributeBuffer::from_f32(
                vec![
                    0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, // standard
                    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, // U mirrored
                ],
                2,
            ),
        );
        g.set_index(vec![0u32, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);

        g.compute_tangents();
        let tangent = g.attribute("tangent").unwrap();
        for i in 0..4 {
            assert_eq!(tangent.w(i), 1.0, "unmirrored vertex {i}");
        }
        for i in 4..8 {
            assert_eq!(tangent.w(i), -1.0, "mirrored vertex {i}");
        }
    }

    #[test]
    fn degenerate_uv_triangles_contribute_nothing() {
        // All UVs collapsed to a single point: every triangle is skipped and
        // no NaN reaches the tangent buffer.
        let mut g = uv_quad(vec![0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]);
        g.compute_tangents();
        let tangent = g.attribute("tangent").unwrap();
        for i in 0..4 {
            let t = tangent.vec3_at(i);
            assert!(t.x.is_finite() && t.y.is_finite() && t.z.is_finite());
            assert_eq!(t, Vec3::zeros());
            assert_eq!(tangent.w(i), 1.0);
        }
    }

    #[test]
    fn missing_inputs_abort_without_effect() {
        let mut g = uv_quad(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        g.delete_attribute("uv");
        g.compute_tangents();
        assert!(!g.has_attribute("tangent"));

        let mut g = uv_quad(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        g.clear_index();
        g.compute_tangents();
        assert!(!g.has_attribute("tangent"));
    }

    #[test]
    fn groups_restrict_triangle_iteration() {
        let mut g = uv_quad(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        // Only the first triangle is covered by a group.
        g.add_group(0, 3, 0);
        g.compute_tangents();
        let tangent = g.attribute("tangent").unwrap();
        // Vertex 3 is only referenced by the second (uncovered) triangle.
        assert_eq!(tangent.vec3_at(3), Vec3::zeros());
        assert!((tangent.vec3_at(0) - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }
}
