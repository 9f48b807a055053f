//! Vertex-normal computation.

use super::attribute::AttributeBuffer;
use super::data::Geometry;

fn normalize_attribute(normal: &mut AttributeBuffer) {
    for i in 0..normal.count() {
        let v = normal.vec3_at(i);
        let n = v.norm();
        if n > 0.0 {
            normal.set_vec3(i, v / n);
        }
    }
}

impl Geometry {
    /// Recompute the normal attribute from positions.
    ///
    /// A full recompute: an existing normal buffer is zeroed first, a missing
    /// one is created to match the position count. Indexed geometry sums the
    /// (non-normalized) face normal of every triangle into its three corners,
    /// smoothing shared vertices; non-indexed geometry assigns each
    /// consecutive vertex triple its own flat face normal. Every normal is
    /// normalized at the end. Does nothing without a position attribute.
    pub fn compute_vertex_normals(&mut self) {
        let vertex_count = match self.attributes.get("position") {
            Some(p) => p.count(),
            None => return,
        };

        // Take the normal buffer out of the map so positions can be read
        // while it is written.
        let mut normal = match self.attributes.remove("normal") {
            Some(mut n) => {
                for i in 0..n.count() {
                    n.set_xyz(i, 0.0, 0.0, 0.0);
                }
                n
            }
            None => AttributeBuffer::zeroed_f32(vertex_count, 3),
        };

        let position = &self.attributes["position"];

        if let Some(index) = &self.index {
            for tri in 0..index.count() / 3 {
                let a = index.u32_at(tri * 3) as usize;
                let b = index.u32_at(tri * 3 + 1) as usize;
                let c = index.u32_at(tri * 3 + 2) as usize;

                let p_a = position.vec3_at(a);
                let p_b = position.vec3_at(b);
                let p_c = position.vec3_at(c);

                let face = (p_c - p_b).cross(&(p_a - p_b));

                for corner in [a, b, c] {
                    let sum = normal.vec3_at(corner) + face;
                    normal.set_vec3(corner, sum);
                }
            }
        } else {
            // Non-indexed: each vertex belongs to exactly one triangle.
            for tri in 0..position.count() / 3 {
                let a = tri * 3;
                let p_a = position.vec3_at(a);
                let p_b = position.vec3_at(a + 1);
                let p_c = position.vec3_at(a + 2);

                let face = (p_c - p_b).cross(&(p_a - p_b));
                normal.set_vec3(a, face);
                normal.set_vec3(a + 1, face);
                normal.set_vec3(a + 2, face);
            }
        }

        normalize_attribute(&mut normal);
        self.attributes.insert("normal".into(), normal);
    }

    /// Normalize every entry of the normal attribute to unit length.
    /// Zero-length normals are left untouched.
    pub fn normalize_normals(&mut self) {
        if let Some(normal) = self.attributes.get_mut("normal") {
            normalize_attribute(normal);
        }
    }
}
