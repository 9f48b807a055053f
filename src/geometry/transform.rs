//! In-place transform operations.
//!
//! Everything funnels through [`Geometry::apply_matrix4`]: positions get the
//! full affine transform, normals the inverse-transpose (without
//! renormalization), tangents the directional part only. Cached bounding
//! volumes are recomputed only when already present.

use crate::math::{
    mat4_from_quat, mat4_from_rotation_x, mat4_from_rotation_y, mat4_from_rotation_z,
    mat4_from_scale, mat4_from_translation, mat4_look_at_rotation, normal_matrix, transform_direction,
    transform_point, Mat4, Quat, Vec3,
};

use super::data::Geometry;

impl Geometry {
    /// Apply an affine transform to the position, normal and tangent
    /// attributes in place.
    ///
    /// Normals are multiplied by the inverse-transpose of the upper 3x3;
    /// renormalizing them afterwards is the caller's concern. Tangent xyz is
    /// transformed as a direction (no translation), keeping the handedness w.
    pub fn apply_matrix4(&mut self, m: &Mat4) {
        if let Some(position) = self.attributes.get_mut("position") {
            for i in 0..position.count() {
                let v = transform_point(m, position.vec3_at(i));
                position.set_vec3(i, v);
            }
        }

        if let Some(normal) = self.attributes.get_mut("normal") {
            let nm = normal_matrix(m);
            for i in 0..normal.count() {
                let v = nm * normal.vec3_at(i);
                normal.set_vec3(i, v);
            }
        }

        if let Some(tangent) = self.attributes.get_mut("tangent") {
            for i in 0..tangent.count() {
                let v = transform_direction(m, tangent.vec3_at(i));
                tangent.set_xyz(i, v.x, v.y, v.z);
            }
        }

        if self.bounding_box.is_some() {
            self.compute_bounding_box();
        }
        if self.bounding_sphere.is_some() {
            self.compute_bounding_sphere();
        }
    }

    /// Rotate by a quaternion.
    pub fn apply_quaternion(&mut self, q: Quat) {
        self.apply_matrix4(&mat4_from_quat(q));
    }

    /// Rotate around the X axis by `angle` radians.
    pub fn rotate_x(&mut self, angle: f32) {
        self.apply_matrix4(&mat4_from_rotation_x(angle));
    }

    /// Rotate around the Y axis by `angle` radians.
    pub fn rotate_y(&mut self, angle: f32) {
        self.apply_matrix4(&mat4_from_rotation_y(angle));
    }

    /// Rotate around the Z axis by `angle` radians.
    pub fn rotate_z(&mut self, angle: f32) {
        self.apply_matrix4(&mat4_from_rotation_z(angle));
    }

    /// Translate by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        self.apply_matrix4(&mat4_from_translation(offset));
    }

    /// Scale by per-axis `factors`.
    pub fn scale(&mut self, factors: Vec3) {
        self.apply_matrix4(&mat4_from_scale(factors));
    }

    /// Rotate so the local +Z axis points from the origin toward `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.apply_matrix4(&mat4_look_at_rotation(target));
    }

    /// Translate the geometry so its bounding-box centroid sits at the origin.
    pub fn center(&mut self) {
        self.compute_bounding_box();
        let offset = match &self.bounding_box {
            Some(bbox) => -bbox.get_center(),
            None => return,
        };
        self.translate(offset);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::geometry::AttributeBuffer;
    use crate::math::quat_from_xyzw;

    fn triangle() -> Geometry {
        let mut g = Geometry::new();
        g.set_attribute(
            "position",
            AttributeBuffer::from_f32(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 3),
        );
        g.set_attribute(
            "normal",
            AttributeBuffer::from_f32(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 3),
        );
        g.set_attribute(
            "tangent",
            AttributeBuffer::from_f32(
                vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
                4,
            ),
        );
        g
    }

    #[test]
    fn identity_leaves_all_attributes_unchanged() {
        let mut g = triangle();
        let before_p: Vec<f32> = (0..3).flat_map(|i| {
            let v = g.attribute("position").unwrap().vec3_at(i);
            [v.x, v.y, v.z]
        }).collect();

        g.apply_matrix4(&Mat4::identity());

        let position = g.attribute("position").unwrap();
        for (i, chunk) in before_p.chunks(3).enumerate() {
            let v = position.vec3_at(i);
            assert_eq!([v.x, v.y, v.z], [chunk[0], chunk[1], chunk[2]]);
        }
        let normal = g.attribute("normal").unwrap();
        assert_eq!(normal.vec3_at(0), Vec3::new(0.0, 0.0, 1.0));
        let tangent = g.attribute("tangent").unwrap();
        assert_eq!(tangent.w(0), 1.0);
        assert_eq!(tangent.x(0), 1.0);
    }

    #[test]
    fn translate_moves_positions_not_directions() {
        let mut g = triangle();
        g.translate(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(
            g.attribute("position").unwrap().vec3_at(0),
            Vec3::new(10.0, 0.0, 0.0)
        );
        assert_eq!(
            g.attribute("normal").unwrap().vec3_at(0),
            Vec3::new(0.0, 0.0, 1.0)
        );
        assert_eq!(
            g.attribute("tangent").unwrap().vec3_at(0),
            Vec3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn rotate_z_quarter_turn() {
        let mut g = triangle();
        g.rotate_z(FRAC_PI_2);
        let p = g.attribute("position").unwrap().vec3_at(1);
        assert!((p - Vec3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        let t = g.attribute("tangent").unwrap().vec3_at(0);
        assert!((t - Vec3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn quaternion_matches_axis_rotation() {
        let half = FRAC_PI_2 / 2.0;
        let q = quat_from_xyzw(0.0, 0.0, half.sin(), half.cos());

        let mut a = triangle();
        let mut b = triangle();
        a.apply_quaternion(q);
        b.rotate_z(FRAC_PI_2);

        let pa = a.attribute("position").unwrap().vec3_at(1);
        let pb = b.attribute("position").unwrap().vec3_at(1);
        assert!((pa - pb).norm() < 1e-6);
    }

    #[test]
    fn nonuniform_scale_skews_normals_without_renormalizing() {
        let mut g = Geometry::new();
        g.set_attribute(
            "position",
            AttributeBuffer::from_f32(vec![1.0, 0.0, 0.0], 3),
        );
        g.set_attribute("normal", AttributeBuffer::from_f32(vec![1.0, 0.0, 0.0], 3));
        g.scale(Vec3::new(2.0, 1.0, 1.0));

        assert_eq!(g.attribute("position").unwrap().x(0), 2.0);
        // Inverse-transpose divides the x normal by 2 and does not renormalize.
        assert!((g.attribute("normal").unwrap().x(0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bounds_recomputed_only_if_present() {
        let mut g = triangle();
        assert!(g.bounding_box().is_none());
        g.translate(Vec3::new(1.0, 0.0, 0.0));
        assert!(g.bounding_box().is_none());
        assert!(g.bounding_sphere().is_none());

        g.compute_bounding_box();
        let before = *g.bounding_box().unwrap();
        g.translate(Vec3::new(1.0, 0.0, 0.0));
        let after = *g.bounding_box().unwrap();
        assert!((after.min.x - (before.min.x + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn center_moves_centroid_to_origin() {
        let mut g = Geometry::new();
        g.set_attribute(
            "position",
            AttributeBuffer::from_f32(vec![2.0, 2.0, 2.0, 4.0, 4.0, 4.0], 3),
        );
        g.center();
        let bbox = g.bounding_box().unwrap();
        assert!((bbox.get_center()).norm() < 1e-6);
    }
}
