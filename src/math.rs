//! Math type aliases and helper functions.
//!
//! Rendering math is always f32. Vector and matrix types are thin aliases
//! over [`nalgebra`]; bounding volumes are crate-local types built on them.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_xyzw`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

// ===== Matrix builders =====

/// Build a translation-only 4x4 matrix.
pub fn mat4_from_translation(t: Vec3) -> Mat4 {
    Mat4::new_translation(&t)
}

/// Build a rotation matrix around the X axis.
pub fn mat4_from_rotation_x(angle: f32) -> Mat4 {
    nalgebra::Rotation3::from_axis_angle(&nalgebra::Vector3::x_axis(), angle).to_homogeneous()
}

/// Build a rotation matrix around the Y axis.
pub fn mat4_from_rotation_y(angle: f32) -> Mat4 {
    nalgebra::Rotation3::from_axis_angle(&nalgebra::Vector3::y_axis(), angle).to_homogeneous()
}

/// Build a rotation matrix around the Z axis.
pub fn mat4_from_rotation_z(angle: f32) -> Mat4 {
    nalgebra::Rotation3::from_axis_angle(&nalgebra::Vector3::z_axis(), angle).to_homogeneous()
}

/// Build a non-uniform scaling matrix.
pub fn mat4_from_scale(factors: Vec3) -> Mat4 {
    Mat4::new_nonuniform_scaling(&factors)
}

/// Build a rotation matrix from a quaternion.
pub fn mat4_from_quat(q: Quat) -> Mat4 {
    nalgebra::UnitQuaternion::new_unchecked(q).to_homogeneous()
}

/// Build a rotation matrix orienting the local +Z axis from the origin toward
/// `target`, with +Y as the up reference. Returns identity for a zero target.
pub fn mat4_look_at_rotation(target: Vec3) -> Mat4 {
    if target.norm_squared() == 0.0 {
        return Mat4::identity();
    }
    nalgebra::Rotation3::face_towards(&target, &Vec3::y()).to_homogeneous()
}

/// Create a quaternion from x, y, z, w components.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    nalgebra::Quaternion::new(w, x, y, z)
}

// ===== Matrix application =====

/// Apply the full affine transform to a point.
pub fn transform_point(m: &Mat4, v: Vec3) -> Vec3 {
    m.transform_point(&nalgebra::Point3::from(v)).coords
}

/// Apply only the rotational/directional part of `m` to a direction and
/// normalize the result. Zero directions are passed through unchanged.
pub fn transform_direction(m: &Mat4, v: Vec3) -> Vec3 {
    let d = m.fixed_view::<3, 3>(0, 0) * v;
    let n = d.norm();
    if n > 0.0 {
        d / n
    } else {
        d
    }
}

/// Derive the 3x3 normal matrix (inverse-transpose of the upper 3x3) from a
/// 4x4 transform. Falls back to identity for singular transforms.
pub fn normal_matrix(m: &Mat4) -> Mat3 {
    let upper = m.fixed_view::<3, 3>(0, 0).into_owned();
    match upper.try_inverse() {
        Some(inv) => inv.transpose(),
        None => {
            log::warn!("normal_matrix: transform is not invertible, using identity");
            Mat3::identity()
        }
    }
}

// ===== Bounding volumes =====

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Box3 {
    /// Create a box from explicit corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The empty (degenerate, non-intersecting) box: min at +inf, max at -inf.
    pub fn empty() -> Self {
        Self {
            min: Vec3::from_element(f32::INFINITY),
            max: Vec3::from_element(f32::NEG_INFINITY),
        }
    }

    /// The universal box covering all of space.
    pub fn infinite() -> Self {
        Self {
            min: Vec3::from_element(f32::NEG_INFINITY),
            max: Vec3::from_element(f32::INFINITY),
        }
    }

    /// Whether the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow the box to contain `point`.
    pub fn expand_by_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Centroid of the box; the origin for an empty box.
    pub fn get_center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::zeros()
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Whether the box contains `point` (inclusive).
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Bounding sphere: center plus radius.
///
/// A freshly constructed sphere is empty (negative radius) until fitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Sphere center.
    pub center: Vec3,
    /// Sphere radius; negative while empty.
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a sphere from center and radius.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// The empty sphere (radius -1) at the origin.
    pub fn empty() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: -1.0,
        }
    }

    /// The infinite-radius sphere at the origin.
    pub fn infinite() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: f32::INFINITY,
        }
    }

    /// Whether the sphere contains no points.
    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// Whether the sphere contains `point` (inclusive).
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotation_z_90() {
        let m = mat4_from_rotation_z(FRAC_PI_2);
        let v = transform_point(&m, Vec3::new(1.0, 0.0, 0.0));
        assert!((v.x - 0.0).abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn translation_does_not_move_directions() {
        let m = mat4_from_translation(Vec3::new(5.0, 6.0, 7.0));
        let d = transform_direction(&m, Vec3::new(0.0, 0.0, 1.0));
        assert!((d - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn transform_direction_normalizes() {
        let m = mat4_from_scale(Vec3::new(3.0, 3.0, 3.0));
        let d = transform_direction(&m, Vec3::new(1.0, 0.0, 0.0));
        assert!((d.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_nonuniform_scale() {
        let m = mat4_from_scale(Vec3::new(2.0, 1.0, 1.0));
        let nm = normal_matrix(&m);
        let n = nm * Vec3::new(1.0, 0.0, 0.0);
        // Inverse-transpose of a scale divides by the scale factor.
        assert!((n.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn look_at_faces_target() {
        let m = mat4_look_at_rotation(Vec3::new(0.0, 0.0, 5.0));
        assert!((m - Mat4::identity()).norm() < 1e-5);

        let m = mat4_look_at_rotation(Vec3::new(1.0, 0.0, 0.0));
        let z = transform_direction(&m, Vec3::new(0.0, 0.0, 1.0));
        assert!((z - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn box3_expand_and_center() {
        let mut b = Box3::empty();
        assert!(b.is_empty());
        b.expand_by_point(Vec3::new(-1.0, 0.0, 0.0));
        b.expand_by_point(Vec3::new(3.0, 2.0, 4.0));
        assert!(!b.is_empty());
        assert_eq!(b.get_center(), Vec3::new(1.0, 1.0, 2.0));
        assert!(b.contains_point(Vec3::new(0.0, 1.0, 2.0)));
        assert!(!b.contains_point(Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn empty_box_center_is_origin() {
        assert_eq!(Box3::empty().get_center(), Vec3::zeros());
    }

    #[test]
    fn sphere_emptiness() {
        assert!(BoundingSphere::empty().is_empty());
        assert!(!BoundingSphere::new(Vec3::zeros(), 1.0).is_empty());
        assert!(BoundingSphere::infinite().contains_point(Vec3::new(1e30, 0.0, 0.0)));
    }
}
