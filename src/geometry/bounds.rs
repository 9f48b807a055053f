//! Bounding-volume computation with morph-target accumulation.

use crate::math::{BoundingSphere, Box3};

use super::attribute::AttributeBuffer;
use super::data::Geometry;

/// Fit a box to every vertex of a position-shaped attribute.
fn box_from_attribute(attribute: &AttributeBuffer) -> Box3 {
    let mut bbox = Box3::empty();
    for i in 0..attribute.count() {
        bbox.expand_by_point(attribute.vec3_at(i));
    }
    bbox
}

/// Expand `bbox` by every morph-target extent.
///
/// Relative morphs are delta-encoded, so their extent is additive to the base
/// corners; absolute morphs expand by their own corners directly.
fn expand_by_morph_targets(bbox: &mut Box3, morphs: &[AttributeBuffer], relative: bool) {
    for morph in morphs {
        let morph_box = box_from_attribute(morph);
        if relative {
            let min = bbox.min + morph_box.min;
            bbox.expand_by_point(min);
            let max = bbox.max + morph_box.max;
            bbox.expand_by_point(max);
        } else {
            bbox.expand_by_point(morph_box.min);
            bbox.expand_by_point(morph_box.max);
        }
    }
}

impl Geometry {
    /// Fit the cached bounding box to the position attribute, expanded by all
    /// morph-target position buffers.
    ///
    /// Device-resident position data cannot be read back; the box is set to
    /// the universal extent and an error is reported. Without a position
    /// attribute the box is reset to the empty state. A not-a-number result is
    /// reported as a data-quality error but still stored.
    pub fn compute_bounding_box(&mut self) {
        let position = match self.attributes.get("position") {
            Some(p) => p,
            None => {
                self.bounding_box = Some(Box3::empty());
                return;
            }
        };

        if !position.is_readable() {
            log::error!(
                "compute_bounding_box: position attribute is device-resident, \
                 falling back to an infinite bounding box"
            );
            self.bounding_box = Some(Box3::infinite());
            return;
        }

        let mut bbox = box_from_attribute(position);

        if let Some(morphs) = self.morph_attributes.get("position") {
            expand_by_morph_targets(&mut bbox, morphs, self.morph_targets_relative);
        }

        if bbox.min.iter().chain(bbox.max.iter()).any(|c| c.is_nan()) {
            log::error!(
                "compute_bounding_box: computed box contains NaN, position data is suspect"
            );
        }

        self.bounding_box = Some(bbox);
    }

    /// Fit the cached bounding sphere to the position attribute and all
    /// morph-target position buffers.
    ///
    /// Two full passes by design: a box fit yields the candidate center, then
    /// a max-squared-distance pass over every base and morph vertex yields the
    /// radius. A single-pass centroid estimator would differ numerically on
    /// asymmetric point clouds.
    pub fn compute_bounding_sphere(&mut self) {
        let position = match self.attributes.get("position") {
            Some(p) => p,
            None => {
                self.bounding_sphere = Some(BoundingSphere::empty());
                return;
            }
        };

        if !position.is_readable() {
            log::error!(
                "compute_bounding_sphere: position attribute is device-resident, \
                 falling back to an infinite bounding sphere"
            );
            self.bounding_sphere = Some(BoundingSphere::infinite());
            return;
        }

        let morphs = self.morph_attributes.get("position");
        let relative = self.morph_targets_relative;

        // First pass: box fit (with morph expansion) for the candidate center.
        let mut bbox = box_from_attribute(position);
        if let Some(morphs) = morphs {
            expand_by_morph_targets(&mut bbox, morphs, relative);
        }
        let center = bbox.get_center();

        // Second pass: the radius is the maximum distance to that center.
        // f32::max would drop NaN operands; suspect data must surface as a
        // NaN radius, not as a plausible finite one.
        let mut max_radius_sq: f32 = 0.0;
        for i in 0..position.count() {
            let d = (position.vec3_at(i) - center).norm_squared();
            if d > max_radius_sq || d.is_nan() {
                max_radius_sq = d;
            }
        }

        if let Some(morphs) = morphs {
            for morph in morphs {
                for i in 0..morph.count() {
                    let mut v = morph.vec3_at(i);
                    if relative {
                        v += position.vec3_at(i);
                    }
                    let d = (v - center).norm_squared();
                    if d > max_radius_sq || d.is_nan() {
                        max_radius_sq = d;
                    }
                }
            }
        }

        let radius = max_radius_sq.sqrt();
        if radius.is_nan() {
            log::error!(
                "compute_bounding_sphere: computed radius is NaN, position data is suspect"
            );
        }

        self.bounding_sphere = Some(BoundingSphere::new(center, radius));
    }
}
