//! Transformation value type

use glam::{DMat4, DQuat, DVec3, DVec4, EulerRot};

/// Size, scale, rotation, skew and translation of an entity.
///
/// A plain value: `Clone`/`Copy` produce an independent instance and `==`
/// compares every field exactly. Values are never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    /// Uniform size multiplier
    size: f64,
    /// Per-axis scale
    scale: DVec3,
    /// Euler angles in radians (XYZ order)
    rotation: DVec3,
    /// Shear factors: x by y, y by z, z by x
    skew: DVec3,
    /// Offset
    translation: DVec3,
}

impl Transformation {
    /// Create the identity transformation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------------------

    /// Get the size.
    #[must_use]
    #[inline]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Get the scale.
    #[must_use]
    #[inline]
    pub fn scale(&self) -> [f64; 3] {
        self.scale.to_array()
    }

    /// Get the rotation.
    #[must_use]
    #[inline]
    pub fn rotation(&self) -> [f64; 3] {
        self.rotation.to_array()
    }

    /// Get the skew.
    #[must_use]
    #[inline]
    pub fn skew(&self) -> [f64; 3] {
        self.skew.to_array()
    }

    /// Get the translation.
    #[must_use]
    #[inline]
    pub fn translation(&self) -> [f64; 3] {
        self.translation.to_array()
    }

    // -------------------------------------------------------------------------
    // Setters
    // -------------------------------------------------------------------------

    /// Set the size.
    #[inline]
    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    /// Set the scale.
    #[inline]
    pub fn set_scale(&mut self, scale: [f64; 3]) {
        self.scale = DVec3::from_array(scale);
    }

    /// Set the rotation.
    #[inline]
    pub fn set_rotation(&mut self, rotation: [f64; 3]) {
        self.rotation = DVec3::from_array(rotation);
    }

    /// Set the skew.
    #[inline]
    pub fn set_skew(&mut self, skew: [f64; 3]) {
        self.skew = DVec3::from_array(skew);
    }

    /// Set the translation.
    #[inline]
    pub fn set_translation(&mut self, translation: [f64; 3]) {
        self.translation = DVec3::from_array(translation);
    }

    // -------------------------------------------------------------------------
    // Bulk operations
    // -------------------------------------------------------------------------

    /// Overwrite every field from `other`. `None` leaves `self` unchanged.
    pub fn copy_from(&mut self, other: Option<&Self>) {
        if let Some(other) = other {
            *self = *other;
        }
    }

    /// Add each field of `other` to this transformation
    pub fn add(&mut self, other: &Self) {
        self.size += other.size;
        self.scale += other.scale;
        self.rotation += other.rotation;
        self.skew += other.skew;
        self.translation += other.translation;
    }

    /// Affine matrix: translation * rotation * skew * scale * size
    #[must_use]
    pub fn matrix(&self) -> DMat4 {
        let rotation = DQuat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        let shear = DMat4::from_cols(
            DVec4::new(1.0, 0.0, self.skew.z, 0.0),
            DVec4::new(self.skew.x, 1.0, 0.0, 0.0),
            DVec4::new(0.0, self.skew.y, 1.0, 0.0),
            DVec4::W,
        );

        DMat4::from_translation(self.translation)
            * DMat4::from_quat(rotation)
            * shear
            * DMat4::from_scale(self.scale * self.size)
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            size: 1.0,
            scale: DVec3::ONE,
            rotation: DVec3::ZERO,
            skew: DVec3::ZERO,
            translation: DVec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Transformation::new();
        assert_eq!(t.size(), 1.0);
        assert_eq!(t.scale(), [1.0, 1.0, 1.0]);
        assert_eq!(t.rotation(), [0.0; 3]);
        assert_eq!(t.skew(), [0.0; 3]);
        assert_eq!(t.translation(), [0.0; 3]);
        assert_eq!(t.matrix(), DMat4::IDENTITY);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Transformation::new();
        original.set_translation([1.0, 2.0, 3.0]);

        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.set_size(4.0);
        assert_ne!(copy, original);
        assert_eq!(original.size(), 1.0, "Mutating the clone must not touch the original");
    }

    #[test]
    fn test_values_are_not_clamped() {
        let mut t = Transformation::new();
        t.set_size(-3.5);
        t.set_scale([0.0, -1.0, 1e300]);
        assert_eq!(t.size(), -3.5);
        assert_eq!(t.scale(), [0.0, -1.0, 1e300]);
    }

    #[test]
    fn test_copy_from() {
        let mut source = Transformation::new();
        source.set_rotation([0.5, 0.0, 0.25]);
        source.set_skew([1.0, 2.0, 3.0]);

        let mut target = Transformation::new();
        target.copy_from(None);
        assert_eq!(target, Transformation::new(), "No source leaves the target alone");

        target.copy_from(Some(&source));
        assert_eq!(target, source);
    }

    #[test]
    fn test_add() {
        let mut a = Transformation::new();
        let mut b = Transformation::new();
        b.set_translation([1.0, 1.0, 1.0]);
        a.add(&b);
        assert_eq!(a.size(), 2.0);
        assert_eq!(a.scale(), [2.0, 2.0, 2.0]);
        assert_eq!(a.translation(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_matrix_translation_and_scale() {
        let mut t = Transformation::new();
        t.set_size(2.0);
        t.set_scale([1.0, 2.0, 3.0]);
        t.set_translation([10.0, 0.0, -5.0]);

        let p = t.matrix().transform_point3(DVec3::ONE);
        assert!((p - DVec3::new(12.0, 4.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_matrix_skew() {
        let mut t = Transformation::new();
        t.set_skew([0.5, 0.0, 0.0]);
        let p = t.matrix().transform_point3(DVec3::new(0.0, 2.0, 0.0));
        assert!((p - DVec3::new(1.0, 2.0, 0.0)).length() < 1e-12);
    }
}
