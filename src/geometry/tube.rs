//! Tubes: shapes with cylindrical dimensions

use crate::model::{Mesh, MeshKind, keys};

impl Mesh {
    /// Empty tube on the global dispatcher
    #[must_use]
    pub fn tube() -> Self {
        Self::new(MeshKind::Tube)
    }

    /// Get the tube length
    #[must_use]
    pub fn tube_length(&self) -> Option<f64> {
        self.parsed(keys::LENGTH)
    }

    /// Set the tube length
    pub fn set_tube_length(&self, length: f64) {
        self.set_property(keys::LENGTH, &length.to_string());
    }

    /// Get the outer radius
    #[must_use]
    pub fn radius(&self) -> Option<f64> {
        self.parsed(keys::RADIUS)
    }

    /// Set the outer radius
    pub fn set_radius(&self, radius: f64) {
        self.set_property(keys::RADIUS, &radius.to_string());
    }

    /// Get the inner radius
    #[must_use]
    pub fn inner_radius(&self) -> Option<f64> {
        self.parsed(keys::INNER_RADIUS)
    }

    /// Set the inner radius
    pub fn set_inner_radius(&self, inner_radius: f64) {
        self.set_property(keys::INNER_RADIUS, &inner_radius.to_string());
    }

    /// Get the number of segments along the axis
    #[must_use]
    pub fn axial_samples(&self) -> Option<u32> {
        self.parsed(keys::AXIAL_SAMPLES)
    }

    /// Set the number of segments along the axis
    pub fn set_axial_samples(&self, samples: u32) {
        self.set_property(keys::AXIAL_SAMPLES, &samples.to_string());
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.property(key)?.parse().ok()
    }
}
