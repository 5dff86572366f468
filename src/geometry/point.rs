//! Located kinds: points and vertices

use glam::DVec3;

use crate::model::{Mesh, MeshKind};
use crate::update::SubscriptionSet;

impl Mesh {
    /// Free-standing point at `(x, y, z)` on the global dispatcher
    #[must_use]
    pub fn point(x: f64, y: f64, z: f64) -> Self {
        Self::new(MeshKind::Point).with_location([x, y, z])
    }

    /// Mesh vertex at `(x, y, z)` on the global dispatcher
    #[must_use]
    pub fn vertex(x: f64, y: f64, z: f64) -> Self {
        Self::new(MeshKind::Vertex).with_location([x, y, z])
    }

    /// Get the location
    #[must_use]
    pub fn location(&self) -> [f64; 3] {
        self.location.read().to_array()
    }

    /// Set all three coordinates at once, publishing PROPERTY
    pub fn update_location(&self, x: f64, y: f64, z: f64) {
        *self.location.write() = DVec3::new(x, y, z);
        self.notify(SubscriptionSet::PROPERTY);
    }

    /// Set the x coordinate, publishing PROPERTY
    pub fn set_x(&self, x: f64) {
        self.location.write().x = x;
        self.notify(SubscriptionSet::PROPERTY);
    }

    /// Set the y coordinate, publishing PROPERTY
    pub fn set_y(&self, y: f64) {
        self.location.write().y = y;
        self.notify(SubscriptionSet::PROPERTY);
    }

    /// Set the z coordinate, publishing PROPERTY
    pub fn set_z(&self, z: f64) {
        self.location.write().z = z;
        self.notify(SubscriptionSet::PROPERTY);
    }

    pub(crate) fn position(&self) -> DVec3 {
        *self.location.read()
    }
}
