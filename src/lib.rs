//! A retained-mode geometric entity graph
//!
//! This crate provides:
//! - Points, vertices, edges, faces and shapes composed into assemblies
//! - Per-kind structural rules for categorized children
//! - Asynchronous publish/subscribe change notification
//! - Double-buffered transformations with an explicit sync point
//!
//! Every entity is a [`Controller`](model::Controller) binding a
//! [`Mesh`](model::Mesh) (properties and children) to a
//! [`View`](model::View) (transformation and render delegate).

pub mod core;
pub mod geometry;
pub mod model;
pub mod update;

#[cfg(test)]
mod test_util;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{EntityId, UpdateConfig, UpdateError};
    pub use crate::model::{
        Category, Controller, ControllerFactory, KindControllerFactory, Mesh, MeshKind,
        RenderDelegate, RepresentationHandle, Transformation, View, keys,
    };
    pub use crate::update::{
        Dispatcher, Notification, Subscriber, SubscriptionSet, SubscriptionType, UpdateManager,
    };
}
