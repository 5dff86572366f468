//! Entity model: the mesh, view and controller triad
//!
//! - [`Transformation`]: the value type a [`View`] double-buffers
//! - [`PropertyStore`]: string properties of a [`Mesh`]
//! - [`Category`] and [`MeshKind`]: named child buckets and the per-kind rules
//!   governing them
//! - [`Controller`]: the facade binding one mesh and one view

mod category;
mod controller;
mod factory;
mod mesh;
mod policy;
mod properties;
mod transform;
mod view;

pub use controller::{CloneMap, Controller};
pub use factory::{ControllerFactory, KindControllerFactory, ViewBuilder};
pub use mesh::Mesh;
pub use policy::{Category, MeshKind};
pub use properties::{FALSE, PropertyStore, TRUE, flag, keys};
pub use transform::Transformation;
pub use view::{RenderDelegate, RepresentationHandle, View};
