//! Kind-specific operations on [`Mesh`](crate::model::Mesh)
//!
//! Each submodule extends the mesh with the constructors and queries that
//! belong to some kinds. Structural queries asked of the wrong kind return
//! nothing rather than failing.

mod edge;
mod face;
mod point;
mod shape;
mod tube;
