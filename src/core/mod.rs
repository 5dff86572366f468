//! Core module
//!
//! Entity identity, configuration and the crate error type

mod config;
mod error;
mod id;

pub use config::{FailureHook, UpdateConfig, WORKERS_ENV};
pub use error::UpdateError;
pub use id::EntityId;
