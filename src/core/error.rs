//! Errors raised by the update engine

use thiserror::Error;

use super::EntityId;

/// Failures recognised by the update engine.
///
/// Structural mutations never fail; these only describe delivery problems
/// and dispatcher set-up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// A subscriber panicked inside its `update` handler.
    #[error("subscriber {subscriber} panicked handling an update from {publisher}: {message}")]
    SubscriberPanicked {
        /// Entity whose notification was being delivered
        publisher: EntityId,
        /// Entity whose handler failed
        subscriber: EntityId,
        /// Panic payload, if it was a string
        message: String,
    },

    /// A delivery worker thread could not be started.
    #[error("failed to spawn update worker {index}: {reason}")]
    WorkerSpawn {
        /// Lane index of the worker
        index: usize,
        /// OS error text
        reason: String,
    },

    /// The global dispatcher was already running when `install` was called.
    #[error("the global update dispatcher is already installed")]
    AlreadyInstalled,
}
