//! Update engine configuration

use std::fmt;
use std::sync::Arc;

use super::UpdateError;

/// Environment variable overriding the number of delivery workers
pub const WORKERS_ENV: &str = "MESHGRAPH_UPDATE_WORKERS";

/// Callback invoked for every delivery failure
pub type FailureHook = Arc<dyn Fn(&UpdateError) + Send + Sync>;

/// Configuration for the notification dispatcher
#[derive(Clone)]
pub struct UpdateConfig {
    /// Number of delivery workers (0 delivers inline on the mutating thread)
    pub workers: usize,
    /// Prefix for worker thread names
    pub thread_name: String,
    /// Called after a failure has been logged
    pub failure_hook: Option<FailureHook>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(4);
        Self {
            workers,
            thread_name: String::from("meshgraph-update"),
            failure_hook: None,
        }
    }
}

impl UpdateConfig {
    /// Configuration that delivers every notification on the calling thread
    #[must_use]
    pub fn inline() -> Self {
        Self::default().with_workers(0)
    }

    /// Default configuration with the worker count taken from
    /// `MESHGRAPH_UPDATE_WORKERS` when it is set.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(WORKERS_ENV) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(workers) => config.with_workers(workers),
                Err(_) => {
                    log::warn!("Ignoring {WORKERS_ENV}={raw:?}: not a worker count");
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Set the number of delivery workers
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the worker thread name prefix
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Install a callback for delivery failures
    #[must_use]
    pub fn with_failure_hook(mut self, hook: impl Fn(&UpdateError) + Send + Sync + 'static) -> Self {
        self.failure_hook = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for UpdateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateConfig")
            .field("workers", &self.workers)
            .field("thread_name", &self.thread_name)
            .field("failure_hook", &self.failure_hook.is_some())
            .finish()
    }
}
