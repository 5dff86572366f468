//! Asynchronous notification delivery
//!
//! The dispatcher owns a small pool of worker threads, each draining its own
//! lane. A publisher is always routed to the same lane, so every notification
//! it emits reaches all of its subscribers before the next one starts
//! (per-publisher FIFO). Notifications from different publishers may be
//! delivered in any order relative to each other.
//!
//! # Failure isolation
//!
//! Each subscriber's `update` runs under `catch_unwind`. A panic is logged,
//! counted, and forwarded to the configured failure hook; delivery then
//! continues with the remaining subscribers. Failed deliveries are not retried.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, OnceLock, Weak};
use std::{fmt, thread};

use smallvec::SmallVec;

use super::subscription::{Notification, Subscriber};
use crate::core::{FailureHook, UpdateConfig, UpdateError};

/// Subscribers captured at the moment a notification was published
pub(crate) type Targets = SmallVec<[Weak<dyn Subscriber>; 4]>;

/// The process-wide dispatcher used by entities created without an explicit one
static GLOBAL: OnceLock<Dispatcher> = OnceLock::new();

/// One queued notification and the subscribers it goes to
struct Delivery {
    notification: Notification,
    targets: Targets,
}

/// Counters and hooks shared between the dispatcher and its workers
struct Shared {
    delivered: AtomicU64,
    failed: AtomicU64,
    pending: AtomicUsize,
    failure_hook: Option<FailureHook>,
}

impl Shared {
    fn deliver(&self, delivery: Delivery) {
        let Delivery {
            notification,
            targets,
        } = delivery;

        for target in &targets {
            // Subscribers that have been dropped since publication are skipped
            let Some(subscriber) = target.upgrade() else {
                continue;
            };
            if !subscriber
                .interests(notification.source)
                .intersects(notification.tags)
            {
                continue;
            }

            let result = catch_unwind(AssertUnwindSafe(|| subscriber.update(&notification)));
            match result {
                Ok(()) => {
                    self.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| String::from("non-string panic payload"));
                    self.report(UpdateError::SubscriberPanicked {
                        publisher: notification.source,
                        subscriber: subscriber.subscriber_id(),
                        message,
                    });
                }
            }
        }

        self.pending.fetch_sub(1, Ordering::AcqRel);
    }

    fn report(&self, error: UpdateError) {
        log::error!("{error}");
        if matches!(error, UpdateError::SubscriberPanicked { .. }) {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(hook) = &self.failure_hook {
            hook(&error);
        }
    }
}

/// Snapshot of dispatcher activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Successful `update` calls
    pub delivered: u64,
    /// `update` calls that panicked
    pub failed: u64,
    /// Notifications queued but not yet fully delivered
    pub pending: usize,
}

struct DispatcherInner {
    /// One sender per worker; empty when delivering inline
    lanes: Vec<Sender<Delivery>>,
    shared: Arc<Shared>,
}

/// Handle to a notification worker pool.
///
/// Cloning shares the same pool. Workers exit once every handle is dropped.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Start a dispatcher.
    ///
    /// Workers that fail to spawn are reported through the failure hook; if
    /// none start, delivery falls back to running inline.
    #[must_use]
    pub fn new(config: UpdateConfig) -> Self {
        let shared = Arc::new(Shared {
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
            failure_hook: config.failure_hook.clone(),
        });

        let mut lanes = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let (sender, receiver) = mpsc::channel();
            match Self::spawn_worker(&config.thread_name, index, receiver, Arc::clone(&shared)) {
                Ok(()) => lanes.push(sender),
                Err(error) => shared.report(error),
            }
        }

        if config.workers > 0 && lanes.is_empty() {
            log::warn!("No update workers could be started; delivering inline");
        }
        log::debug!("Update dispatcher started with {} lane(s)", lanes.len());

        Self {
            inner: Arc::new(DispatcherInner { lanes, shared }),
        }
    }

    /// Dispatcher that delivers on the publishing thread
    #[must_use]
    pub fn inline() -> Self {
        Self::new(UpdateConfig::inline())
    }

    /// Configure the process-wide dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::AlreadyInstalled`] if the global dispatcher has
    /// already been installed or used.
    pub fn install(config: UpdateConfig) -> Result<Self, UpdateError> {
        let dispatcher = Self::new(config);
        GLOBAL
            .set(dispatcher.clone())
            .map_err(|_| UpdateError::AlreadyInstalled)?;
        Ok(dispatcher)
    }

    /// Get the process-wide dispatcher, starting it from the environment
    /// configuration on first use.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL
            .get_or_init(|| Self::new(UpdateConfig::from_env()))
            .clone()
    }

    fn spawn_worker(
        prefix: &str,
        index: usize,
        receiver: Receiver<Delivery>,
        shared: Arc<Shared>,
    ) -> Result<(), UpdateError> {
        thread::Builder::new()
            .name(format!("{prefix}-{index}"))
            .spawn(move || {
                while let Ok(delivery) = receiver.recv() {
                    shared.deliver(delivery);
                }
                log::trace!("Update lane {index} shut down");
            })
            .map(|_| ())
            .map_err(|e| UpdateError::WorkerSpawn {
                index,
                reason: e.to_string(),
            })
    }

    /// Queue a notification for the given subscribers.
    ///
    /// Returns immediately when workers are running; subscribers observe the
    /// change some time later.
    pub(crate) fn dispatch(&self, notification: Notification, targets: Targets) {
        if targets.is_empty() {
            return;
        }

        let shared = &self.inner.shared;
        shared.pending.fetch_add(1, Ordering::AcqRel);
        let delivery = Delivery {
            notification,
            targets,
        };

        let lanes = &self.inner.lanes;
        if lanes.is_empty() {
            shared.deliver(delivery);
            return;
        }

        let lane = (notification.source.get() % lanes.len() as u64) as usize;
        log::trace!(
            "Queueing {:?} from {} on lane {lane}",
            notification.tags,
            notification.source
        );
        if let Err(mpsc::SendError(delivery)) = lanes[lane].send(delivery) {
            log::warn!("Update lane {lane} is gone; delivering inline");
            shared.deliver(delivery);
        }
    }

    /// Number of worker lanes (0 when inline)
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.inner.lanes.len()
    }

    /// Current delivery counters
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        let shared = &self.inner.shared;
        DispatchStats {
            delivered: shared.delivered.load(Ordering::Relaxed),
            failed: shared.failed.load(Ordering::Relaxed),
            pending: shared.pending.load(Ordering::Acquire),
        }
    }

    /// Whether every queued notification has been delivered
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.inner.shared.pending.load(Ordering::Acquire) == 0
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("lanes", &self.lanes())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::test_util::{Recorder, wait_until};
    use crate::update::SubscriptionSet;
    use parking_lot::Mutex;

    fn targets(subscribers: &[Arc<dyn Subscriber>]) -> Targets {
        subscribers.iter().map(Arc::downgrade).collect()
    }

    /// Subscriber that always panics
    struct Faulty {
        id: EntityId,
    }

    impl Subscriber for Faulty {
        fn subscriber_id(&self) -> EntityId {
            self.id
        }

        fn update(&self, _notification: &Notification) {
            panic!("faulty subscriber");
        }
    }

    #[test]
    fn test_inline_delivery_is_synchronous() {
        let dispatcher = Dispatcher::inline();
        let recorder = Recorder::new();
        let source = EntityId::next();

        dispatcher.dispatch(
            Notification::new(source, SubscriptionSet::PROPERTY),
            targets(&[recorder.as_subscriber()]),
        );

        assert_eq!(recorder.count(), 1, "Inline delivery must finish before returning");
        assert!(dispatcher.is_idle());
        assert_eq!(dispatcher.stats().delivered, 1);
    }

    #[test]
    fn test_worker_delivery_eventually_arrives() {
        let dispatcher = Dispatcher::new(UpdateConfig::default().with_workers(2));
        assert_eq!(dispatcher.lanes(), 2);
        let recorder = Recorder::new();

        dispatcher.dispatch(
            Notification::new(EntityId::next(), SubscriptionSet::CHILD),
            targets(&[recorder.as_subscriber()]),
        );

        assert!(wait_until(|| recorder.count() == 1), "Notification never delivered");
        assert!(wait_until(|| dispatcher.is_idle()));
    }

    #[test]
    fn test_per_publisher_fifo() {
        let dispatcher = Dispatcher::new(UpdateConfig::default().with_workers(3));
        let recorder = Recorder::new();
        let source = EntityId::next();
        let sequence = [
            SubscriptionSet::PROPERTY,
            SubscriptionSet::CHILD,
            SubscriptionSet::SELECTION,
            SubscriptionSet::WIREFRAME,
            SubscriptionSet::TRANSFORMATION,
        ];

        for _ in 0..20 {
            for tags in sequence {
                dispatcher.dispatch(Notification::new(source, tags), targets(&[recorder.as_subscriber()]));
            }
        }

        assert!(wait_until(|| recorder.count() == 100));
        let received: Vec<_> = recorder.notifications().iter().map(|n| n.tags).collect();
        let expected: Vec<_> = (0..20).flat_map(|_| sequence).collect();
        assert_eq!(received, expected, "Notifications from one publisher must stay in order");
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failures);
        let dispatcher = Dispatcher::new(
            UpdateConfig::inline().with_failure_hook(move |e| sink.lock().push(e.clone())),
        );
        let faulty: Arc<dyn Subscriber> = Arc::new(Faulty { id: EntityId::next() });
        let recorder = Recorder::new();
        let source = EntityId::next();

        dispatcher.dispatch(
            Notification::new(source, SubscriptionSet::PROPERTY),
            targets(&[faulty.clone(), recorder.as_subscriber()]),
        );

        assert_eq!(recorder.count(), 1, "Healthy subscriber must still be notified");
        let stats = dispatcher.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.delivered, 1);

        let failures = failures.lock();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            UpdateError::SubscriberPanicked { publisher, message, .. }
                if *publisher == source && message == "faulty subscriber"
        ));
    }

    #[test]
    fn test_interest_filter_and_dropped_subscribers() {
        let dispatcher = Dispatcher::inline();
        let selective = Recorder::with_interests(SubscriptionSet::SELECTION);
        let dropped: Arc<dyn Subscriber> = Recorder::new();
        let weak = targets(&[selective.as_subscriber(), dropped.clone()]);
        drop(dropped);

        dispatcher.dispatch(Notification::new(EntityId::next(), SubscriptionSet::PROPERTY), weak);
        assert_eq!(selective.count(), 0, "PROPERTY is outside the declared interest");

        dispatcher.dispatch(
            Notification::new(EntityId::next(), SubscriptionSet::SELECTION),
            targets(&[selective.as_subscriber()]),
        );
        assert_eq!(selective.count(), 1);
    }
}
