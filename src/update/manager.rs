//! Per-entity publisher

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::dispatch::{Dispatcher, Targets};
use super::subscription::{Notification, Subscriber, SubscriptionSet};
use crate::core::EntityId;

/// A registered listener
struct Registration {
    id: EntityId,
    listener: Weak<dyn Subscriber>,
}

struct ManagerInner {
    id: EntityId,
    subscribers: RwLock<SmallVec<[Registration; 4]>>,
    dispatcher: Dispatcher,
}

impl ManagerInner {
    fn notify(&self, tags: SubscriptionSet) {
        if tags.is_empty() {
            return;
        }

        let targets: Targets = self
            .subscribers
            .read()
            .iter()
            .map(|r| Weak::clone(&r.listener))
            .collect();

        self.dispatcher
            .dispatch(Notification::new(self.id, tags), targets);
    }
}

/// Forwarding: a manager registered with another entity republishes what it
/// hears to its own subscribers.
impl Subscriber for ManagerInner {
    fn subscriber_id(&self) -> EntityId {
        self.id
    }

    fn update(&self, notification: &Notification) {
        self.notify(notification.tags);
    }
}

/// Publisher half of an entity's participation in the update engine.
///
/// Holds the live set of registered subscribers (weakly, so a subscriber
/// going away never leaks or blocks) and hands notifications to the
/// dispatcher. Cloning yields another handle to the same publisher.
#[derive(Clone)]
pub struct UpdateManager {
    inner: Arc<ManagerInner>,
}

impl UpdateManager {
    /// Create a manager bound to the global dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self::with_dispatcher(Dispatcher::global())
    }

    /// Create a manager bound to a specific dispatcher
    #[must_use]
    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                id: EntityId::next(),
                subscribers: RwLock::new(SmallVec::new()),
                dispatcher,
            }),
        }
    }

    /// Identity of this publisher (the `source` of its notifications)
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    /// The dispatcher this manager delivers through
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// A new manager on the same dispatcher with no subscribers
    #[must_use]
    pub fn detached(&self) -> Self {
        Self::with_dispatcher(self.inner.dispatcher.clone())
    }

    /// This manager as a subscriber that republishes what it receives
    #[must_use]
    pub fn listener(&self) -> Arc<dyn Subscriber> {
        Arc::clone(&self.inner) as Arc<dyn Subscriber>
    }

    /// Register a subscriber.
    ///
    /// Returns `false` if it was already registered or is this manager itself.
    pub fn register(&self, listener: &Arc<dyn Subscriber>) -> bool {
        let id = listener.subscriber_id();
        if id == self.inner.id {
            return false;
        }

        let mut subscribers = self.inner.subscribers.write();
        subscribers.retain(|r| r.listener.strong_count() > 0);
        if subscribers.iter().any(|r| r.id == id) {
            return false;
        }
        subscribers.push(Registration {
            id,
            listener: Arc::downgrade(listener),
        });
        log::debug!("{id} registered with {}", self.inner.id);
        true
    }

    /// Unregister a subscriber by id. Returns `true` if it was registered.
    pub fn unregister(&self, id: EntityId) -> bool {
        let mut subscribers = self.inner.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|r| r.id != id);
        let removed = subscribers.len() != before;
        if removed {
            log::debug!("{id} unregistered from {}", self.inner.id);
        }
        removed
    }

    /// Whether a subscriber with this id is registered
    #[must_use]
    pub fn is_registered(&self, id: EntityId) -> bool {
        self.inner
            .subscribers
            .read()
            .iter()
            .any(|r| r.id == id && r.listener.strong_count() > 0)
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .iter()
            .filter(|r| r.listener.strong_count() > 0)
            .count()
    }

    /// Publish a change to every registered subscriber
    pub fn notify(&self, tags: SubscriptionSet) {
        self.inner.notify(tags);
    }
}

impl Default for UpdateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UpdateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateManager")
            .field("id", &self.inner.id)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
