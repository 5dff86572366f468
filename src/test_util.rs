//! Helpers shared by the unit tests

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::core::EntityId;
use crate::model::{Controller, Mesh, MeshKind, View};
use crate::update::{Dispatcher, Notification, Subscriber, SubscriptionSet, SubscriptionType};

/// How long `wait_until` polls before giving up
const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Poll `condition` until it holds or the wait limit passes.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_LIMIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Give in-flight deliveries time to land before asserting that something
/// did *not* happen.
pub(crate) fn settle() {
    std::thread::sleep(Duration::from_millis(100));
}

/// Enable log output for a test run
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Subscriber that records everything it receives
pub(crate) struct Recorder {
    id: EntityId,
    interests: SubscriptionSet,
    received: Mutex<Vec<Notification>>,
}

impl Recorder {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_interests(SubscriptionSet::ALL)
    }

    pub(crate) fn with_interests(interests: SubscriptionSet) -> Arc<Self> {
        Arc::new(Self {
            id: EntityId::next(),
            interests,
            received: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn as_subscriber(self: &Arc<Self>) -> Arc<dyn Subscriber> {
        Arc::clone(self) as Arc<dyn Subscriber>
    }

    pub(crate) fn count(&self) -> usize {
        self.received.lock().len()
    }

    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }

    /// Whether any notification carrying `kind` has arrived
    pub(crate) fn saw(&self, kind: SubscriptionType) -> bool {
        self.received.lock().iter().any(|n| n.tags.has(kind))
    }

    pub(crate) fn clear(&self) {
        self.received.lock().clear();
    }
}

impl Subscriber for Recorder {
    fn subscriber_id(&self) -> EntityId {
        self.id
    }

    fn interests(&self, _source: EntityId) -> SubscriptionSet {
        self.interests
    }

    fn update(&self, notification: &Notification) {
        self.received.lock().push(*notification);
    }
}

/// Controller of `kind` whose mesh and view deliver through `dispatcher`
pub(crate) fn controller(dispatcher: &Dispatcher, kind: MeshKind) -> Controller {
    Controller::new(
        Mesh::with_dispatcher(kind, dispatcher.clone()),
        View::with_dispatcher(dispatcher.clone()),
    )
}

pub(crate) fn basic(dispatcher: &Dispatcher) -> Controller {
    controller(dispatcher, MeshKind::Basic)
}

/// Vertex at `(x, x, x)`
pub(crate) fn vertex(dispatcher: &Dispatcher, x: f64) -> Controller {
    Controller::new(
        Mesh::with_dispatcher(MeshKind::Vertex, dispatcher.clone()).with_location([x, x, x]),
        View::with_dispatcher(dispatcher.clone()),
    )
}

pub(crate) fn edge(dispatcher: &Dispatcher, v1: &Controller, v2: &Controller) -> Controller {
    Controller::new(Mesh::edge(v1, v2), View::with_dispatcher(dispatcher.clone()))
}

pub(crate) fn face(dispatcher: &Dispatcher) -> Controller {
    controller(dispatcher, MeshKind::Face)
}

pub(crate) fn detailed_face(dispatcher: &Dispatcher) -> Controller {
    controller(dispatcher, MeshKind::DetailedFace)
}

pub(crate) fn shape(dispatcher: &Dispatcher) -> Controller {
    controller(dispatcher, MeshKind::Shape)
}

pub(crate) fn tube(dispatcher: &Dispatcher) -> Controller {
    controller(dispatcher, MeshKind::Tube)
}
