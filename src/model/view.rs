//! Render-facing state of an entity

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::mesh::Mesh;
use super::transform::Transformation;
use crate::core::EntityId;
use crate::update::{Dispatcher, SubscriptionSet, UpdateManager};

/// Opaque handle to whatever a graphics binding uses to draw an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepresentationHandle(pub u64);

/// Graphics binding that turns a view into something drawable.
///
/// Implemented outside this crate by concrete rendering adapters.
pub trait RenderDelegate: Send + Sync {
    /// Handle of the drawable this delegate maintains
    fn representation(&self) -> RepresentationHandle;

    /// Rebuild the drawable after the owning entity changed
    fn refresh(&self, mesh: &Mesh);

    /// Delegate for a cloned view
    fn duplicate(&self) -> Arc<dyn RenderDelegate>;
}

/// Current and previous transformation
#[derive(Debug, Clone, Copy, Default)]
struct Buffers {
    current: Transformation,
    previous: Transformation,
}

/// Double-buffered transformation plus an optional render delegate.
///
/// `set_transformation` only touches the current buffer; `set_synched`
/// marks the sync point by copying it into the previous buffer.
pub struct View {
    id: EntityId,
    buffers: RwLock<Buffers>,
    delegate: Option<Arc<dyn RenderDelegate>>,
    updates: UpdateManager,
}

impl View {
    /// Create a view with the identity transformation on the global dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self::from_manager(UpdateManager::new())
    }

    /// Create a view delivering through `dispatcher`
    #[must_use]
    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self::from_manager(UpdateManager::with_dispatcher(dispatcher))
    }

    fn from_manager(updates: UpdateManager) -> Self {
        Self {
            id: EntityId::next(),
            buffers: RwLock::new(Buffers::default()),
            delegate: None,
            updates,
        }
    }

    /// Attach a render delegate
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn RenderDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Get the entity id
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The publisher for transformation changes
    #[must_use]
    pub fn updates(&self) -> &UpdateManager {
        &self.updates
    }

    /// Get the current transformation
    #[must_use]
    pub fn transformation(&self) -> Transformation {
        self.buffers.read().current
    }

    /// Get the transformation as of the last sync point
    #[must_use]
    pub fn previous_transformation(&self) -> Transformation {
        self.buffers.read().previous
    }

    /// Replace the current transformation, publishing TRANSFORMATION
    pub fn set_transformation(&self, transformation: Transformation) {
        self.buffers.write().current = transformation;
        self.updates.notify(SubscriptionSet::TRANSFORMATION);
    }

    /// Modify the current transformation in place, publishing TRANSFORMATION
    pub fn update_transformation(&self, f: impl FnOnce(&mut Transformation)) {
        f(&mut self.buffers.write().current);
        self.updates.notify(SubscriptionSet::TRANSFORMATION);
    }

    /// Copy the current transformation into the previous one.
    ///
    /// Bookkeeping only; nothing is published.
    pub fn set_synched(&self) {
        let mut buffers = self.buffers.write();
        buffers.previous = buffers.current;
    }

    /// Handle from the render delegate, if one is attached
    #[must_use]
    pub fn representation(&self) -> Option<RepresentationHandle> {
        self.delegate.as_ref().map(|d| d.representation())
    }

    /// Let the render delegate catch up with `mesh`
    pub fn refresh(&self, mesh: &Mesh) {
        if let Some(delegate) = &self.delegate {
            delegate.refresh(mesh);
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies both buffers and duplicates the delegate; the clone has no
/// subscribers.
impl Clone for View {
    fn clone(&self) -> Self {
        Self {
            id: EntityId::next(),
            buffers: RwLock::new(*self.buffers.read()),
            delegate: self.delegate.as_ref().map(|d| d.duplicate()),
            updates: self.updates.detached(),
        }
    }
}

/// Compares the current transformation and the representation handle; the
/// previous transformation is ignored.
impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            || (self.transformation() == other.transformation()
                && self.representation() == other.representation())
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("transformation", &self.transformation())
            .field("representation", &self.representation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::model::MeshKind;
    use crate::test_util::Recorder;
    use crate::update::SubscriptionType;

    struct CountingDelegate {
        handle: u64,
        refreshes: AtomicUsize,
    }

    impl RenderDelegate for CountingDelegate {
        fn representation(&self) -> RepresentationHandle {
            RepresentationHandle(self.handle)
        }

        fn refresh(&self, _mesh: &Mesh) {
            self.refreshes.fetch_add(1, Ordering::Relaxed);
        }

        fn duplicate(&self) -> Arc<dyn RenderDelegate> {
            Arc::new(Self {
                handle: self.handle,
                refreshes: AtomicUsize::new(0),
            })
        }
    }

    fn translated(x: f64) -> Transformation {
        let mut t = Transformation::new();
        t.set_translation([x, 0.0, 0.0]);
        t
    }

    #[test]
    fn test_set_transformation_leaves_previous() {
        let view = View::with_dispatcher(Dispatcher::inline());
        let recorder = Recorder::new();
        view.updates().register(&recorder.as_subscriber());

        view.set_transformation(translated(2.0));
        assert_eq!(view.transformation(), translated(2.0));
        assert_eq!(view.previous_transformation(), Transformation::new());
        assert!(recorder.saw(SubscriptionType::Transformation));
    }

    #[test]
    fn test_sync_point_is_silent() {
        let view = View::with_dispatcher(Dispatcher::inline());
        view.set_transformation(translated(1.0));

        let recorder = Recorder::new();
        view.updates().register(&recorder.as_subscriber());
        view.set_synched();
        assert_eq!(view.previous_transformation(), translated(1.0));
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_update_transformation() {
        let view = View::with_dispatcher(Dispatcher::inline());
        view.update_transformation(|t| t.set_size(3.0));
        assert_eq!(view.transformation().size(), 3.0);
    }

    #[test]
    fn test_equality_ignores_previous() {
        let a = View::with_dispatcher(Dispatcher::inline());
        let b = View::with_dispatcher(Dispatcher::inline());
        a.set_transformation(translated(1.0));
        a.set_synched();
        a.set_transformation(Transformation::new());
        assert_eq!(a, b);

        b.set_transformation(translated(5.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_duplicates_delegate() {
        let delegate = Arc::new(CountingDelegate {
            handle: 7,
            refreshes: AtomicUsize::new(0),
        });
        let view = View::with_dispatcher(Dispatcher::inline()).with_delegate(delegate.clone());
        view.set_transformation(translated(4.0));

        let copy = view.clone();
        assert_eq!(copy, view);
        assert_eq!(copy.representation(), Some(RepresentationHandle(7)));

        let mesh = Mesh::with_dispatcher(MeshKind::Basic, Dispatcher::inline());
        copy.refresh(&mesh);
        assert_eq!(delegate.refreshes.load(Ordering::Relaxed), 0, "The clone has its own delegate");
        view.refresh(&mesh);
        assert_eq!(delegate.refreshes.load(Ordering::Relaxed), 1);

        copy.set_transformation(Transformation::new());
        assert_eq!(view.transformation(), translated(4.0));
    }

    #[test]
    fn test_no_delegate_no_representation() {
        assert_eq!(View::with_dispatcher(Dispatcher::inline()).representation(), None);
    }
}
