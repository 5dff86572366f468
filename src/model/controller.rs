//! Controller: the facade binding a mesh and a view
//!
//! A [`Controller`] is the unit of identity, equality and cloning in the
//! entity graph. Cloning the handle shares the entity; [`Controller::deep_clone`]
//! makes a structurally independent copy.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rustc_hash::FxHashMap;

use super::mesh::Mesh;
use super::policy::Category;
use super::properties::{self, PropertyStore, keys};
use super::transform::Transformation;
use super::view::{RepresentationHandle, View};
use crate::core::EntityId;
use crate::update::{Notification, Subscriber, SubscriptionSet, UpdateManager};

/// Clones made so far during one deep copy, keyed by the original's id.
///
/// A child reachable through several categories (a vertex shared by two
/// edges of a face) is cloned once and the clone is shared the same way.
#[derive(Default)]
pub struct CloneMap {
    clones: FxHashMap<EntityId, Controller>,
}

impl CloneMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone already made for the controller with id `original`
    #[must_use]
    pub fn get(&self, original: EntityId) -> Option<&Controller> {
        self.clones.get(&original)
    }

    /// Number of controllers cloned so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.clones.len()
    }

    /// Whether nothing has been cloned yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }
}

pub(crate) struct ControllerInner {
    id: EntityId,
    mesh: Mesh,
    view: View,
    disposed: AtomicBool,
    updates: UpdateManager,
}

/// Listens to its own mesh and view: refreshes the render delegate and
/// republishes to whoever listens to the controller.
impl Subscriber for ControllerInner {
    fn subscriber_id(&self) -> EntityId {
        self.id
    }

    fn update(&self, notification: &Notification) {
        self.view.refresh(&self.mesh);
        self.updates.notify(notification.tags);
    }
}

/// Shared handle to an entity
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

impl Controller {
    /// Bind `mesh` and `view` into a new entity
    #[must_use]
    pub fn new(mesh: Mesh, view: View) -> Self {
        let updates = mesh.updates().detached();
        let inner = Arc::new(ControllerInner {
            id: EntityId::next(),
            mesh,
            view,
            disposed: AtomicBool::new(false),
            updates,
        });

        inner.mesh.set_controller(Arc::downgrade(&inner));
        let listener = Arc::clone(&inner) as Arc<dyn Subscriber>;
        inner.mesh.updates().register(&listener);
        inner.view.updates().register(&listener);
        log::debug!("Controller {} bound mesh {}", inner.id, inner.mesh.id());

        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<ControllerInner>) -> Self {
        Self { inner }
    }

    /// Get the entity id
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    /// Whether both handles refer to the same entity
    #[must_use]
    pub fn same_entity(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get the mesh
    #[must_use]
    pub fn model(&self) -> &Mesh {
        &self.inner.mesh
    }

    /// Get the view
    #[must_use]
    pub fn view(&self) -> &View {
        &self.inner.view
    }

    /// Publisher that republishes every change to the mesh or view
    #[must_use]
    pub fn updates(&self) -> &UpdateManager {
        &self.inner.updates
    }

    /// Handle from the view's render delegate
    #[must_use]
    pub fn representation(&self) -> Option<RepresentationHandle> {
        self.inner.view.representation()
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Look up a property value
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.inner.mesh.property(key)
    }

    /// Snapshot of every property
    #[must_use]
    pub fn properties(&self) -> PropertyStore {
        self.inner.mesh.properties()
    }

    /// Store a property value, returning the previous one
    pub fn set_property(&self, key: &str, value: &str) -> Option<String> {
        self.inner.mesh.set_property(key, value)
    }

    /// Whether the entity is selected
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.property(keys::SELECTED).as_deref() == Some(properties::TRUE)
    }

    /// Select or deselect the entity, publishing SELECTION on change
    pub fn set_selected(&self, selected: bool) {
        self.set_property(keys::SELECTED, properties::flag(selected));
    }

    /// Whether the entity is the root of an assembly
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.property(keys::ROOT).as_deref() == Some(properties::TRUE)
    }

    /// Mark the entity as the root of an assembly
    pub fn set_root(&self, root: bool) {
        self.set_property(keys::ROOT, properties::flag(root));
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    /// Add a child to the category the mesh kind picks for it
    pub fn add(&self, child: &Controller) -> bool {
        self.inner.mesh.add(child)
    }

    /// Add a child to `category`
    pub fn add_to_category(&self, child: &Controller, category: &Category) -> bool {
        self.inner.mesh.add_to_category(child, category)
    }

    /// Remove a child from every category
    pub fn remove(&self, child: &Controller) -> bool {
        self.inner.mesh.remove(child)
    }

    /// Children in `category`
    #[must_use]
    pub fn children(&self, category: &Category) -> Vec<Controller> {
        self.inner.mesh.children(category)
    }

    /// Every child across all categories
    #[must_use]
    pub fn entities(&self) -> Vec<Controller> {
        self.inner.mesh.entities()
    }

    // -------------------------------------------------------------------------
    // Transformation
    // -------------------------------------------------------------------------

    /// Get the current transformation
    #[must_use]
    pub fn transformation(&self) -> Transformation {
        self.inner.view.transformation()
    }

    /// Get the transformation as of the last sync point
    #[must_use]
    pub fn previous_transformation(&self) -> Transformation {
        self.inner.view.previous_transformation()
    }

    /// Replace the current transformation
    pub fn set_transformation(&self, transformation: Transformation) {
        self.inner.view.set_transformation(transformation);
    }

    /// Mark the sync point
    pub fn set_synched(&self) {
        self.inner.view.set_synched();
    }

    /// Get the size
    #[must_use]
    pub fn size(&self) -> f64 {
        self.transformation().size()
    }

    /// Set the size
    pub fn set_size(&self, size: f64) {
        self.inner.view.update_transformation(|t| t.set_size(size));
    }

    /// Get the scale
    #[must_use]
    pub fn scale(&self) -> [f64; 3] {
        self.transformation().scale()
    }

    /// Set the scale
    pub fn set_scale(&self, scale: [f64; 3]) {
        self.inner.view.update_transformation(|t| t.set_scale(scale));
    }

    /// Get the rotation
    #[must_use]
    pub fn rotation(&self) -> [f64; 3] {
        self.transformation().rotation()
    }

    /// Set the rotation
    pub fn set_rotation(&self, rotation: [f64; 3]) {
        self.inner.view.update_transformation(|t| t.set_rotation(rotation));
    }

    /// Get the skew
    #[must_use]
    pub fn skew(&self) -> [f64; 3] {
        self.transformation().skew()
    }

    /// Set the skew
    pub fn set_skew(&self, skew: [f64; 3]) {
        self.inner.view.update_transformation(|t| t.set_skew(skew));
    }

    /// Get the translation
    #[must_use]
    pub fn translation(&self) -> [f64; 3] {
        self.transformation().translation()
    }

    /// Set the translation
    pub fn set_translation(&self, translation: [f64; 3]) {
        self.inner
            .view
            .update_transformation(|t| t.set_translation(translation));
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Mark the entity as disposed.
    ///
    /// Advisory only: a disposed controller stays fully usable. The first
    /// call publishes PROPERTY; later calls do nothing.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::AcqRel) {
            log::debug!("Controller {} disposed", self.inner.id);
            self.inner.updates.notify(SubscriptionSet::PROPERTY);
        }
    }

    /// Whether `dispose` has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Overwrite this entity with a deep copy of `other`'s mesh and its
    /// current transformation.
    ///
    /// `None`, `self`, or a mesh of another kind changes nothing and
    /// returns `false`.
    pub fn copy_from(&self, other: Option<&Controller>) -> bool {
        let Some(other) = other else {
            return false;
        };
        if self.same_entity(other) || !self.inner.mesh.copy_from(Some(other.model())) {
            return false;
        }
        self.inner.view.set_transformation(other.transformation());
        true
    }

    /// Structurally independent copy with no subscribers
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        self.deep_clone_with(&mut CloneMap::new())
    }

    /// Deep copy sharing clones already recorded in `clones`
    pub fn deep_clone_with(&self, clones: &mut CloneMap) -> Self {
        if let Some(existing) = clones.get(self.inner.id) {
            return existing.clone();
        }

        let mesh = self.inner.mesh.deep_clone_with(clones);
        let copy = Self::new(mesh, self.inner.view.clone());
        if self.is_disposed() {
            copy.inner.disposed.store(true, Ordering::Release);
        }
        clones.clones.insert(self.inner.id, copy.clone());
        copy
    }
}

/// Same entity, or equal meshes and equal views
impl PartialEq for Controller {
    fn eq(&self, other: &Self) -> bool {
        self.same_entity(other)
            || (self.inner.mesh == other.inner.mesh && self.inner.view == other.inner.view)
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.mesh.kind())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
