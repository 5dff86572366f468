//! Structural model of an entity
//!
//! A [`Mesh`] owns the property store and the categorized children of one
//! entity. Its [`MeshKind`] is fixed at construction and selects the
//! admission and removal rules its children follow. Every mutation publishes
//! through the mesh's own [`UpdateManager`].

use std::fmt;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::DVec3;
use parking_lot::RwLock;

use super::category::{Changes, ChildCollection};
use super::controller::{CloneMap, Controller, ControllerInner};
use super::policy::{Category, MeshKind};
use super::properties::PropertyStore;
use crate::core::EntityId;
use crate::update::{Dispatcher, SubscriptionSet, UpdateManager};

/// Properties and categorized children of an entity
pub struct Mesh {
    pub(crate) id: EntityId,
    pub(crate) kind: MeshKind,
    pub(crate) properties: RwLock<PropertyStore>,
    pub(crate) children: RwLock<ChildCollection>,
    /// Only meaningful for located kinds
    pub(crate) location: RwLock<DVec3>,
    pub(crate) wireframe: AtomicBool,
    controller: RwLock<Weak<ControllerInner>>,
    pub(crate) updates: UpdateManager,
}

impl Mesh {
    /// Create an empty mesh of `kind` on the global dispatcher
    #[must_use]
    pub fn new(kind: MeshKind) -> Self {
        Self::from_manager(kind, UpdateManager::new())
    }

    /// Create an empty mesh of `kind` delivering through `dispatcher`
    #[must_use]
    pub fn with_dispatcher(kind: MeshKind, dispatcher: Dispatcher) -> Self {
        Self::from_manager(kind, UpdateManager::with_dispatcher(dispatcher))
    }

    fn from_manager(kind: MeshKind, updates: UpdateManager) -> Self {
        Self {
            id: EntityId::next(),
            kind,
            properties: RwLock::new(PropertyStore::new()),
            children: RwLock::new(ChildCollection::default()),
            location: RwLock::new(DVec3::ZERO),
            wireframe: AtomicBool::new(false),
            controller: RwLock::new(Weak::new()),
            updates,
        }
    }

    /// Set the initial location without publishing anything
    #[must_use]
    pub fn with_location(self, location: [f64; 3]) -> Self {
        *self.location.write() = DVec3::from_array(location);
        self
    }

    /// Get the entity id
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Get the kind
    #[must_use]
    pub fn kind(&self) -> MeshKind {
        self.kind
    }

    /// The publisher for changes to this mesh
    #[must_use]
    pub fn updates(&self) -> &UpdateManager {
        &self.updates
    }

    /// The controller wrapping this mesh, if it is still alive
    #[must_use]
    pub fn controller(&self) -> Option<Controller> {
        self.controller.read().upgrade().map(Controller::from_inner)
    }

    pub(crate) fn set_controller(&self, controller: Weak<ControllerInner>) {
        *self.controller.write() = controller;
    }

    pub(crate) fn notify(&self, tags: SubscriptionSet) {
        self.updates.notify(tags);
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Look up a property value
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.read().get(key).map(str::to_owned)
    }

    /// Snapshot of every property
    #[must_use]
    pub fn properties(&self) -> PropertyStore {
        self.properties.read().clone()
    }

    /// Store a property value.
    ///
    /// Publishes PROPERTY (SELECTION for the selection key) when the stored
    /// value actually changes. Returns the previous value.
    pub fn set_property(&self, key: &str, value: &str) -> Option<String> {
        let previous = self.properties.write().set(key, value);
        if previous.as_deref() != Some(value) {
            self.notify(PropertyStore::change_tag(key));
        }
        previous
    }

    /// Whether the mesh is drawn as a wireframe
    #[must_use]
    pub fn is_wireframe(&self) -> bool {
        self.wireframe.load(Ordering::Acquire)
    }

    /// Toggle wireframe display, publishing WIREFRAME on change
    pub fn set_wireframe(&self, wireframe: bool) {
        if self.wireframe.swap(wireframe, Ordering::AcqRel) != wireframe {
            self.notify(SubscriptionSet::WIREFRAME);
        }
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    /// Add a child to the category this kind picks for it
    pub fn add(&self, child: &Controller) -> bool {
        let category = self.kind.default_category(child.model().kind());
        self.add_to_category(child, &category)
    }

    /// Add a child to `category`.
    ///
    /// Returns `false` when the kind's admission rules reject the child, in
    /// which case nothing changes and nothing is published.
    pub fn add_to_category(&self, child: &Controller, category: &Category) -> bool {
        if child.model().id == self.id {
            log::debug!("{} cannot contain itself", self.id);
            return false;
        }

        // Read the edge's vertices before taking our own lock
        let endpoints = if self.kind.is_face() && *category == Category::EDGES {
            child.model().children(&Category::VERTICES)
        } else {
            Vec::new()
        };

        {
            let mut children = self.children.write();
            let Some(admitted) = children.admit(self.kind, child, category, &endpoints) else {
                return false;
            };
            // Registrations change together with the collection
            self.subscribe(&admitted);
        }
        self.notify(SubscriptionSet::CHILD);
        true
    }

    /// Remove a child from every category.
    ///
    /// Faces also drop vertices no remaining edge references, and refuse to
    /// drop a vertex an edge still references. Returns `true` if anything
    /// was removed.
    pub fn remove(&self, child: &Controller) -> bool {
        {
            let mut children = self.children.write();
            let removed = children.withdraw(self.kind, child);
            if removed.is_empty() {
                return false;
            }
            for (child, category) in &removed {
                if self.kind.is_shape() && *category == Category::PARENT {
                    self.updates.unregister(child.model().updates.id());
                } else if !children.held_in_propagating(self.kind, child) {
                    child.updates().unregister(self.updates.id());
                }
            }
        }
        self.notify(SubscriptionSet::CHILD);
        true
    }

    /// Children in `category`; empty for unknown categories
    #[must_use]
    pub fn children(&self, category: &Category) -> Vec<Controller> {
        self.children.read().get(category)
    }

    /// Every child across all categories
    #[must_use]
    pub fn entities(&self) -> Vec<Controller> {
        self.children.read().all()
    }

    /// Names of the categories holding children
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.children.read().names()
    }

    /// Whether `child` is held in any category
    #[must_use]
    pub fn contains(&self, child: &Controller) -> bool {
        self.children.read().contains(child)
    }

    /// Register this mesh with children that just entered, following the
    /// kind's propagation rules.
    fn subscribe(&self, entered: &Changes) {
        let listener = self.updates.listener();
        for (child, category) in entered {
            if self.kind.is_shape() && *category == Category::PARENT {
                // A shape reports to its parent rather than listening to it
                self.updates.register(&child.model().updates.listener());
            } else if self.kind.propagates(category) {
                child.updates().register(&listener);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Copy and clone
    // -------------------------------------------------------------------------

    /// Overwrite this mesh with a deep copy of `other`.
    ///
    /// Properties, location, wireframe state and structural children are
    /// replaced; back-reference categories are kept. The copied children are
    /// admitted again under this mesh's rules. A mesh's kind never changes,
    /// so a source of another kind is refused. `None`, copying a mesh onto
    /// itself, or a refused copy changes nothing and returns `false`.
    /// Otherwise publishes every subscription type.
    pub fn copy_from(&self, other: Option<&Mesh>) -> bool {
        let Some(other) = other else {
            return false;
        };
        if other.id == self.id {
            return false;
        }
        if other.kind != self.kind {
            log::debug!(
                "{} is {:?}; refusing to copy {:?} {}",
                self.id,
                self.kind,
                other.kind,
                other.id
            );
            return false;
        }

        let properties = other.properties();
        let location = *other.location.read();
        let wireframe = other.is_wireframe();
        let snapshot = other.children.read().clone();
        let copied = ChildCollection::admitted(
            self.kind,
            snapshot.remap(self.kind, &mut CloneMap::new()),
        );

        {
            let mut children = self.children.write();
            let dropped = children.replace_structure(self.kind, copied);
            for (child, _) in &dropped {
                child.updates().unregister(self.updates.id());
            }
            let entered = children.propagating(self.kind);
            self.subscribe(&entered);
        }

        *self.properties.write() = properties;
        *self.location.write() = location;
        self.wireframe.store(wireframe, Ordering::Release);

        self.notify(SubscriptionSet::ALL);
        true
    }

    /// Deep copy that reuses clones already made in `clones`
    pub(crate) fn deep_clone_with(&self, clones: &mut CloneMap) -> Self {
        let snapshot = self.children.read().clone();
        let children = snapshot.remap(self.kind, clones);

        let mesh = Self {
            id: EntityId::next(),
            kind: self.kind,
            properties: RwLock::new(self.properties()),
            children: RwLock::new(ChildCollection::default()),
            location: RwLock::new(*self.location.read()),
            wireframe: AtomicBool::new(self.is_wireframe()),
            controller: RwLock::new(Weak::new()),
            updates: self.updates.detached(),
        };
        let entered = children.propagating(self.kind);
        *mesh.children.write() = children;
        mesh.subscribe(&entered);
        mesh
    }
}

/// Deep copy: same properties, cloned children, no subscribers
impl Clone for Mesh {
    fn clone(&self) -> Self {
        self.deep_clone_with(&mut CloneMap::new())
    }
}

/// Structural equality over kind, properties, location and the children of
/// every non-back-reference category. Identity and wireframe state are not
/// compared.
impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        if self.id == other.id {
            return true;
        }
        if self.kind != other.kind
            || *self.location.read() != *other.location.read()
            || *self.properties.read() != *other.properties.read()
        {
            return false;
        }

        let ours = self.children.read().structure(self.kind);
        let theirs = other.children.read().structure(other.kind);
        ours.len() == theirs.len()
            && ours.iter().zip(&theirs).all(|((a, x), (b, y))| {
                a == b && x.len() == y.len() && x.iter().zip(y).all(|(c, d)| c == d)
            })
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("categories", &self.categories())
            .finish_non_exhaustive()
    }
}
