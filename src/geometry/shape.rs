//! Shapes and their single parent

use crate::model::{Category, Controller, Mesh, MeshKind};
use crate::update::SubscriptionSet;

impl Mesh {
    /// Empty shape on the global dispatcher
    #[must_use]
    pub fn shape() -> Self {
        Self::new(MeshKind::Shape)
    }

    /// Replace the parent of a shape.
    ///
    /// The shape stops reporting its changes to the previous parent and
    /// starts reporting them to the new one. `None` detaches it. Publishes
    /// CHILD. Ignored for kinds without a parent.
    ///
    /// The parent hears what this mesh publishes, not what the shape's
    /// controller publishes: view transformation changes do not reach it. A
    /// parent that also holds the shape in "Children" hears mesh changes
    /// twice, once through each route.
    pub fn set_parent(&self, parent: Option<&Controller>) {
        if !self.kind().is_shape() {
            log::debug!("{:?} has no parent to set", self.kind());
            return;
        }
        if parent.is_some_and(|p| p.model().id() == self.id()) {
            log::debug!("{} cannot be its own parent", self.id());
            return;
        }

        {
            let mut children = self.children.write();
            for old in &children.replace(&Category::PARENT, parent.cloned()) {
                self.updates().unregister(old.model().updates().id());
            }
            if let Some(parent) = parent {
                self.updates().register(&parent.model().updates().listener());
            }
        }

        self.notify(SubscriptionSet::CHILD);
    }

    /// The parent of a shape
    #[must_use]
    pub fn parent(&self) -> Option<Controller> {
        self.children(&Category::PARENT).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Category, keys};
    use crate::test_util::{Recorder, basic, shape};
    use crate::update::{Dispatcher, SubscriptionType};

    #[test]
    fn test_set_parent_replaces() {
        let d = Dispatcher::inline();
        let (s, p1, p2) = (shape(&d), shape(&d), shape(&d));

        s.model().set_parent(Some(&p1));
        s.model().set_parent(Some(&p2));
        let parents = s.children(&Category::PARENT);
        assert_eq!(parents.len(), 1);
        assert!(parents[0].same_entity(&p2));

        s.model().set_parent(None);
        assert!(s.model().parent().is_none());
    }

    #[test]
    fn test_changes_reach_only_the_current_parent() {
        let d = Dispatcher::inline();
        let (s, p1, p2) = (shape(&d), shape(&d), shape(&d));
        let (r1, r2) = (Recorder::new(), Recorder::new());
        p1.updates().register(&r1.as_subscriber());
        p2.updates().register(&r2.as_subscriber());

        s.model().set_parent(Some(&p1));
        s.model().set_parent(Some(&p2));
        r1.clear();
        r2.clear();

        s.set_property(keys::DESCRIPTION, "moved");
        assert!(r2.saw(SubscriptionType::Property));
        assert_eq!(r1.count(), 0);
    }

    #[test]
    fn test_second_parent_through_add_is_rejected() {
        let d = Dispatcher::inline();
        let (s, p1, p2) = (shape(&d), shape(&d), shape(&d));
        assert!(s.add_to_category(&p1, &Category::PARENT));
        assert!(!s.add_to_category(&p2, &Category::PARENT));
        assert!(s.model().parent().is_some_and(|p| p.same_entity(&p1)));

        // Removing the parent stops reporting to it
        let recorder = Recorder::new();
        p1.updates().register(&recorder.as_subscriber());
        assert!(s.remove(&p1));
        recorder.clear();
        s.set_property(keys::NAME, "orphan");
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_parent_does_not_notify_shape() {
        let d = Dispatcher::inline();
        let (s, p) = (shape(&d), shape(&d));
        s.model().set_parent(Some(&p));

        let recorder = Recorder::new();
        s.updates().register(&recorder.as_subscriber());
        p.set_property(keys::NAME, "parent");
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_children_and_equality_ignore_parent() {
        let d = Dispatcher::inline();
        let (s, p) = (shape(&d), shape(&d));
        let child = basic(&d);
        assert!(s.add(&child));
        assert!(s.children(&Category::CHILDREN)[0].same_entity(&child));

        let copy = s.deep_clone();
        s.model().set_parent(Some(&p));
        assert_eq!(copy, s, "The parent is not part of a shape's structure");
        assert!(copy.model().parent().is_none());
    }

    #[test]
    fn test_parent_hears_mesh_changes_only() {
        let d = Dispatcher::inline();
        let (s, p) = (shape(&d), shape(&d));
        let recorder = Recorder::new();
        p.updates().register(&recorder.as_subscriber());
        s.model().set_parent(Some(&p));
        recorder.clear();

        s.set_translation([1.0, 0.0, 0.0]);
        assert_eq!(recorder.count(), 0, "View changes stay with the shape");
        s.set_property(keys::NAME, "once");
        assert_eq!(recorder.count(), 1);

        // Holding the shape as a child adds a second route
        assert!(p.add(&s));
        recorder.clear();
        s.set_property(keys::NAME, "twice");
        assert_eq!(recorder.count(), 2);
        s.set_translation([2.0, 0.0, 0.0]);
        assert_eq!(recorder.count(), 3);
    }

    #[test]
    fn test_racing_parents_leave_one_registration() {
        let d = Dispatcher::inline();
        let (s, p1, p2) = (shape(&d), shape(&d), shape(&d));

        std::thread::scope(|scope| {
            for parent in [&p1, &p2] {
                let s = &s;
                scope.spawn(move || {
                    for _ in 0..200 {
                        s.model().set_parent(Some(parent));
                    }
                });
            }
        });

        let current = s.model().parent().expect("a parent was set");
        let other = if current.same_entity(&p1) { &p2 } else { &p1 };
        let updates = s.model().updates();
        assert!(updates.is_registered(current.model().updates().id()));
        assert!(!updates.is_registered(other.model().updates().id()));
        assert_eq!(updates.subscriber_count(), 2, "The parent and the controller");
    }

    #[test]
    fn test_set_parent_on_non_shape_is_ignored() {
        let d = Dispatcher::inline();
        let b = basic(&d);
        b.model().set_parent(Some(&shape(&d)));
        assert!(b.children(&Category::PARENT).is_empty());
    }
}
