//! Subscription tags, notifications and the subscriber trait

use bitflags::bitflags;

use crate::core::EntityId;

/// Kind of change a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionType {
    /// A property value changed
    Property,
    /// The selection property changed
    Selection,
    /// A child was added or removed
    Child,
    /// The view's transformation changed
    Transformation,
    /// The wireframe display toggle changed
    Wireframe,
    /// Matches every other type
    All,
}

bitflags! {
    /// Set of subscription types carried by a notification or declared as
    /// a subscriber's interest.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SubscriptionSet: u8 {
        /// Property changes
        const PROPERTY       = 0b0000_0001;
        /// Selection changes
        const SELECTION      = 0b0000_0010;
        /// Child additions and removals
        const CHILD          = 0b0000_0100;
        /// Transformation changes
        const TRANSFORMATION = 0b0000_1000;
        /// Wireframe toggles
        const WIREFRAME      = 0b0001_0000;
        /// Everything
        const ALL = Self::PROPERTY.bits()
            | Self::SELECTION.bits()
            | Self::CHILD.bits()
            | Self::TRANSFORMATION.bits()
            | Self::WIREFRAME.bits();
    }
}

impl From<SubscriptionType> for SubscriptionSet {
    fn from(kind: SubscriptionType) -> Self {
        match kind {
            SubscriptionType::Property => Self::PROPERTY,
            SubscriptionType::Selection => Self::SELECTION,
            SubscriptionType::Child => Self::CHILD,
            SubscriptionType::Transformation => Self::TRANSFORMATION,
            SubscriptionType::Wireframe => Self::WIREFRAME,
            SubscriptionType::All => Self::ALL,
        }
    }
}

impl SubscriptionSet {
    /// Whether this set contains the given type (`All` requires every tag)
    #[must_use]
    pub fn has(self, kind: SubscriptionType) -> bool {
        self.contains(kind.into())
    }
}

/// A change published by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    /// Entity whose update manager published the change
    pub source: EntityId,
    /// What changed; never empty
    pub tags: SubscriptionSet,
}

impl Notification {
    /// Create a notification from a source and tag set
    #[must_use]
    pub const fn new(source: EntityId, tags: SubscriptionSet) -> Self {
        Self { source, tags }
    }
}

/// Something that can be registered with an entity's update manager.
///
/// Delivery happens on a dispatcher worker, never on the thread that made
/// the change (unless the dispatcher runs inline). Implementations must
/// not assume any ordering between notifications from different publishers.
pub trait Subscriber: Send + Sync {
    /// Identity used for registration and unregistration
    fn subscriber_id(&self) -> EntityId;

    /// Types this subscriber reacts to when `source` publishes.
    ///
    /// Notifications whose tags do not intersect this set are not delivered.
    fn interests(&self, _source: EntityId) -> SubscriptionSet {
        SubscriptionSet::ALL
    }

    /// Handle a notification
    fn update(&self, notification: &Notification);
}
