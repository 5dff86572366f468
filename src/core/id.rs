//! Process-unique entity identifiers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique entity IDs
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a participant in the entity graph.
///
/// Meshes, views, controllers and update managers each receive their own id
/// on construction. Ids are never reused within a process and never take part
/// in structural equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate the next unused id
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = EntityId::next();
        let b = EntityId::next();
        assert_ne!(a, b);
        assert!(b > a, "Ids should be handed out in increasing order");
    }

    #[test]
    fn test_display() {
        let id = EntityId::next();
        assert_eq!(id.to_string(), format!("#{}", id.get()));
    }
}
