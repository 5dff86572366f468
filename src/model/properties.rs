//! Per-entity string properties

use rustc_hash::FxHashMap;

use crate::update::SubscriptionSet;

/// Well-known property keys
pub mod keys {
    /// Display name
    pub const NAME: &str = "Name";
    /// User-assigned identifier
    pub const ID: &str = "Id";
    /// Free-form description
    pub const DESCRIPTION: &str = "Description";
    /// Selection state; changes are published as SELECTION
    pub const SELECTED: &str = "Selected";
    /// Whether the entity is the root of an assembly
    pub const ROOT: &str = "Root";
    /// Tube length
    pub const LENGTH: &str = "Length";
    /// Tube outer radius
    pub const RADIUS: &str = "Radius";
    /// Tube inner radius
    pub const INNER_RADIUS: &str = "InnerRadius";
    /// Number of tube segments along its axis
    pub const AXIAL_SAMPLES: &str = "AxialSamples";
}

/// String value stored for `true` flags
pub const TRUE: &str = "True";
/// String value stored for `false` flags
pub const FALSE: &str = "False";

/// Encode a boolean the way flag properties store it
#[must_use]
pub fn flag(value: bool) -> &'static str {
    if value { TRUE } else { FALSE }
}

/// Mapping of unique string keys to string values.
///
/// Absent keys simply have no value. There is no removal; callers only ever
/// overwrite. Equality compares every key, [`keys::ID`] included; the
/// entity id is separate and never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    values: FxHashMap<String, String>,
}

impl PropertyStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Store a value, returning the one it replaced
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over key/value pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tag published when `key` changes
    #[must_use]
    pub fn change_tag(key: &str) -> SubscriptionSet {
        if key == keys::SELECTED {
            SubscriptionSet::SELECTION
        } else {
            SubscriptionSet::PROPERTY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = PropertyStore::new();
        assert_eq!(store.get(keys::DESCRIPTION), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_returns_previous() {
        let mut store = PropertyStore::new();
        assert_eq!(store.set(keys::DESCRIPTION, "test value"), None);
        assert_eq!(
            store.set(keys::DESCRIPTION, "new value"),
            Some("test value".to_string())
        );
        assert_eq!(store.get(keys::DESCRIPTION), Some("new value"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a = PropertyStore::new();
        a.set("a", "1");
        a.set("b", "2");
        let mut b = PropertyStore::new();
        b.set("b", "2");
        b.set("a", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_change_tags() {
        assert_eq!(PropertyStore::change_tag(keys::SELECTED), SubscriptionSet::SELECTION);
        assert_eq!(PropertyStore::change_tag(keys::NAME), SubscriptionSet::PROPERTY);
        assert_eq!(flag(true), "True");
        assert_eq!(flag(false), "False");
    }
}
