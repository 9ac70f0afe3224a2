//! Generational entity handles.
//!
//! An [`Entity`] is an opaque, stable identifier for a simulated entity.
//! It pairs a slot index with a serial number so that a handle held after
//! its entity died can be detected as stale instead of silently aliasing
//! whatever entity reuses the slot.

use std::fmt;

/// Opaque handle to a simulated entity.
///
/// Handles are created by the entity store and only copied elsewhere;
/// nothing outside the store can mint a live handle. Equality and hashing
/// cover both the slot index and the serial, so a reused slot produces a
/// distinct handle.
///
/// Serial `0` is reserved for the unset handle; live serials start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    serial: u32,
}

impl Entity {
    /// The null handle. `is_set()` returns `false` for this value only
    /// among handles minted by a store.
    pub const UNSET: Entity = Entity {
        index: 0,
        serial: 0,
    };

    /// Construct a handle from raw parts.
    ///
    /// Intended for the entity store and for tests that need synthetic
    /// handles; holding a handle never grants access to storage.
    pub fn from_raw(index: u32, serial: u32) -> Self {
        Self { index, serial }
    }

    /// Slot index within the store.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Serial number of the slot when this handle was minted.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Whether this handle refers to an entity at all.
    ///
    /// A set handle may still be stale (its entity already destroyed);
    /// only the store can tell. An unset handle never refers to anything.
    pub fn is_set(&self) -> bool {
        self.serial != 0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "Entity({}:{})", self.index, self.serial)
        } else {
            write!(f, "Entity(unset)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unset_is_not_set() {
        assert!(!Entity::UNSET.is_set());
        assert!(!Entity::default().is_set());
    }

    #[test]
    fn raw_round_trip() {
        let e = Entity::from_raw(7, 3);
        assert!(e.is_set());
        assert_eq!(e.index(), 7);
        assert_eq!(e.serial(), 3);
    }

    #[test]
    fn reused_slot_is_distinct() {
        let old = Entity::from_raw(4, 1);
        let new = Entity::from_raw(4, 2);
        assert_ne!(old, new);

        let mut set = HashSet::new();
        set.insert(old);
        assert!(!set.contains(&new));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Entity::from_raw(2, 9).to_string(), "Entity(2:9)");
        assert_eq!(Entity::UNSET.to_string(), "Entity(unset)");
    }
}
