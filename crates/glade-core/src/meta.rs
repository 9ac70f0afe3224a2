//! Entity category metadata.
//!
//! Every entity carries one [`MetaData`] value fixed at creation time.
//! All entities built by the same spawner share the same value, and the
//! registry indexes live entities by its [`MetaKind`].

use std::fmt;

/// Category of a simulated entity.
///
/// `None` is the invalid/unset category. New kinds go before `MAX`,
/// which is the exclusive upper bound of valid discriminants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MetaKind {
    /// No category; entities created with this are flagged invalid.
    #[default]
    None = 0,
    /// Decorative rock.
    Rock = 1,
    /// Decorative tree.
    Tree = 2,
    /// Drifting wisp.
    Wisp = 3,
    /// Exclusive upper bound of valid discriminants. Not a real kind.
    MAX = 4,
}

impl MetaKind {
    /// All valid kinds, in discriminant order.
    pub const ALL: [MetaKind; 3] = [MetaKind::Rock, MetaKind::Tree, MetaKind::Wisp];

    /// Whether this kind is a valid category.
    pub fn is_valid(&self) -> bool {
        *self != MetaKind::None && (*self as u8) < (MetaKind::MAX as u8)
    }
}

impl fmt::Display for MetaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetaKind::None => "None",
            MetaKind::Rock => "Rock",
            MetaKind::Tree => "Tree",
            MetaKind::Wisp => "Wisp",
            MetaKind::MAX => "MAX",
        };
        write!(f, "{name}")
    }
}

/// Per-entity category metadata, read-only after creation.
///
/// Entities created with invalid metadata are a logged anomaly, not an
/// error: the store still creates and tracks them (fail-soft), they just
/// answer `false` from [`MetaData::is_valid`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MetaData {
    /// Category of the entity.
    pub kind: MetaKind,
}

impl MetaData {
    /// Metadata for the given kind.
    pub fn new(kind: MetaKind) -> Self {
        Self { kind }
    }

    /// Whether the metadata names a valid category.
    pub fn is_valid(&self) -> bool {
        self.kind.is_valid()
    }
}

impl fmt::Display for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_invalid() {
        assert!(!MetaKind::None.is_valid());
        assert!(!MetaData::default().is_valid());
    }

    #[test]
    fn max_is_invalid() {
        assert!(!MetaKind::MAX.is_valid());
    }

    #[test]
    fn all_listed_kinds_are_valid() {
        for kind in MetaKind::ALL {
            assert!(kind.is_valid(), "{kind} should be valid");
            assert!(MetaData::new(kind).is_valid());
        }
    }
}
