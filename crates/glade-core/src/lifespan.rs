//! Per-entity aging state.
//!
//! A [`Lifespan`] fragment is attached to entities with a finite life.
//! The lifespan enforcer increments `current_age` once per frame; an
//! entity whose age exceeds `max_age` is slated for deferred destruction
//! unless it carries the [`LifespanFlags::IMMORTAL`] flag.

use std::fmt;

/// Ages below this are treated as zero when normalizing, avoiding a
/// division blow-up for `max_age ≈ 0`.
pub const AGE_EPSILON: f32 = 1.0e-4;

/// Bitset of lifespan behavior flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LifespanFlags(u8);

impl LifespanFlags {
    /// No flags set.
    pub const NONE: LifespanFlags = LifespanFlags(0);
    /// The entity ages but is never destroyed for exceeding `max_age`.
    pub const IMMORTAL: LifespanFlags = LifespanFlags(1 << 0);

    /// Whether every flag in `other` is set in `self`.
    pub fn contains(&self, other: LifespanFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    pub fn union(&self, other: LifespanFlags) -> LifespanFlags {
        LifespanFlags(self.0 | other.0)
    }

    /// Raw bits, for display and debugging.
    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for LifespanFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Self::IMMORTAL) {
            write!(f, "Immortal")
        } else {
            write!(f, "None")
        }
    }
}

/// Aging fragment attached to mortal (and immortal-but-aging) entities.
///
/// Invariant: `current_age` increases monotonically by the frame delta
/// each enforcement pass; both ages are non-negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lifespan {
    /// Behavior flags.
    pub flags: LifespanFlags,
    /// Seconds lived so far.
    pub current_age: f32,
    /// Age beyond which a non-immortal entity expires.
    pub max_age: f32,
}

impl Lifespan {
    /// A lifespan expiring after `max_age` seconds.
    pub fn mortal(max_age: f32) -> Self {
        Self {
            flags: LifespanFlags::NONE,
            current_age: 0.0,
            max_age,
        }
    }

    /// A lifespan that ages but never expires.
    pub fn immortal(max_age: f32) -> Self {
        Self {
            flags: LifespanFlags::IMMORTAL,
            current_age: 0.0,
            max_age,
        }
    }

    /// Whether the immortal flag is set.
    pub fn is_immortal(&self) -> bool {
        self.flags.contains(LifespanFlags::IMMORTAL)
    }

    /// Whether the entity has outlived `max_age` and is not immortal.
    pub fn is_expired(&self) -> bool {
        self.current_age > self.max_age && !self.is_immortal()
    }

    /// Normalized age in `[0, 1]`.
    ///
    /// `current_age / max_age` clamped to `[0, 1]`; forced to `1.0` when
    /// the entity is immortal or `max_age` is effectively zero. The
    /// `-1.0` "no lifespan data" sentinel is reported by the
    /// representation layer for entities without this fragment, not here.
    pub fn alpha_age(&self) -> f32 {
        if self.max_age >= AGE_EPSILON && !self.is_immortal() {
            (self.current_age / self.max_age).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}
