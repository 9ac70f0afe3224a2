//! Error types for the Glade simulation layer.
//!
//! Organized by subsystem. Internal systems never panic in release
//! paths: fallible operations return these enums, booleans, or empty
//! collections. Programmer errors additionally `debug_assert!` at the
//! call site.

use std::error::Error;
use std::fmt;

/// Errors from entity construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// The store has no free slots left.
    StoreFull,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreFull => write!(f, "entity store is full"),
        }
    }
}

impl Error for BuildError {}

/// Errors from the entity registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Subscribe/unsubscribe attempted while a broadcast for the same
    /// event is in progress. Programmer error: the subscriber list must
    /// not be modified from inside its own broadcast.
    BroadcastInProgress,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BroadcastInProgress => {
                write!(f, "subscriber list modified during its own broadcast")
            }
        }
    }
}

impl Error for RegistryError {}
