//! Core types for the Glade entity-lifecycle simulation layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Glade workspace:
//! entity handles, data fragments (lifespan, metadata, transform),
//! monotonic IDs, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod entity;
pub mod error;
pub mod ids;
pub mod lifespan;
pub mod meta;
pub mod transform;

pub use entity::Entity;
pub use error::{BuildError, RegistryError};
pub use ids::{PageSerial, SubscriberId};
pub use lifespan::{Lifespan, LifespanFlags};
pub use meta::{MetaData, MetaKind};
pub use transform::Transform;
