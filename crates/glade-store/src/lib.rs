//! Chunked entity storage with deferred destruction for Glade simulations.
//!
//! The simulation layer treats entity storage as a host service with a
//! narrow contract: create entities from a builder, request destruction
//! in deferred batches, iterate entities matching a filter in disjoint
//! parallel chunks, and observe create/destroy events. [`EntityStore`]
//! is that service.
//!
//! Structural mutation never happens during iteration: destruction
//! requests are collected into a pending batch and applied in a distinct
//! phase by [`EntityStore::apply_destroys`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod chunk;
pub mod event;
pub mod store;

pub use builder::EntityBuilder;
pub use chunk::{ChunkFilter, ChunkView, ChunkViewMut, RecordMut, RecordRef};
pub use event::EntityEvent;
pub use store::{EntityStore, StoreConfig};
