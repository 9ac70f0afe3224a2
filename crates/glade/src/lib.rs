//! Glade: an entity-lifecycle simulation layer with a lock-light
//! cross-thread snapshot pipeline.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Glade sub-crates. For most users, adding `glade` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use glade::prelude::*;
//!
//! // One wisp per frame, each living 2.5 seconds.
//! let config = FrameConfig {
//!     spawners: vec![SpawnerConfig {
//!         kind: MetaKind::Wisp,
//!         interval_seconds: 0.0,
//!         placement: PlacementConfig::Scatter {
//!             min: [-100.0, -100.0, 0.0],
//!             max: [100.0, 100.0, 0.0],
//!             seed: 7,
//!         },
//!         lifespan: Some(LifespanConfig { max_age: 2.5, immortal: false }),
//!     }],
//!     ..FrameConfig::default()
//! };
//!
//! let mut frame = Frame::new(config).unwrap();
//! let metrics = frame.advance(1.0);
//! assert_eq!(metrics.spawned, 1);
//!
//! // A consumer (e.g. a renderer on another thread) reads the page ring.
//! frame.pages().read(|serial, records| {
//!     assert_eq!(serial.0, 1);
//!     assert_eq!(records.len(), 1);
//! });
//!
//! // The registry answers category queries.
//! assert_eq!(frame.registry().query_by_kind(MetaKind::Wisp).len(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `glade-core` | Handles, fragments, IDs, errors |
//! | [`store`] | `glade-store` | Entity storage, builder, chunk iteration |
//! | [`sim`] | `glade-sim` | Spawner, enforcer, registry, snapshot pipeline |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Re-export of `glade-core`.
pub mod core {
    pub use glade_core::*;
}

/// Re-export of `glade-store`.
pub mod store {
    pub use glade_store::*;
}

/// Re-export of `glade-sim`.
pub mod sim {
    pub use glade_sim::*;
}

/// The types most programs need.
pub mod prelude {
    pub use glade_core::{
        Entity, Lifespan, LifespanFlags, MetaData, MetaKind, PageSerial, SubscriberId, Transform,
    };
    pub use glade_sim::{
        CanvasProjection, ConfigError, EntityRegistry, Frame, FrameConfig, FrameMetrics,
        LifespanConfig, PlacementConfig, RepPages, RepRecord, Spawner, SpawnerConfig,
        NO_LIFESPAN_AGE,
    };
    pub use glade_store::{ChunkFilter, EntityBuilder, EntityEvent, EntityStore, StoreConfig};
}
