//! Entity lifecycle, registry, and snapshot pipeline for Glade simulations.
//!
//! This crate holds the per-frame systems that run on top of the entity
//! store: periodic spawning ([`Spawner`]), aging and expiry
//! ([`LifespanEnforcer`]), the concurrent category registry
//! ([`EntityRegistry`]), and the page-rotating representation pipeline
//! ([`RepPages`], [`RepExtractor`]) that hands a consistent snapshot of
//! entity state to a consumer thread. [`Frame`] wires them together in
//! the fixed per-frame phase order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod canvas;
pub mod config;
pub mod frame;
pub mod lifespan;
pub mod registry;
pub mod rep;
pub mod spawn;

pub use canvas::{CanvasProjection, KindStyle};
pub use config::{ConfigError, FrameConfig, LifespanConfig, PlacementConfig, SpawnerConfig};
pub use frame::{Frame, FrameMetrics};
pub use lifespan::LifespanEnforcer;
pub use registry::EntityRegistry;
pub use rep::{RepExtractor, RepPages, RepRecord, NO_LIFESPAN_AGE};
pub use spawn::{AnchorPlacement, Placement, ScatterPlacement, Spawner};
