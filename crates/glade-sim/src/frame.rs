//! Per-frame orchestration.
//!
//! [`Frame`] owns the store, spawners, registry, and page ring, and runs
//! the fixed phase order each frame:
//!
//! 1. spawner timers (entity creation);
//! 2. lifespan enforcement (aging, expiry collection);
//! 3. deferred destroy application;
//! 4. registry queue drain (destroys before creates);
//! 5. representation extraction and page commit.
//!
//! Representation extraction runs after every mutating system, so a
//! published page never shows an entity that was destroyed (or misses
//! one created) earlier in the same frame.

use std::sync::Arc;

use log::trace;

use crate::config::{ConfigError, FrameConfig};
use crate::lifespan::LifespanEnforcer;
use crate::registry::EntityRegistry;
use crate::rep::{RepExtractor, RepPages};
use crate::spawn::Spawner;
use glade_store::EntityStore;

/// Log target for the frame loop.
const LOG_FRAME: &str = "glade::frame";

/// Counters for one executed frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameMetrics {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Entities built by spawners this frame.
    pub spawned: usize,
    /// Entities submitted for destruction by the lifespan enforcer.
    pub expired: usize,
    /// Entities actually destroyed this frame.
    pub destroyed: usize,
    /// Representation records published this frame.
    pub extracted: usize,
    /// Live entities after the frame.
    pub live: usize,
}

/// The simulation frame loop.
///
/// Construct it on the thread that will drive [`advance`](Frame::advance);
/// that thread becomes the registry's consumer thread. The registry and
/// page ring are shared behind [`Arc`] so consumer threads can hold them
/// across frames.
pub struct Frame {
    store: EntityStore,
    spawners: Vec<Spawner>,
    registry: Arc<EntityRegistry>,
    pages: Arc<RepPages>,
    frame: u64,
}

impl Frame {
    /// Build a frame loop from a validated configuration.
    pub fn new(config: FrameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let registry = Arc::new(EntityRegistry::new());
        let pages = Arc::new(RepPages::new(config.page_count));
        let mut store = EntityStore::new(config.store);

        // Wire the store's observers into the registry. The registry
        // sorts out which thread a notification arrives on.
        let r = Arc::clone(&registry);
        store.on_created(Box::new(move |events| r.notify_created(events)));
        let r = Arc::clone(&registry);
        store.on_destroyed(Box::new(move |events| r.notify_destroyed(events)));

        let spawners = config.spawners.iter().map(Spawner::from_config).collect();

        Ok(Self {
            store,
            spawners,
            registry,
            pages,
            frame: 0,
        })
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// The shared representation page ring.
    pub fn pages(&self) -> &Arc<RepPages> {
        &self.pages
    }

    /// The entity store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Mutable access to the entity store, for direct spawning.
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// The spawners, for runtime enable/disable.
    pub fn spawners_mut(&mut self) -> &mut [Spawner] {
        &mut self.spawners
    }

    /// Run one frame with the given delta time.
    pub fn advance(&mut self, dt: f32) -> FrameMetrics {
        self.frame += 1;

        let mut spawned = 0;
        for spawner in &mut self.spawners {
            if spawner.tick(&mut self.store, dt).is_some() {
                spawned += 1;
            }
        }

        let expired = LifespanEnforcer::run(&mut self.store, dt);
        let destroyed = self.store.apply_destroys();
        self.registry.drain();
        let extracted = RepExtractor::run(&self.store, &self.pages);

        let metrics = FrameMetrics {
            frame: self.frame,
            spawned,
            expired,
            destroyed,
            extracted,
            live: self.store.len(),
        };
        trace!(target: LOG_FRAME, "frame {}: {metrics:?}", self.frame);
        metrics
    }
}
