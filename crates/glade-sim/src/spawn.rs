//! Periodic entity spawning.
//!
//! A [`Spawner`] owns an interval timer and a placement strategy. Each
//! frame the timer counts down by the frame delta; when it reaches zero
//! and auto-build is enabled, the spawner builds one entity through the
//! store and resets the timer.

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use glade_core::{Entity, Lifespan, MetaKind, Transform};
use glade_store::{EntityBuilder, EntityStore};

use crate::config::{PlacementConfig, SpawnerConfig};

/// Log target for spawn events.
const LOG_SPAWN: &str = "glade::spawn";

/// Initial placement strategy for built entities.
///
/// The variation point across spawner variants: anchored to a fixed
/// transform, scattered within a bounding volume, or anything a caller
/// implements.
pub trait Placement: Send {
    /// Produce the placement for the next built entity.
    fn place(&mut self) -> Transform;
}

/// Places every entity at one fixed transform (e.g. the spawner's own).
pub struct AnchorPlacement(pub Transform);

impl Placement for AnchorPlacement {
    fn place(&mut self) -> Transform {
        self.0
    }
}

/// Places entities uniformly at random within an axis-aligned box.
///
/// Seeded, so placements are reproducible in tests and replays.
pub struct ScatterPlacement {
    min: [f32; 3],
    max: [f32; 3],
    rng: ChaCha8Rng,
}

impl ScatterPlacement {
    /// Scatter within `[min, max]` using the given seed.
    pub fn new(min: [f32; 3], max: [f32; 3], seed: u64) -> Self {
        Self {
            min,
            max,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Placement for ScatterPlacement {
    fn place(&mut self) -> Transform {
        let mut location = [0.0; 3];
        for (axis, slot) in location.iter_mut().enumerate() {
            let (lo, hi) = (self.min[axis], self.max[axis]);
            *slot = if lo < hi { self.rng.gen_range(lo..hi) } else { lo };
        }
        Transform::at(location)
    }
}

/// Timer-driven entity builder.
///
/// Interval policy:
/// - `interval > 0` — at most one build per `interval` seconds;
/// - `interval == 0` — one build per tick;
/// - `interval < 0` — auto-build disabled, regardless of `enabled`.
pub struct Spawner {
    kind: MetaKind,
    interval: f32,
    time_to_next: f32,
    enabled: bool,
    lifespan: Option<Lifespan>,
    placement: Box<dyn Placement>,
}

impl Spawner {
    /// Build a spawner from its config.
    pub fn from_config(config: &SpawnerConfig) -> Self {
        let placement: Box<dyn Placement> = match config.placement {
            PlacementConfig::Anchor(transform) => Box::new(AnchorPlacement(transform)),
            PlacementConfig::Scatter { min, max, seed } => {
                Box::new(ScatterPlacement::new(min, max, seed))
            }
        };
        let lifespan = config.lifespan.as_ref().map(|l| {
            if l.immortal {
                Lifespan::immortal(l.max_age)
            } else {
                Lifespan::mortal(l.max_age)
            }
        });
        Self {
            kind: config.kind,
            interval: config.interval_seconds,
            time_to_next: config.interval_seconds.max(0.0),
            enabled: true,
            lifespan,
            placement,
        }
    }

    /// Whether the timer can trigger builds.
    pub fn is_auto_build_enabled(&self) -> bool {
        self.enabled && self.interval >= 0.0
    }

    /// Pause or resume auto-building. A negative interval stays disabled
    /// either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Advance the timer by `dt`; build one entity if it elapsed.
    ///
    /// The timer resets to the full interval rather than carrying the
    /// overshoot, so spawn cadence drifts slightly under variable frame
    /// rates. Intentional: this matches the long-standing observable
    /// behavior downstream content is tuned against.
    pub fn tick(&mut self, store: &mut EntityStore, dt: f32) -> Option<Entity> {
        self.time_to_next -= dt;

        if self.is_auto_build_enabled() && self.time_to_next <= 0.0 {
            let built = self.build(store);
            self.time_to_next = self.interval;
            return built;
        }
        None
    }

    /// Build one entity now, regardless of the timer.
    pub fn build(&mut self, store: &mut EntityStore) -> Option<Entity> {
        let mut builder = EntityBuilder::new(self.kind)
            .transform(self.placement.place())
            .tracked()
            .represented();
        if let Some(lifespan) = self.lifespan {
            builder = builder.lifespan(lifespan);
        }

        if !builder.meta.is_valid() {
            // Fail-soft: the entity is still built, just flagged.
            warn!(target: LOG_SPAWN, "building entity with invalid metadata ({})", builder.meta);
        }

        match store.spawn(builder) {
            Ok(entity) => {
                debug!(target: LOG_SPAWN, "built {entity} ({})", self.kind);
                Some(entity)
            }
            Err(err) => {
                debug_assert!(false, "entity build failed: {err}");
                warn!(target: LOG_SPAWN, "entity build failed, skipping spawn: {err}");
                None
            }
        }
    }
}
