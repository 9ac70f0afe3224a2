//! Plain-data configuration for a simulation frame.
//!
//! All values here are consumed at initialization; nothing re-derives
//! them at runtime. [`FrameConfig::validate`] rejects configurations the
//! frame loop cannot honor.

use std::error::Error;
use std::fmt;

use glade_core::{MetaKind, Transform};
use glade_store::StoreConfig;

/// Errors from frame configuration validation.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Page count outside the supported 2..=3 range.
    InvalidPageCount {
        /// The rejected value.
        got: usize,
    },
    /// Store chunk size or capacity of zero.
    InvalidStoreSize,
    /// A spawner's lifespan bound is negative or not a number.
    InvalidLifespanBound {
        /// Index of the offending spawner.
        spawner: usize,
        /// The rejected max age.
        max_age: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPageCount { got } => {
                write!(f, "page count must be 2 or 3, got {got}")
            }
            Self::InvalidStoreSize => {
                write!(f, "store capacity and chunk size must be non-zero")
            }
            Self::InvalidLifespanBound { spawner, max_age } => {
                write!(f, "spawner {spawner} has invalid max_age {max_age}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Initial lifespan attached to entities built by a spawner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LifespanConfig {
    /// Age beyond which the entity expires.
    pub max_age: f32,
    /// Whether expiry is suppressed.
    pub immortal: bool,
}

/// Placement strategy selection for a spawner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlacementConfig {
    /// Every entity at one fixed transform.
    Anchor(Transform),
    /// Uniform random placement within an axis-aligned box.
    Scatter {
        /// Minimum corner.
        min: [f32; 3],
        /// Maximum corner.
        max: [f32; 3],
        /// RNG seed, for reproducible placement.
        seed: u64,
    },
}

/// One spawner's settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnerConfig {
    /// Category of the built entities.
    pub kind: MetaKind,
    /// Seconds between builds; `0` builds every tick, negative disables.
    pub interval_seconds: f32,
    /// Placement strategy.
    pub placement: PlacementConfig,
    /// Lifespan attached to built entities, if any.
    pub lifespan: Option<LifespanConfig>,
}

/// Configuration for a [`Frame`](crate::Frame).
#[derive(Clone, Debug)]
pub struct FrameConfig {
    /// Entity store sizing.
    pub store: StoreConfig,
    /// Number of representation pages (2 or 3).
    pub page_count: usize,
    /// Spawners driven by the frame loop.
    pub spawners: Vec<SpawnerConfig>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            page_count: crate::rep::RepPages::DEFAULT_PAGE_COUNT,
            spawners: Vec::new(),
        }
    }
}

impl FrameConfig {
    /// Check the configuration against the frame loop's requirements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=3).contains(&self.page_count) {
            return Err(ConfigError::InvalidPageCount {
                got: self.page_count,
            });
        }
        if self.store.capacity == 0 || self.store.chunk_size == 0 {
            return Err(ConfigError::InvalidStoreSize);
        }
        for (index, spawner) in self.spawners.iter().enumerate() {
            if let Some(lifespan) = &spawner.lifespan {
                if lifespan.max_age.is_nan() || lifespan.max_age < 0.0 {
                    return Err(ConfigError::InvalidLifespanBound {
                        spawner: index,
                        max_age: lifespan.max_age,
                    });
                }
            }
        }
        Ok(())
    }
}
