//! Per-frame aging and expiry enforcement.
//!
//! [`LifespanEnforcer`] walks every entity with a lifespan fragment in
//! parallel chunks, ages it by the frame delta, and collects expired
//! non-immortal entities into chunk-local lists. The lists are merged on
//! the coordinating thread and submitted as one deferred-destroy batch;
//! destruction never happens inside the iteration pass.

use crossbeam_channel::unbounded;
use log::debug;
use smallvec::SmallVec;

use glade_core::Entity;
use glade_store::{ChunkFilter, EntityStore};

/// Log target for lifespan enforcement.
const LOG_LIFESPAN: &str = "glade::lifespan";

/// Chunk-local expiry list; sized so typical chunks never heap-allocate.
type ExpiredList = SmallVec<[Entity; 16]>;

/// The aging/expiry system.
pub struct LifespanEnforcer;

impl LifespanEnforcer {
    /// Age every lifespan-carrying entity by `dt` and submit expired
    /// entities for deferred destruction.
    ///
    /// Returns the number of entities submitted this frame. An entity
    /// already pending destruction is filtered by the store, so crossing
    /// the threshold again before the batch applies cannot double-submit.
    pub fn run(store: &mut EntityStore, dt: f32) -> usize {
        let (tx, rx) = unbounded::<ExpiredList>();

        store.par_for_each_chunk_mut(ChunkFilter::with_lifespan(), |mut chunk| {
            let mut expired = ExpiredList::new();
            for record in chunk.iter_mut() {
                if let Some(lifespan) = record.lifespan {
                    lifespan.current_age += dt;
                    if lifespan.is_expired() {
                        expired.push(record.entity);
                    }
                }
            }
            if !expired.is_empty() {
                let _ = tx.send(expired);
            }
        });
        drop(tx);

        let mut batch: Vec<Entity> = Vec::new();
        while let Ok(expired) = rx.try_recv() {
            batch.extend_from_slice(&expired);
        }

        if batch.is_empty() {
            return 0;
        }
        let count = batch.len();
        store.request_destroy(&batch);
        debug!(target: LOG_LIFESPAN, "submitted {count} expired entities for destruction");
        count
    }
}
