//! The entity store: generational slots, dense records, deferred
//! destruction, and parallel chunk iteration.

use log::trace;
use rayon::prelude::*;

use glade_core::{BuildError, Entity, Lifespan, MetaData, Transform};

use crate::builder::EntityBuilder;
use crate::chunk::{ChunkFilter, ChunkView, ChunkViewMut};
use crate::event::EntityEvent;

/// Log target for store internals.
const LOG_STORE: &str = "glade::store";

/// Observer callback invoked with batches of create or destroy events.
///
/// Callbacks must be `Send + Sync`: callers that forward events during
/// a parallel phase may invoke them from worker threads.
pub type ObserverFn = Box<dyn Fn(&[EntityEvent]) + Send + Sync>;

/// Sizing for an [`EntityStore`].
#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    /// Maximum number of live entities.
    pub capacity: usize,
    /// Number of records per parallel chunk.
    pub chunk_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: 65_536,
            chunk_size: 128,
        }
    }
}

/// Dense per-entity storage record.
///
/// Fragments live inline: metadata is two bytes of copy data (the host
/// engine's shared-fragment indirection buys nothing here), and the
/// optional lifespan keeps chunk iteration branch-cheap.
pub(crate) struct EntityRecord {
    pub(crate) entity: Entity,
    pub(crate) meta: MetaData,
    pub(crate) transform: Transform,
    pub(crate) lifespan: Option<Lifespan>,
    pub(crate) tracked: bool,
    pub(crate) represented: bool,
}

/// One generational slot. `serial` advances when the slot is freed, so
/// stale handles to a reused slot fail the liveness check.
struct Slot {
    serial: u32,
    /// Dense index of the record while live.
    dense: u32,
    live: bool,
    /// Destruction requested this frame, not yet applied.
    pending_destroy: bool,
}

/// Entity storage with deferred structural mutation.
///
/// Creation happens immediately on [`spawn`](EntityStore::spawn) (firing
/// the created-observer for tracked entities). Destruction is two-phase:
/// [`request_destroy`](EntityStore::request_destroy) only records the
/// request, and [`apply_destroys`](EntityStore::apply_destroys) performs
/// the removal in a pass of its own, outside any iteration. A handle
/// already pending destruction is filtered on re-submission, so an
/// entity can never enter one frame's batch twice.
pub struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    records: Vec<EntityRecord>,
    pending_destroy: Vec<Entity>,
    config: StoreConfig,
    on_created: Option<ObserverFn>,
    on_destroyed: Option<ObserverFn>,
}

impl EntityStore {
    /// Create an empty store.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` or `capacity` is zero.
    pub fn new(config: StoreConfig) -> Self {
        assert!(config.chunk_size > 0, "chunk_size must be at least 1");
        assert!(config.capacity > 0, "capacity must be at least 1");
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            records: Vec::new(),
            pending_destroy: Vec::new(),
            config,
            on_created: None,
            on_destroyed: None,
        }
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no live entities.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `entity` refers to a live entity in this store.
    ///
    /// Unset and stale handles answer `false`; neither is an error.
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    /// Register the observer for created tracked entities.
    ///
    /// One observer slot; the registry fans batches out to its own
    /// subscribers. Replaces any previous observer.
    pub fn on_created(&mut self, observer: ObserverFn) {
        self.on_created = Some(observer);
    }

    /// Register the observer for destroyed tracked entities.
    pub fn on_destroyed(&mut self, observer: ObserverFn) {
        self.on_destroyed = Some(observer);
    }

    /// Create an entity from a builder.
    ///
    /// Returns the new handle, or [`BuildError::StoreFull`] when the
    /// store is at capacity. Fires the created-observer with a single
    /// event if the entity is tracked.
    pub fn spawn(&mut self, builder: EntityBuilder) -> Result<Entity, BuildError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if self.slots.len() >= self.config.capacity {
                    return Err(BuildError::StoreFull);
                }
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    serial: 1,
                    dense: 0,
                    live: false,
                    pending_destroy: false,
                });
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        let entity = Entity::from_raw(index, slot.serial);
        slot.dense = self.records.len() as u32;
        slot.live = true;
        slot.pending_destroy = false;

        self.records.push(EntityRecord {
            entity,
            meta: builder.meta,
            transform: builder.transform,
            lifespan: builder.lifespan,
            tracked: builder.tracked,
            represented: builder.represented,
        });

        trace!(target: LOG_STORE, "spawned {entity} ({})", builder.meta);

        if builder.tracked {
            if let Some(observer) = &self.on_created {
                let events = [EntityEvent::new(entity, builder.meta)];
                observer(&events);
            }
        }

        Ok(entity)
    }

    /// Request deferred destruction of a batch of entities.
    ///
    /// Unset handles, stale handles, and handles already pending
    /// destruction are silently skipped; no structural mutation happens
    /// here. The batch is applied by [`apply_destroys`](Self::apply_destroys).
    pub fn request_destroy(&mut self, entities: &[Entity]) {
        for &entity in entities {
            let Some(index) = self.slot_of(entity) else {
                continue;
            };
            let slot = &mut self.slots[index as usize];
            if slot.pending_destroy {
                continue;
            }
            slot.pending_destroy = true;
            self.pending_destroy.push(entity);
        }
    }

    /// Apply all pending destruction requests.
    ///
    /// Removes records, frees slots (advancing their serials), and fires
    /// the destroyed-observer once with the batch of tracked entities.
    /// Returns the number of entities destroyed.
    pub fn apply_destroys(&mut self) -> usize {
        if self.pending_destroy.is_empty() {
            return 0;
        }

        let batch = std::mem::take(&mut self.pending_destroy);
        let mut events = Vec::new();

        for entity in &batch {
            let index = entity.index() as usize;
            // Pending entries were live when submitted and cannot have
            // been freed since; destruction only happens here.
            let dense = self.slots[index].dense as usize;
            let meta = self.records[dense].meta;
            let tracked = self.records[dense].tracked;

            self.records.swap_remove(dense);
            if dense < self.records.len() {
                let moved = self.records[dense].entity;
                self.slots[moved.index() as usize].dense = dense as u32;
            }

            let slot = &mut self.slots[index];
            slot.live = false;
            slot.pending_destroy = false;
            slot.serial = if slot.serial == u32::MAX {
                1
            } else {
                slot.serial + 1
            };
            self.free.push(entity.index());

            if tracked {
                events.push(EntityEvent::new(*entity, meta));
            }
        }

        trace!(target: LOG_STORE, "destroyed {} entities", batch.len());

        if !events.is_empty() {
            if let Some(observer) = &self.on_destroyed {
                observer(&events);
            }
        }

        batch.len()
    }

    /// Number of live entities matching `filter`.
    pub fn count_matching(&self, filter: ChunkFilter) -> usize {
        self.records.iter().filter(|r| filter.matches(r)).count()
    }

    /// Iterate matching entities in chunks on the calling thread.
    pub fn for_each_chunk<F>(&self, filter: ChunkFilter, mut f: F)
    where
        F: FnMut(ChunkView<'_>),
    {
        for chunk in self.records.chunks(self.config.chunk_size) {
            f(ChunkView::new(chunk, filter));
        }
    }

    /// Iterate matching entities in disjoint chunks across the rayon pool.
    ///
    /// `f` runs once per chunk, possibly concurrently; chunks never
    /// overlap and no shared mutable state is reachable through a view.
    pub fn par_for_each_chunk<F>(&self, filter: ChunkFilter, f: F)
    where
        F: Fn(ChunkView<'_>) + Send + Sync,
    {
        self.records
            .par_chunks(self.config.chunk_size)
            .for_each(|chunk| f(ChunkView::new(chunk, filter)));
    }

    /// Parallel chunk iteration with writable lifespan fragments.
    pub fn par_for_each_chunk_mut<F>(&mut self, filter: ChunkFilter, f: F)
    where
        F: Fn(ChunkViewMut<'_>) + Send + Sync,
    {
        let chunk_size = self.config.chunk_size;
        self.records
            .par_chunks_mut(chunk_size)
            .for_each(|chunk| f(ChunkViewMut::new(chunk, filter)));
    }

    /// Read an entity's metadata, if it is live.
    pub fn meta(&self, entity: Entity) -> Option<MetaData> {
        self.dense_of(entity).map(|i| self.records[i].meta)
    }

    /// Read an entity's transform, if it is live.
    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.dense_of(entity).map(|i| &self.records[i].transform)
    }

    /// Read an entity's lifespan, if it is live and has one.
    pub fn lifespan(&self, entity: Entity) -> Option<&Lifespan> {
        self.dense_of(entity)
            .and_then(|i| self.records[i].lifespan.as_ref())
    }

    /// Slot index of a live entity, or `None` for unset/stale handles.
    fn slot_of(&self, entity: Entity) -> Option<u32> {
        if !entity.is_set() {
            return None;
        }
        let slot = self.slots.get(entity.index() as usize)?;
        (slot.live && slot.serial == entity.serial()).then_some(entity.index())
    }

    fn dense_of(&self, entity: Entity) -> Option<usize> {
        self.slot_of(entity)
            .map(|i| self.slots[i as usize].dense as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_core::MetaKind;

    fn small_store() -> EntityStore {
        EntityStore::new(StoreConfig {
            capacity: 64,
            chunk_size: 4,
        })
    }

    #[test]
    fn spawn_then_contains() {
        let mut store = small_store();
        let e = store.spawn(EntityBuilder::new(MetaKind::Rock)).unwrap();
        assert!(store.contains(e));
        assert_eq!(store.len(), 1);
        assert_eq!(store.meta(e).unwrap().kind, MetaKind::Rock);
    }

    #[test]
    fn destroy_is_deferred() {
        let mut store = small_store();
        let e = store.spawn(EntityBuilder::new(MetaKind::Rock)).unwrap();
        store.request_destroy(&[e]);
        assert!(store.contains(e), "still live until apply");
        assert_eq!(store.apply_destroys(), 1);
        assert!(!store.contains(e));
        assert!(store.is_empty());
    }

    #[test]
    fn double_request_destroys_once() {
        let mut store = small_store();
        let e = store.spawn(EntityBuilder::new(MetaKind::Rock)).unwrap();
        store.request_destroy(&[e]);
        store.request_destroy(&[e, e]);
        assert_eq!(store.apply_destroys(), 1);
    }

    #[test]
    fn stale_handle_is_not_contained() {
        let mut store = small_store();
        let old = store.spawn(EntityBuilder::new(MetaKind::Rock)).unwrap();
        store.request_destroy(&[old]);
        store.apply_destroys();

        let new = store.spawn(EntityBuilder::new(MetaKind::Tree)).unwrap();
        assert_eq!(new.index(), old.index(), "slot should be reused");
        assert_ne!(new.serial(), old.serial());
        assert!(!store.contains(old));
        assert!(store.contains(new));
    }

    #[test]
    fn destroy_unknown_is_noop() {
        let mut store = small_store();
        store.request_destroy(&[Entity::UNSET, Entity::from_raw(3, 9)]);
        assert_eq!(store.apply_destroys(), 0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut store = EntityStore::new(StoreConfig {
            capacity: 2,
            chunk_size: 4,
        });
        store.spawn(EntityBuilder::new(MetaKind::Rock)).unwrap();
        store.spawn(EntityBuilder::new(MetaKind::Rock)).unwrap();
        assert_eq!(
            store.spawn(EntityBuilder::new(MetaKind::Rock)),
            Err(BuildError::StoreFull)
        );
    }

    #[test]
    fn created_observer_fires_for_tracked_only() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut store = small_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        store.on_created(Box::new(move |events| {
            seen2.fetch_add(events.len(), Ordering::Relaxed);
        }));

        store.spawn(EntityBuilder::new(MetaKind::Rock)).unwrap();
        store
            .spawn(EntityBuilder::new(MetaKind::Tree).tracked())
            .unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn destroyed_observer_sees_meta() {
        use std::sync::{Arc, Mutex};

        let mut store = small_store();
        let seen: Arc<Mutex<Vec<EntityEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        store.on_destroyed(Box::new(move |events| {
            seen2.lock().unwrap().extend_from_slice(events);
        }));

        let e = store
            .spawn(EntityBuilder::new(MetaKind::Wisp).tracked())
            .unwrap();
        store.request_destroy(&[e]);
        store.apply_destroys();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity, e);
        assert_eq!(events[0].meta.kind, MetaKind::Wisp);
    }

    #[test]
    fn chunk_filter_selects_lifespans() {
        let mut store = small_store();
        for i in 0..10 {
            let b = EntityBuilder::new(MetaKind::Rock);
            let b = if i % 2 == 0 {
                b.lifespan(Lifespan::mortal(5.0))
            } else {
                b
            };
            store.spawn(b).unwrap();
        }
        assert_eq!(store.count_matching(ChunkFilter::with_lifespan()), 5);

        let mut visited = 0;
        store.for_each_chunk(ChunkFilter::with_lifespan(), |chunk| {
            visited += chunk.iter().count();
        });
        assert_eq!(visited, 5);
    }

    #[test]
    fn parallel_mutation_ages_every_lifespan() {
        let mut store = small_store();
        for _ in 0..33 {
            store
                .spawn(EntityBuilder::new(MetaKind::Tree).lifespan(Lifespan::mortal(10.0)))
                .unwrap();
        }

        store.par_for_each_chunk_mut(ChunkFilter::with_lifespan(), |mut chunk| {
            for record in chunk.iter_mut() {
                if let Some(lifespan) = record.lifespan {
                    lifespan.current_age += 1.0;
                }
            }
        });

        let mut aged = 0;
        store.for_each_chunk(ChunkFilter::with_lifespan(), |chunk| {
            for record in chunk.iter() {
                assert_eq!(record.lifespan.unwrap().current_age, 1.0);
                aged += 1;
            }
        });
        assert_eq!(aged, 33);
    }
}
