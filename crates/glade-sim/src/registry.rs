//! Concurrent entity registry.
//!
//! [`EntityRegistry`] maintains a map from live entity handles to their
//! category metadata, fed by the store's create/destroy observers. The
//! observers may fire on any worker thread during parallel entity
//! processing; notifications arriving off the designated consumer thread
//! are queued and drained once per frame, destroys before creates, on
//! that thread.
//!
//! # Locking
//!
//! The entity map is guarded by a reader-writer lock scoped strictly to
//! each mutation or snapshot copy. Each subscriber list has its own
//! mutex plus a broadcast-in-progress flag; the flag (not the mutex)
//! rejects subscribe/unsubscribe re-entering from inside that event's
//! own broadcast.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use std::thread::{self, ThreadId};

use crossbeam_channel::{unbounded, Receiver, Sender};
use indexmap::IndexMap;
use log::{trace, warn};

use glade_core::{Entity, MetaData, MetaKind, RegistryError, SubscriberId};
use glade_store::EntityEvent;

/// Log target for registry events.
const LOG_REGISTRY: &str = "glade::registry";

/// Subscriber callback, invoked with each create or destroy batch.
pub type SubscriberFn = Box<dyn Fn(&[EntityEvent]) + Send + Sync>;

/// One event's subscriber list with its broadcast guard.
///
/// `broadcasting` lives outside the mutex so that a subscriber mutating
/// the list from inside its own broadcast is rejected with an error
/// instead of deadlocking on the entries lock.
struct SubscriberSet {
    broadcasting: AtomicBool,
    entries: Mutex<Vec<(SubscriberId, SubscriberFn)>>,
}

impl SubscriberSet {
    fn new() -> Self {
        Self {
            broadcasting: AtomicBool::new(false),
            entries: Mutex::new(Vec::new()),
        }
    }

    fn subscribe(&self, callback: SubscriberFn) -> Result<SubscriberId, RegistryError> {
        if self.broadcasting.load(Ordering::Acquire) {
            debug_assert!(false, "subscriber list modified during its own broadcast");
            return Err(RegistryError::BroadcastInProgress);
        }
        let id = SubscriberId::next();
        self.entries.lock().unwrap().push((id, callback));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriberId) -> Result<bool, RegistryError> {
        if self.broadcasting.load(Ordering::Acquire) {
            debug_assert!(false, "subscriber list modified during its own broadcast");
            return Err(RegistryError::BroadcastInProgress);
        }
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(sid, _)| *sid != id);
        Ok(entries.len() != before)
    }

    fn broadcast(&self, events: &[EntityEvent]) {
        self.broadcasting.store(true, Ordering::Release);
        {
            let entries = self.entries.lock().unwrap();
            for (_, callback) in entries.iter() {
                callback(events);
            }
        }
        self.broadcasting.store(false, Ordering::Release);
    }
}

/// Thread-safe registry of live entities indexed by category.
///
/// Construct it on the thread that will own per-frame processing; that
/// thread becomes the consumer thread. Notifications arriving there are
/// applied synchronously, anything else is queued until
/// [`drain`](EntityRegistry::drain).
pub struct EntityRegistry {
    consumer: ThreadId,
    map: RwLock<IndexMap<Entity, MetaData>>,
    create_tx: Sender<Vec<EntityEvent>>,
    create_rx: Receiver<Vec<EntityEvent>>,
    destroy_tx: Sender<Vec<EntityEvent>>,
    destroy_rx: Receiver<Vec<EntityEvent>>,
    created_subs: SubscriberSet,
    destroyed_subs: SubscriberSet,
}

impl EntityRegistry {
    /// Create a registry owned by the calling thread.
    pub fn new() -> Self {
        let (create_tx, create_rx) = unbounded();
        let (destroy_tx, destroy_rx) = unbounded();
        Self {
            consumer: thread::current().id(),
            map: RwLock::new(IndexMap::new()),
            create_tx,
            create_rx,
            destroy_tx,
            destroy_rx,
            created_subs: SubscriberSet::new(),
            destroyed_subs: SubscriberSet::new(),
        }
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.map.read().unwrap().len()
    }

    /// Whether no entities are registered.
    pub fn is_empty(&self) -> bool {
        self.map.read().unwrap().is_empty()
    }

    /// Metadata of a registered entity, if present.
    pub fn get(&self, entity: Entity) -> Option<MetaData> {
        self.map.read().unwrap().get(&entity).copied()
    }

    /// Snapshot of all registered entities of the given kind.
    ///
    /// Returns a copied list, never a live reference, so callers hold no
    /// lock while consuming it. An invalid kind yields an empty list.
    pub fn query_by_kind(&self, kind: MetaKind) -> Vec<Entity> {
        let map = self.map.read().unwrap();
        map.iter()
            .filter(|(_, meta)| meta.kind == kind)
            .map(|(entity, _)| *entity)
            .collect()
    }

    /// Observer entry point for created entities; callable from any thread.
    ///
    /// On the consumer thread the batch is applied immediately; elsewhere
    /// it is queued for the next [`drain`](Self::drain).
    pub fn notify_created(&self, events: &[EntityEvent]) {
        if thread::current().id() == self.consumer {
            self.apply_created(events);
            return;
        }
        let _ = self.create_tx.send(events.to_vec());
    }

    /// Observer entry point for destroyed entities; callable from any thread.
    pub fn notify_destroyed(&self, events: &[EntityEvent]) {
        if thread::current().id() == self.consumer {
            self.apply_destroyed(events);
            return;
        }
        let _ = self.destroy_tx.send(events.to_vec());
    }

    /// Drain queued notification batches on the consumer thread.
    ///
    /// Destroy batches are applied before create batches: when the host
    /// reuses a handle within one frame, the stale removal must not
    /// clobber the fresh entry.
    pub fn drain(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.consumer,
            "registry drain must run on the consumer thread"
        );

        while let Ok(events) = self.destroy_rx.try_recv() {
            self.apply_destroyed(&events);
        }
        while let Ok(events) = self.create_rx.try_recv() {
            self.apply_created(&events);
        }
    }

    /// Subscribe to create broadcasts. The returned token unsubscribes.
    pub fn subscribe_created(
        &self,
        callback: SubscriberFn,
    ) -> Result<SubscriberId, RegistryError> {
        self.created_subs.subscribe(callback)
    }

    /// Remove a create subscription. `Ok(false)` if the token is unknown.
    pub fn unsubscribe_created(&self, id: SubscriberId) -> Result<bool, RegistryError> {
        self.created_subs.unsubscribe(id)
    }

    /// Subscribe to destroy broadcasts.
    pub fn subscribe_destroyed(
        &self,
        callback: SubscriberFn,
    ) -> Result<SubscriberId, RegistryError> {
        self.destroyed_subs.subscribe(callback)
    }

    /// Remove a destroy subscription. `Ok(false)` if the token is unknown.
    pub fn unsubscribe_destroyed(&self, id: SubscriberId) -> Result<bool, RegistryError> {
        self.destroyed_subs.unsubscribe(id)
    }

    fn apply_created(&self, events: &[EntityEvent]) {
        {
            let mut map = self.map.write().unwrap();
            for event in events {
                debug_assert!(event.entity.is_set(), "created entity handle must be set");
                if !event.meta.is_valid() {
                    warn!(
                        target: LOG_REGISTRY,
                        "entity {} registered with invalid metadata ({})",
                        event.entity, event.meta
                    );
                }
                map.insert(event.entity, event.meta);
                trace!(target: LOG_REGISTRY, "added {} ({})", event.entity, event.meta);
            }
        }
        self.created_subs.broadcast(events);
    }

    fn apply_destroyed(&self, events: &[EntityEvent]) {
        {
            let mut map = self.map.write().unwrap();
            for event in events {
                let removed = map.swap_remove(&event.entity).is_some();
                if removed {
                    trace!(target: LOG_REGISTRY, "removed {} ({})", event.entity, event.meta);
                } else {
                    // Expected when a destroy raced a never-registered
                    // entity; a no-op, not an error.
                    trace!(target: LOG_REGISTRY, "destroy for unknown {}", event.entity);
                }
            }
        }
        self.destroyed_subs.broadcast(events);
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_core::MetaKind;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn event(index: u32, serial: u32, kind: MetaKind) -> EntityEvent {
        EntityEvent::new(Entity::from_raw(index, serial), MetaData::new(kind))
    }

    #[test]
    fn create_then_query_then_destroy() {
        let registry = EntityRegistry::new();
        let e = event(1, 1, MetaKind::Tree);
        registry.notify_created(&[e]);

        assert_eq!(registry.query_by_kind(MetaKind::Tree), vec![e.entity]);
        assert!(registry.query_by_kind(MetaKind::Rock).is_empty());
        assert_eq!(registry.get(e.entity), Some(e.meta));

        registry.notify_destroyed(&[e]);
        assert!(registry.query_by_kind(MetaKind::Tree).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn destroy_unknown_is_noop() {
        let registry = EntityRegistry::new();
        registry.notify_destroyed(&[event(9, 4, MetaKind::Wisp)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn invalid_kind_query_is_empty() {
        let registry = EntityRegistry::new();
        registry.notify_created(&[event(1, 1, MetaKind::Tree)]);
        assert!(registry.query_by_kind(MetaKind::None).is_empty());
        assert!(registry.query_by_kind(MetaKind::MAX).is_empty());
    }

    #[test]
    fn off_thread_batches_wait_for_drain() {
        let registry = Arc::new(EntityRegistry::new());

        let r = Arc::clone(&registry);
        thread::spawn(move || {
            r.notify_created(&[event(1, 1, MetaKind::Wisp)]);
        })
        .join()
        .unwrap();

        // Queued, not yet applied.
        assert!(registry.is_empty());
        registry.drain();
        assert_eq!(registry.query_by_kind(MetaKind::Wisp).len(), 1);
    }

    #[test]
    fn drain_applies_destroys_before_creates() {
        // Simulate host handle reuse: the destroy of the old incarnation
        // and the create of the new one arrive in the same frame. The
        // final state must reflect "created".
        let registry = Arc::new(EntityRegistry::new());
        let reused = Entity::from_raw(5, 2);

        let r = Arc::clone(&registry);
        thread::spawn(move || {
            // Create arrives first in queue order; drain must still
            // apply the destroy batch before it.
            r.notify_created(&[EntityEvent::new(reused, MetaData::new(MetaKind::Tree))]);
            r.notify_destroyed(&[EntityEvent::new(reused, MetaData::new(MetaKind::Rock))]);
        })
        .join()
        .unwrap();

        registry.drain();
        assert_eq!(registry.get(reused), Some(MetaData::new(MetaKind::Tree)));
    }

    #[test]
    fn subscribers_receive_batches() {
        let registry = EntityRegistry::new();
        let created = Arc::new(AtomicUsize::new(0));
        let destroyed = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&created);
        registry
            .subscribe_created(Box::new(move |events| {
                c.fetch_add(events.len(), Ordering::Relaxed);
            }))
            .unwrap();
        let d = Arc::clone(&destroyed);
        let token = registry
            .subscribe_destroyed(Box::new(move |events| {
                d.fetch_add(events.len(), Ordering::Relaxed);
            }))
            .unwrap();

        let batch = [event(1, 1, MetaKind::Rock), event(2, 1, MetaKind::Rock)];
        registry.notify_created(&batch);
        registry.notify_destroyed(&batch[..1]);
        assert_eq!(created.load(Ordering::Relaxed), 2);
        assert_eq!(destroyed.load(Ordering::Relaxed), 1);

        assert_eq!(registry.unsubscribe_destroyed(token), Ok(true));
        assert_eq!(registry.unsubscribe_destroyed(token), Ok(false));
        registry.notify_destroyed(&batch[1..]);
        assert_eq!(destroyed.load(Ordering::Relaxed), 1);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "broadcast"))]
    fn subscribe_during_broadcast_is_rejected() {
        let registry = Arc::new(EntityRegistry::new());

        let r = Arc::clone(&registry);
        registry
            .subscribe_created(Box::new(move |_| {
                // Re-entrant modification of the list being broadcast.
                let result = r.subscribe_created(Box::new(|_| {}));
                assert_eq!(result, Err(RegistryError::BroadcastInProgress));
            }))
            .unwrap();

        registry.notify_created(&[event(1, 1, MetaKind::Tree)]);
    }

    #[test]
    fn unsubscribe_during_other_event_broadcast_is_allowed() {
        // The guard is per event kind: touching the destroy list from a
        // create broadcast is fine.
        let registry = Arc::new(EntityRegistry::new());
        let token = registry.subscribe_destroyed(Box::new(|_| {})).unwrap();

        let r = Arc::clone(&registry);
        registry
            .subscribe_created(Box::new(move |_| {
                assert_eq!(r.unsubscribe_destroyed(token), Ok(true));
            }))
            .unwrap();

        registry.notify_created(&[event(1, 1, MetaKind::Tree)]);
    }
}
