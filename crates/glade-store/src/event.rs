//! Create/destroy notification payloads.

use glade_core::{Entity, MetaData};

/// One entity in a create or destroy notification batch.
///
/// Carries a copy of the metadata so that destroy observers can still
/// see the category of an entity whose storage is already gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityEvent {
    /// The entity the event is about.
    pub entity: Entity,
    /// Its category metadata, copied at event time.
    pub meta: MetaData,
}

impl EntityEvent {
    /// Build an event for the given entity and metadata.
    pub fn new(entity: Entity, meta: MetaData) -> Self {
        Self { entity, meta }
    }
}
