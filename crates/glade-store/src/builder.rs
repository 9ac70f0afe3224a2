//! Fluent entity construction.

use glade_core::{Lifespan, MetaData, MetaKind, Transform};

/// Describes one entity to be created by the store.
///
/// Spawners assemble a builder per entity: category metadata, initial
/// placement, optional lifespan, and the marker tags that opt the entity
/// into registry tracking and representation extraction.
///
/// ```
/// use glade_core::{Lifespan, MetaKind, Transform};
/// use glade_store::EntityBuilder;
///
/// let b = EntityBuilder::new(MetaKind::Tree)
///     .transform(Transform::at([10.0, 0.0, 0.0]))
///     .lifespan(Lifespan::mortal(30.0))
///     .tracked()
///     .represented();
/// assert!(b.meta.is_valid());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EntityBuilder {
    /// Category metadata shared by all entities from the same spawner.
    pub meta: MetaData,
    /// Initial placement.
    pub transform: Transform,
    /// Aging state; `None` for entities without a finite life.
    pub lifespan: Option<Lifespan>,
    /// Whether the registry's create/destroy observers see this entity.
    pub tracked: bool,
    /// Whether the representation pipeline extracts this entity.
    pub represented: bool,
}

impl EntityBuilder {
    /// Start a builder for an entity of the given kind.
    pub fn new(kind: MetaKind) -> Self {
        Self {
            meta: MetaData::new(kind),
            transform: Transform::IDENTITY,
            lifespan: None,
            tracked: false,
            represented: false,
        }
    }

    /// Set the initial placement.
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Attach a lifespan fragment.
    pub fn lifespan(mut self, lifespan: Lifespan) -> Self {
        self.lifespan = Some(lifespan);
        self
    }

    /// Opt the entity into registry tracking.
    pub fn tracked(mut self) -> Self {
        self.tracked = true;
        self
    }

    /// Opt the entity into representation extraction.
    pub fn represented(mut self) -> Self {
        self.represented = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_untagged() {
        let b = EntityBuilder::new(MetaKind::Rock);
        assert!(!b.tracked);
        assert!(!b.represented);
        assert!(b.lifespan.is_none());
        assert_eq!(b.transform, Transform::IDENTITY);
    }
}
