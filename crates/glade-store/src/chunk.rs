//! Chunk views over dense entity records.
//!
//! The store partitions its dense record array into fixed-size chunks
//! and hands each chunk to one worker as a [`ChunkView`] (read-only) or
//! [`ChunkViewMut`] (lifespan-mutable). Views apply a [`ChunkFilter`]
//! so workers only see the entities a pass cares about; no shared state
//! is reachable through a view.

use glade_core::{Entity, Lifespan, MetaData, Transform};

use crate::store::EntityRecord;

/// Predicate selecting which records a chunk pass visits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkFilter {
    /// Only visit records carrying a lifespan fragment.
    pub require_lifespan: bool,
    /// Only visit records tagged for representation extraction.
    pub require_represented: bool,
}

impl ChunkFilter {
    /// Match every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match records with a lifespan fragment (the aging pass).
    pub fn with_lifespan() -> Self {
        Self {
            require_lifespan: true,
            require_represented: false,
        }
    }

    /// Match records tagged for representation (the extraction pass).
    pub fn represented() -> Self {
        Self {
            require_lifespan: false,
            require_represented: true,
        }
    }

    pub(crate) fn matches(&self, record: &EntityRecord) -> bool {
        (!self.require_lifespan || record.lifespan.is_some())
            && (!self.require_represented || record.represented)
    }
}

/// Read-only view of one record, yielded by [`ChunkView::iter`].
pub struct RecordRef<'a> {
    /// Handle of the entity.
    pub entity: Entity,
    /// Category metadata.
    pub meta: MetaData,
    /// Placement fragment.
    pub transform: &'a Transform,
    /// Lifespan fragment, if the entity has one.
    pub lifespan: Option<&'a Lifespan>,
}

/// Mutable view of one record, yielded by [`ChunkViewMut::iter_mut`].
///
/// Only the lifespan fragment is writable; metadata is read-only after
/// creation and transforms belong to systems outside this core.
pub struct RecordMut<'a> {
    /// Handle of the entity.
    pub entity: Entity,
    /// Category metadata.
    pub meta: MetaData,
    /// Placement fragment.
    pub transform: &'a Transform,
    /// Writable lifespan fragment, if the entity has one.
    pub lifespan: Option<&'a mut Lifespan>,
}

/// One disjoint read-only partition of the dense record array.
pub struct ChunkView<'a> {
    records: &'a [EntityRecord],
    filter: ChunkFilter,
}

impl<'a> ChunkView<'a> {
    pub(crate) fn new(records: &'a [EntityRecord], filter: ChunkFilter) -> Self {
        Self { records, filter }
    }

    /// Number of records in the chunk before filtering.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the chunk holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate the records matching the pass filter.
    pub fn iter(&self) -> impl Iterator<Item = RecordRef<'a>> + '_ {
        let filter = self.filter;
        self.records
            .iter()
            .filter(move |r| filter.matches(r))
            .map(|r| RecordRef {
                entity: r.entity,
                meta: r.meta,
                transform: &r.transform,
                lifespan: r.lifespan.as_ref(),
            })
    }
}

/// One disjoint lifespan-mutable partition of the dense record array.
pub struct ChunkViewMut<'a> {
    records: &'a mut [EntityRecord],
    filter: ChunkFilter,
}

impl<'a> ChunkViewMut<'a> {
    pub(crate) fn new(records: &'a mut [EntityRecord], filter: ChunkFilter) -> Self {
        Self { records, filter }
    }

    /// Number of records in the chunk before filtering.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the chunk holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate the matching records with writable lifespans.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = RecordMut<'_>> {
        let filter = self.filter;
        self.records
            .iter_mut()
            .filter(move |r| filter.matches(r))
            .map(|r| RecordMut {
                entity: r.entity,
                meta: r.meta,
                transform: &r.transform,
                lifespan: r.lifespan.as_mut(),
            })
    }
}
