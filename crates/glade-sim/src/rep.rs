//! Representation snapshot pipeline.
//!
//! Once per frame, after every mutating system, the extractor copies a
//! minimal visualization record per represented entity into a "write"
//! page, then rotates a page ring so that a consumer thread (a renderer,
//! typically) can read the freshly committed page on its own schedule.
//!
//! The rotation is the sole producer/consumer synchronization point: a
//! reader-writer lock guards the `(current page, serial)` pair, readers
//! pin it while they look at the current page, and the producer never
//! writes into whichever page is marked current, so a consumer always
//! sees fully committed data.

use std::sync::{Mutex, RwLock};

use crossbeam_channel::unbounded;
use log::debug;

use glade_core::{Entity, MetaKind, PageSerial};
use glade_store::{ChunkFilter, EntityStore};

/// Log target for the representation pipeline.
const LOG_REP: &str = "glade::rep";

/// Alpha age reported for entities without a lifespan fragment.
pub const NO_LIFESPAN_AGE: f32 = -1.0;

/// Ephemeral per-frame visualization record.
///
/// Exists only within one page's lifetime; nothing in it outlives the
/// next commit of the same page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepRecord {
    /// The represented entity.
    pub entity: Entity,
    /// Its category.
    pub kind: MetaKind,
    /// World-space location at extraction time.
    pub location: [f32; 3],
    /// Normalized age in `[0, 1]`, or [`NO_LIFESPAN_AGE`] when the
    /// entity has no lifespan fragment.
    pub alpha_age: f32,
}

/// Which page is readable, and the publish generation.
struct PublishState {
    current: usize,
    serial: PageSerial,
}

/// Producer-side bookkeeping. Single producer by contract; the mutex
/// makes the type `Sync` and is uncontended in correct use.
struct ProducerCursor {
    write_page: usize,
    preparing: bool,
}

/// Rotating ring of representation pages.
///
/// One page is "current" (safe for concurrent reads) and one is the
/// producer's write target; roles change only in
/// [`commit`](RepPages::commit), under the state write lock. With the
/// minimum of two pages the write target is never the current page,
/// because the cursor advances past the just-published page before the
/// next [`prepare`](RepPages::prepare).
///
/// # Single producer
///
/// `prepare`/`append`/`commit` must be driven by one thread at a time
/// per frame. This is a documented precondition, enforced only by debug
/// assertions, matching the single-writer discipline of the frame loop.
pub struct RepPages {
    pages: Vec<RwLock<Vec<RepRecord>>>,
    state: RwLock<PublishState>,
    cursor: Mutex<ProducerCursor>,
}

impl RepPages {
    /// Default number of pages in the ring.
    pub const DEFAULT_PAGE_COUNT: usize = 3;

    /// Create a ring of `page_count` empty pages.
    ///
    /// # Panics
    ///
    /// Panics if `page_count < 2`; the rotation invariant needs one
    /// readable page distinct from the write target.
    pub fn new(page_count: usize) -> Self {
        assert!(
            page_count >= 2,
            "RepPages needs at least 2 pages, got {page_count}"
        );
        let pages = (0..page_count).map(|_| RwLock::new(Vec::new())).collect();
        Self {
            pages,
            state: RwLock::new(PublishState {
                current: 0,
                serial: PageSerial(0),
            }),
            cursor: Mutex::new(ProducerCursor {
                write_page: 1,
                preparing: false,
            }),
        }
    }

    /// Number of pages in the ring.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Generation of the most recently committed page.
    pub fn serial(&self) -> PageSerial {
        self.state.read().unwrap().serial
    }

    /// Clear and reserve the write page for `expected` records.
    pub fn prepare(&self, expected: usize) {
        let mut cursor = self.cursor.lock().unwrap();
        debug_assert!(!cursor.preparing, "prepare() called twice without commit()");
        cursor.preparing = true;

        let mut page = self.pages[cursor.write_page].write().unwrap();
        page.clear();
        page.reserve(expected);
    }

    /// Append one extracted batch to the write page.
    ///
    /// Called by the coordinating thread while draining chunk results;
    /// the page lock is uncontended because consumers only ever read
    /// the current page.
    pub fn append(&self, records: &[RepRecord]) {
        let cursor = self.cursor.lock().unwrap();
        debug_assert!(cursor.preparing, "append() outside prepare()/commit()");
        let mut page = self.pages[cursor.write_page].write().unwrap();
        page.extend_from_slice(records);
    }

    /// Publish the write page.
    ///
    /// Under the state write lock the write page becomes current and the
    /// serial advances; the producer cursor then moves to the next page
    /// in the ring. Returns the new serial.
    pub fn commit(&self) -> PageSerial {
        let mut cursor = self.cursor.lock().unwrap();
        debug_assert!(cursor.preparing, "commit() without prepare()");
        cursor.preparing = false;

        let serial = {
            let mut state = self.state.write().unwrap();
            state.current = cursor.write_page;
            state.serial = PageSerial(state.serial.0 + 1);
            state.serial
        };

        cursor.write_page = (cursor.write_page + 1) % self.pages.len();
        serial
    }

    /// Read the current page.
    ///
    /// The state read lock is held for the closure's duration, pinning
    /// the current page: a commit waits for in-flight reads before the
    /// roles rotate, which keeps the ring from recycling a page out from
    /// under a reader. Extraction itself is unaffected; `prepare` and
    /// `append` touch only non-current pages and never the state lock.
    pub fn read<R>(&self, f: impl FnOnce(PageSerial, &[RepRecord]) -> R) -> R {
        let state = self.state.read().unwrap();
        let page = self.pages[state.current].read().unwrap();
        f(state.serial, &page)
    }

    /// Copy the current page out, with its serial.
    pub fn snapshot(&self) -> (PageSerial, Vec<RepRecord>) {
        self.read(|serial, records| (serial, records.to_vec()))
    }
}

impl Default for RepPages {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_COUNT)
    }
}

/// Per-frame parallel extraction into a [`RepPages`] ring.
pub struct RepExtractor;

impl RepExtractor {
    /// Extract every represented entity and publish one page.
    ///
    /// Runs after all mutating systems for the frame: prepares the write
    /// page, walks matching entities in parallel chunks (each chunk
    /// builds a local record list and sends it through a thread-safe
    /// queue), drains the queue on the calling thread, and commits.
    /// Returns the number of records published.
    pub fn run(store: &EntityStore, pages: &RepPages) -> usize {
        let expected = store.count_matching(ChunkFilter::represented());
        pages.prepare(expected);

        let (tx, rx) = unbounded::<Vec<RepRecord>>();
        store.par_for_each_chunk(ChunkFilter::represented(), |chunk| {
            let mut local = Vec::with_capacity(chunk.len());
            for record in chunk.iter() {
                let alpha_age = record
                    .lifespan
                    .map_or(NO_LIFESPAN_AGE, |lifespan| lifespan.alpha_age());
                local.push(RepRecord {
                    entity: record.entity,
                    kind: record.meta.kind,
                    location: record.transform.location,
                    alpha_age,
                });
            }
            if !local.is_empty() {
                // Unbounded channel; send fails only if the receiver is
                // gone, which cannot happen while run() is on the stack.
                let _ = tx.send(local);
            }
        });
        drop(tx);

        let mut total = 0;
        while let Ok(batch) = rx.try_recv() {
            total += batch.len();
            pages.append(&batch);
        }
        let serial = pages.commit();

        debug!(target: LOG_REP, "published page serial {serial} with {total} records");
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_core::{Lifespan, MetaKind, Transform};
    use glade_store::{EntityBuilder, StoreConfig};

    fn store_with(n: usize, f: impl Fn(usize) -> EntityBuilder) -> EntityStore {
        let mut store = EntityStore::new(StoreConfig {
            capacity: 1024,
            chunk_size: 8,
        });
        for i in 0..n {
            store.spawn(f(i)).unwrap();
        }
        store
    }

    #[test]
    #[should_panic(expected = "at least 2 pages")]
    fn single_page_ring_is_rejected() {
        let _ = RepPages::new(1);
    }

    #[test]
    fn commit_rotates_and_bumps_serial() {
        let pages = RepPages::new(3);
        assert_eq!(pages.serial(), PageSerial(0));

        pages.prepare(0);
        let s1 = pages.commit();
        assert_eq!(s1, PageSerial(1));

        pages.prepare(0);
        assert_eq!(pages.commit(), PageSerial(2));
        assert_eq!(pages.serial(), PageSerial(2));
    }

    #[test]
    fn reader_sees_committed_page_only() {
        let pages = RepPages::new(2);
        let record = RepRecord {
            entity: Entity::from_raw(1, 1),
            kind: MetaKind::Rock,
            location: [1.0, 2.0, 3.0],
            alpha_age: 0.5,
        };

        pages.prepare(1);
        pages.append(&[record]);
        // Not yet committed: reader still sees the empty initial page.
        pages.read(|serial, records| {
            assert_eq!(serial, PageSerial(0));
            assert!(records.is_empty());
        });

        pages.commit();
        pages.read(|serial, records| {
            assert_eq!(serial, PageSerial(1));
            assert_eq!(records, &[record]);
        });
    }

    #[test]
    fn extraction_reports_alpha_age_rules() {
        let mut mortal = Lifespan::mortal(6.0);
        mortal.current_age = 3.0;

        let store = store_with(3, |i| {
            let b = EntityBuilder::new(MetaKind::Tree)
                .transform(Transform::at([i as f32, 0.0, 0.0]))
                .represented();
            match i {
                0 => b.lifespan(mortal),
                1 => b.lifespan(Lifespan::immortal(6.0)),
                _ => b,
            }
        });

        let pages = RepPages::default();
        assert_eq!(RepExtractor::run(&store, &pages), 3);

        let (serial, records) = pages.snapshot();
        assert_eq!(serial, PageSerial(1));
        assert_eq!(records.len(), 3);

        let by_x = |x: f32| {
            records
                .iter()
                .find(|r| r.location[0] == x)
                .copied()
                .unwrap()
        };
        assert_eq!(by_x(0.0).alpha_age, 0.5);
        assert_eq!(by_x(1.0).alpha_age, 1.0);
        assert_eq!(by_x(2.0).alpha_age, NO_LIFESPAN_AGE);
    }

    #[test]
    fn unrepresented_entities_are_skipped() {
        let store = store_with(4, |i| {
            let b = EntityBuilder::new(MetaKind::Rock);
            if i % 2 == 0 {
                b.represented()
            } else {
                b
            }
        });
        let pages = RepPages::default();
        assert_eq!(RepExtractor::run(&store, &pages), 2);
    }

    #[test]
    fn concurrent_consumer_observes_only_full_generations() {
        use std::sync::Arc;
        use std::thread;

        // Producer publishes pages whose records all carry the same
        // marker value equal to the page's serial; a torn page would show
        // mixed markers or a record count mismatching the serial's size.
        let pages = Arc::new(RepPages::new(2));
        let frames = 200;

        let producer = {
            let pages = Arc::clone(&pages);
            thread::spawn(move || {
                for frame in 1..=frames {
                    let size = (frame % 17) + 1;
                    pages.prepare(size as usize);
                    let records: Vec<RepRecord> = (0..size)
                        .map(|_| RepRecord {
                            entity: Entity::from_raw(1, 1),
                            kind: MetaKind::Wisp,
                            location: [frame as f32, 0.0, 0.0],
                            alpha_age: 0.0,
                        })
                        .collect();
                    pages.append(&records);
                    pages.commit();
                }
            })
        };

        let consumer = {
            let pages = Arc::clone(&pages);
            thread::spawn(move || {
                let mut last_serial = PageSerial(0);
                while last_serial.0 < frames {
                    pages.read(|serial, records| {
                        assert!(serial >= last_serial, "serial went backwards");
                        last_serial = serial;
                        if serial.0 == 0 {
                            assert!(records.is_empty());
                            return;
                        }
                        let expected = (serial.0 % 17) + 1;
                        assert_eq!(records.len() as u64, expected, "torn page");
                        for record in records {
                            assert_eq!(record.location[0], serial.0 as f32);
                        }
                    });
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();
    }
}
