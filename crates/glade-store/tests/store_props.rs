//! Property tests for store slot/handle invariants.

use glade_core::MetaKind;
use glade_store::{EntityBuilder, EntityStore, StoreConfig};
use proptest::prelude::*;

/// One step of a random lifecycle workload.
#[derive(Clone, Copy, Debug)]
enum Op {
    Spawn,
    /// Destroy the nth live entity (modulo the live count).
    Destroy(usize),
    Apply,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Spawn),
        2 => (0usize..64).prop_map(Op::Destroy),
        1 => Just(Op::Apply),
    ]
}

proptest! {
    /// Whatever the spawn/destroy interleaving, the store's live set and
    /// handle liveness stay consistent: every handle ever returned is
    /// either live (and contained) or dead (and rejected), and `len`
    /// always equals the number of live handles.
    #[test]
    fn handles_and_len_stay_consistent(ops in proptest::collection::vec(op_strategy(), 1..200)) {
        let mut store = EntityStore::new(StoreConfig {
            capacity: 128,
            chunk_size: 8,
        });
        let mut live: Vec<_> = Vec::new();
        let mut dead: Vec<_> = Vec::new();
        let mut requested: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                Op::Spawn => {
                    if let Ok(e) = store.spawn(EntityBuilder::new(MetaKind::Rock)) {
                        live.push(e);
                    }
                }
                Op::Destroy(n) => {
                    if !live.is_empty() {
                        let i = n % live.len();
                        store.request_destroy(&[live[i]]);
                        if !requested.contains(&i) {
                            requested.push(i);
                        }
                    }
                }
                Op::Apply => {
                    let destroyed = store.apply_destroys();
                    prop_assert_eq!(destroyed, requested.len());
                    requested.sort_unstable_by(|a, b| b.cmp(a));
                    for i in requested.drain(..) {
                        dead.push(live.swap_remove(i));
                    }
                }
            }

            prop_assert_eq!(store.len(), live.len());
            for &e in &live {
                prop_assert!(store.contains(e));
            }
            for &e in &dead {
                prop_assert!(!store.contains(e));
            }
        }
    }
}
