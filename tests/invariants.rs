use poolkeeper::{Pool, Policy};
use proptest::prelude::*;

/// Re-derives the universal invariants from an `inspect` snapshot and a
/// pool's public counters, the same checks `Pool`'s internal
/// `debug_check_invariants` performs, but driven from outside the crate
/// through its public API only.
fn assert_universal_invariants(pool: &Pool) {
    let regions = pool.inspect();
    assert!(!regions.is_empty(), "region list must be non-empty");

    let mut prev_allocated: Option<bool> = None;
    let mut covered = 0usize;
    let mut num_allocs = 0usize;
    let mut num_gaps = 0usize;
    let mut alloc_size = 0usize;

    for region in &regions {
        assert!(
            !(prev_allocated == Some(false) && !region.allocated),
            "no two adjacent free regions"
        );
        prev_allocated = Some(region.allocated);

        if region.allocated {
            num_allocs += 1;
            alloc_size += region.size;
        } else {
            num_gaps += 1;
        }
        covered += region.size;
    }

    assert_eq!(covered, pool.total_size(), "regions must cover the pool exactly once");
    assert_eq!(num_allocs, pool.num_allocs());
    assert_eq!(num_gaps, pool.num_gaps());
    assert_eq!(alloc_size, pool.alloc_size());
    assert_eq!(alloc_size + regions.iter().filter(|r| !r.allocated).map(|r| r.size).sum::<usize>(), pool.total_size());
}

#[test]
fn invariants_hold_after_every_call_in_a_scripted_sequence() {
    let mut pool = Pool::open(1000, Policy::BestFit).unwrap();
    assert_universal_invariants(&pool);

    let a = pool.allocate(300).unwrap();
    assert_universal_invariants(&pool);
    let b = pool.allocate(100).unwrap();
    assert_universal_invariants(&pool);
    let c = pool.allocate(300).unwrap();
    assert_universal_invariants(&pool);

    pool.free(a).unwrap();
    assert_universal_invariants(&pool);
    pool.free(c).unwrap();
    assert_universal_invariants(&pool);
    pool.free(b).unwrap();
    assert_universal_invariants(&pool);

    assert!(pool.is_initial_state());
}

fn op_strategy() -> impl Strategy<Value = OpKind> {
    prop_oneof![
        (1usize..=64).prop_map(OpKind::Allocate),
        Just(OpKind::FreeOldest),
    ]
}

#[derive(Debug, Clone, Copy)]
enum OpKind {
    Allocate(usize),
    FreeOldest,
}

proptest! {
    /// Conservation law: `alloc_size + sum(free sizes) == pool_size` at
    /// every step of a randomized allocate/free sequence, under both
    /// placement policies.
    #[test]
    fn conservation_holds_across_random_sequences(
        ops in prop::collection::vec(op_strategy(), 1..64),
        use_best_fit in any::<bool>(),
    ) {
        let policy = if use_best_fit { Policy::BestFit } else { Policy::FirstFit };
        let mut pool = Pool::open(4096, policy).unwrap();
        let mut live = Vec::new();

        for op in ops {
            match op {
                OpKind::Allocate(size) => {
                    if let Ok(handle) = pool.allocate(size) {
                        live.push(handle);
                    }
                }
                OpKind::FreeOldest => {
                    if !live.is_empty() {
                        let handle = live.remove(0);
                        pool.free(handle).unwrap();
                    }
                }
            }
            assert_universal_invariants(&pool);
        }

        for handle in live {
            pool.free(handle).unwrap();
        }
        assert!(pool.is_initial_state());
    }
}
