use poolkeeper::{Pool, PoolError, Policy};

#[test]
fn open_reports_initial_state() {
    let pool = Pool::open(1000, Policy::BestFit).unwrap();
    assert_eq!(pool.total_size(), 1000);
    assert_eq!(pool.alloc_size(), 0);
    assert_eq!(pool.num_allocs(), 0);
    assert_eq!(pool.num_gaps(), 1);
    assert!(pool.is_initial_state());
}

#[test]
fn close_succeeds_in_initial_state() {
    let pool = Pool::open(64, Policy::FirstFit).unwrap();
    assert!(pool.try_close().is_ok());
}

#[test]
fn close_fails_with_live_allocations() {
    let mut pool = Pool::open(64, Policy::FirstFit).unwrap();
    let a = pool.allocate(16).unwrap();
    let (pool, err) = pool.try_close().unwrap_err();
    assert_eq!(err, PoolError::NotFreed);

    // a failing close leaves the pool open and operable
    let mut pool = pool;
    assert_eq!(pool.num_allocs(), 1);
    pool.free(a).unwrap();
    assert!(pool.try_close().is_ok());
}

#[test]
fn open_rejects_zero_size() {
    assert_eq!(Pool::open(0, Policy::FirstFit).unwrap_err(), PoolError::InvalidArgument);
}
