//! Process-wide pool registry: a growable table of open pools addressed
//! by opaque [`PoolId`] handles, with an explicit init/shutdown
//! lifecycle gating the global table.
//!
//! Grounded in a singleton manager pattern — a plain struct owning
//! storage, and free functions exposing init/open/close/.../shutdown
//! over a lazily-created lock. Pools are looked up by id and operated
//! on for the duration of one call rather than borrowed out, so the
//! registry can serialize access internally instead of handing out
//! long-lived mutable references.

use std::sync::{Mutex, OnceLock};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::policy::Policy;
use crate::pool::{Allocation, Pool, PoolStats, RegionReport};

/// Opaque handle to a pool registered with the global registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(usize);

struct Slot {
    pool: Option<Pool>,
}

/// A table of open pools. Slots vacated by `close` are reused by the
/// next `open` before the table grows, the same recycling discipline
/// the region-node store uses for its slots.
#[derive(Default)]
pub struct PoolRegistry {
    slots: Vec<Slot>,
    free_slots: Vec<usize>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self { slots: Vec::new(), free_slots: Vec::new() }
    }

    /// Opens a pool and registers it, returning a handle that later
    /// calls address it by.
    #[must_use = "this returns a Result that must be checked for OutOfMemory/InvalidArgument"]
    pub fn open(&mut self, size: usize, policy: Policy, config: PoolConfig) -> PoolResult<PoolId> {
        let pool = Pool::with_config(size, policy, config)?;
        let idx = if let Some(idx) = self.free_slots.pop() {
            self.slots[idx] = Slot { pool: Some(pool) };
            idx
        } else {
            let idx = self.slots.len();
            self.slots.push(Slot { pool: Some(pool) });
            idx
        };
        Ok(PoolId(idx))
    }

    fn slot(&self, id: PoolId) -> PoolResult<&Pool> {
        self.slots.get(id.0).and_then(|s| s.pool.as_ref()).ok_or(PoolError::InvalidArgument)
    }

    fn slot_mut(&mut self, id: PoolId) -> PoolResult<&mut Pool> {
        self.slots.get_mut(id.0).and_then(|s| s.pool.as_mut()).ok_or(PoolError::InvalidArgument)
    }

    /// Closes a registered pool, if it has no live allocations and
    /// exactly one gap. The slot is recycled for a future `open`.
    #[must_use = "a failing close must be checked for NotFreed"]
    pub fn close(&mut self, id: PoolId) -> PoolResult<()> {
        if !self.slot(id)?.is_initial_state() {
            return Err(PoolError::NotFreed);
        }
        self.slots[id.0].pool = None;
        self.free_slots.push(id.0);
        Ok(())
    }

    #[must_use = "a successful allocation must eventually be passed to free or it leaks"]
    pub fn allocate(&mut self, id: PoolId, size: usize) -> PoolResult<Allocation> {
        self.slot_mut(id)?.allocate(size)
    }

    #[must_use = "a failing free must be checked for UnknownHandle"]
    pub fn free(&mut self, id: PoolId, handle: Allocation) -> PoolResult<()> {
        self.slot_mut(id)?.free(handle)
    }

    #[must_use = "this returns a Result that must be checked for InvalidArgument"]
    pub fn inspect(&self, id: PoolId) -> PoolResult<Vec<RegionReport>> {
        Ok(self.slot(id)?.inspect())
    }

    #[must_use = "this returns a Result that must be checked for InvalidArgument"]
    pub fn stats(&self, id: PoolId) -> PoolResult<PoolStats> {
        Ok(self.slot(id)?.stats())
    }
}

// The `OnceLock` only ever creates the `Mutex` wrapper lazily; whether
// the registry itself is initialized is tracked by the `Option` inside
// it, so `shutdown` followed by a later `init` works, unlike a bare
// `OnceLock<PoolRegistry>` which can only ever be set once per process.
static REGISTRY: OnceLock<Mutex<Option<PoolRegistry>>> = OnceLock::new();

fn cell() -> &'static Mutex<Option<PoolRegistry>> {
    REGISTRY.get_or_init(|| Mutex::new(None))
}

fn with_registry<T>(f: impl FnOnce(&mut PoolRegistry) -> PoolResult<T>) -> PoolResult<T> {
    let mut guard = cell().lock().unwrap();
    let registry = guard.as_mut().ok_or(PoolError::NotInitialized)?;
    f(registry)
}

/// Initializes the global registry. Fails with
/// [`PoolError::CalledAgain`] if it is already initialized.
#[must_use = "a failing init must be checked for CalledAgain"]
pub fn init() -> PoolResult<()> {
    let mut guard = cell().lock().unwrap();
    if guard.is_some() {
        return Err(PoolError::CalledAgain);
    }
    *guard = Some(PoolRegistry::new());
    #[cfg(feature = "logging")]
    tracing::info!(target: "poolkeeper", "registry initialized");
    Ok(())
}

/// Tears down the global registry, dropping any pools still registered
/// regardless of their state. Fails with [`PoolError::CalledAgain`] if
/// `init` was never called, or was already torn down.
#[must_use = "a failing shutdown must be checked for CalledAgain"]
pub fn shutdown() -> PoolResult<()> {
    let mut guard = cell().lock().unwrap();
    if guard.is_none() {
        return Err(PoolError::CalledAgain);
    }
    *guard = None;
    #[cfg(feature = "logging")]
    tracing::info!(target: "poolkeeper", "registry shut down");
    Ok(())
}

/// Opens a pool with default configuration under the global registry.
#[must_use = "this returns a Result that must be checked for NotInitialized/OutOfMemory"]
pub fn open(size: usize, policy: Policy) -> PoolResult<PoolId> {
    with_registry(|r| r.open(size, policy, PoolConfig::default()))
}

/// Opens a pool with explicit configuration under the global registry.
#[must_use = "this returns a Result that must be checked for NotInitialized/OutOfMemory"]
pub fn open_with_config(size: usize, policy: Policy, config: PoolConfig) -> PoolResult<PoolId> {
    with_registry(|r| r.open(size, policy, config))
}

/// Closes a pool previously opened through this module.
#[must_use = "a failing close must be checked for NotFreed"]
pub fn close(id: PoolId) -> PoolResult<()> {
    with_registry(|r| r.close(id))
}

/// Allocates from a pool previously opened through this module.
#[must_use = "a successful allocation must eventually be passed to free or it leaks"]
pub fn allocate(id: PoolId, size: usize) -> PoolResult<Allocation> {
    with_registry(|r| r.allocate(id, size))
}

/// Frees an allocation obtained from [`allocate`].
#[must_use = "a failing free must be checked for UnknownHandle"]
pub fn free(id: PoolId, handle: Allocation) -> PoolResult<()> {
    with_registry(|r| r.free(id, handle))
}

/// Snapshots the region layout of a pool previously opened through this
/// module.
#[must_use = "this returns a Result that must be checked for NotInitialized/InvalidArgument"]
pub fn inspect(id: PoolId) -> PoolResult<Vec<RegionReport>> {
    with_registry(|r| r.inspect(id))
}

/// Snapshots the metadata of a pool previously opened through this
/// module.
#[must_use = "this returns a Result that must be checked for NotInitialized/InvalidArgument"]
pub fn stats(id: PoolId) -> PoolResult<PoolStats> {
    with_registry(|r| r.stats(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_recycles_closed_slots() {
        let mut registry = PoolRegistry::new();
        let a = registry.open(64, Policy::FirstFit, PoolConfig::default()).unwrap();
        registry.close(a).unwrap();
        let b = registry.open(64, Policy::FirstFit, PoolConfig::default()).unwrap();
        assert_eq!(a, b, "closed slot should be reused rather than growing the table");
    }

    #[test]
    fn registry_rejects_unknown_id() {
        let mut registry = PoolRegistry::new();
        let a = registry.open(64, Policy::FirstFit, PoolConfig::default()).unwrap();
        registry.close(a).unwrap();
        assert_eq!(registry.allocate(a, 8), Err(PoolError::InvalidArgument));
    }

    #[test]
    fn registry_close_requires_initial_state() {
        let mut registry = PoolRegistry::new();
        let a = registry.open(64, Policy::FirstFit, PoolConfig::default()).unwrap();
        let h = registry.allocate(a, 16).unwrap();
        assert_eq!(registry.close(a), Err(PoolError::NotFreed));
        registry.free(a, h).unwrap();
        assert!(registry.close(a).is_ok());
    }

    // The global registry is one process-wide resource, so these tests
    // serialize on a dedicated lock rather than relying on `cargo test`
    // to never run them concurrently.
    static GLOBAL_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn global_lifecycle_rejects_double_init_and_use_after_shutdown() {
        let _guard = GLOBAL_TEST_LOCK.lock().unwrap();
        let _ = shutdown();

        init().unwrap();
        assert_eq!(init(), Err(PoolError::CalledAgain));

        let id = open(128, Policy::BestFit).unwrap();
        let h = allocate(id, 32).unwrap();
        free(id, h).unwrap();
        close(id).unwrap();

        shutdown().unwrap();
        assert_eq!(shutdown(), Err(PoolError::CalledAgain));
        assert_eq!(open(128, Policy::BestFit), Err(PoolError::NotInitialized));

        init().unwrap();
        shutdown().unwrap();
    }
}
