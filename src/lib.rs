//! # poolkeeper
//!
//! A byte-range memory pool allocator: each pool owns one fixed-size
//! backing buffer and hands out non-overlapping sub-ranges of it on
//! request, tracking free space with an address-ordered region list and
//! a size-ordered gap index.
//!
//! Two ways to use a pool:
//!
//! - Directly, via [`Pool`] — open one, call its methods, close it when
//!   done. No global state involved.
//! - Through the process-wide [`registry`] module, which adds an
//!   explicit `init`/`shutdown` lifecycle and opaque [`PoolId`] handles
//!   in place of owning the `Pool` value yourself.
//!
//! Placement is controlled per pool by [`Policy`]: first-fit favors
//! selection speed, best-fit favors minimizing fragmentation.
//!
//! This crate is not thread-safe at the `Pool` level — a `Pool` (or a
//! `PoolId` resolved through the registry) must not be used
//! concurrently from multiple threads without external synchronization.

mod config;
mod error;
mod gap_index;
mod node;
mod policy;
mod pool;
pub mod registry;

pub use config::PoolConfig;
pub use error::{PoolError, PoolResult};
pub use policy::Policy;
pub use pool::{Allocation, Pool, PoolStats, RegionReport};
pub use registry::PoolId;

/// Initializes the process-wide pool registry.
///
/// Fails with [`PoolError::CalledAgain`] if it is already initialized.
#[must_use = "a failing init must be checked for CalledAgain"]
pub fn init() -> PoolResult<()> {
    registry::init()
}

/// Tears down the process-wide pool registry, dropping any pools still
/// registered.
///
/// Fails with [`PoolError::CalledAgain`] if `init` was never called, or
/// was already torn down.
#[must_use = "a failing shutdown must be checked for CalledAgain"]
pub fn shutdown() -> PoolResult<()> {
    registry::shutdown()
}

/// Opens a pool of `size` bytes under `policy` with default
/// configuration, registering it with the process-wide registry.
#[must_use = "this returns a Result that must be checked for NotInitialized/OutOfMemory"]
pub fn open(size: usize, policy: Policy) -> PoolResult<PoolId> {
    registry::open(size, policy)
}

/// Opens a pool of `size` bytes under `policy` and `config`,
/// registering it with the process-wide registry.
#[must_use = "this returns a Result that must be checked for NotInitialized/OutOfMemory"]
pub fn open_with_config(size: usize, policy: Policy, config: PoolConfig) -> PoolResult<PoolId> {
    registry::open_with_config(size, policy, config)
}

/// Closes a pool previously opened with [`open`] or
/// [`open_with_config`].
#[must_use = "a failing close must be checked for NotFreed"]
pub fn close(id: PoolId) -> PoolResult<()> {
    registry::close(id)
}

/// Allocates `size` bytes from the pool named by `id`.
#[must_use = "a successful allocation must eventually be passed to free or it leaks"]
pub fn allocate(id: PoolId, size: usize) -> PoolResult<Allocation> {
    registry::allocate(id, size)
}

/// Returns `handle`'s region to the pool named by `id`.
#[must_use = "a failing free must be checked for UnknownHandle"]
pub fn free(id: PoolId, handle: Allocation) -> PoolResult<()> {
    registry::free(id, handle)
}

/// Snapshots the region layout of the pool named by `id`, in address
/// order.
#[must_use = "this returns a Result that must be checked for NotInitialized/InvalidArgument"]
pub fn inspect(id: PoolId) -> PoolResult<Vec<RegionReport>> {
    registry::inspect(id)
}
