//! Error types for pool lifecycle, allocation, and free operations.
//!
//! One concrete variant per failure mode (`thiserror`-derived
//! `Display`) rather than a single catch-all error carrying a string.

/// Failure modes for every public `poolkeeper` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// `init` was called while the registry was already initialized.
    #[error("registry already initialized")]
    CalledAgain,

    /// A registry operation ran before `init` (or after `shutdown`).
    #[error("registry not initialized")]
    NotInitialized,

    /// `close` was called on a pool that still has live allocations or
    /// more than one gap.
    #[error("pool still has live allocations or more than one gap")]
    NotFreed,

    /// `allocate` could not find a free region large enough for the
    /// request.
    #[error("no gap large enough for the request")]
    NoGap,

    /// A backing allocation (pool buffer, node store, or gap index)
    /// could not be acquired.
    #[error("backing allocation failed")]
    OutOfMemory,

    /// `free` was given a handle that does not name a live allocation
    /// in the target pool.
    #[error("allocation handle does not belong to this pool")]
    UnknownHandle,

    /// `open` was called with a zero pool size, or an operation named
    /// a pool id the registry does not know about.
    #[error("invalid pool size or unknown pool id")]
    InvalidArgument,
}

/// Result type returned by every fallible `poolkeeper` operation.
pub type PoolResult<T> = Result<T, PoolError>;
