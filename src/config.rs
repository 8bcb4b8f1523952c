//! Pool configuration presets.
//!
//! Follows a three-preset pattern (`default` / `debug` / `production`
//! / `performance`) rather than one constructor with many arguments.

/// Configuration for a single [`crate::Pool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maintain the optional lifetime counters (`total_allocs`,
    /// `total_deallocs`, `peak_usage`) on top of the mandatory
    /// `alloc_size`/`num_allocs` fields.
    pub track_stats: bool,

    /// Byte pattern written into a freshly split remainder region, to
    /// make reads of uninitialized memory visible under a debugger.
    pub alloc_pattern: Option<u8>,

    /// Byte pattern written into a region when it becomes free (from
    /// `free` or from coalescing), to make use-after-free visible.
    pub dealloc_pattern: Option<u8>,

    /// Initial capacity of the region-node store.
    pub node_store_initial_capacity: usize,

    /// Initial capacity of the gap index.
    pub gap_index_initial_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: if cfg!(debug_assertions) { Some(0xAB) } else { None },
            dealloc_pattern: if cfg!(debug_assertions) { Some(0xDD) } else { None },
            node_store_initial_capacity: 16,
            gap_index_initial_capacity: 16,
        }
    }
}

impl PoolConfig {
    /// Debug configuration: stats and fill patterns always on.
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xAB),
            dealloc_pattern: Some(0xDD),
            node_store_initial_capacity: 16,
            gap_index_initial_capacity: 16,
        }
    }

    /// Production configuration: no stats, no fill patterns, larger
    /// initial capacities to avoid early growth under load.
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            node_store_initial_capacity: 64,
            gap_index_initial_capacity: 64,
        }
    }

    /// Minimal-overhead configuration: no stats, no fill patterns,
    /// smallest initial capacities.
    pub fn performance() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            node_store_initial_capacity: 4,
            gap_index_initial_capacity: 4,
        }
    }
}
