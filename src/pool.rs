//! The pool manager: binds a backing buffer, a region list, a gap
//! index, and summary counters into one unit, and exposes the
//! allocate/free/inspect operations.
//!
//! Unlike a lock-free, fixed-block, `Send + Sync` allocator built on
//! `AtomicPtr`/CAS, this pool is a plain, single-threaded structure —
//! the core does not need to be thread-safe, and carrying atomic
//! machinery here would misrepresent that. What is kept is the shape:
//! a config-driven constructor family, a split between the hot path
//! and a `stats()` snapshot, and debug fill patterns for catching
//! use-after-free.

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::gap_index::GapIndex;
use crate::node::{NodeId, NodeStore, RegionNode};
use crate::policy::Policy;

/// A live allocation: the base offset and size of a region owned by the
/// caller until it is passed back to [`Pool::free`].
///
/// `base` is an offset into the pool's backing buffer rather than a raw
/// pointer, since this crate tracks no per-allocation metadata beyond
/// size and offset — there is no unsafe code anywhere in this crate as
/// a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    base: usize,
    size: usize,
    node: NodeId,
}

impl Allocation {
    /// Offset of this allocation within its pool's backing buffer.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Size of this allocation in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// One entry of an [`Pool::inspect`] snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionReport {
    pub size: usize,
    pub allocated: bool,
}

/// A point-in-time snapshot of a pool's metadata: the pool handle's
/// read-only fields, plus supplementary lifetime counters.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    pub total_size: usize,
    pub alloc_size: usize,
    pub num_allocs: usize,
    pub num_gaps: usize,
    pub policy: Policy,
    /// Lifetime allocation count; only meaningful when the pool's
    /// config has `track_stats` enabled, zero otherwise.
    pub total_allocs: u64,
    /// Lifetime deallocation count; see `total_allocs`.
    pub total_deallocs: u64,
    /// High-water mark of `alloc_size`; see `total_allocs`.
    pub peak_usage: usize,
}

/// A single pool: one backing buffer, partitioned into allocated and
/// free regions.
#[derive(Debug)]
pub struct Pool {
    buffer: Vec<u8>,
    nodes: NodeStore,
    gap_index: GapIndex,
    policy: Policy,
    config: PoolConfig,

    head: NodeId,
    tail: NodeId,

    used_nodes: usize,
    num_allocs: usize,
    num_gaps: usize,
    alloc_size: usize,

    total_allocs: u64,
    total_deallocs: u64,
    peak_usage: usize,
}

impl Pool {
    /// Opens a pool of exactly `size` bytes under `policy`, with default
    /// configuration. See [`Pool::with_config`] to customize.
    #[must_use = "this returns a Result that must be checked for OutOfMemory/InvalidArgument"]
    pub fn open(size: usize, policy: Policy) -> PoolResult<Self> {
        Self::with_config(size, policy, PoolConfig::default())
    }

    /// Opens a pool of exactly `size` bytes under `policy` and `config`.
    ///
    /// Fails with [`PoolError::InvalidArgument`] if `size` is zero, or
    /// [`PoolError::OutOfMemory`] if the backing buffer cannot be
    /// acquired. No partial state survives a failed open: the buffer,
    /// node store, and gap index are all local values dropped on the
    /// `?`/`return` path.
    #[must_use = "this returns a Result that must be checked for OutOfMemory/InvalidArgument"]
    pub fn with_config(size: usize, policy: Policy, config: PoolConfig) -> PoolResult<Self> {
        if size == 0 {
            return Err(PoolError::InvalidArgument);
        }

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(size).map_err(|_| PoolError::OutOfMemory)?;
        buffer.resize(size, 0);

        let initial =
            RegionNode { base: 0, size, allocated: false, live: true, prev: None, next: None };
        let nodes = NodeStore::new(initial, config.node_store_initial_capacity);

        let mut gap_index = GapIndex::with_capacity(config.gap_index_initial_capacity);
        gap_index.insert(NodeId(0), size, 0);

        #[cfg(feature = "logging")]
        tracing::debug!(target: "poolkeeper", pool_size = size, ?policy, "pool opened");

        let pool = Self {
            buffer,
            nodes,
            gap_index,
            policy,
            config,
            head: NodeId(0),
            tail: NodeId(0),
            used_nodes: 1,
            num_allocs: 0,
            num_gaps: 1,
            alloc_size: 0,
            total_allocs: 0,
            total_deallocs: 0,
            peak_usage: 0,
        };
        pool.debug_check_invariants();
        Ok(pool)
    }

    /// Whether the pool is in its initial state: one gap, zero
    /// allocations. This is the precondition for `try_close`.
    pub fn is_initial_state(&self) -> bool {
        self.num_gaps == 1 && self.num_allocs == 0
    }

    /// Closes the pool, consuming it, if it is in its initial state.
    /// On failure the pool is handed back unconsumed so the caller can
    /// keep using it: a failing close leaves the pool open and
    /// operable.
    #[must_use = "on failure the pool is returned and must not be dropped silently"]
    pub fn try_close(self) -> Result<(), (Self, PoolError)> {
        if self.is_initial_state() {
            Ok(())
        } else {
            Err((self, PoolError::NotFreed))
        }
    }

    /// Total pool size in bytes.
    pub fn total_size(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes currently allocated.
    pub fn alloc_size(&self) -> usize {
        self.alloc_size
    }

    /// Number of live allocations.
    pub fn num_allocs(&self) -> usize {
        self.num_allocs
    }

    /// Number of free gaps.
    pub fn num_gaps(&self) -> usize {
        self.num_gaps
    }

    /// The placement policy this pool was opened with.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// A metadata snapshot: the pool handle fields plus the
    /// supplementary lifetime counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_size: self.total_size(),
            alloc_size: self.alloc_size,
            num_allocs: self.num_allocs,
            num_gaps: self.num_gaps,
            policy: self.policy,
            total_allocs: self.total_allocs,
            total_deallocs: self.total_deallocs,
            peak_usage: self.peak_usage,
        }
    }

    /// Read access to the bytes backing a live allocation.
    pub fn bytes(&self, alloc: &Allocation) -> &[u8] {
        &self.buffer[alloc.base..alloc.base + alloc.size]
    }

    /// Mutable access to the bytes backing a live allocation.
    pub fn bytes_mut(&mut self, alloc: &Allocation) -> &mut [u8] {
        &mut self.buffer[alloc.base..alloc.base + alloc.size]
    }

    /// Snapshot of the region list in address order: `(size,
    /// allocated)` pairs. A freshly allocated, independent `Vec` — the
    /// caller owns it and it never aliases pool-internal state.
    pub fn inspect(&self) -> Vec<RegionReport> {
        let mut out = Vec::with_capacity(self.used_nodes);
        let mut cur = Some(self.head);
        while let Some(id) = cur {
            let n = self.nodes.get(id);
            out.push(RegionReport { size: n.size, allocated: n.allocated });
            cur = n.next;
        }
        out
    }

    fn first_fit(&self, size: usize) -> Option<NodeId> {
        let mut cur = Some(self.head);
        while let Some(id) = cur {
            let n = self.nodes.get(id);
            if !n.allocated && n.size >= size {
                return Some(id);
            }
            cur = n.next;
        }
        None
    }

    /// Carves `size` bytes out of a free region chosen by this pool's
    /// placement policy, splitting off and indexing any remainder.
    #[must_use = "a successful allocation must eventually be passed to free or it leaks"]
    pub fn allocate(&mut self, size: usize) -> PoolResult<Allocation> {
        if size == 0 {
            return Err(PoolError::InvalidArgument);
        }
        if self.num_gaps == 0 {
            return Err(PoolError::NoGap);
        }

        let chosen = match self.policy {
            Policy::FirstFit => self.first_fit(size),
            Policy::BestFit => self.gap_index.best_fit(size),
        };
        let Some(chosen) = chosen else {
            #[cfg(feature = "logging")]
            tracing::trace!(target: "poolkeeper", size, "allocate: no sufficient gap");
            return Err(PoolError::NoGap);
        };

        let chosen_snapshot = *self.nodes.get(chosen);
        let remainder = chosen_snapshot.size - size;

        self.gap_index.remove(chosen);
        {
            let n = self.nodes.get_mut(chosen);
            n.allocated = true;
            n.size = size;
        }

        if remainder > 0 {
            let new_base = chosen_snapshot.base + size;
            let new_node = RegionNode {
                base: new_base,
                size: remainder,
                allocated: false,
                live: true,
                prev: Some(chosen),
                next: chosen_snapshot.next,
            };
            let new_id = self.nodes.claim(new_node);

            if let Some(next_id) = chosen_snapshot.next {
                self.nodes.get_mut(next_id).prev = Some(new_id);
            } else {
                self.tail = new_id;
            }
            self.nodes.get_mut(chosen).next = Some(new_id);

            if let Some(pattern) = self.config.alloc_pattern {
                self.buffer[new_base..new_base + remainder].fill(pattern);
            }

            self.gap_index.insert(new_id, remainder, new_base);
            self.used_nodes += 1;
        }

        self.num_allocs += 1;
        self.alloc_size += size;
        self.num_gaps = self.gap_index.len();

        if self.config.track_stats {
            self.total_allocs += 1;
            self.peak_usage = self.peak_usage.max(self.alloc_size);
        }

        self.debug_check_invariants();

        #[cfg(feature = "logging")]
        tracing::trace!(
            target: "poolkeeper",
            base = chosen_snapshot.base,
            size,
            remainder,
            "allocate: ok"
        );

        Ok(Allocation { base: chosen_snapshot.base, size, node: chosen })
    }

    /// Returns `handle`'s region to the pool, coalescing with any
    /// adjacent free neighbors (successor first, then predecessor).
    #[must_use = "a failing free must be checked for UnknownHandle"]
    pub fn free(&mut self, handle: Allocation) -> PoolResult<()> {
        let valid = {
            let n = self.nodes.get(handle.node);
            n.live && n.allocated && n.base == handle.base && n.size == handle.size
        };
        if !valid {
            #[cfg(feature = "logging")]
            tracing::warn!(target: "poolkeeper", base = handle.base, "free: unknown handle");
            return Err(PoolError::UnknownHandle);
        }

        self.nodes.get_mut(handle.node).allocated = false;
        self.num_allocs -= 1;
        self.alloc_size -= handle.size;
        if self.config.track_stats {
            self.total_deallocs += 1;
        }

        if let Some(pattern) = self.config.dealloc_pattern {
            let n = self.nodes.get(handle.node);
            let (start, end) = (n.base, n.base + n.size);
            self.buffer[start..end].fill(pattern);
        }

        let mut surviving = handle.node;

        // Merge with successor first, so at most one new gap entry is
        // ever inserted.
        if let Some(succ_id) = self.nodes.get(surviving).next {
            if !self.nodes.get(succ_id).allocated {
                self.gap_index.remove(succ_id);
                let succ = *self.nodes.get(succ_id);
                self.nodes.get_mut(surviving).size += succ.size;
                self.nodes.get_mut(surviving).next = succ.next;
                if let Some(next_of_succ) = succ.next {
                    self.nodes.get_mut(next_of_succ).prev = Some(surviving);
                } else {
                    self.tail = surviving;
                }
                self.nodes.release(succ_id);
                self.used_nodes -= 1;
            }
        }

        // Then merge with predecessor.
        if let Some(pred_id) = self.nodes.get(surviving).prev {
            if !self.nodes.get(pred_id).allocated {
                self.gap_index.remove(pred_id);
                let surv = *self.nodes.get(surviving);
                self.nodes.get_mut(pred_id).size += surv.size;
                self.nodes.get_mut(pred_id).next = surv.next;
                if let Some(next_of_surv) = surv.next {
                    self.nodes.get_mut(next_of_surv).prev = Some(pred_id);
                } else {
                    self.tail = pred_id;
                }
                self.nodes.release(surviving);
                self.used_nodes -= 1;
                surviving = pred_id;
            }
        }

        let surv = self.nodes.get(surviving);
        self.gap_index.insert(surviving, surv.size, surv.base);
        self.num_gaps = self.gap_index.len();

        self.debug_check_invariants();

        #[cfg(feature = "logging")]
        tracing::trace!(target: "poolkeeper", base = handle.base, "free: ok");

        Ok(())
    }

    #[cfg(debug_assertions)]
    fn debug_check_invariants(&self) {
        let mut cur = Some(self.head);
        let mut expected_base = 0usize;
        let mut count = 0usize;
        let mut num_allocs = 0usize;
        let mut num_gaps = 0usize;
        let mut alloc_size = 0usize;
        let mut prev_was_free = false;
        let mut last = None;

        while let Some(id) = cur {
            let n = self.nodes.get(id);
            debug_assert!(n.live);
            debug_assert_eq!(n.base, expected_base);
            debug_assert!(!(prev_was_free && !n.allocated), "two adjacent free nodes");
            prev_was_free = !n.allocated;

            if n.allocated {
                num_allocs += 1;
                alloc_size += n.size;
            } else {
                num_gaps += 1;
            }

            if let Some(p) = n.prev {
                debug_assert_eq!(self.nodes.get(p).next, Some(id));
            }

            expected_base += n.size;
            count += 1;
            last = Some(id);
            cur = n.next;
        }

        debug_assert_eq!(last, Some(self.tail));
        debug_assert_eq!(expected_base, self.buffer.len());
        debug_assert_eq!(count, self.used_nodes);
        debug_assert_eq!(count, self.nodes.live_count());
        debug_assert_eq!(num_allocs, self.num_allocs);
        debug_assert_eq!(num_gaps, self.num_gaps);
        debug_assert_eq!(alloc_size, self.alloc_size);
        debug_assert_eq!(num_gaps, self.gap_index.len());
        debug_assert!(self.gap_index.is_sorted());
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_invariants(&self) {}
}
