//! Region nodes and the node store.
//!
//! Neighbor links and gap-index references use stable [`NodeId`]
//! indices rather than raw pointers, so growing the backing `Vec` never
//! invalidates a live reference. This is an idiomatic-Rust reading of a
//! pointer-based intrusive free list, adapted to a single-threaded,
//! variable-size design with no unsafe code.

/// A stable index into a [`NodeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A contiguous sub-range of a pool: either a live allocation or a free
/// gap, linked to its address-order neighbors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegionNode {
    pub base: usize,
    pub size: usize,
    pub allocated: bool,
    /// `false` means this slot is recyclable and carries no meaningful
    /// `base`/`size`.
    pub live: bool,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl RegionNode {
    const fn dead() -> Self {
        Self { base: 0, size: 0, allocated: false, live: false, prev: None, next: None }
    }
}

/// Growable store of region nodes, indexed by stable [`NodeId`].
///
/// Freed (coalesced-away) slots are pushed onto `free_slots` and reused
/// by the next split before the store grows, keeping the store compact
/// across long allocate/free cycles.
#[derive(Debug)]
pub(crate) struct NodeStore {
    slots: Vec<RegionNode>,
    free_slots: Vec<NodeId>,
}

impl NodeStore {
    /// Creates a store whose first slot (id 0) is the live node
    /// `initial`, pre-sized to `initial_capacity` dead, recyclable
    /// slots beyond it.
    pub fn new(initial: RegionNode, initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.push(initial);

        let mut free_slots = Vec::with_capacity(capacity.saturating_sub(1));
        for i in (1..capacity).rev() {
            slots.push(RegionNode::dead());
            free_slots.push(NodeId(i));
        }

        Self { slots, free_slots }
    }

    pub fn get(&self, id: NodeId) -> &RegionNode {
        &self.slots[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut RegionNode {
        &mut self.slots[id.0]
    }

    /// Claims a recyclable slot (or grows the store by one) and
    /// installs `node` into it, marking it live.
    ///
    /// Growth beyond the pre-sized capacity is delegated to `Vec`'s own
    /// amortized doubling, which never invalidates an existing
    /// `NodeId`.
    pub fn claim(&mut self, node: RegionNode) -> NodeId {
        debug_assert!(node.live);
        if let Some(id) = self.free_slots.pop() {
            self.slots[id.0] = node;
            id
        } else {
            let id = NodeId(self.slots.len());
            self.slots.push(node);
            id
        }
    }

    /// Marks a slot dead and returns it to the recyclable pool.
    pub fn release(&mut self, id: NodeId) {
        let slot = &mut self.slots[id.0];
        debug_assert!(slot.live);
        *slot = RegionNode::dead();
        self.free_slots.push(id);
    }

    /// Number of slots currently marked live.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }
}
