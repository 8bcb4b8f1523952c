//! Placement policy selection.
//!
//! The policy set is closed (first-fit, best-fit), with no plans to add
//! a third, so this dispatches on an enumeration rather than through a
//! `dyn`/generic extension point.

/// How `allocate` chooses which free region satisfies a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Scan the region list in address order; take the first free node
    /// large enough. Favors locality and selection speed.
    FirstFit,

    /// Scan the gap index from its small end; take the first (smallest
    /// sufficient) entry. Favors minimizing external fragmentation.
    BestFit,
}
