//! Local version (LV) numbering.
//!
//! LVs are dense, non-negative integers assigned in insertion order by the causal graph. The
//! graph's virtual root (the implicit ancestor of everything, before any operation has
//! happened) has no LV of its own; it's represented throughout this crate by `ROOT`, a sentinel
//! that lets us keep `LV` an unsigned type instead of reaching for a signed `-1`.

/// A dense local version index assigned by a [`CausalGraph`](crate::causalgraph::CausalGraph).
pub type LV = usize;

/// Sentinel LV representing the virtual root: "before any operation". Never assigned to a real
/// operation, and always less than every real LV for ordering purposes (see [`DTRange`]).
pub const ROOT: LV = usize::MAX;
