//! Frontiers: sorted, deduplicated sets of LVs with no descendant amongst themselves. Used both
//! for the causal graph's `heads` and for the version a [`Walker`](crate::walker::Walker) or
//! [`EditContext`](crate::item::EditContext) currently represents.

use smallvec::SmallVec;
use crate::lv::LV;

/// A sorted, deduplicated set of LVs. Most frontiers in practice have one entry (a linear
/// history) or two (a single pending merge), hence the inline capacity.
pub type Frontier = SmallVec<[LV; 2]>;

/// Insert `lv` into a sorted frontier, keeping it sorted and deduplicated.
pub fn add_to_frontier(frontier: &mut Frontier, lv: LV) {
    match frontier.binary_search(&lv) {
        Ok(_) => {} // Already present.
        Err(idx) => frontier.insert(idx, lv),
    }
}

/// Remove `lv` from a sorted frontier if present.
pub fn remove_from_frontier(frontier: &mut Frontier, lv: LV) {
    if let Ok(idx) = frontier.binary_search(&lv) {
        frontier.remove(idx);
    }
}

/// Build a sorted, deduplicated frontier from an arbitrary slice of LVs.
pub fn frontier_from_slice(lvs: &[LV]) -> Frontier {
    let mut f: Frontier = lvs.iter().copied().collect();
    f.sort_unstable();
    f.dedup();
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_sorted_and_deduped() {
        let mut f = Frontier::new();
        add_to_frontier(&mut f, 5);
        add_to_frontier(&mut f, 1);
        add_to_frontier(&mut f, 5);
        add_to_frontier(&mut f, 3);
        assert_eq!(f.as_slice(), &[1, 3, 5]);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut f = frontier_from_slice(&[1, 2, 3]);
        remove_from_frontier(&mut f, 10);
        assert_eq!(f.as_slice(), &[1, 2, 3]);
    }
}
